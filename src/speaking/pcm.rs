//! PCM helpers for the live audio path
//!
//! The live endpoint takes 16 kHz PCM16 little-endian mono, base64 encoded,
//! and answers with 24 kHz PCM16.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Sample rate of outbound microphone audio
pub const LIVE_INPUT_SAMPLE_RATE: u32 = 16_000;

/// Sample rate the live model answers with
pub const LIVE_OUTPUT_SAMPLE_RATE: u32 = 24_000;

/// Linear-interpolation resampler for a stream of frames. The read
/// position and the last sample carry over from one frame to the next, so
/// frame boundaries add no drift or clicks. Good enough for speech.
#[derive(Debug, Clone)]
pub struct Resampler {
    from_rate: u32,
    to_rate: u32,
    /// Input index of the next output sample, relative to the next frame
    position: f64,
    last: Option<f32>,
}

impl Resampler {
    pub fn new(from_rate: u32, to_rate: u32) -> Self {
        Self {
            from_rate,
            to_rate,
            position: 0.0,
            last: None,
        }
    }

    /// Resample the next frame of the stream
    pub fn process(&mut self, frame: &[f32]) -> Vec<f32> {
        if self.from_rate == self.to_rate || self.from_rate == 0 || self.to_rate == 0 {
            return frame.to_vec();
        }
        let Some(&tail) = frame.last() else {
            return Vec::new();
        };

        let step = f64::from(self.from_rate) / f64::from(self.to_rate);
        let before = self.last.unwrap_or(frame[0]);
        // Index -1 is the last sample of the previous frame
        let sample = |index: isize| -> f32 {
            if index < 0 {
                before
            } else {
                frame[index as usize]
            }
        };

        let limit = (frame.len() - 1) as f64;
        let mut output = Vec::with_capacity((frame.len() as f64 / step).ceil() as usize + 1);
        while self.position < limit {
            let index = self.position.floor();
            let frac = (self.position - index) as f32;
            let a = sample(index as isize);
            let b = sample(index as isize + 1);
            output.push(a + (b - a) * frac);
            self.position += step;
        }

        self.position -= frame.len() as f64;
        self.last = Some(tail);
        output
    }
}

/// Float samples in [-1, 1] to PCM16 LE bytes (clamped)
pub fn f32_to_pcm16_le(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|s| {
            let clamped = s.clamp(-1.0, 1.0);
            let value = if clamped < 0.0 {
                clamped * 32768.0
            } else {
                clamped * 32767.0
            };
            (value as i16).to_le_bytes()
        })
        .collect()
}

/// PCM16 LE bytes to samples. A trailing odd byte is ignored.
pub fn decode_pcm16_le(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

pub fn i16_to_f32(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| f32::from(s) / 32768.0).collect()
}

/// Resample a microphone frame to 16 kHz and encode it for the wire. The
/// resampler must be built for the microphone rate and reused across frames.
pub fn encode_microphone_frame(samples: &[f32], resampler: &mut Resampler) -> String {
    STANDARD.encode(f32_to_pcm16_le(&resampler.process(samples)))
}

/// Seconds of audio in `sample_count` mono samples
pub fn duration_secs(sample_count: usize, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    sample_count as f64 / f64::from(sample_rate)
}
