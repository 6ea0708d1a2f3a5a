//! Consumers of scheduled reply audio
//!
//! [`PlaybackQueue`] turns scheduled clips into a device sample stream: each
//! clip starts at its scheduled time, back-to-back clips play without a gap
//! and an interruption flushes whatever has not been played. [`CpalSpeaker`]
//! drives a queue from the default output device. [`ReplyRecording`] keeps
//! the reply audio for export, minus what an interruption cut off.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

use super::pcm::{i16_to_f32, Resampler};
use super::playback::ScheduledClip;

/// Clips closer than this are treated as back to back
const CONTIGUOUS_EPSILON: f64 = 1e-6;

#[derive(Error, Debug)]
pub enum SpeakerError {
    #[error("No audio output device available")]
    NoDevice,

    #[error("Audio output unavailable: {0}")]
    Unavailable(String),
}

/// Something that takes reply clips as the session schedules them
pub trait ReplySink: Send {
    fn play(&mut self, clip: &ScheduledClip, sample_rate: u32, samples: &[i16]);

    /// Drop audio that would sound at or after `at` (session clock).
    /// Returns how many clips were cut or dropped.
    fn interrupt(&mut self, at: f64) -> usize;

    /// True while queued audio is still sounding
    fn is_playing(&self) -> bool {
        false
    }
}

// ===== Device queue =====

#[derive(Debug)]
struct QueuedClip {
    id: u64,
    /// Device frame the clip starts on
    start: u64,
    samples: Vec<f32>,
    offset: usize,
}

/// Mono sample queue feeding an output device. Frame 0 is `origin` on the
/// session clock.
#[derive(Debug)]
pub struct PlaybackQueue {
    rate: u32,
    origin: f64,
    played: u64,
    clips: VecDeque<QueuedClip>,
    resampler: Option<(u32, Resampler)>,
    /// Session time and device frame where the last queued clip ends
    tail: Option<(f64, u64)>,
}

impl PlaybackQueue {
    pub fn new(rate: u32, origin: f64) -> Self {
        Self {
            rate,
            origin,
            played: 0,
            clips: VecDeque::new(),
            resampler: None,
            tail: None,
        }
    }

    fn frame_at(&self, secs: f64) -> u64 {
        ((secs - self.origin).max(0.0) * f64::from(self.rate)).round() as u64
    }

    pub fn push(&mut self, clip: &ScheduledClip, sample_rate: u32, samples: &[i16]) {
        let contiguous = matches!(
            self.tail,
            Some((end, _)) if (clip.start - end).abs() < CONTIGUOUS_EPSILON
        );
        let start = match self.tail {
            Some((_, frame)) if contiguous => frame,
            _ => self.frame_at(clip.start),
        };
        // A clip that is already late plays right away
        let start = start.max(self.played);

        let keep_phase =
            contiguous && matches!(&self.resampler, Some((rate, _)) if *rate == sample_rate);
        if !keep_phase {
            self.resampler = Some((sample_rate, Resampler::new(sample_rate, self.rate)));
        }
        let resampled = match self.resampler.as_mut() {
            Some((_, resampler)) => resampler.process(&i16_to_f32(samples)),
            None => return,
        };

        self.tail = Some((clip.end(), start + resampled.len() as u64));
        self.clips.push_back(QueuedClip {
            id: clip.id,
            start,
            samples: resampled,
            offset: 0,
        });
    }

    /// Fill an interleaved device buffer, repeating each sample on every
    /// channel. Silence where nothing is scheduled.
    pub fn fill(&mut self, out: &mut [f32], channels: usize) {
        for frame in out.chunks_mut(channels.max(1)) {
            let value = self.next_sample();
            frame.fill(value);
        }
    }

    fn next_sample(&mut self) -> f32 {
        let now = self.played;
        self.played += 1;
        loop {
            let Some(clip) = self.clips.front_mut() else {
                return 0.0;
            };
            if clip.offset >= clip.samples.len() {
                log::trace!("Reply clip {} finished", clip.id);
                self.clips.pop_front();
                continue;
            }
            if clip.offset == 0 && now < clip.start {
                return 0.0;
            }
            let value = clip.samples[clip.offset];
            clip.offset += 1;
            return value;
        }
    }

    /// Flush every queued clip. Returns how many were dropped.
    pub fn interrupt(&mut self) -> usize {
        let cleared = self.clips.len();
        self.clips.clear();
        self.tail = None;
        self.resampler = None;
        cleared
    }

    pub fn pending(&self) -> usize {
        self.clips.len()
    }

    pub fn is_idle(&self) -> bool {
        self.clips.is_empty()
    }
}

fn lock(queue: &Mutex<PlaybackQueue>) -> MutexGuard<'_, PlaybackQueue> {
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ===== Recording =====

/// Reply audio kept for export. Clips at another rate than the first one
/// are skipped.
#[derive(Debug, Default)]
pub struct ReplyRecording {
    sample_rate: Option<u32>,
    clips: Vec<(ScheduledClip, Vec<i16>)>,
}

impl ReplyRecording {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    pub fn is_empty(&self) -> bool {
        self.clips.iter().all(|(_, samples)| samples.is_empty())
    }

    /// Everything kept, in schedule order
    pub fn samples(&self) -> Vec<i16> {
        self.clips
            .iter()
            .flat_map(|(_, samples)| samples.iter().copied())
            .collect()
    }
}

impl ReplySink for ReplyRecording {
    fn play(&mut self, clip: &ScheduledClip, sample_rate: u32, samples: &[i16]) {
        match self.sample_rate {
            None => self.sample_rate = Some(sample_rate),
            Some(rate) if rate == sample_rate => {}
            Some(_) => {
                log::warn!("Skipping reply clip at {} Hz", sample_rate);
                return;
            }
        }
        self.clips.push((*clip, samples.to_vec()));
    }

    fn interrupt(&mut self, at: f64) -> usize {
        let before = self.clips.len();
        self.clips.retain(|(clip, _)| clip.start < at);
        let mut cleared = before - self.clips.len();

        // Clips never overlap, so only the last one can straddle `at`
        let rate = f64::from(self.sample_rate.unwrap_or(0));
        if let Some((clip, samples)) = self.clips.last_mut() {
            if clip.end() > at {
                let heard = ((at - clip.start) * rate).round() as usize;
                samples.truncate(heard);
                cleared += 1;
            }
        }
        cleared
    }
}

// ===== Sound card =====

#[cfg(feature = "microphone")]
pub use device::CpalSpeaker;

#[cfg(feature = "microphone")]
mod device {
    use std::sync::mpsc as std_mpsc;
    use std::sync::{Arc, Mutex};
    use std::thread::JoinHandle;

    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

    use super::{lock, PlaybackQueue, ReplySink, SpeakerError};
    use crate::speaking::playback::ScheduledClip;

    /// Default output device of the host. Like the microphone, the cpal
    /// stream lives on its own thread; dropping the speaker stops it.
    pub struct CpalSpeaker {
        queue: Arc<Mutex<PlaybackQueue>>,
        stop: Option<std_mpsc::Sender<()>>,
        thread: Option<JoinHandle<()>>,
    }

    impl CpalSpeaker {
        /// Open the default output. `origin` is the session clock reading
        /// that the device's first frame corresponds to.
        pub fn open(origin: f64) -> Result<Self, SpeakerError> {
            let (ready_tx, ready_rx) =
                std_mpsc::channel::<Result<Arc<Mutex<PlaybackQueue>>, SpeakerError>>();
            let (stop_tx, stop_rx) = std_mpsc::channel::<()>();

            let thread = std::thread::spawn(move || {
                let host = cpal::default_host();
                let Some(device) = host.default_output_device() else {
                    let _ = ready_tx.send(Err(SpeakerError::NoDevice));
                    return;
                };
                let config = match device.default_output_config() {
                    Ok(config) => config,
                    Err(e) => {
                        let _ = ready_tx.send(Err(SpeakerError::Unavailable(e.to_string())));
                        return;
                    }
                };
                let channels = usize::from(config.channels());
                let stream_config: cpal::StreamConfig = config.clone().into();
                let queue = Arc::new(Mutex::new(PlaybackQueue::new(config.sample_rate().0, origin)));

                let callback_queue = queue.clone();
                let stream = match config.sample_format() {
                    cpal::SampleFormat::F32 => device.build_output_stream(
                        &stream_config,
                        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                            lock(&callback_queue).fill(data, channels);
                        },
                        |err| log::error!("Speaker stream error: {}", err),
                        None,
                    ),
                    cpal::SampleFormat::I16 => {
                        let mut buffer: Vec<f32> = Vec::new();
                        device.build_output_stream(
                            &stream_config,
                            move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                                buffer.resize(data.len(), 0.0);
                                lock(&callback_queue).fill(&mut buffer, channels);
                                for (out, sample) in data.iter_mut().zip(&buffer) {
                                    *out = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
                                }
                            },
                            |err| log::error!("Speaker stream error: {}", err),
                            None,
                        )
                    }
                    other => {
                        let _ = ready_tx.send(Err(SpeakerError::Unavailable(format!(
                            "unsupported sample format {:?}",
                            other
                        ))));
                        return;
                    }
                };

                let stream = match stream {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(SpeakerError::Unavailable(e.to_string())));
                        return;
                    }
                };
                if let Err(e) = stream.play() {
                    let _ = ready_tx.send(Err(SpeakerError::Unavailable(e.to_string())));
                    return;
                }

                log::info!("Playing replies on the default output ({} Hz)", config.sample_rate().0);
                let _ = ready_tx.send(Ok(queue));
                let _ = stop_rx.recv();
                drop(stream);
                log::debug!("Speaker stream stopped");
            });

            let queue = ready_rx
                .recv()
                .map_err(|_| SpeakerError::Unavailable("speaker thread exited".to_string()))??;

            Ok(Self {
                queue,
                stop: Some(stop_tx),
                thread: Some(thread),
            })
        }
    }

    impl ReplySink for CpalSpeaker {
        fn play(&mut self, clip: &ScheduledClip, sample_rate: u32, samples: &[i16]) {
            lock(&self.queue).push(clip, sample_rate, samples);
        }

        fn interrupt(&mut self, _at: f64) -> usize {
            lock(&self.queue).interrupt()
        }

        fn is_playing(&self) -> bool {
            !lock(&self.queue).is_idle()
        }
    }

    impl Drop for CpalSpeaker {
        fn drop(&mut self) {
            if let Some(stop) = self.stop.take() {
                let _ = stop.send(());
            }
            if let Some(thread) = self.thread.take() {
                if thread.join().is_err() {
                    log::warn!("Speaker thread panicked");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF: i16 = 16_384;

    fn clip(id: u64, start: f64, duration: f64) -> ScheduledClip {
        ScheduledClip { id, start, duration }
    }

    fn drain(queue: &mut PlaybackQueue, frames: usize) -> Vec<f32> {
        let mut out = vec![9.0; frames];
        queue.fill(&mut out, 1);
        out
    }

    #[test]
    fn test_back_to_back_clips_play_without_gap() {
        let mut queue = PlaybackQueue::new(10, 0.0);
        queue.push(&clip(0, 0.0, 0.3), 10, &[HALF; 3]);
        queue.push(&clip(1, 0.3, 0.2), 10, &[-HALF; 2]);

        assert_eq!(
            drain(&mut queue, 7),
            vec![0.5, 0.5, 0.5, -0.5, -0.5, 0.0, 0.0]
        );
        assert!(queue.is_idle());
    }

    #[test]
    fn test_clip_waits_for_its_start() {
        let mut queue = PlaybackQueue::new(10, 2.0);
        queue.push(&clip(0, 2.5, 0.1), 10, &[HALF]);

        let out = drain(&mut queue, 7);
        assert_eq!(out[..5], [0.0; 5]);
        assert_eq!(out[5], 0.5);
        assert_eq!(out[6], 0.0);
    }

    #[test]
    fn test_late_clip_plays_right_away() {
        let mut queue = PlaybackQueue::new(10, 0.0);
        drain(&mut queue, 10);
        queue.push(&clip(0, 0.2, 0.1), 10, &[HALF]);
        assert_eq!(drain(&mut queue, 2), vec![0.5, 0.0]);
    }

    #[test]
    fn test_interrupt_flushes_queue() {
        let mut queue = PlaybackQueue::new(10, 0.0);
        queue.push(&clip(0, 0.0, 0.4), 10, &[HALF; 4]);
        queue.push(&clip(1, 0.4, 0.4), 10, &[HALF; 4]);
        assert_eq!(drain(&mut queue, 2), vec![0.5, 0.5]);

        assert_eq!(queue.interrupt(), 2);
        assert_eq!(queue.pending(), 0);
        assert_eq!(drain(&mut queue, 4), vec![0.0; 4]);

        // A clip after the interruption starts on its own schedule
        queue.push(&clip(2, 0.8, 0.1), 10, &[-HALF]);
        let out = drain(&mut queue, 4);
        assert_eq!(out, vec![0.0, 0.0, -0.5, 0.0]);
    }

    #[test]
    fn test_fill_repeats_sample_on_every_channel() {
        let mut queue = PlaybackQueue::new(10, 0.0);
        queue.push(&clip(0, 0.0, 0.2), 10, &[HALF, -HALF]);
        let mut out = vec![0.0; 6];
        queue.fill(&mut out, 2);
        assert_eq!(out, vec![0.5, 0.5, -0.5, -0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_clips_resampled_to_device_rate() {
        let mut queue = PlaybackQueue::new(48_000, 0.0);
        // Half a second at 24 kHz in two back-to-back clips
        queue.push(&clip(0, 0.0, 0.25), 24_000, &[HALF; 6_000]);
        queue.push(&clip(1, 0.25, 0.25), 24_000, &[HALF; 6_000]);

        let out = drain(&mut queue, 24_000);
        let sounding = out.iter().filter(|&&s| s != 0.0).count();
        assert!((23_998..=24_000).contains(&sounding), "{} samples sounded", sounding);
        // No silence between the clips
        let first_silent = out.iter().position(|&s| s == 0.0).unwrap_or(out.len());
        assert_eq!(first_silent, sounding);
    }

    #[test]
    fn test_recording_drops_interrupted_audio() {
        let mut recording = ReplyRecording::new();
        recording.play(&clip(0, 0.0, 1.0), 10, &[1; 10]);
        recording.play(&clip(1, 1.0, 1.0), 10, &[2; 10]);
        recording.play(&clip(2, 2.0, 1.0), 10, &[3; 10]);

        assert_eq!(recording.interrupt(1.5), 2);
        let samples = recording.samples();
        assert_eq!(samples.len(), 15);
        assert!(samples[..10].iter().all(|&s| s == 1));
        assert!(samples[10..].iter().all(|&s| s == 2));
    }

    #[test]
    fn test_recording_interrupt_after_playback_keeps_everything() {
        let mut recording = ReplyRecording::new();
        recording.play(&clip(0, 0.0, 1.0), 10, &[1; 10]);
        assert_eq!(recording.interrupt(4.0), 0);
        assert_eq!(recording.samples().len(), 10);
    }

    #[test]
    fn test_recording_skips_other_rates() {
        let mut recording = ReplyRecording::new();
        assert!(recording.is_empty());
        recording.play(&clip(0, 0.0, 0.1), 24_000, &[1; 2_400]);
        recording.play(&clip(1, 0.1, 0.1), 16_000, &[2; 1_600]);

        assert_eq!(recording.sample_rate(), Some(24_000));
        assert_eq!(recording.samples().len(), 2_400);
        assert!(!recording.is_empty());
    }
}
