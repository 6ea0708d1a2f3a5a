//! Microphone sources
//!
//! A source yields mono f32 frames at its own sample rate through a channel.
//! The capture's `stream` handle stops the audio when released.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use super::resources::Releasable;

const FRAME_CHANNEL_CAPACITY: usize = 64;

#[derive(Error, Debug)]
pub enum MicrophoneError {
    #[error("Microphone access denied: {0}")]
    PermissionDenied(String),

    #[error("No microphone available")]
    NoDevice,

    #[error("Microphone unavailable: {0}")]
    Unavailable(String),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

pub struct MicrophoneCapture {
    pub sample_rate: u32,
    pub frames: mpsc::Receiver<Vec<f32>>,
    pub stream: Box<dyn Releasable>,
}

pub trait MicrophoneSource: Send + Sync {
    fn open(&self) -> Result<MicrophoneCapture, MicrophoneError>;
}

fn mix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

// ===== WAV file =====

/// Plays a WAV file as if it were a microphone. Useful for rehearsing a
/// session without a sound card.
pub struct WavMicrophone {
    path: PathBuf,
    frame_duration: Duration,
    realtime: bool,
}

impl WavMicrophone {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            frame_duration: Duration::from_millis(100),
            realtime: true,
        }
    }

    /// Emit frames as fast as the consumer takes them
    pub fn without_pacing(mut self) -> Self {
        self.realtime = false;
        self
    }
}

struct StopFlag {
    name: &'static str,
    flag: Arc<AtomicBool>,
}

impl Releasable for StopFlag {
    fn release(&mut self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    fn label(&self) -> &str {
        self.name
    }
}

fn read_wav_mono(path: &PathBuf) -> Result<(u32, Vec<f32>), MicrophoneError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };
    Ok((spec.sample_rate, mix_to_mono(&samples, usize::from(spec.channels))))
}

impl MicrophoneSource for WavMicrophone {
    fn open(&self) -> Result<MicrophoneCapture, MicrophoneError> {
        let (sample_rate, samples) = read_wav_mono(&self.path)?;
        let frame_len = ((f64::from(sample_rate) * self.frame_duration.as_secs_f64()) as usize).max(1);
        let (tx, rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));

        let thread_stop = stop.clone();
        let frame_duration = self.frame_duration;
        let realtime = self.realtime;
        std::thread::spawn(move || {
            for frame in samples.chunks(frame_len) {
                if thread_stop.load(Ordering::SeqCst) {
                    break;
                }
                if tx.blocking_send(frame.to_vec()).is_err() {
                    break;
                }
                if realtime {
                    std::thread::sleep(frame_duration);
                }
            }
        });

        log::info!("Using {} as microphone input ({} Hz)", self.path.display(), sample_rate);
        Ok(MicrophoneCapture {
            sample_rate,
            frames: rx,
            stream: Box::new(StopFlag {
                name: "wav microphone",
                flag: stop,
            }),
        })
    }
}

// ===== Sound card =====

#[cfg(feature = "microphone")]
pub use device::CpalMicrophone;

#[cfg(feature = "microphone")]
mod device {
    use std::sync::mpsc as std_mpsc;
    use std::thread::JoinHandle;

    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use tokio::sync::mpsc;

    use super::{mix_to_mono, MicrophoneCapture, MicrophoneError, MicrophoneSource, FRAME_CHANNEL_CAPACITY};
    use crate::speaking::resources::Releasable;

    /// Default input device of the host. cpal streams are not `Send`, so the
    /// stream lives on its own thread until released.
    #[derive(Default)]
    pub struct CpalMicrophone;

    impl CpalMicrophone {
        pub fn new() -> Self {
            Self
        }
    }

    struct DeviceStream {
        stop: Option<std_mpsc::Sender<()>>,
        thread: Option<JoinHandle<()>>,
    }

    impl Releasable for DeviceStream {
        fn release(&mut self) {
            if let Some(stop) = self.stop.take() {
                let _ = stop.send(());
            }
            if let Some(thread) = self.thread.take() {
                if thread.join().is_err() {
                    log::warn!("Microphone thread panicked");
                }
            }
        }

        fn label(&self) -> &str {
            "microphone"
        }
    }

    fn classify(message: String) -> MicrophoneError {
        let lower = message.to_lowercase();
        if lower.contains("permission") || lower.contains("denied") {
            MicrophoneError::PermissionDenied(message)
        } else {
            MicrophoneError::Unavailable(message)
        }
    }

    impl MicrophoneSource for CpalMicrophone {
        fn open(&self) -> Result<MicrophoneCapture, MicrophoneError> {
            let (frame_tx, frame_rx) = mpsc::channel::<Vec<f32>>(FRAME_CHANNEL_CAPACITY);
            let (ready_tx, ready_rx) = std_mpsc::channel::<Result<u32, MicrophoneError>>();
            let (stop_tx, stop_rx) = std_mpsc::channel::<()>();

            let thread = std::thread::spawn(move || {
                let host = cpal::default_host();
                let Some(device) = host.default_input_device() else {
                    let _ = ready_tx.send(Err(MicrophoneError::NoDevice));
                    return;
                };
                let config = match device.default_input_config() {
                    Ok(config) => config,
                    Err(e) => {
                        let _ = ready_tx.send(Err(classify(e.to_string())));
                        return;
                    }
                };
                let sample_rate = config.sample_rate().0;
                let channels = usize::from(config.channels());
                let stream_config: cpal::StreamConfig = config.clone().into();

                let stream = match config.sample_format() {
                    cpal::SampleFormat::F32 => device.build_input_stream(
                        &stream_config,
                        move |data: &[f32], _: &cpal::InputCallbackInfo| {
                            if frame_tx.try_send(mix_to_mono(data, channels)).is_err() {
                                log::debug!("Microphone channel full, dropping frame");
                            }
                        },
                        |err| log::error!("Microphone stream error: {}", err),
                        None,
                    ),
                    cpal::SampleFormat::I16 => device.build_input_stream(
                        &stream_config,
                        move |data: &[i16], _: &cpal::InputCallbackInfo| {
                            let floats: Vec<f32> =
                                data.iter().map(|&s| f32::from(s) / 32768.0).collect();
                            if frame_tx.try_send(mix_to_mono(&floats, channels)).is_err() {
                                log::debug!("Microphone channel full, dropping frame");
                            }
                        },
                        |err| log::error!("Microphone stream error: {}", err),
                        None,
                    ),
                    other => {
                        let _ = ready_tx.send(Err(MicrophoneError::Unavailable(format!(
                            "unsupported sample format {:?}",
                            other
                        ))));
                        return;
                    }
                };

                let stream = match stream {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(classify(e.to_string())));
                        return;
                    }
                };
                if let Err(e) = stream.play() {
                    let _ = ready_tx.send(Err(classify(e.to_string())));
                    return;
                }

                let _ = ready_tx.send(Ok(sample_rate));
                let _ = stop_rx.recv();
                drop(stream);
                log::debug!("Microphone stream stopped");
            });

            let sample_rate = ready_rx
                .recv()
                .map_err(|_| MicrophoneError::Unavailable("microphone thread exited".to_string()))??;

            Ok(MicrophoneCapture {
                sample_rate,
                frames: frame_rx,
                stream: Box::new(DeviceStream {
                    stop: Some(stop_tx),
                    thread: Some(thread),
                }),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_test_wav(dir: &TempDir, channels: u16, samples: &[i16]) -> PathBuf {
        let path = dir.path().join("input.wav");
        let spec = hound::WavSpec {
            channels,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for s in samples {
            writer.write_sample(*s).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    #[test]
    fn test_mix_to_mono() {
        assert_eq!(mix_to_mono(&[0.25, 0.75, -1.0, 1.0], 2), vec![0.5, 0.0]);
        assert_eq!(mix_to_mono(&[0.5], 1), vec![0.5]);
    }

    #[tokio::test]
    async fn test_wav_microphone_emits_all_samples() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_test_wav(&temp_dir, 1, &vec![16_384; 4_000]);

        let mut capture = WavMicrophone::new(path).without_pacing().open().unwrap();
        assert_eq!(capture.sample_rate, 16_000);

        let mut total = 0;
        while let Some(frame) = capture.frames.recv().await {
            assert!(frame.iter().all(|s| (*s - 0.5).abs() < 1e-6));
            total += frame.len();
        }
        assert_eq!(total, 4_000);
        capture.stream.release();
    }

    #[test]
    fn test_missing_wav_is_error() {
        let result = WavMicrophone::new(PathBuf::from("/nonexistent/input.wav")).open();
        assert!(matches!(result, Err(MicrophoneError::Wav(_))));
    }
}
