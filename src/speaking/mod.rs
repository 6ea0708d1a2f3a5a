//! Live speaking coach
//!
//! A session streams microphone audio to the provider's live endpoint and
//! turns the replies into transcript turns, pronunciation scores and
//! scheduled audio clips, which an output sink plays.

pub mod events;
pub mod microphone;
pub mod mode;
pub mod output;
pub mod pcm;
pub mod playback;
pub mod resources;
pub mod session;
pub mod transcript;
pub mod transport;

pub use events::{ClientMessage, ServerEvent, SetupConfig};
pub use microphone::{MicrophoneCapture, MicrophoneError, MicrophoneSource, WavMicrophone};
#[cfg(feature = "microphone")]
pub use microphone::CpalMicrophone;
pub use mode::SessionMode;
pub use output::{PlaybackQueue, ReplyRecording, ReplySink, SpeakerError};
#[cfg(feature = "microphone")]
pub use output::CpalSpeaker;
pub use playback::{PlaybackScheduler, ScheduledClip};
pub use resources::{OnRelease, Releasable, ResourceScope, TaskGuard};
pub use session::{
    Clock, MonotonicClock, SessionConfig, SessionError, SessionState, SessionUpdate,
    SpeakingSession,
};
pub use transcript::{PronunciationScore, ScoreCard, Speaker, Transcript, Turn};
pub use transport::{GeminiLiveConnector, LiveChannel, LiveConnector, LiveInbound};
