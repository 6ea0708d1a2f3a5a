use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use tokio::sync::oneshot;

use lumiere_lib::content::Category;
use lumiere_lib::narration::write_wav;
use lumiere_lib::progress::ProgressAction;
use lumiere_lib::speaking::{
    Clock, MicrophoneSource, MonotonicClock, ReplyRecording, ReplySink, SessionMode, SessionState,
    SessionUpdate, Speaker, SpeakingSession, TaskGuard, Turn, WavMicrophone,
};
use lumiere_lib::storage::CachedClip;

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub struct SpeakOptions {
    pub mode: SessionMode,
    pub topic: Option<String>,
    pub wav: Option<PathBuf>,
    pub record: Option<PathBuf>,
    pub mute: bool,
    pub seconds: u64,
}

/// Longest wait for the last reply to finish playing
const DRAIN_TIMEOUT: Duration = Duration::from_secs(15);

fn microphone(wav: Option<PathBuf>) -> Result<Arc<dyn MicrophoneSource>> {
    if let Some(path) = wav {
        return Ok(Arc::new(WavMicrophone::new(path)));
    }

    #[cfg(feature = "microphone")]
    {
        Ok(Arc::new(lumiere_lib::speaking::CpalMicrophone::new()))
    }
    #[cfg(not(feature = "microphone"))]
    {
        bail!("Built without the 'microphone' feature. Pass --wav <file> to use a recording.")
    }
}

fn speaker(clock: &dyn Clock, mute: bool) -> Option<Box<dyn ReplySink>> {
    if mute {
        return None;
    }

    #[cfg(feature = "microphone")]
    {
        match lumiere_lib::speaking::CpalSpeaker::open(clock.now()) {
            Ok(speaker) => return Some(Box::new(speaker)),
            Err(e) => log::warn!("Coach replies will not be played: {}", e),
        }
    }
    #[cfg(not(feature = "microphone"))]
    {
        let _ = clock;
        log::info!("Built without the 'microphone' feature, coach replies are not played");
    }
    None
}

/// Prints transcript chunks as they stream in, plays the reply audio and
/// keeps it for `--record`
struct LivePrinter {
    use_color: bool,
    quiet: bool,
    open_turn: Option<(Speaker, usize)>,
    recording: ReplyRecording,
    speaker: Option<Box<dyn ReplySink>>,
}

impl LivePrinter {
    fn new(use_color: bool, quiet: bool, speaker: Option<Box<dyn ReplySink>>) -> Self {
        Self {
            use_color,
            quiet,
            open_turn: None,
            recording: ReplyRecording::new(),
            speaker,
        }
    }

    /// Returns true once the session has ended
    fn handle(&mut self, update: SessionUpdate) -> bool {
        match update {
            SessionUpdate::State(state) => {
                let ended = state.is_terminal();
                match &state {
                    SessionState::Connecting => self.say("Connecting...", Color::GRAY),
                    SessionState::Active => self.say("Connected. Parle en français !", Color::GREEN),
                    SessionState::Error(msg) => self.say(&format!("Session error: {}", msg), Color::RED),
                    SessionState::Closed => self.say("Session closed.", Color::GRAY),
                    SessionState::Idle => {}
                }
                ended
            }
            SessionUpdate::Transcript(turn) => {
                self.print_turn(&turn);
                false
            }
            SessionUpdate::Score(score) => {
                let text = format!("Score: {}/{}", score.value, score.out_of);
                self.say(&text, Color::MAGENTA);
                false
            }
            SessionUpdate::Audio { clip, sample_rate, samples } => {
                if let Some(speaker) = self.speaker.as_mut() {
                    speaker.play(&clip, sample_rate, &samples);
                }
                self.recording.play(&clip, sample_rate, &samples);
                false
            }
            SessionUpdate::Interrupted { at, cleared } => {
                let flushed = self.speaker.as_mut().map_or(0, |speaker| speaker.interrupt(at));
                let cut = self.recording.interrupt(at);
                log::debug!(
                    "Coach interrupted at {:.2}s: {} clips cleared, {} flushed, {} cut from recording",
                    at,
                    cleared,
                    flushed,
                    cut
                );
                false
            }
        }
    }

    /// Let queued reply audio finish, up to `timeout`
    fn drain(&self, timeout: Duration) {
        let Some(speaker) = self.speaker.as_ref() else {
            return;
        };
        let deadline = Instant::now() + timeout;
        while speaker.is_playing() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }
    }

    fn print_turn(&mut self, turn: &Turn) {
        if self.quiet {
            return;
        }
        let printed = match self.open_turn {
            Some((speaker, len)) if speaker == turn.speaker && len <= turn.text.len() => len,
            _ => {
                let label = match turn.speaker {
                    Speaker::Learner => paint("You:", Color::CYAN, self.use_color),
                    Speaker::Coach => paint("Coach:", Color::YELLOW, self.use_color),
                };
                print!("\n{} ", label);
                0
            }
        };
        print!("{}", turn.text.get(printed..).unwrap_or_default());
        std::io::Write::flush(&mut std::io::stdout()).ok();
        self.open_turn = Some((turn.speaker, turn.text.len()));
    }

    fn say(&mut self, text: &str, code: &str) {
        if self.quiet {
            return;
        }
        if self.open_turn.take().is_some() {
            println!();
        }
        println!("{}", paint(text, code, self.use_color));
    }
}

pub fn run(app: &App, options: SpeakOptions, format: &OutputFormat, use_color: bool) -> Result<()> {
    let topic = match options.topic.as_deref() {
        Some(name) => Some(app.find_topic(name)?),
        None => None,
    };
    let config = app.ctx.session_config(options.mode, topic);
    let microphone = microphone(options.wav)?;
    let connector = Arc::new(app.ctx.live_connector());

    let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::default());
    let (mut session, mut updates) = SpeakingSession::new(connector, microphone, clock.clone());
    let mut printer = LivePrinter::new(
        use_color,
        matches!(format, OutputFormat::Json),
        speaker(clock.as_ref(), options.mute),
    );

    let seconds = options.seconds;
    let outcome = app.runtime.block_on(async {
        session.start(config).await?;

        // The deadline timer belongs to the session and is cancelled with it
        let (deadline_tx, mut deadline_rx) = oneshot::channel::<()>();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(seconds)).await;
            let _ = deadline_tx.send(());
        });
        session.attach(Box::new(TaskGuard::new("session deadline", timer)));

        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Some(update) => {
                        if printer.handle(update) {
                            break;
                        }
                    }
                    None => break,
                },
                _ = &mut deadline_rx => {
                    log::info!("Session time is up");
                    break;
                }
                _ = tokio::signal::ctrl_c() => return Ok(true),
            }
        }
        Ok::<bool, lumiere_lib::speaking::SessionError>(false)
    });

    session.stop();
    while let Ok(update) = updates.try_recv() {
        printer.handle(update);
    }
    let cancelled = outcome.context("Speaking session failed")?;
    if !cancelled {
        printer.drain(DRAIN_TIMEOUT);
    }
    // Stops the output device
    printer.speaker = None;

    let scores = session.scores();
    let points = scores.points();
    let label = match topic {
        Some(topic) => format!("{}:{}", options.mode.label(), topic.id),
        None => options.mode.label().to_string(),
    };
    let state = app
        .ctx
        .progress
        .dispatch(ProgressAction::record(Category::Speaking, label, points));

    if let (Some(path), Some(sample_rate)) =
        (options.record.as_deref(), printer.recording.sample_rate())
    {
        let clip = CachedClip {
            text: String::new(),
            sample_rate,
            samples: printer.recording.samples(),
        };
        write_wav(&clip, path).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "mode": options.mode.label(),
                "topic": topic.map(|t| t.id),
                "transcript": session.transcript(),
                "scores": scores.scores(),
                "averagePercent": scores.average_percent(),
                "points": points,
                "stars": state.stars,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!();
            if let Some(average) = scores.average_percent() {
                println!("Average pronunciation score: {}%", average);
            }
            println!("You earned {} stars ({} in total).", points, state.stars);
            if let Some(path) = options.record.as_deref() {
                if printer.recording.sample_rate().is_some() {
                    println!("Coach audio saved to {}", path.display());
                } else {
                    println!("{}", paint("No coach audio to save.", Color::GRAY, use_color));
                }
            }
        }
    }

    if let SessionState::Error(msg) = session.state() {
        bail!("Speaking session ended with an error: {}", msg);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumiere_lib::speaking::ScheduledClip;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Calls {
        played: Vec<u64>,
        interrupted_at: Vec<f64>,
    }

    struct FakeSpeaker(Arc<Mutex<Calls>>);

    impl ReplySink for FakeSpeaker {
        fn play(&mut self, clip: &ScheduledClip, _sample_rate: u32, _samples: &[i16]) {
            self.0.lock().unwrap().played.push(clip.id);
        }

        fn interrupt(&mut self, at: f64) -> usize {
            let mut calls = self.0.lock().unwrap();
            calls.interrupted_at.push(at);
            calls.played.len()
        }
    }

    fn audio(id: u64, start: f64) -> SessionUpdate {
        SessionUpdate::Audio {
            clip: ScheduledClip { id, start, duration: 1.0 },
            sample_rate: 10,
            samples: vec![100; 10],
        }
    }

    #[test]
    fn test_audio_goes_to_speaker_and_interrupt_flushes_it() {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let mut printer = LivePrinter::new(false, true, Some(Box::new(FakeSpeaker(calls.clone()))));

        assert!(!printer.handle(audio(0, 0.0)));
        assert!(!printer.handle(audio(1, 1.0)));
        assert!(!printer.handle(SessionUpdate::Interrupted { at: 0.5, cleared: 2 }));

        let calls = calls.lock().unwrap();
        assert_eq!(calls.played, vec![0, 1]);
        assert_eq!(calls.interrupted_at, vec![0.5]);
    }

    #[test]
    fn test_recording_keeps_only_audio_heard_before_interrupt() {
        let mut printer = LivePrinter::new(false, true, None);
        printer.handle(audio(0, 0.0));
        printer.handle(audio(1, 1.0));
        printer.handle(SessionUpdate::Interrupted { at: 0.5, cleared: 2 });
        assert_eq!(printer.recording.samples().len(), 15);

        // Replies after the interruption are kept again
        printer.handle(audio(2, 0.5));
        assert_eq!(printer.recording.sample_rate(), Some(10));
        assert_eq!(printer.recording.samples().len(), 25);
    }

    #[test]
    fn test_terminal_state_ends_loop() {
        let mut printer = LivePrinter::new(false, true, None);
        assert!(!printer.handle(SessionUpdate::State(SessionState::Active)));
        assert!(printer.handle(SessionUpdate::State(SessionState::Closed)));
    }
}
