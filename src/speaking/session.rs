//! Speaking session state machine
//!
//! ```text
//! Idle ──start──▶ Connecting ──setupComplete──▶ Active ──stop/hidden/drop──▶ Closed
//!                     │                           │
//!                     └──mic or connect failure──▶ Error ◀──transport failure
//! ```
//!
//! Everything the session holds (microphone, connection, pump tasks and any
//! render loop the host attaches) lives in one [`ResourceScope`].

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;

use super::events::{ClientMessage, ServerEvent, SetupConfig};
use super::microphone::{MicrophoneError, MicrophoneSource};
use super::mode::SessionMode;
use super::pcm::{
    decode_pcm16_le, duration_secs, encode_microphone_frame, Resampler, LIVE_INPUT_SAMPLE_RATE,
};
use super::playback::{PlaybackScheduler, ScheduledClip};
use super::resources::{Releasable, ResourceScope, TaskGuard};
use super::transcript::{parse_scores, PronunciationScore, ScoreCard, Speaker, Transcript, Turn};
use super::transport::{LiveConnector, LiveInbound};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "state", content = "reason")]
pub enum SessionState {
    Idle,
    Connecting,
    Active,
    Closed,
    Error(String),
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Closed | SessionState::Error(_))
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Microphone error: {0}")]
    Microphone(#[from] MicrophoneError),

    #[error("Could not open live session: {0}")]
    Connect(String),

    #[error("Session cannot start from state {0:?}")]
    InvalidState(SessionState),

    #[error("Session is not active")]
    NotActive,
}

/// Change notifications for the front end
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    State(SessionState),
    Transcript(Turn),
    Score(PronunciationScore),
    /// A reply clip scheduled for playback
    Audio {
        clip: ScheduledClip,
        sample_rate: u32,
        samples: Vec<i16>,
    },
    /// The coach was cut off at `at`; queued reply audio should be dropped
    Interrupted { at: f64, cleared: usize },
}

/// Seconds since some fixed point, used for playback scheduling
pub trait Clock: Send + Sync {
    fn now(&self) -> f64;
}

pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub mode: SessionMode,
    pub model: String,
    pub voice: String,
    pub learner_name: Option<String>,
    /// Headwords of the topic to practise, if any
    pub focus_words: Vec<String>,
}

impl SessionConfig {
    fn setup(&self) -> SetupConfig {
        SetupConfig {
            model: self.model.clone(),
            voice: self.voice.clone(),
            system_instruction: self
                .mode
                .system_instruction(self.learner_name.as_deref(), &self.focus_words),
        }
    }
}

/// State shared with the pump tasks. Locked only for short updates.
struct Shared {
    state: SessionState,
    transcript: Transcript,
    scores: ScoreCard,
    playback: PlaybackScheduler,
}

struct Inner {
    shared: Mutex<Shared>,
    scope: Mutex<ResourceScope>,
    updates: mpsc::UnboundedSender<SessionUpdate>,
    clock: Arc<dyn Clock>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Inner {
    fn state(&self) -> SessionState {
        lock(&self.shared).state.clone()
    }

    fn set_state(&self, state: SessionState) {
        {
            let mut shared = lock(&self.shared);
            if shared.state == state {
                return;
            }
            log::info!("Speaking session {:?} -> {:?}", shared.state, state);
            shared.state = state.clone();
        }
        let _ = self.updates.send(SessionUpdate::State(state));
    }

    /// Release every resource and settle in a terminal state. An earlier
    /// error is kept.
    fn shutdown(&self, terminal: SessionState) {
        lock(&self.scope).close();
        // A coach reply still streaming counts once the session ends
        self.score_closed_turns(true);
        if !self.state().is_terminal() {
            self.set_state(terminal);
        }
    }

    /// Record the scores of coach turns that have closed. With
    /// `close_open` the open turn is closed first.
    fn score_closed_turns(&self, close_open: bool) {
        let scores: Vec<PronunciationScore> = {
            let mut shared = lock(&self.shared);
            let closed = if close_open {
                shared.transcript.complete_turn()
            } else {
                shared.transcript.take_closed_coach_turns()
            };
            let scores: Vec<PronunciationScore> =
                closed.iter().flat_map(|turn| parse_scores(&turn.text)).collect();
            for score in &scores {
                shared.scores.record(*score);
            }
            scores
        };
        for score in scores {
            let _ = self.updates.send(SessionUpdate::Score(score));
        }
    }

    fn handle_event(&self, event: ServerEvent) {
        match event {
            ServerEvent::SetupComplete => {
                if self.state() == SessionState::Connecting {
                    self.set_state(SessionState::Active);
                }
            }
            ServerEvent::Audio { sample_rate, pcm } => {
                let samples = decode_pcm16_le(&pcm);
                if samples.is_empty() {
                    return;
                }
                let duration = duration_secs(samples.len(), sample_rate);
                let clip = lock(&self.shared)
                    .playback
                    .schedule(self.clock.now(), duration);
                let _ = self.updates.send(SessionUpdate::Audio {
                    clip,
                    sample_rate,
                    samples,
                });
            }
            ServerEvent::InputTranscript(text) => {
                let turn = lock(&self.shared)
                    .transcript
                    .append(Speaker::Learner, &text)
                    .clone();
                let _ = self.updates.send(SessionUpdate::Transcript(turn));
                self.score_closed_turns(false);
            }
            ServerEvent::OutputTranscript(text) => {
                let turn = lock(&self.shared)
                    .transcript
                    .append(Speaker::Coach, &text)
                    .clone();
                let _ = self.updates.send(SessionUpdate::Transcript(turn));
            }
            ServerEvent::TurnComplete => self.score_closed_turns(true),
            ServerEvent::Interrupted => {
                let at = self.clock.now();
                let cleared = lock(&self.shared).playback.interrupt(at);
                let _ = self.updates.send(SessionUpdate::Interrupted { at, cleared });
            }
            ServerEvent::GoAway { time_left } => {
                log::warn!("Live server is closing the session soon ({:?})", time_left);
            }
        }
    }
}

pub struct SpeakingSession {
    inner: Arc<Inner>,
    connector: Arc<dyn LiveConnector>,
    microphone: Arc<dyn MicrophoneSource>,
    outbound: Option<mpsc::Sender<ClientMessage>>,
}

impl SpeakingSession {
    pub fn new(
        connector: Arc<dyn LiveConnector>,
        microphone: Arc<dyn MicrophoneSource>,
        clock: Arc<dyn Clock>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionUpdate>) {
        let (updates, receiver) = mpsc::unbounded_channel();
        let inner = Arc::new(Inner {
            shared: Mutex::new(Shared {
                state: SessionState::Idle,
                transcript: Transcript::new(),
                scores: ScoreCard::default(),
                playback: PlaybackScheduler::new(),
            }),
            scope: Mutex::new(ResourceScope::new()),
            updates,
            clock,
        });
        let session = Self {
            inner,
            connector,
            microphone,
            outbound: None,
        };
        (session, receiver)
    }

    pub fn state(&self) -> SessionState {
        self.inner.state()
    }

    pub fn transcript(&self) -> Vec<Turn> {
        lock(&self.inner.shared).transcript.turns().to_vec()
    }

    pub fn scores(&self) -> ScoreCard {
        lock(&self.inner.shared).scores.clone()
    }

    /// Acquire the microphone, open the connection and start the pumps.
    /// The session becomes active once the server confirms the setup.
    pub async fn start(&mut self, config: SessionConfig) -> Result<(), SessionError> {
        let state = self.state();
        if state != SessionState::Idle {
            return Err(SessionError::InvalidState(state));
        }
        self.inner.set_state(SessionState::Connecting);

        let capture = match self.microphone.open() {
            Ok(capture) => capture,
            Err(e) => {
                log::error!("Could not open microphone: {}", e);
                self.inner.shutdown(SessionState::Error(e.to_string()));
                return Err(SessionError::Microphone(e));
            }
        };
        lock(&self.inner.scope).push(capture.stream);

        let channel = match self.connector.connect(config.setup()).await {
            Ok(channel) => channel,
            Err(e) => {
                log::error!("Could not open live session: {}", e);
                self.inner.shutdown(SessionState::Error(e.clone()));
                return Err(SessionError::Connect(e));
            }
        };

        // stop() may have run while connecting
        if self.state().is_terminal() {
            let mut guard = channel.guard;
            guard.release();
            return Err(SessionError::NotActive);
        }
        lock(&self.inner.scope).push(channel.guard);

        let uplink = tokio::spawn(run_uplink(
            self.inner.clone(),
            capture.frames,
            capture.sample_rate,
            channel.outbound.clone(),
        ));
        let downlink = tokio::spawn(run_downlink(self.inner.clone(), channel.inbound));
        {
            let mut scope = lock(&self.inner.scope);
            scope.push(Box::new(TaskGuard::new("uplink", uplink)));
            scope.push(Box::new(TaskGuard::new("downlink", downlink)));
        }

        self.outbound = Some(channel.outbound);
        Ok(())
    }

    /// Hand a host-side loop (rendering, level polling) to the session so it
    /// is cancelled together with everything else
    pub fn attach(&self, resource: Box<dyn Releasable>) {
        lock(&self.inner.scope).push(resource);
    }

    /// Send a typed turn
    pub async fn send_text(&self, text: &str) -> Result<(), SessionError> {
        if self.state() != SessionState::Active {
            return Err(SessionError::NotActive);
        }
        let outbound = self.outbound.as_ref().ok_or(SessionError::NotActive)?;
        outbound
            .send(ClientMessage::Text(text.to_string()))
            .await
            .map_err(|_| SessionError::NotActive)
    }

    /// The host view was hidden or shown. Hiding ends the session.
    pub fn on_visibility_change(&mut self, visible: bool) {
        if !visible && !self.state().is_terminal() && self.state() != SessionState::Idle {
            log::info!("View hidden, stopping speaking session");
            self.stop();
        }
    }

    /// Release every held resource and close. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.outbound = None;
        self.inner.shutdown(SessionState::Closed);
    }
}

impl Drop for SpeakingSession {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_uplink(
    inner: Arc<Inner>,
    mut frames: mpsc::Receiver<Vec<f32>>,
    sample_rate: u32,
    outbound: mpsc::Sender<ClientMessage>,
) {
    let mut resampler = Resampler::new(sample_rate, LIVE_INPUT_SAMPLE_RATE);
    while let Some(frame) = frames.recv().await {
        // Audio captured before the server is ready is dropped
        if inner.state() != SessionState::Active {
            continue;
        }
        let data = encode_microphone_frame(&frame, &mut resampler);
        if outbound.send(ClientMessage::Audio(data)).await.is_err() {
            return;
        }
    }
    let _ = outbound.send(ClientMessage::AudioStreamEnd).await;
}

async fn run_downlink(inner: Arc<Inner>, mut inbound: mpsc::Receiver<LiveInbound>) {
    while let Some(message) = inbound.recv().await {
        match message {
            LiveInbound::Event(event) => inner.handle_event(event),
            LiveInbound::Closed { reason } => {
                log::info!("Live session closed by server: {:?}", reason);
                inner.shutdown(SessionState::Closed);
                return;
            }
            LiveInbound::Error(e) => {
                log::error!("Live session failed: {}", e);
                inner.shutdown(SessionState::Error(e));
                return;
            }
        }
    }
    inner.shutdown(SessionState::Error("connection lost".to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speaking::microphone::MicrophoneCapture;
    use crate::speaking::resources::OnRelease;
    use crate::speaking::transport::LiveChannel;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    // ===== Test doubles =====

    fn counting_guard(name: &'static str, counter: &Arc<AtomicUsize>) -> Box<dyn Releasable> {
        let counter = counter.clone();
        Box::new(OnRelease::new(name, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
    }

    struct MockMicrophone {
        released: Arc<AtomicUsize>,
        frames: Mutex<Option<mpsc::Sender<Vec<f32>>>>,
        fail: bool,
    }

    impl MockMicrophone {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                released: Arc::new(AtomicUsize::new(0)),
                frames: Mutex::new(None),
                fail,
            })
        }

        fn sender(&self) -> mpsc::Sender<Vec<f32>> {
            self.frames.lock().unwrap().clone().unwrap()
        }
    }

    impl MicrophoneSource for MockMicrophone {
        fn open(&self) -> Result<MicrophoneCapture, MicrophoneError> {
            if self.fail {
                return Err(MicrophoneError::PermissionDenied("user said no".to_string()));
            }
            let (tx, rx) = mpsc::channel(16);
            *self.frames.lock().unwrap() = Some(tx);
            Ok(MicrophoneCapture {
                sample_rate: 16_000,
                frames: rx,
                stream: counting_guard("mock microphone", &self.released),
            })
        }
    }

    struct MockConnector {
        released: Arc<AtomicUsize>,
        calls: AtomicUsize,
        setups: Mutex<Vec<SetupConfig>>,
        server: Mutex<Option<(mpsc::Sender<LiveInbound>, mpsc::Receiver<ClientMessage>)>>,
    }

    impl MockConnector {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                released: Arc::new(AtomicUsize::new(0)),
                calls: AtomicUsize::new(0),
                setups: Mutex::new(Vec::new()),
                server: Mutex::new(None),
            })
        }

        fn server_side(&self) -> (mpsc::Sender<LiveInbound>, mpsc::Receiver<ClientMessage>) {
            self.server.lock().unwrap().take().unwrap()
        }
    }

    #[async_trait]
    impl LiveConnector for MockConnector {
        async fn connect(&self, setup: SetupConfig) -> Result<LiveChannel, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.setups.lock().unwrap().push(setup);
            let (out_tx, out_rx) = mpsc::channel(16);
            let (in_tx, in_rx) = mpsc::channel(16);
            *self.server.lock().unwrap() = Some((in_tx, out_rx));
            Ok(LiveChannel {
                outbound: out_tx,
                inbound: in_rx,
                guard: counting_guard("mock connection", &self.released),
            })
        }
    }

    struct FixedClock(Mutex<f64>);

    impl Clock for FixedClock {
        fn now(&self) -> f64 {
            *self.0.lock().unwrap()
        }
    }

    fn config(mode: SessionMode) -> SessionConfig {
        SessionConfig {
            mode,
            model: "live-model".to_string(),
            voice: "Puck".to_string(),
            learner_name: Some("Léa".to_string()),
            focus_words: vec!["le chat".to_string()],
        }
    }

    async fn wait_for(
        updates: &mut mpsc::UnboundedReceiver<SessionUpdate>,
        predicate: impl Fn(&SessionUpdate) -> bool,
    ) -> SessionUpdate {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let update = updates.recv().await.expect("update channel closed");
                if predicate(&update) {
                    return update;
                }
            }
        })
        .await
        .expect("timed out waiting for update")
    }

    async fn active_session() -> (
        SpeakingSession,
        mpsc::UnboundedReceiver<SessionUpdate>,
        Arc<MockMicrophone>,
        Arc<MockConnector>,
        mpsc::Sender<LiveInbound>,
        mpsc::Receiver<ClientMessage>,
    ) {
        let microphone = MockMicrophone::new(false);
        let connector = MockConnector::new();
        let (mut session, mut updates) = SpeakingSession::new(
            connector.clone(),
            microphone.clone(),
            Arc::new(FixedClock(Mutex::new(10.0))),
        );
        session.start(config(SessionMode::Pronunciation)).await.unwrap();
        assert_eq!(session.state(), SessionState::Connecting);

        let (server_tx, client_rx) = connector.server_side();
        server_tx
            .send(LiveInbound::Event(ServerEvent::SetupComplete))
            .await
            .unwrap();
        wait_for(&mut updates, |u| *u == SessionUpdate::State(SessionState::Active)).await;
        (session, updates, microphone, connector, server_tx, client_rx)
    }

    // ===== Tests =====

    #[tokio::test]
    async fn test_stop_releases_microphone_and_loop_once() {
        let (mut session, _updates, microphone, connector, _server, _client) =
            active_session().await;

        let loop_released = Arc::new(AtomicUsize::new(0));
        session.attach(counting_guard("animation loop", &loop_released));

        session.stop();
        assert_eq!(session.state(), SessionState::Closed);
        session.stop();
        session.on_visibility_change(false);
        drop(session);

        assert_eq!(microphone.released.load(Ordering::SeqCst), 1);
        assert_eq!(loop_released.load(Ordering::SeqCst), 1);
        assert_eq!(connector.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_microphone_failure_is_typed_error() {
        let microphone = MockMicrophone::new(true);
        let connector = MockConnector::new();
        let (mut session, _updates) = SpeakingSession::new(
            connector.clone(),
            microphone,
            Arc::new(MonotonicClock::default()),
        );

        let result = session.start(config(SessionMode::Conversation)).await;
        assert!(matches!(
            result,
            Err(SessionError::Microphone(MicrophoneError::PermissionDenied(_)))
        ));
        assert!(matches!(session.state(), SessionState::Error(_)));
        assert_eq!(connector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_setup_carries_mode_instruction() {
        let (_session, _updates, _mic, connector, _server, _client) = active_session().await;
        let setups = connector.setups.lock().unwrap();
        assert_eq!(setups[0].model, "live-model");
        assert!(setups[0].system_instruction.contains("n/10"));
        assert!(setups[0].system_instruction.contains("le chat"));
    }

    #[tokio::test]
    async fn test_microphone_frames_sent_when_active() {
        let (mut session, _updates, microphone, _connector, _server, mut client) =
            active_session().await;

        microphone.sender().send(vec![0.0; 1_600]).await.unwrap();
        let message = tokio::time::timeout(Duration::from_secs(5), client.recv())
            .await
            .unwrap()
            .unwrap();
        match message {
            ClientMessage::Audio(data) => assert!(!data.is_empty()),
            other => panic!("expected audio, got {:?}", other),
        }
        session.stop();
    }

    #[tokio::test]
    async fn test_transcript_and_scores() {
        let (session, mut updates, _mic, _connector, server, _client) = active_session().await;

        for event in [
            ServerEvent::InputTranscript("le chat".to_string()),
            ServerEvent::OutputTranscript("Bravo ! ".to_string()),
            ServerEvent::OutputTranscript("9/10".to_string()),
            ServerEvent::TurnComplete,
        ] {
            server.send(LiveInbound::Event(event)).await.unwrap();
        }

        let score = wait_for(&mut updates, |u| matches!(u, SessionUpdate::Score(_))).await;
        assert_eq!(
            score,
            SessionUpdate::Score(PronunciationScore { value: 9, out_of: 10 })
        );

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].text, "Bravo ! 9/10");
        assert!(transcript.iter().all(|t| t.complete));
        assert_eq!(session.scores().average_percent(), Some(90));
    }

    #[tokio::test]
    async fn test_score_kept_when_learner_speaks_before_turn_complete() {
        let (session, mut updates, _mic, _connector, server, _client) = active_session().await;

        for event in [
            ServerEvent::OutputTranscript("Très bien ! 8/10".to_string()),
            ServerEvent::InputTranscript("le chat".to_string()),
            ServerEvent::TurnComplete,
        ] {
            server.send(LiveInbound::Event(event)).await.unwrap();
        }

        let score = wait_for(&mut updates, |u| matches!(u, SessionUpdate::Score(_))).await;
        assert_eq!(
            score,
            SessionUpdate::Score(PronunciationScore { value: 8, out_of: 10 })
        );

        // TurnComplete must not score the same coach turn twice
        server
            .send(LiveInbound::Event(ServerEvent::OutputTranscript("Encore !".to_string())))
            .await
            .unwrap();
        wait_for(&mut updates, |u| {
            matches!(u, SessionUpdate::Transcript(t) if t.text == "Encore !")
        })
        .await;

        let scores = session.scores();
        assert_eq!(scores.scores().len(), 1);
        assert_eq!(scores.points(), 8);
    }

    #[tokio::test]
    async fn test_stop_scores_open_coach_turn() {
        let (mut session, mut updates, _mic, _connector, server, _client) =
            active_session().await;

        server
            .send(LiveInbound::Event(ServerEvent::OutputTranscript("Bravo, 4/5".to_string())))
            .await
            .unwrap();
        wait_for(&mut updates, |u| matches!(u, SessionUpdate::Transcript(_))).await;

        session.stop();
        assert_eq!(session.scores().average_percent(), Some(80));
        assert!(session.transcript().iter().all(|t| t.complete));
    }

    #[tokio::test]
    async fn test_audio_scheduled_back_to_back_and_interrupt_clears() {
        let (_session, mut updates, _mic, _connector, server, _client) = active_session().await;
        let half_second = vec![0u8; 24_000];

        for _ in 0..2 {
            server
                .send(LiveInbound::Event(ServerEvent::Audio {
                    sample_rate: 24_000,
                    pcm: half_second.clone(),
                }))
                .await
                .unwrap();
        }
        server
            .send(LiveInbound::Event(ServerEvent::Interrupted))
            .await
            .unwrap();

        let first = wait_for(&mut updates, |u| matches!(u, SessionUpdate::Audio { .. })).await;
        let second = wait_for(&mut updates, |u| matches!(u, SessionUpdate::Audio { .. })).await;
        match (first, second) {
            (SessionUpdate::Audio { clip: a, .. }, SessionUpdate::Audio { clip: b, .. }) => {
                assert_eq!(a.start, 10.0);
                assert_eq!(b.start, a.end());
            }
            _ => unreachable!(),
        }

        let interrupted =
            wait_for(&mut updates, |u| matches!(u, SessionUpdate::Interrupted { .. })).await;
        assert_eq!(interrupted, SessionUpdate::Interrupted { at: 10.0, cleared: 2 });
    }

    #[tokio::test]
    async fn test_transport_failure_moves_to_error_and_releases() {
        let (session, mut updates, microphone, connector, server, _client) =
            active_session().await;

        server
            .send(LiveInbound::Error("socket reset".to_string()))
            .await
            .unwrap();
        wait_for(&mut updates, |u| matches!(u, SessionUpdate::State(SessionState::Error(_)))).await;

        assert_eq!(session.state(), SessionState::Error("socket reset".to_string()));
        drop(session);
        assert_eq!(microphone.released.load(Ordering::SeqCst), 1);
        assert_eq!(connector.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hidden_view_closes_session() {
        let (mut session, _updates, microphone, _connector, _server, _client) =
            active_session().await;
        session.on_visibility_change(true);
        assert_eq!(session.state(), SessionState::Active);

        session.on_visibility_change(false);
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(microphone.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cannot_restart_closed_session() {
        let (mut session, _updates, _mic, _connector, _server, _client) = active_session().await;
        session.stop();
        let result = session.start(config(SessionMode::Conversation)).await;
        assert!(matches!(result, Err(SessionError::InvalidState(SessionState::Closed))));
    }
}
