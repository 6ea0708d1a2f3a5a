//! Lumière: service layer of a French-learning app for children
//!
//! Flashcard content, quizzes, illustrations, pronunciation clips, a live
//! speaking coach and a parent dashboard. Generation is delegated to the
//! Gemini API; this crate owns prompts, validation, caching, progress and the
//! speaking-session lifecycle.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

pub mod ai;
pub mod config;
pub mod content;
pub mod credentials;
pub mod illustration;
pub mod narration;
pub mod progress;
pub mod quiz;
pub mod speaking;
pub mod storage;

use ai::{GeminiClient, GenerativeClient, ServiceError};
use config::{AppConfig, ConfigError};
use content::{ContentCache, Seeder, Topic};
use credentials::{ApiKeyStore, KeyPrompt};
use illustration::Illustrator;
use narration::Narrator;
use progress::ProgressStore;
use quiz::QuizGenerator;
use speaking::{GeminiLiveConnector, SessionConfig, SessionMode};
use storage::{KvStore, MediaCache, StorageError};

/// Number of topic headwords handed to a speaking session
const SESSION_FOCUS_WORDS: usize = 12;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}

/// Everything a front end needs, wired from one config
pub struct AppContext {
    pub config: AppConfig,
    pub data_dir: PathBuf,
    pub kv: Arc<KvStore>,
    pub content: ContentCache,
    pub media: Arc<MediaCache>,
    pub credentials: Arc<ApiKeyStore>,
    pub client: Arc<dyn GenerativeClient>,
    pub progress: Arc<ProgressStore>,
}

impl AppContext {
    pub fn new(config: AppConfig, prompt: Option<Box<dyn KeyPrompt>>) -> Result<Self, AppError> {
        let data_dir = config.resolve_data_dir()?;
        log::debug!("Using data directory {}", data_dir.display());

        let kv = Arc::new(KvStore::new(data_dir.clone())?);
        let media = Arc::new(MediaCache::new(data_dir.clone()));

        let mut key_store = ApiKeyStore::new(data_dir.clone()).with_env();
        if let Some(prompt) = prompt {
            key_store = key_store.with_prompt(prompt);
        }
        let credentials = Arc::new(key_store);

        let client: Arc<dyn GenerativeClient> =
            Arc::new(GeminiClient::new(&config, credentials.clone())?);
        let progress = Arc::new(ProgressStore::open(kv.clone()));

        Ok(Self {
            content: ContentCache::new(kv.clone()),
            config,
            data_dir,
            kv,
            media,
            credentials,
            client,
            progress,
        })
    }

    pub fn seeder(&self) -> Seeder {
        Seeder::new(self.client.clone(), self.content.clone())
            .with_learner_name(self.config.learner_name.clone())
    }

    pub fn quiz_generator(&self) -> QuizGenerator {
        QuizGenerator::new(self.seeder())
    }

    pub fn illustrator(&self) -> Illustrator {
        Illustrator::new(self.client.clone(), self.credentials.clone(), self.media.clone())
    }

    pub fn narrator(&self) -> Narrator {
        Narrator::new(self.client.clone(), self.media.clone(), self.config.voice.clone())
    }

    pub fn live_connector(&self) -> GeminiLiveConnector {
        GeminiLiveConnector::new(self.config.live_url.clone(), self.credentials.clone())
    }

    /// Session settings for a mode, focused on a topic's cached words if given
    pub fn session_config(&self, mode: SessionMode, topic: Option<&Topic>) -> SessionConfig {
        let focus_words: Vec<String> = topic
            .map(|t| {
                self.content
                    .load(t.id)
                    .iter()
                    .filter(|item| !item.is_overview())
                    .take(SESSION_FOCUS_WORDS)
                    .map(|item| item.headword().to_string())
                    .collect()
            })
            .unwrap_or_default();

        SessionConfig {
            mode,
            model: self.config.models.live.clone(),
            voice: self.config.voice.clone(),
            learner_name: self.config.learner_name.clone(),
            focus_words,
        }
    }
}
