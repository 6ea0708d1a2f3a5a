//! Application store for stars and history
//!
//! State only changes through [`ProgressStore::dispatch`]: the pure
//! [`reduce`] function computes the next state, then subscribers are told.
//! Persistence is one such subscriber.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::aggregate::points_by_topic;
use super::mastery::mastery_percent;
use super::models::HistoryEntry;
use crate::content::Category;
use crate::storage::{KvStore, StorageError};

const STARS_KEY: &str = "progress.stars";
const HISTORY_KEY: &str = "progress.history";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    pub stars: u32,
    pub history: Vec<HistoryEntry>,
}

/// A finished activity, stamped when the action is created so the reducer
/// stays pure
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub category: Category,
    pub topic: String,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressAction {
    RecordActivity(ActivityRecord),
    /// Replace the state with previously persisted data
    Hydrate(ProgressState),
}

impl ProgressAction {
    pub fn record(category: Category, topic: impl Into<String>, points: u32) -> Self {
        ProgressAction::RecordActivity(ActivityRecord {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            category,
            topic: topic.into(),
            points,
        })
    }
}

/// Next state for an action. Entries are only ever appended.
pub fn reduce(mut state: ProgressState, action: &ProgressAction) -> ProgressState {
    match action {
        ProgressAction::RecordActivity(record) => {
            let topic_points = points_by_topic(&state.history)
                .get(&record.topic)
                .copied()
                .unwrap_or(0)
                .saturating_add(record.points);

            state.stars = state.stars.saturating_add(record.points);
            state.history.push(HistoryEntry {
                id: record.id,
                timestamp: record.timestamp,
                category: record.category,
                topic: record.topic.clone(),
                points: record.points,
                mastery: mastery_percent(topic_points),
            });
            state
        }
        ProgressAction::Hydrate(loaded) => loaded.clone(),
    }
}

pub trait ProgressSubscriber: Send + Sync {
    fn on_change(&self, state: &ProgressState, action: &ProgressAction);
}

pub struct ProgressStore {
    state: Mutex<ProgressState>,
    subscribers: Mutex<Vec<Arc<dyn ProgressSubscriber>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ProgressState::default()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Store hydrated from the key-value store and persisting back to it
    pub fn open(kv: Arc<KvStore>) -> Self {
        let persistence = Arc::new(KvPersistence::new(kv));
        let store = Self::new();
        store.dispatch(ProgressAction::Hydrate(persistence.load()));
        store.subscribe(persistence);
        store
    }

    pub fn subscribe(&self, subscriber: Arc<dyn ProgressSubscriber>) {
        lock(&self.subscribers).push(subscriber);
    }

    pub fn state(&self) -> ProgressState {
        lock(&self.state).clone()
    }

    /// Apply an action and notify subscribers with the new state
    pub fn dispatch(&self, action: ProgressAction) -> ProgressState {
        let next = {
            let mut state = lock(&self.state);
            let next = reduce(std::mem::take(&mut *state), &action);
            *state = next.clone();
            next
        };

        let subscribers: Vec<Arc<dyn ProgressSubscriber>> = lock(&self.subscribers).clone();
        for subscriber in subscribers {
            subscriber.on_change(&next, &action);
        }
        next
    }
}

/// Writes stars and history to the key-value store after every change
pub struct KvPersistence {
    kv: Arc<KvStore>,
}

impl KvPersistence {
    pub fn new(kv: Arc<KvStore>) -> Self {
        Self { kv }
    }

    /// Persisted state. Unreadable values are logged and treated as empty.
    pub fn load(&self) -> ProgressState {
        let stars = match self.kv.get_json::<u32>(STARS_KEY) {
            Ok(stars) => stars.unwrap_or(0),
            Err(e) => {
                log::warn!("Ignoring unreadable stars: {}", e);
                0
            }
        };
        let history = match self.kv.get_json::<Vec<HistoryEntry>>(HISTORY_KEY) {
            Ok(history) => history.unwrap_or_default(),
            Err(e) => {
                log::warn!("Ignoring unreadable history: {}", e);
                Vec::new()
            }
        };
        ProgressState { stars, history }
    }

    fn save(&self, state: &ProgressState) -> Result<(), StorageError> {
        self.kv.set_json(STARS_KEY, &state.stars)?;
        self.kv.set_json(HISTORY_KEY, &state.history)
    }
}

impl ProgressSubscriber for KvPersistence {
    fn on_change(&self, state: &ProgressState, action: &ProgressAction) {
        if matches!(action, ProgressAction::Hydrate(_)) {
            return;
        }
        if let Err(e) = self.save(state) {
            log::error!("Failed to persist progress: {}", e);
        }
    }
}
