//! Learning progress: history log, stars, mastery and dashboard aggregates

pub mod aggregate;
pub mod analysis;
pub mod mastery;
pub mod models;
pub mod store;

pub use aggregate::{summarize, DashboardSummary, TopicMastery};
pub use analysis::{generate_report, ParentReport};
pub use mastery::{mastery_percent, MASTERY_THRESHOLD};
pub use models::HistoryEntry;
pub use store::{
    reduce, ActivityRecord, KvPersistence, ProgressAction, ProgressState, ProgressStore,
    ProgressSubscriber,
};
