use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::Category;

/// One completed activity. The history is append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub category: Category,
    /// Topic id, or a session label for speaking activities
    pub topic: String,
    pub points: u32,
    /// Topic mastery (0-100) right after this entry
    pub mastery: u8,
}
