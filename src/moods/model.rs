use serde::{Deserialize, Serialize};

use crate::storage::MoodRow;

#[derive(Debug, Deserialize)]
pub struct LogMoodRequest {
    /// Free-form mood word, e.g. "anxious", "calm", "happy".
    pub mood: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoodEntry {
    pub id: i64,
    pub mood: String,
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<MoodRow> for MoodEntry {
    fn from(row: MoodRow) -> Self {
        Self {
            id: row.id,
            mood: row.mood,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}
