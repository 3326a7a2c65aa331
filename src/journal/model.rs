use serde::{Deserialize, Serialize};

use crate::storage::JournalRow;

#[derive(Debug, Deserialize)]
pub struct JournalEntryRequest {
    pub content: String,
    pub mood_emoji: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JournalEntry {
    pub id: i64,
    pub content: String,
    pub mood_emoji: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<JournalRow> for JournalEntry {
    fn from(row: JournalRow) -> Self {
        Self {
            id: row.id,
            content: row.content,
            mood_emoji: row.mood_emoji,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_serializes_without_user_id() {
        let entry = JournalEntry::from(JournalRow {
            id: 3,
            user_id: "u1".into(),
            content: "slept well".into(),
            mood_emoji: Some("😊".into()),
            created_at: "2026-08-20T10:00:00+00:00".into(),
            updated_at: "2026-08-20T10:00:00+00:00".into(),
        });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], 3);
        assert!(json.get("user_id").is_none());
    }
}
