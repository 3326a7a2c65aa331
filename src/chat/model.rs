use serde::{Deserialize, Serialize};

use crate::storage::ChatMessageRow;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: i64,
    pub message_text: String,
    /// "user" | "assistant"
    pub message_type: String,
    pub created_at: String,
}

impl From<ChatMessageRow> for ChatMessage {
    fn from(row: ChatMessageRow) -> Self {
        Self {
            id: row.id,
            message_text: row.message_text,
            message_type: row.message_type,
            created_at: row.created_at,
        }
    }
}
