//! Supportive AI chat: a streamed pass-through to an OpenAI-compatible
//! chat-completions API with history persistence, mood context, and a
//! crisis-resources safety net.

pub mod handlers;
pub mod model;
pub mod provider;

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Bytes;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::AppContext;

/// How much prior conversation is sent upstream with each message.
const HISTORY_WINDOW: i64 = 20;

const SYSTEM_PROMPT: &str = "You are a warm, supportive wellness companion. \
You listen without judgment, validate feelings, and gently suggest small, \
concrete self-care steps. You are not a therapist and you never diagnose, \
prescribe, or give medical advice; for anything clinical you encourage the \
person to talk to a professional. Keep replies short, kind, and practical.";

/// Streamed when the upstream model cannot be reached.
pub const FALLBACK_MESSAGE: &str = "I'm having trouble connecting right now, \
but I'm still here with you. Take a slow breath. Whatever you're feeling is \
valid, and it's okay to take things one small step at a time.";

const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "kill myself",
    "end my life",
    "want to die",
    "self-harm",
    "self harm",
    "hurt myself",
    "no reason to live",
];

pub const CRISIS_RESOURCES: &str = "\n\n---\nIt sounds like you might be \
going through something really hard right now. You deserve support from a \
real person:\n\
- 988 Suicide & Crisis Lifeline (US): call or text 988\n\
- Crisis Text Line: text HOME to 741741\n\
- Find a crisis centre worldwide: https://findahelpline.com\n\
If you are in immediate danger, please call your local emergency number.";

/// Case-insensitive substring match against the crisis keyword list.
pub fn contains_crisis_language(message: &str) -> bool {
    let lower = message.to_lowercase();
    CRISIS_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// System prompt with the user's most recent mood prepended as context.
pub fn build_system_prompt(latest_mood: Option<&str>) -> String {
    match latest_mood {
        Some(mood) => format!(
            "{SYSTEM_PROMPT}\n\nThe user most recently logged their mood as \"{mood}\"."
        ),
        None => SYSTEM_PROMPT.to_string(),
    }
}

/// Drive one assistant reply: call the upstream model, forward chunks to the
/// response channel, append crisis resources when warranted, and persist the
/// full reply. Runs in a spawned task; send failures mean the client went
/// away and only stop the forwarding, not the persistence.
pub async fn stream_reply(
    ctx: Arc<AppContext>,
    user_id: String,
    message: String,
    tx: mpsc::Sender<Result<Bytes, Infallible>>,
) {
    let crisis = contains_crisis_language(&message);
    if crisis {
        info!(user_id, "crisis language detected in chat message");
    }

    let latest_mood = match ctx.storage.latest_mood(&user_id).await {
        Ok(row) => row.map(|r| r.mood),
        Err(e) => {
            warn!(user_id, err = %e, "failed to load mood context");
            None
        }
    };
    let system_prompt = build_system_prompt(latest_mood.as_deref());

    // The just-sent user message is already persisted, so drop it from the
    // history tail to avoid sending it twice.
    let history = match ctx.storage.list_chat_messages(&user_id, HISTORY_WINDOW).await {
        Ok(mut rows) => {
            rows.pop();
            rows
        }
        Err(e) => {
            warn!(user_id, err = %e, "failed to load chat history");
            Vec::new()
        }
    };

    let mut reply = match ctx
        .chat
        .stream_completion(&system_prompt, &history, &message, &tx)
        .await
    {
        Ok(text) if !text.is_empty() => text,
        Ok(_) => {
            let _ = tx.send(Ok(Bytes::from_static(FALLBACK_MESSAGE.as_bytes()))).await;
            FALLBACK_MESSAGE.to_string()
        }
        Err(e) => {
            warn!(user_id, err = %e, "upstream chat completion failed");
            let _ = tx.send(Ok(Bytes::from_static(FALLBACK_MESSAGE.as_bytes()))).await;
            FALLBACK_MESSAGE.to_string()
        }
    };

    if crisis {
        let _ = tx.send(Ok(Bytes::from_static(CRISIS_RESOURCES.as_bytes()))).await;
        reply.push_str(CRISIS_RESOURCES);
    }

    if let Err(e) = ctx
        .storage
        .create_chat_message(&user_id, &reply, "assistant")
        .await
    {
        warn!(user_id, err = %e, "failed to persist assistant reply");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crisis_detection_is_case_insensitive() {
        assert!(contains_crisis_language("I want to KILL MYSELF"));
        assert!(contains_crisis_language("thinking about self-harm again"));
        assert!(!contains_crisis_language("this deadline is killing me... jk"));
        assert!(!contains_crisis_language("I had a rough day"));
    }

    #[test]
    fn system_prompt_includes_mood_when_known() {
        let with_mood = build_system_prompt(Some("anxious"));
        assert!(with_mood.contains("anxious"));
        assert_eq!(build_system_prompt(None), SYSTEM_PROMPT);
    }
}
