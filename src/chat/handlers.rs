// rest routes: POST/GET/DELETE /api/v1/chat/messages

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::rest::auth::AuthedUser;
use crate::rest::internal_error;
use crate::AppContext;

use super::model::{ChatMessage, SendMessageRequest};

/// How many messages the history endpoint returns.
const HISTORY_LIMIT: i64 = 100;

/// Persist the user message, then stream the assistant reply as a chunked
/// plain-text body. The reply itself is persisted by the streaming task
/// when the upstream stream ends.
pub async fn send_message(
    State(ctx): State<Arc<AppContext>>,
    AuthedUser(user_id): AuthedUser,
    Json(body): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let message = body.message.trim().to_string();
    if message.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "message cannot be empty" })),
        ));
    }

    ctx.storage
        .create_chat_message(&user_id, &message, "user")
        .await
        .map_err(internal_error)?;

    let (tx, rx) = mpsc::channel::<Result<Bytes, Infallible>>(32);
    tokio::spawn(super::stream_reply(ctx.clone(), user_id, message, tx));

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(ReceiverStream::new(rx)),
    ))
}

pub async fn get_history(
    State(ctx): State<Arc<AppContext>>,
    AuthedUser(user_id): AuthedUser,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let rows = ctx
        .storage
        .list_chat_messages(&user_id, HISTORY_LIMIT)
        .await
        .map_err(internal_error)?;
    let messages: Vec<ChatMessage> = rows.into_iter().map(ChatMessage::from).collect();
    Ok(Json(json!({ "messages": messages })))
}

pub async fn clear_history(
    State(ctx): State<Arc<AppContext>>,
    AuthedUser(user_id): AuthedUser,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let deleted = ctx
        .storage
        .clear_chat_messages(&user_id)
        .await
        .map_err(internal_error)?;
    Ok(Json(json!({ "deleted": deleted })))
}
