// rest routes: POST/GET /api/v1/journal, GET/PUT/DELETE /api/v1/journal/{id}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::rest::auth::AuthedUser;
use crate::rest::internal_error;
use crate::AppContext;

use super::model::{JournalEntry, JournalEntryRequest};

fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Journal entry not found" })),
    )
}

pub async fn create_entry(
    State(ctx): State<Arc<AppContext>>,
    AuthedUser(user_id): AuthedUser,
    Json(body): Json<JournalEntryRequest>,
) -> Result<Json<JournalEntry>, (StatusCode, Json<Value>)> {
    if body.content.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "content cannot be empty" })),
        ));
    }

    let row = ctx
        .storage
        .create_journal_entry(&user_id, &body.content, body.mood_emoji.as_deref())
        .await
        .map_err(internal_error)?;
    Ok(Json(JournalEntry::from(row)))
}

pub async fn list_entries(
    State(ctx): State<Arc<AppContext>>,
    AuthedUser(user_id): AuthedUser,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let rows = ctx
        .storage
        .list_journal_entries(&user_id)
        .await
        .map_err(internal_error)?;
    let entries: Vec<JournalEntry> = rows.into_iter().map(JournalEntry::from).collect();
    Ok(Json(json!({ "entries": entries })))
}

pub async fn get_entry(
    State(ctx): State<Arc<AppContext>>,
    AuthedUser(user_id): AuthedUser,
    Path(id): Path<i64>,
) -> Result<Json<JournalEntry>, (StatusCode, Json<Value>)> {
    match ctx
        .storage
        .get_journal_entry(&user_id, id)
        .await
        .map_err(internal_error)?
    {
        Some(row) => Ok(Json(JournalEntry::from(row))),
        None => Err(not_found()),
    }
}

pub async fn update_entry(
    State(ctx): State<Arc<AppContext>>,
    AuthedUser(user_id): AuthedUser,
    Path(id): Path<i64>,
    Json(body): Json<JournalEntryRequest>,
) -> Result<Json<JournalEntry>, (StatusCode, Json<Value>)> {
    if body.content.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "content cannot be empty" })),
        ));
    }

    match ctx
        .storage
        .update_journal_entry(&user_id, id, &body.content, body.mood_emoji.as_deref())
        .await
        .map_err(internal_error)?
    {
        Some(row) => Ok(Json(JournalEntry::from(row))),
        None => Err(not_found()),
    }
}

pub async fn delete_entry(
    State(ctx): State<Arc<AppContext>>,
    AuthedUser(user_id): AuthedUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let deleted = ctx
        .storage
        .delete_journal_entry(&user_id, id)
        .await
        .map_err(internal_error)?;
    if deleted {
        Ok(Json(json!({ "deleted": true })))
    } else {
        Err(not_found())
    }
}
