// rest routes: POST /api/v1/moods, GET /api/v1/moods

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::rest::auth::AuthedUser;
use crate::rest::internal_error;
use crate::AppContext;

use super::model::{LogMoodRequest, MoodEntry};

pub async fn log_mood(
    State(ctx): State<Arc<AppContext>>,
    AuthedUser(user_id): AuthedUser,
    Json(body): Json<LogMoodRequest>,
) -> Result<Json<MoodEntry>, (StatusCode, Json<Value>)> {
    let mood = body.mood.trim();
    if mood.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "mood cannot be empty" })),
        ));
    }

    let row = ctx
        .storage
        .create_mood(&user_id, mood, body.notes.as_deref())
        .await
        .map_err(internal_error)?;
    Ok(Json(MoodEntry::from(row)))
}

pub async fn list_moods(
    State(ctx): State<Arc<AppContext>>,
    AuthedUser(user_id): AuthedUser,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let rows = ctx
        .storage
        .list_moods(&user_id)
        .await
        .map_err(internal_error)?;
    let moods: Vec<MoodEntry> = rows.into_iter().map(MoodEntry::from).collect();
    Ok(Json(json!({ "moods": moods })))
}
