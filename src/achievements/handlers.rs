// GET /api/v1/achievements — full catalog with unlock state and progress.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;
use std::sync::Arc;

use crate::observability::LatencyTracker;
use crate::rest::auth::AuthedUser;
use crate::rest::internal_error;
use crate::AppContext;

use super::model::AchievementsResponse;
use super::store::AchievementStore;

/// Recomputes the caller's statistics, unlocks anything newly earned, and
/// returns the sorted catalog. Safe to call at any frequency; the unlock
/// write is idempotent.
pub async fn get_achievements(
    State(ctx): State<Arc<AppContext>>,
    AuthedUser(user_id): AuthedUser,
) -> Result<Json<AchievementsResponse>, (StatusCode, Json<Value>)> {
    let tracker = LatencyTracker::start("achievements.evaluate");
    let store = AchievementStore::new(ctx.storage.pool());
    let response = super::evaluate_for_user(&store, &user_id)
        .await
        .map_err(internal_error)?;
    tracker.finish();
    Ok(Json(response))
}
