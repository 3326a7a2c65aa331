// rest routes:
//   GET  /api/v1/activities            (?category=)
//   GET  /api/v1/activities/{id}
//   POST /api/v1/activities/{id}/complete
//   POST /api/v1/activities/{id}/favorite
//   GET  /api/v1/recommendations       (?mood=)
//   GET  /api/v1/progress

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::rest::auth::AuthedUser;
use crate::rest::internal_error;
use crate::storage::ProgressRow;
use crate::AppContext;

use super::model::{Activity, CompleteActivityRequest, RecentCompletion, UserProgress};

const RECOMMENDATION_LIMIT: i64 = 6;

fn activity_not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Activity not found" })),
    )
}

#[derive(Deserialize, Default)]
pub struct ListActivitiesQuery {
    pub category: Option<String>,
}

pub async fn list_activities(
    State(ctx): State<Arc<AppContext>>,
    AuthedUser(user_id): AuthedUser,
    Query(query): Query<ListActivitiesQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let rows = ctx
        .storage
        .list_activities(query.category.as_deref())
        .await
        .map_err(internal_error)?;
    let mut progress = progress_by_activity(&ctx, &user_id).await?;
    let categories = ctx
        .storage
        .list_activity_categories()
        .await
        .map_err(internal_error)?;

    let activities: Vec<Activity> = rows
        .into_iter()
        .map(|row| {
            let p = progress.remove(&row.id);
            Activity::from_row(row, p)
        })
        .collect();

    Ok(Json(json!({
        "activities": activities,
        "categories": categories,
    })))
}

pub async fn get_activity(
    State(ctx): State<Arc<AppContext>>,
    AuthedUser(user_id): AuthedUser,
    Path(id): Path<i64>,
) -> Result<Json<Activity>, (StatusCode, Json<Value>)> {
    let row = ctx
        .storage
        .get_activity(id)
        .await
        .map_err(internal_error)?
        .ok_or_else(activity_not_found)?;
    let progress = ctx
        .storage
        .get_progress(&user_id, id)
        .await
        .map_err(internal_error)?;
    Ok(Json(Activity::from_row(row, progress)))
}

pub async fn complete_activity(
    State(ctx): State<Arc<AppContext>>,
    AuthedUser(user_id): AuthedUser,
    Path(id): Path<i64>,
    Json(body): Json<CompleteActivityRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if let Some(rating) = body.rating {
        if !(1..=5).contains(&rating) {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "rating must be between 1 and 5" })),
            ));
        }
    }

    if ctx
        .storage
        .get_activity(id)
        .await
        .map_err(internal_error)?
        .is_none()
    {
        return Err(activity_not_found());
    }

    let progress = ctx
        .storage
        .record_completion(&user_id, id, body.rating, body.notes.as_deref())
        .await
        .map_err(internal_error)?;

    Ok(Json(json!({
        "completed": true,
        "progress": UserProgress::from(progress),
    })))
}

pub async fn toggle_favorite(
    State(ctx): State<Arc<AppContext>>,
    AuthedUser(user_id): AuthedUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if ctx
        .storage
        .get_activity(id)
        .await
        .map_err(internal_error)?
        .is_none()
    {
        return Err(activity_not_found());
    }

    let is_favorite = ctx
        .storage
        .toggle_favorite(&user_id, id)
        .await
        .map_err(internal_error)?;
    Ok(Json(json!({ "activity_id": id, "is_favorite": is_favorite })))
}

#[derive(Deserialize, Default)]
pub struct RecommendationsQuery {
    pub mood: Option<String>,
}

/// Recommend activities matching the given mood, falling back to the user's
/// most recent logged mood, then to short beginner activities.
pub async fn recommendations(
    State(ctx): State<Arc<AppContext>>,
    AuthedUser(user_id): AuthedUser,
    Query(query): Query<RecommendationsQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mood = match query.mood {
        Some(m) if !m.trim().is_empty() => Some(m.trim().to_lowercase()),
        _ => ctx
            .storage
            .latest_mood(&user_id)
            .await
            .map_err(internal_error)?
            .map(|row| row.mood.to_lowercase()),
    };

    let (rows, reason) = match &mood {
        Some(mood) => {
            let matched = ctx
                .storage
                .activities_for_mood(mood, RECOMMENDATION_LIMIT)
                .await
                .map_err(internal_error)?;
            if matched.is_empty() {
                let fallback = ctx
                    .storage
                    .beginner_activities(RECOMMENDATION_LIMIT)
                    .await
                    .map_err(internal_error)?;
                (fallback, "Gentle activities to get started".to_string())
            } else {
                (matched, format!("Picked for when you're feeling {mood}"))
            }
        }
        None => {
            let fallback = ctx
                .storage
                .beginner_activities(RECOMMENDATION_LIMIT)
                .await
                .map_err(internal_error)?;
            (fallback, "Gentle activities to get started".to_string())
        }
    };

    let mut progress = progress_by_activity(&ctx, &user_id).await?;
    let activities: Vec<Activity> = rows
        .into_iter()
        .map(|row| {
            let p = progress.remove(&row.id);
            Activity::from_row(row, p)
        })
        .collect();

    Ok(Json(json!({ "activities": activities, "reason": reason })))
}

pub async fn get_progress(
    State(ctx): State<Arc<AppContext>>,
    AuthedUser(user_id): AuthedUser,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let (activities_tried, total_completions, completions_this_week, completions_today) = ctx
        .storage
        .completion_summary(&user_id)
        .await
        .map_err(internal_error)?;

    let favorites = ctx
        .storage
        .favorite_activities(&user_id)
        .await
        .map_err(internal_error)?;
    let favorite_activities: Vec<Activity> = favorites
        .into_iter()
        .map(|(row, progress)| Activity::from_row(row, Some(progress)))
        .collect();

    let recent = ctx
        .storage
        .recent_completions(&user_id, 10)
        .await
        .map_err(internal_error)?;
    let recent_completions: Vec<RecentCompletion> =
        recent.into_iter().map(RecentCompletion::from).collect();

    let rows = ctx
        .storage
        .list_activities(None)
        .await
        .map_err(internal_error)?;
    let mut progress = progress_by_activity(&ctx, &user_id).await?;
    let all_activities_with_progress: Vec<Activity> = rows
        .into_iter()
        .map(|row| {
            let p = progress.remove(&row.id);
            Activity::from_row(row, p)
        })
        .collect();

    Ok(Json(json!({
        "statistics": {
            "activities_tried": activities_tried,
            "total_completions": total_completions,
            "completions_this_week": completions_this_week,
            "completions_today": completions_today,
        },
        "favorite_activities": favorite_activities,
        "recent_completions": recent_completions,
        "all_activities_with_progress": all_activities_with_progress,
    })))
}

async fn progress_by_activity(
    ctx: &AppContext,
    user_id: &str,
) -> Result<HashMap<i64, ProgressRow>, (StatusCode, Json<Value>)> {
    let rows = ctx
        .storage
        .list_progress(user_id)
        .await
        .map_err(internal_error)?;
    Ok(rows.into_iter().map(|p| (p.activity_id, p)).collect())
}
