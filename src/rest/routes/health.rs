use crate::observability::HealthStatus;
use crate::AppContext;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

pub async fn health(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    let uptime = ctx.started_at.elapsed().as_secs();
    let db_ok = sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&ctx.storage.pool())
        .await
        .is_ok();
    Json(json!(HealthStatus::ok(uptime, db_ok)))
}
