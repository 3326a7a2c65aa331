// rest/mod.rs — Public REST API server.
//
// Axum HTTP server; all wellness endpoints live under /api/v1.
//
// Endpoints:
//   GET    /api/v1/health
//   POST   /api/v1/moods
//   GET    /api/v1/moods
//   POST   /api/v1/journal
//   GET    /api/v1/journal
//   GET    /api/v1/journal/{id}
//   PUT    /api/v1/journal/{id}
//   DELETE /api/v1/journal/{id}
//   GET    /api/v1/activities
//   GET    /api/v1/activities/{id}
//   POST   /api/v1/activities/{id}/complete
//   POST   /api/v1/activities/{id}/favorite
//   GET    /api/v1/recommendations
//   GET    /api/v1/progress
//   POST   /api/v1/chat/messages      (streamed reply)
//   GET    /api/v1/chat/messages
//   DELETE /api/v1/chat/messages
//   GET    /api/v1/achievements

pub mod auth;
pub mod routes;

use anyhow::Result;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::AppContext;

/// Map a storage/handler failure to an opaque 500 response.
pub fn internal_error(e: anyhow::Error) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
}

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        // Health (no auth)
        .route("/api/v1/health", get(routes::health::health))
        // Moods
        .route(
            "/api/v1/moods",
            get(crate::moods::handlers::list_moods).post(crate::moods::handlers::log_mood),
        )
        // Journal
        .route(
            "/api/v1/journal",
            get(crate::journal::handlers::list_entries).post(crate::journal::handlers::create_entry),
        )
        .route(
            "/api/v1/journal/{id}",
            get(crate::journal::handlers::get_entry)
                .put(crate::journal::handlers::update_entry)
                .delete(crate::journal::handlers::delete_entry),
        )
        // Self-care activities
        .route(
            "/api/v1/activities",
            get(crate::selfcare::handlers::list_activities),
        )
        .route(
            "/api/v1/activities/{id}",
            get(crate::selfcare::handlers::get_activity),
        )
        .route(
            "/api/v1/activities/{id}/complete",
            post(crate::selfcare::handlers::complete_activity),
        )
        .route(
            "/api/v1/activities/{id}/favorite",
            post(crate::selfcare::handlers::toggle_favorite),
        )
        .route(
            "/api/v1/recommendations",
            get(crate::selfcare::handlers::recommendations),
        )
        .route("/api/v1/progress", get(crate::selfcare::handlers::get_progress))
        // Chat
        .route(
            "/api/v1/chat/messages",
            get(crate::chat::handlers::get_history)
                .post(crate::chat::handlers::send_message)
                .delete(crate::chat::handlers::clear_history),
        )
        // Achievements
        .route(
            "/api/v1/achievements",
            get(crate::achievements::handlers::get_achievements),
        )
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
