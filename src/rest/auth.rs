// rest/auth.rs — request authentication for the REST API.
//
// Two layers:
//   1. Optional bearer token (`api_token` in config / HAVEND_API_TOKEN).
//      When unset, auth is disabled for trusted loopback use.
//   2. User identity from the `x-user-id` header. Identity validation is the
//      reverse proxy's job; the daemon only requires the header's presence
//      and scopes every query by its value.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::AppContext;

const USER_HEADER: &str = "x-user-id";

/// The authenticated caller's user id. Extracted per request.
pub struct AuthedUser(pub String);

fn unauthorized(message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": message })),
    )
}

impl FromRequestParts<Arc<AppContext>> for AuthedUser {
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &Arc<AppContext>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(expected) = &ctx.config.api_token {
            let provided = parts
                .headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "));
            if provided != Some(expected.as_str()) {
                return Err(unauthorized("invalid or missing bearer token"));
            }
        }

        let user_id = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| unauthorized("missing x-user-id header"))?;

        Ok(AuthedUser(user_id.to_string()))
    }
}
