use crate::turngate::GIT_COMMIT_HASH;
use axum::{
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Json},
};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Server is running")
    ),
    tag = "health"
)]
// axum handler for health
pub async fn health() -> impl IntoResponse {
    let body = Json(json!({
        "status": "success",
        "message": "Server is running!",
        "time": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    }));

    // Without build-time git metadata this stays the "unknown" fallback.
    let short_hash = if GIT_COMMIT_HASH.len() > 7 {
        &GIT_COMMIT_HASH[0..7]
    } else {
        GIT_COMMIT_HASH
    };

    let x_app = format!(
        "{}:{}:{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_hash
    );

    let mut headers = HeaderMap::new();
    if let Ok(value) = x_app.parse::<HeaderValue>() {
        headers.insert("X-App", value);
    }

    (headers, body)
}
