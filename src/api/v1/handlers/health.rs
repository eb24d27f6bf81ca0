/*
 * Responsibility
 * - GET /health (liveness probe)
 * - Mounted outside the access guard on purpose
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
