/*
 * Responsibility
 * - GET /me: echo the authenticated caller's identity
 * - Everything comes from AuthCtx; no storage round-trip
 */
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::api::v1::extractors::AuthCtxExtractor;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: Uuid,
    pub role: Option<&'static str>,
    pub email: Option<String>,
}

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: ctx.user_id,
        role: ctx.role.map(|r| r.as_str()),
        email: ctx.email,
    })
}
