/*
 * Responsibility
 * - /listings CRUD handlers (browse/fetch for everyone authenticated,
 *   publish for sellers, moderation delete for admins; enforced by the guard)
 * - Read-through cache on the browse page; invalidated on writes
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::time::Duration;
use uuid::Uuid;

use crate::{
    api::v1::dto::listings::{CreateListingRequest, ListingResponse},
    api::v1::extractors::AuthCtxExtractor,
    error::AppError,
    repos::listing_repo,
    state::AppState,
};

pub const RECENT_CACHE_KEY: &str = "listings:recent";
const RECENT_CACHE_TTL: Duration = Duration::from_secs(30);
const RECENT_PAGE_SIZE: i64 = 50;

pub async fn list_listings(
    State(state): State<AppState>,
) -> Result<Json<Vec<ListingResponse>>, AppError> {
    // Cache failures fall open to the database; a stale-but-parseable payload
    // is served as-is (TTL bounds staleness).
    match state.cache.get_string(RECENT_CACHE_KEY).await {
        Ok(Some(cached)) => match serde_json::from_str::<Vec<ListingResponse>>(&cached) {
            Ok(listings) => return Ok(Json(listings)),
            Err(e) => {
                tracing::debug!(error = %e, "discarding unparseable cached listings");
            }
        },
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(error = %e, backend = state.cache.backend_name(), "cache read failed");
        }
    }

    let rows = listing_repo::list_recent(&state.db, RECENT_PAGE_SIZE).await?;
    let res: Vec<ListingResponse> = rows.into_iter().map(ListingResponse::from).collect();

    if let Ok(payload) = serde_json::to_string(&res)
        && let Err(e) = state
            .cache
            .set_string(RECENT_CACHE_KEY, &payload, RECENT_CACHE_TTL)
            .await
    {
        tracing::debug!(error = %e, "cache write failed");
    }

    Ok(Json(res))
}

pub async fn get_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> Result<Json<ListingResponse>, AppError> {
    let row = listing_repo::get(&state.db, listing_id)
        .await?
        .ok_or(AppError::not_found("listing"))?;

    Ok(Json(ListingResponse::from(row)))
}

pub async fn create_listing(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<ListingResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_LISTING", msg))?;

    // The guard already checked the role; the seller on the row is always the
    // caller, never client-supplied.
    let row = listing_repo::create(
        &state.db,
        ctx.user_id,
        req.title.trim(),
        &req.description,
        req.price_cents,
        req.category.trim(),
    )
    .await?;

    invalidate_recent(&state).await;

    Ok((StatusCode::CREATED, Json(ListingResponse::from(row))))
}

pub async fn delete_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = listing_repo::delete(&state.db, listing_id).await?;
    if !deleted {
        return Err(AppError::not_found("listing"));
    }

    invalidate_recent(&state).await;

    Ok(StatusCode::NO_CONTENT)
}

// Best-effort: a failed invalidation only extends staleness by the TTL.
async fn invalidate_recent(state: &AppState) {
    if let Err(e) = state.cache.del(RECENT_CACHE_KEY).await {
        tracing::debug!(error = %e, "cache invalidation failed");
    }
}
