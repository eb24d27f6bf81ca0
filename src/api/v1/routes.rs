/*
 * Responsibility
 * - v1 URL structure, and which part of it the access guard covers
 * - The permission table is declared here, next to the routes it describes,
 *   from the same path constants (one place to keep both in sync)
 *
 * Routes are registered with full paths instead of `nest("/api/v1", ...)`:
 * `MatchedPath` is not visible to middleware on nested routers, and the guard
 * needs the matched template to look up the operation's requirement.
 */
use axum::{Router, http::Method, routing::get};

use crate::api::v1::handlers::{
    health::health,
    listings::{create_listing, delete_listing, get_listing, list_listings},
    me::me,
};
use crate::middleware;
use crate::services::auth::{PermissionMap, Role};
use crate::state::AppState;

const PREFIX: &str = "/api/v1";

// Route templates as the router registers them (axum `{param}` syntax).
const HEALTH: &str = "/health";
const ME: &str = "/me";
const LISTINGS: &str = "/listings";
const LISTING: &str = "/listings/{listing_id}";

fn v1(path: &str) -> String {
    format!("{PREFIX}{path}")
}

/// Declared role requirements, built once at startup and immutable after.
///
/// Operations absent from this table require authentication only.
pub fn permissions() -> PermissionMap {
    PermissionMap::builder()
        .require(Method::POST, v1(LISTINGS), &[Role::Seller, Role::Admin])
        .require(Method::DELETE, v1(LISTING), &[Role::Admin])
        .build()
}

/// The v1 router: `/api/v1/health` is public, everything else passes the guard.
pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route(&v1(ME), get(me))
        .route(&v1(LISTINGS), get(list_listings).post(create_listing))
        .route(&v1(LISTING), get(get_listing).delete(delete_listing));

    let protected = middleware::auth::access::apply(protected, state);

    Router::new().route(&v1(HEALTH), get(health)).merge(protected)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The permission table is configuration; pin it down as plain data.
    #[test]
    fn publish_requires_seller_or_admin() {
        let map = permissions();
        let required = map
            .required_roles(&Method::POST, "/api/v1/listings")
            .expect("declared");
        assert!(required.contains(Role::Seller));
        assert!(required.contains(Role::Admin));
        assert!(!required.contains(Role::User));
    }

    #[test]
    fn moderation_delete_is_admin_only() {
        let map = permissions();
        let required = map
            .required_roles(&Method::DELETE, "/api/v1/listings/{listing_id}")
            .expect("declared");
        assert_eq!(required.roles(), &[Role::Admin]);
    }

    #[test]
    fn browse_and_profile_carry_no_role_requirement() {
        let map = permissions();
        assert!(map.required_roles(&Method::GET, "/api/v1/me").is_none());
        assert!(map.required_roles(&Method::GET, "/api/v1/listings").is_none());
        assert!(
            map.required_roles(&Method::GET, "/api/v1/listings/{listing_id}")
                .is_none()
        );
    }

    #[test]
    fn table_declares_exactly_the_gated_operations() {
        assert_eq!(permissions().len(), 2);
    }
}
