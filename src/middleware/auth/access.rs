//! Bearer access control for the protected router.
//!
//! Responsibility:
//! - Pull the bearer token off `Authorization`, resolve the operation from the
//!   matched route, and let the access guard decide.
//! - The guard returns a value; observation happens here: allow -> debug,
//!   ordinary denial -> warn, role-less identity / guard-internal failure ->
//!   error. Denials convert into the API error body (401/403).
//! - On allow, AuthCtx goes into request extensions for the extractor.

use axum::{
    Router,
    body::Body,
    extract::{MatchedPath, State},
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::guard::{AccessDecision, DenyReason};
use crate::state::AppState;

/// Gate every route of `router` behind the access guard.
///
/// Example:
/// ```ignore
/// let protected = Router::new().route("/api/v1/me", get(me));
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8's plain from_fn cannot take a State extractor, hand the state
    // over explicitly with from_fn_with_state
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // Matched route template, e.g. `/api/v1/listings/{listing_id}`. Owned up
    // front: the extension map is touched mutably later on the allow path.
    let operation = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned());
    let method = req.method().clone();

    let decision = {
        let credential = bearer_token(&req);
        state.guard.evaluate(credential, &method, operation.as_deref())
    };

    match decision {
        AccessDecision::Allow(grant) => {
            tracing::debug!(
                subject = %grant.identity.subject,
                role_checked = grant.role_checked,
                method = %method,
                operation = operation.as_deref().unwrap_or("<unmatched>"),
                "access granted"
            );

            // middleware -> extractor hand-off
            req.extensions_mut().insert(AuthCtx::from(grant.identity));

            Ok(next.run(req).await)
        }
        AccessDecision::Deny(denial) => {
            match denial.reason {
                // A valid token without a role should not exist; surface loudly.
                DenyReason::MissingRole | DenyReason::InternalGuardFailure => {
                    tracing::error!(
                        reason = denial.reason.as_str(),
                        cause = ?denial.cause,
                        method = %method,
                        operation = operation.as_deref().unwrap_or("<unmatched>"),
                        "access denied"
                    );
                }
                _ => {
                    tracing::warn!(
                        reason = denial.reason.as_str(),
                        cause = ?denial.cause,
                        method = %method,
                        operation = operation.as_deref().unwrap_or("<unmatched>"),
                        "access denied"
                    );
                }
            }

            Err(AppError::from(denial))
        }
    }
}

// `Authorization: Bearer <token>`. Any other scheme (or no header) counts as
// no credential; the token itself stays opaque here.
fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::api;
    use crate::services::auth::{AccessGuard, JwtVerifier};
    use crate::services::cache::NullCache;

    const SECRET: &[u8] = b"middleware-test-secret";
    const ISSUER: &str = "https://auth.bazaar.test";
    const AUDIENCE: &str = "bazaar-api";

    fn test_state() -> AppState {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[AUDIENCE]);
        validation.leeway = 0;
        let verifier = JwtVerifier::new(DecodingKey::from_secret(SECRET), validation);

        let guard = AccessGuard::new(Arc::new(verifier), api::v1::permissions());

        // Lazy pool: never connects unless a handler touches the database.
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/bazaar_test")
            .expect("lazy pool");

        AppState::new(db, Arc::new(NullCache), Arc::new(guard))
    }

    /// Same route table the real router registers, with handlers stubbed so
    /// nothing needs a live database.
    fn test_app(state: AppState) -> Router {
        async fn ok() -> StatusCode {
            StatusCode::OK
        }

        let protected = Router::new()
            .route("/api/v1/me", get(ok))
            .route("/api/v1/listings", get(ok).post(ok))
            .route("/api/v1/listings/{listing_id}", get(ok).delete(ok));

        apply(protected, state.clone()).with_state(state)
    }

    fn token_with(role: Option<&str>, exp_offset: i64) -> String {
        let exp = chrono::Utc::now().timestamp() + exp_offset;
        let mut claims = json!({
            "iss": ISSUER,
            "aud": AUDIENCE,
            "sub": Uuid::from_u128(42).to_string(),
            "exp": exp,
        });
        if let Some(role) = role {
            claims["role"] = json!(role);
        }
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    fn request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn error_code(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        value["error"]["code"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }

    #[tokio::test]
    async fn no_credential_is_401_missing_credential() {
        let app = test_app(test_state());
        let resp = app
            .oneshot(request("GET", "/api/v1/me", None))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(resp).await, "MISSING_CREDENTIAL");
    }

    #[tokio::test]
    async fn non_bearer_scheme_counts_as_no_credential() {
        let app = test_app(test_state());
        let req = Request::builder()
            .method("GET")
            .uri("/api/v1/me")
            .header(header::AUTHORIZATION, "Basic dXNlcjpwdw==")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(resp).await, "MISSING_CREDENTIAL");
    }

    #[tokio::test]
    async fn expired_token_is_401_with_distinct_code() {
        let app = test_app(test_state());
        let token = token_with(Some("user"), -600);
        let resp = app
            .oneshot(request("GET", "/api/v1/me", Some(&token)))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(resp).await, "EXPIRED_CREDENTIAL");
    }

    #[tokio::test]
    async fn garbage_token_is_401_invalid_credential() {
        let app = test_app(test_state());
        let resp = app
            .oneshot(request("GET", "/api/v1/me", Some("not-a-jwt")))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(resp).await, "INVALID_CREDENTIAL");
    }

    #[tokio::test]
    async fn authenticated_user_reaches_unrestricted_operation() {
        let app = test_app(test_state());
        let token = token_with(Some("user"), 600);
        let resp = app
            .oneshot(request("GET", "/api/v1/me", Some(&token)))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn user_cannot_publish_listings() {
        let app = test_app(test_state());
        let token = token_with(Some("user"), 600);
        let resp = app
            .oneshot(request("POST", "/api/v1/listings", Some(&token)))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(error_code(resp).await, "INSUFFICIENT_ROLE");
    }

    #[tokio::test]
    async fn seller_and_admin_can_publish_listings() {
        for role in ["seller", "admin"] {
            let app = test_app(test_state());
            let token = token_with(Some(role), 600);
            let resp = app
                .oneshot(request("POST", "/api/v1/listings", Some(&token)))
                .await
                .unwrap();

            assert_eq!(resp.status(), StatusCode::OK, "role {role}");
        }
    }

    #[tokio::test]
    async fn moderation_delete_rejects_sellers() {
        let app = test_app(test_state());
        let token = token_with(Some("seller"), 600);
        let listing = Uuid::from_u128(7);
        let resp = app
            .oneshot(request(
                "DELETE",
                &format!("/api/v1/listings/{listing}"),
                Some(&token),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(error_code(resp).await, "INSUFFICIENT_ROLE");
    }

    #[tokio::test]
    async fn moderation_delete_admits_admins() {
        let app = test_app(test_state());
        let token = token_with(Some("admin"), 600);
        let listing = Uuid::from_u128(7);
        let resp = app
            .oneshot(request(
                "DELETE",
                &format!("/api/v1/listings/{listing}"),
                Some(&token),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn roleless_token_is_401_on_gated_operation() {
        let app = test_app(test_state());
        let token = token_with(None, 600);
        let resp = app
            .oneshot(request("POST", "/api/v1/listings", Some(&token)))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(resp).await, "MISSING_ROLE");
    }

    #[tokio::test]
    async fn roleless_token_still_browses_unrestricted_operations() {
        let app = test_app(test_state());
        let token = token_with(None, 600);
        let resp = app
            .oneshot(request("GET", "/api/v1/listings", Some(&token)))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
    }
}
