/// Factory: build the access guard from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::guard::AccessGuard;
use crate::services::auth::permissions::PermissionMap;
use crate::services::auth::verifier::JwtVerifier;

pub fn build_access_guard(
    config: &Config,
    permissions: PermissionMap,
) -> Result<Arc<AccessGuard>, AppError> {
    let verifier = JwtVerifier::from_ed_pem(
        &config.access_jwt_public_key_pem,
        &config.auth_issuer,
        &config.auth_audience,
        config.access_token_leeway_seconds,
    )
    .map_err(|e| {
        tracing::error!(error = %e, "failed to build access token verifier");
        AppError::Internal
    })?;

    Ok(Arc::new(AccessGuard::new(Arc::new(verifier), permissions)))
}
