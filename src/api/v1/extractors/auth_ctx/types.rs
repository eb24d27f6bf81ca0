/*
 * Responsibility
 * - The "authenticated context" type handlers see
 * - The middleware verifies and stores it in request extensions; handlers
 *   receive only this type
 *
 * Notes
 * - Credential verification and role checks are the guard's responsibility
 * - Resource-level ownership checks (BOLA) belong to a policy layer, not here
 */

use uuid::Uuid;

use crate::services::auth::identity::{CallerIdentity, Role};

/// Context attached to an authenticated request.
///
/// - `user_id` is the token subject (UUID)
/// - `role` is the coarse-grained role the guard checked (None on role-less
///   tokens hitting unrestricted operations)
/// - `email` is carried for handlers that echo profile data; optional
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub user_id: Uuid,
    pub role: Option<Role>,
    pub email: Option<String>,
}

impl From<CallerIdentity> for AuthCtx {
    fn from(identity: CallerIdentity) -> Self {
        Self {
            user_id: identity.subject,
            role: identity.role,
            email: identity.email,
        }
    }
}
