//! Role-gated access guard.
//!
//! Responsibility:
//! - Gate a protected operation on credential validity and role membership.
//! - Pure decision logic: no I/O, no logging, no HTTP types. The middleware
//!   owns observation and status-code mapping; this component only returns a
//!   structured [`AccessDecision`], so evaluating the same request twice yields
//!   the same outcome.
//!
//! Flow: verify credential -> look up declared requirement -> check role
//! membership. A verifier-internal failure becomes a hard deny
//! (`InternalGuardFailure`), never an allow.

use std::sync::Arc;

use axum::http::Method;

use crate::services::auth::identity::CallerIdentity;
use crate::services::auth::permissions::PermissionMap;
use crate::services::auth::verifier::{CredentialVerifier, VerifyError};

/// Why a request was denied. Stable codes; the HTTP layer maps the first four
/// to 401 and the last two to 403.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    MissingCredential,
    ExpiredCredential,
    InvalidCredential,
    /// Authenticated identity carries no role while the operation requires
    /// one. Anomalous: our issuer always stamps a role on user tokens.
    MissingRole,
    InsufficientRole,
    /// Unexpected verifier failure, fail-closed.
    InternalGuardFailure,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::ExpiredCredential => "expired_credential",
            Self::InvalidCredential => "invalid_credential",
            Self::MissingRole => "missing_role",
            Self::InsufficientRole => "insufficient_role",
            Self::InternalGuardFailure => "internal_guard_failure",
        }
    }
}

/// Positive outcome: the resolved identity plus whether a declared requirement
/// was actually checked (`false` when the operation declares none).
#[derive(Debug, Clone)]
pub struct AccessGrant {
    pub identity: CallerIdentity,
    pub role_checked: bool,
}

/// Negative outcome. `cause` preserves the underlying verification failure so
/// the caller can log it; nothing is swallowed here.
#[derive(Debug)]
pub struct AccessDenial {
    pub reason: DenyReason,
    pub cause: Option<VerifyError>,
}

impl AccessDenial {
    fn new(reason: DenyReason) -> Self {
        Self {
            reason,
            cause: None,
        }
    }

    fn with_cause(reason: DenyReason, cause: VerifyError) -> Self {
        Self {
            reason,
            cause: Some(cause),
        }
    }
}

/// Outcome of one guard evaluation. Ephemeral, never persisted.
#[derive(Debug)]
pub enum AccessDecision {
    Allow(AccessGrant),
    Deny(AccessDenial),
}

impl AccessDecision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow(_))
    }

    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::Allow(_) => None,
            Self::Deny(denial) => Some(denial.reason),
        }
    }
}

/// The guard itself: an injected verifier plus the immutable permission table.
///
/// Holds no per-request state; shared across the router via `Arc`.
pub struct AccessGuard {
    verifier: Arc<dyn CredentialVerifier>,
    permissions: PermissionMap,
}

impl AccessGuard {
    pub fn new(verifier: Arc<dyn CredentialVerifier>, permissions: PermissionMap) -> Self {
        Self {
            verifier,
            permissions,
        }
    }

    /// Evaluate one request against one operation.
    ///
    /// `operation_path` is the matched route template. `None` means the
    /// request matched no route: it carries no declared requirement and falls
    /// through to the router's own 404 once authenticated.
    pub fn evaluate(
        &self,
        credential: Option<&str>,
        method: &Method,
        operation_path: Option<&str>,
    ) -> AccessDecision {
        let Some(credential) = credential else {
            return AccessDecision::Deny(AccessDenial::new(DenyReason::MissingCredential));
        };

        let identity = match self.verifier.verify(credential) {
            Ok(identity) => identity,
            Err(err) => {
                let reason = match err {
                    VerifyError::Expired => DenyReason::ExpiredCredential,
                    VerifyError::Internal(_) => DenyReason::InternalGuardFailure,
                    _ => DenyReason::InvalidCredential,
                };
                return AccessDecision::Deny(AccessDenial::with_cause(reason, err));
            }
        };

        let required = operation_path
            .and_then(|path| self.permissions.required_roles(method, path));

        let Some(required) = required else {
            // No declared requirement: authentication alone suffices.
            return AccessDecision::Allow(AccessGrant {
                identity,
                role_checked: false,
            });
        };

        let Some(role) = identity.role else {
            return AccessDecision::Deny(AccessDenial::new(DenyReason::MissingRole));
        };

        if required.contains(role) {
            AccessDecision::Allow(AccessGrant {
                identity,
                role_checked: true,
            })
        } else {
            AccessDecision::Deny(AccessDenial::new(DenyReason::InsufficientRole))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::identity::Role;
    use uuid::Uuid;

    /// Maps fixed credential strings to canned outcomes; no crypto involved.
    struct StubVerifier;

    fn identity(role: Option<Role>) -> CallerIdentity {
        CallerIdentity {
            subject: Uuid::from_u128(7),
            role,
            email: None,
        }
    }

    impl CredentialVerifier for StubVerifier {
        fn verify(&self, credential: &str) -> Result<CallerIdentity, VerifyError> {
            match credential {
                "admin" => Ok(identity(Some(Role::Admin))),
                "seller" => Ok(identity(Some(Role::Seller))),
                "user" => Ok(identity(Some(Role::User))),
                "no-role" => Ok(identity(None)),
                "expired" => Err(VerifyError::Expired),
                "broken" => Err(VerifyError::Internal("jwks backend down".into())),
                other => Err(VerifyError::UnknownRole(other.to_string())),
            }
        }
    }

    const PUBLISH: &str = "/api/v1/listings";
    const MODERATE: &str = "/api/v1/listings/{listing_id}";
    const BROWSE: &str = "/api/v1/listings";

    fn guard() -> AccessGuard {
        let permissions = PermissionMap::builder()
            .require(Method::POST, PUBLISH, &[Role::Admin, Role::Seller])
            .require(Method::DELETE, MODERATE, &[Role::Admin])
            .build();
        AccessGuard::new(Arc::new(StubVerifier), permissions)
    }

    #[test]
    fn missing_credential_is_denied() {
        let decision = guard().evaluate(None, &Method::GET, Some(BROWSE));
        assert_eq!(decision.deny_reason(), Some(DenyReason::MissingCredential));
    }

    #[test]
    fn expired_credential_is_distinguished() {
        let decision = guard().evaluate(Some("expired"), &Method::GET, Some(BROWSE));
        assert_eq!(decision.deny_reason(), Some(DenyReason::ExpiredCredential));

        // The underlying failure is preserved, not swallowed.
        match decision {
            AccessDecision::Deny(denial) => {
                assert!(matches!(denial.cause, Some(VerifyError::Expired)));
            }
            AccessDecision::Allow(_) => panic!("expected deny"),
        }
    }

    #[test]
    fn invalid_credential_is_denied() {
        let decision = guard().evaluate(Some("garbage"), &Method::GET, Some(BROWSE));
        assert_eq!(decision.deny_reason(), Some(DenyReason::InvalidCredential));
    }

    #[test]
    fn undeclared_operation_allows_any_authenticated_caller() {
        for credential in ["admin", "seller", "user", "no-role"] {
            let decision = guard().evaluate(Some(credential), &Method::GET, Some(BROWSE));
            match decision {
                AccessDecision::Allow(grant) => assert!(!grant.role_checked),
                AccessDecision::Deny(denial) => {
                    panic!("expected allow for {credential}, got {:?}", denial.reason)
                }
            }
        }
    }

    #[test]
    fn declared_operation_checks_role_membership() {
        // {admin, seller} is a disjunction: either role passes, `user` fails.
        let g = guard();

        for credential in ["admin", "seller"] {
            let decision = g.evaluate(Some(credential), &Method::POST, Some(PUBLISH));
            match decision {
                AccessDecision::Allow(grant) => assert!(grant.role_checked),
                AccessDecision::Deny(denial) => {
                    panic!("expected allow for {credential}, got {:?}", denial.reason)
                }
            }
        }

        let decision = g.evaluate(Some("user"), &Method::POST, Some(PUBLISH));
        assert_eq!(decision.deny_reason(), Some(DenyReason::InsufficientRole));
    }

    #[test]
    fn admin_only_operation_rejects_seller() {
        let decision = guard().evaluate(Some("seller"), &Method::DELETE, Some(MODERATE));
        assert_eq!(decision.deny_reason(), Some(DenyReason::InsufficientRole));
    }

    #[test]
    fn roleless_identity_is_rejected_when_roles_are_required() {
        let decision = guard().evaluate(Some("no-role"), &Method::POST, Some(PUBLISH));
        assert_eq!(decision.deny_reason(), Some(DenyReason::MissingRole));
    }

    #[test]
    fn verifier_failure_fails_closed() {
        let decision = guard().evaluate(Some("broken"), &Method::POST, Some(PUBLISH));
        assert_eq!(
            decision.deny_reason(),
            Some(DenyReason::InternalGuardFailure)
        );
    }

    #[test]
    fn unmatched_route_requires_authentication_only() {
        let g = guard();
        assert_eq!(
            g.evaluate(None, &Method::GET, None).deny_reason(),
            Some(DenyReason::MissingCredential)
        );
        assert!(g.evaluate(Some("user"), &Method::GET, None).is_allow());
    }

    #[test]
    fn evaluation_is_idempotent() {
        let g = guard();
        let cases: &[(Option<&str>, Method, Option<&str>)] = &[
            (None, Method::GET, Some(BROWSE)),
            (Some("expired"), Method::GET, Some(BROWSE)),
            (Some("user"), Method::POST, Some(PUBLISH)),
            (Some("admin"), Method::DELETE, Some(MODERATE)),
        ];

        for (credential, method, path) in cases {
            let first = g.evaluate(*credential, method, *path);
            let second = g.evaluate(*credential, method, *path);
            assert_eq!(first.is_allow(), second.is_allow());
            assert_eq!(first.deny_reason(), second.deny_reason());
        }
    }
}
