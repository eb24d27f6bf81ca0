pub mod factory;
pub mod guard;
pub mod identity;
pub mod permissions;
pub mod verifier;

pub use factory::build_access_guard;
pub use guard::{AccessDecision, AccessGuard, DenyReason};
pub use identity::{CallerIdentity, Role};
pub use permissions::PermissionMap;
pub use verifier::{CredentialVerifier, JwtVerifier};
