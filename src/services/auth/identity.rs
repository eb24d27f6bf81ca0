/*
 * Responsibility
 * - Caller-facing identity types shared by verifier, guard and extractors
 * - `Role` is a closed set: tokens carrying anything else are rejected upstream
 */
use uuid::Uuid;

/// Coarse-grained authorization role carried in the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Admin,
    Seller,
    User,
}

impl Role {
    /// Parse the `role` claim value. Matching is exact (lowercase), the same
    /// strings the marketplace issuer mints.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "seller" => Some(Self::Seller),
            "user" => Some(Self::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Seller => "seller",
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity resolved from a verified credential.
///
/// Only the verifier constructs this; the guard and handlers consume it.
/// `role` is `None` when the token carries no `role` claim at all; the guard
/// decides what that means for the requested operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub subject: Uuid,
    pub role: Option<Role>,
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("seller"), Some(Role::Seller));
        assert_eq!(Role::parse("user"), Some(Role::User));
    }

    #[test]
    fn rejects_unknown_and_miscased_roles() {
        assert_eq!(Role::parse("Admin"), None);
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn round_trips_as_str() {
        for role in [Role::Admin, Role::Seller, Role::User] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }
}
