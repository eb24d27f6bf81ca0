//! Declared role requirements for protected operations.
//!
//! Responsibility:
//! - A process-wide, write-once table: `(method, route template) -> RoleSet`.
//! - Built at startup next to the router (same path constants), then read-only;
//!   concurrent reads need no synchronization.
//! - Absence of an entry means "no role restriction, authentication alone
//!   suffices".

use axum::http::Method;
use std::collections::HashMap;

use crate::services::auth::identity::Role;

/// The set of roles permitted to invoke one operation.
///
/// Membership is a disjunction: any one of the roles suffices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSet(Vec<Role>);

impl RoleSet {
    pub fn new(roles: &[Role]) -> Self {
        let mut roles = roles.to_vec();
        roles.sort();
        roles.dedup();
        Self(roles)
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn roles(&self) -> &[Role] {
        &self.0
    }
}

impl std::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for role in &self.0 {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(role.as_str())?;
            first = false;
        }
        Ok(())
    }
}

/// Immutable operation -> required-roles table.
///
/// Keys are the HTTP method plus the *full* matched route template (including
/// any nest prefix), so lookups line up with what `MatchedPath` reports at
/// request time.
#[derive(Debug, Clone, Default)]
pub struct PermissionMap {
    entries: HashMap<(Method, String), RoleSet>,
}

impl PermissionMap {
    pub fn builder() -> PermissionMapBuilder {
        PermissionMapBuilder {
            map: Self::default(),
        }
    }

    /// Declared requirement for an operation, if any.
    pub fn required_roles(&self, method: &Method, path: &str) -> Option<&RoleSet> {
        self.entries.get(&(method.clone(), path.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct PermissionMapBuilder {
    map: PermissionMap,
}

impl PermissionMapBuilder {
    /// Declare that `method path` requires one of `roles`.
    ///
    /// Each operation may be declared at most once; the table is configuration,
    /// not an accumulator.
    pub fn require(mut self, method: Method, path: impl Into<String>, roles: &[Role]) -> Self {
        let key = (method, path.into());
        debug_assert!(
            !self.map.entries.contains_key(&key),
            "duplicate permission declaration for {} {}",
            key.0,
            key.1
        );
        self.map.entries.insert(key, RoleSet::new(roles));
        self
    }

    pub fn build(self) -> PermissionMap {
        self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PermissionMap {
        PermissionMap::builder()
            .require(
                Method::POST,
                "/api/v1/listings",
                &[Role::Seller, Role::Admin],
            )
            .require(Method::DELETE, "/api/v1/listings/{listing_id}", &[Role::Admin])
            .build()
    }

    #[test]
    fn lookup_hits_declared_operation() {
        let map = sample();
        let required = map
            .required_roles(&Method::POST, "/api/v1/listings")
            .expect("declared");
        assert!(required.contains(Role::Seller));
        assert!(required.contains(Role::Admin));
        assert!(!required.contains(Role::User));
    }

    #[test]
    fn lookup_misses_undeclared_operation() {
        let map = sample();
        assert!(map.required_roles(&Method::GET, "/api/v1/listings").is_none());
        assert!(map.required_roles(&Method::POST, "/api/v1/unknown").is_none());
    }

    #[test]
    fn method_is_part_of_the_key() {
        let map = sample();
        assert!(
            map.required_roles(&Method::DELETE, "/api/v1/listings/{listing_id}")
                .is_some()
        );
        assert!(
            map.required_roles(&Method::GET, "/api/v1/listings/{listing_id}")
                .is_none()
        );
    }

    #[test]
    fn role_set_dedups_and_ignores_declaration_order() {
        let a = RoleSet::new(&[Role::Admin, Role::Seller, Role::Admin]);
        let b = RoleSet::new(&[Role::Seller, Role::Admin]);
        assert_eq!(a, b);
        assert_eq!(a.roles().len(), 2);
    }

    #[test]
    fn role_set_displays_for_logs() {
        let set = RoleSet::new(&[Role::Seller, Role::Admin]);
        assert_eq!(set.to_string(), "admin|seller");
    }
}
