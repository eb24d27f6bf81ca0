/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 * - Clone is cheap: pools and services are Arc/pooled internally
 */
use std::sync::Arc;

use crate::services::{auth::AccessGuard, cache::CacheClient};

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub cache: Arc<dyn CacheClient>,
    pub guard: Arc<AccessGuard>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, cache: Arc<dyn CacheClient>, guard: Arc<AccessGuard>) -> Self {
        Self { db, cache, guard }
    }
}
