//! Cache client interface used by higher-level services (listing reads, etc.).
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors (transport/command).
///
/// Kept independent from `AppError` so callers can decide how to fail:
/// listing reads fall open to the database, writes are best-effort.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
}

/// A minimal cache interface.
///
/// Intentionally small and string-based: read-through caching only needs
/// `GET`, `SET` with a TTL, and `DEL` on invalidation. There is no eviction
/// policy here beyond TTL; this is a pass-through, not a storage engine.
///
/// Object-safe on purpose: `AppState` holds an `Arc<dyn CacheClient>` so the
/// backend can be swapped (Valkey in production, null when unconfigured).
#[async_trait]
pub trait CacheClient: Send + Sync {
    // Returns the cache backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Get UTF-8 string value.
    async fn get_string(&self, key: &str) -> CacheResult<Option<String>>;

    // Set value unconditionally, with TTL.
    async fn set_string(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    // Delete a key. Returns number of deleted keys.
    async fn del(&self, key: &str) -> CacheResult<u64>;
}
