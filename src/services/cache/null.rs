use async_trait::async_trait;
use std::time::Duration;

use crate::services::cache::client::{CacheClient, CacheResult};

/// No-op cache used when no `CACHE_URL` is configured.
///
/// Every read misses and every write succeeds, so callers behave exactly as
/// they would with a cold cache.
#[derive(Clone, Debug, Default)]
pub struct NullCache;

#[async_trait]
impl CacheClient for NullCache {
    fn backend_name(&self) -> &'static str {
        "null"
    }

    async fn get_string(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set_string(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn del(&self, _key: &str) -> CacheResult<u64> {
        Ok(0)
    }
}
