pub mod client;
pub mod null;
pub mod valkey;

pub use client::{CacheClient, CacheError};
pub use null::NullCache;
pub use valkey::ValkeyClient;
