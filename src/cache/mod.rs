//! Cache Module
//!
//! The [`Cache`] capability and its two backends: the in-process
//! [`TtlStore`] and the Redis-backed [`RemoteStore`].

mod entry;
mod remote;
mod store;

#[cfg(test)]
mod property_tests;

use async_trait::async_trait;

use crate::error::Result;

// Re-export public types
pub use entry::CacheEntry;
pub use remote::{RedisBackend, RedisCache, RemoteBackend, RemoteStore};
pub use store::{StoreConfig, SweepState, TtlStore};

pub(crate) use store::StoreInner;

// == Cache Capability ==
/// The read/write contract the HTTP layer is written against.
///
/// The backend is chosen once at startup and never switched afterwards.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Returns the live value for `key`, or `None` on a miss.
    async fn get(&self, key: &str) -> Option<String>;
}
