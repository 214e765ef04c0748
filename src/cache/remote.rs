//! Remote Store Module
//!
//! Serves the [`Cache`] contract from a networked store with native per-key
//! expiry. Nothing is cached locally and all expiry is left to the backend.
//!
//! Reads and writes fail differently: a failed read is logged and reported
//! as a miss, a failed write is returned to the caller.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use tracing::{debug, error, info};

use crate::cache::Cache;
use crate::config::{CacheConfig, RedisConfig};
use crate::error::Result;

// == Remote Backend ==
/// Minimal command set needed from a networked key-value store.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Writes `value`, expiring after `ttl` when given.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Reads `key`; `Ok(None)` when it is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;
}

// == Redis Backend ==
/// [`RemoteBackend`] over a multiplexed Redis connection.
///
/// The connection is cheap to clone and shared by all requests.
#[derive(Clone)]
pub struct RedisBackend {
    conn: MultiplexedConnection,
}

impl RedisBackend {
    /// Connects and verifies the server answers `PING`.
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.connection_url())?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = redis::cmd("PING").query_async(&mut conn).await?;

        info!(host = %config.host, db = config.db, "Connected to redis");
        Ok(Self { conn })
    }
}

#[async_trait]
impl RemoteBackend for RedisBackend {
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<()> = match ttl {
            Some(ttl) => conn.pset_ex(key, value, ttl_millis(ttl)).await,
            None => conn.set(key, value).await,
        };
        Ok(result?)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }
}

/// TTL in milliseconds for `PSETEX`, saturating instead of wrapping.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}

// == Remote Store ==
/// [`Cache`] adapter over any [`RemoteBackend`].
pub struct RemoteStore<B> {
    backend: B,
    /// `None` means entries never expire
    ttl: Option<Duration>,
}

/// The production remote cache.
pub type RedisCache = RemoteStore<RedisBackend>;

impl<B: RemoteBackend> RemoteStore<B> {
    /// Wraps `backend`. A zero `ttl` stores entries without expiry.
    pub fn new(backend: B, ttl: Duration) -> Self {
        Self {
            backend,
            ttl: (!ttl.is_zero()).then_some(ttl),
        }
    }

    /// TTL forwarded with every write.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }
}

impl RedisCache {
    /// Connects to Redis; fails if the server cannot be reached.
    pub async fn connect(cache: &CacheConfig, redis: &RedisConfig) -> Result<Self> {
        let backend = RedisBackend::connect(redis).await?;
        Ok(Self::new(backend, Duration::from_secs(cache.ttl_seconds)))
    }
}

#[async_trait]
impl<B: RemoteBackend> Cache for RemoteStore<B> {
    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.backend
            .set(key, &value, self.ttl)
            .await
            .inspect_err(|e| error!(key = %key, error = %e, "Failed to set value in remote cache"))
    }

    async fn get(&self, key: &str) -> Option<String> {
        match self.backend.get(key).await {
            Ok(value) => value,
            Err(e) => {
                error!(key = %key, error = %e, "Failed to get value from remote cache");
                debug!(key = %key, "Reporting remote failure as a miss");
                None
            }
        }
    }
}
