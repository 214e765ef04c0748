//! Cache Store Module
//!
//! Generic in-process TTL map. Expired entries are hidden from readers as soon
//! as their deadline passes (lazy expiry) and physically removed by a
//! background sweep (active expiry).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::{Cache, CacheEntry};
use crate::config::{CacheConfig, DEFAULT_EVICTION_INTERVAL_MS, DEFAULT_TTL_SECONDS};
use crate::error::Result;
use crate::tasks::spawn_eviction_task;

// == Store Config ==
/// Settings fixed at store construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// TTL applied to every new or overwritten entry
    pub ttl: Duration,
    /// Period of the background sweep
    pub eviction_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECONDS),
            eviction_interval: Duration::from_millis(DEFAULT_EVICTION_INTERVAL_MS),
        }
    }
}

impl From<&CacheConfig> for StoreConfig {
    /// Zero values in the process configuration select the defaults.
    fn from(config: &CacheConfig) -> Self {
        let defaults = Self::default();
        Self {
            ttl: match config.ttl_seconds {
                0 => defaults.ttl,
                secs => Duration::from_secs(secs),
            },
            eviction_interval: match config.eviction_interval_ms {
                0 => defaults.eviction_interval,
                ms => Duration::from_millis(ms),
            },
        }
    }
}

// == Sweep State ==
/// Lifecycle of the background sweep. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SweepState {
    Idle = 0,
    Running = 1,
    Stopped = 2,
}

impl From<u8> for SweepState {
    fn from(raw: u8) -> Self {
        match raw {
            0 => SweepState::Idle,
            1 => SweepState::Running,
            _ => SweepState::Stopped,
        }
    }
}

// == Store Inner ==
/// Shared state behind a [`TtlStore`]. The sweep task only holds a weak
/// reference, so dropping the last store handle ends the task.
#[derive(Debug)]
pub(crate) struct StoreInner<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    eviction_interval: Duration,
    sweep_state: AtomicU8,
    sweep_token: CancellationToken,
    sweep_handle: Mutex<Option<JoinHandle<()>>>,
}

impl<V> StoreInner<V> {
    pub(crate) fn new(config: StoreConfig, parent: &CancellationToken) -> Self {
        let eviction_interval = if config.eviction_interval.is_zero() {
            StoreConfig::default().eviction_interval
        } else {
            config.eviction_interval
        };

        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: config.ttl,
            eviction_interval,
            sweep_state: AtomicU8::new(SweepState::Idle as u8),
            sweep_token: parent.child_token(),
            sweep_handle: Mutex::new(None),
        }
    }

    /// Removes every entry expired as of a single instant taken at scan start.
    pub(crate) async fn delete_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    pub(crate) fn mark_sweep_stopped(&self) {
        self.sweep_state
            .store(SweepState::Stopped as u8, Ordering::Release);
    }
}

impl<V> Drop for StoreInner<V> {
    fn drop(&mut self) {
        self.sweep_token.cancel();
    }
}

// == TTL Store ==
/// Thread-safe TTL map keyed by string.
///
/// Cloning is cheap and every clone shares the same table and sweep task.
/// Construction spawns the sweep, so it must happen inside a Tokio runtime.
#[derive(Debug)]
pub struct TtlStore<V> {
    inner: Arc<StoreInner<V>>,
}

impl<V> Clone for TtlStore<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> TtlStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a store and starts its eviction sweep.
    ///
    /// The sweep ends when `parent` is cancelled, when [`stop_eviction`] is
    /// called, or when the last handle to the store is dropped.
    ///
    /// [`stop_eviction`]: TtlStore::stop_eviction
    pub fn new(config: StoreConfig, parent: &CancellationToken) -> Self {
        let store = Self {
            inner: Arc::new(StoreInner::new(config, parent)),
        };
        store.start_eviction();
        store
    }

    // == Set ==
    /// Inserts or fully replaces the entry for `key` with a fresh expiry.
    pub async fn set(&self, key: impl Into<String>, value: V) {
        let entry = CacheEntry::new(value, self.inner.ttl);
        self.inner.entries.write().await.insert(key.into(), entry);
    }

    // == Get ==
    /// Returns the value if present and not expired.
    ///
    /// Expired entries are left in place for the sweep, so reads never need
    /// the write lock.
    pub async fn get(&self, key: &str) -> Option<V> {
        let entries = self.inner.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    // == Delete ==
    /// Removes the entry for `key`. Deleting a missing key is a no-op.
    pub async fn delete(&self, key: &str) {
        self.inner.entries.write().await.remove(key);
    }

    // == Delete Expired ==
    /// Removes all expired entries and returns how many were dropped.
    pub async fn delete_expired(&self) -> usize {
        self.inner.delete_expired().await
    }

    // == Eviction Lifecycle ==
    /// Starts the background sweep. Returns false if it was already started
    /// or has been stopped; a stopped sweep is never restarted.
    pub fn start_eviction(&self) -> bool {
        // Held across the transition so a concurrent shutdown sees the handle
        let mut handle = self
            .inner
            .sweep_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self
            .inner
            .sweep_state
            .compare_exchange(
                SweepState::Idle as u8,
                SweepState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            debug!(state = ?self.sweep_state(), "Eviction already started, ignoring");
            return false;
        }

        *handle = Some(spawn_eviction_task(
            Arc::downgrade(&self.inner),
            self.inner.eviction_interval,
            self.inner.sweep_token.clone(),
        ));
        true
    }

    /// Signals the sweep to stop without waiting for it.
    pub fn stop_eviction(&self) {
        self.inner.sweep_token.cancel();
        self.inner.mark_sweep_stopped();
    }

    /// Stops the sweep and waits until the task has exited.
    pub async fn shutdown(&self) {
        self.stop_eviction();

        let handle = self
            .inner
            .sweep_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Eviction task did not exit cleanly");
            }
        }
    }

    /// Current lifecycle state of the sweep.
    pub fn sweep_state(&self) -> SweepState {
        SweepState::from(self.inner.sweep_state.load(Ordering::Acquire))
    }

    // == Length ==
    /// Number of entries physically in the table, including expired ones
    /// the sweep has not removed yet.
    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    // == Is Empty ==
    /// Returns true if the table holds no entries at all.
    pub async fn is_empty(&self) -> bool {
        self.inner.entries.read().await.is_empty()
    }

    /// TTL applied to new entries.
    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Period of the background sweep.
    pub fn eviction_interval(&self) -> Duration {
        self.inner.eviction_interval
    }
}

#[async_trait]
impl Cache for TtlStore<String> {
    async fn set(&self, key: &str, value: String) -> Result<()> {
        TtlStore::set(self, key, value).await;
        Ok(())
    }

    async fn get(&self, key: &str) -> Option<String> {
        TtlStore::get(self, key).await
    }
}
