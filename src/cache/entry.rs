//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use tokio::time::Instant;

/// Upper bound used when `now + ttl` would overflow the clock.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

// == Cache Entry ==
/// A stored value tagged with the instant it stops being visible.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Absolute expiry instant
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry that expires `ttl` from now.
    ///
    /// A zero TTL produces an entry that is already expired.
    pub fn new(value: V, ttl: Duration) -> Self {
        Self::created_at(value, ttl, Instant::now())
    }

    /// Creates a new entry that expires `ttl` after `now`.
    pub fn created_at(value: V, ttl: Duration, now: Instant) -> Self {
        let expires_at = now
            .checked_add(ttl)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);

        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Checks if the entry has expired as of `now`.
    ///
    /// Boundary condition: the entry is expired once `now` reaches `expires_at`,
    /// so a zero TTL is expired from the moment it is written.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    // == Time To Live ==
    /// Returns the remaining time to live, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}
