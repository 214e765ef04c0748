//! Cache API - A key-value cache server with per-entry TTL
//!
//! Values live either in an in-process TTL store with a background eviction
//! sweep, or in Redis. Both sit behind the same [`cache::Cache`] contract.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
mod tasks;

pub use api::{create_router, AppState};
pub use cache::{Cache, StoreConfig, TtlStore};
pub use config::Config;
