//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - TTL Eviction: Removes expired in-memory entries at the configured interval

mod eviction;

pub(crate) use eviction::spawn_eviction_task;
