//! API Module
//!
//! HTTP handlers and routing for the cache server.
//!
//! # Endpoints
//! - `GET /:key` - Retrieve a value by key
//! - `POST /:key` - Store the request body under a key

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
