//! API Module
//!
//! HTTP handlers and routing for the cache diagnostics API.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Statistics of every cache instance
//! - `GET|PUT|DELETE /caches/:name/entries/:key` - Inspect, prime or invalidate an entry
//! - `DELETE /caches/:name` - Clear an instance

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
