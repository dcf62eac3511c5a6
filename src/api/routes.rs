//! API Routes
//!
//! Configures the Axum router with the cache diagnostics endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_stats_handler, clear_handler, get_entry_handler, health_handler, invalidate_handler,
    set_entry_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /stats` - Statistics of every cache instance
/// - `GET /caches/:name/stats` - Statistics of one instance
/// - `GET /caches/:name/entries/:key` - Read a live cached value
/// - `PUT /caches/:name/entries/:key` - Prime an entry
/// - `DELETE /caches/:name/entries/:key` - Invalidate an entry
/// - `DELETE /caches/:name` - Clear an instance
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/caches/:name", delete(clear_handler))
        .route("/caches/:name/stats", get(cache_stats_handler))
        .route(
            "/caches/:name/entries/:key",
            get(get_entry_handler)
                .put(set_entry_handler)
                .delete(invalidate_handler),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
