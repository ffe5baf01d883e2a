use axum::{Router, routing::get};

use crate::AppState;
use crate::handlers;

/// Create file browser routes
pub fn browser_routes() -> Router<AppState> {
    Router::new()
        // Downloads; static prefix wins over the listing catch-all
        .route("/download/", get(handlers::download_root))
        .route("/download/{*path}", get(handlers::download))
        // Directory listings
        .route("/", get(handlers::list_root))
        .route("/{*path}", get(handlers::list_dir))
}
