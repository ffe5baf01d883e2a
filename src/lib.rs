//! Minimal HTTP file browser.
//!
//! Serves an HTML index for every directory below a fixed root and streams
//! individual files from `/download/...`. Request paths are confined to the
//! root; see [`paths`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod paths;
pub mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::FileServerError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Root directory to serve files from, fixed at start-up
    pub root_dir: Arc<PathBuf>,
}

impl AppState {
    /// Create a new AppState serving `root_dir`.
    pub fn new(root_dir: PathBuf) -> Self {
        Self {
            root_dir: Arc::new(root_dir),
        }
    }
}

/// Build the complete application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::browser_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
