//! Test utilities and common setup.

use std::path::{Path, PathBuf};

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode},
};
use tempfile::TempDir;
use tower::ServiceExt;

use filebrowser::AppState;

/// A served root directory that lives as long as the fixture.
pub struct Fixture {
    // Keeps the directory alive
    _temp: TempDir,
    pub root: PathBuf,
    pub app: Router,
}

impl Fixture {
    /// Serve `<tmp>/data`, leaving `<tmp>` free for files outside the root.
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let base = temp.path().canonicalize().unwrap();
        let root = base.join("data");
        std::fs::create_dir_all(&root).unwrap();

        let app = filebrowser::app(AppState::new(root.clone()));
        Self {
            _temp: temp,
            root,
            app,
        }
    }

    /// The directory containing the root.
    pub fn outside(&self) -> &Path {
        self.root.parent().unwrap()
    }

    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    pub fn mkdir(&self, relative: &str) {
        std::fs::create_dir_all(self.root.join(relative)).unwrap();
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
        get(&self.app, uri).await
    }
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .method(Method::GET)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
        .await
        .unwrap();

    (status, headers, body)
}

pub fn text(body: &Bytes) -> String {
    String::from_utf8_lossy(body).into_owned()
}
