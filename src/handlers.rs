use std::io::ErrorKind;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::AppState;
use crate::error::FileServerError;
use crate::listing::{ListingPage, read_entries};
use crate::paths::{is_missing, relative_path, resolve_and_verify_path};

/// GET / - List the root directory
pub async fn list_root(State(state): State<AppState>) -> Result<Html<String>, FileServerError> {
    list_directory(&state, "").await
}

/// GET /{*path} - List a directory below the root
pub async fn list_dir(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Html<String>, FileServerError> {
    list_directory(&state, &path).await
}

async fn list_directory(
    state: &AppState,
    requested: &str,
) -> Result<Html<String>, FileServerError> {
    let path = resolve_and_verify_path(&state.root_dir, requested).await?;

    // Anything that cannot be enumerated, missing targets included, is a read failure
    let metadata = fs::metadata(&path).await?;

    if !metadata.is_dir() {
        return Err(FileServerError::ReadFailure(std::io::Error::new(
            ErrorKind::NotADirectory,
            format!("{} is not a directory", path.display()),
        )));
    }

    debug!("Listing directory: {}", path.display());
    let entries = read_entries(&path).await?;
    let relative = relative_path(&state.root_dir, &path);

    Ok(Html(ListingPage::new(&relative, &entries).to_string()))
}

/// GET /download/{*path} - Stream a single file as an attachment
pub async fn download(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, FileServerError> {
    download_file(&state, &path).await
}

/// GET /download/ - The root is a directory and is never downloadable
pub async fn download_root(State(state): State<AppState>) -> Result<Response, FileServerError> {
    download_file(&state, "").await
}

async fn download_file(state: &AppState, requested: &str) -> Result<Response, FileServerError> {
    let path = resolve_and_verify_path(&state.root_dir, requested).await?;

    let metadata = match fs::metadata(&path).await {
        Ok(metadata) => metadata,
        Err(err) if is_missing(&err) => return Err(FileServerError::NotFound(requested.into())),
        Err(err) => return Err(err.into()),
    };

    if metadata.is_dir() {
        return Err(FileServerError::IsADirectory);
    }

    let file = match fs::File::open(&path).await {
        Ok(file) => file,
        Err(err) if is_missing(&err) => return Err(FileServerError::NotFound(requested.into())),
        Err(err) => return Err(err.into()),
    };

    debug!("Downloading file: {}", path.display());

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());
    let safe_filename = file_name.replace('"', "'");

    let mime = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .to_string();

    // The handle lives inside the body stream and is closed when the stream is dropped
    let body = Body::from_stream(ReaderStream::new(file));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime),
            (header::CONTENT_LENGTH, metadata.len().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", safe_filename),
            ),
        ],
        body,
    )
        .into_response())
}
