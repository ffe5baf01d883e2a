use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum FileServerError {
    #[error("Path is outside root directory")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cannot download a directory")]
    IsADirectory,

    #[error("Read failure: {0}")]
    ReadFailure(#[from] std::io::Error),
}

impl FileServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            FileServerError::Forbidden => StatusCode::FORBIDDEN,
            FileServerError::NotFound(_) => StatusCode::NOT_FOUND,
            FileServerError::IsADirectory => StatusCode::BAD_REQUEST,
            FileServerError::ReadFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            FileServerError::Forbidden => "FORBIDDEN",
            FileServerError::NotFound(_) => "NOT_FOUND",
            FileServerError::IsADirectory => "IS_A_DIRECTORY",
            FileServerError::ReadFailure(_) => "READ_FAILURE",
        }
    }

    /// Message sent to the client. Never carries filesystem detail.
    fn public_message(&self) -> &'static str {
        match self {
            FileServerError::Forbidden => "Forbidden",
            FileServerError::NotFound(_) => "Not Found",
            FileServerError::IsADirectory => "Cannot download a directory",
            FileServerError::ReadFailure(_) => "Internal Server Error",
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    code: &'static str,
}

impl IntoResponse for FileServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        let body = ErrorResponse {
            error: self.public_message(),
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}
