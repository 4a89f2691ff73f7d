use std::io;
use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum AppError {
    // Startup
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("bucket `{bucket}` is not reachable: {message}")]
    Connectivity { bucket: String, message: String },

    // Publish
    #[error("unable to read `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to upload `{key}`: {message}")]
    Upload { key: String, message: String },

    // Retrieval
    #[error("{0}")]
    NotFound(String),

    #[error("invalid entity: {0}")]
    InvalidEntity(String),

    // Internal Errors
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AppError {
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AppError::Read {
            path: path.into(),
            source,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("Generating response for AppError: {:?}", self);

        let status_code = match &self {
            Self::NotFound(_) | Self::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::InvalidEntity(_) | Self::Storage(StorageError::InvalidKey(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Connectivity { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status_code, self.to_string()).into_response()
    }
}
