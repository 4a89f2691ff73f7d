use bytes::Bytes;
use futures::stream::BoxStream;
use std::io;
use thiserror::Error;

pub mod driver;
pub mod paths;

pub type ObjectStream = BoxStream<'static, Result<Bytes, StorageError>>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("object `{0}` not found")]
    NotFound(String),

    #[error("invalid object key `{0}`")]
    InvalidKey(String),

    #[error("storage backend error for `{key}`: {message}")]
    Backend { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    pub fn backend(key: impl Into<String>, message: impl Into<String>) -> Self {
        StorageError::Backend {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub key: String,
    pub content_type: Option<String>,
}

/// The minimal object-store surface the publisher needs. Any backend
/// offering put/get/head/stream on string keys can sit behind it.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;
    async fn get_object(&self, key: &str) -> Result<Bytes, StorageError>;
    async fn head_object(&self, key: &str) -> Result<ObjectMetadata, StorageError>;
    async fn get_object_stream(&self, key: &str) -> Result<ObjectStream, StorageError>;
    /// Checks that the configured bucket (or root) is reachable.
    async fn head_bucket(&self) -> Result<(), StorageError>;
}
