use std::path::{Path, PathBuf};

use crate::storage::paths::relative_key;
use crate::storage::{ObjectMetadata, ObjectStore, ObjectStream, StorageError};

use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use tokio::{
    fs::{File, create_dir_all, metadata},
    io::{self, AsyncWriteExt, BufWriter},
};
use tokio_util::io::ReaderStream;

/// Stores every object as a plain file at `<root>/<key>`.
pub struct FilesystemStorage {
    root: PathBuf,
}

impl FilesystemStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FilesystemStorage { root: root.into() }
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        // Keys come straight from request paths, keep them inside the root.
        relative_key(Path::new(key))
            .map(|clean| self.root.join(clean))
            .ok_or_else(|| StorageError::InvalidKey(key.to_string()))
    }

    async fn crate_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.object_path(key)?;
        if let Some(parent) = file_path.parent() {
            create_dir_all(parent).await?;
        }
        Ok(file_path)
    }
}

fn map_io(key: &str, err: io::Error) -> StorageError {
    if err.kind() == io::ErrorKind::NotFound {
        StorageError::NotFound(key.to_string())
    } else {
        StorageError::Io(err)
    }
}

#[async_trait::async_trait]
impl ObjectStore for FilesystemStorage {
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        _content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let file_path = self.crate_path(key).await?;
        let mut file_writer = BufWriter::new(File::create(file_path).await?);
        file_writer.write_all(&body).await?;
        file_writer.flush().await?;
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Bytes, StorageError> {
        let file_path = self.object_path(key)?;
        tokio::fs::read(file_path)
            .await
            .map(Bytes::from)
            .map_err(|e| map_io(key, e))
    }

    async fn head_object(&self, key: &str) -> Result<ObjectMetadata, StorageError> {
        let file_path = self.object_path(key)?;
        let meta = metadata(file_path).await.map_err(|e| map_io(key, e))?;
        if !meta.is_file() {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(ObjectMetadata {
            key: key.to_string(),
            content_type: None,
        })
    }

    async fn get_object_stream(&self, key: &str) -> Result<ObjectStream, StorageError> {
        let file_path = self.object_path(key)?;
        let file = File::open(file_path).await.map_err(|e| map_io(key, e))?;
        Ok(ReaderStream::new(file).map_err(StorageError::Io).boxed())
    }

    async fn head_bucket(&self) -> Result<(), StorageError> {
        let meta = metadata(&self.root)
            .await
            .map_err(|e| map_io(&self.root.display().to_string(), e))?;
        if meta.is_dir() {
            Ok(())
        } else {
            Err(StorageError::backend(
                self.root.display().to_string(),
                "storage root exists but is not a directory",
            ))
        }
    }
}
