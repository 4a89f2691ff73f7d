use std::path::Path;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::TryStreamExt;
use tokio::task::JoinHandle;

use crate::domain::EntityIdentity;
use crate::error::AppError;
use crate::storage::paths::{index_key, metadata_key, object_key};
use crate::storage::ObjectStore;
use crate::utils::headers::content_type_for;
use crate::utils::walk::walk_site_dir;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishOutcome {
    pub prefix: String,
    /// Keys written, in the order the files were enumerated.
    pub uploaded: Vec<String>,
}

/// Publishes, retrieves and checks generated documentation sites. One
/// instance is shared by every request for the lifetime of the process.
pub struct DocsPublisher {
    storage: Arc<dyn ObjectStore>,
    bucket: String,
    max_concurrent_uploads: usize,
}

impl DocsPublisher {
    pub fn new(
        storage: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        max_concurrent_uploads: usize,
    ) -> Self {
        DocsPublisher {
            storage,
            bucket: bucket.into(),
            max_concurrent_uploads: max_concurrent_uploads.max(1),
        }
    }

    pub fn storage(&self) -> &dyn ObjectStore {
        self.storage.as_ref()
    }

    /// Starts the bucket reachability check in the background. The publisher is usable
    /// before the check finishes; await the handle to wait for readiness.
    pub fn spawn_bucket_check(&self) -> JoinHandle<Result<(), AppError>> {
        let storage = Arc::clone(&self.storage);
        let bucket = self.bucket.clone();
        tokio::spawn(async move { verify_bucket(storage.as_ref(), &bucket).await })
    }

    pub async fn check_bucket(&self) -> Result<(), AppError> {
        verify_bucket(self.storage.as_ref(), &self.bucket).await
    }

    /// Uploads every regular file under `directory` to
    /// `<namespace>/<kind>/<name>/<relative path>`.
    ///
    /// The first read or upload failure is returned and the uploads still in
    /// flight are dropped. Objects written before the failure stay in the
    /// store.
    pub async fn publish(
        &self,
        entity: &EntityIdentity,
        directory: &Path,
    ) -> Result<PublishOutcome, AppError> {
        let files = walk_site_dir(directory).await?;
        let prefix = entity.prefix();
        if files.is_empty() {
            tracing::warn!(
                "No files found in {}, nothing to publish for {}",
                directory.display(),
                entity
            );
        }

        let uploads: Vec<_> = files
            .into_iter()
            .map(|file| {
                let key = object_key(entity, &file.relative_path);
                (file.absolute_path, key)
            })
            .collect();
        let uploaded: Vec<String> = uploads.iter().map(|(_, key)| key.clone()).collect();

        let storage = &self.storage;
        futures::stream::iter(uploads.into_iter().map(Ok::<_, AppError>))
            .try_for_each_concurrent(self.max_concurrent_uploads, |(path, key)| async move {
                let body = tokio::fs::read(&path)
                    .await
                    .map_err(|e| AppError::read(&path, e))?;
                storage
                    .put_object(&key, Bytes::from(body), content_type_for(&key))
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to upload {key}: {e}");
                        AppError::Upload {
                            key: key.clone(),
                            message: e.to_string(),
                        }
                    })?;
                tracing::debug!("Uploaded {} as {}", path.display(), key);
                Ok::<(), AppError>(())
            })
            .await?;

        tracing::info!(
            "Successfully uploaded {} file(s) for entity {} to {}/{}",
            uploaded.len(),
            entity,
            self.bucket,
            prefix
        );
        Ok(PublishOutcome { prefix, uploaded })
    }

    /// Reads `<prefix>/techdocs_metadata.json` as UTF-8 text.
    pub async fn fetch_metadata(&self, entity: &EntityIdentity) -> Result<String, AppError> {
        let key = metadata_key(entity);
        let body = self
            .read_object(&key)
            .await
            .map_err(|e| AppError::NotFound(format!("TechDocs metadata fetch failed: {e}")))?;
        String::from_utf8(body.to_vec()).map_err(|e| {
            AppError::NotFound(format!("TechDocs metadata fetch failed: `{key}` is not UTF-8: {e}"))
        })
    }

    /// Whether `<prefix>/index.html` can be retrieved. Every error counts as
    /// "not generated".
    pub async fn has_docs_been_generated(&self, entity: &EntityIdentity) -> bool {
        let key = index_key(entity);
        match self.storage.head_object(&key).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("Docs for {} are not available: {}", entity, e);
                false
            }
        }
    }

    /// Drains the object's stream into one buffer.
    pub async fn read_object(&self, key: &str) -> Result<Bytes, AppError> {
        let mut stream = self.storage.get_object_stream(key).await?;
        let mut buf = BytesMut::new();
        while let Some(chunk) = stream.try_next().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }
}

async fn verify_bucket(storage: &dyn ObjectStore, bucket: &str) -> Result<(), AppError> {
    match storage.head_bucket().await {
        Ok(()) => {
            tracing::info!("Bucket {} is reachable", bucket);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "Could not retrieve metadata about the bucket {}. \
                 Make sure the bucket exists and the configured credentials can access it. {}",
                bucket,
                e
            );
            Err(AppError::Connectivity {
                bucket: bucket.to_string(),
                message: e.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;
    use crate::storage::driver::memory::MemoryStorage;

    fn foo() -> EntityIdentity {
        EntityIdentity::new("default", "Component", "foo").unwrap()
    }

    fn publisher(storage: &MemoryStorage) -> DocsPublisher {
        DocsPublisher::new(Arc::new(storage.clone()), "docs", 4)
    }

    #[tokio::test]
    async fn publish_uploads_every_file_under_the_prefix() {
        let site = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(site.path().join("sub")).unwrap();
        std::fs::write(site.path().join("index.html"), "<h1>foo</h1>").unwrap();
        std::fs::write(site.path().join("sub/page.html"), "<p>page</p>").unwrap();

        let storage = MemoryStorage::new();
        let outcome = publisher(&storage).publish(&foo(), site.path()).await.unwrap();

        assert_eq!(outcome.prefix, "default/Component/foo");
        assert_eq!(
            outcome.uploaded,
            vec![
                "default/Component/foo/index.html".to_string(),
                "default/Component/foo/sub/page.html".to_string(),
            ]
        );
        assert_eq!(storage.keys().await, outcome.uploaded);
        assert_eq!(
            storage.get_object("default/Component/foo/sub/page.html").await.unwrap(),
            Bytes::from("<p>page</p>")
        );
    }

    #[tokio::test]
    async fn uploads_carry_content_type() {
        let site = tempfile::tempdir().unwrap();
        std::fs::write(site.path().join("main.css"), "body{}").unwrap();

        let storage = MemoryStorage::new();
        publisher(&storage).publish(&foo(), site.path()).await.unwrap();

        let meta = storage.head_object("default/Component/foo/main.css").await.unwrap();
        assert_eq!(meta.content_type.as_deref(), Some("text/css; charset=utf-8"));
    }

    #[tokio::test]
    async fn empty_directory_publishes_nothing() {
        let site = tempfile::tempdir().unwrap();
        let storage = MemoryStorage::new();
        let outcome = publisher(&storage).publish(&foo(), site.path()).await.unwrap();
        assert!(outcome.uploaded.is_empty());
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn missing_directory_is_a_read_error() {
        let site = tempfile::tempdir().unwrap();
        let storage = MemoryStorage::new();
        let err = publisher(&storage)
            .publish(&foo(), &site.path().join("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Read { .. }));
    }

    #[tokio::test]
    async fn generated_flag_follows_index_html() {
        let storage = MemoryStorage::new();
        let publisher = publisher(&storage);
        assert!(!publisher.has_docs_been_generated(&foo()).await);

        storage
            .put_object("default/Component/foo/index.html", Bytes::from("x"), None)
            .await
            .unwrap();
        assert!(publisher.has_docs_been_generated(&foo()).await);
    }

    #[tokio::test]
    async fn metadata_is_read_as_text() {
        let storage = MemoryStorage::new();
        storage
            .put_object(
                "default/Component/foo/techdocs_metadata.json",
                Bytes::from(r#"{"site_name":"foo"}"#),
                None,
            )
            .await
            .unwrap();

        let metadata = publisher(&storage).fetch_metadata(&foo()).await.unwrap();
        assert_eq!(metadata, r#"{"site_name":"foo"}"#);
    }

    #[tokio::test]
    async fn missing_metadata_is_not_found() {
        let storage = MemoryStorage::new();
        let err = publisher(&storage).fetch_metadata(&foo()).await.unwrap_err();
        match err {
            AppError::NotFound(msg) => assert!(msg.contains("techdocs_metadata.json")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn metadata_that_is_not_utf8_is_rejected() {
        let storage = MemoryStorage::new();
        storage
            .put_object(
                "default/Component/foo/techdocs_metadata.json",
                Bytes::from_static(&[0xff, 0xfe]),
                None,
            )
            .await
            .unwrap();
        let err = publisher(&storage).fetch_metadata(&foo()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn read_object_surfaces_storage_errors() {
        let storage = MemoryStorage::new();
        let err = publisher(&storage)
            .read_object("default/Component/foo/missing.html")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(StorageError::NotFound(_))));
        assert!(err.to_string().contains("missing.html"));
    }

    #[tokio::test]
    async fn bucket_check_runs_in_background() {
        let storage = MemoryStorage::new();
        let publisher = publisher(&storage);
        publisher.spawn_bucket_check().await.unwrap().unwrap();
        publisher.check_bucket().await.unwrap();
    }
}
