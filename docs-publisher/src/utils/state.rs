use crate::config::{Config, StorageConfig};
use crate::service::publisher::DocsPublisher;
use crate::storage::ObjectStore;
use crate::storage::driver::{filesystem::FilesystemStorage, memory::MemoryStorage, s3::S3Storage};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub publisher: Arc<DocsPublisher>,
}

impl AppState {
    pub async fn new(config: Config) -> Self {
        let (storage_backend, bucket): (Arc<dyn ObjectStore>, String) = match &config.storage {
            StorageConfig::S3(s3) => {
                let storage: Arc<dyn ObjectStore> = Arc::new(S3Storage::new(s3).await);
                (storage, s3.bucket.clone())
            }
            StorageConfig::Filesystem { root } => {
                let storage: Arc<dyn ObjectStore> = Arc::new(FilesystemStorage::new(root.clone()));
                (storage, root.display().to_string())
            }
            StorageConfig::Memory => {
                let storage: Arc<dyn ObjectStore> = Arc::new(MemoryStorage::new());
                (storage, "memory".to_string())
            }
        };

        let publisher =
            DocsPublisher::new(storage_backend, bucket, config.max_concurrent_uploads);
        AppState {
            publisher: Arc::new(publisher),
        }
    }
}
