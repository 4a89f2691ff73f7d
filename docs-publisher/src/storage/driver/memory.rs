use std::collections::BTreeMap;
use std::sync::Arc;

use crate::storage::{ObjectMetadata, ObjectStore, ObjectStream, StorageError};

use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::RwLock;

#[derive(Clone, Debug)]
struct StoredObject {
    body: Bytes,
    content_type: Option<String>,
}

/// In-process object store, used for tests and throwaway local runs.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently stored, in lexicographic order.
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryStorage {
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let mut objects = self.objects.write().await;
        objects.insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.map(str::to_string),
            },
        );
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Bytes, StorageError> {
        let objects = self.objects.read().await;
        objects
            .get(key)
            .map(|object| object.body.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn head_object(&self, key: &str) -> Result<ObjectMetadata, StorageError> {
        let objects = self.objects.read().await;
        let object = objects
            .get(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        Ok(ObjectMetadata {
            key: key.to_string(),
            content_type: object.content_type.clone(),
        })
    }

    async fn get_object_stream(&self, key: &str) -> Result<ObjectStream, StorageError> {
        let body = self.get_object(key).await?;
        Ok(futures::stream::once(async move { Ok::<_, StorageError>(body) }).boxed())
    }

    async fn head_bucket(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
