//! S3 backend built on `aws-sdk-s3`. Works against AWS and S3-compatible
//! stores (MinIO, Ceph RGW) through a custom endpoint.

use crate::config::S3Config;
use crate::storage::{ObjectMetadata, ObjectStore, ObjectStream, StorageError};

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use futures::StreamExt;

const CREDENTIALS_PROVIDER: &str = "docs-publisher";

pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    /// Builds the client from already validated configuration. No request
    /// is sent here; reachability is checked by `head_bucket`.
    pub async fn new(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            config.credentials.access_key_id.clone(),
            config.credentials.secret_access_key.clone(),
            config.credentials.session_token.clone(),
            None,
            CREDENTIALS_PROVIDER,
        );
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();

        tracing::info!("Initializing S3 client for bucket: {}", config.bucket);
        S3Storage {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }
}

fn get_error(key: &str, err: SdkError<GetObjectError>) -> StorageError {
    let message = DisplayErrorContext(&err).to_string();
    if err.into_service_error().is_no_such_key() {
        StorageError::NotFound(key.to_string())
    } else {
        StorageError::backend(key, message)
    }
}

fn head_error(key: &str, err: SdkError<HeadObjectError>) -> StorageError {
    let message = DisplayErrorContext(&err).to_string();
    if err.into_service_error().is_not_found() {
        StorageError::NotFound(key.to_string())
    } else {
        StorageError::backend(key, message)
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .set_content_type(content_type.map(str::to_string))
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StorageError::backend(key, DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Bytes, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| get_error(key, e))?;
        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::backend(key, e.to_string()))?;
        Ok(data.into_bytes())
    }

    async fn head_object(&self, key: &str) -> Result<ObjectMetadata, StorageError> {
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| head_error(key, e))?;
        Ok(ObjectMetadata {
            key: key.to_string(),
            content_type: output.content_type().map(str::to_string),
        })
    }

    async fn get_object_stream(&self, key: &str) -> Result<ObjectStream, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| get_error(key, e))?;

        let stream = futures::stream::unfold(
            (output.body, key.to_string()),
            |(mut body, key)| async move {
                let chunk = body.next().await?;
                let chunk = chunk.map_err(|e| StorageError::backend(&key, e.to_string()));
                Some((chunk, (body, key)))
            },
        );
        Ok(stream.boxed())
    }

    async fn head_bucket(&self) -> Result<(), StorageError> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::backend(&self.bucket, DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}
