//! S3 object storage

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::{primitives::ByteStream, Client};

use super::{ObjectStore, StorageError};

/// Object store backed by S3 or an S3-compatible service
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the shared AWS configuration, optionally pointing
    /// at a custom endpoint (MinIO and friends need path-style addressing).
    pub fn from_shared_config(shared: &SdkConfig, endpoint: Option<String>) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(shared);
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let message = e.to_string();
                if message.contains("NoSuchKey") {
                    StorageError::NotFound(format!("s3://{bucket}/{key}"))
                } else {
                    StorageError::Service(message)
                }
            })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Service(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Service(e.to_string()))?;

        Ok(())
    }
}
