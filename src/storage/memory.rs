//! In-memory object store for tests and local experiments

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::{ObjectStore, StorageError};

/// Object store holding everything in a process-local map
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn address(bucket: &str, key: &str) -> String {
        format!("{bucket}/{key}")
    }

    /// Seed an object without going through the trait
    pub async fn insert(&self, bucket: &str, key: &str, bytes: Vec<u8>) {
        self.objects
            .lock()
            .await
            .insert(Self::address(bucket, key), bytes);
    }

    /// Current contents of an object, if stored
    pub async fn contents(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .await
            .get(&Self::address(bucket, key))
            .cloned()
    }

    /// Number of stored objects
    pub async fn object_count(&self) -> usize {
        self.objects.lock().await.len()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        self.objects
            .lock()
            .await
            .get(&Self::address(bucket, key))
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("{bucket}/{key}")))
    }

    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.insert(bucket, key, bytes).await;
        Ok(())
    }
}
