//! Object storage boundary
//!
//! Images come in and go out through object storage. The trait keeps the
//! pipeline substitutable with test doubles; the production implementation
//! targets S3-compatible stores.

pub mod memory;
pub mod s3;

pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Storage boundary errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage service error: {0}")]
    Service(String),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("storage call timed out after {0:?}")]
    Timeout(Duration),
}

/// Minimal capability set the pipeline needs from object storage
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the raw bytes of an object
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Store raw bytes under a key
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<(), StorageError>;
}

/// Rewrite rule deriving the destination key from the trigger key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRewrite {
    /// Prefix expected on incoming keys
    pub match_prefix: String,
    /// Prefix it is replaced with on the destination key
    pub replace_with: String,
}

impl Default for KeyRewrite {
    fn default() -> Self {
        Self {
            match_prefix: "incoming/".to_string(),
            replace_with: "redacted/".to_string(),
        }
    }
}

impl KeyRewrite {
    /// Destination key for a trigger key. A key outside `match_prefix` gets
    /// `replace_with` prepended, so output can never land back on the
    /// trigger path and re-fire the pipeline.
    pub fn apply(&self, key: &str) -> String {
        match key.strip_prefix(&self.match_prefix) {
            Some(rest) => format!("{}{}", self.replace_with, rest),
            None => format!("{}{}", self.replace_with, key),
        }
    }
}
