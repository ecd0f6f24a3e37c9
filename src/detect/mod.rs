//! Text detection boundary
//!
//! OCR runs in an external service; this module defines the call boundary
//! and the detected-text types the planner consumes.

pub mod rekognition;

pub use rekognition::RekognitionTextDetector;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::geometry::TextGeometry;

/// Errors from the text detection boundary
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("text detection service error: {0}")]
    Service(String),

    #[error("text detection timed out after {0:?}")]
    Timeout(Duration),
}

/// Granularity of a detected text block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Full line with its bounding geometry
    Line,
    /// Individual word with its bounding geometry
    Word,
}

/// A unit of text found in the image, with its normalized geometry
#[derive(Debug, Clone)]
pub struct TextBlock {
    /// Detected text content
    pub text: String,
    /// Line or word granularity
    pub kind: BlockKind,
    /// Position normalized to the unit square
    pub geometry: TextGeometry,
}

/// Boundary to the external OCR service
#[async_trait]
pub trait TextDetector: Send + Sync {
    /// Detect text blocks in the stored image identified by bucket and key
    async fn detect_text(&self, bucket: &str, key: &str) -> Result<Vec<TextBlock>, OcrError>;
}
