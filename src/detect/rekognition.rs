//! Rekognition-backed text detection
//!
//! Rekognition reads the image straight from object storage, so the call
//! passes the bucket and key rather than pixel data.

use async_trait::async_trait;
use aws_sdk_rekognition::types::{Image, S3Object, TextDetection, TextTypes};
use aws_sdk_rekognition::Client;
use tracing::debug;

use super::{BlockKind, OcrError, TextBlock, TextDetector};
use crate::geometry::{NormalizedBox, NormalizedPoint, TextGeometry};

/// Text detector backed by AWS Rekognition
pub struct RekognitionTextDetector {
    client: Client,
}

impl RekognitionTextDetector {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TextDetector for RekognitionTextDetector {
    async fn detect_text(&self, bucket: &str, key: &str) -> Result<Vec<TextBlock>, OcrError> {
        let image = Image::builder()
            .s3_object(S3Object::builder().bucket(bucket).name(key).build())
            .build();

        let response = self
            .client
            .detect_text()
            .image(image)
            .send()
            .await
            .map_err(|e| OcrError::Service(e.to_string()))?;

        let blocks: Vec<TextBlock> = response
            .text_detections()
            .iter()
            .filter_map(convert_detection)
            .collect();

        debug!(count = blocks.len(), "text detection complete");

        Ok(blocks)
    }
}

/// Map a service detection onto a [`TextBlock`], dropping detections with
/// missing text, unknown granularity, or no usable geometry.
fn convert_detection(detection: &TextDetection) -> Option<TextBlock> {
    let text = detection.detected_text()?.to_string();

    let kind = match detection.r#type()? {
        TextTypes::Line => BlockKind::Line,
        TextTypes::Word => BlockKind::Word,
        _ => return None,
    };

    let geometry = detection.geometry()?;
    let geometry = if let Some(bb) = geometry.bounding_box() {
        TextGeometry::BoundingBox(NormalizedBox {
            left: bb.left().unwrap_or(0.0),
            top: bb.top().unwrap_or(0.0),
            width: bb.width().unwrap_or(0.0),
            height: bb.height().unwrap_or(0.0),
        })
    } else {
        let points: Vec<NormalizedPoint> = geometry
            .polygon()
            .iter()
            .map(|p| NormalizedPoint {
                x: p.x().unwrap_or(0.0),
                y: p.y().unwrap_or(0.0),
            })
            .collect();
        if points.is_empty() {
            return None;
        }
        TextGeometry::Polygon(points)
    };

    Some(TextBlock {
        text,
        kind,
        geometry,
    })
}
