//! Pipeline orchestration
//!
//! One invocation per stored object: fetch, detect, plan, apply, store.
//! Each stage either completes or fails the invocation; a partially
//! redacted image is never written back. Invocations are independent and
//! stateless, so the trigger runtime may safely replay them.

pub mod event;

pub use event::{EventNotification, ObjectCreatedEvent};

use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::Serialize;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::detect::{BlockKind, OcrError, TextDetector};
use crate::geometry::GeometryError;
use crate::phi::PhiDetector;
use crate::redact::planner::PlannerSettings;
use crate::redact::{preview, RedactionPlanner, Redactor};
use crate::storage::{KeyRewrite, ObjectStore, StorageError};

/// Errors that end an invocation
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to fetch source image: {0}")]
    ImageFetch(#[source] StorageError),

    #[error("failed to decode source image: {0}")]
    ImageDecode(#[source] image::ImageError),

    #[error("invalid image dimensions: {0}")]
    InvalidImageDimensions(#[source] GeometryError),

    #[error("text detection unavailable: {0}")]
    OcrUnavailable(#[source] OcrError),

    #[error("classification failed for all {lines} detected lines")]
    ClassificationUnavailable { lines: usize },

    #[error("failed to apply redactions: {0}")]
    RedactionApply(String),

    #[error("failed to store redacted image: {0}")]
    ImageStore(#[source] StorageError),
}

impl PipelineError {
    /// HTTP-style status for the trigger runtime
    pub fn status_code(&self) -> u16 {
        match self {
            PipelineError::ImageFetch(StorageError::Timeout(_))
            | PipelineError::ImageStore(StorageError::Timeout(_))
            | PipelineError::OcrUnavailable(OcrError::Timeout(_)) => 504,
            PipelineError::ImageFetch(_)
            | PipelineError::ImageStore(_)
            | PipelineError::OcrUnavailable(_)
            | PipelineError::ClassificationUnavailable { .. } => 502,
            PipelineError::ImageDecode(_) | PipelineError::InvalidImageDimensions(_) => 422,
            PipelineError::RedactionApply(_) => 500,
        }
    }
}

/// Structured result handed back to the trigger runtime
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationOutcome {
    pub status_code: u16,
    pub body: String,
}

/// What a successful invocation did
#[derive(Debug, Clone, Serialize)]
pub struct RedactionSummary {
    pub source_key: String,
    pub output_key: String,
    pub lines_detected: usize,
    pub regions_redacted: usize,
    pub classification_failures: usize,
}

/// Pipeline tuning independent of the collaborators
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Planning pass tuning (threshold, policy, fan-out)
    pub planner: PlannerSettings,
    /// Destination key derivation
    pub key_rewrite: KeyRewrite,
    /// Budget for each fetch, detect, and store call
    pub call_timeout: Duration,
    /// Write an animated audit preview here after a successful run
    pub preview_path: Option<PathBuf>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            planner: PlannerSettings::default(),
            key_rewrite: KeyRewrite::default(),
            call_timeout: Duration::from_secs(30),
            preview_path: None,
        }
    }
}

/// Event-driven entry point wiring the collaborators together
///
/// Collaborators are injected at construction so tests can substitute
/// in-process doubles for the managed services.
pub struct Pipeline {
    store: Arc<dyn ObjectStore>,
    detector: Arc<dyn TextDetector>,
    classifier: Arc<dyn PhiDetector>,
    redactor: Redactor,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        detector: Arc<dyn TextDetector>,
        classifier: Arc<dyn PhiDetector>,
        redactor: Redactor,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            store,
            detector,
            classifier,
            redactor,
            settings,
        }
    }

    /// Process one object-created event and report the outcome in the
    /// shape the trigger runtime expects.
    pub async fn handle(&self, event: &ObjectCreatedEvent) -> InvocationOutcome {
        let invocation = Uuid::new_v4();
        let span = tracing::info_span!(
            "invocation",
            id = %invocation,
            bucket = %event.bucket,
            key = %event.key,
        );

        match self.run(event).instrument(span).await {
            Ok(summary) => InvocationOutcome {
                status_code: 200,
                body: serde_json::to_string(&summary).unwrap_or_else(|_| "{}".to_string()),
            },
            Err(err) => {
                error!(id = %invocation, key = %event.key, error = %err, "invocation failed");
                InvocationOutcome {
                    status_code: err.status_code(),
                    body: err.to_string(),
                }
            }
        }
    }

    async fn run(&self, event: &ObjectCreatedEvent) -> Result<RedactionSummary, PipelineError> {
        let budget = self.settings.call_timeout;

        // FETCH_IMAGE
        let bytes = match timeout(budget, self.store.get(&event.bucket, &event.key)).await {
            Ok(result) => result.map_err(PipelineError::ImageFetch)?,
            Err(_) => return Err(PipelineError::ImageFetch(StorageError::Timeout(budget))),
        };
        info!(bytes = bytes.len(), "fetched source image");

        let mut working = image::load_from_memory(&bytes)
            .map_err(PipelineError::ImageDecode)?
            .to_rgba8();
        let (width, height) = working.dimensions();
        info!(width, height, "decoded source image");

        // DETECT_TEXT
        let blocks = match timeout(budget, self.detector.detect_text(&event.bucket, &event.key))
            .await
        {
            Ok(result) => result.map_err(PipelineError::OcrUnavailable)?,
            Err(_) => return Err(PipelineError::OcrUnavailable(OcrError::Timeout(budget))),
        };
        let lines_detected = blocks.iter().filter(|b| b.kind == BlockKind::Line).count();
        info!(
            blocks = blocks.len(),
            lines = lines_detected,
            "detected text"
        );

        // PLAN_REDACTIONS
        let planner = RedactionPlanner::new(self.classifier.as_ref(), self.settings.planner.clone());
        let plan = planner
            .plan(&blocks, width, height)
            .await
            .map_err(PipelineError::InvalidImageDimensions)?;

        if plan.all_failed() {
            return Err(PipelineError::ClassificationUnavailable {
                lines: plan.lines_classified,
            });
        }
        for failure in &plan.failures {
            warn!(error = %failure.error, "line skipped after classification failure");
        }

        // APPLY_REDACTIONS
        let frames = if self.settings.preview_path.is_some() {
            Some(self.redactor.redact_recording(&mut working, &plan.regions))
        } else {
            self.redactor.redact(&mut working, &plan.regions);
            None
        };

        // STORE_RESULT
        let output_key = self.settings.key_rewrite.apply(&event.key);
        let encoded = encode_for_key(&working, &output_key)
            .map_err(|e| PipelineError::ImageStore(StorageError::Service(e.to_string())))?;

        match timeout(budget, self.store.put(&event.bucket, &output_key, encoded)).await {
            Ok(result) => result.map_err(PipelineError::ImageStore)?,
            Err(_) => return Err(PipelineError::ImageStore(StorageError::Timeout(budget))),
        }
        info!(output_key = %output_key, "stored redacted image");

        // The preview is best-effort and never blocks a stored result
        if let (Some(path), Some(frames)) = (&self.settings.preview_path, frames) {
            if let Err(err) = preview::write_gif(path, frames) {
                warn!(error = %err, "failed to write audit preview");
            }
        }

        Ok(RedactionSummary {
            source_key: event.key.clone(),
            output_key,
            lines_detected,
            regions_redacted: plan.regions.len(),
            classification_failures: plan.failures.len(),
        })
    }
}

/// Encode the buffer in the format implied by the destination key
/// extension, falling back to JPEG.
fn encode_for_key(image: &RgbaImage, key: &str) -> Result<Vec<u8>, image::ImageError> {
    let format = Path::new(key)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageFormat::from_extension)
        .unwrap_or(ImageFormat::Jpeg);

    let mut bytes = Cursor::new(Vec::new());
    match format {
        // JPEG carries no alpha channel
        ImageFormat::Jpeg => {
            DynamicImage::ImageRgba8(image.clone())
                .to_rgb8()
                .write_to(&mut bytes, format)?;
        }
        _ => image.write_to(&mut bytes, format)?,
    }

    Ok(bytes.into_inner())
}
