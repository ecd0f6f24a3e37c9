//! Redaction planner
//!
//! Classifies detected lines and maps the PHI hits onto pixel regions.
//! Region order always matches detection order, which fixes how overlapping
//! boxes layer when they are painted.

use futures_util::stream::{self, StreamExt};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::RedactionRegion;
use crate::detect::{BlockKind, TextBlock};
use crate::geometry::{self, GeometryError};
use crate::phi::{PhiDetector, PhiEntity, PhiError, ScoringPolicy};

/// Tuning for the planning pass
#[derive(Debug, Clone)]
pub struct PlannerSettings {
    /// Minimum entity score; strictly-greater wins
    pub threshold: f32,
    /// How entity scores are combined into a decision
    pub policy: ScoringPolicy,
    /// Budget for each classification call
    pub call_timeout: Duration,
    /// Concurrent classification calls in flight
    pub classification_fanout: usize,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            threshold: 0.4,
            policy: ScoringPolicy::default(),
            call_timeout: Duration::from_secs(30),
            classification_fanout: 4,
        }
    }
}

/// A line whose classification call failed; recorded, not fatal
#[derive(Debug)]
pub struct ClassificationFailure {
    /// Text of the line that could not be classified
    pub text: String,
    /// The error the detector returned
    pub error: PhiError,
}

/// Outcome of a planning pass
#[derive(Debug, Default)]
pub struct RedactionPlan {
    /// Regions to paint, in detection order
    pub regions: Vec<RedactionRegion>,
    /// Lines skipped because classification failed
    pub failures: Vec<ClassificationFailure>,
    /// Number of lines submitted for classification
    pub lines_classified: usize,
}

impl RedactionPlan {
    /// True when classification failed for every submitted line
    pub fn all_failed(&self) -> bool {
        self.lines_classified > 0 && self.failures.len() == self.lines_classified
    }
}

/// Composes classification and geometry mapping over detected text
pub struct RedactionPlanner<'a> {
    detector: &'a dyn PhiDetector,
    settings: PlannerSettings,
}

impl<'a> RedactionPlanner<'a> {
    pub fn new(detector: &'a dyn PhiDetector, settings: PlannerSettings) -> Self {
        Self { detector, settings }
    }

    /// Plan redactions for all detected blocks.
    ///
    /// Word blocks are skipped: whole lines give the classifier enough
    /// context to recognize entities that span several words. Classification
    /// may fan out, but results are consumed in submission order so the
    /// plan stays stable.
    pub async fn plan(
        &self,
        blocks: &[TextBlock],
        image_width: u32,
        image_height: u32,
    ) -> Result<RedactionPlan, GeometryError> {
        if image_width == 0 || image_height == 0 {
            return Err(GeometryError::InvalidImageDimensions {
                width: image_width,
                height: image_height,
            });
        }

        let lines: Vec<&TextBlock> = blocks
            .iter()
            .filter(|b| b.kind == BlockKind::Line)
            .collect();

        let fanout = self.settings.classification_fanout.max(1);
        let outcomes: Vec<Result<Vec<PhiEntity>, PhiError>> =
            stream::iter(lines.iter().map(|block| self.classify(block)))
                .buffered(fanout)
                .collect()
                .await;

        let mut plan = RedactionPlan {
            lines_classified: lines.len(),
            ..Default::default()
        };

        for (block, outcome) in lines.iter().zip(outcomes) {
            match outcome {
                Ok(entities) => {
                    if !self.settings.policy.is_phi(&entities, self.settings.threshold) {
                        continue;
                    }
                    match geometry::to_pixel_box(&block.geometry, image_width, image_height) {
                        Ok(bounds) => {
                            debug!(text = %block.text, ?bounds, "line marked for redaction");
                            plan.regions.push(RedactionRegion {
                                source_text: block.text.clone(),
                                bounds,
                            });
                        }
                        Err(error) => {
                            warn!(%error, "skipping line with degenerate geometry");
                        }
                    }
                }
                Err(error) => {
                    warn!(text_len = block.text.len(), %error, "classification failed for line");
                    plan.failures.push(ClassificationFailure {
                        text: block.text.clone(),
                        error,
                    });
                }
            }
        }

        Ok(plan)
    }

    async fn classify(&self, block: &TextBlock) -> Result<Vec<PhiEntity>, PhiError> {
        match timeout(self.settings.call_timeout, self.detector.detect_phi(&block.text)).await {
            Ok(result) => result,
            Err(_) => Err(PhiError::Timeout(self.settings.call_timeout)),
        }
    }
}
