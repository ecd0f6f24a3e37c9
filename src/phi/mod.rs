//! PHI classification boundary
//!
//! The medical-entity detector runs as an external service; this module
//! defines the call boundary and the policy that turns its scored entities
//! into a redact/keep decision.

pub mod comprehend;

pub use comprehend::ComprehendMedicalDetector;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors from the entity detection boundary
#[derive(Debug, Error)]
pub enum PhiError {
    #[error("entity detection service error: {0}")]
    Service(String),

    #[error("entity detection timed out after {0:?}")]
    Timeout(Duration),
}

/// Scored entity returned by the medical-entity detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhiEntity {
    /// Entity text, when the service reports it
    pub text: Option<String>,
    /// Entity category label (e.g. "NAME", "AGE")
    pub category: Option<String>,
    /// Confidence score (0.0 - 1.0)
    pub score: f32,
}

/// Boundary to the external medical-entity detector
#[async_trait]
pub trait PhiDetector: Send + Sync {
    /// Detect PHI entities in a text fragment. Failures are not retried
    /// here; the trigger runtime owns replay.
    async fn detect_phi(&self, text: &str) -> Result<Vec<PhiEntity>, PhiError>;
}

/// How entity scores decide whether a line is PHI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// Trust only the top-ranked entity. Assumes the detector returns
    /// entities sorted by descending confidence.
    #[default]
    TopEntity,
    /// Accept when any entity clears the threshold
    AnyEntity,
}

impl ScoringPolicy {
    /// True when `entities` marks its source line as PHI at `threshold`.
    /// A score must be strictly greater than the threshold to count.
    pub fn is_phi(&self, entities: &[PhiEntity], threshold: f32) -> bool {
        match self {
            ScoringPolicy::TopEntity => entities
                .first()
                .map(|e| e.score > threshold)
                .unwrap_or(false),
            ScoringPolicy::AnyEntity => entities.iter().any(|e| e.score > threshold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(score: f32) -> PhiEntity {
        PhiEntity {
            text: None,
            category: None,
            score,
        }
    }

    #[test]
    fn test_no_entities_is_never_phi() {
        for threshold in [0.0, 0.4, 1.0] {
            assert!(!ScoringPolicy::TopEntity.is_phi(&[], threshold));
            assert!(!ScoringPolicy::AnyEntity.is_phi(&[], threshold));
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        let policy = ScoringPolicy::TopEntity;

        assert!(policy.is_phi(&[entity(0.5)], 0.4));
        assert!(!policy.is_phi(&[entity(0.3)], 0.4));
        // Equal to the threshold does not count
        assert!(!policy.is_phi(&[entity(0.4)], 0.4));
    }

    #[test]
    fn test_top_entity_ignores_later_entities() {
        // Only the first entity is consulted, whatever follows it
        let entities = [entity(0.1), entity(0.95)];

        assert!(!ScoringPolicy::TopEntity.is_phi(&entities, 0.4));
        assert!(ScoringPolicy::AnyEntity.is_phi(&entities, 0.4));
    }

    #[test]
    fn test_policy_serde_names() {
        assert_eq!(
            serde_json::to_string(&ScoringPolicy::TopEntity).unwrap(),
            "\"top_entity\""
        );
        let parsed: ScoringPolicy = serde_json::from_str("\"any_entity\"").unwrap();
        assert_eq!(parsed, ScoringPolicy::AnyEntity);
    }
}
