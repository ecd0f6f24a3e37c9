//! Comprehend Medical entity detection

use async_trait::async_trait;
use aws_sdk_comprehendmedical::Client;
use tracing::debug;

use super::{PhiDetector, PhiEntity, PhiError};

/// PHI detector backed by AWS Comprehend Medical
pub struct ComprehendMedicalDetector {
    client: Client,
}

impl ComprehendMedicalDetector {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PhiDetector for ComprehendMedicalDetector {
    async fn detect_phi(&self, text: &str) -> Result<Vec<PhiEntity>, PhiError> {
        let response = self
            .client
            .detect_phi()
            .text(text)
            .send()
            .await
            .map_err(|e| PhiError::Service(e.to_string()))?;

        let entities: Vec<PhiEntity> = response
            .entities()
            .iter()
            .map(|e| PhiEntity {
                text: e.text().map(str::to_string),
                category: e.category().map(|c| c.as_str().to_string()),
                score: e.score().unwrap_or(0.0),
            })
            .collect();

        debug!(count = entities.len(), "entity detection complete");

        Ok(entities)
    }
}
