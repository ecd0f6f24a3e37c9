//! Application Configuration
//!
//! Pipeline settings and service endpoints stored in TOML format.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::phi::ScoringPolicy;
use crate::storage::KeyRewrite;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// AWS client settings
    pub aws: AwsSettings,
    /// PHI decision and paint settings
    pub redaction: RedactionSettings,
    /// Destination key derivation
    pub routing: KeyRewrite,
    /// Invocation tuning
    pub pipeline: PipelineTuning,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            aws: AwsSettings::default(),
            redaction: RedactionSettings::default(),
            routing: KeyRewrite::default(),
            pipeline: PipelineTuning::default(),
        }
    }
}

/// AWS client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsSettings {
    /// Region for all service clients
    pub region: String,
    /// Custom S3 endpoint for S3-compatible stores, absent for AWS
    pub s3_endpoint: Option<String>,
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            s3_endpoint: None,
        }
    }
}

/// PHI decision and paint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionSettings {
    /// Minimum entity score; a line is PHI only strictly above this
    pub threshold: f32,
    /// How entity scores are combined into a decision
    pub policy: ScoringPolicy,
    /// RGBA fill color for redaction boxes
    pub fill_color: [u8; 4],
    /// RGBA outline color for redaction boxes
    pub outline_color: [u8; 4],
    /// Outline thickness in pixels
    pub outline_width: u32,
}

impl Default for RedactionSettings {
    fn default() -> Self {
        Self {
            threshold: 0.4,
            policy: ScoringPolicy::default(),
            fill_color: [20, 20, 20, 255],
            outline_color: [255, 255, 255, 255],
            outline_width: 3,
        }
    }
}

/// Invocation tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineTuning {
    /// Budget for each external call, in seconds
    pub call_timeout_secs: u64,
    /// Concurrent classification calls per invocation
    pub classification_fanout: usize,
}

impl Default for PipelineTuning {
    fn default() -> Self {
        Self {
            call_timeout_secs: 30,
            classification_fanout: 4,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "phiredact", "PhiRedact")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}
