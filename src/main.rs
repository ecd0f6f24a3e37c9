//! PhiRedact - Automated PHI redaction for stored medical images
//!
//! Removes burned-in Personal Health Information from medical images:
//! detects text with an external OCR service, classifies each line with a
//! medical-entity service, and paints opaque boxes over the hits before
//! storing the image back under a rewritten key.

mod config;
mod detect;
mod geometry;
mod phi;
mod pipeline;
mod redact;
mod storage;

use anyhow::{bail, Context, Result};
use clap::Parser;
use image::Rgba;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::AppConfig;
use crate::detect::RekognitionTextDetector;
use crate::phi::ComprehendMedicalDetector;
use crate::pipeline::{
    EventNotification, ObjectCreatedEvent, Pipeline, PipelineSettings,
};
use crate::redact::planner::PlannerSettings;
use crate::redact::{RedactionStyle, Redactor};
use crate::storage::S3ObjectStore;

/// PhiRedact - PHI redaction pipeline for stored medical images
#[derive(Parser, Debug)]
#[command(name = "phi-redact")]
#[command(about = "Redacts burned-in PHI from medical images in object storage")]
struct Args {
    /// Path to a TOML configuration file (defaults to the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to a storage event notification JSON file
    #[arg(long)]
    event_file: Option<PathBuf>,

    /// Bucket of a single object to process (requires --key)
    #[arg(long)]
    bucket: Option<String>,

    /// Key of a single object to process (requires --bucket)
    #[arg(long)]
    key: Option<String>,

    /// Write an animated audit preview GIF to this path
    #[arg(long)]
    preview_gif: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("PhiRedact starting...");

    // Load or create configuration
    let config = load_or_create_config(args.config.as_deref())?;

    let events = collect_events(&args)?;
    if events.is_empty() {
        bail!("nothing to process: pass --event-file or --bucket/--key");
    }

    let pipeline = build_pipeline(&config, args.preview_gif).await;

    let mut failed = 0usize;
    for event in &events {
        info!(bucket = %event.bucket, key = %event.key, "processing object");
        let outcome = pipeline.handle(event).await;
        println!("{}", serde_json::to_string(&outcome)?);
        if !(200..300).contains(&outcome.status_code) {
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{failed} of {} invocations failed", events.len());
    }

    info!("PhiRedact complete");

    Ok(())
}

/// Load configuration from an explicit path, the user config dir, or defaults
fn load_or_create_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        let config = config::load_config(path)
            .with_context(|| format!("failed to load config from {path:?}"))?;
        info!("Loaded configuration from {:?}", path);
        return Ok(config);
    }

    if let Ok(config_dir) = config::get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            if let Ok(config) = config::load_config(&config_path) {
                info!("Loaded configuration from {:?}", config_path);
                return Ok(config);
            }
        }
    }

    info!("Using default configuration");
    Ok(AppConfig::default())
}

/// Resolve the objects to process from the CLI arguments
fn collect_events(args: &Args) -> Result<Vec<ObjectCreatedEvent>> {
    if let Some(path) = &args.event_file {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read event file {path:?}"))?;
        let notification: EventNotification =
            serde_json::from_str(&raw).context("invalid event notification")?;
        return Ok(notification.object_events());
    }

    match (&args.bucket, &args.key) {
        (Some(bucket), Some(key)) => Ok(vec![ObjectCreatedEvent {
            bucket: bucket.clone(),
            key: key.clone(),
        }]),
        (None, None) => Ok(vec![]),
        _ => bail!("--bucket and --key must be passed together"),
    }
}

/// Wire the production collaborators into a pipeline
async fn build_pipeline(config: &AppConfig, preview: Option<PathBuf>) -> Pipeline {
    let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws.region.clone()))
        .load()
        .await;

    let store = S3ObjectStore::from_shared_config(&shared, config.aws.s3_endpoint.clone());
    let detector = RekognitionTextDetector::new(aws_sdk_rekognition::Client::new(&shared));
    let classifier = ComprehendMedicalDetector::new(aws_sdk_comprehendmedical::Client::new(&shared));

    let style = RedactionStyle {
        fill: Rgba(config.redaction.fill_color),
        outline: Rgba(config.redaction.outline_color),
        outline_width: config.redaction.outline_width,
    };

    let call_timeout = Duration::from_secs(config.pipeline.call_timeout_secs);
    let settings = PipelineSettings {
        planner: PlannerSettings {
            threshold: config.redaction.threshold,
            policy: config.redaction.policy,
            call_timeout,
            classification_fanout: config.pipeline.classification_fanout,
        },
        key_rewrite: config.routing.clone(),
        call_timeout,
        preview_path: preview,
    };

    Pipeline::new(
        Arc::new(store),
        Arc::new(detector),
        Arc::new(classifier),
        Redactor::new(style),
        settings,
    )
}
