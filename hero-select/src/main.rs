//! hero-select - Hotel main-image selection batch job
//!
//! Reads three line-delimited JSON inputs (images, tags, prior main-image
//! assignments), picks one main image per hotel, and writes three outputs:
//! a CDC stream of per-hotel changes, a full snapshot of the new
//! assignment, and a run metrics record. Outputs are written atomically
//! and only after the whole run succeeds; an aborted run publishes
//! nothing.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Parser;
use hero_common::jsonl;
use hero_common::records::{ImageRecord, PriorAssignment, TagRecord};
use hero_select::config::SelectConfig;
use hero_select::pipeline::{self, RunInputs};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "hero-select", about = "Select one main display image per hotel")]
struct Args {
    /// Images input (JSONL, one image record per line)
    #[arg(long, env = "HERO_IMAGES", default_value = "data/images.jsonl")]
    images: PathBuf,

    /// Tags input (JSONL, one tag record per line)
    #[arg(long, env = "HERO_TAGS", default_value = "data/image_tags.jsonl")]
    tags: PathBuf,

    /// Prior main-image assignment input (JSONL, usually last run's snapshot)
    #[arg(long, env = "HERO_MAIN_IMAGES", default_value = "data/main_images.jsonl")]
    main_images: PathBuf,

    /// CDC output path
    #[arg(long, env = "HERO_OUTPUT_CDC", default_value = "output/output_cdc.jsonl")]
    output_cdc: PathBuf,

    /// Snapshot output path
    #[arg(
        long,
        env = "HERO_OUTPUT_SNAPSHOT",
        default_value = "output/output_snapshot.jsonl"
    )]
    output_snapshot: PathBuf,

    /// Metrics output path
    #[arg(
        long,
        env = "HERO_OUTPUT_METRICS",
        default_value = "output/output_metrics.jsonl"
    )]
    output_metrics: PathBuf,

    /// Engine config file (TOML); falls back to HERO_SELECT_CONFIG, then
    /// compiled defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run reference time override (RFC 3339), for reproducible replays
    #[arg(long)]
    as_of: Option<DateTime<Utc>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting hero-select v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let config_path =
        hero_common::config::resolve_config_path(args.config.as_deref(), "HERO_SELECT_CONFIG");
    let config: SelectConfig = hero_common::config::load_toml(config_path.as_deref())?;

    let run_id = Uuid::new_v4();
    let as_of = args.as_of.unwrap_or_else(Utc::now);
    info!("Run {} with reference time {}", run_id, as_of);

    // The three inputs are independent; read them concurrently.
    let images_path = args.images.clone();
    let tags_path = args.tags.clone();
    let prior_path = args.main_images.clone();
    let (images, tags, prior) = tokio::try_join!(
        tokio::task::spawn_blocking(move || jsonl::read_jsonl::<ImageRecord>(&images_path)),
        tokio::task::spawn_blocking(move || jsonl::read_jsonl::<TagRecord>(&tags_path)),
        tokio::task::spawn_blocking(move || jsonl::read_jsonl::<PriorAssignment>(&prior_path)),
    )?;
    let (images, tags, prior) = (images?, tags?, prior?);

    let inputs = RunInputs {
        malformed_lines: images.malformed_lines + tags.malformed_lines + prior.malformed_lines,
        images: images.records,
        tags: tags.records,
        prior: prior.records,
    };

    let output = match pipeline::run(inputs, &config, as_of, run_id) {
        Ok(output) => output,
        Err(e) => {
            error!("Run {} aborted, no outputs written: {}", run_id, e);
            return Err(e.into());
        }
    };

    // All stages succeeded; publish the three outputs.
    ensure_parent_dir(&args.output_cdc)?;
    ensure_parent_dir(&args.output_snapshot)?;
    ensure_parent_dir(&args.output_metrics)?;
    jsonl::write_jsonl(&args.output_cdc, &output.cdc)?;
    jsonl::write_jsonl(&args.output_snapshot, &output.snapshot)?;
    jsonl::write_jsonl(&args.output_metrics, std::slice::from_ref(&output.metrics))?;

    info!(
        "Run {} complete: {} CDC events, {} snapshot rows, {} anomalies recorded",
        run_id,
        output.cdc.len(),
        output.snapshot.len(),
        output.metrics.anomalies.orphan_tags
            + output.metrics.anomalies.malformed_lines
            + output.metrics.anomalies.dropped_images()
            + output.metrics.anomalies.duplicate_prior_hotels
    );

    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
