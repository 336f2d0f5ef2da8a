//! Run orchestration
//!
//! Wires the stages together: assemble -> score -> select, then the three
//! independent consumers (CDC diff, snapshot, metrics) over the selection.
//! A run is a pure function of (images, tags, prior baseline, config,
//! reference time): it either completes with all three outputs or fails
//! with no outputs at all. The only carried state, the prior baseline,
//! arrives as an explicit immutable input and is never mutated here.

use crate::assembler;
use crate::cdc;
use crate::config::SelectConfig;
use crate::error::{SelectError, SelectResult};
use crate::metrics::{self, RunStats};
use crate::scoring::ScoreEngine;
use crate::selector;
use crate::snapshot;
use chrono::{DateTime, Utc};
use hero_common::records::{
    AnomalyCounts, CdcEvent, ImageRecord, PriorAssignment, RunMetrics, SnapshotRecord, TagRecord,
};
use std::collections::HashSet;
use tracing::{info, warn};
use uuid::Uuid;

/// The three input streams, already materialized by the boundary.
pub struct RunInputs {
    pub images: Vec<ImageRecord>,
    pub tags: Vec<TagRecord>,
    pub prior: Vec<PriorAssignment>,
    /// Input lines the boundary skipped as unparseable, carried into the
    /// run's anomaly accounting.
    pub malformed_lines: u64,
}

/// The three output streams of a completed run.
pub struct RunOutput {
    pub cdc: Vec<CdcEvent>,
    pub snapshot: Vec<SnapshotRecord>,
    pub metrics: RunMetrics,
}

/// Execute one selection run.
pub fn run(
    inputs: RunInputs,
    config: &SelectConfig,
    as_of: DateTime<Utc>,
    run_id: Uuid,
) -> SelectResult<RunOutput> {
    info!(
        "Run {}: {} images, {} tags, {} prior assignments",
        run_id,
        inputs.images.len(),
        inputs.tags.len(),
        inputs.prior.len()
    );

    let mut anomalies = AnomalyCounts {
        malformed_lines: inputs.malformed_lines,
        ..AnomalyCounts::default()
    };

    // Stage 1: candidate assembly
    let images_seen = inputs.images.len() as u64;
    let enriched = assembler::assemble(inputs.images, inputs.tags, &mut anomalies);

    let dropped = anomalies.dropped_images();
    if images_seen > 0 {
        let drop_rate = dropped as f64 / images_seen as f64;
        if drop_rate > config.max_drop_rate {
            return Err(SelectError::DropRateExceeded {
                dropped,
                seen: images_seen,
                max_rate: config.max_drop_rate,
            });
        }
        if dropped > 0 {
            warn!(
                "Run {}: dropped {} of {} image records for missing join keys",
                run_id, dropped, images_seen
            );
        }
    }

    let candidate_hotels: HashSet<String> =
        enriched.iter().map(|img| img.hotel_id.clone()).collect();
    let images_processed = enriched.len();
    info!(
        "Run {}: assembled {} candidates across {} hotels",
        run_id,
        images_processed,
        candidate_hotels.len()
    );

    // Stage 2: scoring (per image, no cross-candidate dependencies)
    let engine = ScoreEngine::new(config.scoring.clone(), as_of);
    let scored: Vec<_> = enriched.into_iter().map(|img| engine.score(img)).collect();

    // Stage 3: per-hotel selection
    let selection = selector::select(scored, config.disqualified_policy)?;
    info!("Run {}: selected {} main images", run_id, selection.len());

    // Stages 4-6: independent consumers of the selection
    let baseline = cdc::dedupe_prior(&inputs.prior, &mut anomalies);
    let hotels_without_candidates = baseline
        .keys()
        .filter(|hotel_id| !candidate_hotels.contains(*hotel_id))
        .count();
    let hotels_processed = {
        let mut all = candidate_hotels;
        all.extend(baseline.keys().cloned());
        all.len()
    };

    let events = cdc::diff(&baseline, &selection);
    let snapshot = snapshot::build_snapshot(&selection, as_of);
    let run_metrics = metrics::aggregate(
        run_id,
        as_of,
        RunStats {
            images_processed,
            hotels_processed,
            hotels_without_candidates,
        },
        &selection,
        &events,
        anomalies,
    );

    info!(
        "Run {}: {} CDC events (unchanged {}, assigned {}, reassigned {}, removed {})",
        run_id,
        events.len(),
        run_metrics.changes.unchanged,
        run_metrics.changes.assigned,
        run_metrics.changes.reassigned,
        run_metrics.changes.removed
    );

    Ok(RunOutput {
        cdc: events,
        snapshot,
        metrics: run_metrics,
    })
}
