//! Record model for the selection pipeline
//!
//! Input shapes (images, tags, prior main-image assignments) deserialize
//! permissively: fields that may be absent in upstream feeds are `Option`,
//! so a sparse record is a data-quality signal, not a parse failure.
//! Output shapes (CDC events, snapshot rows, run metrics) are the wire
//! contract consumed downstream; the snapshot doubles as the next run's
//! prior-assignment input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raw per-image facts from the images feed, one per line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub hotel_id: Option<String>,
    /// Pixel width; absent or zero disables resolution/aspect scoring.
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Capture or ingestion time, used for the freshness component.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Explicit source priority rank; lower wins ties. Not all feeds carry one.
    #[serde(default)]
    pub source_priority: Option<u32>,
}

/// One semantic tag attached to an image, from the tags feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRecord {
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    /// Classifier confidence in [0,1]; absent for manually curated tags.
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Main-image baseline from the previous run. At most one per hotel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorAssignment {
    pub hotel_id: String,
    pub image_id: String,
}

/// Per-hotel outcome classification for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    /// Hotel kept the same main image as the prior run.
    Unchanged,
    /// Hotel gained a main image it did not have before.
    Assigned,
    /// Hotel's main image switched to a different image.
    Reassigned,
    /// Hotel had a main image before but has no candidates this run.
    Removed,
}

/// One change-data-capture event per hotel in the union of prior and
/// current assignment key sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdcEvent {
    pub hotel_id: String,
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_image_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_image_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Full current-state row: one per hotel with a selection this run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub hotel_id: String,
    pub image_id: String,
    pub score: f64,
    pub as_of: DateTime<Utc>,
}

/// Counts per change type over one run's CDC output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCounts {
    pub unchanged: u64,
    pub assigned: u64,
    pub reassigned: u64,
    pub removed: u64,
}

/// Summary of the selected-score distribution (nearest-rank percentiles).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
}

/// Data-quality anomaly counters accumulated across a run.
///
/// Anomalies are recovered locally (skip, default, or first-wins) and
/// reported here; none of them aborts the run on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyCounts {
    /// Tag records whose image_id matched no image record.
    pub orphan_tags: u64,
    /// Image records dropped for a missing image_id.
    pub missing_image_id: u64,
    /// Image records dropped for a missing hotel_id.
    pub missing_hotel_id: u64,
    /// Input lines that failed to parse and were skipped.
    pub malformed_lines: u64,
    /// Prior-assignment rows sharing a hotel_id with an earlier row.
    pub duplicate_prior_hotels: u64,
}

impl AnomalyCounts {
    /// Total image records dropped for missing join keys.
    pub fn dropped_images(&self) -> u64 {
        self.missing_image_id + self.missing_hotel_id
    }
}

/// Run-scoped aggregate metrics, one record per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetrics {
    pub run_id: Uuid,
    pub as_of: DateTime<Utc>,
    /// Image records that survived assembly and were scored.
    pub images_processed: usize,
    /// Hotels seen this run: candidate hotels plus prior-assignment hotels.
    pub hotels_processed: usize,
    pub hotels_with_selection: usize,
    /// Hotels known to the run (usually via the prior baseline) that had
    /// no candidate images this time.
    pub hotels_without_candidates: usize,
    pub changes: ChangeCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_distribution: Option<ScoreDistribution>,
    /// Selections where every candidate was disqualified and the least-bad
    /// image was kept anyway.
    pub forced_worst_selections: usize,
    pub anomalies: AnomalyCounts,
}
