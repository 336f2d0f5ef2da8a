//! Engine configuration
//!
//! Every threshold and weight in the selection run lives here, with the
//! production defaults compiled in. A TOML file (see `hero_common::config`)
//! can override any subset; `#[serde(default)]` keeps partial files valid.

use serde::Deserialize;

/// Top-level run configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectConfig {
    pub scoring: ScoringConfig,
    /// What to do with a hotel whose candidates are all disqualified.
    pub disqualified_policy: DisqualifiedPolicy,
    /// Fraction of image records allowed to drop (missing join keys)
    /// before the run aborts instead of publishing a shrunken selection.
    pub max_drop_rate: f64,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            disqualified_policy: DisqualifiedPolicy::ForceWorst,
            max_drop_rate: 0.25,
        }
    }
}

/// Policy for hotels where every candidate carries a disqualifying tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisqualifiedPolicy {
    /// Keep the least-bad candidate as the main image. The selection is
    /// flagged `forced_worst` and counted in metrics. This keeps CDC
    /// coverage stable: a hotel does not flap to REMOVED just because its
    /// whole pool picked up a negative tag.
    ForceWorst,
    /// Emit no selection for the hotel, surfacing it downstream as
    /// REMOVED (or absent, if it had no prior assignment).
    Skip,
}

/// Scoring thresholds and weights
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ComponentWeights,
    /// Pixel count at which the resolution component reaches 0.
    pub min_resolution: f64,
    /// Pixel count at which the resolution component saturates at 1 (1080p).
    pub max_resolution: f64,
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
    /// Age in days at which the freshness component reaches 0.
    pub max_freshness_days: f64,
    /// Tags below this confidence are ignored at score time. Applies to
    /// positive signals and disqualifying tags alike; it never affects
    /// which images exist (the join is purely structural).
    pub min_tag_confidence: f64,
    /// Effective confidence for a tag reported without one.
    pub default_tag_confidence: f64,
    /// Tags that force the score to the disqualified sentinel.
    pub disqualifying_tags: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ComponentWeights::default(),
            min_resolution: 160_000.0,
            max_resolution: 2_073_600.0,
            min_aspect_ratio: 0.3,
            max_aspect_ratio: 4.65,
            max_freshness_days: 10.0 * 365.0,
            min_tag_confidence: 0.0,
            default_tag_confidence: 1.0,
            disqualifying_tags: vec![
                "blurry".to_string(),
                "duplicate".to_string(),
                "watermarked".to_string(),
            ],
        }
    }
}

/// Linear-combination weights, one per named score component.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ComponentWeights {
    pub resolution: f64,
    pub aspect_ratio: f64,
    pub freshness: f64,
    pub tag_signal: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            resolution: 6.0,
            aspect_ratio: 2.0,
            freshness: 2.0,
            tag_signal: 3.0,
        }
    }
}
