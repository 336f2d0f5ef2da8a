//! Score engine
//!
//! Computes a deterministic quality score per candidate image as a
//! weighted sum of named components, each clamped to [0,1] and divided by
//! the total weight, so the final score is itself in [0,1]. Components
//! are registered as (name, weight, function) entries so each one is
//! testable in isolation and new signals slot in without touching the
//! combination formula.
//!
//! # Components
//! - `resolution`: log-scaled pixel count between `min_resolution` (-> 0)
//!   and `max_resolution` (-> 1)
//! - `aspect_ratio`: 1 inside the accepted window, 0 outside
//! - `freshness`: linear decay from 1 (taken now) to 0 (`max_freshness_days`
//!   old), relative to the run reference time
//! - `tag_signal`: highest confidence among qualifying non-negative tags
//!
//! A candidate always receives a score: missing attributes map to the
//! documented component defaults, never to an error. Disqualifying tags
//! force the final score to `DISQUALIFIED_SCORE` instead of removing the
//! candidate, so it still shows up in tie-break traces and metrics.

use crate::config::ScoringConfig;
use crate::types::EnrichedImage;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Sentinel score for disqualified candidates. Below any legitimate
/// score, so a disqualified image only wins when nothing else exists.
pub const DISQUALIFIED_SCORE: f64 = -1.0;

/// Freshness component value when `created_at` is unknown: neutral, so
/// undated inventory is not structurally out-ranked by any dated photo.
pub const UNKNOWN_FRESHNESS: f64 = 0.5;

/// Inputs shared by every component evaluation.
pub struct ScoreContext {
    pub config: ScoringConfig,
    /// Run reference time for freshness. Captured once per run; the score
    /// function itself never reads the clock.
    pub as_of: DateTime<Utc>,
}

type ComponentFn = fn(&EnrichedImage, &ScoreContext) -> f64;

/// One candidate with its score and per-component breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredImage {
    pub image: EnrichedImage,
    pub score: f64,
    /// Clamped component values keyed by component name, kept for audit
    /// even when the final score is the disqualified sentinel.
    pub breakdown: BTreeMap<String, f64>,
    pub disqualified: bool,
}

/// Weighted-component score engine.
pub struct ScoreEngine {
    ctx: ScoreContext,
    components: Vec<(&'static str, f64, ComponentFn)>,
    total_weight: f64,
}

impl ScoreEngine {
    pub fn new(config: ScoringConfig, as_of: DateTime<Utc>) -> Self {
        let w = &config.weights;
        let components: Vec<(&'static str, f64, ComponentFn)> = vec![
            ("resolution", w.resolution, resolution_component),
            ("aspect_ratio", w.aspect_ratio, aspect_ratio_component),
            ("freshness", w.freshness, freshness_component),
            ("tag_signal", w.tag_signal, tag_signal_component),
        ];
        let total_weight = components.iter().map(|(_, weight, _)| weight).sum();
        Self {
            ctx: ScoreContext { config, as_of },
            components,
            total_weight,
        }
    }

    /// Score one candidate. Pure: identical input yields an identical
    /// score and breakdown.
    pub fn score(&self, image: EnrichedImage) -> ScoredImage {
        let mut breakdown = BTreeMap::new();
        let mut weighted_sum = 0.0;
        for (name, weight, eval) in &self.components {
            let value = clamp01(eval(&image, &self.ctx));
            weighted_sum += weight * value;
            breakdown.insert((*name).to_string(), value);
        }

        let disqualified = self.is_disqualified(&image);
        let score = if disqualified {
            DISQUALIFIED_SCORE
        } else if self.total_weight > 0.0 {
            weighted_sum / self.total_weight
        } else {
            0.0
        };

        ScoredImage {
            image,
            score,
            breakdown,
            disqualified,
        }
    }

    fn is_disqualified(&self, image: &EnrichedImage) -> bool {
        let config = &self.ctx.config;
        config.disqualifying_tags.iter().any(|bad| {
            image
                .tags
                .get(bad)
                .map(|confidence| effective_confidence(*confidence, config) >= config.min_tag_confidence)
                .unwrap_or(false)
        })
    }
}

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

fn effective_confidence(confidence: Option<f64>, config: &ScoringConfig) -> f64 {
    clamp01(confidence.unwrap_or(config.default_tag_confidence))
}

/// Log-scaled resolution adequacy. 0 below `min_resolution`, 1 at or
/// above `max_resolution`, log-interpolated between.
fn resolution_component(image: &EnrichedImage, ctx: &ScoreContext) -> f64 {
    let config = &ctx.config;
    match image.resolution() {
        Some(pixels) => {
            let span = config.max_resolution.ln() - config.min_resolution.ln();
            if span <= 0.0 {
                return 0.0;
            }
            ((pixels as f64).ln() - config.min_resolution.ln()) / span
        }
        None => 0.0,
    }
}

/// 1 when the aspect ratio is inside the accepted window, else 0.
fn aspect_ratio_component(image: &EnrichedImage, ctx: &ScoreContext) -> f64 {
    let config = &ctx.config;
    match image.aspect_ratio() {
        Some(ratio) if ratio >= config.min_aspect_ratio && ratio <= config.max_aspect_ratio => 1.0,
        Some(_) => 0.0,
        None => 0.0,
    }
}

/// Linear decay with age relative to the run reference time.
fn freshness_component(image: &EnrichedImage, ctx: &ScoreContext) -> f64 {
    match image.created_at {
        Some(created_at) => {
            let age_days = (ctx.as_of - created_at).num_seconds() as f64 / 86_400.0;
            1.0 - age_days / ctx.config.max_freshness_days
        }
        None => UNKNOWN_FRESHNESS,
    }
}

/// Highest confidence among qualifying tags. Disqualifying tags never
/// contribute positive signal; tags below `min_tag_confidence` are
/// ignored entirely.
fn tag_signal_component(image: &EnrichedImage, ctx: &ScoreContext) -> f64 {
    let config = &ctx.config;
    image
        .tags
        .iter()
        .filter(|(tag, _)| !config.disqualifying_tags.contains(tag))
        .map(|(_, confidence)| effective_confidence(*confidence, config))
        .filter(|confidence| *confidence >= config.min_tag_confidence)
        .fold(None::<f64>, |best, confidence| {
            Some(best.map_or(confidence, |b| b.max(confidence)))
        })
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn context() -> ScoreContext {
        ScoreContext {
            config: ScoringConfig::default(),
            as_of: Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap(),
        }
    }

    fn candidate(width: u32, height: u32) -> EnrichedImage {
        EnrichedImage {
            image_id: "I1".to_string(),
            hotel_id: "H1".to_string(),
            width: Some(width),
            height: Some(height),
            created_at: None,
            source_priority: None,
            tags: BTreeMap::new(),
        }
    }

    #[test]
    fn resolution_saturates_at_bounds() {
        let ctx = context();
        // At the minimum threshold (400x400 = 160000 pixels)
        let at_min = resolution_component(&candidate(400, 400), &ctx);
        assert!(at_min.abs() < 1e-9);
        // At the maximum threshold (1920x1080)
        let at_max = resolution_component(&candidate(1920, 1080), &ctx);
        assert!((at_max - 1.0).abs() < 1e-9);
        // Above the maximum, clamped by the engine
        let above = clamp01(resolution_component(&candidate(4000, 3000), &ctx));
        assert_eq!(above, 1.0);
        // Missing dimensions score zero
        let mut headless = candidate(1920, 1080);
        headless.height = None;
        assert_eq!(resolution_component(&headless, &ctx), 0.0);
    }

    #[test]
    fn aspect_ratio_is_a_window() {
        let ctx = context();
        assert_eq!(aspect_ratio_component(&candidate(1600, 900), &ctx), 1.0);
        // 0.25 ratio, under the 0.3 floor
        assert_eq!(aspect_ratio_component(&candidate(300, 1200), &ctx), 0.0);
        // 5.0 ratio, over the 4.65 ceiling
        assert_eq!(aspect_ratio_component(&candidate(5000, 1000), &ctx), 0.0);
        // Zero height is undefined, not a panic
        assert_eq!(aspect_ratio_component(&candidate(800, 0), &ctx), 0.0);
    }

    #[test]
    fn freshness_decays_linearly_from_as_of() {
        let ctx = context();
        let mut img = candidate(1920, 1080);

        img.created_at = Some(ctx.as_of);
        assert!((freshness_component(&img, &ctx) - 1.0).abs() < 1e-9);

        img.created_at = Some(ctx.as_of - chrono::Duration::days(1825));
        assert!((freshness_component(&img, &ctx) - 0.5).abs() < 1e-3);

        // Older than ten years clamps to 0 in the engine
        img.created_at = Some(ctx.as_of - chrono::Duration::days(5000));
        assert_eq!(clamp01(freshness_component(&img, &ctx)), 0.0);

        img.created_at = None;
        assert_eq!(freshness_component(&img, &ctx), UNKNOWN_FRESHNESS);
    }

    #[test]
    fn tag_signal_takes_best_qualifying_confidence() {
        let mut ctx = context();
        let mut img = candidate(1920, 1080);
        img.tags.insert("pool".to_string(), Some(0.6));
        img.tags.insert("facade".to_string(), Some(0.9));
        assert!((tag_signal_component(&img, &ctx) - 0.9).abs() < 1e-9);

        // Negative tags never contribute positive signal
        img.tags.insert("blurry".to_string(), Some(0.99));
        assert!((tag_signal_component(&img, &ctx) - 0.9).abs() < 1e-9);

        // Confidence threshold filters at score time
        ctx.config.min_tag_confidence = 0.95;
        assert_eq!(tag_signal_component(&img, &ctx), 0.0);
    }

    #[test]
    fn combination_divides_by_total_weight() {
        let engine = ScoreEngine::new(ScoringConfig::default(), context().as_of);
        let mut img = candidate(1920, 1080);
        img.created_at = Some(engine.ctx.as_of);
        img.tags.insert("pool".to_string(), Some(1.0));

        // All four components at 1.0: (6 + 2 + 2 + 3) / 13 = 1.0
        let scored = engine.score(img);
        assert!((scored.score - 1.0).abs() < 1e-9);
        assert_eq!(scored.breakdown.len(), 4);
        assert_eq!(scored.breakdown["aspect_ratio"], 1.0);
        assert!(!scored.disqualified);
    }

    #[test]
    fn disqualifying_tag_forces_sentinel_but_keeps_breakdown() {
        let engine = ScoreEngine::new(ScoringConfig::default(), context().as_of);
        let mut img = candidate(1920, 1080);
        img.tags.insert("watermarked".to_string(), None);

        let scored = engine.score(img);
        assert!(scored.disqualified);
        assert_eq!(scored.score, DISQUALIFIED_SCORE);
        // Breakdown still audits what the components saw
        assert_eq!(scored.breakdown["resolution"], 1.0);
    }

    #[test]
    fn low_confidence_disqualifying_tag_is_ignored() {
        let mut config = ScoringConfig::default();
        config.min_tag_confidence = 0.5;
        let engine = ScoreEngine::new(config, context().as_of);
        let mut img = candidate(1920, 1080);
        img.tags.insert("blurry".to_string(), Some(0.2));

        let scored = engine.score(img);
        assert!(!scored.disqualified);
        assert!(scored.score > 0.0);
    }

    #[test]
    fn scoring_is_deterministic() {
        let engine = ScoreEngine::new(ScoringConfig::default(), context().as_of);
        let mut img = candidate(1280, 720);
        img.created_at = Some(context().as_of - chrono::Duration::days(400));
        img.tags.insert("lobby".to_string(), Some(0.7));

        let first = engine.score(img.clone());
        let second = engine.score(img);
        assert_eq!(first.score, second.score);
        assert_eq!(first.breakdown, second.breakdown);
    }
}
