//! Run metrics aggregator
//!
//! Pure reduction over the selection and the CDC events into one
//! run-scoped record: counters, per-change-type counts, and a
//! nearest-rank percentile summary of the selected scores. Produces the
//! metrics output without touching any other output.

use crate::selector::Selection;
use chrono::{DateTime, Utc};
use hero_common::records::{
    AnomalyCounts, CdcEvent, ChangeCounts, ChangeType, RunMetrics, ScoreDistribution,
};
use uuid::Uuid;

/// Run-level counts established by the pipeline before aggregation.
#[derive(Debug, Clone, Copy)]
pub struct RunStats {
    /// Image records that survived assembly and were scored.
    pub images_processed: usize,
    /// Union of candidate hotels and prior-baseline hotels.
    pub hotels_processed: usize,
    /// Hotels known to the run with zero candidate images this time.
    pub hotels_without_candidates: usize,
}

/// Aggregate one run's outputs into its metrics record.
pub fn aggregate(
    run_id: Uuid,
    as_of: DateTime<Utc>,
    stats: RunStats,
    selection: &[Selection],
    events: &[CdcEvent],
    anomalies: AnomalyCounts,
) -> RunMetrics {
    let mut changes = ChangeCounts::default();
    for event in events {
        match event.change_type {
            ChangeType::Unchanged => changes.unchanged += 1,
            ChangeType::Assigned => changes.assigned += 1,
            ChangeType::Reassigned => changes.reassigned += 1,
            ChangeType::Removed => changes.removed += 1,
        }
    }

    let forced_worst_selections = selection.iter().filter(|s| s.rank.forced_worst).count();

    RunMetrics {
        run_id,
        as_of,
        images_processed: stats.images_processed,
        hotels_processed: stats.hotels_processed,
        hotels_with_selection: selection.len(),
        hotels_without_candidates: stats.hotels_without_candidates,
        changes,
        score_distribution: score_distribution(selection),
        forced_worst_selections,
        anomalies,
    }
}

fn score_distribution(selection: &[Selection]) -> Option<ScoreDistribution> {
    if selection.is_empty() {
        return None;
    }

    let mut scores: Vec<f64> = selection.iter().map(|s| s.score).collect();
    scores.sort_by(f64::total_cmp);

    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    Some(ScoreDistribution {
        min: scores[0],
        max: scores[scores.len() - 1],
        mean,
        p50: percentile(&scores, 50.0),
        p90: percentile(&scores, 90.0),
        p99: percentile(&scores, 99.0),
    })
}

/// Nearest-rank percentile over ascending-sorted scores.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::RankTrace;

    fn selection(hotel_id: &str, score: f64, forced_worst: bool) -> Selection {
        Selection {
            hotel_id: hotel_id.to_string(),
            image_id: format!("{}_img", hotel_id),
            score,
            rank: RankTrace {
                candidates: 1,
                disqualified_candidates: usize::from(forced_worst),
                forced_worst,
            },
        }
    }

    fn event(hotel_id: &str, change_type: ChangeType) -> CdcEvent {
        CdcEvent {
            hotel_id: hotel_id.to_string(),
            change_type,
            previous_image_id: None,
            new_image_id: None,
            score: None,
        }
    }

    #[test]
    fn counts_every_change_type() {
        let events = vec![
            event("H1", ChangeType::Unchanged),
            event("H2", ChangeType::Assigned),
            event("H3", ChangeType::Assigned),
            event("H4", ChangeType::Reassigned),
            event("H5", ChangeType::Removed),
        ];
        let metrics = aggregate(
            Uuid::new_v4(),
            Utc::now(),
            RunStats {
                images_processed: 10,
                hotels_processed: 5,
                hotels_without_candidates: 1,
            },
            &[],
            &events,
            AnomalyCounts::default(),
        );
        assert_eq!(metrics.changes.unchanged, 1);
        assert_eq!(metrics.changes.assigned, 2);
        assert_eq!(metrics.changes.reassigned, 1);
        assert_eq!(metrics.changes.removed, 1);
        assert_eq!(metrics.hotels_without_candidates, 1);
        assert!(metrics.score_distribution.is_none());
    }

    #[test]
    fn distribution_summarizes_selected_scores() {
        let selection: Vec<Selection> = (1..=10)
            .map(|i| selection(&format!("H{}", i), i as f64 / 10.0, false))
            .collect();
        let metrics = aggregate(
            Uuid::new_v4(),
            Utc::now(),
            RunStats {
                images_processed: 10,
                hotels_processed: 10,
                hotels_without_candidates: 0,
            },
            &selection,
            &[],
            AnomalyCounts::default(),
        );
        let dist = metrics.score_distribution.unwrap();
        assert!((dist.min - 0.1).abs() < 1e-9);
        assert!((dist.max - 1.0).abs() < 1e-9);
        assert!((dist.mean - 0.55).abs() < 1e-9);
        assert!((dist.p50 - 0.5).abs() < 1e-9);
        assert!((dist.p90 - 0.9).abs() < 1e-9);
        assert!((dist.p99 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn single_selection_distribution_is_degenerate() {
        let selection = vec![selection("H1", 0.7, false)];
        let dist = score_distribution(&selection).unwrap();
        assert_eq!(dist.min, 0.7);
        assert_eq!(dist.max, 0.7);
        assert_eq!(dist.p50, 0.7);
        assert_eq!(dist.p99, 0.7);
    }

    #[test]
    fn forced_worst_selections_are_counted() {
        let selection = vec![
            selection("H1", 0.8, false),
            selection("H2", -1.0, true),
            selection("H3", -1.0, true),
        ];
        let metrics = aggregate(
            Uuid::new_v4(),
            Utc::now(),
            RunStats {
                images_processed: 3,
                hotels_processed: 3,
                hotels_without_candidates: 0,
            },
            &selection,
            &[],
            AnomalyCounts::default(),
        );
        assert_eq!(metrics.forced_worst_selections, 2);
    }
}
