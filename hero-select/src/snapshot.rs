//! Snapshot builder
//!
//! Projects the selection into the full-state output: one timestamped row
//! per hotel with a current main image. This file becomes the next run's
//! prior-assignment input at the storage boundary.

use crate::selector::Selection;
use chrono::{DateTime, Utc};
use hero_common::records::SnapshotRecord;

/// One snapshot row per selection, stamped with the run reference time,
/// in ascending hotel_id order.
pub fn build_snapshot(selection: &[Selection], as_of: DateTime<Utc>) -> Vec<SnapshotRecord> {
    let mut records: Vec<SnapshotRecord> = selection
        .iter()
        .map(|s| SnapshotRecord {
            hotel_id: s.hotel_id.clone(),
            image_id: s.image_id.clone(),
            score: s.score,
            as_of,
        })
        .collect();
    records.sort_by(|a, b| a.hotel_id.cmp(&b.hotel_id));
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::RankTrace;

    #[test]
    fn snapshot_mirrors_selection_exactly() {
        let as_of = Utc::now();
        let selection = vec![
            Selection {
                hotel_id: "H2".to_string(),
                image_id: "I2".to_string(),
                score: 0.4,
                rank: RankTrace {
                    candidates: 2,
                    disqualified_candidates: 0,
                    forced_worst: false,
                },
            },
            Selection {
                hotel_id: "H1".to_string(),
                image_id: "I1".to_string(),
                score: 0.9,
                rank: RankTrace {
                    candidates: 1,
                    disqualified_candidates: 0,
                    forced_worst: false,
                },
            },
        ];

        let snapshot = build_snapshot(&selection, as_of);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].hotel_id, "H1");
        assert_eq!(snapshot[0].image_id, "I1");
        assert_eq!(snapshot[0].score, 0.9);
        assert_eq!(snapshot[0].as_of, as_of);
        assert_eq!(snapshot[1].hotel_id, "H2");
    }

    #[test]
    fn empty_selection_yields_empty_snapshot() {
        assert!(build_snapshot(&[], Utc::now()).is_empty());
    }
}
