//! Change-data-capture differ
//!
//! Compares the new per-hotel selection against the prior baseline and
//! classifies every hotel in the union of both key sets:
//!
//! | prior | new | same image | change_type |
//! |-------|-----|------------|-------------|
//! | no    | yes | —          | ASSIGNED    |
//! | yes   | yes | yes        | UNCHANGED   |
//! | yes   | yes | no         | REASSIGNED  |
//! | yes   | no  | —          | REMOVED     |
//!
//! A hotel absent from both sets was never relevant and gets no event.
//! The diff is a read-only comparison over `BTreeMap` unions, so the
//! event sequence comes out in ascending hotel_id order regardless of
//! input traversal order — re-running it on the same pair of sets yields
//! the identical sequence.

use crate::selector::Selection;
use hero_common::records::{AnomalyCounts, CdcEvent, ChangeType, PriorAssignment};
use std::collections::BTreeMap;
use tracing::debug;

/// Collapse the prior baseline to one image per hotel. The input contract
/// is at most one row per hotel; violations keep the first row and count
/// an anomaly.
pub fn dedupe_prior(
    prior: &[PriorAssignment],
    anomalies: &mut AnomalyCounts,
) -> BTreeMap<String, String> {
    let mut baseline = BTreeMap::new();
    for row in prior {
        if baseline.contains_key(&row.hotel_id) {
            anomalies.duplicate_prior_hotels += 1;
            debug!(
                "Duplicate prior assignment for hotel {}, keeping the first",
                row.hotel_id
            );
            continue;
        }
        baseline.insert(row.hotel_id.clone(), row.image_id.clone());
    }
    baseline
}

/// Diff the prior baseline against the new selection, one event per
/// hotel in the key union.
pub fn diff(baseline: &BTreeMap<String, String>, selection: &[Selection]) -> Vec<CdcEvent> {
    let new: BTreeMap<&str, &Selection> = selection
        .iter()
        .map(|s| (s.hotel_id.as_str(), s))
        .collect();

    let mut hotel_ids: Vec<&str> = baseline.keys().map(String::as_str).collect();
    hotel_ids.extend(new.keys().copied());
    hotel_ids.sort_unstable();
    hotel_ids.dedup();

    let mut events = Vec::with_capacity(hotel_ids.len());
    for hotel_id in hotel_ids {
        let previous = baseline.get(hotel_id);
        let current = new.get(hotel_id);
        let event = match (previous, current) {
            (None, Some(selection)) => CdcEvent {
                hotel_id: hotel_id.to_string(),
                change_type: ChangeType::Assigned,
                previous_image_id: None,
                new_image_id: Some(selection.image_id.clone()),
                score: Some(selection.score),
            },
            (Some(previous), Some(selection)) if *previous == selection.image_id => CdcEvent {
                hotel_id: hotel_id.to_string(),
                change_type: ChangeType::Unchanged,
                previous_image_id: Some(previous.clone()),
                new_image_id: Some(selection.image_id.clone()),
                score: Some(selection.score),
            },
            (Some(previous), Some(selection)) => CdcEvent {
                hotel_id: hotel_id.to_string(),
                change_type: ChangeType::Reassigned,
                previous_image_id: Some(previous.clone()),
                new_image_id: Some(selection.image_id.clone()),
                score: Some(selection.score),
            },
            (Some(previous), None) => CdcEvent {
                hotel_id: hotel_id.to_string(),
                change_type: ChangeType::Removed,
                previous_image_id: Some(previous.clone()),
                new_image_id: None,
                score: None,
            },
            (None, None) => unreachable!("hotel_id came from one of the two key sets"),
        };
        events.push(event);
    }

    events
}
