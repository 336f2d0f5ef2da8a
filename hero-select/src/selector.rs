//! Per-hotel selector
//!
//! Groups scored candidates by hotel and picks exactly one winner per
//! group under a composed comparator chain:
//!
//! 1. score, descending
//! 2. source priority rank, ascending (absent rank orders last)
//! 3. image_id, ascending
//!
//! The chain is a total order, so the grouped reduction is commutative
//! and associative: partial reductions over any partitioning of a group
//! combine to the same winner. The image_id level guarantees a unique
//! winner even under full score and priority ties.

use crate::config::DisqualifiedPolicy;
use crate::error::{SelectError, SelectResult};
use crate::scoring::ScoredImage;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// How a winner was ranked within its group, kept for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankTrace {
    /// Candidates in the hotel's group, disqualified ones included.
    pub candidates: usize,
    pub disqualified_candidates: usize,
    /// True when every candidate was disqualified and the least-bad one
    /// was kept under `DisqualifiedPolicy::ForceWorst`.
    pub forced_worst: bool,
}

/// The chosen main image for one hotel.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub hotel_id: String,
    pub image_id: String,
    pub score: f64,
    pub rank: RankTrace,
}

type Comparator = fn(&ScoredImage, &ScoredImage) -> Ordering;

/// Ordered tie-break chain. `Less` means "ranks ahead". Appending a level
/// never disturbs the ones before it.
const TIE_BREAK_CHAIN: &[Comparator] = &[by_score_desc, by_source_priority, by_image_id];

fn by_score_desc(a: &ScoredImage, b: &ScoredImage) -> Ordering {
    b.score.total_cmp(&a.score)
}

fn by_source_priority(a: &ScoredImage, b: &ScoredImage) -> Ordering {
    match (a.image.source_priority, b.image.source_priority) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn by_image_id(a: &ScoredImage, b: &ScoredImage) -> Ordering {
    a.image.image_id.cmp(&b.image.image_id)
}

/// Total order over candidates within one hotel group.
pub fn candidate_order(a: &ScoredImage, b: &ScoredImage) -> Ordering {
    TIE_BREAK_CHAIN
        .iter()
        .fold(Ordering::Equal, |ordering, level| {
            ordering.then_with(|| level(a, b))
        })
}

/// Pick one winner per hotel. Hotels with zero candidates simply do not
/// appear; all-disqualified groups follow `policy`.
pub fn select(
    scored: Vec<ScoredImage>,
    policy: DisqualifiedPolicy,
) -> SelectResult<Vec<Selection>> {
    let mut groups: BTreeMap<String, Vec<ScoredImage>> = BTreeMap::new();
    for candidate in scored {
        groups
            .entry(candidate.image.hotel_id.clone())
            .or_default()
            .push(candidate);
    }

    let mut selections = Vec::with_capacity(groups.len());
    for (hotel_id, candidates) in groups {
        let total = candidates.len();
        let disqualified = candidates.iter().filter(|c| c.disqualified).count();

        let winner = match candidates.into_iter().min_by(candidate_order) {
            Some(winner) => winner,
            None => continue,
        };

        if winner.disqualified {
            // Every candidate in the group is disqualified.
            match policy {
                DisqualifiedPolicy::Skip => {
                    debug!(
                        "Hotel {}: all {} candidates disqualified, skipping selection",
                        hotel_id, total
                    );
                    continue;
                }
                DisqualifiedPolicy::ForceWorst => {
                    debug!(
                        "Hotel {}: all {} candidates disqualified, keeping least-bad {}",
                        hotel_id, total, winner.image.image_id
                    );
                }
            }
        }

        let forced_worst = winner.disqualified;
        selections.push(Selection {
            hotel_id,
            image_id: winner.image.image_id,
            score: winner.score,
            rank: RankTrace {
                candidates: total,
                disqualified_candidates: disqualified,
                forced_worst,
            },
        });
    }

    // Selection must be a function of hotel_id; anything else would break
    // every downstream consumer.
    let mut seen = HashSet::with_capacity(selections.len());
    for selection in &selections {
        if !seen.insert(selection.hotel_id.as_str()) {
            return Err(SelectError::DuplicateHotel(selection.hotel_id.clone()));
        }
    }

    Ok(selections)
}
