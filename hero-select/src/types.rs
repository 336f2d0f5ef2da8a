//! Engine-internal candidate types

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// One candidate image after the tag join, with its join keys validated.
///
/// Tag values carry the highest confidence reported for that tag, or
/// `None` when no occurrence carried one.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedImage {
    pub image_id: String,
    pub hotel_id: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub created_at: Option<DateTime<Utc>>,
    pub source_priority: Option<u32>,
    pub tags: BTreeMap<String, Option<f64>>,
}

impl EnrichedImage {
    /// Total pixel count, when both dimensions are known and non-zero.
    pub fn resolution(&self) -> Option<u64> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some(w as u64 * h as u64),
            _ => None,
        }
    }

    /// Width over height, when the height is known and non-zero.
    pub fn aspect_ratio(&self) -> Option<f64> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if h > 0 => Some(w as f64 / h as f64),
            _ => None,
        }
    }
}
