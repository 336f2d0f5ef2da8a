//! Candidate assembler
//!
//! Joins raw image records with their tag records into one enriched
//! candidate per image (left outer join on image_id). An image with no
//! tags still participates with an empty tag set; a tag with no image is
//! meaningless and gets dropped with an anomaly count. Image records
//! missing either join key are dropped per record and counted — the
//! drop-rate abort decision belongs to the pipeline, not here.

use crate::types::EnrichedImage;
use hero_common::records::{AnomalyCounts, ImageRecord, TagRecord};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Join images with tags, producing one enriched candidate per valid
/// image record. Updates `anomalies` with per-record drop counts.
pub fn assemble(
    images: Vec<ImageRecord>,
    tags: Vec<TagRecord>,
    anomalies: &mut AnomalyCounts,
) -> Vec<EnrichedImage> {
    let image_ids: HashSet<&str> = images
        .iter()
        .filter_map(|img| img.image_id.as_deref())
        .collect();

    // tag sets keyed by image, duplicates collapsed keeping max confidence
    let mut tag_sets: HashMap<String, BTreeMap<String, Option<f64>>> = HashMap::new();
    for record in tags {
        let (image_id, tag) = match (record.image_id, record.tag) {
            (Some(image_id), Some(tag)) => (image_id, tag),
            _ => {
                // unusable without both fields; same bucket as orphans
                anomalies.orphan_tags += 1;
                continue;
            }
        };
        if !image_ids.contains(image_id.as_str()) {
            anomalies.orphan_tags += 1;
            debug!("Orphan tag {:?} for unknown image {}", tag, image_id);
            continue;
        }
        let entry = tag_sets
            .entry(image_id)
            .or_default()
            .entry(tag)
            .or_insert(None);
        // A reported confidence wins over an unreported one; two reported
        // confidences keep the maximum.
        *entry = match (*entry, record.confidence) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (Some(a), None) => Some(a),
            (None, other) => other,
        };
    }

    let mut enriched = Vec::with_capacity(images.len());
    for image in images {
        let image_id = match image.image_id {
            Some(id) => id,
            None => {
                anomalies.missing_image_id += 1;
                debug!("Dropping image record without image_id");
                continue;
            }
        };
        let hotel_id = match image.hotel_id {
            Some(id) => id,
            None => {
                anomalies.missing_hotel_id += 1;
                debug!("Dropping image {} without hotel_id", image_id);
                continue;
            }
        };
        let tags = tag_sets.remove(&image_id).unwrap_or_default();
        enriched.push(EnrichedImage {
            image_id,
            hotel_id,
            width: image.width,
            height: image.height,
            created_at: image.created_at,
            source_priority: image.source_priority,
            tags,
        });
    }

    enriched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(image_id: &str, hotel_id: &str) -> ImageRecord {
        ImageRecord {
            image_id: Some(image_id.to_string()),
            hotel_id: Some(hotel_id.to_string()),
            width: Some(1920),
            height: Some(1080),
            created_at: None,
            source_priority: None,
        }
    }

    fn tag(image_id: &str, tag: &str, confidence: Option<f64>) -> TagRecord {
        TagRecord {
            image_id: Some(image_id.to_string()),
            tag: Some(tag.to_string()),
            confidence,
        }
    }

    #[test]
    fn image_without_tags_keeps_empty_tag_set() {
        let mut anomalies = AnomalyCounts::default();
        let enriched = assemble(vec![image("I1", "H1")], vec![], &mut anomalies);
        assert_eq!(enriched.len(), 1);
        assert!(enriched[0].tags.is_empty());
        assert_eq!(anomalies, AnomalyCounts::default());
    }

    #[test]
    fn orphan_tag_is_dropped_and_counted() {
        let mut anomalies = AnomalyCounts::default();
        let enriched = assemble(
            vec![image("I1", "H1")],
            vec![tag("IMG_X", "pool", Some(0.9))],
            &mut anomalies,
        );
        assert_eq!(enriched.len(), 1);
        assert!(enriched[0].tags.is_empty());
        assert_eq!(anomalies.orphan_tags, 1);
    }

    #[test]
    fn duplicate_tags_collapse_keeping_max_confidence() {
        let mut anomalies = AnomalyCounts::default();
        let enriched = assemble(
            vec![image("I1", "H1")],
            vec![
                tag("I1", "facade", Some(0.4)),
                tag("I1", "facade", Some(0.8)),
                tag("I1", "facade", None),
            ],
            &mut anomalies,
        );
        assert_eq!(enriched[0].tags.len(), 1);
        assert_eq!(enriched[0].tags["facade"], Some(0.8));
    }

    #[test]
    fn missing_join_keys_drop_the_record_and_count_per_key() {
        let mut anomalies = AnomalyCounts::default();
        let mut no_image_id = image("I1", "H1");
        no_image_id.image_id = None;
        let mut no_hotel_id = image("I2", "H1");
        no_hotel_id.hotel_id = None;

        let enriched = assemble(
            vec![no_image_id, no_hotel_id, image("I3", "H1")],
            vec![],
            &mut anomalies,
        );
        assert_eq!(enriched.len(), 1);
        assert_eq!(anomalies.missing_image_id, 1);
        assert_eq!(anomalies.missing_hotel_id, 1);
        assert_eq!(anomalies.dropped_images(), 2);
    }
}
