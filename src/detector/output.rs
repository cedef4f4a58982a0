//! Per-image detection output.

use std::collections::BTreeMap;

use crate::candidate::topk::Candidate;
use crate::decode::BoundingBox;

/// One emitted detection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    /// Clipped box in center form.
    pub bbox: BoundingBox,
    /// Fused score in `[0, 1]`.
    pub score: f32,
    /// Class index in `[0, class_count)`.
    pub class_id: usize,
}

/// Detections of one image as three parallel sequences.
///
/// Entries are grouped by ascending class id; within a class they are ordered
/// by descending score, ties broken by anchor index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Detections {
    boxes: Vec<BoundingBox>,
    scores: Vec<f32>,
    class_ids: Vec<usize>,
}

impl Detections {
    pub(crate) fn from_candidates(candidates: Vec<Candidate>) -> Self {
        let mut out = Self {
            boxes: Vec::with_capacity(candidates.len()),
            scores: Vec::with_capacity(candidates.len()),
            class_ids: Vec::with_capacity(candidates.len()),
        };
        for c in candidates {
            out.boxes.push(c.bbox);
            out.scores.push(c.score);
            out.class_ids.push(c.class_id);
        }
        out
    }

    /// Number of detections kept for the image.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Returns `true` when nothing survived selection.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Boxes in output order.
    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    /// Fused scores, parallel to [`Detections::boxes`].
    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    /// Class ids, parallel to [`Detections::boxes`].
    pub fn class_ids(&self) -> &[usize] {
        &self.class_ids
    }

    /// Returns detection `index` if present.
    pub fn get(&self, index: usize) -> Option<Detection> {
        Some(Detection {
            bbox: *self.boxes.get(index)?,
            score: *self.scores.get(index)?,
            class_id: *self.class_ids.get(index)?,
        })
    }

    /// Iterates over detections in output order.
    pub fn iter(&self) -> impl Iterator<Item = Detection> + '_ {
        self.boxes
            .iter()
            .zip(&self.scores)
            .zip(&self.class_ids)
            .map(|((&bbox, &score), &class_id)| Detection {
                bbox,
                score,
                class_id,
            })
    }

    /// Groups `(score, box)` pairs by class id.
    pub fn by_class(&self) -> BTreeMap<usize, Vec<(f32, BoundingBox)>> {
        let mut groups: BTreeMap<usize, Vec<(f32, BoundingBox)>> = BTreeMap::new();
        for d in self.iter() {
            groups.entry(d.class_id).or_default().push((d.score, d.bbox));
        }
        groups
    }
}
