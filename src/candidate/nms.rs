//! Per-class greedy non-maximum suppression.

use crate::candidate::topk::Candidate;
use crate::decode::{iou, BoundingBox};
use std::collections::BTreeMap;

/// Greedy NMS over boxes already sorted by descending score.
///
/// Walking from the best box down, every box that is still kept suppresses
/// each later box whose IoU with it exceeds `nms_thresh`. Returns the keep
/// mask in input order.
pub fn nms_keep_mask(boxes: &[BoundingBox], nms_thresh: f32) -> Vec<bool> {
    let n = boxes.len();
    let mut keep = vec![true; n];
    for i in 0..n.saturating_sub(1) {
        if !keep[i] {
            continue;
        }
        for j in (i + 1)..n {
            if keep[j] && iou(&boxes[i], &boxes[j]) > nms_thresh {
                keep[j] = false;
            }
        }
    }
    keep
}

/// Groups candidates by class, preserving their relative order.
pub fn group_by_class(candidates: &[Candidate]) -> BTreeMap<usize, Vec<Candidate>> {
    let mut groups: BTreeMap<usize, Vec<Candidate>> = BTreeMap::new();
    for candidate in candidates {
        groups.entry(candidate.class_id).or_default().push(*candidate);
    }
    groups
}

/// Applies [`nms_keep_mask`] to one class group and returns the survivors.
///
/// `group` must be sorted by descending score.
pub fn suppress_group(group: Vec<Candidate>, nms_thresh: f32) -> Vec<Candidate> {
    let boxes: Vec<BoundingBox> = group.iter().map(|c| c.bbox).collect();
    let keep = nms_keep_mask(&boxes, nms_thresh);
    group
        .into_iter()
        .zip(keep)
        .filter_map(|(candidate, keep)| keep.then_some(candidate))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{group_by_class, nms_keep_mask, suppress_group};
    use crate::candidate::topk::Candidate;
    use crate::decode::BoundingBox;

    #[test]
    fn identical_boxes_keep_only_the_first() {
        let b = BoundingBox::new(20.0, 20.0, 10.0, 10.0);
        assert_eq!(nms_keep_mask(&[b, b, b], 0.5), vec![true, false, false]);
    }

    #[test]
    fn suppressed_boxes_do_not_suppress_others() {
        // b overlaps a and c heavily; a and c overlap below the threshold
        let a = BoundingBox::new(10.0, 10.0, 10.0, 10.0);
        let b = BoundingBox::new(13.0, 10.0, 10.0, 10.0);
        let c = BoundingBox::new(16.0, 10.0, 10.0, 10.0);
        assert_eq!(nms_keep_mask(&[a, b, c], 0.3), vec![true, false, true]);
    }

    #[test]
    fn threshold_is_strict() {
        // IoU exactly 1/3
        let a = BoundingBox::new(10.0, 10.0, 10.0, 10.0);
        let b = BoundingBox::new(15.0, 10.0, 10.0, 10.0);
        let iou = a.iou(&b);
        assert_eq!(nms_keep_mask(&[a, b], iou), vec![true, true]);
        assert_eq!(nms_keep_mask(&[a, b], iou - 1e-4), vec![true, false]);
    }

    #[test]
    fn empty_and_single_inputs() {
        assert!(nms_keep_mask(&[], 0.5).is_empty());
        assert_eq!(
            nms_keep_mask(&[BoundingBox::new(1.0, 1.0, 1.0, 1.0)], 0.5),
            vec![true]
        );
    }

    #[test]
    fn groups_are_keyed_by_class_and_keep_order() {
        let bbox = BoundingBox::new(5.0, 5.0, 2.0, 2.0);
        let cands = vec![
            Candidate { anchor: 3, class_id: 1, score: 0.9, bbox },
            Candidate { anchor: 1, class_id: 0, score: 0.8, bbox },
            Candidate { anchor: 0, class_id: 1, score: 0.4, bbox },
        ];
        let groups = group_by_class(&cands);
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
        let ones: Vec<usize> = groups[&1].iter().map(|c| c.anchor).collect();
        assert_eq!(ones, vec![3, 0]);

        let survivors = suppress_group(groups[&1].clone(), 0.5);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].anchor, 3);
    }
}
