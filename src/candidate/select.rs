//! Candidate selection: top-N, per-class NMS and the final score filter.

use crate::candidate::nms::{group_by_class, suppress_group};
use crate::candidate::topk::{select_top_n, Candidate};
use crate::trace::{trace_detail, trace_event};

/// Thresholds driving candidate selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectParams {
    /// Candidates kept before NMS; zero keeps all.
    pub top_n_detection: usize,
    /// IoU above which a lower-scored box of the same class is suppressed.
    pub nms_thresh: f32,
    /// Minimum score of an emitted detection.
    pub final_threshold: f32,
}

/// Runs top-N pruning, per-class NMS and the final threshold.
///
/// Survivors come out ordered by class id, then by descending score, then by
/// anchor index.
pub fn select_candidates(candidates: Vec<Candidate>, params: &SelectParams) -> Vec<Candidate> {
    let total = candidates.len();
    let top = select_top_n(candidates, params.top_n_detection);
    trace_event!("top_n", total = total, kept = top.len());

    let mut out = Vec::new();
    for (class_id, group) in group_by_class(&top) {
        let before = group.len();
        let survivors = suppress_group(group, params.nms_thresh);
        trace_detail!(
            "nms_class",
            class_id = class_id,
            before = before,
            after = survivors.len()
        );
        out.extend(
            survivors
                .into_iter()
                .filter(|c| c.score >= params.final_threshold),
        );
    }

    trace_event!("selected", count = out.len());
    out
}

#[cfg(test)]
mod tests {
    use super::{select_candidates, SelectParams};
    use crate::candidate::topk::Candidate;
    use crate::decode::BoundingBox;

    fn cand(anchor: usize, class_id: usize, score: f32, cx: f32) -> Candidate {
        Candidate {
            anchor,
            class_id,
            score,
            bbox: BoundingBox::new(cx, 20.0, 10.0, 10.0),
        }
    }

    #[test]
    fn suppression_is_scoped_per_class() {
        let params = SelectParams {
            top_n_detection: 0,
            nms_thresh: 0.5,
            final_threshold: 0.0,
        };
        let input = vec![cand(0, 0, 0.9, 20.0), cand(1, 1, 0.8, 20.0), cand(2, 0, 0.7, 20.5)];
        let out = select_candidates(input, &params);
        let ids: Vec<(usize, usize)> = out.iter().map(|c| (c.class_id, c.anchor)).collect();
        assert_eq!(ids, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn final_threshold_drops_low_scores_after_nms() {
        let params = SelectParams {
            top_n_detection: 0,
            nms_thresh: 0.5,
            final_threshold: 0.9,
        };
        let out = select_candidates(vec![cand(0, 0, 0.8, 20.0)], &params);
        assert!(out.is_empty());

        let out = select_candidates(vec![cand(0, 0, 0.9, 20.0)], &params);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn top_n_runs_before_nms() {
        let params = SelectParams {
            top_n_detection: 1,
            nms_thresh: 0.5,
            final_threshold: 0.0,
        };
        let input = vec![cand(0, 0, 0.3, 20.0), cand(1, 1, 0.6, 80.0)];
        let out = select_candidates(input, &params);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].anchor, 1);
    }
}
