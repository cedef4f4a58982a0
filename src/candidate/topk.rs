//! Top-N candidate selection.

use crate::decode::BoundingBox;
use std::cmp::Ordering;

/// Detection candidate produced by decoding one anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Index of the anchor the candidate was decoded from.
    pub anchor: usize,
    /// Winning class of the anchor.
    pub class_id: usize,
    /// Fused detection score in `[0, 1]`.
    pub score: f32,
    /// Decoded, clipped box.
    pub bbox: BoundingBox,
}

/// Descending score; the lower anchor index wins ties.
fn candidate_cmp_desc(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.anchor.cmp(&b.anchor))
}

/// Sorts candidates by descending score with deterministic tie-breaking.
pub(crate) fn sort_candidates_desc(candidates: &mut [Candidate]) {
    candidates.sort_by(candidate_cmp_desc);
}

/// Top-K container with O(k) insertion cost.
pub struct TopK<T> {
    k: usize,
    items: Vec<T>,
}

impl TopK<Candidate> {
    /// Creates a collector retaining at most `k` candidates.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            items: Vec::with_capacity(k),
        }
    }

    /// Pushes a candidate, evicting the current worst one when full.
    pub fn push(&mut self, candidate: Candidate) {
        if self.k == 0 {
            return;
        }
        if self.items.len() < self.k {
            self.items.push(candidate);
            return;
        }

        let mut worst_idx = 0usize;
        for (idx, item) in self.items.iter().enumerate().skip(1) {
            if candidate_cmp_desc(item, &self.items[worst_idx]) == Ordering::Greater {
                worst_idx = idx;
            }
        }

        if candidate_cmp_desc(&candidate, &self.items[worst_idx]) == Ordering::Less {
            self.items[worst_idx] = candidate;
        }
    }

    /// Returns the retained candidates sorted by descending score.
    pub fn into_sorted_desc(mut self) -> Vec<Candidate> {
        sort_candidates_desc(&mut self.items);
        self.items
    }
}

/// Keeps the `top_n` best candidates, sorted by descending score.
///
/// When `top_n` is zero or not smaller than the number of candidates every
/// candidate is kept. Equal scores are ordered by anchor index.
pub fn select_top_n(mut candidates: Vec<Candidate>, top_n: usize) -> Vec<Candidate> {
    if top_n == 0 || top_n >= candidates.len() {
        sort_candidates_desc(&mut candidates);
        return candidates;
    }

    let mut topk = TopK::new(top_n);
    for candidate in candidates {
        topk.push(candidate);
    }
    topk.into_sorted_desc()
}
