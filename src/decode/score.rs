//! Fusion of class probabilities and objectness into one ranking score.

/// Best class of one anchor together with its fused score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FusedScore {
    /// Index of the winning class.
    pub class_id: usize,
    /// `class_prob[class_id] * confidence`, in `[0, 1]`.
    pub score: f32,
}

/// Picks the class maximizing `prob * confidence` for a single anchor.
///
/// On equal products the lower class id wins. An empty row yields class 0
/// with score 0.
#[inline]
pub fn fuse_anchor(class_probs: &[f32], confidence: f32) -> FusedScore {
    let mut best = FusedScore {
        class_id: 0,
        score: class_probs.first().map_or(0.0, |p| p * confidence),
    };
    for (class_id, p) in class_probs.iter().enumerate().skip(1) {
        let score = p * confidence;
        if score > best.score {
            best = FusedScore { class_id, score };
        }
    }
    best
}

/// Fuses every anchor of one image.
///
/// `class_probs` is the `[anchors, class_count]` block and `confidences` the
/// matching `[anchors]` block of the same image.
pub fn fuse_scores(class_probs: &[f32], confidences: &[f32], class_count: usize) -> Vec<FusedScore> {
    if class_count == 0 {
        return Vec::new();
    }
    class_probs
        .chunks_exact(class_count)
        .zip(confidences.iter())
        .map(|(row, &conf)| fuse_anchor(row, conf))
        .collect()
}
