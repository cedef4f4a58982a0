//! Low-level building blocks for custom decode pipelines.
//!
//! These expose the individual stages behind [`Detector`](crate::Detector):
//! field extraction, box decoding, score fusion and candidate selection, plus
//! the activation kernels. Most users should prefer the top-level `Detector`.

pub use crate::candidate::nms::{group_by_class, nms_keep_mask, suppress_group};
pub use crate::candidate::select::{select_candidates, SelectParams};
pub use crate::candidate::topk::{select_top_n, Candidate, TopK};
pub use crate::decode::{decode_boxes, fuse_anchor, fuse_scores, iou, DecodeParams, FusedScore};
pub use crate::extract::{
    extract_fields, BoxDeltas, ClassProbs, Confidences, FieldLayout, Fields,
};
pub use crate::kernel::scalar::ScalarActivation;
pub use crate::kernel::{Activation, DefaultActivation};
pub use crate::util::math::{safe_exp, sigmoid, softmax_rows_in_place};
