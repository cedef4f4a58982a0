//! Candidate selection and pruning.
//!
//! Includes top-N collection, per-class non-maximum suppression and the final
//! score filter.

pub(crate) mod nms;
pub(crate) mod select;
pub(crate) mod topk;
