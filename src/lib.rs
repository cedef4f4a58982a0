//! sqdet decodes the raw output grid of a single-shot, anchor-based object
//! detector (SqueezeDet family) into final detections.
//!
//! The pipeline is CPU-only and allocation-light: class logits are softmaxed,
//! objectness is squashed with a sigmoid, anchor deltas are decoded into
//! clipped pixel boxes, scores are fused, and candidates go through top-N
//! pruning, per-class NMS and a final score threshold. Batches can be decoded
//! in parallel via the `rayon` feature and activations vectorized via `simd`.
//!
//! ```no_run
//! use sqdet::{AnchorTable, Detector, DetectorConfig, PredictionView, TensorShape};
//!
//! # fn main() -> sqdet::DecodeResult<()> {
//! let anchors = AnchorTable::from_grid(4, 3, 64, 48, &[(16.0, 16.0), (32.0, 24.0)])?;
//! let detector = Detector::new(DetectorConfig::new(3, 2, 3, 4, anchors, 64, 48))?;
//!
//! let raw = vec![0.0f32; 3 * 4 * 2 * (3 + 5)];
//! let view = PredictionView::from_slice(&raw, TensorShape::new(1, 3, 4, 16))?;
//! for det in detector.decode(view)?[0].iter() {
//!     println!("{} {:.3} {:?}", det.class_id, det.score, det.bbox);
//! }
//! # Ok(())
//! # }
//! ```

mod trace;

pub mod anchor;
mod candidate;
pub mod decode;
pub mod detector;
pub mod extract;
pub mod kernel;
pub mod lowlevel;
pub mod tensor;
pub mod util;

pub use anchor::{Anchor, AnchorTable};
pub use decode::BoundingBox;
pub use detector::{
    ConfigRecord, Detection, Detections, Detector, DetectorConfig, DEFAULT_EXP_THRESH,
    DEFAULT_FINAL_THRESHOLD, DEFAULT_NMS_THRESH, DEFAULT_TOP_N_DETECTION,
};
pub use tensor::{PredictionTensor, PredictionView, TensorShape};
pub use util::{DecodeError, DecodeResult, ErrorKind};
