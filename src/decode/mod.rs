//! Anchor-relative box decoding and score fusion.
//!
//! Deltas `(dx, dy, dw, dh)` move and scale an anchor:
//!
//! ```text
//! cx = dx * anchor.w + anchor.cx        w = anchor.w * safe_exp(dw)
//! cy = dy * anchor.h + anchor.cy        h = anchor.h * safe_exp(dh)
//! ```
//!
//! The result is converted to corners, each corner is clipped into the image
//! (`[0, width - 1]` and `[0, height - 1]`), and the clipped corners are turned
//! back into center form with the inclusive-pixel convention.

mod bbox;
mod score;

pub use bbox::{iou, BoundingBox};
pub use score::{fuse_anchor, fuse_scores, FusedScore};

use crate::anchor::{Anchor, AnchorTable};
use crate::extract::BoxDeltas;
use crate::kernel::Activation;
use crate::util::math::clip;
use crate::util::{DecodeError, DecodeResult};

/// Parameters of the box decoder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodeParams {
    /// Threshold above which `safe_exp` switches to linear growth.
    pub exp_thresh: f32,
    /// Image width in pixels; x corners are clipped into `[0, width - 1]`.
    pub image_width: u32,
    /// Image height in pixels; y corners are clipped into `[0, height - 1]`.
    pub image_height: u32,
}

/// Decodes one anchor given its deltas and the pre-computed size factors
/// `safe_exp(dw)` and `safe_exp(dh)`.
#[inline]
fn decode_one(
    anchor: &Anchor,
    dx: f32,
    dy: f32,
    scale_w: f32,
    scale_h: f32,
    max_x: f32,
    max_y: f32,
) -> BoundingBox {
    let cx = dx * anchor.w + anchor.cx;
    let cy = dy * anchor.h + anchor.cy;
    let w = anchor.w * scale_w;
    let h = anchor.h * scale_h;

    let (xmin, ymin, xmax, ymax) = BoundingBox::new(cx, cy, w, h).corners();
    BoundingBox::from_corners_inclusive(
        clip(xmin, max_x),
        clip(ymin, max_y),
        clip(xmax, max_x),
        clip(ymax, max_y),
    )
}

/// Decodes the boxes of image `batch` against `anchors`.
///
/// Returns one clipped box per anchor, in anchor order.
pub fn decode_boxes<K: Activation>(
    deltas: &BoxDeltas,
    batch: usize,
    anchors: &AnchorTable,
    params: &DecodeParams,
) -> DecodeResult<Vec<BoundingBox>> {
    let [batch_len, anchor_count, _] = deltas.shape();
    if anchor_count != anchors.len() {
        return Err(DecodeError::AnchorCountMismatch {
            expected: anchor_count,
            got: anchors.len(),
        });
    }
    let image = deltas
        .image(batch)
        .ok_or(DecodeError::BatchIndexOutOfBounds {
            index: batch,
            len: batch_len,
        })?;

    // (dw, dh) pairs, activated in one pass
    let mut scales = Vec::with_capacity(anchor_count * 2);
    for d in image.chunks_exact(4) {
        scales.push(d[2]);
        scales.push(d[3]);
    }
    K::safe_exp_in_place(&mut scales, params.exp_thresh);

    let max_x = params.image_width.saturating_sub(1) as f32;
    let max_y = params.image_height.saturating_sub(1) as f32;

    let boxes = anchors
        .iter()
        .zip(image.chunks_exact(4))
        .zip(scales.chunks_exact(2))
        .map(|((anchor, d), s)| decode_one(anchor, d[0], d[1], s[0], s[1], max_x, max_y))
        .collect();
    Ok(boxes)
}
