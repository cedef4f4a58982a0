//! Bounding boxes in center form and their overlap measure.

/// Axis-aligned box in center form, pixel units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    /// Center x.
    pub cx: f32,
    /// Center y.
    pub cy: f32,
    /// Width.
    pub w: f32,
    /// Height.
    pub h: f32,
}

impl BoundingBox {
    /// Creates a box from center coordinates and size.
    pub fn new(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self { cx, cy, w, h }
    }

    /// Builds a box from inclusive pixel corners.
    ///
    /// A box spanning pixels `xmin..=xmax` is `xmax - xmin + 1` wide and its
    /// center sits half a width right of `xmin`.
    pub fn from_corners_inclusive(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        let w = xmax - xmin + 1.0;
        let h = ymax - ymin + 1.0;
        Self {
            cx: xmin + w * 0.5,
            cy: ymin + h * 0.5,
            w,
            h,
        }
    }

    /// Returns `(xmin, ymin, xmax, ymax)` with half extents around the center.
    pub fn corners(&self) -> (f32, f32, f32, f32) {
        let hw = self.w * 0.5;
        let hh = self.h * 0.5;
        (self.cx - hw, self.cy - hh, self.cx + hw, self.cy + hh)
    }

    /// Returns the inclusive pixel corners `(xmin, ymin, xmax, ymax)`.
    ///
    /// Inverse of [`BoundingBox::from_corners_inclusive`].
    pub fn inclusive_corners(&self) -> (f32, f32, f32, f32) {
        let xmin = self.cx - self.w * 0.5;
        let ymin = self.cy - self.h * 0.5;
        (xmin, ymin, xmin + self.w - 1.0, ymin + self.h - 1.0)
    }

    /// Returns the box as `[cx, cy, w, h]`.
    pub fn to_array(&self) -> [f32; 4] {
        [self.cx, self.cy, self.w, self.h]
    }

    /// Returns `w * h`.
    pub fn area(&self) -> f32 {
        self.w * self.h
    }

    /// Intersection-over-union with `other`, see [`iou`].
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        iou(self, other)
    }
}

/// Intersection-over-union of two center-form boxes.
///
/// Overlap is measured per axis from centers and half extents and clamped at
/// zero. A union that is zero, negative or non-finite yields `0.0`, and the
/// result is clamped into `[0, 1]`.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let (a_hw, a_hh) = (a.w * 0.5, a.h * 0.5);
    let (b_hw, b_hh) = (b.w * 0.5, b.h * 0.5);

    let overlap_w = ((a.cx + a_hw).min(b.cx + b_hw) - (a.cx - a_hw).max(b.cx - b_hw)).max(0.0);
    let overlap_h = ((a.cy + a_hh).min(b.cy + b_hh) - (a.cy - a_hh).max(b.cy - b_hh)).max(0.0);
    let intersection = overlap_w * overlap_h;

    let union = a.area() + b.area() - intersection;
    if !(union > 0.0 && union.is_finite()) {
        return 0.0;
    }
    (intersection / union).clamp(0.0, 1.0)
}
