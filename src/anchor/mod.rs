//! Anchor templates.
//!
//! Anchors are fixed reference boxes in pixel space, one per
//! `(grid_row, grid_col, anchor_in_cell)` triple, stored row-major in that
//! order so anchor `i` lines up with the `i`-th per-anchor entry extracted
//! from the prediction tensor. A table is built once per detector
//! configuration and never mutated afterwards.

use crate::util::{DecodeError, DecodeResult};

/// Anchor template in center form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    /// Center x in pixels.
    pub cx: f32,
    /// Center y in pixels.
    pub cy: f32,
    /// Width in pixels.
    pub w: f32,
    /// Height in pixels.
    pub h: f32,
}

impl Anchor {
    /// Creates an anchor from center coordinates and size.
    pub fn new(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self { cx, cy, w, h }
    }

    fn check(&self, index: usize) -> DecodeResult<()> {
        if !(self.cx.is_finite() && self.cy.is_finite() && self.w.is_finite() && self.h.is_finite())
        {
            return Err(DecodeError::InvalidAnchor {
                index,
                reason: "non-finite coordinate",
            });
        }
        if self.w <= 0.0 || self.h <= 0.0 {
            return Err(DecodeError::InvalidAnchor {
                index,
                reason: "non-positive size",
            });
        }
        Ok(())
    }
}

/// Immutable table of anchor templates.
#[derive(Clone, Debug, PartialEq)]
pub struct AnchorTable {
    anchors: Vec<Anchor>,
}

impl AnchorTable {
    /// Builds a table from anchors, validating each one.
    pub fn new(anchors: Vec<Anchor>) -> DecodeResult<Self> {
        if anchors.is_empty() {
            return Err(DecodeError::ZeroField {
                field: "anchor_boxes",
            });
        }
        for (index, anchor) in anchors.iter().enumerate() {
            anchor.check(index)?;
        }
        Ok(Self { anchors })
    }

    /// Builds a table from a flat row-major `[cx, cy, w, h, cx, cy, ...]` slice.
    pub fn from_flat(values: &[f32]) -> DecodeResult<Self> {
        if values.len() % 4 != 0 {
            return Err(DecodeError::AnchorTableLength { len: values.len() });
        }
        let anchors = values
            .chunks_exact(4)
            .map(|a| Anchor::new(a[0], a[1], a[2], a[3]))
            .collect();
        Self::new(anchors)
    }

    /// Generates the SqueezeDet anchor grid.
    ///
    /// Cell centers are spread evenly so that column `c` sits at
    /// `(c + 1) * image_width / (grid_width + 1)` and row `r` at
    /// `(r + 1) * image_height / (grid_height + 1)`. Every cell gets one
    /// anchor per `(width, height)` entry of `shapes`, in order.
    pub fn from_grid(
        grid_width: usize,
        grid_height: usize,
        image_width: u32,
        image_height: u32,
        shapes: &[(f32, f32)],
    ) -> DecodeResult<Self> {
        if grid_width == 0 {
            return Err(DecodeError::ZeroField {
                field: "grid_width",
            });
        }
        if grid_height == 0 {
            return Err(DecodeError::ZeroField {
                field: "grid_height",
            });
        }
        if shapes.is_empty() {
            return Err(DecodeError::ZeroField {
                field: "anchors_per_cell",
            });
        }

        let step_x = image_width as f32 / (grid_width + 1) as f32;
        let step_y = image_height as f32 / (grid_height + 1) as f32;
        let mut anchors = Vec::with_capacity(grid_width * grid_height * shapes.len());
        for row in 0..grid_height {
            let cy = (row + 1) as f32 * step_y;
            for col in 0..grid_width {
                let cx = (col + 1) as f32 * step_x;
                anchors.extend(shapes.iter().map(|&(w, h)| Anchor::new(cx, cy, w, h)));
            }
        }
        Self::new(anchors)
    }

    /// Returns the number of anchors.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Returns true if the table holds no anchors.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Returns anchor `index` if present.
    pub fn get(&self, index: usize) -> Option<&Anchor> {
        self.anchors.get(index)
    }

    /// Returns all anchors in index order.
    pub fn as_slice(&self) -> &[Anchor] {
        &self.anchors
    }

    /// Iterates over anchors in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, Anchor> {
        self.anchors.iter()
    }

    /// Returns the table as a flat row-major `[cx, cy, w, h]` vector.
    pub fn to_flat(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.anchors.len() * 4);
        for a in &self.anchors {
            out.extend_from_slice(&[a.cx, a.cy, a.w, a.h]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{Anchor, AnchorTable};
    use crate::util::DecodeError;

    #[test]
    fn from_flat_rejects_partial_rows() {
        let err = AnchorTable::from_flat(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap_err();
        assert_eq!(err, DecodeError::AnchorTableLength { len: 5 });
    }

    #[test]
    fn from_flat_rejects_degenerate_anchor() {
        let err = AnchorTable::from_flat(&[1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 0.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidAnchor {
                index: 1,
                reason: "non-positive size",
            }
        );
    }

    #[test]
    fn from_grid_orders_anchors_row_major_with_shapes_innermost() {
        let table = AnchorTable::from_grid(3, 2, 40, 30, &[(4.0, 6.0), (8.0, 2.0)]).unwrap();
        assert_eq!(table.len(), 3 * 2 * 2);

        assert_eq!(table.get(0), Some(&Anchor::new(10.0, 10.0, 4.0, 6.0)));
        assert_eq!(table.get(1), Some(&Anchor::new(10.0, 10.0, 8.0, 2.0)));
        // second column of the first row
        assert_eq!(table.get(2), Some(&Anchor::new(20.0, 10.0, 4.0, 6.0)));
        // first column of the second row
        assert_eq!(table.get(6), Some(&Anchor::new(10.0, 20.0, 4.0, 6.0)));
        assert_eq!(table.get(11), Some(&Anchor::new(30.0, 20.0, 8.0, 2.0)));
    }

    #[test]
    fn flat_round_trip_preserves_order() {
        let flat = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let table = AnchorTable::from_flat(&flat).unwrap();
        assert_eq!(table.to_flat(), flat);
    }
}
