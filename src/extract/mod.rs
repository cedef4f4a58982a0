//! Field extraction from the raw prediction tensor.
//!
//! Each grid cell carries `anchors_per_cell * (class_count + 5)` values laid
//! out as three contiguous runs:
//!
//! ```text
//! [ class logits: A * C ][ objectness logits: A ][ box deltas: A * 4 ]
//! ```
//!
//! where anchor `k` of the cell owns `C` consecutive class logits, one
//! objectness logit and four consecutive deltas `(dx, dy, dw, dh)` within its
//! run. The runs are copied into per-stage buffers indexed by global anchor
//! (`cell_index * A + k`), then activated: softmax over classes, sigmoid over
//! objectness. Deltas are left raw for the box decoder.

use crate::kernel::Activation;
use crate::tensor::PredictionView;
use crate::util::{DecodeError, DecodeResult};

/// Expected grid geometry and per-cell layout of a prediction tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldLayout {
    /// Number of object classes.
    pub class_count: usize,
    /// Number of anchors per grid cell.
    pub anchors_per_cell: usize,
    /// Number of grid rows.
    pub grid_height: usize,
    /// Number of grid columns.
    pub grid_width: usize,
}

impl FieldLayout {
    /// Logical length of one cell: `anchors_per_cell * (class_count + 5)`.
    pub fn cell_len(&self) -> usize {
        self.anchors_per_cell
            .saturating_mul(self.class_count.saturating_add(5))
    }

    /// Number of anchors in one image.
    pub fn anchor_count(&self) -> usize {
        self.grid_height
            .saturating_mul(self.grid_width)
            .saturating_mul(self.anchors_per_cell)
    }

    fn class_run(&self) -> usize {
        self.anchors_per_cell * self.class_count
    }

    /// Checks that `view` matches this layout.
    pub fn check(&self, view: &PredictionView<'_>) -> DecodeResult<()> {
        if view.grid_height() != self.grid_height || view.grid_width() != self.grid_width {
            return Err(DecodeError::GridMismatch {
                expected_height: self.grid_height,
                expected_width: self.grid_width,
                got_height: view.grid_height(),
                got_width: view.grid_width(),
            });
        }
        if view.cell_len() != self.cell_len() {
            return Err(DecodeError::CellLengthMismatch {
                expected: self.cell_len(),
                got: view.cell_len(),
            });
        }
        Ok(())
    }
}

/// Softmax class probabilities, shape `[batch, anchors, classes]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassProbs {
    data: Vec<f32>,
    batch: usize,
    anchors: usize,
    classes: usize,
}

impl ClassProbs {
    /// Returns `[batch, anchors, classes]`.
    pub fn shape(&self) -> [usize; 3] {
        [self.batch, self.anchors, self.classes]
    }

    /// Returns the probability row of anchor `anchor` in image `batch`.
    pub fn row(&self, batch: usize, anchor: usize) -> Option<&[f32]> {
        if batch >= self.batch || anchor >= self.anchors {
            return None;
        }
        let start = (batch * self.anchors + anchor) * self.classes;
        self.data.get(start..start + self.classes)
    }

    /// Returns the `[anchors, classes]` block of image `batch`.
    pub fn image(&self, batch: usize) -> Option<&[f32]> {
        let len = self.anchors * self.classes;
        let start = batch.checked_mul(len)?;
        self.data.get(start..start + len)
    }

    /// Returns the whole buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Sigmoid objectness confidences, shape `[batch, anchors]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Confidences {
    data: Vec<f32>,
    batch: usize,
    anchors: usize,
}

impl Confidences {
    /// Returns `[batch, anchors]`.
    pub fn shape(&self) -> [usize; 2] {
        [self.batch, self.anchors]
    }

    /// Returns the confidence of anchor `anchor` in image `batch`.
    pub fn get(&self, batch: usize, anchor: usize) -> Option<f32> {
        if batch >= self.batch || anchor >= self.anchors {
            return None;
        }
        self.data.get(batch * self.anchors + anchor).copied()
    }

    /// Returns the confidences of image `batch`.
    pub fn image(&self, batch: usize) -> Option<&[f32]> {
        let start = batch.checked_mul(self.anchors)?;
        self.data.get(start..start + self.anchors)
    }

    /// Returns the whole buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Raw box deltas `(dx, dy, dw, dh)`, shape `[batch, anchors, 4]`.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxDeltas {
    data: Vec<f32>,
    batch: usize,
    anchors: usize,
}

impl BoxDeltas {
    /// Builds a delta array from a dense `[batch, anchors, 4]` buffer.
    pub fn from_vec(data: Vec<f32>, batch: usize, anchors: usize) -> DecodeResult<Self> {
        let expected = batch * anchors * 4;
        if data.len() != expected {
            return Err(DecodeError::BufferLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            batch,
            anchors,
        })
    }

    /// Returns `[batch, anchors, 4]`.
    pub fn shape(&self) -> [usize; 3] {
        [self.batch, self.anchors, 4]
    }

    /// Returns the deltas of anchor `anchor` in image `batch`.
    pub fn get(&self, batch: usize, anchor: usize) -> Option<[f32; 4]> {
        if batch >= self.batch || anchor >= self.anchors {
            return None;
        }
        let start = (batch * self.anchors + anchor) * 4;
        let d = self.data.get(start..start + 4)?;
        Some([d[0], d[1], d[2], d[3]])
    }

    /// Returns the `[anchors, 4]` block of image `batch`.
    pub fn image(&self, batch: usize) -> Option<&[f32]> {
        let len = self.anchors * 4;
        let start = batch.checked_mul(len)?;
        self.data.get(start..start + len)
    }

    /// Returns the whole buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// The three per-anchor fields of a prediction tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct Fields {
    /// Softmax class probabilities.
    pub class_probs: ClassProbs,
    /// Sigmoid objectness confidences.
    pub confidences: Confidences,
    /// Raw box deltas.
    pub deltas: BoxDeltas,
}

/// Splits `view` into class probabilities, confidences and box deltas.
///
/// The view is checked against `layout` first; on mismatch nothing is
/// allocated and the error is returned.
pub fn extract_fields<K: Activation>(
    view: PredictionView<'_>,
    layout: &FieldLayout,
) -> DecodeResult<Fields> {
    layout.check(&view)?;

    let batch = view.batch();
    let per_cell = layout.anchors_per_cell;
    let classes = layout.class_count;
    let anchors = layout.anchor_count();
    let class_run = layout.class_run();
    let conf_end = class_run + per_cell;

    let mut class_data = vec![0.0f32; batch * anchors * classes];
    let mut conf_data = vec![0.0f32; batch * anchors];
    let mut delta_data = vec![0.0f32; batch * anchors * 4];

    for b in 0..batch {
        for (cell_idx, cell) in view.cells(b).enumerate() {
            let anchor0 = b * anchors + cell_idx * per_cell;

            let dst = anchor0 * classes;
            class_data[dst..dst + class_run].copy_from_slice(&cell[..class_run]);

            conf_data[anchor0..anchor0 + per_cell].copy_from_slice(&cell[class_run..conf_end]);

            let dst = anchor0 * 4;
            delta_data[dst..dst + per_cell * 4].copy_from_slice(&cell[conf_end..]);
        }
    }

    K::softmax_rows_in_place(&mut class_data, classes);
    K::sigmoid_in_place(&mut conf_data);

    Ok(Fields {
        class_probs: ClassProbs {
            data: class_data,
            batch,
            anchors,
            classes,
        },
        confidences: Confidences {
            data: conf_data,
            batch,
            anchors,
        },
        deltas: BoxDeltas {
            data: delta_data,
            batch,
            anchors,
        },
    })
}
