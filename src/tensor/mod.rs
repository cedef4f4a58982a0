//! Raw prediction tensors and strided views.
//!
//! A prediction tensor has the logical shape
//! `[batch, grid_height, grid_width, cell_len]` and lives in one contiguous
//! buffer. Cells are `cell_stride` elements apart; a stride larger than
//! `cell_len` represents padding appended to every cell by the inference
//! runtime. Padding is never read.
//!
//! `PredictionView` is the borrowed form consumed by the pipeline,
//! `PredictionTensor` the owned form that can be built from flat or nested
//! input.

use crate::util::{DecodeError, DecodeResult};

/// Logical four-dimensional shape of a prediction tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TensorShape {
    /// Number of images in the batch.
    pub batch: usize,
    /// Number of grid rows.
    pub grid_height: usize,
    /// Number of grid columns.
    pub grid_width: usize,
    /// Logical per-cell vector length.
    pub cell_len: usize,
}

impl TensorShape {
    /// Creates a shape from its four dimensions.
    pub fn new(batch: usize, grid_height: usize, grid_width: usize, cell_len: usize) -> Self {
        Self {
            batch,
            grid_height,
            grid_width,
            cell_len,
        }
    }

    /// Returns the dimensions as `[batch, grid_height, grid_width, cell_len]`.
    pub fn dims(&self) -> [usize; 4] {
        [self.batch, self.grid_height, self.grid_width, self.cell_len]
    }

    /// Number of grid cells in a single image.
    pub fn cells_per_image(&self) -> usize {
        self.grid_height * self.grid_width
    }

    fn validate(&self) -> DecodeResult<()> {
        if self.dims().contains(&0) {
            return Err(DecodeError::InvalidShape { shape: self.dims() });
        }
        Ok(())
    }
}

/// Number of elements a buffer must hold for `shape` with the given cell stride.
fn required_len(shape: &TensorShape, cell_stride: usize) -> DecodeResult<usize> {
    shape.validate()?;
    if cell_stride < shape.cell_len {
        return Err(DecodeError::InvalidCellStride {
            cell_len: shape.cell_len,
            stride: cell_stride,
        });
    }
    shape
        .batch
        .checked_mul(shape.grid_height)
        .and_then(|v| v.checked_mul(shape.grid_width))
        .and_then(|v| v.checked_mul(cell_stride))
        .ok_or(DecodeError::InvalidShape { shape: shape.dims() })
}

/// Borrowed prediction tensor with an explicit cell stride.
#[derive(Copy, Clone, Debug)]
pub struct PredictionView<'a> {
    data: &'a [f32],
    shape: TensorShape,
    cell_stride: usize,
}

impl<'a> PredictionView<'a> {
    /// Creates a dense view where `cell_stride == cell_len`.
    pub fn from_slice(data: &'a [f32], shape: TensorShape) -> DecodeResult<Self> {
        Self::with_cell_stride(data, shape, shape.cell_len)
    }

    /// Creates a view over a buffer whose cells are padded to `cell_stride`.
    ///
    /// The buffer must hold exactly `batch * grid_height * grid_width * cell_stride`
    /// values.
    pub fn with_cell_stride(
        data: &'a [f32],
        shape: TensorShape,
        cell_stride: usize,
    ) -> DecodeResult<Self> {
        let expected = required_len(&shape, cell_stride)?;
        if data.len() != expected {
            return Err(DecodeError::BufferLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            shape,
            cell_stride,
        })
    }

    /// Returns the logical shape.
    pub fn shape(&self) -> TensorShape {
        self.shape
    }

    /// Returns the batch size.
    pub fn batch(&self) -> usize {
        self.shape.batch
    }

    /// Returns the number of grid rows.
    pub fn grid_height(&self) -> usize {
        self.shape.grid_height
    }

    /// Returns the number of grid columns.
    pub fn grid_width(&self) -> usize {
        self.shape.grid_width
    }

    /// Returns the logical per-cell length.
    pub fn cell_len(&self) -> usize {
        self.shape.cell_len
    }

    /// Returns the distance in elements between consecutive cells.
    pub fn cell_stride(&self) -> usize {
        self.cell_stride
    }

    /// Returns the backing slice including any cell padding.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    fn image_stride(&self) -> usize {
        self.shape.cells_per_image() * self.cell_stride
    }

    /// Returns the logical vector of cell `(row, col)` in image `batch`.
    pub fn cell(&self, batch: usize, row: usize, col: usize) -> Option<&'a [f32]> {
        if batch >= self.shape.batch || row >= self.shape.grid_height || col >= self.shape.grid_width
        {
            return None;
        }
        let cell_idx = row * self.shape.grid_width + col;
        let start = batch * self.image_stride() + cell_idx * self.cell_stride;
        self.data.get(start..start + self.shape.cell_len)
    }

    /// Iterates over the cells of image `batch` in row-major grid order.
    pub fn cells(&self, batch: usize) -> impl Iterator<Item = &'a [f32]> + 'a {
        let image = self.image(batch);
        let cell_len = self.shape.cell_len;
        let stride = self.cell_stride;
        image
            .into_iter()
            .flat_map(move |view| view.data.chunks_exact(stride).map(move |c| &c[..cell_len]))
    }

    /// Returns a zero-copy single-image view of batch item `batch`.
    pub fn image(&self, batch: usize) -> Option<PredictionView<'a>> {
        if batch >= self.shape.batch {
            return None;
        }
        let len = self.image_stride();
        let start = batch * len;
        let data = self.data.get(start..start + len)?;
        Some(PredictionView {
            data,
            shape: TensorShape {
                batch: 1,
                ..self.shape
            },
            cell_stride: self.cell_stride,
        })
    }
}

/// Owned prediction tensor backed by one contiguous buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct PredictionTensor {
    data: Vec<f32>,
    shape: TensorShape,
    cell_stride: usize,
}

impl PredictionTensor {
    /// Wraps a dense buffer of exactly `shape` elements.
    pub fn new(data: Vec<f32>, shape: TensorShape) -> DecodeResult<Self> {
        let cell_stride = shape.cell_len;
        Self::with_cell_stride(data, shape, cell_stride)
    }

    /// Wraps a buffer whose cells are padded to `cell_stride`.
    pub fn with_cell_stride(
        data: Vec<f32>,
        shape: TensorShape,
        cell_stride: usize,
    ) -> DecodeResult<Self> {
        PredictionView::with_cell_stride(&data, shape, cell_stride)?;
        Ok(Self {
            data,
            shape,
            cell_stride,
        })
    }

    /// Flattens nested `[batch][row][col][value]` input into a dense tensor.
    ///
    /// Every image must have the same number of rows, every row the same
    /// number of cells and every cell the same length; the first mismatch is
    /// reported as [`DecodeError::RaggedInput`].
    pub fn from_nested(nested: &[Vec<Vec<Vec<f32>>>]) -> DecodeResult<Self> {
        let batch = nested.len();
        let grid_height = nested.first().map_or(0, Vec::len);
        let grid_width = nested
            .first()
            .and_then(|img| img.first())
            .map_or(0, Vec::len);
        let cell_len = nested
            .first()
            .and_then(|img| img.first())
            .and_then(|row| row.first())
            .map_or(0, Vec::len);
        let shape = TensorShape::new(batch, grid_height, grid_width, cell_len);
        let total = required_len(&shape, cell_len)?;

        for (img_idx, image) in nested.iter().enumerate() {
            if image.len() != grid_height {
                return Err(DecodeError::RaggedInput {
                    axis: "image",
                    index: img_idx,
                    expected: grid_height,
                    got: image.len(),
                });
            }
            for (row_idx, row) in image.iter().enumerate() {
                if row.len() != grid_width {
                    return Err(DecodeError::RaggedInput {
                        axis: "row",
                        index: img_idx * grid_height + row_idx,
                        expected: grid_width,
                        got: row.len(),
                    });
                }
                for (col_idx, cell) in row.iter().enumerate() {
                    if cell.len() != cell_len {
                        return Err(DecodeError::RaggedInput {
                            axis: "cell",
                            index: (img_idx * grid_height + row_idx) * grid_width + col_idx,
                            expected: cell_len,
                            got: cell.len(),
                        });
                    }
                }
            }
        }

        let mut data = Vec::with_capacity(total);
        for cell in nested.iter().flatten().flatten() {
            data.extend_from_slice(cell);
        }
        Self::new(data, shape)
    }

    /// Returns a borrowed view of the tensor.
    pub fn view(&self) -> PredictionView<'_> {
        PredictionView {
            data: &self.data,
            shape: self.shape,
            cell_stride: self.cell_stride,
        }
    }

    /// Returns the logical shape.
    pub fn shape(&self) -> TensorShape {
        self.shape
    }

    /// Returns the backing buffer including any cell padding.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Consumes the tensor and returns its backing buffer.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}
