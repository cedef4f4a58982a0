//! Error types for sqdet.

use thiserror::Error;

/// Result alias for sqdet operations.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Broad category of a [`DecodeError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The raw prediction array does not match the configured layout.
    InputShape,
    /// The detector configuration is missing values or malformed.
    Config,
}

/// Errors that can occur when validating inputs or decoding predictions.
///
/// Numeric degeneracies (zero-area unions, overflowing exponentials, NaN
/// logits) never show up here: they are resolved to defined values inside
/// the pipeline.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DecodeError {
    /// A tensor dimension is zero.
    #[error("invalid tensor shape {shape:?}: every dimension must be non-zero")]
    InvalidShape { shape: [usize; 4] },
    /// Cell stride is smaller than the logical per-cell length.
    #[error("invalid cell stride {stride} for cell length {cell_len}")]
    InvalidCellStride { cell_len: usize, stride: usize },
    /// Backing buffer length does not cover the requested shape.
    #[error("prediction buffer holds {got} values, expected {expected}")]
    BufferLength { expected: usize, got: usize },
    /// A nested input row has a different length than its siblings.
    #[error("ragged prediction input at {axis} index {index}: expected {expected} entries, got {got}")]
    RaggedInput {
        axis: &'static str,
        index: usize,
        expected: usize,
        got: usize,
    },
    /// Grid dimensions of the tensor differ from the configured grid.
    #[error("prediction grid is {got_height}x{got_width}, detector expects {expected_height}x{expected_width}")]
    GridMismatch {
        expected_height: usize,
        expected_width: usize,
        got_height: usize,
        got_width: usize,
    },
    /// Per-cell vector length differs from `anchors_per_cell * (class_count + 5)`.
    #[error("per-cell length is {got}, detector expects {expected}")]
    CellLengthMismatch { expected: usize, got: usize },
    /// Requested batch item does not exist.
    #[error("batch index {index} out of bounds for batch of {len}")]
    BatchIndexOutOfBounds { index: usize, len: usize },
    /// Flat anchor table length is not a multiple of four.
    #[error("anchor table length {len} is not a multiple of 4")]
    AnchorTableLength { len: usize },
    /// Anchor count does not equal grid cells times anchors per cell.
    #[error("anchor table holds {got} anchors, grid requires {expected}")]
    AnchorCountMismatch { expected: usize, got: usize },
    /// An anchor has a non-finite coordinate or a non-positive size.
    #[error("anchor {index} is invalid: {reason}")]
    InvalidAnchor { index: usize, reason: &'static str },
    /// Grid and anchor counts overflow the addressable anchor or cell size.
    #[error("grid {grid_height}x{grid_width} with {anchors_per_cell} anchors per cell and {class_count} classes is too large")]
    GridTooLarge {
        grid_height: usize,
        grid_width: usize,
        anchors_per_cell: usize,
        class_count: usize,
    },
    /// A count or dimension field of the configuration is zero.
    #[error("configuration field `{field}` must be non-zero")]
    ZeroField { field: &'static str },
    /// A threshold field is non-finite or out of range.
    #[error("configuration field `{field}` has invalid value {value}")]
    InvalidThreshold { field: &'static str, value: f32 },
}

impl DecodeError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::InvalidShape { .. }
            | DecodeError::InvalidCellStride { .. }
            | DecodeError::BufferLength { .. }
            | DecodeError::RaggedInput { .. }
            | DecodeError::GridMismatch { .. }
            | DecodeError::CellLengthMismatch { .. }
            | DecodeError::BatchIndexOutOfBounds { .. } => ErrorKind::InputShape,
            DecodeError::AnchorTableLength { .. }
            | DecodeError::AnchorCountMismatch { .. }
            | DecodeError::InvalidAnchor { .. }
            | DecodeError::GridTooLarge { .. }
            | DecodeError::ZeroField { .. }
            | DecodeError::InvalidThreshold { .. } => ErrorKind::Config,
        }
    }
}
