//! Detector configuration.

use crate::anchor::AnchorTable;
use crate::util::{DecodeError, DecodeResult};

/// Default threshold above which `safe_exp` grows linearly.
pub const DEFAULT_EXP_THRESH: f32 = 1.0;
/// Default number of candidates kept before NMS.
pub const DEFAULT_TOP_N_DETECTION: usize = 64;
/// Default IoU above which same-class boxes are suppressed.
pub const DEFAULT_NMS_THRESH: f32 = 0.4;
/// Default minimum score of an emitted detection.
pub const DEFAULT_FINAL_THRESHOLD: f32 = 0.5;

/// Serialized detector record as shipped next to the model.
///
/// Field-for-field image of the configuration asset; the anchor table is
/// still flat. Convert with [`DetectorConfig::from_record`].
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigRecord {
    pub class_count: u32,
    pub anchors_per_cell: u32,
    pub grid_height: u32,
    pub grid_width: u32,
    /// Row-major `[cx, cy, w, h]` per anchor.
    pub anchor_boxes: Vec<f32>,
    pub exp_thresh: f32,
    pub top_n_detection: u32,
    pub nms_thresh: f32,
    pub final_threshold: f32,
    pub image_width: u32,
    pub image_height: u32,
}

/// Validated-on-use detector configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorConfig {
    /// Number of object classes.
    pub class_count: usize,
    /// Anchors per grid cell.
    pub anchors_per_cell: usize,
    /// Grid rows of the network output.
    pub grid_height: usize,
    /// Grid columns of the network output.
    pub grid_width: usize,
    /// One anchor per `(row, col, anchor_in_cell)`.
    pub anchors: AnchorTable,
    /// Threshold above which `safe_exp` grows linearly.
    pub exp_thresh: f32,
    /// Candidates kept before NMS; zero keeps all.
    pub top_n_detection: usize,
    /// IoU above which same-class boxes are suppressed.
    pub nms_thresh: f32,
    /// Minimum score of an emitted detection.
    pub final_threshold: f32,
    /// Image width in pixels.
    pub image_width: u32,
    /// Image height in pixels.
    pub image_height: u32,
}

impl DetectorConfig {
    /// Creates a configuration with default thresholds.
    pub fn new(
        class_count: usize,
        anchors_per_cell: usize,
        grid_height: usize,
        grid_width: usize,
        anchors: AnchorTable,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        Self {
            class_count,
            anchors_per_cell,
            grid_height,
            grid_width,
            anchors,
            exp_thresh: DEFAULT_EXP_THRESH,
            top_n_detection: DEFAULT_TOP_N_DETECTION,
            nms_thresh: DEFAULT_NMS_THRESH,
            final_threshold: DEFAULT_FINAL_THRESHOLD,
            image_width,
            image_height,
        }
    }

    /// Converts a serialized record, building the anchor table.
    pub fn from_record(record: &ConfigRecord) -> DecodeResult<Self> {
        let anchors = AnchorTable::from_flat(&record.anchor_boxes)?;
        let config = Self {
            class_count: record.class_count as usize,
            anchors_per_cell: record.anchors_per_cell as usize,
            grid_height: record.grid_height as usize,
            grid_width: record.grid_width as usize,
            anchors,
            exp_thresh: record.exp_thresh,
            top_n_detection: record.top_n_detection as usize,
            nms_thresh: record.nms_thresh,
            final_threshold: record.final_threshold,
            image_width: record.image_width,
            image_height: record.image_height,
        };
        config.validate()?;
        Ok(config)
    }

    /// Number of anchors the grid requires.
    pub fn anchor_count(&self) -> usize {
        self.grid_height
            .saturating_mul(self.grid_width)
            .saturating_mul(self.anchors_per_cell)
    }

    /// Per-cell length of the raw prediction vector.
    pub fn cell_len(&self) -> usize {
        self.anchors_per_cell
            .saturating_mul(self.class_count.saturating_add(5))
    }

    /// Checks every field.
    pub fn validate(&self) -> DecodeResult<()> {
        let counts = [
            ("class_count", self.class_count),
            ("anchors_per_cell", self.anchors_per_cell),
            ("grid_height", self.grid_height),
            ("grid_width", self.grid_width),
            ("image_width", self.image_width as usize),
            ("image_height", self.image_height as usize),
        ];
        if let Some((field, _)) = counts.iter().find(|(_, v)| *v == 0) {
            return Err(DecodeError::ZeroField { field });
        }

        let anchor_count = self
            .grid_height
            .checked_mul(self.grid_width)
            .and_then(|cells| cells.checked_mul(self.anchors_per_cell));
        let cell_len = self
            .class_count
            .checked_add(5)
            .and_then(|fields| fields.checked_mul(self.anchors_per_cell));
        let anchor_count = match (anchor_count, cell_len) {
            (Some(count), Some(_)) => count,
            _ => {
                return Err(DecodeError::GridTooLarge {
                    grid_height: self.grid_height,
                    grid_width: self.grid_width,
                    anchors_per_cell: self.anchors_per_cell,
                    class_count: self.class_count,
                })
            }
        };
        if self.anchors.len() != anchor_count {
            return Err(DecodeError::AnchorCountMismatch {
                expected: anchor_count,
                got: self.anchors.len(),
            });
        }

        // exp(exp_thresh) is the slope of the linear branch of safe_exp; it must
        // be finite and non-zero for safe_exp to stay increasing.
        let slope = self.exp_thresh.exp();
        if !(self.exp_thresh.is_finite() && slope.is_finite() && slope.is_normal()) {
            return Err(DecodeError::InvalidThreshold {
                field: "exp_thresh",
                value: self.exp_thresh,
            });
        }
        check_unit("nms_thresh", self.nms_thresh)?;
        check_unit("final_threshold", self.final_threshold)?;
        Ok(())
    }
}

fn check_unit(field: &'static str, value: f32) -> DecodeResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(DecodeError::InvalidThreshold { field, value })
    }
}
