//! High-level detector: raw prediction tensor in, per-image detections out.
//!
//! A [`Detector`] owns a validated [`DetectorConfig`]. Each call to
//! [`Detector::decode`] extracts the activated fields for the whole batch, then
//! runs box decoding, score fusion and candidate selection image by image.
//! With the `rayon` feature and [`Detector::with_parallel`] the images are
//! processed concurrently; the output is identical either way.

mod config;
mod output;

pub use config::{
    ConfigRecord, DetectorConfig, DEFAULT_EXP_THRESH, DEFAULT_FINAL_THRESHOLD,
    DEFAULT_NMS_THRESH, DEFAULT_TOP_N_DETECTION,
};
pub use output::{Detection, Detections};

use crate::candidate::select::{select_candidates, SelectParams};
use crate::candidate::topk::Candidate;
use crate::decode::{decode_boxes, fuse_scores, DecodeParams};
use crate::extract::{extract_fields, FieldLayout, Fields};
use crate::kernel::DefaultActivation;
use crate::tensor::PredictionView;
use crate::trace::trace_span;
use crate::util::{DecodeError, DecodeResult};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// SqueezeDet-style detection decoder.
#[derive(Clone, Debug)]
pub struct Detector {
    config: DetectorConfig,
    layout: FieldLayout,
    parallel: bool,
}

impl Detector {
    /// Validates `config` and builds a detector.
    pub fn new(config: DetectorConfig) -> DecodeResult<Self> {
        config.validate()?;
        let layout = FieldLayout {
            class_count: config.class_count,
            anchors_per_cell: config.anchors_per_cell,
            grid_height: config.grid_height,
            grid_width: config.grid_width,
        };
        Ok(Self {
            config,
            layout,
            parallel: false,
        })
    }

    /// Decodes images of a batch concurrently when the `rayon` feature is
    /// enabled. Without the feature the flag is ignored.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Whether batch decoding is spread across images.
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Validated configuration this detector was built from.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Per-cell field layout derived from the configuration.
    pub fn layout(&self) -> FieldLayout {
        self.layout
    }

    /// Decodes every image of `view`; one [`Detections`] per image, in batch order.
    pub fn decode(&self, view: PredictionView<'_>) -> DecodeResult<Vec<Detections>> {
        let _span = trace_span!(
            "decode",
            batch = view.batch(),
            anchors = self.layout.anchor_count(),
            parallel = self.parallel
        )
        .entered();

        let fields = extract_fields::<DefaultActivation>(view, &self.layout)?;

        #[cfg(feature = "rayon")]
        {
            if self.parallel {
                return self.decode_images_par(&fields, view.batch());
            }
        }

        (0..view.batch())
            .map(|batch| self.decode_fields(&fields, batch))
            .collect()
    }

    /// Decodes a single image of the batch.
    pub fn decode_image(&self, view: PredictionView<'_>, index: usize) -> DecodeResult<Detections> {
        let image = view.image(index).ok_or(DecodeError::BatchIndexOutOfBounds {
            index,
            len: view.batch(),
        })?;
        let _span = trace_span!("decode_image", index = index).entered();
        let fields = extract_fields::<DefaultActivation>(image, &self.layout)?;
        self.decode_fields(&fields, 0)
    }

    #[cfg(feature = "rayon")]
    fn decode_images_par(&self, fields: &Fields, batch: usize) -> DecodeResult<Vec<Detections>> {
        (0..batch)
            .into_par_iter()
            .map(|b| self.decode_fields(fields, b))
            .collect()
    }

    fn decode_fields(&self, fields: &Fields, batch: usize) -> DecodeResult<Detections> {
        let _span = trace_span!("image", index = batch).entered();
        let cfg = &self.config;
        let out_of_bounds = DecodeError::BatchIndexOutOfBounds {
            index: batch,
            len: fields.confidences.shape()[0],
        };

        let boxes = decode_boxes::<DefaultActivation>(
            &fields.deltas,
            batch,
            &cfg.anchors,
            &DecodeParams {
                exp_thresh: cfg.exp_thresh,
                image_width: cfg.image_width,
                image_height: cfg.image_height,
            },
        )?;
        let probs = fields
            .class_probs
            .image(batch)
            .ok_or_else(|| out_of_bounds.clone())?;
        let confs = fields.confidences.image(batch).ok_or(out_of_bounds)?;
        let fused = fuse_scores(probs, confs, cfg.class_count);

        let candidates = boxes
            .into_iter()
            .zip(fused)
            .enumerate()
            .map(|(anchor, (bbox, f))| Candidate {
                anchor,
                class_id: f.class_id,
                score: f.score,
                bbox,
            })
            .collect();

        let selected = select_candidates(
            candidates,
            &SelectParams {
                top_n_detection: cfg.top_n_detection,
                nms_thresh: cfg.nms_thresh,
                final_threshold: cfg.final_threshold,
            },
        );
        Ok(Detections::from_candidates(selected))
    }
}
