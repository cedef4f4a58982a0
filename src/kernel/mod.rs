//! Elementwise activation kernels.
//!
//! The extraction stage applies the logistic sigmoid to objectness logits and
//! the decode stage applies the safe exponential to width/height deltas. Both
//! run over long contiguous buffers, so they sit behind a trait with a scalar
//! reference implementation and an `f32x8` implementation (`simd` feature).

use crate::util::math;

/// Activation kernel applied in place over contiguous buffers.
pub trait Activation {
    /// Replaces every value with its logistic sigmoid; NaN becomes `0.0`.
    fn sigmoid_in_place(values: &mut [f32]);

    /// Replaces every value with `safe_exp(value, thresh)`.
    fn safe_exp_in_place(values: &mut [f32], thresh: f32);

    /// Row-wise softmax over a row-major matrix with `cols` columns.
    fn softmax_rows_in_place(values: &mut [f32], cols: usize) {
        math::softmax_rows_in_place(values, cols);
    }
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

/// Kernel used by the pipeline: SIMD when compiled in, scalar otherwise.
#[cfg(not(feature = "simd"))]
pub type DefaultActivation = scalar::ScalarActivation;

/// Kernel used by the pipeline: SIMD when compiled in, scalar otherwise.
#[cfg(feature = "simd")]
pub type DefaultActivation = simd::SimdActivation;
