//! SIMD activation kernels using the `wide` crate.
//!
//! The exponentials are evaluated eight lanes at a time with `f32x8`; the
//! branch between the two halves of each piecewise function is resolved per
//! lane afterwards. Tails shorter than eight elements use the scalar math.

use crate::kernel::Activation;
use crate::util::math::{safe_exp, sigmoid};
use wide::f32x8;

const LANES: usize = 8;

#[inline]
fn load(chunk: &[f32]) -> f32x8 {
    f32x8::from([
        chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7],
    ])
}

/// `f32x8` implementation of [`Activation`].
pub struct SimdActivation;

impl Activation for SimdActivation {
    fn sigmoid_in_place(values: &mut [f32]) {
        let one = f32x8::splat(1.0);
        let mut chunks = values.chunks_exact_mut(LANES);
        for chunk in &mut chunks {
            let x = load(chunk);
            // exp(-|x|) never overflows; both halves derive from it.
            let e = (f32x8::ZERO - x.abs()).exp();
            let pos = one / (one + e);
            let neg = e * pos;
            let pos = pos.to_array();
            let neg = neg.to_array();
            for (lane, v) in chunk.iter_mut().enumerate() {
                *v = if v.is_nan() {
                    0.0
                } else if *v >= 0.0 {
                    pos[lane]
                } else {
                    neg[lane]
                };
            }
        }
        for v in chunks.into_remainder() {
            *v = sigmoid(*v);
        }
    }

    fn safe_exp_in_place(values: &mut [f32], thresh: f32) {
        let t = f32x8::splat(thresh);
        let slope = f32x8::splat(thresh.exp());
        let one = f32x8::splat(1.0);
        let mut chunks = values.chunks_exact_mut(LANES);
        for chunk in &mut chunks {
            let x = load(chunk);
            let exp_part = x.min(t).exp().to_array();
            let lin_part = (slope * (x - t + one)).to_array();
            for (lane, v) in chunk.iter_mut().enumerate() {
                *v = if *v <= thresh {
                    exp_part[lane]
                } else {
                    lin_part[lane]
                };
            }
        }
        for v in chunks.into_remainder() {
            *v = safe_exp(*v, thresh);
        }
    }
}
