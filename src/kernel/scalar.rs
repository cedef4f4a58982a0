//! Scalar reference kernels.

use crate::kernel::Activation;
use crate::util::math::{safe_exp, sigmoid};

/// Straightforward per-element implementation of [`Activation`].
pub struct ScalarActivation;

impl Activation for ScalarActivation {
    fn sigmoid_in_place(values: &mut [f32]) {
        for v in values.iter_mut() {
            *v = sigmoid(*v);
        }
    }

    fn safe_exp_in_place(values: &mut [f32], thresh: f32) {
        for v in values.iter_mut() {
            *v = safe_exp(*v, thresh);
        }
    }
}
