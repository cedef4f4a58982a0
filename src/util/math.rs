//! Scalar activation math shared by the extraction and decode stages.

/// Overflow-guarded exponential.
///
/// Returns `exp(x)` up to `thresh` and continues linearly with slope
/// `exp(thresh)` above it, so the result is continuous at `thresh` and
/// monotonically increasing everywhere.
#[inline]
pub fn safe_exp(x: f32, thresh: f32) -> f32 {
    if x <= thresh {
        x.exp()
    } else {
        thresh.exp() * (x - thresh + 1.0)
    }
}

/// Logistic sigmoid `1 / (1 + exp(-x))`, evaluated without overflow.
///
/// NaN maps to `0.0`.
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    if x.is_nan() {
        return 0.0;
    }
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Applies a numerically stable softmax to each row of a row-major matrix.
///
/// `values.len()` must be a multiple of `cols`; a trailing partial row is
/// left untouched. Rows whose exponential sum is zero or non-finite (NaN or
/// infinite logits) become a uniform distribution.
pub fn softmax_rows_in_place(values: &mut [f32], cols: usize) {
    if cols == 0 {
        return;
    }
    let uniform = 1.0 / cols as f32;
    for row in values.chunks_exact_mut(cols) {
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if !max.is_finite() {
            row.fill(uniform);
            continue;
        }

        let mut sum = 0.0f32;
        for v in row.iter_mut() {
            *v = (*v - max).exp();
            sum += *v;
        }

        if !(sum.is_finite() && sum > 0.0) {
            row.fill(uniform);
            continue;
        }
        let inv = 1.0 / sum;
        for v in row.iter_mut() {
            *v *= inv;
        }
    }
}

/// Clamps `v` into `[0, max]`, mapping NaN to `0.0`.
#[inline]
pub(crate) fn clip(v: f32, max: f32) -> f32 {
    v.max(0.0).min(max)
}

#[cfg(test)]
mod tests {
    use super::{clip, safe_exp, sigmoid, softmax_rows_in_place};

    #[test]
    fn safe_exp_matches_exp_below_threshold() {
        for &x in &[-20.0f32, -1.0, 0.0, 0.5, 1.0] {
            assert_eq!(safe_exp(x, 1.0), x.exp());
        }
    }

    #[test]
    fn safe_exp_is_continuous_and_linear_above_threshold() {
        let t = 1.0f32;
        let at = safe_exp(t, t);
        let just_above = safe_exp(t + 1e-4, t);
        assert!((just_above - at).abs() < 1e-3);

        let slope = safe_exp(t + 3.0, t) - safe_exp(t + 2.0, t);
        assert!((slope - t.exp()).abs() < 1e-4);
    }

    #[test]
    fn safe_exp_is_monotonic_and_finite_for_large_inputs() {
        let mut prev = safe_exp(-10.0, 1.0);
        let mut x = -10.0f32;
        while x < 1.0e4 {
            x += 7.5;
            let v = safe_exp(x, 1.0);
            assert!(v.is_finite());
            assert!(v > prev, "not increasing at {x}");
            prev = v;
        }
    }

    #[test]
    fn sigmoid_stays_in_unit_interval() {
        for &x in &[f32::NEG_INFINITY, -1e6, -3.0, 0.0, 3.0, 1e6, f32::INFINITY] {
            let s = sigmoid(x);
            assert!((0.0..=1.0).contains(&s), "sigmoid({x}) = {s}");
        }
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-7);
        assert_eq!(sigmoid(f32::NAN), 0.0);
    }

    #[test]
    fn softmax_rows_sum_to_one() {
        let mut values = vec![1.0f32, 2.0, 3.0, -50.0, 0.0, 50.0, 1000.0, 1000.0, 999.0];
        softmax_rows_in_place(&mut values, 3);
        for row in values.chunks_exact(3) {
            let sum: f32 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
        }
        assert!(values[2] > values[1] && values[1] > values[0]);
    }

    #[test]
    fn softmax_single_class_is_one() {
        let mut values = vec![-7.0f32, 0.0, 12.0];
        softmax_rows_in_place(&mut values, 1);
        assert_eq!(values, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn softmax_degenerate_rows_become_uniform() {
        let mut values = vec![f32::NAN, 1.0, f32::INFINITY, 0.0];
        softmax_rows_in_place(&mut values, 2);
        assert_eq!(values, vec![0.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn clip_bounds_and_nan() {
        assert_eq!(clip(-3.0, 9.0), 0.0);
        assert_eq!(clip(12.0, 9.0), 9.0);
        assert_eq!(clip(4.5, 9.0), 4.5);
        assert_eq!(clip(f32::NAN, 9.0), 0.0);
        assert_eq!(clip(f32::INFINITY, 9.0), 9.0);
    }
}
