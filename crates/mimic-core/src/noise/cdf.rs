//! Standard normal CDF via the Abramowitz–Stegun 7.1.26 erf approximation.
//!
//! Absolute error of `erf` is below 1.5e-7, well inside what the percentile
//! remap needs.

const A1: f64 = 0.254_829_592;
const A2: f64 = -0.284_496_736;
const A3: f64 = 1.421_413_741;
const A4: f64 = -1.453_152_027;
const A5: f64 = 1.061_405_429;
const P: f64 = 0.327_591_1;

/// Rational approximation of the error function.
pub fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let ax = x.abs();
    let t = 1.0 / (1.0 + P * ax);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-ax * ax).exp())
}

/// Φ(x) for the standard normal distribution, clamped into [0, 1].
pub fn normal_cdf(x: f64) -> f64 {
    (0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn known_values() {
        assert_abs_diff_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-7);
        assert_abs_diff_eq!(normal_cdf(1.0), 0.841_344_746, epsilon = 1e-6);
        assert_abs_diff_eq!(normal_cdf(-1.0), 0.158_655_254, epsilon = 1e-6);
        assert_abs_diff_eq!(normal_cdf(1.96), 0.975_002_105, epsilon = 1e-6);
        assert_abs_diff_eq!(erf(0.5), 0.520_499_878, epsilon = 2e-7);
    }

    #[test]
    fn monotone_and_bounded() {
        let mut prev = normal_cdf(-10.0);
        assert!(prev >= 0.0);
        for i in -100..=100 {
            let cur = normal_cdf(i as f64 * 0.1);
            assert!(cur >= prev - 1e-12);
            assert!((0.0..=1.0).contains(&cur));
            prev = cur;
        }
        assert_eq!(normal_cdf(f64::INFINITY), 1.0);
        assert_eq!(normal_cdf(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn symmetric_about_zero() {
        for &x in &[0.1, 0.7, 1.3, 2.9] {
            assert_abs_diff_eq!(normal_cdf(x) + normal_cdf(-x), 1.0, epsilon = 1e-7);
        }
    }
}
