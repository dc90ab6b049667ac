//! Elevation statistics over the sparse sample set.
//!
//! Produces the summary card values, the sorted sample array used as an
//! empirical inverse CDF, and a fixed-bucket histogram.
use serde::{Deserialize, Serialize};

/// Default histogram bucket count.
pub const DEFAULT_BIN_COUNT: usize = 64;

/// Summary statistics of one tile's elevation samples.
///
/// The five scalar fields are rounded to whole metres. `sorted_elevations`
/// keeps the raw samples in ascending order and `bins` sums to their count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationAnalysis {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub std: f32,
    pub range: f32,
    pub sorted_elevations: Vec<f32>,
    pub bins: Vec<u32>,
}

impl ElevationAnalysis {
    pub fn sample_count(&self) -> usize {
        self.sorted_elevations.len()
    }

    /// Empirical inverse CDF: the sample at percentile `t` ∈ [0, 1].
    ///
    /// `t` is clamped first; the index is `floor(t · (N − 1))`. Returns `None`
    /// only when there are no samples.
    pub fn quantile(&self, t: f64) -> Option<f32> {
        let n = self.sorted_elevations.len();
        if n == 0 {
            return None;
        }
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let idx = ((t * (n - 1) as f64).floor() as usize).min(n - 1);
        Some(self.sorted_elevations[idx])
    }

    /// Card rows as shown in the analysis panel: label and whole-metre value.
    pub fn summary_rows(&self) -> [(&'static str, f32); 5] {
        [
            ("Min Elevation", self.min),
            ("Max Elevation", self.max),
            ("Mean Elevation", self.mean),
            ("Std Deviation", self.std),
            ("Elevation Range", self.range),
        ]
    }
}

/// Round half up, matching how the panel has always displayed values.
#[inline]
fn round_half_up(v: f64) -> f32 {
    (v + 0.5).floor() as f32
}

/// Histogram bucket of `v` for a histogram starting at `min` with the given
/// bucket `width`. Zero width (a flat tile) and out-of-range values clamp into
/// `[0, bin_count)`.
#[inline]
pub fn bin_index(v: f64, min: f64, width: f64, bin_count: usize) -> usize {
    if width <= 0.0 || bin_count == 0 {
        return 0;
    }
    let idx = ((v - min) / width).floor();
    if idx.is_nan() || idx < 0.0 {
        0
    } else {
        (idx as usize).min(bin_count - 1)
    }
}

/// Compute statistics for `samples`.
///
/// Returns `None` for an empty sample set or `bin_count == 0`. Mean and
/// variance accumulate in f64; variance is the population variance.
pub fn analyze(samples: &[f32], bin_count: usize) -> Option<ElevationAnalysis> {
    if samples.is_empty() || bin_count == 0 {
        return None;
    }

    let n = samples.len() as f64;
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    let mut sum = 0.0f64;
    for &v in samples {
        let v = v as f64;
        lo = lo.min(v);
        hi = hi.max(v);
        sum += v;
    }
    let mean = sum / n;
    let variance = samples
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let std = variance.sqrt();
    let range = hi - lo;

    let mut sorted_elevations = samples.to_vec();
    sorted_elevations.sort_by(|a, b| a.total_cmp(b));

    let mut bins = vec![0u32; bin_count];
    let width = range / bin_count as f64;
    for &v in samples {
        bins[bin_index(v as f64, lo, width, bin_count)] += 1;
    }

    Some(ElevationAnalysis {
        min: round_half_up(lo),
        max: round_half_up(hi),
        mean: round_half_up(mean),
        std: round_half_up(std),
        range: round_half_up(range),
        sorted_elevations,
        bins,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_sample_example() {
        let a = analyze(&[0.0, 10.0, 20.0, 30.0], 2).unwrap();
        assert_eq!(a.min, 0.0);
        assert_eq!(a.max, 30.0);
        assert_eq!(a.mean, 15.0);
        // sqrt(125) ≈ 11.18
        assert_eq!(a.std, 11.0);
        assert_eq!(a.range, 30.0);
        assert_eq!(a.sorted_elevations, vec![0.0, 10.0, 20.0, 30.0]);
        assert_eq!(a.bins, vec![2, 2]);
    }

    #[test]
    fn empty_input_has_no_analysis() {
        assert!(analyze(&[], 64).is_none());
        assert!(analyze(&[1.0], 0).is_none());
    }

    #[test]
    fn flat_tile_puts_everything_in_bucket_zero() {
        let a = analyze(&[412.5; 100], 64).unwrap();
        assert_eq!(a.bins[0], 100);
        assert_eq!(a.bins.iter().sum::<u32>(), 100);
        assert_eq!(a.range, 0.0);
        assert_eq!(a.std, 0.0);
        assert_eq!(a.min, a.max);
    }

    #[test]
    fn histogram_and_sorted_invariants_hold() {
        let mut state = 7u64;
        let samples: Vec<f32> = (0..5000)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                ((state >> 33) as f32 / (1u64 << 31) as f32) * 4000.0 - 500.0
            })
            .collect();
        let a = analyze(&samples, 64).unwrap();

        assert_eq!(a.bins.len(), 64);
        assert_eq!(a.bins.iter().map(|&b| b as usize).sum::<usize>(), samples.len());
        assert!(a.sorted_elevations.windows(2).all(|w| w[0] <= w[1]));

        let mut expected = samples.clone();
        expected.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(a.sorted_elevations, expected, "sorted array must be a permutation of the input");

        let lo = *expected.first().unwrap();
        let hi = *expected.last().unwrap();
        assert_eq!(a.min, (lo as f64 + 0.5).floor() as f32);
        assert_eq!(a.max, (hi as f64 + 0.5).floor() as f32);
    }

    #[test]
    fn maximum_lands_in_last_bucket() {
        let a = analyze(&[0.0, 1.0, 2.0, 3.0, 4.0], 4).unwrap();
        assert_eq!(a.bins, vec![1, 1, 1, 2]);
    }

    #[test]
    fn rounding_is_half_up() {
        let a = analyze(&[-2.5, -2.5], 4).unwrap();
        assert_eq!(a.min, -2.0);
        let b = analyze(&[2.5], 4).unwrap();
        assert_eq!(b.max, 3.0);
    }

    #[test]
    fn quantile_indexes_floor_of_t_times_n_minus_one() {
        let a = analyze(&[5.0, 1.0, 3.0, 2.0, 4.0], 8).unwrap();
        assert_eq!(a.quantile(0.0), Some(1.0));
        assert_eq!(a.quantile(1.0), Some(5.0));
        assert_eq!(a.quantile(0.49), Some(2.0));
        assert_eq!(a.quantile(0.5), Some(3.0));
        assert_eq!(a.quantile(-3.0), Some(1.0));
        assert_eq!(a.quantile(7.0), Some(5.0));
        assert_eq!(a.quantile(f64::NAN), Some(1.0));

        let single = analyze(&[42.0], 8).unwrap();
        assert_eq!(single.quantile(0.7), Some(42.0));
    }

    #[test]
    fn bin_index_clamps() {
        assert_eq!(bin_index(5.0, 0.0, 0.0, 10), 0);
        assert_eq!(bin_index(-1.0, 0.0, 1.0, 10), 0);
        assert_eq!(bin_index(100.0, 0.0, 1.0, 10), 9);
        assert_eq!(bin_index(3.5, 0.0, 1.0, 10), 3);
    }
}
