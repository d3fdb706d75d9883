//! Histogram binning and Gaussian kernel density estimation.
//!
//! The bin count follows the "auto" rule: the smaller of the Freedman-Diaconis
//! and Sturges bin widths, capped at a configured maximum number of bins. The
//! density overlay is a Gaussian KDE with Scott's bandwidth.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzers::descriptive::{quantile_sorted, sample_std_dev, sorted};

/// One half-open bin `[lower, upper)`; the last bin also includes its upper edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

/// Equal-width bins covering the data range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
    pub bin_width: f64,
}

impl Histogram {
    /// Bins finite `values`; `None` when there is nothing to bin.
    pub fn from_values(values: &[f64], max_bins: usize) -> Option<Self> {
        let data = sorted(values);
        let (&min, &max) = (data.first()?, data.last()?);
        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        let (lo, hi, bin_count) = if min == max {
            (min - 0.5, max + 0.5, 1)
        } else {
            (min, max, auto_bin_count(&data, max_bins))
        };
        let bin_width = (hi - lo) / bin_count as f64;

        let mut bins: Vec<HistogramBin> = (0..bin_count)
            .map(|i| HistogramBin {
                lower: lo + i as f64 * bin_width,
                upper: if i + 1 == bin_count {
                    hi
                } else {
                    lo + (i + 1) as f64 * bin_width
                },
                count: 0,
            })
            .collect();

        for &v in &data {
            let idx = (((v - lo) / bin_width).floor() as usize).min(bin_count - 1);
            bins[idx].count += 1;
        }

        debug!(bins = bin_count, bin_width, "Computed histogram");
        Some(Self { bins, bin_width })
    }

    pub fn total(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum()
    }
}

/// Number of bins for sorted, non-constant data.
pub fn auto_bin_count(sorted: &[f64], max_bins: usize) -> usize {
    let max_bins = max_bins.max(1);
    let n = sorted.len();
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return 1;
    };
    let range = max - min;
    if n < 2 || range <= 0.0 {
        return 1;
    }

    let nf = n as f64;
    let sturges = range / (nf.log2() + 1.0);
    let iqr = match (quantile_sorted(sorted, 0.75), quantile_sorted(sorted, 0.25)) {
        (Some(q3), Some(q1)) => q3 - q1,
        _ => 0.0,
    };
    let fd = 2.0 * iqr * nf.powf(-1.0 / 3.0);
    let width = if fd > 0.0 { fd.min(sturges) } else { sturges };

    ((range / width).ceil() as usize).clamp(1, max_bins)
}

/// Points of a smoothed density curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityCurve {
    pub bandwidth: f64,
    /// `(x, density)` pairs in ascending x; densities integrate to 1
    pub points: Vec<(f64, f64)>,
}

impl DensityCurve {
    /// Rescales densities to expected counts per bin of `bin_width`.
    pub fn scaled_to_counts(&self, n: usize, bin_width: f64) -> Vec<(f64, f64)> {
        let scale = n as f64 * bin_width;
        self.points.iter().map(|&(x, y)| (x, y * scale)).collect()
    }
}

/// Gaussian KDE evaluated on `grid_points` evenly spaced points spanning
/// `min - cut * bw` to `max + cut * bw`.
///
/// Returns `None` for fewer than two values or zero spread, where the
/// bandwidth is undefined.
pub fn gaussian_kde(values: &[f64], grid_points: usize, cut: f64) -> Option<DensityCurve> {
    let n = values.len();
    let std = sample_std_dev(values)?;
    if !std.is_finite() || std <= 0.0 || grid_points < 2 {
        return None;
    }
    let bandwidth = std * (n as f64).powf(-0.2);

    let data = sorted(values);
    let lo = data.first()? - cut * bandwidth;
    let hi = data.last()? + cut * bandwidth;
    let step = (hi - lo) / (grid_points - 1) as f64;
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    let points = (0..grid_points)
        .map(|i| {
            let x = lo + i as f64 * step;
            let density: f64 = data
                .iter()
                .map(|&xi| {
                    let z = (x - xi) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm;
            (x, density)
        })
        .collect();

    Some(DensityCurve { bandwidth, points })
}
