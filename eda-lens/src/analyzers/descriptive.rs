//! Moment and order statistics over plain `f64` slices.
//!
//! These are the building blocks shared by the statistics engine, the box
//! plot and the histogram. Callers strip missing values before calling in.

use std::cmp::Ordering;

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Returns a sorted copy of `values` (NaN-tolerant total order).
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    out
}

/// Quantile of already sorted data using linear interpolation between the
/// closest ranks (`h = (n - 1) * p`).
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let frac = h - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Median of already sorted data.
pub fn median_sorted(sorted: &[f64]) -> Option<f64> {
    quantile_sorted(sorted, 0.5)
}

/// Sum of `(x - mean)^k` for k = 2, 3, 4.
fn central_sums(values: &[f64], mean: f64) -> (f64, f64, f64) {
    values.iter().fold((0.0, 0.0, 0.0), |(m2, m3, m4), &x| {
        let d = x - mean;
        let d2 = d * d;
        (m2 + d2, m3 + d2 * d, m4 + d2 * d2)
    })
}

/// Sample variance (divides by n - 1); needs at least two values.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values)?;
    let (m2, _, _) = central_sums(values, m);
    Some(m2 / (n - 1) as f64)
}

/// Sample standard deviation (n - 1).
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Adjusted Fisher-Pearson skewness `G1`; needs at least three values.
///
/// A constant sample has zero skewness.
pub fn skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let nf = n as f64;
    let m = mean(values)?;
    let (m2, m3, _) = central_sums(values, m);
    if m2 == 0.0 {
        return Some(0.0);
    }
    let g1 = (m3 / nf) / (m2 / nf).powf(1.5);
    Some(g1 * (nf * (nf - 1.0)).sqrt() / (nf - 2.0))
}

/// Bias-corrected excess kurtosis `G2`; needs at least four values.
///
/// A constant sample has zero kurtosis.
pub fn excess_kurtosis(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 4 {
        return None;
    }
    let nf = n as f64;
    let m = mean(values)?;
    let (m2, _, m4) = central_sums(values, m);
    if m2 == 0.0 {
        return Some(0.0);
    }
    let g2 = (m4 / nf) / (m2 / nf).powi(2) - 3.0;
    Some((nf - 1.0) / ((nf - 2.0) * (nf - 3.0)) * ((nf + 1.0) * g2 + 6.0))
}

/// Five-number summary plus IQR fences, shared by outlier detection and box plots.
#[derive(Debug, Clone, PartialEq)]
pub struct Quartiles {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl Quartiles {
    /// Computes quartiles of already sorted data.
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        Some(Self {
            min: *sorted.first()?,
            q1: quantile_sorted(sorted, 0.25)?,
            median: quantile_sorted(sorted, 0.5)?,
            q3: quantile_sorted(sorted, 0.75)?,
            max: *sorted.last()?,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// `(Q1 - k * IQR, Q3 + k * IQR)`.
    pub fn fences(&self, multiplier: f64) -> (f64, f64) {
        let iqr = self.iqr();
        (self.q1 - multiplier * iqr, self.q3 + multiplier * iqr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_quantiles_linear_interpolation() {
        let data = sorted(&[100.0, 1.0, 3.0, 2.0, 4.0]);
        assert_eq!(quantile_sorted(&data, 0.25), Some(2.0));
        assert_eq!(quantile_sorted(&data, 0.75), Some(4.0));
        assert_eq!(median_sorted(&data), Some(3.0));

        let even = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&even, 0.25), Some(1.75));
        assert_eq!(median_sorted(&even), Some(2.5));
        assert_eq!(quantile_sorted(&even, 1.5), None);
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn test_sample_variance_and_std() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(approx(sample_variance(&data).unwrap(), 32.0 / 7.0));
        assert!(approx(sample_std_dev(&data).unwrap(), (32.0f64 / 7.0).sqrt()));
        assert_eq!(sample_variance(&[1.0]), None);
    }

    #[test]
    fn test_skewness_matches_adjusted_estimator() {
        // G1 for [1, 2, 3, 4, 100]
        let data = [1.0, 2.0, 3.0, 4.0, 100.0];
        let skew = skewness(&data).unwrap();
        assert!((skew - 2.2324).abs() < 1e-3, "skew = {skew}");

        let symmetric = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(approx(skewness(&symmetric).unwrap(), 0.0));
        assert_eq!(skewness(&[1.0, 2.0]), None);
        assert_eq!(skewness(&[3.0, 3.0, 3.0]), Some(0.0));
    }

    #[test]
    fn test_excess_kurtosis() {
        let data = [1.0, 2.0, 3.0, 4.0, 100.0];
        let kurt = excess_kurtosis(&data).unwrap();
        assert!((kurt - 4.9869).abs() < 1e-3, "kurt = {kurt}");

        // uniform-ish sample is platykurtic
        let flat = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(approx(excess_kurtosis(&flat).unwrap(), -1.2));
        assert_eq!(excess_kurtosis(&[1.0, 2.0, 3.0]), None);
    }

    #[test]
    fn test_quartiles_and_fences() {
        let q = Quartiles::from_sorted(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(q.min, 1.0);
        assert_eq!(q.max, 100.0);
        assert_eq!(q.iqr(), 2.0);
        assert_eq!(q.fences(1.5), (-1.0, 7.0));
        assert!(Quartiles::from_sorted(&[]).is_none());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(-2.675_1), -2.68);
        assert_eq!(round2(22.0), 22.0);
    }
}
