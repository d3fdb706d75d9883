//! Pairwise Pearson correlation.
//!
//! Rows where either value is missing are skipped for that pair only
//! (pairwise-complete observations). A pair with fewer than two complete rows
//! or with a constant side has an undefined coefficient, reported as NaN.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Accumulated centered sums for one column pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationState {
    /// Number of complete pairs
    pub n: u64,
    pub mean_x: f64,
    pub mean_y: f64,
    /// Sum of (x - mean_x)^2
    pub ss_x: f64,
    /// Sum of (y - mean_y)^2
    pub ss_y: f64,
    /// Sum of (x - mean_x)(y - mean_y)
    pub co_moment: f64,
}

impl CorrelationState {
    /// Builds the state from aligned columns, skipping incomplete rows.
    pub fn from_columns(x: &[Option<f64>], y: &[Option<f64>]) -> Self {
        let mut state = Self::default();
        for (a, b) in x.iter().zip(y) {
            if let (Some(a), Some(b)) = (a, b) {
                state.update(*a, *b);
            }
        }
        state
    }

    /// Adds one complete pair (Welford update).
    pub fn update(&mut self, x: f64, y: f64) {
        self.n += 1;
        let n = self.n as f64;
        let dx = x - self.mean_x;
        let dy = y - self.mean_y;
        self.mean_x += dx / n;
        self.mean_y += dy / n;
        self.ss_x += dx * (x - self.mean_x);
        self.ss_y += dy * (y - self.mean_y);
        self.co_moment += dx * (y - self.mean_y);
    }

    /// Pearson coefficient, NaN when undefined.
    pub fn pearson(&self) -> f64 {
        if self.n < 2 || self.ss_x <= 0.0 || self.ss_y <= 0.0 {
            return f64::NAN;
        }
        let r = self.co_moment / (self.ss_x * self.ss_y).sqrt();
        r.clamp(-1.0, 1.0)
    }
}

/// Symmetric matrix of pairwise coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major values; `values[i][j] == values[j][i]`
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == row)?;
        let j = self.columns.iter().position(|c| c == column)?;
        Some(self.values[i][j])
    }

    pub fn size(&self) -> usize {
        self.columns.len()
    }
}

/// Computes the correlation matrix of `columns` (name, aligned values).
#[instrument(skip(columns), fields(columns = columns.len()))]
pub fn correlation_matrix(columns: &[(String, Vec<Option<f64>>)]) -> CorrelationMatrix {
    let k = columns.len();
    let mut values = vec![vec![f64::NAN; k]; k];

    for i in 0..k {
        for j in i..k {
            let state = CorrelationState::from_columns(&columns[i].1, &columns[j].1);
            let r = if i == j && !state.pearson().is_nan() {
                1.0
            } else {
                state.pearson()
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    debug!(size = k, "Computed correlation matrix");
    CorrelationMatrix {
        columns: columns.iter().map(|(name, _)| name.clone()).collect(),
        values,
    }
}
