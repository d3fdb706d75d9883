//! Descriptive statistics, frequency tables and IQR outlier detection.
//!
//! `summarize` branches on the column's type class:
//!
//! | Class       | Result                                             |
//! |-------------|----------------------------------------------------|
//! | Numeric     | [`NumericSummary`] (mean, median, std, var, skew, kurt) |
//! | Categorical | [`FrequencyTable`] of the raw values               |
//! | Datetime    | [`FrequencyTable`] of ISO-formatted timestamps     |

use std::collections::HashMap;

use chrono::{DateTime, Timelike};
use tracing::{debug, info, instrument};

use crate::analyzers::descriptive::{
    excess_kurtosis, mean, median_sorted, sample_std_dev, sample_variance, skewness, sorted,
    Quartiles,
};
use crate::analyzers::types::{
    ColumnType, FrequencyEntry, FrequencyTable, NumericSummary, OutlierReport, StatSummary,
};
use crate::core::Dataset;
use crate::error::{EdaError, Result};

/// Default IQR fence multiplier.
pub const DEFAULT_OUTLIER_MULTIPLIER: f64 = 1.5;

/// Computes summaries and outlier reports over a loaded [`Dataset`].
#[derive(Debug, Clone)]
pub struct StatisticsEngine {
    outlier_multiplier: f64,
}

impl Default for StatisticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StatisticsEngine {
    pub fn new() -> Self {
        Self {
            outlier_multiplier: DEFAULT_OUTLIER_MULTIPLIER,
        }
    }

    /// Uses `multiplier` as the default fence for [`Self::detect_outliers`].
    pub fn with_outlier_multiplier(mut self, multiplier: f64) -> Self {
        self.outlier_multiplier = multiplier;
        self
    }

    pub fn outlier_multiplier(&self) -> f64 {
        self.outlier_multiplier
    }

    /// Summarizes one column according to its type class.
    #[instrument(skip(self, dataset))]
    pub fn summarize(&self, dataset: &Dataset, column: &str) -> Result<StatSummary> {
        match dataset.classification().require(column)? {
            ColumnType::Numeric => {
                let values = dataset.table().present_numeric_values(column)?;
                let summary = summarize_values(column, &values)?;
                info!(
                    column = %column,
                    count = summary.count,
                    mean = summary.mean,
                    "Computed numeric summary"
                );
                Ok(StatSummary::Numeric(summary))
            }
            ColumnType::Categorical | ColumnType::Datetime => {
                let table = self.frequency_table(dataset, column)?;
                info!(
                    column = %column,
                    distinct = table.len(),
                    total = table.total(),
                    "Computed frequency table"
                );
                Ok(StatSummary::Categorical(table))
            }
        }
    }

    /// Value counts of a categorical or datetime column.
    pub fn frequency_table(&self, dataset: &Dataset, column: &str) -> Result<FrequencyTable> {
        let table = dataset.table();
        match dataset.classification().require(column)? {
            ColumnType::Categorical => Ok(frequency_counts(column, table.text_values(column)?)),
            ColumnType::Datetime => {
                let formatted: Vec<Option<String>> = table
                    .timestamp_values(column)?
                    .into_iter()
                    .map(|ts| ts.and_then(format_timestamp))
                    .collect();
                Ok(frequency_counts(
                    column,
                    formatted.iter().map(|v| v.as_deref()),
                ))
            }
            found => Err(EdaError::type_mismatch(column, ColumnType::Categorical, found)),
        }
    }

    /// IQR outlier report using the engine's default multiplier.
    pub fn detect_outliers(&self, dataset: &Dataset, column: &str) -> Result<OutlierReport> {
        self.detect_outliers_with_multiplier(dataset, column, self.outlier_multiplier)
    }

    /// IQR outlier report with fences at `Q1 - k * IQR` and `Q3 + k * IQR`.
    #[instrument(skip(self, dataset))]
    pub fn detect_outliers_with_multiplier(
        &self,
        dataset: &Dataset,
        column: &str,
        multiplier: f64,
    ) -> Result<OutlierReport> {
        dataset.require_type(column, ColumnType::Numeric)?;
        let table = dataset.table();
        let values = table.present_numeric_values(column)?;
        let report = outlier_report(column, &values, table.num_rows(), multiplier)?;
        info!(
            column = %column,
            outliers = report.outlier_count,
            fraction = report.outlier_fraction,
            "Completed outlier detection"
        );
        Ok(report)
    }
}

/// Numeric summary of the non-missing values of a column.
pub fn summarize_values(column: &str, values: &[f64]) -> Result<NumericSummary> {
    let mean = mean(values).ok_or_else(|| EdaError::EmptyColumn {
        column: column.to_string(),
    })?;
    let ordered = sorted(values);
    let median = median_sorted(&ordered).ok_or_else(|| EdaError::EmptyColumn {
        column: column.to_string(),
    })?;

    Ok(NumericSummary {
        count: values.len(),
        mean,
        median,
        std_dev: sample_std_dev(values),
        variance: sample_variance(values),
        skewness: skewness(values),
        kurtosis: excess_kurtosis(values),
    })
}

/// Counts values, ordered by descending count with ties in first-occurrence order.
pub fn frequency_counts<'a, I>(column: &str, values: I) -> FrequencyTable
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut entries: Vec<FrequencyEntry> = Vec::new();

    for value in values.into_iter().flatten() {
        match index.get(value) {
            Some(&i) => entries[i].count += 1,
            None => {
                index.insert(value, entries.len());
                entries.push(FrequencyEntry {
                    value: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    // stable sort keeps first-occurrence order among equal counts
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    FrequencyTable {
        column: column.to_string(),
        entries,
    }
}

/// IQR outlier report over the non-missing `values` of a column with `total_rows` rows.
pub fn outlier_report(
    column: &str,
    values: &[f64],
    total_rows: usize,
    multiplier: f64,
) -> Result<OutlierReport> {
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(EdaError::InvalidRequest(format!(
            "outlier multiplier must be a finite non-negative number, got {multiplier}"
        )));
    }
    if total_rows == 0 || values.is_empty() {
        return Err(EdaError::EmptyColumn {
            column: column.to_string(),
        });
    }

    let quartiles = Quartiles::from_sorted(&sorted(values)).ok_or_else(|| EdaError::EmptyColumn {
        column: column.to_string(),
    })?;
    let (lower_bound, upper_bound) = quartiles.fences(multiplier);
    let outlier_count = values
        .iter()
        .filter(|&&v| v < lower_bound || v > upper_bound)
        .count();

    debug!(
        column = %column,
        q1 = quartiles.q1,
        q3 = quartiles.q3,
        lower_bound,
        upper_bound,
        "Computed IQR fences"
    );

    Ok(OutlierReport {
        column: column.to_string(),
        q1: quartiles.q1,
        q3: quartiles.q3,
        iqr: quartiles.iqr(),
        multiplier,
        lower_bound,
        upper_bound,
        outlier_count,
        total_rows,
        outlier_fraction: outlier_count as f64 / total_rows as f64,
    })
}

/// ISO text for a millisecond timestamp; midnight values print as plain dates.
pub fn format_timestamp(millis: i64) -> Option<String> {
    let ts = DateTime::from_timestamp_millis(millis)?.naive_utc();
    if ts.num_seconds_from_midnight() == 0 && ts.nanosecond() == 0 {
        Some(ts.format("%Y-%m-%d").to_string())
    } else {
        Some(ts.format("%Y-%m-%dT%H:%M:%S").to_string())
    }
}
