//! Value types produced by the analyzers.

use std::fmt;

use arrow::datatypes::{DataType, TimeUnit};
use serde::{Deserialize, Serialize};

use crate::analyzers::descriptive::round2;
use crate::error::{EdaError, Result};

/// The type class assigned to every column of a loaded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Every non-missing value parses as a real number.
    Numeric,
    /// Anything that is neither numeric nor datetime.
    Categorical,
    /// Every non-missing value parses as a date or timestamp.
    Datetime,
}

impl ColumnType {
    /// All column types, in declaration order.
    pub const ALL: [ColumnType; 3] = [
        ColumnType::Numeric,
        ColumnType::Categorical,
        ColumnType::Datetime,
    ];

    /// Lower-case name used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Categorical => "categorical",
            ColumnType::Datetime => "datetime",
        }
    }

    /// Arrow storage type used for columns of this class.
    pub fn arrow_type(&self) -> DataType {
        match self {
            ColumnType::Numeric => DataType::Float64,
            ColumnType::Categorical => DataType::Utf8,
            ColumnType::Datetime => DataType::Timestamp(TimeUnit::Millisecond, None),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One classified column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedColumn {
    pub name: String,
    pub column_type: ColumnType,
    /// Number of missing cells (empty or a configured missing marker)
    pub missing_count: usize,
}

/// Column name → type class, in table column order.
///
/// Computed once when a table is loaded and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnClassification {
    columns: Vec<ClassifiedColumn>,
}

impl ColumnClassification {
    pub fn new(columns: Vec<ClassifiedColumn>) -> Self {
        Self { columns }
    }

    /// Returns the type of `column`, if the column exists.
    pub fn get(&self, column: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.column_type)
    }

    /// Returns the type of `column` or a `ColumnNotFound` error.
    pub fn require(&self, column: &str) -> Result<ColumnType> {
        self.get(column)
            .ok_or_else(|| EdaError::column_not_found(column))
    }

    /// Names of all columns with the given type, in table order.
    pub fn columns_of(&self, column_type: ColumnType) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.column_type == column_type)
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassifiedColumn> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Descriptive statistics of a numeric column.
///
/// Values are kept at full precision; [`NumericSummary::rounded`] gives the
/// two-decimal display form. Moments that are undefined for the sample size
/// (variance below 2 values, skewness below 3, kurtosis below 4) are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    /// Number of non-missing values
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1)
    pub std_dev: Option<f64>,
    /// Sample variance (n - 1)
    pub variance: Option<f64>,
    /// Adjusted Fisher-Pearson skewness
    pub skewness: Option<f64>,
    /// Bias-corrected excess kurtosis
    pub kurtosis: Option<f64>,
}

impl NumericSummary {
    /// Returns a copy with every statistic rounded to two decimals.
    pub fn rounded(&self) -> Self {
        Self {
            count: self.count,
            mean: round2(self.mean),
            median: round2(self.median),
            std_dev: self.std_dev.map(round2),
            variance: self.variance.map(round2),
            skewness: self.skewness.map(round2),
            kurtosis: self.kurtosis.map(round2),
        }
    }

    /// Label/value pairs in display order.
    pub fn metrics(&self) -> [(&'static str, Option<f64>); 6] {
        [
            ("Mean", Some(self.mean)),
            ("Median", Some(self.median)),
            ("Standard Deviation", self.std_dev),
            ("Variance", self.variance),
            ("Skewness", self.skewness),
            ("Kurtosis", self.kurtosis),
        ]
    }
}

/// One row of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: u64,
}

/// Value counts ordered by descending count, ties in first-occurrence order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTable {
    pub column: String,
    pub entries: Vec<FrequencyEntry>,
}

impl FrequencyTable {
    /// Sum of all counts, i.e. the number of non-missing cells.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Count for `value`, if present.
    pub fn get(&self, value: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.value == value)
            .map(|e| e.count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrequencyEntry> {
        self.entries.iter()
    }
}

/// Result of `summarize`, branching on the column's type class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "summary")]
pub enum StatSummary {
    Numeric(NumericSummary),
    Categorical(FrequencyTable),
}

impl StatSummary {
    pub fn as_numeric(&self) -> Option<&NumericSummary> {
        match self {
            StatSummary::Numeric(s) => Some(s),
            StatSummary::Categorical(_) => None,
        }
    }

    pub fn as_frequencies(&self) -> Option<&FrequencyTable> {
        match self {
            StatSummary::Categorical(t) => Some(t),
            StatSummary::Numeric(_) => None,
        }
    }
}

/// Interquartile-range outlier fence for a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub column: String,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    /// Fence multiplier applied to the IQR
    pub multiplier: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub outlier_count: usize,
    /// Rows in the table, including rows where this column is missing
    pub total_rows: usize,
    pub outlier_fraction: f64,
}

impl fmt::Display for OutlierReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Detected {} potential outliers ({:.2}% of data)",
            self.outlier_count,
            self.outlier_fraction * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification() -> ColumnClassification {
        ColumnClassification::new(vec![
            ClassifiedColumn {
                name: "week".to_string(),
                column_type: ColumnType::Datetime,
                missing_count: 0,
            },
            ClassifiedColumn {
                name: "state".to_string(),
                column_type: ColumnType::Categorical,
                missing_count: 1,
            },
            ClassifiedColumn {
                name: "cases".to_string(),
                column_type: ColumnType::Numeric,
                missing_count: 0,
            },
            ClassifiedColumn {
                name: "incidence".to_string(),
                column_type: ColumnType::Numeric,
                missing_count: 2,
            },
        ])
    }

    #[test]
    fn test_classification_lookup() {
        let c = classification();
        assert_eq!(c.get("cases"), Some(ColumnType::Numeric));
        assert_eq!(c.get("missing"), None);
        assert!(matches!(
            c.require("missing"),
            Err(EdaError::ColumnNotFound { .. })
        ));
        assert_eq!(c.columns_of(ColumnType::Numeric), vec!["cases", "incidence"]);
        assert_eq!(c.names().collect::<Vec<_>>().len(), 4);
    }

    #[test]
    fn test_numeric_summary_rounding() {
        let summary = NumericSummary {
            count: 3,
            mean: 1.23456,
            median: 2.0,
            std_dev: Some(0.005),
            variance: None,
            skewness: Some(-1.238),
            kurtosis: None,
        };
        let rounded = summary.rounded();
        assert_eq!(rounded.mean, 1.23);
        assert_eq!(rounded.skewness, Some(-1.24));
        assert_eq!(rounded.variance, None);
        assert_eq!(rounded.count, 3);
    }

    #[test]
    fn test_frequency_table_helpers() {
        let table = FrequencyTable {
            column: "region".to_string(),
            entries: vec![
                FrequencyEntry {
                    value: "A".to_string(),
                    count: 3,
                },
                FrequencyEntry {
                    value: "B".to_string(),
                    count: 1,
                },
            ],
        };
        assert_eq!(table.total(), 4);
        assert_eq!(table.get("A"), Some(3));
        assert_eq!(table.get("Z"), None);
    }

    #[test]
    fn test_outlier_report_display() {
        let report = OutlierReport {
            column: "cases".to_string(),
            q1: 2.0,
            q3: 4.0,
            iqr: 2.0,
            multiplier: 1.5,
            lower_bound: -1.0,
            upper_bound: 7.0,
            outlier_count: 1,
            total_rows: 5,
            outlier_fraction: 0.2,
        };
        assert_eq!(
            report.to_string(),
            "Detected 1 potential outliers (20.00% of data)"
        );
    }

    #[test]
    fn test_stat_summary_serializes_with_kind_tag() {
        let summary = StatSummary::Categorical(FrequencyTable {
            column: "region".to_string(),
            entries: vec![],
        });
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["kind"], "Categorical");
    }
}
