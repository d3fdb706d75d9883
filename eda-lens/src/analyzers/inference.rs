//! Column type classification for freshly parsed CSV tables.
//!
//! Every column is assigned exactly one [`ColumnType`]:
//! - `Datetime` when all non-missing values parse as dates or timestamps
//! - `Numeric` when all non-missing values parse as real numbers
//! - `Categorical` otherwise
//!
//! A column with no non-missing values at all is `Numeric` (it behaves like an
//! all-NaN float column and fails later with `EmptyColumn` when summarized).
//!
//! # Example
//!
//! ```rust
//! use eda_lens::analyzers::inference::TypeClassifier;
//! use eda_lens::analyzers::ColumnType;
//!
//! let classifier = TypeClassifier::builder().day_first(true).build();
//! let stats = classifier.analyze_values([Some("25/12/2023"), Some("01/01/2024"), None]);
//! assert_eq!(classifier.determine_type(&stats), ColumnType::Datetime);
//! ```

use arrow::array::{Array, StringArray};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument};

use crate::analyzers::types::{ClassifiedColumn, ColumnClassification, ColumnType};
use crate::error::{EdaError, Result};

/// Cell texts treated as missing, matching the pandas `read_csv` defaults.
pub const DEFAULT_MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Configuration for the type classifier
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Cell texts (after trimming) that count as missing values
    pub missing_markers: Vec<String>,
    /// Read `dd/mm/yyyy` instead of `mm/dd/yyyy` for slash-separated dates
    pub day_first: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            missing_markers: DEFAULT_MISSING_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            day_first: false,
        }
    }
}

/// Match counts gathered while scanning a column.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TypeStats {
    pub total_values: usize,
    pub missing_count: usize,
    pub numeric_matches: usize,
    pub datetime_matches: usize,
}

impl TypeStats {
    pub fn non_missing(&self) -> usize {
        self.total_values - self.missing_count
    }
}

/// Builder for TypeClassifier
pub struct TypeClassifierBuilder {
    config: ClassifierConfig,
}

impl TypeClassifierBuilder {
    /// Replace the missing-value markers
    pub fn missing_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.missing_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Add one more missing-value marker
    pub fn add_missing_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.missing_markers.push(marker.into());
        self
    }

    /// Read slash-separated dates day first
    pub fn day_first(mut self, enable: bool) -> Self {
        self.config.day_first = enable;
        self
    }

    /// Use an existing configuration
    pub fn config(mut self, config: ClassifierConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> TypeClassifier {
        TypeClassifier {
            config: self.config,
        }
    }
}

static PATTERNS: Lazy<TypePatterns> = Lazy::new(TypePatterns::new);

/// Shape checks run before handing text to the real parsers.
struct TypePatterns {
    float: Regex,
    non_finite: Regex,
    date_iso: Regex,
    date_iso_slash: Regex,
    date_slash: Regex,
    date_dotted: Regex,
    datetime_iso: Regex,
}

impl TypePatterns {
    // Hard-coded patterns, checked by the unit tests below.
    #[allow(clippy::unwrap_used)]
    fn new() -> Self {
        Self {
            float: Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").unwrap(),
            non_finite: Regex::new(r"(?i)^[+-]?(inf|infinity)$").unwrap(),
            date_iso: Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").unwrap(),
            date_iso_slash: Regex::new(r"^\d{4}/\d{1,2}/\d{1,2}$").unwrap(),
            date_slash: Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").unwrap(),
            date_dotted: Regex::new(r"^\d{1,2}\.\d{1,2}\.\d{4}$").unwrap(),
            datetime_iso: Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}").unwrap(),
        }
    }
}

/// Assigns a [`ColumnType`] to every column of a raw text table.
#[derive(Debug, Clone)]
pub struct TypeClassifier {
    config: ClassifierConfig,
}

impl TypeClassifier {
    pub fn builder() -> TypeClassifierBuilder {
        TypeClassifierBuilder {
            config: ClassifierConfig::default(),
        }
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn with_config(config: ClassifierConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// True when the cell text counts as a missing value.
    pub fn is_missing(&self, raw: &str) -> bool {
        let trimmed = raw.trim();
        trimmed.is_empty() || self.config.missing_markers.iter().any(|m| m == trimmed)
    }

    /// Parses a real number, including `inf`/`-inf`.
    pub fn parse_number(&self, raw: &str) -> Option<f64> {
        let trimmed = raw.trim();
        if PATTERNS.float.is_match(trimmed) || PATTERNS.non_finite.is_match(trimmed) {
            trimmed.parse::<f64>().ok()
        } else {
            None
        }
    }

    /// Parses a date or timestamp. Offsets are normalized to UTC.
    ///
    /// Values outside the nanosecond timestamp range (1677-09-21 to
    /// 2262-04-11) are rejected, so a column holding them stays categorical.
    pub fn parse_datetime(&self, raw: &str) -> Option<NaiveDateTime> {
        self.parse_datetime_shape(raw.trim())
            .filter(within_nanosecond_range)
    }

    fn parse_datetime_shape(&self, s: &str) -> Option<NaiveDateTime> {
        let p = &*PATTERNS;

        if p.date_iso.is_match(s) {
            return date_at_midnight(s, "%Y-%m-%d");
        }
        if p.date_iso_slash.is_match(s) {
            return date_at_midnight(s, "%Y/%m/%d");
        }
        if p.date_slash.is_match(s) {
            let format = if self.config.day_first {
                "%d/%m/%Y"
            } else {
                "%m/%d/%Y"
            };
            return date_at_midnight(s, format);
        }
        if p.date_dotted.is_match(s) {
            return date_at_midnight(s, "%d.%m.%Y");
        }
        if p.datetime_iso.is_match(s) {
            if let Ok(with_offset) = DateTime::parse_from_rfc3339(s) {
                return Some(with_offset.naive_utc());
            }
            return [
                "%Y-%m-%dT%H:%M:%S%.f",
                "%Y-%m-%d %H:%M:%S%.f",
                "%Y-%m-%dT%H:%M",
                "%Y-%m-%d %H:%M",
            ]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok());
        }
        None
    }

    /// Counts missing, numeric and datetime cells.
    pub fn analyze_values<'a, I>(&self, values: I) -> TypeStats
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut stats = TypeStats::default();
        for value in values {
            stats.total_values += 1;
            match value {
                None => stats.missing_count += 1,
                Some(raw) if self.is_missing(raw) => stats.missing_count += 1,
                Some(raw) => {
                    if self.parse_datetime(raw).is_some() {
                        stats.datetime_matches += 1;
                    }
                    if self.parse_number(raw).is_some() {
                        stats.numeric_matches += 1;
                    }
                }
            }
        }
        stats
    }

    /// Applies the all-values rule. Datetime wins over numeric; the two can
    /// never both match a full column because no accepted date shape is a number.
    pub fn determine_type(&self, stats: &TypeStats) -> ColumnType {
        let non_missing = stats.non_missing();
        if non_missing == 0 {
            ColumnType::Numeric
        } else if stats.datetime_matches == non_missing {
            ColumnType::Datetime
        } else if stats.numeric_matches == non_missing {
            ColumnType::Numeric
        } else {
            ColumnType::Categorical
        }
    }

    /// Classifies every column of a raw, all-text batch.
    #[instrument(skip(self, raw), fields(columns = raw.num_columns(), rows = raw.num_rows()))]
    pub fn classify(&self, raw: &RecordBatch) -> Result<ColumnClassification> {
        let schema = raw.schema();
        let mut columns = Vec::with_capacity(raw.num_columns());

        for (field, array) in schema.fields().iter().zip(raw.columns()) {
            let strings = array
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| {
                    EdaError::Internal(format!(
                        "column '{}' was not read as text ({})",
                        field.name(),
                        array.data_type()
                    ))
                })?;

            let stats = self.analyze_values(strings.iter());
            let column_type = self.determine_type(&stats);
            debug!(
                column = %field.name(),
                column_type = %column_type,
                missing = stats.missing_count,
                numeric = stats.numeric_matches,
                datetime = stats.datetime_matches,
                "Classified column"
            );

            columns.push(ClassifiedColumn {
                name: field.name().clone(),
                column_type,
                missing_count: stats.missing_count,
            });
        }

        let classification = ColumnClassification::new(columns);
        info!(
            numeric = classification.columns_of(ColumnType::Numeric).len(),
            categorical = classification.columns_of(ColumnType::Categorical).len(),
            datetime = classification.columns_of(ColumnType::Datetime).len(),
            "Completed column classification"
        );
        Ok(classification)
    }
}

impl Default for TypeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `value` fits an `i64` count of nanoseconds since the epoch.
pub(crate) fn within_nanosecond_range(value: &NaiveDateTime) -> bool {
    value.and_utc().timestamp_nanos_opt().is_some()
}

fn date_at_midnight(s: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(s, format)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::{DataType, Field, Schema};
    use chrono::{NaiveDate, Timelike};
    use std::sync::Arc;

    #[test]
    fn test_classifier_builder() {
        let classifier = TypeClassifier::builder()
            .missing_markers(["?", "-"])
            .add_missing_marker("unknown")
            .day_first(true)
            .build();

        assert_eq!(classifier.config().missing_markers, vec!["?", "-", "unknown"]);
        assert!(classifier.config().day_first);
        assert!(classifier.is_missing(" ? "));
        assert!(!classifier.is_missing("NA"));
    }

    #[test]
    fn test_default_missing_markers() {
        let classifier = TypeClassifier::new();
        for marker in ["", "   ", "NA", "N/A", "NaN", "null", "None", "#N/A"] {
            assert!(classifier.is_missing(marker), "{marker:?} should be missing");
        }
        assert!(!classifier.is_missing("0"));
        assert!(!classifier.is_missing("none of the above"));
    }

    #[test]
    fn test_parse_number() {
        let classifier = TypeClassifier::new();
        assert_eq!(classifier.parse_number("42"), Some(42.0));
        assert_eq!(classifier.parse_number(" -1.5e3 "), Some(-1500.0));
        assert_eq!(classifier.parse_number(".5"), Some(0.5));
        assert_eq!(classifier.parse_number("+7."), Some(7.0));
        assert_eq!(classifier.parse_number("inf"), Some(f64::INFINITY));
        assert_eq!(classifier.parse_number("1,000"), None);
        assert_eq!(classifier.parse_number("12abc"), None);
        assert_eq!(classifier.parse_number("2023-01-01"), None);
    }

    #[test]
    fn test_parse_dates() {
        let classifier = TypeClassifier::new();
        let christmas = NaiveDate::from_ymd_opt(2023, 12, 25)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        assert_eq!(classifier.parse_datetime("2023-12-25"), Some(christmas));
        assert_eq!(classifier.parse_datetime("2023/12/25"), Some(christmas));
        assert_eq!(classifier.parse_datetime("12/25/2023"), Some(christmas));
        assert_eq!(classifier.parse_datetime("25.12.2023"), Some(christmas));
        assert_eq!(classifier.parse_datetime("2023-13-01"), None);
        assert_eq!(classifier.parse_datetime("1928"), None);

        let day_first = TypeClassifier::builder().day_first(true).build();
        assert_eq!(day_first.parse_datetime("25/12/2023"), Some(christmas));
        assert_eq!(classifier.parse_datetime("25/12/2023"), None);
    }

    #[test]
    fn test_parse_timestamps() {
        let classifier = TypeClassifier::new();

        let ts = classifier.parse_datetime("2023-12-25T10:30:00").unwrap();
        assert_eq!(ts.hour(), 10);
        assert_eq!(ts.minute(), 30);

        let ts = classifier.parse_datetime("2023-12-25 10:30:15.250").unwrap();
        assert_eq!(ts.second(), 15);

        let ts = classifier.parse_datetime("2023-12-25 10:30").unwrap();
        assert_eq!(ts.minute(), 30);

        // offsets are shifted to UTC
        let ts = classifier
            .parse_datetime("2023-12-25T10:30:00+02:00")
            .unwrap();
        assert_eq!(ts.hour(), 8);
    }

    #[test]
    fn test_dates_outside_nanosecond_range_are_not_datetimes() {
        let classifier = TypeClassifier::new();
        assert_eq!(classifier.parse_datetime("1500-01-01"), None);
        assert_eq!(classifier.parse_datetime("2300-01-01"), None);
        assert_eq!(classifier.parse_datetime("2300-01-01 12:00"), None);
        assert!(classifier.parse_datetime("1677-09-22").is_some());
        assert!(classifier.parse_datetime("2262-04-10").is_some());

        let stats = classifier.analyze_values([Some("2024-01-01"), Some("2300-01-01")]);
        assert_eq!(classifier.determine_type(&stats), ColumnType::Categorical);
    }

    #[test]
    fn test_analyze_values_with_missing() {
        let classifier = TypeClassifier::new();
        let stats = classifier.analyze_values([Some("123"), None, Some("NA"), Some("4.5")]);

        assert_eq!(stats.total_values, 4);
        assert_eq!(stats.missing_count, 2);
        assert_eq!(stats.numeric_matches, 2);
        assert_eq!(stats.datetime_matches, 0);
        assert_eq!(classifier.determine_type(&stats), ColumnType::Numeric);
    }

    #[test]
    fn test_determine_type_rules() {
        let classifier = TypeClassifier::new();

        let dates = classifier.analyze_values([Some("2023-01-01"), Some("2023-02-01"), None]);
        assert_eq!(classifier.determine_type(&dates), ColumnType::Datetime);

        let mixed = classifier.analyze_values([Some("1"), Some("2"), Some("three")]);
        assert_eq!(classifier.determine_type(&mixed), ColumnType::Categorical);

        let half_dates = classifier.analyze_values([Some("2023-01-01"), Some("7")]);
        assert_eq!(classifier.determine_type(&half_dates), ColumnType::Categorical);

        let all_missing = classifier.analyze_values([None, Some(""), Some("NaN")]);
        assert_eq!(classifier.determine_type(&all_missing), ColumnType::Numeric);

        let empty = classifier.analyze_values(std::iter::empty());
        assert_eq!(classifier.determine_type(&empty), ColumnType::Numeric);
    }

    #[test]
    fn test_classify_batch() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("week", DataType::Utf8, true),
            Field::new("state", DataType::Utf8, true),
            Field::new("cases", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec![
                    Some("1928-01-02"),
                    Some("1928-01-09"),
                    Some("1928-01-16"),
                ])),
                Arc::new(StringArray::from(vec![Some("AL"), Some("AK"), None])),
                Arc::new(StringArray::from(vec![Some("3"), Some("NA"), Some("7.5")])),
            ],
        )
        .unwrap();

        let classification = TypeClassifier::new().classify(&batch).unwrap();
        assert_eq!(classification.get("week"), Some(ColumnType::Datetime));
        assert_eq!(classification.get("state"), Some(ColumnType::Categorical));
        assert_eq!(classification.get("cases"), Some(ColumnType::Numeric));

        let cases = classification.iter().find(|c| c.name == "cases").unwrap();
        assert_eq!(cases.missing_count, 1);
    }

    #[test]
    fn test_classify_rejects_non_text_columns() {
        let schema = Arc::new(Schema::new(vec![Field::new("x", DataType::Float64, true)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(arrow::array::Float64Array::from(vec![1.0]))],
        )
        .unwrap();
        assert!(matches!(
            TypeClassifier::new().classify(&batch),
            Err(EdaError::Internal(_))
        ));
    }
}
