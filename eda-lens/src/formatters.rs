//! Text and JSON rendering of per-column analysis reports.
//!
//! # Examples
//!
//! ```rust
//! use eda_lens::formatters::{ColumnReport, HumanFormatter, ReportFormatter};
//! use eda_lens::analyzers::{ColumnType, FrequencyEntry, FrequencyTable, StatSummary};
//!
//! let report = ColumnReport {
//!     column: "region".to_string(),
//!     column_type: ColumnType::Categorical,
//!     missing_count: 0,
//!     summary: StatSummary::Categorical(FrequencyTable {
//!         column: "region".to_string(),
//!         entries: vec![FrequencyEntry { value: "A".to_string(), count: 3 }],
//!     }),
//!     outliers: None,
//! };
//! let text = HumanFormatter::new().with_colors(false).format(&report).unwrap();
//! assert!(text.contains("region (categorical)"));
//! ```

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::analyzers::types::{ColumnType, OutlierReport, StatSummary};
use crate::prelude::*;

/// Everything computed for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnReport {
    pub column: String,
    pub column_type: ColumnType,
    pub missing_count: usize,
    pub summary: StatSummary,
    /// Present for numeric columns with at least one value
    pub outliers: Option<OutlierReport>,
}

/// Configuration options for formatting reports.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Whether to use colorized output (for human formatter)
    pub use_colors: bool,
    /// Frequency rows to print before eliding the rest (0 for all)
    pub max_frequency_rows: usize,
    /// Include the outlier section
    pub include_outliers: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            use_colors: true,
            max_frequency_rows: 10,
            include_outliers: true,
        }
    }
}

impl FormatterConfig {
    /// Plain output with every frequency row.
    pub fn full() -> Self {
        Self {
            use_colors: false,
            max_frequency_rows: 0,
            include_outliers: true,
        }
    }
}

/// Renders a [`ColumnReport`] into a string.
pub trait ReportFormatter {
    fn format(&self, report: &ColumnReport) -> Result<String>;

    /// Formats several reports, one after another.
    fn format_all(&self, reports: &[ColumnReport]) -> Result<String> {
        let mut out = String::new();
        for report in reports {
            out.push_str(&self.format(report)?);
        }
        Ok(out)
    }
}

/// Formats reports as JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &ColumnReport) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(json)
    }

    fn format_all(&self, reports: &[ColumnReport]) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(reports)?
        } else {
            serde_json::to_string(reports)?
        };
        Ok(json)
    }
}

/// Formats reports for a terminal.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.config.use_colors = use_colors;
        self
    }

    fn heading(&self, text: &str) -> String {
        if self.config.use_colors {
            format!("\x1b[1m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn write_report(&self, out: &mut String, report: &ColumnReport) -> std::fmt::Result {
        writeln!(
            out,
            "{}",
            self.heading(&format!("{} ({})", report.column, report.column_type))
        )?;
        writeln!(out, "   Missing values: {}", report.missing_count)?;

        match &report.summary {
            StatSummary::Numeric(summary) => {
                let rounded = summary.rounded();
                writeln!(out, "   Count: {}", rounded.count)?;
                for (label, value) in rounded.metrics() {
                    match value {
                        Some(v) => writeln!(out, "   {label}: {v:.2}")?,
                        None => writeln!(out, "   {label}: n/a")?,
                    }
                }
            }
            StatSummary::Categorical(table) => {
                writeln!(out, "   Distinct values: {}", table.len())?;
                let limit = match self.config.max_frequency_rows {
                    0 => table.len(),
                    n => n.min(table.len()),
                };
                for entry in table.iter().take(limit) {
                    writeln!(out, "   {:<24} {}", entry.value, entry.count)?;
                }
                if limit < table.len() {
                    writeln!(out, "   ... {} more", table.len() - limit)?;
                }
            }
        }

        if self.config.include_outliers {
            if let Some(outliers) = &report.outliers {
                writeln!(
                    out,
                    "   IQR bounds: [{:.2}, {:.2}]",
                    outliers.lower_bound, outliers.upper_bound
                )?;
                writeln!(out, "   {outliers}")?;
            }
        }
        writeln!(out)
    }
}

impl ReportFormatter for HumanFormatter {
    fn format(&self, report: &ColumnReport) -> Result<String> {
        let mut out = String::new();
        self.write_report(&mut out, report)
            .map_err(|e| EdaError::Internal(format!("Failed to format report: {e}")))?;
        Ok(out)
    }
}
