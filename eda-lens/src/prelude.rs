//! Prelude for commonly used types and traits in eda-lens.

pub use crate::analyzers::{
    ColumnClassification, ColumnType, EmptyPeriodPolicy, Frequency, OutlierReport, ResampleSpec,
    ResampledSeries, StatSummary,
};
pub use crate::charts::{Chart, ChartBody, ChartKind, ChartRequest};
pub use crate::config::EdaConfig;
pub use crate::core::{Dataset, TableInfo};
pub use crate::error::{EdaError, ErrorContext, Result, Severity, UserMessage};
pub use crate::formatters::{ColumnReport, FormatterConfig, ReportFormatter};
pub use crate::logging::LogConfig;
pub use crate::orchestrator::AnalysisOrchestrator;
pub use crate::sources::{CsvSource, DataSource};
