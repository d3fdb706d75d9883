//! Error types for the eda-lens analysis engine.
//!
//! All errors in the crate are represented by [`EdaError`]. Every public
//! operation of the [`AnalysisOrchestrator`](crate::orchestrator::AnalysisOrchestrator)
//! returns one of these at its boundary; the UI shell turns it into a
//! [`UserMessage`] with [`EdaError::user_message`] and keeps the session alive.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed underlying cause carried by wrapping variants.
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync>;

/// The main error type for eda-lens.
#[derive(Error, Debug)]
pub enum EdaError {
    /// The dataset could not be parsed as a delimited table at all.
    #[error("Unable to read table: {message}")]
    UnreadableTable {
        /// Human-readable reason
        message: String,
        /// Underlying parser or I/O error
        #[source]
        source: Option<BoxedCause>,
    },

    /// A column has no non-missing values to compute on.
    #[error("Column '{column}' has no values to analyze")]
    EmptyColumn { column: String },

    /// Resampling produced no period with numeric data.
    #[error("Metric '{metric}' has no numeric data in any {frequency} period")]
    EmptyMetric { metric: String, frequency: String },

    /// No column of the table satisfies the requested chart kind.
    #[error("No {required} columns available for {chart}")]
    NoEligibleColumns { chart: String, required: String },

    /// The table does not have enough columns of the required class.
    #[error("{chart} needs at least {required} numeric columns, found {found}")]
    InsufficientColumns {
        chart: String,
        required: usize,
        found: usize,
    },

    /// Chart construction failed.
    #[error("Failed to render {chart}: {message}")]
    Render {
        chart: String,
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },

    /// A requested column does not exist in the loaded table.
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// A column was used where a different type class is required.
    #[error("Column '{column}' is {found}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// A request is structurally invalid (wrong arity, bad frequency code, ...).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// An operation was requested before any table was loaded.
    #[error("No dataset loaded")]
    NoTableLoaded,

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from serialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, EdaError>`.
pub type Result<T> = std::result::Result<T, EdaError>;

/// How the UI shell should react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// The request cannot proceed at all (the table did not load).
    Fatal,
    /// The user should pick a different selection.
    Reprompt,
    /// The computation was aborted; the session continues.
    Recoverable,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Fatal => write!(f, "error"),
            Severity::Reprompt => write!(f, "warning"),
            Severity::Recoverable => write!(f, "error"),
        }
    }
}

/// A message ready for display by the UI shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessage {
    pub severity: Severity,
    pub text: String,
}

impl fmt::Display for UserMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.text)
    }
}

impl EdaError {
    /// Creates an unreadable-table error without an underlying cause.
    pub fn unreadable(message: impl Into<String>) -> Self {
        Self::UnreadableTable {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an unreadable-table error wrapping the parser error.
    pub fn unreadable_with_source(
        message: impl Into<String>,
        source: impl Into<BoxedCause>,
    ) -> Self {
        Self::UnreadableTable {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Wraps any error raised while building a chart into a render error.
    ///
    /// Errors that already describe a chart-level condition are passed through.
    pub fn into_render(self, chart: impl Into<String>) -> Self {
        match self {
            err @ (Self::Render { .. }
            | Self::InsufficientColumns { .. }
            | Self::NoEligibleColumns { .. }) => err,
            other => Self::Render {
                chart: chart.into(),
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(
        column: impl Into<String>,
        expected: impl fmt::Display,
        found: impl fmt::Display,
    ) -> Self {
        Self::TypeMismatch {
            column: column.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates a column-not-found error.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Returns how the shell should react to this error.
    pub fn severity(&self) -> Severity {
        match self {
            Self::UnreadableTable { .. } | Self::NoTableLoaded => Severity::Fatal,
            Self::NoEligibleColumns { .. }
            | Self::ColumnNotFound { .. }
            | Self::TypeMismatch { .. }
            | Self::InvalidRequest(_) => Severity::Reprompt,
            _ => Severity::Recoverable,
        }
    }

    /// Converts this error into the message shown to the user.
    pub fn user_message(&self) -> UserMessage {
        let text = match self {
            Self::UnreadableTable { message, .. } => format!("Error loading file: {message}"),
            Self::InsufficientColumns { required, .. } => {
                format!("Need at least {required} numeric columns for heatmap")
            }
            Self::Render { chart, message, .. } => {
                format!("Visualization error ({chart}): {message}")
            }
            Self::NoTableLoaded => "Select a local dataset or upload a CSV file".to_string(),
            other => other.to_string(),
        };
        UserMessage {
            severity: self.severity(),
            text,
        }
    }
}

impl From<serde_json::Error> for EdaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<EdaError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| EdaError::Internal(format!("{msg}: {}", e.into())))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| EdaError::Internal(format!("{}: {}", f(), e.into())))
    }
}
