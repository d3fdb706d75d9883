//! Typed in-memory table.

use std::fmt;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, Float64Array, StringArray, TimestampMillisecondArray,
};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::analyzers::inference::TypeClassifier;
use crate::analyzers::types::{ColumnClassification, ColumnType};
use crate::error::{EdaError, Result};

/// Shape of a loaded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
}

impl fmt::Display for TableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rows × {} columns", self.rows, self.columns)
    }
}

/// Ordered, named, typed columns of equal length.
///
/// Numeric columns are `Float64`, datetime columns `Timestamp(ms)` and
/// categorical columns `Utf8`. Missing cells are nulls.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    batch: RecordBatch,
}

impl Table {
    /// Wraps an already typed batch.
    pub fn new(name: impl Into<String>, batch: RecordBatch) -> Self {
        Self {
            name: name.into(),
            batch,
        }
    }

    /// Converts a raw all-text batch into typed columns following `classification`.
    #[instrument(skip_all, fields(table = %name.as_ref(), rows = raw.num_rows()))]
    pub fn from_raw(
        name: impl AsRef<str>,
        raw: &RecordBatch,
        classification: &ColumnClassification,
        classifier: &TypeClassifier,
    ) -> Result<Self> {
        let raw_schema = raw.schema();
        let mut fields = Vec::with_capacity(raw.num_columns());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(raw.num_columns());

        for (field, column) in raw_schema.fields().iter().zip(raw.columns()) {
            let column_type = classification.require(field.name())?;
            let text = column
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| {
                    EdaError::Internal(format!("column '{}' is not text", field.name()))
                })?;

            let typed: ArrayRef = match column_type {
                ColumnType::Numeric => Arc::new(
                    text.iter()
                        .map(|v| {
                            v.filter(|s| !classifier.is_missing(s))
                                .and_then(|s| classifier.parse_number(s))
                        })
                        .collect::<Float64Array>(),
                ),
                ColumnType::Datetime => Arc::new(
                    text.iter()
                        .map(|v| {
                            v.filter(|s| !classifier.is_missing(s))
                                .and_then(|s| classifier.parse_datetime(s))
                                .map(|ts| ts.and_utc().timestamp_millis())
                        })
                        .collect::<TimestampMillisecondArray>(),
                ),
                ColumnType::Categorical => Arc::new(
                    text.iter()
                        .map(|v| v.filter(|s| !classifier.is_missing(s)))
                        .collect::<StringArray>(),
                ),
            };

            fields.push(Field::new(field.name(), column_type.arrow_type(), true));
            arrays.push(typed);
        }

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        debug!(columns = batch.num_columns(), "Built typed table");
        Ok(Self::new(name.as_ref(), batch))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn info(&self) -> TableInfo {
        TableInfo {
            name: self.name.clone(),
            rows: self.num_rows(),
            columns: self.num_columns(),
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Returns the column named `name`.
    pub fn column(&self, name: &str) -> Result<&ArrayRef> {
        self.batch
            .schema()
            .index_of(name)
            .map(|i| self.batch.column(i))
            .map_err(|_| EdaError::column_not_found(name))
    }

    /// Numeric column values, `None` for missing cells.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = self.column(name)?;
        let values = column
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| EdaError::type_mismatch(name, ColumnType::Numeric, column.data_type()))?;
        Ok(values.iter().collect())
    }

    /// Non-missing numeric values in row order.
    pub fn present_numeric_values(&self, name: &str) -> Result<Vec<f64>> {
        Ok(self.numeric_values(name)?.into_iter().flatten().collect())
    }

    /// Text column values, `None` for missing cells.
    pub fn text_values(&self, name: &str) -> Result<Vec<Option<&str>>> {
        let column = self.column(name)?;
        let values = column
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| {
                EdaError::type_mismatch(name, ColumnType::Categorical, column.data_type())
            })?;
        Ok(values.iter().collect())
    }

    /// Datetime column values as milliseconds since the epoch.
    pub fn timestamp_values(&self, name: &str) -> Result<Vec<Option<i64>>> {
        let column = self.column(name)?;
        let values = column
            .as_any()
            .downcast_ref::<TimestampMillisecondArray>()
            .ok_or_else(|| {
                EdaError::type_mismatch(name, ColumnType::Datetime, column.data_type())
            })?;
        Ok(values.iter().collect())
    }

    /// Number of missing cells in `name`.
    pub fn null_count(&self, name: &str) -> Result<usize> {
        Ok(self.column(name)?.null_count())
    }
}
