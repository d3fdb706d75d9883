//! A loaded table paired with its classification and query context.

use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use datafusion::prelude::*;
use tracing::{debug, instrument};

use crate::analyzers::types::{ColumnClassification, ColumnType};
use crate::core::table::{Table, TableInfo};
use crate::error::{EdaError, ErrorContext, Result};

/// Name under which the loaded table is registered for SQL queries.
pub const DATA_TABLE: &str = "data";

/// Immutable unit swapped in on every load.
///
/// The table, its classification and the session context that queries it are
/// built together and never modified afterwards, so they can not drift apart.
pub struct Dataset {
    table: Table,
    classification: ColumnClassification,
    ctx: SessionContext,
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("table", &self.table.info())
            .field("classification", &self.classification)
            .finish_non_exhaustive()
    }
}

impl Dataset {
    /// Registers `table` with a fresh session context.
    pub fn new(table: Table, classification: ColumnClassification) -> Result<Self> {
        if classification.len() != table.num_columns() {
            return Err(EdaError::Internal(format!(
                "classification covers {} columns, table has {}",
                classification.len(),
                table.num_columns()
            )));
        }

        let ctx = SessionContext::new();
        ctx.register_batch(DATA_TABLE, table.batch().clone())
            .with_context(|| format!("registering table '{}'", table.name()))?;
        debug!(table = %table.name(), "Registered dataset");

        Ok(Self {
            table,
            classification,
            ctx,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn classification(&self) -> &ColumnClassification {
        &self.classification
    }

    pub fn info(&self) -> TableInfo {
        self.table.info()
    }

    /// Session context with the table registered as [`DATA_TABLE`].
    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    /// Checks that `column` exists and has the `expected` type class.
    pub fn require_type(&self, column: &str, expected: ColumnType) -> Result<()> {
        let found = self.classification.require(column)?;
        if found != expected {
            return Err(EdaError::type_mismatch(column, expected, found));
        }
        Ok(())
    }

    /// First `n` rows of the table.
    #[instrument(skip(self))]
    pub async fn preview(&self, n: usize) -> Result<RecordBatch> {
        let df = self.ctx.table(DATA_TABLE).await?.limit(0, Some(n))?;
        let batches = df.collect().await?;
        Ok(concat_batches(&self.table.batch().schema(), &batches)?)
    }

    /// Per-column describe table (count, null_count, mean, std, min, max, median).
    #[instrument(skip(self))]
    pub async fn describe(&self) -> Result<RecordBatch> {
        let described = self.ctx.table(DATA_TABLE).await?.describe().await?;
        let schema = described.schema().inner().clone();
        let batches = described.collect().await?;
        Ok(concat_batches(&schema, &batches)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::inference::TypeClassifier;
    use crate::sources::{parse_csv, CsvOptions};

    fn dataset(csv: &str) -> Dataset {
        let raw = parse_csv(csv.as_bytes(), &CsvOptions::default()).unwrap();
        let classifier = TypeClassifier::new();
        let classification = classifier.classify(&raw).unwrap();
        let table = Table::from_raw("test.csv", &raw, &classification, &classifier).unwrap();
        Dataset::new(table, classification).unwrap()
    }

    #[tokio::test]
    async fn test_preview_limits_rows() {
        let ds = dataset("region,cases\nA,1\nA,2\nB,3\nC,4\nA,100\nB,7\nC,8\n");
        let head = ds.preview(5).await.unwrap();
        assert_eq!(head.num_rows(), 5);
        assert_eq!(head.num_columns(), 2);

        let all = ds.preview(100).await.unwrap();
        assert_eq!(all.num_rows(), 7);
    }

    #[tokio::test]
    async fn test_describe_has_summary_rows() {
        let ds = dataset("region,cases\nA,1\nB,2\nC,3\n");
        let described = ds.describe().await.unwrap();
        // one row per statistic, first column names the statistic
        assert!(described.num_rows() >= 5);
        assert_eq!(described.schema().field(0).name(), "describe");
        assert_eq!(described.num_columns(), 3);
    }

    #[tokio::test]
    async fn test_sql_sees_typed_columns() {
        let ds = dataset("region,cases\nA,1\nB,2\nC,3\n");
        let batches = ds
            .context()
            .sql("SELECT SUM(cases) AS total FROM data")
            .await
            .unwrap()
            .collect()
            .await
            .unwrap();
        let total = batches[0]
            .column(0)
            .as_any()
            .downcast_ref::<arrow::array::Float64Array>()
            .unwrap()
            .value(0);
        assert_eq!(total, 6.0);
    }

    #[test]
    fn test_require_type() {
        let ds = dataset("region,cases\nA,1\n");
        assert!(ds.require_type("cases", ColumnType::Numeric).is_ok());
        assert!(matches!(
            ds.require_type("region", ColumnType::Numeric),
            Err(EdaError::TypeMismatch { .. })
        ));
        assert!(matches!(
            ds.require_type("zzz", ColumnType::Numeric),
            Err(EdaError::ColumnNotFound { .. })
        ));
    }
}
