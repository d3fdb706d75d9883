//! The external-facing coordinator.
//!
//! An [`AnalysisOrchestrator`] owns at most one loaded [`Dataset`]. Loading
//! builds a complete new dataset (typed table, classification, query context)
//! before swapping it in, so a request always sees a table together with the
//! classification computed for it. Requests clone the current `Arc<Dataset>`
//! and run without holding the lock.
//!
//! Every operation logs its failure with `warn!` before returning it; callers
//! turn errors into messages with [`EdaError::user_message`].
//!
//! # Example
//!
//! ```rust,no_run
//! use eda_lens::prelude::*;
//!
//! # async fn example() -> eda_lens::error::Result<()> {
//! let eda = AnalysisOrchestrator::new(EdaConfig::default())?;
//! let info = eda.load_path("data/contagious-diseases/measles.csv").await?;
//! println!("Successfully loaded dataset: {info}");
//!
//! let report = eda.detect_outliers("incidence_per_capita")?;
//! println!("{report}");
//!
//! let chart = eda.render(&ChartRequest::single(ChartKind::Histogram, "incidence_per_capita"))?;
//! println!("{}", chart.title);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use arrow::record_batch::RecordBatch;
use tracing::{info, instrument, warn};

use crate::analyzers::inference::TypeClassifier;
use crate::analyzers::resample::{ResampleSpec, ResampledSeries, TimeSeriesResampler};
use crate::analyzers::statistics::StatisticsEngine;
use crate::analyzers::types::{ColumnClassification, ColumnType, OutlierReport, StatSummary};
use crate::charts::{Chart, ChartKind, ChartRenderer, ChartRequest, ChartSelector};
use crate::config::EdaConfig;
use crate::core::{Dataset, Table, TableInfo};
use crate::error::{EdaError, Result};
use crate::formatters::ColumnReport;
use crate::logging::truncate_field;
use crate::sources::{discover_csv_files, CsvSource, DataSource};
use crate::{log_data_op, log_metric, perf_debug};

/// Coordinates loading, statistics, charts and resampling for one session.
pub struct AnalysisOrchestrator {
    config: EdaConfig,
    classifier: TypeClassifier,
    statistics: StatisticsEngine,
    selector: ChartSelector,
    renderer: ChartRenderer,
    resampler: TimeSeriesResampler,
    current: RwLock<Option<Arc<Dataset>>>,
}

impl std::fmt::Debug for AnalysisOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisOrchestrator")
            .field("config", &self.config)
            .field("loaded", &self.current_info())
            .finish_non_exhaustive()
    }
}

impl AnalysisOrchestrator {
    /// Creates an orchestrator with no dataset loaded.
    pub fn new(config: EdaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            classifier: TypeClassifier::with_config(config.classifier.clone()),
            statistics: StatisticsEngine::new().with_outlier_multiplier(config.outlier_multiplier),
            selector: ChartSelector::new(),
            renderer: ChartRenderer::new(config.chart.clone()),
            resampler: TimeSeriesResampler::new().with_empty_periods(config.empty_periods),
            current: RwLock::new(None),
            config,
        })
    }

    pub fn config(&self) -> &EdaConfig {
        &self.config
    }

    /// CSV files available in the configured data directory.
    pub fn discover_datasets(&self) -> Result<Vec<PathBuf>> {
        discover_csv_files(&self.config.data_dir)
            .inspect_err(|e| warn!(error = %e, "Dataset discovery failed"))
    }

    /// Loads a local CSV file, replacing any loaded dataset.
    pub async fn load_path(&self, path: impl AsRef<Path>) -> Result<TableInfo> {
        let source = CsvSource::from_path(path.as_ref()).with_options(self.config.csv.clone());
        self.load(&source).await
    }

    /// Loads an uploaded CSV byte stream, replacing any loaded dataset.
    pub async fn load_bytes(&self, name: &str, bytes: impl Into<Arc<[u8]>>) -> Result<TableInfo> {
        let source = CsvSource::from_bytes(name, bytes).with_options(self.config.csv.clone());
        self.load(&source).await
    }

    /// Loads any data source. On failure the previously loaded dataset stays in place.
    #[instrument(skip(self, source), fields(source = %source.description()))]
    pub async fn load(&self, source: &dyn DataSource) -> Result<TableInfo> {
        let result = self.build_dataset(source).await;
        let dataset = boundary("load", result)?;
        let info = dataset.info();

        match self.current.write() {
            Ok(mut guard) => *guard = Some(Arc::new(dataset)),
            Err(poisoned) => *poisoned.into_inner() = Some(Arc::new(dataset)),
        }

        info!(
            table = %truncate_field(&info.name, self.config.log.max_field_length),
            rows = info.rows,
            columns = info.columns,
            "Successfully loaded dataset"
        );
        Ok(info)
    }

    async fn build_dataset(&self, source: &dyn DataSource) -> Result<Dataset> {
        let raw = source.read_raw().await?;
        log_data_op!(
            self.config.log,
            source = %source.description(),
            rows = raw.num_rows(),
            columns = raw.num_columns(),
            "Parsed data source"
        );

        let classification = self.classifier.classify(&raw)?;
        let table = Table::from_raw(source.name(), &raw, &classification, &self.classifier)?;
        perf_debug!(
            self.config.log,
            columns = ?classification.names().collect::<Vec<_>>(),
            "Typed table built"
        );
        Dataset::new(table, classification)
    }

    /// The loaded dataset.
    pub fn dataset(&self) -> Result<Arc<Dataset>> {
        let guard = match self.current.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clone().ok_or(EdaError::NoTableLoaded)
    }

    fn current_info(&self) -> Option<TableInfo> {
        self.dataset().ok().map(|d| d.info())
    }

    /// Shape of the loaded table.
    pub fn info(&self) -> Result<TableInfo> {
        boundary("info", self.dataset().map(|d| d.info()))
    }

    /// Column classification of the loaded table.
    pub fn classification(&self) -> Result<ColumnClassification> {
        boundary(
            "classification",
            self.dataset().map(|d| d.classification().clone()),
        )
    }

    /// Descriptive statistics or a frequency table, depending on the column type.
    pub fn summarize(&self, column: &str) -> Result<StatSummary> {
        let result = self
            .dataset()
            .and_then(|d| self.statistics.summarize(&d, column))
            .inspect(|summary| self.log_summary_metrics(column, summary));
        boundary("summarize", result)
    }

    /// IQR outliers with the configured multiplier.
    pub fn detect_outliers(&self, column: &str) -> Result<OutlierReport> {
        let result = self
            .dataset()
            .and_then(|d| self.statistics.detect_outliers(&d, column))
            .inspect(|report| self.log_outlier_metrics(report));
        boundary("detect_outliers", result)
    }

    /// IQR outliers with fences at `k` IQRs.
    pub fn detect_outliers_with_multiplier(&self, column: &str, k: f64) -> Result<OutlierReport> {
        let result = self
            .dataset()
            .and_then(|d| self.statistics.detect_outliers_with_multiplier(&d, column, k))
            .inspect(|report| self.log_outlier_metrics(report));
        boundary("detect_outliers", result)
    }

    fn log_summary_metrics(&self, column: &str, summary: &StatSummary) {
        let column = truncate_field(column, self.config.log.max_field_length);
        match summary {
            StatSummary::Numeric(s) => log_metric!(
                self.config.log,
                column = %column,
                count = s.count,
                mean = s.mean,
                median = s.median,
                std_dev = ?s.std_dev,
                "Numeric summary"
            ),
            StatSummary::Categorical(table) => log_metric!(
                self.config.log,
                column = %column,
                distinct = table.len(),
                present = table.total(),
                "Frequency summary"
            ),
        }
    }

    fn log_outlier_metrics(&self, report: &OutlierReport) {
        log_metric!(
            self.config.log,
            column = %truncate_field(&report.column, self.config.log.max_field_length),
            multiplier = report.multiplier,
            outlier_count = report.outlier_count,
            outlier_fraction = report.outlier_fraction,
            "Outlier report"
        );
    }

    /// Columns eligible for `kind`.
    pub fn select(&self, kind: ChartKind) -> Result<Vec<String>> {
        let result = self
            .dataset()
            .and_then(|d| self.selector.select(d.classification(), kind));
        boundary("select", result)
    }

    /// Renders a chart.
    pub fn render(&self, request: &ChartRequest) -> Result<Chart> {
        let result = self
            .dataset()
            .and_then(|d| self.renderer.render(&d, request));
        boundary("render", result)
    }

    /// Period means of a numeric column over a datetime column.
    pub async fn resample(&self, spec: &ResampleSpec) -> Result<ResampledSeries> {
        let result = match self.dataset() {
            Ok(d) => self.resampler.resample(&d, spec).await,
            Err(e) => Err(e),
        };
        boundary("resample", result)
    }

    /// First `n` rows (the configured preview size when `None`).
    pub async fn preview(&self, n: Option<usize>) -> Result<RecordBatch> {
        let rows = n.unwrap_or(self.config.preview_rows);
        let result = match self.dataset() {
            Ok(d) => d.preview(rows).await,
            Err(e) => Err(e),
        };
        boundary("preview", result)
    }

    /// Per-column describe table.
    pub async fn describe(&self) -> Result<RecordBatch> {
        let result = match self.dataset() {
            Ok(d) => d.describe().await,
            Err(e) => Err(e),
        };
        boundary("describe", result)
    }

    /// Type, summary and (for numeric columns) outliers of one column.
    pub fn column_report(&self, column: &str) -> Result<ColumnReport> {
        let result = self.dataset().and_then(|d| {
            let classified = d
                .classification()
                .iter()
                .find(|c| c.name == column)
                .cloned()
                .ok_or_else(|| EdaError::column_not_found(column))?;
            let summary = self.statistics.summarize(&d, column)?;
            let outliers = match classified.column_type {
                ColumnType::Numeric => Some(self.statistics.detect_outliers(&d, column)?),
                _ => None,
            };
            Ok(ColumnReport {
                column: classified.name,
                column_type: classified.column_type,
                missing_count: classified.missing_count,
                summary,
                outliers,
            })
        });
        boundary("column_report", result)
    }

    /// Reports for every column; columns that fail are skipped with a warning.
    pub fn column_reports(&self) -> Result<Vec<ColumnReport>> {
        let dataset = boundary("column_reports", self.dataset())?;
        Ok(dataset
            .classification()
            .names()
            .filter_map(|name| self.column_report(name).ok())
            .collect())
    }
}

/// Logs a failed operation at its boundary.
fn boundary<T>(operation: &str, result: Result<T>) -> Result<T> {
    result.inspect_err(|e| {
        let message = e.user_message();
        warn!(
            operation,
            severity = %message.severity,
            error = %e,
            "{}",
            message.text
        );
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogConfig;
    use crate::test_fixtures::REGION_CASES_CSV;

    fn orchestrator() -> AnalysisOrchestrator {
        AnalysisOrchestrator::new(EdaConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_requests_before_load() {
        let eda = orchestrator();
        assert!(matches!(eda.summarize("x"), Err(EdaError::NoTableLoaded)));
        assert!(matches!(eda.preview(None).await, Err(EdaError::NoTableLoaded)));
        assert_eq!(
            eda.info().unwrap_err().user_message().text,
            "Select a local dataset or upload a CSV file"
        );
    }

    #[tokio::test]
    async fn test_load_bytes_and_summarize() {
        let eda = orchestrator();
        let info = eda
            .load_bytes("upload.csv", REGION_CASES_CSV.as_bytes().to_vec())
            .await
            .unwrap();
        assert_eq!(info.to_string(), "5 rows × 2 columns");

        let summary = eda.summarize("cases").unwrap();
        assert_eq!(summary.as_numeric().unwrap().mean, 22.0);

        let report = eda.detect_outliers("cases").unwrap();
        assert_eq!(report.outlier_count, 1);
    }

    #[tokio::test]
    async fn test_metric_logging_leaves_results_unchanged() {
        let config = EdaConfig::builder().log(LogConfig::verbose()).build().unwrap();
        let eda = AnalysisOrchestrator::new(config).unwrap();
        eda.load_bytes("upload.csv", REGION_CASES_CSV.as_bytes().to_vec())
            .await
            .unwrap();

        assert_eq!(eda.summarize("cases").unwrap().as_numeric().unwrap().count, 5);
        assert_eq!(eda.summarize("region").unwrap().as_frequencies().unwrap().total(), 5);
        assert_eq!(eda.detect_outliers("cases").unwrap().outlier_count, 1);
        assert_eq!(
            eda.detect_outliers_with_multiplier("cases", 100.0)
                .unwrap()
                .outlier_count,
            0
        );
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_dataset() {
        let eda = orchestrator();
        eda.load_bytes("first.csv", REGION_CASES_CSV.as_bytes().to_vec())
            .await
            .unwrap();

        let err = eda
            .load_bytes("broken.csv", b"a,b\n1,2\n3\n".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, EdaError::UnreadableTable { .. }));
        assert_eq!(eda.info().unwrap().name, "first.csv");
    }

    #[tokio::test]
    async fn test_reload_replaces_classification() {
        let eda = orchestrator();
        eda.load_bytes("a.csv", b"x\n1\n2\n".to_vec()).await.unwrap();
        assert_eq!(eda.classification().unwrap().get("x"), Some(ColumnType::Numeric));

        eda.load_bytes("b.csv", b"x\nfoo\nbar\n".to_vec()).await.unwrap();
        assert_eq!(
            eda.classification().unwrap().get("x"),
            Some(ColumnType::Categorical)
        );
    }

    #[tokio::test]
    async fn test_column_report() {
        let eda = orchestrator();
        eda.load_bytes("upload.csv", REGION_CASES_CSV.as_bytes().to_vec())
            .await
            .unwrap();

        let numeric = eda.column_report("cases").unwrap();
        assert!(numeric.outliers.is_some());
        let categorical = eda.column_report("region").unwrap();
        assert!(categorical.outliers.is_none());
        assert_eq!(eda.column_reports().unwrap().len(), 2);
    }
}
