//! Top-level configuration.
//!
//! ```rust
//! use eda_lens::config::EdaConfig;
//! use eda_lens::analyzers::resample::EmptyPeriodPolicy;
//!
//! let config = EdaConfig::builder()
//!     .data_dir("datasets")
//!     .outlier_multiplier(3.0)
//!     .empty_periods(EmptyPeriodPolicy::Fill)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.preview_rows, 5);
//! ```

use std::path::PathBuf;

use crate::analyzers::inference::ClassifierConfig;
use crate::analyzers::resample::EmptyPeriodPolicy;
use crate::analyzers::statistics::DEFAULT_OUTLIER_MULTIPLIER;
use crate::charts::ChartConfig;
use crate::error::{EdaError, Result};
use crate::logging::LogConfig;
use crate::sources::CsvOptions;

/// Directory searched for bundled datasets.
pub const DEFAULT_DATA_DIR: &str = "data/contagious-diseases";

/// Settings for an [`AnalysisOrchestrator`](crate::orchestrator::AnalysisOrchestrator).
#[derive(Debug, Clone)]
pub struct EdaConfig {
    /// Directory listed by dataset discovery
    pub data_dir: PathBuf,
    pub csv: CsvOptions,
    pub classifier: ClassifierConfig,
    /// IQR fence multiplier for outlier detection
    pub outlier_multiplier: f64,
    pub chart: ChartConfig,
    pub empty_periods: EmptyPeriodPolicy,
    /// Rows returned by `preview` when no count is given
    pub preview_rows: usize,
    pub log: LogConfig,
}

impl Default for EdaConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            csv: CsvOptions::default(),
            classifier: ClassifierConfig::default(),
            outlier_multiplier: DEFAULT_OUTLIER_MULTIPLIER,
            chart: ChartConfig::default(),
            empty_periods: EmptyPeriodPolicy::default(),
            preview_rows: 5,
            log: LogConfig::default(),
        }
    }
}

impl EdaConfig {
    pub fn builder() -> EdaConfigBuilder {
        EdaConfigBuilder {
            config: Self::default(),
        }
    }

    /// Rejects settings no computation can work with.
    pub fn validate(&self) -> Result<()> {
        if !self.outlier_multiplier.is_finite() || self.outlier_multiplier <= 0.0 {
            return Err(EdaError::Configuration(format!(
                "outlier_multiplier must be a positive number, got {}",
                self.outlier_multiplier
            )));
        }
        if self.chart.max_bins == 0 {
            return Err(EdaError::Configuration(
                "chart.max_bins must be at least 1".to_string(),
            ));
        }
        if self.chart.density_points < 2 {
            return Err(EdaError::Configuration(
                "chart.density_points must be at least 2".to_string(),
            ));
        }
        if !self.chart.density_cut.is_finite() || self.chart.density_cut < 0.0 {
            return Err(EdaError::Configuration(format!(
                "chart.density_cut must be a non-negative number, got {}",
                self.chart.density_cut
            )));
        }
        if !self.chart.whisker_multiplier.is_finite() || self.chart.whisker_multiplier < 0.0 {
            return Err(EdaError::Configuration(format!(
                "chart.whisker_multiplier must be a non-negative number, got {}",
                self.chart.whisker_multiplier
            )));
        }
        if self.csv.delimiter == self.csv.quote {
            return Err(EdaError::Configuration(
                "csv delimiter and quote character must differ".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`EdaConfig`].
#[derive(Debug, Clone)]
pub struct EdaConfigBuilder {
    config: EdaConfig,
}

impl EdaConfigBuilder {
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = dir.into();
        self
    }

    pub fn csv(mut self, options: CsvOptions) -> Self {
        self.config.csv = options;
        self
    }

    pub fn classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.config.classifier = classifier;
        self
    }

    pub fn outlier_multiplier(mut self, multiplier: f64) -> Self {
        self.config.outlier_multiplier = multiplier;
        self
    }

    pub fn chart(mut self, chart: ChartConfig) -> Self {
        self.config.chart = chart;
        self
    }

    pub fn empty_periods(mut self, policy: EmptyPeriodPolicy) -> Self {
        self.config.empty_periods = policy;
        self
    }

    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.config.preview_rows = rows;
        self
    }

    pub fn log(mut self, log: LogConfig) -> Self {
        self.config.log = log;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<EdaConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
