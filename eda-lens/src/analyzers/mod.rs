//! Column analysis: type classification, statistics and resampling.
//!
//! ## Modules
//!
//! - **`inference`**: classifies each raw text column as numeric, categorical or datetime
//! - **`statistics`**: descriptive summaries, frequency tables and IQR outliers
//! - **`descriptive`**: the numeric kernels (quantiles, moments) behind summaries and box plots
//! - **`correlation`**: pairwise Pearson coefficients for heatmaps
//! - **`histogram`**: histogram binning and Gaussian kernel density estimates
//! - **`resample`**: calendar-period means of a metric over a datetime column
//!
//! ## Example Usage
//!
//! ```rust
//! use eda_lens::analyzers::statistics::{frequency_counts, outlier_report};
//!
//! let cases = [1.0, 2.0, 3.0, 4.0, 100.0];
//! let report = outlier_report("cases", &cases, cases.len(), 1.5).unwrap();
//! assert_eq!(report.to_string(), "Detected 1 potential outliers (20.00% of data)");
//!
//! let regions = frequency_counts("region", ["A", "A", "B", "C", "A"].map(Some));
//! assert_eq!(regions.get("A"), Some(3));
//! ```

pub mod correlation;
pub mod descriptive;
pub mod histogram;
pub mod inference;
pub mod resample;
pub mod statistics;
pub mod types;

pub use correlation::{correlation_matrix, CorrelationMatrix, CorrelationState};
pub use descriptive::Quartiles;
pub use histogram::{gaussian_kde, DensityCurve, Histogram, HistogramBin};
pub use inference::{
    ClassifierConfig, TypeClassifier, TypeClassifierBuilder, TypeStats, DEFAULT_MISSING_MARKERS,
};
pub use resample::{
    EmptyPeriodPolicy, Frequency, ResampleSpec, ResampledPoint, ResampledSeries,
    TimeSeriesResampler,
};
pub use statistics::{StatisticsEngine, DEFAULT_OUTLIER_MULTIPLIER};
pub use types::{
    ClassifiedColumn, ColumnClassification, ColumnType, FrequencyEntry, FrequencyTable,
    NumericSummary, OutlierReport, StatSummary,
};
