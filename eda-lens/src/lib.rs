//! # eda-lens - Exploratory Data Analysis for CSV tables
//!
//! eda-lens is the analysis engine behind an interactive exploratory data
//! analysis tool. Given a CSV table it classifies every column as numeric,
//! categorical or datetime, then serves descriptive statistics, outlier
//! reports, chart artifacts and time-series resampling, choosing the columns
//! each request may use from that classification. Tables are held in memory as
//! Arrow record batches and queried through DataFusion.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use eda_lens::prelude::*;
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let eda = AnalysisOrchestrator::new(EdaConfig::default())?;
//!
//! // Load a bundled dataset (or an uploaded byte stream with `load_bytes`)
//! let info = eda.load_path("data/contagious-diseases/measles.csv").await?;
//! println!("Successfully loaded dataset: {info}");
//!
//! // Statistics branch on the column type
//! match eda.summarize("count")? {
//!     StatSummary::Numeric(summary) => println!("mean = {:.2}", summary.rounded().mean),
//!     StatSummary::Categorical(table) => println!("{} distinct values", table.len()),
//! }
//!
//! // Charts only accept columns of the type they need
//! for column in eda.select(ChartKind::Bar)? {
//!     let chart = eda.render(&ChartRequest::single(ChartKind::Bar, column))?;
//!     println!("{}", chart.title);
//! }
//!
//! // Errors carry the message the UI should show
//! if let Err(e) = eda.render(&ChartRequest::heatmap()) {
//!     println!("{}", e.user_message());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Chart Kinds
//!
//! | Kind | Column type | Columns |
//! |---|---|---|
//! | Bar, Pie | categorical | 1 |
//! | Line, Histogram, Box Plot | numeric | 1 |
//! | Scatter | numeric | 2 |
//! | Heatmap | numeric | all numeric (at least 2) |
//!
//! Rendering produces a [`charts::Chart`]: a plain serializable description of
//! what to draw (bars, slices, bins with a density curve, box statistics,
//! points or an annotated correlation matrix), independent of any plotting
//! library.
//!
//! ## Architecture
//!
//! - **`sources`**: CSV loading from a path or an uploaded byte stream, dataset discovery
//! - **`analyzers`**: type classification, statistics, correlation, histograms, resampling
//! - **`core`**: the typed `Table` and the loaded `Dataset` with its query context
//! - **`charts`**: chart registry, column selection and rendering
//! - **`orchestrator`**: the external-facing `AnalysisOrchestrator`
//! - **`formatters`**: text and JSON column reports
//! - **`config`**, **`error`**, **`logging`**: configuration, errors and tracing setup

pub mod analyzers;
pub mod charts;
pub mod config;
pub mod core;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod orchestrator;
pub mod prelude;
pub mod security;
pub mod sources;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;
