//! Chart selection and rendering.
//!
//! Every [`ChartKind`] has one entry in the [registry](registry::spec_for)
//! naming the column type it needs, how many columns it takes and the function
//! that builds it:
//!
//! | Kind         | Column type | Arity                   |
//! |--------------|-------------|-------------------------|
//! | Bar Chart    | categorical | 1                       |
//! | Pie Chart    | categorical | 1                       |
//! | Line Chart   | numeric     | 1 (against row index)   |
//! | Histogram    | numeric     | 1                       |
//! | Box Plot     | numeric     | 1                       |
//! | Scatter Plot | numeric     | 2                       |
//! | Heatmap      | numeric     | all numeric, at least 2 |
//!
//! Rendering produces a [`Chart`] value describing what to draw; drawing it is
//! up to the caller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EdaError, Result};

pub mod artifact;
pub mod registry;
pub mod render;

pub use artifact::{
    BarChart, BarEntry, BoxPlotChart, BoxStats, Chart, ChartBody, HeatmapChart, HistogramChart,
    LineChart, LinePoint, PieChart, PieSlice, ScatterChart, ScatterPoint,
};
pub use registry::{spec_for, ChartSelector, ChartSpec};
pub use render::ChartRenderer;

/// The chart kinds offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartKind {
    Bar,
    Line,
    Histogram,
    Scatter,
    BoxPlot,
    Pie,
    Heatmap,
}

impl ChartKind {
    /// All kinds in menu order.
    pub const ALL: [ChartKind; 7] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Histogram,
        ChartKind::Scatter,
        ChartKind::BoxPlot,
        ChartKind::Pie,
        ChartKind::Heatmap,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar Chart",
            ChartKind::Line => "Line Chart",
            ChartKind::Histogram => "Histogram",
            ChartKind::Scatter => "Scatter Plot",
            ChartKind::BoxPlot => "Box Plot",
            ChartKind::Pie => "Pie Chart",
            ChartKind::Heatmap => "Heatmap",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChartKind {
    type Err = EdaError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "bar" | "barchart" => Ok(ChartKind::Bar),
            "line" | "linechart" => Ok(ChartKind::Line),
            "histogram" | "hist" => Ok(ChartKind::Histogram),
            "scatter" | "scatterplot" => Ok(ChartKind::Scatter),
            "box" | "boxplot" => Ok(ChartKind::BoxPlot),
            "pie" | "piechart" => Ok(ChartKind::Pie),
            "heatmap" | "correlation" => Ok(ChartKind::Heatmap),
            _ => Err(EdaError::InvalidRequest(format!("unknown chart type '{s}'"))),
        }
    }
}

/// How many columns a chart kind takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arity {
    /// Exactly this many selected columns.
    Exactly(usize),
    /// Every column of the required type; the table must have at least `min`.
    AllOfType { min: usize },
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(1) => write!(f, "1 column"),
            Arity::Exactly(n) => write!(f, "{n} columns"),
            Arity::AllOfType { min } => write!(f, "all matching columns (at least {min})"),
        }
    }
}

/// A chart kind plus the user's column selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub kind: ChartKind,
    /// Selected columns in axis order; empty means "all eligible" for heatmaps
    pub columns: Vec<String>,
}

impl ChartRequest {
    pub fn new<I, S>(kind: ChartKind, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// A single-column request.
    pub fn single(kind: ChartKind, column: impl Into<String>) -> Self {
        Self {
            kind,
            columns: vec![column.into()],
        }
    }

    /// A scatter plot of `y` against `x`.
    pub fn scatter(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            kind: ChartKind::Scatter,
            columns: vec![x.into(), y.into()],
        }
    }

    /// A heatmap over every numeric column.
    pub fn heatmap() -> Self {
        Self {
            kind: ChartKind::Heatmap,
            columns: Vec::new(),
        }
    }
}

/// Rendering parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    /// Upper bound on histogram bins
    pub max_bins: usize,
    /// Points on the density curve grid
    pub density_points: usize,
    /// Bandwidths the density grid extends past the data range
    pub density_cut: f64,
    /// Whisker reach in IQRs for box plots
    pub whisker_multiplier: f64,
    /// Decimals in heatmap annotations
    pub annotation_decimals: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            max_bins: 100,
            density_points: 200,
            density_cut: 3.0,
            whisker_multiplier: 1.5,
            annotation_decimals: 2,
        }
    }
}
