//! Renderable chart values.

use serde::{Deserialize, Serialize};

use crate::analyzers::correlation::CorrelationMatrix;
use crate::analyzers::histogram::HistogramBin;
use crate::charts::ChartKind;

/// A fully computed chart, ready to be drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub body: ChartBody,
}

/// Kind-specific chart data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartBody {
    Bar(BarChart),
    Pie(PieChart),
    Line(LineChart),
    Histogram(HistogramChart),
    BoxPlot(BoxPlotChart),
    Scatter(ScatterChart),
    Heatmap(HeatmapChart),
}

impl ChartBody {
    /// The kind this body belongs to.
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartBody::Bar(_) => ChartKind::Bar,
            ChartBody::Pie(_) => ChartKind::Pie,
            ChartBody::Line(_) => ChartKind::Line,
            ChartBody::Histogram(_) => ChartKind::Histogram,
            ChartBody::BoxPlot(_) => ChartKind::BoxPlot,
            ChartBody::Scatter(_) => ChartKind::Scatter,
            ChartBody::Heatmap(_) => ChartKind::Heatmap,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarEntry {
    pub label: String,
    pub count: u64,
}

/// Category counts, highest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarChart {
    pub bars: Vec<BarEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub count: u64,
    /// Share of the whole, in `0..=1`
    pub fraction: f64,
    /// Percentage text, e.g. `"60.0%"`
    pub percent_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    /// Zero-based row position
    pub index: usize,
    pub value: f64,
}

/// Values against row position; missing rows leave a gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineChart {
    pub points: Vec<LinePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramChart {
    pub bins: Vec<HistogramBin>,
    pub bin_width: f64,
    /// Density curve scaled to bin counts, absent when the bandwidth is undefined
    pub density: Option<Vec<(f64, f64)>>,
    pub bandwidth: Option<f64>,
}

/// Box plot geometry. Whiskers end at the most extreme values inside the fences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPlotChart {
    pub stats: BoxStats,
    /// Values beyond the whiskers, in row order
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterChart {
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapChart {
    pub matrix: CorrelationMatrix,
    /// Cell text matching `matrix.values`; undefined coefficients read "nan"
    pub annotations: Vec<Vec<String>>,
}
