//! Builds chart artifacts from a dataset.

use tracing::{debug, info, instrument};

use crate::analyzers::correlation::correlation_matrix;
use crate::analyzers::descriptive::{sorted, Quartiles};
use crate::analyzers::histogram::{gaussian_kde, Histogram};
use crate::analyzers::statistics::frequency_counts;
use crate::analyzers::types::FrequencyTable;
use crate::charts::artifact::*;
use crate::charts::registry::{spec_for, ChartSelector};
use crate::charts::{ChartConfig, ChartKind, ChartRequest};
use crate::core::Dataset;
use crate::error::{EdaError, Result};

/// Inputs shared by the per-kind render functions.
pub struct RenderContext<'a> {
    pub dataset: &'a Dataset,
    pub config: &'a ChartConfig,
}

/// Validates chart requests and renders them.
#[derive(Debug, Clone, Default)]
pub struct ChartRenderer {
    config: ChartConfig,
    selector: ChartSelector,
}

impl ChartRenderer {
    pub fn new(config: ChartConfig) -> Self {
        Self {
            config,
            selector: ChartSelector::new(),
        }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Renders `request` against `dataset`.
    ///
    /// Selection problems are returned as they are; any failure while building
    /// the chart itself comes back as `Render` with the cause attached.
    #[instrument(skip(self, dataset), fields(chart = %request.kind))]
    pub fn render(&self, dataset: &Dataset, request: &ChartRequest) -> Result<Chart> {
        let columns = self.selector.validate(dataset.classification(), request)?;
        let spec = spec_for(request.kind);
        let ctx = RenderContext {
            dataset,
            config: &self.config,
        };

        let body = (spec.render)(&ctx, &columns).map_err(|e| e.into_render(request.kind.name()))?;
        let (title, x_label, y_label) = labels(request.kind, &columns);

        info!(chart = %request.kind, columns = ?columns, "Rendered chart");
        Ok(Chart {
            kind: request.kind,
            title,
            x_label,
            y_label,
            body,
        })
    }
}

fn labels(kind: ChartKind, columns: &[String]) -> (String, String, String) {
    let first = columns.first().cloned().unwrap_or_default();
    match kind {
        ChartKind::Bar => (format!("Frequency of {first}"), first, "count".to_string()),
        ChartKind::Pie => (format!("Share of {first}"), String::new(), String::new()),
        ChartKind::Line => (format!("{first} by row"), "index".to_string(), first),
        ChartKind::Histogram => (format!("Distribution of {first}"), first, "count".to_string()),
        ChartKind::BoxPlot => (format!("Spread of {first}"), String::new(), first),
        ChartKind::Scatter => {
            let second = columns.get(1).cloned().unwrap_or_default();
            (format!("{second} vs {first}"), first, second)
        }
        ChartKind::Heatmap => (
            "Correlation matrix".to_string(),
            String::new(),
            String::new(),
        ),
    }
}

fn only_column(columns: &[String]) -> Result<&str> {
    match columns {
        [column] => Ok(column),
        _ => Err(EdaError::InvalidRequest(format!(
            "expected one column, got {}",
            columns.len()
        ))),
    }
}

fn ensure_finite(column: &str, values: &[f64]) -> Result<()> {
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(EdaError::InvalidRequest(format!(
            "column '{column}' contains a non-finite value ({bad})"
        )));
    }
    Ok(())
}

fn finite_values(ctx: &RenderContext<'_>, column: &str) -> Result<Vec<f64>> {
    let values = ctx.dataset.table().present_numeric_values(column)?;
    if values.is_empty() {
        return Err(EdaError::EmptyColumn {
            column: column.to_string(),
        });
    }
    ensure_finite(column, &values)?;
    Ok(values)
}

fn counts(ctx: &RenderContext<'_>, column: &str) -> Result<FrequencyTable> {
    let table = frequency_counts(column, ctx.dataset.table().text_values(column)?);
    if table.is_empty() {
        return Err(EdaError::EmptyColumn {
            column: column.to_string(),
        });
    }
    Ok(table)
}

pub(crate) fn bar(ctx: &RenderContext<'_>, columns: &[String]) -> Result<ChartBody> {
    let column = only_column(columns)?;
    let bars = counts(ctx, column)?
        .entries
        .into_iter()
        .map(|e| BarEntry {
            label: e.value,
            count: e.count,
        })
        .collect();
    Ok(ChartBody::Bar(BarChart { bars }))
}

pub(crate) fn pie(ctx: &RenderContext<'_>, columns: &[String]) -> Result<ChartBody> {
    let column = only_column(columns)?;
    let table = counts(ctx, column)?;
    let total = table.total() as f64;

    let slices = table
        .entries
        .into_iter()
        .map(|e| {
            let fraction = e.count as f64 / total;
            PieSlice {
                label: e.value,
                count: e.count,
                fraction,
                percent_label: format!("{:.1}%", fraction * 100.0),
            }
        })
        .collect();
    Ok(ChartBody::Pie(PieChart { slices }))
}

pub(crate) fn line(ctx: &RenderContext<'_>, columns: &[String]) -> Result<ChartBody> {
    let column = only_column(columns)?;
    let points: Vec<LinePoint> = ctx
        .dataset
        .table()
        .numeric_values(column)?
        .into_iter()
        .enumerate()
        .filter_map(|(index, v)| v.map(|value| LinePoint { index, value }))
        .collect();

    if points.is_empty() {
        return Err(EdaError::EmptyColumn {
            column: column.to_string(),
        });
    }
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    ensure_finite(column, &values)?;
    Ok(ChartBody::Line(LineChart { points }))
}

pub(crate) fn histogram(ctx: &RenderContext<'_>, columns: &[String]) -> Result<ChartBody> {
    let column = only_column(columns)?;
    let values = finite_values(ctx, column)?;
    let histogram = Histogram::from_values(&values, ctx.config.max_bins).ok_or_else(|| {
        EdaError::EmptyColumn {
            column: column.to_string(),
        }
    })?;

    let kde = gaussian_kde(&values, ctx.config.density_points, ctx.config.density_cut);
    debug!(
        column = %column,
        bins = histogram.bins.len(),
        bandwidth = ?kde.as_ref().map(|c| c.bandwidth),
        "Built histogram"
    );

    Ok(ChartBody::Histogram(HistogramChart {
        bandwidth: kde.as_ref().map(|c| c.bandwidth),
        density: kde.map(|c| c.scaled_to_counts(values.len(), histogram.bin_width)),
        bin_width: histogram.bin_width,
        bins: histogram.bins,
    }))
}

pub(crate) fn box_plot(ctx: &RenderContext<'_>, columns: &[String]) -> Result<ChartBody> {
    let column = only_column(columns)?;
    let values = finite_values(ctx, column)?;
    let ordered = sorted(&values);
    let quartiles = Quartiles::from_sorted(&ordered).ok_or_else(|| EdaError::EmptyColumn {
        column: column.to_string(),
    })?;
    let (lo, hi) = quartiles.fences(ctx.config.whisker_multiplier);

    let lower_whisker = ordered
        .iter()
        .copied()
        .find(|v| *v >= lo)
        .unwrap_or(quartiles.q1);
    let upper_whisker = ordered
        .iter()
        .rev()
        .copied()
        .find(|v| *v <= hi)
        .unwrap_or(quartiles.q3);
    let outliers = values.iter().copied().filter(|v| *v < lo || *v > hi).collect();

    Ok(ChartBody::BoxPlot(BoxPlotChart {
        stats: BoxStats {
            min: quartiles.min,
            q1: quartiles.q1,
            median: quartiles.median,
            q3: quartiles.q3,
            max: quartiles.max,
            lower_whisker,
            upper_whisker,
        },
        outliers,
    }))
}

pub(crate) fn scatter(ctx: &RenderContext<'_>, columns: &[String]) -> Result<ChartBody> {
    let [x_col, y_col] = columns else {
        return Err(EdaError::InvalidRequest(format!(
            "expected two columns, got {}",
            columns.len()
        )));
    };
    let table = ctx.dataset.table();
    let xs = table.numeric_values(x_col)?;
    let ys = table.numeric_values(y_col)?;

    let points: Vec<ScatterPoint> = xs
        .into_iter()
        .zip(ys)
        .filter_map(|pair| match pair {
            (Some(x), Some(y)) => Some(ScatterPoint { x, y }),
            _ => None,
        })
        .collect();

    if points.is_empty() {
        return Err(EdaError::EmptyColumn {
            column: format!("{x_col}/{y_col}"),
        });
    }
    if let Some(p) = points.iter().find(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(EdaError::InvalidRequest(format!(
            "non-finite point ({}, {})",
            p.x, p.y
        )));
    }
    Ok(ChartBody::Scatter(ScatterChart { points }))
}

pub(crate) fn heatmap(ctx: &RenderContext<'_>, columns: &[String]) -> Result<ChartBody> {
    let table = ctx.dataset.table();
    let mut data = Vec::with_capacity(columns.len());
    for column in columns {
        let values = table.numeric_values(column)?;
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return Err(EdaError::EmptyColumn {
                column: column.clone(),
            });
        }
        ensure_finite(column, &present)?;
        data.push((column.clone(), values));
    }

    let matrix = correlation_matrix(&data);
    let decimals = ctx.config.annotation_decimals;
    let annotations = matrix
        .values
        .iter()
        .map(|row| {
            row.iter()
                .map(|v| {
                    if v.is_nan() {
                        "nan".to_string()
                    } else {
                        format!("{v:.decimals$}")
                    }
                })
                .collect()
        })
        .collect();

    Ok(ChartBody::Heatmap(HeatmapChart {
        matrix,
        annotations,
    }))
}
