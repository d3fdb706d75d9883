//! Chart kind registry and column selection.

use tracing::debug;

use crate::analyzers::types::{ColumnClassification, ColumnType};
use crate::charts::artifact::ChartBody;
use crate::charts::render::{self, RenderContext};
use crate::charts::{Arity, ChartKind, ChartRequest};
use crate::error::{EdaError, Result};

/// Builds the body of one chart kind from validated columns.
pub type RenderFn = fn(&RenderContext<'_>, &[String]) -> Result<ChartBody>;

/// Requirements and renderer of a chart kind.
#[derive(Clone, Copy)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub required: ColumnType,
    pub arity: Arity,
    pub render: RenderFn,
}

impl std::fmt::Debug for ChartSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartSpec")
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Registry entry for `kind`.
pub fn spec_for(kind: ChartKind) -> ChartSpec {
    let entry = |required: ColumnType, arity: Arity, render: RenderFn| ChartSpec {
        kind,
        required,
        arity,
        render,
    };
    match kind {
        ChartKind::Bar => entry(ColumnType::Categorical, Arity::Exactly(1), render::bar),
        ChartKind::Pie => entry(ColumnType::Categorical, Arity::Exactly(1), render::pie),
        ChartKind::Line => entry(ColumnType::Numeric, Arity::Exactly(1), render::line),
        ChartKind::Histogram => entry(ColumnType::Numeric, Arity::Exactly(1), render::histogram),
        ChartKind::BoxPlot => entry(ColumnType::Numeric, Arity::Exactly(1), render::box_plot),
        ChartKind::Scatter => entry(ColumnType::Numeric, Arity::Exactly(2), render::scatter),
        ChartKind::Heatmap => entry(
            ColumnType::Numeric,
            Arity::AllOfType { min: 2 },
            render::heatmap,
        ),
    }
}

/// Works out which columns a chart kind can use.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartSelector;

impl ChartSelector {
    pub fn new() -> Self {
        Self
    }

    /// Columns the user may pick for `kind`, in table order.
    ///
    /// For heatmaps this is the full set of columns that will be correlated, and
    /// too few of them is `InsufficientColumns` rather than `NoEligibleColumns`.
    pub fn select(
        &self,
        classification: &ColumnClassification,
        kind: ChartKind,
    ) -> Result<Vec<String>> {
        let spec = spec_for(kind);
        let eligible: Vec<String> = classification
            .columns_of(spec.required)
            .into_iter()
            .map(str::to_string)
            .collect();

        if let Arity::AllOfType { min } = spec.arity {
            if eligible.len() < min {
                return Err(EdaError::InsufficientColumns {
                    chart: kind.to_string(),
                    required: min,
                    found: eligible.len(),
                });
            }
        }
        if eligible.is_empty() {
            return Err(EdaError::NoEligibleColumns {
                chart: kind.to_string(),
                required: spec.required.to_string(),
            });
        }

        debug!(chart = %kind, eligible = eligible.len(), "Selected eligible columns");
        Ok(eligible)
    }

    /// Checks a request against the registry and returns the columns to render.
    pub fn validate(
        &self,
        classification: &ColumnClassification,
        request: &ChartRequest,
    ) -> Result<Vec<String>> {
        let spec = spec_for(request.kind);

        match spec.arity {
            Arity::Exactly(n) => {
                if request.columns.len() != n {
                    return Err(EdaError::InvalidRequest(format!(
                        "{} takes {}, got {}",
                        request.kind,
                        spec.arity,
                        request.columns.len()
                    )));
                }
                for column in &request.columns {
                    check_type(classification, column, spec.required)?;
                }
                Ok(request.columns.clone())
            }
            Arity::AllOfType { min } => {
                if request.columns.is_empty() {
                    return self.select(classification, request.kind);
                }
                for column in &request.columns {
                    check_type(classification, column, spec.required)?;
                }
                if request.columns.len() < min {
                    return Err(EdaError::InsufficientColumns {
                        chart: request.kind.to_string(),
                        required: min,
                        found: request.columns.len(),
                    });
                }
                Ok(request.columns.clone())
            }
        }
    }
}

fn check_type(
    classification: &ColumnClassification,
    column: &str,
    required: ColumnType,
) -> Result<()> {
    let found = classification.require(column)?;
    if found != required {
        return Err(EdaError::type_mismatch(column, required, found));
    }
    Ok(())
}
