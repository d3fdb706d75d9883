//! Calendar resampling of a numeric column over a datetime column.
//!
//! Periods are aligned with `date_trunc`, so a period starts at midnight
//! (day), Monday (week), the 1st (month), Jan/Apr/Jul/Oct 1st (quarter) or
//! Jan 1st (year). Rows with a missing date or metric are ignored.

use std::fmt;
use std::str::FromStr;

use arrow::array::{Array, Float64Array, Int64Array, TimestampMillisecondArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, TimeUnit};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::analyzers::inference::within_nanosecond_range;
use crate::analyzers::types::ColumnType;
use crate::core::{Dataset, DATA_TABLE};
use crate::error::{EdaError, ErrorContext, Result};
use crate::security::SqlSecurity;

/// Calendar frequency of a resampling request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Frequency {
    pub const ALL: [Frequency; 5] = [
        Frequency::Day,
        Frequency::Week,
        Frequency::Month,
        Frequency::Quarter,
        Frequency::Year,
    ];

    /// Unit name understood by `date_trunc`.
    pub fn trunc_unit(&self) -> &'static str {
        match self {
            Frequency::Day => "day",
            Frequency::Week => "week",
            Frequency::Month => "month",
            Frequency::Quarter => "quarter",
            Frequency::Year => "year",
        }
    }

    /// Short code (`D`, `W`, `M`, `Q`, `Y`).
    pub fn code(&self) -> &'static str {
        match self {
            Frequency::Day => "D",
            Frequency::Week => "W",
            Frequency::Month => "M",
            Frequency::Quarter => "Q",
            Frequency::Year => "Y",
        }
    }

    /// Start of the period containing `value`, as `date_trunc` computes it.
    pub fn period_start(&self, value: NaiveDateTime) -> Option<NaiveDateTime> {
        let date = value.date();
        let start = match self {
            Frequency::Day => Some(date),
            Frequency::Week => {
                let since_monday = date.weekday().num_days_from_monday();
                date.checked_sub_signed(Duration::days(since_monday.into()))
            }
            Frequency::Month => date.with_day(1),
            Frequency::Quarter => {
                NaiveDate::from_ymd_opt(date.year(), (date.month0() / 3) * 3 + 1, 1)
            }
            Frequency::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
        }?;
        start.and_hms_opt(0, 0, 0)
    }

    /// Start of the period following the one starting at `start`.
    pub fn next_period(&self, start: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Frequency::Day => start.checked_add_signed(Duration::days(1)),
            Frequency::Week => start.checked_add_signed(Duration::weeks(1)),
            Frequency::Month => start.checked_add_months(Months::new(1)),
            Frequency::Quarter => start.checked_add_months(Months::new(3)),
            Frequency::Year => start.checked_add_months(Months::new(12)),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.trunc_unit())
    }
}

impl FromStr for Frequency {
    type Err = EdaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d" | "day" | "daily" => Ok(Frequency::Day),
            "w" | "week" | "weekly" => Ok(Frequency::Week),
            "m" | "ms" | "me" | "month" | "monthly" => Ok(Frequency::Month),
            "q" | "qs" | "qe" | "quarter" | "quarterly" => Ok(Frequency::Quarter),
            "y" | "a" | "ys" | "ye" | "year" | "yearly" | "annual" => Ok(Frequency::Year),
            other => Err(EdaError::InvalidRequest(format!(
                "unknown resampling frequency '{other}' (expected D, W, M, Q or Y)"
            ))),
        }
    }
}

/// What to do with calendar periods that contain no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmptyPeriodPolicy {
    /// Only periods with data are emitted.
    #[default]
    Omit,
    /// Every period between the first and last populated one is emitted;
    /// empty periods have a NaN mean and a zero row count.
    Fill,
}

/// A resampling request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResampleSpec {
    pub date_column: String,
    pub metric_column: String,
    pub frequency: Frequency,
}

impl ResampleSpec {
    pub fn new(
        date_column: impl Into<String>,
        metric_column: impl Into<String>,
        frequency: Frequency,
    ) -> Self {
        Self {
            date_column: date_column.into(),
            metric_column: metric_column.into(),
            frequency,
        }
    }
}

/// One period of a resampled series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResampledPoint {
    pub period_start: NaiveDateTime,
    /// Mean of the metric over the period, NaN for a filled empty period
    pub mean: f64,
    pub row_count: u64,
}

/// Chronologically ordered period means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResampledSeries {
    pub date_column: String,
    pub metric_column: String,
    pub frequency: Frequency,
    pub points: Vec<ResampledPoint>,
}

impl ResampledSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Rows aggregated across all periods.
    pub fn total_rows(&self) -> u64 {
        self.points.iter().map(|p| p.row_count).sum()
    }

    /// Mean of the period means weighted by their row counts.
    pub fn weighted_mean(&self) -> Option<f64> {
        let total = self.total_rows();
        if total == 0 {
            return None;
        }
        let weighted: f64 = self
            .points
            .iter()
            .filter(|p| p.row_count > 0)
            .map(|p| p.mean * p.row_count as f64)
            .sum();
        Some(weighted / total as f64)
    }
}

/// Resamples numeric columns of a [`Dataset`] by calendar period.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesResampler {
    empty_periods: EmptyPeriodPolicy,
}

impl TimeSeriesResampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_empty_periods(mut self, policy: EmptyPeriodPolicy) -> Self {
        self.empty_periods = policy;
        self
    }

    pub fn empty_periods(&self) -> EmptyPeriodPolicy {
        self.empty_periods
    }

    /// Mean of `metric_column` per calendar period of `date_column`.
    #[instrument(skip(self, dataset), fields(frequency = %spec.frequency))]
    pub async fn resample(&self, dataset: &Dataset, spec: &ResampleSpec) -> Result<ResampledSeries> {
        let classification = dataset.classification();
        if classification.columns_of(ColumnType::Datetime).is_empty() {
            return Err(EdaError::NoEligibleColumns {
                chart: "time series resampling".to_string(),
                required: ColumnType::Datetime.to_string(),
            });
        }
        dataset.require_type(&spec.date_column, ColumnType::Datetime)?;
        dataset.require_type(&spec.metric_column, ColumnType::Numeric)?;

        ensure_truncatable(dataset, spec)?;

        let sql = resample_sql(spec)?;
        debug!(sql = %sql, "Running resample query");
        let batches = dataset.context().sql(&sql).await?.collect().await?;

        let mut points = Vec::new();
        for batch in &batches {
            let starts = cast(
                batch.column(0),
                &DataType::Timestamp(TimeUnit::Millisecond, None),
            )
            .context("converting period starts")?;
            let starts = downcast::<TimestampMillisecondArray>(&starts, "period_start")?;
            let means = downcast::<Float64Array>(batch.column(1), "mean_value")?;
            let counts = downcast::<Int64Array>(batch.column(2), "row_count")?;

            for i in 0..batch.num_rows() {
                if starts.is_null(i) || means.is_null(i) {
                    continue;
                }
                let period_start = DateTime::from_timestamp_millis(starts.value(i))
                    .ok_or_else(|| {
                        EdaError::Internal(format!("period start out of range: {}", starts.value(i)))
                    })?
                    .naive_utc();
                points.push(ResampledPoint {
                    period_start,
                    mean: means.value(i),
                    row_count: counts.value(i).max(0) as u64,
                });
            }
        }

        if points.is_empty() {
            return Err(EdaError::EmptyMetric {
                metric: spec.metric_column.clone(),
                frequency: spec.frequency.to_string(),
            });
        }

        if self.empty_periods == EmptyPeriodPolicy::Fill {
            points = fill_empty_periods(points, spec.frequency);
        }

        info!(
            date_column = %spec.date_column,
            metric_column = %spec.metric_column,
            periods = points.len(),
            "Completed resampling"
        );

        Ok(ResampledSeries {
            date_column: spec.date_column.clone(),
            metric_column: spec.metric_column.clone(),
            frequency: spec.frequency,
            points,
        })
    }
}

/// `date_trunc` works in nanoseconds; every date and period start must fit.
fn ensure_truncatable(dataset: &Dataset, spec: &ResampleSpec) -> Result<()> {
    let stamps = dataset.table().timestamp_values(&spec.date_column)?;
    let present = stamps.iter().flatten().copied();
    let (Some(min), Some(max)) = (present.clone().min(), present.max()) else {
        return Ok(());
    };

    let as_datetime = |ms: i64| DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc());
    let earliest = as_datetime(min).and_then(|dt| spec.frequency.period_start(dt));
    let latest = as_datetime(max);
    let fits = |dt: Option<NaiveDateTime>| dt.as_ref().is_some_and(within_nanosecond_range);

    if fits(earliest) && fits(latest) {
        Ok(())
    } else {
        Err(EdaError::InvalidRequest(format!(
            "dates in '{}' fall outside the range supported for {} resampling",
            spec.date_column, spec.frequency
        )))
    }
}

fn resample_sql(spec: &ResampleSpec) -> Result<String> {
    let date = SqlSecurity::escape_identifier(&spec.date_column)?;
    let metric = SqlSecurity::escape_identifier(&spec.metric_column)?;
    let unit = spec.frequency.trunc_unit();

    Ok(format!(
        "SELECT period_start, AVG(metric) AS mean_value, COUNT(metric) AS row_count \
         FROM (SELECT date_trunc('{unit}', {date}) AS period_start, CAST({metric} AS DOUBLE) AS metric \
               FROM {DATA_TABLE} WHERE {date} IS NOT NULL AND {metric} IS NOT NULL) \
         GROUP BY period_start ORDER BY period_start"
    ))
}

fn downcast<'a, T: 'static>(array: &'a dyn Array, name: &str) -> Result<&'a T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| EdaError::Internal(format!("unexpected type for {name}: {}", array.data_type())))
}

/// Inserts NaN periods between populated ones. `points` must be sorted.
fn fill_empty_periods(points: Vec<ResampledPoint>, frequency: Frequency) -> Vec<ResampledPoint> {
    let mut filled = Vec::with_capacity(points.len());
    let mut iter = points.into_iter().peekable();

    while let Some(point) = iter.next() {
        let mut cursor = frequency.next_period(point.period_start);
        filled.push(point);

        if let Some(next) = iter.peek() {
            while let Some(start) = cursor {
                if start >= next.period_start {
                    break;
                }
                filled.push(ResampledPoint {
                    period_start: start,
                    mean: f64::NAN,
                    row_count: 0,
                });
                cursor = frequency.next_period(start);
            }
        }
    }
    filled
}
