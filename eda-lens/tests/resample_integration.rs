//! Integration tests for calendar resampling.

use chrono::{NaiveDate, NaiveDateTime};
use eda_lens::analyzers::inference::TypeClassifier;
use eda_lens::analyzers::{
    ColumnType, EmptyPeriodPolicy, Frequency, ResampleSpec, TimeSeriesResampler,
};
use eda_lens::core::{Dataset, Table};
use eda_lens::error::EdaError;
use eda_lens::sources::{parse_csv, CsvOptions};

fn dataset(csv: &str) -> Dataset {
    let raw = parse_csv(csv.as_bytes(), &CsvOptions::default()).unwrap();
    let classifier = TypeClassifier::new();
    let classification = classifier.classify(&raw).unwrap();
    let table = Table::from_raw("test.csv", &raw, &classification, &classifier).unwrap();
    Dataset::new(table, classification).unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

// 2024-01-01 is a Monday
const WEEKLY: &str = "\
week,state,cases
2024-01-03,Alaska,20
2024-01-01,Alabama,10
2024-01-08,Alabama,30
2024-01-10,Alaska,
2024-01-22,Alabama,40
2024-02-05,Alaska,50
";

#[tokio::test]
async fn test_weekly_means_start_on_monday() {
    let ds = dataset(WEEKLY);
    let series = TimeSeriesResampler::new()
        .resample(&ds, &ResampleSpec::new("week", "cases", Frequency::Week))
        .await
        .unwrap();

    let got: Vec<_> = series
        .points
        .iter()
        .map(|p| (p.period_start, p.mean, p.row_count))
        .collect();
    assert_eq!(
        got,
        vec![
            (day(2024, 1, 1), 15.0, 2),
            (day(2024, 1, 8), 30.0, 1),
            (day(2024, 1, 22), 40.0, 1),
            (day(2024, 2, 5), 50.0, 1),
        ]
    );
}

#[tokio::test]
async fn test_fill_inserts_nan_periods() {
    let ds = dataset(WEEKLY);
    let series = TimeSeriesResampler::new()
        .with_empty_periods(EmptyPeriodPolicy::Fill)
        .resample(&ds, &ResampleSpec::new("week", "cases", Frequency::Week))
        .await
        .unwrap();

    let starts: Vec<_> = series.points.iter().map(|p| p.period_start).collect();
    assert_eq!(
        starts,
        vec![
            day(2024, 1, 1),
            day(2024, 1, 8),
            day(2024, 1, 15),
            day(2024, 1, 22),
            day(2024, 1, 29),
            day(2024, 2, 5),
        ]
    );
    let empty = &series.points[2];
    assert!(empty.mean.is_nan());
    assert_eq!(empty.row_count, 0);
    assert_eq!(series.total_rows(), 5);
}

#[tokio::test]
async fn test_monthly_quarterly_and_yearly_periods() {
    let ds = dataset(WEEKLY);
    let resampler = TimeSeriesResampler::new();

    let monthly = resampler
        .resample(&ds, &ResampleSpec::new("week", "cases", Frequency::Month))
        .await
        .unwrap();
    let got: Vec<_> = monthly.points.iter().map(|p| (p.period_start, p.mean)).collect();
    assert_eq!(got, vec![(day(2024, 1, 1), 25.0), (day(2024, 2, 1), 50.0)]);

    let quarterly = resampler
        .resample(&ds, &ResampleSpec::new("week", "cases", Frequency::Quarter))
        .await
        .unwrap();
    assert_eq!(quarterly.len(), 1);
    assert_eq!(quarterly.points[0].mean, 30.0);

    let yearly = resampler
        .resample(&ds, &ResampleSpec::new("week", "cases", Frequency::Year))
        .await
        .unwrap();
    assert_eq!(yearly.points[0].period_start, day(2024, 1, 1));
}

#[tokio::test]
async fn test_daily_weighted_mean_matches_overall_mean() {
    let ds = dataset(WEEKLY);
    let series = TimeSeriesResampler::new()
        .resample(&ds, &ResampleSpec::new("week", "cases", Frequency::Day))
        .await
        .unwrap();
    assert_eq!(series.len(), 5);
    let weighted = series.weighted_mean().unwrap();
    assert!((weighted - 30.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_timestamps_truncate_to_midnight() {
    let ds = dataset("at,v\n2024-03-05 08:00:00,1\n2024-03-05 20:30:00,3\n2024-03-06 01:00:00,5\n");
    let series = TimeSeriesResampler::new()
        .resample(&ds, &ResampleSpec::new("at", "v", Frequency::Day))
        .await
        .unwrap();
    let got: Vec<_> = series.points.iter().map(|p| (p.period_start, p.mean)).collect();
    assert_eq!(got, vec![(day(2024, 3, 5), 2.0), (day(2024, 3, 6), 5.0)]);
}

#[tokio::test]
async fn test_resample_errors() {
    let resampler = TimeSeriesResampler::new();

    let no_dates = dataset("region,cases\nA,1\n");
    let err = resampler
        .resample(&no_dates, &ResampleSpec::new("region", "cases", Frequency::Day))
        .await
        .unwrap_err();
    assert!(matches!(err, EdaError::NoEligibleColumns { .. }));

    let ds = dataset(WEEKLY);
    let err = resampler
        .resample(&ds, &ResampleSpec::new("week", "state", Frequency::Day))
        .await
        .unwrap_err();
    assert!(matches!(err, EdaError::TypeMismatch { .. }));

    let err = resampler
        .resample(&ds, &ResampleSpec::new("cases", "cases", Frequency::Day))
        .await
        .unwrap_err();
    assert!(matches!(err, EdaError::TypeMismatch { .. }));

    let no_metric = dataset("week,cases\n2024-01-01,NA\n2024-01-02,\n");
    let err = resampler
        .resample(&no_metric, &ResampleSpec::new("week", "cases", Frequency::Week))
        .await
        .unwrap_err();
    assert!(matches!(err, EdaError::EmptyMetric { .. }));
}

#[tokio::test]
async fn test_dates_beyond_nanosecond_range_do_not_resample() {
    let resampler = TimeSeriesResampler::new();

    for csv in [
        "d,v\n2300-01-01,1\n2300-01-05,3\n2300-02-01,5\n",
        "d,v\n1500-01-01,1\n1500-01-05,3\n1500-02-01,5\n",
    ] {
        let ds = dataset(csv);
        assert_eq!(ds.classification().get("d"), Some(ColumnType::Categorical));
        let err = resampler
            .resample(&ds, &ResampleSpec::new("d", "v", Frequency::Month))
            .await
            .unwrap_err();
        assert!(matches!(err, EdaError::NoEligibleColumns { .. }));
    }
}

#[tokio::test]
async fn test_period_start_before_nanosecond_range_is_rejected() {
    let ds = dataset("d,v\n1677-09-22,1\n1677-10-03,2\n");
    assert_eq!(ds.classification().get("d"), Some(ColumnType::Datetime));
    let resampler = TimeSeriesResampler::new();

    let err = resampler
        .resample(&ds, &ResampleSpec::new("d", "v", Frequency::Month))
        .await
        .unwrap_err();
    assert!(matches!(err, EdaError::InvalidRequest(_)));

    let daily = resampler
        .resample(&ds, &ResampleSpec::new("d", "v", Frequency::Day))
        .await
        .unwrap();
    assert_eq!(daily.points[0].period_start, day(1677, 9, 22));
}

#[test]
fn test_frequency_codes() {
    assert_eq!("W".parse::<Frequency>().unwrap(), Frequency::Week);
    assert_eq!("quarter".parse::<Frequency>().unwrap(), Frequency::Quarter);
    assert_eq!("A".parse::<Frequency>().unwrap(), Frequency::Year);
    assert!(matches!(
        "fortnight".parse::<Frequency>(),
        Err(EdaError::InvalidRequest(_))
    ));
}
