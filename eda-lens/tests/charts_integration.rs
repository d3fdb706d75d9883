//! Integration tests for chart selection and rendering.

use eda_lens::analyzers::inference::TypeClassifier;
use eda_lens::charts::{
    spec_for, ChartBody, ChartConfig, ChartKind, ChartRenderer, ChartRequest, ChartSelector,
};
use eda_lens::core::{Dataset, Table};
use eda_lens::error::{EdaError, Severity};
use eda_lens::sources::{parse_csv, CsvOptions};

fn dataset(csv: &str) -> Dataset {
    let raw = parse_csv(csv.as_bytes(), &CsvOptions::default()).unwrap();
    let classifier = TypeClassifier::new();
    let classification = classifier.classify(&raw).unwrap();
    let table = Table::from_raw("test.csv", &raw, &classification, &classifier).unwrap();
    Dataset::new(table, classification).unwrap()
}

const DISEASES: &str = "\
state,year,count,population
ALABAMA,1928,8843,2589923
ALABAMA,1929,2959,2619131
ALASKA,1951,1074,136211
ARIZONA,1928,383,431264
ARIZONA,1929,1213,443542
";

#[test]
fn test_every_kind_renders_on_a_mixed_table() {
    let ds = dataset(DISEASES);
    let selector = ChartSelector::new();
    let renderer = ChartRenderer::default();

    for kind in ChartKind::ALL {
        let eligible = selector.select(ds.classification(), kind).unwrap();
        let request = match spec_for(kind).arity {
            eda_lens::charts::Arity::Exactly(1) => ChartRequest::single(kind, &eligible[0]),
            eda_lens::charts::Arity::Exactly(_) => ChartRequest::new(kind, &eligible[..2]),
            eda_lens::charts::Arity::AllOfType { .. } => ChartRequest::heatmap(),
        };
        let chart = renderer.render(&ds, &request).unwrap();
        assert_eq!(chart.kind, kind);
        assert_eq!(chart.body.kind(), kind);
    }
}

#[test]
fn test_selection_follows_classification() {
    let ds = dataset("region,cases\nA,1\nA,2\nB,3\nC,4\nA,100\n");
    let selector = ChartSelector::new();

    assert_eq!(
        selector.select(ds.classification(), ChartKind::Bar).unwrap(),
        vec!["region"]
    );
    assert_eq!(
        selector.select(ds.classification(), ChartKind::Scatter).unwrap(),
        vec!["cases"]
    );

    let categorical_only = dataset("region\nA\nB\n");
    let err = selector
        .select(categorical_only.classification(), ChartKind::Scatter)
        .unwrap_err();
    assert!(matches!(err, EdaError::NoEligibleColumns { .. }));
    assert_eq!(err.severity(), Severity::Reprompt);
}

#[test]
fn test_heatmap_with_one_numeric_column() {
    let ds = dataset("region,cases\nA,1\nB,2\n");
    let err = ChartRenderer::default()
        .render(&ds, &ChartRequest::heatmap())
        .unwrap_err();
    assert!(matches!(
        err,
        EdaError::InsufficientColumns {
            required: 2,
            found: 1,
            ..
        }
    ));
    assert_eq!(
        err.user_message().text,
        "Need at least 2 numeric columns for heatmap"
    );
}

#[test]
fn test_heatmap_matrix_is_symmetric() {
    let ds = dataset(DISEASES);
    let chart = ChartRenderer::default()
        .render(&ds, &ChartRequest::heatmap())
        .unwrap();
    let ChartBody::Heatmap(heatmap) = chart.body else {
        panic!("expected heatmap");
    };
    let matrix = &heatmap.matrix;
    assert_eq!(matrix.columns, vec!["year", "count", "population"]);
    for i in 0..matrix.size() {
        assert_eq!(matrix.values[i][i], 1.0);
        assert_eq!(heatmap.annotations[i][i], "1.00");
        for j in 0..matrix.size() {
            assert_eq!(matrix.values[i][j], matrix.values[j][i]);
            assert!(matrix.values[i][j].abs() <= 1.0);
        }
    }
}

#[test]
fn test_heatmap_constant_column_reads_nan() {
    let ds = dataset("a,b\n1,5\n2,5\n3,5\n");
    let chart = ChartRenderer::default()
        .render(&ds, &ChartRequest::heatmap())
        .unwrap();
    let ChartBody::Heatmap(heatmap) = chart.body else {
        panic!("expected heatmap");
    };
    assert_eq!(heatmap.annotations[0][1], "nan");
    assert!(heatmap.matrix.get("a", "b").unwrap().is_nan());
}

#[test]
fn test_annotation_decimals_are_configurable() {
    let ds = dataset("a,b\n1,2\n2,4\n3,6\n");
    let renderer = ChartRenderer::new(ChartConfig {
        annotation_decimals: 3,
        ..Default::default()
    });
    let chart = renderer.render(&ds, &ChartRequest::heatmap()).unwrap();
    let ChartBody::Heatmap(heatmap) = chart.body else {
        panic!("expected heatmap");
    };
    assert_eq!(heatmap.annotations[0][1], "1.000");
}

#[test]
fn test_histogram_bins_cover_all_values() {
    let csv: String = std::iter::once("value".to_string())
        .chain((0..500).map(|i| format!("{}", (i * 37) % 101)))
        .collect::<Vec<_>>()
        .join("\n");
    let ds = dataset(&csv);
    let chart = ChartRenderer::default()
        .render(&ds, &ChartRequest::single(ChartKind::Histogram, "value"))
        .unwrap();
    let ChartBody::Histogram(hist) = chart.body else {
        panic!("expected histogram");
    };
    assert!(hist.bins.len() <= 100);
    assert_eq!(hist.bins.iter().map(|b| b.count).sum::<u64>(), 500);
    assert_eq!(hist.bins.first().unwrap().lower, 0.0);
    assert_eq!(hist.bins.last().unwrap().upper, 100.0);
}

#[test]
fn test_constant_histogram_has_one_bin_and_no_density() {
    let ds = dataset("value\n4\n4\n4\n");
    let chart = ChartRenderer::default()
        .render(&ds, &ChartRequest::single(ChartKind::Histogram, "value"))
        .unwrap();
    let ChartBody::Histogram(hist) = chart.body else {
        panic!("expected histogram");
    };
    assert_eq!(hist.bins.len(), 1);
    assert_eq!(hist.bins[0].count, 3);
    assert!(hist.density.is_none());
}

#[test]
fn test_non_finite_values_are_render_errors() {
    let ds = dataset("value\n1\ninf\n3\n");
    let err = ChartRenderer::default()
        .render(&ds, &ChartRequest::single(ChartKind::Histogram, "value"))
        .unwrap_err();
    assert!(matches!(err, EdaError::Render { .. }));
    assert!(std::error::Error::source(&err).is_some());
    assert!(err
        .user_message()
        .text
        .starts_with("Visualization error (Histogram)"));
}

#[test]
fn test_empty_numeric_column_is_a_render_error() {
    let ds = dataset("a,b\n1,NA\n2,NA\n");
    let err = ChartRenderer::default()
        .render(&ds, &ChartRequest::single(ChartKind::BoxPlot, "b"))
        .unwrap_err();
    assert!(matches!(err, EdaError::Render { .. }));
}

#[test]
fn test_heatmap_with_empty_numeric_column_is_a_render_error() {
    let ds = dataset("a,b,c\n1,NA,3\n2,NA,5\n3,NA,4\n");
    let err = ChartRenderer::default()
        .render(&ds, &ChartRequest::heatmap())
        .unwrap_err();
    match &err {
        EdaError::Render { chart, source, .. } => {
            assert_eq!(chart, "Heatmap");
            let cause = source
                .as_ref()
                .and_then(|s| s.downcast_ref::<EdaError>())
                .unwrap();
            assert!(matches!(cause, EdaError::EmptyColumn { column } if column == "b"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_wrong_selection_is_not_wrapped() {
    let ds = dataset(DISEASES);
    let err = ChartRenderer::default()
        .render(&ds, &ChartRequest::single(ChartKind::Pie, "count"))
        .unwrap_err();
    assert!(matches!(err, EdaError::TypeMismatch { .. }));
}

#[test]
fn test_chart_serializes_with_body_tag() {
    let ds = dataset("region\nA\nA\nB\n");
    let chart = ChartRenderer::default()
        .render(&ds, &ChartRequest::single(ChartKind::Pie, "region"))
        .unwrap();
    let json = serde_json::to_value(&chart).unwrap();
    assert_eq!(json["body"]["type"], "pie");
    assert_eq!(json["body"]["slices"][0]["percent_label"], "66.7%");
}
