// File: crates/chart-data/tests/option.rs
// Purpose: Chart option parsing, series resolution and end-to-end series data building.

use chart_data::{ChartModel, ChartOption, CoordinateSystemRegistry, DataError, SeriesData};
use serde_json::json;

fn build(option: serde_json::Value) -> Result<Vec<SeriesData>, DataError> {
    let option = ChartOption::from_json_value(option)?;
    let model = ChartModel::from_option(&option)?;
    model.build_series_data(&CoordinateSystemRegistry::with_builtin())
}

#[test]
fn dataset_columns_are_shared_out_to_series() {
    let all = build(json!({
        "dataset": {
            "source": [
                ["product", "2015", "2016", "2017"],
                ["Matcha", 43.3, 85.8, 93.7],
                ["Milk", 83.1, 73.4, 55.1],
                ["Cheese", 86.4, 65.2, 82.5]
            ]
        },
        "xAxis": { "type": "category" },
        "yAxis": {},
        "series": [{ "type": "bar" }, { "type": "bar" }, { "type": "bar" }]
    }))
    .unwrap();

    assert_eq!(all.len(), 3);
    assert_eq!(all[0].map_dimension("x", 0), Some("product"));
    assert_eq!(all[0].map_dimension("y", 0), Some("2015"));
    assert_eq!(all[1].map_dimension("y", 0), Some("2016"));
    assert_eq!(all[2].map_dimension("y", 0), Some("2017"));
    assert_eq!(all[2].get("2017", 0), 93.7);
    assert_eq!(all[1].get("product", 2), 2.0);
    assert_eq!(all[0].name(0), Some("Matcha"));
    assert_eq!(all[2].name(2), Some("Cheese"));
}

#[test]
fn series_layout_by_row() {
    let all = build(json!({
        "dataset": {
            "source": [
                ["product", "Matcha", "Milk"],
                ["2015", 43.3, 83.1],
                ["2016", 85.8, 73.4]
            ]
        },
        "xAxis": { "type": "category" },
        "yAxis": {},
        "series": [
            { "type": "bar", "seriesLayoutBy": "row" },
            { "type": "bar", "seriesLayoutBy": "row" }
        ]
    }))
    .unwrap();

    assert_eq!(all[0].count(), 2);
    assert_eq!(all[0].map_dimension("y", 0), Some("2015"));
    assert_eq!(all[1].get("2016", 1), 73.4);
    assert_eq!(all[1].name(0), Some("Matcha"));
}

#[test]
fn explicit_encode_and_dimensions_on_series() {
    let all = build(json!({
        "dataset": { "source": [["a", 1, 10], ["b", 2, 20]] },
        "xAxis": { "type": "category" },
        "yAxis": { "type": "value" },
        "series": [{
            "type": "line",
            "dimensions": ["name", "low", "high"],
            "encode": { "x": "name", "y": "high" }
        }]
    }))
    .unwrap();

    assert_eq!(all[0].map_dimension("y", 0), Some("high"));
    assert_eq!(all[0].get("high", 1), 20.0);
    assert_eq!(all[0].dimension_info("low").map(|d| d.coord_dim.as_str()), Some("value"));
}

#[test]
fn stacked_lines_from_series_data() {
    let all = build(json!({
        "xAxis": { "type": "category", "data": ["Mon", "Tue", "Wed"] },
        "yAxis": { "type": "value" },
        "series": [
            { "type": "line", "stack": "total", "data": [1, 2, 3] },
            { "type": "line", "stack": "total", "data": [10, 20, 30] }
        ]
    }))
    .unwrap();

    let result = all[1].calculation_info().stack_result_dimension.clone().unwrap();
    assert_eq!(all[1].get(&result, 2), 33.0);
    assert_eq!(all[1].name(0), Some("Mon"));
    assert_eq!(all[1].series_id(), "series1");
}

#[test]
fn polar_series_with_category_angle() {
    let all = build(json!({
        "radiusAxis": {},
        "angleAxis": { "type": "category", "data": ["a", "b"] },
        "series": [{ "type": "bar", "coordinateSystem": "polar", "data": [3, 4] }]
    }))
    .unwrap();

    assert_eq!(all[0].dimension_names(), vec!["radius", "angle"]);
    assert_eq!(all[0].get("angle", 1), 1.0);
    assert_eq!(all[0].get("radius", 1), 4.0);
    assert_eq!(all[0].name(1), Some("b"));
}

#[test]
fn series_without_axes_use_registry() {
    let all = build(json!({
        "series": [{ "type": "scatter", "coordinateSystem": "geo", "data": [[120.1, 30.2, 5]] }]
    }))
    .unwrap();
    assert_eq!(all[0].dimension_names(), vec!["lng", "lat", "value"]);
}

#[test]
fn missing_axis_is_an_error() {
    let err = build(json!({ "series": [{ "type": "line", "data": [1, 2] }] })).unwrap_err();
    assert!(matches!(err, DataError::UnknownAxis { kind: "xAxis", index: 0, .. }));
}

#[test]
fn missing_dataset_is_an_error() {
    let err = build(json!({
        "dataset": [{ "source": [[1, 2]] }],
        "xAxis": {},
        "yAxis": {},
        "series": [{ "type": "line", "datasetIndex": 3 }]
    }))
    .unwrap_err();
    assert!(matches!(err, DataError::InvalidSource(_)));
}

#[test]
fn unknown_coordinate_system_is_an_error() {
    let err = build(json!({ "series": [{ "type": "scatter", "coordinateSystem": "ternary", "data": [] }] }))
        .unwrap_err();
    assert!(matches!(err, DataError::UnsupportedCoordinateSystem { .. }));
}

#[test]
fn axis_lists_accept_one_or_many() {
    let option = ChartOption::from_json_str(
        r#"{ "xAxis": [{ "type": "category" }, { "type": "value" }], "yAxis": { "type": "log" } }"#,
    )
    .unwrap();
    assert_eq!(option.x_axis.len(), 2);
    assert_eq!(option.y_axis.len(), 1);
    assert!(option.series.is_empty());
}

#[test]
fn malformed_json_is_reported() {
    assert!(matches!(ChartOption::from_json_str("{ \"series\": ["), Err(DataError::Json(_))));
}
