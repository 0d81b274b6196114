// File: crates/chart-data/tests/source.rs
// Purpose: Dataset source detection (format, header, names) and ordinal guessing.

use chart_data::source::BeOrdinal;
use chart_data::value::RawCell;
use chart_data::{DataError, DimensionDefinition, DimensionType, SeriesLayout, Source, SourceFormat, SourceHeader};
use serde_json::{json, Value};

fn cell_f64(cell: RawCell<'_>) -> Option<f64> {
    match cell {
        RawCell::Json(Value::Number(n)) => n.as_f64(),
        RawCell::Number(n) => Some(n),
        _ => None,
    }
}

#[test]
fn array_rows_with_header_row() {
    let src = Source::from_dataset(
        json!([["product", "2015"], ["Matcha", 43.3], ["Milk", 83.1]]),
        SourceHeader::Auto,
        SeriesLayout::Column,
        None,
    )
    .unwrap();

    assert_eq!(src.format, SourceFormat::ArrayRows);
    assert_eq!(src.start_index, 1);
    assert_eq!(src.count(), 2);
    assert_eq!(src.dimension_names(), vec![Some("product"), Some("2015")]);
    assert_eq!(src.dimension_index("2015"), Some(1));
    assert_eq!(cell_f64(src.cell(1, 1, "")), Some(83.1));
}

#[test]
fn array_rows_by_row() {
    let src = Source::from_dataset(
        json!([["product", "Matcha", "Milk"], ["2015", 43.3, 83.1], ["2016", 85.8, 73.4]]),
        SourceHeader::Auto,
        SeriesLayout::Row,
        None,
    )
    .unwrap();

    assert_eq!(src.start_index, 1);
    assert_eq!(src.count(), 2);
    assert_eq!(src.dimension_names(), vec![Some("product"), Some("2015"), Some("2016")]);
    assert_eq!(cell_f64(src.cell(0, 2, "")), Some(85.8));
    assert_eq!(src.guess_ordinal(0), BeOrdinal::Must);
    assert_eq!(src.guess_ordinal(1), BeOrdinal::Not);
}

#[test]
fn numeric_first_row_is_not_a_header() {
    let src = Source::from_dataset(json!([[1, 2, 3], [4, 5, 6]]), SourceHeader::Auto, SeriesLayout::Column, None)
        .unwrap();
    assert_eq!(src.start_index, 0);
    assert_eq!(src.count(), 2);
    assert!(src.dimension_names().is_empty());
    assert_eq!(src.dimensions_detected_count, Some(3));
}

#[test]
fn explicit_header_count_and_dimensions() {
    let dims = vec![DimensionDefinition::named("a"), DimensionDefinition::named("a")];
    let src = Source::from_dataset(
        json!([["skip", "me"], [1, 2], [3, 4]]),
        SourceHeader::Count(1),
        SeriesLayout::Column,
        Some(dims),
    )
    .unwrap();
    assert_eq!(src.count(), 2);
    assert_eq!(src.dimension_names(), vec![Some("a"), Some("a-1")]);
}

#[test]
fn object_rows_take_keys_in_order() {
    let src = Source::from_dataset(
        json!([{ "product": "A", "v": 1 }, { "product": "B", "v": 2 }]),
        SourceHeader::Auto,
        SeriesLayout::Column,
        None,
    )
    .unwrap();

    assert_eq!(src.format, SourceFormat::ObjectRows);
    assert_eq!(src.dimension_names(), vec![Some("product"), Some("v")]);
    assert_eq!(src.count(), 2);
    assert_eq!(cell_f64(src.cell(1, 1, "v")), Some(2.0));
    assert_eq!(src.guess_ordinal(0), BeOrdinal::Must);
}

#[test]
fn keyed_columns() {
    let src = Source::from_dataset(
        json!({ "product": ["A", "B", "C"], "v": [1, 2, 3] }),
        SourceHeader::Auto,
        SeriesLayout::Column,
        None,
    )
    .unwrap();

    assert_eq!(src.format, SourceFormat::KeyedColumns);
    assert_eq!(src.count(), 3);
    assert_eq!(cell_f64(src.cell(2, 1, "v")), Some(3.0));
    assert!(src.cell(5, 1, "v").is_missing());
}

#[test]
fn numeric_strings_might_be_ordinal() {
    let src = Source::from_dataset(
        json!([[null, "1"], ["-", "2"], ["x", "3"]]),
        SourceHeader::Flag(false),
        SeriesLayout::Column,
        None,
    )
    .unwrap();
    assert_eq!(src.guess_ordinal(0), BeOrdinal::Must);
    assert_eq!(src.guess_ordinal(1), BeOrdinal::Might);
}

#[test]
fn defined_type_decides_ordinal() {
    let src = Source::from_series_items(vec![json!([1, "a"])]).with_dimensions(Some(vec![
        DimensionDefinition::named("n").with_type(DimensionType::Ordinal),
        DimensionDefinition::named("s").with_type(DimensionType::Float),
    ]));
    assert_eq!(src.guess_ordinal(0), BeOrdinal::Must);
    assert_eq!(src.guess_ordinal(1), BeOrdinal::Not);
}

#[test]
fn invalid_sources_are_rejected() {
    let err = Source::from_dataset(json!(5), SourceHeader::Auto, SeriesLayout::Column, None).unwrap_err();
    assert!(matches!(err, DataError::InvalidSource(_)));

    let err = Source::from_dataset(json!([1, 2]), SourceHeader::Auto, SeriesLayout::Column, None).unwrap_err();
    assert!(matches!(err, DataError::InvalidSource(_)));

    let err = Source::from_dataset(json!({ "a": 1 }), SourceHeader::Auto, SeriesLayout::Column, None).unwrap_err();
    assert!(matches!(err, DataError::InvalidSource(_)));
}

#[test]
fn series_items_detect_dimension_count() {
    assert_eq!(Source::from_series_items(vec![json!({ "value": [1, 2, 3] })]).dimensions_detected_count, Some(3));
    assert_eq!(Source::from_series_items(vec![json!(7)]).dimensions_detected_count, Some(1));
    assert_eq!(Source::from_series_data_option(Value::Null).unwrap().count(), 0);
}
