// File: crates/chart-data/tests/ingest.rs
// Purpose: Series data creation from raw data, sources and shared stores.

use std::sync::Arc;

use chart_data::coord_sys::CoordinateSystem;
use chart_data::ingest::is_need_complete_ordinal_data;
use chart_data::{
    create_series_data, AxisModel, CoordAxes, CoordinateSystemRegistry, CreateOptions, DataError,
    DimensionDefinition, DimensionRef, DimensionType, EncodeDefaulter, EncodeDefine, SeriesModel, Source,
};
use serde_json::json;

fn category_line(id: &str, categories: &[&str]) -> SeriesModel {
    let cats = categories.iter().map(|c| c.to_string()).collect();
    SeriesModel::new(id, "line").with_axes(CoordAxes::Cartesian2d {
        x: AxisModel::category(Some(cats), true),
        y: AxisModel::value(),
    })
}

#[test]
fn scalar_items_on_category_axis_take_item_index() {
    let registry = CoordinateSystemRegistry::with_builtin();
    let series = category_line("s", &["Mon", "Tue", "Wed"]);
    let data = create_series_data(json!([120, 200, 150]), &series, &registry, &CreateOptions::default())
        .expect("series data");

    assert_eq!(data.count(), 3);
    assert_eq!(data.dimension_names(), vec!["x", "y"]);
    assert_eq!(data.get("x", 1), 1.0);
    assert_eq!(data.get("y", 1), 200.0);
    assert_eq!(data.name(1), Some("Tue"));
    assert_eq!(data.id(2), Some("Wed"));
    assert_eq!(data.dimension_info("x").map(|d| d.dim_type), Some(DimensionType::Ordinal));
}

#[test]
fn categories_are_collected_from_array_items() {
    let registry = CoordinateSystemRegistry::with_builtin();
    let x = AxisModel::category(None, true);
    let series = SeriesModel::new("s", "bar").with_axes(CoordAxes::Cartesian2d {
        x: x.clone(),
        y: AxisModel::value(),
    });
    let data = create_series_data(
        json!([["a", 1], ["b", 2], ["a", 3]]),
        &series,
        &registry,
        &CreateOptions::default(),
    )
    .unwrap();

    assert_eq!(data.get("x", 2), 0.0);
    assert_eq!(data.get("x", 1), 1.0);
    let meta = x.ordinal_meta().unwrap();
    assert_eq!(meta.read().categories(), &["a".to_string(), "b".to_string()]);
}

#[test]
fn registered_system_supplies_dimensions_without_axes() {
    let registry = CoordinateSystemRegistry::with_builtin();
    let series = SeriesModel::new("p", "scatter").with_coordinate_system("polar");
    let data = create_series_data(json!([[1, 2], [3, 4]]), &series, &registry, &CreateOptions::default())
        .unwrap();

    assert_eq!(data.dimension_names(), vec!["radius", "angle"]);
    assert_eq!(data.get("angle", 1), 4.0);
    assert_eq!(data.map_dimension("radius", 0), Some("radius"));
}

#[test]
fn unknown_system_falls_back_to_xy_with_extra_value_dims() {
    let registry = CoordinateSystemRegistry::new();
    let series = SeriesModel::new("d", "scatter");
    let data = create_series_data(json!([[1, 2, 3], [4, 5, 6]]), &series, &registry, &CreateOptions::default())
        .unwrap();

    assert_eq!(data.dimension_names(), vec!["x", "y", "value"]);
    assert!(data.dimension_info("value").unwrap().is_extra_coord);
    assert!(!data.dimension_info("y").unwrap().is_extra_coord);
    assert_eq!(data.values(1), vec![4.0, 5.0, 6.0]);
}

struct Ternary;

impl CoordinateSystem for Ternary {
    fn name(&self) -> &str { "ternary" }

    fn dimensions(&self) -> Vec<String> {
        vec!["a".into(), "b".into(), "c".into()]
    }

    fn dimensions_info(&self) -> Option<Vec<DimensionDefinition>> {
        Some(vec![
            DimensionDefinition::named("a"),
            DimensionDefinition::named("b"),
            DimensionDefinition::named("c").with_type(DimensionType::Int),
        ])
    }
}

#[test]
fn custom_system_dimensions_info_is_used() {
    let mut registry = CoordinateSystemRegistry::new();
    registry.register(Ternary);
    let series = SeriesModel::new("t", "scatter").with_coordinate_system("ternary");
    let data = create_series_data(json!([[0.2, 0.3, 0.5]]), &series, &registry, &CreateOptions::default())
        .unwrap();

    assert_eq!(data.dimension_names(), vec!["a", "b", "c"]);
    assert_eq!(data.dimension_info("c").unwrap().dim_type, DimensionType::Int);
}

#[test]
fn item_names_ids_and_item_options() {
    let registry = CoordinateSystemRegistry::with_builtin();
    let series = SeriesModel::new("s", "scatter");
    let data = create_series_data(
        json!([
            { "name": "A", "value": [1, 5] },
            { "value": [2, 6] },
            { "name": "A", "value": [3, 7] }
        ]),
        &series,
        &registry,
        &CreateOptions::default(),
    )
    .unwrap();

    assert!(data.has_item_option);
    assert_eq!(data.name(0), Some("A"));
    assert_eq!(data.name(1), None);
    assert_eq!(data.id(1), Some("__ec_item_1"));
    assert_eq!(data.id(2), Some("A__ec__2"));
    assert_eq!(data.get("y", 2), 7.0);
}

#[test]
fn value_objects_count_as_item_options() {
    let registry = CoordinateSystemRegistry::with_builtin();
    let series = SeriesModel::new("s", "scatter");
    let data = create_series_data(json!([{ "value": [1, 2] }]), &series, &registry, &CreateOptions::default())
        .unwrap();
    assert!(data.has_item_option);

    let plain = create_series_data(json!([[1, 2]]), &series, &registry, &CreateOptions::default()).unwrap();
    assert!(!plain.has_item_option);
}

#[test]
fn explicit_item_name_encode_replaces_category_names() {
    let registry = CoordinateSystemRegistry::with_builtin();
    let encode = EncodeDefine::new()
        .with("x", vec![DimensionRef::Index(0)])
        .with("y", vec![DimensionRef::Index(1)])
        .with("itemName", vec![DimensionRef::Index(2)]);
    let series = category_line("s", &["Mon", "Tue"]).with_encode(encode);
    let data = create_series_data(
        json!([["Mon", 1, "n1"], ["Tue", 2, "n2"]]),
        &series,
        &registry,
        &CreateOptions::default(),
    )
    .unwrap();

    assert_eq!(data.dimension_info("x").unwrap().other_dims.item_name, None);
    assert_eq!(data.dimension_info("value").unwrap().other_dims.item_name, Some(0));
    assert_eq!(data.name(0), Some("n1"));
    assert_eq!(data.name(1), Some("n2"));
    assert_eq!(data.get("x", 1), 1.0);
}

#[test]
fn custom_encode_defaulter_applies_without_series_encode() {
    let registry = CoordinateSystemRegistry::with_builtin();
    let defaulter = |_: &Source, _: usize| {
        EncodeDefine::new()
            .with("x", vec![DimensionRef::Index(1)])
            .with("y", vec![DimensionRef::Index(0)])
    };
    let opt = CreateOptions { encode_defaulter: EncodeDefaulter::Custom(&defaulter), ..CreateOptions::default() };
    let series = SeriesModel::new("s", "scatter");
    let data = create_series_data(json!([[1, 2], [3, 4]]), &series, &registry, &opt).unwrap();

    assert_eq!(data.dimension_names(), vec!["y", "x"]);
    assert_eq!(data.get("x", 0), 2.0);
    assert_eq!(data.get("y", 1), 3.0);

    let encoded = series.with_encode(EncodeDefine::new().with("x", vec![DimensionRef::Index(0)]));
    let data = create_series_data(json!([[1, 2]]), &encoded, &registry, &opt).unwrap();
    assert_eq!(data.dimension_names(), vec!["x", "y"]);
}

#[test]
fn generated_coordinates_name_unclaimed_dimensions() {
    let registry = CoordinateSystemRegistry::new();
    let series = SeriesModel::new("s", "scatter");
    let opt = CreateOptions { generate_coord: Some("pt".to_string()), ..CreateOptions::default() };
    let data = create_series_data(json!([[1, 2, 3, 4]]), &series, &registry, &opt).unwrap();

    assert_eq!(data.dimension_names(), vec!["x", "y", "pt", "pt0"]);
    assert!(!data.dimension_info("pt").unwrap().is_extra_coord);
    assert!(data.dimension_info("pt0").unwrap().is_extra_coord);
    assert_eq!(data.get("pt0", 0), 4.0);
}

#[test]
fn axis_types_decide_dimension_types() {
    assert_eq!(AxisModel::log().dimension_type(), DimensionType::Float);
    assert_eq!(AxisModel::time().dimension_type(), DimensionType::Time);
    assert_eq!(AxisModel::category(None, true).dimension_type(), DimensionType::Ordinal);

    let registry = CoordinateSystemRegistry::with_builtin();
    let series = SeriesModel::new("s", "line").with_axes(CoordAxes::Cartesian2d {
        x: AxisModel::time(),
        y: AxisModel::log(),
    });
    let data = create_series_data(json!([[0, 10], [1, 100]]), &series, &registry, &CreateOptions::default())
        .unwrap();
    assert_eq!(data.dimension_info("y").unwrap().dim_type, DimensionType::Float);
    assert_eq!(data.dimension_info("x").unwrap().dim_type, DimensionType::Time);
    assert_eq!(data.data_extent("y"), (10.0, 100.0));
}

#[test]
fn time_axis_parses_dates_to_epoch_millis() {
    let registry = CoordinateSystemRegistry::with_builtin();
    let series = SeriesModel::new("s", "line").with_axes(CoordAxes::Cartesian2d {
        x: AxisModel::time(),
        y: AxisModel::value(),
    });
    let data = create_series_data(
        json!([["2024-01-01", 5], ["2024-01-02T00:00:00Z", 6]]),
        &series,
        &registry,
        &CreateOptions::default(),
    )
    .unwrap();

    assert_eq!(data.get("x", 0), 1_704_067_200_000.0);
    assert_eq!(data.get("x", 1), 1_704_153_600_000.0);
    assert_eq!(data.data_extent("y"), (5.0, 6.0));
}

#[test]
fn typed_array_source() {
    let registry = CoordinateSystemRegistry::with_builtin();
    let series = SeriesModel::new("s", "scatter").with_coordinate_system("cartesian2d");
    let source = Source::from_typed_array(vec![1.0, 2.0, 3.0, 4.0], 2);
    let data = create_series_data(source, &series, &registry, &CreateOptions::default()).unwrap();

    assert_eq!(data.count(), 2);
    assert_eq!(data.get("y", 1), 4.0);
    assert!(data.name(0).is_none());
}

#[test]
fn shared_store_is_reused_by_second_series() {
    let registry = CoordinateSystemRegistry::with_builtin();
    let series = SeriesModel::new("a", "scatter");
    let first = create_series_data(json!([[1, 10], [2, 20]]), &series, &registry, &CreateOptions::default())
        .unwrap();
    let store = Arc::clone(first.store().unwrap());

    let other = SeriesModel::new("b", "scatter");
    let second = create_series_data(store, &other, &registry, &CreateOptions::default()).unwrap();
    assert_eq!(second.count(), 2);
    assert_eq!(second.get("y", 1), 20.0);
    assert!(Arc::ptr_eq(first.store().unwrap(), second.store().unwrap()));
}

#[test]
fn shared_store_with_too_few_dimensions_is_rejected() {
    let registry = CoordinateSystemRegistry::with_builtin();
    let first = create_series_data(
        json!([[1, 10]]),
        &SeriesModel::new("a", "scatter"),
        &registry,
        &CreateOptions::default(),
    )
    .unwrap();
    let store = Arc::clone(first.store().unwrap());

    let parallel = SeriesModel::new("p", "parallel")
        .with_axes(CoordAxes::parallel(vec![AxisModel::value(); 3]));
    let err = create_series_data(store, &parallel, &registry, &CreateOptions::default()).unwrap_err();
    assert!(matches!(err, DataError::StoreDimensionMismatch { expected: 3, actual: 2 }));
}

#[test]
fn non_array_series_data_is_rejected() {
    let registry = CoordinateSystemRegistry::with_builtin();
    let err = create_series_data(
        json!({ "a": 1 }),
        &SeriesModel::new("s", "line"),
        &registry,
        &CreateOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, DataError::InvalidSource(_)));
}

#[test]
fn inverted_indices_on_request() {
    let registry = CoordinateSystemRegistry::with_builtin();
    let series = category_line("s", &["a", "b", "c"]);
    let opt = CreateOptions { create_inverted_indices: true, ..CreateOptions::default() };
    let data = create_series_data(json!([["c", 1], ["a", 2]]), &series, &registry, &opt).unwrap();

    assert_eq!(data.raw_index_of("x", 2.0).unwrap(), Some(0));
    assert_eq!(data.raw_index_of("x", 1.0).unwrap(), None);
    assert!(matches!(data.raw_index_of("y", 1.0), Err(DataError::InvertedIndicesMissing(_))));
}

#[test]
fn complete_ordinal_only_for_scalar_original_items() {
    assert!(is_need_complete_ordinal_data(&Source::from_series_items(vec![json!(null), json!(3)])));
    assert!(!is_need_complete_ordinal_data(&Source::from_series_items(vec![json!([1, 2])])));
    assert!(!is_need_complete_ordinal_data(&Source::from_series_items(vec![])));
    assert!(!is_need_complete_ordinal_data(&Source::from_typed_array(vec![1.0], 1)));
}
