// File: crates/chart-data/src/ingest.rs
// Summary: Build `SeriesData` from raw series data, a `Source`, or a shared store.
// Notes:
// - Dimension roles come from the series' axes, else the registered coordinate system,
//   else the 2-D default `x`/`y`.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::coord_info::coord_sys_info_by_series;
use crate::coord_sys::CoordinateSystemRegistry;
use crate::dimensions::{create_dimensions, CreateDimensionsOptions, DimensionDefinition};
use crate::encode::{make_series_encode_for_axis_coord_sys, DatasetEncodeState, EncodeDefine};
use crate::error::DataResult;
use crate::series::SeriesModel;
use crate::series_data::{SeriesData, SeriesDataInput};
use crate::source::Source;
use crate::stack::{enable_data_stack, StackOptions};
use crate::store::{DataStore, DimValueGetter, ValueContext};
use crate::types::{SourceFormat, DEFAULT_COORD_DIMS};
use crate::value::{data_item_value, first_data_not_null};

/// Raw input of `create_series_data`.
#[derive(Clone, Debug)]
pub enum SeriesInput {
    /// A series `data` option, wrapped into an original-format source.
    Data(Value),
    Source(Arc<Source>),
    /// A store shared with other series.
    Store(Arc<DataStore>),
}

impl From<Value> for SeriesInput {
    fn from(v: Value) -> Self { SeriesInput::Data(v) }
}

impl From<Source> for SeriesInput {
    fn from(s: Source) -> Self { SeriesInput::Source(Arc::new(s)) }
}

impl From<Arc<DataStore>> for SeriesInput {
    fn from(s: Arc<DataStore>) -> Self { SeriesInput::Store(s) }
}

/// How the encode is defaulted when the series gives none.
#[derive(Default)]
pub enum EncodeDefaulter<'a> {
    #[default]
    Disabled,
    /// Axis-based defaulting against a chart-wide dataset cursor.
    AxisCoordSys(&'a DatasetEncodeState),
    Custom(&'a dyn Fn(&Source, usize) -> EncodeDefine),
}

#[derive(Default)]
pub struct CreateOptions<'a> {
    pub generate_coord: Option<String>,
    pub encode_defaulter: EncodeDefaulter<'a>,
    /// Build inverted indices for every ordinal dimension on a category axis.
    pub create_inverted_indices: bool,
}

/// Convert series input into series data whose dimensions follow the coordinate system.
pub fn create_series_data(
    input: impl Into<SeriesInput>,
    series: &SeriesModel,
    registry: &CoordinateSystemRegistry,
    opt: &CreateOptions<'_>,
) -> DataResult<SeriesData> {
    let (source, store) = match input.into() {
        SeriesInput::Data(v) => {
            let source = Source::from_series_data_option(v)?
                .with_dimensions(series.dimensions.clone())
                .with_encode(series.encode.clone());
            (Arc::new(source), None)
        }
        SeriesInput::Source(s) => (s, None),
        SeriesInput::Store(st) => (Arc::clone(st.source()), Some(st)),
    };

    let coord_info = coord_sys_info_by_series(series);
    let coord_dim_defs: Vec<DimensionDefinition> = match &coord_info {
        Some(info) if !info.coord_sys_dims.is_empty() => info
            .coord_sys_dims
            .iter()
            .map(|dim| {
                let mut def = DimensionDefinition::named(dim.as_str());
                if let Some(axis) = info.axis_map.get(dim) {
                    def.dim_type = Some(axis.dimension_type());
                }
                def
            })
            .collect(),
        _ => {
            let registered = series.coordinate_system.as_deref().and_then(|n| registry.get(n));
            match registered {
                Some(sys) => sys.dimensions_info().unwrap_or_else(|| {
                    sys.dimensions().into_iter().map(DimensionDefinition::from).collect()
                }),
                None => DEFAULT_COORD_DIMS.iter().map(|d| DimensionDefinition::named(*d)).collect(),
            }
        }
    };
    debug!(
        series = %series.id,
        coord_sys = ?series.coordinate_system,
        dims = ?coord_dim_defs.iter().map(|d| d.name.as_deref()).collect::<Vec<_>>(),
        "coordinate dimensions"
    );

    let axis_defaulter;
    let encode_defaulter: Option<&dyn Fn(&Source, usize) -> EncodeDefine> = match &opt.encode_defaulter {
        EncodeDefaulter::Disabled => None,
        EncodeDefaulter::Custom(f) => Some(*f),
        EncodeDefaulter::AxisCoordSys(state) => {
            let defs = coord_dim_defs.clone();
            axis_defaulter = move |src: &Source, _count: usize| {
                make_series_encode_for_axis_coord_sys(&defs, series, src, state)
            };
            Some(&axis_defaulter)
        }
    };

    let mut dims = create_dimensions(
        &source,
        CreateDimensionsOptions {
            coord_dimensions: coord_dim_defs,
            generate_coord: opt.generate_coord.clone(),
            encode_defaulter,
            ..CreateDimensionsOptions::default()
        },
    );

    let mut first_category: Option<usize> = None;
    if let Some(info) = &coord_info {
        let mut has_name_encode = false;
        for (i, dim) in dims.iter_mut().enumerate() {
            if let Some(axis) = info.category_axis_map.get(&dim.coord_dim) {
                first_category.get_or_insert(i);
                dim.ordinal_meta = axis.ordinal_meta();
                if opt.create_inverted_indices {
                    dim.create_inverted_indices = true;
                }
            }
            if dim.other_dims.item_name.is_some() {
                has_name_encode = true;
            }
        }
        if let (false, Some(i)) = (has_name_encode, first_category) {
            dims[i].other_dims.item_name = Some(0);
        }
    }

    let stack_info = enable_data_stack(series, &mut dims, &StackOptions::default());
    let mut data = SeriesData::new(dims, series);
    data.set_calculation_info(stack_info);

    let complete_ordinal = match (store.is_none(), first_category) {
        (true, Some(cat)) if is_need_complete_ordinal_data(&source) => Some(cat),
        _ => None,
    };
    let index_as_category = move |ctx: &ValueContext<'_>, data_index: usize, dim_index: usize| -> f64 {
        if Some(dim_index) == complete_ordinal {
            data_index as f64
        } else {
            ctx.default_value(data_index, dim_index)
        }
    };
    if let Some(cat) = complete_ordinal {
        debug!(series = %series.id, dim = cat, "category values taken from data index");
    }

    data.has_item_option = false;
    let getter: Option<&DimValueGetter<'_>> =
        complete_ordinal.map(|_| &index_as_category as &DimValueGetter<'_>);
    let input = match store {
        Some(store) => SeriesDataInput::Store(store),
        None => SeriesDataInput::Source(source),
    };
    data.init_data(input, getter)?;
    Ok(data)
}

/// Original-format data whose first item is a plain value (not an array) needs category
/// values filled in from the item index.
pub fn is_need_complete_ordinal_data(source: &Source) -> bool {
    if source.format != SourceFormat::Original {
        return false;
    }
    match first_data_not_null(source.items()) {
        Some(item) => !data_item_value(item).is_array(),
        None => false,
    }
}
