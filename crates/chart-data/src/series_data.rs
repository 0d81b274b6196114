// File: crates/chart-data/src/series_data.rs
// Summary: Series data: resolved dimensions over a columnar store, plus item names and ids.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::dimensions::SeriesDimensionDefine;
use crate::error::{DataError, DataResult};
use crate::ordinal::SharedOrdinalMeta;
use crate::series::SeriesModel;
use crate::source::Source;
use crate::stack::{StackCalculationInfo, StackStrategy};
use crate::store::{DataStore, DimValueGetter, StoreDimension};
use crate::types::{SourceFormat, VisualDimension};
use crate::value::{format_id_name, format_number};

/// What `SeriesData::init_data` reads from.
#[derive(Clone, Debug)]
pub enum SeriesDataInput {
    Source(Arc<Source>),
    /// A store shared with other series; cloned on write.
    Store(Arc<DataStore>),
}

#[derive(Clone, Debug)]
pub struct SeriesData {
    dimensions: Vec<SeriesDimensionDefine>,
    index_by_name: HashMap<String, usize>,
    store: Option<Arc<DataStore>>,
    series_id: String,
    stack: Option<String>,
    stack_strategy: StackStrategy,
    name_list: Vec<Option<String>>,
    id_list: Vec<String>,
    calculation_info: StackCalculationInfo,
    /// Whether any item carries its own options besides a value.
    pub has_item_option: bool,
}

impl SeriesData {
    pub fn new(dimensions: Vec<SeriesDimensionDefine>, series: &SeriesModel) -> Self {
        let index_by_name = dimensions.iter().enumerate().map(|(i, d)| (d.name.clone(), i)).collect();
        Self {
            dimensions,
            index_by_name,
            store: None,
            series_id: series.id.clone(),
            stack: series.stack.clone().filter(|_| series.may_stack()),
            stack_strategy: series.stack_strategy,
            name_list: Vec::new(),
            id_list: Vec::new(),
            calculation_info: StackCalculationInfo::default(),
            has_item_option: false,
        }
    }

    pub fn set_calculation_info(&mut self, info: StackCalculationInfo) {
        self.calculation_info = info;
    }

    pub fn calculation_info(&self) -> &StackCalculationInfo { &self.calculation_info }

    pub(crate) fn calculation_info_mut(&mut self) -> &mut StackCalculationInfo {
        &mut self.calculation_info
    }

    /// Fill the store from a source, or adopt a shared store.
    pub fn init_data(&mut self, input: SeriesDataInput, getter: Option<&DimValueGetter<'_>>) -> DataResult<()> {
        let store = match input {
            SeriesDataInput::Source(source) => {
                let store_dims = self.store_dimensions();
                Arc::new(DataStore::from_source(store_dims, source, getter))
            }
            SeriesDataInput::Store(mut store) => {
                let needed = self.dimensions.iter().filter(|d| !d.is_calculation_coord).count();
                if store.dimension_count() < needed {
                    return Err(DataError::StoreDimensionMismatch {
                        expected: needed,
                        actual: store.dimension_count(),
                    });
                }
                for dim in self.dimensions.iter_mut().filter(|d| d.is_calculation_coord) {
                    let store_dim = StoreDimension {
                        is_calculation: true,
                        ..StoreDimension::new(dim.name.clone(), dim.dim_type)
                    };
                    dim.store_dim_index = Arc::make_mut(&mut store).ensure_dimension(store_dim);
                }
                for dim in self.dimensions.iter().filter(|d| d.create_inverted_indices) {
                    if !store.has_inverted_indices(dim.store_dim_index) {
                        Arc::make_mut(&mut store).create_inverted_indices(dim.store_dim_index);
                    }
                }
                store
            }
        };

        // Ordinal dims without axis meta get the one the store collected into.
        for dim in self.dimensions.iter_mut() {
            if dim.ordinal_meta.is_none() {
                dim.ordinal_meta = store.dimension(dim.store_dim_index).and_then(|d| d.ordinal_meta.clone());
            }
        }
        self.store = Some(store);
        self.build_names_and_ids();
        debug!(series = %self.series_id, count = self.count(), dims = self.dimensions.len(), "series data initialized");
        Ok(())
    }

    fn store_dimensions(&self) -> Vec<StoreDimension> {
        let n = self.dimensions.iter().map(|d| d.store_dim_index + 1).max().unwrap_or(0);
        let mut out: Vec<StoreDimension> = (0..n)
            .map(|i| StoreDimension { is_calculation: true, ..StoreDimension::new(format!("__unused_{i}"), Default::default()) })
            .collect();
        for dim in &self.dimensions {
            out[dim.store_dim_index] = StoreDimension {
                property: dim.name.clone(),
                dim_type: dim.dim_type,
                ordinal_meta: dim.ordinal_meta.clone(),
                create_inverted_indices: dim.create_inverted_indices,
                is_calculation: dim.is_calculation_coord,
            };
        }
        out
    }

    fn build_names_and_ids(&mut self) {
        let count = self.count();
        let role_dim = |role: VisualDimension| self.dimensions.iter().position(|d| d.other_dims.get(role) == Some(0));
        let name_dim = role_dim(VisualDimension::ItemName);
        let id_dim = role_dim(VisualDimension::ItemId);

        let items: &[serde_json::Value] = match self.store.as_ref() {
            Some(store) if store.source().format == SourceFormat::Original => store.source().items(),
            _ => &[],
        };
        self.has_item_option = items.iter().any(serde_json::Value::is_object);

        let mut names = Vec::with_capacity(count);
        let mut ids = Vec::with_capacity(count);
        let mut repeats: HashMap<String, usize> = HashMap::new();
        for i in 0..count {
            let item = items.get(i).and_then(|v| v.as_object());
            let name = item
                .and_then(|o| o.get("name"))
                .and_then(format_id_name)
                .or_else(|| name_dim.and_then(|d| self.label_of(d, i)));
            let id = item
                .and_then(|o| o.get("id"))
                .and_then(format_id_name)
                .or_else(|| id_dim.and_then(|d| self.label_of(d, i)))
                .or_else(|| {
                    name.as_ref().map(|n| {
                        let seen = repeats.entry(n.clone()).or_insert(0);
                        *seen += 1;
                        if *seen > 1 { format!("{n}__ec__{seen}") } else { n.clone() }
                    })
                })
                .unwrap_or_else(|| format!("__ec_item_{i}"));
            names.push(name);
            ids.push(id);
        }
        self.name_list = names;
        self.id_list = ids;
    }

    /// Display label of a stored value: the category for ordinal dims, else the number.
    fn label_of(&self, dim: usize, index: usize) -> Option<String> {
        let info = self.dimensions.get(dim)?;
        let v = self.store.as_ref()?.get(info.store_dim_index, index);
        if v.is_nan() {
            return None;
        }
        match &info.ordinal_meta {
            Some(meta) => meta.read().category(v).map(str::to_string),
            None => Some(format_number(v)),
        }
    }

    pub fn count(&self) -> usize {
        self.store.as_ref().map_or(0, |s| s.count())
    }

    pub fn series_id(&self) -> &str { &self.series_id }
    pub fn stack(&self) -> Option<&str> { self.stack.as_deref() }
    pub fn stack_strategy(&self) -> StackStrategy { self.stack_strategy }
    pub fn store(&self) -> Option<&Arc<DataStore>> { self.store.as_ref() }
    pub fn dimensions(&self) -> &[SeriesDimensionDefine] { &self.dimensions }

    pub fn dimension_names(&self) -> Vec<&str> {
        self.dimensions.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn dimension_index(&self, name: &str) -> Option<usize> {
        self.index_by_name.get(name).copied()
    }

    pub fn dimension_info(&self, name: &str) -> Option<&SeriesDimensionDefine> {
        self.dimension_index(name).map(|i| &self.dimensions[i])
    }

    pub fn ordinal_meta(&self, name: &str) -> Option<SharedOrdinalMeta> {
        self.dimension_info(name).and_then(|d| d.ordinal_meta.clone())
    }

    /// Name of the `index`-th data dimension mapped to a coordinate dimension.
    pub fn map_dimension(&self, coord_dim: &str, index: usize) -> Option<&str> {
        self.dimensions
            .iter()
            .find(|d| d.coord_dim == coord_dim && d.coord_dim_index == index)
            .map(|d| d.name.as_str())
    }

    /// All data dimensions mapped to a coordinate dimension, by coordinate index.
    pub fn map_dimensions_all(&self, coord_dim: &str) -> Vec<&str> {
        let mut dims: Vec<&SeriesDimensionDefine> =
            self.dimensions.iter().filter(|d| d.coord_dim == coord_dim).collect();
        dims.sort_by_key(|d| d.coord_dim_index);
        dims.into_iter().map(|d| d.name.as_str()).collect()
    }

    /// Stored value; `NaN` for unknown dimensions or indices.
    pub fn get(&self, dim: &str, index: usize) -> f64 {
        match (self.dimension_info(dim), &self.store) {
            (Some(info), Some(store)) => store.get(info.store_dim_index, index),
            _ => f64::NAN,
        }
    }

    /// Items are never filtered, so raw and data indices coincide.
    pub fn raw_index(&self, index: usize) -> usize { index }

    pub fn get_by_raw_index(&self, dim: &str, raw_index: usize) -> f64 {
        self.get(dim, raw_index)
    }

    /// Every dimension's value for one item, in dimension order.
    pub fn values(&self, index: usize) -> Vec<f64> {
        self.dimensions.iter().map(|d| self.get(&d.name, index)).collect()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.name_list.get(index).and_then(|n| n.as_deref())
    }

    pub fn id(&self, index: usize) -> Option<&str> {
        self.id_list.get(index).map(String::as_str)
    }

    pub fn raw_index_of(&self, dim: &str, value: f64) -> DataResult<Option<usize>> {
        let info = self.dimension_info(dim).ok_or_else(|| DataError::UnknownDimension(dim.to_string()))?;
        match &self.store {
            Some(store) => store.raw_index_of(info.store_dim_index, value),
            None => Ok(None),
        }
    }

    /// `(min, max)` of a dimension's values.
    pub fn data_extent(&self, dim: &str) -> (f64, f64) {
        match (self.dimension_info(dim), &self.store) {
            (Some(info), Some(store)) => store.raw_extent(info.store_dim_index),
            _ => (f64::INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Rewrite the values of `dims` item by item. The callback receives the item index and the
    /// current values, which it may overwrite in place.
    pub fn modify(&mut self, dims: &[&str], mut f: impl FnMut(usize, &mut [f64])) -> DataResult<()> {
        let store_dims = dims
            .iter()
            .map(|d| {
                self.dimension_info(d)
                    .map(|info| info.store_dim_index)
                    .ok_or_else(|| DataError::UnknownDimension(d.to_string()))
            })
            .collect::<DataResult<Vec<_>>>()?;
        let count = self.count();
        let Some(store) = self.store.as_mut() else { return Ok(()) };
        let store = Arc::make_mut(store);
        let mut buf = vec![0.0; store_dims.len()];
        for i in 0..count {
            for (slot, &d) in buf.iter_mut().zip(&store_dims) {
                *slot = store.get(d, i);
            }
            f(i, &mut buf);
            for (&v, &d) in buf.iter().zip(&store_dims) {
                store.set(d, i, v);
            }
        }
        for &d in &store_dims {
            store.refresh_extent(d);
        }
        Ok(())
    }
}
