// File: crates/chart-data/src/encode.rs
// Summary: Encode maps (coordinate/visual dimension -> data dimensions) and the axis encode defaulter.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::dimensions::DimensionDefinition;
use crate::error::{DataError, DataResult};
use crate::series::SeriesModel;
use crate::source::Source;
use crate::types::{DimensionType, SeriesLayout, VisualDimension};

/// Reference to a data dimension by position or by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DimensionRef {
    Index(usize),
    Name(String),
}

impl From<usize> for DimensionRef {
    fn from(i: usize) -> Self { DimensionRef::Index(i) }
}

impl From<&str> for DimensionRef {
    fn from(n: &str) -> Self { DimensionRef::Name(n.to_string()) }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncodeTarget {
    Dims(Vec<DimensionRef>),
    /// Written as a single negative index; the coordinate dimension takes no data.
    Disabled,
}

/// Ordered encode map. Order matters: earlier entries claim data dims first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodeDefine {
    entries: Vec<(String, EncodeTarget)>,
}

impl EncodeDefine {
    pub fn new() -> Self { Self::default() }

    /// Insert or replace the entry for `key`, keeping its original position.
    pub fn set(&mut self, key: impl Into<String>, target: EncodeTarget) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = target,
            None => self.entries.push((key, target)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, dims: Vec<DimensionRef>) -> Self {
        self.set(key, EncodeTarget::Dims(dims));
        self
    }

    pub fn get(&self, key: &str) -> Option<&EncodeTarget> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, t)| t)
    }

    pub fn entries(&self) -> impl Iterator<Item = &(String, EncodeTarget)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Parse an `encode` option object: values are an index, a name, or a list of them.
    pub fn from_json(v: &Value) -> DataResult<Self> {
        let map = v.as_object().ok_or_else(|| DataError::InvalidEncode {
            coord_dim: String::new(),
            reason: "encode must be an object".to_string(),
        })?;
        let mut out = Self::new();
        for (key, raw) in map {
            let items: Vec<&Value> = match raw {
                Value::Array(list) => list.iter().collect(),
                Value::Null => Vec::new(),
                single => vec![single],
            };
            if let [Value::Number(n)] = items.as_slice() {
                if n.as_f64().is_some_and(|f| f < 0.0) {
                    out.set(key.clone(), EncodeTarget::Disabled);
                    continue;
                }
            }
            let refs = items
                .into_iter()
                .map(|item| parse_dimension_ref(key, item))
                .collect::<DataResult<Vec<_>>>()?;
            out.set(key.clone(), EncodeTarget::Dims(refs));
        }
        Ok(out)
    }
}

fn parse_dimension_ref(key: &str, item: &Value) -> DataResult<DimensionRef> {
    let invalid = |reason: String| DataError::InvalidEncode { coord_dim: key.to_string(), reason };
    match item {
        Value::String(s) => Ok(DimensionRef::Name(s.clone())),
        Value::Number(n) => n
            .as_u64()
            .map(|i| DimensionRef::Index(i as usize))
            .ok_or_else(|| invalid(format!("{n} is not a dimension index"))),
        other => Err(invalid(format!("unexpected value {other}"))),
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct DatasetCursor {
    category_way_dim: Option<usize>,
    value_way_dim: usize,
}

/// Chart-scoped cursors so series sharing one dataset take consecutive value columns.
#[derive(Debug, Default)]
pub struct DatasetEncodeState {
    cursors: Mutex<HashMap<String, DatasetCursor>>,
}

impl DatasetEncodeState {
    pub fn new() -> Self { Self::default() }
}

/// Default encode for series on axis coordinate systems that read from a dataset.
///
/// The first ordinal coordinate dimension reads data dimension 0 (the category column) and
/// names the items; every other coordinate dimension takes the next unused columns and names
/// the series. Series not bound to a dataset get an empty encode.
pub fn make_series_encode_for_axis_coord_sys(
    coord_dims: &[DimensionDefinition],
    series: &SeriesModel,
    source: &Source,
    state: &DatasetEncodeState,
) -> EncodeDefine {
    let mut encode = EncodeDefine::new();
    let Some(dataset) = series.dataset.as_deref() else { return encode };
    if coord_dims.is_empty() {
        return encode;
    }

    let base_category = coord_dims
        .iter()
        .position(|d| d.dim_type == Some(DimensionType::Ordinal));
    let category_start = base_category.map(|i| coord_dims[i].data_dim_count());

    let layout = match source.layout {
        SeriesLayout::Column => "column",
        SeriesLayout::Row => "row",
    };
    let key = format!("{dataset}_{layout}");
    let mut cursors = state.cursors.lock();
    let cursor = cursors.entry(key).or_default();
    if cursor.category_way_dim.is_none() {
        cursor.category_way_dim = category_start;
    }

    let mut item_name = Vec::new();
    let mut series_name = Vec::new();
    for (i, def) in coord_dims.iter().enumerate() {
        let name = def.name.clone().unwrap_or_default();
        let count = def.data_dim_count();
        let (start, feeds_item_name) = match base_category {
            None => {
                let start = cursor.value_way_dim;
                cursor.value_way_dim += count;
                (start, false)
            }
            Some(cat) if cat == i => (0, true),
            Some(_) => {
                let start = cursor.category_way_dim.unwrap_or(0);
                cursor.category_way_dim = Some(start + count);
                (start, false)
            }
        };
        let dims: Vec<DimensionRef> = (start..start + count).map(DimensionRef::Index).collect();
        if feeds_item_name {
            item_name.extend(dims.iter().cloned());
        } else {
            series_name.extend(dims.iter().cloned());
        }
        encode.set(name, EncodeTarget::Dims(dims));
    }
    if !item_name.is_empty() {
        encode.set(VisualDimension::ItemName.key(), EncodeTarget::Dims(item_name));
    }
    if !series_name.is_empty() {
        encode.set(VisualDimension::SeriesName.key(), EncodeTarget::Dims(series_name));
    }
    debug!(series = %series.id, dataset, ?encode, "defaulted encode");
    encode
}
