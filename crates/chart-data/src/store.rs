// File: crates/chart-data/src/store.rs
// Summary: Columnar numeric store filled from a `Source`; one `Vec<f64>` per dimension.
// Notes:
// - Ordinal dimensions store ordinal numbers; labels live in their ordinal meta.
// - Calculation dimensions are never read from the source and start as NaN.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::error::{DataError, DataResult};
use crate::ordinal::{OrdinalMeta, SharedOrdinalMeta};
use crate::source::Source;
use crate::types::DimensionType;
use crate::value::parse_data_value;

#[derive(Clone, Debug)]
pub struct StoreDimension {
    /// Property name used for object rows and keyed columns.
    pub property: String,
    pub dim_type: DimensionType,
    pub ordinal_meta: Option<SharedOrdinalMeta>,
    pub create_inverted_indices: bool,
    pub is_calculation: bool,
}

impl StoreDimension {
    pub fn new(property: impl Into<String>, dim_type: DimensionType) -> Self {
        Self {
            property: property.into(),
            dim_type,
            ordinal_meta: None,
            create_inverted_indices: false,
            is_calculation: false,
        }
    }
}

/// Read access for custom value getters; `default_value` is what the store would read.
pub struct ValueContext<'a> {
    source: &'a Source,
    dimensions: &'a [StoreDimension],
}

impl ValueContext<'_> {
    pub fn default_value(&self, data_index: usize, dim_index: usize) -> f64 {
        let Some(dim) = self.dimensions.get(dim_index) else { return f64::NAN };
        let cell = self.source.cell(data_index, dim_index, &dim.property);
        match &dim.ordinal_meta {
            Some(meta) => meta.write().parse_and_collect(cell),
            None => parse_data_value(cell, dim.dim_type),
        }
    }
}

/// Custom value getter: `(context, data_index, dim_index) -> stored value`.
pub type DimValueGetter<'a> = dyn Fn(&ValueContext<'_>, usize, usize) -> f64 + 'a;

#[derive(Clone, Debug)]
pub struct DataStore {
    dimensions: Vec<StoreDimension>,
    columns: Vec<Vec<f64>>,
    extents: Vec<(f64, f64)>,
    inverted: Vec<Option<HashMap<i64, usize>>>,
    count: usize,
    source: Arc<Source>,
}

impl DataStore {
    /// Read every item of `source` into columns.
    pub fn from_source(
        mut dimensions: Vec<StoreDimension>,
        source: Arc<Source>,
        getter: Option<&DimValueGetter<'_>>,
    ) -> Self {
        for dim in dimensions.iter_mut() {
            if dim.dim_type == DimensionType::Ordinal && dim.ordinal_meta.is_none() {
                dim.ordinal_meta = Some(OrdinalMeta::collecting().shared());
            }
        }

        let count = source.count();
        let n = dimensions.len();
        let mut columns: Vec<Vec<f64>> = (0..n).map(|_| Vec::with_capacity(count)).collect();
        let ctx = ValueContext { source: &source, dimensions: &dimensions };
        for data_index in 0..count {
            for (dim_index, column) in columns.iter_mut().enumerate() {
                let v = if dimensions[dim_index].is_calculation {
                    f64::NAN
                } else {
                    match getter {
                        Some(get) => get(&ctx, data_index, dim_index),
                        None => ctx.default_value(data_index, dim_index),
                    }
                };
                column.push(v);
            }
        }

        let extents = columns.iter().map(|c| extent_of(c)).collect();
        let inverted = dimensions
            .iter()
            .zip(&columns)
            .map(|(dim, col)| {
                (dim.create_inverted_indices && dim.ordinal_meta.is_some()).then(|| build_inverted(col))
            })
            .collect();
        trace!(count, dims = n, "store filled");
        Self { dimensions, columns, extents, inverted, count, source }
    }

    pub fn count(&self) -> usize { self.count }
    pub fn dimension_count(&self) -> usize { self.dimensions.len() }
    pub fn dimensions(&self) -> &[StoreDimension] { &self.dimensions }
    pub fn source(&self) -> &Arc<Source> { &self.source }

    pub fn dimension(&self, dim: usize) -> Option<&StoreDimension> {
        self.dimensions.get(dim)
    }

    /// Stored value, `NaN` when out of range.
    pub fn get(&self, dim: usize, index: usize) -> f64 {
        self.columns
            .get(dim)
            .and_then(|c| c.get(index))
            .copied()
            .unwrap_or(f64::NAN)
    }

    /// Overwrite a value; extents are refreshed by `refresh_extent`.
    pub fn set(&mut self, dim: usize, index: usize, value: f64) {
        if let Some(slot) = self.columns.get_mut(dim).and_then(|c| c.get_mut(index)) {
            *slot = value;
        }
    }

    pub fn refresh_extent(&mut self, dim: usize) {
        if let Some(col) = self.columns.get(dim) {
            self.extents[dim] = extent_of(col);
        }
    }

    /// `(min, max)` over non-NaN values; `(inf, -inf)` when there are none.
    pub fn raw_extent(&self, dim: usize) -> (f64, f64) {
        self.extents.get(dim).copied().unwrap_or((f64::INFINITY, f64::NEG_INFINITY))
    }

    /// Raw index holding `value` in an ordinal dimension with inverted indices.
    pub fn raw_index_of(&self, dim: usize, value: f64) -> DataResult<Option<usize>> {
        let map = self
            .inverted
            .get(dim)
            .and_then(Option::as_ref)
            .ok_or_else(|| {
                let name = self.dimensions.get(dim).map_or_else(|| dim.to_string(), |d| d.property.clone());
                DataError::InvertedIndicesMissing(name)
            })?;
        if !value.is_finite() {
            return Ok(None);
        }
        Ok(map.get(&(value as i64)).copied())
    }

    /// Append a NaN-filled calculation column unless one with this property exists.
    pub fn ensure_dimension(&mut self, dim: StoreDimension) -> usize {
        if let Some(existing) = self.dimensions.iter().position(|d| d.property == dim.property) {
            return existing;
        }
        self.columns.push(vec![f64::NAN; self.count]);
        self.extents.push((f64::INFINITY, f64::NEG_INFINITY));
        self.inverted.push(None);
        self.dimensions.push(dim);
        self.dimensions.len() - 1
    }

    pub fn has_inverted_indices(&self, dim: usize) -> bool {
        self.inverted.get(dim).is_some_and(Option::is_some)
    }

    /// Build inverted indices for a dimension after the fact.
    pub fn create_inverted_indices(&mut self, dim: usize) {
        if let Some(col) = self.columns.get(dim) {
            self.inverted[dim] = Some(build_inverted(col));
            self.dimensions[dim].create_inverted_indices = true;
        }
    }
}

fn extent_of(col: &[f64]) -> (f64, f64) {
    col.iter()
        .filter(|v| !v.is_nan())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Ordinal number -> raw index; the last occurrence wins.
fn build_inverted(col: &[f64]) -> HashMap<i64, usize> {
    let mut map = HashMap::with_capacity(col.len());
    for (i, v) in col.iter().enumerate() {
        if v.is_finite() {
            map.insert(*v as i64, i);
        }
    }
    map
}
