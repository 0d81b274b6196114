// File: crates/chart-data/src/source.rs
// Summary: Canonical source representation over series data options and datasets.
// Notes:
// - A `Source` never copies values into columns; it answers cell lookups for the store.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::dimensions::DimensionDefinition;
use crate::encode::EncodeDefine;
use crate::error::{DataError, DataResult};
use crate::types::{SeriesLayout, SourceFormat, GUESS_ORDINAL_SAMPLES, HEADER_DETECT_SAMPLES};
use crate::value::{data_item_value, format_id_name, js_number, RawCell};

#[derive(Clone, Debug)]
pub enum SourceData {
    /// Original items, array rows, or object rows.
    Items(Vec<Value>),
    /// Keyed columns, in key order.
    Columns(Vec<(String, Vec<Value>)>),
    /// Flat numeric buffer, `width` values per item.
    Typed { values: Vec<f64>, width: usize },
}

/// How the header of an array-rows dataset is determined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceHeader {
    /// Header present iff the first line holds only strings.
    #[default]
    Auto,
    Flag(bool),
    /// Number of leading lines to skip.
    Count(usize),
}

/// Likelihood that a data dimension holds categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeOrdinal {
    Must,
    Might,
    Not,
}

#[derive(Clone, Debug)]
pub struct Source {
    pub data: SourceData,
    pub format: SourceFormat,
    pub layout: SeriesLayout,
    pub dimensions_define: Option<Vec<DimensionDefinition>>,
    /// Lines consumed by the header (array rows only).
    pub start_index: usize,
    pub dimensions_detected_count: Option<usize>,
    pub encode_define: Option<EncodeDefine>,
}

impl Source {
    /// Wrap a series `data` option. Null means no data.
    pub fn from_series_data_option(data: Value) -> DataResult<Self> {
        match data {
            Value::Array(items) => Ok(Self::from_series_items(items)),
            Value::Null => Ok(Self::from_series_items(Vec::new())),
            other => Err(DataError::InvalidSource(format!(
                "series data must be an array, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn from_series_items(items: Vec<Value>) -> Self {
        let detected = items
            .first()
            .map(data_item_value)
            .and_then(Value::as_array)
            .map(Vec::len)
            .filter(|n| *n > 0)
            .unwrap_or(1);
        Self {
            data: SourceData::Items(items),
            format: SourceFormat::Original,
            layout: SeriesLayout::Column,
            dimensions_define: None,
            start_index: 0,
            dimensions_detected_count: Some(detected),
            encode_define: None,
        }
    }

    /// Flat numeric data with `width` values per item (large, typed series data).
    pub fn from_typed_array(values: Vec<f64>, width: usize) -> Self {
        let width = width.max(1);
        Self {
            data: SourceData::Typed { values, width },
            format: SourceFormat::TypedArray,
            layout: SeriesLayout::Column,
            dimensions_define: None,
            start_index: 0,
            dimensions_detected_count: Some(width),
            encode_define: None,
        }
    }

    /// Build a dataset source, detecting its format, header and dimension names.
    pub fn from_dataset(
        data: Value,
        header: SourceHeader,
        layout: SeriesLayout,
        dimensions: Option<Vec<DimensionDefinition>>,
    ) -> DataResult<Self> {
        let (data, format) = match data {
            Value::Array(items) => {
                let format = items
                    .iter()
                    .find(|item| !item.is_null())
                    .map(|item| match item {
                        Value::Array(_) => SourceFormat::ArrayRows,
                        Value::Object(_) => SourceFormat::ObjectRows,
                        _ => SourceFormat::Unknown,
                    })
                    .unwrap_or(SourceFormat::ArrayRows);
                if format == SourceFormat::Unknown {
                    return Err(DataError::InvalidSource(
                        "dataset rows must be arrays or objects".to_string(),
                    ));
                }
                (SourceData::Items(items), format)
            }
            Value::Object(map) => {
                let mut columns = Vec::with_capacity(map.len());
                for (key, col) in map {
                    match col {
                        Value::Array(values) => columns.push((key, values)),
                        other => {
                            return Err(DataError::InvalidSource(format!(
                                "dataset column '{key}' must be an array, got {}",
                                json_kind(&other)
                            )))
                        }
                    }
                }
                (SourceData::Columns(columns), SourceFormat::KeyedColumns)
            }
            other => {
                return Err(DataError::InvalidSource(format!(
                    "dataset source must be an array or an object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let mut source = Self {
            data,
            format,
            layout,
            dimensions_define: None,
            start_index: 0,
            dimensions_detected_count: None,
            encode_define: None,
        };
        let mut dims = dimensions;
        match (&source.data, format) {
            (SourceData::Items(rows), SourceFormat::ArrayRows) => {
                source.start_index = match header {
                    SourceHeader::Auto => detect_header(rows, layout),
                    SourceHeader::Flag(b) => usize::from(b),
                    SourceHeader::Count(n) => n,
                };
                if dims.is_none() && source.start_index == 1 {
                    let mut names = Vec::new();
                    array_rows_travel_first(rows, layout, usize::MAX, |v, _| {
                        let name = format_id_name(v).filter(|s| !s.is_empty());
                        names.push(DimensionDefinition { name, ..DimensionDefinition::default() });
                    });
                    dims = Some(names);
                }
                source.dimensions_detected_count = Some(match (&dims, layout) {
                    (Some(d), _) => d.len(),
                    (None, SeriesLayout::Row) => rows.len(),
                    (None, SeriesLayout::Column) => rows.first().and_then(Value::as_array).map_or(0, Vec::len),
                });
            }
            (SourceData::Items(rows), SourceFormat::ObjectRows) => {
                if dims.is_none() {
                    dims = rows
                        .iter()
                        .find_map(Value::as_object)
                        .map(|obj| obj.keys().map(|k| DimensionDefinition::named(k.as_str())).collect());
                }
            }
            (SourceData::Columns(cols), SourceFormat::KeyedColumns) => {
                if dims.is_none() {
                    dims = Some(cols.iter().map(|(k, _)| DimensionDefinition::named(k.as_str())).collect());
                }
            }
            _ => {}
        }
        source.dimensions_define = dims.map(normalize_dimensions);
        if source.dimensions_detected_count.is_none() {
            source.dimensions_detected_count = source.dimensions_define.as_ref().map(Vec::len);
        }
        debug!(
            format = ?source.format,
            start_index = source.start_index,
            dims = ?source.dimension_names(),
            "dataset source"
        );
        Ok(source)
    }

    pub fn with_dimensions(mut self, dimensions: Option<Vec<DimensionDefinition>>) -> Self {
        if dimensions.is_some() {
            self.dimensions_define = dimensions.map(normalize_dimensions);
        }
        self
    }

    pub fn with_encode(mut self, encode: Option<EncodeDefine>) -> Self {
        if encode.is_some() {
            self.encode_define = encode;
        }
        self
    }

    /// Defined dimension names (`None` for unnamed slots).
    pub fn dimension_names(&self) -> Vec<Option<&str>> {
        self.dimensions_define
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(|d| d.name.as_deref())
            .collect()
    }

    pub fn dimension_index(&self, name: &str) -> Option<usize> {
        self.dimensions_define
            .as_ref()?
            .iter()
            .position(|d| d.name.as_deref() == Some(name))
    }

    /// Original items (series data or object rows), used for per-item names and ids.
    pub fn items(&self) -> &[Value] {
        match &self.data {
            SourceData::Items(items) => items,
            _ => &[],
        }
    }

    /// Number of data items.
    pub fn count(&self) -> usize {
        match (&self.data, self.format) {
            (SourceData::Items(rows), SourceFormat::ArrayRows) => match self.layout {
                SeriesLayout::Column => rows.len().saturating_sub(self.start_index),
                SeriesLayout::Row => rows
                    .first()
                    .and_then(Value::as_array)
                    .map_or(0, |r| r.len().saturating_sub(self.start_index)),
            },
            (SourceData::Items(items), _) => items.len(),
            (SourceData::Columns(cols), _) => {
                let first = self
                    .dimensions_define
                    .as_ref()
                    .and_then(|d| d.first())
                    .and_then(|d| d.name.as_deref());
                first
                    .and_then(|n| cols.iter().find(|(k, _)| k == n))
                    .or_else(|| cols.first())
                    .map_or(0, |(_, c)| c.len())
            }
            (SourceData::Typed { values, width }, _) => values.len() / width,
        }
    }

    /// Raw cell of one item in one data dimension; `property` names the dimension for
    /// object rows and keyed columns.
    pub fn cell(&self, data_index: usize, dim_index: usize, property: &str) -> RawCell<'_> {
        fn json(v: Option<&Value>) -> RawCell<'_> {
            v.map_or(RawCell::Missing, RawCell::Json)
        }
        match (&self.data, self.format) {
            (SourceData::Items(items), SourceFormat::Original) => match items.get(data_index) {
                None => RawCell::Missing,
                Some(item) => match data_item_value(item) {
                    Value::Array(values) => json(values.get(dim_index)),
                    scalar => RawCell::Json(scalar),
                },
            },
            (SourceData::Items(rows), SourceFormat::ArrayRows) => {
                let (row, col) = match self.layout {
                    SeriesLayout::Column => (self.start_index + data_index, dim_index),
                    SeriesLayout::Row => (dim_index, self.start_index + data_index),
                };
                json(rows.get(row).and_then(Value::as_array).and_then(|r| r.get(col)))
            }
            (SourceData::Items(rows), _) => {
                json(rows.get(data_index).and_then(Value::as_object).and_then(|o| o.get(property)))
            }
            (SourceData::Columns(cols), _) => json(
                cols.iter()
                    .find(|(k, _)| k == property)
                    .and_then(|(_, c)| c.get(data_index)),
            ),
            (SourceData::Typed { values, width }, _) => {
                if dim_index >= *width {
                    return RawCell::Missing;
                }
                values
                    .get(data_index * width + dim_index)
                    .map_or(RawCell::Missing, |v| RawCell::Number(*v))
            }
        }
    }

    /// Guess whether a data dimension holds categories from its define or a few samples.
    pub fn guess_ordinal(&self, dim_index: usize) -> BeOrdinal {
        if matches!(self.data, SourceData::Typed { .. }) {
            return BeOrdinal::Not;
        }
        let def = self.dimensions_define.as_ref().and_then(|d| d.get(dim_index));
        if let Some(t) = def.and_then(|d| d.dim_type) {
            return if t == crate::types::DimensionType::Ordinal { BeOrdinal::Must } else { BeOrdinal::Not };
        }
        let dim_name = def.and_then(|d| d.name.as_deref());

        match (&self.data, self.format) {
            (SourceData::Items(rows), SourceFormat::ArrayRows) => match self.layout {
                SeriesLayout::Row => {
                    let sample = rows.get(dim_index).and_then(Value::as_array);
                    let len = sample.map_or(0, Vec::len);
                    scan_samples((0..len).map(|i| sample.and_then(|s| s.get(self.start_index + i))))
                }
                SeriesLayout::Column => scan_samples((0..rows.len()).map(|i| {
                    rows.get(self.start_index + i)
                        .and_then(Value::as_array)
                        .and_then(|r| r.get(dim_index))
                })),
            },
            (SourceData::Items(rows), SourceFormat::ObjectRows) => match dim_name {
                None => BeOrdinal::Not,
                Some(name) => scan_samples(rows.iter().map(|r| r.as_object().and_then(|o| o.get(name)))),
            },
            (SourceData::Columns(cols), _) => match dim_name.and_then(|n| cols.iter().find(|(k, _)| k == n)) {
                None => BeOrdinal::Not,
                Some((_, col)) => scan_samples(col.iter().map(Some)),
            },
            (SourceData::Items(items), SourceFormat::Original) => {
                for item in items.iter().take(GUESS_ORDINAL_SAMPLES) {
                    let Value::Array(values) = data_item_value(item) else {
                        return BeOrdinal::Not;
                    };
                    if let Some(result) = values.get(dim_index).and_then(detect_value) {
                        return result;
                    }
                }
                BeOrdinal::Not
            }
            _ => BeOrdinal::Not,
        }
    }
}

fn scan_samples<'a>(values: impl Iterator<Item = Option<&'a Value>>) -> BeOrdinal {
    for v in values.take(GUESS_ORDINAL_SAMPLES) {
        if let Some(result) = v.and_then(detect_value) {
            return result;
        }
    }
    BeOrdinal::Not
}

/// Header lines of array rows in `auto` mode: 1 when the first line holds only strings.
fn detect_header(rows: &[Value], layout: SeriesLayout) -> usize {
    let mut start: Option<usize> = None;
    array_rows_travel_first(rows, layout, HEADER_DETECT_SAMPLES, |v, _| match v {
        Value::Null => {}
        Value::String(s) if s == "-" => {}
        Value::String(_) => {
            start.get_or_insert(1);
        }
        _ => start = Some(0),
    });
    start.unwrap_or(0)
}

/// Visit the first line of array rows: the first row (column layout) or the first value of
/// every row (row layout).
fn array_rows_travel_first(rows: &[Value], layout: SeriesLayout, max: usize, mut cb: impl FnMut(&Value, usize)) {
    match layout {
        SeriesLayout::Row => {
            for (i, row) in rows.iter().take(max).enumerate() {
                cb(row.as_array().and_then(|r| r.first()).unwrap_or(&NULL), i);
            }
        }
        SeriesLayout::Column => {
            if let Some(first) = rows.first().and_then(Value::as_array) {
                for (i, v) in first.iter().take(max).enumerate() {
                    cb(v, i);
                }
            }
        }
    }
}

static NULL: Value = Value::Null;

fn detect_value(v: &Value) -> Option<BeOrdinal> {
    match v {
        Value::Null => None,
        Value::Number(_) | Value::Bool(_) | Value::Array(_) => Some(BeOrdinal::Not),
        Value::String(s) if s.is_empty() => Some(BeOrdinal::Must),
        Value::String(s) if js_number(s).is_finite() => Some(BeOrdinal::Might),
        Value::String(s) if s == "-" => None,
        Value::String(_) => Some(BeOrdinal::Must),
        Value::Object(_) => None,
    }
}

/// Give unnamed-safe display names and suffix repeated names with `-1`, `-2`, ...
pub fn normalize_dimensions(dims: Vec<DimensionDefinition>) -> Vec<DimensionDefinition> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    dims.into_iter()
        .map(|mut def| {
            let Some(name) = def.name.take() else { return def };
            if def.display_name.is_none() {
                def.display_name = Some(name.clone());
            }
            let count = seen.entry(name.clone()).or_insert(0);
            def.name = Some(if *count == 0 { name } else { format!("{name}-{count}") });
            *count += 1;
            def
        })
        .collect()
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
