// File: crates/chart-data/src/option.rs
// Summary: Chart option (JSON) layer: axes, datasets and series resolved into models, then ingested.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, info};

use crate::axis::{AxisModel, AxisType};
use crate::coord_sys::CoordinateSystemRegistry;
use crate::dimensions::DimensionDefinition;
use crate::encode::{DatasetEncodeState, EncodeDefine};
use crate::error::{DataError, DataResult};
use crate::ingest::{create_series_data, CreateOptions, EncodeDefaulter, SeriesInput};
use crate::series::{CoordAxes, SeriesModel};
use crate::series_data::SeriesData;
use crate::source::{Source, SourceHeader};
use crate::stack::{calculate_stacks, StackStrategy};
use crate::types::SeriesLayout;
use crate::value::{data_item_value, format_id_name};

/// Series types that live on a 2-D cartesian grid unless told otherwise.
const CARTESIAN_SERIES: [&str; 8] = [
    "line", "bar", "scatter", "effectScatter", "pictorialBar", "candlestick", "boxplot", "heatmap",
];

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(v) => v,
        OneOrMany::One(t) => vec![t],
    })
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisOption {
    #[serde(rename = "type")]
    pub axis_type: Option<AxisType>,
    /// Category labels: strings, numbers, or `{ value }` objects.
    pub data: Option<Vec<Value>>,
    pub deduplication: Option<bool>,
    /// Parallel axes only: the data dimension this axis shows.
    pub dim: Option<usize>,
    pub polar_index: Option<usize>,
    pub parallel_index: Option<usize>,
}

impl AxisOption {
    fn model(&self, default_type: AxisType) -> AxisModel {
        let axis_type = self.axis_type.unwrap_or(default_type);
        if axis_type != AxisType::Category {
            return AxisModel::new(axis_type);
        }
        let categories = self.data.as_ref().map(|items| {
            items
                .iter()
                .map(|item| format_id_name(data_item_value(item)).unwrap_or_default())
                .collect()
        });
        AxisModel::category(categories, self.deduplication.unwrap_or(true))
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetOption {
    pub id: Option<Value>,
    #[serde(default)]
    pub source: Value,
    pub dimensions: Option<Vec<DimensionDefinition>>,
    /// `"auto"`, a boolean, or a number of header lines.
    pub source_header: Option<Value>,
    pub series_layout_by: Option<SeriesLayout>,
}

impl DatasetOption {
    fn header(&self) -> SourceHeader {
        match &self.source_header {
            Some(Value::Bool(b)) => SourceHeader::Flag(*b),
            Some(Value::Number(n)) => n.as_u64().map_or(SourceHeader::Auto, |n| SourceHeader::Count(n as usize)),
            _ => SourceHeader::Auto,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesOption {
    #[serde(rename = "type")]
    pub series_type: String,
    pub id: Option<Value>,
    pub name: Option<Value>,
    pub coordinate_system: Option<String>,
    pub x_axis_index: Option<usize>,
    pub y_axis_index: Option<usize>,
    pub polar_index: Option<usize>,
    pub single_axis_index: Option<usize>,
    pub parallel_index: Option<usize>,
    pub data: Option<Value>,
    pub dataset_index: Option<usize>,
    pub series_layout_by: Option<SeriesLayout>,
    pub dimensions: Option<Vec<DimensionDefinition>>,
    pub encode: Option<Value>,
    pub stack: Option<String>,
    pub stack_strategy: Option<StackStrategy>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOption {
    #[serde(default, deserialize_with = "one_or_many")]
    pub x_axis: Vec<AxisOption>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub y_axis: Vec<AxisOption>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub radius_axis: Vec<AxisOption>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub angle_axis: Vec<AxisOption>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub single_axis: Vec<AxisOption>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub parallel_axis: Vec<AxisOption>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub dataset: Vec<DatasetOption>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub series: Vec<SeriesOption>,
}

impl ChartOption {
    pub fn from_json_str(s: &str) -> DataResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_value(v: Value) -> DataResult<Self> {
        Ok(serde_json::from_value(v)?)
    }
}

/// One resolved series: its model and where its data comes from.
#[derive(Clone, Debug)]
pub struct ResolvedSeries {
    pub model: SeriesModel,
    pub input: SeriesInput,
}

/// Axis models (with shared category metadata) and resolved series of a chart option.
#[derive(Clone, Debug, Default)]
pub struct ChartModel {
    pub series: Vec<ResolvedSeries>,
}

struct AxisModels {
    x: Vec<AxisModel>,
    y: Vec<AxisModel>,
    radius: Vec<(usize, AxisModel)>,
    angle: Vec<(usize, AxisModel)>,
    single: Vec<AxisModel>,
    /// `(parallel_index, dim, model)`
    parallel: Vec<(usize, usize, AxisModel)>,
}

impl AxisModels {
    fn build(option: &ChartOption) -> Self {
        Self {
            x: option.x_axis.iter().map(|a| a.model(AxisType::Category)).collect(),
            y: option.y_axis.iter().map(|a| a.model(AxisType::Value)).collect(),
            radius: option
                .radius_axis
                .iter()
                .map(|a| (a.polar_index.unwrap_or(0), a.model(AxisType::Value)))
                .collect(),
            angle: option
                .angle_axis
                .iter()
                .map(|a| (a.polar_index.unwrap_or(0), a.model(AxisType::Category)))
                .collect(),
            single: option.single_axis.iter().map(|a| a.model(AxisType::Value)).collect(),
            parallel: option
                .parallel_axis
                .iter()
                .enumerate()
                .map(|(i, a)| (a.parallel_index.unwrap_or(0), a.dim.unwrap_or(i), a.model(AxisType::Value)))
                .collect(),
        }
    }

    fn axes_for(&self, coord_sys: &str, opt: &SeriesOption, series_id: &str) -> DataResult<Option<CoordAxes>> {
        let missing = |kind: &'static str, index: usize| DataError::UnknownAxis {
            series: series_id.to_string(),
            kind,
            index,
        };
        let pick = |list: &[AxisModel], kind: &'static str, index: usize| {
            list.get(index).cloned().ok_or_else(|| missing(kind, index))
        };
        let pick_polar = |list: &[(usize, AxisModel)], kind: &'static str, polar: usize| {
            list.iter()
                .find(|(p, _)| *p == polar)
                .map(|(_, a)| a.clone())
                .ok_or_else(|| missing(kind, polar))
        };
        Ok(match coord_sys {
            "cartesian2d" => Some(CoordAxes::Cartesian2d {
                x: pick(&self.x, "xAxis", opt.x_axis_index.unwrap_or(0))?,
                y: pick(&self.y, "yAxis", opt.y_axis_index.unwrap_or(0))?,
            }),
            "polar" => {
                let polar = opt.polar_index.unwrap_or(0);
                Some(CoordAxes::Polar {
                    radius: pick_polar(&self.radius, "radiusAxis", polar)?,
                    angle: pick_polar(&self.angle, "angleAxis", polar)?,
                })
            }
            "singleAxis" => Some(CoordAxes::SingleAxis {
                single: pick(&self.single, "singleAxis", opt.single_axis_index.unwrap_or(0))?,
            }),
            "parallel" => {
                let index = opt.parallel_index.unwrap_or(0);
                let mut axes: Vec<(usize, AxisModel)> = self
                    .parallel
                    .iter()
                    .filter(|(p, _, _)| *p == index)
                    .map(|(_, dim, a)| (*dim, a.clone()))
                    .collect();
                if axes.is_empty() {
                    return Err(missing("parallelAxis", index));
                }
                axes.sort_by_key(|(dim, _)| *dim);
                Some(CoordAxes::Parallel {
                    axes: axes.into_iter().map(|(dim, a)| (format!("dim{dim}"), a)).collect(),
                })
            }
            _ => None,
        })
    }
}

impl ChartModel {
    /// Resolve axes, datasets and series of an option.
    pub fn from_option(option: &ChartOption) -> DataResult<Self> {
        let axes = AxisModels::build(option);
        let mut dataset_sources: HashMap<(usize, SeriesLayout), Arc<Source>> = HashMap::new();
        let mut series = Vec::with_capacity(option.series.len());

        for (i, opt) in option.series.iter().enumerate() {
            let id = opt.id.as_ref().and_then(format_id_name).unwrap_or_else(|| format!("series{i}"));
            let mut model = SeriesModel::new(id.clone(), opt.series_type.clone());
            model.name = opt.name.as_ref().and_then(format_id_name);
            model.stack = opt.stack.clone();
            model.stack_strategy = opt.stack_strategy.unwrap_or_default();
            model.dimensions = opt.dimensions.clone();
            model.encode = opt.encode.as_ref().map(EncodeDefine::from_json).transpose()?;

            let coord_sys = opt.coordinate_system.clone().or_else(|| {
                CARTESIAN_SERIES
                    .contains(&opt.series_type.as_str())
                    .then(|| "cartesian2d".to_string())
            });
            if let Some(cs) = coord_sys.as_deref() {
                model.coord_axes = axes.axes_for(cs, opt, &id)?;
            }
            model.coordinate_system = coord_sys;

            let input = match &opt.data {
                Some(data) => SeriesInput::Data(data.clone()),
                None if !option.dataset.is_empty() => {
                    let ds_index = opt.dataset_index.unwrap_or(0);
                    let ds = option.dataset.get(ds_index).ok_or_else(|| {
                        DataError::InvalidSource(format!("series '{id}' refers to missing dataset[{ds_index}]"))
                    })?;
                    let layout = opt.series_layout_by.or(ds.series_layout_by).unwrap_or_default();
                    let shared = match dataset_sources.get(&(ds_index, layout)) {
                        Some(src) => Arc::clone(src),
                        None => {
                            let src = Arc::new(Source::from_dataset(
                                ds.source.clone(),
                                ds.header(),
                                layout,
                                ds.dimensions.clone(),
                            )?);
                            dataset_sources.insert((ds_index, layout), Arc::clone(&src));
                            src
                        }
                    };
                    model.dataset = Some(
                        ds.id.as_ref().and_then(format_id_name).unwrap_or_else(|| format!("dataset{ds_index}")),
                    );
                    // Series-level dimensions and encode apply to this series only.
                    let source = if model.dimensions.is_some() || model.encode.is_some() {
                        Arc::new(
                            (*shared)
                                .clone()
                                .with_dimensions(model.dimensions.clone())
                                .with_encode(model.encode.clone()),
                        )
                    } else {
                        shared
                    };
                    SeriesInput::Source(source)
                }
                None => SeriesInput::Data(Value::Null),
            };
            debug!(series = %id, coord_sys = ?model.coordinate_system, dataset = ?model.dataset, "resolved series");
            series.push(ResolvedSeries { model, input });
        }
        Ok(Self { series })
    }

    /// Ingest every series and compute stacks.
    pub fn build_series_data(&self, registry: &CoordinateSystemRegistry) -> DataResult<Vec<SeriesData>> {
        let state = DatasetEncodeState::new();
        let mut out = Vec::with_capacity(self.series.len());
        for s in &self.series {
            if let (None, Some(cs)) = (&s.model.coord_axes, s.model.coordinate_system.as_deref()) {
                if cs != "none" && registry.get(cs).is_none() {
                    return Err(DataError::UnsupportedCoordinateSystem {
                        coord_sys: cs.to_string(),
                        series_type: s.model.series_type.clone(),
                    });
                }
            }
            let opt = CreateOptions {
                encode_defaulter: EncodeDefaulter::AxisCoordSys(&state),
                ..CreateOptions::default()
            };
            out.push(create_series_data(s.input.clone(), &s.model, registry, &opt)?);
        }
        calculate_stacks(&mut out)?;
        info!(series = out.len(), "chart data built");
        Ok(out)
    }
}
