// File: crates/chart-data/src/series.rs
// Summary: Series model as consumed by ingestion: coordinate system, axes, stack and encode options.

use crate::axis::AxisModel;
use crate::dimensions::DimensionDefinition;
use crate::encode::EncodeDefine;
use crate::stack::StackStrategy;

/// Axes a series is bound to, per coordinate system kind.
#[derive(Clone, Debug)]
pub enum CoordAxes {
    Cartesian2d { x: AxisModel, y: AxisModel },
    Polar { radius: AxisModel, angle: AxisModel },
    SingleAxis { single: AxisModel },
    /// Parallel axes with their coordinate dimension names (`dim0`, `dim1`, ...).
    Parallel { axes: Vec<(String, AxisModel)> },
}

impl CoordAxes {
    pub fn coord_sys_name(&self) -> &'static str {
        match self {
            CoordAxes::Cartesian2d { .. } => "cartesian2d",
            CoordAxes::Polar { .. } => "polar",
            CoordAxes::SingleAxis { .. } => "singleAxis",
            CoordAxes::Parallel { .. } => "parallel",
        }
    }

    /// Parallel axes named `dim0..dimN` in order.
    pub fn parallel(axes: Vec<AxisModel>) -> Self {
        CoordAxes::Parallel {
            axes: axes.into_iter().enumerate().map(|(i, a)| (format!("dim{i}"), a)).collect(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SeriesModel {
    pub id: String,
    pub name: Option<String>,
    pub series_type: String,
    pub coordinate_system: Option<String>,
    pub coord_axes: Option<CoordAxes>,
    /// Stack group; series with the same group stack on each other.
    pub stack: Option<String>,
    pub stack_strategy: StackStrategy,
    /// User `dimensions` option for series data.
    pub dimensions: Option<Vec<DimensionDefinition>>,
    pub encode: Option<EncodeDefine>,
    /// Id of the dataset the series reads from, if any.
    pub dataset: Option<String>,
}

impl SeriesModel {
    pub fn new(id: impl Into<String>, series_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            series_type: series_type.into(),
            coordinate_system: None,
            coord_axes: None,
            stack: None,
            stack_strategy: StackStrategy::default(),
            dimensions: None,
            encode: None,
            dataset: None,
        }
    }

    /// Bind to axes; the coordinate system name follows the axes.
    pub fn with_axes(mut self, axes: CoordAxes) -> Self {
        self.coordinate_system = Some(axes.coord_sys_name().to_string());
        self.coord_axes = Some(axes);
        self
    }

    pub fn with_coordinate_system(mut self, name: impl Into<String>) -> Self {
        self.coordinate_system = Some(name.into());
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_stack_strategy(mut self, strategy: StackStrategy) -> Self {
        self.stack_strategy = strategy;
        self
    }

    pub fn with_dimensions(mut self, dims: Vec<DimensionDefinition>) -> Self {
        self.dimensions = Some(dims);
        self
    }

    pub fn with_encode(mut self, encode: EncodeDefine) -> Self {
        self.encode = Some(encode);
        self
    }

    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    pub fn may_stack(&self) -> bool {
        self.stack.as_deref().is_some_and(|s| !s.is_empty())
    }
}
