// File: crates/chart-data/src/lib.rs
// Summary: Library entry point; exports the series data ingestion API.

pub mod types;
pub mod error;
pub mod value;
pub mod ordinal;
pub mod axis;
pub mod dimensions;
pub mod encode;
pub mod source;
pub mod coord_sys;
pub mod series;
pub mod coord_info;
pub mod store;
pub mod series_data;
pub mod stack;
pub mod ingest;
pub mod option;
pub mod loader;

pub use axis::{AxisModel, AxisType};
pub use coord_sys::{CoordinateSystem, CoordinateSystemRegistry, StaticCoordinateSystem};
pub use dimensions::{create_dimensions, CreateDimensionsOptions, DimensionDefinition, SeriesDimensionDefine};
pub use encode::{DatasetEncodeState, DimensionRef, EncodeDefine, EncodeTarget};
pub use error::{DataError, DataResult};
pub use ingest::{create_series_data, CreateOptions, EncodeDefaulter, SeriesInput};
pub use loader::{chart_option_for_csv, load_csv_dataset, load_option_file};
pub use option::{ChartModel, ChartOption};
pub use ordinal::{OrdinalMeta, SharedOrdinalMeta};
pub use series::{CoordAxes, SeriesModel};
pub use series_data::SeriesData;
pub use source::{Source, SourceHeader};
pub use stack::{calculate_stacks, enable_data_stack, StackCalculationInfo, StackStrategy};
pub use store::DataStore;
pub use types::{DimensionType, SeriesLayout, SourceFormat, VisualDimension};
