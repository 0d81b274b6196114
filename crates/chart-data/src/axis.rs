// File: crates/chart-data/src/axis.rs
// Summary: Axis model as seen by data ingestion: axis type plus category metadata.

use serde::{Deserialize, Serialize};

use crate::ordinal::{OrdinalMeta, SharedOrdinalMeta};
use crate::types::DimensionType;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisType {
    #[default]
    Value,
    Category,
    Time,
    Log,
}

/// Dimension type implied by an axis type.
pub fn dimension_type_by_axis(axis_type: AxisType) -> DimensionType {
    match axis_type {
        AxisType::Category => DimensionType::Ordinal,
        AxisType::Time => DimensionType::Time,
        AxisType::Value | AxisType::Log => DimensionType::Float,
    }
}

#[derive(Clone, Debug)]
pub struct AxisModel {
    pub axis_type: AxisType,
    /// Set for category axes only.
    ordinal_meta: Option<SharedOrdinalMeta>,
}

impl AxisModel {
    pub fn new(axis_type: AxisType) -> Self {
        let ordinal_meta = (axis_type == AxisType::Category)
            .then(|| OrdinalMeta::collecting().shared());
        Self { axis_type, ordinal_meta }
    }

    pub fn value() -> Self { Self::new(AxisType::Value) }
    pub fn time() -> Self { Self::new(AxisType::Time) }
    pub fn log() -> Self { Self::new(AxisType::Log) }

    /// Category axis; `None` collects categories from the data.
    pub fn category(categories: Option<Vec<String>>, deduplication: bool) -> Self {
        Self {
            axis_type: AxisType::Category,
            ordinal_meta: Some(OrdinalMeta::from_categories(categories, deduplication).shared()),
        }
    }

    pub fn is_category(&self) -> bool { self.axis_type == AxisType::Category }

    pub fn ordinal_meta(&self) -> Option<SharedOrdinalMeta> {
        self.ordinal_meta.clone()
    }

    pub fn dimension_type(&self) -> DimensionType {
        dimension_type_by_axis(self.axis_type)
    }
}
