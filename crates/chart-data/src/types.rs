// File: crates/chart-data/src/types.rs
// Summary: Shared enums and constants (dimension types, source formats, visual roles).

use serde::{Deserialize, Serialize};

/// Fallback coordinate dimensions when a series has no axis info and no registered system.
pub const DEFAULT_COORD_DIMS: [&str; 2] = ["x", "y"];

/// Generated name for coordinate dimensions the coordinate system does not claim.
pub const DEFAULT_EXTRA_COORD: &str = "value";

/// How many leading samples are inspected when guessing whether a dimension is ordinal.
pub const GUESS_ORDINAL_SAMPLES: usize = 5;

/// How many leading values are inspected when auto-detecting a dataset header.
pub const HEADER_DETECT_SAMPLES: usize = 10;

/// Storage type of a data dimension.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionType {
    #[default]
    Float,
    Int,
    Ordinal,
    Number,
    Time,
}

impl DimensionType {
    /// Ordinal and time dimensions cannot carry stacked values.
    pub const fn is_stackable(self) -> bool {
        !matches!(self, DimensionType::Ordinal | DimensionType::Time)
    }
}

/// Shape of the raw data a `Source` wraps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceFormat {
    /// Series `data` option: scalars, arrays, or `{ value, name, ... }` items.
    Original,
    ArrayRows,
    ObjectRows,
    KeyedColumns,
    TypedArray,
    Unknown,
}

/// Whether dataset rows or dataset columns map to series dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesLayout {
    #[default]
    Column,
    Row,
}

/// Non-coordinate roles a data dimension may play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisualDimension {
    Tooltip,
    Label,
    ItemName,
    ItemId,
    ItemGroupId,
    ItemChildGroupId,
    SeriesName,
}

impl VisualDimension {
    pub const ALL: [VisualDimension; 7] = [
        VisualDimension::Tooltip,
        VisualDimension::Label,
        VisualDimension::ItemName,
        VisualDimension::ItemId,
        VisualDimension::ItemGroupId,
        VisualDimension::ItemChildGroupId,
        VisualDimension::SeriesName,
    ];

    /// Option key used in `encode` maps.
    pub const fn key(self) -> &'static str {
        match self {
            VisualDimension::Tooltip => "tooltip",
            VisualDimension::Label => "label",
            VisualDimension::ItemName => "itemName",
            VisualDimension::ItemId => "itemId",
            VisualDimension::ItemGroupId => "itemGroupId",
            VisualDimension::ItemChildGroupId => "itemChildGroupId",
            VisualDimension::SeriesName => "seriesName",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.key() == key)
    }
}

/// Positions of a data dimension inside each visual role (`None` when not used).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OtherDims {
    pub tooltip: Option<usize>,
    pub label: Option<usize>,
    pub item_name: Option<usize>,
    pub item_id: Option<usize>,
    pub item_group_id: Option<usize>,
    pub item_child_group_id: Option<usize>,
    pub series_name: Option<usize>,
}

impl OtherDims {
    pub fn get(&self, role: VisualDimension) -> Option<usize> {
        match role {
            VisualDimension::Tooltip => self.tooltip,
            VisualDimension::Label => self.label,
            VisualDimension::ItemName => self.item_name,
            VisualDimension::ItemId => self.item_id,
            VisualDimension::ItemGroupId => self.item_group_id,
            VisualDimension::ItemChildGroupId => self.item_child_group_id,
            VisualDimension::SeriesName => self.series_name,
        }
    }

    pub fn set(&mut self, role: VisualDimension, pos: Option<usize>) {
        let slot = match role {
            VisualDimension::Tooltip => &mut self.tooltip,
            VisualDimension::Label => &mut self.label,
            VisualDimension::ItemName => &mut self.item_name,
            VisualDimension::ItemId => &mut self.item_id,
            VisualDimension::ItemGroupId => &mut self.item_group_id,
            VisualDimension::ItemChildGroupId => &mut self.item_child_group_id,
            VisualDimension::SeriesName => &mut self.series_name,
        };
        *slot = pos;
    }

    /// Fill roles that are unset here from `defaults`.
    pub fn merge_defaults(&mut self, defaults: &OtherDims) {
        for role in VisualDimension::ALL {
            if self.get(role).is_none() {
                self.set(role, defaults.get(role));
            }
        }
    }
}
