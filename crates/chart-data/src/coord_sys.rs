// File: crates/chart-data/src/coord_sys.rs
// Summary: Coordinate system metadata registry (dimension names only; no coordinate math).

use std::collections::HashMap;

use crate::dimensions::DimensionDefinition;
use crate::types::DimensionType;

/// What data ingestion needs to know about a coordinate system.
pub trait CoordinateSystem: Send + Sync {
    fn name(&self) -> &str;

    /// Coordinate dimension names, in order.
    fn dimensions(&self) -> Vec<String>;

    /// Typed dimension definitions, when the system knows more than names.
    fn dimensions_info(&self) -> Option<Vec<DimensionDefinition>> { None }
}

/// Coordinate system described by a fixed list of dimensions.
#[derive(Clone, Debug)]
pub struct StaticCoordinateSystem {
    name: &'static str,
    dims: &'static [(&'static str, Option<DimensionType>)],
}

impl StaticCoordinateSystem {
    pub const fn new(name: &'static str, dims: &'static [(&'static str, Option<DimensionType>)]) -> Self {
        Self { name, dims }
    }
}

impl CoordinateSystem for StaticCoordinateSystem {
    fn name(&self) -> &str { self.name }

    fn dimensions(&self) -> Vec<String> {
        self.dims.iter().map(|(n, _)| n.to_string()).collect()
    }

    fn dimensions_info(&self) -> Option<Vec<DimensionDefinition>> {
        if self.dims.iter().all(|(_, t)| t.is_none()) {
            return None;
        }
        Some(
            self.dims
                .iter()
                .map(|(n, t)| DimensionDefinition { dim_type: *t, ..DimensionDefinition::named(*n) })
                .collect(),
        )
    }
}

pub const CARTESIAN_2D: StaticCoordinateSystem =
    StaticCoordinateSystem::new("cartesian2d", &[("x", None), ("y", None)]);
pub const POLAR: StaticCoordinateSystem =
    StaticCoordinateSystem::new("polar", &[("radius", None), ("angle", None)]);
pub const GEO: StaticCoordinateSystem =
    StaticCoordinateSystem::new("geo", &[("lng", None), ("lat", None)]);
pub const SINGLE_AXIS: StaticCoordinateSystem =
    StaticCoordinateSystem::new("singleAxis", &[("single", None)]);
pub const CALENDAR: StaticCoordinateSystem =
    StaticCoordinateSystem::new("calendar", &[("time", Some(DimensionType::Time)), ("value", None)]);

/// Name -> coordinate system lookup.
#[derive(Default)]
pub struct CoordinateSystemRegistry {
    systems: HashMap<String, Box<dyn CoordinateSystem>>,
}

impl CoordinateSystemRegistry {
    /// Empty registry.
    pub fn new() -> Self { Self::default() }

    /// Registry with the built-in systems.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for system in [CARTESIAN_2D, POLAR, GEO, SINGLE_AXIS, CALENDAR] {
            registry.register(system);
        }
        registry
    }

    /// Register or replace a system under its own name.
    pub fn register(&mut self, system: impl CoordinateSystem + 'static) {
        self.systems.insert(system.name().to_string(), Box::new(system));
    }

    pub fn get(&self, name: &str) -> Option<&dyn CoordinateSystem> {
        self.systems.get(name).map(|b| b.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.systems.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for CoordinateSystemRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("CoordinateSystemRegistry").field("systems", &names).finish()
    }
}
