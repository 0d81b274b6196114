// File: crates/chart-data/src/coord_info.rs
// Summary: Coordinate dimension -> axis lookup for a series, with category axes singled out.

use std::collections::HashMap;

use crate::axis::AxisModel;
use crate::series::{CoordAxes, SeriesModel};

#[derive(Clone, Debug)]
pub struct CoordSysInfo {
    pub coord_sys_name: String,
    pub coord_sys_dims: Vec<String>,
    pub axis_map: HashMap<String, AxisModel>,
    pub category_axis_map: HashMap<String, AxisModel>,
}

impl CoordSysInfo {
    fn new(name: &str) -> Self {
        Self {
            coord_sys_name: name.to_string(),
            coord_sys_dims: Vec::new(),
            axis_map: HashMap::new(),
            category_axis_map: HashMap::new(),
        }
    }

    fn push(&mut self, dim: &str, axis: &AxisModel) {
        self.coord_sys_dims.push(dim.to_string());
        self.axis_map.insert(dim.to_string(), axis.clone());
        if axis.is_category() {
            self.category_axis_map.insert(dim.to_string(), axis.clone());
        }
    }
}

/// Axis info of a series bound to axes; `None` for series without axes (pie, geo, ...).
pub fn coord_sys_info_by_series(series: &SeriesModel) -> Option<CoordSysInfo> {
    let axes = series.coord_axes.as_ref()?;
    let mut info = CoordSysInfo::new(axes.coord_sys_name());
    match axes {
        CoordAxes::Cartesian2d { x, y } => {
            info.push("x", x);
            info.push("y", y);
        }
        CoordAxes::Polar { radius, angle } => {
            info.push("radius", radius);
            info.push("angle", angle);
        }
        CoordAxes::SingleAxis { single } => info.push("single", single),
        CoordAxes::Parallel { axes } => {
            for (dim, axis) in axes {
                info.push(dim, axis);
            }
        }
    }
    Some(info)
}
