// File: crates/chart-data/src/stack.rs
// Summary: Stack defaults for series dimensions and the stack calculation across series.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dimensions::SeriesDimensionDefine;
use crate::error::{DataError, DataResult};
use crate::series::SeriesModel;
use crate::series_data::SeriesData;
use crate::types::OtherDims;

/// Which previous values a value may stack on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackStrategy {
    /// Positive on positive, negative on negative.
    #[default]
    Samesign,
    All,
    Positive,
    Negative,
}

impl StackStrategy {
    fn accepts(self, sum: f64, base: f64) -> bool {
        match self {
            StackStrategy::All => true,
            StackStrategy::Positive => base > 0.0,
            StackStrategy::Negative => base < 0.0,
            StackStrategy::Samesign => (sum >= 0.0 && base > 0.0) || (sum <= 0.0 && base < 0.0),
        }
    }
}

/// Dimension names the stack calculation reads and writes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackCalculationInfo {
    pub stacked_dimension: Option<String>,
    pub stacked_by_dimension: Option<String>,
    pub is_stacked_by_index: bool,
    pub stacked_over_dimension: Option<String>,
    pub stack_result_dimension: Option<String>,
    /// Id of the series this one is stacked on.
    pub stacked_on_series: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct StackOptions {
    /// Stack by item index even when an ordinal dimension exists.
    pub by_index: bool,
    /// Only stack the dimension mapped to this coordinate dimension.
    pub stacked_coord_dimension: Option<String>,
}

/// Pick the stacked and "stacked by" dimensions and append the two calculation dimensions.
/// Series without a stack group get an empty info and unchanged dimensions.
pub fn enable_data_stack(
    series: &SeriesModel,
    dims: &mut Vec<SeriesDimensionDefine>,
    opt: &StackOptions,
) -> StackCalculationInfo {
    let mut by_index = opt.by_index;
    let mut stacked_by: Option<usize> = None;
    let mut stacked: Option<usize> = None;

    if series.may_stack() {
        for (i, dim) in dims.iter().enumerate() {
            if dim.is_extra_coord {
                continue;
            }
            if !by_index && stacked_by.is_none() && dim.ordinal_meta.is_some() {
                stacked_by = Some(i);
            }
            let coord_ok = opt
                .stacked_coord_dimension
                .as_deref()
                .map_or(true, |c| c == dim.coord_dim);
            if stacked.is_none() && dim.dim_type.is_stackable() && coord_ok {
                stacked = Some(i);
            }
        }
    }

    let Some(stacked) = stacked else {
        return StackCalculationInfo { is_stacked_by_index: by_index, ..StackCalculationInfo::default() };
    };
    if stacked_by.is_none() {
        by_index = true;
    }
    if let Some(i) = stacked_by {
        dims[i].create_inverted_indices = true;
    }

    let result_name = format!("__ec_stack_result_{}", series.id);
    let over_name = format!("__ec_stacked_over_{}", series.id);
    let coord_dim = dims[stacked].coord_dim.clone();
    let dim_type = dims[stacked].dim_type;
    let coord_dim_index = dims.iter().filter(|d| d.coord_dim == coord_dim).count();
    let next_store = dims.iter().map(|d| d.store_dim_index + 1).max().unwrap_or(0);

    let calc_dim = |name: &str, coord: &str, index: usize, store: usize| SeriesDimensionDefine {
        name: name.to_string(),
        display_name: None,
        dim_type,
        coord_dim: coord.to_string(),
        coord_dim_index: index,
        other_dims: OtherDims::default(),
        is_extra_coord: true,
        is_calculation_coord: true,
        ordinal_meta: None,
        create_inverted_indices: false,
        store_dim_index: store,
        default_tooltip: None,
    };
    dims.push(calc_dim(&result_name, &coord_dim, coord_dim_index, next_store));
    dims.push(calc_dim(&over_name, &over_name, coord_dim_index + 1, next_store + 1));

    let info = StackCalculationInfo {
        stacked_dimension: Some(dims[stacked].name.clone()),
        stacked_by_dimension: stacked_by.map(|i| dims[i].name.clone()),
        is_stacked_by_index: by_index,
        stacked_over_dimension: Some(over_name),
        stack_result_dimension: Some(result_name),
        stacked_on_series: None,
    };
    debug!(series = %series.id, ?info, "stack enabled");
    info
}

/// Run the stack calculation for every stack group, in series order.
pub fn calculate_stacks(all: &mut [SeriesData]) -> DataResult<()> {
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    let mut group_of: HashMap<String, usize> = HashMap::new();
    for (i, data) in all.iter().enumerate() {
        let Some(stack) = data.stack() else { continue };
        let info = data.calculation_info();
        if info.stacked_dimension.is_none()
            || !(info.is_stacked_by_index || info.stacked_by_dimension.is_some())
        {
            continue;
        }
        let g = *group_of.entry(stack.to_string()).or_insert_with(|| {
            groups.push((stack.to_string(), Vec::new()));
            groups.len() - 1
        });
        groups[g].1.push(i);
    }
    for (stack, members) in &groups {
        debug!(stack = %stack, series = members.len(), "calculating stack");
        calculate_stack_group(all, members)?;
    }
    Ok(())
}

/// Stack the series at `members` (strictly ascending indices into `all`) on each other.
pub fn calculate_stack_group(all: &mut [SeriesData], members: &[usize]) -> DataResult<()> {
    let ascending = members.windows(2).all(|w| w[0] < w[1]);
    if !ascending || members.last().is_some_and(|&last| last >= all.len()) {
        return Err(DataError::InvalidStackGroup(members.to_vec()));
    }
    for (k, &target_idx) in members.iter().enumerate() {
        let (before, rest) = all.split_at_mut(target_idx);
        let target = &mut rest[0];
        let previous: Vec<&SeriesData> = members[..k].iter().map(|&p| &before[p]).collect();

        let info = target.calculation_info().clone();
        let (Some(stacked_dim), Some(result_dim), Some(over_dim)) = (
            info.stacked_dimension.as_deref(),
            info.stack_result_dimension.as_deref(),
            info.stacked_over_dimension.as_deref(),
        ) else {
            warn!(series = %target.series_id(), "stack group member without stack dimensions");
            continue;
        };
        let strategy = target.stack_strategy();

        let mut results = Vec::with_capacity(target.count());
        for i in 0..target.count() {
            let mut sum = target.get(stacked_dim, i);
            if sum.is_nan() {
                results.push((f64::NAN, f64::NAN));
                continue;
            }
            let by_value = info.stacked_by_dimension.as_deref().map(|d| target.get(d, i));
            let mut over = f64::NAN;
            for prev in previous.iter().rev() {
                let prev_info = prev.calculation_info();
                let Some(prev_result) = prev_info.stack_result_dimension.as_deref() else { continue };
                let raw = if info.is_stacked_by_index {
                    Some(target.raw_index(i))
                } else {
                    match (prev_info.stacked_by_dimension.as_deref(), by_value) {
                        (Some(by_dim), Some(v)) => prev.raw_index_of(by_dim, v)?,
                        _ => None,
                    }
                };
                let Some(raw) = raw else { continue };
                let base = prev.get_by_raw_index(prev_result, raw);
                if strategy.accepts(sum, base) {
                    sum = add_safe(sum, base);
                    over = base;
                    break;
                }
            }
            results.push((sum, over));
        }

        target.modify(&[result_dim, over_dim], |i, vals| {
            vals[0] = results[i].0;
            vals[1] = results[i].1;
        })?;
        target.calculation_info_mut().stacked_on_series = previous.last().map(|p| p.series_id().to_string());
    }
    Ok(())
}

/// Add two values and round to the larger decimal precision of the operands, so that
/// `0.1 + 0.2` stacks to `0.3`.
/// Operands finer than 20 decimals are summed without rounding.
pub fn add_safe(a: f64, b: f64) -> f64 {
    let precision = precision_of(a).max(precision_of(b));
    let sum = a + b;
    if precision > 20 || !sum.is_finite() {
        return sum;
    }
    format!("{:.*}", precision, sum).parse().unwrap_or(sum)
}

/// Number of decimal digits in the shortest representation of `v`.
fn precision_of(v: f64) -> usize {
    if !v.is_finite() {
        return 0;
    }
    let s = v.to_string();
    s.split_once('.').map_or(0, |(_, frac)| frac.len())
}
