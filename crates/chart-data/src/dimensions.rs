// File: crates/chart-data/src/dimensions.rs
// Summary: Dimension definitions and the resolution of data dimensions into coordinate roles.
// Notes:
// - `create_dimensions` decides, for every data dimension of a source, which coordinate
//   dimension (or visual role) it feeds, its name and its storage type.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer};
use tracing::{debug, trace, warn};

use crate::encode::{DimensionRef, EncodeDefine, EncodeTarget};
use crate::ordinal::SharedOrdinalMeta;
use crate::source::{BeOrdinal, Source};
use crate::types::{DimensionType, OtherDims, VisualDimension, DEFAULT_EXTRA_COORD};

/// Loose dimension definition: from a coordinate system, a `dimensions` option, or a header.
#[derive(Clone, Debug, Default)]
pub struct DimensionDefinition {
    pub name: Option<String>,
    pub dim_type: Option<DimensionType>,
    pub display_name: Option<String>,
    pub ordinal_meta: Option<SharedOrdinalMeta>,
    /// Data dimensions one coordinate dimension spans (e.g. open/close/low/high on `y`).
    pub dims_def: Option<Vec<DimensionDefinition>>,
    pub other_dims: OtherDims,
    pub default_tooltip: Option<bool>,
}

impl DimensionDefinition {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::default() }
    }

    pub fn with_type(mut self, dim_type: DimensionType) -> Self {
        self.dim_type = Some(dim_type);
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_dims_def(mut self, dims_def: Vec<DimensionDefinition>) -> Self {
        self.dims_def = Some(dims_def);
        self
    }

    pub fn with_other_dim(mut self, role: VisualDimension, pos: usize) -> Self {
        self.other_dims.set(role, Some(pos));
        self
    }

    /// Number of data dimensions this definition occupies.
    pub fn data_dim_count(&self) -> usize {
        self.dims_def.as_ref().map_or(1, Vec::len)
    }
}

impl From<&str> for DimensionDefinition {
    fn from(name: &str) -> Self { Self::named(name) }
}

impl From<String> for DimensionDefinition {
    fn from(name: String) -> Self { Self::named(name) }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DimensionDefinitionRepr {
    Name(String),
    Full {
        name: Option<String>,
        #[serde(rename = "type")]
        dim_type: Option<DimensionType>,
        #[serde(rename = "displayName")]
        display_name: Option<String>,
    },
    Unnamed(()),
}

impl<'de> Deserialize<'de> for DimensionDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match DimensionDefinitionRepr::deserialize(deserializer)? {
            DimensionDefinitionRepr::Name(name) => Self::named(name),
            DimensionDefinitionRepr::Full { name, dim_type, display_name } => {
                Self { name, dim_type, display_name, ..Self::default() }
            }
            DimensionDefinitionRepr::Unnamed(()) => Self::default(),
        })
    }
}

/// Fully resolved dimension of a `SeriesData`.
#[derive(Clone, Debug)]
pub struct SeriesDimensionDefine {
    pub name: String,
    pub display_name: Option<String>,
    pub dim_type: DimensionType,
    pub coord_dim: String,
    pub coord_dim_index: usize,
    pub other_dims: OtherDims,
    /// Not claimed by the coordinate system (or beyond the generated coordinate count).
    pub is_extra_coord: bool,
    /// Filled by a calculation (stacking) rather than read from the source.
    pub is_calculation_coord: bool,
    pub ordinal_meta: Option<SharedOrdinalMeta>,
    pub create_inverted_indices: bool,
    pub store_dim_index: usize,
    pub default_tooltip: Option<bool>,
}

impl SeriesDimensionDefine {
    pub fn is_ordinal(&self) -> bool {
        self.dim_type == DimensionType::Ordinal
    }
}

/// Inputs of `create_dimensions` besides the source.
#[derive(Default)]
pub struct CreateDimensionsOptions<'a> {
    pub coord_dimensions: Vec<DimensionDefinition>,
    /// Overrides the source's own dimension defines.
    pub dimensions_define: Option<Vec<DimensionDefinition>>,
    /// Overrides the source's encode.
    pub encode_define: Option<EncodeDefine>,
    /// Consulted when no encode is given; receives the source and the dimension count.
    pub encode_defaulter: Option<&'a dyn Fn(&Source, usize) -> EncodeDefine>,
    pub dimensions_count: Option<usize>,
    /// Name used for generated coordinate dimensions instead of `value`.
    pub generate_coord: Option<String>,
    /// Number of generated coordinate dims that are not extra; numbering starts at zero.
    pub generate_coord_count: Option<usize>,
}

/// Work item while resolving; becomes a `SeriesDimensionDefine` at the end.
#[derive(Clone, Debug, Default)]
struct Pending {
    name: Option<String>,
    display_name: Option<String>,
    dim_type: Option<DimensionType>,
    coord_dim: Option<String>,
    coord_dim_index: usize,
    other_dims: OtherDims,
    is_extra_coord: bool,
    ordinal_meta: Option<SharedOrdinalMeta>,
    store_dim_index: usize,
    default_tooltip: Option<bool>,
}

fn dim_count_of(
    source: &Source,
    coord_dims: &[DimensionDefinition],
    dims_def: &[DimensionDefinition],
    requested: Option<usize>,
) -> usize {
    let mut count = source.dimensions_detected_count.unwrap_or(1).max(1)
        .max(coord_dims.len())
        .max(dims_def.len())
        .max(requested.unwrap_or(0));
    for def in coord_dims {
        if let Some(sub) = &def.dims_def {
            count = count.max(sub.len());
        }
    }
    count
}

/// Resolve the dimension list of a series from its source and coordinate definitions.
pub fn create_dimensions(source: &Source, opt: CreateDimensionsOptions<'_>) -> Vec<SeriesDimensionDefine> {
    let coord_dims = &opt.coord_dimensions;
    let using_source_defs = opt.dimensions_define.is_none();
    let dims_def: &[DimensionDefinition] = match &opt.dimensions_define {
        Some(d) => d,
        None => source.dimensions_define.as_deref().unwrap_or(&[]),
    };
    let dim_count = dim_count_of(source, coord_dims, dims_def, opt.dimensions_count);

    let data_dim_names: HashMap<&str, usize> = dims_def
        .iter()
        .enumerate()
        .filter_map(|(i, d)| d.name.as_deref().map(|n| (n, i)))
        .fold(HashMap::new(), |mut m, (n, i)| { m.entry(n).or_insert(i); m });

    let encode = opt.encode_define.clone()
        .or_else(|| source.encode_define.clone())
        .or_else(|| opt.encode_defaulter.map(|f| f(source, dim_count)));

    // Every data dimension gets a slot up front, carrying what its define says.
    let mut items: Vec<Pending> = (0..dim_count)
        .map(|i| {
            let mut item = Pending { store_dim_index: i, ..Pending::default() };
            if let Some(def) = dims_def.get(i) {
                if let Some(name) = def.name.as_deref().filter(|n| data_dim_names.contains_key(n)) {
                    item.name = Some(name.to_string());
                    item.display_name = Some(name.to_string());
                }
                if def.dim_type.is_some() { item.dim_type = def.dim_type; }
                if def.display_name.is_some() { item.display_name = def.display_name.clone(); }
            }
            item
        })
        .collect();

    let mut coord_dim_names: HashSet<String> = HashSet::new();
    let apply_dim = |item: &mut Pending, coord_dim: &str, index: usize, names: &mut HashSet<String>| {
        if let Some(role) = VisualDimension::from_key(coord_dim) {
            item.other_dims.set(role, Some(index));
        } else {
            item.coord_dim = Some(coord_dim.to_string());
            item.coord_dim_index = index;
            names.insert(coord_dim.to_string());
        }
    };

    // Encoded coordinate dims first; remember which ones were disabled.
    // Encoded data dims per coordinate dim, as (position in the encode list, data dim).
    let mut encoded: HashMap<String, Option<Vec<(usize, usize)>>> = HashMap::new();
    if let Some(encode) = &encode {
        for (coord_dim, target) in encode.entries() {
            let refs = match target {
                EncodeTarget::Disabled => {
                    encoded.insert(coord_dim.clone(), None);
                    continue;
                }
                EncodeTarget::Dims(refs) => refs,
            };
            let mut valid = Vec::with_capacity(refs.len());
            for (pos, r) in refs.iter().enumerate() {
                let idx = match r {
                    DimensionRef::Index(i) => Some(*i),
                    DimensionRef::Name(n) => data_dim_names.get(n.as_str()).copied(),
                };
                match idx {
                    Some(i) if i < dim_count => {
                        valid.push((pos, i));
                        apply_dim(&mut items[i], coord_dim, pos, &mut coord_dim_names);
                    }
                    _ => warn!(coord_dim = %coord_dim, dim = ?r, "encode refers to a missing data dimension"),
                }
            }
            encoded.insert(coord_dim.clone(), Some(valid));
        }
    }

    // Coordinate definitions claim data dims in order.
    let mut avail = 0usize;
    for sys_def in coord_dims {
        let Some(coord_dim) = sys_def.name.as_deref() else { continue };
        let data_dims = match encoded.get(coord_dim) {
            Some(None) => continue,
            Some(Some(dims)) if !dims.is_empty() => dims.clone(),
            _ => {
                let mut dims = Vec::new();
                for _ in 0..sys_def.data_dim_count() {
                    while avail < dim_count && items[avail].coord_dim.is_some() {
                        avail += 1;
                    }
                    if avail < dim_count {
                        dims.push((dims.len(), avail));
                        avail += 1;
                    }
                }
                dims
            }
        };

        for &(coord_dim_index, data_idx) in &data_dims {
            let item = &mut items[data_idx];
            if using_source_defs {
                if let Some(t) = sys_def.dim_type { item.dim_type = Some(t); }
            }
            if item.dim_type.is_none() { item.dim_type = sys_def.dim_type; }
            if item.display_name.is_none() { item.display_name = sys_def.display_name.clone(); }
            if item.ordinal_meta.is_none() { item.ordinal_meta = sys_def.ordinal_meta.clone(); }
            if item.default_tooltip.is_none() { item.default_tooltip = sys_def.default_tooltip; }
            apply_dim(item, coord_dim, coord_dim_index, &mut coord_dim_names);
            if item.name.is_none() {
                if let Some(sub) = sys_def.dims_def.as_ref().and_then(|d| d.get(coord_dim_index)) {
                    item.name = sub.name.clone();
                    item.display_name = sub.name.clone();
                    item.default_tooltip = sub.default_tooltip;
                }
            }
            item.other_dims.merge_defaults(&sys_def.other_dims);
        }
    }

    // Unclaimed dims get generated coordinate names.
    let generate_coord = opt.generate_coord.as_deref();
    let from_zero = opt.generate_coord_count.is_some();
    let mut generate_left: isize = match generate_coord {
        Some(_) => opt.generate_coord_count.unwrap_or(1).max(1) as isize,
        None => 0,
    };
    let extra = generate_coord.unwrap_or(DEFAULT_EXTRA_COORD);

    for (idx, item) in items.iter_mut().enumerate() {
        if item.coord_dim.is_none() {
            item.coord_dim = Some(gen_coord_dim_name(extra, &mut coord_dim_names, from_zero));
            item.coord_dim_index = 0;
            if generate_coord.is_none() || generate_left <= 0 {
                item.is_extra_coord = true;
            }
            generate_left -= 1;
        }
        if item.name.is_none() {
            item.name = item.coord_dim.clone();
        }
        if item.dim_type.is_none() {
            let carries_name = item.other_dims.item_name.is_some() || item.other_dims.series_name.is_some();
            if source.guess_ordinal(idx) == BeOrdinal::Must || (item.is_extra_coord && carries_name) {
                item.dim_type = Some(DimensionType::Ordinal);
            }
        }
        trace!(index = idx, name = ?item.name, coord_dim = ?item.coord_dim, ty = ?item.dim_type, "resolved dimension");
    }

    let mut result: Vec<SeriesDimensionDefine> = items
        .into_iter()
        .map(|p| SeriesDimensionDefine {
            name: p.name.unwrap_or_default(),
            display_name: p.display_name,
            dim_type: p.dim_type.unwrap_or_default(),
            coord_dim: p.coord_dim.unwrap_or_default(),
            coord_dim_index: p.coord_dim_index,
            other_dims: p.other_dims,
            is_extra_coord: p.is_extra_coord,
            is_calculation_coord: false,
            ordinal_meta: p.ordinal_meta,
            create_inverted_indices: false,
            store_dim_index: p.store_dim_index,
            default_tooltip: p.default_tooltip,
        })
        .collect();

    remove_duplication(&mut result);
    debug!(count = result.len(), "created series dimensions");
    result
}

/// `name` itself when free, otherwise the first free `name{i}`; numbered from zero on request.
fn gen_coord_dim_name(name: &str, taken: &mut HashSet<String>, from_zero: bool) -> String {
    let mut out = name.to_string();
    if from_zero || taken.contains(name) {
        let mut i = 0usize;
        while taken.contains(&format!("{name}{i}")) {
            i += 1;
        }
        out = format!("{name}{i}");
    }
    taken.insert(out.clone());
    out
}

/// Second and later occurrences of a name become `name0`, `name1`, ...
fn remove_duplication(dims: &mut [SeriesDimensionDefine]) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for dim in dims.iter_mut() {
        let count = seen.entry(dim.name.clone()).or_insert(0);
        if *count > 0 {
            dim.name = format!("{}{}", dim.name, *count - 1);
        }
        *count += 1;
    }
}
