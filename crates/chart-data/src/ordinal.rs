// File: crates/chart-data/src/ordinal.rs
// Summary: Category metadata shared by a category axis and the dimensions bound to it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::value::{format_id_name, format_number, RawCell};

/// Ordinal metadata behind a lock; axes and dimensions hold clones of the same `Arc`.
pub type SharedOrdinalMeta = Arc<RwLock<OrdinalMeta>>;

/// Category list plus lookup map.
/// Contract: `map[categories[i]] == i` for every deduplicated category.
#[derive(Clone, Debug, Default)]
pub struct OrdinalMeta {
    categories: Vec<String>,
    need_collect: bool,
    deduplication: bool,
    map: HashMap<String, usize>,
}

impl OrdinalMeta {
    /// Categories given up front are fixed; without them, categories are collected from data.
    pub fn from_categories(categories: Option<Vec<String>>, deduplication: bool) -> Self {
        let need_collect = categories.is_none();
        let categories = categories.unwrap_or_default();
        let mut map = HashMap::with_capacity(categories.len());
        for (i, c) in categories.iter().enumerate() {
            map.entry(c.clone()).or_insert(i);
        }
        Self { categories, need_collect, deduplication, map }
    }

    /// Collecting meta that deduplicates, used for ordinal dims without an axis.
    pub fn collecting() -> Self {
        Self::from_categories(None, true)
    }

    pub fn shared(self) -> SharedOrdinalMeta {
        Arc::new(RwLock::new(self))
    }

    pub fn categories(&self) -> &[String] { &self.categories }
    pub fn len(&self) -> usize { self.categories.len() }
    pub fn is_empty(&self) -> bool { self.categories.is_empty() }
    pub fn need_collect(&self) -> bool { self.need_collect }

    /// Index of a known category.
    pub fn ordinal(&self, category: &str) -> Option<usize> {
        self.map.get(category).copied()
    }

    /// Category label of an ordinal number, if in range.
    pub fn category(&self, ordinal: f64) -> Option<&str> {
        if ordinal.is_finite() && ordinal >= 0.0 && ordinal.fract() == 0.0 {
            self.categories.get(ordinal as usize).map(String::as_str)
        } else {
            None
        }
    }

    /// Map a raw cell to its ordinal number, appending unseen categories when collecting.
    /// Unknown categories of a fixed list become `NaN`.
    pub fn parse_and_collect(&mut self, cell: RawCell<'_>) -> f64 {
        let category = match cell {
            RawCell::Number(n) if !self.need_collect => return n,
            RawCell::Json(Value::Number(n)) if !self.need_collect => {
                return n.as_f64().unwrap_or(f64::NAN)
            }
            RawCell::Missing | RawCell::Json(Value::Null) => return f64::NAN,
            RawCell::Number(n) => format_number(n),
            RawCell::Json(v) => match format_id_name(v) {
                Some(s) => s,
                None => return f64::NAN,
            },
        };

        if self.need_collect && !self.deduplication {
            self.categories.push(category);
            return (self.categories.len() - 1) as f64;
        }

        if let Some(&idx) = self.map.get(&category) {
            return idx as f64;
        }
        if !self.need_collect {
            return f64::NAN;
        }
        let idx = self.categories.len();
        self.map.insert(category.clone(), idx);
        self.categories.push(category);
        idx as f64
    }
}
