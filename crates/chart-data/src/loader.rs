// File: crates/chart-data/src/loader.rs
// Summary: Load chart options from JSON files and dataset sources from CSV files.
// Notes:
// - CSV: first row is the header; numeric cells become numbers, empty cells null.

use std::path::Path;

use serde_json::{Number, Value};
use tracing::{debug, info};

use crate::axis::AxisType;
use crate::error::{DataError, DataResult};
use crate::option::{AxisOption, ChartOption, DatasetOption, SeriesOption};

pub fn load_option_file(path: impl AsRef<Path>) -> DataResult<ChartOption> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let option = ChartOption::from_json_str(&text)?;
    info!(path = %path.display(), series = option.series.len(), datasets = option.dataset.len(), "loaded chart option");
    Ok(option)
}

/// Read a CSV file as array-rows dataset source (header row first).
pub fn load_csv_dataset(path: impl AsRef<Path>) -> DataResult<Value> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers: Vec<Value> = rdr.headers()?.iter().map(|h| Value::String(h.to_string())).collect();
    if headers.is_empty() {
        return Err(DataError::InvalidSource(format!("'{}' has no header row", path.display())));
    }
    debug!(headers = ?headers, "csv headers");

    let mut rows = vec![Value::Array(headers)];
    for rec in rdr.records() {
        let rec = rec?;
        rows.push(Value::Array(rec.iter().map(csv_cell).collect()));
    }
    info!(path = %path.display(), rows = rows.len() - 1, "loaded csv dataset");
    Ok(Value::Array(rows))
}

fn csv_cell(s: &str) -> Value {
    if s.is_empty() {
        return Value::Null;
    }
    match s.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(n) => Value::Number(n),
        None => Value::String(s.to_string()),
    }
}

/// Chart option over a CSV dataset: the first column on a category x axis and one series of
/// `series_type` per remaining column, with encodes left to the dataset defaults.
pub fn chart_option_for_csv(path: impl AsRef<Path>, series_type: &str) -> DataResult<ChartOption> {
    let source = load_csv_dataset(path)?;
    let columns = source
        .as_array()
        .and_then(|rows| rows.first())
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    Ok(ChartOption {
        x_axis: vec![AxisOption { axis_type: Some(AxisType::Category), ..AxisOption::default() }],
        y_axis: vec![AxisOption { axis_type: Some(AxisType::Value), ..AxisOption::default() }],
        dataset: vec![DatasetOption { source, ..DatasetOption::default() }],
        series: (1..columns)
            .map(|_| SeriesOption { series_type: series_type.to_string(), ..SeriesOption::default() })
            .collect(),
        ..ChartOption::default()
    })
}
