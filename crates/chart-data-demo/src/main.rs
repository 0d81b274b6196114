// File: crates/chart-data-demo/src/main.rs
// Summary: Demo loads a chart option (JSON) or a CSV dataset and prints the series data it builds.

use anyhow::{Context, Result};
use chart_data::{chart_option_for_csv, load_option_file, ChartModel, ChartOption, CoordinateSystemRegistry, SeriesData};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let raw = std::env::args()
        .nth(1)
        .context("usage: chart-data-demo <option.json | data.csv> [series-type]")?;
    let series_type = std::env::args().nth(2).unwrap_or_else(|| "line".to_string());

    let path = resolve_path(&raw)?;
    println!("Using input file: {}", path.display());

    let option = load(&path, &series_type)
        .with_context(|| format!("failed to load '{}'", path.display()))?;
    let model = ChartModel::from_option(&option).context("invalid chart option")?;
    let registry = CoordinateSystemRegistry::with_builtin();
    let all = model
        .build_series_data(&registry)
        .context("failed to build series data")?;

    info!(series = all.len(), "series data ready");
    if all.is_empty() {
        anyhow::bail!("option defines no series");
    }
    for data in &all {
        print_series(data);
    }
    Ok(())
}

fn load(path: &Path, series_type: &str) -> Result<ChartOption> {
    let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    let option = match ext.as_deref() {
        Some("csv") => chart_option_for_csv(path, series_type)?,
        _ => load_option_file(path)?,
    };
    Ok(option)
}

fn resolve_path(raw: &str) -> Result<PathBuf> {
    let p = Path::new(raw);
    if p.exists() {
        return Ok(p.to_path_buf());
    }
    anyhow::bail!("file not found: {}", p.display());
}

fn print_series(data: &SeriesData) {
    println!("series '{}' ({} items)", data.series_id(), data.count());
    if let Some(stack) = data.stack() {
        let on = data.calculation_info().stacked_on_series.as_deref().unwrap_or("-");
        println!("  stack '{}' on {}", stack, on);
    }
    for dim in data.dimensions() {
        let (min, max) = data.data_extent(&dim.name);
        let extent = if min <= max { format!("[{:.4}, {:.4}]", min, max) } else { "empty".to_string() };
        println!(
            "  {:<28} coord={:<8} type={:<8} extent={}",
            dim.name,
            format!("{}[{}]", dim.coord_dim, dim.coord_dim_index),
            format!("{:?}", dim.dim_type).to_lowercase(),
            extent
        );
    }
    let shown = data.count().min(5);
    for i in 0..shown {
        let values: Vec<String> = data.values(i).iter().map(|v| format!("{v}")).collect();
        println!("  #{i} {:<12} [{}]", data.name(i).unwrap_or("-"), values.join(", "));
    }
    if data.count() > shown {
        println!("  ... {} more", data.count() - shown);
    }
}
