use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use proptax_data::{import, parse_rows};
use proptax_db_json::JsonStore;
use tracing_subscriber::EnvFilter;

/// Bulk-load property assets from a spreadsheet-exported CSV file into the
/// JSON data directory.
///
/// Headers are matched by name; see the proptax-data crate documentation for
/// the column list. Repeated asset ids merge: each row replaces that asset's
/// snapshot for its year and keeps the other years.
#[derive(Parser, Debug)]
#[command(name = "proptax-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing asset rows
    #[arg(short, long)]
    file: PathBuf,

    /// Directory holding the property-tax JSON data files (created and
    /// seeded with default rate tables if absent)
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,
}

/// How many warnings to print in full; the rest are summarised.
const WARNING_DISPLAY_CAP: usize = 10;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut store = JsonStore::open(&args.data_dir).with_context(|| {
        format!("failed to open data directory: {}", args.data_dir.display())
    })?;

    println!("Loading assets from: {}", args.file.display());

    let file = File::open(&args.file)
        .with_context(|| format!("failed to open: {}", args.file.display()))?;
    let records = parse_rows(file)
        .with_context(|| format!("failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} rows from CSV", records.len());

    let summary = import(&mut store, &records).context("failed to import assets")?;

    println!(
        "Created {} assets, updated {}, {} rows failed.",
        summary.created, summary.updated, summary.failed
    );
    for failure in &summary.failures {
        println!("  failed: {failure}");
    }
    if !summary.warnings.is_empty() {
        println!("{} corrections:", summary.warnings.len());
        for warning in summary.warnings.iter().take(WARNING_DISPLAY_CAP) {
            println!("  {warning}");
        }
        if summary.warnings.len() > WARNING_DISPLAY_CAP {
            println!(
                "  ... and {} more",
                summary.warnings.len() - WARNING_DISPLAY_CAP
            );
        }
    }

    Ok(())
}
