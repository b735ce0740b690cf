//! Stowscan
//!
//! Warehouse location-code lookup: normalizes free-form location input,
//! resolves reference identifiers from the location dataset, renders
//! scannable codes, and runs a camera capture loop that feeds OCR text
//! through the same pipeline.

mod capture;
mod config;
mod dataset;
mod error;
mod gui;
mod history;
mod normalize;
mod ocr;
mod paths;
mod render;
mod search;

use anyhow::{Result, anyhow};
use std::sync::Arc;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stowscan=info".into()),
        )
        .init();

    paths::ensure_directories()?;
    config::init_config();

    // OCR is optional: without tesseract the tool still searches and
    // renders, only the camera scanner stays unavailable.
    if let Err(e) = ocr::find_tesseract_executable() {
        tracing::warn!("{e}");
        tracing::warn!("camera text scanning is disabled until Tesseract is installed");
    }

    let index = Arc::new(dataset::load_index(config::get_config())?);

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        return run_query(&index, &args);
    }

    tracing::info!("starting GUI");
    gui::run_gui(index).map_err(|e| anyhow!("GUI error: {e}"))
}

/// Headless mode: resolve a query, print results, optionally export PNGs.
fn run_query(index: &dataset::LookupIndex, args: &[String]) -> Result<()> {
    let mut export = false;
    let mut terms: Vec<&str> = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--export" => export = true,
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            term => terms.push(term),
        }
    }
    if terms.is_empty() {
        print_usage();
        return Err(anyhow!("no query given"));
    }

    let query = terms.join(" ");
    let results = search::search(index, &query).map_err(|e| anyhow!("{e}"))?;

    for result in &results {
        println!(
            "{:<12} {:<14} {}",
            result.location,
            result.area_type.display_name(),
            result.reference_id
        );
    }

    if export {
        let written = render::export_results(&results, &paths::get_export_dir())?;
        for path in &written {
            println!("wrote {}", path.display());
        }
    }

    Ok(())
}

fn print_usage() {
    println!("Usage: stowscan [QUERY] [--export]");
    println!();
    println!("Without arguments the GUI starts. With a query (e.g. B113A, STG.H02,");
    println!("AX1-AX100) results print to stdout; --export also writes code PNGs.");
}
