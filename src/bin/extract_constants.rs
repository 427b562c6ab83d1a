//! # Local Constants Extraction Job
//!
//! One-shot batch binary: interpolate every catalog constituent from the
//! configured gridded tidal model at the configured point and persist the
//! resulting constants record next to the model files. Run it whenever the
//! model data or the deployment location changes; prediction in
//! cached-local mode reads the record this job writes.
//!
//! Usage: `extract-constants [config-path]` (defaults to
//! `tide-predictor.toml` in the working directory).

use std::env;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tide_predictor::config::Config;
use tide_predictor::extract;
use tide_predictor::grid::GridModel;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match env::args().nth(1) {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    let settings = config.resolve().context("invalid configuration")?;

    let model = GridModel::load(&settings.model_dir, settings.variant)
        .with_context(|| format!("loading model grids from {}", settings.model_dir.display()))?;
    info!(
        model = settings.variant.file_suffix(),
        constituents = model.available().len(),
        "model loaded"
    );

    let record = extract::extract(&model, settings.latitude, settings.longitude);
    for ((name, amplitude), phase) in record
        .constituents
        .iter()
        .zip(&record.amplitude)
        .zip(&record.phase)
    {
        println!("{name:>8}  A = {amplitude:7.4} m  g = {phase:7.2} deg");
    }

    let path = extract::default_record_path(&settings.model_dir, settings.variant);
    record
        .save(&path)
        .with_context(|| format!("writing constants record to {}", path.display()))?;
    println!(
        "wrote {} constituents to {}",
        record.constituents.len(),
        path.display()
    );

    if record.is_ready() {
        println!("record is ready: all major constituents present");
    } else {
        println!("record is NOT ready: one or more major constituents missing");
    }
    Ok(())
}
