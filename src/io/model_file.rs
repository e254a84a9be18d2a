//! Read/write model JSON files.
//!
//! Model JSON is the portable representation of a fitted model:
//! - the three coefficients (σ, κ, λ)
//! - fit diagnostics
//! - the throughput peak, when the model has one
//! - a precomputed throughput grid for quick plotting
//!
//! The schema is defined by `domain::ModelFile`. `usl predict` reads it back
//! so predictions never require a refit.

use std::fs::File;
use std::path::Path;

use crate::domain::{DatasetStats, ModelFile, ModelGrid, Peak};
use crate::error::AppError;
use crate::fit::Fit;
use crate::models::Model;

/// Points in the saved throughput grid.
pub const GRID_POINTS: usize = 101;

/// Assemble the saved representation of a fit.
///
/// The grid spans the measured concurrency range, extended to cover the peak.
pub fn build_model_file(fit: &Fit, stats: &DatasetStats) -> ModelFile {
    let peak = peak_of(&fit.model);
    let n_max = match peak {
        Some(p) => stats.concurrency_max.max(p.concurrency),
        None => stats.concurrency_max,
    };

    ModelFile {
        tool: "usl".to_string(),
        model: fit.model,
        fit_quality: fit.quality.clone(),
        peak,
        grid: build_grid(&fit.model, stats.concurrency_min, n_max, GRID_POINTS),
    }
}

/// Write a model JSON file.
pub fn write_model_json(path: &Path, model_file: &ModelFile) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create model JSON '{}': {e}", path.display()))
    })?;

    serde_json::to_writer_pretty(file, model_file)
        .map_err(|e| AppError::new(2, format!("Failed to write model JSON: {e}")))?;

    Ok(())
}

/// Read a model JSON file.
pub fn read_model_json(path: &Path) -> Result<ModelFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open model JSON '{}': {e}", path.display()))
    })?;
    let model_file: ModelFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid model JSON: {e}")))?;

    let m = &model_file.model;
    if ![m.sigma(), m.kappa(), m.lambda()].iter().all(|v| v.is_finite()) {
        return Err(AppError::new(
            2,
            format!("Invalid model JSON '{}': coefficients must be finite.", path.display()),
        ));
    }

    Ok(model_file)
}

/// Peak concurrency and throughput, or `None` for a limitless model.
pub fn peak_of(model: &Model) -> Option<Peak> {
    let concurrency = model.max_concurrency().ok()?;
    let throughput = model.max_throughput().ok()?;
    Some(Peak {
        concurrency,
        throughput,
    })
}

fn build_grid(model: &Model, n_min: f64, n_max: f64, n: usize) -> ModelGrid {
    let n = n.max(2);
    let mut c0 = n_min;
    let mut c1 = n_max;
    if !(c0.is_finite() && c1.is_finite()) || c1 < c0 {
        c0 = 1.0;
        c1 = 32.0;
    }
    if (c1 - c0).abs() < 1e-9 {
        c0 = (c0 - 0.5).max(0.5);
        c1 += 0.5;
    }

    let mut concurrency = Vec::with_capacity(n);
    let mut throughput = Vec::with_capacity(n);

    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let c = c0 + u * (c1 - c0);
        concurrency.push(c);
        throughput.push(model.throughput_at_concurrency(c));
    }

    ModelGrid {
        concurrency,
        throughput,
    }
}
