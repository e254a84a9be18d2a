//! Shared "fit pipeline" logic.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> fit (parallel across inputs) -> residuals -> predictions
//!
//! The CLI layer can then focus on presentation.

use crate::domain::{FitConfig, MeasurementResidual, PredictKind};
use crate::error::AppError;
use crate::fit::{Fit, LevenbergMarquardtFitter, build_all};
use crate::io::{IngestedData, load_measurements};
use crate::report::{Prediction, compute_residuals, predictions};

/// All computed outputs for one input file.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub fit: Fit,
    pub residuals: Vec<MeasurementResidual>,
    pub predictions: Vec<Prediction>,
}

/// Execute the full fitting pipeline and return the computed outputs, one per input.
pub fn run_fit(config: &FitConfig) -> Result<Vec<RunOutput>, AppError> {
    validate(config)?;

    let ingests = config
        .inputs
        .iter()
        .map(|path| load_measurements(path, &config.layout))
        .collect::<Result<Vec<_>, _>>()?;

    fit_ingested(config, ingests)
}

/// Fit already-ingested data sets.
///
/// Fits run in parallel; the first failure in input order is reported.
pub fn fit_ingested(
    config: &FitConfig,
    ingests: Vec<IngestedData>,
) -> Result<Vec<RunOutput>, AppError> {
    let fitter = LevenbergMarquardtFitter::new(config.solver);
    let datasets: Vec<_> = ingests.iter().map(|i| i.measurements.clone()).collect();
    let fits = build_all(&fitter, &datasets);

    ingests
        .into_iter()
        .zip(fits)
        .map(|(ingest, fit)| -> Result<RunOutput, AppError> {
            let fit = fit.map_err(|e| {
                let err = AppError::from(e);
                AppError::new(err.exit_code(), format!("{}: {err}", ingest.source.display()))
            })?;
            let residuals = compute_residuals(&ingest.measurements, &fit.model)?;
            let predictions = predictions(&fit.model, &config.points, PredictKind::Throughput);
            Ok(RunOutput {
                ingest,
                fit,
                residuals,
                predictions,
            })
        })
        .collect()
}

fn validate(config: &FitConfig) -> Result<(), AppError> {
    if config.inputs.is_empty() {
        return Err(AppError::new(2, "No input files provided."));
    }
    let exporting = config.export_results.is_some() || config.export_model.is_some();
    if exporting && config.inputs.len() > 1 {
        return Err(AppError::new(
            2,
            "--export-results/--export-model require a single --input.",
        ));
    }
    config
        .solver
        .validate()
        .map_err(|e| AppError::new(2, e.to_string()))?;
    Ok(())
}
