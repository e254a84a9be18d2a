//! Export per-measurement results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::MeasurementResidual;
use crate::error::AppError;

/// Header row of the results CSV.
pub const RESULTS_HEADER: &str = "concurrency,throughput,latency,throughput_fit,residual";

/// Write per-measurement results to a CSV file.
pub fn write_results_csv(path: &Path, residuals: &[MeasurementResidual]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;
    let mut out = BufWriter::new(file);

    writeln!(out, "{RESULTS_HEADER}")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in residuals {
        let m = &r.measurement;
        writeln!(
            out,
            "{:.6},{:.6},{:.10},{:.6},{:.6}",
            m.concurrency(),
            m.throughput(),
            m.latency(),
            r.throughput_fit,
            r.residual,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;

    Ok(())
}
