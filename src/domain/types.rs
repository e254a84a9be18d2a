//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for predictions

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::Measurement;
use crate::math::SolverConfig;
use crate::models::Model;

/// How to interpret the value column of an input CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Observed throughput at the given concurrency.
    Throughput,
    /// Observed latency at the given concurrency.
    Latency,
}

/// Which quantity to predict at a given concurrency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PredictKind {
    Throughput,
    Latency,
}

/// Column layout of an input CSV.
///
/// Column indexes are 1-based, matching how users count columns in a spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvLayout {
    pub n_col: usize,
    pub value_col: usize,
    pub value_kind: ValueKind,
    pub skip_headers: bool,
}

impl Default for CsvLayout {
    fn default() -> Self {
        Self {
            n_col: 1,
            value_col: 2,
            value_kind: ValueKind::Throughput,
            skip_headers: false,
        }
    }
}

/// A full `usl fit` configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub inputs: Vec<PathBuf>,
    pub layout: CsvLayout,
    /// Concurrency levels at which to print predicted throughput.
    pub points: Vec<f64>,
    pub solver: SolverConfig,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub show_residuals: bool,

    pub export_results: Option<PathBuf>,
    pub export_model: Option<PathBuf>,
}

/// Configuration for synthetic measurement generation.
#[derive(Debug, Clone)]
pub struct SimulateConfig {
    pub model: Model,
    /// Concurrency levels `1..=max_concurrency` are sampled.
    pub max_concurrency: usize,
    /// Relative standard deviation of multiplicative Gaussian noise on throughput.
    pub noise: f64,
    pub seed: u64,
    pub out: Option<PathBuf>,
}

/// Summary stats about the measurements actually used for fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub n_points: usize,
    pub concurrency_min: f64,
    pub concurrency_max: f64,
    pub throughput_min: f64,
    pub throughput_max: f64,
}

impl DatasetStats {
    /// Compute stats over a set of measurements, or `None` if empty or non-finite.
    pub fn from_measurements(measurements: &[Measurement]) -> Option<Self> {
        let mut concurrency_min = f64::INFINITY;
        let mut concurrency_max = f64::NEG_INFINITY;
        let mut throughput_min = f64::INFINITY;
        let mut throughput_max = f64::NEG_INFINITY;

        for m in measurements {
            concurrency_min = concurrency_min.min(m.concurrency());
            concurrency_max = concurrency_max.max(m.concurrency());
            throughput_min = throughput_min.min(m.throughput());
            throughput_max = throughput_max.max(m.throughput());
        }

        let all_finite = [concurrency_min, concurrency_max, throughput_min, throughput_max]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return None;
        }

        Some(Self {
            n_points: measurements.len(),
            concurrency_min,
            concurrency_max,
            throughput_min,
            throughput_max,
        })
    }
}

/// A per-measurement fitted result (used for reporting and exports).
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementResidual {
    pub measurement: Measurement,
    pub throughput_fit: f64,
    /// Observed minus predicted throughput.
    pub residual: f64,
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub n: usize,
    pub sse: f64,
    pub rmse: f64,
    pub iterations: usize,
}

/// Location of the throughput peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub concurrency: f64,
    pub throughput: f64,
}

/// A saved model file (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub model: Model,
    pub fit_quality: FitQuality,
    /// Absent for limitless models.
    pub peak: Option<Peak>,
    pub grid: ModelGrid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelGrid {
    pub concurrency: Vec<f64>,
    pub throughput: Vec<f64>,
}
