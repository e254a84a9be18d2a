//! Command-line parsing for the USL modeler.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{PredictKind, ValueKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "usl",
    version,
    about = "Universal Scalability Law modeler for capacity planning"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a model to measurements, print it, and predict throughput at the given points.
    Fit(FitArgs),
    /// Evaluate a previously exported model JSON at the given points.
    Predict(PredictArgs),
    /// Generate synthetic measurements from known coefficients.
    Simulate(SimulateArgs),
}

/// Options for fitting.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Measurement CSV. Repeat to fit several files independently.
    #[arg(short = 'i', long = "input", value_name = "CSV", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Concurrency levels at which to predict throughput (printed to stdout).
    #[arg(value_name = "POINTS")]
    pub points: Vec<f64>,

    /// 1-based column index of concurrency values.
    #[arg(long, default_value_t = 1)]
    pub n_col: usize,

    /// 1-based column index of the measured values.
    #[arg(long, default_value_t = 2)]
    pub value_col: usize,

    /// Whether the value column holds throughput or latency.
    #[arg(long, value_enum, default_value_t = ValueKind::Throughput)]
    pub value_kind: ValueKind,

    /// Skip the first CSV record.
    #[arg(long)]
    pub skip_headers: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Print the per-measurement residual table.
    #[arg(long)]
    pub residuals: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export per-measurement results to CSV (single input only).
    #[arg(long, value_name = "CSV")]
    pub export_results: Option<PathBuf>,

    /// Export model (coefficients + quality + fitted grid) to JSON (single input only).
    #[arg(long, value_name = "JSON")]
    pub export_model: Option<PathBuf>,

    /// Solver iteration budget.
    #[arg(long, default_value_t = 1000)]
    pub max_iterations: usize,

    /// Initial damping scale.
    #[arg(long, default_value_t = 1e-6)]
    pub tau: f64,

    /// Gradient and step convergence threshold.
    #[arg(long, default_value_t = 1e-8)]
    pub epsilon: f64,
}

/// Options for predicting from a saved model.
#[derive(Debug, Parser)]
pub struct PredictArgs {
    /// Model JSON file produced by `usl fit --export-model`.
    #[arg(long, value_name = "JSON")]
    pub model: PathBuf,

    /// Quantity to predict.
    #[arg(long = "of", value_enum, default_value_t = PredictKind::Throughput)]
    pub of: PredictKind,

    /// Concurrency levels at which to predict.
    #[arg(value_name = "POINTS")]
    pub points: Vec<f64>,

    /// Render the saved throughput grid to stderr.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for synthetic measurement generation.
#[derive(Debug, Parser)]
pub struct SimulateArgs {
    /// Contention coefficient.
    #[arg(long)]
    pub sigma: f64,

    /// Coherency coefficient.
    #[arg(long)]
    pub kappa: f64,

    /// Throughput of a single worker.
    #[arg(long)]
    pub lambda: f64,

    /// Sample concurrency levels 1..=max.
    #[arg(long, default_value_t = 32)]
    pub max_concurrency: usize,

    /// Relative standard deviation of multiplicative throughput noise.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Write CSV here instead of stdout.
    #[arg(long, value_name = "CSV")]
    pub out: Option<PathBuf>,
}
