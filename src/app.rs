//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs ingest + fitting
//! - prints reports/plots
//! - writes optional exports
//!
//! Human-readable output goes to stderr; predictions go to stdout so they can be
//! piped into other tools.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use clap::Parser;

use crate::cli::{Command, FitArgs, PredictArgs, SimulateArgs};
use crate::domain::{CsvLayout, FitConfig, SimulateConfig};
use crate::error::AppError;
use crate::math::SolverConfig;
use crate::models::Model;

use self::pipeline::RunOutput;

pub mod pipeline;

/// Entry point for the `usl` binary.
pub fn run() -> Result<(), AppError> {
    // `usl -i data.csv 128 256` should behave like `usl fit -i data.csv 128 256`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Predict(args) => handle_predict(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let runs = pipeline::run_fit(&config)?;
    let several = runs.len() > 1;

    let mut stdout = io::stdout().lock();
    for run in &runs {
        eprint!("{}", format_run_report(run, &config));

        let predictions = crate::report::format_predictions(&run.predictions);
        for line in predictions.lines() {
            let written = if several {
                writeln!(stdout, "{},{line}", run.ingest.source.display())
            } else {
                writeln!(stdout, "{line}")
            };
            written.map_err(|e| AppError::new(2, format!("Failed to write predictions: {e}")))?;
        }
    }

    // Optional exports (single input only; enforced by the pipeline).
    if let Some(run) = runs.first() {
        if let Some(path) = &config.export_results {
            crate::io::write_results_csv(path, &run.residuals)?;
        }
        if let Some(path) = &config.export_model {
            let model_file = crate::io::build_model_file(&run.fit, &run.ingest.stats);
            crate::io::write_model_json(path, &model_file)?;
        }
    }

    Ok(())
}

/// Human-readable report for one fit: diagnostics, model summary, and the
/// optional residual table and plot, each followed by a blank line.
fn format_run_report(run: &RunOutput, config: &FitConfig) -> String {
    let mut out = crate::report::format_fit_diagnostics(
        &run.ingest.source,
        &run.ingest.stats,
        &run.fit.quality,
    );
    out.push('\n');
    out.push_str(&crate::report::format_model_summary(&run.fit.model));
    out.push('\n');

    if config.show_residuals {
        out.push_str(&crate::report::format_residual_table(&run.residuals));
        out.push('\n');
    }

    if config.plot {
        out.push_str(&crate::plot::render_ascii_plot(
            &run.ingest.measurements,
            &run.fit.model,
            config.plot_width,
            config.plot_height,
        ));
        out.push('\n');
    }

    out
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let model_file = crate::io::read_model_json(&args.model)?;

    eprintln!("{}", crate::report::format_model_summary(&model_file.model));
    if args.plot {
        eprintln!(
            "{}",
            crate::plot::render_ascii_plot_from_model_file(&model_file, args.width, args.height)
        );
    }

    let predictions = crate::report::predictions(&model_file.model, &args.points, args.of);
    print!("{}", crate::report::format_predictions(&predictions));
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let config = simulate_config_from_args(&args);
    let measurements = crate::data::generate_measurements(&config)?;

    match &config.out {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display()))
            })?;
            crate::data::write_measurements_csv(BufWriter::new(file), &measurements)
        }
        None => crate::data::write_measurements_csv(io::stdout().lock(), &measurements),
    }
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        inputs: args.inputs.clone(),
        layout: CsvLayout {
            n_col: args.n_col,
            value_col: args.value_col,
            value_kind: args.value_kind,
            skip_headers: args.skip_headers,
        },
        points: args.points.clone(),
        solver: SolverConfig {
            tau: args.tau,
            epsilon1: args.epsilon,
            epsilon2: args.epsilon,
            max_iterations: args.max_iterations,
        },
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        show_residuals: args.residuals,
        export_results: args.export_results.clone(),
        export_model: args.export_model.clone(),
    }
}

pub fn simulate_config_from_args(args: &SimulateArgs) -> SimulateConfig {
    SimulateConfig {
        model: Model::new(args.sigma, args.kappa, args.lambda),
        max_concurrency: args.max_concurrency,
        noise: args.noise,
        seed: args.seed,
        out: args.out.clone(),
    }
}

/// Rewrite argv so `usl` defaults to `usl fit`.
///
/// Rules:
/// - `usl`                       -> `usl fit`
/// - `usl -i data.csv ...`       -> `usl fit -i data.csv ...`
/// - `usl --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("fit".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "predict" | "simulate");
    if is_subcommand {
        return argv;
    }

    // A leading flag means "fit flags".
    if arg1.starts_with('-') {
        argv.insert(1, "fit".to_string());
    }

    argv
}
