//! Synthetic measurement generation from a known model.
//!
//! Concurrency levels `1..=max_concurrency` are sampled and throughput is the
//! model's prediction with multiplicative log-normal noise:
//!
//! ```text
//! X_obs = X(N) · exp(s·z − s²/2),   z ~ N(0, 1)
//! ```
//!
//! The `−s²/2` term keeps `E[X_obs] = X(N)`, and the exponential keeps every
//! sample strictly positive so the output is always valid fit input.

use std::io::Write;

use log::warn;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Measurement, SimulateConfig};
use crate::error::AppError;
use crate::fit::MIN_MEASUREMENTS;

/// Generate noisy measurements from `config.model` (deterministic per seed).
pub fn generate_measurements(config: &SimulateConfig) -> Result<Vec<Measurement>, AppError> {
    validate(config)?;
    if config.max_concurrency < MIN_MEASUREMENTS {
        warn!(
            "simulate: {} concurrency levels are too few to fit a model (need {MIN_MEASUREMENTS})",
            config.max_concurrency
        );
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let s = config.noise;
    let mean_correction = 0.5 * s * s;

    let measurements = (1..=config.max_concurrency)
        .map(|n| {
            let n = n as f64;
            let z: f64 = normal.sample(&mut rng);
            let noise = (s * z - mean_correction).exp();
            let throughput = config.model.throughput_at_concurrency(n) * noise;
            Measurement::from_concurrency_and_throughput(n, throughput)
        })
        .collect();

    Ok(measurements)
}

/// Write measurements as `concurrency,throughput` CSV rows (no header).
pub fn write_measurements_csv<W: Write>(
    mut out: W,
    measurements: &[Measurement],
) -> Result<(), AppError> {
    for m in measurements {
        writeln!(out, "{},{:.6}", m.concurrency(), m.throughput())
            .map_err(|e| AppError::new(2, format!("Failed to write measurements: {e}")))?;
    }
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush measurements: {e}")))?;
    Ok(())
}

fn validate(config: &SimulateConfig) -> Result<(), AppError> {
    let m = &config.model;
    if !(m.sigma().is_finite() && m.sigma() >= 0.0) {
        return Err(AppError::new(2, "--sigma must be finite and >= 0."));
    }
    if !(m.kappa().is_finite() && m.kappa() >= 0.0) {
        return Err(AppError::new(2, "--kappa must be finite and >= 0."));
    }
    if !(m.lambda().is_finite() && m.lambda() > 0.0) {
        return Err(AppError::new(2, "--lambda must be finite and > 0."));
    }
    if config.max_concurrency == 0 {
        return Err(AppError::new(2, "--max-concurrency must be >= 1."));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::new(2, "--noise must be finite and >= 0."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::build;
    use crate::io::read_measurements;
    use crate::domain::CsvLayout;
    use crate::models::Model;
    use approx::assert_relative_eq;

    fn config(noise: f64, seed: u64) -> SimulateConfig {
        SimulateConfig {
            model: Model::new(0.02, 0.0005, 1000.0),
            max_concurrency: 32,
            noise,
            seed,
            out: None,
        }
    }

    #[test]
    fn same_seed_same_measurements() {
        let a = generate_measurements(&config(0.05, 7)).unwrap();
        let b = generate_measurements(&config(0.05, 7)).unwrap();
        let c = generate_measurements(&config(0.05, 8)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn noiseless_samples_lie_on_the_curve() {
        let cfg = config(0.0, 42);
        let ms = generate_measurements(&cfg).unwrap();
        assert_eq!(ms.len(), 32);
        for (i, m) in ms.iter().enumerate() {
            assert_eq!(m.concurrency(), (i + 1) as f64);
            assert_eq!(m.throughput(), cfg.model.throughput_at_concurrency(m.concurrency()));
        }
    }

    #[test]
    fn noisy_samples_stay_positive_and_near_the_curve() {
        let cfg = config(0.02, 42);
        for m in generate_measurements(&cfg).unwrap() {
            let expected = cfg.model.throughput_at_concurrency(m.concurrency());
            assert!(m.throughput() > 0.0);
            assert_relative_eq!(m.throughput(), expected, max_relative = 0.2);
        }
    }

    #[test]
    fn noiseless_samples_fit_back_to_the_model() {
        let cfg = config(0.0, 1);
        let model = build(&generate_measurements(&cfg).unwrap()).unwrap();
        assert_relative_eq!(model.sigma(), 0.02, max_relative = 1e-4);
        assert_relative_eq!(model.kappa(), 0.0005, max_relative = 1e-4);
        assert_relative_eq!(model.lambda(), 1000.0, max_relative = 1e-4);
    }

    #[test]
    fn csv_output_reads_back() {
        let ms = generate_measurements(&config(0.01, 3)).unwrap();
        let mut buf = Vec::new();
        write_measurements_csv(&mut buf, &ms).unwrap();

        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("1,"));
        assert_eq!(text.lines().count(), 32);

        let back = read_measurements(buf.as_slice(), &CsvLayout::default()).unwrap();
        assert_eq!(back.len(), 32);
        for (a, b) in ms.iter().zip(&back) {
            assert_eq!(a.concurrency(), b.concurrency());
            assert_relative_eq!(a.throughput(), b.throughput(), epsilon = 1e-6);
        }
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let mut cfg = config(0.0, 1);
        cfg.max_concurrency = 0;
        assert_eq!(generate_measurements(&cfg).unwrap_err().exit_code(), 2);

        let mut cfg = config(-0.1, 1);
        assert_eq!(generate_measurements(&cfg).unwrap_err().exit_code(), 2);

        cfg.noise = 0.0;
        cfg.model = Model::new(0.02, 0.0005, 0.0);
        assert_eq!(generate_measurements(&cfg).unwrap_err().exit_code(), 2);
    }
}
