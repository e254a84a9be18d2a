//! Fit a USL model to a set of measurements.
//!
//! Given measurements `(N_i, X_i)` we minimize
//!
//! ```text
//! Σ (X_i − X(N_i; σ, κ, λ))²
//! ```
//!
//! over `x = [σ, κ, λ]` with Levenberg–Marquardt and a forward-difference
//! Jacobian. The initial guess is `σ = 0.1`, `κ = 0.01` and `λ = max(X_i / N_i)`:
//! the best observed per-worker throughput bounds λ from below, since contention
//! and coherency only ever reduce it.

use log::{debug, info};
use nalgebra::DVector;

use crate::domain::{FitQuality, Measurement};
use crate::error::UslError;
use crate::math::{SolverConfig, minimize};
use crate::models::Model;

/// Minimum number of measurements accepted by a fit.
pub const MIN_MEASUREMENTS: usize = 6;

/// Initial guess for σ.
pub const INITIAL_SIGMA: f64 = 0.1;

/// Initial guess for κ.
pub const INITIAL_KAPPA: f64 = 0.01;

/// A fitted model together with its diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Fit {
    pub model: Model,
    pub quality: FitQuality,
}

/// Estimates model coefficients from measurements.
pub trait Fitter {
    /// Fit a model to `measurements`.
    ///
    /// # Errors
    /// - [`UslError::InsufficientData`] if fewer than [`MIN_MEASUREMENTS`] are given.
    /// - [`UslError::FitDidNotConverge`] if the underlying solver fails.
    fn fit(&self, measurements: &[Measurement]) -> Result<Fit, UslError>;
}

/// The production [`Fitter`]: damped nonlinear least squares on throughput.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LevenbergMarquardtFitter {
    config: SolverConfig,
}

impl LevenbergMarquardtFitter {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }
}

impl Fitter for LevenbergMarquardtFitter {
    fn fit(&self, measurements: &[Measurement]) -> Result<Fit, UslError> {
        if measurements.len() < MIN_MEASUREMENTS {
            return Err(UslError::InsufficientData {
                got: measurements.len(),
                required: MIN_MEASUREMENTS,
            });
        }

        let x0 = initial_guess(measurements);
        debug!("fit: n={} initial guess {:?}", measurements.len(), x0.as_slice());

        let solution = minimize(
            |x: &DVector<f64>| throughput_residuals(measurements, &to_model(x)),
            x0,
            &self.config,
        )
        .map_err(UslError::FitDidNotConverge)?;

        let model = to_model(&solution.x);
        let n = measurements.len();
        let sse = solution.sum_of_squares();
        info!(
            "fit: converged after {} iterations ({:?}): {model}",
            solution.iterations, solution.termination
        );

        Ok(Fit {
            model,
            quality: FitQuality {
                n,
                sse,
                rmse: (sse / n as f64).sqrt(),
                iterations: solution.iterations,
            },
        })
    }
}

/// Build a model from measurements with the default solver settings.
///
/// # Errors
/// See [`Fitter::fit`].
pub fn build(measurements: &[Measurement]) -> Result<Model, UslError> {
    LevenbergMarquardtFitter::default()
        .fit(measurements)
        .map(|fit| fit.model)
}

fn initial_guess(measurements: &[Measurement]) -> DVector<f64> {
    let lambda = measurements
        .iter()
        .map(|m| m.throughput() / m.concurrency())
        .fold(f64::NEG_INFINITY, f64::max);
    DVector::from_row_slice(&[INITIAL_SIGMA, INITIAL_KAPPA, lambda])
}

fn to_model(x: &DVector<f64>) -> Model {
    Model::new(x[0], x[1], x[2])
}

/// Observed minus predicted throughput, one entry per measurement.
fn throughput_residuals(measurements: &[Measurement], model: &Model) -> DVector<f64> {
    DVector::from_iterator(
        measurements.len(),
        measurements
            .iter()
            .map(|m| m.throughput() - model.throughput_at_concurrency(m.concurrency())),
    )
}
