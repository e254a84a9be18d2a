//! Levenberg–Marquardt nonlinear least squares.
//!
//! Minimizes `F(x) = ½ Σ r_i(x)²` for a residual function `r: ℝⁿ → ℝᵐ` (`m ≥ n`).
//!
//! Each iteration solves the damped normal equations
//!
//! ```text
//! (JᵀJ + μI) h = −Jᵀr
//! ```
//!
//! and accepts the step when the gain ratio
//! `ρ = (F(x) − F(x + h)) / (L(0) − L(h))` is positive, where `L` is the local
//! linear model of the residuals. `μ` interpolates between Gauss–Newton (small μ)
//! and gradient descent (large μ):
//!
//! - accepted step: `μ ← μ · max(1/3, 1 − (2ρ − 1)³)`, `ν ← 2`
//! - rejected step: `μ ← μ · ν`, `ν ← 2ν`
//!
//! Termination:
//! - `‖Jᵀr‖∞ ≤ ε₁` (gradient vanished), or
//! - `‖h‖ ≤ ε₂ (‖x‖ + ε₂)` (step negligible relative to the parameters).
//!
//! The initial damping is `μ₀ = τ · max_i (JᵀJ)_ii`.

use log::{debug, trace};
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use crate::math::jacobian::forward_difference;

/// Solver hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Scale of the initial damping relative to the largest diagonal of `JᵀJ`.
    pub tau: f64,
    /// Gradient threshold (`‖Jᵀr‖∞`).
    pub epsilon1: f64,
    /// Relative step threshold.
    pub epsilon2: f64,
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tau: 1e-6,
            epsilon1: 1e-8,
            epsilon2: 1e-8,
            max_iterations: 1000,
        }
    }
}

impl SolverConfig {
    /// Check that every threshold is finite and strictly positive.
    pub fn validate(&self) -> Result<(), SolverError> {
        if !(self.tau.is_finite() && self.tau > 0.0) {
            return Err(SolverError::InvalidConfig("tau must be finite and > 0"));
        }
        if !(self.epsilon1.is_finite() && self.epsilon1 > 0.0) {
            return Err(SolverError::InvalidConfig("epsilon1 must be finite and > 0"));
        }
        if !(self.epsilon2.is_finite() && self.epsilon2 > 0.0) {
            return Err(SolverError::InvalidConfig("epsilon2 must be finite and > 0"));
        }
        if self.max_iterations == 0 {
            return Err(SolverError::InvalidConfig("max_iterations must be >= 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("no convergence after {iterations} iterations")]
    MaxIterations { iterations: usize },

    #[error("damped normal equations are singular at iteration {iteration}")]
    SingularSystem { iteration: usize },

    #[error("residuals are not finite at the initial guess")]
    NonFiniteResidual,

    #[error("{residuals} residuals cannot determine {parameters} parameters")]
    Underdetermined { residuals: usize, parameters: usize },

    #[error("invalid solver configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Which criterion ended the iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    SmallGradient,
    SmallStep,
}

/// A converged solution.
#[derive(Debug, Clone)]
pub struct Solution {
    pub x: DVector<f64>,
    /// Residuals at `x`.
    pub residuals: DVector<f64>,
    pub iterations: usize,
    pub termination: Termination,
}

impl Solution {
    /// `Σ r_i²` at the solution.
    pub fn sum_of_squares(&self) -> f64 {
        self.residuals.norm_squared()
    }
}

/// Minimize `½‖r(x)‖²` using a forward-difference Jacobian.
///
/// # Errors
/// See [`minimize_with_jacobian`].
pub fn minimize<F>(
    residuals: F,
    x0: DVector<f64>,
    config: &SolverConfig,
) -> Result<Solution, SolverError>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let residuals = &residuals;
    minimize_with_jacobian(
        residuals,
        |x: &DVector<f64>, r: &DVector<f64>| forward_difference(residuals, x, r),
        x0,
        config,
    )
}

/// Minimize `½‖r(x)‖²` with a caller-supplied Jacobian.
///
/// `jacobian(x, r)` receives the residuals `r = residuals(x)` already evaluated
/// at `x` and must return the `m × n` matrix `∂r/∂x`.
///
/// # Errors
/// - [`SolverError::InvalidConfig`] if `config` fails validation.
/// - [`SolverError::Underdetermined`] if there are fewer residuals than parameters.
/// - [`SolverError::NonFiniteResidual`] if the residuals at `x0` are not finite.
/// - [`SolverError::SingularSystem`] if `JᵀJ` or `Jᵀr` is not finite, or the
///   damped system cannot be factorized.
/// - [`SolverError::MaxIterations`] if neither criterion is met in time.
pub fn minimize_with_jacobian<F, J>(
    residuals: F,
    jacobian: J,
    x0: DVector<f64>,
    config: &SolverConfig,
) -> Result<Solution, SolverError>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
    J: Fn(&DVector<f64>, &DVector<f64>) -> DMatrix<f64>,
{
    config.validate()?;

    let n = x0.len();
    let mut x = x0;
    let mut r = residuals(&x);
    if r.len() < n {
        return Err(SolverError::Underdetermined {
            residuals: r.len(),
            parameters: n,
        });
    }
    if !r.iter().all(|v| v.is_finite()) {
        return Err(SolverError::NonFiniteResidual);
    }

    let mut cost = 0.5 * r.norm_squared();
    let (mut a, mut g) = normal_equations(&jacobian(&x, &r), &r, 0)?;
    if g.amax() <= config.epsilon1 {
        return Ok(Solution {
            x,
            residuals: r,
            iterations: 0,
            termination: Termination::SmallGradient,
        });
    }

    let mut mu = config.tau * a.diagonal().iter().copied().fold(0.0, f64::max);
    let mut nu = 2.0;

    for iteration in 1..=config.max_iterations {
        let mut damped = a.clone();
        for i in 0..n {
            damped[(i, i)] += mu;
        }

        let step = damped
            .cholesky()
            .map(|c| c.solve(&(-&g)))
            .filter(|h| h.iter().all(|v| v.is_finite()))
            .ok_or(SolverError::SingularSystem { iteration })?;

        if step.norm() <= config.epsilon2 * (x.norm() + config.epsilon2) {
            debug!("lm: step below threshold after {iteration} iterations");
            return Ok(Solution {
                x,
                residuals: r,
                iterations: iteration,
                termination: Termination::SmallStep,
            });
        }

        let x_new = &x + &step;
        let r_new = residuals(&x_new);
        let cost_new = 0.5 * r_new.norm_squared();

        // L(0) − L(h) = ½ hᵀ(μh − g); positive whenever h ≠ 0.
        let predicted = 0.5 * step.dot(&(&step * mu - &g));
        let rho = if cost_new.is_finite() && predicted > 0.0 {
            (cost - cost_new) / predicted
        } else {
            -1.0
        };

        if rho > 0.0 {
            x = x_new;
            r = r_new;
            cost = cost_new;
            (a, g) = normal_equations(&jacobian(&x, &r), &r, iteration)?;

            trace!("lm: iteration {iteration} accepted, cost={cost:.6e}, mu={mu:.3e}");

            if g.amax() <= config.epsilon1 {
                debug!("lm: gradient below threshold after {iteration} iterations");
                return Ok(Solution {
                    x,
                    residuals: r,
                    iterations: iteration,
                    termination: Termination::SmallGradient,
                });
            }

            mu *= (1.0_f64 / 3.0).max(1.0 - (2.0 * rho - 1.0).powi(3));
            nu = 2.0;
        } else {
            trace!("lm: iteration {iteration} rejected, mu={mu:.3e}");
            mu *= nu;
            nu *= 2.0;
        }

        if !mu.is_finite() {
            return Err(SolverError::SingularSystem { iteration });
        }
    }

    Err(SolverError::MaxIterations {
        iterations: config.max_iterations,
    })
}

/// `(JᵀJ, Jᵀr)`, or `SingularSystem` when either overflows or is undefined.
fn normal_equations(
    jacobian: &DMatrix<f64>,
    r: &DVector<f64>,
    iteration: usize,
) -> Result<(DMatrix<f64>, DVector<f64>), SolverError> {
    let a = jacobian.tr_mul(jacobian);
    let g = jacobian.tr_mul(r);
    if a.iter().chain(g.iter()).all(|v| v.is_finite()) {
        Ok((a, g))
    } else {
        Err(SolverError::SingularSystem { iteration })
    }
}
