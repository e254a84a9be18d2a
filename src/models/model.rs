//! Universal Scalability Law equations.
//!
//! With `N` = concurrency, `X` = throughput and `R` = latency, the USL curve is
//!
//! ```text
//! X(N) = λN / (1 + σ(N − 1) + κN(N − 1))
//! ```
//!
//! and Little's Law (`N = X · R`) links it to latency. Every method here is a pure
//! function of `(σ, κ, λ)` and its argument. None of them re-validate inputs:
//! near-zero denominators and negative radicands produce `±∞`/`NaN`, which the
//! caller is expected to avoid by checking [`Model::limitless`] and parameter
//! signs first.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::UslError;

/// Which term dominates the loss of scalability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// `σ > κ`: serialization/contention dominates.
    Contention,
    /// `σ < κ`: crosstalk/coherency dominates.
    Coherency,
    /// `σ = κ`.
    Balanced,
}

impl Constraint {
    pub fn label(self) -> &'static str {
        match self {
            Constraint::Contention => "contention constrained",
            Constraint::Coherency => "coherency constrained",
            Constraint::Balanced => "balanced",
        }
    }
}

/// A fitted USL model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Model {
    sigma: f64,
    kappa: f64,
    lambda: f64,
}

impl Model {
    pub fn new(sigma: f64, kappa: f64, lambda: f64) -> Self {
        Self {
            sigma,
            kappa,
            lambda,
        }
    }

    /// Contention coefficient (σ).
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Coherency coefficient (κ).
    pub fn kappa(&self) -> f64 {
        self.kappa
    }

    /// Ideal per-worker throughput (λ).
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// `1 + σ(N − 1) + κN(N − 1)`, shared by the throughput and latency curves.
    fn slowdown(&self, n: f64) -> f64 {
        1.0 + self.sigma * (n - 1.0) + self.kappa * n * (n - 1.0)
    }

    /// `σ² + κ² + 2κ(2λR + σ − 2)`, shared by the latency inversions.
    fn latency_radicand(&self, r: f64) -> f64 {
        self.sigma * self.sigma
            + self.kappa * self.kappa
            + 2.0 * self.kappa * (2.0 * self.lambda * r + self.sigma - 2.0)
    }

    /// Expected throughput at concurrency `n`.
    pub fn throughput_at_concurrency(&self, n: f64) -> f64 {
        self.lambda * n / self.slowdown(n)
    }

    /// Expected latency at concurrency `n`.
    pub fn latency_at_concurrency(&self, n: f64) -> f64 {
        self.slowdown(n) / self.lambda
    }

    /// Concurrency at which throughput peaks.
    ///
    /// # Errors
    /// Returns [`UslError::UndefinedForLimitlessSystem`] when `κ = 0`.
    pub fn max_concurrency(&self) -> Result<f64, UslError> {
        if self.limitless() {
            return Err(UslError::UndefinedForLimitlessSystem);
        }
        Ok(((1.0 - self.sigma) / self.kappa).sqrt().floor())
    }

    /// Peak throughput, i.e. throughput at [`Model::max_concurrency`].
    ///
    /// # Errors
    /// Returns [`UslError::UndefinedForLimitlessSystem`] when `κ = 0`.
    pub fn max_throughput(&self) -> Result<f64, UslError> {
        self.max_concurrency().map(|n| self.throughput_at_concurrency(n))
    }

    /// Expected latency at throughput `x`. Undefined when `σx = λ`.
    pub fn latency_at_throughput(&self, x: f64) -> f64 {
        (self.sigma - 1.0) / (self.sigma * x - self.lambda)
    }

    /// Expected throughput at latency `r`. Requires `κ ≠ 0` and `r ≠ 0`.
    pub fn throughput_at_latency(&self, r: f64) -> f64 {
        (self.latency_radicand(r).sqrt() - self.kappa + self.sigma) / (2.0 * self.kappa * r)
    }

    /// Expected concurrency at latency `r`. Requires `κ ≠ 0`.
    pub fn concurrency_at_latency(&self, r: f64) -> f64 {
        (self.kappa - self.sigma + self.latency_radicand(r).sqrt()) / (2.0 * self.kappa)
    }

    /// Expected concurrency at throughput `x`.
    pub fn concurrency_at_throughput(&self, x: f64) -> f64 {
        self.latency_at_throughput(x) * x
    }

    /// Whether the system is constrained by contention effects (`σ > κ`).
    pub fn contention_constrained(&self) -> bool {
        self.sigma > self.kappa
    }

    /// Whether the system is constrained by coherency effects (`σ < κ`).
    pub fn coherency_constrained(&self) -> bool {
        self.sigma < self.kappa
    }

    /// Whether the system scales without bound (`κ = 0`).
    pub fn limitless(&self) -> bool {
        self.kappa == 0.0
    }

    pub fn constraint(&self) -> Constraint {
        if self.contention_constrained() {
            Constraint::Contention
        } else if self.coherency_constrained() {
            Constraint::Coherency
        } else {
            Constraint::Balanced
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "σ={}, κ={}, λ={}", self.sigma, self.kappa, self.lambda)
    }
}
