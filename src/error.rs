use thiserror::Error;

use crate::math::SolverError;

/// Errors produced while building or querying a USL model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UslError {
    /// Too few measurements to estimate three coefficients reliably.
    #[error("need at least {required} measurements, got {got}")]
    InsufficientData { got: usize, required: usize },

    /// The nonlinear solver stopped without meeting a convergence criterion.
    #[error("model fit did not converge: {0}")]
    FitDidNotConverge(#[source] SolverError),

    /// `κ = 0`: throughput grows without bound, so there is no peak.
    #[error("undefined for a limitless system (κ = 0)")]
    UndefinedForLimitlessSystem,
}

/// Binary-level error carrying the process exit code.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<UslError> for AppError {
    fn from(err: UslError) -> Self {
        let exit_code = match err {
            UslError::InsufficientData { .. } => 3,
            UslError::FitDidNotConverge(_) | UslError::UndefinedForLimitlessSystem => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}
