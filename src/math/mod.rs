//! Numerical building blocks: finite-difference Jacobians and Levenberg–Marquardt.

pub mod jacobian;
pub mod lm;

pub use jacobian::*;
pub use lm::*;
