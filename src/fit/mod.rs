//! Model fitting.
//!
//! - [`fitter`]: the [`Fitter`] seam and its Levenberg–Marquardt implementation
//! - [`batch`]: fit independent data sets in parallel

pub mod batch;
pub mod fitter;

pub use batch::*;
pub use fitter::*;
