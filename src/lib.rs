//! `usl` library crate.
//!
//! Universal Scalability Law modeling: fit `(σ, κ, λ)` to measurements of a
//! system under load, then predict throughput and latency at other
//! concurrency levels.
//!
//! The binary (`usl`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the model and fitter are reusable from other tools
//!
//! ```no_run
//! use usl::{Measurement, build};
//!
//! let measurements: Vec<Measurement> = [(1.0, 955.0), (2.0, 1878.0), (4.0, 3548.0),
//!     (8.0, 6531.0), (16.0, 9897.0), (32.0, 12074.0)]
//!     .iter()
//!     .map(|&(n, x)| Measurement::from_concurrency_and_throughput(n, x))
//!     .collect();
//!
//! let model = build(&measurements)?;
//! println!("{model}: X(64) = {}", model.throughput_at_concurrency(64.0));
//! # Ok::<(), usl::UslError>(())
//! ```

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;

pub use domain::Measurement;
pub use error::UslError;
pub use fit::{Fit, Fitter, LevenbergMarquardtFitter, build};
pub use models::{Constraint, Model};
