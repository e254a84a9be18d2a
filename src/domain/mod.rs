//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the `Measurement` value type and its Little's-Law constructors
//! - run configuration and CLI-facing enums (`FitConfig`, `ValueKind`, ...)
//! - fit outputs (`FitQuality`, `MeasurementResidual`, `ModelFile`)

pub mod measurement;
pub mod types;

pub use measurement::*;
pub use types::*;
