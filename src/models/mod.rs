//! Universal Scalability Law model.
//!
//! The model is a small, immutable value so that fitting code and reporting code
//! can share it freely (including across threads).

pub mod model;

pub use model::*;
