//! A single simultaneous observation of concurrency, throughput, and latency.
//!
//! Little's Law (`N = X · R`) ties the three together, so any two determine
//! the third. The constructors below derive the missing quantity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One `(N, X, R)` sample of a system under load.
///
/// Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    concurrency: f64,
    throughput: f64,
    latency: f64,
}

impl Measurement {
    /// A measurement where all three quantities were observed directly.
    ///
    /// The caller is responsible for `concurrency == throughput * latency`.
    pub fn new(concurrency: f64, throughput: f64, latency: f64) -> Self {
        Self {
            concurrency,
            throughput,
            latency,
        }
    }

    /// Latency observed at a given concurrency; throughput is `N / R`.
    pub fn from_concurrency_and_latency(concurrency: f64, latency: f64) -> Self {
        Self::new(concurrency, concurrency / latency, latency)
    }

    /// Throughput observed at a given concurrency; latency is `N / X`.
    pub fn from_concurrency_and_throughput(concurrency: f64, throughput: f64) -> Self {
        Self::new(concurrency, throughput, concurrency / throughput)
    }

    /// Latency observed at a given throughput; concurrency is `X · R`.
    pub fn from_throughput_and_latency(throughput: f64, latency: f64) -> Self {
        Self::new(throughput * latency, throughput, latency)
    }

    /// Average number of in-flight events (`N`).
    pub fn concurrency(&self) -> f64 {
        self.concurrency
    }

    /// Completed events per unit time (`X`).
    pub fn throughput(&self) -> f64 {
        self.throughput
    }

    /// Time per event (`R`).
    pub fn latency(&self) -> f64 {
        self.latency
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(n={},x={},r={})",
            self.concurrency, self.throughput, self.latency
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn display_lists_all_three_quantities() {
        let m = Measurement::new(1.0, 2.0, 3.0);
        assert_eq!(m.to_string(), "(n=1,x=2,r=3)");
    }

    #[test]
    fn concurrency_and_latency_derives_throughput() {
        let m = Measurement::from_concurrency_and_latency(3.0, 0.6);
        assert_relative_eq!(m.concurrency(), 3.0, max_relative = EPSILON);
        assert_relative_eq!(m.latency(), 0.6, max_relative = EPSILON);
        assert_relative_eq!(m.throughput(), 5.0, max_relative = EPSILON);
    }

    #[test]
    fn concurrency_and_throughput_derives_latency() {
        let m = Measurement::from_concurrency_and_throughput(3.0, 5.0);
        assert_relative_eq!(m.concurrency(), 3.0, max_relative = EPSILON);
        assert_relative_eq!(m.latency(), 0.6, max_relative = EPSILON);
        assert_relative_eq!(m.throughput(), 5.0, max_relative = EPSILON);
    }

    #[test]
    fn throughput_and_latency_derives_concurrency() {
        let m = Measurement::from_throughput_and_latency(5.0, 0.6);
        assert_relative_eq!(m.concurrency(), 3.0, max_relative = EPSILON);
        assert_relative_eq!(m.latency(), 0.6, max_relative = EPSILON);
        assert_relative_eq!(m.throughput(), 5.0, max_relative = EPSILON);
    }

    #[test]
    fn derived_measurements_satisfy_littles_law() {
        for &(n, r) in &[(1.0, 0.01), (7.5, 0.2), (128.0, 3.5)] {
            let m = Measurement::from_concurrency_and_latency(n, r);
            let littles_law = m.throughput() * m.latency();
            assert_relative_eq!(m.concurrency(), littles_law, max_relative = 1e-12);
        }
    }

    #[test]
    fn zero_throughput_yields_non_finite_latency() {
        let m = Measurement::from_concurrency_and_throughput(4.0, 0.0);
        assert!(m.latency().is_infinite());
    }
}
