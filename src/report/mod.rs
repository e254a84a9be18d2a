//! Reporting utilities: residuals, predictions, and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{Measurement, MeasurementResidual, PredictKind};
use crate::error::AppError;
use crate::models::Model;

/// A model prediction at one concurrency level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub concurrency: f64,
    pub value: f64,
}

/// Compute fitted throughput and residuals for each measurement.
pub fn compute_residuals(
    measurements: &[Measurement],
    model: &Model,
) -> Result<Vec<MeasurementResidual>, AppError> {
    let mut out = Vec::with_capacity(measurements.len());
    for m in measurements {
        let throughput_fit = model.throughput_at_concurrency(m.concurrency());
        if !throughput_fit.is_finite() {
            return Err(AppError::new(
                4,
                "Non-finite model prediction during residual computation.",
            ));
        }
        out.push(MeasurementResidual {
            measurement: *m,
            throughput_fit,
            residual: m.throughput() - throughput_fit,
        });
    }
    Ok(out)
}

/// Evaluate `model` at each concurrency level in `points`.
pub fn predictions(model: &Model, points: &[f64], kind: PredictKind) -> Vec<Prediction> {
    points
        .iter()
        .map(|&n| Prediction {
            concurrency: n,
            value: match kind {
                PredictKind::Throughput => model.throughput_at_concurrency(n),
                PredictKind::Latency => model.latency_at_concurrency(n),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn model() -> Model {
        Model::new(0.06, 0.06, 40.0)
    }

    #[test]
    fn compute_residuals_basic() {
        let ms = vec![
            Measurement::from_concurrency_and_throughput(1.0, 40.0),
            Measurement::from_concurrency_and_throughput(3.0, 80.0),
        ];

        let residuals = compute_residuals(&ms, &model()).unwrap();
        assert_eq!(residuals.len(), 2);
        assert_relative_eq!(residuals[0].residual, 0.0, epsilon = 1e-12);
        assert_relative_eq!(residuals[1].throughput_fit, 81.081081, max_relative = 1e-6);
        assert_relative_eq!(residuals[1].residual, -1.081081, max_relative = 1e-5);
    }

    #[test]
    fn residuals_reject_non_finite_predictions() {
        // 1 + σ(N − 1) + κN(N − 1) = 0 at N = 0.5 for σ = 2, κ = 0.
        let broken = Model::new(2.0, 0.0, 10.0);
        let ms = vec![Measurement::from_concurrency_and_throughput(0.5, 1.0)];
        let err = compute_residuals(&ms, &broken).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn predictions_by_kind() {
        let x = predictions(&model(), &[1.0, 3.0], PredictKind::Throughput);
        assert_eq!(x.len(), 2);
        assert_eq!(x[0].concurrency, 1.0);
        assert_relative_eq!(x[0].value, 40.0, max_relative = 1e-12);
        assert_relative_eq!(x[1].value, 81.081081, max_relative = 1e-6);

        let r = predictions(&model(), &[3.0], PredictKind::Latency);
        assert_relative_eq!(r[0].value, 0.037, max_relative = 1e-12);
    }

    #[test]
    fn no_points_no_predictions() {
        assert!(predictions(&model(), &[], PredictKind::Throughput).is_empty());
    }
}
