//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use std::path::Path;

use crate::domain::{DatasetStats, FitQuality, MeasurementResidual};
use crate::models::Model;
use crate::report::Prediction;

/// Format the model summary: coefficients, peak, and constraint.
///
/// ```text
/// USL parameters: σ=0.02671591, κ=0.0007690945, λ=995.6486
///     max throughput: 12341.745415, max concurrency: 35
///     contention constrained
/// ```
pub fn format_model_summary(model: &Model) -> String {
    let mut out = String::new();

    out.push_str(&format!("USL parameters: {model}\n"));
    match (model.max_throughput(), model.max_concurrency()) {
        (Ok(x), Ok(n)) => {
            out.push_str(&format!("\tmax throughput: {x:.6}, max concurrency: {n}\n"));
        }
        _ => out.push_str("\tmax throughput: unbounded, max concurrency: unbounded\n"),
    }
    out.push_str(&format!("\t{}\n", model.constraint().label()));

    out
}

/// Format dataset and solver diagnostics for one fit.
pub fn format_fit_diagnostics(source: &Path, stats: &DatasetStats, quality: &FitQuality) -> String {
    let mut out = String::new();

    out.push_str(&format!("Input: {}\n", source.display()));
    out.push_str(&format!(
        "Points: n={} | N=[{}, {}] | X=[{:.2}, {:.2}]\n",
        stats.n_points,
        stats.concurrency_min,
        stats.concurrency_max,
        stats.throughput_min,
        stats.throughput_max
    ));
    out.push_str(&format!(
        "Fit: SSE={:.3} RMSE={:.3} iterations={}\n",
        quality.sse, quality.rmse, quality.iterations
    ));

    out
}

/// Format predictions as `n,value` CSV lines (six decimals each).
pub fn format_predictions(predictions: &[Prediction]) -> String {
    let mut out = String::new();
    for p in predictions {
        out.push_str(&format!("{:.6},{:.6}\n", p.concurrency, p.value));
    }
    out
}

/// Format the per-measurement residual table.
pub fn format_residual_table(rows: &[MeasurementResidual]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>10} {:>14} {:>14} {:>12}",
            "N", "X_obs", "X_fit", "residual"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!("{:-<10} {:-<14} {:-<14} {:-<12}\n", "", "", "", ""));

    for r in rows {
        out.push_str(&format!(
            "{:>10} {:>14.2} {:>14.2} {:>12.2}\n",
            fmt_concurrency(r.measurement.concurrency()),
            r.measurement.throughput(),
            r.throughput_fit,
            r.residual,
        ));
    }

    out
}

/// Integral concurrency levels print without a fractional part.
fn fmt_concurrency(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        format!("{n:.3}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Measurement;
    use std::path::PathBuf;

    #[test]
    fn summary_reports_peak_and_constraint() {
        let out = format_model_summary(&Model::new(0.06, 0.06, 40.0));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "USL parameters: σ=0.06, κ=0.06, λ=40");
        assert_eq!(lines[1], "\tmax throughput: 81.081081, max concurrency: 3");
        assert_eq!(lines[2], "\tbalanced");
    }

    #[test]
    fn summary_of_limitless_model_is_unbounded() {
        let out = format_model_summary(&Model::new(0.1, 0.0, 10.0));
        assert!(out.contains("max throughput: unbounded"));
        assert!(out.ends_with("\tcontention constrained\n"));
    }

    #[test]
    fn predictions_are_six_decimal_csv() {
        let preds = [
            Prediction {
                concurrency: 20.0,
                value: 11063.6305,
            },
            Prediction {
                concurrency: 0.5,
                value: 1.0 / 3.0,
            },
        ];
        assert_eq!(
            format_predictions(&preds),
            "20.000000,11063.630500\n0.500000,0.333333\n"
        );
        assert_eq!(format_predictions(&[]), "");
    }

    #[test]
    fn residual_table_has_header_rule_and_rows() {
        let rows = vec![MeasurementResidual {
            measurement: Measurement::from_concurrency_and_throughput(4.0, 100.0),
            throughput_fit: 98.5,
            residual: 1.5,
        }];
        let out = format_residual_table(&rows);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].trim_start().starts_with('N'));
        assert!(lines[1].chars().all(|c| c == '-' || c == ' '));
        let cells: Vec<&str> = lines[2].split_whitespace().collect();
        assert_eq!(cells, ["4", "100.00", "98.50", "1.50"]);
    }

    #[test]
    fn diagnostics_mention_source_and_quality() {
        let stats = DatasetStats {
            n_points: 7,
            concurrency_min: 1.0,
            concurrency_max: 216.0,
            throughput_min: 65.0,
            throughput_max: 1853.0,
        };
        let quality = FitQuality {
            n: 7,
            sse: 10.0,
            rmse: 1.195,
            iterations: 60,
        };
        let out = format_fit_diagnostics(&PathBuf::from("web.csv"), &stats, &quality);
        assert!(out.starts_with("Input: web.csv\n"));
        assert!(out.contains("N=[1, 216]"));
        assert!(out.contains("iterations=60"));
    }
}
