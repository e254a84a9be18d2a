//! CSV ingest.
//!
//! Turns a measurement CSV into a list of [`Measurement`]s that are safe to fit.
//!
//! Rules:
//! - no implicit header row; `--skip-headers` drops the first record
//! - every record must contain both selected columns
//! - both values must parse as finite floats greater than zero
//! - the first bad record fails the whole file (exit code 2)

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use log::{debug, warn};

use crate::domain::{CsvLayout, DatasetStats, Measurement, ValueKind};
use crate::error::AppError;

/// Ingest output: measurements + stats.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub source: PathBuf,
    pub measurements: Vec<Measurement>,
    pub stats: DatasetStats,
}

/// Load measurements from a CSV file.
pub fn load_measurements(path: &Path, layout: &CsvLayout) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let measurements = read_measurements(file, layout)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))?;

    let stats = DatasetStats::from_measurements(&measurements).ok_or_else(|| {
        AppError::new(3, format!("No measurements found in '{}'.", path.display()))
    })?;

    debug!(
        "ingest: {} measurements from {}, N in [{}, {}]",
        stats.n_points,
        path.display(),
        stats.concurrency_min,
        stats.concurrency_max
    );

    Ok(IngestedData {
        source: path.to_path_buf(),
        measurements,
        stats,
    })
}

/// Parse measurements from any CSV reader.
pub fn read_measurements<R: Read>(
    reader: R,
    layout: &CsvLayout,
) -> Result<Vec<Measurement>, AppError> {
    validate_layout(layout)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut measurements = Vec::new();
    let mut seen = HashSet::new();

    for (idx, result) in reader.records().enumerate() {
        if idx == 0 && layout.skip_headers {
            continue;
        }

        let record = result.map_err(|e| AppError::new(2, format!("CSV parse error: {e}")))?;
        let line = record
            .position()
            .map_or(idx + 1, |p| p.line() as usize);

        let m = parse_record(&record, line, layout)?;

        if !seen.insert(m.concurrency().to_bits()) {
            warn!(
                "ingest: duplicate concurrency level {} at line {line}",
                m.concurrency()
            );
        }
        measurements.push(m);
    }

    Ok(measurements)
}

fn validate_layout(layout: &CsvLayout) -> Result<(), AppError> {
    if layout.n_col == 0 || layout.value_col == 0 {
        return Err(AppError::new(2, "Column indexes are 1-based and must be >= 1."));
    }
    if layout.n_col == layout.value_col {
        return Err(AppError::new(
            2,
            format!("Concurrency and value columns must differ (both are {}).", layout.n_col),
        ));
    }
    Ok(())
}

fn parse_record(
    record: &StringRecord,
    line: usize,
    layout: &CsvLayout,
) -> Result<Measurement, AppError> {
    if record.len() < layout.n_col.max(layout.value_col) {
        return Err(AppError::new(2, format!("invalid line at line {line}")));
    }

    let n = parse_field(record, line, layout.n_col)?;
    let value = parse_field(record, line, layout.value_col)?;

    Ok(match layout.value_kind {
        ValueKind::Throughput => Measurement::from_concurrency_and_throughput(n, value),
        ValueKind::Latency => Measurement::from_concurrency_and_latency(n, value),
    })
}

fn parse_field(record: &StringRecord, line: usize, col: usize) -> Result<f64, AppError> {
    let raw = record.get(col - 1).unwrap_or_default();
    let v = raw
        .parse::<f64>()
        .map_err(|e| AppError::new(2, format!("{e} at line {line}, column {col}")))?;
    if !v.is_finite() || v <= 0.0 {
        return Err(AppError::new(
            2,
            format!("value must be finite and > 0 at line {line}, column {col}"),
        ));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    fn read(csv: &str, layout: CsvLayout) -> Result<Vec<Measurement>, AppError> {
        read_measurements(csv.as_bytes(), &layout)
    }

    #[test]
    fn reads_concurrency_and_throughput() {
        let ms = read("1,955.16\n2, 1878.91\n\n4,3548.68\n", CsvLayout::default()).unwrap();
        assert_eq!(ms.len(), 3);
        assert_eq!(ms[1].concurrency(), 2.0);
        assert_eq!(ms[1].throughput(), 1878.91);
        assert_relative_eq!(ms[2].latency(), 4.0 / 3548.68, max_relative = 1e-12);
    }

    #[test]
    fn reads_latency_from_selected_columns() {
        let layout = CsvLayout {
            n_col: 3,
            value_col: 1,
            value_kind: ValueKind::Latency,
            skip_headers: true,
        };
        let ms = read("latency,label,users\n0.5,a,10\n0.8,b,20\n", layout).unwrap();
        assert_eq!(ms.len(), 2);
        assert_eq!(ms[0].concurrency(), 10.0);
        assert_relative_eq!(ms[0].throughput(), 20.0, max_relative = 1e-12);
        assert_relative_eq!(ms[1].throughput(), 25.0, max_relative = 1e-12);
    }

    #[test]
    fn header_without_skip_is_a_parse_error() {
        let err = read("n,x\n1,2\n", CsvLayout::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "invalid float literal at line 1, column 1");
    }

    #[test]
    fn short_record_is_an_invalid_line() {
        let err = read("1,10\n2\n3,30\n", CsvLayout::default()).unwrap_err();
        assert_eq!(err.to_string(), "invalid line at line 2");
    }

    #[test]
    fn bad_value_reports_line_and_column() {
        let err = read("1,10\n2,20\n3,abc\n", CsvLayout::default()).unwrap_err();
        assert_eq!(err.to_string(), "invalid float literal at line 3, column 2");
    }

    #[test]
    fn non_positive_and_non_finite_values_are_rejected() {
        let err = read("0,10\n", CsvLayout::default()).unwrap_err();
        assert_eq!(err.to_string(), "value must be finite and > 0 at line 1, column 1");

        let err = read("1,10\n2,inf\n", CsvLayout::default()).unwrap_err();
        assert_eq!(err.to_string(), "value must be finite and > 0 at line 2, column 2");
    }

    #[test]
    fn column_indexes_must_be_one_based_and_distinct() {
        let zero = CsvLayout {
            n_col: 0,
            ..CsvLayout::default()
        };
        assert_eq!(read("1,2\n", zero).unwrap_err().exit_code(), 2);

        let same = CsvLayout {
            value_col: 1,
            ..CsvLayout::default()
        };
        assert_eq!(read("1,2\n", same).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn load_from_file_reports_stats() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "concurrency,throughput").unwrap();
        writeln!(file, "1,65").unwrap();
        writeln!(file, "18,996").unwrap();
        writeln!(file, "36,1652").unwrap();

        let layout = CsvLayout {
            skip_headers: true,
            ..CsvLayout::default()
        };
        let data = load_measurements(file.path(), &layout).unwrap();
        assert_eq!(data.measurements.len(), 3);
        assert_eq!(data.stats.concurrency_max, 36.0);
        assert_eq!(data.stats.throughput_min, 65.0);
        assert_eq!(data.source, file.path());
    }

    #[test]
    fn load_errors_name_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1,x").unwrap();
        let err = load_measurements(file.path(), &CsvLayout::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().starts_with(&file.path().display().to_string()));
        assert!(err.to_string().ends_with("at line 1, column 2"));
    }

    #[test]
    fn empty_file_has_no_measurements() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = load_measurements(file.path(), &CsvLayout::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        let err = load_measurements(&path, &CsvLayout::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
