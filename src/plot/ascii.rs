//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - predicted throughput curve: `*`
//! - measured throughput: `X`
//! - throughput peak: `@`

use crate::domain::{Measurement, ModelFile, Peak};
use crate::io::peak_of;
use crate::models::Model;

const CURVE: char = '*';
const ACTUAL: char = 'X';
const PEAK: char = '@';

/// Render measurements against a fitted model.
///
/// The concurrency axis spans the measurements and is extended to include the
/// peak when the model has one.
pub fn render_ascii_plot(
    measurements: &[Measurement],
    model: &Model,
    width: usize,
    height: usize,
) -> String {
    let peak = peak_of(model);
    let (n_min, n_max) = concurrency_range(measurements, peak).unwrap_or((1.0, 32.0));
    let curve = sample_curve(model, n_min, n_max, width.max(2));
    render_plot(measurements, &curve, peak, n_min, n_max, width, height)
}

/// Render the saved grid of a model JSON file (no measurements).
pub fn render_ascii_plot_from_model_file(
    model_file: &ModelFile,
    width: usize,
    height: usize,
) -> String {
    let curve: Vec<(f64, f64)> = model_file
        .grid
        .concurrency
        .iter()
        .zip(model_file.grid.throughput.iter())
        .map(|(&n, &x)| (n, x))
        .collect();
    let (n_min, n_max) = grid_range(&curve).unwrap_or((1.0, 32.0));

    render_plot(&[], &curve, model_file.peak, n_min, n_max, width, height)
}

fn render_plot(
    measurements: &[Measurement],
    curve: &[(f64, f64)],
    peak: Option<Peak>,
    n_min: f64,
    n_max: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = throughput_range(measurements, curve).unwrap_or((0.0, 1.0));
    let (x_min, x_max) = pad_range(x_min, x_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so markers overlay it.
    draw_curve(&mut grid, curve, n_min, n_max, x_min, x_max);

    for m in measurements {
        let col = map_x(m.concurrency(), n_min, n_max, width);
        let row = map_y(m.throughput(), x_min, x_max, height);
        grid[row][col] = ACTUAL;
    }

    if let Some(p) = peak {
        let col = map_x(p.concurrency, n_min, n_max, width);
        let row = map_y(p.throughput, x_min, x_max, height);
        grid[row][col] = PEAK;
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: N=[{n_min:.1}, {n_max:.1}] | X=[{x_min:.2}, {x_max:.2}]\n"
    ));

    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    out.push_str(&format!("{CURVE} predicted  {ACTUAL} actual  {PEAK} peak\n"));

    out
}

fn concurrency_range(measurements: &[Measurement], peak: Option<Peak>) -> Option<(f64, f64)> {
    let mut min_n = f64::INFINITY;
    let mut max_n = f64::NEG_INFINITY;
    for m in measurements {
        min_n = min_n.min(m.concurrency());
        max_n = max_n.max(m.concurrency());
    }
    if let Some(p) = peak {
        max_n = max_n.max(p.concurrency);
    }
    if min_n.is_finite() && max_n.is_finite() && max_n > min_n {
        Some((min_n, max_n))
    } else {
        None
    }
}

fn grid_range(curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_n = f64::INFINITY;
    let mut max_n = f64::NEG_INFINITY;
    for &(n, _) in curve {
        min_n = min_n.min(n);
        max_n = max_n.max(n);
    }
    if min_n.is_finite() && max_n.is_finite() && max_n > min_n {
        Some((min_n, max_n))
    } else {
        None
    }
}

fn sample_curve(model: &Model, n_min: f64, n_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let c = n_min + u * (n_max - n_min);
        out.push((c, model.throughput_at_concurrency(c)));
    }
    out
}

fn throughput_range(measurements: &[Measurement], curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;

    let observed = measurements.iter().map(|m| m.throughput());
    let predicted = curve.iter().map(|&(_, x)| x);
    for x in observed.chain(predicted).filter(|x| x.is_finite()) {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }

    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(n: f64, n_min: f64, n_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((n - n_min) / (n_max - n_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(x: f64, x_min: f64, x_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    // max throughput is row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    n_min: f64,
    n_max: f64,
    x_min: f64,
    x_max: f64,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(n, x) in curve.iter().filter(|(_, x)| x.is_finite()) {
        let col = map_x(n, n_min, n_max, width);
        let row = map_y(x, x_min, x_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, CURVE),
            None => grid[row][col] = CURVE,
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
