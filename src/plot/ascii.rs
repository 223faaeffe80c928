//! ASCII plotting of the standard curve for terminal output.
//!
//! Fixed-size grid with a log-10 concentration axis, optimized for quick
//! sanity checks and deterministic output.
//!
//! Plot elements:
//! - standard duplicates (both rows): `o`
//! - fitted curve: `-` line

use crate::domain::FitParameters;
use crate::fit::StandardCurve;
use crate::io::CurveFile;
use crate::models::logistic4;

/// Render the fitted curve with the standards overlaid.
pub fn render_ascii_plot(standards: &StandardCurve, params: &FitParameters, width: usize, height: usize) -> String {
    let (x_min, x_max) = conc_range(&standards.concentrations).unwrap_or((1.0, 1000.0));
    let curve = sample_curve(params, x_min, x_max, width.max(2));
    render_plot(&points_of(standards), &curve, x_min, x_max, width, height)
}

/// Render a plot from a saved curve JSON file.
pub fn render_ascii_plot_from_curve_file(curve: &CurveFile, width: usize, height: usize) -> String {
    let (x_min, x_max) = conc_range(&curve.grid.concentration).unwrap_or((1.0, 1000.0));
    let curve_points: Vec<(f64, f64)> = curve
        .grid
        .concentration
        .iter()
        .zip(curve.grid.od.iter())
        .map(|(&x, &y)| (x, y))
        .collect();

    render_plot(&points_of(&curve.standards), &curve_points, x_min, x_max, width, height)
}

fn points_of(standards: &StandardCurve) -> Vec<(f64, f64)> {
    let row1 = standards.concentrations.iter().zip(&standards.od1);
    let row2 = standards.concentrations.iter().zip(&standards.od2);
    row1.chain(row2).map(|(&x, &y)| (x, y)).collect()
}

fn render_plot(
    points: &[(f64, f64)],
    curve_points: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (y_min, y_max) = y_range(points, curve_points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so points can overlay.
    draw_curve(&mut grid, curve_points, x_min, x_max, y_min, y_max);

    for &(x, y) in points {
        if !(x > 0.0 && y.is_finite()) {
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: conc=[{x_min:.3}, {x_max:.3}] (log scale) | OD=[{y_min:.3}, {y_max:.3}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn conc_range(xs: &[f64]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for &x in xs.iter().filter(|x| **x > 0.0) {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn sample_curve(params: &FitParameters, x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    let (l0, l1) = (x_min.log10(), x_max.log10());
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let x = 10f64.powf(l0 + u * (l1 - l0));
            (x, logistic4(x, params))
        })
        .collect()
}

fn y_range(points: &[(f64, f64)], curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in points.iter().chain(curve) {
        if y.is_finite() {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let (l, l0, l1) = (x.log10(), x_min.log10(), x_max.log10());
    let u = ((l - l0) / (l1 - l0)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top of the plot.
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        if !(x > 0.0 && y.is_finite()) {
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
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
