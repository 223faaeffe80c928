//! Standard-curve figure rendered to SVG with Plotters.
//!
//! Log-10 concentration axis, fitted 4PL as a line and both duplicate rows
//! as orange points. The SVG text is returned so the HTML report can embed
//! it without reading the file back.

use plotters::prelude::*;

use crate::domain::FitParameters;
use crate::error::AppError;
use crate::fit::StandardCurve;
use crate::models::logistic4;

const CURVE_SAMPLES: usize = 200;

pub fn render_curve_svg(standards: &StandardCurve, params: &FitParameters, size: (u32, u32)) -> Result<String, AppError> {
    let mut svg = String::new();
    draw_standard_curve(&mut svg, standards, params, size)
        .map_err(|e| AppError::new(4, format!("Failed to draw standard curve: {e}")))?;
    Ok(svg)
}

fn draw_standard_curve(
    svg: &mut String,
    standards: &StandardCurve,
    params: &FitParameters,
    size: (u32, u32),
) -> Result<(), Box<dyn std::error::Error>> {
    let xs: Vec<f64> = standards.concentrations.iter().copied().filter(|x| *x > 0.0).collect();
    let x0 = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let x1 = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(x0.is_finite() && x1.is_finite()) || x1 <= x0 {
        return Err("standard concentrations do not span a range".into());
    }

    let (l0, l1) = (x0.log10(), x1.log10());
    let curve: Vec<(f64, f64)> = (0..CURVE_SAMPLES)
        .map(|i| {
            let u = i as f64 / (CURVE_SAMPLES as f64 - 1.0);
            let x = 10f64.powf(l0 + u * (l1 - l0));
            (x, logistic4(x, params))
        })
        .collect();

    let points: Vec<(f64, f64)> = standards
        .concentrations
        .iter()
        .zip(&standards.od1)
        .chain(standards.concentrations.iter().zip(&standards.od2))
        .map(|(&x, &y)| (x, y))
        .collect();

    let mut y0 = f64::INFINITY;
    let mut y1 = f64::NEG_INFINITY;
    for &(_, y) in curve.iter().chain(&points) {
        if y.is_finite() {
            y0 = y0.min(y);
            y1 = y1.max(y);
        }
    }
    if !(y0.is_finite() && y1.is_finite()) || y1 <= y0 {
        return Err("standard ODs do not span a range".into());
    }
    let pad = (y1 - y0) * 0.05;

    let root = SVGBackend::with_string(svg, size).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Standard curve", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((x0..x1).log_scale(), (y0 - pad)..(y1 + pad))?;

    chart
        .configure_mesh()
        .x_desc("Unit of standard")
        .y_desc("OD")
        .draw()?;

    chart.draw_series(LineSeries::new(curve.iter().copied().filter(|(_, y)| y.is_finite()), &BLUE))?;

    let orange = RGBColor(255, 165, 0);
    chart.draw_series(points.iter().map(|&(x, y)| Circle::new((x, y), 3, orange.filled())))?;

    root.present()?;
    Ok(())
}
