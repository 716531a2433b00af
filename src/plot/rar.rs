//! RAR diagnostic plot.
//!
//! Log-log scatter of observed vs baryonic acceleration in SI units, with the
//! Newtonian 1:1 line and the standard empirical RAR curve overlaid.

use std::path::Path;

use plotters::prelude::*;

use crate::analysis::scatter::empirical_rar;
use crate::domain::{ACCEL_SI_PER_NATURAL, RarPoint};
use crate::error::AppError;
use crate::plot::btfr::value_range;
use crate::plot::plot_err;

/// Log10 SI acceleration pairs for plotting: converted from natural units,
/// log-safe filtered.
pub fn rar_log_points(points: &[RarPoint]) -> Vec<(f64, f64)> {
    points
        .iter()
        .map(|p| (p.g_bar * ACCEL_SI_PER_NATURAL, p.g_obs * ACCEL_SI_PER_NATURAL))
        .filter(|&(gb, go)| gb > 0.0 && go > 0.0)
        .map(|(gb, go)| (gb.log10(), go.log10()))
        .collect()
}

/// Render the RAR figure; returns the number of points plotted.
pub fn render_rar_plot(path: &Path, points: &[RarPoint], a0: f64) -> Result<usize, AppError> {
    let log_points = rar_log_points(points);
    if log_points.is_empty() {
        return Err(AppError::new(
            3,
            "No positive-acceleration RAR points available to plot.",
        ));
    }

    let (x_min, x_max) = value_range(log_points.iter().map(|p| p.0));
    let (y_min, y_max) = value_range(log_points.iter().map(|p| p.1));

    let root = BitMapBackend::new(path, (1000, 800)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Radial Acceleration Relation (diagnostic)", ("sans-serif", 26))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("log10(g_bar) [m/s^2]")
        .y_desc("log10(g_obs) [m/s^2]")
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(
            log_points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 2, BLUE.mix(0.25).filled())),
        )
        .map_err(plot_err)?
        .label(format!("Model points ({})", log_points.len()))
        .legend(|(x, y)| Circle::new((x + 10, y), 3, BLUE.mix(0.5).filled()));

    // Newtonian expectation: g_obs == g_bar.
    chart
        .draw_series(DashedLineSeries::new(
            vec![(x_min, x_min), (x_max, x_max)],
            8,
            6,
            BLACK.mix(0.4).stroke_width(2),
        ))
        .map_err(plot_err)?
        .label("Newtonian (1:1)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.mix(0.4)));

    // Standard empirical RAR over the observed g_bar range.
    let n = 300;
    let curve: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let log_gb = x_min + (x_max - x_min) * i as f64 / (n - 1) as f64;
            let gb = 10f64.powf(log_gb);
            (log_gb, empirical_rar(gb, a0).log10())
        })
        .collect();
    chart
        .draw_series(LineSeries::new(curve, GREEN.stroke_width(3)))
        .map_err(plot_err)?
        .label("Empirical RAR")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN.stroke_width(3)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(log_points.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_points_convert_to_si_and_filter() {
        let points = vec![
            RarPoint { name: "G".into(), g_bar: 2500.0, g_obs: 10000.0, r_frac: 0.5 },
            RarPoint { name: "G".into(), g_bar: 0.0, g_obs: 10.0, r_frac: 0.5 },
        ];
        let log_points = rar_log_points(&points);
        assert_eq!(log_points.len(), 1);
        let expected_x = (2500.0 * ACCEL_SI_PER_NATURAL).log10();
        assert!((log_points[0].0 - expected_x).abs() < 1e-12);
    }
}
