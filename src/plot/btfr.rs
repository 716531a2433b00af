//! BTFR signature plot.
//!
//! Scatter of `log10(M_b)` vs `log10(V_flat)` with the least-squares slope of
//! this fleet drawn on top, plus the canonical slope-4.0 BTFR anchored at the
//! data means so the tilt difference is visible.

use std::path::Path;

use plotters::prelude::*;

use crate::domain::{BtfrMassRecord, REFERENCE_BTFR_SLOPE};
use crate::error::AppError;
use crate::math::ols::fit_line;
use crate::plot::plot_err;

/// Fit parameters behind a rendered BTFR figure.
#[derive(Debug, Clone, Copy)]
pub struct BtfrFit {
    pub slope: f64,
    pub intercept: f64,
    pub n: usize,
}

/// Rows usable for the log-log plane: finite, strictly positive values.
pub fn btfr_log_points(records: &[BtfrMassRecord]) -> Vec<(f64, f64)> {
    records
        .iter()
        .filter(|r| r.v_flat > 0.0 && r.m_b > 0.0 && r.v_flat.is_finite() && r.m_b.is_finite())
        .map(|r| (r.v_flat.log10(), r.m_b.log10()))
        .collect()
}

/// Fit the BTFR power law in log space.
pub fn fit_btfr(records: &[BtfrMassRecord]) -> Result<BtfrFit, AppError> {
    let points = btfr_log_points(records);
    if points.len() < 2 {
        return Err(AppError::new(
            3,
            "Not enough finite BTFR rows to fit a slope (need at least 2).",
        ));
    }
    let x: Vec<f64> = points.iter().map(|p| p.0).collect();
    let y: Vec<f64> = points.iter().map(|p| p.1).collect();
    let (slope, intercept) = fit_line(&x, &y)
        .ok_or_else(|| AppError::new(4, "BTFR least-squares fit failed to converge."))?;
    Ok(BtfrFit {
        slope,
        intercept,
        n: points.len(),
    })
}

/// Render the BTFR figure and return the fitted parameters.
pub fn render_btfr_plot(path: &Path, records: &[BtfrMassRecord]) -> Result<BtfrFit, AppError> {
    let points = btfr_log_points(records);
    let fit = fit_btfr(records)?;

    let (x_min, x_max) = value_range(points.iter().map(|p| p.0));
    let (y_min, y_max) = value_range(points.iter().map(|p| p.1));

    let root = BitMapBackend::new(path, (1200, 900)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Baryonic Tully-Fisher Relation", ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("log10(V_flat) [km/s]")
        .y_desc("log10(M_b) [Msun]")
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, BLUE.mix(0.6).filled())),
        )
        .map_err(plot_err)?
        .label(format!("Fleet ({} galaxies)", fit.n))
        .legend(|(x, y)| Circle::new((x + 10, y), 4, BLUE.mix(0.6).filled()));

    let fitted = line_points(x_min, x_max, fit.slope, fit.intercept);
    chart
        .draw_series(LineSeries::new(fitted, RED.stroke_width(3)))
        .map_err(plot_err)?
        .label(format!("Fitted slope: {:.2}", fit.slope))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(3)));

    // Reference slope anchored at the data means, so only the tilt differs.
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / points.len() as f64;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / points.len() as f64;
    let ref_intercept = mean_y - REFERENCE_BTFR_SLOPE * mean_x;
    let reference = line_points(x_min, x_max, REFERENCE_BTFR_SLOPE, ref_intercept);
    chart
        .draw_series(LineSeries::new(reference, GREEN.mix(0.7).stroke_width(2)))
        .map_err(plot_err)?
        .label(format!("Standard BTFR slope ({REFERENCE_BTFR_SLOPE:.1})"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN.mix(0.7)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(fit)
}

fn line_points(x_min: f64, x_max: f64, slope: f64, intercept: f64) -> Vec<(f64, f64)> {
    let n = 100;
    (0..n)
        .map(|i| {
            let x = x_min + (x_max - x_min) * i as f64 / (n - 1) as f64;
            (x, slope * x + intercept)
        })
        .collect()
}

pub(crate) fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !(min.is_finite() && max.is_finite()) {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.05).max(1e-3);
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, v_flat: f64, m_b: f64) -> BtfrMassRecord {
        BtfrMassRecord {
            name: name.to_string(),
            v_flat,
            m_b,
        }
    }

    #[test]
    fn fit_recovers_a_known_power_law() {
        // log m = 3.1 * log v + 2.0
        let records: Vec<BtfrMassRecord> = (1..=20)
            .map(|i| {
                let v = 60.0 + 10.0 * i as f64;
                let m = 10f64.powf(3.1 * v.log10() + 2.0);
                record(&format!("G{i}"), v, m)
            })
            .collect();
        let fit = fit_btfr(&records).unwrap();
        assert!((fit.slope - 3.1).abs() < 1e-6);
        assert!((fit.intercept - 2.0).abs() < 1e-6);
        assert_eq!(fit.n, 20);
    }

    #[test]
    fn non_positive_rows_are_dropped_before_fitting() {
        let records = vec![
            record("G1", 100.0, 1.0e10),
            record("G2", -5.0, 1.0e10),
            record("G3", 100.0, f64::NAN),
        ];
        assert_eq!(btfr_log_points(&records).len(), 1);
    }

    #[test]
    fn degenerate_table_is_a_clean_error() {
        let err = fit_btfr(&[record("G1", 100.0, 1.0e10)]).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
