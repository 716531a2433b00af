//! Summary statistics used by the flat-velocity reduction and the scatter
//! diagnostics.
//!
//! `median` averages the two middle elements for even-length input, matching
//! the usual convention for rotation-curve reductions.

/// Median of a slice. Returns `None` for empty input or when any value is
/// non-finite (a NaN would make the ordering meaningless).
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

/// Root mean square of a slice. Returns `None` for empty input.
pub fn rms(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mean_sq = values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64;
    Some(mean_sq.sqrt())
}

/// Median of absolute values. Returns `None` for empty input.
pub fn median_abs(values: &[f64]) -> Option<f64> {
    let abs: Vec<f64> = values.iter().map(|v| v.abs()).collect();
    median(&abs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn median_rejects_nan() {
        assert_eq!(median(&[1.0, f64::NAN]), None);
    }

    #[test]
    fn rms_and_median_abs() {
        let values = [3.0, -4.0];
        let r = rms(&values).unwrap();
        assert!((r - (12.5f64).sqrt()).abs() < 1e-12);
        assert_eq!(median_abs(&values), Some(3.5));
    }
}
