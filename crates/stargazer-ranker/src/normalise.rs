//! Score normalisation functions.
//! Gene-level means followed by per-column min-max scaling.

/// Columns whose range is below this are treated as constant.
pub const DEGENERATE_RANGE: f64 = 1e-10;

/// Arithmetic mean of the finite values. `None` when there are none.
pub fn nan_safe_mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

/// Min-max normalisation within [min_val, max_val].
///
/// A constant column (max == min) has no spread to scale. A non-zero
/// constant maps to 1.0 and a zero constant to 0.0, so a lone gene keeps
/// credit for the evidence it has and an all-absent column stays absent.
pub fn minmax_normalise(value: f64, min_val: f64, max_val: f64) -> f64 {
    if (max_val - min_val).abs() < DEGENERATE_RANGE {
        return if value.abs() < DEGENERATE_RANGE { 0.0 } else { 1.0 };
    }
    ((value - min_val) / (max_val - min_val)).clamp(0.0, 1.0)
}

/// Normalise one gene-aggregated column. `None` entries are left out of the
/// min/max domain and stay `None`.
pub fn minmax_column(column: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut bounds: Option<(f64, f64)> = None;
    for v in column.iter().flatten() {
        bounds = Some(match bounds {
            None => (*v, *v),
            Some((lo, hi)) => (lo.min(*v), hi.max(*v)),
        });
    }
    match bounds {
        None => vec![None; column.len()],
        Some((lo, hi)) => column
            .iter()
            .map(|v| v.map(|x| minmax_normalise(x, lo, hi)))
            .collect(),
    }
}
