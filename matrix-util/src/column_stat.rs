//! Column-wise summaries of a dense matrix where missing entries are
//! encoded as `NaN`.
//!
//! Each column is summarized over its finite entries only. A column
//! without any finite entry yields `NaN`, so callers can map it back
//! to a missing value.

use ndarray::{Array1, ArrayBase, Axis, Data, Ix2};

/// Median of the finite values (average of the two middle values for
/// an even count). `None` if nothing is left after dropping `NaN`s.
pub fn nan_median(values: &[f64]) -> Option<f64> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(|a, b| a.total_cmp(b));
    let mid = finite.len() / 2;
    if finite.len() % 2 == 0 {
        Some((finite[mid - 1] + finite[mid]) / 2.0)
    } else {
        Some(finite[mid])
    }
}

/// Arithmetic mean of the finite values. `None` if there are none.
pub fn nan_mean(values: &[f64]) -> Option<f64> {
    let (s1, s0) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s1, s0), &v| (s1 + v, s0 + 1));
    if s0 == 0 {
        None
    } else {
        Some(s1 / s0 as f64)
    }
}

/// Column summaries for `NaN`-padded matrices (rows = observations)
pub trait ColumnStatOps {
    /// Per-column median skipping `NaN`s
    fn nan_median_columns(&self) -> Array1<f64>;

    /// Per-column mean skipping `NaN`s
    fn nan_mean_columns(&self) -> Array1<f64>;
}

impl<S> ColumnStatOps for ArrayBase<S, Ix2>
where
    S: Data<Elem = f64>,
{
    fn nan_median_columns(&self) -> Array1<f64> {
        self.axis_iter(Axis(1))
            .map(|col| nan_median(&col.to_vec()).unwrap_or(f64::NAN))
            .collect()
    }

    fn nan_mean_columns(&self) -> Array1<f64> {
        self.axis_iter(Axis(1))
            .map(|col| nan_mean(&col.to_vec()).unwrap_or(f64::NAN))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_nan_median_odd_even() {
        assert_eq!(nan_median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(nan_median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(nan_median(&[f64::NAN, 5.0]), Some(5.0));
        assert_eq!(nan_median(&[f64::NAN]), None);
        assert_eq!(nan_median(&[]), None);
    }

    #[test]
    fn test_nan_mean() {
        approx::assert_abs_diff_eq!(nan_mean(&[1.0, 2.0, f64::NAN]).unwrap(), 1.5);
        assert!(nan_mean(&[f64::NAN, f64::NAN]).is_none());
    }

    #[test]
    fn test_columns_skip_missing() {
        let mat = array![[1.0, f64::NAN, 10.0], [3.0, f64::NAN, 20.0], [5.0, f64::NAN, f64::NAN]];

        let med = mat.nan_median_columns();
        assert_eq!(med[0], 3.0);
        assert!(med[1].is_nan());
        assert_eq!(med[2], 15.0);

        let avg = mat.nan_mean_columns();
        approx::assert_abs_diff_eq!(avg[0], 3.0);
        assert!(avg[1].is_nan());
        approx::assert_abs_diff_eq!(avg[2], 15.0);
    }
}
