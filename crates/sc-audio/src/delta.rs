use ndarray::{Array2, ArrayView2};
use sc_core::error::CoreError;

/// First-order temporal derivative along the column (time) axis.
///
/// Interior frames use the local least-squares slope over `width` frames:
/// `Σ k·x[t+k] / Σ k²` for `k ∈ [−w/2, w/2]`. The first and last `w/2`
/// frames take the slope of the nearest full window, as a linear fit over
/// the edge window would.
///
/// # Errors
/// Returns `InvalidArgument` if `width` is even, below 3, or larger than the
/// number of frames.
///
/// # Example
/// ```
/// use ndarray::Array2;
/// use sc_audio::delta::delta;
/// // A ramp of slope 2 has a constant delta of 2, edges included.
/// let ramp = Array2::from_shape_fn((1, 12), |(_, t)| 2.0 * t as f32);
/// let d = delta(ramp.view(), 9).unwrap();
/// assert!(d.iter().all(|&v| (v - 2.0).abs() < 1e-5));
/// ```
pub fn delta(data: ArrayView2<'_, f32>, width: usize) -> Result<Array2<f32>, CoreError> {
    let (rows, frames) = data.dim();
    if width < 3 || width % 2 == 0 {
        return Err(CoreError::InvalidArgument(format!(
            "largeur de delta {width} : impaire et ≥ 3 requise"
        )));
    }
    if width > frames {
        return Err(CoreError::InvalidArgument(format!(
            "largeur de delta {width} > {frames} frames"
        )));
    }

    let half = width / 2;
    let denom: f32 = (1..=half).map(|k| 2.0 * (k * k) as f32).sum();
    let mut out = Array2::<f32>::zeros((rows, frames));

    for r in 0..rows {
        let row = data.row(r);
        for t in half..frames - half {
            let num: f32 = (1..=half)
                .map(|k| k as f32 * (row[t + k] - row[t - k]))
                .sum();
            out[[r, t]] = num / denom;
        }
        let first = out[[r, half]];
        let last = out[[r, frames - 1 - half]];
        for t in 0..half {
            out[[r, t]] = first;
            out[[r, frames - 1 - t]] = last;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn constant_signal_has_zero_delta() {
        let data = Array2::from_elem((3, 9), 4.2f32);
        let d = delta(data.view(), 9).unwrap();
        assert!(d.iter().all(|v| v.abs() < 1e-6));
    }

    #[test]
    fn interior_matches_regression_formula() {
        let data = array![[0.0f32, 1.0, 4.0, 9.0, 16.0]];
        let d = delta(data.view(), 3).unwrap();
        // (x[t+1] - x[t-1]) / 2
        assert!((d[[0, 2]] - 4.0).abs() < 1e-6);
        assert!((d[[0, 1]] - 2.0).abs() < 1e-6);
        assert!((d[[0, 3]] - 6.0).abs() < 1e-6);
        // Edges copy the nearest interior slope.
        assert!((d[[0, 0]] - 2.0).abs() < 1e-6);
        assert!((d[[0, 4]] - 6.0).abs() < 1e-6);
    }

    #[test]
    fn rows_are_independent() {
        let data = Array2::from_shape_fn((2, 10), |(r, t)| if r == 0 { t as f32 } else { -(t as f32) });
        let d = delta(data.view(), 5).unwrap();
        assert!(d.row(0).iter().all(|&v| (v - 1.0).abs() < 1e-5));
        assert!(d.row(1).iter().all(|&v| (v + 1.0).abs() < 1e-5));
    }

    #[test]
    fn invalid_widths_are_rejected() {
        let data = Array2::<f32>::zeros((1, 5));
        assert!(delta(data.view(), 4).is_err());
        assert!(delta(data.view(), 1).is_err());
        assert!(delta(data.view(), 7).is_err());
    }
}
