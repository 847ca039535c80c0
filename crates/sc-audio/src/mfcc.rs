use ndarray::Array2;

/// Orthonormal DCT-II restricted to its first `n_coeffs` rows.
///
/// `y[k] = s(k) · Σ x[n]·cos(π·k·(2n+1) / 2N)` with `s(0) = √(1/N)` and
/// `s(k) = √(2/N)` otherwise.
///
/// # Example
/// ```
/// use ndarray::Array2;
/// use sc_audio::mfcc::DctMatrix;
/// let dct = DctMatrix::new(4, 4);
/// // A constant input only excites the first coefficient.
/// let x = Array2::from_elem((4, 1), 1.0f32);
/// let y = dct.apply(&x);
/// assert!((y[[0, 0]] - 2.0).abs() < 1e-5);
/// assert!(y.iter().skip(1).all(|v| v.abs() < 1e-5));
/// ```
#[derive(Clone, Debug)]
pub struct DctMatrix {
    basis: Array2<f32>,
}

impl DctMatrix {
    #[must_use]
    pub fn new(n_coeffs: usize, n_inputs: usize) -> Self {
        let n = n_inputs as f64;
        let basis = Array2::from_shape_fn((n_coeffs, n_inputs), |(k, i)| {
            let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            let angle = std::f64::consts::PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * n);
            (scale * angle.cos()) as f32
        });
        Self { basis }
    }

    /// Transform along the first axis: `(n_inputs, frames) → (n_coeffs, frames)`.
    #[must_use]
    pub fn apply(&self, input: &Array2<f32>) -> Array2<f32> {
        self.basis.dot(input)
    }
}
