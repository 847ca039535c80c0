use ndarray::Array2;
use realfft::RealFftPlanner;
use realfft::num_complex::Complex;
use sc_core::error::CoreError;

/// FFT pipeline: windowed real FFT using realfft.
///
/// Pre-allocates the FFT plan and scratch buffers; every frame of every
/// window reuses them.
///
/// # Example
/// ```
/// use sc_audio::fft::FftPipeline;
/// let fft = FftPipeline::new(2048);
/// assert_eq!(fft.bins(), 1025);
/// ```
pub struct FftPipeline {
    fft_size: usize,
    input_buf: Vec<f32>,
    spectrum_buf: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    plan: std::sync::Arc<dyn realfft::RealToComplex<f32>>,
    /// Periodic Hann window coefficients.
    window: Vec<f32>,
}

impl FftPipeline {
    /// Create a new FFT pipeline with the given window size.
    ///
    /// # Panics
    /// Panics if `size` is 0.
    #[must_use]
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "FFT size must be > 0");

        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(size);

        let input_buf = plan.make_input_vec();
        let spectrum_buf = plan.make_output_vec();
        let scratch = plan.make_scratch_vec();

        // Periodic Hann (spectral analysis convention, not the symmetric filter-design one)
        let window: Vec<f32> = (0..size)
            .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / size as f32).cos())
            .collect();

        Self {
            fft_size: size,
            input_buf,
            spectrum_buf,
            scratch,
            plan,
            window,
        }
    }

    /// Power spectrum `|X|²` of one Hann-windowed frame, written into `out`.
    ///
    /// `frame` shorter than the FFT size is zero-padded. `out` must hold
    /// `bins()` values.
    ///
    /// # Example
    /// ```
    /// use sc_audio::fft::FftPipeline;
    /// let mut fft = FftPipeline::new(256);
    /// let mut out = vec![0.0f32; fft.bins()];
    /// fft.power_into(&[0.0f32; 256], &mut out);
    /// assert!(out.iter().all(|&p| p == 0.0));
    /// ```
    pub fn power_into(&mut self, frame: &[f32], out: &mut [f32]) {
        let n = self.fft_size.min(frame.len());

        for (i, slot) in self.input_buf.iter_mut().enumerate() {
            *slot = if i < n { frame[i] * self.window[i] } else { 0.0 };
        }

        if self
            .plan
            .process_with_scratch(&mut self.input_buf, &mut self.spectrum_buf, &mut self.scratch)
            .is_err()
        {
            out.fill(0.0);
            return;
        }

        for (slot, c) in out.iter_mut().zip(&self.spectrum_buf) {
            *slot = c.norm_sqr();
        }
    }

    /// Centered short-time power spectrogram, `(bins, frames)`.
    ///
    /// The signal is reflect-padded by `fft_size / 2` on both sides, so frame
    /// `t` is centered on sample `t × hop` and a signal of `hop × (k − 1)`
    /// samples yields exactly `k` frames.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `hop` is 0 or the signal is too short to
    /// reflect (`len ≤ fft_size / 2`).
    pub fn stft_power(&mut self, signal: &[f32], hop: usize) -> Result<Array2<f32>, CoreError> {
        if hop == 0 {
            return Err(CoreError::InvalidArgument("hop STFT nul".into()));
        }
        let pad = self.fft_size / 2;
        let padded = reflect_pad(signal, pad)?;
        let frames = 1 + (padded.len() - self.fft_size) / hop;

        let mut spec = Array2::<f32>::zeros((self.bins(), frames));
        let mut column = vec![0.0f32; self.bins()];
        for t in 0..frames {
            let start = t * hop;
            self.power_into(&padded[start..start + self.fft_size], &mut column);
            for (bin, &p) in column.iter().enumerate() {
                spec[[bin, t]] = p;
            }
        }
        Ok(spec)
    }

    /// FFT window size.
    #[must_use]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of non-negative frequency bins, `fft_size / 2 + 1`.
    #[must_use]
    pub fn bins(&self) -> usize {
        self.fft_size / 2 + 1
    }
}

/// Mirror `pad` samples on both ends, excluding the edge sample.
///
/// `[a, b, c, d]` padded by 2 becomes `[c, b, a, b, c, d, c, b]`.
fn reflect_pad(signal: &[f32], pad: usize) -> Result<Vec<f32>, CoreError> {
    let len = signal.len();
    if pad >= len {
        return Err(CoreError::InvalidArgument(format!(
            "signal de {len} échantillons trop court pour un padding réfléchi de {pad}"
        )));
    }
    let mut padded = Vec::with_capacity(len + 2 * pad);
    padded.extend((1..=pad).rev().map(|i| signal[i]));
    padded.extend_from_slice(signal);
    padded.extend((0..pad).map(|k| signal[len - 2 - k]));
    Ok(padded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_pad_mirrors_without_edge() {
        let padded = reflect_pad(&[1.0, 2.0, 3.0, 4.0], 2).unwrap();
        assert_eq!(padded, vec![3.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0, 2.0]);
        assert!(reflect_pad(&[1.0, 2.0], 2).is_err());
    }

    #[test]
    fn stft_frame_count_follows_hop() {
        let mut fft = FftPipeline::new(64);
        let signal = vec![0.1f32; 16 * 8];
        let spec = fft.stft_power(&signal, 16).unwrap();
        assert_eq!(spec.dim(), (33, 9));
    }

    #[test]
    fn sine_peaks_at_its_bin() {
        let n = 256;
        let sr = 8000.0f32;
        let bin = 32;
        let freq = bin as f32 * sr / n as f32;
        let samples: Vec<f32> = (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sr).sin())
            .collect();

        let mut fft = FftPipeline::new(n);
        let mut out = vec![0.0; fft.bins()];
        fft.power_into(&samples, &mut out);

        let peak = out
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(peak, Some(bin));
    }

    #[test]
    fn power_is_unnormalised() {
        // DC frame of ones: bin 0 = (sum of Hann)² = (N/2)².
        let n = 128;
        let mut fft = FftPipeline::new(n);
        let mut out = vec![0.0; fft.bins()];
        fft.power_into(&vec![1.0; n], &mut out);
        let expected = (n as f32 / 2.0).powi(2);
        assert!((out[0] - expected).abs() / expected < 1e-4);
    }
}
