use ndarray::Array2;
use sc_core::error::CoreError;

use crate::fft::FftPipeline;

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Hz → mel, Slaney scale: linear below 1 kHz, logarithmic above.
///
/// # Example
/// ```
/// use sc_audio::mel::{hz_to_mel, mel_to_hz};
/// assert!((hz_to_mel(1000.0) - 15.0).abs() < 1e-9);
/// assert!((mel_to_hz(hz_to_mel(4321.0)) - 4321.0).abs() < 1e-6);
/// ```
#[must_use]
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

/// Mel → Hz, inverse of [`hz_to_mel`].
#[must_use]
pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// Triangular mel filterbank with Slaney area normalisation, `(n_mels, bins)`.
///
/// Filters span `0 Hz` to Nyquist.
#[derive(Clone, Debug)]
pub struct MelFilterbank {
    sample_rate: u32,
    weights: Array2<f32>,
}

impl MelFilterbank {
    /// # Example
    /// ```
    /// use sc_audio::mel::MelFilterbank;
    /// let bank = MelFilterbank::new(22050, 2048, 60);
    /// assert_eq!(bank.weights().dim(), (60, 1025));
    /// ```
    #[must_use]
    pub fn new(sample_rate: u32, n_fft: usize, n_mels: usize) -> Self {
        let bins = n_fft / 2 + 1;
        let sr = f64::from(sample_rate);
        let fft_freqs: Vec<f64> = (0..bins).map(|i| i as f64 * sr / n_fft as f64).collect();

        let mel_max = hz_to_mel(sr / 2.0);
        let mel_points: Vec<f64> = (0..n_mels + 2)
            .map(|i| mel_to_hz(mel_max * i as f64 / (n_mels + 1) as f64))
            .collect();

        let mut weights = Array2::<f32>::zeros((n_mels, bins));
        for m in 0..n_mels {
            let (left, center, right) = (mel_points[m], mel_points[m + 1], mel_points[m + 2]);
            let enorm = 2.0 / (right - left);
            for (k, &f) in fft_freqs.iter().enumerate() {
                let lower = (f - left) / (center - left);
                let upper = (right - f) / (right - center);
                let w = lower.min(upper).max(0.0);
                weights[[m, k]] = (w * enorm) as f32;
            }
        }

        Self {
            sample_rate,
            weights,
        }
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[must_use]
    pub fn n_mels(&self) -> usize {
        self.weights.nrows()
    }

    #[must_use]
    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    /// Project a `(bins, frames)` power spectrogram onto the mel axis.
    #[must_use]
    pub fn apply(&self, power: &Array2<f32>) -> Array2<f32> {
        self.weights.dot(power)
    }
}

/// Mel power spectrogram front end shared by both feature variants.
///
/// The filterbank depends on the sample rate; it is built on first use and
/// rebuilt only when a clip with another rate comes in.
pub struct MelSpectrogram {
    fft: FftPipeline,
    hop: usize,
    n_mels: usize,
    bank: Option<MelFilterbank>,
}

impl MelSpectrogram {
    /// # Panics
    /// Panics if `n_fft` is 0.
    #[must_use]
    pub fn new(n_fft: usize, hop: usize, n_mels: usize) -> Self {
        Self {
            fft: FftPipeline::new(n_fft),
            hop,
            n_mels,
            bank: None,
        }
    }

    /// Mel power spectrogram `(n_mels, frames)` of `signal`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the signal is too short for a centered STFT
    /// or `sample_rate` is 0.
    pub fn compute(&mut self, signal: &[f32], sample_rate: u32) -> Result<Array2<f32>, CoreError> {
        if sample_rate == 0 {
            return Err(CoreError::InvalidArgument(
                "fréquence d'échantillonnage nulle".into(),
            ));
        }
        let power = self.fft.stft_power(signal, self.hop)?;
        let bank = match self.bank.take() {
            Some(bank) if bank.sample_rate() == sample_rate => bank,
            _ => {
                log::debug!(
                    "Filterbank mel {} bandes @ {}Hz (n_fft {})",
                    self.n_mels,
                    sample_rate,
                    self.fft.fft_size()
                );
                MelFilterbank::new(sample_rate, self.fft.fft_size(), self.n_mels)
            }
        };
        let mel = bank.apply(&power);
        self.bank = Some(bank);
        Ok(mel)
    }
}

/// Reference-1 decibel conversion of an amplitude spectrogram, in place.
///
/// `20·log10(max(x, 1e-5))`, then floored at `peak − top_db`.
pub fn amplitude_to_db(values: &mut Array2<f32>, top_db: f32) {
    to_db(values, 20.0, 1e-5, top_db);
}

/// Reference-1 decibel conversion of a power spectrogram, in place.
///
/// `10·log10(max(x, 1e-10))`, then floored at `peak − top_db`.
///
/// # Example
/// ```
/// use ndarray::array;
/// use sc_audio::mel::power_to_db;
/// let mut s = array![[1.0f32, 100.0], [0.0, 1e-12]];
/// power_to_db(&mut s, 80.0);
/// assert!((s[[0, 1]] - 20.0).abs() < 1e-4);
/// assert!((s[[1, 0]] - (-60.0)).abs() < 1e-4);
/// ```
pub fn power_to_db(values: &mut Array2<f32>, top_db: f32) {
    to_db(values, 10.0, 1e-10, top_db);
}

fn to_db(values: &mut Array2<f32>, scale: f32, amin: f32, top_db: f32) {
    values.mapv_inplace(|x| scale * x.max(amin).log10());
    let peak = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let floor = peak - top_db;
    values.mapv_inplace(|x| x.max(floor));
}
