use ndarray::{Array3, Axis, s};
use sc_core::config::{FeatureConfig, FeatureKind};
use sc_core::error::CoreError;
use sc_core::frame::{FeatureFrame, FrameShape};
use sc_core::traits::FeatureExtractor;

use crate::delta::delta;
use crate::mel::{MelSpectrogram, amplitude_to_db, power_to_db};
use crate::mfcc::DctMatrix;
use crate::window::full_windows;

/// Log-mel spectrogram plus its delta, `(bands, frames, 2)`.
///
/// # Example
/// ```
/// use sc_audio::features::LogMelExtractor;
/// use sc_core::config::FeatureConfig;
/// use sc_core::frame::FrameShape;
/// use sc_core::traits::FeatureExtractor;
///
/// let config = FeatureConfig::default();
/// let mut extractor = LogMelExtractor::new(&config);
/// let window = vec![0.0f32; config.window_size()];
/// let frame = extractor.extract(&window, 22050).unwrap();
/// assert_eq!(frame.shape(), FrameShape::new(60, 41, 2));
/// ```
pub struct LogMelExtractor {
    mel: MelSpectrogram,
    bands: usize,
    frames: usize,
    window_size: usize,
    delta_width: usize,
    top_db: f32,
}

impl LogMelExtractor {
    /// # Panics
    /// Panics if `config.n_fft` is 0.
    #[must_use]
    pub fn new(config: &FeatureConfig) -> Self {
        Self {
            mel: MelSpectrogram::new(config.n_fft, config.hop_length, config.bands),
            bands: config.bands,
            frames: config.frames,
            window_size: config.window_size(),
            delta_width: config.delta_width,
            top_db: config.top_db,
        }
    }
}

impl FeatureExtractor for LogMelExtractor {
    fn extract(&mut self, window: &[f32], sample_rate: u32) -> Result<FeatureFrame, CoreError> {
        check_window(window, self.window_size)?;
        let mut log_mel = self.mel.compute(window, sample_rate)?;
        check_frames(log_mel.ncols(), self.frames)?;
        amplitude_to_db(&mut log_mel, self.top_db);
        let deltas = delta(log_mel.view(), self.delta_width)?;

        let mut data = Array3::<f32>::zeros((self.bands, self.frames, 2));
        data.slice_mut(s![.., .., 0]).assign(&log_mel);
        data.slice_mut(s![.., .., 1]).assign(&deltas);
        Ok(FeatureFrame::new(data))
    }

    fn frame_shape(&self) -> FrameShape {
        FrameShape::new(self.bands, self.frames, 2)
    }
}

/// MFCC matrix, `(frames, coefficients, 1)`.
///
/// # Example
/// ```
/// use sc_audio::features::MfccExtractor;
/// use sc_core::config::{FeatureConfig, FeatureKind};
/// use sc_core::frame::FrameShape;
/// use sc_core::traits::FeatureExtractor;
///
/// let config = FeatureConfig::for_kind(FeatureKind::Mfcc);
/// let mut extractor = MfccExtractor::new(&config);
/// let window: Vec<f32> = (0..config.window_size()).map(|i| (i as f32 * 0.05).sin()).collect();
/// let frame = extractor.extract(&window, 22050).unwrap();
/// assert_eq!(frame.shape(), FrameShape::new(41, 20, 1));
/// ```
pub struct MfccExtractor {
    mel: MelSpectrogram,
    dct: DctMatrix,
    coeffs: usize,
    frames: usize,
    window_size: usize,
    top_db: f32,
}

impl MfccExtractor {
    /// # Panics
    /// Panics if `config.n_fft` is 0.
    #[must_use]
    pub fn new(config: &FeatureConfig) -> Self {
        Self {
            mel: MelSpectrogram::new(config.n_fft, config.hop_length, config.mfcc_mels),
            dct: DctMatrix::new(config.bands, config.mfcc_mels),
            coeffs: config.bands,
            frames: config.frames,
            window_size: config.window_size(),
            top_db: config.top_db,
        }
    }
}

impl FeatureExtractor for MfccExtractor {
    fn extract(&mut self, window: &[f32], sample_rate: u32) -> Result<FeatureFrame, CoreError> {
        check_window(window, self.window_size)?;
        let mut log_mel = self.mel.compute(window, sample_rate)?;
        check_frames(log_mel.ncols(), self.frames)?;
        power_to_db(&mut log_mel, self.top_db);

        // (coeffs, frames) → (frames, coeffs, 1)
        let mfcc = self.dct.apply(&log_mel).reversed_axes();
        let data = mfcc.insert_axis(Axis(2)).as_standard_layout().into_owned();
        Ok(FeatureFrame::new(data))
    }

    fn frame_shape(&self) -> FrameShape {
        FrameShape::new(self.frames, self.coeffs, 1)
    }
}

/// Build the extractor matching `config.kind`.
///
/// # Panics
/// Panics if `config.n_fft` is 0; validated configs never are.
#[must_use]
pub fn extractor_for(config: &FeatureConfig) -> Box<dyn FeatureExtractor> {
    match config.kind {
        FeatureKind::LogMel => Box::new(LogMelExtractor::new(config)),
        FeatureKind::Mfcc => Box::new(MfccExtractor::new(config)),
    }
}

/// Slice a clip into overlapping windows and extract one frame per full window.
///
/// Windows running past the end of the clip are dropped, never padded.
///
/// # Errors
/// Returns `InvalidArgument` for a window size below 2, or any extractor error.
pub fn extract_clip(
    samples: &[f32],
    sample_rate: u32,
    window_size: usize,
    extractor: &mut dyn FeatureExtractor,
) -> Result<Vec<FeatureFrame>, CoreError> {
    full_windows(samples, window_size)?
        .map(|window| extractor.extract(window, sample_rate))
        .collect()
}

fn check_window(window: &[f32], expected: usize) -> Result<(), CoreError> {
    if window.len() == expected {
        Ok(())
    } else {
        Err(CoreError::InvalidArgument(format!(
            "fenêtre de {} échantillons, {expected} attendus",
            window.len()
        )))
    }
}

fn check_frames(found: usize, expected: usize) -> Result<(), CoreError> {
    if found == expected {
        Ok(())
    } else {
        Err(CoreError::InvalidArgument(format!(
            "{found} frames STFT produites, {expected} attendues"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(kind: FeatureKind) -> FeatureConfig {
        FeatureConfig {
            frames: 9,
            bands: match kind {
                FeatureKind::LogMel => 16,
                FeatureKind::Mfcc => 8,
            },
            hop_length: 128,
            n_fft: 512,
            mfcc_mels: 32,
            ..FeatureConfig::for_kind(kind)
        }
    }

    fn chirp(len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f32 / 16000.0;
                (2.0 * std::f32::consts::PI * (200.0 + 2000.0 * t) * t).sin()
            })
            .collect()
    }

    #[test]
    fn clip_of_one_window_yields_one_frame() {
        let config = small_config(FeatureKind::LogMel);
        let w = config.window_size();
        let mut extractor = LogMelExtractor::new(&config);
        let frames = extract_clip(&chirp(w), 16000, w, &mut extractor).unwrap();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn clip_of_one_and_a_half_windows_yields_two_frames() {
        let config = small_config(FeatureKind::LogMel);
        let w = config.window_size();
        let mut extractor = LogMelExtractor::new(&config);
        let frames = extract_clip(&chirp(w + w / 2), 16000, w, &mut extractor).unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.shape() == extractor.frame_shape()));
    }

    #[test]
    fn clip_shorter_than_window_yields_nothing() {
        let config = small_config(FeatureKind::Mfcc);
        let w = config.window_size();
        let mut extractor = MfccExtractor::new(&config);
        let frames = extract_clip(&chirp(w - 1), 16000, w, &mut extractor).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn tail_window_past_clip_end_is_dropped() {
        // Starts 0, w/2, w fit in 2w samples; 3w/2 would run past the end.
        let config = small_config(FeatureKind::LogMel);
        let w = config.window_size();
        let mut extractor = LogMelExtractor::new(&config);
        let frames = extract_clip(&chirp(2 * w), 16000, w, &mut extractor).unwrap();
        assert_eq!(frames.len(), 3);
    }

    #[test]
    fn log_mel_respects_top_db_and_delta_channel() {
        let config = small_config(FeatureKind::LogMel);
        let mut extractor = LogMelExtractor::new(&config);
        let frame = extractor
            .extract(&chirp(config.window_size()), 16000)
            .unwrap();
        let log_mel = frame.data().slice(s![.., .., 0]).to_owned();
        let peak = log_mel.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let low = log_mel.iter().copied().fold(f32::INFINITY, f32::min);
        assert!(peak - low <= config.top_db + 1e-3);

        let expected = delta(log_mel.view(), config.delta_width).unwrap();
        assert_eq!(frame.data().slice(s![.., .., 1]), expected);
    }

    #[test]
    fn silence_maps_to_floor() {
        let config = small_config(FeatureKind::LogMel);
        let mut extractor = LogMelExtractor::new(&config);
        let frame = extractor
            .extract(&vec![0.0; config.window_size()], 16000)
            .unwrap();
        // 20·log10(1e-5) everywhere, and a flat delta.
        assert!(frame.data().slice(s![.., .., 0]).iter().all(|&v| (v + 100.0).abs() < 1e-3));
        assert!(frame.data().slice(s![.., .., 1]).iter().all(|v| v.abs() < 1e-6));
    }

    #[test]
    fn mfcc_layout_is_frames_by_coefficients() {
        let config = small_config(FeatureKind::Mfcc);
        let mut extractor = MfccExtractor::new(&config);
        let frame = extractor
            .extract(&chirp(config.window_size()), 16000)
            .unwrap();
        assert_eq!(frame.shape(), FrameShape::new(9, 8, 1));
        assert!(frame.data().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn wrong_window_length_is_rejected() {
        let config = small_config(FeatureKind::Mfcc);
        let mut extractor = MfccExtractor::new(&config);
        let err = extractor.extract(&[0.0; 100], 16000);
        assert!(matches!(err, Err(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn extractor_for_follows_kind() {
        let logmel = extractor_for(&small_config(FeatureKind::LogMel));
        assert_eq!(logmel.frame_shape(), FrameShape::new(16, 9, 2));
        let mfcc = extractor_for(&small_config(FeatureKind::Mfcc));
        assert_eq!(mfcc.frame_shape(), FrameShape::new(9, 8, 1));
    }
}
