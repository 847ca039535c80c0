use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::frame::FrameShape;

/// Configuration complète d'un run, immuable une fois validée.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use sc_core::config::{Config, FeatureKind};
/// let config = Config::default();
/// assert_eq!(config.features.kind, FeatureKind::LogMel);
/// assert_eq!(config.features.window_size(), 20480);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    pub corpus: CorpusConfig,
    pub features: FeatureConfig,
    pub split: SplitConfig,
    pub training: TrainingConfig,
}

/// Que faire d'un fichier illisible ou mal nommé pendant le scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop the whole run on the first failing file.
    #[default]
    Abort,
    /// Log a warning and continue with the next file.
    Skip,
}

/// Feature variant, chosen by the network that will consume it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// Log-mel spectrogram plus delta, `(bands, frames, 2)`. Convolutional path.
    #[default]
    #[serde(alias = "log_mel")]
    LogMel,
    /// MFCC matrix, `(frames, bands, 1)`. Recurrent path.
    Mfcc,
}

/// Layout of the input corpus and the file naming contract.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CorpusConfig {
    /// Root containing one subdirectory per fold.
    pub root: PathBuf,
    /// Fold subdirectories, scanned in this order.
    pub folds: Vec<String>,
    /// Audio file extension, matched case-insensitively.
    pub extension: String,
    /// Index of the label among the `label_separator`-split fields of the file stem.
    pub label_field: usize,
    pub label_separator: char,
    /// Known number of classes. Labels must be below it when set.
    pub label_count: Option<u32>,
    pub on_error: ErrorPolicy,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("UrbanSound8K/audio"),
            folds: (1..=10).map(|i| format!("fold{i}")).collect(),
            extension: "wav".into(),
            label_field: 1,
            label_separator: '-',
            label_count: None,
            on_error: ErrorPolicy::Abort,
        }
    }
}

/// Spectral front end and variant parameters.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct FeatureConfig {
    pub kind: FeatureKind,
    /// Mel bands (log-mel) or cepstral coefficients (MFCC).
    pub bands: usize,
    /// STFT time steps per window.
    pub frames: usize,
    /// STFT hop in samples.
    pub hop_length: usize,
    /// STFT size in samples.
    pub n_fft: usize,
    /// Mel bands computed before the DCT in the MFCC variant.
    pub mfcc_mels: usize,
    /// Frames spanned by the delta regression. Odd, at least 3.
    pub delta_width: usize,
    /// Dynamic range kept below the peak, in dB.
    pub top_db: f32,
    /// Analysis rate every clip is resampled to. `None` keeps each file's own rate.
    pub sample_rate: Option<u32>,
}

impl FeatureConfig {
    /// Defaults for a given variant: 60 mel bands or 20 MFCC, 41 frames.
    ///
    /// # Example
    /// ```
    /// use sc_core::config::{FeatureConfig, FeatureKind};
    /// assert_eq!(FeatureConfig::for_kind(FeatureKind::Mfcc).bands, 20);
    /// assert_eq!(FeatureConfig::for_kind(FeatureKind::LogMel).bands, 60);
    /// ```
    #[must_use]
    pub fn for_kind(kind: FeatureKind) -> Self {
        Self {
            kind,
            bands: match kind {
                FeatureKind::LogMel => 60,
                FeatureKind::Mfcc => 20,
            },
            frames: 41,
            hop_length: 512,
            n_fft: 2048,
            mfcc_mels: 128,
            delta_width: 9,
            top_db: 80.0,
            sample_rate: None,
        }
    }

    /// Samples per window: `hop_length × (frames − 1)`.
    ///
    /// With centered STFT frames this yields exactly `frames` time steps.
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.hop_length * self.frames.saturating_sub(1)
    }

    /// Check the spectral parameters against their domain.
    ///
    /// # Errors
    /// Returns `CoreError::Config` naming the first invalid field.
    ///
    /// # Example
    /// ```
    /// use sc_core::config::FeatureConfig;
    /// let mut features = FeatureConfig::default();
    /// assert!(features.validate().is_ok());
    /// features.n_fft = 2047;
    /// assert!(features.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |msg: String| Err(CoreError::Config(msg));

        let f = self;
        if f.bands == 0 {
            return invalid("features.bands doit être > 0".into());
        }
        if f.frames < 2 {
            return invalid(format!("features.frames doit être ≥ 2 (reçu {})", f.frames));
        }
        if f.hop_length == 0 || f.n_fft == 0 {
            return invalid("features.hop_length et features.n_fft doivent être > 0".into());
        }
        // An odd n_fft pads one sample short and loses the last STFT frame.
        if f.n_fft % 2 != 0 {
            return invalid(format!("features.n_fft doit être pair (reçu {})", f.n_fft));
        }
        if f.sample_rate == Some(0) {
            return invalid("features.sample_rate doit être > 0".into());
        }
        // Reflect padding needs more samples than the pad width.
        if f.window_size() <= f.n_fft / 2 {
            return invalid(format!(
                "fenêtre de {} échantillons trop courte pour n_fft = {}",
                f.window_size(),
                f.n_fft
            ));
        }
        if !(f.top_db.is_finite() && f.top_db > 0.0) {
            return invalid(format!("features.top_db doit être > 0 (reçu {})", f.top_db));
        }
        match f.kind {
            FeatureKind::LogMel => {
                if f.delta_width < 3 || f.delta_width % 2 == 0 {
                    return invalid(format!(
                        "features.delta_width doit être impair et ≥ 3 (reçu {})",
                        f.delta_width
                    ));
                }
                if f.delta_width > f.frames {
                    return invalid(format!(
                        "features.delta_width ({}) dépasse features.frames ({})",
                        f.delta_width, f.frames
                    ));
                }
            }
            FeatureKind::Mfcc => {
                if f.bands > f.mfcc_mels {
                    return invalid(format!(
                        "features.bands ({}) dépasse features.mfcc_mels ({})",
                        f.bands, f.mfcc_mels
                    ));
                }
            }
        }

        Ok(())
    }

    /// Shape of every frame produced with this configuration.
    #[must_use]
    pub fn frame_shape(&self) -> FrameShape {
        match self.kind {
            FeatureKind::LogMel => FrameShape::new(self.bands, self.frames, 2),
            FeatureKind::Mfcc => FrameShape::new(self.frames, self.bands, 1),
        }
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self::for_kind(FeatureKind::default())
    }
}

/// Train/test split parameters.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SplitConfig {
    /// Probability for each example to land in the training subset.
    pub retention: f64,
    /// Fixed RNG seed. `None` draws from OS entropy (non-reproducible).
    pub seed: Option<u64>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            retention: 0.70,
            seed: None,
        }
    }
}

/// Parameters handed to the trainer collaborator.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TrainingConfig {
    pub learning_rate: f32,
    pub batch_size: usize,
    pub iterations: usize,
}

impl TrainingConfig {
    /// 2000 iterations for the convolutional path, 1000 for the recurrent one.
    #[must_use]
    pub fn for_kind(kind: FeatureKind) -> Self {
        Self {
            learning_rate: 0.01,
            batch_size: 50,
            iterations: match kind {
                FeatureKind::LogMel => 2000,
                FeatureKind::Mfcc => 1000,
            },
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self::for_kind(FeatureKind::default())
    }
}

impl Config {
    /// Defaults for every section, tuned to the given variant.
    #[must_use]
    pub fn for_kind(kind: FeatureKind) -> Self {
        Self {
            corpus: CorpusConfig::default(),
            features: FeatureConfig::for_kind(kind),
            split: SplitConfig::default(),
            training: TrainingConfig::for_kind(kind),
        }
    }

    /// Check every field against its domain.
    ///
    /// # Errors
    /// Returns `CoreError::Config` naming the first invalid field.
    ///
    /// # Example
    /// ```
    /// use sc_core::config::Config;
    /// let mut config = Config::default();
    /// config.features.delta_width = 4;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |msg: String| Err(CoreError::Config(msg));

        let c = &self.corpus;
        if c.folds.is_empty() {
            return invalid("corpus.folds est vide".into());
        }
        if c.extension.trim().is_empty() {
            return invalid("corpus.extension est vide".into());
        }
        if c.label_count == Some(0) {
            return invalid("corpus.label_count doit être > 0".into());
        }

        self.features.validate()?;

        if !(0.0..=1.0).contains(&self.split.retention) {
            return invalid(format!(
                "split.retention doit être dans [0, 1] (reçu {})",
                self.split.retention
            ));
        }

        let t = &self.training;
        if t.batch_size == 0 || t.iterations == 0 {
            return invalid("training.batch_size et training.iterations doivent être > 0".into());
        }
        if !(t.learning_rate.is_finite() && t.learning_rate > 0.0) {
            return invalid(format!(
                "training.learning_rate doit être > 0 (reçu {})",
                t.learning_rate
            ));
        }
        Ok(())
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    corpus: Option<CorpusSection>,
    features: Option<FeatureSection>,
    split: Option<SplitSection>,
    training: Option<TrainingSection>,
}

#[derive(Deserialize)]
struct CorpusSection {
    root: Option<PathBuf>,
    folds: Option<Vec<String>>,
    extension: Option<String>,
    label_field: Option<usize>,
    label_separator: Option<char>,
    label_count: Option<u32>,
    on_error: Option<ErrorPolicy>,
}

#[derive(Deserialize)]
struct FeatureSection {
    kind: Option<FeatureKind>,
    bands: Option<usize>,
    frames: Option<usize>,
    hop_length: Option<usize>,
    n_fft: Option<usize>,
    mfcc_mels: Option<usize>,
    delta_width: Option<usize>,
    top_db: Option<f32>,
    sample_rate: Option<u32>,
}

#[derive(Deserialize)]
struct SplitSection {
    retention: Option<f64>,
    seed: Option<u64>,
}

#[derive(Deserialize)]
struct TrainingSection {
    learning_rate: Option<f32>,
    batch_size: Option<usize>,
    iterations: Option<usize>,
}

/// Parse a TOML document and merge it over the defaults of its feature kind.
///
/// # Errors
/// Returns an error if the TOML is malformed or the merged config is invalid.
///
/// # Example
/// ```
/// use sc_core::config::{parse_config, FeatureKind};
/// let config = parse_config("[features]\nkind = \"mfcc\"\n").unwrap();
/// assert_eq!(config.features.kind, FeatureKind::Mfcc);
/// assert_eq!(config.features.bands, 20);
/// assert_eq!(config.training.iterations, 1000);
/// ```
pub fn parse_config(content: &str) -> Result<Config> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;

    let kind = file
        .features
        .as_ref()
        .and_then(|f| f.kind)
        .unwrap_or_default();
    let mut config = Config::for_kind(kind);

    if let Some(c) = file.corpus {
        let dst = &mut config.corpus;
        if let Some(v) = c.root {
            dst.root = v;
        }
        if let Some(v) = c.folds {
            dst.folds = v;
        }
        if let Some(v) = c.extension {
            dst.extension = v;
        }
        if let Some(v) = c.label_field {
            dst.label_field = v;
        }
        if let Some(v) = c.label_separator {
            dst.label_separator = v;
        }
        if c.label_count.is_some() {
            dst.label_count = c.label_count;
        }
        if let Some(v) = c.on_error {
            dst.on_error = v;
        }
    }

    if let Some(f) = file.features {
        let dst = &mut config.features;
        if let Some(v) = f.bands {
            dst.bands = v;
        }
        if let Some(v) = f.frames {
            dst.frames = v;
        }
        if let Some(v) = f.hop_length {
            dst.hop_length = v;
        }
        if let Some(v) = f.n_fft {
            dst.n_fft = v;
        }
        if let Some(v) = f.mfcc_mels {
            dst.mfcc_mels = v;
        }
        if let Some(v) = f.delta_width {
            dst.delta_width = v;
        }
        if let Some(v) = f.top_db {
            dst.top_db = v;
        }
        if f.sample_rate.is_some() {
            dst.sample_rate = f.sample_rate;
        }
    }

    if let Some(s) = file.split {
        if let Some(v) = s.retention {
            config.split.retention = v;
        }
        if s.seed.is_some() {
            config.split.seed = s.seed;
        }
    }

    if let Some(t) = file.training {
        let dst = &mut config.training;
        if let Some(v) = t.learning_rate {
            dst.learning_rate = v;
        }
        if let Some(v) = t.batch_size {
            dst.batch_size = v;
        }
        if let Some(v) = t.iterations {
            dst.iterations = v;
        }
    }

    config.validate()?;
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed or validated.
///
/// # Example
/// ```no_run
/// use sc_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Configuration rejetée : {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.features.bands, 60);
        assert_eq!(config.corpus.folds.len(), 10);
        assert_eq!(config.corpus.folds[9], "fold10");
        assert!((config.split.retention - 0.70).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_override_keeps_other_fields() {
        let config = parse_config(
            "[corpus]\nroot = \"/data\"\non_error = \"skip\"\n[split]\nseed = 7\n",
        )
        .unwrap();
        assert_eq!(config.corpus.root, PathBuf::from("/data"));
        assert_eq!(config.corpus.on_error, ErrorPolicy::Skip);
        assert_eq!(config.corpus.extension, "wav");
        assert_eq!(config.split.seed, Some(7));
    }

    #[test]
    fn explicit_bands_override_kind_default() {
        let config = parse_config("[features]\nkind = \"mfcc\"\nbands = 13\n").unwrap();
        assert_eq!(config.features.bands, 13);
        assert_eq!(config.features.frame_shape(), FrameShape::new(41, 13, 1));
    }

    #[test]
    fn invalid_merge_is_rejected() {
        assert!(parse_config("[split]\nretention = 1.5\n").is_err());
        assert!(parse_config("[features]\nframes = 5\n").is_err());
        assert!(parse_config("[training]\nbatch_size = 0\n").is_err());
    }

    #[test]
    fn short_window_is_rejected() {
        let mut config = Config::default();
        config.features.frames = 3;
        config.features.delta_width = 3;
        // 1024 samples cannot be reflect-padded by 1024.
        assert!(config.validate().is_err());
        config.features.frames = 4;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn log_mel_shape_carries_delta_channel() {
        assert_eq!(
            FeatureConfig::default().frame_shape(),
            FrameShape::new(60, 41, 2)
        );
    }

    #[test]
    fn shipped_default_file_matches_defaults() {
        let config = parse_config(include_str!("../../../config/default.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn odd_fft_size_is_rejected() {
        let mut config = Config::default();
        config.features.n_fft = 2047;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
        config.features.n_fft = 2046;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn analysis_rate_is_optional_and_nonzero() {
        let config = parse_config("[features]\nsample_rate = 22050\n").unwrap();
        assert_eq!(config.features.sample_rate, Some(22050));
        assert_eq!(parse_config("").unwrap().features.sample_rate, None);
        assert!(parse_config("[features]\nsample_rate = 0\n").is_err());
    }

    #[test]
    fn feature_validation_catches_zero_fft() {
        let features = FeatureConfig {
            n_fft: 0,
            ..FeatureConfig::default()
        };
        assert!(matches!(features.validate(), Err(CoreError::Config(_))));
    }
}
