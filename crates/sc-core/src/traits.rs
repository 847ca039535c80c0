use crate::dataset::Split;
use crate::error::CoreError;
use crate::frame::{FeatureFrame, FrameShape};

/// Convertit une fenêtre d'échantillons en une frame de features.
///
/// Implémenté par : `LogMelExtractor`, `MfccExtractor`.
///
/// # Example
/// ```
/// use sc_core::error::CoreError;
/// use sc_core::frame::{FeatureFrame, FrameShape};
/// use sc_core::traits::FeatureExtractor;
///
/// struct Energy;
/// impl FeatureExtractor for Energy {
///     fn extract(&mut self, window: &[f32], _sample_rate: u32) -> Result<FeatureFrame, CoreError> {
///         let e = window.iter().map(|s| s * s).sum::<f32>();
///         FeatureFrame::from_vec(self.frame_shape(), vec![e])
///     }
///     fn frame_shape(&self) -> FrameShape { FrameShape::new(1, 1, 1) }
/// }
/// ```
pub trait FeatureExtractor {
    /// Traite une fenêtre complète (mono, f32) échantillonnée à `sample_rate`.
    ///
    /// CONTRAT : la frame retournée a toujours la forme `frame_shape()`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the window cannot be analysed.
    fn extract(&mut self, window: &[f32], sample_rate: u32) -> Result<FeatureFrame, CoreError>;

    /// Shape of every frame this extractor produces.
    fn frame_shape(&self) -> FrameShape;
}

/// Result of a training run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metrics {
    /// Fraction of correctly classified test examples, in `[0, 1]`.
    pub test_accuracy: f32,
    /// Cost after each training iteration.
    pub cost_history: Vec<f32>,
}

/// Collaborateur d'entraînement, opaque pour le pipeline.
///
/// The pipeline only hands it a finalized [`Split`] and reads back [`Metrics`].
pub trait Trainer {
    /// Fit on `split.train` and score on `split.test`.
    ///
    /// # Errors
    /// Implementation-defined; typically an empty training subset.
    fn train(&mut self, split: &Split) -> anyhow::Result<Metrics>;

    /// Nom lisible pour les logs.
    fn name(&self) -> &'static str;
}
