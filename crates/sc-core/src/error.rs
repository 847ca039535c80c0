use thiserror::Error;

use crate::frame::FrameShape;

/// Errors originating from the core pipeline.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A parameter is outside its valid domain (zero window size, bad retention, ...).
    #[error("Argument invalide : {0}")]
    InvalidArgument(String),

    /// Audio file missing, unreadable or undecodable.
    #[error("Erreur d'entrée/sortie sur {path} : {reason}")]
    Io {
        /// Offending file.
        path: String,
        /// Underlying cause.
        reason: String,
    },

    /// A feature frame does not have the shape of the first frame.
    #[error("Forme incohérente pour l'exemple {index} : attendu {expected}, obtenu {found}")]
    ShapeMismatch {
        /// Position of the offending example.
        index: usize,
        /// Shape of the first example.
        expected: FrameShape,
        /// Shape of the offending example.
        found: FrameShape,
    },

    /// File name does not follow the labeling contract.
    #[error("Label illisible dans {path} : {reason}")]
    LabelParse {
        /// Offending file.
        path: String,
        /// What went wrong.
        reason: String,
    },

    /// Parsed label is not below the configured label count.
    #[error("Label {label} hors plage (nombre de classes : {count})")]
    LabelOutOfRange {
        /// Parsed label.
        label: u32,
        /// Configured label count.
        count: u32,
    },

    /// No example survived extraction.
    #[error("Jeu de données vide : aucune fenêtre extraite")]
    EmptyDataset,

    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),
}

impl CoreError {
    /// `true` for errors tied to a single input file, which the skip policy may drop.
    ///
    /// # Example
    /// ```
    /// use sc_core::error::CoreError;
    /// let err = CoreError::Io { path: "a.wav".into(), reason: "eof".into() };
    /// assert!(err.is_per_file());
    /// assert!(!CoreError::EmptyDataset.is_per_file());
    /// ```
    #[must_use]
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::LabelParse { .. } | Self::LabelOutOfRange { .. }
        )
    }
}
