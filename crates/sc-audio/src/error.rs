use std::path::{Path, PathBuf};

use sc_core::error::CoreError;
use thiserror::Error;

/// Errors originating from audio decoding.
#[derive(Error, Debug)]
pub enum AudioError {
    /// File missing or unreadable.
    #[error("Impossible d'ouvrir {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Container format not recognised.
    #[error("Format audio non reconnu pour {}: {reason}", path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },

    /// Container holds no decodable audio track.
    #[error("Aucune piste audio dans {}", path.display())]
    NoTrack { path: PathBuf },

    /// Track does not declare its sample rate.
    #[error("Fréquence d'échantillonnage inconnue pour {}", path.display())]
    MissingSampleRate { path: PathBuf },

    /// Stream is corrupt or truncated.
    #[error("Erreur de décodage dans {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    /// Clip could not be brought to the analysis rate.
    #[error("Rééchantillonnage impossible pour {}: {source}", path.display())]
    Resample {
        path: PathBuf,
        #[source]
        source: ResampleError,
    },
}

/// Échec du rééchantillonnage d'un signal.
#[derive(Error, Debug)]
pub enum ResampleError {
    #[error("fréquence nulle ({from} Hz → {to} Hz)")]
    ZeroRate { from: u32, to: u32 },

    #[error(transparent)]
    Construction(#[from] rubato::ResamplerConstructionError),

    #[error(transparent)]
    Process(#[from] rubato::ResampleError),
}

impl AudioError {
    /// File the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Open { path, .. }
            | Self::UnsupportedFormat { path, .. }
            | Self::NoTrack { path }
            | Self::MissingSampleRate { path }
            | Self::Decode { path, .. }
            | Self::Resample { path, .. } => path,
        }
    }
}

impl From<AudioError> for CoreError {
    fn from(err: AudioError) -> Self {
        CoreError::Io {
            path: err.path().display().to_string(),
            reason: err.to_string(),
        }
    }
}
