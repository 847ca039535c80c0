use std::fs;
use std::path::{Path, PathBuf};

use sc_core::config::CorpusConfig;
use sc_core::error::CoreError;

/// Un fichier audio découvert dans une partition du corpus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorpusFile {
    pub path: PathBuf,
    /// Fold subdirectory the file was found in.
    pub fold: String,
}

/// Enumerate the audio files of every configured fold.
///
/// Folds are visited in configuration order; inside a fold, files are sorted
/// by name so that a run always sees the corpus in the same order. Only the
/// direct children of `root/<fold>` matching the extension (any case) are
/// kept. A missing fold is logged and skipped.
///
/// # Errors
/// Returns `CoreError::Io` if a fold directory exists but cannot be listed.
///
/// # Example
/// ```no_run
/// use sc_core::config::CorpusConfig;
/// use sc_corpus::scanner::scan_corpus;
/// let files = scan_corpus(&CorpusConfig::default()).unwrap();
/// println!("{} fichiers", files.len());
/// ```
pub fn scan_corpus(config: &CorpusConfig) -> Result<Vec<CorpusFile>, CoreError> {
    let mut files = Vec::new();
    for fold in &config.folds {
        let dir = config.root.join(fold);
        if !dir.is_dir() {
            log::warn!("Partition introuvable, ignorée : {}", dir.display());
            continue;
        }
        let mut found = scan_dir(&dir, &config.extension)?;
        found.sort();
        log::debug!("{} : {} fichiers", dir.display(), found.len());
        files.extend(found.into_iter().map(|path| CorpusFile {
            path,
            fold: fold.clone(),
        }));
    }
    Ok(files)
}

/// Fichiers du dossier portant l'extension demandée (non récursif).
fn scan_dir(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, CoreError> {
    let io_err = |e: std::io::Error| CoreError::Io {
        path: dir.display().to_string(),
        reason: e.to_string(),
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            files.push(path);
        }
    }
    Ok(files)
}
