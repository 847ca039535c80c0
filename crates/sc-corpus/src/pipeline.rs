use std::path::PathBuf;

use sc_audio::decode::load_clip;
use sc_audio::features::{extract_clip, extractor_for};
use sc_core::config::{CorpusConfig, ErrorPolicy, FeatureConfig};
use sc_core::dataset::Dataset;
use sc_core::error::CoreError;
use sc_core::frame::{FeatureFrame, LabelId};
use sc_core::traits::FeatureExtractor;

use crate::label::LabelContract;
use crate::scanner::{CorpusFile, scan_corpus};

/// Bilan d'un passage sur le corpus.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Files found by the scanner.
    pub files_seen: usize,
    /// Files that contributed at least one window.
    pub files_used: usize,
    /// Files dropped under the skip policy, with the cause.
    pub skipped: Vec<(PathBuf, String)>,
    /// Feature frames extracted across all files.
    pub windows: usize,
}

/// Scan, decode and featurize the whole corpus, then assemble the dataset.
///
/// Files are processed one at a time in scan order. Every accepted window
/// becomes one example labeled with its file's label; clips shorter than a
/// window contribute nothing. The full feature tensor is kept in memory,
/// about `examples × rows × cols × channels × 4` bytes.
///
/// With [`ErrorPolicy::Skip`], a file whose name, read or decode fails is
/// logged and dropped; any other error still stops the run.
///
/// When `features.sample_rate` is set, every clip is resampled to it before
/// windowing, so all frames span the same duration and frequency range.
///
/// # Errors
/// `Config` if `features` is invalid, the first per-file error under
/// [`ErrorPolicy::Abort`], a scan or extraction error, or `EmptyDataset`
/// when no window survives.
pub fn build_dataset(
    corpus: &CorpusConfig,
    features: &FeatureConfig,
) -> Result<(Dataset, ScanReport), CoreError> {
    features.validate()?;
    let files = scan_corpus(corpus)?;
    let contract = LabelContract::from_config(corpus);
    let mut extractor = extractor_for(features);

    let mut report = ScanReport {
        files_seen: files.len(),
        ..ScanReport::default()
    };
    log::info!(
        "{} fichiers dans {} partitions sous {}",
        files.len(),
        corpus.folds.len(),
        corpus.root.display()
    );

    let mut examples = Vec::new();
    for (i, file) in files.iter().enumerate() {
        match featurize_file(file, &contract, features, extractor.as_mut()) {
            Ok((label, frames)) => {
                log::info!(
                    "[{}/{}] {} : label {label}, {} fenêtres",
                    i + 1,
                    files.len(),
                    file.path.display(),
                    frames.len()
                );
                if !frames.is_empty() {
                    report.files_used += 1;
                }
                report.windows += frames.len();
                examples.extend(frames.into_iter().map(|frame| (frame, label)));
            }
            Err(e) if corpus.on_error == ErrorPolicy::Skip && e.is_per_file() => {
                log::warn!("Fichier ignoré {} : {e}", file.path.display());
                report.skipped.push((file.path.clone(), e.to_string()));
            }
            Err(e) => return Err(e),
        }
    }

    let dataset = Dataset::assemble(examples)?;
    Ok((dataset, report))
}

fn featurize_file(
    file: &CorpusFile,
    contract: &LabelContract,
    features: &FeatureConfig,
    extractor: &mut dyn FeatureExtractor,
) -> Result<(LabelId, Vec<FeatureFrame>), CoreError> {
    let label = contract.parse(&file.path)?;
    let clip = load_clip(&file.path, features.sample_rate)?;
    let frames = extract_clip(
        clip.samples(),
        clip.sample_rate(),
        features.window_size(),
        extractor,
    )?;
    Ok((label, frames))
}
