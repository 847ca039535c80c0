use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use sc_core::dataset::DatasetSummary;
use sc_corpus::pipeline::ScanReport;

/// Log the dataset summary and what the scan dropped.
pub fn log_summary(summary: &DatasetSummary, report: &ScanReport) {
    log::info!(
        "{} exemples {} issus de {}/{} fichiers ({:.1} Mo en mémoire)",
        summary.examples,
        summary.frame_shape,
        report.files_used,
        report.files_seen,
        summary.bytes as f64 / (1024.0 * 1024.0)
    );
    for (label, count) in &summary.per_label {
        log::info!("  label {label} : {count} exemples");
    }
    if !report.skipped.is_empty() {
        log::warn!("{} fichiers ignorés", report.skipped.len());
        for (path, reason) in &report.skipped {
            log::debug!("  {} : {reason}", path.display());
        }
    }
}

/// Write one `iteration,cost` line per training iteration.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_cost_history(path: &Path, costs: &[f32]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Impossible de créer {}", path.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "iteration,cost")?;
    for (i, cost) in costs.iter().enumerate() {
        writeln!(out, "{i},{cost}")?;
    }
    out.flush()
        .with_context(|| format!("Écriture de {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_history_is_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cost.csv");
        write_cost_history(&path, &[2.5, 1.25, 0.5]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "iteration,cost\n0,2.5\n1,1.25\n2,0.5\n");
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing/cost.csv");
        assert!(write_cost_history(&path, &[1.0]).is_err());
    }
}
