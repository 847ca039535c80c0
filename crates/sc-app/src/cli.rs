use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use sc_core::config::{Config, ErrorPolicy, FeatureConfig, FeatureKind, TrainingConfig};

/// sonoclass : features audio et jeu de données pour classifieurs de sons urbains.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Racine du corpus (contient fold1 … fold10).
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Variante de features. Changer de variante rétablit ses défauts
    /// pour [features] et [training].
    #[arg(long, value_enum)]
    pub kind: Option<KindArg>,

    /// Taux d'analyse (Hz) : chaque clip y est rééchantillonné.
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Fichiers illisibles ou mal nommés : abort ou skip.
    #[arg(long, value_enum)]
    pub on_error: Option<PolicyArg>,

    /// Part des exemples envoyés à l'entraînement, dans [0, 1].
    #[arg(long)]
    pub retention: Option<f64>,

    /// Graine du tirage train/test. Sans graine, le tirage change à chaque run.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Nombre d'itérations d'entraînement.
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Écrire l'historique du coût en CSV (iteration,cost).
    #[arg(long)]
    pub cost_history: Option<PathBuf>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Logmel,
    Mfcc,
}

impl From<KindArg> for FeatureKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Logmel => FeatureKind::LogMel,
            KindArg::Mfcc => FeatureKind::Mfcc,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    Abort,
    Skip,
}

impl From<PolicyArg> for ErrorPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Abort => ErrorPolicy::Abort,
            PolicyArg::Skip => ErrorPolicy::Skip,
        }
    }
}

impl Cli {
    /// Apply command-line overrides on top of a loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(kind) = self.kind.map(FeatureKind::from)
            && kind != config.features.kind
        {
            log::info!("Variante {kind:?} : défauts de [features] et [training] rétablis");
            config.features = FeatureConfig::for_kind(kind);
            config.training = TrainingConfig::for_kind(kind);
        }
        if self.sample_rate.is_some() {
            config.features.sample_rate = self.sample_rate;
        }
        if let Some(ref root) = self.root {
            config.corpus.root.clone_from(root);
        }
        if let Some(policy) = self.on_error {
            config.corpus.on_error = policy.into();
        }
        if let Some(retention) = self.retention {
            config.split.retention = retention;
        }
        if self.seed.is_some() {
            config.split.seed = self.seed;
        }
        if let Some(iterations) = self.iterations {
            config.training.iterations = iterations;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sonoclass").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
        assert_eq!(cli.log_level, "info");
        assert!(cli.kind.is_none());
        assert!(cli.cost_history.is_none());
    }

    #[test]
    fn overrides_replace_file_values() {
        let cli = parse(&[
            "--root",
            "/data/us8k",
            "--on-error",
            "skip",
            "--seed",
            "42",
            "--retention",
            "0.5",
            "--iterations",
            "10",
        ]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.corpus.root, PathBuf::from("/data/us8k"));
        assert_eq!(config.corpus.on_error, ErrorPolicy::Skip);
        assert_eq!(config.split.seed, Some(42));
        assert!((config.split.retention - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.training.iterations, 10);
    }

    #[test]
    fn switching_kind_resets_feature_defaults() {
        let cli = parse(&["--kind", "mfcc"]);
        let mut config = Config::default();
        config.features.hop_length = 256;
        cli.apply_overrides(&mut config);
        assert_eq!(config.features, FeatureConfig::for_kind(FeatureKind::Mfcc));
        assert_eq!(config.training.iterations, 1000);
    }

    #[test]
    fn same_kind_keeps_file_values() {
        let cli = parse(&["--kind", "logmel"]);
        let mut config = Config::default();
        config.features.hop_length = 256;
        cli.apply_overrides(&mut config);
        assert_eq!(config.features.hop_length, 256);
    }

    #[test]
    fn analysis_rate_survives_a_kind_switch() {
        let cli = parse(&["--kind", "mfcc", "--sample-rate", "22050"]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.features.kind, FeatureKind::Mfcc);
        assert_eq!(config.features.sample_rate, Some(22050));
        config.validate().unwrap();
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let args = ["sonoclass", "--kind", "chroma"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
