use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use sc_core::config::Config;
use sc_core::traits::Trainer;

pub mod cli;
pub mod report;
pub mod trainer;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    // 3. Charger la config, appliquer les overrides CLI
    let mut config = resolve_config(&cli)?;
    cli.apply_overrides(&mut config);
    config.validate().context("Configuration invalide après overrides")?;
    log::info!(
        "Features {:?} {} (fenêtre de {} échantillons)",
        config.features.kind,
        config.features.frame_shape(),
        config.features.window_size()
    );

    // 4. Scanner le corpus et assembler le jeu de données
    let (dataset, scan) = sc_corpus::build_dataset(&config.corpus, &config.features)
        .with_context(|| format!("Corpus {}", config.corpus.root.display()))?;
    report::log_summary(&dataset.summary(), &scan);

    // 5. Tirage train/test
    let retention = config.split.retention;
    let split = match config.split.seed {
        Some(seed) => dataset.split(retention, &mut StdRng::seed_from_u64(seed))?,
        None => dataset.split(retention, &mut rand::thread_rng())?,
    };
    drop(dataset);
    log::info!(
        "Split : {} entraînement, {} test, {} classes",
        split.train.len(),
        split.test.len(),
        split.index.len()
    );

    // 6. Entraîner
    let mut trainer = trainer::CentroidTrainer::new(&config.training);
    log::info!(
        "Entraînement {} : {} itérations, batch {}",
        trainer.name(),
        config.training.iterations,
        config.training.batch_size
    );
    let metrics = trainer.train(&split)?;
    println!("Test accuracy: {:.3}", metrics.test_accuracy);

    if let Some(ref path) = cli.cost_history {
        report::write_cost_history(path, &metrics.cost_history)?;
        log::info!("Historique du coût écrit dans {}", path.display());
    }

    Ok(())
}

/// Config file if present, otherwise the defaults.
fn resolve_config(cli: &cli::Cli) -> Result<Config> {
    if cli.config.exists() {
        sc_core::config::load_config(&cli.config)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(Config::default())
    }
}
