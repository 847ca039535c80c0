use anyhow::{Context, Result};
use ndarray::{Array2, ArrayView1, ArrayView2};
use sc_core::config::TrainingConfig;
use sc_core::dataset::{Split, Subset};
use sc_core::traits::{Metrics, Trainer};

/// Classifieur de référence : un prototype par classe, au plus proche voisin.
///
/// Each prototype starts at the first training example of its class and
/// moves toward every batch example of that class by `learning_rate`.
/// The cost of an iteration is the mean squared distance between the batch
/// examples and their prototypes, measured before the update.
pub struct CentroidTrainer {
    learning_rate: f32,
    batch_size: usize,
    iterations: usize,
}

impl CentroidTrainer {
    #[must_use]
    pub fn new(config: &TrainingConfig) -> Self {
        Self {
            learning_rate: config.learning_rate,
            batch_size: config.batch_size,
            iterations: config.iterations,
        }
    }
}

impl Trainer for CentroidTrainer {
    fn train(&mut self, split: &Split) -> Result<Metrics> {
        if split.train.is_empty() {
            anyhow::bail!("Sous-ensemble d'entraînement vide");
        }
        let classes = split.index.len();
        let train = flatten(&split.train)?;
        let train_cols = label_columns(split, &split.train)?;

        let mut prototypes = Array2::<f32>::zeros((classes, train.ncols()));
        let mut seeded = vec![false; classes];
        for (row, &col) in train.rows().into_iter().zip(&train_cols) {
            if !seeded[col] {
                prototypes.row_mut(col).assign(&row);
                seeded[col] = true;
            }
        }

        let rate = self.learning_rate;
        let mut cost_history = Vec::with_capacity(self.iterations);
        for iteration in 0..self.iterations {
            let batch = split.train.batch_range(iteration, self.batch_size);
            let batch_len = batch.len();
            let mut cost = 0.0f32;
            for i in batch {
                let x = train.row(i);
                let mut p = prototypes.row_mut(train_cols[i]);
                cost += squared_distance(x, p.view());
                p.zip_mut_with(&x, |p, &x| *p += rate * (x - *p));
            }
            let cost = cost / batch_len as f32;
            if iteration % 100 == 0 {
                log::debug!("Itération {iteration} : coût {cost:.4}");
            }
            cost_history.push(cost);
        }

        let test_accuracy = if split.test.is_empty() {
            log::warn!("Sous-ensemble de test vide, précision non mesurable");
            0.0
        } else {
            let test = flatten(&split.test)?;
            let test_cols = label_columns(split, &split.test)?;
            let correct = test
                .rows()
                .into_iter()
                .zip(&test_cols)
                .filter(|(row, col)| nearest(prototypes.view(), &seeded, *row) == Some(**col))
                .count();
            correct as f32 / test_cols.len() as f32
        };

        Ok(Metrics {
            test_accuracy,
            cost_history,
        })
    }

    fn name(&self) -> &'static str {
        "centroid"
    }
}

/// `(n, rows, cols, channels)` → `(n, rows·cols·channels)`.
fn flatten(subset: &Subset) -> Result<Array2<f32>> {
    let (n, rows, cols, channels) = subset.features.dim();
    let flat = subset
        .features
        .to_shape((n, rows * cols * channels))
        .context("Aplatissement des features")?;
    Ok(flat.into_owned())
}

fn label_columns(split: &Split, subset: &Subset) -> Result<Vec<usize>> {
    subset
        .labels
        .iter()
        .map(|&label| {
            split
                .index
                .column(label)
                .with_context(|| format!("Label {label} absent de la table"))
        })
        .collect()
}

fn squared_distance(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest(
    prototypes: ArrayView2<'_, f32>,
    seeded: &[bool],
    x: ArrayView1<'_, f32>,
) -> Option<usize> {
    prototypes
        .rows()
        .into_iter()
        .enumerate()
        .filter(|(col, _)| seeded[*col])
        .map(|(col, p)| (col, squared_distance(x, p)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(col, _)| col)
}
