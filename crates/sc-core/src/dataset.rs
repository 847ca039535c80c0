use std::collections::BTreeMap;
use std::ops::Range;

use ndarray::{Array2, Array4, ArrayView3, Axis, stack};
use rand::Rng;

use crate::error::CoreError;
use crate::frame::{FeatureFrame, FrameShape, LabelId};

/// Table explicite `LabelId → colonne one-hot`.
///
/// Columns follow ascending label order, so non-contiguous ids (`1, 4, 9`)
/// map to contiguous columns (`0, 1, 2`).
///
/// # Example
/// ```
/// use sc_core::dataset::LabelIndex;
/// use sc_core::frame::LabelId;
/// let index = LabelIndex::from_labels(&[LabelId(9), LabelId(1), LabelId(4), LabelId(1)]);
/// assert_eq!(index.len(), 3);
/// assert_eq!(index.column(LabelId(4)), Some(1));
/// assert_eq!(index.label(2), Some(LabelId(9)));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelIndex {
    columns: BTreeMap<LabelId, usize>,
    labels: Vec<LabelId>,
}

impl LabelIndex {
    #[must_use]
    pub fn from_labels(labels: &[LabelId]) -> Self {
        let mut distinct = labels.to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        let columns = distinct.iter().enumerate().map(|(i, &l)| (l, i)).collect();
        Self {
            columns,
            labels: distinct,
        }
    }

    #[must_use]
    pub fn column(&self, label: LabelId) -> Option<usize> {
        self.columns.get(&label).copied()
    }

    #[must_use]
    pub fn label(&self, column: usize) -> Option<LabelId> {
        self.labels.get(column).copied()
    }

    /// Number of distinct labels, i.e. one-hot width.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[must_use]
    pub fn labels(&self) -> &[LabelId] {
        &self.labels
    }

    /// One-hot matrix `(labels.len(), self.len())`.
    ///
    /// Labels absent from the index produce an all-zero row.
    #[must_use]
    pub fn encode(&self, labels: &[LabelId]) -> Array2<f32> {
        let mut one_hot = Array2::zeros((labels.len(), self.len()));
        for (row, &label) in labels.iter().enumerate() {
            if let Some(col) = self.column(label) {
                one_hot[[row, col]] = 1.0;
            }
        }
        one_hot
    }

    /// Arg-max decoding of each one-hot (or score) row.
    ///
    /// # Example
    /// ```
    /// use sc_core::dataset::LabelIndex;
    /// use sc_core::frame::LabelId;
    /// let labels = [LabelId(3), LabelId(7), LabelId(3)];
    /// let index = LabelIndex::from_labels(&labels);
    /// let decoded = index.decode(&index.encode(&labels));
    /// assert_eq!(decoded, vec![Some(LabelId(3)), Some(LabelId(7)), Some(LabelId(3))]);
    /// ```
    #[must_use]
    pub fn decode(&self, rows: &Array2<f32>) -> Vec<Option<LabelId>> {
        rows.outer_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
                        Some((_, bv)) if bv >= v => best,
                        _ => Some((i, v)),
                    })
                    .and_then(|(col, _)| self.label(col))
            })
            .collect()
    }
}

/// Corpus complet : features empilées, labels et encodage one-hot.
///
/// Finalized once, then handed to the trainer through [`Dataset::split`].
#[derive(Clone, Debug)]
pub struct Dataset {
    features: Array4<f32>,
    labels: Vec<LabelId>,
    index: LabelIndex,
    one_hot: Array2<f32>,
}

impl Dataset {
    /// Stack `(frame, label)` pairs into a dataset.
    ///
    /// # Errors
    /// - `EmptyDataset` if `examples` is empty.
    /// - `ShapeMismatch` if any frame differs in shape from the first one.
    ///
    /// # Example
    /// ```
    /// use sc_core::dataset::Dataset;
    /// use sc_core::frame::{FeatureFrame, FrameShape, LabelId};
    /// let shape = FrameShape::new(2, 3, 1);
    /// let frame = FeatureFrame::from_vec(shape, vec![0.0; 6]).unwrap();
    /// let dataset = Dataset::assemble(vec![(frame.clone(), LabelId(5)), (frame, LabelId(2))]).unwrap();
    /// assert_eq!(dataset.len(), 2);
    /// assert_eq!(dataset.one_hot().dim(), (2, 2));
    /// ```
    pub fn assemble(examples: Vec<(FeatureFrame, LabelId)>) -> Result<Self, CoreError> {
        let Some(expected) = examples.first().map(|(f, _)| f.shape()) else {
            return Err(CoreError::EmptyDataset);
        };

        if let Some((index, (frame, _))) = examples
            .iter()
            .enumerate()
            .find(|(_, (f, _))| f.shape() != expected)
        {
            return Err(CoreError::ShapeMismatch {
                index,
                expected,
                found: frame.shape(),
            });
        }

        let views: Vec<ArrayView3<'_, f32>> =
            examples.iter().map(|(f, _)| f.data().view()).collect();
        let features = stack(Axis(0), &views)
            .map_err(|e| CoreError::InvalidArgument(format!("empilement impossible : {e}")))?;

        let labels: Vec<LabelId> = examples.into_iter().map(|(_, l)| l).collect();
        let index = LabelIndex::from_labels(&labels);
        let one_hot = index.encode(&labels);

        log::debug!(
            "Dataset assemblé : {} exemples {} ({} classes)",
            labels.len(),
            expected,
            index.len()
        );

        Ok(Self {
            features,
            labels,
            index,
            one_hot,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always `false` for an assembled dataset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Shape shared by every example.
    #[must_use]
    pub fn frame_shape(&self) -> FrameShape {
        let (_, rows, cols, channels) = self.features.dim();
        FrameShape::new(rows, cols, channels)
    }

    /// Features `(n, rows, cols, channels)`.
    #[must_use]
    pub fn features(&self) -> &Array4<f32> {
        &self.features
    }

    #[must_use]
    pub fn labels(&self) -> &[LabelId] {
        &self.labels
    }

    #[must_use]
    pub fn label_index(&self) -> &LabelIndex {
        &self.index
    }

    /// One-hot matrix `(n, distinct labels)`.
    #[must_use]
    pub fn one_hot(&self) -> &Array2<f32> {
        &self.one_hot
    }

    /// Counts and shape for logging.
    #[must_use]
    pub fn summary(&self) -> DatasetSummary {
        let mut per_label: BTreeMap<LabelId, usize> = BTreeMap::new();
        for &label in &self.labels {
            *per_label.entry(label).or_default() += 1;
        }
        DatasetSummary {
            examples: self.len(),
            frame_shape: self.frame_shape(),
            per_label,
            bytes: self.features.len() * std::mem::size_of::<f32>(),
        }
    }

    /// Split into train/test by one independent Bernoulli draw per example.
    ///
    /// Each example goes to train with probability `retention`. The split is
    /// neither stratified nor exact in size.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `retention` is not in `[0, 1]`.
    ///
    /// # Example
    /// ```
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    /// use sc_core::dataset::Dataset;
    /// use sc_core::frame::{FeatureFrame, FrameShape, LabelId};
    /// let frame = FeatureFrame::from_vec(FrameShape::new(1, 1, 1), vec![0.0]).unwrap();
    /// let dataset = Dataset::assemble(vec![(frame, LabelId(0)); 10]).unwrap();
    /// let split = dataset.split(1.0, &mut StdRng::seed_from_u64(0)).unwrap();
    /// assert_eq!(split.train.len(), 10);
    /// assert!(split.test.is_empty());
    /// ```
    pub fn split<R: Rng + ?Sized>(&self, retention: f64, rng: &mut R) -> Result<Split, CoreError> {
        if !(0.0..=1.0).contains(&retention) {
            return Err(CoreError::InvalidArgument(format!(
                "retention doit être dans [0, 1] (reçu {retention})"
            )));
        }

        let mask: Vec<bool> = (0..self.len()).map(|_| rng.gen_bool(retention)).collect();
        let (train, test): (Vec<usize>, Vec<usize>) = (0..self.len()).partition(|&i| mask[i]);

        Ok(Split {
            train: self.subset(train),
            test: self.subset(test),
            index: self.index.clone(),
        })
    }

    fn subset(&self, indices: Vec<usize>) -> Subset {
        Subset {
            features: self.features.select(Axis(0), &indices),
            one_hot: self.one_hot.select(Axis(0), &indices),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            indices,
        }
    }
}

/// Aggregate view of a dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetSummary {
    pub examples: usize,
    pub frame_shape: FrameShape,
    pub per_label: BTreeMap<LabelId, usize>,
    /// Resident size of the feature array.
    pub bytes: usize,
}

/// One side of a train/test split.
#[derive(Clone, Debug)]
pub struct Subset {
    /// Features `(n, rows, cols, channels)`.
    pub features: Array4<f32>,
    /// One-hot rows, same columns as the full dataset.
    pub one_hot: Array2<f32>,
    pub labels: Vec<LabelId>,
    /// Positions of these examples in the full dataset.
    pub indices: Vec<usize>,
}

impl Subset {
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Example range of the mini-batch used at `iteration`.
    ///
    /// Batches walk the subset sequentially and wrap around:
    /// `offset = (iteration × batch_size) mod (n − batch_size)`. When the subset
    /// holds no more than `batch_size` examples, the whole subset is the batch.
    ///
    /// # Example
    /// ```
    /// use ndarray::{Array2, Array4};
    /// use sc_core::dataset::Subset;
    /// let subset = Subset {
    ///     features: Array4::zeros((10, 1, 1, 1)),
    ///     one_hot: Array2::zeros((10, 1)),
    ///     labels: vec![],
    ///     indices: (0..10).collect(),
    /// };
    /// assert_eq!(subset.batch_range(0, 4), 0..4);
    /// assert_eq!(subset.batch_range(1, 4), 4..8);
    /// assert_eq!(subset.batch_range(2, 4), 2..6);
    /// ```
    #[must_use]
    pub fn batch_range(&self, iteration: usize, batch_size: usize) -> Range<usize> {
        let n = self.len();
        if n <= batch_size {
            return 0..n;
        }
        let offset = iteration.wrapping_mul(batch_size) % (n - batch_size);
        offset..offset + batch_size
    }
}

/// Train/test partition of a dataset.
#[derive(Clone, Debug)]
pub struct Split {
    pub train: Subset,
    pub test: Subset,
    /// Label table of the full dataset, shared by both sides.
    pub index: LabelIndex,
}
