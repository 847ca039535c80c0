use std::fmt;

use ndarray::Array3;

use crate::error::CoreError;

/// Integer class index parsed from a file name.
///
/// # Example
/// ```
/// use sc_core::frame::LabelId;
/// let label = LabelId(3);
/// assert_eq!(label.to_string(), "3");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabelId(pub u32);

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dimensions `(rows, cols, channels)` d'une frame de features.
///
/// # Example
/// ```
/// use sc_core::frame::FrameShape;
/// let shape = FrameShape::new(60, 41, 2);
/// assert_eq!(shape.len(), 4920);
/// assert_eq!(shape.to_string(), "60×41×2");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameShape {
    /// Leading axis (mel bands for log-mel, time steps for MFCC).
    pub rows: usize,
    /// Second axis (time steps for log-mel, coefficients for MFCC).
    pub cols: usize,
    /// Stacked channels (2 for log-mel + delta, 1 for MFCC).
    pub channels: usize,
}

impl FrameShape {
    #[must_use]
    pub const fn new(rows: usize, cols: usize, channels: usize) -> Self {
        Self {
            rows,
            cols,
            channels,
        }
    }

    /// Number of scalars in one frame.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows * self.cols * self.channels
    }

    /// `true` if any axis is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub const fn as_tuple(&self) -> (usize, usize, usize) {
        (self.rows, self.cols, self.channels)
    }
}

impl fmt::Display for FrameShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}×{}", self.rows, self.cols, self.channels)
    }
}

/// Représentation spectrale d'une fenêtre audio.
///
/// Log-mel: `(bands, frames, 2)` with the delta in channel 1.
/// MFCC: `(frames, coefficients, 1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureFrame {
    data: Array3<f32>,
}

impl FeatureFrame {
    /// Wrap an existing array.
    #[must_use]
    pub fn new(data: Array3<f32>) -> Self {
        Self { data }
    }

    /// Build a frame from row-major values.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `values.len()` does not match `shape`.
    ///
    /// # Example
    /// ```
    /// use sc_core::frame::{FeatureFrame, FrameShape};
    /// let frame = FeatureFrame::from_vec(FrameShape::new(2, 3, 1), vec![0.0; 6]).unwrap();
    /// assert_eq!(frame.shape(), FrameShape::new(2, 3, 1));
    /// ```
    pub fn from_vec(shape: FrameShape, values: Vec<f32>) -> Result<Self, CoreError> {
        let len = values.len();
        Array3::from_shape_vec(shape.as_tuple(), values)
            .map(Self::new)
            .map_err(|_| {
                CoreError::InvalidArgument(format!(
                    "{len} valeurs ne remplissent pas une frame {shape}"
                ))
            })
    }

    #[must_use]
    pub fn shape(&self) -> FrameShape {
        let (rows, cols, channels) = self.data.dim();
        FrameShape::new(rows, cols, channels)
    }

    #[must_use]
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    #[must_use]
    pub fn into_inner(self) -> Array3<f32> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_rejects_wrong_length() {
        let err = FeatureFrame::from_vec(FrameShape::new(2, 2, 2), vec![0.0; 7]);
        assert!(matches!(err, Err(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn from_vec_is_row_major() {
        let frame = FeatureFrame::from_vec(FrameShape::new(2, 2, 1), vec![1.0, 2.0, 3.0, 4.0])
            .unwrap();
        assert!((frame.data()[[1, 0, 0]] - 3.0).abs() < f32::EPSILON);
        assert!((frame.data()[[0, 1, 0]] - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn labels_order_numerically() {
        let mut labels = vec![LabelId(9), LabelId(2), LabelId(10)];
        labels.sort();
        assert_eq!(labels, vec![LabelId(2), LabelId(9), LabelId(10)]);
    }
}
