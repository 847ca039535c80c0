use sc_core::error::CoreError;

/// Lazy 50%-overlap tiling of a sample sequence.
///
/// Yields `(start, end)` with `start = 0, h, 2h, …` while `start < len`, where
/// `h = window_size / 2` and `end = start + window_size`. `end` is never
/// clamped: the last windows may run past `len` and must be rejected by the
/// caller. Cloning restarts from the current position.
///
/// # Example
/// ```
/// use sc_audio::window::Windows;
/// let windows: Vec<_> = Windows::new(10, 4).unwrap().collect();
/// assert_eq!(windows, vec![(0, 4), (2, 6), (4, 8), (6, 10), (8, 12)]);
/// ```
#[derive(Clone, Debug)]
pub struct Windows {
    len: usize,
    window_size: usize,
    hop: usize,
    start: usize,
}

impl Windows {
    /// # Errors
    /// Returns `InvalidArgument` if `window_size < 2` (zero hop never terminates).
    pub fn new(len: usize, window_size: usize) -> Result<Self, CoreError> {
        let hop = window_size / 2;
        if hop == 0 {
            return Err(CoreError::InvalidArgument(format!(
                "taille de fenêtre {window_size} : le pas serait nul"
            )));
        }
        Ok(Self {
            len,
            window_size,
            hop,
            start: 0,
        })
    }

    #[must_use]
    pub fn hop(&self) -> usize {
        self.hop
    }

    #[must_use]
    pub fn window_size(&self) -> usize {
        self.window_size
    }
}

impl Iterator for Windows {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.start >= self.len {
            return None;
        }
        let window = (self.start, self.start + self.window_size);
        self.start += self.hop;
        Some(window)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len.saturating_sub(self.start).div_ceil(self.hop);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Windows {}

impl std::iter::FusedIterator for Windows {}

/// Windows of `samples` that fit entirely inside it, as slices.
///
/// # Errors
/// Returns `InvalidArgument` if `window_size < 2`.
///
/// # Example
/// ```
/// use sc_audio::window::full_windows;
/// let samples = vec![0.0f32; 6];
/// let slices: Vec<&[f32]> = full_windows(&samples, 4).unwrap().collect();
/// assert_eq!(slices.len(), 2);
/// assert!(slices.iter().all(|s| s.len() == 4));
/// ```
pub fn full_windows(
    samples: &[f32],
    window_size: usize,
) -> Result<impl Iterator<Item = &[f32]> + '_, CoreError> {
    let windows = Windows::new(samples.len(), window_size)?;
    Ok(windows.filter_map(move |(start, end)| samples.get(start..end)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_unit_window_are_rejected() {
        assert!(matches!(
            Windows::new(100, 0),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(Windows::new(100, 1).is_err());
    }

    #[test]
    fn starts_are_multiples_of_hop_below_len() {
        for len in [1usize, 7, 8, 9, 100, 1023] {
            for window_size in [2usize, 3, 8, 64] {
                let windows = Windows::new(len, window_size).unwrap();
                let hop = windows.hop();
                let starts: Vec<usize> = windows.map(|(s, _)| s).collect();
                assert_eq!(starts.len(), len.div_ceil(hop), "len={len} w={window_size}");
                for (i, &s) in starts.iter().enumerate() {
                    assert_eq!(s, i * hop);
                }
                let last = *starts.last().unwrap();
                assert!(last < len);
                assert!(last + hop >= len, "largest multiple of hop below len");
            }
        }
    }

    #[test]
    fn every_window_spans_window_size() {
        assert!(Windows::new(50, 8).unwrap().all(|(s, e)| e - s == 8));
    }

    #[test]
    fn short_sequence_yields_single_unclamped_window() {
        let windows: Vec<_> = Windows::new(3, 8).unwrap().collect();
        assert_eq!(windows, vec![(0, 8)]);
        let samples = [0.0f32; 3];
        assert_eq!(full_windows(&samples, 8).unwrap().count(), 0);
    }

    #[test]
    fn empty_sequence_yields_nothing() {
        assert_eq!(Windows::new(0, 8).unwrap().count(), 0);
    }

    #[test]
    fn clone_restarts_from_current_position() {
        let mut windows = Windows::new(20, 8).unwrap();
        windows.next();
        let replay: Vec<_> = windows.clone().collect();
        let rest: Vec<_> = windows.collect();
        assert_eq!(replay, rest);
        assert_eq!(rest.first(), Some(&(4, 12)));
    }

    #[test]
    fn size_hint_matches_count() {
        let windows = Windows::new(1000, 64).unwrap();
        assert_eq!(windows.len(), windows.clone().count());
    }

    #[test]
    fn full_windows_drop_tail() {
        let samples: Vec<f32> = (0..12).map(|i| i as f32).collect();
        let slices: Vec<&[f32]> = full_windows(&samples, 8).unwrap().collect();
        // Starts 0, 4, 8: only the first two fit.
        assert_eq!(slices.len(), 2);
        assert!((slices[1][0] - 4.0).abs() < f32::EPSILON);
    }
}
