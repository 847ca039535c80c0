use rubato::{FftFixedIn, Resampler};

use crate::error::ResampleError;

/// Input chunk handed to the FFT resampler.
const CHUNK: usize = 1024;

/// Resample a mono signal from `from` Hz to `to` Hz.
///
/// The output holds `ceil(len × to / from)` samples, aligned with the input:
/// the resampler delay is trimmed and its tail flushed.
///
/// # Errors
/// Returns `ZeroRate` if either rate is 0, or the resampler's own error.
///
/// # Example
/// ```
/// use sc_audio::resample::resample;
/// let input = vec![0.0f32; 4410];
/// let output = resample(&input, 44100, 22050).unwrap();
/// assert_eq!(output.len(), 2205);
/// ```
pub fn resample(samples: &[f32], from: u32, to: u32) -> Result<Vec<f32>, ResampleError> {
    if from == 0 || to == 0 {
        return Err(ResampleError::ZeroRate { from, to });
    }
    if from == to || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler = FftFixedIn::<f32>::new(from as usize, to as usize, CHUNK, 1, 1)?;
    let expected = (samples.len() as u64 * u64::from(to)).div_ceil(u64::from(from)) as usize;
    let delay = resampler.output_delay();
    let mut output = Vec::with_capacity(expected + delay + CHUNK);

    let mut chunks = samples.chunks_exact(CHUNK);
    for chunk in &mut chunks {
        append(&mut output, resampler.process(&[chunk], None)?);
    }
    let tail = chunks.remainder();
    if !tail.is_empty() {
        append(&mut output, resampler.process_partial(Some(&[tail][..]), None)?);
    }
    // Zero-fed chunks push the delayed samples out.
    while output.len() < expected + delay {
        let before = output.len();
        append(&mut output, resampler.process_partial::<&[f32]>(None, None)?);
        if output.len() == before {
            break;
        }
    }

    log::trace!("Rééchantillonnage {from} → {to} Hz : {} → {expected}", samples.len());
    Ok(output.into_iter().skip(delay).take(expected).collect())
}

fn append(output: &mut Vec<f32>, channels: Vec<Vec<f32>>) {
    if let Some(mono) = channels.into_iter().next() {
        output.extend(mono);
    }
}
