use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::AudioError;
use crate::resample::resample;

/// Mono clip decoded from one file at its native sample rate.
///
/// Immuable une fois chargé ; détruit après extraction de ses frames.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioClip {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioClip {
    #[must_use]
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// Decode an audio file into a mono clip.
///
/// Channels are averaged. No resampling: the clip keeps the file's rate.
/// Supports WAV, MP3, FLAC, OGG, AAC via symphonia.
///
/// # Errors
/// Returns an error if the file cannot be opened, probed, or decoded.
///
/// # Example
/// ```no_run
/// use sc_audio::decode::decode_file;
/// let clip = decode_file("UrbanSound8K/audio/fold1/7061-6-0-0.wav").unwrap();
/// println!("{} samples @ {}Hz", clip.samples().len(), clip.sample_rate());
/// ```
pub fn decode_file(path: impl AsRef<Path>) -> Result<AudioClip, AudioError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| AudioError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mss = MediaSourceStream::new(
        Box::new(file),
        symphonia::core::io::MediaSourceStreamOptions::default(),
    );

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::UnsupportedFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::NoTrack {
            path: path.to_path_buf(),
        })?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioError::MissingSampleRate {
            path: path.to_path_buf(),
        })?;
    let channels = track
        .codec_params
        .channels
        .map_or(1, symphonia::core::audio::Channels::count);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::UnsupportedFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let track_id = track.id;
    let mut all_samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut max_sample_frames: usize = 0;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(AudioError::Decode {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            // Paquet corrompu isolé : on le saute, le flux reste lisible.
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("{}: paquet ignoré ({e})", path.display());
                continue;
            }
            Err(e) => {
                return Err(AudioError::Decode {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.capacity();
        // Reuse SampleBuffer: only reallocate if this packet is bigger than current capacity
        if sample_buf.is_none() || num_frames > max_sample_frames {
            sample_buf = Some(SampleBuffer::<f32>::new(num_frames as u64, spec));
            max_sample_frames = num_frames;
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        // Downmix to mono
        all_samples.extend(
            buf.samples()
                .chunks(channels)
                .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32),
        );
    }

    log::debug!(
        "Decoded {} samples @ {}Hz ({} ch) from {}",
        all_samples.len(),
        sample_rate,
        channels,
        path.display()
    );

    Ok(AudioClip::new(all_samples, sample_rate))
}

/// Decode a file, then bring it to `target_rate` when one is set.
///
/// With `None` the clip keeps the file's own rate.
///
/// # Errors
/// Any [`decode_file`] error, or `AudioError::Resample`.
///
/// # Example
/// ```no_run
/// use sc_audio::decode::load_clip;
/// let clip = load_clip("UrbanSound8K/audio/fold1/7061-6-0-0.wav", Some(22050)).unwrap();
/// assert_eq!(clip.sample_rate(), 22050);
/// ```
pub fn load_clip(
    path: impl AsRef<Path>,
    target_rate: Option<u32>,
) -> Result<AudioClip, AudioError> {
    let path = path.as_ref();
    let clip = decode_file(path)?;
    match target_rate {
        Some(rate) if rate != clip.sample_rate() => {
            let samples = resample(clip.samples(), clip.sample_rate(), rate).map_err(|source| {
                AudioError::Resample {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            log::debug!(
                "{} : {}Hz → {rate}Hz ({} échantillons)",
                path.display(),
                clip.sample_rate(),
                samples.len()
            );
            Ok(AudioClip::new(samples, rate))
        }
        _ => Ok(clip),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, channels: u16, frames: &[Vec<i16>]) {
        write_wav_at(path, 22050, channels, frames);
    }

    fn write_wav_at(path: &Path, sample_rate: u32, channels: u16, frames: &[Vec<i16>]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for frame in frames {
            for &s in frame {
                writer.write_sample(s).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn decodes_mono_wav_at_native_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let frames: Vec<Vec<i16>> = (0..1000).map(|i| vec![(i % 100) as i16 * 100]).collect();
        write_wav(&path, 1, &frames);

        let clip = decode_file(&path).unwrap();
        assert_eq!(clip.sample_rate(), 22050);
        assert_eq!(clip.samples().len(), 1000);
        assert!((clip.samples()[1] - 100.0 / 32768.0).abs() < 1e-4);
    }

    #[test]
    fn downmixes_stereo_by_averaging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let frames: Vec<Vec<i16>> = (0..256).map(|_| vec![16384, 0]).collect();
        write_wav(&path, 2, &frames);

        let clip = decode_file(&path).unwrap();
        assert_eq!(clip.samples().len(), 256);
        assert!(clip.samples().iter().all(|&s| (s - 0.25).abs() < 1e-3));
    }

    #[test]
    fn missing_file_is_open_error() {
        let err = decode_file("/nonexistent/clip.wav").unwrap_err();
        assert!(matches!(err, AudioError::Open { .. }));
        assert_eq!(err.path(), Path::new("/nonexistent/clip.wav"));
    }

    #[test]
    fn garbage_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"definitely not RIFF data").unwrap();
        assert!(decode_file(&path).is_err());
    }

    #[test]
    fn load_clip_brings_44k_file_to_analysis_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("street-44k.wav");
        let frames: Vec<Vec<i16>> = (0..8820)
            .map(|i| {
                let t = i as f32 / 44100.0;
                vec![(8000.0 * (2.0 * std::f32::consts::PI * 500.0 * t).sin()) as i16]
            })
            .collect();
        write_wav_at(&path, 44100, 1, &frames);

        let native = load_clip(&path, None).unwrap();
        assert_eq!(native.sample_rate(), 44100);
        assert_eq!(native.samples().len(), 8820);

        let clip = load_clip(&path, Some(22050)).unwrap();
        assert_eq!(clip.sample_rate(), 22050);
        assert_eq!(clip.samples().len(), 4410);
        assert!((clip.duration_secs() - native.duration_secs()).abs() < 1e-9);
    }

    #[test]
    fn load_clip_at_file_rate_is_plain_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let frames: Vec<Vec<i16>> = (0..500).map(|i| vec![i as i16]).collect();
        write_wav(&path, 1, &frames);
        assert_eq!(load_clip(&path, Some(22050)).unwrap(), decode_file(&path).unwrap());
    }
}
