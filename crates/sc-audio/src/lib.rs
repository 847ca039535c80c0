// Audio decoding, windowing, and spectral feature extraction for sonoclass.

pub mod decode;
pub mod delta;
pub mod error;
pub mod features;
pub mod fft;
pub mod mel;
pub mod mfcc;
pub mod resample;
pub mod window;

pub use decode::{AudioClip, decode_file, load_clip};
pub use error::{AudioError, ResampleError};
pub use features::{LogMelExtractor, MfccExtractor, extract_clip, extractor_for};
pub use window::Windows;
