//! Core types for decoded audio.

use serde::{Deserialize, Serialize};

/// Decoded mono audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioData {
    /// Mono samples in the range -1.0..=1.0.
    pub samples: Vec<f64>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Duration in seconds.
    pub duration_secs: f64,
}

impl AudioData {
    /// Create new audio data from samples.
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Self {
        let duration_secs = if sample_rate == 0 {
            0.0
        } else {
            samples.len() as f64 / sample_rate as f64
        };
        Self {
            samples,
            sample_rate,
            duration_secs,
        }
    }

    /// Digital silence of the given length.
    pub fn silence(duration_secs: f64, sample_rate: u32) -> Self {
        let count = (duration_secs.max(0.0) * sample_rate as f64).round() as usize;
        Self::new(vec![0.0; count], sample_rate)
    }

    /// Get the number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if audio data is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Copy out the samples in `[start, end)`, clamped to the buffer.
    pub fn slice_samples(&self, start: usize, end: usize) -> AudioData {
        let end = end.min(self.samples.len());
        let start = start.min(end);
        AudioData::new(self.samples[start..end].to_vec(), self.sample_rate)
    }

    /// Concatenate audio buffers that share one sample rate.
    pub fn concat<'a, I>(parts: I) -> AudioResult<AudioData>
    where
        I: IntoIterator<Item = &'a AudioData>,
    {
        let mut sample_rate = None;
        let mut samples = Vec::new();

        for part in parts {
            match sample_rate {
                None => sample_rate = Some(part.sample_rate),
                Some(rate) if rate != part.sample_rate => {
                    return Err(AudioError::SampleRateMismatch {
                        expected: rate,
                        found: part.sample_rate,
                    });
                }
                Some(_) => {}
            }
            samples.extend_from_slice(&part.samples);
        }

        let sample_rate =
            sample_rate.ok_or_else(|| AudioError::InvalidAudio("nothing to concatenate".into()))?;
        Ok(AudioData::new(samples, sample_rate))
    }
}

/// Metadata tags written alongside encoded output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTags {
    pub album: String,
    pub artist: String,
    pub title: String,
}

impl MediaTags {
    /// Tags as `key=value` pairs, skipping empty values.
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("album", self.album.as_str()),
            ("artist", self.artist.as_str()),
            ("title", self.title.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect()
    }
}

/// Error types for audio operations.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// FFmpeg execution failed.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// Decoding produced no usable audio.
    #[error("Audio decoding failed: {0}")]
    DecodeError(String),

    /// Encoding failed.
    #[error("Audio encoding failed: {0}")]
    EncodeError(String),

    /// Invalid audio data.
    #[error("Invalid audio data: {0}")]
    InvalidAudio(String),

    /// Buffers with different sample rates were combined.
    #[error("Sample rate mismatch: expected {expected} Hz, found {found} Hz")]
    SampleRateMismatch { expected: u32, found: u32 },

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Source file not found.
    #[error("Source file not found: {0}")]
    SourceNotFound(String),
}

/// Type alias for audio results.
pub type AudioResult<T> = Result<T, AudioError>;
