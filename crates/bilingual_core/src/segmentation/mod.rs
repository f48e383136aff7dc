//! Segmentation of a narration into utterance clips.
//!
//! The [`Segmenter`] drives a [`SilenceSplitter`](crate::audio::SilenceSplitter)
//! with an adaptive threshold: it keeps re-splitting until the average clip
//! duration falls inside `[min_chunk_secs, max_chunk_secs]` or the attempt
//! budget runs out.

mod segmenter;

pub use segmenter::{Segmentation, SegmentationReport, Segmenter, SegmenterConfig};

use thiserror::Error;

use crate::audio::AudioError;
use crate::models::Track;

/// Errors that can occur while segmenting a track.
#[derive(Error, Debug)]
pub enum SegmentError {
    #[error("Failed to decode narration: {0}")]
    Audio(#[from] AudioError),

    #[error("The {0} narration contains no audio")]
    EmptyStream(Track),

    #[error("No clips found in the {track} narration after {attempts} attempt(s)")]
    NoClips { track: Track, attempts: u32 },

    #[error("Discarding {discard} leading clip(s) leaves nothing of the {produced} {track} clips")]
    AllDiscarded {
        track: Track,
        discard: usize,
        produced: usize,
    },

    #[error("Invalid segmentation settings: {0}")]
    InvalidConfig(String),
}

impl SegmentError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Result type for segmentation.
pub type SegmentResult<T> = Result<T, SegmentError>;
