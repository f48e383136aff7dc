//! Clips and track sequences.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::AudioData;

/// Which narration a clip comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    /// The language the listener already knows.
    Base,
    /// The language being learned.
    Target,
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Track::Base => write!(f, "base"),
            Track::Target => write!(f, "target"),
        }
    }
}

/// One utterance-level unit of audio.
///
/// The payload is never mutated after creation; the duration is cached.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    audio: AudioData,
    track: Track,
    source_index: usize,
    duration_secs: f64,
}

impl Clip {
    pub fn new(track: Track, source_index: usize, audio: AudioData) -> Self {
        let duration_secs = audio.duration_secs;
        Self {
            audio,
            track,
            source_index,
            duration_secs,
        }
    }

    pub fn audio(&self) -> &AudioData {
        &self.audio
    }

    pub fn track(&self) -> Track {
        self.track
    }

    /// Position in the original track's segmentation order.
    pub fn source_index(&self) -> usize {
        self.source_index
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }
}

/// Errors building a track sequence from existing clips.
#[derive(Error, Debug, PartialEq)]
pub enum SequenceError {
    #[error("Clip {source_index} belongs to the {found} track, expected {expected}")]
    WrongTrack {
        source_index: usize,
        expected: Track,
        found: Track,
    },

    #[error("Source indices must run 0..N in order: position {position} holds index {found}")]
    NonContiguous { position: usize, found: usize },
}

/// Ordered clips from one track.
///
/// Clips are shared handles, so slicing and interleaving never copy audio.
#[derive(Debug, Clone)]
pub struct TrackSequence {
    track: Track,
    clips: Vec<Arc<Clip>>,
    total_duration: f64,
}

impl TrackSequence {
    /// Wrap freshly split segments, numbering them 0..N in order.
    pub fn from_segments(track: Track, segments: Vec<AudioData>) -> Self {
        let clips = segments
            .into_iter()
            .enumerate()
            .map(|(i, audio)| Arc::new(Clip::new(track, i, audio)))
            .collect();
        Self::from_shared(track, clips)
    }

    /// Build from existing clips, checking track and index contiguity.
    pub fn from_clips(track: Track, clips: Vec<Clip>) -> Result<Self, SequenceError> {
        for (position, clip) in clips.iter().enumerate() {
            if clip.track != track {
                return Err(SequenceError::WrongTrack {
                    source_index: clip.source_index,
                    expected: track,
                    found: clip.track,
                });
            }
            if clip.source_index != position {
                return Err(SequenceError::NonContiguous {
                    position,
                    found: clip.source_index,
                });
            }
        }
        Ok(Self::from_shared(
            track,
            clips.into_iter().map(Arc::new).collect(),
        ))
    }

    fn from_shared(track: Track, clips: Vec<Arc<Clip>>) -> Self {
        let total_duration = clips.iter().map(|c| c.duration_secs).sum();
        Self {
            track,
            clips,
            total_duration,
        }
    }

    pub fn track(&self) -> Track {
        self.track
    }

    pub fn clips(&self) -> &[Arc<Clip>] {
        &self.clips
    }

    /// Clips in a half-open index range.
    pub fn slice(&self, range: Range<usize>) -> &[Arc<Clip>] {
        &self.clips[range]
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Sum of member durations in seconds.
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Mean clip duration, or `None` for an empty sequence.
    pub fn average_duration(&self) -> Option<f64> {
        if self.clips.is_empty() {
            None
        } else {
            Some(self.total_duration / self.clips.len() as f64)
        }
    }
}
