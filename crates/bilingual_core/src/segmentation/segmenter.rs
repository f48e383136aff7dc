//! Adaptive silence-threshold search.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::audio::{AudioBackend, AudioData, SilenceParams, SilenceSplitter};
use crate::config::SegmentationSettings;
use crate::models::{Track, TrackSequence};

use super::{SegmentError, SegmentResult};

/// Parameters for segmenting one track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Lower bound of the acceptable average clip duration.
    pub min_chunk_secs: f64,
    /// Upper bound of the acceptable average clip duration.
    pub max_chunk_secs: f64,
    /// Silence threshold for the first attempt (dBFS).
    pub initial_threshold_db: f64,
    /// Threshold adjustment between attempts (dB).
    pub threshold_step_db: f64,
    /// Attempts before settling for the last split.
    pub max_attempts: u32,
    /// Minimum silence length that separates clips.
    pub min_silence_ms: u32,
    /// Silence retained at clip boundaries.
    pub keep_silence_ms: u32,
    /// Leading clips to drop (intro jingles, leading noise).
    pub discard_count: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_chunk_secs: 3.0,
            max_chunk_secs: 12.0,
            initial_threshold_db: -46.0,
            threshold_step_db: 2.0,
            max_attempts: 20,
            min_silence_ms: 900,
            keep_silence_ms: 900,
            discard_count: 0,
        }
    }
}

impl SegmenterConfig {
    /// Build from settings for one track (discard counts differ per track).
    pub fn from_settings(settings: &SegmentationSettings, track: Track) -> Self {
        Self {
            min_chunk_secs: settings.min_chunk_secs,
            max_chunk_secs: settings.max_chunk_secs,
            initial_threshold_db: settings.initial_threshold_db,
            threshold_step_db: settings.threshold_step_db,
            max_attempts: settings.max_attempts,
            min_silence_ms: settings.min_silence_ms,
            keep_silence_ms: settings.keep_silence_ms,
            discard_count: match track {
                Track::Base => settings.base_discard,
                Track::Target => settings.target_discard,
            },
        }
    }

    fn validate(&self) -> SegmentResult<()> {
        if !(self.min_chunk_secs > 0.0 && self.min_chunk_secs <= self.max_chunk_secs) {
            return Err(SegmentError::invalid_config(format!(
                "chunk duration band [{}, {}] is empty or non-positive",
                self.min_chunk_secs, self.max_chunk_secs
            )));
        }
        if !(self.threshold_step_db > 0.0) {
            return Err(SegmentError::invalid_config(format!(
                "threshold step must be positive, got {}",
                self.threshold_step_db
            )));
        }
        if self.max_attempts == 0 {
            return Err(SegmentError::invalid_config("max_attempts must be at least 1"));
        }
        Ok(())
    }

    fn params(&self, threshold_db: f64) -> SilenceParams {
        SilenceParams {
            min_silence_ms: self.min_silence_ms,
            threshold_db,
            keep_silence_ms: self.keep_silence_ms,
        }
    }
}

/// How the threshold search went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationReport {
    pub track: Track,
    /// Split attempts made.
    pub attempts: u32,
    /// Threshold of the split that was kept.
    pub threshold_db: f64,
    /// Whether the average landed inside the band.
    pub converged: bool,
    /// Clips produced by the kept split, before discarding.
    pub raw_clip_count: usize,
    /// Leading clips dropped.
    pub discarded: usize,
    /// Average clip duration of the kept split.
    pub average_secs: f64,
}

/// Segmented track plus the search report.
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub sequence: TrackSequence,
    pub report: SegmentationReport,
}

/// Splits a narration into utterance clips, tuning the silence threshold
/// until the average clip duration falls inside the configured band.
pub struct Segmenter<'a> {
    splitter: &'a dyn SilenceSplitter,
    config: SegmenterConfig,
}

impl<'a> Segmenter<'a> {
    pub fn new(splitter: &'a dyn SilenceSplitter, config: SegmenterConfig) -> Self {
        Self { splitter, config }
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Decode a file with `backend`, then segment it.
    pub fn segment_file(
        &self,
        backend: &dyn AudioBackend,
        path: &Path,
        track: Track,
    ) -> SegmentResult<Segmentation> {
        let audio = backend.decode(path)?;
        tracing::info!(
            "Decoded {} narration {} ({:.1}s)",
            track,
            path.display(),
            audio.duration_secs
        );
        self.segment(&audio, track)
    }

    /// Segment decoded audio.
    ///
    /// Each attempt splits with the current threshold. No clips raises the
    /// threshold; an average above the band raises it (more quiet counts as
    /// silence, more split points); an average below the band lowers it.
    /// Running out of attempts keeps the last split and logs a warning.
    pub fn segment(&self, audio: &AudioData, track: Track) -> SegmentResult<Segmentation> {
        self.config.validate()?;

        if audio.is_empty() {
            return Err(SegmentError::EmptyStream(track));
        }

        let cfg = &self.config;
        let mut threshold = cfg.initial_threshold_db;
        let mut kept: Vec<AudioData> = Vec::new();
        let mut kept_threshold = threshold;
        let mut converged = false;
        let mut attempts = 0;

        while attempts < cfg.max_attempts {
            attempts += 1;
            let clips = self.splitter.split(audio, &cfg.params(threshold));

            if clips.is_empty() {
                tracing::debug!(
                    "{} attempt {}: no clips at {:.1} dB, raising threshold",
                    track,
                    attempts,
                    threshold
                );
                kept = clips;
                kept_threshold = threshold;
                threshold += cfg.threshold_step_db;
                continue;
            }

            let average = average_duration(&clips);
            tracing::debug!(
                "{} attempt {}: {} clips at {:.1} dB, average {:.2}s",
                track,
                attempts,
                clips.len(),
                threshold,
                average
            );

            kept = clips;
            kept_threshold = threshold;

            if average > cfg.max_chunk_secs {
                threshold += cfg.threshold_step_db;
            } else if average < cfg.min_chunk_secs {
                threshold -= cfg.threshold_step_db;
            } else {
                converged = true;
                break;
            }
        }

        if kept.is_empty() {
            return Err(SegmentError::NoClips { track, attempts });
        }

        let average_secs = average_duration(&kept);
        if converged {
            tracing::info!(
                "{}: {} clips at {:.1} dB after {} attempt(s), average {:.2}s",
                track,
                kept.len(),
                kept_threshold,
                attempts,
                average_secs
            );
        } else {
            tracing::warn!(
                "{}: average clip length {:.2}s still outside [{:.1}, {:.1}]s after {} attempts; \
                 keeping {} clips at {:.1} dB",
                track,
                average_secs,
                cfg.min_chunk_secs,
                cfg.max_chunk_secs,
                attempts,
                kept.len(),
                kept_threshold
            );
        }

        let raw_clip_count = kept.len();
        if cfg.discard_count >= raw_clip_count {
            return Err(SegmentError::AllDiscarded {
                track,
                discard: cfg.discard_count,
                produced: raw_clip_count,
            });
        }
        kept.drain(..cfg.discard_count);

        let report = SegmentationReport {
            track,
            attempts,
            threshold_db: kept_threshold,
            converged,
            raw_clip_count,
            discarded: cfg.discard_count,
            average_secs,
        };

        Ok(Segmentation {
            sequence: TrackSequence::from_segments(track, kept),
            report,
        })
    }
}

fn average_duration(clips: &[AudioData]) -> f64 {
    let total: f64 = clips.iter().map(|c| c.duration_secs).sum();
    total / clips.len() as f64
}
