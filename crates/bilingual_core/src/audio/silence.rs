//! Silence-based splitting of audio into utterance clips.
//!
//! Loudness is measured as RMS in dBFS over a sliding window that is
//! `min_silence_ms` long and advances in whole milliseconds. Windows at or
//! below the threshold are silent; runs of silent windows become silent
//! ranges, and the audio between silent ranges is returned as clips, padded
//! with up to `keep_silence_ms` of the surrounding silence.

use serde::{Deserialize, Serialize};

use super::types::AudioData;

/// Parameters for one split attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SilenceParams {
    /// Minimum length of a silent stretch, in milliseconds.
    pub min_silence_ms: u32,
    /// Loudness at or below which a window counts as silent (dBFS).
    pub threshold_db: f64,
    /// Silence kept at each clip boundary, in milliseconds.
    pub keep_silence_ms: u32,
}

impl Default for SilenceParams {
    fn default() -> Self {
        Self {
            min_silence_ms: 900,
            threshold_db: -46.0,
            keep_silence_ms: 900,
        }
    }
}

/// Splits one audio stream into ordered sub-clips on silence.
pub trait SilenceSplitter: Send + Sync {
    /// Split `audio` into clips in source order. May return no clips when
    /// the whole stream counts as silence.
    fn split(&self, audio: &AudioData, params: &SilenceParams) -> Vec<AudioData>;
}

/// Splitter measuring windowed RMS loudness.
#[derive(Debug, Clone)]
pub struct RmsSilenceSplitter {
    /// Window advance in milliseconds.
    seek_step_ms: usize,
}

impl RmsSilenceSplitter {
    pub fn new() -> Self {
        Self { seek_step_ms: 1 }
    }

    /// Set the window advance. Larger steps are faster but coarser.
    pub fn with_seek_step(mut self, seek_step_ms: usize) -> Self {
        self.seek_step_ms = seek_step_ms.max(1);
        self
    }

    /// Find silent ranges, in milliseconds, as half-open `(start, end)`.
    pub fn detect_silence(&self, frames: &FrameEnergy, params: &SilenceParams) -> Vec<(usize, usize)> {
        let total = frames.len();
        let window = params.min_silence_ms.max(1) as usize;

        if total < window {
            return Vec::new();
        }

        let last_start = total - window;
        let mut starts: Vec<usize> = (0..=last_start).step_by(self.seek_step_ms).collect();
        if last_start % self.seek_step_ms != 0 {
            starts.push(last_start);
        }

        let silent_starts: Vec<usize> = starts
            .into_iter()
            .filter(|&start| frames.window_db(start, start + window) <= params.threshold_db)
            .collect();

        let Some(&first) = silent_starts.first() else {
            return Vec::new();
        };

        let mut ranges = Vec::new();
        let mut range_start = first;
        let mut prev = first;

        for &start in &silent_starts[1..] {
            let continuous = start == prev + self.seek_step_ms;
            // Overlapping windows belong to the same silent stretch
            let has_gap = start > prev + window;

            if !continuous && has_gap {
                ranges.push((range_start, prev + window));
                range_start = start;
            }
            prev = start;
        }
        ranges.push((range_start, prev + window));

        ranges
    }

    /// Find non-silent ranges, in milliseconds.
    pub fn detect_nonsilent(&self, frames: &FrameEnergy, params: &SilenceParams) -> Vec<(usize, usize)> {
        let total = frames.len();
        let silent = self.detect_silence(frames, params);

        if silent.is_empty() {
            return vec![(0, total)];
        }
        if silent[0] == (0, total) {
            return Vec::new();
        }

        let mut nonsilent = Vec::new();
        let mut prev_end = 0;
        for &(start, end) in &silent {
            nonsilent.push((prev_end, start));
            prev_end = end;
        }
        if prev_end != total {
            nonsilent.push((prev_end, total));
        }
        if nonsilent.first() == Some(&(0, 0)) {
            nonsilent.remove(0);
        }

        nonsilent
    }
}

impl Default for RmsSilenceSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl SilenceSplitter for RmsSilenceSplitter {
    fn split(&self, audio: &AudioData, params: &SilenceParams) -> Vec<AudioData> {
        if audio.is_empty() || audio.sample_rate == 0 {
            return Vec::new();
        }

        let frames = FrameEnergy::from_audio(audio);
        let keep = params.keep_silence_ms as i64;

        let mut ranges: Vec<(i64, i64)> = self
            .detect_nonsilent(&frames, params)
            .into_iter()
            .map(|(start, end)| (start as i64 - keep, end as i64 + keep))
            .collect();

        // Padding of neighbours may overlap; split it at the midpoint
        for i in 1..ranges.len() {
            let (_, last_end) = ranges[i - 1];
            let (next_start, _) = ranges[i];
            if next_start < last_end {
                let mid = (last_end + next_start) / 2;
                ranges[i - 1].1 = mid;
                ranges[i].0 = mid;
            }
        }

        let total_ms = frames.len() as i64;
        ranges
            .into_iter()
            .map(|(start, end)| {
                let start = start.clamp(0, total_ms) as usize;
                let end = end.clamp(0, total_ms) as usize;
                audio.slice_samples(frames.sample_offset(start), frames.sample_offset(end))
            })
            .filter(|clip| !clip.is_empty())
            .collect()
    }
}

/// Per-millisecond signal energy with prefix sums for O(1) window RMS.
#[derive(Debug, Clone)]
pub struct FrameEnergy {
    samples_per_frame: usize,
    total_samples: usize,
    /// Prefix sums of squared samples at each frame boundary.
    energy_prefix: Vec<f64>,
    /// Prefix sums of sample counts at each frame boundary.
    count_prefix: Vec<usize>,
}

impl FrameEnergy {
    /// Bin the audio into 1 ms frames. A trailing partial frame counts as
    /// a frame of its own.
    pub fn from_audio(audio: &AudioData) -> Self {
        let samples_per_frame = ((audio.sample_rate as usize) / 1000).max(1);
        let mut energy_prefix = vec![0.0];
        let mut count_prefix = vec![0];

        for frame in audio.samples.chunks(samples_per_frame) {
            let energy: f64 = frame.iter().map(|s| s * s).sum();
            let last_energy = energy_prefix[energy_prefix.len() - 1];
            let last_count = count_prefix[count_prefix.len() - 1];
            energy_prefix.push(last_energy + energy);
            count_prefix.push(last_count + frame.len());
        }

        Self {
            samples_per_frame,
            total_samples: audio.samples.len(),
            energy_prefix,
            count_prefix,
        }
    }

    /// Number of frames (milliseconds).
    pub fn len(&self) -> usize {
        self.energy_prefix.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// RMS loudness of frames `[start, end)` in dBFS.
    pub fn window_db(&self, start: usize, end: usize) -> f64 {
        let count = self.count_prefix[end] - self.count_prefix[start];
        if count == 0 {
            return f64::NEG_INFINITY;
        }
        let mean_square = (self.energy_prefix[end] - self.energy_prefix[start]) / count as f64;
        ratio_to_db(mean_square.max(0.0).sqrt())
    }

    /// Sample offset of a frame boundary.
    fn sample_offset(&self, frame: usize) -> usize {
        (frame * self.samples_per_frame).min(self.total_samples)
    }
}

/// Convert an amplitude ratio (full scale = 1.0) to decibels.
pub fn ratio_to_db(ratio: f64) -> f64 {
    if ratio <= 0.0 {
        f64::NEG_INFINITY
    } else {
        20.0 * ratio.log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 1000;

    /// Build audio from (seconds, amplitude) runs of a square-ish signal.
    fn runs(parts: &[(f64, f64)]) -> AudioData {
        let mut samples = Vec::new();
        for &(secs, amplitude) in parts {
            let count = (secs * RATE as f64) as usize;
            samples.extend((0..count).map(|i| if i % 2 == 0 { amplitude } else { -amplitude }));
        }
        AudioData::new(samples, RATE)
    }

    fn params(threshold_db: f64) -> SilenceParams {
        SilenceParams {
            min_silence_ms: 500,
            threshold_db,
            keep_silence_ms: 100,
        }
    }

    #[test]
    fn ratio_to_db_matches_reference_points() {
        assert!((ratio_to_db(1.0)).abs() < 1e-12);
        assert!((ratio_to_db(0.1) + 20.0).abs() < 1e-9);
        assert_eq!(ratio_to_db(0.0), f64::NEG_INFINITY);
    }

    #[test]
    fn window_rms_of_full_scale_square_is_zero_db() {
        let audio = runs(&[(1.0, 1.0)]);
        let frames = FrameEnergy::from_audio(&audio);
        assert_eq!(frames.len(), 1000);
        assert!(frames.window_db(0, 1000).abs() < 1e-9);
    }

    #[test]
    fn splits_speech_separated_by_silence() {
        // speech 1s, silence 1s, speech 2s
        let audio = runs(&[(1.0, 0.5), (1.0, 0.0), (2.0, 0.5)]);
        let clips = RmsSilenceSplitter::new().split(&audio, &params(-40.0));

        assert_eq!(clips.len(), 2);
        // each clip keeps 100 ms of the silence next to it
        assert!((clips[0].duration_secs - 1.1).abs() < 1e-9);
        assert!((clips[1].duration_secs - 2.1).abs() < 1e-9);
    }

    #[test]
    fn short_pauses_do_not_split() {
        // 300 ms pause is below the 500 ms minimum
        let audio = runs(&[(1.0, 0.5), (0.3, 0.0), (1.0, 0.5)]);
        let clips = RmsSilenceSplitter::new().split(&audio, &params(-40.0));
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].len(), audio.len());
    }

    #[test]
    fn all_silence_yields_no_clips() {
        let audio = runs(&[(2.0, 0.001)]);
        // -60 dBFS signal is under a -40 dB threshold everywhere
        let clips = RmsSilenceSplitter::new().split(&audio, &params(-40.0));
        assert!(clips.is_empty());
    }

    #[test]
    fn raising_threshold_finds_more_silence() {
        // quiet passage at about -26 dBFS between loud speech
        let audio = runs(&[(1.0, 0.8), (1.0, 0.05), (1.0, 0.8)]);
        let splitter = RmsSilenceSplitter::new();

        assert_eq!(splitter.split(&audio, &params(-40.0)).len(), 1);
        assert_eq!(splitter.split(&audio, &params(-20.0)).len(), 2);
    }

    #[test]
    fn overlapping_padding_meets_at_midpoint() {
        let audio = runs(&[(1.0, 0.5), (0.6, 0.0), (1.0, 0.5)]);
        let params = SilenceParams {
            min_silence_ms: 500,
            threshold_db: -40.0,
            keep_silence_ms: 400,
        };
        let clips = RmsSilenceSplitter::new().split(&audio, &params);

        assert_eq!(clips.len(), 2);
        let total: usize = clips.iter().map(|c| c.len()).sum();
        assert_eq!(total, audio.len());
    }

    #[test]
    fn coarse_seek_step_still_checks_last_window() {
        let audio = runs(&[(1.0, 0.5), (0.7, 0.0)]);
        let splitter = RmsSilenceSplitter::new().with_seek_step(160);
        let frames = FrameEnergy::from_audio(&audio);
        let silent = splitter.detect_silence(&frames, &params(-40.0));
        assert_eq!(silent.last().map(|r| r.1), Some(1700));
    }
}
