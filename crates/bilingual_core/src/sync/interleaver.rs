//! Progress-paced interleaving of target and base clips.

use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::InterleaveSettings;
use crate::models::{Clip, Section, Track, TrackSequence};

use super::{SyncError, SyncResult};

/// How far target progress may run ahead of base progress before a base
/// clip is forced in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressFudge {
    /// A fixed fraction of total progress.
    Fixed(f64),
    /// Average target clip duration divided by `divisor` times the target
    /// total, i.e. roughly `1 / (divisor * clip_count)`.
    AverageClipRatio { divisor: f64 },
}

impl Default for ProgressFudge {
    fn default() -> Self {
        Self::AverageClipRatio { divisor: 2.0 }
    }
}

impl ProgressFudge {
    /// Resolve to a concrete fraction for one target slice.
    pub fn resolve(&self, target: &[Arc<Clip>], target_total: f64) -> SyncResult<f64> {
        match *self {
            Self::Fixed(value) => {
                if !value.is_finite() || value < 0.0 {
                    return Err(SyncError::InvalidFudge(format!(
                        "fudge factor must be a finite non-negative fraction, got {}",
                        value
                    )));
                }
                Ok(value)
            }
            Self::AverageClipRatio { divisor } => {
                if !divisor.is_finite() || divisor <= 0.0 {
                    return Err(SyncError::InvalidFudge(format!(
                        "fudge divisor must be positive, got {}",
                        divisor
                    )));
                }
                let average = target_total / target.len() as f64;
                Ok(average / (target_total * divisor))
            }
        }
    }
}

/// Interleaver parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterleaveConfig {
    pub fudge: ProgressFudge,
}

impl InterleaveConfig {
    pub fn new(fudge: ProgressFudge) -> Self {
        Self { fudge }
    }

    pub fn from_settings(settings: &InterleaveSettings) -> Self {
        let fudge = match settings.fudge_factor {
            Some(value) => ProgressFudge::Fixed(value),
            None => ProgressFudge::AverageClipRatio {
                divisor: settings.fudge_divisor,
            },
        };
        Self { fudge }
    }
}

fn total_duration(track: Track, clips: &[Arc<Clip>]) -> SyncResult<f64> {
    if clips.is_empty() {
        return Err(SyncError::EmptySequence(track));
    }
    let total: f64 = clips.iter().map(|c| c.duration_secs()).sum();
    if !(total > 0.0) {
        return Err(SyncError::NonPositiveDuration { track, total });
    }
    Ok(total)
}

/// Merge `base` and `target` into one playback order.
///
/// Target clip 0 always comes first. After that, a base clip is emitted
/// whenever target progress minus the fudge factor is strictly ahead of
/// base progress, or the target track is exhausted; otherwise the next
/// target clip is emitted. Progress on each track counts the clip that
/// would be emitted next, so each track starts with its first clip already
/// counted.
///
/// Every input clip appears exactly once, in source order within its track.
pub fn interleave(
    base: &[Arc<Clip>],
    target: &[Arc<Clip>],
    config: &InterleaveConfig,
) -> SyncResult<Vec<Arc<Clip>>> {
    let base_total = total_duration(Track::Base, base)?;
    let target_total = total_duration(Track::Target, target)?;
    let fudge = config.fudge.resolve(target, target_total)?;

    tracing::debug!(
        "Interleaving {} target clips ({:.1}s) with {} base clips ({:.1}s), fudge {:.4}",
        target.len(),
        target_total,
        base.len(),
        base_total,
        fudge
    );

    let mut target_play = target[0].duration_secs();
    let mut base_play = base[0].duration_secs();
    let mut next_target = 0;
    let mut next_base = 0;
    let mut output = Vec::with_capacity(base.len() + target.len());

    while next_base < base.len() || next_target < target.len() {
        if next_target == 0 {
            output.push(Arc::clone(&target[0]));
            next_target = 1;
            if let Some(clip) = target.get(next_target) {
                target_play += clip.duration_secs();
            }
            continue;
        }

        let target_exhausted = next_target >= target.len();
        let target_progress = target_play / target_total;
        let base_progress = base_play / base_total;
        let base_behind = target_progress - fudge > base_progress;

        if next_base < base.len() && (target_exhausted || base_behind) {
            tracing::trace!(
                "base {} (progress target {:.3}, base {:.3})",
                base[next_base].source_index(),
                target_progress,
                base_progress
            );
            output.push(Arc::clone(&base[next_base]));
            next_base += 1;
            if let Some(clip) = base.get(next_base) {
                base_play += clip.duration_secs();
            }
        } else {
            tracing::trace!(
                "target {} (progress target {:.3}, base {:.3})",
                target[next_target].source_index(),
                target_progress,
                base_progress
            );
            output.push(Arc::clone(&target[next_target]));
            next_target += 1;
            if let Some(clip) = target.get(next_target) {
                target_play += clip.duration_secs();
            }
        }
    }

    Ok(output)
}

/// Interleave whole sequences, or each section separately when sections
/// are given, concatenating the results in section order.
///
/// With `parallel`, sections are interleaved on the rayon pool; output order
/// is the same either way.
pub fn interleave_sections(
    base: &TrackSequence,
    target: &TrackSequence,
    sections: Option<&[Section]>,
    config: &InterleaveConfig,
    parallel: bool,
) -> SyncResult<Vec<Arc<Clip>>> {
    let sections = match sections {
        None => return interleave(base.clips(), target.clips(), config),
        Some(sections) => sections,
    };

    for (index, section) in sections.iter().enumerate() {
        if section.base_end > base.len() || section.target_end > target.len() {
            return Err(SyncError::SectionOutOfBounds {
                index,
                section: section.clone(),
                base_len: base.len(),
                target_len: target.len(),
            });
        }
        if !section.is_valid() {
            return Err(SyncError::InvalidSection {
                index,
                section: section.clone(),
                reason: "empty range".to_string(),
            });
        }
    }

    let run = |section: &Section| {
        interleave(
            base.slice(section.base_range()),
            target.slice(section.target_range()),
            config,
        )
    };

    let parts: Vec<Vec<Arc<Clip>>> = if parallel {
        sections.par_iter().map(run).collect::<SyncResult<_>>()?
    } else {
        sections.iter().map(run).collect::<SyncResult<_>>()?
    };

    tracing::debug!("Interleaved {} sections", parts.len());

    Ok(parts.into_iter().flatten().collect())
}
