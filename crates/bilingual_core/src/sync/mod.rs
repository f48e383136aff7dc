//! Cross-track synchronisation.
//!
//! - [`build_sections`] turns user sync points into index-aligned sections
//! - [`interleave`] merges one base slice and one target slice by progress
//! - [`interleave_sections`] runs the interleaver per section

mod interleaver;
mod sections;

pub use interleaver::{interleave, interleave_sections, InterleaveConfig, ProgressFudge};
pub use sections::{build_sections, parse_sync_points};

use thiserror::Error;

use crate::models::{ParseSyncPointError, Section, Track};

/// Errors from sectioning and interleaving.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    ParseSyncPoint(#[from] ParseSyncPointError),

    #[error("Section {index} {section} is invalid: {reason}")]
    InvalidSection {
        index: usize,
        section: Section,
        reason: String,
    },

    #[error("Section {index} {section} exceeds the sequences ({base_len} base, {target_len} target clips)")]
    SectionOutOfBounds {
        index: usize,
        section: Section,
        base_len: usize,
        target_len: usize,
    },

    #[error("Cannot interleave an empty {0} sequence")]
    EmptySequence(Track),

    #[error("The {track} sequence has non-positive total duration ({total}s)")]
    NonPositiveDuration { track: Track, total: f64 },

    #[error("Invalid fudge factor: {0}")]
    InvalidFudge(String),
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
