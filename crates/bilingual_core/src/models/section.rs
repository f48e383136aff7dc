//! Sync points and sections.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A user-asserted alignment: base clip `base` and target clip `target`
/// (both inclusive source indices) end at the same point in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyncPoint {
    pub base: usize,
    pub target: usize,
}

impl SyncPoint {
    pub fn new(base: usize, target: usize) -> Self {
        Self { base, target }
    }
}

impl fmt::Display for SyncPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.base, self.target)
    }
}

/// A sync point string that is not `<baseIndex>:<targetIndex>`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed sync point '{input}': expected <baseIndex>:<targetIndex>")]
pub struct ParseSyncPointError {
    pub input: String,
}

impl FromStr for SyncPoint {
    type Err = ParseSyncPointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseSyncPointError {
            input: s.to_string(),
        };

        let (base, target) = s.trim().split_once(':').ok_or_else(malformed)?;
        let base = base.trim().parse::<usize>().map_err(|_| malformed())?;
        let target = target.trim().parse::<usize>().map_err(|_| malformed())?;

        Ok(Self { base, target })
    }
}

/// Index-aligned half-open ranges into the base and target sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub base_start: usize,
    pub base_end: usize,
    pub target_start: usize,
    pub target_end: usize,
}

impl Section {
    pub fn new(base: Range<usize>, target: Range<usize>) -> Self {
        Self {
            base_start: base.start,
            base_end: base.end,
            target_start: target.start,
            target_end: target.end,
        }
    }

    pub fn base_range(&self) -> Range<usize> {
        self.base_start..self.base_end
    }

    pub fn target_range(&self) -> Range<usize> {
        self.target_start..self.target_end
    }

    /// Both ranges hold at least one clip.
    pub fn is_valid(&self) -> bool {
        self.base_start < self.base_end && self.target_start < self.target_end
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.base_start, self.target_start, self.base_end, self.target_end
        )
    }
}
