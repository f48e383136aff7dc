//! Data models for bilingual interleaving.
//!
//! - Clips and per-track sequences
//! - Sync points and sections
//! - Language labels shared by every component

mod clip;
mod languages;
mod section;

pub use clip::{Clip, SequenceError, Track, TrackSequence};
pub use languages::LanguagePair;
pub use section::{ParseSyncPointError, Section, SyncPoint};
