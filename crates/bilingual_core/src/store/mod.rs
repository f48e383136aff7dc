//! Chunk cache: write segmented clips to disk and load them back so a
//! later run can skip segmentation.

mod chunk_store;

pub use chunk_store::{
    clip_file_name, clip_file_stem, load_track_sequence, parse_clip_file_name,
    remove_clip_files, ChunkStore, ClipFileName,
};

use std::path::PathBuf;

use thiserror::Error;

use crate::audio::AudioError;
use crate::models::SequenceError;

/// Errors reading or writing cached clips.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Clip cache I/O failed: {0}")]
    Audio(#[from] AudioError),

    #[error("No clips labelled '{label}' in {}", .dir.display())]
    EmptyCache { dir: PathBuf, label: String },

    #[error("Cached clips in {} are inconsistent: {source}", .dir.display())]
    Sequence {
        dir: PathBuf,
        #[source]
        source: SequenceError,
    },
}

/// Result type for the chunk cache.
pub type StoreResult<T> = Result<T, StoreError>;
