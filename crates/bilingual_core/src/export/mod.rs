//! Export of the interleaved Output Sequence.
//!
//! Two layouts:
//! - [`ExportMode::Single`]: every clip concatenated into one tagged file,
//!   followed by a stretch of trailing silence
//! - [`ExportMode::Clips`]: one tagged file per clip under `clips/`, named so
//!   the chunk store can load each track back
//!
//! Either way a `manifest.json` records the emission order.

mod exporter;

pub use exporter::{
    ExportSummary, Exporter, ManifestEntry, RunManifest, CLIPS_DIR, MANIFEST_FILE,
};

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::AudioError;

/// Output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    #[default]
    Single,
    Clips,
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportMode::Single => write!(f, "single"),
            ExportMode::Clips => write!(f, "clips"),
        }
    }
}

/// Errors that can occur while exporting.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Encoding failed: {0}")]
    Audio(#[from] AudioError),

    #[error("Nothing to export: the output sequence is empty")]
    EmptyOutput,

    #[error("Failed to serialize manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write manifest {}: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for export.
pub type ExportResult<T> = Result<T, ExportError>;
