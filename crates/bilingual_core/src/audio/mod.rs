//! Audio I/O and silence detection.
//!
//! # Architecture
//!
//! 1. **Backend** (`backend`): the [`AudioBackend`] trait is the only place
//!    encoded media is touched. [`FfmpegBackend`] shells out to FFmpeg,
//!    [`MemoryBackend`] keeps everything in a map.
//!
//! 2. **Silence splitting** (`silence`): [`SilenceSplitter`] turns one decoded
//!    stream into ordered utterance clips. [`RmsSilenceSplitter`] measures
//!    windowed RMS loudness in dBFS.
//!
//! # Usage
//!
//! ```ignore
//! use bilingual_core::audio::{AudioBackend, FfmpegBackend, RmsSilenceSplitter, SilenceParams, SilenceSplitter};
//!
//! let backend = FfmpegBackend::new(DEFAULT_SAMPLE_RATE);
//! let narration = backend.decode(Path::new("el-principito.mp3"))?;
//! let clips = RmsSilenceSplitter::new().split(&narration, &SilenceParams::default());
//! ```

mod backend;
mod ffmpeg;
mod silence;
mod types;

pub use backend::{AudioBackend, MemoryBackend};
pub use ffmpeg::{FfmpegBackend, DEFAULT_SAMPLE_RATE};
pub use silence::{ratio_to_db, FrameEnergy, RmsSilenceSplitter, SilenceParams, SilenceSplitter};
pub use types::{AudioData, AudioError, AudioResult, MediaTags};
