//! Audio codec seam.
//!
//! Everything that touches encoded media goes through [`AudioBackend`], so
//! the segmentation and sync logic only ever sees decoded [`AudioData`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::types::{AudioData, AudioError, AudioResult, MediaTags};

/// Decode/encode capability for media files.
pub trait AudioBackend: Send + Sync {
    /// Backend name (for logging).
    fn name(&self) -> &'static str;

    /// Sample rate that decoded audio is delivered at.
    fn sample_rate(&self) -> u32;

    /// Decode a media file to mono samples.
    fn decode(&self, path: &Path) -> AudioResult<AudioData>;

    /// Encode samples to a media file, tagging it with `tags`.
    fn encode(&self, audio: &AudioData, path: &Path, tags: &MediaTags) -> AudioResult<()>;

    /// Query a media file's duration in seconds.
    fn duration(&self, path: &Path) -> AudioResult<f64>;

    /// List the files directly inside `dir`, sorted lexically.
    fn list_dir(&self, dir: &Path) -> AudioResult<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Make sure `dir` exists before files are written into it.
    fn ensure_dir(&self, dir: &Path) -> AudioResult<()> {
        fs::create_dir_all(dir)?;
        Ok(())
    }

    /// Delete a previously written file.
    fn remove_file(&self, path: &Path) -> AudioResult<()> {
        fs::remove_file(path)?;
        Ok(())
    }
}

/// In-memory backend keyed by path.
///
/// Holds "files" in a map instead of on disk. Used to run the whole
/// pipeline without FFmpeg, and to keep chunk caches in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    sample_rate: u32,
    files: Mutex<BTreeMap<PathBuf, (AudioData, MediaTags)>>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            files: Mutex::new(BTreeMap::new()),
        }
    }

    /// Register audio under a path, as if it had been written there.
    pub fn insert(&self, path: impl Into<PathBuf>, audio: AudioData) {
        self.files
            .lock()
            .insert(path.into(), (audio, MediaTags::default()));
    }

    /// Tags stored with a previously encoded path.
    pub fn tags(&self, path: &Path) -> Option<MediaTags> {
        self.files.lock().get(path).map(|(_, tags)| tags.clone())
    }

    /// Audio stored at a path.
    pub fn get(&self, path: &Path) -> Option<AudioData> {
        self.files.lock().get(path).map(|(audio, _)| audio.clone())
    }

    /// All stored paths in sorted order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.lock().keys().cloned().collect()
    }
}

impl AudioBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn decode(&self, path: &Path) -> AudioResult<AudioData> {
        let audio = self
            .get(path)
            .ok_or_else(|| AudioError::SourceNotFound(path.display().to_string()))?;
        if audio.is_empty() {
            return Err(AudioError::DecodeError(format!(
                "No audio samples decoded from {}",
                path.display()
            )));
        }
        Ok(audio)
    }

    fn encode(&self, audio: &AudioData, path: &Path, tags: &MediaTags) -> AudioResult<()> {
        if audio.is_empty() {
            return Err(AudioError::InvalidAudio(format!(
                "Refusing to encode empty audio to {}",
                path.display()
            )));
        }
        self.files
            .lock()
            .insert(path.to_path_buf(), (audio.clone(), tags.clone()));
        Ok(())
    }

    fn duration(&self, path: &Path) -> AudioResult<f64> {
        self.files
            .lock()
            .get(path)
            .map(|(audio, _)| audio.duration_secs)
            .ok_or_else(|| AudioError::SourceNotFound(path.display().to_string()))
    }

    fn list_dir(&self, dir: &Path) -> AudioResult<Vec<PathBuf>> {
        // BTreeMap keys are already in lexical order
        Ok(self
            .files
            .lock()
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .cloned()
            .collect())
    }

    fn ensure_dir(&self, _dir: &Path) -> AudioResult<()> {
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> AudioResult<()> {
        self.files
            .lock()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| AudioError::SourceNotFound(path.display().to_string()))
    }
}
