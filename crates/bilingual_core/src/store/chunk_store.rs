//! Persisted clip caches.
//!
//! Layout: one directory per track label, one file per clip named
//! `<NNNNN>-<label>-<sourceIndex>.<ext>` where `NNNNN` is the zero-padded
//! position the clip was written at.

use std::path::{Path, PathBuf};

use crate::audio::{AudioBackend, AudioResult, MediaTags};
use crate::models::{Clip, Track, TrackSequence};

use super::{StoreError, StoreResult};

/// File stem for a clip written at `position`.
pub fn clip_file_stem(position: usize, label: &str, source_index: usize) -> String {
    format!("{:05}-{}-{}", position, label, source_index)
}

/// File name for a clip written at `position`.
pub fn clip_file_name(position: usize, label: &str, source_index: usize, ext: &str) -> String {
    format!("{}.{}", clip_file_stem(position, label, source_index), ext)
}

/// Parsed form of a clip file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipFileName {
    pub position: usize,
    pub source_index: usize,
    pub ext: String,
}

/// Parse `<index>-<label>-<sourceIndex>.<ext>`; `None` if the name does not
/// belong to `label`.
pub fn parse_clip_file_name(file_name: &str, label: &str) -> Option<ClipFileName> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    let (position, rest) = stem.split_once('-')?;
    let source_index = rest.strip_prefix(label)?.strip_prefix('-')?;

    if position.is_empty() || !position.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if source_index.is_empty() || !source_index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(ClipFileName {
        position: position.parse().ok()?,
        source_index: source_index.parse().ok()?,
        ext: ext.to_string(),
    })
}

/// Load a track's clips from `dir`.
///
/// Files are taken in lexical name order (the zero-padded position keeps
/// that equal to write order); names for other labels are ignored. The
/// loaded source indices must run 0..N without gaps.
pub fn load_track_sequence(
    dir: &Path,
    label: &str,
    track: Track,
    backend: &dyn AudioBackend,
) -> StoreResult<TrackSequence> {
    let mut entries: Vec<(String, PathBuf, ClipFileName)> = backend
        .list_dir(dir)?
        .into_iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?.to_string();
            let parsed = parse_clip_file_name(&name, label)?;
            Some((name, path, parsed))
        })
        .collect();

    if entries.is_empty() {
        return Err(StoreError::EmptyCache {
            dir: dir.to_path_buf(),
            label: label.to_string(),
        });
    }

    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut clips = Vec::with_capacity(entries.len());
    for (_, path, parsed) in &entries {
        let audio = backend.decode(path)?;
        clips.push(Clip::new(track, parsed.source_index, audio));
    }

    let sequence = TrackSequence::from_clips(track, clips).map_err(|source| {
        StoreError::Sequence {
            dir: dir.to_path_buf(),
            source,
        }
    })?;

    tracing::info!(
        "Loaded {} cached {} clips from {}",
        sequence.len(),
        track,
        dir.display()
    );
    Ok(sequence)
}

/// Remove every clip file of `label` in `dir`, leaving other files alone.
/// Returns the number of files removed.
pub fn remove_clip_files(
    dir: &Path,
    label: &str,
    backend: &dyn AudioBackend,
) -> AudioResult<usize> {
    let mut removed = 0;
    for path in backend.list_dir(dir)? {
        let owned = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| parse_clip_file_name(name, label))
            .is_some();
        if owned {
            backend.remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Clip cache rooted at one directory.
#[derive(Debug, Clone)]
pub struct ChunkStore {
    root: PathBuf,
    ext: String,
}

impl ChunkStore {
    pub fn new(root: impl Into<PathBuf>, ext: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            ext: ext.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding `label`'s clips.
    pub fn track_dir(&self, label: &str) -> PathBuf {
        self.root.join(label)
    }

    /// Whether at least one clip for `label` is cached.
    pub fn has(&self, label: &str, backend: &dyn AudioBackend) -> bool {
        match backend.list_dir(&self.track_dir(label)) {
            Ok(paths) => paths.iter().any(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .and_then(|name| parse_clip_file_name(name, label))
                    .is_some()
            }),
            Err(_) => false,
        }
    }

    /// Write every clip of `sequence` under `label`. Returns the number of
    /// files written.
    pub fn save(
        &self,
        sequence: &TrackSequence,
        label: &str,
        backend: &dyn AudioBackend,
    ) -> StoreResult<usize> {
        let dir = self.track_dir(label);
        backend.ensure_dir(&dir)?;
        let stale = remove_clip_files(&dir, label, backend)?;
        if stale > 0 {
            tracing::debug!("Removed {} stale cached clips from {}", stale, dir.display());
        }

        for (position, clip) in sequence.clips().iter().enumerate() {
            let stem = clip_file_stem(position, label, clip.source_index());
            let path = dir.join(format!("{}.{}", stem, self.ext));
            let tags = MediaTags {
                album: label.to_string(),
                title: stem,
                ..MediaTags::default()
            };
            backend.encode(clip.audio(), &path, &tags)?;
        }

        tracing::info!(
            "Cached {} {} clips in {}",
            sequence.len(),
            sequence.track(),
            dir.display()
        );
        Ok(sequence.len())
    }

    /// Load `label`'s cached clips.
    pub fn load(
        &self,
        label: &str,
        track: Track,
        backend: &dyn AudioBackend,
    ) -> StoreResult<TrackSequence> {
        load_track_sequence(&self.track_dir(label), label, track, backend)
    }
}
