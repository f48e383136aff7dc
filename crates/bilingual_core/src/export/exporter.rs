//! Writing an Output Sequence to media files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audio::{AudioBackend, AudioData, MediaTags};
use crate::config::ExportSettings;
use crate::models::{Clip, LanguagePair, Section, Track};
use crate::store::{clip_file_stem, remove_clip_files};

use super::{ExportError, ExportMode, ExportResult};

/// File name of the run manifest written next to the output.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Subdirectory used by [`ExportMode::Clips`].
pub const CLIPS_DIR: &str = "clips";

/// One emitted clip in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub position: usize,
    pub track: Track,
    pub source_index: usize,
    pub duration_secs: f64,
}

/// JSON record of what a run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub created_at: String,
    pub languages: LanguagePair,
    pub mode: ExportMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<Section>>,
    pub files: Vec<PathBuf>,
    pub entries: Vec<ManifestEntry>,
}

/// Result of an export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSummary {
    pub mode: ExportMode,
    /// Media files written, in order.
    pub files: Vec<PathBuf>,
    pub clip_count: usize,
    /// Playback length including trailing silence.
    pub duration_secs: f64,
    pub manifest_path: PathBuf,
}

/// Encodes the interleaved clips with language tags.
pub struct Exporter<'a> {
    backend: &'a dyn AudioBackend,
    settings: &'a ExportSettings,
    languages: &'a LanguagePair,
}

impl<'a> Exporter<'a> {
    pub fn new(
        backend: &'a dyn AudioBackend,
        settings: &'a ExportSettings,
        languages: &'a LanguagePair,
    ) -> Self {
        Self {
            backend,
            settings,
            languages,
        }
    }

    /// Path of the combined file in single mode.
    pub fn single_output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!(
            "{}.{}",
            self.settings.output_name, self.settings.format
        ))
    }

    /// Export `output` into `output_dir` and write the run manifest.
    pub fn export(
        &self,
        output: &[Arc<Clip>],
        sections: Option<&[Section]>,
        output_dir: &Path,
    ) -> ExportResult<ExportSummary> {
        if output.is_empty() {
            return Err(ExportError::EmptyOutput);
        }

        self.backend.ensure_dir(output_dir)?;

        let (files, duration_secs) = match self.settings.mode {
            ExportMode::Single => self.export_single(output, output_dir)?,
            ExportMode::Clips => self.export_clips(output, output_dir)?,
        };

        let manifest_path = self.write_manifest(output, sections, &files, output_dir)?;

        Ok(ExportSummary {
            mode: self.settings.mode,
            files,
            clip_count: output.len(),
            duration_secs,
            manifest_path,
        })
    }

    fn export_single(
        &self,
        output: &[Arc<Clip>],
        output_dir: &Path,
    ) -> ExportResult<(Vec<PathBuf>, f64)> {
        let sample_rate = output[0].audio().sample_rate;
        let tail = AudioData::silence(
            self.settings.trailing_silence_ms as f64 / 1000.0,
            sample_rate,
        );

        let parts = output
            .iter()
            .map(|clip| clip.audio())
            .chain(std::iter::once(&tail));
        let combined = AudioData::concat(parts)?;

        let path = self.single_output_path(output_dir);
        let tags = MediaTags {
            album: self.languages.album_tag(),
            artist: self.settings.artist.clone(),
            title: self.settings.output_name.clone(),
        };

        tracing::info!(
            "Encoding {} clips ({:.1}s) to {}",
            output.len(),
            combined.duration_secs,
            path.display()
        );
        self.backend.encode(&combined, &path, &tags)?;

        Ok((vec![path], combined.duration_secs))
    }

    fn export_clips(
        &self,
        output: &[Arc<Clip>],
        output_dir: &Path,
    ) -> ExportResult<(Vec<PathBuf>, f64)> {
        let clips_dir = output_dir.join(CLIPS_DIR);
        self.backend.ensure_dir(&clips_dir)?;
        for track in [Track::Base, Track::Target] {
            remove_clip_files(&clips_dir, &self.languages.label(track), self.backend)?;
        }

        let album = self.languages.album_tag();
        let mut files = Vec::with_capacity(output.len());
        let mut duration_secs = 0.0;

        for (position, clip) in output.iter().enumerate() {
            let label = self.languages.label(clip.track());
            let stem = clip_file_stem(position, &label, clip.source_index());
            let path = clips_dir.join(format!("{}.{}", stem, self.settings.format));

            let tags = MediaTags {
                album: album.clone(),
                artist: self.settings.artist.clone(),
                title: stem,
            };
            self.backend.encode(clip.audio(), &path, &tags)?;

            duration_secs += clip.duration_secs();
            files.push(path);
        }

        tracing::info!("Wrote {} clips to {}", files.len(), clips_dir.display());
        Ok((files, duration_secs))
    }

    fn write_manifest(
        &self,
        output: &[Arc<Clip>],
        sections: Option<&[Section]>,
        files: &[PathBuf],
        output_dir: &Path,
    ) -> ExportResult<PathBuf> {
        let manifest = RunManifest {
            created_at: chrono::Local::now().to_rfc3339(),
            languages: self.languages.clone(),
            mode: self.settings.mode,
            sections: sections.map(|s| s.to_vec()),
            files: files.to_vec(),
            entries: output
                .iter()
                .enumerate()
                .map(|(position, clip)| ManifestEntry {
                    position,
                    track: clip.track(),
                    source_index: clip.source_index(),
                    duration_secs: clip.duration_secs(),
                })
                .collect(),
        };

        let path = output_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(&manifest)?;
        fs::create_dir_all(output_dir)
            .and_then(|_| fs::write(&path, json))
            .map_err(|source| ExportError::Manifest {
                path: path.clone(),
                source,
            })?;

        tracing::debug!("Wrote manifest {}", path.display());
        Ok(path)
    }
}
