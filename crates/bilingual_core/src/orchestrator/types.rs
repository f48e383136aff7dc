//! Core types for the orchestrator pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audio::{AudioBackend, SilenceSplitter};
use crate::config::Settings;
use crate::export::ExportSummary;
use crate::logging::RunLogger;
use crate::models::{Clip, LanguagePair, Section, SyncPoint, Track, TrackSequence};
use crate::segmentation::SegmentationReport;

/// What to interleave: the two narrations and optional sync points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSpec {
    /// Narration in the known language.
    pub base_audio: PathBuf,
    /// Narration in the language being learned.
    pub target_audio: PathBuf,
    /// Anchors in order, `"<baseIndex>:<targetIndex>"`.
    #[serde(default)]
    pub sync_points: Vec<SyncPoint>,
}

impl RunSpec {
    pub fn new(base_audio: impl Into<PathBuf>, target_audio: impl Into<PathBuf>) -> Self {
        Self {
            base_audio: base_audio.into(),
            target_audio: target_audio.into(),
            sync_points: Vec::new(),
        }
    }

    pub fn with_sync_points(mut self, sync_points: Vec<SyncPoint>) -> Self {
        self.sync_points = sync_points;
        self
    }

    /// Input path for a track.
    pub fn audio_path(&self, track: Track) -> &PathBuf {
        match track {
            Track::Base => &self.base_audio,
            Track::Target => &self.target_audio,
        }
    }
}

/// Read-only context passed to pipeline steps.
///
/// Contains run configuration and shared resources that steps can read
/// but not modify. Mutable state goes in `RunState`.
pub struct Context {
    /// Inputs for this run.
    pub spec: RunSpec,
    /// Application settings (CLI overrides already applied).
    pub settings: Settings,
    /// Run name/identifier.
    pub run_name: String,
    /// Output directory for exported audio and manifest.
    pub output_dir: PathBuf,
    /// Media decode/encode.
    pub backend: Arc<dyn AudioBackend>,
    /// Silence detection used by segmentation.
    pub splitter: Arc<dyn SilenceSplitter>,
    /// Per-run logger.
    pub logger: Arc<RunLogger>,
}

impl Context {
    /// Create a new context for a run.
    pub fn new(
        spec: RunSpec,
        settings: Settings,
        run_name: impl Into<String>,
        output_dir: PathBuf,
        backend: Arc<dyn AudioBackend>,
        splitter: Arc<dyn SilenceSplitter>,
        logger: Arc<RunLogger>,
    ) -> Self {
        Self {
            spec,
            settings,
            run_name: run_name.into(),
            output_dir,
            backend,
            splitter,
            logger,
        }
    }

    pub fn languages(&self) -> &LanguagePair {
        &self.settings.languages
    }

    /// Cache/label name for a track, e.g. `el-principito-es`.
    pub fn label(&self, track: Track) -> String {
        self.settings.languages.label(track)
    }

    /// Report step progress to the run log and tracing.
    pub fn report_progress(&self, step_name: &str, percent: u32) {
        if self.logger.progress(percent) {
            tracing::debug!("{}: {}%", step_name, percent);
        }
    }
}

/// Output from the Segment step.
#[derive(Debug, Clone)]
pub struct SegmentOutput {
    pub base: TrackSequence,
    pub target: TrackSequence,
    /// Threshold search reports; empty when clips came from the cache.
    pub reports: Vec<SegmentationReport>,
    /// Whether clips were loaded from the chunk cache.
    pub from_cache: bool,
}

impl SegmentOutput {
    pub fn sequence(&self, track: Track) -> &TrackSequence {
        match track {
            Track::Base => &self.base,
            Track::Target => &self.target,
        }
    }
}

/// Output from the Section step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionOutput {
    /// `None` means the whole input is one implicit section.
    pub sections: Option<Vec<Section>>,
}

/// Output from the Interleave step.
#[derive(Debug, Clone)]
pub struct InterleaveOutput {
    /// The Output Sequence.
    pub clips: Vec<Arc<Clip>>,
    /// Sections interleaved (1 when unsectioned).
    pub section_count: usize,
}

/// Mutable run state that accumulates results from pipeline steps.
///
/// Steps add their own output and read what earlier steps recorded.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    /// Unique run identifier.
    pub run_id: String,
    /// When the run started.
    pub started_at: Option<String>,
    pub segmentation: Option<SegmentOutput>,
    pub sections: Option<SectionOutput>,
    pub interleave: Option<InterleaveOutput>,
    pub export: Option<ExportSummary>,
}

impl RunState {
    /// Create a new run state with the given ID.
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Sections chosen by the Section step, if it produced any.
    pub fn sections(&self) -> Option<&[Section]> {
        self.sections
            .as_ref()
            .and_then(|s| s.sections.as_deref())
    }

    /// The interleaved output, if the Interleave step has run.
    pub fn output(&self) -> Option<&[Arc<Clip>]> {
        self.interleave.as_ref().map(|i| i.clips.as_slice())
    }
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step was skipped (preconditions not met, but not an error).
    Skipped(String),
}
