//! Synthetic narrations and contexts for orchestrator tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::audio::{AudioData, MemoryBackend, RmsSilenceSplitter};
use crate::config::Settings;
use crate::logging::{LogConfig, RunLogger};
use crate::models::SyncPoint;

use super::types::{Context, RunSpec};

pub const RATE: u32 = 1000;

/// Utterances of the given lengths (seconds), each followed by 1.5 s of
/// silence, after 0.5 s of leading silence.
pub fn narration(utterances: &[f64]) -> AudioData {
    let mut samples = vec![0.0; (0.5 * RATE as f64) as usize];
    for &secs in utterances {
        let count = (secs * RATE as f64) as usize;
        samples.extend((0..count).map(|i| if i % 2 == 0 { 0.5 } else { -0.5 }));
        samples.extend(std::iter::repeat(0.0).take((1.5 * RATE as f64) as usize));
    }
    AudioData::new(samples, RATE)
}

/// In-memory run over a temp directory.
pub struct TestRun {
    pub dir: TempDir,
    pub backend: Arc<MemoryBackend>,
    pub settings: Settings,
    pub spec: RunSpec,
}

impl TestRun {
    pub fn new(base: &[f64], target: &[f64]) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let backend = Arc::new(MemoryBackend::new(RATE));
        backend.insert("/input/base.mp3", narration(base));
        backend.insert("/input/target.mp3", narration(target));

        let mut settings = Settings::default();
        settings.languages.title = "book".to_string();
        settings.paths.chunk_cache = dir.path().join("cache").display().to_string();
        settings.paths.logs_folder = dir.path().join("logs").display().to_string();

        Self {
            dir,
            backend,
            settings,
            spec: RunSpec::new("/input/base.mp3", "/input/target.mp3"),
        }
    }

    pub fn with_sync_points(mut self, points: &[(usize, usize)]) -> Self {
        self.spec.sync_points = points.iter().map(|&(b, t)| SyncPoint::new(b, t)).collect();
        self
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    pub fn logs_dir(&self) -> &Path {
        Path::new(&self.settings.paths.logs_folder)
    }

    pub fn context(&self) -> Context {
        let config = LogConfig {
            show_timestamps: false,
            ..LogConfig::default()
        };
        let logger = RunLogger::new("test-run", self.logs_dir(), config).expect("run logger");
        Context::new(
            self.spec.clone(),
            self.settings.clone(),
            "test-run",
            self.output_dir(),
            self.backend.clone(),
            Arc::new(RmsSilenceSplitter::new()),
            Arc::new(logger),
        )
    }
}
