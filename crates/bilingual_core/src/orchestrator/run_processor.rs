//! Runs one interleaving pass through the standard pipeline.
//!
//! `RunProcessor` owns the shared resources (settings, audio backend,
//! silence splitter), checks the run inputs, creates the per-run logger and
//! output directory, and hands a `Context` to the pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::audio::{AudioBackend, SilenceSplitter};
use crate::config::Settings;
use crate::logging::{LogConfig, RunLogger};
use crate::models::{LanguagePair, Track};

use super::errors::{PipelineError, PipelineResult};
use super::types::{Context, RunSpec, RunState};
use super::{create_standard_pipeline, PipelineRunResult};

/// Result of a finished run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_name: String,
    /// Media files written, in order.
    pub output_files: Vec<PathBuf>,
    pub manifest_path: Option<PathBuf>,
    pub log_path: PathBuf,
    pub steps_completed: Vec<String>,
    pub steps_skipped: Vec<String>,
    /// Final state, including the Output Sequence.
    pub state: RunState,
}

impl RunReport {
    fn new(run_name: String, log_path: PathBuf, result: PipelineRunResult, state: RunState) -> Self {
        let (output_files, manifest_path) = match &state.export {
            Some(summary) => (summary.files.clone(), Some(summary.manifest_path.clone())),
            None => (Vec::new(), None),
        };
        Self {
            run_name,
            output_files,
            manifest_path,
            log_path,
            steps_completed: result.steps_completed,
            steps_skipped: result.steps_skipped,
            state,
        }
    }
}

/// Processor for interleaving runs.
///
/// # Example
///
/// ```ignore
/// let processor = RunProcessor::new(settings, backend, splitter);
/// let report = processor.process(&spec, Path::new("out"))?;
/// println!("Wrote {:?}", report.output_files);
/// ```
pub struct RunProcessor {
    settings: Settings,
    backend: Arc<dyn AudioBackend>,
    splitter: Arc<dyn SilenceSplitter>,
}

impl RunProcessor {
    pub fn new(
        settings: Settings,
        backend: Arc<dyn AudioBackend>,
        splitter: Arc<dyn SilenceSplitter>,
    ) -> Self {
        Self {
            settings,
            backend,
            splitter,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run the standard pipeline for `spec`, writing into `output_dir`.
    pub fn process(&self, spec: &RunSpec, output_dir: &Path) -> PipelineResult<RunReport> {
        let run_name = RunLogger::timestamped_name(&self.settings.languages.title);
        self.process_named(&run_name, spec, output_dir)
    }

    /// Like [`process`](Self::process) with an explicit run name (used for
    /// the log file name).
    pub fn process_named(
        &self,
        run_name: &str,
        spec: &RunSpec,
        output_dir: &Path,
    ) -> PipelineResult<RunReport> {
        validate_spec(run_name, spec, &self.settings.languages)?;

        std::fs::create_dir_all(output_dir).map_err(|e| {
            PipelineError::setup_failed(
                run_name,
                format!("Failed to create {}: {}", output_dir.display(), e),
            )
        })?;

        let logger = RunLogger::new(
            run_name,
            &self.settings.paths.logs_folder,
            LogConfig::from_settings(&self.settings.logging),
        )
        .map(Arc::new)
        .map_err(|e| {
            PipelineError::setup_failed(run_name, format!("Failed to create logger: {}", e))
        })?;

        let ctx = Context::new(
            spec.clone(),
            self.settings.clone(),
            run_name,
            output_dir.to_path_buf(),
            Arc::clone(&self.backend),
            Arc::clone(&self.splitter),
            Arc::clone(&logger),
        );

        let mut state = RunState::new(run_name);
        ctx.logger.info(&format!(
            "Starting run: {} at {}",
            state.run_id,
            state.started_at.as_deref().unwrap_or("unknown time")
        ));
        let languages = ctx.languages();
        ctx.logger.info(&format!(
            "Languages: {} ({}) over {} ({})",
            languages.language(Track::Target),
            languages.code(Track::Target),
            languages.language(Track::Base),
            languages.code(Track::Base)
        ));
        ctx.logger.info(&format!(
            "Backend: {} at {} Hz, {} sync point(s)",
            self.backend.name(),
            self.backend.sample_rate(),
            spec.sync_points.len()
        ));

        let pipeline = create_standard_pipeline();

        let result = pipeline.run(&ctx, &mut state);
        let log_path = logger.log_path().to_path_buf();

        match result {
            Ok(run_result) => {
                ctx.logger
                    .info(&format!("Run completed: {}", output_dir.display()));
                logger.close();
                Ok(RunReport::new(run_name.to_string(), log_path, run_result, state))
            }
            Err(e) => {
                ctx.logger.error(&format!("Pipeline failed: {}", e));
                logger.close();
                Err(e)
            }
        }
    }
}

fn validate_spec(run_name: &str, spec: &RunSpec, languages: &LanguagePair) -> PipelineResult<()> {
    if spec.base_audio.as_os_str().is_empty() || spec.target_audio.as_os_str().is_empty() {
        return Err(PipelineError::validation_failed(
            run_name,
            "Both base and target narrations are required",
        ));
    }
    if spec.base_audio == spec.target_audio {
        return Err(PipelineError::validation_failed(
            run_name,
            format!(
                "Base and target narrations are the same file: {}",
                spec.base_audio.display()
            ),
        ));
    }
    let label = languages.label(Track::Base);
    if label == languages.label(Track::Target) {
        return Err(PipelineError::validation_failed(
            run_name,
            format!(
                "Base and target share the label '{}'; use distinct language codes",
                label
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RmsSilenceSplitter;
    use crate::orchestrator::errors::StepError;
    use crate::orchestrator::test_support::TestRun;
    use crate::sync::SyncError;

    fn processor(run: &TestRun) -> RunProcessor {
        RunProcessor::new(
            run.settings.clone(),
            run.backend.clone(),
            Arc::new(RmsSilenceSplitter::new()),
        )
    }

    #[test]
    fn full_run_without_sync_points() {
        let run = TestRun::new(&[4.0, 4.0, 4.0], &[4.0, 4.0, 4.0, 4.0]);
        let report = processor(&run)
            .process_named("full", &run.spec, &run.output_dir())
            .unwrap();

        assert_eq!(report.steps_completed, vec!["Segment", "Interleave", "Export"]);
        assert_eq!(report.steps_skipped, vec!["Section"]);
        assert_eq!(report.output_files, vec![run.output_dir().join("audio-out.mp3")]);
        assert!(report.manifest_path.unwrap().exists());
        assert!(report.log_path.exists());

        let output = report.state.output().unwrap();
        assert_eq!(output.len(), 7);
        assert_eq!(output[0].track(), Track::Target);
    }

    #[test]
    fn full_run_with_sync_points() {
        let run = TestRun::new(&[4.0; 4], &[4.0; 4]).with_sync_points(&[(1, 1)]);
        let report = processor(&run)
            .process_named("sectioned", &run.spec, &run.output_dir())
            .unwrap();

        assert!(report.steps_skipped.is_empty());
        assert_eq!(report.state.sections().map(|s| s.len()), Some(2));
        // Second section starts with its first target clip
        let output = report.state.output().unwrap();
        assert_eq!(output[4].track(), Track::Target);
        assert_eq!(output[4].source_index(), 2);
    }

    #[test]
    fn identical_inputs_fail_validation() {
        let mut run = TestRun::new(&[4.0], &[4.0]);
        run.spec.target_audio = run.spec.base_audio.clone();
        let err = processor(&run)
            .process_named("same", &run.spec, &run.output_dir())
            .unwrap_err();
        assert!(matches!(err, PipelineError::ValidationFailed { .. }));
    }

    #[test]
    fn codes_differing_only_in_case_fail_validation() {
        let mut run = TestRun::new(&[4.0], &[4.0]);
        run.settings.languages.base_code = "es".to_string();
        run.settings.languages.target_code = "ES".to_string();
        let err = processor(&run)
            .process_named("same-label", &run.spec, &run.output_dir())
            .unwrap_err();

        match err {
            PipelineError::ValidationFailed { message, .. } => {
                assert!(message.contains("book-es"))
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(!run.output_dir().exists());
    }

    #[test]
    fn step_failure_is_reported_with_run_context() {
        let run = TestRun::new(&[4.0, 4.0], &[4.0, 4.0]).with_sync_points(&[(5, 0)]);
        let err = processor(&run)
            .process_named("broken", &run.spec, &run.output_dir())
            .unwrap_err();

        match err {
            PipelineError::StepFailed {
                run_name,
                step_name,
                source,
            } => {
                assert_eq!(run_name, "broken");
                assert_eq!(step_name, "Section");
                assert!(matches!(source, StepError::Sync(SyncError::InvalidSection { .. })));
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
