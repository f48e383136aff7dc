//! Export step - encodes the Output Sequence and writes the manifest.

use crate::export::Exporter;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

/// Writes the interleaved output to `ctx.output_dir`.
pub struct ExportStep;

impl ExportStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExportStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ExportStep {
    fn name(&self) -> &str {
        "Export"
    }

    fn description(&self) -> &str {
        "Encode the interleaved output"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if ctx.settings.export.format.trim().is_empty() {
            return Err(StepError::invalid_input("Export format is empty"));
        }
        if ctx.settings.export.output_name.trim().is_empty() {
            return Err(StepError::invalid_input("Output name is empty"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let output = state
            .output()
            .ok_or_else(|| StepError::precondition_failed("Interleave step has not run"))?;

        let exporter = Exporter::new(
            ctx.backend.as_ref(),
            &ctx.settings.export,
            ctx.languages(),
        );
        let summary = exporter.export(output, state.sections(), &ctx.output_dir)?;

        ctx.logger.info(&format!(
            "Exported {} clips ({:.1}s, {} mode) to {}",
            summary.clip_count,
            summary.duration_secs,
            summary.mode,
            ctx.output_dir.display()
        ));
        ctx.logger
            .info(&format!("Manifest: {}", summary.manifest_path.display()));

        state.export = Some(summary);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        let summary = state
            .export
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Export not recorded"))?;

        if summary.files.is_empty() {
            return Err(StepError::invalid_output("No files were written"));
        }
        if !summary.manifest_path.exists() {
            return Err(StepError::invalid_output(format!(
                "Manifest missing: {}",
                summary.manifest_path.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportMode;
    use crate::orchestrator::steps::{InterleaveStep, SectionStep, SegmentStep};
    use crate::orchestrator::test_support::TestRun;

    fn interleaved(run: &TestRun) -> RunState {
        let ctx = run.context();
        let mut state = RunState::new("run");
        SegmentStep::new().execute(&ctx, &mut state).unwrap();
        SectionStep::new().execute(&ctx, &mut state).unwrap();
        InterleaveStep::new().execute(&ctx, &mut state).unwrap();
        state
    }

    #[test]
    fn exports_single_file() {
        let run = TestRun::new(&[4.0, 4.0], &[4.0, 4.0]);
        let ctx = run.context();
        let mut state = interleaved(&run);

        ExportStep::new().execute(&ctx, &mut state).unwrap();
        ExportStep::new().validate_output(&ctx, &state).unwrap();

        let summary = state.export.unwrap();
        let path = run.output_dir().join("audio-out.mp3");
        assert_eq!(summary.files, vec![path.clone()]);
        assert_eq!(summary.clip_count, 4);
        assert!(run.backend.get(&path).is_some());
    }

    #[test]
    fn exports_clips() {
        let mut run = TestRun::new(&[4.0, 4.0], &[4.0, 4.0, 4.0]);
        run.settings.export.mode = ExportMode::Clips;
        let ctx = run.context();
        let mut state = interleaved(&run);

        ExportStep::new().execute(&ctx, &mut state).unwrap();

        let summary = state.export.unwrap();
        assert_eq!(summary.files.len(), 5);
        assert!(summary.files[0].ends_with("clips/00000-book-es-0.mp3"));
    }

    #[test]
    fn requires_interleave() {
        let run = TestRun::new(&[4.0], &[4.0]);
        let mut state = RunState::new("run");
        let err = ExportStep::new()
            .execute(&run.context(), &mut state)
            .unwrap_err();
        assert!(matches!(err, StepError::PreconditionFailed(_)));
    }
}
