//! Interleave step - merges both tracks into one playback order.

use crate::models::Track;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, InterleaveOutput, RunState, StepOutcome};
use crate::sync::{interleave_sections, InterleaveConfig};

/// Produces the Output Sequence, section by section when sections exist.
pub struct InterleaveStep;

impl InterleaveStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InterleaveStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for InterleaveStep {
    fn name(&self) -> &str {
        "Interleave"
    }

    fn description(&self) -> &str {
        "Interleave target and base clips by progress"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        let settings = &ctx.settings.interleave;
        if let Some(fudge) = settings.fudge_factor {
            if !fudge.is_finite() || fudge < 0.0 {
                return Err(StepError::invalid_input(format!(
                    "fudge_factor must be a non-negative fraction, got {}",
                    fudge
                )));
            }
        } else if !(settings.fudge_divisor > 0.0) {
            return Err(StepError::invalid_input(format!(
                "fudge_divisor must be positive, got {}",
                settings.fudge_divisor
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let segments = state
            .segmentation
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("Segment step has not run"))?;

        let config = InterleaveConfig::from_settings(&ctx.settings.interleave);
        let sections = state.sections();
        let section_count = sections.map_or(1, |s| s.len());

        let clips = interleave_sections(
            &segments.base,
            &segments.target,
            sections,
            &config,
            ctx.settings.processing.parallel,
        )?;

        let targets = clips.iter().filter(|c| c.track() == Track::Target).count();
        ctx.logger.info(&format!(
            "Interleaved {} clips ({} target, {} base) across {} section(s)",
            clips.len(),
            targets,
            clips.len() - targets,
            section_count
        ));

        state.interleave = Some(InterleaveOutput {
            clips,
            section_count,
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        let expected = state
            .segmentation
            .as_ref()
            .map(|s| s.base.len() + s.target.len())
            .unwrap_or(0);
        let actual = state.output().map_or(0, |o| o.len());

        if actual != expected || actual == 0 {
            return Err(StepError::invalid_output(format!(
                "Expected {} clips in the output sequence, found {}",
                expected, actual
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::steps::{SectionStep, SegmentStep};
    use crate::orchestrator::test_support::TestRun;

    fn prepared(run: &TestRun) -> RunState {
        let ctx = run.context();
        let mut state = RunState::new("run");
        SegmentStep::new().execute(&ctx, &mut state).unwrap();
        SectionStep::new().execute(&ctx, &mut state).unwrap();
        state
    }

    fn order(state: &RunState) -> Vec<(Track, usize)> {
        state
            .output()
            .unwrap()
            .iter()
            .map(|c| (c.track(), c.source_index()))
            .collect()
    }

    #[test]
    fn interleaves_whole_tracks() {
        let run = TestRun::new(&[4.0, 4.0, 4.0], &[4.0, 4.0, 4.0]);
        let ctx = run.context();
        let mut state = prepared(&run);

        InterleaveStep::new().execute(&ctx, &mut state).unwrap();
        InterleaveStep::new().validate_output(&ctx, &state).unwrap();

        let order = order(&state);
        assert_eq!(order.len(), 6);
        assert_eq!(order[0], (Track::Target, 0));
        assert_eq!(state.interleave.as_ref().unwrap().section_count, 1);
    }

    #[test]
    fn sections_keep_clips_inside_their_ranges() {
        let run = TestRun::new(&[4.0; 4], &[4.0; 6]).with_sync_points(&[(0, 2)]);
        let ctx = run.context();
        let mut state = prepared(&run);

        InterleaveStep::new().execute(&ctx, &mut state).unwrap();
        InterleaveStep::new().validate_output(&ctx, &state).unwrap();

        let order = order(&state);
        // First section holds base 0 and target 0..3
        let boundary = order
            .iter()
            .position(|&(track, index)| track == Track::Target && index == 3)
            .unwrap();
        let first: Vec<_> = order[..boundary].to_vec();
        assert_eq!(first.len(), 4);
        assert!(first.contains(&(Track::Base, 0)));
        assert!(!first.contains(&(Track::Base, 1)));
        assert_eq!(state.interleave.as_ref().unwrap().section_count, 2);
    }

    #[test]
    fn sequential_matches_parallel() {
        let mut run = TestRun::new(&[4.0; 4], &[4.0; 5]).with_sync_points(&[(1, 1)]);
        let mut parallel = prepared(&run);
        InterleaveStep::new()
            .execute(&run.context(), &mut parallel)
            .unwrap();

        run.settings.processing.parallel = false;
        let mut sequential = prepared(&run);
        InterleaveStep::new()
            .execute(&run.context(), &mut sequential)
            .unwrap();

        assert_eq!(order(&parallel), order(&sequential));
    }

    #[test]
    fn negative_fudge_is_rejected() {
        let mut run = TestRun::new(&[4.0], &[4.0]);
        run.settings.interleave.fudge_factor = Some(-0.1);
        let err = InterleaveStep::new()
            .validate_input(&run.context())
            .unwrap_err();
        assert!(matches!(err, StepError::InvalidInput(_)));
    }
}
