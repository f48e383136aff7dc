//! Section step - turns sync points into aligned clip ranges.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, SectionOutput, StepOutcome};
use crate::sync::build_sections;

/// Builds Sections from the run's sync points.
///
/// Without sync points the whole input is one implicit section and the
/// step reports itself skipped.
pub struct SectionStep;

impl SectionStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SectionStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for SectionStep {
    fn name(&self) -> &str {
        "Section"
    }

    fn description(&self) -> &str {
        "Partition clips into aligned sections"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let segments = state
            .segmentation
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("Segment step has not run"))?;

        let sections = build_sections(
            &ctx.spec.sync_points,
            segments.base.len(),
            segments.target.len(),
        )?;

        let outcome = match &sections {
            None => StepOutcome::Skipped("No sync points given".to_string()),
            Some(sections) => {
                ctx.logger.info(&format!(
                    "{} sync point(s) -> {} sections",
                    ctx.spec.sync_points.len(),
                    sections.len()
                ));
                for (index, section) in sections.iter().enumerate() {
                    ctx.logger.section(&format!("#{} {}", index, section));
                }
                StepOutcome::Success
            }
        };

        state.sections = Some(SectionOutput { sections });
        Ok(outcome)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        match state.sections() {
            Some(sections) if sections.iter().all(|s| s.is_valid()) => Ok(()),
            Some(_) => Err(StepError::invalid_output("Empty section produced")),
            None => Err(StepError::invalid_output("Sections not recorded")),
        }
    }
}
