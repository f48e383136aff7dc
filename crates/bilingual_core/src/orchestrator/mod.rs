//! Pipeline orchestrator for interleaving runs.
//!
//! This module provides the infrastructure for running multi-step
//! processing pipelines. Each run consists of a sequence of steps
//! that validate, execute, and record their results.
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: Segment     (narrations -> Track Sequences)
//!     ├── Step: Section     (sync points -> Sections)
//!     ├── Step: Interleave  (Track Sequences -> Output Sequence)
//!     └── Step: Export      (Output Sequence -> media + manifest)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use bilingual_core::orchestrator::{create_standard_pipeline, Context, RunState};
//!
//! let pipeline = create_standard_pipeline();
//! let ctx = Context::new(spec, settings, "my_run", output_dir, backend, splitter, logger);
//! let mut state = RunState::new("run-123");
//!
//! let result = pipeline.run(&ctx, &mut state)?;
//! println!("Completed: {:?}", result.steps_completed);
//! ```

mod errors;
mod pipeline;
mod run_processor;
mod step;
pub mod steps;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use run_processor::{RunProcessor, RunReport};
pub use step::PipelineStep;
pub use steps::{ExportStep, InterleaveStep, SectionStep, SegmentStep};
pub use types::{
    Context, InterleaveOutput, RunSpec, RunState, SectionOutput, SegmentOutput, StepOutcome,
};

/// Create a standard pipeline with all steps in the correct order.
///
/// 1. Segment - split both narrations into clips (or load them from the cache)
/// 2. Section - partition clips at the sync points
/// 3. Interleave - merge target and base clips by progress
/// 4. Export - encode the output and write the manifest
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(SegmentStep::new())
        .with_step(SectionStep::new())
        .with_step(InterleaveStep::new())
        .with_step(ExportStep::new())
}
