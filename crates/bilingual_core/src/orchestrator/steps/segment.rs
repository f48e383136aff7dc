//! Segment step - splits both narrations into utterance clips.
//!
//! Reuses the chunk cache when asked to and both tracks are cached;
//! otherwise runs the adaptive segmenter on each track (concurrently when
//! parallel processing is on) and refreshes the cache.

use crate::models::Track;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, SegmentOutput, StepOutcome};
use crate::segmentation::{Segmentation, SegmentResult, Segmenter, SegmenterConfig};
use crate::store::ChunkStore;

/// Segment step producing one Track Sequence per narration.
pub struct SegmentStep;

impl SegmentStep {
    pub fn new() -> Self {
        Self
    }

    fn chunk_store(ctx: &Context) -> ChunkStore {
        ChunkStore::new(&ctx.settings.paths.chunk_cache, &ctx.settings.export.format)
    }

    fn segment_track(ctx: &Context, track: Track) -> SegmentResult<Segmentation> {
        let config = SegmenterConfig::from_settings(&ctx.settings.segmentation, track);
        Segmenter::new(ctx.splitter.as_ref(), config).segment_file(
            ctx.backend.as_ref(),
            ctx.spec.audio_path(track),
            track,
        )
    }

    fn load_cached(ctx: &Context, store: &ChunkStore) -> StepResult<SegmentOutput> {
        let backend = ctx.backend.as_ref();
        let base = store.load(&ctx.label(Track::Base), Track::Base, backend)?;
        let target = store.load(&ctx.label(Track::Target), Track::Target, backend)?;
        Ok(SegmentOutput {
            base,
            target,
            reports: Vec::new(),
            from_cache: true,
        })
    }
}

impl Default for SegmentStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for SegmentStep {
    fn name(&self) -> &str {
        "Segment"
    }

    fn description(&self) -> &str {
        "Split both narrations into utterance clips"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        for track in [Track::Base, Track::Target] {
            if ctx.spec.audio_path(track).as_os_str().is_empty() {
                return Err(StepError::invalid_input(format!(
                    "No {} narration given",
                    track
                )));
            }
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let store = Self::chunk_store(ctx);
        let backend = ctx.backend.as_ref();
        let base_label = ctx.label(Track::Base);
        let target_label = ctx.label(Track::Target);

        if ctx.settings.processing.reuse_chunks
            && store.has(&base_label, backend)
            && store.has(&target_label, backend)
        {
            ctx.logger.info(&format!(
                "Reusing cached clips from {}",
                store.root().display()
            ));
            let output = Self::load_cached(ctx, &store)?;
            ctx.logger.info(&format!(
                "Loaded {} base and {} target clips",
                output.base.len(),
                output.target.len()
            ));
            state.segmentation = Some(output);
            return Ok(StepOutcome::Success);
        }

        for track in [Track::Base, Track::Target] {
            let path = ctx.spec.audio_path(track);
            match backend.duration(path) {
                Ok(secs) => ctx.logger.info(&format!(
                    "Segmenting {} narration {} ({:.1}s)",
                    track,
                    path.display(),
                    secs
                )),
                Err(e) => ctx.logger.debug(&format!(
                    "No duration for {}: {}",
                    path.display(),
                    e
                )),
            }
        }

        let (base, target) = if ctx.settings.processing.parallel {
            rayon::join(
                || Self::segment_track(ctx, Track::Base),
                || Self::segment_track(ctx, Track::Target),
            )
        } else {
            (
                Self::segment_track(ctx, Track::Base),
                Self::segment_track(ctx, Track::Target),
            )
        };
        let (base, target) = (base?, target?);

        for segmentation in [&base, &target] {
            let report = &segmentation.report;
            let line = format!(
                "{}: {} clips, threshold {:.1} dB, {} attempt(s), average {:.2}s, {} discarded",
                report.track,
                segmentation.sequence.len(),
                report.threshold_db,
                report.attempts,
                report.average_secs,
                report.discarded
            );
            if report.converged {
                ctx.logger.info(&line);
            } else {
                ctx.logger
                    .warn(&format!("{} (clip length outside target band)", line));
            }
        }

        if ctx.settings.processing.reuse_chunks {
            store.save(&base.sequence, &base_label, backend)?;
            store.save(&target.sequence, &target_label, backend)?;
            ctx.logger
                .info(&format!("Cached clips in {}", store.root().display()));
        }

        state.segmentation = Some(SegmentOutput {
            base: base.sequence,
            target: target.sequence,
            reports: vec![base.report, target.report],
            from_cache: false,
        });

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        let output = state
            .segmentation
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Segmentation not recorded"))?;

        for track in [Track::Base, Track::Target] {
            if output.sequence(track).is_empty() {
                return Err(StepError::invalid_output(format!(
                    "The {} track has no clips",
                    track
                )));
            }
        }
        Ok(())
    }
}
