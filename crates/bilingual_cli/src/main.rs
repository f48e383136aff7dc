//! bilingual-audio - interleave a base and a target narration.
//!
//! Usage:
//!   bilingual-audio en.mp3 es.mp3 out/ --sync-point 4:16 --sync-point 20:61
//!   bilingual-audio en.mp3 es.mp3 --title "El Principito" --save-overrides

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{ArgAction, Parser};

use bilingual_core::audio::{FfmpegBackend, RmsSilenceSplitter};
use bilingual_core::config::{ConfigManager, ConfigSection};
use bilingual_core::export::ExportMode;
use bilingual_core::logging::init_tracing;
use bilingual_core::orchestrator::{RunProcessor, RunSpec};
use bilingual_core::sync::parse_sync_points;

#[derive(Parser, Debug)]
#[command(name = "bilingual-audio")]
#[command(about = "Interleave two narrations of the same text into one bilingual track")]
#[command(version)]
struct Args {
    /// Narration in the language you already know.
    base: PathBuf,

    /// Narration in the language being learned.
    target: PathBuf,

    /// Directory for the exported audio and manifest
    /// (defaults to `[paths] output_folder`).
    outdir: Option<PathBuf>,

    /// Alignment anchor `<baseIndex>:<targetIndex>`; repeat in order.
    #[arg(short = 's', long = "sync-point", value_name = "B:T")]
    sync_points: Vec<String>,

    /// Configuration file (created with defaults if missing).
    #[arg(short, long, default_value = ".config/bilingual.toml")]
    config: PathBuf,

    /// Title used in labels and file names.
    #[arg(short, long)]
    title: Option<String>,

    /// Load cached clips instead of re-segmenting, and cache new ones.
    #[arg(long)]
    reuse_chunks: bool,

    /// Write one file per clip instead of a single combined file.
    #[arg(long)]
    clips: bool,

    /// Fixed progress fudge factor (fraction of total progress).
    #[arg(long, value_name = "F")]
    fudge: Option<f64>,

    /// Process tracks and sections one at a time.
    #[arg(long)]
    sequential: bool,

    /// ffmpeg executable (defaults to the one on PATH).
    #[arg(long, value_name = "PATH")]
    ffmpeg: Option<PathBuf>,

    /// ffprobe executable (defaults to the one on PATH).
    #[arg(long, value_name = "PATH")]
    ffprobe: Option<PathBuf>,

    /// Write the overrides given here back into the config file.
    #[arg(long)]
    save_overrides: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let sync_points = parse_sync_points(&args.sync_points)?;

    let mut config = ConfigManager::new(&args.config);
    config
        .load_or_create()
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;

    let mut overridden = Vec::new();
    {
        let settings = config.settings_mut();
        if let Some(title) = &args.title {
            settings.languages.title = title.clone();
            overridden.push(ConfigSection::Languages);
        }
        if args.reuse_chunks {
            settings.processing.reuse_chunks = true;
            overridden.push(ConfigSection::Processing);
        }
        if args.sequential {
            settings.processing.parallel = false;
            overridden.push(ConfigSection::Processing);
        }
        if args.clips {
            settings.export.mode = ExportMode::Clips;
            overridden.push(ConfigSection::Export);
        }
        if args.fudge.is_some() {
            settings.interleave.fudge_factor = args.fudge;
            overridden.push(ConfigSection::Interleave);
        }
    }
    overridden.dedup();

    let settings = config.settings().clone();
    init_tracing(
        settings.logging.level.raised_by(args.verbose),
        settings.logging.compact,
    );
    tracing::debug!("Using config {}", config.path().display());

    if args.save_overrides {
        for section in &overridden {
            config
                .update_section(*section)
                .with_context(|| format!("Failed to save [{}]", section.table_name()))?;
        }
        tracing::info!(
            "Saved {} section(s) to {}",
            overridden.len(),
            config.path().display()
        );
    }

    config
        .ensure_dirs_exist()
        .context("Failed to create configured directories")?;
    let outdir = args.outdir.unwrap_or_else(|| config.output_folder());

    let mut backend = FfmpegBackend::new(settings.segmentation.sample_rate);
    if let Some(path) = args.ffmpeg {
        backend = backend.with_ffmpeg_path(path);
    }
    if let Some(path) = args.ffprobe {
        backend = backend.with_ffprobe_path(path);
    }
    let backend = Arc::new(backend);
    let splitter = Arc::new(RmsSilenceSplitter::new());
    let processor = RunProcessor::new(settings, backend, splitter);

    let spec = RunSpec::new(&args.base, &args.target).with_sync_points(sync_points);
    let report = processor.process(&spec, &outdir)?;

    for file in &report.output_files {
        println!("{}", file.display());
    }
    if let Some(manifest) = &report.manifest_path {
        tracing::info!("Manifest written to {}", manifest.display());
    }
    tracing::info!(
        "Run '{}' finished ({} steps, {} skipped); log: {}",
        report.run_name,
        report.steps_completed.len(),
        report.steps_skipped.len(),
        report.log_path.display()
    );

    Ok(())
}
