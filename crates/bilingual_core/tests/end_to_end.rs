//! Whole runs against the in-memory backend.

use std::fs;
use std::sync::Arc;

use bilingual_core::audio::{AudioData, MemoryBackend, RmsSilenceSplitter};
use bilingual_core::config::Settings;
use bilingual_core::export::{ExportMode, RunManifest};
use bilingual_core::models::{Track, TrackSequence};
use bilingual_core::orchestrator::{RunProcessor, RunSpec};
use bilingual_core::store::load_track_sequence;
use bilingual_core::sync::parse_sync_points;
use tempfile::TempDir;

const RATE: u32 = 1000;

fn narration(utterances: &[f64]) -> AudioData {
    let mut samples = vec![0.0; RATE as usize / 2];
    for &secs in utterances {
        let count = (secs * RATE as f64) as usize;
        samples.extend((0..count).map(|i| if i % 2 == 0 { 0.4 } else { -0.4 }));
        samples.extend(std::iter::repeat(0.0).take(3 * RATE as usize / 2));
    }
    AudioData::new(samples, RATE)
}

struct Fixture {
    dir: TempDir,
    backend: Arc<MemoryBackend>,
    settings: Settings,
}

impl Fixture {
    fn new(base: &[f64], target: &[f64]) -> Self {
        let dir = TempDir::new().unwrap();
        let backend = Arc::new(MemoryBackend::new(RATE));
        backend.insert("/in/en.mp3", narration(base));
        backend.insert("/in/es.mp3", narration(target));

        let mut settings = Settings::default();
        settings.languages.title = "El Principito".to_string();
        settings.paths.logs_folder = dir.path().join("logs").display().to_string();
        settings.paths.chunk_cache = dir.path().join("chunks").display().to_string();

        Self {
            dir,
            backend,
            settings,
        }
    }

    fn processor(&self) -> RunProcessor {
        RunProcessor::new(
            self.settings.clone(),
            self.backend.clone(),
            Arc::new(RmsSilenceSplitter::new()),
        )
    }
}

fn assert_each_clip_once_in_order(order: &[(Track, usize)], base_len: usize, target_len: usize) {
    for (track, len) in [(Track::Base, base_len), (Track::Target, target_len)] {
        let indices: Vec<usize> = order
            .iter()
            .filter(|(t, _)| *t == track)
            .map(|&(_, i)| i)
            .collect();
        assert_eq!(indices, (0..len).collect::<Vec<_>>(), "{} track", track);
    }
}

#[test]
fn sectioned_run_emits_every_clip_once() {
    let fixture = Fixture::new(&[4.0; 6], &[3.0; 9]);
    let sync_points = parse_sync_points(&["1:2", "3:5"]).unwrap();
    let spec = RunSpec::new("/in/en.mp3", "/in/es.mp3").with_sync_points(sync_points);
    let out = fixture.dir.path().join("out");

    let report = fixture
        .processor()
        .process_named("sectioned", &spec, &out)
        .unwrap();

    let order: Vec<(Track, usize)> = report
        .state
        .output()
        .unwrap()
        .iter()
        .map(|c| (c.track(), c.source_index()))
        .collect();
    assert_eq!(order.len(), 15);
    assert_each_clip_once_in_order(&order, 6, 9);

    // Every section opens with its first target clip
    assert_eq!(order[0], (Track::Target, 0));
    assert!(order.contains(&(Track::Target, 3)));
    let at = |clip| order.iter().position(|&c| c == clip).unwrap();
    assert!(at((Track::Base, 1)) < at((Track::Target, 3)));
    assert!(at((Track::Base, 3)) < at((Track::Target, 6)));

    let manifest: RunManifest =
        serde_json::from_str(&fs::read_to_string(report.manifest_path.unwrap()).unwrap()).unwrap();
    assert_eq!(manifest.sections.map(|s| s.len()), Some(3));
    assert_eq!(manifest.entries.len(), 15);
}

#[test]
fn clips_export_reloads_as_track_sequences() {
    let mut fixture = Fixture::new(&[4.0, 5.0, 4.0], &[3.5, 3.5, 4.0, 4.5]);
    fixture.settings.export.mode = ExportMode::Clips;
    let spec = RunSpec::new("/in/en.mp3", "/in/es.mp3");
    let out = fixture.dir.path().join("out");

    let report = fixture
        .processor()
        .process_named("clips", &spec, &out)
        .unwrap();
    assert_eq!(report.output_files.len(), 7);

    let clips_dir = out.join("clips");
    let base: TrackSequence =
        load_track_sequence(&clips_dir, "el-principito-en", Track::Base, fixture.backend.as_ref())
            .unwrap();
    let target =
        load_track_sequence(&clips_dir, "el-principito-es", Track::Target, fixture.backend.as_ref())
            .unwrap();
    assert_eq!(base.len(), 3);
    assert_eq!(target.len(), 4);

    let written = report.state.output().unwrap();
    let first_target = written.iter().find(|c| c.track() == Track::Target).unwrap();
    assert_eq!(target.clips()[0].audio(), first_target.audio());
}

#[test]
fn cached_chunks_survive_missing_inputs() {
    let mut fixture = Fixture::new(&[4.0, 4.0], &[4.0, 4.0, 4.0]);
    fixture.settings.processing.reuse_chunks = true;
    let out = fixture.dir.path().join("out");

    let spec = RunSpec::new("/in/en.mp3", "/in/es.mp3");
    let first = fixture
        .processor()
        .process_named("first", &spec, &out)
        .unwrap();

    let moved = RunSpec::new("/gone/en.mp3", "/gone/es.mp3");
    let second = fixture
        .processor()
        .process_named("second", &moved, &out)
        .unwrap();

    let order = |report: &bilingual_core::orchestrator::RunReport| -> Vec<(Track, usize)> {
        report
            .state
            .output()
            .unwrap()
            .iter()
            .map(|c| (c.track(), c.source_index()))
            .collect()
    };
    assert_eq!(order(&first), order(&second));
    assert!(second.state.segmentation.unwrap().from_cache);
}
