//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::audio::DEFAULT_SAMPLE_RATE;
use crate::export::ExportMode;
use crate::logging::LogLevel;
use crate::models::LanguagePair;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Language names, codes and title.
    #[serde(default)]
    pub languages: LanguagePair,

    /// Clip segmentation.
    #[serde(default)]
    pub segmentation: SegmentationSettings,

    /// Interleaving.
    #[serde(default)]
    pub interleave: InterleaveSettings,

    /// Output encoding.
    #[serde(default)]
    pub export: ExportSettings,

    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Execution options.
    #[serde(default)]
    pub processing: ProcessingSettings,
}

/// Segmentation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationSettings {
    /// Lower bound of the target average clip duration (seconds).
    #[serde(default = "default_min_chunk_secs")]
    pub min_chunk_secs: f64,

    /// Upper bound of the target average clip duration (seconds).
    #[serde(default = "default_max_chunk_secs")]
    pub max_chunk_secs: f64,

    /// Silence threshold for the first split (dBFS).
    #[serde(default = "default_initial_threshold_db")]
    pub initial_threshold_db: f64,

    /// Threshold adjustment per attempt (dB).
    #[serde(default = "default_threshold_step_db")]
    pub threshold_step_db: f64,

    /// Split attempts before keeping the last result.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Minimum silence that separates two clips (ms).
    #[serde(default = "default_silence_ms")]
    pub min_silence_ms: u32,

    /// Silence kept at each clip boundary (ms).
    #[serde(default = "default_silence_ms")]
    pub keep_silence_ms: u32,

    /// Leading base clips to drop.
    #[serde(default)]
    pub base_discard: usize,

    /// Leading target clips to drop.
    #[serde(default)]
    pub target_discard: usize,

    /// Decode sample rate (Hz). Memory grows linearly with it: each track
    /// is held in full as f64 samples (8 bytes per sample), plus a second
    /// copy while clips are sliced and while the single-file export is
    /// concatenated. At 44.1 kHz a 30 minute narration takes about 635 MB.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_min_chunk_secs() -> f64 {
    3.0
}

fn default_max_chunk_secs() -> f64 {
    12.0
}

fn default_initial_threshold_db() -> f64 {
    -46.0
}

fn default_threshold_step_db() -> f64 {
    2.0
}

fn default_max_attempts() -> u32 {
    20
}

fn default_silence_ms() -> u32 {
    900
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

impl Default for SegmentationSettings {
    fn default() -> Self {
        Self {
            min_chunk_secs: default_min_chunk_secs(),
            max_chunk_secs: default_max_chunk_secs(),
            initial_threshold_db: default_initial_threshold_db(),
            threshold_step_db: default_threshold_step_db(),
            max_attempts: default_max_attempts(),
            min_silence_ms: default_silence_ms(),
            keep_silence_ms: default_silence_ms(),
            base_discard: 0,
            target_discard: 0,
            sample_rate: default_sample_rate(),
        }
    }
}

/// Interleaving configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterleaveSettings {
    /// Fudge factor = average target clip / (target total * divisor).
    #[serde(default = "default_fudge_divisor")]
    pub fudge_divisor: f64,

    /// Fixed fudge factor; replaces the divisor formula when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fudge_factor: Option<f64>,
}

fn default_fudge_divisor() -> f64 {
    2.0
}

impl Default for InterleaveSettings {
    fn default() -> Self {
        Self {
            fudge_divisor: default_fudge_divisor(),
            fudge_factor: None,
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// One combined file, or one file per clip.
    #[serde(default)]
    pub mode: ExportMode,

    /// Container/codec extension passed to the encoder.
    #[serde(default = "default_format")]
    pub format: String,

    /// File stem of the combined output; also its title tag.
    #[serde(default = "default_output_name")]
    pub output_name: String,

    /// Artist tag.
    #[serde(default = "default_artist")]
    pub artist: String,

    /// Silence appended to the combined output (ms).
    #[serde(default = "default_trailing_silence_ms")]
    pub trailing_silence_ms: u32,
}

fn default_format() -> String {
    "mp3".to_string()
}

fn default_output_name() -> String {
    "audio-out".to_string()
}

fn default_artist() -> String {
    "bv".to_string()
}

fn default_trailing_silence_ms() -> u32 {
    3000
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            mode: ExportMode::default(),
            format: default_format(),
            output_name: default_output_name(),
            artist: default_artist(),
            trailing_silence_ms: default_trailing_silence_ms(),
        }
    }
}

/// Path configuration for output, chunk cache, and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Default output folder when none is given on the command line.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Root folder for cached clips.
    #[serde(default = "default_chunk_cache")]
    pub chunk_cache: String,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_output_folder() -> String {
    "bilingual_output".to_string()
}

fn default_chunk_cache() -> String {
    ".chunks".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            chunk_cache: default_chunk_cache(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default level when RUST_LOG is unset.
    #[serde(default)]
    pub level: LogLevel,

    /// Use compact log format.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of error lines to show in tail.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
        }
    }
}

/// Execution options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingSettings {
    /// Segment both tracks and interleave sections on worker threads.
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Load clips from the chunk cache instead of re-segmenting.
    #[serde(default)]
    pub reuse_chunks: bool,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            parallel: true,
            reuse_chunks: false,
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Languages,
    Segmentation,
    Interleave,
    Export,
    Paths,
    Logging,
    Processing,
}

impl ConfigSection {
    /// Every section, in file order.
    pub const ALL: [ConfigSection; 7] = [
        ConfigSection::Languages,
        ConfigSection::Segmentation,
        ConfigSection::Interleave,
        ConfigSection::Export,
        ConfigSection::Paths,
        ConfigSection::Logging,
        ConfigSection::Processing,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Languages => "languages",
            ConfigSection::Segmentation => "segmentation",
            ConfigSection::Interleave => "interleave",
            ConfigSection::Export => "export",
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Processing => "processing",
        }
    }

    /// Comment line written above the table.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Languages => "# Languages of the two narrations",
            ConfigSection::Segmentation => "# Silence-based clip segmentation",
            ConfigSection::Interleave => "# Interleaving of target and base clips",
            ConfigSection::Export => "# Output encoding and tags",
            ConfigSection::Paths => "# Output, cache and log directories",
            ConfigSection::Logging => "# Logging configuration",
            ConfigSection::Processing => "# Execution options",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[languages]"));
        assert!(toml.contains("[segmentation]"));
        assert!(toml.contains("output_folder"));
        assert!(!toml.contains("fudge_factor"));
    }

    #[test]
    fn settings_round_trip() {
        let mut settings = Settings::default();
        settings.interleave.fudge_factor = Some(0.25);
        settings.export.mode = ExportMode::Clips;

        let toml = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml).unwrap();

        assert_eq!(parsed.paths.output_folder, settings.paths.output_folder);
        assert_eq!(parsed.interleave, settings.interleave);
        assert_eq!(parsed.export.mode, ExportMode::Clips);
        assert_eq!(parsed.languages, settings.languages);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[languages]\ntarget_code = \"FR\"\n[segmentation]\nmax_attempts = 5";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        // Custom values preserved
        assert_eq!(parsed.languages.target_code, "FR");
        assert_eq!(parsed.segmentation.max_attempts, 5);
        // Defaults applied for missing
        assert_eq!(parsed.languages.base_code, "EN");
        assert_eq!(parsed.segmentation.initial_threshold_db, -46.0);
        assert_eq!(parsed.interleave.fudge_divisor, 2.0);
        assert_eq!(parsed.export.trailing_silence_ms, 3000);
        assert!(parsed.logging.compact);
    }

    #[test]
    fn modes_and_levels_are_lowercase() {
        let parsed: Settings =
            toml::from_str("[export]\nmode = \"clips\"\n[logging]\nlevel = \"debug\"").unwrap();
        assert_eq!(parsed.export.mode, ExportMode::Clips);
        assert_eq!(parsed.logging.level, LogLevel::Debug);
    }

    #[test]
    fn every_section_has_a_distinct_table() {
        let mut names: Vec<&str> = ConfigSection::ALL.iter().map(|s| s.table_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ConfigSection::ALL.len());
    }
}
