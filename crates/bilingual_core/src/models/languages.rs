//! Language labels for the two narrations.

use serde::{Deserialize, Serialize};

use super::clip::Track;

/// Names and codes for the base and target narrations.
///
/// Immutable for the length of a run; passed to every component that
/// needs to label clips or output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    /// Human-readable base language (e.g. "English").
    #[serde(default = "default_base_lang")]
    pub base_lang: String,

    /// Human-readable target language (e.g. "Spanish").
    #[serde(default = "default_target_lang")]
    pub target_lang: String,

    /// Short base language code (e.g. "EN").
    #[serde(default = "default_base_code")]
    pub base_code: String,

    /// Short target language code (e.g. "ES").
    #[serde(default = "default_target_code")]
    pub target_code: String,

    /// Title of the work, used in labels and file names.
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_base_lang() -> String {
    "English".to_string()
}

fn default_target_lang() -> String {
    "Spanish".to_string()
}

fn default_base_code() -> String {
    "EN".to_string()
}

fn default_target_code() -> String {
    "ES".to_string()
}

fn default_title() -> String {
    "audiobook".to_string()
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self {
            base_lang: default_base_lang(),
            target_lang: default_target_lang(),
            base_code: default_base_code(),
            target_code: default_target_code(),
            title: default_title(),
        }
    }
}

impl LanguagePair {
    pub fn language(&self, track: Track) -> &str {
        match track {
            Track::Base => &self.base_lang,
            Track::Target => &self.target_lang,
        }
    }

    pub fn code(&self, track: Track) -> &str {
        match track {
            Track::Base => &self.base_code,
            Track::Target => &self.target_code,
        }
    }

    /// File-name label for a track: `<title>-<code>`, lowercase, with
    /// anything other than ASCII alphanumerics turned into `-`.
    pub fn label(&self, track: Track) -> String {
        let raw = format!("{}-{}", self.title, self.code(track));
        raw.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect()
    }

    /// Album tag for exported audio.
    pub fn album_tag(&self) -> String {
        format!("output-audio-{}-{}", self.base_code, self.target_code)
    }
}
