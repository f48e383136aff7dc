//! Bilingual Core - interleaving two narrations of the same text.
//!
//! Splits a base-language and a target-language narration into utterance
//! clips, pairs them up by relative progress (optionally within
//! sync-point sections), and exports the interleaved playback order.
//!
//! This crate has no CLI dependencies; `bilingual_cli` is a thin front end.

pub mod audio;
pub mod config;
pub mod export;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod segmentation;
pub mod store;
pub mod sync;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
