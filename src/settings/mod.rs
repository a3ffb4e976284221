// Settings module
// Persisted device preference and per-call defaults

pub mod settings;

pub use settings::{OutputSettings, PlaybackDefaults, PlayerSettings};
