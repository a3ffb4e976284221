// Playback module
// Mode dispatch, blocking wait and post-playback cleanup

pub mod cleanup;
pub mod engine;

pub use cleanup::{cleanup_after_playback, CleanupOutcome, FileRemover, FsRemover};
pub use engine::{PlaybackEngine, PlaybackMode, PlaybackOutcome, PlaybackRequest, Sleeper, ThreadSleeper};
