// Playback engine
// Initializes the output, dispatches to a playback mode, then optionally
// waits for the computed length and cleans up.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::cleanup::{cleanup_after_playback, CleanupOutcome, FileRemover, FsRemover};
use crate::audio::backend::{AudioBackend, AudioSubsystem};
use crate::audio::devices::{self, AudioDevice, DeviceListing, DeviceSelection};
use crate::audio::rodio_backend::RodioBackend;
use crate::error::{PlaybackError, Result};
use crate::metadata::duration::{duration_for_kind, ContainerKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    /// Single exclusive channel. No glitches, one at a time.
    #[default]
    Stream,
    /// Independent one-shot voice. Overlaps freely, long files may glitch.
    Overlap,
}

/// One call to `play`
#[derive(Debug, Clone)]
pub struct PlaybackRequest {
    path: PathBuf,
    container: Option<ContainerKind>,
    pub wait_for_completion: bool,
    pub delete_after_playback: bool,
    pub mode: PlaybackMode,
}

impl PlaybackRequest {
    /// Wait for completion, keep the file, stream mode
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let container = ContainerKind::from_path(&path).ok();
        Self {
            path,
            container,
            wait_for_completion: true,
            delete_after_playback: false,
            mode: PlaybackMode::Stream,
        }
    }

    pub fn wait(mut self, wait: bool) -> Self {
        self.wait_for_completion = wait;
        self
    }

    pub fn delete(mut self, delete: bool) -> Self {
        self.delete_after_playback = delete;
        self
    }

    pub fn mode(mut self, mode: PlaybackMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when the length of this file cannot be resolved
    pub fn container(&self) -> Option<ContainerKind> {
        self.container
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Playback started, the call did not wait
    Started,
    /// Waited for the full length, file kept
    Completed,
    /// Waited, then shut the output down and deleted the file
    Deleted,
    /// Waited and shut down, but the file was locked and is still on disk
    FileRetained(PathBuf),
}

impl PlaybackOutcome {
    /// Treat a retained file as an error
    pub fn ensure_deleted(self) -> Result<Self> {
        match self {
            Self::FileRetained(path) => Err(PlaybackError::FileLocked(path)),
            other => Ok(other),
        }
    }
}

/// Blocks the caller while a file plays
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

pub struct PlaybackEngine<B: AudioBackend> {
    subsystem: AudioSubsystem<B>,
    selection: DeviceSelection,
    sleeper: Box<dyn Sleeper>,
    remover: Box<dyn FileRemover>,
}

impl PlaybackEngine<RodioBackend> {
    /// Engine on the host's real audio output
    pub fn with_default_output(device_name: Option<&str>) -> Self {
        Self::new(AudioSubsystem::new(RodioBackend::new()), device_name)
    }
}

impl<B: AudioBackend> PlaybackEngine<B> {
    /// The device is resolved here, once, and never again for this engine
    pub fn new(subsystem: AudioSubsystem<B>, device_name: Option<&str>) -> Self {
        let selection = DeviceSelection::resolve(&*subsystem.lock(), device_name);
        Self {
            subsystem,
            selection,
            sleeper: Box::new(ThreadSleeper),
            remover: Box::new(FsRemover),
        }
    }

    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn with_remover(mut self, remover: impl FileRemover + 'static) -> Self {
        self.remover = Box::new(remover);
        self
    }

    pub fn selection(&self) -> &DeviceSelection {
        &self.selection
    }

    pub fn resolved_device(&self) -> Option<&AudioDevice> {
        self.selection.resolved()
    }

    pub fn subsystem(&self) -> &AudioSubsystem<B> {
        &self.subsystem
    }

    /// Log every output and input device
    pub fn list_devices(&self) {
        devices::list_devices(&*self.subsystem.lock());
    }

    pub fn device_listing(&self) -> Result<DeviceListing> {
        devices::device_listing(&*self.subsystem.lock())
    }

    /// Play one file.
    ///
    /// Failing to start playback is an error. An unsupported container
    /// only becomes an error at the wait step: the file keeps playing, but
    /// nothing is waited for or deleted.
    pub fn play(&self, request: &PlaybackRequest) -> Result<PlaybackOutcome> {
        let path = request.path();
        info!(?path, mode = ?request.mode, "Playing file");

        self.start(request)?;

        if !request.wait_for_completion {
            return Ok(PlaybackOutcome::Started);
        }

        let Some(kind) = request.container() else {
            warn!(?path, "Cannot wait for playback, unknown file type");
            return Err(PlaybackError::UnsupportedFormat(format!("{:?}", path)));
        };

        let seconds = duration_for_kind(path, kind)?;
        let length = Duration::try_from_secs_f64(seconds)
            .map_err(|e| PlaybackError::Metadata(format!("Invalid duration {}: {}", seconds, e)))?;
        self.sleeper.sleep(length);

        if !request.delete_after_playback {
            return Ok(PlaybackOutcome::Completed);
        }

        match cleanup_after_playback(&self.subsystem, self.remover.as_ref(), path)? {
            CleanupOutcome::Deleted => Ok(PlaybackOutcome::Deleted),
            CleanupOutcome::FileLocked => Ok(PlaybackOutcome::FileRetained(path.to_path_buf())),
        }
    }

    fn start(&self, request: &PlaybackRequest) -> Result<()> {
        let mut backend = self.subsystem.lock();

        if let Some(device) = self.selection.resolved() {
            backend.configure_device(device);
        }
        backend.init()?;

        match request.mode {
            PlaybackMode::Stream => backend.play_stream(request.path()),
            PlaybackMode::Overlap => backend.play_overlap(request.path()),
        }
    }
}
