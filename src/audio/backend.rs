// Audio subsystem seam
// The mixer/output library is a process-wide resource; it is owned through
// an explicit handle so init and teardown are serialized by one lock.
use parking_lot::{Mutex, MutexGuard};
use std::path::Path;
use std::sync::Arc;

use super::devices::AudioDevice;
use crate::error::Result;

/// Operations the engine needs from the underlying audio library
pub trait AudioBackend {
    /// Output device names in the order the host reports them
    fn output_device_names(&self) -> Result<Vec<String>>;

    /// Input device names, used only for diagnostics
    fn input_device_names(&self) -> Result<Vec<String>>;

    /// Target `device` on the next `init`. Has no effect on an output that
    /// is already open.
    fn configure_device(&mut self, device: &AudioDevice);

    /// Open the output. Calling it again while open is a no-op.
    fn init(&mut self) -> Result<()>;

    fn is_initialized(&self) -> bool;

    /// Load `path` into the single exclusive channel, replacing whatever
    /// was playing there
    fn play_stream(&mut self, path: &Path) -> Result<()>;

    /// Decode `path` into an independent voice mixed with everything else
    fn play_overlap(&mut self, path: &Path) -> Result<()>;

    fn stop_stream(&mut self);

    /// Close the output entirely, releasing every file it holds
    fn shutdown(&mut self);
}

/// Shared, lock-serialized handle to one audio backend
pub struct AudioSubsystem<B> {
    inner: Arc<Mutex<B>>,
}

impl<B: AudioBackend> AudioSubsystem<B> {
    pub fn new(backend: B) -> Self {
        Self {
            inner: Arc::new(Mutex::new(backend)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, B> {
        self.inner.lock()
    }
}

impl<B> Clone for AudioSubsystem<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::error::PlaybackError;
    use std::path::PathBuf;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Configure(String),
        Init,
        PlayStream(PathBuf),
        PlayOverlap(PathBuf),
        StopStream,
        Shutdown,
    }

    /// Records every call; never touches hardware
    #[derive(Debug, Default)]
    pub struct MockBackend {
        pub outputs: Option<Vec<String>>,
        pub inputs: Option<Vec<String>>,
        pub fail_play: bool,
        pub calls: Vec<Call>,
        pub opens: usize,
        initialized: bool,
        streaming: Option<PathBuf>,
    }

    impl MockBackend {
        pub fn with_outputs(names: &[&str]) -> Self {
            Self {
                outputs: Some(names.iter().map(|s| s.to_string()).collect()),
                inputs: Some(vec!["Built-in Microphone".to_string()]),
                ..Default::default()
            }
        }

        pub fn streaming(&self) -> Option<&PathBuf> {
            self.streaming.as_ref()
        }
    }

    impl AudioBackend for MockBackend {
        fn output_device_names(&self) -> Result<Vec<String>> {
            self.outputs
                .clone()
                .ok_or_else(|| PlaybackError::EnumerationUnavailable("mock".to_string()))
        }

        fn input_device_names(&self) -> Result<Vec<String>> {
            self.inputs
                .clone()
                .ok_or_else(|| PlaybackError::EnumerationUnavailable("mock".to_string()))
        }

        fn configure_device(&mut self, device: &AudioDevice) {
            self.calls.push(Call::Configure(device.name().to_string()));
        }

        fn init(&mut self) -> Result<()> {
            self.calls.push(Call::Init);
            if !self.initialized {
                self.initialized = true;
                self.opens += 1;
            }
            Ok(())
        }

        fn is_initialized(&self) -> bool {
            self.initialized
        }

        fn play_stream(&mut self, path: &Path) -> Result<()> {
            if self.fail_play {
                return Err(PlaybackError::Decode("mock refused".to_string()));
            }
            self.calls.push(Call::PlayStream(path.to_path_buf()));
            self.streaming = Some(path.to_path_buf());
            Ok(())
        }

        fn play_overlap(&mut self, path: &Path) -> Result<()> {
            if self.fail_play {
                return Err(PlaybackError::Decode("mock refused".to_string()));
            }
            self.calls.push(Call::PlayOverlap(path.to_path_buf()));
            Ok(())
        }

        fn stop_stream(&mut self) {
            self.calls.push(Call::StopStream);
            self.streaming = None;
        }

        fn shutdown(&mut self) {
            self.calls.push(Call::Shutdown);
            self.initialized = false;
            self.streaming = None;
        }
    }
}
