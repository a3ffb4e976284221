// Post-playback teardown
// The output may still hold the file open, so the whole subsystem is shut
// down before the delete is attempted.
use std::io;
use std::path::Path;
use tracing::{info, warn};

use crate::audio::backend::{AudioBackend, AudioSubsystem};
use crate::error::Result;

/// Filesystem delete used after playback
pub trait FileRemover: Send + Sync {
    fn remove(&self, path: &Path) -> io::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FsRemover;

impl FileRemover for FsRemover {
    fn remove(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupOutcome {
    Deleted,
    /// Delete refused because something still holds the file; it was kept
    FileLocked,
}

/// Whether `err` means the file is held open or otherwise not removable
/// right now, as opposed to missing or broken.
pub fn is_locked(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::PermissionDenied || err.raw_os_error().map_or(false, is_lock_code)
}

#[cfg(windows)]
mod lock_codes {
    pub const ERROR_SHARING_VIOLATION: i32 = 32;
    pub const ERROR_LOCK_VIOLATION: i32 = 33;
}

#[cfg(unix)]
mod lock_codes {
    pub const EBUSY: i32 = 16;
    pub const ETXTBSY: i32 = 26;
}

#[cfg(windows)]
fn is_lock_code(code: i32) -> bool {
    use lock_codes::*;
    matches!(code, ERROR_SHARING_VIOLATION | ERROR_LOCK_VIOLATION)
}

#[cfg(unix)]
fn is_lock_code(code: i32) -> bool {
    use lock_codes::*;
    matches!(code, EBUSY | ETXTBSY)
}

#[cfg(not(any(windows, unix)))]
fn is_lock_code(_code: i32) -> bool {
    false
}

/// Stop playback, shut the subsystem down and delete `path`.
///
/// Every playback on `subsystem` stops, not just the one that used `path`.
pub fn cleanup_after_playback<B: AudioBackend>(
    subsystem: &AudioSubsystem<B>,
    remover: &dyn FileRemover,
    path: &Path,
) -> Result<CleanupOutcome> {
    {
        let mut backend = subsystem.lock();
        backend.stop_stream();
        backend.shutdown();
    }

    match remover.remove(path) {
        Ok(()) => {
            info!(?path, "Deleted the audio file");
            Ok(CleanupOutcome::Deleted)
        }
        Err(e) if is_locked(&e) => {
            warn!(?path, error = %e, "Couldn't remove file, it is being used by another process");
            Ok(CleanupOutcome::FileLocked)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::backend::testing::{Call, MockBackend};
    use crate::error::PlaybackError;

    struct Refuse(io::ErrorKind);

    impl FileRemover for Refuse {
        fn remove(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::from(self.0))
        }
    }

    #[test]
    fn test_shutdown_precedes_delete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        std::fs::write(&path, b"RIFF").unwrap();

        let subsystem = AudioSubsystem::new(MockBackend::default());
        subsystem.lock().init().unwrap();

        let outcome = cleanup_after_playback(&subsystem, &FsRemover, &path).unwrap();
        assert_eq!(outcome, CleanupOutcome::Deleted);
        assert!(!path.exists());

        let backend = subsystem.lock();
        assert_eq!(backend.calls[1..], [Call::StopStream, Call::Shutdown]);
        assert!(!backend.is_initialized());
    }

    #[test]
    fn test_locked_file_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        std::fs::write(&path, b"RIFF").unwrap();

        let subsystem = AudioSubsystem::new(MockBackend::default());
        let remover = Refuse(io::ErrorKind::PermissionDenied);

        let outcome = cleanup_after_playback(&subsystem, &remover, &path).unwrap();
        assert_eq!(outcome, CleanupOutcome::FileLocked);
        assert!(path.exists());
        assert!(subsystem.lock().calls.contains(&Call::Shutdown));
    }

    #[test]
    fn test_other_io_errors_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.wav");

        let subsystem = AudioSubsystem::new(MockBackend::default());
        let err = cleanup_after_playback(&subsystem, &FsRemover, &path).unwrap_err();
        assert!(matches!(err, PlaybackError::Io(ref e) if e.kind() == io::ErrorKind::NotFound));
    }

    #[test]
    fn test_is_locked_classification() {
        assert!(is_locked(&io::Error::from(io::ErrorKind::PermissionDenied)));
        assert!(!is_locked(&io::Error::from(io::ErrorKind::NotFound)));
    }

    #[cfg(unix)]
    #[test]
    fn test_busy_unix_errors_count_as_locked() {
        assert!(is_locked(&io::Error::from_raw_os_error(lock_codes::EBUSY)));
        assert!(is_locked(&io::Error::from_raw_os_error(lock_codes::ETXTBSY)));
        // ENOENT
        assert!(!is_locked(&io::Error::from_raw_os_error(2)));
    }

    #[cfg(windows)]
    #[test]
    fn test_sharing_violations_count_as_locked() {
        assert!(is_locked(&io::Error::from_raw_os_error(
            lock_codes::ERROR_SHARING_VIOLATION
        )));
        assert!(is_locked(&io::Error::from_raw_os_error(lock_codes::ERROR_LOCK_VIOLATION)));
    }
}
