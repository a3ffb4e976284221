// Error types for the audio output manager
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The host exposes no way to enumerate devices
    #[error("Device enumeration unavailable: {0}")]
    EnumerationUnavailable(String),

    /// No enumerated device matched the requested name
    #[error("No output device matching '{0}'")]
    DeviceNotFound(String),

    /// Duration cannot be computed for this container
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// The file is still held open by the audio subsystem or another process
    #[error("File is locked and could not be removed: {0:?}")]
    FileLocked(PathBuf),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Audio decode error: {0}")]
    Decode(String),

    #[error("Audio output error: {0}")]
    Output(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlaybackError>;
