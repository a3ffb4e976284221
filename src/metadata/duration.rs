// Playback duration from container metadata
// WAV is measured from the sample container, MP3 from its header
use id3::TagLike;
use lofty::error::LoftyError;
use lofty::prelude::AudioFile;
use lofty::probe::Probe;
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::error::{PlaybackError, Result};

/// Containers whose duration can be resolved without decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Wav,
    Mp3,
}

impl ContainerKind {
    /// Detect the container from the file extension, case-insensitively
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        match extension.as_deref() {
            Some("wav") => Ok(Self::Wav),
            Some("mp3") => Ok(Self::Mp3),
            Some(other) => Err(PlaybackError::UnsupportedFormat(format!(".{}", other))),
            None => Err(PlaybackError::UnsupportedFormat(format!(
                "{:?} has no extension",
                path
            ))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
        }
    }
}

/// Resolve the playback duration of `path` in seconds
pub fn resolve_duration(path: &Path) -> Result<f64> {
    let kind = ContainerKind::from_path(path)?;
    duration_for_kind(path, kind)
}

/// Resolve the duration once the container kind is already known
pub fn duration_for_kind(path: &Path, kind: ContainerKind) -> Result<f64> {
    let seconds = match kind {
        ContainerKind::Wav => wav_duration(path)?,
        ContainerKind::Mp3 => mp3_duration(path)?,
    };
    debug!(?path, seconds, "Resolved playback duration");
    Ok(seconds)
}

/// frames / sample rate, read from the WAV header.
/// The reader is dropped before returning so the file is not held open
/// while the subsystem plays it.
fn wav_duration(path: &Path) -> Result<f64> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    hint.with_extension(ContainerKind::Wav.extension());

    let detected = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| PlaybackError::Metadata(format!("Failed to open WAV file: {}", e)))?;

    let format = detected.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| PlaybackError::Metadata("No audio track found".to_string()))?;

    let frames = track
        .codec_params
        .n_frames
        .ok_or_else(|| PlaybackError::Metadata("WAV header has no frame count".to_string()))?;
    let sample_rate = track
        .codec_params
        .sample_rate
        .filter(|&rate| rate > 0)
        .ok_or_else(|| PlaybackError::Metadata("WAV header has no sample rate".to_string()))?;

    let seconds = frames as f64 / sample_rate as f64;
    drop(format);
    Ok(seconds)
}

/// Header-declared duration, no decoding.
/// Falls back to the ID3 TLEN frame when lofty cannot read the stream.
fn mp3_duration(path: &Path) -> Result<f64> {
    match lofty_duration(path) {
        Ok(duration) => Ok(duration.as_secs_f64()),
        Err(e) => {
            debug!(?path, error = %e, "lofty could not read MP3, trying ID3 TLEN");
            id3_declared_duration(path)?.ok_or_else(|| {
                PlaybackError::Metadata(format!("Failed to read MP3 duration: {}", e))
            })
        }
    }
}

fn lofty_duration(path: &Path) -> std::result::Result<Duration, LoftyError> {
    let tagged_file = Probe::open(path)?.guess_file_type()?.read()?;
    Ok(tagged_file.properties().duration())
}

/// TLEN is stored in milliseconds
fn id3_declared_duration(path: &Path) -> Result<Option<f64>> {
    match id3::Tag::read_from_path(path) {
        Ok(tag) => Ok(tag.duration().map(|ms| ms as f64 / 1000.0)),
        Err(e) if matches!(e.kind, id3::ErrorKind::NoTag) => Ok(None),
        Err(e) => Err(PlaybackError::Metadata(format!("Failed to read ID3 tag: {}", e))),
    }
}
