// Audio decoder using Symphonia
// Decodes whole files to interleaved f32 for one-shot voices

use symphonia::core::audio::{AudioBufferRef, AudioPlanes, Signal};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use std::fs::File;
use std::path::Path;
use tracing::warn;

use crate::error::{PlaybackError, Result};

/// A fully decoded file held in memory
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedAudio {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }
}

pub struct AudioDecoder {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: usize,
}

impl AudioDecoder {
    /// Open an audio file and prepare for decoding
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let detected = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| PlaybackError::Decode(format!("Failed to detect file format: {}", e)))?;

        let format = detected.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| PlaybackError::Decode("No audio track found".to_string()))?;

        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
        let channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(2);

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| PlaybackError::Decode(format!("Failed to create decoder: {}", e)))?;

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_rate,
            channels,
        })
    }

    /// Decode next packet, returns interleaved f32 samples
    /// Returns None when end of stream is reached
    pub fn decode_next(&mut self) -> Result<Option<Vec<f32>>> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(e) => {
                    return Err(PlaybackError::Decode(format!("Failed to read packet: {}", e)))
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    return Ok(Some(Self::audio_buf_to_f32(&decoded)));
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!(error = %e, "Decode error, skipping packet");
                    continue;
                }
                Err(e) => return Err(PlaybackError::Decode(format!("Decode failed: {}", e))),
            }
        }
    }

    /// Decode every remaining packet into one buffer
    pub fn decode_to_end(mut self) -> Result<DecodedAudio> {
        let mut samples = Vec::new();
        while let Some(chunk) = self.decode_next()? {
            samples.extend_from_slice(&chunk);
        }

        let channels = u16::try_from(self.channels)
            .map_err(|_| PlaybackError::Decode(format!("Too many channels: {}", self.channels)))?;

        Ok(DecodedAudio {
            samples,
            sample_rate: self.sample_rate,
            channels,
        })
    }

    /// Convert any AudioBufferRef to interleaved f32 samples
    fn audio_buf_to_f32(buf: &AudioBufferRef) -> Vec<f32> {
        match buf {
            AudioBufferRef::F32(b) => Self::interleave_convert(b.planes(), b.frames(), |s: f32| s),
            AudioBufferRef::F64(b) => {
                Self::interleave_convert(b.planes(), b.frames(), |s: f64| s as f32)
            }
            AudioBufferRef::S8(b) => {
                let scale = 1.0 / 128.0;
                Self::interleave_convert(b.planes(), b.frames(), |s: i8| s as f32 * scale)
            }
            AudioBufferRef::S16(b) => {
                let scale = 1.0 / 32768.0;
                Self::interleave_convert(b.planes(), b.frames(), |s: i16| s as f32 * scale)
            }
            AudioBufferRef::S24(b) => {
                let scale = 1.0 / 8388608.0;
                Self::interleave_convert(b.planes(), b.frames(), |s| s.inner() as f32 * scale)
            }
            AudioBufferRef::S32(b) => {
                let scale = 1.0 / 2147483648.0;
                Self::interleave_convert(b.planes(), b.frames(), |s: i32| s as f32 * scale)
            }
            AudioBufferRef::U8(b) => {
                Self::interleave_convert(b.planes(), b.frames(), |s: u8| (s as f32 - 128.0) / 128.0)
            }
            AudioBufferRef::U16(b) => Self::interleave_convert(b.planes(), b.frames(), |s: u16| {
                (s as f32 - 32768.0) / 32768.0
            }),
            AudioBufferRef::U24(b) => Self::interleave_convert(b.planes(), b.frames(), |s| {
                (s.inner() as f32 - 8388608.0) / 8388608.0
            }),
            AudioBufferRef::U32(b) => Self::interleave_convert(b.planes(), b.frames(), |s: u32| {
                (s as f64 - 2147483648.0) as f32 / 2147483648.0
            }),
        }
    }

    fn interleave_convert<T: Sample + Copy, F: Fn(T) -> f32>(
        planes: AudioPlanes<T>,
        frames: usize,
        convert: F,
    ) -> Vec<f32> {
        let num_channels = planes.planes().len();
        if num_channels == 0 || frames == 0 {
            return vec![];
        }

        let mut interleaved = Vec::with_capacity(frames * num_channels);

        for frame in 0..frames {
            for ch in 0..num_channels {
                interleaved.push(convert(planes.planes()[ch][frame]));
            }
        }

        interleaved
    }
}

/// Decode `path` completely
pub fn decode_file(path: &Path) -> Result<DecodedAudio> {
    AudioDecoder::open(path)?.decode_to_end()
}
