// Audio backend on rodio, with cpal for device enumeration
use cpal::traits::{DeviceTrait, HostTrait};
use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info, warn};

use super::backend::AudioBackend;
use super::decoder::decode_file;
use super::devices::AudioDevice;
use crate::error::{PlaybackError, Result};

struct OpenOutput {
    // Dropping the stream closes the device
    _stream: OutputStream,
    handle: OutputStreamHandle,
    device: Option<AudioDevice>,
}

/// Real output. `OutputStream` is not `Send`, so an instance stays on the
/// thread that created it.
#[derive(Default)]
pub struct RodioBackend {
    target: Option<AudioDevice>,
    output: Option<OpenOutput>,
    music: Option<Sink>,
}

impl RodioBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn open_output(&self) -> Result<OpenOutput> {
        if let Some(target) = &self.target {
            match find_output_device(target) {
                Some(device) => {
                    let (stream, handle) = OutputStream::try_from_device(&device).map_err(|e| {
                        PlaybackError::Output(format!("Failed to open device '{}': {}", target, e))
                    })?;
                    info!(device = %target, "Opened audio output");
                    return Ok(OpenOutput {
                        _stream: stream,
                        handle,
                        device: Some(target.clone()),
                    });
                }
                None => {
                    let missing = PlaybackError::DeviceNotFound(target.name().to_string());
                    warn!(error = %missing, "Falling back to default output");
                }
            }
        }

        let (stream, handle) = OutputStream::try_default().map_err(|e| {
            PlaybackError::Output(format!("Failed to open default audio output: {}", e))
        })?;
        info!("Opened default audio output");
        Ok(OpenOutput {
            _stream: stream,
            handle,
            device: None,
        })
    }

    fn handle(&self) -> Result<&OutputStreamHandle> {
        self.output
            .as_ref()
            .map(|output| &output.handle)
            .ok_or_else(|| PlaybackError::Output("Audio output is not initialized".to_string()))
    }
}

fn find_output_device(target: &AudioDevice) -> Option<cpal::Device> {
    let host = cpal::default_host();
    host.output_devices().ok()?.find(|device| {
        device
            .name()
            .map(|name| name == target.name())
            .unwrap_or(false)
    })
}

fn device_names<I>(devices: std::result::Result<I, cpal::DevicesError>) -> Result<Vec<String>>
where
    I: Iterator<Item = cpal::Device>,
{
    let devices = devices.map_err(|e| PlaybackError::EnumerationUnavailable(e.to_string()))?;
    Ok(devices.filter_map(|device| device.name().ok()).collect())
}

impl AudioBackend for RodioBackend {
    fn output_device_names(&self) -> Result<Vec<String>> {
        device_names(cpal::default_host().output_devices())
    }

    fn input_device_names(&self) -> Result<Vec<String>> {
        device_names(cpal::default_host().input_devices())
    }

    fn configure_device(&mut self, device: &AudioDevice) {
        if let Some(output) = &self.output {
            if output.device.as_ref() != Some(device) {
                debug!(%device, "Output already open, device applies after shutdown");
            }
        }
        self.target = Some(device.clone());
    }

    fn init(&mut self) -> Result<()> {
        if self.output.is_some() {
            return Ok(());
        }
        self.output = Some(self.open_output()?);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.output.is_some()
    }

    fn play_stream(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path)?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| PlaybackError::Decode(format!("Failed to decode {:?}: {}", path, e)))?;

        // Only one stream-mode playback at a time
        self.stop_stream();

        let sink = Sink::try_new(self.handle()?)
            .map_err(|e| PlaybackError::Output(format!("Failed to create audio sink: {}", e)))?;
        sink.append(source);
        sink.play();

        self.music = Some(sink);
        Ok(())
    }

    fn play_overlap(&mut self, path: &Path) -> Result<()> {
        let decoded = decode_file(path)?;
        if decoded.channels == 0 || decoded.sample_rate == 0 {
            return Err(PlaybackError::Decode(format!(
                "{:?} has no playable channels",
                path
            )));
        }

        let voice = SamplesBuffer::new(decoded.channels, decoded.sample_rate, decoded.samples);
        self.handle()?
            .play_raw(voice)
            .map_err(|e| PlaybackError::Output(format!("Failed to start voice: {}", e)))
    }

    fn stop_stream(&mut self) {
        if let Some(sink) = self.music.take() {
            sink.stop();
        }
    }

    fn shutdown(&mut self) {
        self.stop_stream();
        if self.output.take().is_some() {
            info!("Audio output closed");
        }
    }
}
