// Output device resolution
// Matching is a pure function over a name list; enumeration and reporting
// go through the backend.
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use super::backend::AudioBackend;
use crate::error::Result;

/// Device name exactly as the host reports it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AudioDevice(String);

impl AudioDevice {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AudioDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// First device whose name contains `requested`, ignoring case.
///
/// An empty request matches nothing rather than everything.
pub fn match_device<S: AsRef<str>>(requested: &str, devices: &[S]) -> Option<AudioDevice> {
    if requested.is_empty() {
        return None;
    }
    let needle = requested.to_lowercase();

    devices
        .iter()
        .map(|name| AsRef::<str>::as_ref(name))
        .find(|name| name.to_lowercase().contains(&needle))
        .map(AudioDevice::new)
}

/// Enumerate output devices and pick the one matching `requested`.
/// Missing enumeration and a failed match both degrade to `None`.
pub fn resolve_device<B: AudioBackend>(backend: &B, requested: Option<&str>) -> Option<AudioDevice> {
    let requested = requested.filter(|name| !name.is_empty())?;

    let outputs = match backend.output_device_names() {
        Ok(outputs) => outputs,
        Err(e) => {
            warn!(error = %e, "Cannot enumerate output devices, using system default");
            return None;
        }
    };
    info!(?outputs, "Available output devices");

    let resolved = match_device(requested, &outputs);
    match &resolved {
        Some(device) => info!(%device, "Found target device"),
        None => warn!(requested, "No output device matches, using system default"),
    }
    resolved
}

/// Device choice made once when an engine is built
#[derive(Debug, Clone, Default)]
pub struct DeviceSelection {
    requested: Option<String>,
    resolved: Option<AudioDevice>,
}

impl DeviceSelection {
    pub fn resolve<B: AudioBackend>(backend: &B, requested: Option<&str>) -> Self {
        Self {
            requested: requested.map(str::to_string),
            resolved: resolve_device(backend, requested),
        }
    }

    pub fn requested(&self) -> Option<&str> {
        self.requested.as_deref()
    }

    pub fn resolved(&self) -> Option<&AudioDevice> {
        self.resolved.as_ref()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeviceListing {
    pub outputs: Vec<String>,
    pub inputs: Vec<String>,
}

pub fn device_listing<B: AudioBackend>(backend: &B) -> Result<DeviceListing> {
    Ok(DeviceListing {
        outputs: backend.output_device_names()?,
        inputs: backend.input_device_names()?,
    })
}

/// Log every output and input device
pub fn list_devices<B: AudioBackend>(backend: &B) {
    match device_listing(backend) {
        Ok(listing) => {
            for (i, device) in listing.outputs.iter().enumerate() {
                info!(index = i, device = %device, "Output device");
            }
            for (i, device) in listing.inputs.iter().enumerate() {
                info!(index = i, device = %device, "Input device");
            }
        }
        Err(e) => warn!(error = %e, "Device listing unavailable"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::backend::testing::MockBackend;

    const DEVICES: &[&str] = &[
        "Speakers (Realtek High Definition Audio)",
        "CABLE Input (VB-Audio Virtual Cable)",
        "Line 1 (Virtual Audio Cable) MixLine",
        "MIXLINE 2",
    ];

    #[test]
    fn test_match_is_case_insensitive_substring() {
        let device = match_device("mixline", DEVICES).unwrap();
        assert_eq!(device.name(), "Line 1 (Virtual Audio Cable) MixLine");
    }

    #[test]
    fn test_match_returns_first_in_enumeration_order() {
        let device = match_device("MIX", DEVICES).unwrap();
        assert_eq!(device.name(), "Line 1 (Virtual Audio Cable) MixLine");

        let device = match_device("cable", DEVICES).unwrap();
        assert_eq!(device.name(), "CABLE Input (VB-Audio Virtual Cable)");
    }

    #[test]
    fn test_no_match_is_absent() {
        assert_eq!(match_device("headphones", DEVICES), None);
        assert_eq!(match_device("mix", &[] as &[&str]), None);
    }

    #[test]
    fn test_empty_request_matches_nothing() {
        assert_eq!(match_device("", DEVICES), None);
    }

    #[test]
    fn test_resolve_without_request_skips_enumeration() {
        let backend = MockBackend::default();
        assert_eq!(resolve_device(&backend, None), None);
        assert_eq!(resolve_device(&backend, Some("")), None);
    }

    #[test]
    fn test_resolve_with_enumeration_unavailable() {
        let backend = MockBackend::default();
        assert_eq!(resolve_device(&backend, Some("MIXLINE")), None);
    }

    #[test]
    fn test_selection_keeps_request_and_match() {
        let backend = MockBackend::with_outputs(DEVICES);
        let selection = DeviceSelection::resolve(&backend, Some("MIXLINE"));
        assert_eq!(selection.requested(), Some("MIXLINE"));
        assert_eq!(
            selection.resolved().map(AudioDevice::name),
            Some("Line 1 (Virtual Audio Cable) MixLine")
        );

        let selection = DeviceSelection::resolve(&backend, Some("HDMI"));
        assert_eq!(selection.requested(), Some("HDMI"));
        assert!(selection.resolved().is_none());
    }

    #[test]
    fn test_device_listing_reports_inputs_and_outputs() {
        let backend = MockBackend::with_outputs(&["Speakers"]);
        let listing = device_listing(&backend).unwrap();
        assert_eq!(listing.outputs, vec!["Speakers"]);
        assert_eq!(listing.inputs, vec!["Built-in Microphone"]);

        assert!(device_listing(&MockBackend::default()).is_err());
    }

    #[test]
    fn test_list_devices_tolerates_missing_enumeration() {
        list_devices(&MockBackend::default());

        let mut backend = MockBackend::with_outputs(&["Speakers"]);
        backend.inputs = None;
        list_devices(&backend);
    }

    #[test]
    fn test_list_devices_only_reads_the_backend() {
        let backend = MockBackend::with_outputs(DEVICES);
        list_devices(&backend);
        assert!(backend.calls.is_empty());
        assert!(!backend.is_initialized());
    }
}
