// Audio playback module
// rodio drives the output, cpal enumerates devices, Symphonia decodes

pub mod backend;
pub mod decoder;
pub mod devices;
pub mod rodio_backend;

pub use backend::{AudioBackend, AudioSubsystem};
pub use devices::{AudioDevice, DeviceListing, DeviceSelection};
pub use rodio_backend::RodioBackend;
