// Outloud - audio output manager
// Module declarations
pub mod audio;
pub mod error;
pub mod metadata;
pub mod playback;
pub mod settings;

pub use audio::{AudioBackend, AudioDevice, AudioSubsystem, RodioBackend};
pub use error::{PlaybackError, Result};
pub use metadata::{resolve_duration, ContainerKind};
pub use playback::{PlaybackEngine, PlaybackMode, PlaybackOutcome, PlaybackRequest};
pub use settings::PlayerSettings;
