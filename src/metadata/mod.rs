// Metadata module
// Reads container headers to work out how long a file plays for

pub mod duration;

pub use duration::{resolve_duration, ContainerKind};
