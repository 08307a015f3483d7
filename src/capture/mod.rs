//! Camera frame acquisition
//!
//! Frames come from an exclusively owned `CameraDevice`. Only the Media
//! Foundation device touches the operating system; frame conversion is
//! plain Rust.

pub mod camera;
pub mod frame;
#[cfg(windows)]
pub mod media_foundation;

pub use camera::{CameraDevice, CameraError};
pub use frame::{Frame, FrameError, PixelLayout};
