//! Camera device abstraction
//!
//! The widget talks to the camera through `CameraDevice` so the render loop
//! can be driven by the Media Foundation device on Windows or by an
//! in-memory device in tests.

use thiserror::Error;

use crate::capture::frame::{Frame, FrameError};

/// Camera errors
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("Cannot open camera device {index}: {reason}")]
    OpenFailed { index: u32, reason: String },

    #[error("No camera device at index {index} ({available} available)")]
    DeviceNotFound { index: u32, available: u32 },

    #[error("Camera did not deliver a frame")]
    FrameUnavailable,

    #[error("Failed to read frame: {0}")]
    ReadFailed(String),

    #[error("Camera device already released")]
    Released,

    #[error("Malformed frame: {0}")]
    Frame(#[from] FrameError),
}

/// An exclusively owned camera handle
pub trait CameraDevice {
    /// Reads the next frame
    ///
    /// Any error is transient from the widget's point of view: the tick is
    /// skipped and the previous image stays on screen.
    fn read_frame(&mut self) -> Result<Frame, CameraError>;

    /// Releases the device
    ///
    /// The controller guarantees this is called exactly once.
    fn release(&mut self);
}
