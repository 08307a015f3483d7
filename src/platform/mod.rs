//! Platform-specific Windows implementations
//!
//! This module encapsulates all Win32 API interactions and provides
//! the window host the controller runs in.

pub mod window;
pub mod windows;

pub use window::{WidgetWindow, WindowError};
