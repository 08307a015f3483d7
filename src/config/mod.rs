//! Configuration module for pincam
//!
//! Holds the compiled-in widget settings shared by the controller, the
//! renderer and the Win32 window.

pub mod widget;

pub use widget::{ConfigError, WidgetConfig};
