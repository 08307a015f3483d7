//! Application orchestration layer
//!
//! This module coordinates between capture, domain, UI, and platform layers.
//! It owns the widget state and handles every host event.

pub mod controller;
pub mod host;

pub use controller::{AppError, WidgetController};
pub use host::{HostEvent, MenuCommand, WidgetHost};
