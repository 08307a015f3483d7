//! Window host capability interface
//!
//! The controller never calls a windowing API directly. Whatever hosts the
//! widget (the Win32 layered window, or a recording fake in tests) provides
//! these capabilities and feeds `HostEvent`s back in.

use tiny_skia::Pixmap;

use crate::domain::core::{Point, Rect};
use crate::domain::hit_zone::CursorShape;
use crate::domain::interaction::PointerEvent;

/// Events the host delivers to the controller, one at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Pointer(PointerEvent),
    /// Frame timer fired
    Tick,
    /// The window was asked to close from outside (Alt+F4, task manager...)
    CloseRequested,
}

/// Items of the widget's context menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Close,
}

/// Capabilities the widget needs from its window
pub trait WidgetHost {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Moves and resizes the window to a screen rectangle
    fn set_geometry(&mut self, rect: Rect) -> Result<(), Self::Error>;

    fn set_cursor(&mut self, cursor: CursorShape);

    /// Shows a composed surface at `geometry`
    fn present(&mut self, surface: &Pixmap, geometry: Rect) -> Result<(), Self::Error>;

    /// Opens the context menu at a screen position and returns the picked item
    fn show_context_menu(&mut self, at: Point) -> Option<MenuCommand>;

    /// Makes the window visible for the first time
    fn show(&mut self);

    /// Tears the window down; later calls are no-ops
    fn destroy(&mut self);
}
