//! Close-button chrome
//!
//! The close button only appears while the pointer is over the widget and
//! lights up while the pointer is over the button itself. Like any push
//! button it is armed by a primary press and fires on the matching release,
//! so pressing and then sliding off cancels. Presses on the visible button
//! take precedence over the resize grips underneath it.

use crate::domain::core::Rect;
use crate::domain::interaction::{PointerButton, PointerEvent};

/// Visibility and hover state of the close button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseButton {
    size: i32,
    margin: i32,
    /// Widget-local rectangle
    rect: Rect,
    visible: bool,
    hovered: bool,
    /// A primary press landed on the button and has not been released yet
    armed: bool,
}

/// What the controller has to do after the chrome saw an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChromeOutcome {
    /// Button visibility or highlight changed
    pub repaint: bool,
    /// The event belongs to the button and must not reach the classifier
    pub captured: bool,
    /// The button was clicked (pressed and released over it)
    pub close: bool,
}

impl CloseButton {
    /// Creates a hidden button anchored to the top-right corner
    pub fn new(widget_width: i32, size: i32, margin: i32) -> Self {
        let mut button = Self {
            size,
            margin,
            rect: Rect::default(),
            visible: false,
            hovered: false,
            armed: false,
        };
        button.relayout(widget_width);
        button
    }

    /// Re-anchors the button after the widget width changed
    pub fn relayout(&mut self, widget_width: i32) {
        self.rect = Rect::new(
            widget_width - self.size - self.margin,
            self.margin,
            self.size,
            self.size,
        );
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Updates the chrome for a pointer event
    ///
    /// # Arguments
    /// * `event` - Pointer event in widget coordinates
    /// * `idle` - Whether no move/resize drag is in progress
    pub fn on_pointer(&mut self, event: &PointerEvent, idle: bool) -> ChromeOutcome {
        let before = (self.visible, self.hovered);
        let mut outcome = ChromeOutcome::default();

        match *event {
            PointerEvent::Entered => self.visible = true,
            PointerEvent::Left => {
                self.visible = false;
                self.hovered = false;
            }
            PointerEvent::Moved { local, .. } => {
                // Win32 has no enter message; the first move counts as one
                self.visible = true;
                self.hovered = self.rect.contains(local);
                outcome.captured = idle && self.hovered;
            }
            PointerEvent::Pressed { button, local, .. } => {
                if idle && self.visible && self.rect.contains(local) {
                    self.hovered = true;
                    self.armed = button == PointerButton::Primary;
                    outcome.captured = true;
                }
            }
            PointerEvent::Released {
                button: PointerButton::Primary,
            } => {
                if self.armed {
                    self.armed = false;
                    outcome.captured = true;
                    outcome.close = self.visible && self.hovered;
                }
            }
            PointerEvent::CaptureLost => self.armed = false,
            PointerEvent::Released { .. } | PointerEvent::ContextRequested { .. } => {}
        }

        outcome.repaint = before != (self.visible, self.hovered);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::core::Point;

    fn moved(x: i32, y: i32) -> PointerEvent {
        PointerEvent::Moved {
            local: Point::new(x, y),
            global: Point::new(x + 100, y + 100),
        }
    }

    fn pressed(button: PointerButton, x: i32, y: i32) -> PointerEvent {
        PointerEvent::Pressed {
            button,
            local: Point::new(x, y),
            global: Point::new(x + 100, y + 100),
        }
    }

    #[test]
    fn button_sits_in_top_right_corner() {
        let mut button = CloseButton::new(320, 20, 5);
        assert_eq!(button.rect(), Rect::new(295, 5, 20, 20));

        button.relayout(200);
        assert_eq!(button.rect(), Rect::new(175, 5, 20, 20));
    }

    #[test]
    fn hidden_until_pointer_enters() {
        let mut button = CloseButton::new(320, 20, 5);
        assert!(!button.is_visible());

        let outcome = button.on_pointer(&PointerEvent::Entered, true);
        assert!(button.is_visible());
        assert!(outcome.repaint);

        let outcome = button.on_pointer(&PointerEvent::Left, true);
        assert!(!button.is_visible());
        assert!(outcome.repaint);
    }

    #[test]
    fn hover_highlight_tracks_button_rect() {
        let mut button = CloseButton::new(320, 20, 5);
        button.on_pointer(&PointerEvent::Entered, true);

        let outcome = button.on_pointer(&moved(300, 10), true);
        assert!(button.is_hovered());
        assert!(outcome.repaint);
        assert!(outcome.captured);

        let outcome = button.on_pointer(&moved(150, 100), true);
        assert!(!button.is_hovered());
        assert!(outcome.repaint);
        assert!(!outcome.captured);

        let outcome = button.on_pointer(&moved(151, 100), true);
        assert!(!outcome.repaint);
    }

    fn released(button: PointerButton) -> PointerEvent {
        PointerEvent::Released { button }
    }

    #[test]
    fn click_on_visible_button_closes_on_release() {
        let mut button = CloseButton::new(320, 20, 5);
        button.on_pointer(&PointerEvent::Entered, true);

        let outcome = button.on_pointer(&pressed(PointerButton::Primary, 305, 15), true);
        assert!(outcome.captured);
        assert!(!outcome.close, "a press alone does not close");

        let outcome = button.on_pointer(&released(PointerButton::Primary), true);
        assert!(outcome.captured);
        assert!(outcome.close);
    }

    #[test]
    fn sliding_off_before_release_cancels() {
        let mut button = CloseButton::new(320, 20, 5);
        button.on_pointer(&PointerEvent::Entered, true);
        button.on_pointer(&pressed(PointerButton::Primary, 305, 15), true);

        button.on_pointer(&moved(200, 100), true);
        let outcome = button.on_pointer(&released(PointerButton::Primary), true);
        assert!(!outcome.close);

        // The press was consumed; a stray release over the button does nothing
        button.on_pointer(&moved(305, 15), true);
        let outcome = button.on_pointer(&released(PointerButton::Primary), true);
        assert!(!outcome.close);
    }

    #[test]
    fn lost_capture_disarms_button() {
        let mut button = CloseButton::new(320, 20, 5);
        button.on_pointer(&PointerEvent::Entered, true);
        button.on_pointer(&pressed(PointerButton::Primary, 305, 15), true);

        button.on_pointer(&PointerEvent::CaptureLost, true);
        let outcome = button.on_pointer(&released(PointerButton::Primary), true);
        assert!(!outcome.close);
    }

    #[test]
    fn other_buttons_never_close() {
        let mut button = CloseButton::new(320, 20, 5);
        button.on_pointer(&PointerEvent::Entered, true);

        for which in [PointerButton::Secondary, PointerButton::Middle] {
            let outcome = button.on_pointer(&pressed(which, 305, 15), true);
            assert!(outcome.captured);
            let outcome = button.on_pointer(&released(which), true);
            assert!(!outcome.close);
            let outcome = button.on_pointer(&released(PointerButton::Primary), true);
            assert!(!outcome.close, "{which:?} press must not arm the button");
        }
    }

    #[test]
    fn press_on_hidden_button_passes_through() {
        let mut button = CloseButton::new(320, 20, 5);
        let outcome = button.on_pointer(&pressed(PointerButton::Primary, 305, 15), true);
        assert!(!outcome.close);
        assert!(!outcome.captured);
    }

    #[test]
    fn drags_are_not_captured_by_button() {
        let mut button = CloseButton::new(320, 20, 5);
        button.on_pointer(&PointerEvent::Entered, true);

        let outcome = button.on_pointer(&moved(300, 10), false);
        assert!(!outcome.captured);
        assert!(button.is_hovered());
    }
}
