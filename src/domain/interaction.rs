//! Pointer interaction state machine
//!
//! Classifies pointer input into idle hovering, window moves and window
//! resizes. The state machine is a pure function: it receives the current
//! interaction state plus a read-only view of the widget and returns the
//! next state together with the side effects the host has to perform.
//! Nothing in here touches Win32, which keeps every transition testable
//! without a display.

use crate::domain::core::{Point, Rect};
use crate::domain::hit_zone::{CursorShape, HitZones, ResizeZone};

/// Pointer buttons the widget distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Pointer input delivered by the host
///
/// `local` is relative to the widget's top-left corner, `global` is in
/// screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Pressed {
        button: PointerButton,
        local: Point,
        global: Point,
    },
    Moved {
        local: Point,
        global: Point,
    },
    Released {
        button: PointerButton,
    },
    /// Pointer entered the widget
    Entered,
    /// Pointer left the widget
    Left,
    /// Context menu requested (right click) at a screen position
    ContextRequested {
        global: Point,
    },
    /// Another window took the mouse capture; no release will follow
    CaptureLost,
}

/// Current pointer interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interaction {
    /// No button held; the pointer only drives the cursor shape
    #[default]
    Idle,
    /// Dragging the whole widget
    Moving {
        /// Global pointer position minus widget origin at press time
        offset: Point,
    },
    /// Dragging one of the resize grips
    Resizing {
        zone: ResizeZone,
        /// Global pointer position at press time
        anchor: Point,
        /// Widget rectangle at press time
        start: Rect,
    },
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }
}

/// Side effects requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Move and/or resize the widget to this screen rectangle
    SetGeometry(Rect),
    /// Change the pointer cursor shape
    SetCursor(CursorShape),
    /// Open the context menu at a screen position
    ShowContextMenu(Point),
}

/// Result of feeding one event through the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: Interaction,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(state: Interaction) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    fn with_effect(state: Interaction, effect: Effect) -> Self {
        Self {
            state,
            effects: vec![effect],
        }
    }
}

/// Read-only view of the widget the classifier needs
#[derive(Debug, Clone, Copy)]
pub struct WidgetView<'a> {
    /// Current widget rectangle in screen coordinates
    pub geometry: Rect,
    /// Hit-zones for the current widget size
    pub zones: &'a HitZones,
    pub min_width: i32,
    pub min_height: i32,
}

impl WidgetView<'_> {
    /// Whether a rectangle satisfies both minimum dimensions
    pub fn accepts(&self, rect: &Rect) -> bool {
        rect.w >= self.min_width && rect.h >= self.min_height
    }
}

/// Feeds one pointer event through the interaction state machine
pub fn handle(event: &PointerEvent, state: Interaction, view: &WidgetView<'_>) -> Transition {
    match (*event, state) {
        (
            PointerEvent::Pressed {
                button: PointerButton::Primary,
                local,
                global,
            },
            Interaction::Idle,
        ) => press(local, global, view),

        (PointerEvent::Moved { global, .. }, Interaction::Resizing { zone, anchor, start }) => {
            let candidate = zone.apply_delta(start, global - anchor);

            // Both dimensions must fit, otherwise the whole update is dropped
            if !view.accepts(&candidate) || candidate == view.geometry {
                return Transition::unchanged(state);
            }
            Transition::with_effect(state, Effect::SetGeometry(candidate))
        }

        (PointerEvent::Moved { global, .. }, Interaction::Moving { offset }) => {
            let target = view.geometry.with_origin(global - offset);
            if target == view.geometry {
                return Transition::unchanged(state);
            }
            Transition::with_effect(state, Effect::SetGeometry(target))
        }

        (PointerEvent::Moved { local, .. }, Interaction::Idle) => Transition::with_effect(
            Interaction::Idle,
            Effect::SetCursor(view.zones.cursor_at(local)),
        ),

        (
            PointerEvent::Released {
                button: PointerButton::Primary,
            }
            | PointerEvent::CaptureLost,
            _,
        ) => Transition::with_effect(Interaction::Idle, Effect::SetCursor(CursorShape::Arrow)),

        (PointerEvent::ContextRequested { global }, state) => {
            Transition::with_effect(state, Effect::ShowContextMenu(global))
        }

        (_, state) => Transition::unchanged(state),
    }
}

fn press(local: Point, global: Point, view: &WidgetView<'_>) -> Transition {
    if let Some(zone) = view.zones.zone_at(local) {
        return Transition::unchanged(Interaction::Resizing {
            zone,
            anchor: global,
            start: view.geometry,
        });
    }

    if view.geometry.local().contains(local) {
        return Transition::unchanged(Interaction::Moving {
            offset: global - view.geometry.origin(),
        });
    }

    Transition::unchanged(Interaction::Idle)
}
