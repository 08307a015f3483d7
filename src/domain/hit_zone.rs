//! Resize hit-zones along the widget border
//!
//! The widget has no native frame, so resizing is driven by eight virtual
//! grips: four edge strips and four corner squares of a fixed thickness.
//! The zones are a pure function of the widget size and are rebuilt every
//! time the widget is resized.

use crate::domain::core::{Point, Rect};

/// One of the eight resize grips around the widget border
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeZone {
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeZone {
    /// All zones in hit-test order (edges first, then corners)
    pub const ALL: [ResizeZone; 8] = [
        ResizeZone::Top,
        ResizeZone::Bottom,
        ResizeZone::Left,
        ResizeZone::Right,
        ResizeZone::TopLeft,
        ResizeZone::TopRight,
        ResizeZone::BottomLeft,
        ResizeZone::BottomRight,
    ];

    /// Whether dragging this zone moves the top edge
    pub fn moves_top(self) -> bool {
        matches!(self, ResizeZone::Top | ResizeZone::TopLeft | ResizeZone::TopRight)
    }

    /// Whether dragging this zone moves the bottom edge
    pub fn moves_bottom(self) -> bool {
        matches!(
            self,
            ResizeZone::Bottom | ResizeZone::BottomLeft | ResizeZone::BottomRight
        )
    }

    /// Whether dragging this zone moves the left edge
    pub fn moves_left(self) -> bool {
        matches!(self, ResizeZone::Left | ResizeZone::TopLeft | ResizeZone::BottomLeft)
    }

    /// Whether dragging this zone moves the right edge
    pub fn moves_right(self) -> bool {
        matches!(
            self,
            ResizeZone::Right | ResizeZone::TopRight | ResizeZone::BottomRight
        )
    }

    /// Cursor shown while hovering this zone
    pub fn cursor(self) -> CursorShape {
        match self {
            ResizeZone::Top | ResizeZone::Bottom => CursorShape::ResizeVertical,
            ResizeZone::Left | ResizeZone::Right => CursorShape::ResizeHorizontal,
            ResizeZone::TopLeft | ResizeZone::BottomRight => CursorShape::ResizeDiagonalNwSe,
            ResizeZone::TopRight | ResizeZone::BottomLeft => CursorShape::ResizeDiagonalNeSw,
        }
    }

    /// Applies a pointer delta to the edges this zone controls
    pub fn apply_delta(self, start: Rect, delta: Point) -> Rect {
        let mut left = start.x;
        let mut top = start.y;
        let mut right = start.right();
        let mut bottom = start.bottom();

        if self.moves_left() {
            left += delta.x;
        }
        if self.moves_right() {
            right += delta.x;
        }
        if self.moves_top() {
            top += delta.y;
        }
        if self.moves_bottom() {
            bottom += delta.y;
        }

        Rect::from_edges(left, top, right, bottom)
    }
}

/// Pointer cursor shapes the widget can request from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Arrow,
    ResizeVertical,
    ResizeHorizontal,
    /// Top-left to bottom-right diagonal
    ResizeDiagonalNwSe,
    /// Top-right to bottom-left diagonal
    ResizeDiagonalNeSw,
}

/// Cached set of grip rectangles for the current widget size
///
/// All rectangles are in widget-local coordinates. Edge strips stop short
/// of the corners, so the eight zones never overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitZones {
    zones: [(ResizeZone, Rect); 8],
}

impl HitZones {
    /// Builds the zones for a widget of the given size
    pub fn new(width: i32, height: i32, grip_size: i32) -> Self {
        let g = grip_size;
        let zones = ResizeZone::ALL.map(|zone| {
            let rect = match zone {
                ResizeZone::Top => Rect::new(g, 0, width - 2 * g, g),
                ResizeZone::Bottom => Rect::new(g, height - g, width - 2 * g, g),
                ResizeZone::Left => Rect::new(0, g, g, height - 2 * g),
                ResizeZone::Right => Rect::new(width - g, g, g, height - 2 * g),
                ResizeZone::TopLeft => Rect::new(0, 0, g, g),
                ResizeZone::TopRight => Rect::new(width - g, 0, g, g),
                ResizeZone::BottomLeft => Rect::new(0, height - g, g, g),
                ResizeZone::BottomRight => Rect::new(width - g, height - g, g, g),
            };
            (zone, rect)
        });

        Self { zones }
    }

    /// Builds the zones for the size of `rect`, ignoring its position
    pub fn for_rect(rect: Rect, grip_size: i32) -> Self {
        Self::new(rect.w, rect.h, grip_size)
    }

    /// Returns the zone containing the widget-local point, if any
    pub fn zone_at(&self, local: Point) -> Option<ResizeZone> {
        self.zones
            .iter()
            .find(|(_, rect)| rect.contains(local))
            .map(|(zone, _)| *zone)
    }

    /// Returns the rectangle of a specific zone
    pub fn rect_of(&self, zone: ResizeZone) -> Rect {
        self.zones
            .iter()
            .find(|(candidate, _)| *candidate == zone)
            .map(|(_, rect)| *rect)
            .unwrap_or_default()
    }

    /// Cursor for the widget-local point (arrow outside every zone)
    pub fn cursor_at(&self, local: Point) -> CursorShape {
        self.zone_at(local)
            .map(ResizeZone::cursor)
            .unwrap_or(CursorShape::Arrow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center_of(rect: Rect) -> Point {
        Point::new(rect.x + rect.w / 2, rect.y + rect.h / 2)
    }

    #[test]
    fn zones_cover_the_border() {
        let zones = HitZones::new(320, 240, 8);
        assert_eq!(zones.rect_of(ResizeZone::Top), Rect::new(8, 0, 304, 8));
        assert_eq!(zones.rect_of(ResizeZone::Bottom), Rect::new(8, 232, 304, 8));
        assert_eq!(zones.rect_of(ResizeZone::Left), Rect::new(0, 8, 8, 224));
        assert_eq!(zones.rect_of(ResizeZone::Right), Rect::new(312, 8, 8, 224));
        assert_eq!(zones.rect_of(ResizeZone::TopLeft), Rect::new(0, 0, 8, 8));
        assert_eq!(zones.rect_of(ResizeZone::TopRight), Rect::new(312, 0, 8, 8));
        assert_eq!(zones.rect_of(ResizeZone::BottomLeft), Rect::new(0, 232, 8, 8));
        assert_eq!(zones.rect_of(ResizeZone::BottomRight), Rect::new(312, 232, 8, 8));
    }

    #[test]
    fn each_zone_center_resolves_to_itself() {
        let zones = HitZones::new(320, 240, 8);
        for zone in ResizeZone::ALL {
            let center = center_of(zones.rect_of(zone));
            assert_eq!(zones.zone_at(center), Some(zone), "zone {zone:?}");
        }
    }

    #[test]
    fn interior_has_no_zone() {
        let zones = HitZones::new(320, 240, 8);
        assert_eq!(zones.zone_at(Point::new(160, 120)), None);
        assert_eq!(zones.zone_at(Point::new(8, 8)), None); // First interior pixel
        assert_eq!(zones.zone_at(Point::new(311, 231)), None); // Last interior pixel
        assert_eq!(zones.zone_at(Point::new(320, 120)), None); // Outside the widget
    }

    #[test]
    fn zones_are_disjoint() {
        let zones = HitZones::new(50, 40, 8);
        for y in 0..40 {
            for x in 0..50 {
                let point = Point::new(x, y);
                let hits = ResizeZone::ALL
                    .iter()
                    .filter(|zone| zones.rect_of(**zone).contains(point))
                    .count();
                assert!(hits <= 1, "point {point:?} hit {hits} zones");
            }
        }
    }

    #[test]
    fn cursor_shapes_follow_zone_orientation() {
        let zones = HitZones::new(320, 240, 8);
        let cursor = |zone| zones.cursor_at(center_of(zones.rect_of(zone)));

        assert_eq!(cursor(ResizeZone::Top), CursorShape::ResizeVertical);
        assert_eq!(cursor(ResizeZone::Bottom), CursorShape::ResizeVertical);
        assert_eq!(cursor(ResizeZone::Left), CursorShape::ResizeHorizontal);
        assert_eq!(cursor(ResizeZone::Right), CursorShape::ResizeHorizontal);
        assert_eq!(cursor(ResizeZone::TopLeft), CursorShape::ResizeDiagonalNwSe);
        assert_eq!(cursor(ResizeZone::BottomRight), CursorShape::ResizeDiagonalNwSe);
        assert_eq!(cursor(ResizeZone::TopRight), CursorShape::ResizeDiagonalNeSw);
        assert_eq!(cursor(ResizeZone::BottomLeft), CursorShape::ResizeDiagonalNeSw);
        assert_eq!(zones.cursor_at(Point::new(100, 100)), CursorShape::Arrow);
    }

    #[test]
    fn apply_delta_moves_only_controlled_edges() {
        let start = Rect::new(100, 100, 320, 240);
        let delta = Point::new(10, -20);

        assert_eq!(
            ResizeZone::Top.apply_delta(start, delta),
            Rect::from_edges(100, 80, 420, 340)
        );
        assert_eq!(
            ResizeZone::Right.apply_delta(start, delta),
            Rect::from_edges(100, 100, 430, 340)
        );
        assert_eq!(
            ResizeZone::BottomLeft.apply_delta(start, delta),
            Rect::from_edges(110, 100, 420, 320)
        );
    }
}
