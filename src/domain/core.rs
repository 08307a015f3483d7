//! Core domain types and operations
//!
//! This module defines pure geometry types that work exclusively with
//! real pixels and have no knowledge of Win32 concepts.

use std::ops::{Add, Sub};

/// Point in pixel coordinates
///
/// Used both for widget-local positions and for screen-global positions;
/// which one a value holds is decided by the field it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Creates a new point
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// Rectangle in real pixel coordinates
///
/// This is the fundamental building block for all geometric calculations.
/// `right()` and `bottom()` are exclusive edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    /// Creates a new rectangle
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Creates a rectangle from its four edges
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Returns the right edge coordinate
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Returns the bottom edge coordinate
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Returns the top-left corner
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns a rectangle with the same size at a new origin
    pub fn with_origin(&self, origin: Point) -> Rect {
        Rect::new(origin.x, origin.y, self.w, self.h)
    }

    /// Returns the same size anchored at (0, 0), i.e. the widget-local frame
    pub fn local(&self) -> Rect {
        Rect::new(0, 0, self.w, self.h)
    }

    /// Returns true if this rectangle contains the given point
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Returns true if the rectangle has no area
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_basic_properties() {
        let rect = Rect::new(10, 20, 100, 50);
        assert_eq!(rect.right(), 110);
        assert_eq!(rect.bottom(), 70);
        assert_eq!(rect.origin(), Point::new(10, 20));
        assert_eq!(rect.local(), Rect::new(0, 0, 100, 50));
    }

    #[test]
    fn rect_contains_point() {
        let rect = Rect::new(10, 10, 20, 20);
        assert!(rect.contains(Point::new(15, 15)));
        assert!(rect.contains(Point::new(10, 10))); // Top-left corner is inside
        assert!(!rect.contains(Point::new(30, 30))); // Right/bottom edges are exclusive
        assert!(!rect.contains(Point::new(5, 5)));
    }

    #[test]
    fn rect_from_edges_round_trips_edges() {
        let rect = Rect::from_edges(-20, 5, 100, 95);
        assert_eq!(rect, Rect::new(-20, 5, 120, 90));
        assert_eq!(rect.right(), 100);
        assert_eq!(rect.bottom(), 95);
    }

    #[test]
    fn empty_rects() {
        assert!(Rect::new(0, 0, 0, 10).is_empty());
        assert!(Rect::new(0, 0, 10, -1).is_empty());
        assert!(!Rect::new(0, 0, 1, 1).is_empty());
    }

    #[test]
    fn point_arithmetic() {
        let a = Point::new(7, -3);
        let b = Point::new(2, 5);
        assert_eq!(a + b, Point::new(9, 2));
        assert_eq!(a - b, Point::new(5, -8));
    }
}
