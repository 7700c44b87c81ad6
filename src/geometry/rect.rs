//! Axis-aligned rectangles
//!
//! Used as cell bounding boxes by the spatial index and as debug geometry.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle anchored at its bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Bottom-left corner
    pub bottom_left: Vec2,
    /// Size (width, height)
    pub size: Vec2,
}

impl Rect {
    /// Create a new rectangle
    #[must_use]
    pub fn new(left: f32, bottom: f32, width: f32, height: f32) -> Self {
        Self {
            bottom_left: Vec2::new(left, bottom),
            size: Vec2::new(width, height),
        }
    }

    /// Create a rectangle from its min and max corners
    #[must_use]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            bottom_left: min,
            size: max - min,
        }
    }

    /// Minimum corner
    #[must_use]
    pub fn min(&self) -> Vec2 {
        self.bottom_left
    }

    /// Maximum corner
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.bottom_left + self.size
    }

    /// Center point
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.bottom_left + self.size * 0.5
    }

    /// Check if a point is inside the rectangle (edges inclusive)
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.bottom_left.x
            && point.x <= max.x
            && point.y >= self.bottom_left.y
            && point.y <= max.y
    }

    /// Check if two rectangles overlap (touching edges count)
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x <= b_max.x && b_min.x <= a_max.x && a_min.y <= b_max.y && b_min.y <= a_max.y
    }

    /// Corner points, counter-clockwise from the bottom-left
    #[must_use]
    pub fn rect_points(&self) -> [Vec2; 4] {
        let min = self.min();
        let max = self.max();
        [
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ]
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10.0, 10.0, 100.0, 50.0);

        assert!(rect.contains(Vec2::new(50.0, 30.0)));
        assert!(rect.contains(Vec2::new(110.0, 60.0))); // Corner is inclusive
        assert!(!rect.contains(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn test_rect_overlaps() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::from_min_max(Vec2::new(5.0, 5.0), Vec2::new(15.0, 15.0));
        let c = Rect::new(20.0, 20.0, 1.0, 1.0);

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_rect_points() {
        let rect = Rect::new(-1.0, -2.0, 2.0, 4.0);
        let points = rect.rect_points();

        assert_eq!(points[0], Vec2::new(-1.0, -2.0));
        assert_eq!(points[2], Vec2::new(1.0, 2.0));
        assert!((rect.center() - Vec2::ZERO).length() < 0.001);
    }
}
