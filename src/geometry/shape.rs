//! Static obstacle shapes
//!
//! Obstacles are grown by the agent radius before they are cut out of the
//! walkable area, so agents can be treated as points during pathfinding.

use glam::Vec2;

/// A convex obstacle outline
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    points: Vec<Vec2>,
}

impl Shape {
    /// Create a shape from its outline (either winding)
    #[must_use]
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    /// Create an axis-aligned box shape
    #[must_use]
    pub fn rectangle(center: Vec2, half_extents: Vec2) -> Self {
        Self::new(vec![
            center + Vec2::new(-half_extents.x, -half_extents.y),
            center + Vec2::new(half_extents.x, -half_extents.y),
            center + Vec2::new(half_extents.x, half_extents.y),
            center + Vec2::new(-half_extents.x, half_extents.y),
        ])
    }

    /// Outline points
    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Twice the signed area (positive for counter-clockwise outlines)
    #[must_use]
    pub fn signed_area2(&self) -> f32 {
        let n = self.points.len();
        (0..n)
            .map(|i| self.points[i].perp_dot(self.points[(i + 1) % n]))
            .sum()
    }

    /// Grow the outline outward by `radius`.
    ///
    /// Each vertex moves along the bisector of its two edge normals so both
    /// adjacent edges end up exactly `radius` further out (mitered corners).
    pub fn expand(&mut self, radius: f32) {
        let n = self.points.len();
        if n < 3 || radius == 0.0 {
            return;
        }

        // Outward normal of edge a->b for a counter-clockwise outline is (dy, -dx)
        let orientation = if self.signed_area2() >= 0.0 { 1.0 } else { -1.0 };
        let outward = |a: Vec2, b: Vec2| {
            let edge = (b - a).normalize_or_zero();
            Vec2::new(edge.y, -edge.x) * orientation
        };

        let expanded = (0..n)
            .map(|i| {
                let prev = self.points[(i + n - 1) % n];
                let current = self.points[i];
                let next = self.points[(i + 1) % n];

                let n1 = outward(prev, current);
                let n2 = outward(current, next);
                let bisector = (n1 + n2).normalize_or_zero();
                let cos_half = bisector.dot(n1);
                if cos_half.abs() < 1e-4 {
                    current + n1 * radius
                } else {
                    current + bisector * (radius / cos_half)
                }
            })
            .collect();

        self.points = expanded;
    }

    /// Return an expanded copy
    #[must_use]
    pub fn expanded(&self, radius: f32) -> Self {
        let mut shape = self.clone();
        shape.expand(radius);
        shape
    }

    /// Check if a point is inside the (convex) outline, edges inclusive
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let orientation = self.signed_area2().signum();
        (0..n).all(|i| {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            (b - a).perp_dot(point - a) * orientation >= -1e-5
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_box() {
        let shape = Shape::rectangle(Vec2::ZERO, Vec2::splat(1.0)).expanded(0.5);

        for point in shape.points() {
            assert!((point.x.abs() - 1.5).abs() < 0.001);
            assert!((point.y.abs() - 1.5).abs() < 0.001);
        }
    }

    #[test]
    fn test_expand_clockwise_outline() {
        let mut points = Shape::rectangle(Vec2::ZERO, Vec2::splat(1.0)).points().to_vec();
        points.reverse();
        let shape = Shape::new(points).expanded(1.0);

        // Still grows outward regardless of winding
        assert!(shape.contains(Vec2::new(1.9, 1.9)));
        assert!(!shape.contains(Vec2::new(2.1, 0.0)));
    }

    #[test]
    fn test_contains() {
        let shape = Shape::rectangle(Vec2::new(5.0, 5.0), Vec2::splat(2.0));

        assert!(shape.contains(Vec2::new(5.0, 5.0)));
        assert!(shape.contains(Vec2::new(7.0, 5.0)));
        assert!(!shape.contains(Vec2::ZERO));
    }
}
