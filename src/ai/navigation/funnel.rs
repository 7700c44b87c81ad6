//! Portal funnel path smoothing
//!
//! A node path over the navigation graph zig-zags between edge midpoints.
//! Each crossed edge becomes a portal, and the simple stupid funnel
//! algorithm pulls the path taut through those portals.

use glam::Vec2;

use crate::geometry::Polygon;
use crate::graph::{Graph, NavGraphNode, NodeIndex};

/// An edge crossed by a path, seen from the side the path comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Portal {
    pub left: Vec2,
    pub right: Vec2,
}

impl Portal {
    #[must_use]
    pub const fn new(left: Vec2, right: Vec2) -> Self {
        Self { left, right }
    }

    /// A zero-width portal at a single point
    #[must_use]
    pub const fn point(position: Vec2) -> Self {
        Self::new(position, position)
    }

    /// Portal over the segment `a`-`b`, ordered so `left` is on the left when
    /// walking through it from `from`
    #[must_use]
    pub fn oriented(from: Vec2, a: Vec2, b: Vec2) -> Self {
        if cross(from, b, a) > 0.0 {
            Self::new(a, b)
        } else {
            Self::new(b, a)
        }
    }
}

/// Twice the signed area of the triangle `a`, `b`, `c`; positive when `c`
/// is to the left of `a -> b`
fn cross(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

/// Turn a navigation graph path into portals.
///
/// The result starts with a point portal at `start`, has one portal per path
/// node that stands on a polygon line, and ends with a point portal at `end`.
#[must_use]
pub fn find_portals(
    path: &[NodeIndex],
    graph: &Graph<NavGraphNode>,
    polygon: &Polygon,
    start: Vec2,
    end: Vec2,
) -> Vec<Portal> {
    let mut portals = Vec::with_capacity(path.len() + 2);
    portals.push(Portal::point(start));

    let mut previous = start;
    for node in path.iter().filter_map(|&index| graph.node(index)) {
        let Some(line) = node.line_index.and_then(|index| polygon.line(index)) else {
            continue;
        };
        portals.push(Portal::oriented(previous, line.p1, line.p2));
        previous = node.position;
    }

    portals.push(Portal::point(end));
    portals
}

/// Pull a path taut through a portal corridor.
///
/// The first portal's left point is the start and the last portal's left
/// point is the end; both are always part of the result.
#[must_use]
pub fn optimize_portals(portals: &[Portal]) -> Vec<Vec2> {
    let (Some(first), Some(last)) = (portals.first(), portals.last()) else {
        return Vec::new();
    };

    let mut waypoints = vec![first.left];
    let mut apex = first.left;
    let mut left = first.left;
    let mut right = first.right;
    let mut left_index = 0;
    let mut right_index = 0;

    let mut i = 1;
    while i < portals.len() {
        let portal = portals[i];

        // Right leg
        if cross(apex, right, portal.right) >= 0.0 {
            if apex == right || cross(apex, left, portal.right) < 0.0 {
                right = portal.right;
                right_index = i;
            } else {
                // Right crossed over left: the left point becomes a corner
                push_distinct(&mut waypoints, left);
                apex = left;
                right = apex;
                right_index = left_index;
                i = left_index + 1;
                continue;
            }
        }

        // Left leg
        if cross(apex, left, portal.left) <= 0.0 {
            if apex == left || cross(apex, right, portal.left) > 0.0 {
                left = portal.left;
                left_index = i;
            } else {
                push_distinct(&mut waypoints, right);
                apex = right;
                left = apex;
                left_index = right_index;
                i = right_index + 1;
                continue;
            }
        }

        i += 1;
    }

    push_distinct(&mut waypoints, last.left);
    waypoints
}

fn push_distinct(waypoints: &mut Vec<Vec2>, point: Vec2) {
    if waypoints.last() != Some(&point) {
        waypoints.push(point);
    }
}
