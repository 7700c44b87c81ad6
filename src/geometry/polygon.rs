//! Triangulated polygons
//!
//! The navigation mesh consumes a polygon that has already been triangulated
//! (holes subtracted, obstacles expanded). This module stores that
//! triangulation as a shared vertex list, a deduplicated edge ("line") list
//! and triangles that reference their three lines by index.

use glam::Vec2;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Tolerance used by the inclusive point-in-triangle test
const EDGE_EPSILON: f32 = 1e-4;

/// An edge of the triangulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// Index of this line in the polygon's line list
    pub index: usize,
    /// First end point
    pub p1: Vec2,
    /// Second end point
    pub p2: Vec2,
}

impl Line {
    /// Midpoint of the line
    #[must_use]
    pub fn midpoint(&self) -> Vec2 {
        (self.p1 + self.p2) * 0.5
    }

    /// Length of the line
    #[must_use]
    pub fn length(&self) -> f32 {
        self.p1.distance(self.p2)
    }
}

/// A triangle of the triangulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub p1: Vec2,
    pub p2: Vec2,
    pub p3: Vec2,
    /// Indices of the lines p1-p2, p2-p3 and p3-p1
    pub line_indices: [usize; 3],
}

impl Triangle {
    /// Centroid of the triangle
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.p1 + self.p2 + self.p3) / 3.0
    }

    /// Check whether a point lies inside the triangle, edges included
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point_in_triangle(point, self.p1, self.p2, self.p3)
    }
}

/// Inclusive point-in-triangle test, independent of winding order
#[must_use]
pub fn point_in_triangle(point: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = (b - a).perp_dot(point - a);
    let d2 = (c - b).perp_dot(point - b);
    let d3 = (a - c).perp_dot(point - c);

    let has_neg = d1 < -EDGE_EPSILON || d2 < -EDGE_EPSILON || d3 < -EDGE_EPSILON;
    let has_pos = d1 > EDGE_EPSILON || d2 > EDGE_EPSILON || d3 > EDGE_EPSILON;

    !(has_neg && has_pos)
}

/// Errors raised while building a polygon from raw triangle data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolygonError {
    /// A triangle references a vertex that does not exist
    VertexOutOfRange { triangle: usize, vertex: usize },
    /// A triangle uses the same vertex twice
    DegenerateTriangle(usize),
}

impl std::fmt::Display for PolygonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VertexOutOfRange { triangle, vertex } => {
                write!(f, "triangle {triangle} references missing vertex {vertex}")
            }
            Self::DegenerateTriangle(triangle) => {
                write!(f, "triangle {triangle} repeats a vertex")
            }
        }
    }
}

impl std::error::Error for PolygonError {}

/// A triangulated polygon
#[derive(Debug, Clone, Default)]
pub struct Polygon {
    points: Vec<Vec2>,
    lines: Vec<Line>,
    triangles: Vec<Triangle>,
    /// Triangles referencing each line, indexed by line index
    line_triangles: Vec<SmallVec<[usize; 2]>>,
}

impl Polygon {
    /// Build a polygon from vertices and vertex-index triples.
    ///
    /// Edges shared by several triangles are stored once, so the
    /// per-line triangle count tells interior edges from boundary ones.
    ///
    /// # Errors
    ///
    /// Returns an error if a triangle references a missing vertex or
    /// repeats a vertex.
    pub fn from_triangles(
        points: Vec<Vec2>,
        triangles: &[[usize; 3]],
    ) -> Result<Self, PolygonError> {
        let mut polygon = Self {
            points,
            ..Self::default()
        };
        let mut line_lookup: FxHashMap<(usize, usize), usize> = FxHashMap::default();

        for (triangle_index, &[a, b, c]) in triangles.iter().enumerate() {
            for vertex in [a, b, c] {
                if vertex >= polygon.points.len() {
                    return Err(PolygonError::VertexOutOfRange {
                        triangle: triangle_index,
                        vertex,
                    });
                }
            }
            if a == b || b == c || c == a {
                return Err(PolygonError::DegenerateTriangle(triangle_index));
            }

            let mut line_indices = [0; 3];
            for (slot, (from, to)) in [(a, b), (b, c), (c, a)].into_iter().enumerate() {
                let key = (from.min(to), from.max(to));
                let line_index = *line_lookup.entry(key).or_insert_with(|| {
                    let index = polygon.lines.len();
                    polygon.lines.push(Line {
                        index,
                        p1: polygon.points[key.0],
                        p2: polygon.points[key.1],
                    });
                    polygon.line_triangles.push(SmallVec::new());
                    index
                });
                polygon.line_triangles[line_index].push(triangle_index);
                line_indices[slot] = line_index;
            }

            polygon.triangles.push(Triangle {
                p1: polygon.points[a],
                p2: polygon.points[b],
                p3: polygon.points[c],
                line_indices,
            });
        }

        log::debug!(
            "Built polygon with {} points, {} lines, {} triangles",
            polygon.points.len(),
            polygon.lines.len(),
            polygon.triangles.len()
        );

        Ok(polygon)
    }

    /// All vertices
    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// All deduplicated lines
    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Get a line by index
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// All triangles
    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Indices of the triangles that reference a line
    #[must_use]
    pub fn triangles_from_line_index(&self, line_index: usize) -> &[usize] {
        self.line_triangles
            .get(line_index)
            .map(|triangles| triangles.as_slice())
            .unwrap_or_default()
    }

    /// Index of the first triangle containing the point
    #[must_use]
    pub fn triangle_containing(&self, point: Vec2) -> Option<usize> {
        self.triangles.iter().position(|triangle| triangle.contains(point))
    }
}
