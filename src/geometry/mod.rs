//! Geometry module
//!
//! Rectangles, triangulated polygons and obstacle shapes consumed by the
//! navigation mesh and the spatial index.

mod polygon;
mod rect;
mod shape;

pub use polygon::{Line, Polygon, PolygonError, Triangle, point_in_triangle};
pub use rect::Rect;
pub use shape::Shape;
