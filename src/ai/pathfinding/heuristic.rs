//! Distance estimates used to guide informed searches
//!
//! Every heuristic takes the absolute coordinate deltas `|dx|` and `|dy|`
//! between a node and the goal.

/// Signature shared by all heuristics
pub type Heuristic = fn(f32, f32) -> f32;

/// Sum of the deltas; admissible on 4-connected grids
#[must_use]
pub fn manhattan(dx: f32, dy: f32) -> f32 {
    dx + dy
}

/// Straight-line distance
#[must_use]
pub fn euclidean(dx: f32, dy: f32) -> f32 {
    dx.hypot(dy)
}

/// Squared straight-line distance; fast but not admissible
#[must_use]
pub fn sqr_euclidean(dx: f32, dy: f32) -> f32 {
    dx * dx + dy * dy
}

/// Diagonal moves cost sqrt(2), straight moves cost 1
#[must_use]
pub fn octile(dx: f32, dy: f32) -> f32 {
    let f = std::f32::consts::SQRT_2 - 1.0;
    if dx < dy { f * dx + dy } else { f * dy + dx }
}

/// Largest delta; diagonal moves cost the same as straight ones
#[must_use]
pub fn chebyshev(dx: f32, dy: f32) -> f32 {
    dx.max(dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_values() {
        assert!((manhattan(3.0, 4.0) - 7.0).abs() < 0.001);
        assert!((euclidean(3.0, 4.0) - 5.0).abs() < 0.001);
        assert!((sqr_euclidean(3.0, 4.0) - 25.0).abs() < 0.001);
        assert!((chebyshev(3.0, 4.0) - 4.0).abs() < 0.001);
        assert!((octile(3.0, 4.0) - (4.0 + 3.0 * (std::f32::consts::SQRT_2 - 1.0))).abs() < 0.001);
    }

    #[test]
    fn test_octile_is_symmetric() {
        assert!((octile(2.0, 5.0) - octile(5.0, 2.0)).abs() < 0.001);
    }

    #[test]
    fn test_heuristics_are_zero_at_goal() {
        let all: [Heuristic; 5] = [manhattan, euclidean, sqr_euclidean, octile, chebyshev];
        for heuristic in all {
            assert_eq!(heuristic(0.0, 0.0), 0.0);
        }
    }
}
