//! Interior waypoint sampling for map markers.

use serde::Serialize;

use crate::coordinate::Coordinate;

pub const DEFAULT_WAYPOINT_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waypoint {
    pub position: Coordinate,
    pub label: String,
}

/// Picks up to `count` evenly spaced interior points of a route.
///
/// The first and last coordinates are never returned; they are drawn as the
/// start and end markers. Routes with two points or fewer yield nothing.
pub fn sample(coords: &[Coordinate], count: usize) -> Vec<Waypoint> {
    if coords.len() <= 2 {
        return Vec::new();
    }

    let step = coords.len() / (count + 1);
    let last = coords.len() - 1;

    (1..=count)
        .map(|i| (i, i * step))
        .filter(|&(_, index)| index > 0 && index < last)
        .map(|(i, index)| Waypoint {
            position: coords[index],
            label: format!("Waypoint {}", i),
        })
        .collect()
}
