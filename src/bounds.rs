//! Bounding region of one or more coordinate sequences.
//!
//! The padding is given in screen pixels, the same inset a map widget applies
//! when fitting a region. It is turned into degrees by assuming the region is
//! stretched across the viewport minus the padding on both sides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coordinate::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no coordinates to fit")]
pub struct EmptyGeometryError;

/// Screen-space inset in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Padding {
    pub x: u32,
    pub y: u32,
}

impl Default for Padding {
    fn default() -> Self {
        Self { x: 50, y: 50 }
    }
}

/// Size of the rendering surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl Bounds {
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    pub fn contains(&self, coord: &Coordinate) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&coord.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&coord.lng)
    }
}

/// Computes the smallest rectangle holding every coordinate, widened by
/// `padding` relative to `viewport`.
pub fn fit_bounds<S>(coord_sets: &[S], padding: Padding, viewport: Viewport) -> Result<Bounds, EmptyGeometryError>
where
    S: AsRef<[Coordinate]>,
{
    let mut points = coord_sets.iter().flat_map(|set| set.as_ref().iter());
    let first = points.next().ok_or(EmptyGeometryError)?;

    let (mut south, mut west, mut north, mut east) = (first.lat, first.lng, first.lat, first.lng);
    for point in points {
        south = south.min(point.lat);
        north = north.max(point.lat);
        west = west.min(point.lng);
        east = east.max(point.lng);
    }

    let pad_lat = inset(north - south, padding.y, viewport.height);
    let pad_lng = inset(east - west, padding.x, viewport.width);

    Ok(Bounds {
        south_west: Coordinate::new((south - pad_lat).max(-90.0), (west - pad_lng).max(-180.0)),
        north_east: Coordinate::new((north + pad_lat).min(90.0), (east + pad_lng).min(180.0)),
    })
}

/// Degrees to add on each side so that `span` fills the viewport minus
/// `pad_px` pixels at both edges.
fn inset(span: f64, pad_px: u32, viewport_px: u32) -> f64 {
    let usable = viewport_px as f64 - 2.0 * pad_px as f64;
    if usable <= 0.0 {
        return 0.0;
    }
    span * pad_px as f64 / usable
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kingston_to_montego_bay() -> Vec<Coordinate> {
        vec![
            Coordinate::new(17.9970, -76.7936),
            Coordinate::new(18.0096, -76.9574),
            Coordinate::new(18.4762, -77.8939),
        ]
    }

    #[test]
    fn test_empty_input_fails() {
        let empty: Vec<Vec<Coordinate>> = vec![];
        assert_eq!(
            fit_bounds(&empty, Padding::default(), Viewport::default()),
            Err(EmptyGeometryError)
        );
        let all_empty: Vec<Vec<Coordinate>> = vec![vec![], vec![]];
        assert!(fit_bounds(&all_empty, Padding::default(), Viewport::default()).is_err());
    }

    #[test]
    fn test_no_padding_is_tight() {
        let coords = kingston_to_montego_bay();
        let bounds = fit_bounds(&[coords], Padding { x: 0, y: 0 }, Viewport::default()).unwrap();
        assert_eq!(bounds.south_west, Coordinate::new(17.9970, -77.8939));
        assert_eq!(bounds.north_east, Coordinate::new(18.4762, -76.7936));
    }

    #[test]
    fn test_padding_widens_and_contains_everything() {
        let primary = kingston_to_montego_bay();
        let alternative = vec![Coordinate::new(18.2, -77.5), Coordinate::new(18.6, -77.2)];
        let bounds = fit_bounds(
            &[primary.clone(), alternative.clone()],
            Padding::default(),
            Viewport::default(),
        )
        .unwrap();

        for coord in primary.iter().chain(&alternative) {
            assert!(bounds.contains(coord), "{:?} outside {:?}", coord, bounds);
        }
        assert!(bounds.south_west.lat < 17.9970);
        assert!(bounds.north_east.lat > 18.6);
    }

    #[test]
    fn test_padding_proportion() {
        let coords = vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 2.0)];
        // usable height 600 - 100 = 500, so 1 degree gets 50/500 on each side
        let bounds = fit_bounds(&[coords], Padding::default(), Viewport::default()).unwrap();
        assert!((bounds.south_west.lat + 0.1).abs() < 1e-9);
        assert!((bounds.north_east.lat - 1.1).abs() < 1e-9);
        // usable width 800 - 100 = 700
        assert!((bounds.north_east.lng - (2.0 + 2.0 * 50.0 / 700.0)).abs() < 1e-9);
    }

    #[test]
    fn test_single_point_and_center() {
        let point = Coordinate::new(18.1096, -77.2975);
        let bounds = fit_bounds(&[vec![point]], Padding::default(), Viewport::default()).unwrap();
        assert!(bounds.contains(&point));
        assert_eq!(bounds.center(), point);
    }

    #[test]
    fn test_oversized_padding_is_ignored() {
        let coords = vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)];
        let bounds = fit_bounds(
            &[coords],
            Padding { x: 500, y: 500 },
            Viewport { width: 800, height: 600 },
        )
        .unwrap();
        assert_eq!(bounds.south_west, Coordinate::new(0.0, 0.0));
        assert_eq!(bounds.north_east, Coordinate::new(1.0, 1.0));
    }
}
