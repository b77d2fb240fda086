use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D coordinate stored in single precision.
///
/// `x` is longitude and `y` latitude by convention, but nothing in the
/// quadtree depends on that: the structure is axis-agnostic.
///
/// # Examples
///
/// ```
/// use geomoir_types::Coordinate;
///
/// let oxford = Coordinate::new(-1.25, 51.7);
/// assert_eq!(oxford.x, -1.25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    /// Longitude or x value
    pub x: f32,
    /// Latitude or y value
    pub y: f32,
}

impl Coordinate {
    /// Create a coordinate from its two components.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Narrow a double-precision coordinate, as produced by polygon sources.
    pub fn from_f64(x: f64, y: f64) -> Self {
        Self {
            x: x as f32,
            y: y as f32,
        }
    }

    /// Check that both components are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<Coordinate> for geo::Coord<f64> {
    fn from(coord: Coordinate) -> Self {
        geo::coord! { x: coord.x as f64, y: coord.y as f64 }
    }
}

impl From<geo::Coord<f64>> for Coordinate {
    fn from(coord: geo::Coord<f64>) -> Self {
        Self::from_f64(coord.x, coord.y)
    }
}

impl From<(f32, f32)> for Coordinate {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
