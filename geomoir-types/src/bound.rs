use crate::coord::Coordinate;
use geo::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four children of a bisected [`Bound`].
///
/// The discriminant is the child index used by the quadtree and by the
/// binary format, so the order must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Quadrant {
    /// From `top_left` to `mid`
    LowXLowY = 0,
    /// From `(mid.x, top_left.y)` to `(bottom_right.x, mid.y)`
    HighXLowY = 1,
    /// From `(top_left.x, mid.y)` to `(mid.x, bottom_right.y)`
    LowXHighY = 2,
    /// From `mid` to `bottom_right`
    HighXHighY = 3,
}

impl Quadrant {
    /// All quadrants in child index order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::LowXLowY,
        Quadrant::HighXLowY,
        Quadrant::LowXHighY,
        Quadrant::HighXHighY,
    ];

    /// Child index of this quadrant.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Pick the quadrant a point falls into, given the parent's midpoint.
    ///
    /// Comparisons are non-strict, so a point lying exactly on a split line
    /// always goes to the low side of that line.
    ///
    /// ```
    /// use geomoir_types::{Coordinate, Quadrant};
    ///
    /// let mid = Coordinate::new(0.0, 0.0);
    /// assert_eq!(Quadrant::locate(mid, mid), Quadrant::LowXLowY);
    /// assert_eq!(Quadrant::locate(mid, Coordinate::new(0.0, 1.0)), Quadrant::LowXHighY);
    /// assert_eq!(Quadrant::locate(mid, Coordinate::new(1.0, 0.0)), Quadrant::HighXLowY);
    /// ```
    pub fn locate(mid: Coordinate, point: Coordinate) -> Quadrant {
        let low_x = point.x <= mid.x;
        let low_y = point.y <= mid.y;
        match (low_x, low_y) {
            (true, true) => Quadrant::LowXLowY,
            (true, false) => Quadrant::LowXHighY,
            (false, true) => Quadrant::HighXLowY,
            (false, false) => Quadrant::HighXHighY,
        }
    }
}

/// An axis-aligned rectangle given by its two extreme corners.
///
/// `top_left` holds the minimum of both axes and `bottom_right` the maximum.
/// Use [`Bound::is_valid`] to check that invariant on untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    /// Minimum corner
    pub top_left: Coordinate,
    /// Maximum corner
    pub bottom_right: Coordinate,
}

impl Bound {
    /// Create a bound from its two corners.
    pub const fn new(top_left: Coordinate, bottom_right: Coordinate) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    /// Create a bound from its four edge values.
    pub const fn from_edges(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self::new(Coordinate::new(min_x, min_y), Coordinate::new(max_x, max_y))
    }

    /// Narrow a `geo::Rect`, e.g. the envelope of a set of polygons.
    pub fn from_rect(rect: &Rect<f64>) -> Self {
        Self::new(rect.min().into(), rect.max().into())
    }

    /// Both corners are finite and `top_left <= bottom_right` on both axes.
    pub fn is_valid(&self) -> bool {
        self.top_left.is_finite()
            && self.bottom_right.is_finite()
            && self.top_left.x <= self.bottom_right.x
            && self.top_left.y <= self.bottom_right.y
    }

    /// Width along the x axis.
    pub fn width(&self) -> f32 {
        self.bottom_right.x - self.top_left.x
    }

    /// Height along the y axis.
    pub fn height(&self) -> f32 {
        self.bottom_right.y - self.top_left.y
    }

    /// Area in double precision, comparable with polygon intersection areas.
    pub fn area(&self) -> f64 {
        (self.bottom_right.x as f64 - self.top_left.x as f64)
            * (self.bottom_right.y as f64 - self.top_left.y as f64)
    }

    /// Inclusive containment test. NaN coordinates are never contained.
    pub fn contains(&self, point: Coordinate) -> bool {
        point.x >= self.top_left.x
            && point.x <= self.bottom_right.x
            && point.y >= self.top_left.y
            && point.y <= self.bottom_right.y
    }

    /// Midpoint of the bound, evaluated in `f32`.
    ///
    /// This is the one bisection rule of the crate family. The builder, the
    /// decoder and the query all split through it.
    pub fn mid(&self) -> Coordinate {
        Coordinate::new(
            (self.bottom_right.x + self.top_left.x) / 2.0,
            (self.bottom_right.y + self.top_left.y) / 2.0,
        )
    }

    /// Bound of one child quadrant.
    pub fn quadrant(&self, quadrant: Quadrant) -> Bound {
        let mid = self.mid();
        let tl = self.top_left;
        let br = self.bottom_right;
        match quadrant {
            Quadrant::LowXLowY => Bound::new(tl, mid),
            Quadrant::HighXLowY => Bound::new(Coordinate::new(mid.x, tl.y), Coordinate::new(br.x, mid.y)),
            Quadrant::LowXHighY => Bound::new(Coordinate::new(tl.x, mid.y), Coordinate::new(mid.x, br.y)),
            Quadrant::HighXHighY => Bound::new(mid, br),
        }
    }

    /// All four child bounds in child index order.
    pub fn quadrants(&self) -> [Bound; 4] {
        Quadrant::ALL.map(|q| self.quadrant(q))
    }

    /// Widen to a `geo::Rect` for exact geometry operations.
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(self.top_left, self.bottom_right)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.top_left, self.bottom_right)
    }
}
