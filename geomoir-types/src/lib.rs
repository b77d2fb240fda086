//! # geomoir-types
//!
//! Geometry primitives shared by the Geomoir quadtree builder, codec and
//! runtime query:
//!
//! - **Coordinates**: [`Coordinate`], a single-precision `(x, y)` pair
//! - **Bounds**: [`Bound`], an axis-aligned rectangle with the canonical
//!   midpoint bisection into four [`Quadrant`]s
//!
//! Every component that derives a child rectangle from its parent goes
//! through [`Bound::quadrant`], so the builder and the decoder can never
//! disagree about where a node lives.
//!
//! ## Examples
//!
//! ```rust
//! use geomoir_types::{Bound, Coordinate, Quadrant};
//!
//! let world = Bound::new(Coordinate::new(-180.0, -90.0), Coordinate::new(180.0, 90.0));
//! assert_eq!(world.mid(), Coordinate::new(0.0, 0.0));
//!
//! let south_west = world.quadrant(Quadrant::LowXLowY);
//! assert_eq!(south_west.bottom_right, Coordinate::new(0.0, 0.0));
//! assert_eq!(Quadrant::locate(world.mid(), Coordinate::new(0.0, 0.0)), Quadrant::LowXLowY);
//! ```

pub mod bound;
pub mod coord;

pub use bound::{Bound, Quadrant};
pub use coord::Coordinate;
