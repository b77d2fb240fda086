//! Country lookup for coordinates through a precomputed region quadtree.
//!
//! The tree is built once, offline, from country polygons and stored in a
//! compact binary file next to a list of country names. At runtime the file
//! is decoded and every lookup is a short walk down the tree, with no
//! polygon geometry involved.
//!
//! ## Features
//! - **Builder**: recursive bisection against an R*-tree of country envelopes
//!   with exact `geo` intersection tests
//! - **Codec**: preorder binary format storing only the root bound
//! - **Locator**: immutable, thread-shareable `point -> country` lookups
//! - **GeoJSON input** (`geojson` feature, on by default)
//!
//! ```rust
//! use geomoir::{BuildConfig, CountryFeature, CountryIndex, CountryLocator, codec};
//! use geo::{Rect, coord};
//!
//! let west = Rect::new(coord! { x: -180.0, y: -90.0 }, coord! { x: 0.0, y: 90.0 });
//! let index = CountryIndex::new(vec![CountryFeature::new("Westeros", west.to_polygon())]);
//!
//! let config = BuildConfig::default()
//!     .with_max_depth(4)
//!     .with_bound(geomoir::Bound::from_edges(-180.0, -90.0, 180.0, 90.0));
//! let output = index.build_tree(&config)?;
//!
//! let bytes = codec::encode(&output.tree);
//! let locator = CountryLocator::new(codec::decode(&bytes)?, output.labels)?;
//! assert_eq!(locator.locate_lon_lat(-1.25, 51.7)?, Some("Westeros"));
//! # Ok::<(), geomoir::GeomoirError>(())
//! ```

#[cfg(feature = "geojson")]
pub mod boundaries;
pub mod builder;
pub mod codec;
pub mod config;
pub mod error;
pub mod index;
pub mod labels;
pub mod locator;
pub mod quadtree;
pub mod storage;

pub use builder::{BuildStats, Candidate, CountrySource, QuadTreeBuilder};
pub use config::{BuildConfig, LeafPolicy};
pub use error::{GeomoirError, Result};
pub use index::{BuildOutput, CountryFeature, CountryIndex};
pub use labels::{LabelTable, NO_COUNTRY};
pub use locator::CountryLocator;
pub use quadtree::{MAX_TREE_DEPTH, Node, QuadTree, TreeStats};
pub use storage::IndexFiles;

pub use geomoir_types::{Bound, Coordinate, Quadrant};

#[cfg(feature = "geojson")]
pub use boundaries::{countries_from_geojson, load_countries};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{
        Bound, BuildConfig, Coordinate, CountryIndex, CountryLocator, GeomoirError, IndexFiles,
        LabelTable, LeafPolicy, QuadTree, Result,
    };
}
