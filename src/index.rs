//! Country polygons behind an R*-tree of their bounding boxes.
//!
//! [`CountryIndex`] is the concrete [`CountrySource`]: the R*-tree answers
//! the coarse envelope query, `geo` does the exact rectangle intersection
//! and the intersection area.

use crate::builder::{BuildStats, Candidate, CountrySource, QuadTreeBuilder};
use crate::config::BuildConfig;
use crate::error::{GeomoirError, Result};
use crate::labels::LabelTable;
use crate::quadtree::QuadTree;
use geo::{Area, BooleanOps, BoundingRect, Intersects, MultiPolygon};
use geomoir_types::Bound;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{AABB, RTree};

type IndexedEnvelope = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// One named country geometry, e.g. a row of a country boundaries dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeature {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

impl CountryFeature {
    pub fn new(name: impl Into<String>, geometry: impl Into<MultiPolygon<f64>>) -> Self {
        Self {
            name: name.into(),
            geometry: geometry.into(),
        }
    }
}

/// Coarse and fine spatial lookups over a fixed set of country features.
pub struct CountryIndex {
    features: Vec<CountryFeature>,
    tree: RTree<IndexedEnvelope>,
}

impl CountryIndex {
    /// Bulk load the features. Features with empty geometry are dropped.
    pub fn new(features: impl IntoIterator<Item = CountryFeature>) -> Self {
        let mut kept = Vec::new();
        let mut envelopes = Vec::new();

        for feature in features {
            let Some(rect) = feature.geometry.bounding_rect() else {
                log::warn!("Skipping country '{}' with empty geometry", feature.name);
                continue;
            };

            let envelope = Rectangle::from_corners(
                [rect.min().x, rect.min().y],
                [rect.max().x, rect.max().y],
            );
            envelopes.push(GeomWithData::new(envelope, kept.len()));
            kept.push(feature);
        }

        log::debug!("Indexed {} country features", kept.len());

        Self {
            features: kept,
            tree: RTree::bulk_load(envelopes),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[CountryFeature] {
        &self.features
    }

    /// Feature names in scan order, repeated for multi-feature countries.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }

    /// Bounding box of every indexed geometry, `None` when empty.
    pub fn envelope(&self) -> Option<Bound> {
        if self.tree.size() == 0 {
            return None;
        }
        let envelope = self.tree.root().envelope();
        let (lower, upper) = (envelope.lower(), envelope.upper());
        Some(Bound::new(
            geomoir_types::Coordinate::from_f64(lower[0], lower[1]),
            geomoir_types::Coordinate::from_f64(upper[0], upper[1]),
        ))
    }

    /// Run the offline pipeline: register every country name in scan order,
    /// then build the tree over the configured bound or the index envelope.
    pub fn build_tree(&self, config: &BuildConfig) -> Result<BuildOutput> {
        config.validate().map_err(GeomoirError::InvalidInput)?;

        let mut labels = LabelTable::new();
        for name in self.names() {
            labels.intern(name)?;
        }

        let bound = match config.bound.or_else(|| self.envelope()) {
            Some(bound) => bound,
            None => {
                return Err(GeomoirError::InvalidInput(
                    "no countries to build a tree from and no bound configured".to_string(),
                ));
            }
        };

        let mut builder = QuadTreeBuilder::new(self, &mut labels).configure(config);
        let tree = builder.build(bound)?;
        let stats = builder.stats();

        Ok(BuildOutput {
            tree,
            labels,
            stats,
        })
    }
}

/// Result of [`CountryIndex::build_tree`].
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub tree: QuadTree,
    pub labels: LabelTable,
    pub stats: BuildStats,
}

impl CountrySource for CountryIndex {
    type Geometry = MultiPolygon<f64>;

    fn candidates(&self, envelope: &Bound) -> Vec<Candidate<'_, MultiPolygon<f64>>> {
        let query = AABB::from_corners(
            [envelope.top_left.x as f64, envelope.top_left.y as f64],
            [envelope.bottom_right.x as f64, envelope.bottom_right.y as f64],
        );

        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .map(|entry| entry.data)
            .collect();
        // Scan order keeps tie-breaks reproducible across runs
        hits.sort_unstable();

        hits.into_iter()
            .map(|i| Candidate {
                name: &self.features[i].name,
                geometry: &self.features[i].geometry,
            })
            .collect()
    }

    fn intersects(&self, geometry: &MultiPolygon<f64>, cell: &Bound) -> bool {
        geometry.intersects(&cell.to_rect())
    }

    fn intersection_area(&self, geometry: &MultiPolygon<f64>, cell: &Bound) -> f64 {
        let cell = MultiPolygon::new(vec![cell.to_rect().to_polygon()]);
        geometry.intersection(&cell).unsigned_area()
    }
}
