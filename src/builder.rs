//! Offline quadtree construction.
//!
//! The builder recursively bisects a bound. At each cell it asks a
//! [`CountrySource`] for coarse candidates, filters them with the exact
//! intersection test and either settles the cell as a leaf or splits it
//! into its four quadrants.

use crate::config::{BuildConfig, LeafPolicy};
use crate::error::{GeomoirError, Result};
use crate::labels::{LabelTable, NO_COUNTRY};
use crate::quadtree::{MAX_TREE_DEPTH, Node, QuadTree};
use geomoir_types::Bound;
use smallvec::SmallVec;

/// Relative tolerance when deciding that a country covers a whole cell.
const COVER_TOLERANCE: f64 = 1e-9;

/// A country geometry returned by the coarse index.
#[derive(Debug)]
pub struct Candidate<'a, G> {
    pub name: &'a str,
    pub geometry: &'a G,
}

impl<G> Clone for Candidate<'_, G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G> Copy for Candidate<'_, G> {}

/// The polygon collaborators of the builder.
///
/// Implementations must behave as pure functions: the same envelope or cell
/// always yields the same answer.
pub trait CountrySource {
    type Geometry;

    /// Countries whose bounding box intersects `envelope`. May over-approximate.
    fn candidates(&self, envelope: &Bound) -> Vec<Candidate<'_, Self::Geometry>>;

    /// Exact test of `geometry` against the rectangle `cell`.
    fn intersects(&self, geometry: &Self::Geometry, cell: &Bound) -> bool;

    /// Area of the intersection of `geometry` with the rectangle `cell`.
    fn intersection_area(&self, geometry: &Self::Geometry, cell: &Bound) -> f64;
}

/// Counters collected while building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildStats {
    pub leaves: usize,
    pub internal_nodes: usize,
    /// Leaves settled by largest overlap at `max_depth`
    pub forced_leaves: usize,
    /// Depth of the deepest leaf
    pub depth: usize,
}

/// Recursive quadtree builder over a [`CountrySource`].
///
/// Labels are assigned through the given [`LabelTable`] as countries end up
/// in leaves; names already registered keep their label.
pub struct QuadTreeBuilder<'a, S: CountrySource> {
    source: &'a S,
    labels: &'a mut LabelTable,
    max_depth: usize,
    leaf_policy: LeafPolicy,
    stats: BuildStats,
}

impl<'a, S: CountrySource> QuadTreeBuilder<'a, S> {
    pub fn new(source: &'a S, labels: &'a mut LabelTable) -> Self {
        let defaults = BuildConfig::default();
        Self {
            source,
            labels,
            max_depth: defaults.max_depth,
            leaf_policy: defaults.leaf_policy,
            stats: BuildStats::default(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_leaf_policy(mut self, policy: LeafPolicy) -> Self {
        self.leaf_policy = policy;
        self
    }

    /// Apply the tree-shaping settings of a [`BuildConfig`].
    pub fn configure(self, config: &BuildConfig) -> Self {
        self.with_max_depth(config.max_depth)
            .with_leaf_policy(config.leaf_policy)
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Build the tree covering `bound`.
    ///
    /// Fails with [`GeomoirError::LabelOverflow`] when the countries reaching
    /// leaves do not fit into the label table.
    pub fn build(&mut self, bound: Bound) -> Result<QuadTree> {
        if !bound.is_valid() {
            return Err(GeomoirError::InvalidInput(format!(
                "root bound {} is not a valid rectangle",
                bound
            )));
        }
        if self.max_depth > MAX_TREE_DEPTH {
            return Err(GeomoirError::InvalidInput(format!(
                "max depth {} exceeds the limit of {}",
                self.max_depth, MAX_TREE_DEPTH
            )));
        }

        self.stats = BuildStats::default();
        let root = self.build_node(bound, 0)?;

        log::info!(
            "Built quadtree over {}: {} leaves ({} forced), {} internal nodes, depth {}",
            bound,
            self.stats.leaves,
            self.stats.forced_leaves,
            self.stats.internal_nodes,
            self.stats.depth
        );

        Ok(QuadTree::new(bound, root))
    }

    fn build_node(&mut self, bound: Bound, depth: usize) -> Result<Node> {
        let source = self.source;
        let fine: SmallVec<[Candidate<'a, S::Geometry>; 8]> = source
            .candidates(&bound)
            .into_iter()
            .filter(|c| source.intersects(c.geometry, &bound))
            .collect();

        let settled = match self.leaf_policy {
            LeafPolicy::Intersecting => self.settle_intersecting(&fine, &bound, depth)?,
            LeafPolicy::Covering => self.settle_covering(&fine, &bound, depth)?,
        };

        if let Some(label) = settled {
            return Ok(self.leaf(label, &bound, depth));
        }

        let [q0, q1, q2, q3] = bound.quadrants();
        let children = [
            self.build_node(q0, depth + 1)?,
            self.build_node(q1, depth + 1)?,
            self.build_node(q2, depth + 1)?,
            self.build_node(q3, depth + 1)?,
        ];
        self.stats.internal_nodes += 1;

        Ok(Node::internal(children))
    }

    /// At most one intersecting country settles the cell; otherwise the
    /// largest overlap wins once `max_depth` is reached.
    fn settle_intersecting(
        &mut self,
        fine: &[Candidate<'a, S::Geometry>],
        bound: &Bound,
        depth: usize,
    ) -> Result<Option<u8>> {
        let mut names = fine.iter().map(|c| c.name);
        let first = names.next();
        if names.all(|name| Some(name) == first) {
            let label = self.labels.intern(first.unwrap_or(""))?;
            return Ok(Some(label));
        }

        if depth >= self.max_depth {
            let areas = self.candidate_areas(fine, bound);
            return self.largest_overlap(&areas).map(Some);
        }

        Ok(None)
    }

    /// Only positive overlaps count, and a lone country must cover the cell
    /// with one of its geometries.
    fn settle_covering(
        &mut self,
        fine: &[Candidate<'a, S::Geometry>],
        bound: &Bound,
        depth: usize,
    ) -> Result<Option<u8>> {
        let mut areas = self.candidate_areas(fine, bound);
        areas.retain(|(_, area)| *area > 0.0);

        let Some(&(first, _)) = areas.first() else {
            return Ok(Some(NO_COUNTRY));
        };
        if areas.iter().all(|(name, _)| *name == first) {
            let cell_area = bound.area() * (1.0 - COVER_TOLERANCE);
            if areas.iter().any(|(_, area)| *area >= cell_area) {
                return self.labels.intern(first).map(Some);
            }
        }

        if depth >= self.max_depth {
            return self.largest_overlap(&areas).map(Some);
        }

        Ok(None)
    }

    /// Intersection area of every candidate geometry, in candidate order.
    fn candidate_areas(
        &self,
        fine: &[Candidate<'a, S::Geometry>],
        bound: &Bound,
    ) -> SmallVec<[(&'a str, f64); 8]> {
        fine.iter()
            .map(|c| (c.name, self.source.intersection_area(c.geometry, bound)))
            .collect()
    }

    /// Label of the geometry with the largest overlap, 0 when nothing truly
    /// overlaps. Equal areas keep candidate order.
    fn largest_overlap(&mut self, areas: &[(&'a str, f64)]) -> Result<u8> {
        self.stats.forced_leaves += 1;

        let mut ranked: SmallVec<[(&'a str, f64); 8]> = areas.iter().copied().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        match ranked.first() {
            Some((name, area)) if *area > 0.0 => self.labels.intern(name),
            _ => Ok(NO_COUNTRY),
        }
    }

    fn leaf(&mut self, label: u8, bound: &Bound, depth: usize) -> Node {
        self.stats.leaves += 1;
        self.stats.depth = self.stats.depth.max(depth);

        log::debug!(
            "Adding {}, depth {}, {}x{}",
            self.labels.name(label).unwrap_or_default(),
            depth,
            bound.width(),
            bound.height()
        );

        Node::Leaf(label)
    }
}
