//! Runtime country lookup over a loaded tree and label table.

use crate::error::{GeomoirError, Result};
use crate::labels::LabelTable;
use crate::quadtree::QuadTree;
use geomoir_types::Coordinate;

/// A quadtree joined with the label table it was built with.
///
/// Immutable after construction. Share it across threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct CountryLocator {
    tree: QuadTree,
    labels: LabelTable,
}

impl CountryLocator {
    /// Join a tree with its labels. Every leaf label must exist in the table.
    pub fn new(tree: QuadTree, labels: LabelTable) -> Result<Self> {
        if let Some(missing) = tree
            .labels()
            .into_iter()
            .find(|&label| !labels.contains_label(label))
        {
            return Err(GeomoirError::InvalidFormat(format!(
                "tree references label {} but the label table has {} entries",
                missing,
                labels.len()
            )));
        }

        Ok(Self { tree, labels })
    }

    pub fn tree(&self) -> &QuadTree {
        &self.tree
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Raw label at `point`.
    pub fn label(&self, point: Coordinate) -> Result<u8> {
        self.tree.query(point)
    }

    /// Country name at `point`, `None` outside every country.
    pub fn locate(&self, point: Coordinate) -> Result<Option<&str>> {
        let label = self.tree.query(point)?;
        Ok(self.labels.country(label))
    }

    /// Convenience for longitude/latitude pairs.
    pub fn locate_lon_lat(&self, lon: f32, lat: f32) -> Result<Option<&str>> {
        self.locate(Coordinate::new(lon, lat))
    }
}
