//! Region quadtree mapping every point of a bound to a one-byte label.
//!
//! Nodes do not carry their rectangles. The tree keeps the root [`Bound`]
//! and every traversal derives child bounds through [`Bound::quadrant`],
//! which is also what the decoder does when it rebuilds a tree from bytes.

use crate::error::{GeomoirError, Result};
use geomoir_types::{Bound, Coordinate, Quadrant};

/// Deepest tree the crate builds or decodes.
pub const MAX_TREE_DEPTH: usize = 64;

/// A quadtree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Terminal region carrying a country label (0 = no country).
    Leaf(u8),
    /// Four exclusively owned children in [`Quadrant`] index order.
    Internal(Box<[Node; 4]>),
}

impl Node {
    pub fn internal(children: [Node; 4]) -> Self {
        Node::Internal(Box::new(children))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Child in the given quadrant, `None` for leaves.
    pub fn child(&self, quadrant: Quadrant) -> Option<&Node> {
        match self {
            Node::Leaf(_) => None,
            Node::Internal(children) => Some(&children[quadrant.index()]),
        }
    }

    /// Label of a leaf, `None` for internal nodes.
    pub fn label(&self) -> Option<u8> {
        match self {
            Node::Leaf(label) => Some(*label),
            Node::Internal(_) => None,
        }
    }

    fn visit_leaves(&self, bound: Bound, depth: usize, on_leaf: &mut impl FnMut(Bound, usize, u8)) {
        match self {
            Node::Leaf(label) => on_leaf(bound, depth, *label),
            Node::Internal(children) => {
                for (child, child_bound) in children.iter().zip(bound.quadrants()) {
                    child.visit_leaves(child_bound, depth + 1, on_leaf);
                }
            }
        }
    }
}

/// Shape summary of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStats {
    pub leaves: usize,
    pub internal_nodes: usize,
    /// Depth of the deepest leaf; a single-leaf tree has depth 0.
    pub depth: usize,
}

/// A quadtree together with the bound of its root.
///
/// The tree is immutable once built or decoded and is `Send + Sync`, so it
/// can be shared behind an `Arc` by any number of readers.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadTree {
    bound: Bound,
    root: Node,
}

impl QuadTree {
    pub fn new(bound: Bound, root: Node) -> Self {
        Self { bound, root }
    }

    /// A tree consisting of one leaf covering `bound`.
    pub fn leaf(bound: Bound, label: u8) -> Self {
        Self::new(bound, Node::Leaf(label))
    }

    pub fn bound(&self) -> Bound {
        self.bound
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Label of the region containing `point`.
    ///
    /// Points on a split line resolve to the low side of it, see
    /// [`Quadrant::locate`]. Fails with [`GeomoirError::OutOfBounds`] when
    /// the point is outside the root bound.
    ///
    /// ```
    /// use geomoir::{Bound, Coordinate, Node, QuadTree};
    ///
    /// let world = Bound::from_edges(-180.0, -90.0, 180.0, 90.0);
    /// let tree = QuadTree::new(
    ///     world,
    ///     Node::internal([Node::Leaf(1), Node::Leaf(0), Node::Leaf(0), Node::Leaf(2)]),
    /// );
    /// assert_eq!(tree.query(Coordinate::new(-90.0, -45.0))?, 1);
    /// assert_eq!(tree.query(Coordinate::new(90.0, 45.0))?, 2);
    /// assert!(tree.query(Coordinate::new(-181.0, 0.0)).is_err());
    /// # Ok::<(), geomoir::GeomoirError>(())
    /// ```
    pub fn query(&self, point: Coordinate) -> Result<u8> {
        let mut node = &self.root;
        let mut bound = self.bound;

        loop {
            if !bound.contains(point) {
                return Err(GeomoirError::OutOfBounds {
                    x: point.x,
                    y: point.y,
                });
            }

            match node {
                Node::Leaf(label) => return Ok(*label),
                Node::Internal(children) => {
                    let quadrant = Quadrant::locate(bound.mid(), point);
                    node = &children[quadrant.index()];
                    bound = bound.quadrant(quadrant);
                }
            }
        }
    }

    /// Walk the leaves in preorder with their derived bound and depth.
    pub fn visit_leaves(&self, mut on_leaf: impl FnMut(Bound, usize, u8)) {
        self.root.visit_leaves(self.bound, 0, &mut on_leaf);
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        let mut stack = vec![(&self.root, 0usize)];

        while let Some((node, depth)) = stack.pop() {
            match node {
                Node::Leaf(_) => {
                    stats.leaves += 1;
                    stats.depth = stats.depth.max(depth);
                }
                Node::Internal(children) => {
                    stats.internal_nodes += 1;
                    stack.extend(children.iter().map(|child| (child, depth + 1)));
                }
            }
        }

        stats
    }

    /// Every distinct label used by a leaf, ascending.
    pub fn labels(&self) -> Vec<u8> {
        let mut seen = [false; 256];
        self.visit_leaves(|_, _, label| seen[label as usize] = true);
        (0..=u8::MAX).filter(|&label| seen[label as usize]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> Bound {
        Bound::from_edges(-180.0, -90.0, 180.0, 90.0)
    }

    fn two_level_tree() -> QuadTree {
        QuadTree::new(
            world(),
            Node::internal([
                Node::internal([Node::Leaf(1), Node::Leaf(2), Node::Leaf(3), Node::Leaf(4)]),
                Node::Leaf(5),
                Node::Leaf(6),
                Node::Leaf(7),
            ]),
        )
    }

    #[test]
    fn test_single_leaf_query() {
        let tree = QuadTree::leaf(world(), 9);
        assert_eq!(tree.query(Coordinate::new(12.0, 34.0)).unwrap(), 9);
        assert_eq!(tree.query(Coordinate::new(180.0, 90.0)).unwrap(), 9);
    }

    #[test]
    fn test_query_descends_by_quadrant() {
        let tree = two_level_tree();
        assert_eq!(tree.query(Coordinate::new(-135.0, -67.5)).unwrap(), 1);
        assert_eq!(tree.query(Coordinate::new(-45.0, -67.5)).unwrap(), 2);
        assert_eq!(tree.query(Coordinate::new(-135.0, -22.5)).unwrap(), 3);
        assert_eq!(tree.query(Coordinate::new(-45.0, -22.5)).unwrap(), 4);
        assert_eq!(tree.query(Coordinate::new(90.0, -45.0)).unwrap(), 5);
        assert_eq!(tree.query(Coordinate::new(-90.0, 45.0)).unwrap(), 6);
        assert_eq!(tree.query(Coordinate::new(90.0, 45.0)).unwrap(), 7);
    }

    #[test]
    fn test_boundary_determinism() {
        let tree = QuadTree::new(
            world(),
            Node::internal([Node::Leaf(0), Node::Leaf(1), Node::Leaf(2), Node::Leaf(3)]),
        );
        let mid = world().mid();
        let br = world().bottom_right;

        assert_eq!(tree.query(mid).unwrap(), 0);
        assert_eq!(tree.query(Coordinate::new(mid.x, br.y)).unwrap(), 2);
        assert_eq!(tree.query(Coordinate::new(br.x, mid.y)).unwrap(), 1);
        assert_eq!(tree.query(br).unwrap(), 3);
    }

    #[test]
    fn test_split_lines_resolve_low_at_every_level() {
        let tree = two_level_tree();
        // Inner split of quadrant 0 sits at (-90, -45)
        assert_eq!(tree.query(Coordinate::new(-90.0, -45.0)).unwrap(), 1);
        assert_eq!(tree.query(Coordinate::new(-90.0, -10.0)).unwrap(), 3);
        assert_eq!(tree.query(Coordinate::new(-10.0, -45.0)).unwrap(), 2);
    }

    #[test]
    fn test_out_of_bounds() {
        let tree = two_level_tree();
        let tl = world().top_left;

        let err = tree.query(Coordinate::new(tl.x - 1.0, 0.0)).unwrap_err();
        assert!(matches!(err, GeomoirError::OutOfBounds { x, .. } if x == -181.0));
        assert!(tree.query(Coordinate::new(0.0, 91.0)).is_err());
        assert!(tree.query(Coordinate::new(f32::NAN, 0.0)).is_err());
        assert!(tree.query(tl).is_ok());
    }

    #[test]
    fn test_stats() {
        let stats = two_level_tree().stats();
        assert_eq!(
            stats,
            TreeStats {
                leaves: 7,
                internal_nodes: 2,
                depth: 2
            }
        );
        assert_eq!(QuadTree::leaf(world(), 0).stats().depth, 0);
    }

    #[test]
    fn test_visit_leaves_bounds() {
        let mut visited = Vec::new();
        two_level_tree().visit_leaves(|bound, depth, label| visited.push((bound, depth, label)));

        assert_eq!(visited.len(), 7);
        assert_eq!(visited[0], (Bound::from_edges(-180.0, -90.0, -90.0, -45.0), 2, 1));
        assert_eq!(visited[4], (Bound::from_edges(0.0, -90.0, 180.0, 0.0), 1, 5));
        assert_eq!(visited[6], (Bound::from_edges(0.0, 0.0, 180.0, 90.0), 1, 7));
    }

    #[test]
    fn test_labels() {
        let tree = QuadTree::new(
            world(),
            Node::internal([Node::Leaf(3), Node::Leaf(0), Node::Leaf(3), Node::Leaf(1)]),
        );
        assert_eq!(tree.labels(), vec![0, 1, 3]);
    }

    #[test]
    fn test_node_accessors() {
        let tree = two_level_tree();
        let root = tree.root();
        assert!(!root.is_leaf());
        assert_eq!(root.label(), None);
        assert_eq!(root.child(Quadrant::HighXHighY).and_then(Node::label), Some(7));
        assert!(Node::Leaf(1).child(Quadrant::LowXLowY).is_none());
    }

    #[test]
    fn test_tree_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QuadTree>();
    }
}
