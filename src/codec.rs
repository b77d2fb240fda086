//! Binary tree format.
//!
//! ```text
//! header: top_left.x  top_left.y  bottom_right.x  bottom_right.y   (4 x f32 LE)
//! body:   preorder node stream
//!         0x20 <label:u8>          leaf
//!         0x10 <child0..child3>    internal node, children in quadrant order
//! ```
//!
//! Only the root bound is stored. The decoder rebuilds every other bound by
//! bisection, exactly as the builder produced them.

use crate::error::{GeomoirError, Result};
use crate::quadtree::{MAX_TREE_DEPTH, Node, QuadTree};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use geomoir_types::{Bound, Coordinate};

pub const NODE_TAG: u8 = 0x10;
pub const LEAF_TAG: u8 = 0x20;

/// Size of the bound header in bytes.
pub const HEADER_LEN: usize = 4 * 4;

/// Exact size of the encoded tree.
pub fn encoded_len(tree: &QuadTree) -> usize {
    let stats = tree.stats();
    HEADER_LEN + stats.internal_nodes + 2 * stats.leaves
}

/// Encode a tree into its binary form.
pub fn encode(tree: &QuadTree) -> Bytes {
    let mut buf = BytesMut::with_capacity(encoded_len(tree));
    encode_into(tree, &mut buf);
    buf.freeze()
}

/// Encode a tree into any buffer.
pub fn encode_into<B: BufMut>(tree: &QuadTree, buf: &mut B) {
    let bound = tree.bound();
    buf.put_f32_le(bound.top_left.x);
    buf.put_f32_le(bound.top_left.y);
    buf.put_f32_le(bound.bottom_right.x);
    buf.put_f32_le(bound.bottom_right.y);

    let mut stack = vec![tree.root()];
    while let Some(node) = stack.pop() {
        match node {
            Node::Leaf(label) => {
                buf.put_u8(LEAF_TAG);
                buf.put_u8(*label);
            }
            Node::Internal(children) => {
                buf.put_u8(NODE_TAG);
                stack.extend(children.iter().rev());
            }
        }
    }
}

/// Decode a tree from its binary form.
///
/// The whole input must be consumed by exactly one tree.
pub fn decode(bytes: &[u8]) -> Result<QuadTree> {
    let mut reader = Reader::new(bytes);

    reader.require(HEADER_LEN)?;
    let top_left = Coordinate::new(reader.buf.get_f32_le(), reader.buf.get_f32_le());
    let bottom_right = Coordinate::new(reader.buf.get_f32_le(), reader.buf.get_f32_le());
    let bound = Bound::new(top_left, bottom_right);
    if !bound.is_valid() {
        return Err(GeomoirError::InvalidFormat(format!(
            "header bound {} is not a valid rectangle",
            bound
        )));
    }

    let root = reader.read_node(0)?;

    if reader.buf.has_remaining() {
        return Err(GeomoirError::InvalidFormat(format!(
            "{} trailing byte(s) after the tree at offset {}",
            reader.buf.remaining(),
            reader.offset()
        )));
    }

    Ok(QuadTree::new(bound, root))
}

struct Reader<'a> {
    buf: &'a [u8],
    len: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            len: buf.len(),
        }
    }

    fn offset(&self) -> usize {
        self.len - self.buf.remaining()
    }

    fn require(&self, count: usize) -> Result<()> {
        let remaining = self.buf.remaining();
        if remaining < count {
            return Err(GeomoirError::TruncatedInput {
                offset: self.offset(),
                needed: count - remaining,
            });
        }
        Ok(())
    }

    fn read_node(&mut self, depth: usize) -> Result<Node> {
        if depth > MAX_TREE_DEPTH {
            return Err(GeomoirError::InvalidFormat(format!(
                "tree nesting exceeds the maximum depth of {}",
                MAX_TREE_DEPTH
            )));
        }

        self.require(1)?;
        let offset = self.offset();
        match self.buf.get_u8() {
            LEAF_TAG => {
                self.require(1)?;
                Ok(Node::Leaf(self.buf.get_u8()))
            }
            NODE_TAG => Ok(Node::internal([
                self.read_node(depth + 1)?,
                self.read_node(depth + 1)?,
                self.read_node(depth + 1)?,
                self.read_node(depth + 1)?,
            ])),
            tag => Err(GeomoirError::InvalidFormat(format!(
                "unknown node tag 0x{:02x} at offset {}",
                tag, offset
            ))),
        }
    }
}
