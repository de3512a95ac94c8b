//! B+-tree index over a paged file.
//!
//! - [`LeafNode`] / [`InternalNode`] - page formats and node-level splits
//! - [`BTreeIndex`] - descent, insertion with split propagation, root growth
//! - [`IndexCursor`] / [`Scan`] - forward iteration along the leaf chain

mod cursor;
mod internal_node;
mod leaf_node;
mod meta;
mod tree;

pub use cursor::{IndexCursor, Scan};
pub use internal_node::{InternalEntry, InternalNode};
pub use leaf_node::{LeafEntry, LeafNode};
pub use meta::TreeMeta;
pub use tree::{BTreeIndex, OpenMode, TreeStats};
