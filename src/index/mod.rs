//! Index structures.

pub mod btree;

pub use btree::{BTreeIndex, IndexCursor, OpenMode, Scan, TreeStats};
