//! Error types for pagetree.

use thiserror::Error;

use crate::common::{PageId, RecordId};
use crate::index::IndexCursor;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in pagetree.
///
/// Some variants are not failures in the usual sense: `KeyNotFound` still
/// carries a usable cursor and `EndOfTree` marks the normal end of a scan.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested page is past the end of the storage.
    #[error("Page {0} not found")]
    PageNotFound(u32),

    /// The index could not be opened.
    #[error("failed to open index '{name}': {reason}")]
    OpenFailed { name: String, reason: String },

    /// Open mode other than read or write.
    #[error("invalid open mode '{0}'")]
    InvalidMode(String),

    /// Persisting metadata or releasing the storage failed.
    #[error("failed to close index: {0}")]
    CloseFailed(String),

    /// Node is at capacity. Handled by splitting; never leaves the tree.
    #[error("node is full")]
    NodeFull,

    /// The key is already present in the index.
    #[error("duplicate key {0}")]
    DuplicateKey(i32),

    /// The key is not present. `cursor` points at its insertion point.
    #[error("key {key} not found")]
    KeyNotFound { key: i32, cursor: IndexCursor },

    /// A forward scan ran past the last leaf.
    #[error("end of tree")]
    EndOfTree,

    /// A node page failed to decode or a page pointer dangles.
    #[error("corrupt node: {0}")]
    CorruptNode(String),

    /// Entry index past the node's entry count.
    #[error("entry index {index} out of range (entry count {count})")]
    OutOfRange { index: usize, count: usize },

    /// An internal node with no separator keys was found on a leftmost descent.
    #[error("internal node has no entries")]
    Empty,

    /// Mutation attempted on an index opened for reading.
    #[error("index is opened read-only")]
    ReadOnly,

    /// Configuration values outside what the page layout supports.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No record at this id.
    #[error("record {0} not found")]
    RecordNotFound(RecordId),

    /// Record value longer than a record slot.
    #[error("value of {len} bytes exceeds the {max}-byte limit")]
    ValueTooLong { len: usize, max: usize },

    /// A load file line could not be parsed.
    #[error("invalid load line: {0:?}")]
    InvalidLoadLine(String),
}

impl Error {
    /// Build a `CorruptNode` error naming the page it was read from.
    pub(crate) fn corrupt(page_id: PageId, reason: impl std::fmt::Display) -> Self {
        Error::CorruptNode(format!("{}: {}", page_id, reason))
    }
}
