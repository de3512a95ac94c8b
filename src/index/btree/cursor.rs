//! Cursors and forward scans over the leaf chain.

use std::fmt;

use crate::common::{Error, PageId, RecordId, Result};
use crate::storage::PagedStorage;

use super::tree::BTreeIndex;

/// A position inside a leaf: the leaf's page and an entry index.
///
/// Only meaningful while that leaf is unchanged; an insert may move entries
/// to another page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexCursor {
    pub page_id: PageId,
    pub entry_index: usize,
}

impl IndexCursor {
    #[inline]
    pub fn new(page_id: PageId, entry_index: usize) -> Self {
        Self {
            page_id,
            entry_index,
        }
    }
}

impl fmt::Display for IndexCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cursor({}, {})", self.page_id.0, self.entry_index)
    }
}

/// Iterator over index entries in key order, built on
/// [`BTreeIndex::read_forward`].
///
/// Stops at the end of the leaf chain, at the first key above the upper
/// bound, or after yielding the first error.
pub struct Scan<'a, S: PagedStorage> {
    index: &'a mut BTreeIndex<S>,
    cursor: Option<IndexCursor>,
    upper: Option<i32>,
}

impl<'a, S: PagedStorage> Scan<'a, S> {
    pub(crate) fn new(index: &'a mut BTreeIndex<S>, start: IndexCursor, upper: Option<i32>) -> Self {
        Self {
            index,
            cursor: Some(start),
            upper,
        }
    }
}

impl<S: PagedStorage> Iterator for Scan<'_, S> {
    type Item = Result<(i32, RecordId)>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.take()?;
        match self.index.read_forward(cursor) {
            Ok((key, _, _)) if self.upper.is_some_and(|upper| key > upper) => None,
            Ok((key, rid, next)) => {
                self.cursor = Some(next);
                Some(Ok((key, rid)))
            }
            Err(Error::EndOfTree) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
