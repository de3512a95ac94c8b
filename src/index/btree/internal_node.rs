//! Internal (routing) node page format and node-level insert/split.

use crate::common::config::{INTERNAL_ENTRY_SIZE, INTERNAL_SLOT_CAPACITY, INT_SIZE, PAGE_SIZE};
use crate::common::{Error, PageId, Result};
use crate::storage::Page;

/// A separator key and the child to its right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternalEntry {
    pub key: i32,
    pub child: PageId,
}

/// Decoded view of an internal page.
///
/// Logically `child[0], key[1], child[1], ..., key[n], child[n]`: keys
/// reachable through `child[i]` are below `key[i+1]`, keys reachable through
/// `child[i+1]` are at or above it.
///
/// # Layout
/// ```text
/// Offset            Size  Field
/// ------            ----  -----
/// 0                 4     child[0]
/// 4 + 8 * i         4     key[i+1]
/// 8 + 8 * i         4     child[i+1]
/// PAGE_SIZE - 4     4     entry count n
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalNode {
    first_child: PageId,
    entries: Vec<InternalEntry>,
    max_entries: usize,
}

impl InternalNode {
    pub const OFFSET_FIRST_CHILD: usize = 0;
    pub const OFFSET_ENTRY_COUNT: usize = PAGE_SIZE - INT_SIZE;

    pub fn new(max_entries: usize) -> Self {
        Self {
            first_child: PageId::NULL,
            entries: Vec::with_capacity(max_entries + 1),
            max_entries,
        }
    }

    /// Decode an internal node from a page.
    ///
    /// # Errors
    /// Returns `Error::CorruptNode` if the entry count does not fit in a page
    /// or the separator keys are not strictly increasing.
    pub fn load(page: &Page, max_entries: usize) -> Result<Self> {
        let raw_count = page.read_i32(Self::OFFSET_ENTRY_COUNT);
        let count = usize::try_from(raw_count)
            .ok()
            .filter(|&n| n <= INTERNAL_SLOT_CAPACITY)
            .ok_or_else(|| Error::CorruptNode(format!("internal entry count {}", raw_count)))?;

        let mut entries: Vec<InternalEntry> = Vec::with_capacity(count.max(max_entries) + 1);
        for i in 0..count {
            let offset = INT_SIZE + i * INTERNAL_ENTRY_SIZE;
            let key = page.read_i32(offset);
            let child = PageId::new(page.read_u32(offset + INT_SIZE));
            if entries.last().is_some_and(|prev| prev.key >= key) {
                return Err(Error::CorruptNode(format!(
                    "separator keys out of order at entry {}",
                    i
                )));
            }
            entries.push(InternalEntry { key, child });
        }

        Ok(Self {
            first_child: PageId::new(page.read_u32(Self::OFFSET_FIRST_CHILD)),
            entries,
            max_entries,
        })
    }

    /// Encode into a fresh page.
    pub fn serialize(&self) -> Page {
        let mut page = Page::new();
        page.write_u32(Self::OFFSET_FIRST_CHILD, self.first_child.0);
        for (i, entry) in self.entries.iter().enumerate() {
            let offset = INT_SIZE + i * INTERNAL_ENTRY_SIZE;
            page.write_i32(offset, entry.key);
            page.write_u32(offset + INT_SIZE, entry.child.0);
        }
        page.write_i32(Self::OFFSET_ENTRY_COUNT, self.entries.len() as i32);
        page
    }

    /// Number of separator keys (one less than the number of children).
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.max_entries
    }

    pub fn entries(&self) -> &[InternalEntry] {
        &self.entries
    }

    /// `child[i]`, with `child[0]` being the leftmost pointer.
    #[cfg(test)]
    pub(crate) fn child_at(&self, i: usize) -> Option<PageId> {
        match i {
            0 => Some(self.first_child),
            _ => self.entries.get(i - 1).map(|e| e.child),
        }
    }

    /// Index of the first separator strictly greater than `key`.
    ///
    /// Equal keys route right, so the result doubles as the child index to
    /// descend into and as the insertion position for a new separator.
    fn route(&self, key: i32) -> usize {
        self.entries.partition_point(|e| e.key <= key)
    }

    /// The child whose subtree may contain `key`.
    pub fn locate_child(&self, key: i32) -> PageId {
        let idx = self.route(key);
        if idx == 0 {
            self.first_child
        } else {
            self.entries[idx - 1].child
        }
    }

    /// Insert a separator with the child to its right.
    ///
    /// # Errors
    /// Returns `Error::NodeFull` if the node is at capacity.
    pub fn insert(&mut self, key: i32, child: PageId) -> Result<()> {
        if self.is_full() {
            return Err(Error::NodeFull);
        }
        let idx = self.route(key);
        self.entries.insert(idx, InternalEntry { key, child });
        Ok(())
    }

    /// Insert into a full node and move the upper half to a new sibling.
    ///
    /// Of the `n + 1` entries this node keeps `(n + 1) / 2`. The next key is
    /// promoted: it is returned and kept in neither half, and its child
    /// becomes the sibling's `child[0]`.
    ///
    /// # Errors
    /// Returns `Error::Empty` if this node has no entries to split.
    pub fn insert_and_split(&mut self, key: i32, child: PageId) -> Result<(InternalNode, i32)> {
        if self.entries.is_empty() {
            return Err(Error::Empty);
        }
        let idx = self.route(key);
        self.entries.insert(idx, InternalEntry { key, child });

        let keep = self.entries.len() / 2;
        let mut upper = self.entries.split_off(keep);
        let promoted = upper.remove(0);

        let sibling = InternalNode {
            first_child: promoted.child,
            entries: upper,
            max_entries: self.max_entries,
        };
        Ok((sibling, promoted.key))
    }

    /// Reset to a single-separator root `[left, key, right]`.
    pub fn initialize_root(&mut self, left: PageId, key: i32, right: PageId) {
        self.first_child = left;
        self.entries.clear();
        self.entries.push(InternalEntry { key, child: right });
    }

    /// `child[0]`, the start of a leftmost descent.
    ///
    /// # Errors
    /// Returns `Error::Empty` if the node has no separator keys.
    pub fn first_child(&self) -> Result<PageId> {
        if self.entries.is_empty() {
            return Err(Error::Empty);
        }
        Ok(self.first_child)
    }
}
