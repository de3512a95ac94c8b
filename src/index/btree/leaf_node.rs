//! Leaf node page format and node-level insert/split.

use crate::common::config::{INT_SIZE, LEAF_ENTRY_SIZE, LEAF_SLOT_CAPACITY, PAGE_SIZE};
use crate::common::{Error, PageId, RecordId, Result};
use crate::storage::Page;

/// One `(key, record id)` pair stored in a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafEntry {
    pub key: i32,
    pub rid: RecordId,
}

/// Decoded view of a leaf page.
///
/// # Layout
/// ```text
/// Offset            Size  Field
/// ------            ----  -----
/// 12 * i            4     key of entry i
/// 12 * i + 4        8     record id of entry i (page id, slot)
/// PAGE_SIZE - 8     4     next sibling page id (0 = end of chain)
/// PAGE_SIZE - 4     4     entry count
/// ```
/// Slots past the entry count are zero so that encoding is byte-stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode {
    entries: Vec<LeafEntry>,
    next_sibling: PageId,
    max_entries: usize,
}

impl LeafNode {
    pub const OFFSET_NEXT_SIBLING: usize = PAGE_SIZE - 2 * INT_SIZE;
    pub const OFFSET_ENTRY_COUNT: usize = PAGE_SIZE - INT_SIZE;

    /// Create an empty leaf that splits once it holds `max_entries`.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::with_capacity(max_entries + 1),
            next_sibling: PageId::NULL,
            max_entries,
        }
    }

    /// Decode a leaf from a page.
    ///
    /// # Errors
    /// Returns `Error::CorruptNode` if the entry count does not fit in a page
    /// or the keys are not strictly increasing.
    pub fn load(page: &Page, max_entries: usize) -> Result<Self> {
        let raw_count = page.read_i32(Self::OFFSET_ENTRY_COUNT);
        let count = usize::try_from(raw_count)
            .ok()
            .filter(|&n| n <= LEAF_SLOT_CAPACITY)
            .ok_or_else(|| Error::CorruptNode(format!("leaf entry count {}", raw_count)))?;

        let mut entries = Vec::with_capacity(count.max(max_entries) + 1);
        for i in 0..count {
            let offset = i * LEAF_ENTRY_SIZE;
            let key = page.read_i32(offset);
            let rid = RecordId::from_bytes(&page.as_slice()[offset + INT_SIZE..offset + LEAF_ENTRY_SIZE]);
            if let Some(prev) = entries.last().map(|e: &LeafEntry| e.key) {
                if prev >= key {
                    return Err(Error::CorruptNode(format!(
                        "leaf keys out of order at entry {}: {} after {}",
                        i, key, prev
                    )));
                }
            }
            entries.push(LeafEntry { key, rid });
        }

        Ok(Self {
            entries,
            next_sibling: PageId::new(page.read_u32(Self::OFFSET_NEXT_SIBLING)),
            max_entries,
        })
    }

    /// Encode into a fresh page.
    pub fn serialize(&self) -> Page {
        let mut page = Page::new();
        for (i, entry) in self.entries.iter().enumerate() {
            let offset = i * LEAF_ENTRY_SIZE;
            page.write_i32(offset, entry.key);
            entry
                .rid
                .write_to(&mut page.as_mut_slice()[offset + INT_SIZE..offset + LEAF_ENTRY_SIZE]);
        }
        page.write_u32(Self::OFFSET_NEXT_SIBLING, self.next_sibling.0);
        page.write_i32(Self::OFFSET_ENTRY_COUNT, self.entries.len() as i32);
        page
    }

    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.max_entries
    }

    pub fn entries(&self) -> &[LeafEntry] {
        &self.entries
    }

    /// Find `key`, or the position it would be inserted at.
    ///
    /// Returns `(true, i)` if `entries[i].key == key`, otherwise `(false, i)`
    /// with `i` the index of the first greater key (or `entry_count()`).
    pub fn locate(&self, key: i32) -> (bool, usize) {
        match self.entries.binary_search_by_key(&key, |e| e.key) {
            Ok(idx) => (true, idx),
            Err(idx) => (false, idx),
        }
    }

    /// Insert a new entry in key order.
    ///
    /// # Errors
    /// - `Error::NodeFull` if the leaf is at capacity (checked first)
    /// - `Error::DuplicateKey` if the key is already present
    pub fn insert(&mut self, key: i32, rid: RecordId) -> Result<()> {
        if self.is_full() {
            return Err(Error::NodeFull);
        }
        match self.locate(key) {
            (true, _) => Err(Error::DuplicateKey(key)),
            (false, idx) => {
                self.entries.insert(idx, LeafEntry { key, rid });
                Ok(())
            }
        }
    }

    /// Insert into a full leaf and move the upper half to a new sibling.
    ///
    /// This node keeps `ceil((n + 1) / 2)` entries. The sibling inherits this
    /// node's old sibling pointer; the caller must point this node at the
    /// sibling once the sibling's page is known.
    ///
    /// Returns the sibling and its first key.
    ///
    /// # Errors
    /// - `Error::DuplicateKey` if the key is already present (nothing changes)
    /// - `Error::Empty` if this leaf has no entries to split
    pub fn insert_and_split(&mut self, key: i32, rid: RecordId) -> Result<(LeafNode, i32)> {
        if self.entries.is_empty() {
            return Err(Error::Empty);
        }
        let idx = match self.locate(key) {
            (true, _) => return Err(Error::DuplicateKey(key)),
            (false, idx) => idx,
        };
        self.entries.insert(idx, LeafEntry { key, rid });

        let keep = self.entries.len().div_ceil(2);
        let moved = self.entries.split_off(keep);
        let sibling_first_key = moved[0].key;

        let sibling = LeafNode {
            entries: moved,
            next_sibling: self.next_sibling,
            max_entries: self.max_entries,
        };
        Ok((sibling, sibling_first_key))
    }

    /// Read the entry at `index`.
    ///
    /// # Errors
    /// Returns `Error::OutOfRange` if `index >= entry_count()`.
    pub fn read_entry(&self, index: usize) -> Result<LeafEntry> {
        self.entries.get(index).copied().ok_or(Error::OutOfRange {
            index,
            count: self.entries.len(),
        })
    }

    #[inline]
    pub fn next_sibling(&self) -> PageId {
        self.next_sibling
    }

    #[inline]
    pub fn set_next_sibling(&mut self, page_id: PageId) {
        self.next_sibling = page_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rid(n: u32) -> RecordId {
        RecordId::new(PageId::new(11), n)
    }

    fn leaf_with(max: usize, keys: impl IntoIterator<Item = i32>) -> LeafNode {
        let mut leaf = LeafNode::new(max);
        for k in keys {
            leaf.insert(k, rid(k as u32)).unwrap();
        }
        leaf
    }

    fn keys(leaf: &LeafNode) -> Vec<i32> {
        leaf.entries().iter().map(|e| e.key).collect()
    }

    #[test]
    fn test_insert_keeps_order() {
        let leaf = leaf_with(70, [10, 20, 15]);
        assert_eq!(keys(&leaf), vec![10, 15, 20]);
        assert_eq!(leaf.entry_count(), 3);

        let entry = leaf.read_entry(1).unwrap();
        assert_eq!(entry.key, 15);
        assert_eq!(entry.rid, rid(15));
    }

    #[test]
    fn test_locate() {
        let leaf = leaf_with(70, [10, 20, 30]);
        assert_eq!(leaf.locate(20), (true, 1));
        assert_eq!(leaf.locate(5), (false, 0));
        assert_eq!(leaf.locate(25), (false, 2));
        assert_eq!(leaf.locate(99), (false, 3));
        assert_eq!(LeafNode::new(4).locate(1), (false, 0));
    }

    #[test]
    fn test_insert_duplicate() {
        let mut leaf = leaf_with(70, [1, 2, 3]);
        assert!(matches!(leaf.insert(2, rid(9)), Err(Error::DuplicateKey(2))));
        assert_eq!(keys(&leaf), vec![1, 2, 3]);
        assert_eq!(leaf.read_entry(1).unwrap().rid, rid(2));
    }

    #[test]
    fn test_insert_full_checked_before_duplicate() {
        let mut leaf = leaf_with(3, [1, 2, 3]);
        assert!(matches!(leaf.insert(4, rid(4)), Err(Error::NodeFull)));
        assert!(matches!(leaf.insert(2, rid(2)), Err(Error::NodeFull)));
    }

    #[test]
    fn test_read_entry_out_of_range() {
        let leaf = leaf_with(70, [1]);
        assert!(matches!(
            leaf.read_entry(1),
            Err(Error::OutOfRange { index: 1, count: 1 })
        ));
    }

    #[test]
    fn test_sibling_pointer() {
        let mut leaf = LeafNode::new(70);
        assert!(leaf.next_sibling().is_null());
        leaf.set_next_sibling(PageId::new(25));
        assert_eq!(leaf.next_sibling(), PageId::new(25));
    }

    #[test]
    fn test_byte_layout() {
        let mut leaf = leaf_with(70, [7, -3]);
        leaf.set_next_sibling(PageId::new(9));
        let page = leaf.serialize();
        let bytes = page.as_slice();

        // -3 sorts first
        assert_eq!(&bytes[0..4], &(-3i32).to_le_bytes());
        assert_eq!(&bytes[4..8], &11u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &((-3i32) as u32).to_le_bytes());
        assert_eq!(&bytes[12..16], &7i32.to_le_bytes());
        assert_eq!(&bytes[PAGE_SIZE - 8..PAGE_SIZE - 4], &9u32.to_le_bytes());
        assert_eq!(&bytes[PAGE_SIZE - 4..], &2i32.to_le_bytes());
        assert!(bytes[24..PAGE_SIZE - 8].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_roundtrip() {
        let mut leaf = leaf_with(70, (0..70).map(|i| i * 3 - 50));
        leaf.set_next_sibling(PageId::new(4));

        let page = leaf.serialize();
        let loaded = LeafNode::load(&page, 70).unwrap();
        assert_eq!(loaded, leaf);
        assert_eq!(loaded.serialize().as_slice(), page.as_slice());
    }

    #[test]
    fn test_zeroed_page_is_empty_leaf() {
        let leaf = LeafNode::load(&Page::new(), 70).unwrap();
        assert_eq!(leaf.entry_count(), 0);
        assert!(leaf.next_sibling().is_null());
    }

    #[test]
    fn test_load_rejects_bad_count() {
        let mut page = Page::new();
        page.write_i32(LeafNode::OFFSET_ENTRY_COUNT, LEAF_SLOT_CAPACITY as i32 + 1);
        assert!(matches!(LeafNode::load(&page, 70), Err(Error::CorruptNode(_))));

        page.write_i32(LeafNode::OFFSET_ENTRY_COUNT, -1);
        assert!(matches!(LeafNode::load(&page, 70), Err(Error::CorruptNode(_))));
    }

    #[test]
    fn test_load_rejects_unsorted_keys() {
        let mut page = leaf_with(70, [1, 2, 3]).serialize();
        page.write_i32(LEAF_ENTRY_SIZE, 5);
        assert!(matches!(LeafNode::load(&page, 70), Err(Error::CorruptNode(_))));
    }

    #[test]
    fn test_split_with_new_key_in_lower_half() {
        // 70 entries 5, 10, ..., 350 plus 33
        let mut leaf = leaf_with(70, (1..=70).map(|i| 5 * i));
        leaf.set_next_sibling(PageId::new(77));

        let (sibling, sibling_key) = leaf.insert_and_split(33, rid(33)).unwrap();

        assert_eq!(leaf.entry_count(), 36);
        assert_eq!(sibling.entry_count(), 35);
        assert!(keys(&leaf).contains(&33));
        assert_eq!(sibling_key, 5 * 36);
        assert_eq!(sibling.read_entry(0).unwrap().key, sibling_key);
        assert!(keys(&leaf).iter().all(|&k| k < sibling_key));
        assert_eq!(sibling.next_sibling(), PageId::new(77));
    }

    #[test]
    fn test_split_with_new_key_in_upper_half() {
        let mut leaf = leaf_with(4, [10, 20, 30, 40]);
        let (sibling, sibling_key) = leaf.insert_and_split(35, rid(35)).unwrap();

        assert_eq!(keys(&leaf), vec![10, 20, 30]);
        assert_eq!(keys(&sibling), vec![35, 40]);
        assert_eq!(sibling_key, 35);
    }

    #[test]
    fn test_split_even_total() {
        let mut leaf = leaf_with(3, [1, 2, 3]);
        let (sibling, sibling_key) = leaf.insert_and_split(0, rid(0)).unwrap();
        assert_eq!(keys(&leaf), vec![0, 1]);
        assert_eq!(keys(&sibling), vec![2, 3]);
        assert_eq!(sibling_key, 2);
    }

    #[test]
    fn test_split_duplicate_leaves_node_unchanged() {
        let mut leaf = leaf_with(3, [1, 2, 3]);
        let before = leaf.clone();
        assert!(matches!(
            leaf.insert_and_split(2, rid(2)),
            Err(Error::DuplicateKey(2))
        ));
        assert_eq!(leaf, before);
    }

    #[test]
    fn test_left_half_accepts_inserts_after_split() {
        let mut leaf = leaf_with(70, (1..=70).map(|i| 5 * i));
        leaf.insert_and_split(33, rid(33)).unwrap();
        leaf.insert(11, rid(11)).unwrap();
        leaf.insert(222, rid(222)).unwrap();
        assert_eq!(leaf.entry_count(), 38);
        assert_eq!(keys(&leaf).last(), Some(&222));
    }
}
