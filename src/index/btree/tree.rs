//! B+-tree index: open/close, recursive insertion, descent and cursors.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, info, trace, warn};

use crate::common::{Error, IndexConfig, PageId, RecordId, Result};
use crate::storage::{DiskManager, Page, PagedStorage};

use super::cursor::{IndexCursor, Scan};
use super::internal_node::InternalNode;
use super::leaf_node::LeafNode;
use super::meta::TreeMeta;

/// Whether an index session may modify the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
}

impl FromStr for OpenMode {
    type Err = Error;

    /// Accepts `r`/`read` and `w`/`write`.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "r" | "read" => Ok(OpenMode::Read),
            "w" | "write" => Ok(OpenMode::Write),
            other => Err(Error::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenMode::Read => write!(f, "read"),
            OpenMode::Write => write!(f, "write"),
        }
    }
}

/// Result of inserting into a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitOutcome {
    NoSplit,
    /// The subtree root split; `sibling` must be linked into the parent
    /// under `promoted_key`.
    Split { promoted_key: i32, sibling: PageId },
}

/// Shape of the tree, gathered by walking the leaf chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    pub root_page_id: PageId,
    pub tree_height: u32,
    pub leaf_count: usize,
    pub entry_count: usize,
}

/// A B+-tree mapping `i32` keys to [`RecordId`]s, stored in a paged file.
///
/// Page 0 holds the metadata, every other page is a leaf or internal node.
/// Leaves are at level `tree_height`, the root at level 1.
///
/// # Example
/// ```no_run
/// use pagetree::{BTreeIndex, OpenMode, PageId, RecordId};
///
/// let mut index = BTreeIndex::open("movies.idx", OpenMode::Write).unwrap();
/// index.insert(42, RecordId::new(PageId::new(0), 3)).unwrap();
/// let cursor = index.locate(42).unwrap();
/// let (key, rid, _next) = index.read_forward(cursor).unwrap();
/// assert_eq!((key, rid.slot), (42, 3));
/// index.close().unwrap();
/// ```
pub struct BTreeIndex<S: PagedStorage = DiskManager> {
    name: String,
    storage: S,
    mode: OpenMode,
    config: IndexConfig,
    root_page_id: PageId,
    tree_height: u32,
}

impl BTreeIndex<DiskManager> {
    /// Open an index file with the default configuration.
    ///
    /// In write mode the file is created if missing. In read mode it must
    /// exist and contain metadata.
    ///
    /// # Errors
    /// Returns `Error::OpenFailed` if the file cannot be opened or holds no
    /// valid metadata.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self> {
        Self::open_with_config(path, mode, IndexConfig::default())
    }

    pub fn open_with_config<P: AsRef<Path>>(
        path: P,
        mode: OpenMode,
        config: IndexConfig,
    ) -> Result<Self> {
        let name = path.as_ref().display().to_string();
        let opened = match mode {
            OpenMode::Read => DiskManager::open_read_only(&path),
            OpenMode::Write => DiskManager::open_or_create(&path),
        };
        let mut storage = opened.map_err(|e| Error::OpenFailed {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        storage.set_sync_on_write(config.sync_on_write);
        Self::open_named(name, storage, mode, config)
    }
}

impl<S: PagedStorage> BTreeIndex<S> {
    /// Open an index over an arbitrary paged storage.
    ///
    /// # Errors
    /// - `Error::InvalidConfig` if the fan-outs do not fit a page
    /// - `Error::OpenFailed` if a read-mode storage is empty or the metadata
    ///   is unreadable
    pub fn with_storage(storage: S, mode: OpenMode, config: IndexConfig) -> Result<Self> {
        Self::open_named("<storage>".to_string(), storage, mode, config)
    }

    fn open_named(name: String, mut storage: S, mode: OpenMode, config: IndexConfig) -> Result<Self> {
        config.validate()?;
        let open_failed = |reason: String| Error::OpenFailed {
            name: name.clone(),
            reason,
        };

        let meta = if storage.is_empty() {
            if mode == OpenMode::Read {
                return Err(open_failed("index is empty".to_string()));
            }
            let meta = TreeMeta::initial();
            storage
                .write_page(PageId::NULL, &meta.serialize())
                .and_then(|_| {
                    storage.write_page(meta.root_page_id, &LeafNode::new(config.max_leaf_entries).serialize())
                })
                .map_err(|e| open_failed(e.to_string()))?;
            debug!(index = %name, "initialized empty index");
            meta
        } else {
            let page = storage
                .read_page(PageId::NULL)
                .map_err(|e| open_failed(e.to_string()))?;
            TreeMeta::load(&page).map_err(|reason| {
                warn!(index = %name, %reason, "rejected index metadata");
                open_failed(reason)
            })?
        };

        info!(
            index = %name,
            %mode,
            root = meta.root_page_id.0,
            height = meta.tree_height,
            "opened index"
        );

        Ok(Self {
            name,
            storage,
            mode,
            config,
            root_page_id: meta.root_page_id,
            tree_height: meta.tree_height,
        })
    }

    /// Persist the metadata (write mode), flush, and hand back the storage.
    ///
    /// # Errors
    /// Returns `Error::CloseFailed` if the metadata cannot be written or the
    /// storage cannot be flushed.
    pub fn close(mut self) -> Result<S> {
        if self.mode == OpenMode::Write {
            self.write_meta()
                .and_then(|_| self.storage.sync())
                .map_err(|e| Error::CloseFailed(e.to_string()))?;
        }
        info!(
            index = %self.name,
            root = self.root_page_id.0,
            height = self.tree_height,
            "closed index"
        );
        Ok(self.storage)
    }

    #[inline]
    pub fn root_page_id(&self) -> PageId {
        self.root_page_id
    }

    #[inline]
    pub fn tree_height(&self) -> u32 {
        self.tree_height
    }

    #[inline]
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    #[inline]
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------

    /// Insert a `(key, rid)` pair.
    ///
    /// # Errors
    /// - `Error::ReadOnly` if the index was opened for reading
    /// - `Error::DuplicateKey` if `key` is already indexed; nothing is written
    pub fn insert(&mut self, key: i32, rid: RecordId) -> Result<()> {
        if self.mode != OpenMode::Write {
            return Err(Error::ReadOnly);
        }

        let root = self.root_page_id;
        match self.insert_at(key, rid, 1, root)? {
            SplitOutcome::NoSplit => Ok(()),
            SplitOutcome::Split {
                promoted_key,
                sibling,
            } => self.grow_root(promoted_key, sibling),
        }
    }

    fn insert_at(&mut self, key: i32, rid: RecordId, level: u32, page_id: PageId) -> Result<SplitOutcome> {
        if level == self.tree_height {
            return self.insert_into_leaf(key, rid, page_id);
        }

        let mut node = self.read_internal(page_id)?;
        let child = node.locate_child(key);
        trace!(level, page = page_id.0, child = child.0, key, "descend for insert");

        let (promoted_key, new_child) = match self.insert_at(key, rid, level + 1, child)? {
            SplitOutcome::NoSplit => return Ok(SplitOutcome::NoSplit),
            SplitOutcome::Split {
                promoted_key,
                sibling,
            } => (promoted_key, sibling),
        };

        match node.insert(promoted_key, new_child) {
            Ok(()) => {
                self.storage.write_page(page_id, &node.serialize())?;
                Ok(SplitOutcome::NoSplit)
            }
            Err(Error::NodeFull) => {
                let (sibling, mid_key) = node.insert_and_split(promoted_key, new_child)?;
                let sibling_page = self.append_page(&sibling.serialize())?;
                self.storage.write_page(page_id, &node.serialize())?;
                debug!(
                    level,
                    page = page_id.0,
                    sibling = sibling_page.0,
                    mid_key,
                    "split internal node"
                );
                Ok(SplitOutcome::Split {
                    promoted_key: mid_key,
                    sibling: sibling_page,
                })
            }
            Err(e) => Err(e),
        }
    }

    fn insert_into_leaf(&mut self, key: i32, rid: RecordId, page_id: PageId) -> Result<SplitOutcome> {
        let mut leaf = self.read_leaf(page_id)?;
        match leaf.insert(key, rid) {
            Ok(()) => {
                self.storage.write_page(page_id, &leaf.serialize())?;
                Ok(SplitOutcome::NoSplit)
            }
            Err(Error::NodeFull) => {
                let (sibling, sibling_key) = leaf.insert_and_split(key, rid)?;
                let sibling_page = self.append_page(&sibling.serialize())?;
                leaf.set_next_sibling(sibling_page);
                self.storage.write_page(page_id, &leaf.serialize())?;
                debug!(
                    page = page_id.0,
                    sibling = sibling_page.0,
                    sibling_key,
                    left = leaf.entry_count(),
                    right = sibling.entry_count(),
                    "split leaf"
                );
                Ok(SplitOutcome::Split {
                    promoted_key: sibling_key,
                    sibling: sibling_page,
                })
            }
            Err(e) => Err(e),
        }
    }

    fn grow_root(&mut self, promoted_key: i32, sibling: PageId) -> Result<()> {
        let mut root = InternalNode::new(self.config.max_internal_entries);
        root.initialize_root(self.root_page_id, promoted_key, sibling);
        let new_root = self.append_page(&root.serialize())?;

        debug!(
            old_root = self.root_page_id.0,
            new_root = new_root.0,
            height = self.tree_height + 1,
            "grew root"
        );
        self.root_page_id = new_root;
        self.tree_height += 1;

        if self.config.persist_meta_on_growth {
            self.write_meta()?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Find `key`.
    ///
    /// # Errors
    /// Returns `Error::KeyNotFound` if the key is absent; its cursor points
    /// where the key would be, so a forward scan can resume from there.
    pub fn locate(&mut self, key: i32) -> Result<IndexCursor> {
        let leaf_page = self.find_leaf(|node| Ok(node.locate_child(key)))?;
        let leaf = self.read_leaf(leaf_page)?;
        let (found, index) = leaf.locate(key);
        let cursor = IndexCursor::new(leaf_page, index);
        trace!(key, found, %cursor, "located");
        if found {
            Ok(cursor)
        } else {
            Err(Error::KeyNotFound { key, cursor })
        }
    }

    /// Cursor at `key` or at the first greater key.
    pub fn seek(&mut self, key: i32) -> Result<IndexCursor> {
        match self.locate(key) {
            Ok(cursor) | Err(Error::KeyNotFound { cursor, .. }) => Ok(cursor),
            Err(e) => Err(e),
        }
    }

    /// Cursor at the first entry of the leftmost leaf.
    ///
    /// # Errors
    /// Returns `Error::Empty` if an internal node on the way has no entries.
    pub fn first_cursor(&mut self) -> Result<IndexCursor> {
        let leaf_page = self.find_leaf(|node| node.first_child())?;
        Ok(IndexCursor::new(leaf_page, 0))
    }

    /// Read the entry under `cursor` and return it with the advanced cursor.
    ///
    /// A cursor past the end of its leaf continues at entry 0 of the next
    /// sibling.
    ///
    /// # Errors
    /// Returns `Error::EndOfTree` once the last leaf is exhausted, or when the
    /// cursor is on the null page.
    pub fn read_forward(&mut self, cursor: IndexCursor) -> Result<(i32, RecordId, IndexCursor)> {
        let mut cursor = cursor;
        loop {
            if cursor.page_id.is_null() {
                return Err(Error::EndOfTree);
            }
            let leaf = self.read_leaf(cursor.page_id)?;
            if cursor.entry_index < leaf.entry_count() {
                let entry = leaf.read_entry(cursor.entry_index)?;
                let next = IndexCursor::new(cursor.page_id, cursor.entry_index + 1);
                return Ok((entry.key, entry.rid, next));
            }
            cursor = IndexCursor::new(leaf.next_sibling(), 0);
        }
    }

    /// Scan forward from `cursor` to the end of the tree.
    pub fn scan_from(&mut self, cursor: IndexCursor) -> Scan<'_, S> {
        Scan::new(self, cursor, None)
    }

    /// Scan keys in `lower..=upper`; a missing bound is open.
    pub fn range(&mut self, lower: Option<i32>, upper: Option<i32>) -> Result<Scan<'_, S>> {
        let start = match lower {
            Some(key) => self.seek(key)?,
            None => self.first_cursor()?,
        };
        Ok(Scan::new(self, start, upper))
    }

    /// Scan every entry in key order.
    pub fn iter(&mut self) -> Result<Scan<'_, S>> {
        self.range(None, None)
    }

    /// Count leaves and entries by walking the leaf chain.
    pub fn stats(&mut self) -> Result<TreeStats> {
        let mut page_id = self.first_cursor()?.page_id;
        let mut leaf_count = 0;
        let mut entry_count = 0;
        while !page_id.is_null() {
            let leaf = self.read_leaf(page_id)?;
            leaf_count += 1;
            entry_count += leaf.entry_count();
            page_id = leaf.next_sibling();
        }
        Ok(TreeStats {
            root_page_id: self.root_page_id,
            tree_height: self.tree_height,
            leaf_count,
            entry_count,
        })
    }

    // ------------------------------------------------------------------
    // Page helpers
    // ------------------------------------------------------------------

    fn find_leaf<F>(&mut self, mut route: F) -> Result<PageId>
    where
        F: FnMut(&InternalNode) -> Result<PageId>,
    {
        let mut page_id = self.root_page_id;
        for level in 1..self.tree_height {
            let node = self.read_internal(page_id)?;
            let child = route(&node)?;
            trace!(level, page = page_id.0, child = child.0, "descend");
            page_id = child;
        }
        Ok(page_id)
    }

    fn read_node_page(&mut self, page_id: PageId) -> Result<Page> {
        if page_id.is_null() {
            return Err(Error::corrupt(page_id, "pointer to the metadata page"));
        }
        self.storage.read_page(page_id).map_err(|e| match e {
            Error::PageNotFound(_) => Error::corrupt(page_id, "dangling page pointer"),
            other => other,
        })
    }

    fn read_leaf(&mut self, page_id: PageId) -> Result<LeafNode> {
        let page = self.read_node_page(page_id)?;
        LeafNode::load(&page, self.config.max_leaf_entries).map_err(|e| with_page(e, page_id))
    }

    fn read_internal(&mut self, page_id: PageId) -> Result<InternalNode> {
        let page = self.read_node_page(page_id)?;
        InternalNode::load(&page, self.config.max_internal_entries).map_err(|e| with_page(e, page_id))
    }

    /// Allocate a page by writing it at the end of the storage.
    fn append_page(&mut self, page: &Page) -> Result<PageId> {
        let page_id = self.storage.end_page_id();
        self.storage.write_page(page_id, page)?;
        Ok(page_id)
    }

    fn write_meta(&mut self) -> Result<()> {
        let meta = TreeMeta {
            root_page_id: self.root_page_id,
            tree_height: self.tree_height,
        };
        self.storage.write_page(PageId::NULL, &meta.serialize())
    }
}

fn with_page(err: Error, page_id: PageId) -> Error {
    match err {
        Error::CorruptNode(reason) => Error::corrupt(page_id, reason),
        other => other,
    }
}

impl<S: PagedStorage> fmt::Debug for BTreeIndex<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BTreeIndex")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("root_page_id", &self.root_page_id)
            .field("tree_height", &self.tree_height)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn rid(key: i32) -> RecordId {
        RecordId::new(PageId::NULL, key as u32)
    }

    fn small_config() -> IndexConfig {
        IndexConfig::default()
            .with_max_leaf_entries(4)
            .with_max_internal_entries(3)
    }

    fn new_index(config: IndexConfig) -> BTreeIndex<MemoryStorage> {
        BTreeIndex::with_storage(MemoryStorage::new(), OpenMode::Write, config).unwrap()
    }

    fn all_keys(index: &mut BTreeIndex<MemoryStorage>) -> Vec<i32> {
        index.iter().unwrap().map(|r| r.unwrap().0).collect()
    }

    #[test]
    fn test_open_mode_parse() {
        assert_eq!("r".parse::<OpenMode>().unwrap(), OpenMode::Read);
        assert_eq!("write".parse::<OpenMode>().unwrap(), OpenMode::Write);
        assert!(matches!("f".parse::<OpenMode>(), Err(Error::InvalidMode(m)) if m == "f"));
    }

    #[test]
    fn test_fresh_index_layout() {
        let index = new_index(IndexConfig::default());
        assert_eq!(index.root_page_id(), PageId::new(1));
        assert_eq!(index.tree_height(), 1);

        let mut storage = index.close().unwrap();
        assert_eq!(storage.end_page_id(), PageId::new(2));
        let meta = TreeMeta::load(&storage.read_page(PageId::NULL).unwrap()).unwrap();
        assert_eq!(meta, TreeMeta::initial());
    }

    #[test]
    fn test_read_mode_on_empty_storage_fails() {
        let result = BTreeIndex::with_storage(MemoryStorage::new(), OpenMode::Read, IndexConfig::default());
        assert!(matches!(result, Err(Error::OpenFailed { .. })));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = IndexConfig::default().with_max_leaf_entries(500);
        let result = BTreeIndex::with_storage(MemoryStorage::new(), OpenMode::Write, config);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_read_mode_rejects_insert() {
        let storage = new_index(IndexConfig::default()).close().unwrap();
        let mut index = BTreeIndex::with_storage(storage, OpenMode::Read, IndexConfig::default()).unwrap();
        assert!(matches!(index.insert(1, rid(1)), Err(Error::ReadOnly)));
    }

    #[test]
    fn test_empty_tree_scan() {
        let mut index = new_index(IndexConfig::default());
        let cursor = index.first_cursor().unwrap();
        assert_eq!(cursor, IndexCursor::new(PageId::new(1), 0));
        assert!(matches!(index.read_forward(cursor), Err(Error::EndOfTree)));
        assert!(matches!(
            index.locate(5),
            Err(Error::KeyNotFound { key: 5, cursor }) if cursor == IndexCursor::new(PageId::new(1), 0)
        ));
    }

    #[test]
    fn test_leaf_split_grows_root() {
        let mut index = new_index(small_config());
        for k in [10, 20, 30, 40] {
            index.insert(k, rid(k)).unwrap();
        }
        assert_eq!(index.tree_height(), 1);

        index.insert(25, rid(25)).unwrap();

        // page 2 = new leaf, page 3 = new root
        assert_eq!(index.tree_height(), 2);
        assert_eq!(index.root_page_id(), PageId::new(3));
        assert_eq!(index.locate(10).unwrap(), IndexCursor::new(PageId::new(1), 0));
        assert_eq!(index.locate(30).unwrap(), IndexCursor::new(PageId::new(2), 0));
        assert_eq!(all_keys(&mut index), vec![10, 20, 25, 30, 40]);
    }

    #[test]
    fn test_internal_split_grows_to_height_three() {
        let mut index = new_index(small_config());
        let mut heights = Vec::new();
        for k in 0..40 {
            index.insert(k, rid(k)).unwrap();
            heights.push(index.tree_height());
        }

        assert!(index.tree_height() >= 3);
        // height never skips a level
        assert!(heights.windows(2).all(|w| w[1] == w[0] || w[1] == w[0] + 1));
        assert_eq!(all_keys(&mut index), (0..40).collect::<Vec<_>>());
        for k in 0..40 {
            let cursor = index.locate(k).unwrap();
            let (key, found_rid, _) = index.read_forward(cursor).unwrap();
            assert_eq!((key, found_rid), (k, rid(k)));
        }
    }

    #[test]
    fn test_reverse_and_interleaved_inserts() {
        let mut index = new_index(small_config());
        let keys: Vec<i32> = (0..60).map(|i| (i * 37) % 61 - 30).collect();
        for &k in &keys {
            index.insert(k, rid(k)).unwrap();
        }
        let mut expected = keys.clone();
        expected.sort_unstable();
        assert_eq!(all_keys(&mut index), expected);

        let stats = index.stats().unwrap();
        assert_eq!(stats.entry_count, 60);
        assert_eq!(stats.tree_height, index.tree_height());
    }

    #[test]
    fn test_duplicate_key_leaves_storage_untouched() {
        let mut index = new_index(small_config());
        for k in 0..4 {
            index.insert(k, rid(k)).unwrap();
        }
        let pages_before = index.storage.end_page_id();
        let writes_before = index.storage.write_count();

        // leaf is full: the duplicate is caught by the split path
        assert!(matches!(index.insert(2, rid(99)), Err(Error::DuplicateKey(2))));
        assert_eq!(index.storage.end_page_id(), pages_before);
        assert_eq!(index.storage.write_count(), writes_before);
        assert_eq!(index.tree_height(), 1);
    }

    #[test]
    fn test_locate_does_not_write() {
        let mut index = new_index(small_config());
        for k in 0..20 {
            index.insert(k * 2, rid(k)).unwrap();
        }
        let writes = index.storage.write_count();

        let first = index.locate(7);
        let second = index.locate(7);
        match (first, second) {
            (Err(Error::KeyNotFound { cursor: a, .. }), Err(Error::KeyNotFound { cursor: b, .. })) => {
                assert_eq!(a, b)
            }
            other => panic!("expected KeyNotFound twice, got {:?}", other),
        }
        assert_eq!(index.locate(8).unwrap(), index.locate(8).unwrap());
        assert_eq!(index.storage.write_count(), writes);
    }

    #[test]
    fn test_seek_and_range() {
        let mut index = new_index(small_config());
        for k in 0..30 {
            index.insert(k * 10, rid(k)).unwrap();
        }

        let cursor = index.seek(55).unwrap();
        let (key, _, _) = index.read_forward(cursor).unwrap();
        assert_eq!(key, 60);

        let keys: Vec<i32> = index
            .range(Some(35), Some(90))
            .unwrap()
            .map(|r| r.unwrap().0)
            .collect();
        assert_eq!(keys, vec![40, 50, 60, 70, 80, 90]);

        let tail: Vec<i32> = index
            .range(Some(275), None)
            .unwrap()
            .map(|r| r.unwrap().0)
            .collect();
        assert_eq!(tail, vec![280, 290]);

        assert_eq!(index.range(Some(1000), None).unwrap().count(), 0);
    }

    #[test]
    fn test_seek_past_last_key_of_leaf_continues_in_sibling() {
        let mut index = new_index(small_config());
        for k in [10, 20, 30, 40, 50] {
            index.insert(k, rid(k)).unwrap();
        }
        // leaf 1 holds 10, 20, 30; 32 lands past its last entry
        let cursor = index.seek(25).unwrap();
        assert_eq!(cursor, IndexCursor::new(PageId::new(1), 2));
        let cursor = index.seek(32).unwrap();
        assert_eq!(cursor, IndexCursor::new(PageId::new(1), 3));
        let (key, _, next) = index.read_forward(cursor).unwrap();
        assert_eq!(key, 40);
        assert_eq!(next, IndexCursor::new(PageId::new(2), 1));
    }

    #[test]
    fn test_meta_persisted_on_growth() {
        let mut index = new_index(small_config());
        for k in 0..5 {
            index.insert(k, rid(k)).unwrap();
        }
        let page = index.storage.read_page(PageId::NULL).unwrap();
        let meta = TreeMeta::load(&page).unwrap();
        assert_eq!(meta.tree_height, 2);
        assert_eq!(meta.root_page_id, index.root_page_id());
    }

    #[test]
    fn test_meta_deferred_until_close() {
        let config = small_config().with_persist_meta_on_growth(false);
        let mut index = new_index(config);
        for k in 0..5 {
            index.insert(k, rid(k)).unwrap();
        }
        let page = index.storage.read_page(PageId::NULL).unwrap();
        assert_eq!(TreeMeta::load(&page).unwrap(), TreeMeta::initial());

        let storage = index.close().unwrap();
        let mut reopened = BTreeIndex::with_storage(storage, OpenMode::Read, config).unwrap();
        assert_eq!(reopened.tree_height(), 2);
        assert_eq!(all_keys_generic(&mut reopened), vec![0, 1, 2, 3, 4]);
    }

    fn all_keys_generic<S: PagedStorage>(index: &mut BTreeIndex<S>) -> Vec<i32> {
        index.iter().unwrap().map(|r| r.unwrap().0).collect()
    }

    #[test]
    fn test_corrupt_leaf_reported_with_page() {
        let mut index = new_index(IndexConfig::default());
        index.insert(1, rid(1)).unwrap();

        let mut page = Page::new();
        page.write_i32(LeafNode::OFFSET_ENTRY_COUNT, 5000);
        index.storage.write_page(PageId::new(1), &page).unwrap();

        match index.locate(1) {
            Err(Error::CorruptNode(reason)) => assert!(reason.starts_with("Page(1)")),
            other => panic!("expected CorruptNode, got {:?}", other),
        }
    }

    #[test]
    fn test_dangling_sibling_is_corruption() {
        let mut index = new_index(IndexConfig::default());
        index.insert(1, rid(1)).unwrap();

        let mut leaf = LeafNode::load(&index.storage.read_page(PageId::new(1)).unwrap(), 70).unwrap();
        leaf.set_next_sibling(PageId::new(40));
        index.storage.write_page(PageId::new(1), &leaf.serialize()).unwrap();

        let cursor = index.locate(1).unwrap();
        let (_, _, next) = index.read_forward(cursor).unwrap();
        assert!(matches!(index.read_forward(next), Err(Error::CorruptNode(_))));
    }
}
