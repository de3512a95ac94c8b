//! Layout constants and index configuration.

use crate::common::{Error, Result};

/// Size of a page in bytes (1KB).
///
/// Every node, the metadata block and every record page occupy exactly one
/// page. Node capacities below are derived from this value.
pub const PAGE_SIZE: usize = 1024;

/// Size of one little-endian 4-byte integer field in a page.
pub const INT_SIZE: usize = 4;

/// Bytes occupied by one leaf entry: key + (page id, slot).
pub const LEAF_ENTRY_SIZE: usize = 3 * INT_SIZE;

/// Bytes occupied by one internal entry: separator key + child page id.
pub const INTERNAL_ENTRY_SIZE: usize = 2 * INT_SIZE;

/// Leaf entries that physically fit in a page.
///
/// The trailing 8 bytes hold the sibling pointer and the entry count.
pub const LEAF_SLOT_CAPACITY: usize = (PAGE_SIZE - 2 * INT_SIZE) / LEAF_ENTRY_SIZE;

/// Internal entries that physically fit in a page.
///
/// The leading 4 bytes hold `child[0]`, the trailing 4 bytes the entry count.
pub const INTERNAL_SLOT_CAPACITY: usize = (PAGE_SIZE - 2 * INT_SIZE) / INTERNAL_ENTRY_SIZE;

/// Default leaf fan-out. 70 keys fit in one leaf; the 71st splits it.
pub const DEFAULT_MAX_LEAF_ENTRIES: usize = 70;

/// Default internal fan-out.
pub const DEFAULT_MAX_INTERNAL_ENTRIES: usize = 70;

/// Tunables for a [`BTreeIndex`](crate::index::BTreeIndex) session.
///
/// # Example
/// ```
/// use pagetree::IndexConfig;
///
/// let config = IndexConfig::default()
///     .with_max_leaf_entries(4)
///     .with_max_internal_entries(3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    /// Entries a leaf holds before an insert splits it.
    pub max_leaf_entries: usize,
    /// Separator keys an internal node holds before an insert splits it.
    pub max_internal_entries: usize,
    /// Write the metadata page immediately after the root grows instead of
    /// only at close.
    pub persist_meta_on_growth: bool,
    /// `fsync` after every page write.
    pub sync_on_write: bool,
}

impl IndexConfig {
    pub fn with_max_leaf_entries(mut self, n: usize) -> Self {
        self.max_leaf_entries = n;
        self
    }

    pub fn with_max_internal_entries(mut self, n: usize) -> Self {
        self.max_internal_entries = n;
        self
    }

    pub fn with_persist_meta_on_growth(mut self, enabled: bool) -> Self {
        self.persist_meta_on_growth = enabled;
        self
    }

    pub fn with_sync_on_write(mut self, enabled: bool) -> Self {
        self.sync_on_write = enabled;
        self
    }

    /// Check fan-outs against the physical page layout.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if a fan-out is below 2 or larger than
    /// what fits in one page.
    pub fn validate(&self) -> Result<()> {
        if !(2..=LEAF_SLOT_CAPACITY).contains(&self.max_leaf_entries) {
            return Err(Error::InvalidConfig(format!(
                "max_leaf_entries must be in 2..={}, got {}",
                LEAF_SLOT_CAPACITY, self.max_leaf_entries
            )));
        }
        if !(2..=INTERNAL_SLOT_CAPACITY).contains(&self.max_internal_entries) {
            return Err(Error::InvalidConfig(format!(
                "max_internal_entries must be in 2..={}, got {}",
                INTERNAL_SLOT_CAPACITY, self.max_internal_entries
            )));
        }
        Ok(())
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_leaf_entries: DEFAULT_MAX_LEAF_ENTRIES,
            max_internal_entries: DEFAULT_MAX_INTERNAL_ENTRIES,
            persist_meta_on_growth: true,
            sync_on_write: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_capacities() {
        assert_eq!(LEAF_SLOT_CAPACITY, 84);
        assert_eq!(INTERNAL_SLOT_CAPACITY, 127);
        assert!(DEFAULT_MAX_LEAF_ENTRIES <= LEAF_SLOT_CAPACITY);
        assert!(DEFAULT_MAX_INTERNAL_ENTRIES <= INTERNAL_SLOT_CAPACITY);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(IndexConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_fanout() {
        let too_small = IndexConfig::default().with_max_leaf_entries(1);
        assert!(matches!(too_small.validate(), Err(Error::InvalidConfig(_))));

        let too_big = IndexConfig::default().with_max_internal_entries(INTERNAL_SLOT_CAPACITY + 1);
        assert!(matches!(too_big.validate(), Err(Error::InvalidConfig(_))));

        let edge = IndexConfig::default()
            .with_max_leaf_entries(LEAF_SLOT_CAPACITY)
            .with_max_internal_entries(2);
        assert!(edge.validate().is_ok());
    }
}
