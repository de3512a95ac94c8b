//! Tree metadata page (page 0).

use crate::common::PageId;
use crate::storage::Page;

/// Root pointer and height, persisted in page 0.
///
/// # Layout
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     root page id
/// 4       4     tree height (1 = root is a leaf)
/// 8       4     magic
/// 12      4     CRC32 of bytes 0..12
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeMeta {
    pub root_page_id: PageId,
    pub tree_height: u32,
}

impl TreeMeta {
    pub const OFFSET_ROOT: usize = 0;
    pub const OFFSET_HEIGHT: usize = 4;
    pub const OFFSET_MAGIC: usize = 8;
    pub const OFFSET_CHECKSUM: usize = 12;

    pub const MAGIC: u32 = 0x4550_5442; // "BTPE"

    /// Metadata of a freshly created index: a single empty leaf at page 1.
    pub fn initial() -> Self {
        Self {
            root_page_id: PageId::new(1),
            tree_height: 1,
        }
    }

    pub fn serialize(&self) -> Page {
        let mut page = Page::new();
        page.write_u32(Self::OFFSET_ROOT, self.root_page_id.0);
        page.write_u32(Self::OFFSET_HEIGHT, self.tree_height);
        page.write_u32(Self::OFFSET_MAGIC, Self::MAGIC);
        let checksum = Self::compute_checksum(&page);
        page.write_u32(Self::OFFSET_CHECKSUM, checksum);
        page
    }

    /// Decode page 0, returning a description of what is wrong on failure.
    pub fn load(page: &Page) -> Result<Self, String> {
        let magic = page.read_u32(Self::OFFSET_MAGIC);
        if magic != Self::MAGIC {
            return Err(format!("bad magic {:#010x}", magic));
        }
        let stored = page.read_u32(Self::OFFSET_CHECKSUM);
        let computed = Self::compute_checksum(page);
        if stored != computed {
            return Err(format!(
                "metadata checksum mismatch (stored {:#010x}, computed {:#010x})",
                stored, computed
            ));
        }

        let meta = Self {
            root_page_id: PageId::new(page.read_u32(Self::OFFSET_ROOT)),
            tree_height: page.read_u32(Self::OFFSET_HEIGHT),
        };
        if meta.root_page_id.is_null() || meta.tree_height == 0 {
            return Err(format!(
                "invalid root {} / height {}",
                meta.root_page_id, meta.tree_height
            ));
        }
        Ok(meta)
    }

    fn compute_checksum(page: &Page) -> u32 {
        crc32fast::hash(&page.as_slice()[..Self::OFFSET_CHECKSUM])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let meta = TreeMeta {
            root_page_id: PageId::new(3),
            tree_height: 2,
        };
        let page = meta.serialize();
        assert_eq!(page.read_u32(0), 3);
        assert_eq!(page.read_u32(4), 2);
        assert_eq!(TreeMeta::load(&page).unwrap(), meta);
    }

    #[test]
    fn test_zeroed_page_rejected() {
        assert!(TreeMeta::load(&Page::new()).is_err());
    }

    #[test]
    fn test_checksum_detects_corruption() {
        let mut page = TreeMeta::initial().serialize();
        page.write_u32(TreeMeta::OFFSET_HEIGHT, 9);
        let err = TreeMeta::load(&page).unwrap_err();
        assert!(err.contains("checksum"));
    }

    #[test]
    fn test_null_root_rejected() {
        let meta = TreeMeta {
            root_page_id: PageId::NULL,
            tree_height: 1,
        };
        assert!(TreeMeta::load(&meta.serialize()).is_err());
    }
}
