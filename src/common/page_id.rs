//! Page identifier type.

use std::fmt;

/// Identifies a page in a paged file.
///
/// Page 0 is special: it holds the index metadata, so no node ever lives
/// there and the value doubles as the "no page" sentinel in sibling links.
///
/// # Example
/// ```
/// use pagetree::PageId;
///
/// let page_id = PageId::new(42);
/// assert!(!page_id.is_null());
/// assert_eq!(page_id.0, 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PageId(pub u32);

impl PageId {
    /// Null/terminator page ID.
    pub const NULL: PageId = PageId(0);

    /// Create a new PageId.
    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// Check if this is the null sentinel.
    #[inline]
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// The page immediately after this one.
    #[inline]
    pub fn next(&self) -> PageId {
        PageId(self.0 + 1)
    }

    /// Decode from 4 little-endian bytes.
    #[inline]
    pub(crate) fn from_le_bytes(bytes: [u8; 4]) -> Self {
        PageId(u32::from_le_bytes(bytes))
    }

    #[inline]
    pub(crate) fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Page(NULL)")
        } else {
            write!(f, "Page({})", self.0)
        }
    }
}
