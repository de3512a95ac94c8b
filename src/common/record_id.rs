//! Record identifier type.

use std::fmt;

use super::PageId;

/// Locates a tuple in a record file: the page and the slot within it.
///
/// The index stores these opaquely and hands them back on lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RecordId {
    pub page_id: PageId,
    pub slot: u32,
}

impl RecordId {
    /// Encoded size: page id + slot.
    pub const SIZE: usize = 8;

    #[inline]
    pub fn new(page_id: PageId, slot: u32) -> Self {
        Self { page_id, slot }
    }

    pub(crate) fn write_to(&self, buf: &mut [u8]) {
        buf[0..4].copy_from_slice(&self.page_id.to_le_bytes());
        buf[4..8].copy_from_slice(&self.slot.to_le_bytes());
    }

    pub(crate) fn from_bytes(buf: &[u8]) -> Self {
        Self {
            page_id: PageId::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            slot: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rid({}, {})", self.page_id.0, self.slot)
    }
}
