//! Page - the fundamental 1KB unit of storage.
//!
//! A [`Page`] is a raw byte array that serves as the unit of I/O between
//! disk and memory. Node and record layouts read and write their fields
//! through the little-endian accessors here.

use crate::common::config::{INT_SIZE, PAGE_SIZE};

/// A page of data (1KB, 1KB-aligned).
///
/// # Clone Implementation
/// `Page` does NOT implement `Clone` in production code; copying is spelled
/// out with [`Page::copy_from`]. A `#[cfg(test)]` Clone is provided for tests.
///
/// # Example
/// ```
/// use pagetree::storage::Page;
///
/// let mut page = Page::new();
/// page.write_i32(8, -5);
/// assert_eq!(page.read_i32(8), -5);
/// ```
#[repr(align(1024))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Create a new zeroed page.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    /// Get immutable slice of page data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of page data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Overwrite this page with the contents of `other`.
    pub fn copy_from(&mut self, other: &Page) {
        self.data.copy_from_slice(&other.data);
    }

    /// Read a little-endian `u32` at `offset`.
    ///
    /// # Panics
    /// Panics if the field extends past the end of the page.
    #[inline]
    pub fn read_u32(&self, offset: usize) -> u32 {
        let mut bytes = [0u8; INT_SIZE];
        bytes.copy_from_slice(&self.data[offset..offset + INT_SIZE]);
        u32::from_le_bytes(bytes)
    }

    /// Write a little-endian `u32` at `offset`.
    #[inline]
    pub fn write_u32(&mut self, offset: usize, value: u32) {
        self.data[offset..offset + INT_SIZE].copy_from_slice(&value.to_le_bytes());
    }

    /// Read a little-endian `i32` at `offset`.
    #[inline]
    pub fn read_i32(&self, offset: usize) -> i32 {
        let mut bytes = [0u8; INT_SIZE];
        bytes.copy_from_slice(&self.data[offset..offset + INT_SIZE]);
        i32::from_le_bytes(bytes)
    }

    /// Write a little-endian `i32` at `offset`.
    #[inline]
    pub fn write_i32(&mut self, offset: usize, value: i32) {
        self.data[offset..offset + INT_SIZE].copy_from_slice(&value.to_le_bytes());
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.data.iter().filter(|&&b| b != 0).count();
        write!(f, "Page {{ {} non-zero bytes }}", used)
    }
}

// Clone only available in tests - forces explicit copying in production
#[cfg(test)]
impl Clone for Page {
    fn clone(&self) -> Self {
        let mut new_page = Page::new();
        new_page.copy_from(self);
        new_page
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_and_alignment() {
        assert_eq!(std::mem::size_of::<Page>(), PAGE_SIZE);
        assert_eq!(std::mem::size_of::<Page>(), 1024);
        assert_eq!(std::mem::align_of::<Page>(), 1024);
    }

    #[test]
    fn test_page_new() {
        let page = Page::new();
        assert_eq!(page.as_slice()[0], 0);
        assert_eq!(page.as_slice()[1023], 0);
    }

    #[test]
    fn test_int_fields_are_little_endian() {
        let mut page = Page::new();
        page.write_u32(0, 0x0403_0201);
        page.write_i32(PAGE_SIZE - 4, -2);

        assert_eq!(&page.as_slice()[0..4], &[1, 2, 3, 4]);
        assert_eq!(&page.as_slice()[PAGE_SIZE - 4..], &[0xFE, 0xFF, 0xFF, 0xFF]);
        assert_eq!(page.read_u32(0), 0x0403_0201);
        assert_eq!(page.read_i32(PAGE_SIZE - 4), -2);
    }

    #[test]
    #[should_panic]
    fn test_field_past_end_panics() {
        let page = Page::new();
        page.read_u32(PAGE_SIZE - 2);
    }

    #[test]
    fn test_page_copy() {
        let mut page = Page::new();
        page.as_mut_slice()[0] = 0xFF;
        page.as_mut_slice()[100] = 0xAB;

        let mut other = Page::new();
        other.copy_from(&page);
        assert_eq!(other.as_slice()[100], 0xAB);

        page.as_mut_slice()[0] = 0;
        assert_eq!(other.as_slice()[0], 0xFF);
    }
}
