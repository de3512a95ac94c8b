//! The block-device contract the index and record file are written against.

use crate::common::{PageId, Result};
use crate::storage::page::Page;

/// A growable array of fixed-size pages.
///
/// There is no explicit allocation call: writing to [`end_page_id`] appends
/// a page and advances the end by one.
///
/// [`end_page_id`]: PagedStorage::end_page_id
pub trait PagedStorage {
    /// Read a page.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if `page_id >= end_page_id()`.
    fn read_page(&mut self, page_id: PageId) -> Result<Page>;

    /// Overwrite an existing page, or append one when `page_id == end_page_id()`.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if `page_id > end_page_id()`.
    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()>;

    /// One past the highest page id written so far.
    fn end_page_id(&self) -> PageId;

    /// Flush buffered writes to durable storage.
    fn sync(&mut self) -> Result<()>;

    /// True if no page has been written yet.
    fn is_empty(&self) -> bool {
        self.end_page_id().is_null()
    }
}
