//! In-memory paged storage.

use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;
use crate::storage::paged_storage::PagedStorage;

/// Pages kept in a `Vec`. Nothing survives the value being dropped.
///
/// Useful for tests and benchmarks that exercise the tree without a file.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    pages: Vec<Page>,
    writes: u64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total page writes, appends included.
    pub fn write_count(&self) -> u64 {
        self.writes
    }
}

impl PagedStorage for MemoryStorage {
    fn read_page(&mut self, page_id: PageId) -> Result<Page> {
        let stored = self
            .pages
            .get(page_id.0 as usize)
            .ok_or(Error::PageNotFound(page_id.0))?;
        let mut page = Page::new();
        page.copy_from(stored);
        Ok(page)
    }

    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        let idx = page_id.0 as usize;
        match idx.cmp(&self.pages.len()) {
            std::cmp::Ordering::Less => self.pages[idx].copy_from(page),
            std::cmp::Ordering::Equal => {
                let mut appended = Page::new();
                appended.copy_from(page);
                self.pages.push(appended);
            }
            std::cmp::Ordering::Greater => return Err(Error::PageNotFound(page_id.0)),
        }
        self.writes += 1;
        Ok(())
    }

    fn end_page_id(&self) -> PageId {
        PageId::new(self.pages.len() as u32)
    }

    fn sync(&mut self) -> Result<()> {
        Ok(())
    }
}
