//! Disk Manager - low-level file I/O for pages.
//!
//! The [`DiskManager`] handles all direct file operations:
//! - Reading and writing pages
//! - Appending new pages at the end of the file
//! - Flushing the file to disk

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::trace;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;
use crate::storage::paged_storage::PagedStorage;

/// Manages disk I/O for a single paged file.
///
/// # File Layout
/// Pages are laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (1KB)   │ (1KB)   │ (1KB)   │         │ (1KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      1024     2048    ...    N×1024
/// ```
///
/// Page N is located at file offset `N × PAGE_SIZE`.
///
/// # Durability
/// Writes go to the OS page cache. With `sync_on_write` every write is
/// followed by `fsync()`; otherwise call [`PagedStorage::sync`].
pub struct DiskManager {
    file: File,
    /// Number of pages in the file.
    page_count: u32,
    sync_on_write: bool,
}

impl DiskManager {
    /// Create a new paged file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        Ok(Self {
            file,
            page_count: 0,
            sync_on_write: false,
        })
    }

    /// Open an existing paged file for reading and writing.
    ///
    /// A trailing partial page (from an interrupted append) is ignored.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        Self::from_file(file)
    }

    /// Open an existing paged file without write access.
    ///
    /// Any write through this handle fails with an I/O error.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).open(&path)?;
        Self::from_file(file)
    }

    /// Open an existing paged file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    fn from_file(file: File) -> Result<Self> {
        // Calculate page count from file size
        let file_size = file.metadata()?.len();
        let page_count = (file_size / PAGE_SIZE as u64) as u32;

        Ok(Self {
            file,
            page_count,
            sync_on_write: false,
        })
    }

    /// Enable or disable `fsync()` after every write.
    pub fn set_sync_on_write(&mut self, enabled: bool) {
        self.sync_on_write = enabled;
    }

    /// Get the number of pages in the file.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }
}

impl PagedStorage for DiskManager {
    fn read_page(&mut self, page_id: PageId) -> Result<Page> {
        if page_id.0 >= self.page_count {
            return Err(Error::PageNotFound(page_id.0));
        }

        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        self.file.seek(SeekFrom::Start(offset))?;

        let mut page = Page::new();
        self.file.read_exact(page.as_mut_slice())?;

        Ok(page)
    }

    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        if page_id.0 > self.page_count {
            return Err(Error::PageNotFound(page_id.0));
        }

        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(page.as_slice())?;
        if self.sync_on_write {
            self.file.sync_all()?;
        }

        if page_id.0 == self.page_count {
            self.page_count += 1;
            trace!(page = page_id.0, "appended page");
        }
        Ok(())
    }

    #[inline]
    fn end_page_id(&self) -> PageId {
        PageId::new(self.page_count)
    }

    fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}
