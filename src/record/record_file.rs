//! Append-only heap of `(key, value)` tuples.

use std::path::Path;

use tracing::debug;

use crate::common::config::{INT_SIZE, PAGE_SIZE};
use crate::common::{Error, PageId, RecordId, Result};
use crate::index::OpenMode;
use crate::storage::{DiskManager, Page, PagedStorage};

/// Longest value a record slot holds, in bytes.
pub const MAX_VALUE_LEN: usize = 100;

const SLOT_SIZE: usize = INT_SIZE + 2 + MAX_VALUE_LEN;

/// Records stored in one page.
pub const RECORDS_PER_PAGE: usize = (PAGE_SIZE - INT_SIZE) / SLOT_SIZE;

/// A table's tuples, addressed by [`RecordId`].
///
/// # Page Layout
/// ```text
/// Offset               Size  Field
/// ------               ----  -----
/// 0                    4     record count
/// 4 + 106 * s          4     key of slot s
/// 8 + 106 * s          2     value length
/// 10 + 106 * s         100   value bytes (zero padded)
/// ```
/// Every page but the last is full, so record ids are dense.
pub struct RecordFile<S: PagedStorage = DiskManager> {
    storage: S,
    end: RecordId,
}

impl RecordFile<DiskManager> {
    /// Open a record file; write mode creates it if missing.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self> {
        let storage = match mode {
            OpenMode::Read => DiskManager::open_read_only(path)?,
            OpenMode::Write => DiskManager::open_or_create(path)?,
        };
        Self::with_storage(storage)
    }
}

impl<S: PagedStorage> RecordFile<S> {
    pub fn with_storage(mut storage: S) -> Result<Self> {
        let end = match storage.end_page_id().0.checked_sub(1) {
            None => RecordId::new(PageId::new(0), 0),
            Some(last) => {
                let last = PageId::new(last);
                let count = record_count(&storage.read_page(last)?, last)?;
                if count == RECORDS_PER_PAGE {
                    RecordId::new(last.next(), 0)
                } else {
                    RecordId::new(last, count as u32)
                }
            }
        };
        Ok(Self { storage, end })
    }

    /// The id the next appended record will get.
    #[inline]
    pub fn end_record_id(&self) -> RecordId {
        self.end
    }

    /// Store a tuple and return its id.
    ///
    /// # Errors
    /// Returns `Error::ValueTooLong` if `value` exceeds [`MAX_VALUE_LEN`] bytes.
    pub fn append(&mut self, key: i32, value: &str) -> Result<RecordId> {
        check_value(value)?;
        let bytes = value.as_bytes();

        let rid = self.end;
        let slot = rid.slot as usize;
        let mut page = if slot == 0 {
            Page::new()
        } else {
            self.storage.read_page(rid.page_id)?
        };

        let offset = slot_offset(slot);
        page.write_i32(offset, key);
        page.as_mut_slice()[offset + INT_SIZE..offset + INT_SIZE + 2]
            .copy_from_slice(&(bytes.len() as u16).to_le_bytes());
        page.as_mut_slice()[offset + INT_SIZE + 2..offset + INT_SIZE + 2 + bytes.len()]
            .copy_from_slice(bytes);
        page.write_u32(0, (slot + 1) as u32);
        self.storage.write_page(rid.page_id, &page)?;

        self.end = if slot + 1 == RECORDS_PER_PAGE {
            RecordId::new(rid.page_id.next(), 0)
        } else {
            RecordId::new(rid.page_id, rid.slot + 1)
        };
        Ok(rid)
    }

    /// Fetch the tuple stored at `rid`.
    ///
    /// # Errors
    /// Returns `Error::RecordNotFound` if no record was appended at `rid`.
    pub fn read(&mut self, rid: RecordId) -> Result<(i32, String)> {
        if rid >= self.end || rid.slot as usize >= RECORDS_PER_PAGE {
            return Err(Error::RecordNotFound(rid));
        }
        let page = self.storage.read_page(rid.page_id)?;
        let slot = rid.slot as usize;
        if slot >= record_count(&page, rid.page_id)? {
            return Err(Error::RecordNotFound(rid));
        }

        let offset = slot_offset(slot);
        let key = page.read_i32(offset);
        let data = page.as_slice();
        let len = u16::from_le_bytes([data[offset + INT_SIZE], data[offset + INT_SIZE + 1]]) as usize;
        let start = offset + INT_SIZE + 2;
        let value = String::from_utf8_lossy(&data[start..start + len.min(MAX_VALUE_LEN)]).into_owned();
        Ok((key, value))
    }

    /// Iterate over every record in id order.
    pub fn scan(&mut self) -> RecordScan<'_, S> {
        RecordScan {
            file: self,
            next: RecordId::new(PageId::new(0), 0),
        }
    }

    /// Flush and hand back the storage.
    pub fn close(mut self) -> Result<S> {
        self.storage.sync()?;
        debug!(end = %self.end, "closed record file");
        Ok(self.storage)
    }
}

/// Iterator returned by [`RecordFile::scan`].
pub struct RecordScan<'a, S: PagedStorage> {
    file: &'a mut RecordFile<S>,
    next: RecordId,
}

impl<S: PagedStorage> Iterator for RecordScan<'_, S> {
    type Item = Result<(RecordId, i32, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.file.end {
            return None;
        }
        let rid = self.next;
        self.next = if rid.slot as usize + 1 == RECORDS_PER_PAGE {
            RecordId::new(rid.page_id.next(), 0)
        } else {
            RecordId::new(rid.page_id, rid.slot + 1)
        };
        Some(self.file.read(rid).map(|(key, value)| (rid, key, value)))
    }
}

/// Whether `value` fits in a record slot.
///
/// # Errors
/// Returns `Error::ValueTooLong` if `value` exceeds [`MAX_VALUE_LEN`] bytes.
pub fn check_value(value: &str) -> Result<()> {
    if value.len() > MAX_VALUE_LEN {
        return Err(Error::ValueTooLong {
            len: value.len(),
            max: MAX_VALUE_LEN,
        });
    }
    Ok(())
}

#[inline]
fn slot_offset(slot: usize) -> usize {
    INT_SIZE + slot * SLOT_SIZE
}

fn record_count(page: &Page, page_id: PageId) -> Result<usize> {
    let count = page.read_u32(0) as usize;
    if count > RECORDS_PER_PAGE {
        return Err(Error::CorruptNode(format!(
            "{}: record count {}",
            page_id, count
        )));
    }
    Ok(count)
}
