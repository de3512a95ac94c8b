//! pagetree - an on-disk B+-tree index over fixed-size pages.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            pagetree                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Table Layer (table/)                        │   │
//! │  │     load file → RecordFile + index, planned select       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                 ↓                              ↓                │
//! │  ┌──────────────────────────────┐  ┌───────────────────────┐   │
//! │  │      Index (index/btree/)    │  │  Records (record/)    │   │
//! │  │  BTreeIndex → Internal/Leaf  │  │  RecordFile           │   │
//! │  │  nodes, cursors, scans       │  │  (key, value) tuples  │   │
//! │  └──────────────────────────────┘  └───────────────────────┘   │
//! │                 ↓                              ↓                │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Storage Layer (storage/)                       │   │
//! │  │   PagedStorage: DiskManager | MemoryStorage, Page        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, RecordId, Error, config)
//! - [`storage`] - Paged I/O and the page container
//! - [`index`] - The B+-tree index
//! - [`record`] - The record file the index points into
//! - [`table`] - Loading and selecting over a table with an optional index
//!
//! # Quick Start
//! ```no_run
//! use pagetree::{BTreeIndex, Error, OpenMode, PageId, RecordId};
//!
//! let mut index = BTreeIndex::open("movie.idx", OpenMode::Write).unwrap();
//! for key in 0..1000 {
//!     index.insert(key, RecordId::new(PageId::new(0), key as u32)).unwrap();
//! }
//!
//! // Walk keys 100..=200 along the leaf chain
//! for entry in index.range(Some(100), Some(200)).unwrap() {
//!     let (key, rid) = entry.unwrap();
//!     println!("{key} -> {rid}");
//! }
//!
//! match index.locate(5000) {
//!     Err(Error::KeyNotFound { cursor, .. }) => println!("would go at {cursor}"),
//!     other => println!("{other:?}"),
//! }
//! index.close().unwrap();
//! ```

pub mod common;
pub mod index;
pub mod record;
pub mod storage;
pub mod table;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{Error, IndexConfig, PageId, RecordId, Result};

pub use index::{BTreeIndex, IndexCursor, OpenMode, Scan, TreeStats};
pub use record::RecordFile;
pub use storage::{DiskManager, MemoryStorage, Page, PagedStorage};
pub use table::{Comparison, Condition, ScanPlan, Table, Tuple};
