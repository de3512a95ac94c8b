//! Storage layer - paged I/O.
//!
//! This module handles persistent storage:
//! - [`PagedStorage`] - The page read/write/append contract
//! - [`DiskManager`] - File-backed implementation
//! - [`MemoryStorage`] - In-memory implementation
//! - [`Page`] - The raw 1KB data container

mod disk_manager;
mod memory;
mod page;
mod paged_storage;

pub use disk_manager::DiskManager;
pub use memory::MemoryStorage;
pub use page::Page;
pub use paged_storage::PagedStorage;
