//! Storage layer for sagastore
//!
//! This crate defines the table store protocol the engine is written
//! against, and ships an in-memory implementation:
//! - [`TableStore`]: point reads, segmented scans, batched upserts/deletes
//! - [`Pages`]: one-page-at-a-time scan iterator with resumable tokens
//! - [`MemoryTableStore`]: DashMap-backed store for tests and embedding

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
pub mod scan;
pub mod table;

pub use memory::MemoryTableStore;
pub use scan::Pages;
pub use table::{
    ContinuationToken, Result, Segment, StoreError, TableOperation, TableStore, MAX_PAGE_SIZE,
};
