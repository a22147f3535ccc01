//! In-memory reference backend for corral
//!
//! Implements the `SetStore` and `SortedSetStore` contracts from
//! `corral-core` with process-local state:
//! - MemoryStore: RwLock'd byte-payload buckets with per-command
//!   atomicity and existence-on-empty semantics
//!
//! The collection layer does not depend on this crate; it is the
//! backend used by the test suites and by embedded callers that want
//! collection semantics without a remote server.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;

pub use memory::MemoryStore;
