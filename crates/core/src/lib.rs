//! Core types and contracts for corral
//!
//! This crate defines the foundational pieces shared by every backend
//! and collection:
//! - Error: error type hierarchy (StoreUnavailable, Serialization)
//! - OrderedScore / ScoreRange / Order: score ordering types
//! - ScanCursor / ScanPage: restartable set enumeration
//! - SetStore / SortedSetStore: the remote primitive contracts
//! - Codec / BincodeCodec: the element serialization boundary

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types and traits
pub use codec::{BincodeCodec, Codec};
pub use error::{Error, Result};
pub use traits::{SetStore, SortedSetStore};
pub use types::{Order, OrderedScore, ScanCursor, ScanPage, ScoreRange, ScoredEntry};
