//! Corral - typed set and sorted-set handles backed by a remote key-value store
//!
//! Corral lets application code manipulate a distributed collection as
//! if it were an in-process container while the actual state lives on a
//! shared store. A handle is a stateless proxy: it binds a key and a
//! codec to a store connection and maps every collection operation onto
//! the store's primitive commands.
//!
//! # Quick Start
//!
//! ```ignore
//! use corral::{MemoryStore, Order, RemoteSet, RemoteSortedSet, ScoreRange};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//!
//! let tags: RemoteSet<String, _> = RemoteSet::new(Arc::clone(&store), "post:7:tags");
//! tags.insert(&"rust".to_string())?;
//!
//! let board: RemoteSortedSet<String, _> = RemoteSortedSet::new(store, "leaderboard");
//! board.insert(1500.0, &"alice".to_string())?;
//! let top = board.range_by_score(ScoreRange::all(), Order::Descending, 0, Some(10));
//! ```
//!
//! # Architecture
//!
//! - `corral-core`: errors, score/range types, the `SetStore` /
//!   `SortedSetStore` contracts, and the `Codec` boundary
//! - `corral-store`: the embedded `MemoryStore` reference backend
//! - `corral-collections`: the `RemoteSet` / `RemoteSortedSet` facades
//!
//! Any backend implementing the store contracts plugs in below the
//! collection layer; the collections never see more than byte payloads
//! and scores.

pub use corral_collections::{
    RangeIter, RemoteObject, RemoteSet, RemoteSortedSet, SetIter, SortedMember,
};
pub use corral_core::{
    BincodeCodec, Codec, Error, Order, OrderedScore, Result, ScanCursor, ScanPage, ScoreRange,
    ScoredEntry, SetStore, SortedSetStore,
};
pub use corral_store::MemoryStore;
