//! Store contracts consumed by the collection layer
//!
//! This module defines the `SetStore` and `SortedSetStore` traits: the
//! remote primitive API a backend must expose. The collection facades
//! are written entirely against these traits, so the embedded
//! `MemoryStore` and a networked client are interchangeable.
//!
//! Every primitive is atomic at the store and totally ordered relative
//! to other primitives on the same key. Elements are opaque byte
//! payloads here; typed encode/decode happens above this boundary.
//!
//! Thread safety: all methods must be safe to call concurrently from
//! multiple threads (requires Send + Sync).

use crate::error::Result;
use crate::types::{Order, ScanCursor, ScanPage, ScoreRange, ScoredEntry};

/// Unordered-set primitives
///
/// A set key holds unique byte payloads. A key with no members does not
/// exist: backends must delete the underlying structure when the last
/// member is removed, and treat queries on an absent key as empty.
pub trait SetStore: Send + Sync {
    /// Add payloads to the set, creating it if absent
    ///
    /// Returns the number of payloads that were not already present.
    /// Adding an existing payload is a no-op (add is idempotent).
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    fn set_add(&self, key: &str, members: &[Vec<u8>]) -> Result<u64>;

    /// Remove payloads from the set
    ///
    /// Returns the number actually removed. Removing an absent payload
    /// is a no-op. Deletes the set when it becomes empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    fn set_remove(&self, key: &str, members: &[Vec<u8>]) -> Result<u64>;

    /// Membership test for a single payload
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    fn set_contains(&self, key: &str, member: &[u8]) -> Result<bool>;

    /// Number of members (0 for an absent key)
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    fn set_cardinality(&self, key: &str) -> Result<u64>;

    /// Fetch one batch of members, resuming from `cursor`
    ///
    /// `count` is the maximum batch size. The returned page carries the
    /// cursor for the next batch, or `None` once the set is exhausted.
    /// No ordering guarantee across the whole scan; members added or
    /// removed mid-scan may or may not appear.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    fn set_scan(&self, key: &str, cursor: &ScanCursor, count: usize) -> Result<ScanPage>;
}

/// Ordered-set primitives
///
/// A sorted-set key holds unique byte payloads ordered by
/// `(score, payload bytes)` ascending. Same existence-on-empty rule as
/// [`SetStore`]. Degenerate score ranges yield empty results, never an
/// error.
pub trait SortedSetStore: Send + Sync {
    /// Upsert scored payloads, creating the structure if absent
    ///
    /// Re-adding an existing payload overwrites its score (replacement,
    /// not increment). Returns the number of payloads that were new.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    fn sorted_add(&self, key: &str, entries: &[ScoredEntry]) -> Result<u64>;

    /// Atomically add `delta` to a payload's score
    ///
    /// An absent payload is created with score `delta` (missing is
    /// treated as score 0). Returns the new score.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    fn sorted_increment(&self, key: &str, member: &[u8], delta: f64) -> Result<f64>;

    /// Number of members regardless of score (0 for an absent key)
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    fn sorted_cardinality(&self, key: &str) -> Result<u64>;

    /// Number of members with score inside `range` (inclusive)
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    fn sorted_count_by_score(&self, key: &str, range: ScoreRange) -> Result<u64>;

    /// Members with score inside `range`, ordered by `order`, paginated
    ///
    /// `offset` skips that many members of the filtered range; `limit`
    /// caps the result (`None` = all remaining). Ties between equal
    /// scores order by payload bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    fn sorted_range_by_score(
        &self,
        key: &str,
        range: ScoreRange,
        order: Order,
        offset: u64,
        limit: Option<u64>,
    ) -> Result<Vec<ScoredEntry>>;

    /// Members in the zero-based rank window `[start, stop]` under `order`
    ///
    /// Negative indices count from the end (Python-slice style), with
    /// the same resolution under either order. `stop` is inclusive. An
    /// out-of-domain window yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    fn sorted_range_by_rank(
        &self,
        key: &str,
        start: i64,
        stop: i64,
        order: Order,
    ) -> Result<Vec<ScoredEntry>>;

    /// Atomically delete all members with score inside `range`
    ///
    /// Returns the number deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    fn sorted_remove_range_by_score(&self, key: &str, range: ScoreRange) -> Result<u64>;

    /// Atomically delete the ascending-rank window `[start, stop]`
    ///
    /// Negative indices count from the end; `stop` is inclusive.
    /// Returns the number deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    fn sorted_remove_range_by_rank(&self, key: &str, start: i64, stop: i64) -> Result<u64>;

    /// Zero-based rank of a payload under `order`
    ///
    /// Returns `None` if the payload or the whole structure is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    fn sorted_rank_of(&self, key: &str, member: &[u8], order: Order) -> Result<Option<u64>>;

    /// Current score of a payload, `None` if absent
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    fn sorted_score_of(&self, key: &str, member: &[u8]) -> Result<Option<f64>>;
}
