//! RemoteSortedSet: typed score-ordered set backed by a remote store
//!
//! ## Design
//!
//! A sorted set keys each element by a floating-point score; the store
//! orders entries by (score, payload bytes) ascending. Re-adding an
//! element replaces its score (upsert). Like [`crate::RemoteSet`], the
//! handle is a stateless facade: every query and mutation is a store
//! round trip.
//!
//! ## Atomicity
//!
//! All operations here except the paginated range iterator map to a
//! single store primitive and are atomic. The range iterator fetches
//! one page per round trip; members mutated between pages may be
//! skipped or repeated (store-dependent snapshot semantics).

use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use corral_core::{BincodeCodec, Codec, Order, Result, ScoreRange, ScoredEntry, SortedSetStore};

use crate::object::RemoteObject;

/// Page size for the lazy score-range iterator
const RANGE_BATCH: u64 = 128;

/// One member of a sorted set: an ordering score and the element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortedMember<T> {
    /// Floating-point ordering key
    pub score: f64,
    /// The element itself
    pub value: T,
}

impl<T> SortedMember<T> {
    /// Pair a value with its score
    pub fn new(score: f64, value: T) -> Self {
        Self { score, value }
    }
}

/// Typed sorted set stored remotely, ordered by score
///
/// # Example
///
/// ```ignore
/// use corral_collections::RemoteSortedSet;
/// use corral_core::{Order, ScoreRange};
/// use corral_store::MemoryStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStore::new());
/// let board: RemoteSortedSet<String, _> = RemoteSortedSet::new(store, "leaderboard");
///
/// board.insert(1500.0, &"alice".to_string())?;
/// board.increment_score(&"alice".to_string(), 25.0)?;
/// assert_eq!(board.rank_of(&"alice".to_string(), Order::Descending)?, Some(0));
/// ```
pub struct RemoteSortedSet<T, S, C = BincodeCodec> {
    inner: RemoteObject<S, C>,
    _element: PhantomData<fn() -> T>,
}

impl<T, S, C> RemoteSortedSet<T, S, C>
where
    T: Serialize + DeserializeOwned,
    S: SortedSetStore,
    C: Codec,
{
    /// Bind a sorted-set handle to `key` on `store` with the default codec
    pub fn new(store: Arc<S>, key: impl Into<String>) -> Self
    where
        C: Default,
    {
        Self::with_codec(store, key, C::default())
    }

    /// Bind a sorted-set handle with an explicit codec
    pub fn with_codec(store: Arc<S>, key: impl Into<String>, codec: C) -> Self {
        Self {
            inner: RemoteObject::new(store, key, codec),
            _element: PhantomData,
        }
    }

    /// The key naming the remote sorted set
    pub fn key(&self) -> &str {
        self.inner.key()
    }

    fn store(&self) -> &S {
        self.inner.store().as_ref()
    }

    // ========== Mutation ==========

    /// Upsert one element with `score`; true iff it was new
    ///
    /// An existing element has its score overwritten (replacement, not
    /// increment).
    pub fn insert(&self, score: f64, item: &T) -> Result<bool> {
        let payload = self.inner.encode(item)?;
        Ok(self
            .store()
            .sorted_add(self.key(), &[ScoredEntry::new(score, payload)])?
            == 1)
    }

    /// Upsert one `SortedMember`; true iff it was new
    pub fn insert_member(&self, member: &SortedMember<T>) -> Result<bool> {
        self.insert(member.score, &member.value)
    }

    /// Bulk upsert, one round trip; returns the number newly added
    pub fn insert_all<'a, I>(&self, members: I) -> Result<u64>
    where
        I: IntoIterator<Item = &'a SortedMember<T>>,
        T: 'a,
    {
        let entries: Vec<ScoredEntry> = members
            .into_iter()
            .map(|m| Ok(ScoredEntry::new(m.score, self.inner.encode(&m.value)?)))
            .collect::<Result<_>>()?;
        if entries.is_empty() {
            return Ok(0);
        }
        self.store().sorted_add(self.key(), &entries)
    }

    /// Atomically add `delta` to an element's score; returns the new score
    ///
    /// An absent element is created with score `delta`.
    pub fn increment_score(&self, item: &T, delta: f64) -> Result<f64> {
        let payload = self.inner.encode(item)?;
        self.store().sorted_increment(self.key(), &payload, delta)
    }

    /// Atomically delete all members with score inside `range`
    pub fn remove_range_by_score(&self, range: ScoreRange) -> Result<u64> {
        self.store().sorted_remove_range_by_score(self.key(), range)
    }

    /// Atomically delete the ascending-rank window `[start, stop]`
    ///
    /// Negative indices count from the end; `stop` is inclusive.
    pub fn remove_range_by_rank(&self, start: i64, stop: i64) -> Result<u64> {
        self.store().sorted_remove_range_by_rank(self.key(), start, stop)
    }

    // ========== Queries ==========

    /// Total cardinality regardless of score, recomputed on every call
    pub fn len(&self) -> Result<u64> {
        self.store().sorted_cardinality(self.key())
    }

    /// True if the sorted set has no members (equivalently, is absent)
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Number of members with score inside `range` (inclusive)
    pub fn count_by_score(&self, range: ScoreRange) -> Result<u64> {
        self.store().sorted_count_by_score(self.key(), range)
    }

    /// Lazy paginated members with score inside `range`
    ///
    /// Ordered by `order` (ties by payload bytes); `skip` members of
    /// the filtered range are dropped, and at most `take` are yielded
    /// (`None` = all remaining). One store round trip per page.
    pub fn range_by_score(
        &self,
        range: ScoreRange,
        order: Order,
        skip: u64,
        take: Option<u64>,
    ) -> RangeIter<'_, T, S, C> {
        RangeIter {
            set: self,
            range,
            order,
            offset: skip,
            remaining: take,
            buffer: VecDeque::new(),
            done: false,
        }
    }

    /// Members in the zero-based rank window `[start, stop]` under `order`
    ///
    /// Negative indices count from the end, consistent under either
    /// order; an out-of-domain window is empty, not an error.
    pub fn range_by_rank(&self, start: i64, stop: i64, order: Order) -> Result<Vec<SortedMember<T>>> {
        let entries = self
            .store()
            .sorted_range_by_rank(self.key(), start, stop, order)?;
        entries
            .iter()
            .map(|entry| {
                Ok(SortedMember::new(
                    entry.score,
                    self.inner.decode(&entry.member)?,
                ))
            })
            .collect()
    }

    /// Zero-based rank of `item` under `order`; `None` if absent
    pub fn rank_of(&self, item: &T, order: Order) -> Result<Option<u64>> {
        let payload = self.inner.encode(item)?;
        self.store().sorted_rank_of(self.key(), &payload, order)
    }

    /// Current score of `item`; `None` if absent
    pub fn score_of(&self, item: &T) -> Result<Option<f64>> {
        let payload = self.inner.encode(item)?;
        self.store().sorted_score_of(self.key(), &payload)
    }
}

impl<T, S, C: Clone> Clone for RemoteSortedSet<T, S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _element: PhantomData,
        }
    }
}

/// Lazy paginated iterator over a score range
///
/// Yields `Result<SortedMember<T>>`; a store or decode failure is
/// yielded once and ends the iteration.
pub struct RangeIter<'a, T, S, C> {
    set: &'a RemoteSortedSet<T, S, C>,
    range: ScoreRange,
    order: Order,
    offset: u64,
    remaining: Option<u64>,
    buffer: VecDeque<ScoredEntry>,
    done: bool,
}

impl<T, S, C> Iterator for RangeIter<'_, T, S, C>
where
    T: Serialize + DeserializeOwned,
    S: SortedSetStore,
    C: Codec,
{
    type Item = Result<SortedMember<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            if let Some(entry) = self.buffer.pop_front() {
                return match self.set.inner.decode::<T>(&entry.member) {
                    Ok(value) => Some(Ok(SortedMember::new(entry.score, value))),
                    Err(e) => {
                        self.done = true;
                        Some(Err(e))
                    }
                };
            }
            if self.remaining == Some(0) {
                self.done = true;
                return None;
            }
            let batch = self.remaining.map_or(RANGE_BATCH, |r| r.min(RANGE_BATCH));
            match self.set.store().sorted_range_by_score(
                self.set.key(),
                self.range,
                self.order,
                self.offset,
                Some(batch),
            ) {
                Ok(entries) => {
                    if entries.is_empty() {
                        self.done = true;
                        return None;
                    }
                    self.offset += entries.len() as u64;
                    if let Some(remaining) = self.remaining.as_mut() {
                        *remaining -= entries.len() as u64;
                    }
                    self.buffer = entries.into();
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
