//! RemoteSet: typed unordered set backed by a remote store
//!
//! ## Design
//!
//! RemoteSet is a stateless facade over a [`SetStore`] backend. It
//! holds no membership state; every query goes to the store, and
//! cardinality is recomputed on each access.
//!
//! ## Atomicity
//!
//! Single-primitive operations (`insert`, `remove`, `contains`, `len`)
//! are atomic at the store. The set-algebra operations are composite:
//! they issue several primitive calls and are NOT atomic as a whole. A
//! concurrent writer can produce results consistent with no single
//! before/after snapshot (read skew). No rollback is attempted on a
//! mid-algorithm failure; effects applied so far remain.
//!
//! ## Byte-equality semantics
//!
//! The store dedupes by encoded payload bytes. Client-provided
//! sequences are compared after encoding, so element equality is
//! exactly payload equality.

use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use corral_core::{BincodeCodec, Codec, Result, ScanCursor, SetStore};

use crate::object::RemoteObject;

/// Scan batch size for enumeration and composite algorithms
const SCAN_BATCH: usize = 128;

/// Typed unordered set of unique elements stored remotely
///
/// # Example
///
/// ```ignore
/// use corral_collections::RemoteSet;
/// use corral_store::MemoryStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStore::new());
/// let tags: RemoteSet<String, _> = RemoteSet::new(store, "post:7:tags");
///
/// assert!(tags.insert(&"rust".to_string())?);
/// assert!(!tags.insert(&"rust".to_string())?); // already present
/// assert_eq!(tags.len()?, 1);
/// ```
pub struct RemoteSet<T, S, C = BincodeCodec> {
    inner: RemoteObject<S, C>,
    _element: PhantomData<fn() -> T>,
}

impl<T, S, C> RemoteSet<T, S, C>
where
    T: Serialize + DeserializeOwned,
    S: SetStore,
    C: Codec,
{
    /// Bind a set handle to `key` on `store` with the default codec
    pub fn new(store: Arc<S>, key: impl Into<String>) -> Self
    where
        C: Default,
    {
        Self::with_codec(store, key, C::default())
    }

    /// Bind a set handle with an explicit codec
    pub fn with_codec(store: Arc<S>, key: impl Into<String>, codec: C) -> Self {
        Self {
            inner: RemoteObject::new(store, key, codec),
            _element: PhantomData,
        }
    }

    /// The key naming the remote set
    pub fn key(&self) -> &str {
        self.inner.key()
    }

    fn store(&self) -> &S {
        self.inner.store().as_ref()
    }

    // ========== Single-primitive operations (atomic at the store) ==========

    /// Add one element; true iff it was not already present
    ///
    /// One round trip.
    pub fn insert(&self, item: &T) -> Result<bool> {
        let payload = self.inner.encode(item)?;
        Ok(self.store().set_add(self.key(), &[payload])? == 1)
    }

    /// Bulk-add; one round trip, returns the number newly added
    pub fn insert_all<'a, I>(&self, items: I) -> Result<u64>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let payloads: Vec<Vec<u8>> = items
            .into_iter()
            .map(|item| self.inner.encode(item))
            .collect::<Result<_>>()?;
        if payloads.is_empty() {
            return Ok(0);
        }
        self.store().set_add(self.key(), &payloads)
    }

    /// Remove one element; true iff it was present
    pub fn remove(&self, item: &T) -> Result<bool> {
        let payload = self.inner.encode(item)?;
        Ok(self.store().set_remove(self.key(), &[payload])? == 1)
    }

    /// Membership test; one round trip
    pub fn contains(&self, item: &T) -> Result<bool> {
        let payload = self.inner.encode(item)?;
        self.store().set_contains(self.key(), &payload)
    }

    /// Remote cardinality, recomputed on every call (never cached)
    pub fn len(&self) -> Result<u64> {
        self.store().set_cardinality(self.key())
    }

    /// True if the set has no members (equivalently, does not exist)
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Lazy enumeration of all elements
    ///
    /// Fetches one scan batch per store round trip and yields decoded
    /// elements. No ordering guarantee. Each call starts a fresh scan,
    /// so the iterator is restartable. Elements mutated concurrently
    /// may or may not appear (store-dependent snapshot semantics).
    pub fn iter(&self) -> SetIter<'_, T, S, C> {
        SetIter {
            set: self,
            cursor: Some(ScanCursor::start()),
            buffer: VecDeque::new(),
            failed: false,
        }
    }

    // ========== Composite algorithms (NOT atomic as a whole) ==========

    /// Remove every element matching `predicate`; returns the count removed
    ///
    /// Two-phase: materializes all current elements by scanning, filters
    /// client-side, then issues one bulk removal. Elements added between
    /// the scan and the removal are unaffected; matching elements removed
    /// concurrently are silently skipped.
    pub fn remove_where<F>(&self, mut predicate: F) -> Result<u64>
    where
        F: FnMut(&T) -> bool,
    {
        let mut doomed = Vec::new();
        for payload in self.scan_all()? {
            let item: T = self.inner.decode(&payload)?;
            if predicate(&item) {
                doomed.push(payload);
            }
        }
        if doomed.is_empty() {
            return Ok(0);
        }
        let removed = self.store().set_remove(self.key(), &doomed)?;
        debug!(key = self.key(), removed, "remove_where bulk removal");
        Ok(removed)
    }

    /// Remove every element of `other` from this set
    ///
    /// Single bulk removal; elements of `other` not present are no-ops.
    pub fn except_with<'a, I>(&self, other: I) -> Result<u64>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let payloads: Vec<Vec<u8>> = other
            .into_iter()
            .map(|item| self.inner.encode(item))
            .collect::<Result<_>>()?;
        if payloads.is_empty() {
            return Ok(0);
        }
        self.store().set_remove(self.key(), &payloads)
    }

    /// Keep only elements also present in `other`
    ///
    /// Two-phase: materializes `other` as an encoded payload set, scans
    /// this set, then issues one bulk removal of the non-members.
    /// Returns the count removed.
    pub fn intersect_with<'a, I>(&self, other: I) -> Result<u64>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let keep = self.materialize(other)?;
        let doomed: Vec<Vec<u8>> = self
            .scan_all()?
            .into_iter()
            .filter(|payload| !keep.contains(payload))
            .collect();
        if doomed.is_empty() {
            return Ok(0);
        }
        let removed = self.store().set_remove(self.key(), &doomed)?;
        debug!(key = self.key(), removed, "intersect_with bulk removal");
        Ok(removed)
    }

    /// Add every element of `other` not already present
    ///
    /// Membership is tested before each add, so a mostly-overlapping
    /// `other` costs one round trip per element instead of a write per
    /// element. Returns the count added.
    pub fn union_with<'a, I>(&self, other: I) -> Result<u64>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let mut added = 0u64;
        for item in other {
            let payload = self.inner.encode(item)?;
            if !self.store().set_contains(self.key(), &payload)? {
                added += self.store().set_add(self.key(), std::slice::from_ref(&payload))?;
            }
        }
        Ok(added)
    }

    /// Toggle membership of every element of `other`
    ///
    /// Present elements are removed, absent ones added, one element at
    /// a time; a duplicate in `other` toggles twice.
    pub fn symmetric_except_with<'a, I>(&self, other: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        for item in other {
            let payload = self.inner.encode(item)?;
            if self.store().set_remove(self.key(), std::slice::from_ref(&payload))? == 0 {
                self.store().set_add(self.key(), std::slice::from_ref(&payload))?;
            }
        }
        Ok(())
    }

    /// True if every element of this set is in `other`
    pub fn is_subset_of<'a, I>(&self, other: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        self.subset_check(other, false)
    }

    /// True if this set is a subset of `other` and strictly smaller
    pub fn is_proper_subset_of<'a, I>(&self, other: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        self.subset_check(other, true)
    }

    /// True if every element of `other` is in this set
    pub fn is_superset_of<'a, I>(&self, other: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        self.superset_check(other, false)
    }

    /// True if this set is a superset of `other` and strictly larger
    pub fn is_proper_superset_of<'a, I>(&self, other: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        self.superset_check(other, true)
    }

    /// True if this set shares at least one element with `other`
    ///
    /// Short-circuits on the first common element; worst case is one
    /// membership round trip per element of `other`.
    pub fn overlaps<'a, I>(&self, other: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        for item in other {
            let payload = self.inner.encode(item)?;
            if self.store().set_contains(self.key(), &payload)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// True if this set and `other` contain exactly the same elements
    ///
    /// Cardinality-equal AND every element of `other` contained;
    /// short-circuits on the first mismatch.
    pub fn set_equals<'a, I>(&self, other: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let other_set = self.materialize(other)?;
        if self.len()? != other_set.len() as u64 {
            return Ok(false);
        }
        for payload in &other_set {
            if !self.store().set_contains(self.key(), payload)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    // ========== Internal helpers ==========

    /// Buffer a client-provided sequence as a set of encoded payloads
    ///
    /// O(|other|) client-side buffering; dedupes by payload bytes.
    fn materialize<'a, I>(&self, other: I) -> Result<FxHashSet<Vec<u8>>>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        other
            .into_iter()
            .map(|item| self.inner.encode(item))
            .collect()
    }

    /// Fetch every current payload via the scan cursor
    fn scan_all(&self) -> Result<Vec<Vec<u8>>> {
        let mut all = Vec::new();
        let mut cursor = ScanCursor::start();
        loop {
            let page = self.store().set_scan(self.key(), &cursor, SCAN_BATCH)?;
            all.extend(page.members);
            match page.next {
                Some(next) => cursor = next,
                None => return Ok(all),
            }
        }
    }

    /// Containment check of this set against `other`, with cheap
    /// cardinality rejects first
    fn subset_check<'a, I>(&self, other: I, proper: bool) -> Result<bool>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let other_set = self.materialize(other)?;
        let card = self.len()?;
        if card > other_set.len() as u64 {
            return Ok(false);
        }
        if proper && card == other_set.len() as u64 {
            return Ok(false);
        }
        // Scan self page by page so a mismatch stops the traversal early
        let mut cursor = ScanCursor::start();
        loop {
            let page = self.store().set_scan(self.key(), &cursor, SCAN_BATCH)?;
            for payload in &page.members {
                if !other_set.contains(payload) {
                    return Ok(false);
                }
            }
            match page.next {
                Some(next) => cursor = next,
                None => return Ok(true),
            }
        }
    }

    /// Containment check of `other` against this set
    fn superset_check<'a, I>(&self, other: I, proper: bool) -> Result<bool>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let other_set = self.materialize(other)?;
        let card = self.len()?;
        if card < other_set.len() as u64 {
            return Ok(false);
        }
        if proper && card == other_set.len() as u64 {
            return Ok(false);
        }
        for payload in &other_set {
            if !self.store().set_contains(self.key(), payload)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<T, S, C: Clone> Clone for RemoteSet<T, S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _element: PhantomData,
        }
    }
}

/// Lazy batch-fetching iterator over a [`RemoteSet`]
///
/// Yields `Result<T>`: a store or decode failure is yielded once and
/// ends the iteration.
pub struct SetIter<'a, T, S, C> {
    set: &'a RemoteSet<T, S, C>,
    cursor: Option<ScanCursor>,
    buffer: VecDeque<Vec<u8>>,
    failed: bool,
}

impl<T, S, C> Iterator for SetIter<'_, T, S, C>
where
    T: Serialize + DeserializeOwned,
    S: SetStore,
    C: Codec,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(payload) = self.buffer.pop_front() {
                return match self.set.inner.decode(&payload) {
                    Ok(item) => Some(Ok(item)),
                    Err(e) => {
                        self.failed = true;
                        Some(Err(e))
                    }
                };
            }
            let cursor = self.cursor.take()?;
            match self.set.store().set_scan(self.set.key(), &cursor, SCAN_BATCH) {
                Ok(page) => {
                    self.buffer = page.members.into();
                    self.cursor = page.next;
                }
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
