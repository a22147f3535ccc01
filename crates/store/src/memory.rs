//! MemoryStore: in-memory backend implementing the store contracts
//!
//! This module implements `SetStore` and `SortedSetStore` using:
//! - `BTreeSet<Vec<u8>>` buckets for unordered sets (byte order gives
//!   stable resume-after-token scans under mutation)
//! - member→score `FxHashMap` plus a `BTreeSet<(OrderedScore, payload)>`
//!   ordered index for sorted sets, kept in lockstep
//! - `parking_lot::RwLock` per bucket family for thread-safe access
//!
//! # Design Notes
//!
//! - **Per-command atomicity**: every mutating primitive takes one
//!   write lock for its whole duration, so primitives on the same key
//!   are totally ordered relative to each other.
//! - **Existence on empty**: a bucket is deleted the moment its last
//!   member goes; queries on an absent key see an empty structure.
//! - **Degenerate ranges**: `min > max` or NaN bounds answer with empty
//!   results, never an error.

use std::collections::BTreeSet;
use std::ops::Bound;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use corral_core::{
    Order, OrderedScore, Result, ScanCursor, ScanPage, ScoreRange, ScoredEntry, SetStore,
    SortedSetStore,
};

/// Ordered index entry: score first, payload bytes as tie-break
type Ranked = (OrderedScore, Vec<u8>);

/// One sorted-set structure: score lookup plus ordered index
#[derive(Debug, Default)]
struct SortedBucket {
    /// member payload → current score
    scores: FxHashMap<Vec<u8>, f64>,
    /// entries ordered by (score, payload)
    ordered: BTreeSet<Ranked>,
}

impl SortedBucket {
    /// Upsert a member; returns true if it was new
    fn upsert(&mut self, score: f64, member: Vec<u8>) -> bool {
        match self.scores.insert(member.clone(), score) {
            Some(old) => {
                self.ordered.remove(&(OrderedScore(old), member.clone()));
                self.ordered.insert((OrderedScore(score), member));
                false
            }
            None => {
                self.ordered.insert((OrderedScore(score), member));
                true
            }
        }
    }

    /// Remove a member; returns its old score if present
    fn remove(&mut self, member: &[u8]) -> Option<f64> {
        let old = self.scores.remove(member)?;
        self.ordered.remove(&(OrderedScore(old), member.to_vec()));
        Some(old)
    }

    fn len(&self) -> usize {
        self.scores.len()
    }

    /// Iterate entries with score inside `range`, ascending
    fn score_range(&self, range: ScoreRange) -> impl Iterator<Item = &Ranked> {
        let lower: Bound<Ranked> = Bound::Included((OrderedScore(range.min()), Vec::new()));
        self.ordered
            .range((lower, Bound::Unbounded))
            .take_while(move |(score, _)| range.contains(score.0))
    }
}

/// In-memory store implementing the set and sorted-set contracts
///
/// Thread-safe through `parking_lot::RwLock`; safe to share behind an
/// `Arc` across threads and across any number of collection handles.
/// State lives only in this process, which makes it the reference
/// backend for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sets: RwLock<FxHashMap<String, BTreeSet<Vec<u8>>>>,
    sorted: RwLock<FxHashMap<String, SortedBucket>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a possibly-negative inclusive rank window against `len`
    ///
    /// Returns `None` when the window misses the structure entirely.
    fn resolve_window(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
        let n = len as i64;
        if n == 0 {
            return None;
        }
        let mut start = if start < 0 { n + start } else { start };
        let mut stop = if stop < 0 { n + stop } else { stop };
        if start < 0 {
            start = 0;
        }
        if stop >= n {
            stop = n - 1;
        }
        if start >= n || stop < 0 || start > stop {
            return None;
        }
        Some((start as usize, stop as usize))
    }
}

impl SetStore for MemoryStore {
    fn set_add(&self, key: &str, members: &[Vec<u8>]) -> Result<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        let mut sets = self.sets.write();
        let bucket = sets.entry(key.to_string()).or_default();
        let mut added = 0u64;
        for member in members {
            if bucket.insert(member.clone()) {
                added += 1;
            }
        }
        Ok(added)
    }

    fn set_remove(&self, key: &str, members: &[Vec<u8>]) -> Result<u64> {
        let mut sets = self.sets.write();
        let Some(bucket) = sets.get_mut(key) else {
            return Ok(0);
        };
        let mut removed = 0u64;
        for member in members {
            if bucket.remove(member.as_slice()) {
                removed += 1;
            }
        }
        if bucket.is_empty() {
            sets.remove(key);
            debug!(key, "set deleted on last removal");
        }
        Ok(removed)
    }

    fn set_contains(&self, key: &str, member: &[u8]) -> Result<bool> {
        let sets = self.sets.read();
        Ok(sets.get(key).is_some_and(|b| b.contains(member)))
    }

    fn set_cardinality(&self, key: &str) -> Result<u64> {
        let sets = self.sets.read();
        Ok(sets.get(key).map_or(0, |b| b.len() as u64))
    }

    fn set_scan(&self, key: &str, cursor: &ScanCursor, count: usize) -> Result<ScanPage> {
        let count = count.max(1);
        let sets = self.sets.read();
        let Some(bucket) = sets.get(key) else {
            return Ok(ScanPage::empty());
        };
        let lower: Bound<&[u8]> = match cursor.token() {
            Some(token) => Bound::Excluded(token),
            None => Bound::Unbounded,
        };
        let members: Vec<Vec<u8>> = bucket
            .range::<[u8], _>((lower, Bound::Unbounded))
            .take(count)
            .cloned()
            .collect();
        // A full batch may be the exact tail; the follow-up scan from
        // the last token then comes back empty and terminal.
        let next = if members.len() == count {
            members.last().cloned().map(ScanCursor::after)
        } else {
            None
        };
        Ok(ScanPage { members, next })
    }
}

impl SortedSetStore for MemoryStore {
    fn sorted_add(&self, key: &str, entries: &[ScoredEntry]) -> Result<u64> {
        if entries.is_empty() {
            return Ok(0);
        }
        let mut sorted = self.sorted.write();
        let bucket = sorted.entry(key.to_string()).or_default();
        let mut added = 0u64;
        for entry in entries {
            if bucket.upsert(entry.score, entry.member.clone()) {
                added += 1;
            }
        }
        Ok(added)
    }

    fn sorted_increment(&self, key: &str, member: &[u8], delta: f64) -> Result<f64> {
        let mut sorted = self.sorted.write();
        let bucket = sorted.entry(key.to_string()).or_default();
        let new_score = bucket.scores.get(member).copied().unwrap_or(0.0) + delta;
        bucket.upsert(new_score, member.to_vec());
        Ok(new_score)
    }

    fn sorted_cardinality(&self, key: &str) -> Result<u64> {
        let sorted = self.sorted.read();
        Ok(sorted.get(key).map_or(0, |b| b.len() as u64))
    }

    fn sorted_count_by_score(&self, key: &str, range: ScoreRange) -> Result<u64> {
        if range.is_degenerate() {
            return Ok(0);
        }
        let sorted = self.sorted.read();
        let Some(bucket) = sorted.get(key) else {
            return Ok(0);
        };
        Ok(bucket.score_range(range).count() as u64)
    }

    fn sorted_range_by_score(
        &self,
        key: &str,
        range: ScoreRange,
        order: Order,
        offset: u64,
        limit: Option<u64>,
    ) -> Result<Vec<ScoredEntry>> {
        if range.is_degenerate() {
            return Ok(Vec::new());
        }
        let sorted = self.sorted.read();
        let Some(bucket) = sorted.get(key) else {
            return Ok(Vec::new());
        };
        let mut matching: Vec<ScoredEntry> = bucket
            .score_range(range)
            .map(|(score, member)| ScoredEntry::new(score.0, member.clone()))
            .collect();
        if order.is_descending() {
            matching.reverse();
        }
        let offset = offset.min(matching.len() as u64) as usize;
        let end = match limit {
            Some(limit) => (offset as u64).saturating_add(limit).min(matching.len() as u64) as usize,
            None => matching.len(),
        };
        Ok(matching[offset..end].to_vec())
    }

    fn sorted_range_by_rank(
        &self,
        key: &str,
        start: i64,
        stop: i64,
        order: Order,
    ) -> Result<Vec<ScoredEntry>> {
        let sorted = self.sorted.read();
        let Some(bucket) = sorted.get(key) else {
            return Ok(Vec::new());
        };
        let Some((start, stop)) = Self::resolve_window(bucket.len(), start, stop) else {
            return Ok(Vec::new());
        };
        let window = stop - start + 1;
        let entry = |(score, member): &Ranked| ScoredEntry::new(score.0, member.clone());
        let entries = if order.is_descending() {
            bucket.ordered.iter().rev().skip(start).take(window).map(entry).collect()
        } else {
            bucket.ordered.iter().skip(start).take(window).map(entry).collect()
        };
        Ok(entries)
    }

    fn sorted_remove_range_by_score(&self, key: &str, range: ScoreRange) -> Result<u64> {
        if range.is_degenerate() {
            return Ok(0);
        }
        let mut sorted = self.sorted.write();
        let Some(bucket) = sorted.get_mut(key) else {
            return Ok(0);
        };
        let doomed: Vec<Vec<u8>> = bucket
            .score_range(range)
            .map(|(_, member)| member.clone())
            .collect();
        for member in &doomed {
            bucket.remove(member);
        }
        if bucket.len() == 0 {
            sorted.remove(key);
            debug!(key, "sorted set deleted on last removal");
        }
        Ok(doomed.len() as u64)
    }

    fn sorted_remove_range_by_rank(&self, key: &str, start: i64, stop: i64) -> Result<u64> {
        let mut sorted = self.sorted.write();
        let Some(bucket) = sorted.get_mut(key) else {
            return Ok(0);
        };
        let Some((start, stop)) = Self::resolve_window(bucket.len(), start, stop) else {
            return Ok(0);
        };
        let doomed: Vec<Vec<u8>> = bucket
            .ordered
            .iter()
            .skip(start)
            .take(stop - start + 1)
            .map(|(_, member)| member.clone())
            .collect();
        for member in &doomed {
            bucket.remove(member);
        }
        if bucket.len() == 0 {
            sorted.remove(key);
            debug!(key, "sorted set deleted on last removal");
        }
        Ok(doomed.len() as u64)
    }

    fn sorted_rank_of(&self, key: &str, member: &[u8], order: Order) -> Result<Option<u64>> {
        let sorted = self.sorted.read();
        let Some(bucket) = sorted.get(key) else {
            return Ok(None);
        };
        let Some(score) = bucket.scores.get(member).copied() else {
            return Ok(None);
        };
        let below = bucket
            .ordered
            .range((
                Bound::Unbounded,
                Bound::Excluded((OrderedScore(score), member.to_vec())),
            ))
            .count() as u64;
        let rank = if order.is_descending() {
            bucket.len() as u64 - 1 - below
        } else {
            below
        };
        Ok(Some(rank))
    }

    fn sorted_score_of(&self, key: &str, member: &[u8]) -> Result<Option<f64>> {
        let sorted = self.sorted.read();
        Ok(sorted.get(key).and_then(|b| b.scores.get(member).copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(s: &str) -> Vec<u8> {
        s.as_bytes().to_vec()
    }

    // ====================================================================
    // Unordered set primitives
    // ====================================================================

    #[test]
    fn set_add_reports_only_new_members() {
        let store = MemoryStore::new();
        assert_eq!(store.set_add("s", &[payload("a"), payload("b")]).unwrap(), 2);
        assert_eq!(store.set_add("s", &[payload("b"), payload("c")]).unwrap(), 1);
        assert_eq!(store.set_cardinality("s").unwrap(), 3);
    }

    #[test]
    fn set_remove_absent_member_is_noop() {
        let store = MemoryStore::new();
        store.set_add("s", &[payload("a")]).unwrap();
        assert_eq!(store.set_remove("s", &[payload("zz")]).unwrap(), 0);
        assert_eq!(store.set_cardinality("s").unwrap(), 1);
    }

    #[test]
    fn set_deleted_when_last_member_removed() {
        let store = MemoryStore::new();
        store.set_add("s", &[payload("only")]).unwrap();
        store.set_remove("s", &[payload("only")]).unwrap();
        assert_eq!(store.set_cardinality("s").unwrap(), 0);
        assert!(!store.set_contains("s", b"only").unwrap());
        // The bucket itself is gone, not just empty
        assert!(store.sets.read().get("s").is_none());
    }

    #[test]
    fn set_queries_on_absent_key_are_empty() {
        let store = MemoryStore::new();
        assert_eq!(store.set_cardinality("nope").unwrap(), 0);
        assert!(!store.set_contains("nope", b"x").unwrap());
        let page = store.set_scan("nope", &ScanCursor::start(), 10).unwrap();
        assert!(page.members.is_empty());
        assert!(page.next.is_none());
    }

    #[test]
    fn set_scan_pages_cover_the_whole_set() {
        let store = MemoryStore::new();
        let members: Vec<Vec<u8>> = (0..25).map(|i| payload(&format!("m{i:02}"))).collect();
        store.set_add("s", &members).unwrap();

        let mut seen = Vec::new();
        let mut cursor = ScanCursor::start();
        loop {
            let page = store.set_scan("s", &cursor, 7).unwrap();
            seen.extend(page.members);
            match page.next {
                Some(next) => cursor = next,
                None => break,
            }
        }
        seen.sort();
        assert_eq!(seen, members);
    }

    #[test]
    fn set_scan_resumes_after_concurrent_removal_of_cursor_member() {
        let store = MemoryStore::new();
        store
            .set_add("s", &[payload("a"), payload("b"), payload("c"), payload("d")])
            .unwrap();

        let page = store.set_scan("s", &ScanCursor::start(), 2).unwrap();
        assert_eq!(page.members, vec![payload("a"), payload("b")]);
        let cursor = page.next.unwrap();

        // Remove the member the cursor points after; scan must still resume
        store.set_remove("s", &[payload("b")]).unwrap();
        let page = store.set_scan("s", &cursor, 10).unwrap();
        assert_eq!(page.members, vec![payload("c"), payload("d")]);
    }

    #[test]
    fn set_scan_exact_tail_terminates_on_followup() {
        let store = MemoryStore::new();
        store.set_add("s", &[payload("a"), payload("b")]).unwrap();
        let page = store.set_scan("s", &ScanCursor::start(), 2).unwrap();
        assert_eq!(page.members.len(), 2);
        let cursor = page.next.expect("full batch keeps the cursor alive");
        let tail = store.set_scan("s", &cursor, 2).unwrap();
        assert!(tail.members.is_empty());
        assert!(tail.next.is_none());
    }

    // ====================================================================
    // Sorted set primitives
    // ====================================================================

    #[test]
    fn sorted_add_is_upsert() {
        let store = MemoryStore::new();
        assert_eq!(
            store.sorted_add("z", &[ScoredEntry::new(1.0, payload("a"))]).unwrap(),
            1
        );
        // Re-add with a new score: not new, score replaced
        assert_eq!(
            store.sorted_add("z", &[ScoredEntry::new(9.0, payload("a"))]).unwrap(),
            0
        );
        assert_eq!(store.sorted_cardinality("z").unwrap(), 1);
        assert_eq!(store.sorted_score_of("z", b"a").unwrap(), Some(9.0));
    }

    #[test]
    fn sorted_increment_treats_missing_as_zero() {
        let store = MemoryStore::new();
        assert_eq!(store.sorted_increment("z", b"a", 2.5).unwrap(), 2.5);
        assert_eq!(store.sorted_increment("z", b"a", -1.0).unwrap(), 1.5);
        assert_eq!(store.sorted_score_of("z", b"a").unwrap(), Some(1.5));
    }

    #[test]
    fn sorted_range_by_score_is_inclusive_and_tie_broken_by_payload() {
        let store = MemoryStore::new();
        store
            .sorted_add(
                "z",
                &[
                    ScoredEntry::new(5.0, payload("b")),
                    ScoredEntry::new(5.0, payload("a")),
                    ScoredEntry::new(10.0, payload("c")),
                    ScoredEntry::new(10.5, payload("d")),
                    ScoredEntry::new(4.9, payload("e")),
                ],
            )
            .unwrap();
        let entries = store
            .sorted_range_by_score("z", ScoreRange::new(5.0, 10.0), Order::Ascending, 0, None)
            .unwrap();
        let members: Vec<_> = entries.iter().map(|e| e.member.clone()).collect();
        assert_eq!(members, vec![payload("a"), payload("b"), payload("c")]);
    }

    #[test]
    fn sorted_range_by_score_descending_with_pagination() {
        let store = MemoryStore::new();
        let entries: Vec<ScoredEntry> = (0..6)
            .map(|i| ScoredEntry::new(i as f64, payload(&format!("m{i}"))))
            .collect();
        store.sorted_add("z", &entries).unwrap();

        let page = store
            .sorted_range_by_score("z", ScoreRange::all(), Order::Descending, 1, Some(2))
            .unwrap();
        assert_eq!(
            page.iter().map(|e| e.score).collect::<Vec<_>>(),
            vec![4.0, 3.0]
        );
    }

    #[test]
    fn sorted_degenerate_range_is_empty_not_error() {
        let store = MemoryStore::new();
        store.sorted_add("z", &[ScoredEntry::new(1.0, payload("a"))]).unwrap();
        assert_eq!(
            store.sorted_count_by_score("z", ScoreRange::new(9.0, 1.0)).unwrap(),
            0
        );
        assert!(store
            .sorted_range_by_score("z", ScoreRange::new(9.0, 1.0), Order::Ascending, 0, None)
            .unwrap()
            .is_empty());
        assert_eq!(
            store
                .sorted_remove_range_by_score("z", ScoreRange::new(f64::NAN, 1.0))
                .unwrap(),
            0
        );
    }

    #[test]
    fn sorted_range_by_rank_resolves_negative_indices() {
        let store = MemoryStore::new();
        store
            .sorted_add(
                "z",
                &[
                    ScoredEntry::new(1.0, payload("a")),
                    ScoredEntry::new(2.0, payload("b")),
                    ScoredEntry::new(3.0, payload("c")),
                ],
            )
            .unwrap();
        // Last two, ascending
        let entries = store.sorted_range_by_rank("z", -2, -1, Order::Ascending).unwrap();
        let members: Vec<_> = entries.iter().map(|e| e.member.clone()).collect();
        assert_eq!(members, vec![payload("b"), payload("c")]);

        // Same window under descending order slices the reversed sequence
        let entries = store.sorted_range_by_rank("z", -2, -1, Order::Descending).unwrap();
        let members: Vec<_> = entries.iter().map(|e| e.member.clone()).collect();
        assert_eq!(members, vec![payload("b"), payload("a")]);
    }

    #[test]
    fn sorted_range_by_rank_out_of_domain_is_empty() {
        let store = MemoryStore::new();
        store.sorted_add("z", &[ScoredEntry::new(1.0, payload("a"))]).unwrap();
        assert!(store.sorted_range_by_rank("z", 5, 9, Order::Ascending).unwrap().is_empty());
        assert!(store.sorted_range_by_rank("z", 1, 0, Order::Ascending).unwrap().is_empty());
        assert!(store.sorted_range_by_rank("z", -9, -5, Order::Ascending).unwrap().is_empty());
    }

    #[test]
    fn sorted_remove_range_by_rank_removes_lowest_window() {
        let store = MemoryStore::new();
        store
            .sorted_add(
                "z",
                &[
                    ScoredEntry::new(1.0, payload("a")),
                    ScoredEntry::new(2.0, payload("b")),
                    ScoredEntry::new(3.0, payload("c")),
                ],
            )
            .unwrap();
        assert_eq!(store.sorted_remove_range_by_rank("z", 0, 0).unwrap(), 1);
        assert_eq!(store.sorted_cardinality("z").unwrap(), 2);
        assert_eq!(store.sorted_score_of("z", b"a").unwrap(), None);
    }

    #[test]
    fn sorted_set_deleted_when_emptied_by_range_removal() {
        let store = MemoryStore::new();
        store.sorted_add("z", &[ScoredEntry::new(1.0, payload("a"))]).unwrap();
        store.sorted_remove_range_by_score("z", ScoreRange::all()).unwrap();
        assert_eq!(store.sorted_cardinality("z").unwrap(), 0);
        assert!(store.sorted.read().get("z").is_none());
    }

    #[test]
    fn sorted_rank_of_both_orders() {
        let store = MemoryStore::new();
        store
            .sorted_add(
                "z",
                &[
                    ScoredEntry::new(1.0, payload("a")),
                    ScoredEntry::new(2.0, payload("b")),
                    ScoredEntry::new(3.0, payload("c")),
                ],
            )
            .unwrap();
        assert_eq!(store.sorted_rank_of("z", b"b", Order::Ascending).unwrap(), Some(1));
        assert_eq!(store.sorted_rank_of("z", b"b", Order::Descending).unwrap(), Some(1));
        assert_eq!(store.sorted_rank_of("z", b"a", Order::Descending).unwrap(), Some(2));
        assert_eq!(store.sorted_rank_of("z", b"missing", Order::Ascending).unwrap(), None);
        assert_eq!(store.sorted_rank_of("empty", b"a", Order::Ascending).unwrap(), None);
    }

    #[test]
    fn sorted_rank_of_tie_breaks_by_payload() {
        let store = MemoryStore::new();
        store
            .sorted_add(
                "z",
                &[
                    ScoredEntry::new(5.0, payload("b")),
                    ScoredEntry::new(5.0, payload("a")),
                ],
            )
            .unwrap();
        assert_eq!(store.sorted_rank_of("z", b"a", Order::Ascending).unwrap(), Some(0));
        assert_eq!(store.sorted_rank_of("z", b"b", Order::Ascending).unwrap(), Some(1));
    }

    #[test]
    fn set_and_sorted_families_are_independent_keyspaces() {
        let store = MemoryStore::new();
        store.set_add("k", &[payload("a")]).unwrap();
        store.sorted_add("k", &[ScoredEntry::new(1.0, payload("b"))]).unwrap();
        assert_eq!(store.set_cardinality("k").unwrap(), 1);
        assert_eq!(store.sorted_cardinality("k").unwrap(), 1);
        assert!(!store.set_contains("k", b"b").unwrap());
    }
}
