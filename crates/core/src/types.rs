//! Core types for corral
//!
//! This module defines the foundational value types:
//! - OrderedScore: total-order wrapper for f64 scores
//! - ScoreRange: inclusive score interval with infinity sentinels
//! - Order: ascending/descending direction for ranked queries
//! - ScanCursor / ScanPage: restartable enumeration of unordered sets
//! - ScoredEntry: (score, payload) pair at the byte level
//!
//! Elements cross the store boundary as opaque byte payloads; the store
//! compares payload bytes for equality and tie-breaking, never the
//! element type's own equality.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Total-order wrapper around an `f64` score
///
/// Scores are IEEE doubles, which have no `Ord`. Ordered indices and
/// tie-break comparisons use `f64::total_cmp`, which is a total order
/// (NaN sorts above +inf, -NaN below -inf). Sorted-set entries order by
/// `(OrderedScore, payload bytes)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedScore(
    /// Raw score value
    pub f64,
);

impl Eq for OrderedScore {}

impl Ord for OrderedScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for OrderedScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Direction for ranked and score-ordered queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Order {
    /// Lowest score first (rank 0 = lowest score)
    #[default]
    Ascending,
    /// Highest score first (rank 0 = highest score)
    Descending,
}

impl Order {
    /// True for `Order::Descending`
    pub fn is_descending(&self) -> bool {
        matches!(self, Order::Descending)
    }
}

/// Inclusive score interval `[min, max]`
///
/// Unbounded ends use the infinity sentinels (`f64::NEG_INFINITY` /
/// `f64::INFINITY`). A degenerate range (`min > max`, or a NaN bound)
/// is not an error: every query over it yields an empty result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    min: f64,
    max: f64,
}

impl ScoreRange {
    /// Range covering `[min, max]` inclusive
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Unbounded range covering every score
    pub fn all() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Range covering `[min, +inf]`
    pub fn at_least(min: f64) -> Self {
        Self::new(min, f64::INFINITY)
    }

    /// Range covering `[-inf, max]`
    pub fn at_most(max: f64) -> Self {
        Self::new(f64::NEG_INFINITY, max)
    }

    /// Lower bound (inclusive)
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound (inclusive)
    pub fn max(&self) -> f64 {
        self.max
    }

    /// True if no score can fall inside this range
    ///
    /// Holds for `min > max` and for NaN bounds.
    pub fn is_degenerate(&self) -> bool {
        !(self.min <= self.max)
    }

    /// True if `score` falls inside the range
    ///
    /// Bounds are compared with `total_cmp` so membership agrees with
    /// the ordered index. Always false for a degenerate range.
    pub fn contains(&self, score: f64) -> bool {
        if self.is_degenerate() {
            return false;
        }
        self.min.total_cmp(&score) != Ordering::Greater
            && score.total_cmp(&self.max) != Ordering::Greater
    }
}

/// Resume token for restartable set scans
///
/// `ScanCursor::start()` begins a fresh scan; the store hands back the
/// cursor for the next batch in each [`ScanPage`]. The token is opaque
/// to callers. A fresh cursor per enumeration makes scans restartable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanCursor(Option<Vec<u8>>);

impl ScanCursor {
    /// Cursor positioned at the beginning of the set
    pub fn start() -> Self {
        Self(None)
    }

    /// Cursor that resumes after the given payload token
    pub fn after(token: Vec<u8>) -> Self {
        Self(Some(token))
    }

    /// The resume token, if the scan is past the beginning
    pub fn token(&self) -> Option<&[u8]> {
        self.0.as_deref()
    }
}

/// One batch of an unordered-set scan
///
/// `next` is `None` once the set is exhausted. Scans are safe under
/// concurrent mutation, but snapshot semantics are store-dependent: an
/// element added or removed mid-scan may or may not appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPage {
    /// Serialized payloads in this batch (no ordering guarantee)
    pub members: Vec<Vec<u8>>,
    /// Cursor for the following batch, or `None` when exhausted
    pub next: Option<ScanCursor>,
}

impl ScanPage {
    /// An exhausted, empty page
    pub fn empty() -> Self {
        Self {
            members: Vec::new(),
            next: None,
        }
    }
}

/// A (score, payload) pair at the byte level
///
/// This is the wire shape of a sorted-set member: the element itself is
/// an opaque serialized payload, the score an IEEE double.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry {
    /// Ordering score
    pub score: f64,
    /// Serialized element payload
    pub member: Vec<u8>,
}

impl ScoredEntry {
    /// Create a new scored entry
    pub fn new(score: f64, member: Vec<u8>) -> Self {
        Self { score, member }
    }
}
