//! Typed remote collection facades for corral
//!
//! Provides collection handles as stateless facades over a store
//! backend:
//! - **RemoteObject**: (store, key, codec) binding shared by every
//!   collection
//! - **RemoteSet**: unordered unique elements with client-side set
//!   algebra
//! - **RemoteSortedSet**: (score, element) pairs with rank and score
//!   range queries
//!
//! ## Design Principle: Stateless Facades
//!
//! All collections are logically stateful but operationally stateless.
//! They hold only an `Arc` to the store and delegate every operation to
//! it. This means:
//!
//! - Multiple handles on the same key are peers, not replicas
//! - No warm-up or cache invalidation concerns
//! - Concurrent handles across threads and processes are safe at the
//!   primitive level
//!
//! ## Consistency Contract
//!
//! Single-primitive operations are atomic at the store. Composite
//! algorithms (set algebra, subset checks, `remove_where`) issue
//! several primitives and are not atomic as a whole; see the method
//! docs for the exact guarantee each one offers.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod object;
pub mod set;
pub mod sorted_set;

pub use object::RemoteObject;
pub use set::{RemoteSet, SetIter};
pub use sorted_set::{RangeIter, RemoteSortedSet, SortedMember};
