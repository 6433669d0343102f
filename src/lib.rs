//! Intrusive weight-balanced order-statistic trees for Rust.
//!
//! This crate provides two intrusive containers over caller-owned values:
//!
//! - [`Iwbt`] - a positional sequence. Values go where the caller puts them:
//!   at either end, next to another value, or at an index.
//! - [`Multimap`] - a key-ordered multimap built on [`Iwbt`]. Duplicate keys
//!   form stable runs whose order the caller controls.
//!
//! Both support O(log n) insertion, removal, [`get_by_rank`](Iwbt::get_by_rank)
//! and [`rank_of`](Iwbt::rank_of).
//!
//! # Example
//!
//! ```
//! use core::cmp::Ordering;
//! use wabi_mmap::{Adapter, Arena, KeyAdapter, Link, Multimap};
//!
//! struct Score {
//!     link: Link,
//!     name: &'static str,
//!     points: u32,
//! }
//!
//! struct ByPoints;
//!
//! impl Adapter for ByPoints {
//!     type Value = Score;
//!     fn link(value: &Score) -> &Link { &value.link }
//!     fn link_mut(value: &mut Score) -> &mut Link { &mut value.link }
//! }
//!
//! impl KeyAdapter for ByPoints {
//!     type Key = u32;
//!     fn key(value: &Score) -> &u32 { &value.points }
//!     fn compare(a: &u32, b: &u32) -> Ordering { a.cmp(b) }
//! }
//!
//! let mut arena = Arena::new();
//! let mut scores = Multimap::<ByPoints>::new();
//! for (name, points) in [("Alice", 100), ("Bob", 85), ("Carol", 92), ("Dave", 85)] {
//!     let score = arena.alloc(Score { link: Link::new(), name, points });
//!     scores.insert_last(&mut arena, score);
//! }
//!
//! // Ties keep insertion order.
//! let names: Vec<_> = scores.iter(&arena).map(|(_, score)| score.name).collect();
//! assert_eq!(names, ["Bob", "Dave", "Carol", "Alice"]);
//!
//! // The median, and where Carol ranks.
//! let median = scores.get_by_rank(&arena, 2).unwrap();
//! assert_eq!(arena[median].name, "Carol");
//! assert_eq!(scores.rank_of(&arena, median), 2);
//! assert_eq!(scores.count_matches(&arena, &85), 2);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Intrusive** - Trees store a root handle and nothing else; the [`Link`] lives inside your value
//! - **Several memberships** - One value can sit in several trees through several links
//! - **`sanity-checks`** - Cargo feature that verifies every invariant after each mutation
//!
//! # Implementation
//!
//! Values are stored in an [`Arena`] and addressed by [`Handle`]. Each [`Link`]
//! records a parent, two children and the weight (size plus one) of its
//! subtree, which is what makes rank queries O(log n). Balance is restored by
//! single and double rotations after every change.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod adapter;
mod error;
mod raw;

pub mod iwbt;
pub mod multimap;

pub use adapter::{Adapter, KeyAdapter};
pub use error::InvariantViolation;
pub use iwbt::Iwbt;
pub use multimap::{Multimap, Search};
pub use raw::{Arena, Handle, Link};
