//! AVL tree collections with linked-list cursors for Rust.
//!
//! This crate provides ordered containers for index and query layers that need
//! boundary searches and bidirectional cursors:
//!
//! - [`AvlTree`] - an ordered set whose nodes are also threaded into a doubly linked
//!   list, so first/last and neighbor steps are O(1)
//! - [`AvlTreeMap`] - an ordered map whose keys may hold several values, kept as a
//!   [`SingletonOrOrderedSet`]
//! - [`ArrayTree`] - a sorted-array set answering the same queries by binary search
//! - [`Cursor`] - the stateful cursor API all of them share
//! - [`marshal`] - a compact binary format for `AvlTree`s
//!
//! # Example
//!
//! ```
//! use avl_core::{AvlTree, Cursor};
//!
//! let mut tree = AvlTree::new();
//! for key in [10, 20, 30] {
//!     tree.insert(key);
//! }
//!
//! // Boundary queries: one descent plus at most one list step.
//! assert_eq!(tree.find_greater(&20), Some(&30));
//! assert_eq!(tree.find_greater_or_equal(&20), Some(&20));
//! assert_eq!(tree.find_less(&20), Some(&10));
//! assert_eq!(tree.find_less_or_equal(&25), Some(&20));
//!
//! // Cursors walk the linked list in both directions.
//! let mut cursor = tree.cursor();
//! cursor.after_last()?;
//! let mut keys = Vec::new();
//! while cursor.previous()? {
//!     keys.push(*cursor.get()?);
//! }
//! assert_eq!(keys, [30, 20, 10]);
//! # Ok::<(), avl_core::CursorError>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Injected ordering** - Every container takes a [`Comparator`]; closures work too
//! - **No unsafe code** - Nodes live in an arena and refer to each other by handle
//!
//! # Implementation
//!
//! Nodes are stored in a slot arena and addressed by 32-bit handles. Each node owns its
//! children through handles and keeps non-owning `prev`/`next` handles for the linked
//! list. Insertion and removal rebalance on the way back up the recursion, each call
//! returning the new root of the subtree it was given.

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

mod raw;

pub mod array_tree;
pub mod avl_tree;
pub mod avl_tree_map;
pub mod comparator;
pub mod cursor;
pub mod error;
pub mod marshal;

pub use array_tree::{ArrayTree, ArrayTreeCursor};
pub use avl_tree::{AvlTree, AvlTreeCursor};
pub use avl_tree_map::{AvlTreeMap, AvlTreeMapCursor, AvlTreeMapFlatCursor, SingletonOrOrderedSet};
pub use comparator::{Comparator, NaturalOrder};
pub use cursor::Cursor;
pub use error::{CursorError, InvariantViolation, MarshalError};
pub use marshal::{AvlTreeMarshaller, KeyMarshaller};
