//! Error types for cursors, structural validation and marshalling.

use alloc::string::String;

/// Failure of a [`Cursor`](crate::Cursor) operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum CursorError {
    /// The cursor was closed before `operation` was invoked.
    #[error("cannot call `{operation}` on a closed cursor")]
    Closed {
        /// Name of the rejected operation.
        operation: &'static str,
    },
    /// `get` was called while the cursor was not positioned on an element.
    #[error("cursor is not positioned on an element")]
    InvalidPosition,
    /// The cursor does not support `operation`, e.g. value positioning without duplicates.
    #[error("`{operation}` is not supported by this cursor")]
    UnsupportedOperation {
        /// Name of the rejected operation.
        operation: &'static str,
    },
}

/// A broken structural invariant found by [`AvlTree::validate`](crate::AvlTree::validate).
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    /// Two keys at in-order positions `position - 1` and `position` are not strictly ascending.
    #[error("keys are not strictly ascending at in-order position {position}")]
    Order {
        /// In-order position of the second key.
        position: usize,
    },
    /// A node's subtree heights differ by more than one.
    #[error("subtree heights differ by more than one at in-order position {position}")]
    Balance {
        /// In-order position of the node.
        position: usize,
    },
    /// A node's cached height disagrees with its children.
    #[error("cached height is stale at in-order position {position}")]
    Height {
        /// In-order position of the node.
        position: usize,
    },
    /// The linked list does not visit the nodes in in-order sequence.
    #[error("linked list diverges from the in-order traversal at position {position}")]
    Links {
        /// First position where the two sequences differ.
        position: usize,
    },
    /// A key of a duplicates map holds an ordered set of fewer than two values.
    #[error("ordered set under the key at position {position} holds fewer than two values")]
    UndersizedSet {
        /// Position of the key in ascending order.
        position: usize,
    },
    /// The cached length differs from the number of reachable nodes.
    #[error("cached length {cached} differs from {actual} reachable nodes")]
    Length {
        /// The stored length.
        cached: usize,
        /// The number of nodes reachable from the root.
        actual: usize,
    },
}

/// Failure to serialize or deserialize a tree.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum MarshalError {
    /// The input ended before a complete tree was read.
    #[error("input truncated: needed {needed} more bytes at offset {offset}")]
    Truncated {
        /// Offset of the incomplete read.
        offset: usize,
        /// Bytes missing.
        needed: usize,
    },
    /// A tree or child marker byte had an unknown value.
    #[error("unexpected marker {marker} at offset {offset}")]
    InvalidMarker {
        /// Offset of the marker.
        offset: usize,
        /// The marker read.
        marker: i32,
    },
    /// The node count is zero, negative, or disagrees with the nodes present.
    #[error("invalid node count {count}")]
    InvalidCount {
        /// The count read, or the number of nodes found when they disagree.
        count: i64,
    },
    /// A node carried an in-order index that is out of range or repeated.
    #[error("invalid in-order index {index}")]
    InvalidIndex {
        /// The index read.
        index: i64,
    },
    /// A key payload length was negative.
    #[error("invalid key length {length} at offset {offset}")]
    InvalidLength {
        /// Offset of the length field.
        offset: usize,
        /// The length read.
        length: i32,
    },
    /// Nodes were nested deeper than any balanced tree of the declared size allows.
    #[error("tree nested deeper than {limit} levels")]
    TooDeep {
        /// The depth limit.
        limit: usize,
    },
    /// Bytes remained after the tree was read.
    #[error("{remaining} trailing bytes after the tree")]
    TrailingBytes {
        /// Number of unread bytes.
        remaining: usize,
    },
    /// The key marshaller rejected a key.
    #[error("key marshalling failed: {0}")]
    Key(String),
    /// The decoded tree violates a structural invariant.
    #[error("decoded tree is malformed: {0}")]
    Structure(#[from] InvariantViolation),
}
