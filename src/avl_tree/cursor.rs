use core::fmt;

use crate::comparator::{Comparator, NaturalOrder};
use crate::cursor::Cursor;
use crate::error::CursorError;
use crate::raw::{RawAvlTree, RawCursor};

/// A [`Cursor`] over the keys of an [`AvlTree`](crate::AvlTree).
///
/// This `struct` is created by the [`cursor`](crate::AvlTree::cursor) method. It starts
/// before the first key, walks the tree's linked list without copying anything, and
/// borrows the tree so that no mutation can happen while it is open.
///
/// # Examples
///
/// ```
/// use avl_core::{AvlTree, Cursor};
///
/// let tree: AvlTree<i32> = [10, 20, 30].into_iter().collect();
/// let mut cursor = tree.cursor();
///
/// cursor.before(&20)?;
/// assert!(cursor.next()?);
/// assert_eq!(cursor.get()?, &20);
///
/// cursor.after(&20)?;
/// assert!(cursor.previous()?);
/// assert_eq!(cursor.get()?, &20);
///
/// cursor.after_last()?;
/// assert!(cursor.previous()?);
/// assert_eq!(cursor.get()?, &30);
/// # Ok::<(), avl_core::CursorError>(())
/// ```
pub struct AvlTreeCursor<'a, K, C = NaturalOrder> {
    raw: RawCursor<'a, K, (), C>,
}

impl<'a, K, C> AvlTreeCursor<'a, K, C> {
    pub(crate) fn new(tree: &'a RawAvlTree<K, (), C>) -> Self {
        AvlTreeCursor {
            raw: RawCursor::new(tree),
        }
    }
}

impl<'a, K, C: Comparator<K>> Cursor for AvlTreeCursor<'a, K, C> {
    type Key = K;
    type Item = &'a K;

    fn before_first(&mut self) -> Result<(), CursorError> {
        self.raw.before_first()
    }

    fn after_last(&mut self) -> Result<(), CursorError> {
        self.raw.after_last()
    }

    fn first(&mut self) -> Result<bool, CursorError> {
        self.raw.first()
    }

    fn last(&mut self) -> Result<bool, CursorError> {
        self.raw.last()
    }

    fn next(&mut self) -> Result<bool, CursorError> {
        self.raw.next()
    }

    fn previous(&mut self) -> Result<bool, CursorError> {
        self.raw.previous()
    }

    fn before(&mut self, key: &K) -> Result<(), CursorError> {
        self.raw.before(key)
    }

    fn after(&mut self, key: &K) -> Result<(), CursorError> {
        self.raw.after(key)
    }

    fn available(&self) -> bool {
        self.raw.available()
    }

    fn get(&self) -> Result<&'a K, CursorError> {
        let handle = self.raw.current()?;
        Ok(self.raw.tree().key(handle))
    }

    fn close(&mut self) {
        self.raw.close();
    }

    fn is_closed(&self) -> bool {
        self.raw.is_closed()
    }
}

impl<K, C> fmt::Debug for AvlTreeCursor<'_, K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvlTreeCursor")
            .field("position", &self.raw.position())
            .field("closed", &self.raw.is_closed())
            .finish()
    }
}
