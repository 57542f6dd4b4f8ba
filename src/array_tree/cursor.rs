use core::fmt;

use super::ArrayTree;
use crate::comparator::{Comparator, NaturalOrder};
use crate::cursor::Cursor;
use crate::error::CursorError;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Position {
    BeforeFirst,
    AfterLast,
    On(usize),
    Before(usize),
    After(usize),
}

/// A [`Cursor`] over the keys of an [`ArrayTree`], stepping by array position.
///
/// This `struct` is created by the [`cursor`](ArrayTree::cursor) method.
///
/// # Examples
///
/// ```
/// use avl_core::{ArrayTree, Cursor};
///
/// let tree: ArrayTree<i32> = [10, 20, 30].into_iter().collect();
/// let mut cursor = tree.cursor();
///
/// cursor.after(&15)?;
/// assert!(cursor.next()?);
/// assert_eq!(cursor.get()?, &20);
/// assert!(cursor.previous()?);
/// assert_eq!(cursor.get()?, &10);
/// # Ok::<(), avl_core::CursorError>(())
/// ```
pub struct ArrayTreeCursor<'a, K, C = NaturalOrder> {
    tree: &'a ArrayTree<K, C>,
    position: Position,
    closed: bool,
}

impl<'a, K, C> ArrayTreeCursor<'a, K, C> {
    pub(crate) fn new(tree: &'a ArrayTree<K, C>) -> Self {
        ArrayTreeCursor {
            tree,
            position: Position::BeforeFirst,
            closed: false,
        }
    }

    fn check_open(&self, operation: &'static str) -> Result<(), CursorError> {
        if self.closed {
            Err(CursorError::Closed { operation })
        } else {
            Ok(())
        }
    }

    fn land(&mut self, target: Option<usize>, otherwise: Position) -> bool {
        self.position = target.map_or(otherwise, Position::On);
        target.is_some()
    }
}

impl<'a, K, C: Comparator<K>> Cursor for ArrayTreeCursor<'a, K, C> {
    type Key = K;
    type Item = &'a K;

    fn before_first(&mut self) -> Result<(), CursorError> {
        self.check_open("before_first")?;
        self.position = Position::BeforeFirst;
        Ok(())
    }

    fn after_last(&mut self) -> Result<(), CursorError> {
        self.check_open("after_last")?;
        self.position = Position::AfterLast;
        Ok(())
    }

    fn first(&mut self) -> Result<bool, CursorError> {
        self.check_open("first")?;
        let first = (!self.tree.is_empty()).then_some(0);
        Ok(self.land(first, Position::BeforeFirst))
    }

    fn last(&mut self) -> Result<bool, CursorError> {
        self.check_open("last")?;
        let last = self.tree.len().checked_sub(1);
        Ok(self.land(last, Position::AfterLast))
    }

    fn next(&mut self) -> Result<bool, CursorError> {
        self.check_open("next")?;
        let len = self.tree.len();
        let target = match self.position {
            Position::BeforeFirst => 0,
            Position::On(position) | Position::After(position) => position + 1,
            Position::Before(position) => position,
            Position::AfterLast => return Ok(false),
        };
        Ok(self.land((target < len).then_some(target), Position::AfterLast))
    }

    fn previous(&mut self) -> Result<bool, CursorError> {
        self.check_open("previous")?;
        let target = match self.position {
            Position::AfterLast => self.tree.len().checked_sub(1),
            Position::On(position) | Position::Before(position) => position.checked_sub(1),
            Position::After(position) => Some(position),
            Position::BeforeFirst => return Ok(false),
        };
        Ok(self.land(target, Position::BeforeFirst))
    }

    fn before(&mut self, key: &K) -> Result<(), CursorError> {
        self.check_open("before")?;
        self.position = self
            .tree
            .get_before_position(key)
            .map_or(Position::BeforeFirst, Position::After);
        Ok(())
    }

    fn after(&mut self, key: &K) -> Result<(), CursorError> {
        self.check_open("after")?;
        self.position = self
            .tree
            .get_after_position(key)
            .map_or(Position::AfterLast, Position::Before);
        Ok(())
    }

    fn available(&self) -> bool {
        !self.closed && matches!(self.position, Position::On(_))
    }

    fn get(&self) -> Result<&'a K, CursorError> {
        self.check_open("get")?;
        match self.position {
            Position::On(position) => self.tree.get(position).ok_or(CursorError::InvalidPosition),
            _ => Err(CursorError::InvalidPosition),
        }
    }

    fn close(&mut self) {
        if !self.closed {
            log::trace!("closing array cursor at {:?}", self.position);
        }
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<K, C> fmt::Debug for ArrayTreeCursor<'_, K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayTreeCursor")
            .field("position", &self.position)
            .field("closed", &self.closed)
            .finish()
    }
}
