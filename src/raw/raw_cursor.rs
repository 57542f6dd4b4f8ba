use super::handle::Handle;
use super::raw_avl_tree::RawAvlTree;
use crate::comparator::Comparator;
use crate::error::CursorError;

/// Where a cursor stands relative to the linked list.
///
/// `Before(n)` and `After(n)` are the gaps on either side of `n` left behind by
/// key-relative positioning; the next step in either direction collapses them to `On`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Position {
    BeforeFirst,
    AfterLast,
    On(Handle),
    Before(Handle),
    After(Handle),
}

/// Cursor state machine over the linked list of a [`RawAvlTree`].
///
/// The shared borrow of the tree keeps it frozen for the cursor's lifetime.
pub(crate) struct RawCursor<'a, K, V, C> {
    tree: &'a RawAvlTree<K, V, C>,
    position: Position,
    closed: bool,
}

impl<'a, K, V, C> RawCursor<'a, K, V, C> {
    pub(crate) fn new(tree: &'a RawAvlTree<K, V, C>) -> Self {
        Self {
            tree,
            position: Position::BeforeFirst,
            closed: false,
        }
    }

    pub(crate) fn tree(&self) -> &'a RawAvlTree<K, V, C> {
        self.tree
    }

    pub(crate) fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn check_open(&self, operation: &'static str) -> Result<(), CursorError> {
        if self.closed {
            Err(CursorError::Closed { operation })
        } else {
            Ok(())
        }
    }

    pub(crate) fn before_first(&mut self) -> Result<(), CursorError> {
        self.check_open("before_first")?;
        self.position = Position::BeforeFirst;
        Ok(())
    }

    pub(crate) fn after_last(&mut self) -> Result<(), CursorError> {
        self.check_open("after_last")?;
        self.position = Position::AfterLast;
        Ok(())
    }

    pub(crate) fn first(&mut self) -> Result<bool, CursorError> {
        self.check_open("first")?;
        let first = self.tree.first();
        self.position = first.map_or(Position::BeforeFirst, Position::On);
        Ok(first.is_some())
    }

    pub(crate) fn last(&mut self) -> Result<bool, CursorError> {
        self.check_open("last")?;
        let last = self.tree.last();
        self.position = last.map_or(Position::AfterLast, Position::On);
        Ok(last.is_some())
    }

    pub(crate) fn next(&mut self) -> Result<bool, CursorError> {
        self.check_open("next")?;
        let target = match self.position {
            Position::BeforeFirst => self.tree.first(),
            Position::On(handle) | Position::After(handle) => self.tree.next(handle),
            Position::Before(handle) => Some(handle),
            Position::AfterLast => return Ok(false),
        };
        self.position = target.map_or(Position::AfterLast, Position::On);
        Ok(target.is_some())
    }

    pub(crate) fn previous(&mut self) -> Result<bool, CursorError> {
        self.check_open("previous")?;
        let target = match self.position {
            Position::AfterLast => self.tree.last(),
            Position::On(handle) | Position::Before(handle) => self.tree.prev(handle),
            Position::After(handle) => Some(handle),
            Position::BeforeFirst => return Ok(false),
        };
        self.position = target.map_or(Position::BeforeFirst, Position::On);
        Ok(target.is_some())
    }

    /// Returns the node the cursor is on.
    pub(crate) fn current(&self) -> Result<Handle, CursorError> {
        self.check_open("get")?;
        match self.position {
            Position::On(handle) => Ok(handle),
            _ => Err(CursorError::InvalidPosition),
        }
    }

    pub(crate) fn available(&self) -> bool {
        !self.closed && matches!(self.position, Position::On(_))
    }

    pub(crate) fn close(&mut self) {
        if !self.closed {
            log::trace!("closing cursor at {:?}", self.position);
        }
        self.closed = true;
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<K, V, C: Comparator<K>> RawCursor<'_, K, V, C> {
    pub(crate) fn before(&mut self, key: &K) -> Result<(), CursorError> {
        self.check_open("before")?;
        self.position = self.tree.find_less(key).map_or(Position::BeforeFirst, Position::After);
        Ok(())
    }

    pub(crate) fn after(&mut self, key: &K) -> Result<(), CursorError> {
        self.check_open("after")?;
        self.position = self.tree.find_greater(key).map_or(Position::AfterLast, Position::Before);
        Ok(())
    }
}
