//! The bidirectional cursor API shared by every container in this crate.

use crate::error::CursorError;

/// A stateful, bidirectional external iterator with explicit before-first and
/// after-last positions.
///
/// A cursor is always in one of three observable states: before the first element,
/// on an element, or after the last element. Key-relative positioning with
/// [`before`](Cursor::before) and [`after`](Cursor::after) places the cursor in the gap
/// next to a key, so that the following [`next`](Cursor::next) or
/// [`previous`](Cursor::previous) lands on the neighboring element.
///
/// Every operation except [`close`](Cursor::close), [`is_closed`](Cursor::is_closed) and
/// [`available`](Cursor::available) fails with [`CursorError::Closed`] once the cursor
/// is closed.
///
/// | Current state   | Operation      | Next state                              | Returns |
/// |-----------------|----------------|-----------------------------------------|---------|
/// | any             | `before_first` | before first                            |         |
/// | any             | `after_last`   | after last                              |         |
/// | any             | `first`        | on the minimum, or before first         | found   |
/// | any             | `last`         | on the maximum, or after last           | found   |
/// | before first    | `next`         | on the minimum, or after last           | found   |
/// | on `n`          | `next`         | on `n`'s successor, or after last       | found   |
/// | after last      | `next`         | after last                              | `false` |
/// | after last      | `previous`     | on the maximum, or before first         | found   |
/// | on `n`          | `previous`     | on `n`'s predecessor, or before first   | found   |
/// | before first    | `previous`     | before first                            | `false` |
///
/// # Examples
///
/// ```
/// use avl_core::{AvlTree, Cursor};
///
/// let tree: AvlTree<i32> = [5, 1, 3].into_iter().collect();
/// let mut cursor = tree.cursor();
///
/// let mut seen = Vec::new();
/// while cursor.next()? {
///     seen.push(*cursor.get()?);
/// }
/// assert_eq!(seen, [1, 3, 5]);
/// assert!(!cursor.available());
/// # Ok::<(), avl_core::CursorError>(())
/// ```
pub trait Cursor {
    /// The key type used for key-relative positioning.
    type Key: ?Sized;
    /// What [`get`](Cursor::get) returns for the current element.
    type Item;

    /// Positions the cursor before the first element.
    ///
    /// # Errors
    ///
    /// [`CursorError::Closed`] if the cursor is closed.
    fn before_first(&mut self) -> Result<(), CursorError>;

    /// Positions the cursor after the last element.
    ///
    /// # Errors
    ///
    /// [`CursorError::Closed`] if the cursor is closed.
    fn after_last(&mut self) -> Result<(), CursorError>;

    /// Moves onto the first element, returning whether there is one.
    ///
    /// # Errors
    ///
    /// [`CursorError::Closed`] if the cursor is closed.
    fn first(&mut self) -> Result<bool, CursorError>;

    /// Moves onto the last element, returning whether there is one.
    ///
    /// # Errors
    ///
    /// [`CursorError::Closed`] if the cursor is closed.
    fn last(&mut self) -> Result<bool, CursorError>;

    /// Advances to the next element, returning whether the cursor is now on one.
    ///
    /// # Errors
    ///
    /// [`CursorError::Closed`] if the cursor is closed.
    fn next(&mut self) -> Result<bool, CursorError>;

    /// Steps back to the previous element, returning whether the cursor is now on one.
    ///
    /// # Errors
    ///
    /// [`CursorError::Closed`] if the cursor is closed.
    fn previous(&mut self) -> Result<bool, CursorError>;

    /// Positions the cursor just before `key`'s place in the order: the next
    /// [`next`](Cursor::next) lands on the least element greater than or equal to `key`,
    /// the next [`previous`](Cursor::previous) on the greatest element less than `key`.
    ///
    /// # Errors
    ///
    /// [`CursorError::Closed`] if the cursor is closed.
    fn before(&mut self, key: &Self::Key) -> Result<(), CursorError>;

    /// Positions the cursor just after `key`'s place in the order: the next
    /// [`next`](Cursor::next) lands on the least element greater than `key`, the next
    /// [`previous`](Cursor::previous) on the greatest element less than or equal to `key`.
    ///
    /// # Errors
    ///
    /// [`CursorError::Closed`] if the cursor is closed.
    fn after(&mut self, key: &Self::Key) -> Result<(), CursorError>;

    /// Returns true if [`get`](Cursor::get) would succeed.
    fn available(&self) -> bool;

    /// Returns the element the cursor is on.
    ///
    /// # Errors
    ///
    /// [`CursorError::Closed`] if the cursor is closed, [`CursorError::InvalidPosition`]
    /// if it is not on an element.
    fn get(&self) -> Result<Self::Item, CursorError>;

    /// Closes the cursor. Closing twice is a no-op.
    fn close(&mut self);

    /// Returns true once [`close`](Cursor::close) has been called.
    fn is_closed(&self) -> bool;
}
