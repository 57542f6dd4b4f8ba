use core::cmp::Ordering;
use core::fmt;

use super::{AvlTreeMap, SingletonOrOrderedSet};
use crate::comparator::{Comparator, NaturalOrder};
use crate::cursor::Cursor;
use crate::error::CursorError;
use crate::raw::{Handle, RawAvlTree, RawCursor};

/// A [`Cursor`] over the entries of an [`AvlTreeMap`], one step per key.
///
/// This `struct` is created by the [`cursor`](AvlTreeMap::cursor) method. Each element is
/// a key together with everything stored under it. Positioning on an individual value
/// is left to [`AvlTreeMapFlatCursor`]; here [`before_value`](Self::before_value) and
/// [`after_value`](Self::after_value) always fail with
/// [`CursorError::UnsupportedOperation`].
pub struct AvlTreeMapCursor<'a, K, V, KC = NaturalOrder, VC = NaturalOrder> {
    raw: RawCursor<'a, K, SingletonOrOrderedSet<V, VC>, KC>,
}

impl<'a, K, V, KC, VC> AvlTreeMapCursor<'a, K, V, KC, VC> {
    pub(crate) fn new(tree: &'a RawAvlTree<K, SingletonOrOrderedSet<V, VC>, KC>) -> Self {
        AvlTreeMapCursor {
            raw: RawCursor::new(tree),
        }
    }

    /// Unsupported on a per-key cursor.
    ///
    /// # Errors
    ///
    /// [`CursorError::Closed`] if the cursor is closed, otherwise
    /// [`CursorError::UnsupportedOperation`].
    pub fn before_value(&mut self, _key: &K, _value: &V) -> Result<(), CursorError> {
        self.raw.check_open("before_value")?;
        Err(CursorError::UnsupportedOperation {
            operation: "before_value",
        })
    }

    /// Unsupported on a per-key cursor.
    ///
    /// # Errors
    ///
    /// [`CursorError::Closed`] if the cursor is closed, otherwise
    /// [`CursorError::UnsupportedOperation`].
    pub fn after_value(&mut self, _key: &K, _value: &V) -> Result<(), CursorError> {
        self.raw.check_open("after_value")?;
        Err(CursorError::UnsupportedOperation {
            operation: "after_value",
        })
    }
}

impl<'a, K, V, KC: Comparator<K>, VC> Cursor for AvlTreeMapCursor<'a, K, V, KC, VC> {
    type Key = K;
    type Item = (&'a K, &'a SingletonOrOrderedSet<V, VC>);

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

    fn get(&self) -> Result<Self::Item, CursorError> {
        let handle = self.raw.current()?;
        let node = self.raw.tree().node(handle);
        Ok((node.key(), node.value()))
    }

    fn close(&mut self) {
        self.raw.close();
    }

    fn is_closed(&self) -> bool {
        self.raw.is_closed()
    }
}

impl<K, V, KC, VC> fmt::Debug for AvlTreeMapCursor<'_, K, V, KC, VC> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvlTreeMapCursor")
            .field("position", &self.raw.position())
            .field("closed", &self.raw.is_closed())
            .finish()
    }
}

/// One `(key, value)` pair: the key's node and, for an ordered set, the value's node in
/// the nested tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Entry {
    outer: Handle,
    inner: Option<Handle>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum FlatPosition {
    BeforeFirst,
    AfterLast,
    On(Entry),
    Before(Entry),
    After(Entry),
}

/// A [`Cursor`] over every `(key, value)` pair of an [`AvlTreeMap`], descending into the
/// ordered set of duplicates held under a key.
///
/// This `struct` is created by the [`flat_cursor`](AvlTreeMap::flat_cursor) method.
/// Pairs come in ascending key order, and in ascending value order within a key.
/// [`before_value`](Self::before_value) and [`after_value`](Self::after_value) position
/// the cursor between two values of one key; they need a map that allows duplicates.
///
/// # Examples
///
/// ```
/// use avl_core::{AvlTreeMap, Cursor};
///
/// let mut map = AvlTreeMap::new(true);
/// map.insert(1, 'b');
/// map.insert(1, 'a');
/// map.insert(2, 'c');
///
/// let mut cursor = map.flat_cursor();
/// let mut pairs = Vec::new();
/// while cursor.next()? {
///     let (key, value) = cursor.get()?;
///     pairs.push((*key, *value));
/// }
/// assert_eq!(pairs, [(1, 'a'), (1, 'b'), (2, 'c')]);
///
/// cursor.after_value(&1, &'a')?;
/// assert!(cursor.next()?);
/// assert_eq!(cursor.get()?, (&1, &'b'));
/// # Ok::<(), avl_core::CursorError>(())
/// ```
pub struct AvlTreeMapFlatCursor<'a, K, V, KC = NaturalOrder, VC = NaturalOrder> {
    map: &'a AvlTreeMap<K, V, KC, VC>,
    position: FlatPosition,
    closed: bool,
}

impl<'a, K, V, KC, VC> AvlTreeMapFlatCursor<'a, K, V, KC, VC> {
    pub(crate) fn new(map: &'a AvlTreeMap<K, V, KC, VC>) -> Self {
        AvlTreeMapFlatCursor {
            map,
            position: FlatPosition::BeforeFirst,
            closed: false,
        }
    }

    fn tree(&self) -> &'a RawAvlTree<K, SingletonOrOrderedSet<V, VC>, KC> {
        &self.map.raw
    }

    fn check_open(&self, operation: &'static str) -> Result<(), CursorError> {
        if self.closed {
            Err(CursorError::Closed { operation })
        } else {
            Ok(())
        }
    }

    fn first_entry(&self, outer: Handle) -> Entry {
        let inner = match self.tree().value(outer) {
            SingletonOrOrderedSet::Singleton(_) => None,
            SingletonOrOrderedSet::OrderedSet(set) => set.raw.first(),
        };
        Entry { outer, inner }
    }

    fn last_entry(&self, outer: Handle) -> Entry {
        let inner = match self.tree().value(outer) {
            SingletonOrOrderedSet::Singleton(_) => None,
            SingletonOrOrderedSet::OrderedSet(set) => set.raw.last(),
        };
        Entry { outer, inner }
    }

    fn successor(&self, entry: Entry) -> Option<Entry> {
        if let Some(inner) = entry.inner
            && let Some(next) = self.tree().value(entry.outer).as_nested().next(inner)
        {
            return Some(Entry {
                outer: entry.outer,
                inner: Some(next),
            });
        }
        self.tree().next(entry.outer).map(|outer| self.first_entry(outer))
    }

    fn predecessor(&self, entry: Entry) -> Option<Entry> {
        if let Some(inner) = entry.inner
            && let Some(prev) = self.tree().value(entry.outer).as_nested().prev(inner)
        {
            return Some(Entry {
                outer: entry.outer,
                inner: Some(prev),
            });
        }
        self.tree().prev(entry.outer).map(|outer| self.last_entry(outer))
    }

    fn pair(&self, entry: Entry) -> (&'a K, &'a V) {
        let node = self.tree().node(entry.outer);
        let value = match entry.inner {
            Some(inner) => node.value().as_nested().key(inner),
            None => node.value().singleton().expect("entry without an inner handle is a singleton"),
        };
        (node.key(), value)
    }
}

impl<K, V, KC: Comparator<K>, VC: Comparator<V>> AvlTreeMapFlatCursor<'_, K, V, KC, VC> {
    fn check_duplicates(&self, operation: &'static str) -> Result<(), CursorError> {
        self.check_open(operation)?;
        if self.map.is_duplicates_allowed() {
            Ok(())
        } else {
            Err(CursorError::UnsupportedOperation { operation })
        }
    }

    /// Positions the cursor just before `(key, value)`: the next [`next`](Cursor::next)
    /// lands on the least pair greater than or equal to it. When `key` is absent this is
    /// [`before(key)`](Cursor::before).
    ///
    /// # Errors
    ///
    /// [`CursorError::Closed`] if the cursor is closed,
    /// [`CursorError::UnsupportedOperation`] if the map does not allow duplicates.
    pub fn before_value(&mut self, key: &K, value: &V) -> Result<(), CursorError> {
        self.check_duplicates("before_value")?;
        let Some(outer) = self.tree().search(key) else {
            return self.before(key);
        };
        let value_comparator = self.map.value_comparator();
        self.position = match self.tree().value(outer) {
            SingletonOrOrderedSet::Singleton(existing) => {
                let entry = Entry { outer, inner: None };
                match value_comparator.compare(value, existing) {
                    Ordering::Greater => FlatPosition::After(entry),
                    Ordering::Less | Ordering::Equal => FlatPosition::Before(entry),
                }
            }
            SingletonOrOrderedSet::OrderedSet(set) => match set.raw.find_less(value) {
                Some(inner) => FlatPosition::After(Entry {
                    outer,
                    inner: Some(inner),
                }),
                None => FlatPosition::Before(self.first_entry(outer)),
            },
        };
        Ok(())
    }

    /// Positions the cursor just after `(key, value)`: the next [`next`](Cursor::next)
    /// lands on the least pair greater than it. When `key` is absent this is
    /// [`after(key)`](Cursor::after).
    ///
    /// # Errors
    ///
    /// [`CursorError::Closed`] if the cursor is closed,
    /// [`CursorError::UnsupportedOperation`] if the map does not allow duplicates.
    pub fn after_value(&mut self, key: &K, value: &V) -> Result<(), CursorError> {
        self.check_duplicates("after_value")?;
        let Some(outer) = self.tree().search(key) else {
            return self.after(key);
        };
        let value_comparator = self.map.value_comparator();
        self.position = match self.tree().value(outer) {
            SingletonOrOrderedSet::Singleton(existing) => {
                let entry = Entry { outer, inner: None };
                match value_comparator.compare(value, existing) {
                    Ordering::Less => FlatPosition::Before(entry),
                    Ordering::Equal | Ordering::Greater => FlatPosition::After(entry),
                }
            }
            SingletonOrOrderedSet::OrderedSet(set) => match set.raw.find_greater(value) {
                Some(inner) => FlatPosition::Before(Entry {
                    outer,
                    inner: Some(inner),
                }),
                None => FlatPosition::After(self.last_entry(outer)),
            },
        };
        Ok(())
    }
}

impl<'a, K, V, KC: Comparator<K>, VC> Cursor for AvlTreeMapFlatCursor<'a, K, V, KC, VC> {
    type Key = K;
    type Item = (&'a K, &'a V);

    fn before_first(&mut self) -> Result<(), CursorError> {
        self.check_open("before_first")?;
        self.position = FlatPosition::BeforeFirst;
        Ok(())
    }

    fn after_last(&mut self) -> Result<(), CursorError> {
        self.check_open("after_last")?;
        self.position = FlatPosition::AfterLast;
        Ok(())
    }

    fn first(&mut self) -> Result<bool, CursorError> {
        self.check_open("first")?;
        let first = self.tree().first().map(|outer| self.first_entry(outer));
        self.position = first.map_or(FlatPosition::BeforeFirst, FlatPosition::On);
        Ok(first.is_some())
    }

    fn last(&mut self) -> Result<bool, CursorError> {
        self.check_open("last")?;
        let last = self.tree().last().map(|outer| self.last_entry(outer));
        self.position = last.map_or(FlatPosition::AfterLast, FlatPosition::On);
        Ok(last.is_some())
    }

    fn next(&mut self) -> Result<bool, CursorError> {
        self.check_open("next")?;
        let target = match self.position {
            FlatPosition::BeforeFirst => self.tree().first().map(|outer| self.first_entry(outer)),
            FlatPosition::On(entry) | FlatPosition::After(entry) => self.successor(entry),
            FlatPosition::Before(entry) => Some(entry),
            FlatPosition::AfterLast => return Ok(false),
        };
        self.position = target.map_or(FlatPosition::AfterLast, FlatPosition::On);
        Ok(target.is_some())
    }

    fn previous(&mut self) -> Result<bool, CursorError> {
        self.check_open("previous")?;
        let target = match self.position {
            FlatPosition::AfterLast => self.tree().last().map(|outer| self.last_entry(outer)),
            FlatPosition::On(entry) | FlatPosition::Before(entry) => self.predecessor(entry),
            FlatPosition::After(entry) => Some(entry),
            FlatPosition::BeforeFirst => return Ok(false),
        };
        self.position = target.map_or(FlatPosition::BeforeFirst, FlatPosition::On);
        Ok(target.is_some())
    }

    fn before(&mut self, key: &K) -> Result<(), CursorError> {
        self.check_open("before")?;
        self.position = match self.tree().find_less(key) {
            Some(outer) => FlatPosition::After(self.last_entry(outer)),
            None => FlatPosition::BeforeFirst,
        };
        Ok(())
    }

    fn after(&mut self, key: &K) -> Result<(), CursorError> {
        self.check_open("after")?;
        self.position = match self.tree().find_greater(key) {
            Some(outer) => FlatPosition::Before(self.first_entry(outer)),
            None => FlatPosition::AfterLast,
        };
        Ok(())
    }

    fn available(&self) -> bool {
        !self.closed && matches!(self.position, FlatPosition::On(_))
    }

    fn get(&self) -> Result<Self::Item, CursorError> {
        self.check_open("get")?;
        match self.position {
            FlatPosition::On(entry) => Ok(self.pair(entry)),
            _ => Err(CursorError::InvalidPosition),
        }
    }

    fn close(&mut self) {
        if !self.closed {
            log::trace!("closing flat cursor at {:?}", self.position);
        }
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<K, V, KC, VC> fmt::Debug for AvlTreeMapFlatCursor<'_, K, V, KC, VC> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvlTreeMapFlatCursor")
            .field("position", &self.position)
            .field("closed", &self.closed)
            .finish()
    }
}
