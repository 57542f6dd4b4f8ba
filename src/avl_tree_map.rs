use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;
use core::mem;

use crate::avl_tree::{self, AvlTree};
use crate::comparator::{Comparator, NaturalOrder};
use crate::error::InvariantViolation;
use crate::raw::{Handle, InsertResult, RawAvlTree};

mod cursor;

pub use cursor::{AvlTreeMapCursor, AvlTreeMapFlatCursor};

/// The value stored under one key of an [`AvlTreeMap`]: a single value, or, once a
/// second distinct value arrives in a map that allows duplicates, an ordered set of
/// all of them.
///
/// An `OrderedSet` always holds at least two values. Removing values until one is left
/// turns it back into a `Singleton`, and removing the last one removes the key.
pub enum SingletonOrOrderedSet<V, C = NaturalOrder> {
    /// Exactly one value.
    Singleton(V),
    /// Two or more distinct values, ordered by the map's value comparator.
    OrderedSet(AvlTree<V, C>),
}

/// An iterator over the values held by a [`SingletonOrOrderedSet`], in ascending order.
///
/// This `struct` is created by the [`values`](SingletonOrOrderedSet::values) method.
pub struct Values<'a, V, C = NaturalOrder> {
    inner: ValuesInner<'a, V, C>,
}

enum ValuesInner<'a, V, C> {
    Singleton(Option<&'a V>),
    OrderedSet(avl_tree::Iter<'a, V, C>),
}

impl<V, C> SingletonOrOrderedSet<V, C> {
    /// Returns `true` for a single value.
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        matches!(self, SingletonOrOrderedSet::Singleton(_))
    }

    /// Returns `true` for a set of duplicates.
    #[must_use]
    pub fn is_ordered_set(&self) -> bool {
        matches!(self, SingletonOrOrderedSet::OrderedSet(_))
    }

    /// Returns the single value, if this is one.
    #[must_use]
    pub fn singleton(&self) -> Option<&V> {
        match self {
            SingletonOrOrderedSet::Singleton(value) => Some(value),
            SingletonOrOrderedSet::OrderedSet(_) => None,
        }
    }

    /// Returns the set of duplicates, if this is one.
    #[must_use]
    pub fn ordered_set(&self) -> Option<&AvlTree<V, C>> {
        match self {
            SingletonOrOrderedSet::Singleton(_) => None,
            SingletonOrOrderedSet::OrderedSet(set) => Some(set),
        }
    }

    /// Returns the number of values held.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            SingletonOrOrderedSet::Singleton(_) => 1,
            SingletonOrOrderedSet::OrderedSet(set) => set.len(),
        }
    }

    /// Always `false` for values stored in a map; present for symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the values in ascending order.
    pub fn values(&self) -> Values<'_, V, C> {
        let inner = match self {
            SingletonOrOrderedSet::Singleton(value) => ValuesInner::Singleton(Some(value)),
            SingletonOrOrderedSet::OrderedSet(set) => ValuesInner::OrderedSet(set.iter()),
        };
        Values { inner }
    }

    /// Consumes `self`, returning its only or smallest value.
    fn into_first(self) -> Option<V> {
        match self {
            SingletonOrOrderedSet::Singleton(value) => Some(value),
            SingletonOrOrderedSet::OrderedSet(set) => set.into_iter().next(),
        }
    }

    /// Returns the nested tree of an `OrderedSet`, panicking on a `Singleton`.
    pub(crate) fn as_nested(&self) -> &RawAvlTree<V, (), C> {
        match self {
            SingletonOrOrderedSet::OrderedSet(set) => &set.raw,
            SingletonOrOrderedSet::Singleton(_) => panic!("expected ordered set"),
        }
    }
}

impl<V: Clone, C: Clone> Clone for SingletonOrOrderedSet<V, C> {
    fn clone(&self) -> Self {
        match self {
            SingletonOrOrderedSet::Singleton(value) => SingletonOrOrderedSet::Singleton(value.clone()),
            SingletonOrOrderedSet::OrderedSet(set) => SingletonOrOrderedSet::OrderedSet(set.clone()),
        }
    }
}

impl<V: fmt::Debug, C> fmt::Debug for SingletonOrOrderedSet<V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SingletonOrOrderedSet::Singleton(value) => f.debug_tuple("Singleton").field(value).finish(),
            SingletonOrOrderedSet::OrderedSet(set) => f.debug_tuple("OrderedSet").field(set).finish(),
        }
    }
}

impl<V: PartialEq, C> PartialEq for SingletonOrOrderedSet<V, C> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SingletonOrOrderedSet::Singleton(a), SingletonOrOrderedSet::Singleton(b)) => a == b,
            (SingletonOrOrderedSet::OrderedSet(a), SingletonOrOrderedSet::OrderedSet(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a, V, C> Iterator for Values<'a, V, C> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        match &mut self.inner {
            ValuesInner::Singleton(value) => value.take(),
            ValuesInner::OrderedSet(iter) => iter.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            ValuesInner::Singleton(value) => {
                let len = usize::from(value.is_some());
                (len, Some(len))
            }
            ValuesInner::OrderedSet(iter) => iter.size_hint(),
        }
    }
}

impl<V, C> ExactSizeIterator for Values<'_, V, C> {}

impl<V, C> FusedIterator for Values<'_, V, C> {}

/// An ordered map based on an AVL tree whose keys may carry several values.
///
/// When duplicates are allowed, each key holds a [`SingletonOrOrderedSet`]: a lone value
/// is stored as is, and a second distinct value turns it into an ordered set (itself an
/// [`AvlTree`] ordered by the value comparator). Each key is still a single tree node,
/// so [`len`](AvlTreeMap::len) counts keys, not values. When duplicates are not allowed,
/// inserting under an existing key replaces its value.
///
/// # Examples
///
/// ```
/// use avl_core::AvlTreeMap;
///
/// let mut map = AvlTreeMap::new(true);
/// map.insert("k", "a");
/// map.insert("k", "b");
/// assert_eq!(map.len(), 1);
/// assert_eq!(map.find_value(&"k", &"a"), Some(&"a"));
/// assert_eq!(map.find_value(&"k", &"b"), Some(&"b"));
///
/// assert_eq!(map.remove(&"k", &"a"), Some("a"));
/// assert!(map.find(&"k").unwrap().is_singleton());
/// assert_eq!(map.remove(&"k", &"b"), Some("b"));
/// assert!(map.is_empty());
/// ```
pub struct AvlTreeMap<K, V, KC = NaturalOrder, VC = NaturalOrder> {
    raw: RawAvlTree<K, SingletonOrOrderedSet<V, VC>, KC>,
    value_comparator: VC,
    allow_duplicates: bool,
}

/// An iterator over the entries of an `AvlTreeMap`, in ascending key order.
///
/// This `struct` is created by the [`iter`] method on [`AvlTreeMap`].
///
/// [`iter`]: AvlTreeMap::iter
pub struct Iter<'a, K, V, KC = NaturalOrder, VC = NaturalOrder> {
    tree: &'a RawAvlTree<K, SingletonOrOrderedSet<V, VC>, KC>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

impl<K: Ord, V: Ord> AvlTreeMap<K, V> {
    /// Makes a new, empty map ordered by the key and value types' [`Ord`] implementations.
    #[must_use]
    pub const fn new(allow_duplicates: bool) -> Self {
        Self::with_comparators(NaturalOrder, NaturalOrder, allow_duplicates)
    }
}

impl<K, V, KC, VC> AvlTreeMap<K, V, KC, VC> {
    /// Makes a new, empty map with explicit key and value comparators.
    ///
    /// The value comparator orders the duplicates held under one key; it is only
    /// consulted when `allow_duplicates` is set, or to match values on removal.
    #[must_use]
    pub const fn with_comparators(key_comparator: KC, value_comparator: VC, allow_duplicates: bool) -> Self {
        AvlTreeMap {
            raw: RawAvlTree::new(key_comparator),
            value_comparator,
            allow_duplicates,
        }
    }

    /// Returns the number of keys. Duplicates under one key count once.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map holds no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns `true` if a key may hold several values.
    #[must_use]
    pub const fn is_duplicates_allowed(&self) -> bool {
        self.allow_duplicates
    }

    /// Returns the comparator ordering the keys.
    #[must_use]
    pub fn key_comparator(&self) -> &KC {
        self.raw.comparator()
    }

    /// Returns the comparator ordering the values under one key.
    #[must_use]
    pub fn value_comparator(&self) -> &VC {
        &self.value_comparator
    }

    /// Returns the entry with the smallest key. O(1).
    #[must_use]
    pub fn first(&self) -> Option<(&K, &SingletonOrOrderedSet<V, VC>)> {
        self.raw.first().map(|handle| self.entry(handle))
    }

    /// Returns the entry with the largest key. O(1).
    #[must_use]
    pub fn last(&self) -> Option<(&K, &SingletonOrOrderedSet<V, VC>)> {
        self.raw.last().map(|handle| self.entry(handle))
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Gets an iterator over the entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V, KC, VC> {
        Iter {
            tree: &self.raw,
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.raw.len(),
        }
    }

    /// Collects references to all keys in ascending order. O(n).
    #[must_use]
    pub fn keys(&self) -> Vec<&K> {
        self.iter().map(|(key, _)| key).collect()
    }

    /// Creates a cursor over the entries, one step per key.
    #[must_use]
    pub fn cursor(&self) -> AvlTreeMapCursor<'_, K, V, KC, VC> {
        AvlTreeMapCursor::new(&self.raw)
    }

    /// Creates a cursor over `(key, value)` pairs that steps through every duplicate.
    #[must_use]
    pub fn flat_cursor(&self) -> AvlTreeMapFlatCursor<'_, K, V, KC, VC> {
        AvlTreeMapFlatCursor::new(self)
    }

    fn entry(&self, handle: Handle) -> (&K, &SingletonOrOrderedSet<V, VC>) {
        let node = self.raw.node(handle);
        (node.key(), node.value())
    }
}

impl<K, V, KC: Comparator<K>, VC: Comparator<V> + Clone> AvlTreeMap<K, V, KC, VC> {
    /// Associates `value` with `key`.
    ///
    /// Returns `None` when the value was stored. Otherwise returns the value that is not
    /// in the map: the replaced previous value when duplicates are not allowed, or the
    /// rejected `value` itself when an equal value is already held under `key`.
    ///
    /// # Complexity
    ///
    /// O(log n + log d), where d is the number of values under `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_core::AvlTreeMap;
    ///
    /// let mut unique = AvlTreeMap::new(false);
    /// assert_eq!(unique.insert(1, "a"), None);
    /// assert_eq!(unique.insert(1, "b"), Some("a"));
    ///
    /// let mut dups = AvlTreeMap::new(true);
    /// assert_eq!(dups.insert(1, "a"), None);
    /// assert_eq!(dups.insert(1, "b"), None);
    /// assert_eq!(dups.insert(1, "a"), Some("a"));
    /// assert_eq!(dups.find(&1).unwrap().len(), 2);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.raw.insert(key, SingletonOrOrderedSet::Singleton(value)) {
            InsertResult::Inserted(_) => None,
            InsertResult::Occupied { handle, value, .. } => self.insert_under(handle, value.into_first()?),
        }
    }

    fn insert_under(&mut self, handle: Handle, value: V) -> Option<V> {
        let value_comparator = &self.value_comparator;
        let slot = self.raw.node_mut(handle).value_mut();

        if !self.allow_duplicates {
            return mem::replace(slot, SingletonOrOrderedSet::Singleton(value)).into_first();
        }

        if let SingletonOrOrderedSet::OrderedSet(set) = &mut *slot {
            if set.contains(&value) {
                return Some(value);
            }
            set.insert(value);
            return None;
        }

        if slot.singleton().is_some_and(|existing| value_comparator.compare(existing, &value) == Ordering::Equal) {
            return Some(value);
        }

        let empty = SingletonOrOrderedSet::OrderedSet(AvlTree::with_comparator(value_comparator.clone()));
        let previous = mem::replace(slot, empty);
        if let SingletonOrOrderedSet::OrderedSet(set) = slot {
            set.extend(previous.into_first());
            set.insert(value);
        }
        log::trace!("key at slot {} now holds an ordered set", handle.slot());
        None
    }

    /// Removes `value` from under `key`, returning it.
    ///
    /// When the last value under `key` goes, the key is removed from the map. When a
    /// set of duplicates shrinks to one value, that value becomes a singleton again.
    /// Returns `None`, changing nothing, when `key` does not hold `value`.
    ///
    /// # Complexity
    ///
    /// O(log n + log d)
    pub fn remove(&mut self, key: &K, value: &V) -> Option<V> {
        let handle = self.raw.search(key)?;
        let value_comparator = &self.value_comparator;
        let slot = self.raw.node_mut(handle).value_mut();

        if let SingletonOrOrderedSet::OrderedSet(set) = &mut *slot {
            let removed = set.remove(value)?;
            match set.len() {
                0 => {
                    self.raw.remove_handle(handle);
                }
                1 => {
                    let empty = AvlTree::with_comparator(value_comparator.clone());
                    if let Some(only) = mem::replace(set, empty).into_iter().next() {
                        *slot = SingletonOrOrderedSet::Singleton(only);
                        log::trace!("key at slot {} reverted to a singleton", handle.slot());
                    }
                }
                _ => {}
            }
            return Some(removed);
        }

        if !slot.singleton().is_some_and(|existing| value_comparator.compare(existing, value) == Ordering::Equal) {
            return None;
        }
        let (_, removed) = self.raw.remove_handle(handle);
        removed.into_first()
    }

    /// Removes `key` together with every value it holds.
    pub fn remove_key(&mut self, key: &K) -> Option<SingletonOrOrderedSet<V, VC>> {
        self.raw.remove(key).map(|(_, values)| values)
    }

    /// Returns the values held under `key`.
    #[must_use]
    pub fn find(&self, key: &K) -> Option<&SingletonOrOrderedSet<V, VC>> {
        self.raw.search(key).map(|handle| self.raw.value(handle))
    }

    /// Returns the stored value equal to `value` under `key`.
    #[must_use]
    pub fn find_value(&self, key: &K, value: &V) -> Option<&V> {
        match self.find(key)? {
            SingletonOrOrderedSet::Singleton(existing) => {
                (self.value_comparator.compare(existing, value) == Ordering::Equal).then_some(existing)
            }
            SingletonOrOrderedSet::OrderedSet(set) => set.find(value),
        }
    }

    /// Returns `true` if `key` holds `value`.
    #[must_use]
    pub fn contains_value(&self, key: &K, value: &V) -> bool {
        self.find_value(key, value).is_some()
    }

    /// Returns the entry with the least key strictly greater than `key`.
    #[must_use]
    pub fn find_greater(&self, key: &K) -> Option<(&K, &SingletonOrOrderedSet<V, VC>)> {
        self.raw.find_greater(key).map(|handle| self.entry(handle))
    }

    /// Returns the entry with the least key greater than or equal to `key`.
    #[must_use]
    pub fn find_greater_or_equal(&self, key: &K) -> Option<(&K, &SingletonOrOrderedSet<V, VC>)> {
        self.raw.find_greater_or_equal(key).map(|handle| self.entry(handle))
    }

    /// Returns the entry with the greatest key strictly less than `key`.
    #[must_use]
    pub fn find_less(&self, key: &K) -> Option<(&K, &SingletonOrOrderedSet<V, VC>)> {
        self.raw.find_less(key).map(|handle| self.entry(handle))
    }

    /// Returns the entry with the greatest key less than or equal to `key`.
    #[must_use]
    pub fn find_less_or_equal(&self, key: &K) -> Option<(&K, &SingletonOrOrderedSet<V, VC>)> {
        self.raw.find_less_or_equal(key).map(|handle| self.entry(handle))
    }

    /// Checks the invariants of the key tree and of every nested set, and that no set
    /// holds fewer than two values.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        self.raw.validate()?;
        for (position, (_, values)) in self.iter().enumerate() {
            if let SingletonOrOrderedSet::OrderedSet(set) = values {
                set.validate()?;
                if set.len() < 2 {
                    return Err(InvariantViolation::UndersizedSet { position });
                }
            }
        }
        Ok(())
    }
}

impl<K: Clone, V: Clone, KC: Clone, VC: Clone> Clone for AvlTreeMap<K, V, KC, VC> {
    fn clone(&self) -> Self {
        AvlTreeMap {
            raw: self.raw.clone(),
            value_comparator: self.value_comparator.clone(),
            allow_duplicates: self.allow_duplicates,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, KC, VC> fmt::Debug for AvlTreeMap<K, V, KC, VC> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, KC, VC> IntoIterator for &'a AvlTreeMap<K, V, KC, VC> {
    type Item = (&'a K, &'a SingletonOrOrderedSet<V, VC>);
    type IntoIter = Iter<'a, K, V, KC, VC>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, KC, VC> Iterator for Iter<'a, K, V, KC, VC> {
    type Item = (&'a K, &'a SingletonOrOrderedSet<V, VC>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front?;
        self.remaining -= 1;
        let node = self.tree.node(handle);
        self.front = node.next();
        Some((node.key(), node.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, KC, VC> DoubleEndedIterator for Iter<'_, K, V, KC, VC> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back?;
        self.remaining -= 1;
        let node = self.tree.node(handle);
        self.back = node.prev();
        Some((node.key(), node.value()))
    }
}

impl<K, V, KC, VC> ExactSizeIterator for Iter<'_, K, V, KC, VC> {}

impl<K, V, KC, VC> FusedIterator for Iter<'_, K, V, KC, VC> {}

impl<K, V, KC, VC> fmt::Debug for Iter<'_, K, V, KC, VC> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish()
    }
}
