use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::slice;

use crate::comparator::{Comparator, NaturalOrder};

mod cursor;

pub use cursor::ArrayTreeCursor;

/// An ordered set kept in a sorted array, searched by binary search.
///
/// `ArrayTree` answers the same point and boundary queries as [`AvlTree`](crate::AvlTree)
/// without any per-node overhead, which suits small and medium sets that are read far
/// more often than they change. Keys are also addressable by their position in the
/// order, see [`get`](ArrayTree::get) and [`get_position`](ArrayTree::get_position).
///
/// Storage grows and shrinks in blocks of [`INCREMENT`](ArrayTree::INCREMENT) slots.
///
/// # Insertion cost
///
/// [`insert`](ArrayTree::insert) appends the new key and then re-sorts the whole array,
/// so a single insertion costs O(n log n) rather than the O(n) of shifting the tail.
/// This keeps insertion independent of the search code and is intentional; build large
/// sets with [`FromIterator`], which sorts once.
///
/// # Examples
///
/// ```
/// use avl_core::ArrayTree;
///
/// let mut tree = ArrayTree::new();
/// tree.insert(30);
/// tree.insert(10);
/// tree.insert(20);
///
/// assert_eq!(tree.get_position(&20), Some(1));
/// assert_eq!(tree.get_after_position(&20), Some(2));
/// assert_eq!(tree.get_before_position(&10), None);
/// assert_eq!(tree.find_greater_or_equal(&15), Some(&20));
/// assert_eq!(tree.get(0), Some(&10));
/// ```
pub struct ArrayTree<K, C = NaturalOrder> {
    keys: Vec<K>,
    comparator: C,
}

impl<K: Ord> ArrayTree<K> {
    /// Makes a new, empty `ArrayTree` ordered by `K`'s [`Ord`] implementation.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<K, C> ArrayTree<K, C> {
    /// Number of slots added or released each time the storage is resized.
    pub const INCREMENT: usize = 16;

    /// Makes a new, empty `ArrayTree` ordered by `comparator`.
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        ArrayTree {
            keys: Vec::new(),
            comparator,
        }
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if the tree holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the number of slots currently allocated.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.keys.capacity()
    }

    /// Returns the comparator ordering this tree.
    #[must_use]
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns the key at `position` in ascending order.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&K> {
        self.keys.get(position)
    }

    /// Returns the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.keys.first()
    }

    /// Returns the largest key.
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        self.keys.last()
    }

    /// Returns the keys as a sorted slice.
    #[must_use]
    pub fn as_slice(&self) -> &[K] {
        &self.keys
    }

    /// Gets an iterator over the keys in ascending order.
    pub fn iter(&self) -> slice::Iter<'_, K> {
        self.keys.iter()
    }

    /// Collects references to all keys in ascending order.
    #[must_use]
    pub fn keys(&self) -> Vec<&K> {
        self.keys.iter().collect()
    }

    /// Creates a cursor positioned before the first key.
    #[must_use]
    pub fn cursor(&self) -> ArrayTreeCursor<'_, K, C> {
        ArrayTreeCursor::new(self)
    }

    /// Removes every key and releases the storage.
    pub fn clear(&mut self) {
        self.keys = Vec::new();
    }

    fn grow(&mut self) {
        if self.keys.len() == self.keys.capacity() {
            self.keys.reserve_exact(Self::INCREMENT);
            log::trace!("array tree grew to {} slots", self.keys.capacity());
        }
    }

    fn shrink(&mut self) {
        let capacity = self.keys.capacity();
        if capacity - self.keys.len() > Self::INCREMENT {
            self.keys.shrink_to(capacity - Self::INCREMENT);
            log::trace!("array tree shrank to {} slots", self.keys.capacity());
        }
    }
}

impl<K, C: Comparator<K>> ArrayTree<K, C> {
    /// Adds `key` to the tree.
    ///
    /// If an equal key is already present, nothing changes and the stored key is
    /// returned. Otherwise the key is appended and the array re-sorted.
    ///
    /// # Complexity
    ///
    /// O(n log n)
    pub fn insert(&mut self, key: K) -> Option<&K> {
        if let Some(position) = self.get_position(&key) {
            return Some(&self.keys[position]);
        }
        self.grow();
        self.keys.push(key);
        let comparator = &self.comparator;
        self.keys.sort_by(|a, b| comparator.compare(a, b));
        None
    }

    /// Removes and returns the key equal to `key`.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn remove(&mut self, key: &K) -> Option<K> {
        let position = self.get_position(key)?;
        let removed = self.keys.remove(position);
        self.shrink();
        Some(removed)
    }

    /// Returns the stored key equal to `key`.
    #[must_use]
    pub fn find(&self, key: &K) -> Option<&K> {
        self.get_position(key).map(|position| &self.keys[position])
    }

    /// Returns `true` if the tree holds a key equal to `key`.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.get_position(key).is_some()
    }

    /// Returns the least key strictly greater than `key`.
    #[must_use]
    pub fn find_greater(&self, key: &K) -> Option<&K> {
        self.get_after_position(key).map(|position| &self.keys[position])
    }

    /// Returns the least key greater than or equal to `key`.
    #[must_use]
    pub fn find_greater_or_equal(&self, key: &K) -> Option<&K> {
        self.first_where(key, |order| order != Ordering::Less)
            .map(|position| &self.keys[position])
    }

    /// Returns the greatest key strictly less than `key`.
    #[must_use]
    pub fn find_less(&self, key: &K) -> Option<&K> {
        self.get_before_position(key).map(|position| &self.keys[position])
    }

    /// Returns the greatest key less than or equal to `key`.
    #[must_use]
    pub fn find_less_or_equal(&self, key: &K) -> Option<&K> {
        self.last_where(key, |order| order != Ordering::Greater)
            .map(|position| &self.keys[position])
    }

    /// Returns the position of the key equal to `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn get_position(&self, key: &K) -> Option<usize> {
        self.first_where(key, |order| order != Ordering::Less)
            .filter(|&position| self.comparator.compare(&self.keys[position], key) == Ordering::Equal)
    }

    /// Returns the position of the least key strictly greater than `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn get_after_position(&self, key: &K) -> Option<usize> {
        self.first_where(key, |order| order == Ordering::Greater)
    }

    /// Returns the position of the greatest key strictly less than `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn get_before_position(&self, key: &K) -> Option<usize> {
        self.last_where(key, |order| order == Ordering::Less)
    }

    /// Lowest position whose key, compared to `key`, satisfies `accept`.
    ///
    /// `accept` must be false on a prefix of the array and true on the rest.
    fn first_where(&self, key: &K, accept: impl Fn(Ordering) -> bool) -> Option<usize> {
        let holds = |position: usize| accept(self.comparator.compare(&self.keys[position], key));
        match self.keys.len() {
            0 => None,
            1 => holds(0).then_some(0),
            2 => {
                if holds(0) {
                    Some(0)
                } else {
                    holds(1).then_some(1)
                }
            }
            len => {
                let (mut start, mut end) = (0, len - 1);
                while end - start > 1 {
                    let middle = start + (end - start) / 2;
                    if holds(middle) {
                        end = middle;
                    } else {
                        start = middle;
                    }
                }
                if holds(start) {
                    Some(start)
                } else {
                    holds(end).then_some(end)
                }
            }
        }
    }

    /// Highest position whose key, compared to `key`, satisfies `accept`.
    ///
    /// `accept` must be true on a prefix of the array and false on the rest.
    fn last_where(&self, key: &K, accept: impl Fn(Ordering) -> bool) -> Option<usize> {
        let holds = |position: usize| accept(self.comparator.compare(&self.keys[position], key));
        match self.keys.len() {
            0 => None,
            1 => holds(0).then_some(0),
            2 => {
                if holds(1) {
                    Some(1)
                } else {
                    holds(0).then_some(0)
                }
            }
            len => {
                let (mut start, mut end) = (0, len - 1);
                while end - start > 1 {
                    let middle = start + (end - start) / 2;
                    if holds(middle) {
                        start = middle;
                    } else {
                        end = middle;
                    }
                }
                if holds(end) {
                    Some(end)
                } else {
                    holds(start).then_some(start)
                }
            }
        }
    }
}

impl<K: Clone, C: Clone> Clone for ArrayTree<K, C> {
    fn clone(&self) -> Self {
        ArrayTree {
            keys: self.keys.clone(),
            comparator: self.comparator.clone(),
        }
    }
}

impl<K: fmt::Debug, C> fmt::Debug for ArrayTree<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys.iter()).finish()
    }
}

impl<K: Ord> Default for ArrayTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PartialEq, C> PartialEq for ArrayTree<K, C> {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys
    }
}

impl<K: Eq, C> Eq for ArrayTree<K, C> {}

impl<K: Ord> FromIterator<K> for ArrayTree<K> {
    /// Collects the keys, sorting once and keeping the first of any equal keys.
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut keys: Vec<K> = iter.into_iter().collect();
        keys.sort();
        keys.dedup();
        ArrayTree {
            keys,
            comparator: NaturalOrder,
        }
    }
}

impl<K, C: Comparator<K>> Extend<K> for ArrayTree<K, C> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K, C> IntoIterator for &'a ArrayTree<K, C> {
    type Item = &'a K;
    type IntoIter = slice::Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

impl<K, C> IntoIterator for ArrayTree<K, C> {
    type Item = K;
    type IntoIter = alloc::vec::IntoIter<K>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}
