use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;

use crate::comparator::{Comparator, NaturalOrder};
use crate::error::InvariantViolation;
use crate::raw::{Handle, InsertResult, RawAvlTree};

mod cursor;

pub use cursor::AvlTreeCursor;

/// An ordered set based on an [AVL tree], with every node threaded into a doubly
/// linked list in ascending key order.
///
/// Keys are ordered by an injected [`Comparator`]; [`AvlTree::new`] uses the key's
/// [`Ord`] implementation and [`AvlTree::with_comparator`] takes any total order.
/// Point lookups, insertion and removal are O(log n). The first and last keys are
/// available in O(1), and stepping from a key to its neighbor through a cursor or an
/// iterator is O(1) as well, since it follows the linked list rather than the tree.
///
/// Each key is stored at most once. Inserting a key that is already present leaves
/// the tree untouched and returns the stored key, which lets callers reuse one
/// canonical instance per key.
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
///
/// # Examples
///
/// ```
/// use avl_core::AvlTree;
///
/// let mut tree = AvlTree::new();
/// tree.insert(20);
/// tree.insert(10);
/// tree.insert(30);
///
/// assert_eq!(tree.find_greater(&20), Some(&30));
/// assert_eq!(tree.find_less_or_equal(&25), Some(&20));
/// assert_eq!(tree.first(), Some(&10));
///
/// assert_eq!(tree.remove(&10), Some(10));
/// assert_eq!(tree.keys(), [&20, &30]);
/// ```
pub struct AvlTree<K, C = NaturalOrder> {
    pub(crate) raw: RawAvlTree<K, (), C>,
}

/// An iterator over the keys of an `AvlTree`, in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`AvlTree`].
///
/// [`iter`]: AvlTree::iter
pub struct Iter<'a, K, C = NaturalOrder> {
    tree: &'a RawAvlTree<K, (), C>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

/// An owning iterator over the keys of an `AvlTree`, in ascending order.
///
/// This `struct` is created by the `into_iter` method on [`AvlTree`]
/// (provided by the [`IntoIterator`] trait).
pub struct IntoIter<K> {
    inner: alloc::vec::IntoIter<(K, ())>,
}

/// Renders the shape of an `AvlTree`, one node per line.
///
/// This `struct` is created by the [`structure`] method on [`AvlTree`].
///
/// [`structure`]: AvlTree::structure
pub struct Structure<'a, K, C = NaturalOrder> {
    tree: &'a RawAvlTree<K, (), C>,
}

impl<K: Ord> AvlTree<K> {
    /// Makes a new, empty `AvlTree` ordered by `K`'s [`Ord`] implementation.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_core::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert(1);
    /// assert_eq!(tree.len(), 1);
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }

    /// Makes a new, empty `AvlTree` with room for at least `capacity` keys.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        AvlTree {
            raw: RawAvlTree::with_capacity(capacity, NaturalOrder),
        }
    }
}

impl<K, C> AvlTree<K, C> {
    /// Makes a new, empty `AvlTree` ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_core::AvlTree;
    ///
    /// let mut tree = AvlTree::with_comparator(|a: &&str, b: &&str| a.len().cmp(&b.len()));
    /// tree.insert("ccc");
    /// tree.insert("a");
    /// // "b" is equal to "a" under this order, so the stored key is returned.
    /// assert_eq!(tree.insert("b"), Some(&"a"));
    /// assert_eq!(tree.keys(), [&"a", &"ccc"]);
    /// ```
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        AvlTree {
            raw: RawAvlTree::new(comparator),
        }
    }

    /// Returns the number of keys in the tree.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of keys the tree can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the comparator ordering this tree.
    #[must_use]
    pub fn comparator(&self) -> &C {
        self.raw.comparator()
    }

    /// Returns the height of the tree: zero when empty, one for a single key.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns the smallest key.
    ///
    /// # Complexity
    ///
    /// O(1), through the head of the linked list.
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.raw.first().map(|handle| self.raw.key(handle))
    }

    /// Returns the largest key.
    ///
    /// # Complexity
    ///
    /// O(1), through the tail of the linked list.
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        self.raw.last().map(|handle| self.raw.key(handle))
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Gets an iterator over the keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_core::AvlTree;
    ///
    /// let tree: AvlTree<i32> = [3, 1, 2].into_iter().collect();
    /// assert!(tree.iter().eq([1, 2, 3].iter()));
    /// assert!(tree.iter().rev().eq([3, 2, 1].iter()));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, C> {
        Iter {
            tree: &self.raw,
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.raw.len(),
        }
    }

    /// Collects references to all keys in ascending order.
    ///
    /// # Complexity
    ///
    /// O(n), walking the linked list.
    #[must_use]
    pub fn keys(&self) -> Vec<&K> {
        self.iter().collect()
    }

    /// Creates a cursor positioned before the first key.
    ///
    /// The cursor borrows the tree, so the tree cannot change while the cursor lives.
    #[must_use]
    pub fn cursor(&self) -> AvlTreeCursor<'_, K, C> {
        AvlTreeCursor::new(&self.raw)
    }

    /// Returns a [`Display`](fmt::Display) adapter rendering the tree's shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_core::AvlTree;
    ///
    /// let tree: AvlTree<i32> = [2, 1, 3].into_iter().collect();
    /// assert_eq!(tree.structure().to_string(), "2\n├─ 1\n└─ 3");
    /// ```
    #[must_use]
    pub fn structure(&self) -> Structure<'_, K, C> {
        Structure { tree: &self.raw }
    }
}

impl<K, C: Comparator<K>> AvlTree<K, C> {
    /// Adds `key` to the tree.
    ///
    /// Returns `None` if the key was added. If an equal key is already present the tree
    /// is unchanged, `key` is dropped, and the stored key is returned.
    ///
    /// # Complexity
    ///
    /// O(log n), with at most two rotations.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_core::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// assert_eq!(tree.insert(7), None);
    /// assert_eq!(tree.insert(7), Some(&7));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K) -> Option<&K> {
        match self.raw.insert(key, ()) {
            InsertResult::Inserted(_) => None,
            InsertResult::Occupied { handle, .. } => Some(self.raw.key(handle)),
        }
    }

    /// Removes the key equal to `key`, returning it. Returns `None`, leaving the tree
    /// untouched, if no such key is present.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove(&mut self, key: &K) -> Option<K> {
        self.raw.remove(key).map(|(key, ())| key)
    }

    /// Returns the stored key equal to `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn find(&self, key: &K) -> Option<&K> {
        self.raw.search(key).map(|handle| self.raw.key(handle))
    }

    /// Returns `true` if a key equal to `key` is present.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.raw.search(key).is_some()
    }

    /// Returns the least key strictly greater than `key`, which need not be present.
    ///
    /// # Complexity
    ///
    /// O(log n): one descent plus at most one linked-list step.
    #[must_use]
    pub fn find_greater(&self, key: &K) -> Option<&K> {
        self.raw.find_greater(key).map(|handle| self.raw.key(handle))
    }

    /// Returns the least key greater than or equal to `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn find_greater_or_equal(&self, key: &K) -> Option<&K> {
        self.raw.find_greater_or_equal(key).map(|handle| self.raw.key(handle))
    }

    /// Returns the greatest key strictly less than `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn find_less(&self, key: &K) -> Option<&K> {
        self.raw.find_less(key).map(|handle| self.raw.key(handle))
    }

    /// Returns the greatest key less than or equal to `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn find_less_or_equal(&self, key: &K) -> Option<&K> {
        self.raw.find_less_or_equal(key).map(|handle| self.raw.key(handle))
    }

    /// Checks the tree's structural invariants: strictly ascending in-order keys, AVL
    /// balance at every node, cached heights, a linked list matching the in-order
    /// sequence, and the cached length.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        self.raw.validate()
    }
}

impl<K: Clone, C: Clone> Clone for AvlTree<K, C> {
    fn clone(&self) -> Self {
        AvlTree { raw: self.raw.clone() }
    }
}

impl<K: fmt::Debug, C> fmt::Debug for AvlTree<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: Ord> Default for AvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PartialEq, C> PartialEq for AvlTree<K, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, C> Eq for AvlTree<K, C> {}

impl<K: Ord> FromIterator<K> for AvlTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = AvlTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K, C: Comparator<K>> Extend<K> for AvlTree<K, C> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord, const N: usize> From<[K; N]> for AvlTree<K> {
    fn from(keys: [K; N]) -> Self {
        keys.into_iter().collect()
    }
}

impl<'a, K, C> IntoIterator for &'a AvlTree<K, C> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K, C>;

    fn into_iter(self) -> Iter<'a, K, C> {
        self.iter()
    }
}

impl<K, C> IntoIterator for AvlTree<K, C> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    fn into_iter(mut self) -> IntoIter<K> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<'a, K, C> Iterator for Iter<'a, K, C> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front?;
        self.remaining -= 1;
        self.front = self.tree.next(handle);
        Some(self.tree.key(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, C> DoubleEndedIterator for Iter<'a, K, C> {
    fn next_back(&mut self) -> Option<&'a K> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back?;
        self.remaining -= 1;
        self.back = self.tree.prev(handle);
        Some(self.tree.key(handle))
    }
}

impl<K, C> ExactSizeIterator for Iter<'_, K, C> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, C> FusedIterator for Iter<'_, K, C> {}

impl<K, C> Clone for Iter<'_, K, C> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, C> fmt::Debug for Iter<'_, K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K> Iterator for IntoIter<K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.inner.next().map(|(key, ())| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> DoubleEndedIterator for IntoIter<K> {
    fn next_back(&mut self) -> Option<K> {
        self.inner.next_back().map(|(key, ())| key)
    }
}

impl<K> ExactSizeIterator for IntoIter<K> {}

impl<K> FusedIterator for IntoIter<K> {}

impl<K: fmt::Debug> fmt::Debug for IntoIter<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter").field("remaining", &self.inner.len()).finish()
    }
}

impl<K: fmt::Display, C> Structure<'_, K, C> {
    fn write_children(&self, f: &mut fmt::Formatter<'_>, handle: Handle, prefix: &str) -> fmt::Result {
        let node = self.tree.node(handle);
        if node.is_leaf() {
            return Ok(());
        }
        for (child, is_last) in [(node.left(), false), (node.right(), true)] {
            let branch = if is_last { "└─" } else { "├─" };
            match child {
                None => write!(f, "\n{prefix}{branch} ∅")?,
                Some(child) => {
                    write!(f, "\n{prefix}{branch} {}", self.tree.key(child))?;
                    let mut child_prefix = String::from(prefix);
                    child_prefix.push_str(if is_last { "   " } else { "│  " });
                    self.write_children(f, child, &child_prefix)?;
                }
            }
        }
        Ok(())
    }
}

impl<K: fmt::Display, C> fmt::Display for Structure<'_, K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tree.root() {
            None => f.write_str("∅"),
            Some(root) => {
                write!(f, "{}", self.tree.key(root))?;
                self.write_children(f, root, "")
            }
        }
    }
}
