use alloc::vec::Vec;
use core::cmp::Ordering;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{EMPTY_HEIGHT, Node};
use crate::comparator::Comparator;
use crate::error::InvariantViolation;

/// The AVL engine shared by `AvlTree` and `AvlTreeMap`.
///
/// Children are owned through `left`/`right`; every node is also threaded into a doubly
/// linked list in ascending key order. Both structures are updated within the same
/// `&mut self` call, so they are never observably out of sync.
#[derive(Clone)]
pub(crate) struct RawAvlTree<K, V, C> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K, V>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Head of the linked list (minimum key).
    first: Option<Handle>,
    /// Tail of the linked list (maximum key).
    last: Option<Handle>,
    /// Number of nodes in the tree.
    len: usize,
    comparator: C,
    /// Rotations performed so far, for checking the per-insert rotation bound.
    #[cfg(test)]
    rotations: usize,
}

/// Result of an insertion attempt.
pub(crate) enum InsertResult<K, V> {
    /// A new node was linked in.
    Inserted(Handle),
    /// An equal key was already present; the rejected key and value are handed back.
    Occupied {
        /// The node holding the equal key.
        handle: Handle,
        key: K,
        value: V,
    },
}

impl<K, V, C> RawAvlTree<K, V, C> {
    /// Creates a new, empty tree.
    pub(crate) const fn new(comparator: C) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            first: None,
            last: None,
            len: 0,
            comparator,
            #[cfg(test)]
            rotations: 0,
        }
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize, comparator: C) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            first: None,
            last: None,
            len: 0,
            comparator,
            #[cfg(test)]
            rotations: 0,
        }
    }

    /// Returns the number of nodes in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree contains no nodes.
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn comparator(&self) -> &C {
        &self.comparator
    }

    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    /// Returns the node holding the minimum key. O(1).
    pub(crate) fn first(&self) -> Option<Handle> {
        self.first
    }

    /// Returns the node holding the maximum key. O(1).
    pub(crate) fn last(&self) -> Option<Handle> {
        self.last
    }

    /// Returns the height of the tree; zero when empty.
    pub(crate) fn height(&self) -> usize {
        usize::from(self.height_of(self.root))
    }

    /// Upper bound (exclusive) of the slots of all live handles.
    pub(crate) fn slot_count(&self) -> usize {
        self.nodes.slot_count()
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.nodes.get_mut(handle)
    }

    #[inline]
    pub(crate) fn key(&self, handle: Handle) -> &K {
        self.nodes.get(handle).key()
    }

    #[inline]
    pub(crate) fn value(&self, handle: Handle) -> &V {
        self.nodes.get(handle).value()
    }

    #[inline]
    pub(crate) fn next(&self, handle: Handle) -> Option<Handle> {
        self.nodes.get(handle).next()
    }

    #[inline]
    pub(crate) fn prev(&self, handle: Handle) -> Option<Handle> {
        self.nodes.get(handle).prev()
    }

    /// Clears all nodes from the tree.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.first = None;
        self.last = None;
        self.len = 0;
    }

    /// Drains all entries by walking the linked list. O(n), no rebalancing.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let mut entries = Vec::with_capacity(self.len);
        let mut current = self.first;
        while let Some(handle) = current {
            let node = self.nodes.take(handle);
            current = node.next();
            entries.push(node.into_entry());
        }
        self.clear();
        entries
    }

    fn height_of(&self, handle: Option<Handle>) -> u8 {
        handle.map_or(EMPTY_HEIGHT, |h| self.nodes.get(h).height())
    }

    fn update_height(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let height = 1 + self.height_of(node.left()).max(self.height_of(node.right()));
        self.nodes.get_mut(handle).set_height(height);
    }

    /// `height(left) - height(right)`.
    fn balance_factor(&self, handle: Handle) -> i16 {
        let node = self.nodes.get(handle);
        i16::from(self.height_of(node.left())) - i16::from(self.height_of(node.right()))
    }

    fn rotate_right(&mut self, handle: Handle) -> Handle {
        let pivot = self.nodes.get(handle).left().expect("`RawAvlTree::rotate_right()` - no left child!");
        let inner = self.nodes.get(pivot).right();
        self.nodes.get_mut(handle).set_left(inner);
        self.nodes.get_mut(pivot).set_right(Some(handle));
        self.update_height(handle);
        self.update_height(pivot);
        #[cfg(test)]
        {
            self.rotations += 1;
        }
        log::trace!("rotated right around slot {}", handle.slot());
        pivot
    }

    fn rotate_left(&mut self, handle: Handle) -> Handle {
        let pivot = self.nodes.get(handle).right().expect("`RawAvlTree::rotate_left()` - no right child!");
        let inner = self.nodes.get(pivot).left();
        self.nodes.get_mut(handle).set_right(inner);
        self.nodes.get_mut(pivot).set_left(Some(handle));
        self.update_height(handle);
        self.update_height(pivot);
        #[cfg(test)]
        {
            self.rotations += 1;
        }
        log::trace!("rotated left around slot {}", handle.slot());
        pivot
    }

    /// Restores the balance of the subtree rooted at `handle`, whose children are
    /// already balanced, and returns the subtree's new root.
    fn rebalance(&mut self, handle: Handle) -> Handle {
        self.update_height(handle);
        let balance = self.balance_factor(handle);

        if balance > 1 {
            let left = self.nodes.get(handle).left().expect("`RawAvlTree::rebalance()` - no left child!");
            if self.balance_factor(left) < 0 {
                let left = self.rotate_left(left);
                self.nodes.get_mut(handle).set_left(Some(left));
            }
            return self.rotate_right(handle);
        }

        if balance < -1 {
            let right = self.nodes.get(handle).right().expect("`RawAvlTree::rebalance()` - no right child!");
            if self.balance_factor(right) > 0 {
                let right = self.rotate_right(right);
                self.nodes.get_mut(handle).set_right(Some(right));
            }
            return self.rotate_left(handle);
        }

        handle
    }

    /// Splices `new` into the list immediately before `anchor`.
    fn link_before(&mut self, anchor: Handle, new: Handle) {
        let prev = self.nodes.get(anchor).prev();
        let node = self.nodes.get_mut(new);
        node.set_prev(prev);
        node.set_next(Some(anchor));
        match prev {
            Some(prev) => self.nodes.get_mut(prev).set_next(Some(new)),
            None => self.first = Some(new),
        }
        self.nodes.get_mut(anchor).set_prev(Some(new));
    }

    /// Splices `new` into the list immediately after `anchor`.
    fn link_after(&mut self, anchor: Handle, new: Handle) {
        let next = self.nodes.get(anchor).next();
        let node = self.nodes.get_mut(new);
        node.set_prev(Some(anchor));
        node.set_next(next);
        match next {
            Some(next) => self.nodes.get_mut(next).set_prev(Some(new)),
            None => self.last = Some(new),
        }
        self.nodes.get_mut(anchor).set_next(Some(new));
    }

    /// Removes `handle` from the list and clears its links. O(1).
    fn unlink(&mut self, handle: Handle) {
        let node = self.nodes.get_mut(handle);
        let (prev, next) = (node.prev(), node.next());
        node.set_prev(None);
        node.set_next(None);
        match prev {
            Some(prev) => self.nodes.get_mut(prev).set_next(next),
            None => self.first = next,
        }
        match next {
            Some(next) => self.nodes.get_mut(next).set_prev(prev),
            None => self.last = prev,
        }
    }

    /// Detaches the minimum of the subtree at `handle`.
    /// Returns the rebalanced remainder and the detached node.
    fn detach_min(&mut self, handle: Handle) -> (Option<Handle>, Handle) {
        match self.nodes.get(handle).left() {
            None => (self.nodes.get(handle).right(), handle),
            Some(left) => {
                let (left, min) = self.detach_min(left);
                self.nodes.get_mut(handle).set_left(left);
                (Some(self.rebalance(handle)), min)
            }
        }
    }

    // ─── Construction primitives used by the deserializer ───────────────────

    /// Allocates a node that is not yet reachable from the root.
    pub(crate) fn alloc_detached(&mut self, key: K, value: V) -> Handle {
        self.nodes.alloc(Node::new(key, value))
    }

    /// Attaches children to `handle` and recomputes its height from theirs.
    pub(crate) fn set_children(&mut self, handle: Handle, left: Option<Handle>, right: Option<Handle>) {
        let node = self.nodes.get_mut(handle);
        node.set_left(left);
        node.set_right(right);
        self.update_height(handle);
    }

    pub(crate) fn set_root(&mut self, root: Option<Handle>) {
        self.root = root;
    }

    /// Threads `order` into the linked list, sets first/last, and sets the length.
    pub(crate) fn link_in_order(&mut self, order: &[Handle]) {
        for (position, &handle) in order.iter().enumerate() {
            let prev = position.checked_sub(1).map(|p| order[p]);
            let next = order.get(position + 1).copied();
            let node = self.nodes.get_mut(handle);
            node.set_prev(prev);
            node.set_next(next);
        }
        self.first = order.first().copied();
        self.last = order.last().copied();
        self.len = order.len();
    }
}

impl<K, V, C: Comparator<K>> RawAvlTree<K, V, C> {
    /// Exact-match search. O(log n).
    pub(crate) fn search(&self, key: &K) -> Option<Handle> {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match self.comparator.compare(key, node.key()) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => current = node.right(),
                Ordering::Equal => return Some(handle),
            }
        }
        None
    }

    /// Descends once towards `key` and returns the last node visited together with
    /// how `key` compares to that node's key.
    ///
    /// The landing node is either `key`'s node, or its in-order predecessor or successor,
    /// so every boundary query is at most one list step away from it.
    fn landing(&self, key: &K) -> Option<(Handle, Ordering)> {
        let mut current = self.root?;
        loop {
            let node = self.nodes.get(current);
            let ordering = self.comparator.compare(key, node.key());
            let child = match ordering {
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
                Ordering::Equal => None,
            };
            match child {
                Some(child) => current = child,
                None => return Some((current, ordering)),
            }
        }
    }

    /// Least node strictly greater than `key`.
    pub(crate) fn find_greater(&self, key: &K) -> Option<Handle> {
        let (handle, ordering) = self.landing(key)?;
        match ordering {
            Ordering::Less => Some(handle),
            Ordering::Equal | Ordering::Greater => self.next(handle),
        }
    }

    /// Least node greater than or equal to `key`.
    pub(crate) fn find_greater_or_equal(&self, key: &K) -> Option<Handle> {
        let (handle, ordering) = self.landing(key)?;
        match ordering {
            Ordering::Less | Ordering::Equal => Some(handle),
            Ordering::Greater => self.next(handle),
        }
    }

    /// Greatest node strictly less than `key`.
    pub(crate) fn find_less(&self, key: &K) -> Option<Handle> {
        let (handle, ordering) = self.landing(key)?;
        match ordering {
            Ordering::Greater => Some(handle),
            Ordering::Equal | Ordering::Less => self.prev(handle),
        }
    }

    /// Greatest node less than or equal to `key`.
    pub(crate) fn find_less_or_equal(&self, key: &K) -> Option<Handle> {
        let (handle, ordering) = self.landing(key)?;
        match ordering {
            Ordering::Greater | Ordering::Equal => Some(handle),
            Ordering::Less => self.prev(handle),
        }
    }

    /// Inserts `key` unless an equal key is present, in which case nothing changes and
    /// the arguments are handed back.
    pub(crate) fn insert(&mut self, key: K, value: V) -> InsertResult<K, V> {
        if let Some(handle) = self.search(&key) {
            return InsertResult::Occupied { handle, key, value };
        }

        let handle = self.nodes.alloc(Node::new(key, value));
        match self.root {
            None => {
                self.first = Some(handle);
                self.last = Some(handle);
                self.root = Some(handle);
            }
            Some(root) => {
                let root = self.attach(root, handle);
                self.root = Some(root);
            }
        }
        self.len += 1;
        InsertResult::Inserted(handle)
    }

    /// Inserts the detached node `new` below `handle`, splicing it into the list next to
    /// the node it becomes a child of. Returns the subtree's new root.
    fn attach(&mut self, handle: Handle, new: Handle) -> Handle {
        let ordering = self.comparator.compare(self.nodes.get(new).key(), self.nodes.get(handle).key());
        if ordering == Ordering::Less {
            let left = match self.nodes.get(handle).left() {
                Some(left) => self.attach(left, new),
                None => {
                    self.link_before(handle, new);
                    new
                }
            };
            self.nodes.get_mut(handle).set_left(Some(left));
        } else {
            let right = match self.nodes.get(handle).right() {
                Some(right) => self.attach(right, new),
                None => {
                    self.link_after(handle, new);
                    new
                }
            };
            self.nodes.get_mut(handle).set_right(Some(right));
        }
        self.rebalance(handle)
    }

    /// Removes the node equal to `key`, returning its key and value.
    pub(crate) fn remove(&mut self, key: &K) -> Option<(K, V)> {
        let target = self.search(key)?;
        Some(self.remove_handle(target))
    }

    /// Removes a node known to be in this tree.
    pub(crate) fn remove_handle(&mut self, target: Handle) -> (K, V) {
        self.unlink(target);
        let root = self.root.expect("`RawAvlTree::remove_handle()` - tree is empty!");
        self.root = self.detach(root, target);
        self.len -= 1;
        self.nodes.take(target).into_entry()
    }

    /// Removes `target` from the subtree at `handle`, returning the rebalanced subtree.
    /// A node with two children is replaced by its successor, the minimum of its right
    /// subtree.
    fn detach(&mut self, handle: Handle, target: Handle) -> Option<Handle> {
        if handle == target {
            let node = self.nodes.get(handle);
            return match (node.left(), node.right()) {
                (None, None) => None,
                (Some(child), None) | (None, Some(child)) => Some(child),
                (Some(left), Some(right)) => {
                    let (right, successor) = self.detach_min(right);
                    self.set_children(successor, Some(left), right);
                    Some(self.rebalance(successor))
                }
            };
        }

        let ordering = self.comparator.compare(self.nodes.get(target).key(), self.nodes.get(handle).key());
        if ordering == Ordering::Less {
            let left = self.nodes.get(handle).left().and_then(|left| self.detach(left, target));
            self.nodes.get_mut(handle).set_left(left);
        } else {
            let right = self.nodes.get(handle).right().and_then(|right| self.detach(right, target));
            self.nodes.get_mut(handle).set_right(right);
        }
        Some(self.rebalance(handle))
    }

    /// Checks order, balance, cached heights, list links and length. O(n).
    pub(crate) fn validate(&self) -> Result<(), InvariantViolation> {
        let mut in_order = Vec::with_capacity(self.len);
        if let Some(root) = self.root {
            self.validate_subtree(root, &mut in_order)?;
        }
        if in_order.len() != self.len {
            return Err(InvariantViolation::Length {
                cached: self.len,
                actual: in_order.len(),
            });
        }

        let mut current = self.first;
        for (position, &handle) in in_order.iter().enumerate() {
            let expected_prev = position.checked_sub(1).map(|p| in_order[p]);
            if current != Some(handle) || self.prev(handle) != expected_prev {
                return Err(InvariantViolation::Links { position });
            }
            current = self.next(handle);
        }
        if current.is_some() || self.last != in_order.last().copied() {
            return Err(InvariantViolation::Links {
                position: in_order.len(),
            });
        }
        Ok(())
    }

    fn validate_subtree(&self, handle: Handle, in_order: &mut Vec<Handle>) -> Result<u8, InvariantViolation> {
        let node = self.nodes.get(handle);
        let left = match node.left() {
            Some(left) => self.validate_subtree(left, in_order)?,
            None => EMPTY_HEIGHT,
        };

        let position = in_order.len();
        if let Some(&prev) = in_order.last()
            && self.comparator.compare(self.key(prev), node.key()) != Ordering::Less
        {
            return Err(InvariantViolation::Order { position });
        }
        in_order.push(handle);

        let right = match node.right() {
            Some(right) => self.validate_subtree(right, in_order)?,
            None => EMPTY_HEIGHT,
        };

        if left.abs_diff(right) > 1 {
            return Err(InvariantViolation::Balance { position });
        }
        if node.height() != 1 + left.max(right) {
            return Err(InvariantViolation::Height { position });
        }
        Ok(node.height())
    }
}
