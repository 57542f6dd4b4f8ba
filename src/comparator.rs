//! The total order a tree sorts its keys by.

use core::cmp::Ordering;

/// A total order over `T`, injected into every tree at construction.
///
/// Any `Fn(&T, &T) -> Ordering` closure is a comparator, and [`NaturalOrder`] uses
/// `T`'s own [`Ord`] implementation.
///
/// It is a logic error for the order to change while keys compared by it are stored
/// in a tree. The behavior resulting from such a logic error is not specified, but it
/// stays encapsulated in the tree that observed it and does not result in undefined
/// behavior.
///
/// # Examples
///
/// ```
/// use avl_core::AvlTree;
///
/// let mut tree = AvlTree::with_comparator(|a: &i32, b: &i32| b.cmp(a));
/// tree.insert(1);
/// tree.insert(3);
/// tree.insert(2);
/// assert_eq!(tree.keys(), [&3, &2, &1]);
/// ```
pub trait Comparator<T: ?Sized> {
    /// Compares two keys.
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// Orders keys by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Comparator<T> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}
