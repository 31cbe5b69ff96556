//! Ascending-order container that lives on the stack and spills to the heap.
//!
//! [`SortedVec`] is a thin wrapper around [`HybridVec<T, N>`](crate::HybridVec) that keeps
//! its elements sorted, so lookups are binary searches and iteration is in order.
//! Duplicates are allowed; [`insert_unique`](SortedVec::insert_unique) and
//! [`unique`](SortedVec::unique) give set semantics when wanted.

use core::borrow::Borrow;
use core::fmt::{self, Debug};
use core::ops::{Deref, Range, RangeBounds};

use crate::HybridVec;

/// A sorted vector that lives on the stack for up to `N` elements.
///
/// # Generic parameters
/// | Parameter | Meaning |
/// |-----------|--------|
/// | `T` | Element type; must implement `Ord` |
/// | `N` | Inline capacity of the backing `HybridVec` |
///
/// # Design Consideration
/// - **Insertion** is a binary search plus a shift of the tail, O(log n + n). Appending
///   values in ascending order only ever writes at the back.
/// - **Equal elements** keep insertion order: a new value goes after its equals.
/// - `Deref<Target = [T]>` exposes read-only slice methods; there is no mutable access
///   that could break the ordering.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortedVec<T, const N: usize> {
    inner: HybridVec<T, N>,
}

impl<T: Ord, const N: usize> SortedVec<T, N> {
    /// Creates a new empty sorted vector.
    pub fn new() -> Self {
        Self {
            inner: HybridVec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: HybridVec::with_capacity(capacity),
        }
    }

    /// Sorts `inner` (stable) and takes it over.
    pub fn from_unsorted(mut inner: HybridVec<T, N>) -> Self {
        inner.sort();
        Self { inner }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Returns `true` if the elements are stored inline.
    #[inline]
    pub fn is_on_stack(&self) -> bool {
        self.inner.is_on_stack()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.inner.as_slice()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.inner.iter()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.inner.get(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.inner.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.inner.last()
    }

    /// Returns the backing vector, still sorted.
    pub fn into_inner(self) -> HybridVec<T, N> {
        self.inner
    }

    pub fn reserve(&mut self, additional: usize) {
        self.inner.reserve(additional);
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Index of the first element not less than `value`.
    pub fn lower_bound<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.partition_point(|x| x.borrow() < value)
    }

    /// Index of the first element greater than `value`.
    pub fn upper_bound<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.partition_point(|x| x.borrow() <= value)
    }

    /// Index range of the elements equal to `value`; empty (positioned where `value`
    /// would go) when there are none.
    pub fn equal_range<Q>(&self, value: &Q) -> Range<usize>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.lower_bound(value)..self.upper_bound(value)
    }

    /// Index of the first element equal to `value`.
    pub fn find<Q>(&self, value: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let at = self.lower_bound(value);
        match self.inner.get(at) {
            Some(x) if x.borrow() == value => Some(at),
            _ => None,
        }
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(value).is_some()
    }

    /// Inserts `value` after any equal elements and returns its index.
    pub fn insert(&mut self, value: T) -> usize {
        let at = self.upper_bound(&value);
        self.inner.insert(at, value);
        at
    }

    /// Inserts `value` unless an equal element exists.
    ///
    /// Returns `Ok(index)` of the new element, or `Err(index)` of the existing one.
    pub fn insert_unique(&mut self, value: T) -> Result<usize, usize> {
        let at = self.lower_bound(&value);
        if self.inner.get(at) == Some(&value) {
            return Err(at);
        }
        self.inner.insert(at, value);
        Ok(at)
    }

    pub fn pop_first(&mut self) -> Option<T> {
        if self.is_empty() {
            None
        } else {
            Some(self.inner.remove(0))
        }
    }

    pub fn pop_last(&mut self) -> Option<T> {
        self.inner.pop()
    }

    /// Removes the element at `index`.
    ///
    /// # Panics
    /// If `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        self.inner.remove(index)
    }

    /// Removes the first element equal to `value`.
    pub fn remove_value<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let at = self.find(value)?;
        Some(self.inner.remove(at))
    }

    /// Drops the elements in `range`; returns the index of the element that followed it.
    pub fn erase<R: RangeBounds<usize>>(&mut self, range: R) -> usize {
        self.inner.erase(range)
    }

    pub fn retain<F: FnMut(&T) -> bool>(&mut self, f: F) {
        self.inner.retain(f);
    }

    /// Removes duplicates, keeping the first of each run of equal elements.
    pub fn unique(&mut self) {
        self.inner.dedup();
    }
}

// --- Traits ---

impl<T, const N: usize> Deref for SortedVec<T, N> {
    type Target = [T];
    fn deref(&self) -> &[T] {
        self.inner.as_slice()
    }
}

impl<T, const N: usize> AsRef<[T]> for SortedVec<T, N> {
    fn as_ref(&self) -> &[T] {
        self.inner.as_slice()
    }
}

impl<T: Ord, const N: usize> Default for SortedVec<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Debug, const N: usize> Debug for SortedVec<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.inner.iter()).finish()
    }
}

impl<T: Ord, const N: usize> From<HybridVec<T, N>> for SortedVec<T, N> {
    fn from(inner: HybridVec<T, N>) -> Self {
        Self::from_unsorted(inner)
    }
}

impl<T: Ord, const N: usize> FromIterator<T> for SortedVec<T, N> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_unsorted(iter.into_iter().collect())
    }
}

impl<T: Ord, const N: usize> Extend<T> for SortedVec<T, N> {
    /// Appends the items and re-sorts once, keeping earlier equals first.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let old_len = self.inner.len();
        self.inner.extend(iter);
        if self.inner.len() != old_len {
            self.inner.sort();
        }
    }
}

impl<T, const N: usize> IntoIterator for SortedVec<T, N> {
    type Item = T;
    type IntoIter = crate::vecs::IntoIter<T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a SortedVec<T, N> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
