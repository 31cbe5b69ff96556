//! Owning and draining iterators for [`HybridVec`].

use core::fmt;
use core::iter::FusedIterator;
use core::ptr;
use core::slice;

use super::vec::HybridVec;
use crate::utils::poison;

/// An iterator that moves elements out of a [`HybridVec`].
///
/// Owns the vector (with its length forced to zero) and reads elements out of its
/// storage, so no reallocation happens in either storage mode.
pub struct IntoIter<T, const N: usize> {
    vec: HybridVec<T, N>,
    start: usize,
    end: usize,
}

impl<T, const N: usize> IntoIter<T, N> {
    /// `vec` must have its length set to zero with `len` live elements in its storage.
    pub(crate) fn new(vec: HybridVec<T, N>, len: usize) -> Self {
        IntoIter { vec, start: 0, end: len }
    }

    /// Returns the elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.vec.as_ptr().add(self.start), self.end - self.start) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe {
            slice::from_raw_parts_mut(self.vec.as_mut_ptr().add(self.start), self.end - self.start)
        }
    }
}

impl<T, const N: usize> Iterator for IntoIter<T, N> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        let value = unsafe { ptr::read(self.vec.as_ptr().add(self.start)) };
        self.start += 1;
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.start;
        (remaining, Some(remaining))
    }
}

impl<T, const N: usize> DoubleEndedIterator for IntoIter<T, N> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        Some(unsafe { ptr::read(self.vec.as_ptr().add(self.end)) })
    }
}

impl<T, const N: usize> ExactSizeIterator for IntoIter<T, N> {}

impl<T, const N: usize> FusedIterator for IntoIter<T, N> {}

impl<T: fmt::Debug, const N: usize> fmt::Debug for IntoIter<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, const N: usize> Drop for IntoIter<T, N> {
    fn drop(&mut self) {
        unsafe {
            let base = self.vec.as_mut_ptr();
            let remaining = ptr::slice_from_raw_parts_mut(base.add(self.start), self.end - self.start);
            let consumed = self.end;
            self.start = self.end;
            ptr::drop_in_place(remaining);
            poison::mark_dead(base, consumed);
        }
    }
}

/// A draining iterator for [`HybridVec`], created by [`HybridVec::drain`].
///
/// While it lives the vector's length covers only the prefix before the drained range.
/// Dropping it drops any element that was not yielded and moves the tail back into
/// place. Forgetting it leaks the range and the tail.
pub struct Drain<'a, T, const N: usize> {
    vec: &'a mut HybridVec<T, N>,
    next: usize,
    end: usize,
    tail_start: usize,
    tail_len: usize,
    raw: poison::RawRegion,
}

impl<'a, T, const N: usize> Drain<'a, T, N> {
    /// `vec.len()` must already be `start`; `[start, end)` is drained and `tail_len`
    /// elements follow it. `raw` is the vector's poison state from before the drain,
    /// put back once the hole is closed.
    pub(crate) fn new(
        vec: &'a mut HybridVec<T, N>,
        start: usize,
        end: usize,
        tail_len: usize,
        raw: poison::RawRegion,
    ) -> Self {
        debug_assert_eq!(vec.len(), start);
        Drain { vec, next: start, end, tail_start: end, tail_len, raw }
    }

    /// Returns the drained elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.vec.as_ptr().add(self.next), self.end - self.next) }
    }
}

impl<T, const N: usize> Iterator for Drain<'_, T, N> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.next == self.end {
            return None;
        }
        let value = unsafe { ptr::read(self.vec.as_ptr().add(self.next)) };
        self.next += 1;
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl<T, const N: usize> DoubleEndedIterator for Drain<'_, T, N> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.next == self.end {
            return None;
        }
        self.end -= 1;
        Some(unsafe { ptr::read(self.vec.as_ptr().add(self.end)) })
    }
}

impl<T, const N: usize> ExactSizeIterator for Drain<'_, T, N> {}

impl<T, const N: usize> FusedIterator for Drain<'_, T, N> {}

impl<T: fmt::Debug, const N: usize> fmt::Debug for Drain<'_, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Drain").field(&self.as_slice()).finish()
    }
}

impl<T, const N: usize> Drop for Drain<'_, T, N> {
    fn drop(&mut self) {
        /// Closes the hole even if dropping a leftover element panics.
        struct MoveTail<'r, 'a, T, const N: usize>(&'r mut Drain<'a, T, N>);

        impl<T, const N: usize> Drop for MoveTail<'_, '_, T, N> {
            fn drop(&mut self) {
                let drain = &mut *self.0;
                let start = drain.vec.len();
                unsafe {
                    let base = drain.vec.as_mut_ptr();
                    if drain.tail_start != start {
                        ptr::copy(base.add(drain.tail_start), base.add(start), drain.tail_len);
                    }
                    drain.vec.set_len(start + drain.tail_len);
                    poison::mark_dead(base.add(start + drain.tail_len), drain.tail_start - start);
                }
                drain.vec.restore_raw_checks(drain.raw);
            }
        }

        let guard = MoveTail(self);
        let leftover = guard.0.end - guard.0.next;
        unsafe {
            let p = guard.0.vec.as_mut_ptr().add(guard.0.next);
            guard.0.next = guard.0.end;
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(p, leftover));
        }
    }
}
