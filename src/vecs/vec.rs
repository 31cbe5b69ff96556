//! Contiguous vector that stores up to `N` elements inline and spills to the heap.
//!
//! Provides [`HybridVec`], which keeps its elements in a `heapless::Vec<T, N>` buffer
//! embedded in the struct and transparently migrates them into a `std::vec::Vec` buffer
//! when more room is needed. Both inner containers are used as raw storage only: their
//! own length stays zero and the live element count is tracked by `HybridVec` itself.
//! Because it `Deref`s to `[T]`, all standard slice methods are available.
//!
//! The storage mode is never stored. It is derived from the capacity: a capacity of at
//! most `N` means the inline buffer is active, anything larger means the heap buffer is.

use core::alloc::Layout;
use core::borrow::{Borrow, BorrowMut};
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter;
use core::mem::{self, ManuallyDrop};
use core::ops::{Bound, Deref, DerefMut, Index, IndexMut, RangeBounds};
use core::ptr;
use core::slice::{self, SliceIndex};

use super::iter::{Drain, IntoIter};
use crate::error::{AllocError, infallible};
use crate::utils::poison;

/// Which buffer currently holds the elements of a [`HybridVec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageMode {
    /// The buffer embedded in the `HybridVec` itself.
    Inline,
    /// A separately allocated buffer owned by the `HybridVec`.
    Heap,
}

union VecData<T, const N: usize> {
    stack: ManuallyDrop<heapless::Vec<T, N>>,
    heap: ManuallyDrop<std::vec::Vec<T>>,
}

impl<T, const N: usize> VecData<T, N> {
    #[inline(always)]
    fn inline() -> Self {
        VecData {
            stack: ManuallyDrop::new(heapless::Vec::<T, N>::new()),
        }
    }
}

/// A vector that lives inline for up to `N` items, then spills to the heap.
///
/// # Storage
/// * **Inline:** the first `N` elements need no allocation at all.
/// * **Heap:** once more room is needed every element is relocated into a heap buffer
///   that grows geometrically (`cap + 1 + cap / 2`).
/// * **Demotion:** [`shrink_to_fit`](Self::shrink_to_fit) moves the elements back inline
///   when they fit again.
///
/// Relocation is always a bitwise copy; no element is cloned or dropped while the
/// storage changes.
pub struct HybridVec<T, const N: usize> {
    len: usize,
    capacity: usize,
    data: VecData<T, N>,
    raw: poison::RawRegion,
}

/// Writes the tracked length back on drop, so a panic while filling slots one by one
/// leaves exactly the written elements live.
struct SetLenOnDrop<'a> {
    len: &'a mut usize,
    local_len: usize,
}

impl<'a> SetLenOnDrop<'a> {
    #[inline]
    fn new(len: &'a mut usize) -> Self {
        let local_len = *len;
        SetLenOnDrop { len, local_len }
    }
}

impl Drop for SetLenOnDrop<'_> {
    #[inline]
    fn drop(&mut self) {
        *self.len = self.local_len;
    }
}

/// A run of raw slots opened in the middle of a vector by [`HybridVec::open_gap`].
///
/// The shifted tail sits `count` slots to the right while the gap is open. Dropping the
/// gap (normally or while unwinding) closes it around however many slots were filled.
struct InsertGap<'a, T, const N: usize> {
    vec: &'a mut HybridVec<T, N>,
    index: usize,
    count: usize,
    filled: usize,
    tail_len: usize,
}

impl<T, const N: usize> InsertGap<'_, T, N> {
    #[inline]
    fn is_full(&self) -> bool {
        self.filled == self.count
    }

    #[inline]
    fn write(&mut self, value: T) {
        assert!(!self.is_full(), "insert gap overfilled");
        unsafe {
            let slot = self.vec.as_mut_ptr().add(self.index + self.filled);
            self.vec.raw.assert_dead(slot, 1);
            ptr::write(slot, value);
        }
        self.filled += 1;
    }
}

impl<T, const N: usize> Drop for InsertGap<'_, T, N> {
    fn drop(&mut self) {
        unsafe {
            let base = self.vec.as_mut_ptr();
            let gap_end = self.index + self.filled;
            if !self.is_full() {
                ptr::copy(base.add(self.index + self.count), base.add(gap_end), self.tail_len);
            }
            self.vec.len = gap_end + self.tail_len;
            poison::mark_dead(base.add(self.vec.len), self.count - self.filled);
        }
    }
}

/// Poisons `count` slots at `ptr` on drop, even while unwinding out of a destructor.
struct MarkDeadOnDrop<T> {
    ptr: *mut T,
    count: usize,
}

impl<T> Drop for MarkDeadOnDrop<T> {
    #[inline]
    fn drop(&mut self) {
        unsafe { poison::mark_dead(self.ptr, self.count) };
    }
}

/// Resolves `range` against `len`, panicking on an inverted or out-of-bounds range.
fn resolve_range<R: RangeBounds<usize>>(range: R, len: usize, op: &str) -> (usize, usize) {
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start
            .checked_add(1)
            .unwrap_or_else(|| panic!("{op} range start overflows usize")),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&end) => end
            .checked_add(1)
            .unwrap_or_else(|| panic!("{op} range end overflows usize")),
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    };
    assert!(start <= end, "{op} range starts at {start} but ends at {end}");
    assert!(end <= len, "{op} range end (is {end}) should be <= len (is {len})");
    (start, end)
}

impl<T, const N: usize> HybridVec<T, N> {
    pub const MAX_STACK_SIZE: usize = 16 * 1024;

    /// Creates an empty vector using the inline buffer.
    pub fn new() -> Self {
        const {
            assert!(
                std::mem::size_of::<Self>() <= HybridVec::<T, N>::MAX_STACK_SIZE,
                "HybridVec is too large! Reduce N."
            );
        }
        let mut vec = Self {
            len: 0,
            capacity: N,
            data: VecData::inline(),
            raw: poison::RawRegion::verified(),
        };
        unsafe { poison::mark_dead(vec.as_mut_ptr(), N) };
        vec
    }

    /// Creates an empty vector with room for at least `capacity` elements; inline when
    /// `capacity <= N`.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut vec = Self::new();
        vec.grow(capacity);
        vec
    }

    #[inline(always)]
    pub const fn inline_capacity() -> usize {
        N
    }

    #[inline(always)]
    pub fn is_on_stack(&self) -> bool {
        self.capacity <= N
    }

    #[inline]
    pub fn storage_mode(&self) -> StorageMode {
        if self.is_on_stack() {
            StorageMode::Inline
        } else {
            StorageMode::Heap
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forces the length of the vector to `new_len`.
    ///
    /// # Safety
    /// `new_len <= capacity()`, and the slots `[old_len, new_len)` must hold initialised
    /// values when growing. Shrinking does not drop anything.
    #[inline]
    pub unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.capacity);
        // the raw region may now hold values the caller still owns
        self.raw.suspend();
        self.len = new_len;
    }

    /// Called once the raw region has been poisoned again.
    pub(crate) fn restore_raw_checks(&mut self, previous: poison::RawRegion) {
        self.raw.restore(previous);
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *const T {
        unsafe {
            if self.is_on_stack() {
                (*self.data.stack).as_ptr()
            } else {
                (*self.data.heap).as_ptr()
            }
        }
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        unsafe {
            if self.is_on_stack() {
                (*self.data.stack).as_mut_ptr()
            } else {
                (*self.data.heap).as_mut_ptr()
            }
        }
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }

    /// Returns the first element.
    ///
    /// # Panics
    /// If the vector is empty.
    pub fn front(&self) -> &T {
        assert!(!self.is_empty(), "front() called on an empty HybridVec");
        &self.as_slice()[0]
    }

    pub fn front_mut(&mut self) -> &mut T {
        assert!(!self.is_empty(), "front_mut() called on an empty HybridVec");
        &mut self.as_mut_slice()[0]
    }

    /// Returns the last element.
    ///
    /// # Panics
    /// If the vector is empty.
    pub fn back(&self) -> &T {
        assert!(!self.is_empty(), "back() called on an empty HybridVec");
        &self.as_slice()[self.len - 1]
    }

    pub fn back_mut(&mut self) -> &mut T {
        assert!(!self.is_empty(), "back_mut() called on an empty HybridVec");
        let last = self.len - 1;
        &mut self.as_mut_slice()[last]
    }

    // --- Capacity ---

    /// Makes sure the vector can hold `new_capacity` elements in total, allocating a
    /// buffer of exactly that size when it cannot already.
    pub fn grow(&mut self, new_capacity: usize) {
        infallible(self.try_grow(new_capacity));
    }

    /// Fallible version of [`grow`](Self::grow). On error the vector is unchanged.
    pub fn try_grow(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        if new_capacity <= self.capacity {
            return Ok(());
        }
        self.relocate(new_capacity)
    }

    /// Reserves room for at least `additional` more elements, growing geometrically.
    pub fn reserve(&mut self, additional: usize) {
        infallible(self.try_reserve(additional));
    }

    /// Fallible version of [`reserve`](Self::reserve). On error the vector is unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(AllocError::CapacityOverflow)?;
        if required <= self.capacity {
            return Ok(());
        }
        let mut target = self.capacity;
        while target < required {
            target = target
                .checked_add(1 + target / 2)
                .ok_or(AllocError::CapacityOverflow)?;
        }
        self.relocate(target)
    }

    /// Reserves room for exactly `additional` more elements.
    pub fn reserve_exact(&mut self, additional: usize) {
        infallible(self.try_reserve_exact(additional));
    }

    pub fn try_reserve_exact(&mut self, additional: usize) -> Result<(), AllocError> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(AllocError::CapacityOverflow)?;
        self.try_grow(required)
    }

    /// Releases unused capacity.
    ///
    /// Moves the elements back into the inline buffer when `len <= N`; otherwise
    /// reallocates the heap buffer to exactly `len` slots. A tight vector is untouched.
    pub fn shrink_to_fit(&mut self) {
        infallible(self.try_shrink_to_fit());
    }

    pub fn try_shrink_to_fit(&mut self) -> Result<(), AllocError> {
        if self.is_on_stack() || self.len == self.capacity {
            return Ok(());
        }
        self.relocate(self.len.max(N))
    }

    fn layout_for(capacity: usize) -> Result<Layout, AllocError> {
        Layout::array::<T>(capacity).map_err(|_| AllocError::CapacityOverflow)
    }

    /// Obtains a heap buffer with at least `capacity` raw slots.
    #[cold]
    fn allocate(capacity: usize) -> Result<std::vec::Vec<T>, AllocError> {
        let layout = Self::layout_for(capacity)?;
        let mut buffer = std::vec::Vec::new();
        buffer
            .try_reserve_exact(capacity)
            .map_err(|source| AllocError::AllocFailed { layout, source })?;
        tracing::trace!(
            capacity = buffer.capacity(),
            bytes = layout.size(),
            inline = N,
            "allocated heap buffer"
        );
        unsafe { poison::mark_dead(buffer.as_mut_ptr(), buffer.capacity()) };
        Ok(buffer)
    }

    /// Frees a heap buffer whose slots are all raw.
    #[cold]
    fn release(buffer: std::vec::Vec<T>, raw: &poison::RawRegion) {
        unsafe { raw.assert_dead(buffer.as_ptr(), buffer.capacity()) };
        tracing::trace!(capacity = buffer.capacity(), inline = N, "released heap buffer");
        drop(buffer);
    }

    /// Moves every element into a buffer of `new_capacity` slots (inline when it is at
    /// most `N`). The new buffer is obtained before anything is touched.
    #[cold]
    fn relocate(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        debug_assert!(new_capacity >= self.len);
        if new_capacity <= N {
            self.demote();
            return Ok(());
        }
        let mut buffer = Self::allocate(new_capacity)?;
        let len = self.len;
        let was_on_stack = self.is_on_stack();
        unsafe {
            ptr::copy_nonoverlapping(self.as_ptr(), buffer.as_mut_ptr(), len);
            poison::mark_dead(self.as_mut_ptr(), len);
            let capacity = buffer.capacity();
            let old = mem::replace(
                &mut self.data,
                VecData {
                    heap: ManuallyDrop::new(buffer),
                },
            );
            self.capacity = capacity;
            if was_on_stack {
                tracing::trace!(len, capacity, inline = N, "promoted to heap storage");
            } else {
                Self::release(ManuallyDrop::into_inner(old.heap), &self.raw);
            }
        }
        self.raw.resume();
        self.debug_validate();
        Ok(())
    }

    /// Moves the elements from the heap buffer back into the inline buffer.
    #[cold]
    fn demote(&mut self) {
        if self.is_on_stack() {
            return;
        }
        let len = self.len;
        debug_assert!(len <= N);
        unsafe {
            let old = mem::replace(&mut self.data, VecData::inline());
            let mut heap = ManuallyDrop::into_inner(old.heap);
            let old_capacity = mem::replace(&mut self.capacity, N);
            let dst = self.as_mut_ptr();
            poison::mark_dead(dst, N);
            ptr::copy_nonoverlapping(heap.as_ptr(), dst, len);
            poison::mark_dead(heap.as_mut_ptr(), len);
            tracing::trace!(len, old_capacity, inline = N, "demoted to inline storage");
            Self::release(heap, &self.raw);
        }
        self.raw.resume();
        self.debug_validate();
    }

    /// Checks that every raw slot still carries the poison pattern.
    #[inline(always)]
    fn debug_validate(&self) {
        unsafe { self.raw.assert_dead(self.as_ptr().add(self.len), self.capacity - self.len) };
    }

    // --- Modification ---

    /// Appends an element, growing the storage when it is full.
    #[inline(always)]
    pub fn push(&mut self, value: T) {
        if self.len == self.capacity {
            self.grow_for_push();
        }
        unsafe {
            self.push_unchecked(value);
        }
    }

    /// Appends an element and returns a reference to it.
    pub fn push_mut(&mut self, value: T) -> &mut T {
        if self.len == self.capacity {
            self.grow_for_push();
        }
        unsafe { self.push_unchecked(value) }
    }

    /// Appends an element, handing it back together with the error when the storage
    /// could not grow.
    pub fn try_push(&mut self, value: T) -> Result<(), (T, AllocError)> {
        if self.len == self.capacity {
            if let Err(err) = self.try_reserve(1) {
                return Err((value, err));
            }
        }
        unsafe {
            self.push_unchecked(value);
        }
        Ok(())
    }

    #[inline(never)]
    fn grow_for_push(&mut self) {
        self.reserve(1);
    }

    /// # Safety
    /// `len < capacity`.
    #[inline(always)]
    unsafe fn push_unchecked(&mut self, value: T) -> &mut T {
        unsafe {
            let slot = self.as_mut_ptr().add(self.len);
            self.raw.assert_dead(slot, 1);
            ptr::write(slot, value);
            self.len += 1;
            &mut *slot
        }
    }

    /// Removes the last element, or returns `None` when empty.
    #[inline(always)]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        unsafe {
            let slot = self.as_mut_ptr().add(self.len);
            let value = ptr::read(slot);
            poison::mark_dead(slot, 1);
            Some(value)
        }
    }

    /// Inserts an element at `index`, shifting everything after it to the right.
    ///
    /// # Panics
    /// If `index > len`.
    pub fn insert(&mut self, index: usize, element: T) {
        let len = self.len;
        assert!(
            index <= len,
            "insertion index (is {}) should be <= len (is {})",
            index,
            len
        );
        if len == self.capacity {
            self.grow_for_push();
        }
        unsafe {
            let p = self.as_mut_ptr().add(index);
            self.raw.assert_dead(p.add(len - index), 1);
            ptr::copy(p, p.add(1), len - index);
            ptr::write(p, element);
            self.len = len + 1;
        }
    }

    /// Grows if needed and shifts `[index, len)` right by `count`, returning the gap
    /// between them. `len` stays at `index` until the gap is dropped.
    fn open_gap(&mut self, index: usize, count: usize) -> InsertGap<'_, T, N> {
        let len = self.len;
        assert!(
            index <= len,
            "insertion index (is {}) should be <= len (is {})",
            index,
            len
        );
        self.reserve(count);
        let tail_len = len - index;
        unsafe {
            let gap = self.as_mut_ptr().add(index);
            self.raw.assert_dead(gap.add(tail_len), count);
            ptr::copy(gap, gap.add(count), tail_len);
            poison::mark_dead(gap, count);
        }
        self.len = index;
        InsertGap {
            vec: self,
            index,
            count,
            filled: 0,
            tail_len,
        }
    }

    /// Inserts every item of `iterable` at `index`, in order, and returns `index`.
    ///
    /// The gap is sized from the iterator's lower size hint; any surplus items are
    /// collected first and inserted as a second batch.
    ///
    /// # Panics
    /// If `index > len`, or on capacity overflow. Allocation failure goes to
    /// `handle_alloc_error`; call [`try_reserve`](Self::try_reserve) first to handle it
    /// instead.
    pub fn insert_many<I: IntoIterator<Item = T>>(&mut self, index: usize, iterable: I) -> usize {
        let mut iter = iterable.into_iter();
        let (lower, _) = iter.size_hint();
        let inserted = {
            let mut gap = self.open_gap(index, lower);
            while !gap.is_full() {
                match iter.next() {
                    Some(value) => gap.write(value),
                    None => break,
                }
            }
            gap.filled
        };
        let rest: std::vec::Vec<T> = iter.collect();
        if !rest.is_empty() {
            let mut gap = self.open_gap(index + inserted, rest.len());
            for value in rest {
                gap.write(value);
            }
        }
        index
    }

    /// Appends every element of `other`, leaving it empty.
    pub fn append<const M: usize>(&mut self, other: &mut HybridVec<T, M>) {
        let count = other.len;
        self.reserve(count);
        unsafe {
            let dst = self.as_mut_ptr().add(self.len);
            self.raw.assert_dead(dst, count);
            let src = other.as_mut_ptr();
            ptr::copy_nonoverlapping(src, dst, count);
            other.len = 0;
            poison::mark_dead(src, count);
        }
        self.len += count;
    }

    /// Splits off `[at, len)` into a new vector.
    ///
    /// # Panics
    /// If `at > len`.
    pub fn split_off(&mut self, at: usize) -> Self {
        let len = self.len;
        assert!(at <= len, "split_off index (is {}) should be <= len (is {})", at, len);
        let count = len - at;
        let mut other = Self::with_capacity(count);
        unsafe {
            let src = self.as_mut_ptr().add(at);
            ptr::copy_nonoverlapping(src, other.as_mut_ptr(), count);
            self.len = at;
            poison::mark_dead(src, count);
            other.len = count;
        }
        other
    }

    /// Removes and returns the element at `index`, shifting the tail left.
    ///
    /// # Panics
    /// If `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.len;
        assert!(
            index < len,
            "removal index (is {}) should be < len (is {})",
            index,
            len
        );
        unsafe {
            let base = self.as_mut_ptr();
            let value = ptr::read(base.add(index));
            ptr::copy(base.add(index + 1), base.add(index), len - index - 1);
            self.len = len - 1;
            poison::mark_dead(base.add(len - 1), 1);
            value
        }
    }

    /// Removes and returns the element at `index`, replacing it with the last element.
    /// O(1).
    ///
    /// # Panics
    /// If `index >= len`.
    pub fn swap_remove(&mut self, index: usize) -> T {
        let len = self.len;
        assert!(
            index < len,
            "swap_remove index (is {}) should be < len (is {})",
            index,
            len
        );
        unsafe {
            let base = self.as_mut_ptr();
            let value = ptr::read(base.add(index));
            let last = len - 1;
            if index != last {
                ptr::copy_nonoverlapping(base.add(last), base.add(index), 1);
            }
            self.len = last;
            poison::mark_dead(base.add(last), 1);
            value
        }
    }

    /// Drops the elements in `range` and closes the hole, returning the index where the
    /// element that followed the range now lives. Capacity is kept.
    ///
    /// The hole is closed even if a destructor panics.
    ///
    /// # Panics
    /// If the range is inverted or reaches past `len`.
    pub fn erase<R: RangeBounds<usize>>(&mut self, range: R) -> usize {
        let (start, end) = resolve_range(range, self.len, "erase");
        if start != end {
            drop(self.drain(start..end));
        }
        start
    }

    /// Removes `range` and yields its elements by value. The tail closes up when the
    /// returned iterator is dropped.
    ///
    /// # Panics
    /// If the range is inverted or reaches past `len`.
    pub fn drain<R: RangeBounds<usize>>(&mut self, range: R) -> Drain<'_, T, N> {
        let len = self.len;
        let (start, end) = resolve_range(range, len, "drain");
        self.len = start;
        let raw = self.raw.suspend();
        Drain::new(self, start, end, len - end, raw)
    }

    /// Shortens the vector to `len`, dropping the excess. No-op when already shorter.
    pub fn truncate(&mut self, len: usize) {
        let old_len = self.len;
        if len >= old_len {
            return;
        }
        unsafe {
            let base = self.as_mut_ptr();
            self.len = len;
            let _dead = MarkDeadOnDrop {
                ptr: base.add(len),
                count: old_len - len,
            };
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(len), old_len - len));
        }
    }

    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Takes the contents, leaving an empty inline vector behind.
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Exchanges the contents of two vectors without cloning anything.
    ///
    /// Two heap-backed vectors only trade buffer, length and capacity; otherwise the
    /// whole representation, inline buffers included, is swapped bitwise.
    pub fn swap_with(&mut self, other: &mut Self) {
        if !self.is_on_stack() && !other.is_on_stack() {
            unsafe { mem::swap(&mut *self.data.heap, &mut *other.data.heap) };
            mem::swap(&mut self.len, &mut other.len);
            mem::swap(&mut self.capacity, &mut other.capacity);
            tracing::trace!(
                left = self.len,
                right = other.len,
                inline = N,
                "swapped heap buffers"
            );
        } else {
            mem::swap(self, other);
        }
        self.debug_validate();
        other.debug_validate();
    }

    /// Appends up to `count` items from `iter` behind a single capacity check.
    fn extend_exact<I: Iterator<Item = T>>(&mut self, iter: I, count: usize) {
        if count == 0 {
            return;
        }
        self.reserve(count);
        unsafe {
            let base = self.as_mut_ptr();
            self.raw.assert_dead(base.add(self.len), count);
            let mut len = SetLenOnDrop::new(&mut self.len);
            for value in iter.take(count) {
                ptr::write(base.add(len.local_len), value);
                len.local_len += 1;
            }
        }
    }

    /// Resizes to `new_len`, filling new slots with the results of `f`.
    pub fn resize_with<F: FnMut() -> T>(&mut self, new_len: usize, f: F) {
        let len = self.len;
        if new_len <= len {
            self.truncate(new_len);
        } else {
            self.extend_exact(iter::repeat_with(f), new_len - len);
        }
    }

    /// Resizes to `new_len`, filling new slots with `T::default()`.
    pub fn resize_default(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default);
    }

    /// Replaces the contents with the items of `iterable`, reusing live slots and
    /// capacity where possible.
    pub fn assign_iter<I: IntoIterator<Item = T>>(&mut self, iterable: I) {
        let mut iter = iterable.into_iter();
        let (lower, _) = iter.size_hint();
        if lower > self.capacity {
            self.clear();
            self.reserve_exact(lower);
        }
        let mut written = 0;
        while written < self.len {
            match iter.next() {
                Some(value) => self.as_mut_slice()[written] = value,
                None => break,
            }
            written += 1;
        }
        self.truncate(written);
        self.extend(iter);
    }

    /// Retains only the elements for which `f` returns `true`, in order.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, mut f: F) {
        self.retain_mut(|item| f(item));
    }

    pub fn retain_mut<F: FnMut(&mut T) -> bool>(&mut self, mut f: F) {
        let original_len = self.len;
        if original_len == 0 {
            return;
        }

        struct Backshift<'a, T, const N: usize> {
            vec: &'a mut HybridVec<T, N>,
            processed: usize,
            deleted: usize,
            original_len: usize,
        }

        impl<T, const N: usize> Drop for Backshift<'_, T, N> {
            fn drop(&mut self) {
                unsafe {
                    let base = self.vec.as_mut_ptr();
                    if self.deleted > 0 {
                        ptr::copy(
                            base.add(self.processed),
                            base.add(self.processed - self.deleted),
                            self.original_len - self.processed,
                        );
                    }
                    self.vec.len = self.original_len - self.deleted;
                    poison::mark_dead(base.add(self.vec.len), self.deleted);
                }
            }
        }

        // elements are unreachable while holes exist
        self.len = 0;
        let mut g = Backshift {
            vec: self,
            processed: 0,
            deleted: 0,
            original_len,
        };
        while g.processed != original_len {
            unsafe {
                let cur = g.vec.as_mut_ptr().add(g.processed);
                if !f(&mut *cur) {
                    g.processed += 1;
                    g.deleted += 1;
                    ptr::drop_in_place(cur);
                    continue;
                }
                if g.deleted > 0 {
                    ptr::copy_nonoverlapping(cur, cur.sub(g.deleted), 1);
                }
                g.processed += 1;
            }
        }
    }

    /// Removes consecutive elements for which `same_bucket(current, previous)` is true,
    /// keeping the first of each run.
    pub fn dedup_by<F: FnMut(&mut T, &mut T) -> bool>(&mut self, mut same_bucket: F) {
        let len = self.len;
        if len <= 1 {
            return;
        }

        struct FillGap<'a, T, const N: usize> {
            vec: &'a mut HybridVec<T, N>,
            read: usize,
            write: usize,
            original_len: usize,
        }

        impl<T, const N: usize> Drop for FillGap<'_, T, N> {
            fn drop(&mut self) {
                unsafe {
                    let base = self.vec.as_mut_ptr();
                    let unread = self.original_len - self.read;
                    ptr::copy(base.add(self.read), base.add(self.write), unread);
                    self.vec.len = self.write + unread;
                    poison::mark_dead(base.add(self.vec.len), self.read - self.write);
                }
            }
        }

        let mut g = FillGap {
            vec: self,
            read: 1,
            write: 1,
            original_len: len,
        };
        while g.read < len {
            unsafe {
                let base = g.vec.as_mut_ptr();
                let read_ptr = base.add(g.read);
                let prev_ptr = base.add(g.write - 1);
                if same_bucket(&mut *read_ptr, &mut *prev_ptr) {
                    g.read += 1;
                    ptr::drop_in_place(read_ptr);
                } else {
                    ptr::copy(read_ptr, base.add(g.write), 1);
                    g.write += 1;
                    g.read += 1;
                }
            }
        }
    }

    pub fn dedup_by_key<K: PartialEq, F: FnMut(&mut T) -> K>(&mut self, mut key: F) {
        self.dedup_by(|a, b| key(a) == key(b));
    }

    pub fn dedup(&mut self)
    where
        T: PartialEq,
    {
        self.dedup_by(|a, b| a == b);
    }

    /// Converts into a `std::vec::Vec`, reusing the heap buffer when there is one.
    pub fn into_vec(self) -> std::vec::Vec<T> {
        let mut this = ManuallyDrop::new(self);
        let len = this.len;
        unsafe {
            if this.is_on_stack() {
                let mut vec = std::vec::Vec::with_capacity(len);
                ptr::copy_nonoverlapping(this.as_ptr(), vec.as_mut_ptr(), len);
                vec.set_len(len);
                vec
            } else {
                let mut vec = ManuallyDrop::take(&mut this.data.heap);
                vec.set_len(len);
                vec
            }
        }
    }

    pub fn into_boxed_slice(self) -> Box<[T]> {
        self.into_vec().into_boxed_slice()
    }
}

impl<T: Clone, const N: usize> HybridVec<T, N> {
    /// Creates a vector holding `count` clones of `value`.
    pub fn from_elem(value: T, count: usize) -> Self {
        let mut vec = Self::with_capacity(count);
        vec.extend_exact(iter::repeat_n(value, count), count);
        vec
    }

    pub fn from_slice(slice: &[T]) -> Self {
        let mut vec = Self::with_capacity(slice.len());
        vec.extend_exact(slice.iter().cloned(), slice.len());
        vec
    }

    /// Resizes to `new_len`, filling new slots with clones of `value`.
    ///
    /// # Panics
    /// On capacity overflow. Allocation failure goes to `handle_alloc_error`; call
    /// [`try_reserve`](Self::try_reserve) first to handle it instead.
    pub fn resize(&mut self, new_len: usize, value: T) {
        let len = self.len;
        if new_len <= len {
            self.truncate(new_len);
        } else {
            let extra = new_len - len;
            self.extend_exact(iter::repeat_n(value, extra), extra);
        }
    }

    /// Appends clones of every element of `other`.
    ///
    /// # Panics
    /// On capacity overflow. Allocation failure goes to `handle_alloc_error`; call
    /// [`try_reserve`](Self::try_reserve) first to handle it instead.
    pub fn extend_from_slice(&mut self, other: &[T]) {
        self.extend_exact(other.iter().cloned(), other.len());
    }

    /// Inserts `count` clones of `value` at `index` and returns `index`.
    ///
    /// # Panics
    /// If `index > len`, or on capacity overflow. Allocation failure goes to
    /// `handle_alloc_error`; call [`try_reserve`](Self::try_reserve) first to handle it
    /// instead.
    pub fn insert_n(&mut self, index: usize, count: usize, value: T) -> usize {
        let mut gap = self.open_gap(index, count);
        for value in iter::repeat_n(value, count) {
            gap.write(value);
        }
        index
    }

    /// Inserts clones of `slice` at `index` and returns `index`.
    ///
    /// # Panics
    /// Same as [`insert_n`](Self::insert_n).
    pub fn insert_from_slice(&mut self, index: usize, slice: &[T]) -> usize {
        let mut gap = self.open_gap(index, slice.len());
        for value in slice {
            gap.write(value.clone());
        }
        index
    }

    /// Replaces the contents with `count` clones of `value`.
    pub fn assign_n(&mut self, count: usize, value: T) {
        if count > self.capacity {
            self.clear();
            self.reserve_exact(count);
        }
        let live = self.len.min(count);
        for slot in &mut self.as_mut_slice()[..live] {
            slot.clone_from(&value);
        }
        self.resize(count, value);
    }

    /// Replaces the contents with clones of `source`.
    pub fn assign_from_slice(&mut self, source: &[T]) {
        if source.len() > self.capacity {
            self.clear();
            self.reserve_exact(source.len());
        }
        let live = self.len.min(source.len());
        self.as_mut_slice()[..live].clone_from_slice(&source[..live]);
        self.truncate(source.len());
        self.extend_from_slice(&source[live..]);
    }
}

// --- Trait Implementations ---

impl<T, const N: usize> Deref for HybridVec<T, N> {
    type Target = [T];
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, const N: usize> DerefMut for HybridVec<T, N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T, const N: usize> Drop for HybridVec<T, N> {
    fn drop(&mut self) {
        unsafe {
            let len = self.len;
            let base = self.as_mut_ptr();
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base, len));
            if !self.is_on_stack() {
                poison::mark_dead(base, len);
                Self::release(ManuallyDrop::take(&mut self.data.heap), &self.raw);
            }
        }
    }
}

impl<T: Clone, const N: usize> Clone for HybridVec<T, N> {
    fn clone(&self) -> Self {
        Self::from_slice(self.as_slice())
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign_from_slice(source.as_slice());
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for HybridVec<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_slice(), f)
    }
}

impl<T, const N: usize> Default for HybridVec<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, U, const N: usize, const M: usize> PartialEq<HybridVec<U, M>> for HybridVec<T, N>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &HybridVec<U, M>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, U, const N: usize> PartialEq<[U]> for HybridVec<T, N>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U, const N: usize> PartialEq<&[U]> for HybridVec<T, N>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, const N: usize, const M: usize> PartialEq<[U; M]> for HybridVec<T, N>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; M]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, U, const N: usize> PartialEq<std::vec::Vec<U>> for HybridVec<T, N>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &std::vec::Vec<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, const N: usize> Eq for HybridVec<T, N> {}

impl<T: PartialOrd, const N: usize, const M: usize> PartialOrd<HybridVec<T, M>> for HybridVec<T, N> {
    fn partial_cmp(&self, other: &HybridVec<T, M>) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord, const N: usize> Ord for HybridVec<T, N> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: Hash, const N: usize> Hash for HybridVec<T, N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T, const N: usize> AsRef<[T]> for HybridVec<T, N> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize> AsMut<[T]> for HybridVec<T, N> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, const N: usize> Borrow<[T]> for HybridVec<T, N> {
    fn borrow(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize> BorrowMut<[T]> for HybridVec<T, N> {
    fn borrow_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, I: SliceIndex<[T]>, const N: usize> Index<I> for HybridVec<T, N> {
    type Output = I::Output;
    #[inline(always)]
    fn index(&self, index: I) -> &Self::Output {
        Index::index(self.as_slice(), index)
    }
}

impl<T, I: SliceIndex<[T]>, const N: usize> IndexMut<I> for HybridVec<T, N> {
    #[inline(always)]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(self.as_mut_slice(), index)
    }
}

/// Allocation failure goes to `handle_alloc_error`; reserve with
/// [`HybridVec::try_reserve`] first to handle it instead.
impl<T, const N: usize> Extend<T> for HybridVec<T, N> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iterable: I) {
        let mut iter = iterable.into_iter();
        let (lower, _) = iter.size_hint();
        self.extend_exact(&mut iter, lower);
        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T: Copy + 'a, const N: usize> Extend<&'a T> for HybridVec<T, N> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iterable: I) {
        self.extend(iterable.into_iter().copied());
    }
}

impl<T, const N: usize> FromIterator<T> for HybridVec<T, N> {
    fn from_iter<I: IntoIterator<Item = T>>(iterable: I) -> Self {
        let mut vec = HybridVec::new();
        vec.extend(iterable);
        vec
    }
}

impl<T, const N: usize, const M: usize> From<[T; M]> for HybridVec<T, N> {
    fn from(array: [T; M]) -> Self {
        let array = ManuallyDrop::new(array);
        let mut vec = Self::with_capacity(M);
        unsafe {
            ptr::copy_nonoverlapping(array.as_ptr(), vec.as_mut_ptr(), M);
            vec.len = M;
        }
        vec
    }
}

impl<T: Clone, const N: usize> From<&[T]> for HybridVec<T, N> {
    fn from(slice: &[T]) -> Self {
        Self::from_slice(slice)
    }
}

impl<T, const N: usize> From<std::vec::Vec<T>> for HybridVec<T, N> {
    /// Adopts the buffer of `vec` when its elements do not fit inline.
    fn from(vec: std::vec::Vec<T>) -> Self {
        let mut vec = ManuallyDrop::new(vec);
        let len = vec.len();
        let mut this = Self::new();
        unsafe {
            vec.set_len(0);
            if len <= N {
                ptr::copy_nonoverlapping(vec.as_ptr(), this.as_mut_ptr(), len);
                this.len = len;
                drop(ManuallyDrop::into_inner(vec));
            } else {
                let capacity = vec.capacity();
                poison::mark_dead(vec.as_mut_ptr().add(len), capacity - len);
                this.data = VecData { heap: vec };
                this.capacity = capacity;
                this.len = len;
            }
        }
        this
    }
}

impl<T, const N: usize> From<HybridVec<T, N>> for std::vec::Vec<T> {
    fn from(vec: HybridVec<T, N>) -> Self {
        vec.into_vec()
    }
}

impl<T, const N: usize> IntoIterator for HybridVec<T, N> {
    type Item = T;
    type IntoIter = IntoIter<T, N>;

    fn into_iter(mut self) -> Self::IntoIter {
        let len = self.len;
        self.len = 0;
        IntoIter::new(self, len)
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a HybridVec<T, N> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a mut HybridVec<T, N> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

/// Creates a [`HybridVec`] from a list of elements or from `value; count`.
///
/// ```rust
/// use hybrid_vec::{hybrid_vec, HybridVec};
///
/// let v: HybridVec<i32, 4> = hybrid_vec![1, 2, 3];
/// assert_eq!(v, [1, 2, 3]);
///
/// let zeros: HybridVec<u8, 4> = hybrid_vec![0; 8];
/// assert!(!zeros.is_on_stack());
/// ```
#[macro_export]
macro_rules! hybrid_vec {
    () => {
        $crate::HybridVec::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::HybridVec::from_elem($elem, $n)
    };
    ($($x:expr),+ $(,)?) => {
        $crate::HybridVec::from([$($x),+])
    };
}

// --- Test Suite ---

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Counts clones and drops through shared cells.
    #[derive(Debug)]
    struct Tracked {
        value: i32,
        clones: Rc<Cell<usize>>,
        drops: Rc<Cell<usize>>,
    }

    impl Tracked {
        fn new(value: i32, clones: &Rc<Cell<usize>>, drops: &Rc<Cell<usize>>) -> Self {
            Tracked {
                value,
                clones: clones.clone(),
                drops: drops.clone(),
            }
        }
    }

    impl Clone for Tracked {
        fn clone(&self) -> Self {
            self.clones.set(self.clones.get() + 1);
            Tracked {
                value: self.value,
                clones: self.clones.clone(),
                drops: self.drops.clone(),
            }
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    fn counters() -> (Rc<Cell<usize>>, Rc<Cell<usize>>) {
        (Rc::new(Cell::new(0)), Rc::new(Cell::new(0)))
    }

    #[test]
    fn test_vec_stack_push_pop_basic() {
        let mut vec: HybridVec<i32, 4> = HybridVec::new();
        vec.push(1);
        vec.push(2);
        vec.push(3);
        assert!(vec.is_on_stack());
        assert_eq!(vec.len(), 3);
        assert_eq!(vec[0], 1);
        assert_eq!(vec.pop(), Some(3));
        assert_eq!(vec.len(), 2);
    }

    #[test]
    fn test_vec_scenario_fill_inline_exactly() {
        let mut v: HybridVec<i32, 4> = HybridVec::new();
        for i in 1..=4 {
            v.push(i);
        }
        assert_eq!(v.storage_mode(), StorageMode::Inline);
        assert_eq!(v.len(), 4);
        assert_eq!(v.capacity(), 4);

        v.push(5);
        assert_eq!(v.storage_mode(), StorageMode::Heap);
        assert_eq!(v.len(), 5);
        assert!(v.capacity() >= 5);
        assert_eq!(v, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_vec_spill_uses_geometric_growth() {
        let mut v: HybridVec<u64, 4> = HybridVec::from([1, 2, 3, 4]);
        v.push(5);
        assert_eq!(v.capacity(), 4 + 1 + 2);
        v.extend([6, 7, 8]);
        assert_eq!(v.capacity(), 7 + 1 + 3);
    }

    #[test]
    fn test_vec_spill_trigger_on_insert() {
        let mut vec: HybridVec<i32, 2> = HybridVec::new();
        vec.push(1);
        vec.push(3);
        vec.insert(1, 2);
        assert!(!vec.is_on_stack());
        assert_eq!(vec.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_vec_insert_front_of_full_grows() {
        let mut vec: HybridVec<i32, 3> = HybridVec::from([2, 3, 4]);
        vec.insert(0, 1);
        assert!(!vec.is_on_stack());
        assert_eq!(vec, [1, 2, 3, 4]);
    }

    #[test]
    fn test_vec_scenario_insert_strings() {
        let mut v: HybridVec<String, 2> = HybridVec::from(["a".to_string(), "c".to_string()]);
        v.insert(1, "b".to_string());
        assert_eq!(v, ["a", "b", "c"]);
    }

    #[test]
    fn test_vec_insert_strings_heap_without_realloc() {
        let mut v: HybridVec<String, 1> = HybridVec::new();
        v.grow(3);
        v.push("aa".to_string());
        v.push("cc".to_string());
        let cap = v.capacity();
        let pos = v.iter().position(|s| s == "cc").unwrap();
        v.insert(pos, "bb".to_string());
        assert_eq!(v.capacity(), cap);
        assert_eq!(v, ["aa", "bb", "cc"]);
    }

    #[test]
    fn test_vec_insert_strings_heap_with_realloc() {
        let mut v: HybridVec<String, 2> = HybridVec::new();
        v.grow(3);
        v.push("aa".to_string());
        v.push("cc".to_string());
        v.push("dd".to_string());
        v.insert(1, "bb".to_string());
        assert!(v.capacity() >= 4);
        assert_eq!(v, ["aa", "bb", "cc", "dd"]);
    }

    #[test]
    fn test_vec_stack_insert_remove_swap() {
        let mut vec: HybridVec<i32, 4> = HybridVec::from_iter([10, 20, 30]);
        vec.insert(1, 15);
        assert_eq!(vec[1], 15);
        let removed = vec.remove(2);
        assert_eq!(removed, 20);
        assert_eq!(vec.as_slice(), &[10, 15, 30]);
        vec.push(40);
        let swapped = vec.swap_remove(0);
        assert_eq!(swapped, 10);
        assert_eq!(vec.as_slice(), &[40, 15, 30]);
    }

    #[test]
    fn test_vec_swap_remove_last_drops_once() {
        let (clones, drops) = counters();
        let mut v: HybridVec<Tracked, 2> = HybridVec::new();
        v.push(Tracked::new(1, &clones, &drops));
        v.push(Tracked::new(2, &clones, &drops));
        let last = v.swap_remove(1);
        assert_eq!(last.value, 2);
        assert_eq!(drops.get(), 0);
        drop(last);
        drop(v);
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn test_vec_scenario_erase_middle() {
        let mut v: HybridVec<i32, 3> = hybrid_vec![1, 2, 3, 4, 5];
        let at = v.erase(1..3);
        assert_eq!(at, 1);
        assert_eq!(v, [1, 4, 5]);
        assert_eq!(v.len(), 3);
        assert_eq!(v[at], 4);
    }

    #[test]
    fn test_vec_erase_everything_keeps_storage() {
        let mut v: HybridVec<i32, 2> = hybrid_vec![1, 2, 3, 4];
        let cap = v.capacity();
        v.erase(..);
        assert!(v.is_empty());
        assert_eq!(v.storage_mode(), StorageMode::Heap);
        assert_eq!(v.capacity(), cap);

        let mut s: HybridVec<i32, 4> = hybrid_vec![1, 2];
        s.erase(0..2);
        assert!(s.is_empty());
        assert!(s.is_on_stack());
    }

    #[test]
    fn test_vec_erase_empty_range_is_noop() {
        let mut v: HybridVec<i32, 4> = hybrid_vec![1, 2, 3];
        assert_eq!(v.erase(2..2), 2);
        assert_eq!(v, [1, 2, 3]);
    }

    #[test]
    fn test_vec_erase_drops_removed_elements() {
        let (clones, drops) = counters();
        let mut v: HybridVec<Tracked, 2> = (0..5).map(|i| Tracked::new(i, &clones, &drops)).collect();
        v.erase(1..=2);
        assert_eq!(drops.get(), 2);
        assert_eq!(v.iter().map(|t| t.value).collect::<Vec<_>>(), vec![0, 3, 4]);
        drop(v);
        assert_eq!(drops.get(), 5);
        assert_eq!(clones.get(), 0);
    }

    #[test]
    #[should_panic(expected = "erase range end")]
    fn test_vec_erase_past_end_panics() {
        let mut v: HybridVec<i32, 4> = hybrid_vec![1, 2];
        v.erase(1..3);
    }

    #[test]
    #[should_panic(expected = "erase range starts at 2 but ends at 1")]
    fn test_vec_erase_inverted_range_panics() {
        let mut v: HybridVec<i32, 4> = hybrid_vec![1, 2, 3];
        #[allow(clippy::reversed_empty_ranges)]
        v.erase(2..1);
    }

    #[test]
    fn test_vec_scenario_take_leaves_empty() {
        let mut a: HybridVec<i32, 2> = hybrid_vec![1, 2, 3, 4];
        let b = a.take();
        assert_eq!(b, [1, 2, 3, 4]);
        assert_eq!(a.len(), 0);
        assert!(a.is_on_stack());
        assert_eq!(a.capacity(), 2);
        a.push(9);
        assert_eq!(a, [9]);
    }

    #[test]
    fn test_vec_scenario_swap_heap_buffers_without_clones() {
        let (clones, drops) = counters();
        let mut a: HybridVec<Tracked, 1> = (0..3).map(|i| Tracked::new(i, &clones, &drops)).collect();
        let mut b: HybridVec<Tracked, 1> = (10..12).map(|i| Tracked::new(i, &clones, &drops)).collect();
        let a_ptr = a.as_ptr();
        let b_ptr = b.as_ptr();
        a.swap_with(&mut b);
        assert_eq!(clones.get(), 0);
        assert_eq!(drops.get(), 0);
        assert_eq!(a.as_ptr(), b_ptr);
        assert_eq!(b.as_ptr(), a_ptr);
        assert_eq!(a.iter().map(|t| t.value).collect::<Vec<_>>(), vec![10, 11]);
        assert_eq!(b.iter().map(|t| t.value).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_vec_swap_mixed_storage() {
        let mut a: HybridVec<String, 2> = HybridVec::from(["x".to_string()]);
        let mut b: HybridVec<String, 2> = ["p", "q", "r"].iter().map(|s| s.to_string()).collect();
        a.swap_with(&mut b);
        assert!(!a.is_on_stack());
        assert!(b.is_on_stack());
        assert_eq!(a, ["p", "q", "r"]);
        assert_eq!(b, ["x"]);
    }

    #[test]
    fn test_vec_any_storage_retain() {
        let mut vec: HybridVec<i32, 8> = HybridVec::from_iter(0..10);
        assert!(!vec.is_on_stack());
        vec.retain(|&x| x % 2 == 0);
        assert_eq!(vec.as_slice(), &[0, 2, 4, 6, 8]);
        let mut vec_stack: HybridVec<i32, 8> = HybridVec::from_iter(0..6);
        assert!(vec_stack.is_on_stack());
        vec_stack.retain(|&x| x % 2 != 0);
        assert_eq!(vec_stack.as_slice(), &[1, 3, 5]);
    }

    #[test]
    fn test_vec_retain_panic_keeps_vector_consistent() {
        let (clones, drops) = counters();
        let mut v: HybridVec<Tracked, 2> = (0..6).map(|i| Tracked::new(i, &clones, &drops)).collect();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            v.retain(|t| {
                assert!(t.value != 3, "boom");
                t.value % 2 == 0
            });
        }));
        assert!(result.is_err());
        // 1 was dropped before the panic, 3.. were never visited
        assert_eq!(v.iter().map(|t| t.value).collect::<Vec<_>>(), vec![0, 2, 3, 4, 5]);
        assert_eq!(drops.get(), 1);
        drop(v);
        assert_eq!(drops.get(), 6);
    }

    #[test]
    fn test_vec_dedup_variants() {
        let mut v: HybridVec<i32, 4> = hybrid_vec![1, 1, 2, 3, 3, 3, 4, 1];
        v.dedup();
        assert_eq!(v, [1, 2, 3, 4, 1]);

        let mut words: HybridVec<&str, 4> = hybrid_vec!["a", "A", "b", "B", "c"];
        words.dedup_by_key(|s| s.to_ascii_lowercase());
        assert_eq!(words, ["a", "b", "c"]);
    }

    #[test]
    fn test_vec_any_storage_resize_clone() {
        let mut vec: HybridVec<i32, 4> = HybridVec::new();
        vec.resize(2, 0);
        assert!(vec.is_on_stack());
        let vec2 = vec.clone();
        assert_eq!(vec, vec2);
        vec.resize(10, 5);
        assert!(!vec.is_on_stack());
        assert_eq!(vec.len(), 10);
        assert_eq!(vec[9], 5);
        vec.resize(1, 7);
        assert_eq!(vec, [0]);
    }

    #[test]
    fn test_vec_resize_with_and_default() {
        let mut n = 0;
        let mut v: HybridVec<i32, 2> = HybridVec::new();
        v.resize_with(4, || {
            n += 1;
            n
        });
        assert_eq!(v, [1, 2, 3, 4]);
        v.resize_default(6);
        assert_eq!(v, [1, 2, 3, 4, 0, 0]);
    }

    #[test]
    fn test_vec_clone_is_deep() {
        let a: HybridVec<String, 1> = hybrid_vec!["x".to_string(), "y".to_string()];
        let mut b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a.as_ptr(), b.as_ptr());
        b[0].push('!');
        b.push("z".to_string());
        assert_eq!(a, ["x", "y"]);
        assert_eq!(b, ["x!", "y", "z"]);
    }

    #[test]
    fn test_vec_clone_fits_inline_again() {
        let mut a: HybridVec<i32, 4> = hybrid_vec![1, 2, 3, 4, 5];
        a.pop();
        assert!(!a.is_on_stack());
        let b = a.clone();
        assert!(b.is_on_stack());
        assert_eq!(b, [1, 2, 3, 4]);
    }

    #[test]
    fn test_vec_clone_from_reuses_live_slots() {
        let (clones, drops) = counters();
        let src: HybridVec<Tracked, 4> = (0..3).map(|i| Tracked::new(i, &clones, &drops)).collect();
        let mut dst: HybridVec<Tracked, 4> = (10..14).map(|i| Tracked::new(i, &clones, &drops)).collect();
        dst.clone_from(&src);
        assert_eq!(dst.iter().map(|t| t.value).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(clones.get(), 3);
        // three overwritten by assignment, one truncated
        assert_eq!(drops.get(), 4);
    }

    #[test]
    fn test_vec_assign_variants() {
        let mut v: HybridVec<i32, 4> = hybrid_vec![9, 9, 9];
        v.assign_n(2, 1);
        assert_eq!(v, [1, 1]);
        v.assign_n(6, 2);
        assert_eq!(v, [2; 6]);
        assert_eq!(v.capacity(), 6);

        v.assign_from_slice(&[1, 2, 3]);
        assert_eq!(v, [1, 2, 3]);
        assert_eq!(v.capacity(), 6);

        v.assign_iter((0..4).filter(|x| x % 2 == 1));
        assert_eq!(v, [1, 3]);
        v.assign_iter(0..10);
        assert_eq!(v.len(), 10);
        assert_eq!(v[9], 9);
    }

    #[test]
    fn test_vec_insert_n_and_slice() {
        let mut v: HybridVec<i32, 4> = hybrid_vec![1, 5];
        assert_eq!(v.insert_n(1, 3, 0), 1);
        assert_eq!(v, [1, 0, 0, 0, 5]);
        assert_eq!(v.insert_from_slice(5, &[6, 7]), 5);
        assert_eq!(v, [1, 0, 0, 0, 5, 6, 7]);
        v.insert_from_slice(0, &[]);
        assert_eq!(v.len(), 7);
    }

    #[test]
    fn test_vec_insert_many_gap_partly_in_raw_storage() {
        let mut v: HybridVec<String, 8> = ["a", "e"].iter().map(|s| s.to_string()).collect();
        let idx = v.insert_many(1, ["b", "c", "d"].iter().map(|s| s.to_string()));
        assert_eq!(idx, 1);
        assert!(v.is_on_stack());
        assert_eq!(v, ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_vec_insert_many_without_size_hint() {
        let mut v: HybridVec<i32, 2> = hybrid_vec![0, 100];
        v.insert_many(1, (1..=20).filter(|x| x % 5 == 0));
        assert_eq!(v, [0, 5, 10, 15, 20, 100]);
    }

    #[test]
    fn test_vec_insert_many_lying_size_hint_closes_gap() {
        struct Liar(std::ops::Range<i32>);
        impl Iterator for Liar {
            type Item = i32;
            fn next(&mut self) -> Option<i32> {
                self.0.next()
            }
            fn size_hint(&self) -> (usize, Option<usize>) {
                (10, None)
            }
        }
        let mut v: HybridVec<i32, 4> = hybrid_vec![0, 9];
        v.insert_many(1, Liar(1..3));
        assert_eq!(v, [0, 1, 2, 9]);
    }

    #[test]
    fn test_vec_insert_many_panicking_iterator_keeps_tail() {
        let (clones, drops) = counters();
        let mut v: HybridVec<Tracked, 4> = (0..3).map(|i| Tracked::new(i, &clones, &drops)).collect();
        let c = clones.clone();
        let d = drops.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            v.insert_many(
                1,
                (100..104).map(|i| {
                    assert!(i != 102, "boom");
                    Tracked::new(i, &c, &d)
                }),
            );
        }));
        assert!(result.is_err());
        assert_eq!(
            v.iter().map(|t| t.value).collect::<Vec<_>>(),
            vec![0, 100, 101, 1, 2]
        );
        drop(v);
        assert_eq!(drops.get(), 5);
    }

    #[test]
    fn test_vec_resize_panicking_clone_keeps_written() {
        struct Bomb(Rc<Cell<usize>>);
        impl Clone for Bomb {
            fn clone(&self) -> Self {
                let n = self.0.get();
                assert!(n < 2, "boom");
                self.0.set(n + 1);
                Bomb(self.0.clone())
            }
        }
        let count = Rc::new(Cell::new(0));
        let mut v: HybridVec<Bomb, 2> = HybridVec::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            v.resize(6, Bomb(count.clone()));
        }));
        assert!(result.is_err());
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn test_vec_drain_middle() {
        let mut v: HybridVec<i32, 4> = hybrid_vec![1, 2, 3, 4, 5, 6];
        let drained: Vec<i32> = v.drain(1..4).collect();
        assert_eq!(drained, vec![2, 3, 4]);
        assert_eq!(v, [1, 5, 6]);
    }

    #[test]
    fn test_vec_drain_partially_consumed() {
        let (clones, drops) = counters();
        let mut v: HybridVec<Tracked, 2> = (0..6).map(|i| Tracked::new(i, &clones, &drops)).collect();
        {
            let mut d = v.drain(2..5);
            assert_eq!(d.len(), 3);
            assert_eq!(d.next_back().map(|t| t.value), Some(4));
            assert_eq!(d.as_slice().len(), 2);
        }
        assert_eq!(drops.get(), 3);
        assert_eq!(v.iter().map(|t| t.value).collect::<Vec<_>>(), vec![0, 1, 5]);
    }

    #[test]
    fn test_vec_leaked_drain_leaks_tail_only() {
        let mut v: HybridVec<String, 2> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        mem::forget(v.drain(1..2));
        assert_eq!(v, ["a"]);
    }

    #[test]
    fn test_vec_push_after_forgotten_drain() {
        let mut v: HybridVec<u32, 4> = hybrid_vec![1, 2, 3];
        mem::forget(v.drain(1..2));
        v.push(9);
        v.insert(0, 7);
        assert_eq!(v, [7, 1, 9]);
        v.extend([5, 6]);
        assert!(!v.is_on_stack());
        v.push(10);
        assert_eq!(v, [7, 1, 9, 5, 6, 10]);

        let mut heap: HybridVec<u32, 2> = hybrid_vec![1, 2, 3, 4, 5];
        mem::forget(heap.drain(0..2));
        heap.insert_n(0, 2, 8);
        assert_eq!(heap, [8, 8]);
        heap.shrink_to_fit();
        assert!(heap.is_on_stack());
        heap.truncate(1);
        heap.push(3);
        assert_eq!(heap, [8, 3]);
    }

    struct Fuse(bool);

    impl Drop for Fuse {
        fn drop(&mut self) {
            if self.0 {
                panic!("fuse blown");
            }
        }
    }

    #[test]
    fn test_vec_push_after_panicking_drop_in_erase() {
        let mut v: HybridVec<Fuse, 4> = HybridVec::new();
        v.push(Fuse(false));
        v.push(Fuse(true));
        v.push(Fuse(false));
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| v.erase(1..2)));
        assert!(result.is_err());
        assert_eq!(v.len(), 2);
        v.push(Fuse(false));
        v.insert(0, Fuse(false));
        assert_eq!(v.len(), 4);
    }

    #[test]
    fn test_vec_push_after_panicking_drop_in_truncate() {
        let mut v: HybridVec<Fuse, 2> = HybridVec::new();
        v.push(Fuse(false));
        v.push(Fuse(true));
        v.push(Fuse(false));
        v.push(Fuse(false));
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| v.truncate(1)));
        assert!(result.is_err());
        assert_eq!(v.len(), 1);
        v.push(Fuse(false));
        v.extend([Fuse(false), Fuse(false)]);
        assert_eq!(v.len(), 4);
    }

    #[test]
    fn test_vec_shrink_to_fit_demotes() {
        let mut v: HybridVec<i32, 4> = HybridVec::with_capacity(10);
        assert!(!v.is_on_stack());
        v.push(1);
        v.shrink_to_fit();
        assert!(v.is_on_stack());
        assert_eq!(v.capacity(), 4);
        assert_eq!(v, [1]);

        let mut v_stack: HybridVec<i32, 4> = HybridVec::new();
        v_stack.push(1);
        v_stack.shrink_to_fit();
        assert_eq!(v_stack.capacity(), 4);
    }

    #[test]
    fn test_vec_shrink_to_fit_exact_heap() {
        let mut v: HybridVec<i32, 2> = HybridVec::with_capacity(16);
        v.extend(0..5);
        v.shrink_to_fit();
        assert_eq!(v.capacity(), 5);
        assert!(!v.is_on_stack());
        let cap = v.capacity();
        v.shrink_to_fit();
        assert_eq!(v.capacity(), cap);
        assert_eq!(v, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_vec_grow_never_shrinks() {
        let mut v: HybridVec<i32, 4> = HybridVec::new();
        v.grow(2);
        assert_eq!(v.capacity(), 4);
        v.grow(9);
        assert_eq!(v.capacity(), 9);
        v.grow(5);
        assert_eq!(v.capacity(), 9);
    }

    #[test]
    fn test_vec_try_reserve_overflow_leaves_vector_untouched() {
        let mut v: HybridVec<u32, 2> = hybrid_vec![1, 2, 3];
        let cap = v.capacity();
        assert_eq!(v.try_reserve(usize::MAX), Err(AllocError::CapacityOverflow));
        assert!(matches!(v.try_grow(usize::MAX / 2), Err(AllocError::CapacityOverflow)));
        assert_eq!(v.capacity(), cap);
        assert_eq!(v, [1, 2, 3]);
        assert!(v.try_push(4).is_ok());
    }

    #[test]
    fn test_vec_try_grow_refused_by_allocator_leaves_vector_untouched() {
        let huge = isize::MAX as usize;
        let mut v: HybridVec<u8, 4> = hybrid_vec![1, 2, 3];
        match v.try_grow(huge) {
            Err(AllocError::AllocFailed { layout, .. }) => assert_eq!(layout.size(), huge),
            other => panic!("expected an allocator refusal, got {other:?}"),
        }
        assert!(v.is_on_stack());
        assert_eq!(v.capacity(), 4);
        assert_eq!(v, [1, 2, 3]);

        let mut heap: HybridVec<u8, 4> = hybrid_vec![1, 2, 3, 4, 5, 6];
        let (ptr, cap) = (heap.as_ptr(), heap.capacity());
        assert!(matches!(heap.try_grow(huge), Err(AllocError::AllocFailed { .. })));
        assert_eq!(heap.as_ptr(), ptr);
        assert_eq!(heap.capacity(), cap);
        assert_eq!(heap, [1, 2, 3, 4, 5, 6]);
        heap.push(7);
        assert_eq!(heap.len(), 7);
    }

    #[test]
    fn test_vec_try_reserve_then_growing_inserts_keep_buffer() {
        let mut v: HybridVec<u8, 4> = hybrid_vec![1, 2, 3];
        assert!(v.try_reserve(14).is_ok());
        let (ptr, cap) = (v.as_ptr(), v.capacity());
        v.insert_n(1, 10, 0);
        v.insert_from_slice(0, &[9, 9]);
        v.extend_from_slice(&[4, 5]);
        assert_eq!(v.len(), 17);
        assert_eq!(v.as_ptr(), ptr);
        assert_eq!(v.capacity(), cap);
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn test_vec_reserve_overflow_panics() {
        let mut v: HybridVec<u32, 2> = HybridVec::new();
        v.reserve(usize::MAX);
    }

    #[test]
    fn test_vec_any_storage_drop_behavior() {
        let counter = Rc::new(Cell::new(0));
        struct Dropper(Rc<Cell<i32>>);
        impl Drop for Dropper {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }
        {
            let mut vec: HybridVec<Dropper, 2> = HybridVec::new();
            vec.push(Dropper(counter.clone()));
            vec.push(Dropper(counter.clone()));
        }
        assert_eq!(counter.get(), 2);
        counter.set(0);
        {
            let mut vec: HybridVec<Dropper, 2> = HybridVec::new();
            vec.push(Dropper(counter.clone()));
            vec.push(Dropper(counter.clone()));
            vec.push(Dropper(counter.clone()));
        }
        assert_eq!(counter.get(), 3);
    }

    #[test]
    fn test_vec_relocation_never_clones() {
        let (clones, drops) = counters();
        let mut v: HybridVec<Tracked, 2> = HybridVec::new();
        for i in 0..20 {
            v.insert(0, Tracked::new(i, &clones, &drops));
        }
        v.truncate(2);
        v.shrink_to_fit();
        assert!(v.is_on_stack());
        assert_eq!(clones.get(), 0);
        assert_eq!(drops.get(), 18);
    }

    #[test]
    fn test_vec_front_back() {
        let mut v: HybridVec<i32, 2> = hybrid_vec![1, 2, 3];
        assert_eq!(*v.front(), 1);
        assert_eq!(*v.back(), 3);
        *v.front_mut() = 10;
        *v.back_mut() = 30;
        assert_eq!(v, [10, 2, 30]);
    }

    #[test]
    #[should_panic(expected = "back() called on an empty HybridVec")]
    fn test_vec_back_on_empty_panics() {
        let v: HybridVec<i32, 2> = HybridVec::new();
        v.back();
    }

    #[test]
    #[should_panic(expected = "insertion index")]
    fn test_vec_any_storage_insert_panic() {
        let mut v: HybridVec<i32, 4> = HybridVec::new();
        v.insert(1, 10);
    }

    #[test]
    #[should_panic(expected = "removal index")]
    fn test_vec_any_storage_remove_panic() {
        let mut v: HybridVec<i32, 4> = HybridVec::from_iter([1]);
        v.remove(1);
    }

    #[test]
    #[should_panic(expected = "swap_remove index")]
    fn test_vec_any_storage_swap_remove_panic() {
        let mut v: HybridVec<i32, 4> = HybridVec::from_iter([1]);
        v.swap_remove(1);
    }

    #[test]
    #[should_panic]
    fn test_vec_index_out_of_bounds_panics() {
        let v: HybridVec<i32, 4> = hybrid_vec![1, 2];
        let _ = v[2];
    }

    #[test]
    fn test_vec_index_ranges() {
        let mut v: HybridVec<i32, 4> = hybrid_vec![1, 2, 3, 4, 5];
        assert_eq!(&v[1..3], &[2, 3]);
        assert_eq!(&v[..], &[1, 2, 3, 4, 5]);
        v[3..].copy_from_slice(&[40, 50]);
        assert_eq!(v, [1, 2, 3, 40, 50]);
    }

    #[test]
    fn test_vec_append_and_split_off() {
        let mut a: HybridVec<i32, 2> = hybrid_vec![1, 2];
        let mut b: HybridVec<i32, 8> = hybrid_vec![3, 4, 5];
        a.append(&mut b);
        assert_eq!(a, [1, 2, 3, 4, 5]);
        assert!(b.is_empty());

        let tail = a.split_off(3);
        assert_eq!(a, [1, 2, 3]);
        assert_eq!(tail, [4, 5]);
        assert!(tail.is_on_stack());
    }

    #[test]
    fn test_vec_into_vec_move() {
        let v: HybridVec<i32, 4> = HybridVec::from_iter([1, 2, 3]);
        assert_eq!(v.into_vec(), vec![1, 2, 3]);

        let v_heap: HybridVec<i32, 2> = hybrid_vec![1, 2, 3];
        let ptr = v_heap.as_ptr();
        let std_v = v_heap.into_vec();
        assert_eq!(std_v.as_ptr(), ptr);
        assert_eq!(std_v, vec![1, 2, 3]);

        let boxed = HybridVec::<i32, 2>::from_iter(0..3).into_boxed_slice();
        assert_eq!(&*boxed, &[0, 1, 2]);
    }

    #[test]
    fn test_vec_from_std_vec() {
        let small: HybridVec<String, 4> = HybridVec::from(vec!["a".to_string()]);
        assert!(small.is_on_stack());
        assert_eq!(small, ["a"]);

        let source: Vec<i32> = (0..10).collect();
        let ptr = source.as_ptr();
        let big: HybridVec<i32, 4> = HybridVec::from(source);
        assert!(!big.is_on_stack());
        assert_eq!(big.as_ptr(), ptr);
        assert_eq!(big.len(), 10);
    }

    #[test]
    fn test_vec_traits_into_iter_basic() {
        let vec: HybridVec<i32, 4> = HybridVec::from_iter([1, 2, 3]);
        let collected: Vec<i32> = vec.into_iter().map(|x| x * 2).collect();
        assert_eq!(collected, vec![2, 4, 6]);
    }

    #[test]
    fn test_vec_traits_ordering() {
        let a: HybridVec<i32, 4> = hybrid_vec![1, 2, 3];
        let b: HybridVec<i32, 4> = hybrid_vec![1, 2, 4];
        let c: HybridVec<i32, 1> = hybrid_vec![1, 2];
        assert!(a < b);
        assert_eq!(a.cmp(&b), Ordering::Less);
        assert!(a > c);
        assert_eq!(a.partial_cmp(&c), Some(Ordering::Greater));
        let narrow: HybridVec<i32, 1> = hybrid_vec![1, 2, 3];
        assert!(a == narrow);
        assert_eq!(a, vec![1, 2, 3]);
        assert_eq!(a, &[1, 2, 3][..]);
    }

    #[test]
    fn test_vec_traits_exhaustive() {
        let mut v: HybridVec<i32, 4> = HybridVec::from_iter([3, 1, 2]);

        let mut s = std::collections::hash_map::DefaultHasher::new();
        v.hash(&mut s);
        let mut t = std::collections::hash_map::DefaultHasher::new();
        [3, 1, 2][..].hash(&mut t);
        assert_eq!(s.finish(), t.finish());

        let _: &[i32] = v.as_ref();
        let _: &mut [i32] = v.as_mut();
        let b: &[i32] = v.borrow();
        assert_eq!(b, &[3, 1, 2]);
        let b_mut: &mut [i32] = v.borrow_mut();
        b_mut[0] = 10;
        assert_eq!(v, [10, 1, 2]);

        v.extend(&[7, 8]);
        assert_eq!(format!("{:?}", v), "[10, 1, 2, 7, 8]");

        let def: HybridVec<i32, 4> = HybridVec::default();
        assert!(def.is_empty());

        for x in &mut v {
            *x += 1;
        }
        assert_eq!((&v).into_iter().rev().next(), Some(&9));
    }

    #[test]
    fn test_vec_zero_inline_capacity() {
        let mut v: HybridVec<i32, 0> = HybridVec::new();
        assert_eq!(v.capacity(), 0);
        assert!(v.is_on_stack());
        v.push(1);
        assert!(!v.is_on_stack());
        v.clear();
        v.shrink_to_fit();
        assert!(v.is_on_stack());
        assert_eq!(v.capacity(), 0);
    }

    #[test]
    fn test_vec_zero_sized_elements() {
        let mut v: HybridVec<(), 2> = HybridVec::new();
        for _ in 0..100 {
            v.push(());
        }
        assert_eq!(v.len(), 100);
        assert!(!v.is_on_stack());
        v.truncate(1);
        v.shrink_to_fit();
        assert!(v.is_on_stack());
        assert_eq!(v.into_iter().count(), 1);
    }

    #[test]
    fn test_vec_raw_slots_stay_poisoned() {
        let mut v: HybridVec<u32, 4> = hybrid_vec![1, 2, 3, 4, 5, 6];
        v.remove(0);
        v.erase(1..3);
        assert_eq!(v.raw, poison::RawRegion::verified());
        v.insert(1, 7);
        v.retain(|&x| x != 7);
        v.shrink_to_fit();
        v.debug_validate();
        assert_eq!(v, [2, 5, 6]);
    }
}
