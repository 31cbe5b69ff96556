//! Dead-memory instrumentation for raw slots.
//!
//! When enabled (the `poison` feature, or the crate's own unit tests) every slot that
//! stops holding a value is filled with [`DEAD_BYTE`], and slots are checked for that
//! pattern before a value is written into them. A failed check means some code path
//! wrote to raw storage behind the container's back, or forgot to mark a vacated slot.
//!
//! Values leaked by safe code (a forgotten `Drain`, `set_len` shrinking over live
//! values) leave stale bytes in the raw region. [`RawRegion`] records that, and the
//! checks are skipped until the region is known to be poisoned again.
//!
//! Without the feature every function here is an empty `#[inline(always)]` body.

/// The sentinel written over raw slots.
pub const DEAD_BYTE: u8 = 0xAD;

/// Fills `count` slots starting at `ptr` with [`DEAD_BYTE`].
///
/// # Safety
/// `ptr..ptr + count` must be writable and hold no live values.
#[inline(always)]
pub(crate) unsafe fn mark_dead<T>(ptr: *mut T, count: usize) {
    #[cfg(any(test, feature = "poison"))]
    unsafe {
        core::ptr::write_bytes(ptr, DEAD_BYTE, count);
    }
    #[cfg(not(any(test, feature = "poison")))]
    let _ = (ptr, count);
}

/// Panics unless the `count` slots starting at `ptr` hold only [`DEAD_BYTE`].
///
/// # Safety
/// `ptr..ptr + count` must be readable and must have been passed to [`mark_dead`] since
/// the last value was written into it.
#[inline(always)]
pub(crate) unsafe fn assert_dead<T>(ptr: *const T, count: usize) {
    #[cfg(any(test, feature = "poison"))]
    {
        let len = count * core::mem::size_of::<T>();
        let bytes = unsafe { core::slice::from_raw_parts(ptr as *const u8, len) };
        if let Some(offset) = bytes.iter().position(|&b| b != DEAD_BYTE) {
            panic!(
                "raw slot memory at byte offset {} is {:#04x}, expected {:#04x}",
                offset, bytes[offset], DEAD_BYTE
            );
        }
    }
    #[cfg(not(any(test, feature = "poison")))]
    let _ = (ptr, count);
}

/// Whether a container's raw slots are known to carry the poison pattern.
///
/// Zero-sized without the feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawRegion {
    #[cfg(any(test, feature = "poison"))]
    unverified: bool,
}

impl RawRegion {
    #[inline(always)]
    pub(crate) const fn verified() -> Self {
        RawRegion {
            #[cfg(any(test, feature = "poison"))]
            unverified: false,
        }
    }

    /// Stops checking until [`resume`](Self::resume) or [`restore`](Self::restore),
    /// returning the previous state.
    #[inline(always)]
    pub(crate) fn suspend(&mut self) -> RawRegion {
        let previous = *self;
        #[cfg(any(test, feature = "poison"))]
        {
            self.unverified = true;
        }
        previous
    }

    /// Marks the whole region as poisoned again.
    #[inline(always)]
    pub(crate) fn resume(&mut self) {
        *self = RawRegion::verified();
    }

    #[inline(always)]
    pub(crate) fn restore(&mut self, previous: RawRegion) {
        *self = previous;
    }

    /// [`assert_dead`], unless the region is unverified.
    ///
    /// # Safety
    /// Same as [`assert_dead`].
    #[inline(always)]
    pub(crate) unsafe fn assert_dead<T>(&self, ptr: *const T, count: usize) {
        #[cfg(any(test, feature = "poison"))]
        if !self.unverified {
            unsafe { assert_dead(ptr, count) };
        }
        #[cfg(not(any(test, feature = "poison")))]
        let _ = (ptr, count);
    }
}
