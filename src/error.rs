//! Errors reported by the fallible (`try_*`) allocation APIs.

use core::alloc::Layout;
use std::collections::TryReserveError;

use thiserror::Error;

/// Why a heap buffer could not be obtained.
///
/// Returned before any live element is touched, so the container that reported it is
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
    /// The requested capacity overflows `usize`, or the buffer would exceed `isize::MAX`
    /// bytes.
    #[error("capacity overflow")]
    CapacityOverflow,
    /// The allocator refused the request.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    AllocFailed {
        /// The layout that was requested.
        layout: Layout,
        #[source]
        source: TryReserveError,
    },
}

/// Converts a fallible allocation result into the behaviour of the infallible APIs:
/// overflow panics, allocator failure goes through the global alloc error handler.
#[inline]
pub(crate) fn infallible<T>(result: Result<T, AllocError>) -> T {
    match result {
        Ok(x) => x,
        Err(AllocError::CapacityOverflow) => panic!("capacity overflow"),
        Err(AllocError::AllocFailed { layout, .. }) => std::alloc::handle_alloc_error(layout),
    }
}
