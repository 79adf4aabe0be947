//! CPU prefetch hints for the ring hot paths.
//!
//! Reservations prefetch the slot just past the claimed run with write
//! intent; `readable` prefetches the slot past the returned span with read
//! intent. Both are best-effort hints: on x86_64 an invalid address is a
//! no-op and does not fault, and on other targets the functions compile to
//! nothing.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::{_mm_prefetch, _MM_HINT_T0};

/// Hint that `ptr` will be read soon.
#[inline(always)]
#[cfg(target_arch = "x86_64")]
pub(crate) fn prefetch_read<T>(ptr: *const T) {
    // Prefetch never dereferences, so any pointer value is acceptable.
    unsafe { _mm_prefetch(ptr.cast::<i8>(), _MM_HINT_T0) }
}

/// Hint that `ptr` will be written soon.
///
/// Uses the same T0 hint as the read variant: `prefetchw` requires a
/// non-default target feature, and pulling the line into L1 is the part
/// that matters for the ring's access pattern.
#[inline(always)]
#[cfg(target_arch = "x86_64")]
pub(crate) fn prefetch_write<T>(ptr: *const T) {
    unsafe { _mm_prefetch(ptr.cast::<i8>(), _MM_HINT_T0) }
}

#[inline(always)]
#[cfg(not(target_arch = "x86_64"))]
pub(crate) fn prefetch_read<T>(_ptr: *const T) {}

#[inline(always)]
#[cfg(not(target_arch = "x86_64"))]
pub(crate) fn prefetch_write<T>(_ptr: *const T) {}
