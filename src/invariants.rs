//! Debug-build assertions on the counter protocol.
//!
//! These compile to nothing in release builds. They check the properties the
//! ring relies on: occupancy never exceeds capacity, counters only move
//! forward, and the consumer only touches slots the producer has published.

/// Occupancy after a commit must not exceed capacity.
macro_rules! debug_assert_bounded_count {
    ($count:expr, $capacity:expr) => {
        debug_assert!(
            $count <= $capacity,
            "ring holds {} items but capacity is {}",
            $count,
            $capacity
        )
    };
}

/// The consumer must not advance past what the producer has published.
macro_rules! debug_assert_head_not_past_tail {
    ($new_head:expr, $tail:expr) => {
        debug_assert!(
            $new_head <= $tail,
            "advancing head to {} past tail {}",
            $new_head,
            $tail
        )
    };
}

/// Head and tail are monotone; a decrease means a protocol bug.
macro_rules! debug_assert_monotonic {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "{} moved backwards from {} to {}",
            $name,
            $old,
            $new
        )
    };
}

/// Every consumed slot must lie in the published window `[head, tail)`.
macro_rules! debug_assert_published_read {
    ($pos:expr, $head:expr, $tail:expr) => {
        debug_assert!(
            $pos >= $head && $pos < $tail,
            "reading slot at counter {} outside published window [{}, {})",
            $pos,
            $head,
            $tail
        )
    };
}

pub(crate) use debug_assert_bounded_count;
pub(crate) use debug_assert_head_not_past_tail;
pub(crate) use debug_assert_monotonic;
pub(crate) use debug_assert_published_read;
