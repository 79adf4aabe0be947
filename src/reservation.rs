use crate::Ring;
use std::mem::MaybeUninit;
use thiserror::Error;

/// Returned by [`Reservation::try_commit_n`] when asked to commit more slots
/// than the reservation holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("cannot commit {requested} slots, reservation holds {reserved}")]
pub struct CommitError {
    /// Slots the caller tried to commit.
    pub requested: usize,
    /// Slots actually reserved.
    pub reserved: usize,
}

/// A producer's exclusive claim on a contiguous run of ring slots.
///
/// Obtained from [`Ring::reserve`] (or the producer-handle forwarders), filled
/// in place, and published with [`commit`](Reservation::commit). The claim may
/// be shorter than requested: reservations never span the physical end of the
/// buffer, so a request that would wrap is truncated to the contiguous run.
/// Check [`len`](Reservation::len) before writing.
///
/// Dropping a reservation without committing publishes nothing; the slots are
/// simply handed out again by the next `reserve`. Holding a reservation across
/// another reserve/commit on the same ring violates the producer contract.
///
/// ```
/// use ringlane::{Channel, Config};
///
/// let channel = Channel::<u64>::new(Config::default());
/// let producer = channel.register().unwrap();
///
/// let mut pending = 0u64;
/// if let Some(mut r) = producer.reserve(2) {
///     for (i, slot) in r.as_mut_slice().iter_mut().enumerate() {
///         slot.write(i as u64);
///     }
///     pending = r.len() as u64;
///     r.commit();
/// }
/// assert_eq!(pending, 2);
/// ```
pub struct Reservation<'a, T> {
    slice: &'a mut [MaybeUninit<T>],
    ring: *const Ring<T>,
    pos: u64,
}

impl<'a, T> Reservation<'a, T> {
    pub(crate) fn new(slice: &'a mut [MaybeUninit<T>], ring: *const Ring<T>, pos: u64) -> Self {
        Self { slice, ring, pos }
    }

    /// The writable slots.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [MaybeUninit<T>] {
        self.slice
    }

    /// Number of reserved slots (may be less than requested).
    #[inline]
    pub fn len(&self) -> usize {
        self.slice.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slice.is_empty()
    }

    /// The ring counter of the first reserved slot.
    ///
    /// Counters increase monotonically across the ring's lifetime; the
    /// physical index is `pos & mask`.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Publishes every reserved slot to the consumer.
    ///
    /// All `len()` slots must have been written; the consumer will read them.
    pub fn commit(self) {
        let n = self.len();
        // SAFETY: n == self.len() by construction.
        unsafe { self.commit_unchecked(n) };
    }

    /// Publishes exactly `n` leading slots, failing if `n` exceeds the
    /// reservation.
    pub fn try_commit_n(self, n: usize) -> Result<(), CommitError> {
        if n > self.len() {
            return Err(CommitError {
                requested: n,
                reserved: self.len(),
            });
        }
        // SAFETY: bounds checked above.
        unsafe { self.commit_unchecked(n) };
        Ok(())
    }

    /// Publishes `min(n, len())` leading slots and returns the count.
    pub fn commit_up_to(self, n: usize) -> usize {
        let n = n.min(self.len());
        // SAFETY: clamped to the reservation length.
        unsafe { self.commit_unchecked(n) };
        n
    }

    /// # Safety
    ///
    /// `n` must not exceed `self.len()`, and the first `n` slots must be
    /// initialized.
    #[inline]
    unsafe fn commit_unchecked(self, n: usize) {
        // SAFETY: the ring outlives the reservation ('a borrows from it).
        let ring = &*self.ring;
        ring.publish(n);
    }
}
