use crate::invariants::{
    debug_assert_bounded_count, debug_assert_head_not_past_tail, debug_assert_monotonic,
    debug_assert_published_read,
};
use crate::{prefetch, Backoff, Config, Metrics, MetricsSnapshot, Reservation};
use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use std::cell::UnsafeCell;
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ptr::{self, NonNull};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

// =============================================================================
// Synchronization protocol
// =============================================================================
//
// head and tail are unbounded u64 counters; the physical slot is counter & mask.
// Unbounded counters make full/empty unambiguous (no reserved slot, no ABA) and
// cannot wrap in any realistic run.
//
// Producer: load tail Relaxed (it is the only writer), judge space against the
// local head snapshot, refresh the snapshot with an Acquire load of head only
// when the ring looks full, write the slots, then publish with a Release store
// to tail.
//
// Consumer: load head Relaxed (it is the only writer), judge availability
// against the local tail snapshot, refresh with an Acquire load of tail only
// when the ring looks empty, read the slots, then publish consumption with a
// Release store to head.
//
// The two Release/Acquire pairs are the entire happens-before story: slot
// writes are ordered before the tail publish, and slot reuse is ordered after
// the head publish. The snapshots (cached_head / cached_tail) are plain cells:
// each has exactly one writing thread.

/// Producer-owned hot state. One 128-byte region: `tail` and the producer's
/// snapshot of `head` share it, and nothing the consumer writes lives on it.
#[repr(align(128))]
struct ProducerSide {
    /// Count of slots produced; written by the producer, read by the consumer.
    tail: AtomicU64,
    /// Producer's last observed `head`; conservative under-approximation.
    cached_head: UnsafeCell<u64>,
}

/// Consumer-owned hot state, on its own 128-byte region.
#[repr(align(128))]
struct ConsumerSide {
    /// Count of slots consumed; written by the consumer, read by the producer.
    head: AtomicU64,
    /// Consumer's last observed `tail`; conservative under-approximation.
    cached_tail: UnsafeCell<u64>,
}

/// Rarely touched flags and counters, kept off both hot regions.
#[repr(align(128))]
struct ControlBlock {
    active: AtomicBool,
    closed: AtomicBool,
    metrics: Metrics,
}

/// Bounded SPSC ring buffer, the building block of [`Channel`](crate::Channel).
///
/// One thread produces through [`reserve`](Ring::reserve)/commit, one thread
/// consumes through [`readable`](Ring::readable)/[`advance`](Ring::advance) or
/// the batch consumers. All operations are wait-free; the only waiting in the
/// crate is the explicit [`reserve_with_backoff`](Ring::reserve_with_backoff)
/// retry loop.
///
/// The three state regions are 128-byte aligned so the producer's stores, the
/// consumer's stores, and the cold flags never share a cache line pair (the
/// adjacent-line prefetcher on x86 pulls lines in pairs).
#[repr(C)]
pub struct Ring<T> {
    producer: ProducerSide,
    consumer: ConsumerSide,
    control: ControlBlock,
    config: Config,
    /// Slot storage, `capacity` elements aligned to at least 64 bytes.
    slots: NonNull<MaybeUninit<T>>,
    _marker: PhantomData<T>,
}

// SAFETY: the counter protocol above hands each slot to exactly one side at a
// time; sending the ring between threads is sound whenever T is.
unsafe impl<T: Send> Send for Ring<T> {}
unsafe impl<T: Send> Sync for Ring<T> {}

impl<T> Ring<T> {
    /// Creates an empty ring with `config.capacity()` slots.
    pub fn new(config: Config) -> Self {
        let layout = Self::slots_layout(config.capacity());
        let slots = if layout.size() == 0 {
            // Zero-sized T: nothing to allocate, slot addresses never load.
            NonNull::dangling()
        } else {
            // SAFETY: layout is non-zero sized.
            let raw = unsafe { alloc(layout) };
            match NonNull::new(raw.cast::<MaybeUninit<T>>()) {
                Some(p) => p,
                None => handle_alloc_error(layout),
            }
        };

        Self {
            producer: ProducerSide {
                tail: AtomicU64::new(0),
                cached_head: UnsafeCell::new(0),
            },
            consumer: ConsumerSide {
                head: AtomicU64::new(0),
                cached_tail: UnsafeCell::new(0),
            },
            control: ControlBlock {
                active: AtomicBool::new(false),
                closed: AtomicBool::new(false),
                metrics: Metrics::new(),
            },
            config,
            slots,
            _marker: PhantomData,
        }
    }

    /// Storage layout: `capacity` slots at cache-line alignment or stricter.
    fn slots_layout(capacity: usize) -> Layout {
        let size = std::mem::size_of::<T>()
            .checked_mul(capacity)
            .expect("ring storage size overflows usize");
        let align = std::mem::align_of::<T>().max(64);
        Layout::from_size_align(size, align).expect("ring storage layout invalid")
    }

    // -------------------------------------------------------------------------
    // Status
    // -------------------------------------------------------------------------

    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    #[inline]
    fn mask(&self) -> usize {
        self.config.mask()
    }

    /// Items currently in the ring. Racy by nature when both sides are live;
    /// exact when the ring is quiesced.
    #[inline]
    pub fn len(&self) -> usize {
        let tail = self.producer.tail.load(Ordering::Relaxed);
        let head = self.consumer.head.load(Ordering::Relaxed);
        tail.wrapping_sub(head) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.control.closed.load(Ordering::Acquire)
    }

    pub(crate) fn set_active(&self) {
        self.control.active.store(true, Ordering::Release);
    }

    #[inline]
    fn slot_ptr(&self, idx: usize) -> *mut MaybeUninit<T> {
        debug_assert!(idx < self.capacity());
        // SAFETY: idx is always masked below capacity, so the offset stays
        // inside the allocation.
        unsafe { self.slots.as_ptr().add(idx) }
    }

    // -------------------------------------------------------------------------
    // Producer side
    // -------------------------------------------------------------------------

    /// Claims up to `n` contiguous slots for zero-copy writing.
    ///
    /// Returns `None` when `n` is zero, exceeds the capacity, or the ring has
    /// no room (or is closed, observed on the refresh path). A successful
    /// reservation is truncated at the physical end of the buffer, so its
    /// [`len`](Reservation::len) may be less than `n`; callers that need
    /// exactly `n` slots reserve in a loop:
    ///
    /// ```
    /// # use ringlane::{Config, Ring};
    /// # let ring = Ring::<u64>::new(Config::new(4, 1, false));
    /// let mut remaining = 10usize;
    /// while remaining > 0 {
    ///     if let Some(mut r) = ring.reserve(remaining) {
    ///         for slot in r.as_mut_slice().iter_mut() {
    ///             slot.write(0);
    ///         }
    ///         remaining -= r.len();
    ///         r.commit();
    ///     } else {
    ///         break; // full: drain first
    ///     }
    /// }
    /// ```
    pub fn reserve(&self, n: usize) -> Option<Reservation<'_, T>> {
        if n == 0 || n > self.capacity() {
            return None;
        }

        let tail = self.producer.tail.load(Ordering::Relaxed);

        // Fast path: judge space from the local head snapshot. No load of the
        // consumer's cache line.
        // SAFETY: cached_head has a single writer, the producer thread.
        let cached_head = unsafe { *self.producer.cached_head.get() };
        let space = self
            .capacity()
            .saturating_sub(tail.wrapping_sub(cached_head) as usize);
        if space >= n {
            return Some(self.claim(tail, n));
        }

        // Slow path: refresh the snapshot from the shared counter.
        let head = self.consumer.head.load(Ordering::Acquire);
        // SAFETY: single writer, as above.
        unsafe { *self.producer.cached_head.get() = head };

        let space = self
            .capacity()
            .saturating_sub(tail.wrapping_sub(head) as usize);
        if space < n || self.is_closed() {
            return None;
        }

        Some(self.claim(tail, n))
    }

    /// [`reserve`](Ring::reserve) wrapped in an adaptive retry loop.
    ///
    /// Spins, then yields, then gives up; also gives up as soon as the ring is
    /// observed closed. `None` therefore means "closed or still full after the
    /// backoff ran out", and the caller picks a policy.
    pub fn reserve_with_backoff(&self, n: usize) -> Option<Reservation<'_, T>> {
        let mut backoff = Backoff::new();
        while !backoff.is_completed() {
            if let Some(r) = self.reserve(n) {
                return Some(r);
            }
            if self.is_closed() {
                return None;
            }
            backoff.snooze();
            if self.config.enable_metrics {
                self.control.metrics.add_reserve_spins(1);
            }
        }
        None
    }

    fn claim(&self, tail: u64, n: usize) -> Reservation<'_, T> {
        let mask = self.mask();
        let idx = (tail as usize) & mask;
        let contiguous = n.min(self.capacity() - idx);

        // The slot just past the claim is the next one this producer touches.
        prefetch::prefetch_write(self.slot_ptr((tail as usize).wrapping_add(n) & mask));

        // SAFETY: slots [idx, idx + contiguous) lie in [tail, head + capacity):
        // the consumer will not read them until the commit publishes tail, and
        // only this producer writes them.
        let slice =
            unsafe { std::slice::from_raw_parts_mut(self.slot_ptr(idx), contiguous) };
        Reservation::new(slice, self as *const Self, tail)
    }

    /// Publishes `n` committed slots. Called by [`Reservation`].
    pub(crate) fn publish(&self, n: usize) {
        let tail = self.producer.tail.load(Ordering::Relaxed);
        let new_tail = tail.wrapping_add(n as u64);

        // The head load happens in debug builds only; release commits must
        // not touch the consumer's cache line.
        debug_assert_bounded_count!(
            new_tail.wrapping_sub(self.consumer.head.load(Ordering::Relaxed)) as usize,
            self.capacity()
        );
        debug_assert_monotonic!("tail", tail, new_tail);

        self.producer.tail.store(new_tail, Ordering::Release);

        if self.config.enable_metrics {
            self.control.metrics.add_messages_sent(n as u64);
            self.control.metrics.add_batches_sent(1);
        }
    }

    /// Reserves, writes one item, commits. `false` when full or closed.
    #[inline]
    pub fn push(&self, item: T) -> bool {
        self.reserve(1).is_some_and(|mut r| {
            r.as_mut_slice()[0].write(item);
            r.commit();
            true
        })
    }

    /// Copies as many leading items as one contiguous reservation holds and
    /// commits them. Returns the count sent, which is zero when the ring is
    /// full (or `items` is longer than the whole capacity) and less than
    /// `items.len()` when the claim was truncated at the wrap boundary. Does
    /// not loop across the boundary; callers that must send everything call
    /// again with the remainder.
    pub fn send(&self, items: &[T]) -> usize
    where
        T: Copy,
    {
        self.reserve(items.len()).map_or(0, |mut r| {
            let slice = r.as_mut_slice();
            let n = slice.len();
            for (slot, item) in slice.iter_mut().zip(items) {
                slot.write(*item);
            }
            r.commit();
            n
        })
    }

    // -------------------------------------------------------------------------
    // Consumer side
    // -------------------------------------------------------------------------

    /// The contiguous readable span, or `None` when the ring is empty.
    ///
    /// Truncated at the physical end of the buffer; after the caller is done
    /// it must [`advance`](Ring::advance) by at most the span's length.
    pub fn readable(&self) -> Option<&[T]> {
        let head = self.consumer.head.load(Ordering::Relaxed);

        // Fast path against the local tail snapshot; refresh only on empty.
        // SAFETY: cached_tail has a single writer, the consumer thread.
        let mut cached_tail = unsafe { *self.consumer.cached_tail.get() };
        let mut avail = cached_tail.wrapping_sub(head) as usize;
        if avail == 0 {
            cached_tail = self.producer.tail.load(Ordering::Acquire);
            // SAFETY: single writer, as above.
            unsafe { *self.consumer.cached_tail.get() = cached_tail };
            avail = cached_tail.wrapping_sub(head) as usize;
            if avail == 0 {
                return None;
            }
        }

        let mask = self.mask();
        let idx = (head as usize) & mask;
        let contiguous = avail.min(self.capacity() - idx);

        prefetch::prefetch_read(self.slot_ptr((idx + contiguous) & mask));

        // SAFETY: slots [idx, idx + contiguous) were initialized by the
        // producer before its Release store to tail; the Acquire refresh above
        // synchronizes with that store. The producer will not overwrite them
        // until head moves past.
        unsafe {
            Some(std::slice::from_raw_parts(
                self.slot_ptr(idx).cast::<T>(),
                contiguous,
            ))
        }
    }

    /// Publishes consumption of `n` items previously obtained from
    /// [`readable`](Ring::readable).
    ///
    /// Items skipped over this way are not dropped; use the batch consumers
    /// for `T` that owns resources.
    #[inline]
    pub fn advance(&self, n: usize) {
        let head = self.consumer.head.load(Ordering::Relaxed);
        let new_head = head.wrapping_add(n as u64);

        // Tail load in debug builds only, same reasoning as in publish().
        debug_assert_head_not_past_tail!(new_head, self.producer.tail.load(Ordering::Relaxed));
        debug_assert_monotonic!("head", head, new_head);

        self.consumer.head.store(new_head, Ordering::Release);

        if self.config.enable_metrics {
            self.control.metrics.add_messages_received(n as u64);
            self.control.metrics.add_batches_received(1);
        }
    }

    /// Copies up to `out.len()` items from one readable span and advances.
    pub fn recv(&self, out: &mut [T]) -> usize
    where
        T: Copy,
    {
        self.readable().map_or(0, |slice| {
            let n = slice.len().min(out.len());
            out[..n].copy_from_slice(&slice[..n]);
            self.advance(n);
            n
        })
    }

    // -------------------------------------------------------------------------
    // Batch consumption
    // -------------------------------------------------------------------------

    /// Moves up to `max_items` items out of the ring, handing each to `sink`,
    /// then publishes the whole batch with one Release store to head. The
    /// single publish is what batch consumption buys: no atomics inside the
    /// loop.
    fn drain<F>(&self, max_items: usize, mut sink: F) -> usize
    where
        F: FnMut(T),
    {
        if max_items == 0 {
            return 0;
        }

        let head = self.consumer.head.load(Ordering::Relaxed);
        let tail = self.producer.tail.load(Ordering::Acquire);

        let avail = tail.wrapping_sub(head) as usize;
        if avail == 0 {
            return 0;
        }

        let take = avail.min(max_items);
        let mask = self.mask();
        let mut pos = head;
        for _ in 0..take {
            debug_assert_published_read!(pos, head, tail);
            let idx = (pos as usize) & mask;
            // SAFETY: pos is inside [head, tail), published by the Acquire
            // load above. assume_init_read moves the value out; the slot is
            // dead until the producer rewrites it after head advances.
            let item = unsafe { (*self.slot_ptr(idx)).assume_init_read() };
            sink(item);
            pos = pos.wrapping_add(1);
        }

        self.consumer
            .head
            .store(head.wrapping_add(take as u64), Ordering::Release);

        if self.config.enable_metrics {
            self.control.metrics.add_messages_received(take as u64);
            self.control.metrics.add_batches_received(1);
        }

        take
    }

    /// Processes every available item, advancing head once for the batch.
    /// Returns the count consumed. Items are dropped after the handler runs.
    ///
    /// The handler must not call back into this ring's producer side, and
    /// heavy work belongs after the batch returns, not inside it.
    pub fn consume_batch<F>(&self, mut handler: F) -> usize
    where
        F: FnMut(&T),
    {
        self.drain(usize::MAX, |item| handler(&item))
    }

    /// Like [`consume_batch`](Ring::consume_batch), but transfers ownership of
    /// each item to the handler. Preferred when `T` owns heap data and would
    /// otherwise be cloned out.
    pub fn consume_batch_owned<F>(&self, handler: F) -> usize
    where
        F: FnMut(T),
    {
        self.drain(usize::MAX, handler)
    }

    /// Bounded [`consume_batch`](Ring::consume_batch): at most `max_items`
    /// items, still one head update. Keeps batch latency in check when rings
    /// run deep.
    pub fn consume_up_to<F>(&self, max_items: usize, mut handler: F) -> usize
    where
        F: FnMut(&T),
    {
        self.drain(max_items, |item| handler(&item))
    }

    /// Bounded owned-value consumption; see
    /// [`consume_batch_owned`](Ring::consume_batch_owned).
    pub fn consume_up_to_owned<F>(&self, max_items: usize, handler: F) -> usize
    where
        F: FnMut(T),
    {
        self.drain(max_items, handler)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Marks the ring closed. Idempotent and one-way.
    ///
    /// Close is a drain signal, not a fence: in-flight reservations stay
    /// valid, commits still publish, and the consumer keeps draining until
    /// empty. New reservations fail once the producer's slow path observes
    /// the flag.
    pub fn close(&self) {
        self.control.closed.store(true, Ordering::Release);
    }

    /// Counter snapshot; zeros when collection is disabled.
    pub fn metrics(&self) -> MetricsSnapshot {
        if self.config.enable_metrics {
            self.control.metrics.snapshot()
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl<T> Drop for Ring<T> {
    fn drop(&mut self) {
        // Anything still in [head, tail) was published but never consumed;
        // it is owned by the ring now and must be dropped.
        let head = self.consumer.head.load(Ordering::Relaxed);
        let tail = self.producer.tail.load(Ordering::Relaxed);
        let count = tail.wrapping_sub(head) as usize;

        let mask = self.mask();
        for i in 0..count {
            let idx = ((head as usize).wrapping_add(i)) & mask;
            // SAFETY: slot holds an initialized T; nobody else can touch it.
            unsafe { ptr::drop_in_place((*self.slot_ptr(idx)).as_mut_ptr()) };
        }

        let layout = Self::slots_layout(self.capacity());
        if layout.size() != 0 {
            // SAFETY: allocated in new() with this exact layout.
            unsafe { dealloc(self.slots.as_ptr().cast::<u8>(), layout) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_commit_readable_advance() {
        let ring = Ring::<u64>::new(Config::default());

        let mut r = ring.reserve(4).unwrap();
        assert_eq!(r.pos(), 0);
        for (i, slot) in r.as_mut_slice().iter_mut().enumerate() {
            slot.write((i as u64 + 1) * 100);
        }
        r.commit();

        assert_eq!(ring.len(), 4);

        let span = ring.readable().unwrap();
        assert_eq!(span, &[100, 200, 300, 400]);
        ring.advance(4);

        assert!(ring.is_empty());
        assert!(ring.readable().is_none());
    }

    #[test]
    fn consume_batch_sums_in_one_pass() {
        let ring = Ring::<u64>::new(Config::default());

        for i in 0..10u64 {
            assert!(ring.push(i * 10));
        }

        let mut sum = 0u64;
        let consumed = ring.consume_batch(|item| sum += item);

        assert_eq!(consumed, 10);
        assert_eq!(sum, 450);
        assert!(ring.is_empty());
    }

    #[test]
    fn consume_up_to_bounds_the_batch() {
        let ring = Ring::<u64>::new(Config::default());

        for i in 0..10u64 {
            assert!(ring.push(i));
        }

        let mut seen = Vec::new();
        assert_eq!(ring.consume_up_to(4, |item| seen.push(*item)), 4);
        assert_eq!(seen, [0, 1, 2, 3]);
        assert_eq!(ring.len(), 6);

        assert_eq!(ring.consume_up_to(100, |item| seen.push(*item)), 6);
        assert_eq!(seen.len(), 10);
        assert_eq!(ring.consume_up_to(0, |_| unreachable!()), 0);
    }

    #[test]
    fn degenerate_reserve_sizes_rejected() {
        let ring = Ring::<u64>::new(Config::new(4, 1, false));
        assert!(ring.reserve(0).is_none());
        assert!(ring.reserve(17).is_none());
        // Exactly capacity on an empty, never-wrapped ring: full slice.
        let r = ring.reserve(16).unwrap();
        assert_eq!(r.len(), 16);
    }

    #[test]
    fn full_ring_frees_one_slot_at_a_time() {
        let ring = Ring::<u64>::new(Config::new(4, 1, false));

        for i in 0..16u64 {
            assert!(ring.push(i));
        }
        assert!(ring.is_full());
        assert!(ring.reserve(1).is_none());

        ring.advance(1);
        let mut r = ring.reserve(1).unwrap();
        // Same physical slot the first item occupied.
        assert_eq!(r.pos() & 15, 0);
        r.as_mut_slice()[0].write(99);
        r.commit();
        assert!(ring.is_full());
    }

    #[test]
    fn reservation_truncates_at_wrap_boundary() {
        let ring = Ring::<u64>::new(Config::new(3, 1, false)); // 8 slots

        assert_eq!(ring.send(&[0, 1, 2, 3, 4, 5]), 6);
        ring.consume_batch(|_| {});

        // tail = 6: only two slots remain before the physical end.
        let r = ring.reserve(5).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r.pos(), 6);
        r.commit();

        // Next claim starts at slot 0.
        let r = ring.reserve(5).unwrap();
        assert_eq!(r.pos() & 7, 0);
        assert_eq!(r.len(), 5);
    }

    #[test]
    fn send_does_not_cross_the_wrap_boundary() {
        let ring = Ring::<u64>::new(Config::new(3, 1, false)); // 8 slots

        assert_eq!(ring.send(&[0, 1, 2, 3, 4, 5]), 6);
        ring.consume_batch(|_| {});

        // Six free slots total, two of them contiguous at the tail.
        let sent = ring.send(&[10, 11, 12, 13]);
        assert_eq!(sent, 2);
        // The remainder goes through on the next call.
        assert_eq!(ring.send(&[12, 13]), 2);

        let mut got = Vec::new();
        ring.consume_batch(|item| got.push(*item));
        assert_eq!(got, [10, 11, 12, 13]);
    }

    #[test]
    fn send_longer_than_capacity_sends_nothing() {
        let ring = Ring::<u64>::new(Config::new(2, 1, false)); // 4 slots
        assert_eq!(ring.send(&[0; 5]), 0);
        assert!(ring.is_empty());
    }

    #[test]
    fn recv_copies_and_advances() {
        let ring = Ring::<u64>::new(Config::default());
        assert_eq!(ring.send(&[7, 8, 9]), 3);

        let mut out = [0u64; 2];
        assert_eq!(ring.recv(&mut out), 2);
        assert_eq!(out, [7, 8]);
        assert_eq!(ring.len(), 1);

        let mut out = [0u64; 4];
        assert_eq!(ring.recv(&mut out), 1);
        assert_eq!(out[0], 9);
        assert_eq!(ring.recv(&mut out), 0);
    }

    #[test]
    fn closed_ring_fails_reserve_on_the_refresh_path() {
        let ring = Ring::<u64>::new(Config::new(4, 1, false));

        // Exhaust the cached view so the next reserve must refresh.
        for i in 0..16u64 {
            assert!(ring.push(i));
        }
        ring.consume_batch(|_| {});
        ring.close();

        // Sixteen slots are free, but the slow path sees the closed flag.
        assert!(ring.reserve(1).is_none());
        assert!(ring.reserve_with_backoff(1).is_none());
    }

    #[test]
    fn close_still_drains_inflight_items() {
        let ring = Ring::<u64>::new(Config::new(4, 1, false));

        let mut r = ring.reserve(2).unwrap();
        r.as_mut_slice()[0].write(1);
        r.as_mut_slice()[1].write(2);
        ring.close();
        // In-flight commit after close still publishes.
        r.commit();

        let mut sum = 0;
        assert_eq!(ring.consume_batch(|item| sum += item), 2);
        assert_eq!(sum, 3);
        assert!(ring.is_closed());
    }

    #[test]
    fn backoff_reserve_gives_up_on_a_full_ring() {
        let ring = Ring::<u64>::new(Config::new(4, 1, false));
        for i in 0..16u64 {
            assert!(ring.push(i));
        }
        assert!(ring.reserve_with_backoff(1).is_none());
    }

    #[test]
    fn uncommitted_reservation_publishes_nothing() {
        let ring = Ring::<u64>::new(Config::new(4, 1, false));
        {
            let r = ring.reserve(3);
            assert!(r.is_some());
        }
        assert!(ring.is_empty());
        assert!(ring.readable().is_none());
    }

    #[test]
    fn consumed_and_leftover_items_are_dropped() {
        use std::sync::atomic::AtomicUsize;

        static DROPS: AtomicUsize = AtomicUsize::new(0);

        struct Tracked;
        impl Drop for Tracked {
            fn drop(&mut self) {
                DROPS.fetch_add(1, Ordering::SeqCst);
            }
        }

        DROPS.store(0, Ordering::SeqCst);
        {
            let ring = Ring::<Tracked>::new(Config::new(4, 1, false));
            for _ in 0..6 {
                assert!(ring.push(Tracked));
            }
            // Four consumed through the handler, two left for Ring::drop.
            assert_eq!(ring.consume_up_to(4, |_| {}), 4);
            assert_eq!(DROPS.load(Ordering::SeqCst), 4);
        }
        assert_eq!(DROPS.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn owned_consumption_moves_values_out() {
        let ring = Ring::<String>::new(Config::new(4, 1, false));
        for word in ["pack", "of", "rings"] {
            assert!(ring.push(word.to_string()));
        }

        let mut words = Vec::new();
        assert_eq!(ring.consume_batch_owned(|s| words.push(s)), 3);
        assert_eq!(words.join(" "), "pack of rings");
    }

    #[test]
    fn storage_is_cache_aligned() {
        let ring = Ring::<u8>::new(Config::new(4, 1, false));
        assert_eq!(ring.slots.as_ptr() as usize % 64, 0);
    }
}
