use crate::{Config, MetricsSnapshot, Reservation, Ring};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Why a producer registration was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// All producer slots are taken.
    #[error("producer limit of {max} already reached")]
    TooManyProducers {
        /// The configured producer bound.
        max: usize,
    },
    /// The channel was closed before the registration.
    #[error("registration refused: channel closed")]
    Closed,
}

/// Multi-producer single-consumer channel decomposed into per-producer rings.
///
/// Every registered producer owns a dedicated SPSC [`Ring`], so producers
/// never synchronize with one another; the single consumer pays the
/// aggregation cost by draining the rings in registration order. Messages
/// from one producer arrive in FIFO order; messages from different producers
/// are unordered relative to each other.
///
/// `Channel` is a cheap handle over shared state; clone it to hand the
/// consumer side and the registration surface to different threads. Exactly
/// one thread may consume.
pub struct Channel<T> {
    inner: Arc<ChannelInner<T>>,
}

struct ChannelInner<T> {
    rings: Vec<Ring<T>>,
    producer_count: AtomicUsize,
    closed: AtomicBool,
    config: Config,
}

impl<T> Channel<T> {
    /// Builds a channel with `config.max_producers` rings of
    /// `config.capacity()` slots each. All storage is allocated here; nothing
    /// grows afterwards.
    pub fn new(config: Config) -> Self {
        let mut rings = Vec::with_capacity(config.max_producers);
        for _ in 0..config.max_producers {
            rings.push(Ring::new(config));
        }

        Self {
            inner: Arc::new(ChannelInner {
                rings,
                producer_count: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
                config,
            }),
        }
    }

    /// Claims the next free ring and returns a producer handle bound to it.
    ///
    /// Producer slots are one-shot: there is no deregistration, and a dropped
    /// handle does not return its ring to the pool.
    pub fn register(&self) -> Result<Producer<T>, ChannelError> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(ChannelError::Closed);
        }

        let id = self.inner.producer_count.fetch_add(1, Ordering::SeqCst);
        if id >= self.inner.config.max_producers {
            self.inner.producer_count.fetch_sub(1, Ordering::SeqCst);
            return Err(ChannelError::TooManyProducers {
                max: self.inner.config.max_producers,
            });
        }

        self.inner.rings[id].set_active();

        Ok(Producer {
            channel: Arc::clone(&self.inner),
            id,
        })
    }

    /// Copies items into `out`, visiting rings in registration order until
    /// `out` is full or every ring has been offered once. Within a ring the
    /// order is FIFO; across rings it is the visit order of this call.
    pub fn recv(&self, out: &mut [T]) -> usize
    where
        T: Copy,
    {
        let mut total = 0;
        let count = self.inner.producer_count.load(Ordering::Acquire);

        for ring in &self.inner.rings[..count] {
            if total >= out.len() {
                break;
            }
            total += ring.recv(&mut out[total..]);
        }

        total
    }

    /// Drains every ring completely, one head update per ring. Returns the
    /// total consumed. This is the consumer's throughput path.
    pub fn consume_all<F>(&self, mut handler: F) -> usize
    where
        F: FnMut(&T),
    {
        let mut total = 0;
        let count = self.inner.producer_count.load(Ordering::Acquire);

        for ring in &self.inner.rings[..count] {
            total += ring.consume_batch(&mut handler);
        }

        total
    }

    /// [`consume_all`](Channel::consume_all) with ownership transfer; see
    /// [`Ring::consume_batch_owned`].
    pub fn consume_all_owned<F>(&self, mut handler: F) -> usize
    where
        F: FnMut(T),
    {
        let mut total = 0;
        let count = self.inner.producer_count.load(Ordering::Acquire);

        for ring in &self.inner.rings[..count] {
            total += ring.consume_batch_owned(&mut handler);
        }

        total
    }

    /// Drains at most `max_total` items across the rings, preferring earlier
    /// registrations. Bounds the time spent in one drain pass.
    pub fn consume_all_up_to<F>(&self, max_total: usize, mut handler: F) -> usize
    where
        F: FnMut(&T),
    {
        let mut total = 0;
        let count = self.inner.producer_count.load(Ordering::Acquire);

        for ring in &self.inner.rings[..count] {
            if total >= max_total {
                break;
            }
            total += ring.consume_up_to(max_total - total, &mut handler);
        }

        total
    }

    /// Bounded drain with ownership transfer.
    pub fn consume_all_up_to_owned<F>(&self, max_total: usize, mut handler: F) -> usize
    where
        F: FnMut(T),
    {
        let mut total = 0;
        let count = self.inner.producer_count.load(Ordering::Acquire);

        for ring in &self.inner.rings[..count] {
            if total >= max_total {
                break;
            }
            total += ring.consume_up_to_owned(max_total - total, &mut handler);
        }

        total
    }

    /// Closes the channel and every registered ring.
    ///
    /// Registrations fail from here on; producers stop being able to reserve
    /// once their slow path observes the flag; the consumer drains whatever
    /// was already published.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        let count = self.inner.producer_count.load(Ordering::Acquire);
        for ring in &self.inner.rings[..count] {
            ring.close();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Number of registered producers.
    pub fn producer_count(&self) -> usize {
        self.inner.producer_count.load(Ordering::Acquire)
    }

    /// Counters summed over every registered ring; all zeros when collection
    /// is disabled.
    pub fn metrics(&self) -> MetricsSnapshot {
        let mut sum = MetricsSnapshot::default();
        let count = self.inner.producer_count.load(Ordering::Acquire);

        for ring in &self.inner.rings[..count] {
            sum.merge(&ring.metrics());
        }

        sum
    }
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

// SAFETY: all shared state inside is atomics plus the rings, which carry
// their own Send/Sync reasoning.
unsafe impl<T: Send> Send for Channel<T> {}
unsafe impl<T: Send> Sync for Channel<T> {}

/// Non-owning handle to one producer's ring.
///
/// Cloning is cheap and every clone aliases the same ring — a clone is a
/// second name, not a second lane. The ring is single-producer by
/// construction: at most one thread may drive the producer side of a given
/// ring at any moment, across all clones of its handle. Two threads calling
/// `reserve` on aliases of the same ring is a contract violation with
/// undefined results, exactly like sharing one handle by reference.
pub struct Producer<T> {
    channel: Arc<ChannelInner<T>>,
    id: usize,
}

impl<T> std::fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Producer").field("id", &self.id).finish()
    }
}

impl<T> Producer<T> {
    #[inline]
    fn ring(&self) -> &Ring<T> {
        &self.channel.rings[self.id]
    }

    /// Index of this producer's ring; stable for the channel's lifetime.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// See [`Ring::reserve`].
    #[inline]
    pub fn reserve(&self, n: usize) -> Option<Reservation<'_, T>> {
        self.ring().reserve(n)
    }

    /// See [`Ring::reserve_with_backoff`].
    #[inline]
    pub fn reserve_with_backoff(&self, n: usize) -> Option<Reservation<'_, T>> {
        self.ring().reserve_with_backoff(n)
    }

    /// See [`Ring::push`].
    #[inline]
    pub fn push(&self, item: T) -> bool {
        self.ring().push(item)
    }

    /// See [`Ring::send`].
    #[inline]
    pub fn send(&self, items: &[T]) -> usize
    where
        T: Copy,
    {
        self.ring().send(items)
    }

    /// Closes this producer's ring only.
    #[inline]
    pub fn close(&self) {
        self.ring().close();
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.ring().is_closed()
    }
}

impl<T> Clone for Producer<T> {
    fn clone(&self) -> Self {
        Self {
            channel: Arc::clone(&self.channel),
            id: self.id,
        }
    }
}

// SAFETY: the handle only exposes the ring's producer surface; the
// one-thread-per-ring rule is the caller's contract, as documented above.
unsafe impl<T: Send> Send for Producer<T> {}
unsafe impl<T: Send> Sync for Producer<T> {}
