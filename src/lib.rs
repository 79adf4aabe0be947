//! Lock-free MPSC channel built from per-producer SPSC ring buffers.
//!
//! Instead of one shared queue that every producer fights over, each
//! registered producer gets a dedicated bounded SPSC ring and the single
//! consumer drains the rings in registration order. Producers never touch
//! each other's state, which trades memory (N rings) for the complete
//! absence of producer-producer contention.
//!
//! What makes the rings fast:
//!
//! - cached head/tail snapshots, so the common-case reserve and read never
//!   load the cache line the peer core is writing
//! - 128-byte-aligned state regions, clear of the adjacent-line prefetcher
//! - zero-copy reserve/commit batches on the producer side, and batch
//!   consumption with a single head update on the consumer side
//! - adaptive spin-then-yield backoff on the slow path only
//!
//! # Example
//!
//! ```
//! use ringlane::{Channel, Config};
//!
//! let channel = Channel::<u64>::new(Config::default());
//! let producer = channel.register().unwrap();
//!
//! // Single items...
//! producer.push(42);
//!
//! // ...or zero-copy batches.
//! if let Some(mut r) = producer.reserve(3) {
//!     for (i, slot) in r.as_mut_slice().iter_mut().enumerate() {
//!         slot.write(i as u64);
//!     }
//!     r.commit();
//! }
//!
//! let mut received = Vec::new();
//! let n = channel.consume_all(|item: &u64| received.push(*item));
//! assert_eq!(n, 4);
//! assert_eq!(received, [42, 0, 1, 2]);
//! ```
//!
//! # Contract
//!
//! One thread per producer handle, one consumer thread per channel. The
//! counters are 64-bit and monotone; the ring capacity is a power of two
//! fixed at construction. Closing a channel refuses new registrations and
//! stops producers at their next counter refresh, while the consumer drains
//! whatever was already published.

mod backoff;
mod channel;
mod config;
mod invariants;
mod metrics;
mod prefetch;
mod reservation;
mod ring;

pub use backoff::Backoff;
pub use channel::{Channel, ChannelError, Producer};
pub use config::{Config, HIGH_THROUGHPUT_CONFIG, LOW_LATENCY_CONFIG};
pub use metrics::{Metrics, MetricsSnapshot};
pub use reservation::{CommitError, Reservation};
pub use ring::Ring;
