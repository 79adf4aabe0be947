//! Per-ring counters, compile-time gated.
//!
//! With the `metrics` feature enabled, [`Metrics`] is a set of relaxed atomic
//! counters; with the feature disabled it is a zero-sized type whose update
//! methods are empty inline functions, so the hot path carries no trace of it.
//! [`MetricsSnapshot`] exists in both builds so aggregation code is identical.

#[cfg(feature = "metrics")]
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one ring.
///
/// Updates use `Relaxed` ordering: the values are purely observational, no
/// control flow depends on them, and eventual visibility is enough.
#[cfg(feature = "metrics")]
#[derive(Debug, Default)]
pub struct Metrics {
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
    batches_sent: AtomicU64,
    batches_received: AtomicU64,
    reserve_spins: AtomicU64,
}

#[cfg(feature = "metrics")]
impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add_messages_sent(&self, n: u64) {
        self.messages_sent.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_batches_sent(&self, n: u64) {
        self.batches_sent.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_messages_received(&self, n: u64) {
        self.messages_received.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_batches_received(&self, n: u64) {
        self.batches_received.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_reserve_spins(&self, n: u64) {
        self.reserve_spins.fetch_add(n, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            batches_sent: self.batches_sent.load(Ordering::Relaxed),
            batches_received: self.batches_received.load(Ordering::Relaxed),
            reserve_spins: self.reserve_spins.load(Ordering::Relaxed),
        }
    }
}

/// Zero-sized stand-in when the `metrics` feature is off. Every method
/// compiles to nothing.
#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct Metrics;

#[cfg(not(feature = "metrics"))]
impl Metrics {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    #[inline(always)]
    pub fn add_messages_sent(&self, _n: u64) {}

    #[inline(always)]
    pub fn add_batches_sent(&self, _n: u64) {}

    #[inline(always)]
    pub fn add_messages_received(&self, _n: u64) {}

    #[inline(always)]
    pub fn add_batches_received(&self, _n: u64) {}

    #[inline(always)]
    pub fn add_reserve_spins(&self, _n: u64) {}

    #[inline]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot::default()
    }
}

/// Plain-data snapshot of the counters, summable across rings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub batches_sent: u64,
    pub batches_received: u64,
    pub reserve_spins: u64,
}

impl MetricsSnapshot {
    /// Accumulate another ring's counters into this snapshot.
    pub fn merge(&mut self, other: &MetricsSnapshot) {
        self.messages_sent += other.messages_sent;
        self.messages_received += other.messages_received;
        self.batches_sent += other.batches_sent;
        self.batches_received += other.batches_received;
        self.reserve_spins += other.reserve_spins;
    }
}
