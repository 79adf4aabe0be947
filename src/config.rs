/// Construction-time configuration shared by [`Ring`](crate::Ring) and
/// [`Channel`](crate::Channel).
///
/// Capacity and producer bound are fixed once a channel is built; there is no
/// resizing. Ring capacity is `1 << ring_bits` slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Per-ring capacity as a power-of-two exponent (default 16 = 64K slots).
    pub ring_bits: u32,
    /// Upper bound on registered producers (one ring each).
    pub max_producers: usize,
    /// Collect per-ring counters at runtime. Only effective when the crate is
    /// built with the `metrics` feature; otherwise the counters do not exist.
    pub enable_metrics: bool,
}

impl Config {
    /// Creates a configuration, validating the bounds.
    ///
    /// # Panics
    ///
    /// Panics if `ring_bits` is zero or not less than the pointer width, or
    /// if `max_producers` is zero.
    pub const fn new(ring_bits: u32, max_producers: usize, enable_metrics: bool) -> Self {
        assert!(
            ring_bits > 0 && ring_bits < usize::BITS,
            "ring_bits must be in 1..pointer width"
        );
        assert!(max_producers >= 1, "max_producers must be at least 1");

        Self {
            ring_bits,
            max_producers,
            enable_metrics,
        }
    }

    /// Slots per ring.
    #[inline]
    pub const fn capacity(&self) -> usize {
        1 << self.ring_bits
    }

    /// Mask for wrapping a 64-bit counter to a physical slot index.
    #[inline]
    pub const fn mask(&self) -> usize {
        self.capacity() - 1
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ring_bits: 16,
            max_producers: 16,
            enable_metrics: false,
        }
    }
}

/// Smaller rings (4K slots) that stay resident in cache.
pub const LOW_LATENCY_CONFIG: Config = Config::new(12, 16, false);

/// Larger rings (256K slots) and headroom for 32 producers.
pub const HIGH_THROUGHPUT_CONFIG: Config = Config::new(18, 32, false);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_and_mask() {
        let c = Config::new(4, 1, false);
        assert_eq!(c.capacity(), 16);
        assert_eq!(c.mask(), 15);
    }

    #[test]
    fn default_matches_presets() {
        let c = Config::default();
        assert_eq!(c.ring_bits, 16);
        assert_eq!(c.max_producers, 16);
        assert!(!c.enable_metrics);

        assert_eq!(LOW_LATENCY_CONFIG.ring_bits, 12);
        assert_eq!(HIGH_THROUGHPUT_CONFIG.ring_bits, 18);
        assert_eq!(HIGH_THROUGHPUT_CONFIG.max_producers, 32);
    }

    #[test]
    #[should_panic]
    fn zero_ring_bits_rejected() {
        let _ = Config::new(0, 1, false);
    }

    #[test]
    #[should_panic]
    fn zero_producers_rejected() {
        let _ = Config::new(8, 0, false);
    }
}
