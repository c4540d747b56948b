//! xorshift64* random number generator
//!
//! Fast 64-bit PRNG with a single word of state. Same seed, same sequence:
//! replicates can be re-run exactly for debugging, while independent
//! Monte-Carlo replicates simply use different seeds.

use serde::{Deserialize, Serialize};

/// Multiplier of the xorshift64* output scrambler.
const SCRAMBLE: u64 = 0x2545_F491_4F6C_DD1D;

/// Golden-ratio increment used to decorrelate forked streams.
const STREAM_INCREMENT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use om_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let u = rng.next_f64();
/// assert!((0.0..1.0).contains(&u));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed (zero is mapped to one).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(SCRAMBLE)
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: usize, max: usize) -> usize {
        assert!(min < max, "min must be less than max");
        let span = (max - min) as u64;
        min + (self.next() % span) as usize
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        (self.next() >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Draw an exponential variate with the given rate, `-ln(1 - U) / rate`.
    ///
    /// Returns `f64::INFINITY` for a non-positive rate: the event never happens.
    ///
    /// # Example
    /// ```
    /// use om_simulator_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(7);
    /// let gap = rng.exponential(0.5);
    /// assert!(gap >= 0.0);
    /// assert!(rng.exponential(0.0).is_infinite());
    /// ```
    pub fn exponential(&mut self, rate: f64) -> f64 {
        if rate <= 0.0 || !rate.is_finite() {
            return f64::INFINITY;
        }
        -(1.0 - self.next_f64()).ln() / rate
    }

    /// Derive an independent generator for a named sub-stream.
    ///
    /// The parent advances by one draw, so forking the same stream twice
    /// yields two different children.
    pub fn fork(&mut self, stream: u64) -> RngManager {
        let seed = self.next() ^ stream.wrapping_add(1).wrapping_mul(STREAM_INCREMENT);
        RngManager::new(seed)
    }

    /// Get current RNG state (for replay)
    pub fn get_state(&self) -> u64 {
        self.state
    }
}
