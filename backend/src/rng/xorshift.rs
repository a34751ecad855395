//! Per-patient random stream (xorshift64*)
//!
//! Each patient, PSA draw and bootstrap owns one `RngManager` seeded from a
//! [`SeedDerivation`](super::SeedDerivation), so a trajectory replays exactly from
//! its seed and two therapies can share common random numbers.
//! [`rand::RngCore`] is implemented so the PSA Gamma/Beta samplers from
//! `rand_distr` draw from the same stream.

use serde::{Deserialize, Serialize};

/// xorshift64* generator; 64-bit state, zero seed mapped to 1
///
/// # Example
/// ```
/// use markov_cohort_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let index = rng.range(0, 100); // [0, 100)
/// assert!((0..100).contains(&index));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        // all-zero state is a fixed point
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Advance the stream and return the next raw draw
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Uniform index in `[min, max)`, used for bootstrap resampling
    ///
    /// # Panics
    /// Panics if `min >= max`
    ///
    /// # Example
    /// ```
    /// use markov_cohort_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(12345);
    /// let observation = rng.range(0, 500); // bootstrap index into 500 observations
    /// assert!(observation < 500);
    /// ```
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let value = self.next();
        let range_size = (max - min) as u64;
        min + (value % range_size) as i64
    }

    /// Current state; `RngManager::new(state)` resumes the stream from here
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Uniform draw in `[0.0, 1.0)` for inverse-CDF sampling of the next state
    ///
    /// # Example
    /// ```
    /// use markov_cohort_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(12345);
    /// let u = rng.next_f64();
    /// assert!(u >= 0.0 && u < 1.0);
    /// ```
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        // top 53 bits
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }
}

impl rand::RngCore for RngManager {
    fn next_u32(&mut self) -> u32 {
        (self.next() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
