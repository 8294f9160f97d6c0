//! Deterministic pseudo-random source for the breakpoint walks.
//!
//! A fixed-increment linear congruential generator (Numerical Recipes
//! constants). It is cheap, allocation free and, more importantly here,
//! reproducible: the oscillator reseeds it with [`DEFAULT_SEED`] on every
//! reset so a given parameter history always yields the same waveform.

/// Seed restored by every oscillator reset.
pub const DEFAULT_SEED: u32 = 12_345;

const MULTIPLIER: u32 = 1_664_525;
const INCREMENT: u32 = 1_013_904_223;

/// 32-bit LCG: `state = state * 1664525 + 1013904223 (mod 2^32)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl Lcg {
    #[inline]
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    #[inline]
    pub fn reseed(&mut self, seed: u32) {
        self.state = seed;
    }

    #[inline]
    pub fn state(&self) -> u32 {
        self.state
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        self.state
    }

    /// Next value in approximately `[-1, 1)`.
    ///
    /// The raw state is scaled by `2^-31` and shifted down by one. `f32`
    /// rounding of states near `u32::MAX` can yield exactly `1.0`.
    #[inline]
    #[allow(clippy::cast_precision_loss)]
    pub fn next_bipolar(&mut self) -> f32 {
        (self.next_u32() as f32) / 2_147_483_648.0 - 1.0
    }
}
