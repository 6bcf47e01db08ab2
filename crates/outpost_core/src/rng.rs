//! Random source abstraction.
//!
//! Combat resolution, the opening wave, the AI fallback pick and scenario
//! generation all draw from a [`RandomSource`]. The adversarial search never
//! takes one, so search results stay reproducible regardless of how many
//! draws the rest of the turn consumed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Uniform random draws used by the game rules.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform draw in `[lo, hi)`.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_unit()
    }

    /// Uniform integer in `lo..=hi`.
    fn range_inclusive(&mut self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        let span = f64::from(hi - lo + 1);
        let offset = (self.next_unit() * span) as u32;
        lo + offset.min(hi - lo)
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "pick from empty range");
        let index = (self.next_unit() * len as f64) as usize;
        index.min(len.saturating_sub(1))
    }
}

/// Seeded generator backing real sessions.
///
/// Two sessions built from the same seed and fed the same orders play out
/// identically.
#[derive(Debug, Clone)]
pub struct GameRng {
    inner: ChaCha8Rng,
}

impl GameRng {
    /// Create a generator from a seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Create a generator seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha8Rng::from_entropy(),
        }
    }
}

impl RandomSource for GameRng {
    fn next_unit(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        self.inner.gen_range(lo..hi)
    }

    fn range_inclusive(&mut self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        self.inner.gen_range(lo..=hi)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len.max(1))
    }
}
