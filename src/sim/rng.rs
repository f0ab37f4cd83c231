//! Injectable randomness
//!
//! The spawn policy only ever asks for uniform samples in `[0, 1)`, so that is
//! the whole contract. Production runs draw from an OS-seeded PCG stream; tests
//! either seed one or script the exact sequence.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::Lane;

/// Source of uniform samples for spawn decisions
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`
    fn next_f32(&mut self) -> f32;

    /// True with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// Uniform sample in `[lo, hi)`
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }

    /// Fair coin between the two lanes
    fn lane(&mut self) -> Lane {
        if self.chance(0.5) { Lane::Left } else { Lane::Right }
    }
}

/// PCG stream, seeded from OS entropy in production
#[derive(Debug, Clone)]
pub struct EntropySource(Pcg32);

impl EntropySource {
    /// Unseeded: every run differs
    pub fn from_os() -> Self {
        Self(Pcg32::from_os_rng())
    }

    /// Reproducible stream for tests and the headless demo
    pub fn seeded(seed: u64) -> Self {
        Self(Pcg32::seed_from_u64(seed))
    }
}

impl RandomSource for EntropySource {
    fn next_f32(&mut self) -> f32 {
        self.0.random::<f32>()
    }
}

/// Replays a fixed list of samples, wrapping around at the end
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    samples: Vec<f32>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(samples: impl Into<Vec<f32>>) -> Self {
        Self {
            samples: samples.into(),
            cursor: 0,
        }
    }

    /// Always returns the same sample
    pub fn constant(sample: f32) -> Self {
        Self::new(vec![sample])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f32(&mut self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sample = self.samples[self.cursor % self.samples.len()];
        self.cursor = self.cursor.wrapping_add(1);
        sample.clamp(0.0, 1.0 - f32::EPSILON)
    }
}
