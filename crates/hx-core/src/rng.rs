//! Seedable RNG for spawn decisions.
//!
//! # Determinism strategy
//!
//! A scenario owns one root `SpawnRng`.  Every execution context that draws
//! spawn decisions (the burst worker, each per-tick spawn leaf) gets its own
//! child, derived as:
//!
//!   child_seed = root.next_u64() XOR (offset * MIXING_CONSTANT)
//!
//! so contexts never share RNG state across threads and a fixed root seed
//! reproduces every context's decision stream.  Without a seed the root is
//! drawn from OS entropy.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// RNG used for per-slot Bernoulli trials and blueprint choice.
///
/// `Send` but not `Sync`: move it into the context that uses it.
pub struct SpawnRng(SmallRng);

impl SpawnRng {
    pub fn new(seed: u64) -> Self {
        SpawnRng(SmallRng::seed_from_u64(seed))
    }

    /// Seed from the OS entropy source (non-reproducible runs).
    pub fn from_entropy() -> Self {
        SpawnRng(SmallRng::from_entropy())
    }

    /// `new(seed)` when a seed is configured, otherwise `from_entropy()`.
    pub fn seeded_or_entropy(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::new(s),
            None    => Self::from_entropy(),
        }
    }

    /// Derive an independent child RNG, one per execution context.
    pub fn child(&mut self, offset: u64) -> SpawnRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SpawnRng(SmallRng::seed_from_u64(child_seed))
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// `n` independent Bernoulli(p) trials.
    pub fn bernoulli_mask(&mut self, n: usize, p: f64) -> Vec<bool> {
        (0..n).map(|_| self.gen_bool(p)).collect()
    }

    /// Choose a uniformly random element; `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        slice.choose(&mut self.0)
    }
}
