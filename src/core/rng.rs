//! Deterministic random number generation.
//!
//! Uses ChaCha8 seeded per session: production sessions seed from entropy,
//! tests pass a fixed seed and get reproducible shuffles and starting-player
//! flips. `shuffle` is a uniform-random permutation (Fisher-Yates via
//! `SliceRandom`).

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded RNG for deck shuffles and the starting-player coin flip.
#[derive(Clone, Debug)]
pub struct DuelRng {
    inner: ChaCha8Rng,
}

impl DuelRng {
    /// Create an RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Create an RNG seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha8Rng::from_entropy(),
        }
    }

    /// Shuffle a slice in place with a uniform permutation.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }

    /// Fair coin flip.
    pub fn coin_flip(&mut self) -> bool {
        self.inner.gen_bool(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = DuelRng::new(42);
        let mut rng2 = DuelRng::new(42);

        let mut a: Vec<u32> = (0..40).collect();
        let mut b: Vec<u32> = (0..40).collect();
        rng1.shuffle(&mut a);
        rng2.shuffle(&mut b);

        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = DuelRng::new(7);
        let mut data: Vec<u32> = (0..40).collect();
        rng.shuffle(&mut data);

        assert_ne!(data, (0..40).collect::<Vec<_>>()); // overwhelmingly likely
        data.sort_unstable();
        assert_eq!(data, (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn test_coin_flip_hits_both_sides() {
        let mut rng = DuelRng::new(3);
        let flips: Vec<bool> = (0..64).map(|_| rng.coin_flip()).collect();

        assert!(flips.iter().any(|&f| f));
        assert!(flips.iter().any(|&f| !f));
    }
}
