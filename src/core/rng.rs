//! Deterministic random number generation.
//!
//! The engine owns one seeded RNG per game so that scripted effects which
//! pick random cards (conjuring, discover-style offers) replay identically
//! from the same seed. Deck construction and shuffling happen outside the
//! engine and are not drawn from this stream.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic RNG for in-game randomness.
///
/// Uses ChaCha8 for speed while maintaining cryptographic quality randomness.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this RNG was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a value in the given range.
    pub fn gen_range(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }

    /// Pick one element of a slice at random.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let mut a = GameRng::new(42);
        let mut b = GameRng::new(42);

        for _ in 0..32 {
            assert_eq!(a.gen_range(0..1000), b.gen_range(0..1000));
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = GameRng::new(1);
        let mut b = GameRng::new(2);

        let xs: Vec<_> = (0..16).map(|_| a.gen_range(0..1_000_000)).collect();
        let ys: Vec<_> = (0..16).map(|_| b.gen_range(0..1_000_000)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = GameRng::new(7);
        let mut items: Vec<u32> = (0..20).collect();
        rng.shuffle(&mut items);

        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_pick_from_empty() {
        let mut rng = GameRng::new(7);
        let empty: [u32; 0] = [];
        assert!(rng.pick(&empty).is_none());
    }
}
