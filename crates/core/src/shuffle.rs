use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// A uniformly random ordering of `0..len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    pub fn random<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Self {
        let mut indices: Vec<usize> = (0..len).collect();
        // Fisher-Yates.
        indices.shuffle(rng);
        Self(indices)
    }

    pub fn get(&self, i: usize) -> Option<usize> {
        self.0.get(i).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

/// Builds the run's RNG: fixed when a seed is given, otherwise seeded from the clock.
pub fn seeded_rng(seed: Option<u64>) -> (StdRng, u64) {
    let seed = seed.unwrap_or_else(clock_seed);
    (StdRng::seed_from_u64(seed), seed)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}
