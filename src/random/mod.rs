//! Forkable seeded random source.
//!
//! Every generator takes a [`RandomSource`] instead of touching shared
//! state. Independent streams are derived with [`RandomSource::fork`], which
//! depends only on the parent seed and the modifier, never on how many
//! values the parent has already produced. Re-running with the same
//! top-level seed therefore reproduces identical output.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// SplitMix64 finalizer, used to decorrelate seeds
pub fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Hash an integer 2D coordinate into a fork modifier
pub fn hash_coords(x: i32, z: i32) -> u64 {
    mix64(((x as u32 as u64) << 32) | z as u32 as u64)
}

/// Hash a string id into a fork modifier (FNV-1a, stable across runs)
pub fn hash_str(s: &str) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in s.bytes() {
        h ^= b as u64;
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    h
}

/// Deterministic pseudo-random stream with cheap forking
#[derive(Clone, Debug)]
pub struct RandomSource {
    seed: u64,
    rng: ChaCha8Rng,
}

impl RandomSource {
    /// Create a stream from a seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seed this stream was created from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Derive an independent stream keyed by `modifier`
    pub fn fork(&self, modifier: u64) -> RandomSource {
        RandomSource::new(mix64(self.seed ^ mix64(modifier.wrapping_add(0x5851_F42D_4C95_7F2D))))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// Uniform float in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }

    /// Uniform float in [min, max); returns `min` for empty ranges
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Uniform integer in [min, max] (inclusive); returns `min` for empty ranges
    pub fn range_i32(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// True with probability `p` (clamped to [0, 1])
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform index in [0, len); `None` when `len` is zero
    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.rng.gen_range(0..len))
        }
    }
}
