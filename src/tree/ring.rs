//! Fan-out of several branches around one attachment point

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::random::{RandomSource, mix64};

/// Largest jitter as a fraction of the angular step between neighbours
pub const MAX_JITTER_FRACTION: f64 = 0.45;

/// Evenly spaced azimuths with a random base orientation and bounded jitter
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RingBranchRule {
    pub max_count: usize,
    pub jitter_radians: f64,
}

impl RingBranchRule {
    pub fn new(max_count: usize, jitter_radians: f64) -> Self {
        Self { max_count, jitter_radians }
    }

    /// Angular distance between neighbouring branches
    pub fn step(&self) -> f64 {
        if self.max_count == 0 { TAU } else { TAU / self.max_count as f64 }
    }

    /// Effective jitter after capping to [`MAX_JITTER_FRACTION`] of the step
    pub fn effective_jitter(&self) -> f64 {
        self.jitter_radians.abs().min(self.step() * MAX_JITTER_FRACTION)
    }

    /// Decide `max_count` azimuths in [0, 2π)
    pub fn decide(&self, rng: &mut RandomSource) -> Vec<f64> {
        if self.max_count == 0 {
            return Vec::new();
        }
        let step = self.step();
        let jitter = self.effective_jitter();
        let base = rng.range_f64(0.0, TAU);
        (0..self.max_count)
            .map(|i| {
                let offset = if jitter > 0.0 { rng.range_f64(-jitter, jitter) } else { 0.0 };
                (base + step * i as f64 + offset).rem_euclid(TAU)
            })
            .collect()
    }
}

/// Seed for the branch at `index` with azimuth `angle`
pub(crate) fn child_seed(base_seed: u64, angle: f64, index: usize) -> u64 {
    base_seed ^ mix64(angle.to_bits()) ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circular_distance(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(TAU);
        d.min(TAU - d)
    }

    #[test]
    fn test_four_angles_with_heavy_jitter() {
        let rule = RingBranchRule::new(4, 1.0);
        let step = rule.step();
        assert!((rule.effective_jitter() - step * 0.45).abs() < 1e-12);

        for seed in 0..200 {
            let mut rng = RandomSource::new(seed);
            let angles = rule.decide(&mut rng);
            assert_eq!(angles.len(), 4);
            for (i, a) in angles.iter().enumerate() {
                assert!((0.0..TAU).contains(a), "angle {a} out of range");
                for b in &angles[i + 1..] {
                    let d = circular_distance(*a, *b);
                    assert!(d >= step * 0.1 - 1e-9, "seed {seed}: {a} and {b} only {d} apart");
                }
            }
        }
    }

    #[test]
    fn test_no_jitter_is_even() {
        let rule = RingBranchRule::new(3, 0.0);
        let mut rng = RandomSource::new(5);
        let angles = rule.decide(&mut rng);
        let step = rule.step();
        for pair in angles.windows(2) {
            assert!((circular_distance(pair[0], pair[1]) - step).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_count() {
        let mut rng = RandomSource::new(1);
        assert!(RingBranchRule::new(0, 0.5).decide(&mut rng).is_empty());
    }

    #[test]
    fn test_child_seeds_differ() {
        let a = child_seed(77, 1.0, 0);
        let b = child_seed(77, 1.0, 1);
        let c = child_seed(77, 2.0, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, child_seed(77, 1.0, 0));
    }
}
