//! Seeded fractal noise fields.
//!
//! A [`NoiseSampler`] maps a 2D world coordinate to a scalar in [-1, 1]. The
//! same sampler (same seed and parameters) always returns the same value for
//! the same coordinate. Samplers compose through [`LayeredNoise`].

use ::noise::{Fbm, MultiFractal, NoiseFn, Perlin, Value};
use serde::{Deserialize, Serialize};

const MAX_OCTAVES: usize = 32;

/// A deterministic 2D scalar field with values in [-1, 1]
pub trait NoiseSampler: Send + Sync {
    fn sample(&self, x: f64, z: f64) -> f64;
}

/// Base noise used for each octave
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    #[default]
    Perlin,
    Value,
}

/// Parameters for fractal Brownian motion noise
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    pub seed: u32,
    pub kind: NoiseKind,
    pub octaves: usize,   // FBM octaves (detail levels)
    pub frequency: f64,   // Base frequency in cycles per block
    pub lacunarity: f64,  // Frequency multiplier per octave (2.0 typical)
    pub gain: f64,        // Amplitude multiplier per octave (0.5 typical)
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            seed: 12345,
            kind: NoiseKind::Perlin,
            octaves: 4,
            frequency: 1.0 / 256.0,
            lacunarity: 2.0,
            gain: 0.5,
        }
    }
}

impl NoiseParams {
    /// Same parameters with a different seed and frequency
    pub fn with_seed_frequency(&self, seed: u32, frequency: f64) -> Self {
        Self {
            seed,
            frequency,
            ..self.clone()
        }
    }
}

enum FbmSource {
    Perlin(Fbm<Perlin>),
    Value(Fbm<Value>),
}

/// Fractal noise built on the `noise` crate's FBM
pub struct FractalNoise {
    params: NoiseParams,
    source: FbmSource,
}

impl FractalNoise {
    /// Create a new fractal noise field
    pub fn new(params: NoiseParams) -> Self {
        let octaves = params.octaves.clamp(1, MAX_OCTAVES);
        let source = match params.kind {
            NoiseKind::Perlin => FbmSource::Perlin(
                Fbm::<Perlin>::new(params.seed)
                    .set_octaves(octaves)
                    .set_frequency(params.frequency)
                    .set_lacunarity(params.lacunarity)
                    .set_persistence(params.gain),
            ),
            NoiseKind::Value => FbmSource::Value(
                Fbm::<Value>::new(params.seed)
                    .set_octaves(octaves)
                    .set_frequency(params.frequency)
                    .set_lacunarity(params.lacunarity)
                    .set_persistence(params.gain),
            ),
        };
        Self { params, source }
    }

    /// Get noise parameters
    pub fn params(&self) -> &NoiseParams {
        &self.params
    }
}

impl NoiseSampler for FractalNoise {
    fn sample(&self, x: f64, z: f64) -> f64 {
        let v = match &self.source {
            FbmSource::Perlin(fbm) => fbm.get([x, z]),
            FbmSource::Value(fbm) => fbm.get([x, z]),
        };
        if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 }
    }
}

/// A field that returns the same value everywhere
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantNoise(pub f64);

impl NoiseSampler for ConstantNoise {
    fn sample(&self, _x: f64, _z: f64) -> f64 {
        self.0.clamp(-1.0, 1.0)
    }
}

/// Weighted sum of several fields, normalised by total absolute weight
#[derive(Default)]
pub struct LayeredNoise {
    layers: Vec<(Box<dyn NoiseSampler>, f64)>,
}

impl LayeredNoise {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer with the given weight
    pub fn with_layer(mut self, sampler: impl NoiseSampler + 'static, weight: f64) -> Self {
        self.layers.push((Box::new(sampler), weight));
        self
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

impl NoiseSampler for LayeredNoise {
    fn sample(&self, x: f64, z: f64) -> f64 {
        let total: f64 = self.layers.iter().map(|(_, w)| w.abs()).sum();
        if total <= 0.0 {
            return 0.0;
        }
        let sum: f64 = self.layers.iter().map(|(s, w)| s.sample(x, z) * w).sum();
        (sum / total).clamp(-1.0, 1.0)
    }
}

/// Map a raw [-1, 1] sample to [0, 1]
pub fn normalize_unit(v: f64) -> f64 {
    ((v + 1.0) * 0.5).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractal_is_deterministic() {
        let a = FractalNoise::new(NoiseParams::default());
        let b = FractalNoise::new(NoiseParams::default());
        for i in 0..50 {
            let (x, z) = (i as f64 * 13.7, i as f64 * -5.3);
            assert_eq!(a.sample(x, z), b.sample(x, z));
        }
    }

    #[test]
    fn test_fractal_range() {
        for kind in [NoiseKind::Perlin, NoiseKind::Value] {
            let n = FractalNoise::new(NoiseParams { kind, octaves: 6, ..Default::default() });
            for i in -100..100 {
                let v = n.sample(i as f64 * 3.1, i as f64 * 7.9);
                assert!((-1.0..=1.0).contains(&v), "{kind:?} produced {v}");
            }
        }
    }

    #[test]
    fn test_seed_changes_field() {
        let a = FractalNoise::new(NoiseParams { seed: 1, ..Default::default() });
        let b = FractalNoise::new(NoiseParams { seed: 2, ..Default::default() });
        let differs = (0..64).any(|i| {
            let p = i as f64 * 17.3 + 0.5;
            a.sample(p, -p) != b.sample(p, -p)
        });
        assert!(differs);
    }

    #[test]
    fn test_layered_weights() {
        let layered = LayeredNoise::new()
            .with_layer(ConstantNoise(1.0), 3.0)
            .with_layer(ConstantNoise(-1.0), 1.0);
        assert_eq!(layered.layer_count(), 2);
        assert!((layered.sample(0.0, 0.0) - 0.5).abs() < 1e-12);
        assert_eq!(LayeredNoise::new().sample(1.0, 1.0), 0.0);
    }

    #[test]
    fn test_normalize_unit() {
        assert_eq!(normalize_unit(-1.0), 0.0);
        assert_eq!(normalize_unit(1.0), 1.0);
        assert!((normalize_unit(0.9) - 0.95).abs() < 1e-12);
        assert_eq!(normalize_unit(3.0), 1.0);
    }
}
