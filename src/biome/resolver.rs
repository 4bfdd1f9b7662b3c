//! Multi-parameter biome resolution.
//!
//! Four independent noise fields (temperature, humidity, elevation,
//! rainfall) are sampled and normalized to [0, 1]. An ordered decision
//! cascade turns the sample into a set of candidate categories, the palette
//! is filtered to those categories, and one biome is picked with weights
//! `max(0, 1 - distance)` in climate space.

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::noise_field::{normalize_unit, FractalNoise, NoiseParams, NoiseSampler};
use crate::random::{hash_coords, RandomSource};

use super::palette::BiomePalette;
use super::types::{Biome, BiomeCategory, ClimateVector};

/// Elevation above which MOUNTAIN is always a candidate
pub const MOUNTAIN_ELEVATION: f64 = 0.82;
/// Rainfall above which WETLAND is always a candidate
pub const WETLAND_RAINFALL: f64 = 0.8;

/// Resolves world coordinates to a biome from a palette
pub trait BiomeResolver: Send + Sync {
    /// Resolve the biome at a world position.
    ///
    /// Never fails: degenerate inputs fall back to a random palette entry.
    /// `seed` keys the selection stream; the noise fields themselves are
    /// seeded when the resolver is built.
    fn resolve_biome(&self, x: i32, y: i32, z: i32, seed: u64) -> &Biome;

    /// Palette this resolver selects from
    fn palette(&self) -> &BiomePalette;
}

/// Noise parameters for the climate fields
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeResolverConfig {
    /// Shared FBM settings; the seed is offset per field
    pub noise: NoiseParams,
    pub temperature_frequency: f64,
    pub humidity_frequency: f64,
    pub elevation_frequency: f64,
    pub rainfall_frequency: f64,
    /// Normalized elevation of the sea surface
    pub sea_level: f64,
    /// Half-width of the probabilistic coastline band
    pub transition_band: f64,
}

impl Default for BiomeResolverConfig {
    fn default() -> Self {
        Self {
            noise: NoiseParams::default(),
            temperature_frequency: 1.0 / 512.0,
            humidity_frequency: 1.0 / 384.0,
            elevation_frequency: 1.0 / 256.0,
            rainfall_frequency: 1.0 / 320.0,
            sea_level: 0.35,
            transition_band: 0.04,
        }
    }
}

impl BiomeResolverConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.sea_level) {
            return Err(Error::config(format!("sea_level {} outside [0, 1]", self.sea_level)));
        }
        if !(self.transition_band >= 0.0) {
            return Err(Error::config("transition_band must be non-negative"));
        }
        let freqs = [
            self.temperature_frequency,
            self.humidity_frequency,
            self.elevation_frequency,
            self.rainfall_frequency,
        ];
        if freqs.iter().any(|f| !(*f > 0.0) || !f.is_finite()) {
            return Err(Error::config("noise frequencies must be positive"));
        }
        Ok(())
    }
}

/// The four climate fields sampled together
pub struct ClimateSampler {
    temperature: Box<dyn NoiseSampler>,
    humidity: Box<dyn NoiseSampler>,
    elevation: Box<dyn NoiseSampler>,
    rainfall: Box<dyn NoiseSampler>,
}

impl ClimateSampler {
    /// Fractal fields with per-parameter frequencies and offset seeds
    pub fn new(config: &BiomeResolverConfig) -> Self {
        let base = &config.noise;
        let field = |offset: u32, frequency: f64| -> Box<dyn NoiseSampler> {
            Box::new(FractalNoise::new(
                base.with_seed_frequency(base.seed.wrapping_add(offset), frequency),
            ))
        };
        Self {
            temperature: field(0, config.temperature_frequency),
            humidity: field(1000, config.humidity_frequency),
            elevation: field(2000, config.elevation_frequency),
            rainfall: field(3000, config.rainfall_frequency),
        }
    }

    /// Use caller-provided fields (flat worlds, tests)
    pub fn from_samplers(
        temperature: impl NoiseSampler + 'static,
        humidity: impl NoiseSampler + 'static,
        elevation: impl NoiseSampler + 'static,
        rainfall: impl NoiseSampler + 'static,
    ) -> Self {
        Self {
            temperature: Box::new(temperature),
            humidity: Box::new(humidity),
            elevation: Box::new(elevation),
            rainfall: Box::new(rainfall),
        }
    }

    /// Normalized climate at a world column
    pub fn sample(&self, x: f64, z: f64) -> ClimateVector {
        ClimateVector::new(
            normalize_unit(self.temperature.sample(x, z)),
            normalize_unit(self.humidity.sample(x, z)),
            normalize_unit(self.elevation.sample(x, z)),
            normalize_unit(self.rainfall.sample(x, z)),
        )
    }
}

/// Per-coordinate selection stream: a pure function of (seed, x, z)
pub(crate) fn selection_rng(seed: u64, x: i32, z: i32) -> RandomSource {
    RandomSource::new(seed).fork(hash_coords(x, z))
}

/// Candidate categories for a climate sample.
///
/// The cascade is deliberately non-exclusive: MOUNTAIN and WETLAND are
/// appended on top of whatever the ocean/temperature branches produced.
pub fn climate_categories(
    climate: &ClimateVector,
    sea_level: f64,
    transition_band: f64,
    rng: &mut RandomSource,
) -> Vec<BiomeCategory> {
    let mut categories = Vec::with_capacity(4);
    let e = climate.elevation;

    let is_ocean = if e < sea_level - transition_band {
        true
    } else if e > sea_level + transition_band {
        false
    } else if transition_band <= 0.0 {
        e < sea_level
    } else {
        let p = (sea_level + transition_band - e) / (2.0 * transition_band);
        rng.chance(p)
    };

    if is_ocean {
        categories.push(BiomeCategory::Ocean);
        if e < sea_level - 2.0 * transition_band {
            categories.push(BiomeCategory::DeepOcean);
        }
    } else {
        let (t, h) = (climate.temperature, climate.humidity);
        let category = if t < 0.25 {
            if h < 0.5 { BiomeCategory::Icy } else { BiomeCategory::Tundra }
        } else if t < 0.45 {
            if h < 0.4 { BiomeCategory::Tundra } else { BiomeCategory::Taiga }
        } else if t < 0.7 {
            if h < 0.7 { BiomeCategory::Plains } else { BiomeCategory::Swamp }
        } else if h < 0.3 {
            BiomeCategory::Desert
        } else if h < 0.5 {
            BiomeCategory::Savanna
        } else if h < 0.7 {
            BiomeCategory::Jungle
        } else {
            BiomeCategory::Rainforest
        };
        categories.push(category);
    }

    if e > MOUNTAIN_ELEVATION {
        categories.push(BiomeCategory::Mountain);
    }
    if climate.rainfall > WETLAND_RAINFALL {
        categories.push(BiomeCategory::Wetland);
    }
    categories
}

/// Pick one of `candidates` (palette indices) weighted by climate proximity.
///
/// Walks candidates in order subtracting weights, so ties favour earlier
/// entries. Zero-weight entries are never chosen unless every weight is
/// zero, in which case the pick is uniform over `candidates`.
pub(crate) fn weighted_pick(
    palette: &BiomePalette,
    candidates: &[usize],
    query: &ClimateVector,
    rng: &mut RandomSource,
) -> Option<usize> {
    let weights: Vec<f64> = candidates
        .iter()
        .map(|&i| {
            palette
                .get(i)
                .map(|b| (1.0 - b.climate().distance(query)).max(0.0))
                .unwrap_or(0.0)
        })
        .collect();
    let total: f64 = weights.iter().sum();

    if total <= 0.0 {
        return rng.pick_index(candidates.len()).map(|i| candidates[i]);
    }

    let mut remainder = rng.next_f64() * total;
    let mut last_positive = None;
    for (&index, &weight) in candidates.iter().zip(&weights) {
        if weight <= 0.0 {
            continue;
        }
        last_positive = Some(index);
        remainder -= weight;
        if remainder <= 0.0 {
            return Some(index);
        }
    }
    // Float round-off can leave a tiny positive remainder
    last_positive
}

/// Uniform pick over the whole palette; the palette is never empty here
pub(crate) fn any_biome<'a>(palette: &'a BiomePalette, rng: &mut RandomSource) -> &'a Biome {
    let index = rng.pick_index(palette.len()).unwrap_or(0);
    &palette.as_slice()[index]
}

/// Cascade + weighted nearest-neighbour biome resolver
pub struct MultiParameterBiomeResolver {
    climate: ClimateSampler,
    palette: BiomePalette,
    sea_level: f64,
    transition_band: f64,
}

impl MultiParameterBiomeResolver {
    /// Build with fractal climate fields from `config`
    pub fn new(config: &BiomeResolverConfig, palette: BiomePalette) -> Result<Self> {
        config.validate()?;
        Self::with_sampler(ClimateSampler::new(config), palette, config.sea_level, config.transition_band)
    }

    /// Build with explicit climate fields
    pub fn with_sampler(
        climate: ClimateSampler,
        palette: BiomePalette,
        sea_level: f64,
        transition_band: f64,
    ) -> Result<Self> {
        if palette.is_empty() {
            return Err(Error::config("biome resolver needs a non-empty palette"));
        }
        Ok(Self {
            climate,
            palette,
            sea_level,
            transition_band: transition_band.max(0.0),
        })
    }

    /// Normalized climate at a world column
    pub fn climate_at(&self, x: i32, z: i32) -> ClimateVector {
        self.climate.sample(x as f64, z as f64)
    }

    pub fn sea_level(&self) -> f64 {
        self.sea_level
    }

    /// Resolve a biome for an already-sampled climate
    pub fn select(&self, climate: &ClimateVector, rng: &mut RandomSource) -> &Biome {
        let categories = climate_categories(climate, self.sea_level, self.transition_band, rng);
        let candidates = self.palette.indices_matching(&categories);

        if candidates.is_empty() {
            log::warn!(
                "No biome in palette for categories {:?} (t={:.2} h={:.2} e={:.2} r={:.2}); using random biome",
                categories, climate.temperature, climate.humidity, climate.elevation, climate.rainfall,
            );
            return any_biome(&self.palette, rng);
        }

        match weighted_pick(&self.palette, &candidates, climate, rng).and_then(|i| self.palette.get(i)) {
            Some(biome) => biome,
            None => any_biome(&self.palette, rng),
        }
    }
}

impl BiomeResolver for MultiParameterBiomeResolver {
    fn resolve_biome(&self, x: i32, _y: i32, z: i32, seed: u64) -> &Biome {
        let climate = self.climate_at(x, z);
        let mut rng = selection_rng(seed, x, z);
        self.select(&climate, &mut rng)
    }

    fn palette(&self) -> &BiomePalette {
        &self.palette
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::registry::default_palette;
    use crate::noise_field::ConstantNoise;

    fn constant_resolver(raw: f64, sea_level: f64, palette: BiomePalette) -> MultiParameterBiomeResolver {
        let sampler = ClimateSampler::from_samplers(
            ConstantNoise(raw),
            ConstantNoise(raw),
            ConstantNoise(raw),
            ConstantNoise(raw),
        );
        MultiParameterBiomeResolver::with_sampler(sampler, palette, sea_level, 0.04).unwrap()
    }

    #[test]
    fn test_hot_wet_high_point_candidates() {
        let climate = ClimateVector::new(0.95, 0.95, 0.95, 0.95);
        let mut rng = RandomSource::new(42);
        let cats = climate_categories(&climate, 0.2, 0.04, &mut rng);
        assert_eq!(
            cats,
            vec![BiomeCategory::Rainforest, BiomeCategory::Mountain, BiomeCategory::Wetland]
        );
    }

    #[test]
    fn test_forced_samples_pick_rainforest_mountain_or_wetland() {
        let resolver = constant_resolver(0.9, 0.2, default_palette());
        for x in -20..20 {
            for z in -5..5 {
                let biome = resolver.resolve_biome(x, 64, z, 42);
                assert!(
                    matches!(
                        biome.category(),
                        BiomeCategory::Rainforest | BiomeCategory::Mountain | BiomeCategory::Wetland
                    ),
                    "unexpected {:?} at ({x}, {z})",
                    biome.category()
                );
            }
        }
    }

    #[test]
    fn test_deep_below_sea_level_is_ocean() {
        let climate = ClimateVector::new(0.5, 0.5, 0.05, 0.3);
        let mut rng = RandomSource::new(1);
        let cats = climate_categories(&climate, 0.35, 0.04, &mut rng);
        assert_eq!(cats, vec![BiomeCategory::Ocean, BiomeCategory::DeepOcean]);
    }

    #[test]
    fn test_temperature_bands() {
        let mut rng = RandomSource::new(1);
        let mut cat = |t: f64, h: f64| climate_categories(&ClimateVector::new(t, h, 0.5, 0.5), 0.2, 0.04, &mut rng)[0];
        assert_eq!(cat(0.1, 0.2), BiomeCategory::Icy);
        assert_eq!(cat(0.1, 0.8), BiomeCategory::Tundra);
        assert_eq!(cat(0.3, 0.2), BiomeCategory::Tundra);
        assert_eq!(cat(0.3, 0.6), BiomeCategory::Taiga);
        assert_eq!(cat(0.5, 0.5), BiomeCategory::Plains);
        assert_eq!(cat(0.5, 0.8), BiomeCategory::Swamp);
        assert_eq!(cat(0.8, 0.1), BiomeCategory::Desert);
        assert_eq!(cat(0.8, 0.4), BiomeCategory::Savanna);
        assert_eq!(cat(0.8, 0.6), BiomeCategory::Jungle);
        assert_eq!(cat(0.8, 0.9), BiomeCategory::Rainforest);
    }

    #[test]
    fn test_transition_band_is_mixed() {
        let climate = ClimateVector::new(0.5, 0.5, 0.35, 0.3);
        let mut ocean = 0;
        for seed in 0..200 {
            let mut rng = RandomSource::new(seed);
            if climate_categories(&climate, 0.35, 0.04, &mut rng)[0] == BiomeCategory::Ocean {
                ocean += 1;
            }
        }
        assert!(ocean > 40 && ocean < 160, "ocean share {ocean}/200 should be near half");
    }

    #[test]
    fn test_empty_candidates_fall_back_to_palette() {
        let only_desert = BiomePalette::from_biomes([Biome::new(
            "t",
            "dunes",
            BiomeCategory::Desert,
            ClimateVector::new(0.9, 0.1, 0.5, 0.1),
        )]);
        let resolver = constant_resolver(-0.9, 0.5, only_desert);
        assert_eq!(resolver.resolve_biome(3, 0, 4, 7).name(), "dunes");
    }

    #[test]
    fn test_weighted_pick_skips_zero_weights() {
        let palette = BiomePalette::from_biomes([
            Biome::new("t", "far", BiomeCategory::Plains, ClimateVector::new(0.0, 0.0, 0.0, 0.0)),
            Biome::new("t", "near", BiomeCategory::Plains, ClimateVector::new(0.9, 0.9, 0.9, 0.9)),
        ]);
        let query = ClimateVector::new(0.9, 0.9, 0.9, 0.9);
        for seed in 0..50 {
            let mut rng = RandomSource::new(seed);
            assert_eq!(weighted_pick(&palette, &[0, 1], &query, &mut rng), Some(1));
        }
    }

    #[test]
    fn test_all_zero_weights_stay_within_candidates() {
        let palette = BiomePalette::from_biomes([
            Biome::new("t", "a", BiomeCategory::Plains, ClimateVector::new(0.0, 0.0, 0.0, 0.0)),
            Biome::new("t", "b", BiomeCategory::Plains, ClimateVector::new(0.0, 0.0, 0.0, 0.0)),
            Biome::new("t", "c", BiomeCategory::Desert, ClimateVector::new(1.0, 1.0, 1.0, 1.0)),
        ]);
        let query = ClimateVector::new(1.0, 1.0, 1.0, 1.0);
        let mut rng = RandomSource::new(3);
        for _ in 0..50 {
            let pick = weighted_pick(&palette, &[0, 1], &query, &mut rng);
            assert!(matches!(pick, Some(0) | Some(1)));
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let resolver = MultiParameterBiomeResolver::new(&BiomeResolverConfig::default(), default_palette()).unwrap();
        for i in 0..100 {
            let (x, z) = (i * 37 - 1500, i * -53 + 800);
            let a = resolver.resolve_biome(x, 64, z, 99);
            let b = resolver.resolve_biome(x, 64, z, 99);
            assert_eq!(a.key(), b.key());
            let c = resolver.climate_at(x, z);
            for v in [c.temperature, c.humidity, c.elevation, c.rainfall] {
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn test_rejects_empty_palette_and_bad_config() {
        assert!(MultiParameterBiomeResolver::new(&BiomeResolverConfig::default(), BiomePalette::new()).is_err());
        let bad = BiomeResolverConfig { sea_level: 1.5, ..Default::default() };
        assert!(matches!(
            MultiParameterBiomeResolver::new(&bad, default_palette()),
            Err(Error::Configuration(_))
        ));
    }
}
