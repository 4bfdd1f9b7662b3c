//! Rule-table biome resolution with sparse-palette degradation.
//!
//! An ordered table of [`BiomeRule`]s maps (temperature, rainfall,
//! elevation band) to a category; the first match wins. When the palette has
//! no biome for that category, a [`ReplacementMap`] is followed for a bounded
//! number of hops, then the elevation band's default category is tried, and
//! finally any palette biome is returned.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::random::RandomSource;

use super::palette::{BiomePalette, IntervalPalette};
use super::resolver::{any_biome, selection_rng, weighted_pick, BiomeResolver, BiomeResolverConfig, ClimateSampler};
use super::types::{Biome, BiomeCategory, ClimateVector};

/// Upper bound on replacement-chain hops
pub const MAX_REPLACEMENT_HOPS: usize = 7;

/// Discrete elevation bands, lowest first
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElevationBand {
    Deep,
    Shallow,
    Low,
    Mid,
    High,
    Peak,
}

impl ElevationBand {
    pub const ALL: [ElevationBand; 6] = [
        ElevationBand::Deep,
        ElevationBand::Shallow,
        ElevationBand::Low,
        ElevationBand::Mid,
        ElevationBand::High,
        ElevationBand::Peak,
    ];

    /// Category used when nothing better is available in this band
    pub fn default_category(self) -> BiomeCategory {
        match self {
            ElevationBand::Deep => BiomeCategory::DeepOcean,
            ElevationBand::Shallow => BiomeCategory::Ocean,
            ElevationBand::Low => BiomeCategory::Plains,
            ElevationBand::Mid => BiomeCategory::Forest,
            ElevationBand::High => BiomeCategory::Mountain,
            ElevationBand::Peak => BiomeCategory::Icy,
        }
    }

    /// Normalized-elevation lookup table
    pub fn palette() -> IntervalPalette<ElevationBand> {
        IntervalPalette::new()
            .with(f64::NEG_INFINITY, 0.15, ElevationBand::Deep)
            .with(0.15, 0.3, ElevationBand::Shallow)
            .with(0.3, 0.5, ElevationBand::Low)
            .with(0.5, 0.7, ElevationBand::Mid)
            .with(0.7, 0.85, ElevationBand::High)
            .with(0.85, f64::INFINITY, ElevationBand::Peak)
    }
}

/// One row of the rule table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeRule {
    /// Inclusive temperature range
    pub temperature: (f64, f64),
    /// Inclusive rainfall range
    pub rainfall: (f64, f64),
    pub band: ElevationBand,
    pub category: BiomeCategory,
}

impl BiomeRule {
    pub fn new(temperature: (f64, f64), rainfall: (f64, f64), band: ElevationBand, category: BiomeCategory) -> Self {
        Self { temperature, rainfall, band, category }
    }

    /// Band must match exactly; ranges are widened by `tolerance`
    pub fn matches(&self, temperature: f64, rainfall: f64, band: ElevationBand, tolerance: f64) -> bool {
        let within = |(lo, hi): (f64, f64), v: f64| v >= lo - tolerance && v <= hi + tolerance;
        self.band == band && within(self.temperature, temperature) && within(self.rainfall, rainfall)
    }
}

/// Default rule table, in priority order
pub fn default_rules() -> Vec<BiomeRule> {
    use BiomeCategory as C;
    use ElevationBand as B;
    let any = (0.0, 1.0);
    vec![
        BiomeRule::new(any, any, B::Deep, C::DeepOcean),
        BiomeRule::new((0.0, 0.2), any, B::Shallow, C::Icy),
        BiomeRule::new(any, any, B::Shallow, C::Ocean),
        BiomeRule::new((0.0, 0.25), any, B::Low, C::Tundra),
        BiomeRule::new((0.6, 1.0), (0.8, 1.0), B::Low, C::Wetland),
        BiomeRule::new((0.7, 1.0), (0.0, 0.25), B::Low, C::Desert),
        BiomeRule::new((0.7, 1.0), (0.7, 1.0), B::Low, C::Rainforest),
        BiomeRule::new((0.6, 1.0), (0.45, 0.7), B::Low, C::Jungle),
        BiomeRule::new((0.6, 1.0), (0.25, 0.45), B::Low, C::Savanna),
        BiomeRule::new(any, (0.7, 1.0), B::Low, C::Swamp),
        BiomeRule::new((0.25, 0.45), any, B::Low, C::Taiga),
        BiomeRule::new(any, any, B::Low, C::Plains),
        BiomeRule::new((0.0, 0.25), any, B::Mid, C::Icy),
        BiomeRule::new((0.25, 0.45), any, B::Mid, C::Taiga),
        BiomeRule::new((0.7, 1.0), (0.0, 0.3), B::Mid, C::Badlands),
        BiomeRule::new((0.6, 1.0), (0.6, 1.0), B::Mid, C::Jungle),
        BiomeRule::new(any, any, B::Mid, C::Forest),
        BiomeRule::new((0.0, 0.4), any, B::High, C::Tundra),
        BiomeRule::new((0.7, 1.0), (0.0, 0.3), B::High, C::Badlands),
        BiomeRule::new(any, any, B::High, C::Mountain),
        BiomeRule::new((0.0, 0.5), any, B::Peak, C::Icy),
        BiomeRule::new(any, any, B::Peak, C::Mountain),
    ]
}

/// Category → fallback category edges
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplacementMap {
    edges: BTreeMap<BiomeCategory, BiomeCategory>,
}

impl ReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in fallback chains (acyclic)
    pub fn standard() -> Self {
        use BiomeCategory as C;
        let mut map = Self::new();
        for (from, to) in [
            (C::Rainforest, C::Jungle),
            (C::Jungle, C::Savanna),
            (C::Savanna, C::Plains),
            (C::Badlands, C::Desert),
            (C::Desert, C::Savanna),
            (C::Wetland, C::Swamp),
            (C::Swamp, C::Forest),
            (C::Forest, C::Plains),
            (C::Icy, C::Tundra),
            (C::Tundra, C::Taiga),
            (C::Taiga, C::Forest),
            (C::Mountain, C::Tundra),
            (C::DeepOcean, C::Ocean),
            (C::Ocean, C::Beach),
            (C::Beach, C::Plains),
        ] {
            map.insert(from, to);
        }
        map
    }

    pub fn insert(&mut self, from: BiomeCategory, to: BiomeCategory) {
        self.edges.insert(from, to);
    }

    pub fn get(&self, from: BiomeCategory) -> Option<BiomeCategory> {
        self.edges.get(&from).copied()
    }

    /// Follow edges from `start` for at most `max_hops`, returning the first
    /// category accepted by `populated`
    pub fn walk(
        &self,
        start: BiomeCategory,
        max_hops: usize,
        populated: impl Fn(BiomeCategory) -> bool,
    ) -> Option<BiomeCategory> {
        let mut current = start;
        for _ in 0..max_hops {
            current = self.get(current)?;
            if populated(current) {
                return Some(current);
            }
        }
        None
    }

    /// First cycle found, as the categories on it in walk order
    pub fn find_cycle(&self) -> Option<Vec<BiomeCategory>> {
        for &start in self.edges.keys() {
            let mut path = vec![start];
            let mut current = start;
            while let Some(next) = self.get(current) {
                if let Some(pos) = path.iter().position(|&c| c == next) {
                    return Some(path[pos..].to_vec());
                }
                path.push(next);
                current = next;
            }
        }
        None
    }
}

/// First-match rule table resolver
pub struct RuleTableBiomeResolver {
    climate: ClimateSampler,
    palette: BiomePalette,
    rules: Vec<BiomeRule>,
    tolerance: f64,
    replacements: ReplacementMap,
    bands: IntervalPalette<ElevationBand>,
}

impl RuleTableBiomeResolver {
    /// Resolver with the default rules and replacement chains
    pub fn new(config: &BiomeResolverConfig, palette: BiomePalette) -> Result<Self> {
        config.validate()?;
        Self::with_rules(
            ClimateSampler::new(config),
            palette,
            default_rules(),
            ReplacementMap::standard(),
            0.02,
        )
    }

    /// Resolver with explicit fields, rules and replacement map
    pub fn with_rules(
        climate: ClimateSampler,
        palette: BiomePalette,
        rules: Vec<BiomeRule>,
        replacements: ReplacementMap,
        tolerance: f64,
    ) -> Result<Self> {
        if palette.is_empty() {
            return Err(Error::config("biome resolver needs a non-empty palette"));
        }
        if let Some(rule) = rules.iter().find(|r| r.temperature.0 > r.temperature.1 || r.rainfall.0 > r.rainfall.1) {
            return Err(Error::config(format!("inverted range in rule for {:?}", rule.category)));
        }
        if let Some(cycle) = replacements.find_cycle() {
            log::warn!(
                "Biome replacement map has a cycle {:?}; walks are capped at {} hops",
                cycle, MAX_REPLACEMENT_HOPS,
            );
        }
        Ok(Self {
            climate,
            palette,
            rules,
            tolerance: tolerance.max(0.0),
            replacements,
            bands: ElevationBand::palette(),
        })
    }

    /// Elevation band for a normalized elevation
    pub fn band_of(&self, elevation: f64) -> ElevationBand {
        match self.bands.find(elevation) {
            Some(band) => *band,
            // NaN only
            None => ElevationBand::Deep,
        }
    }

    /// Category the rule table maps `climate` to, before palette fallbacks
    pub fn rule_category(&self, climate: &ClimateVector) -> BiomeCategory {
        let band = self.band_of(climate.elevation);
        self.rules
            .iter()
            .find(|r| r.matches(climate.temperature, climate.rainfall, band, self.tolerance))
            .map(|r| r.category)
            .unwrap_or_else(|| band.default_category())
    }

    /// Populated category for `climate`, or `None` when even the band default is empty
    pub fn resolve_category(&self, climate: &ClimateVector) -> Option<BiomeCategory> {
        let populated = |c: BiomeCategory| self.palette.has_category(c);
        let category = self.rule_category(climate);
        if populated(category) {
            return Some(category);
        }
        if let Some(replacement) = self.replacements.walk(category, MAX_REPLACEMENT_HOPS, populated) {
            return Some(replacement);
        }
        let fallback = self.band_of(climate.elevation).default_category();
        log::warn!("No populated replacement for {:?}; trying band default {:?}", category, fallback);
        populated(fallback).then_some(fallback)
    }

    /// Resolve a biome for an already-sampled climate
    pub fn select(&self, climate: &ClimateVector, rng: &mut RandomSource) -> &Biome {
        let picked = self.resolve_category(climate).and_then(|category| {
            weighted_pick(&self.palette, self.palette.indices_of(category), climate, rng)
        });
        match picked.and_then(|i| self.palette.get(i)) {
            Some(biome) => biome,
            None => {
                log::warn!("Rule table found no populated category; using random biome");
                any_biome(&self.palette, rng)
            }
        }
    }
}

impl BiomeResolver for RuleTableBiomeResolver {
    fn resolve_biome(&self, x: i32, _y: i32, z: i32, seed: u64) -> &Biome {
        let climate = self.climate.sample(x as f64, z as f64);
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

    fn flat_sampler() -> ClimateSampler {
        ClimateSampler::from_samplers(ConstantNoise(0.0), ConstantNoise(0.0), ConstantNoise(0.0), ConstantNoise(0.0))
    }

    fn palette_of(categories: &[BiomeCategory]) -> BiomePalette {
        BiomePalette::from_biomes(categories.iter().map(|&c| {
            Biome::new("t", c.as_str(), c, ClimateVector::new(0.5, 0.5, 0.5, 0.5))
        }))
    }

    fn resolver(palette: BiomePalette, replacements: ReplacementMap) -> RuleTableBiomeResolver {
        RuleTableBiomeResolver::with_rules(flat_sampler(), palette, default_rules(), replacements, 0.02).unwrap()
    }

    #[test]
    fn test_bands() {
        let r = resolver(default_palette(), ReplacementMap::standard());
        assert_eq!(r.band_of(0.0), ElevationBand::Deep);
        assert_eq!(r.band_of(0.2), ElevationBand::Shallow);
        assert_eq!(r.band_of(0.5), ElevationBand::Mid);
        assert_eq!(r.band_of(1.0), ElevationBand::Peak);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let r = resolver(default_palette(), ReplacementMap::standard());
        let hot_wet_low = ClimateVector::new(0.9, 0.5, 0.4, 0.9);
        // Wetland precedes Rainforest in the table
        assert_eq!(r.rule_category(&hot_wet_low), BiomeCategory::Wetland);
        let temperate_mid = ClimateVector::new(0.5, 0.5, 0.6, 0.5);
        assert_eq!(r.rule_category(&temperate_mid), BiomeCategory::Forest);
    }

    #[test]
    fn test_tolerance_widens_ranges() {
        let rule = BiomeRule::new((0.7, 1.0), (0.0, 0.25), ElevationBand::Low, BiomeCategory::Desert);
        assert!(!rule.matches(0.69, 0.1, ElevationBand::Low, 0.0));
        assert!(rule.matches(0.69, 0.1, ElevationBand::Low, 0.02));
        assert!(!rule.matches(0.8, 0.1, ElevationBand::Mid, 0.5));
    }

    #[test]
    fn test_sparse_palette_walks_replacements() {
        // Rainforest → Jungle → Savanna → Plains
        let r = resolver(palette_of(&[BiomeCategory::Plains]), ReplacementMap::standard());
        let climate = ClimateVector::new(0.9, 0.5, 0.4, 0.75);
        assert_eq!(r.rule_category(&climate), BiomeCategory::Rainforest);
        assert_eq!(r.resolve_category(&climate), Some(BiomeCategory::Plains));
        let mut rng = RandomSource::new(5);
        assert_eq!(r.select(&climate, &mut rng).category(), BiomeCategory::Plains);
    }

    #[test]
    fn test_cyclic_map_terminates_and_uses_band_default() {
        let mut cyclic = ReplacementMap::new();
        cyclic.insert(BiomeCategory::Desert, BiomeCategory::Savanna);
        cyclic.insert(BiomeCategory::Savanna, BiomeCategory::Desert);
        assert!(cyclic.find_cycle().is_some());

        let r = resolver(palette_of(&[BiomeCategory::Plains, BiomeCategory::Forest]), cyclic);
        let hot_dry_low = ClimateVector::new(0.9, 0.1, 0.4, 0.1);
        assert_eq!(r.rule_category(&hot_dry_low), BiomeCategory::Desert);
        assert_eq!(r.resolve_category(&hot_dry_low), Some(BiomeCategory::Plains));
    }

    #[test]
    fn test_unpopulated_everything_falls_back_to_palette() {
        let r = resolver(palette_of(&[BiomeCategory::Mountain]), ReplacementMap::new());
        let deep = ClimateVector::new(0.5, 0.5, 0.05, 0.5);
        assert_eq!(r.resolve_category(&deep), None);
        let mut rng = RandomSource::new(1);
        assert_eq!(r.select(&deep, &mut rng).category(), BiomeCategory::Mountain);
    }

    #[test]
    fn test_standard_map_is_acyclic_and_bounded() {
        let map = ReplacementMap::standard();
        assert_eq!(map.find_cycle(), None);
        for start in BiomeCategory::ALL {
            // Walk never panics or loops regardless of populated set
            let _ = map.walk(start, MAX_REPLACEMENT_HOPS, |_| false);
        }
    }

    #[test]
    fn test_resolves_within_palette() {
        let palette = default_palette();
        let r = RuleTableBiomeResolver::new(&BiomeResolverConfig::default(), palette).unwrap();
        for i in 0..200 {
            let biome = r.resolve_biome(i * 91 - 9000, 70, i * 17, 3);
            assert!(r.palette().find(&biome.key()).is_some());
        }
    }

    #[test]
    fn test_rejects_inverted_rule() {
        let rules = vec![BiomeRule::new((0.8, 0.2), (0.0, 1.0), ElevationBand::Low, BiomeCategory::Plains)];
        let result = RuleTableBiomeResolver::with_rules(
            flat_sampler(),
            default_palette(),
            rules,
            ReplacementMap::standard(),
            0.0,
        );
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
