//! Biome registry: the process-scoped owner of the active palette

use std::path::Path;

use crate::core::{Error, Result};

use super::palette::BiomePalette;
use super::types::{Biome, BiomeCategory, BiomeColors, BiomeChanges, BiomeDef, ClimateVector};

const NAMESPACE: &str = "voxgen";

/// Built-in palette covering every category
pub fn default_palette() -> BiomePalette {
    use BiomeCategory as C;
    let b = |name: &str, category: C, t: f64, h: f64, e: f64, r: f64| {
        Biome::new(NAMESPACE, name, category, ClimateVector::new(t, h, e, r))
    };
    let ocean_colors = BiomeColors { fog: 0xC0D8FF, water: 0x3F76E4, water_fog: 0x050533 };
    let swamp_colors = BiomeColors { fog: 0xC0D8FF, water: 0x617B64, water_fog: 0x232317 };
    let warm_water = BiomeColors { fog: 0xC0D8FF, water: 0x43D5EE, water_fog: 0x041F33 };

    BiomePalette::from_biomes([
        b("deep_ocean", C::DeepOcean, 0.5, 0.8, 0.05, 0.5).with_changes(BiomeChanges {
            colors: Some(ocean_colors),
            ..Default::default()
        }),
        b("ocean", C::Ocean, 0.5, 0.8, 0.2, 0.5).with_tags(["shipwreck"]),
        b("warm_ocean", C::Ocean, 0.85, 0.8, 0.2, 0.6).with_changes(BiomeChanges {
            colors: Some(warm_water),
            ..Default::default()
        }),
        b("beach", C::Beach, 0.6, 0.5, 0.33, 0.4).with_tags(["shipwreck"]),
        b("ice_spikes", C::Icy, 0.05, 0.2, 0.6, 0.2).with_tags(["igloo"]),
        b("snowy_tundra", C::Tundra, 0.15, 0.4, 0.45, 0.3).with_tags(["igloo", "village"]),
        b("taiga", C::Taiga, 0.35, 0.6, 0.5, 0.5).with_tags(["village", "cabin"]),
        b("plains", C::Plains, 0.55, 0.45, 0.4, 0.45).with_tags(["village", "well"]),
        b("meadow", C::Plains, 0.5, 0.55, 0.55, 0.5).with_tags(["village"]),
        b("forest", C::Forest, 0.55, 0.6, 0.55, 0.55).with_tags(["cabin"]),
        b("swamp", C::Swamp, 0.6, 0.85, 0.36, 0.75)
            .with_changes(BiomeChanges { colors: Some(swamp_colors), ..Default::default() })
            .with_tags(["witch_hut"]),
        b("desert", C::Desert, 0.9, 0.1, 0.4, 0.1).with_tags(["well", "temple"]),
        b("savanna", C::Savanna, 0.8, 0.4, 0.45, 0.35).with_tags(["village"]),
        b("badlands", C::Badlands, 0.9, 0.15, 0.7, 0.15).with_tags(["mineshaft"]),
        b("jungle", C::Jungle, 0.85, 0.6, 0.5, 0.65).with_tags(["temple"]),
        b("rainforest", C::Rainforest, 0.9, 0.9, 0.5, 0.9).with_tags(["temple"]),
        b("mountains", C::Mountain, 0.4, 0.4, 0.9, 0.4).with_tags(["cabin"]),
        b("jagged_peaks", C::Mountain, 0.15, 0.5, 0.97, 0.6),
        b("marsh", C::Wetland, 0.6, 0.8, 0.38, 0.95).with_tags(["witch_hut"]),
        b("mangrove_wetland", C::Wetland, 0.9, 0.9, 0.35, 0.9).with_tags(["witch_hut"]),
    ])
}

/// Parse a palette from a JSON array of [`BiomeDef`]s
pub fn palette_from_json(json: &str) -> Result<BiomePalette> {
    let defs: Vec<BiomeDef> = serde_json::from_str(json)?;
    if defs.is_empty() {
        return Err(Error::config("biome palette file contains no biomes"));
    }
    Ok(BiomePalette::from_biomes(defs.into_iter().map(Biome::from_def)))
}

/// Owns the biome palette for one generation context.
///
/// Built once at startup and passed by reference to whatever needs biomes.
#[derive(Clone, Debug)]
pub struct BiomeRegistry {
    palette: BiomePalette,
}

impl Default for BiomeRegistry {
    fn default() -> Self {
        Self { palette: default_palette() }
    }
}

impl BiomeRegistry {
    pub fn new(palette: BiomePalette) -> Self {
        Self { palette }
    }

    /// Load palette from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::new(palette_from_json(&json)?))
    }

    pub fn palette(&self) -> &BiomePalette {
        &self.palette
    }

    pub fn get(&self, key: &str) -> Option<&Biome> {
        self.palette.find(key)
    }

    /// Register a biome; a duplicate key is a configuration error
    pub fn register(&mut self, biome: Biome) -> Result<()> {
        if self.palette.find(&biome.key()).is_some() {
            return Err(Error::config(format!("biome `{}` registered twice", biome.key())));
        }
        self.palette.push(biome);
        Ok(())
    }

    /// Categories with no registered biome
    pub fn missing_categories(&self) -> Vec<BiomeCategory> {
        BiomeCategory::ALL
            .into_iter()
            .filter(|&c| !self.palette.has_category(c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette_covers_all_categories() {
        let registry = BiomeRegistry::default();
        assert!(registry.missing_categories().is_empty());
        assert!(registry.get("voxgen:plains").is_some());
        assert!(registry.get("desert").is_some());
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = BiomeRegistry::new(BiomePalette::new());
        let b = Biome::new("x", "y", BiomeCategory::Plains, ClimateVector::default());
        registry.register(b.clone()).unwrap();
        assert!(registry.register(b).is_err());
        assert_eq!(registry.palette().len(), 1);
    }

    #[test]
    fn test_palette_from_json() {
        let json = r#"[
            {"name": "glacier", "category": "icy",
             "climate": {"temperature": 0.0, "humidity": 0.3, "elevation": 0.8, "rainfall": 0.2},
             "structure_tags": ["igloo"]},
            {"namespace": "mod", "name": "bog", "category": "wetland",
             "climate": {"temperature": 0.4, "humidity": 0.9, "elevation": 0.3, "rainfall": 0.95}}
        ]"#;
        let palette = palette_from_json(json).unwrap();
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.find("mod:bog").map(|b| b.category()), Some(BiomeCategory::Wetland));
        assert!(palette_from_json("[]").is_err());
        assert!(matches!(palette_from_json("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("biomes.json");
        let defs: Vec<_> = default_palette().iter().map(Biome::to_def).collect();
        std::fs::write(&path, serde_json::to_string_pretty(&defs).unwrap()).unwrap();
        let registry = BiomeRegistry::load(&path).unwrap();
        assert_eq!(registry.palette().len(), default_palette().len());
    }
}
