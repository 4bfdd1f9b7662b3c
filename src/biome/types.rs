//! Biome definitions: categories, climate vectors and the biome record

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Closed set of biome categories the resolvers classify into
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiomeCategory {
    Ocean,
    DeepOcean,
    Beach,
    Icy,
    Tundra,
    Taiga,
    Plains,
    Forest,
    Swamp,
    Desert,
    Savanna,
    Badlands,
    Jungle,
    Rainforest,
    Mountain,
    Wetland,
}

impl BiomeCategory {
    pub const ALL: [BiomeCategory; 16] = [
        BiomeCategory::Ocean,
        BiomeCategory::DeepOcean,
        BiomeCategory::Beach,
        BiomeCategory::Icy,
        BiomeCategory::Tundra,
        BiomeCategory::Taiga,
        BiomeCategory::Plains,
        BiomeCategory::Forest,
        BiomeCategory::Swamp,
        BiomeCategory::Desert,
        BiomeCategory::Savanna,
        BiomeCategory::Badlands,
        BiomeCategory::Jungle,
        BiomeCategory::Rainforest,
        BiomeCategory::Mountain,
        BiomeCategory::Wetland,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BiomeCategory::Ocean => "ocean",
            BiomeCategory::DeepOcean => "deep_ocean",
            BiomeCategory::Beach => "beach",
            BiomeCategory::Icy => "icy",
            BiomeCategory::Tundra => "tundra",
            BiomeCategory::Taiga => "taiga",
            BiomeCategory::Plains => "plains",
            BiomeCategory::Forest => "forest",
            BiomeCategory::Swamp => "swamp",
            BiomeCategory::Desert => "desert",
            BiomeCategory::Savanna => "savanna",
            BiomeCategory::Badlands => "badlands",
            BiomeCategory::Jungle => "jungle",
            BiomeCategory::Rainforest => "rainforest",
            BiomeCategory::Mountain => "mountain",
            BiomeCategory::Wetland => "wetland",
        }
    }

    pub fn is_ocean(self) -> bool {
        matches!(self, BiomeCategory::Ocean | BiomeCategory::DeepOcean)
    }
}

/// Kind of precipitation falling in a biome
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precipitation {
    None,
    #[default]
    Rain,
    Snow,
}

/// Normalized climate coordinates, each in [0, 1]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClimateVector {
    pub temperature: f64,
    pub humidity: f64,
    pub elevation: f64,
    pub rainfall: f64,
}

impl ClimateVector {
    /// Create a climate vector, clamping every component to [0, 1]
    pub fn new(temperature: f64, humidity: f64, elevation: f64, rainfall: f64) -> Self {
        Self {
            temperature: clamp_unit(temperature),
            humidity: clamp_unit(humidity),
            elevation: clamp_unit(elevation),
            rainfall: clamp_unit(rainfall),
        }
    }

    /// Copy with every component clamped to [0, 1]
    pub fn clamped(&self) -> Self {
        Self::new(self.temperature, self.humidity, self.elevation, self.rainfall)
    }

    /// Euclidean distance in (t, h, e, r) space
    pub fn distance(&self, other: &ClimateVector) -> f64 {
        let dt = self.temperature - other.temperature;
        let dh = self.humidity - other.humidity;
        let de = self.elevation - other.elevation;
        let dr = self.rainfall - other.rainfall;
        (dt * dt + dh * dh + de * de + dr * dr).sqrt()
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Packed 0xRRGGBB colors used by a biome
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiomeColors {
    pub fog: u32,
    pub water: u32,
    pub water_fog: u32,
}

impl Default for BiomeColors {
    fn default() -> Self {
        Self {
            fog: 0xC0D8FF,
            water: 0x3F76E4,
            water_fog: 0x050533,
        }
    }
}

/// Terrain height sampler attached to a biome
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightProfile {
    /// Base surface height in blocks
    pub base: f64,
    /// Height variation applied to a [-1, 1] noise sample
    pub amplitude: f64,
}

impl Default for HeightProfile {
    fn default() -> Self {
        Self { base: 64.0, amplitude: 8.0 }
    }
}

impl HeightProfile {
    /// Surface height for a [-1, 1] noise sample
    pub fn sample(&self, noise: f64) -> f64 {
        self.base + self.amplitude * noise.clamp(-1.0, 1.0)
    }

    fn for_category(category: BiomeCategory) -> Self {
        match category {
            BiomeCategory::DeepOcean => Self { base: 30.0, amplitude: 6.0 },
            BiomeCategory::Ocean => Self { base: 45.0, amplitude: 5.0 },
            BiomeCategory::Beach => Self { base: 63.0, amplitude: 1.0 },
            BiomeCategory::Swamp | BiomeCategory::Wetland => Self { base: 62.0, amplitude: 2.0 },
            BiomeCategory::Mountain => Self { base: 110.0, amplitude: 40.0 },
            BiomeCategory::Badlands => Self { base: 80.0, amplitude: 20.0 },
            _ => Self::default(),
        }
    }
}

/// A named climate/terrain classification
///
/// Constructed once when a palette is built and immutable afterwards.
/// Climate components are always within [0, 1].
#[derive(Clone, Debug, PartialEq)]
pub struct Biome {
    namespace: String,
    name: String,
    colors: BiomeColors,
    ocean: bool,
    climate: ClimateVector,
    category: BiomeCategory,
    precipitation: Precipitation,
    height: HeightProfile,
    structure_tags: BTreeSet<String>,
}

impl Biome {
    /// Create a biome with attributes derived from its category
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        category: BiomeCategory,
        climate: ClimateVector,
    ) -> Self {
        let climate = climate.clamped();
        let precipitation = if climate.temperature < 0.2 {
            Precipitation::Snow
        } else if matches!(category, BiomeCategory::Desert | BiomeCategory::Badlands | BiomeCategory::Savanna) {
            Precipitation::None
        } else {
            Precipitation::Rain
        };
        Self {
            namespace: namespace.into(),
            name: name.into(),
            colors: BiomeColors::default(),
            ocean: category.is_ocean(),
            climate,
            category,
            precipitation,
            height: HeightProfile::for_category(category),
            structure_tags: BTreeSet::new(),
        }
    }

    /// Build from a serialized definition, filling defaults and clamping
    pub fn from_def(def: BiomeDef) -> Self {
        let mut biome = Self::new(def.namespace, def.name, def.category, def.climate);
        biome.apply(BiomeChanges {
            colors: def.colors,
            ocean: def.ocean,
            precipitation: def.precipitation,
            height: def.height,
            structure_tags: Some(def.structure_tags),
            ..Default::default()
        });
        biome
    }

    /// Serializable form of this biome
    pub fn to_def(&self) -> BiomeDef {
        BiomeDef {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            category: self.category,
            climate: self.climate,
            colors: Some(self.colors),
            ocean: Some(self.ocean),
            precipitation: Some(self.precipitation),
            height: Some(self.height),
            structure_tags: self.structure_tags.clone(),
        }
    }

    /// New biome with the set fields of `changes` applied and the rest copied
    pub fn with_changes(&self, changes: BiomeChanges) -> Self {
        let mut biome = self.clone();
        biome.apply(changes);
        biome
    }

    /// Add structure tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.structure_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    fn apply(&mut self, changes: BiomeChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(colors) = changes.colors {
            self.colors = colors;
        }
        if let Some(ocean) = changes.ocean {
            self.ocean = ocean;
        }
        if let Some(climate) = changes.climate {
            self.climate = climate.clamped();
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(precipitation) = changes.precipitation {
            self.precipitation = precipitation;
        }
        if let Some(height) = changes.height {
            self.height = height;
        }
        if let Some(tags) = changes.structure_tags {
            self.structure_tags = tags;
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `namespace:name`
    pub fn key(&self) -> String {
        format!("{}:{}", self.namespace, self.name)
    }

    pub fn colors(&self) -> BiomeColors {
        self.colors
    }

    pub fn is_ocean(&self) -> bool {
        self.ocean
    }

    pub fn climate(&self) -> &ClimateVector {
        &self.climate
    }

    pub fn temperature(&self) -> f64 {
        self.climate.temperature
    }

    pub fn humidity(&self) -> f64 {
        self.climate.humidity
    }

    pub fn elevation(&self) -> f64 {
        self.climate.elevation
    }

    pub fn rainfall(&self) -> f64 {
        self.climate.rainfall
    }

    pub fn category(&self) -> BiomeCategory {
        self.category
    }

    pub fn precipitation(&self) -> Precipitation {
        self.precipitation
    }

    pub fn height(&self) -> &HeightProfile {
        &self.height
    }

    pub fn structure_tags(&self) -> &BTreeSet<String> {
        &self.structure_tags
    }

    /// True if the biome carries any of the given tags
    pub fn has_any_tag<'a>(&self, tags: impl IntoIterator<Item = &'a String>) -> bool {
        tags.into_iter().any(|t| self.structure_tags.contains(t))
    }
}

/// Partial update for [`Biome::with_changes`]; `None` fields are copied
#[derive(Clone, Debug, Default)]
pub struct BiomeChanges {
    pub name: Option<String>,
    pub colors: Option<BiomeColors>,
    pub ocean: Option<bool>,
    pub climate: Option<ClimateVector>,
    pub category: Option<BiomeCategory>,
    pub precipitation: Option<Precipitation>,
    pub height: Option<HeightProfile>,
    pub structure_tags: Option<BTreeSet<String>>,
}

/// Serialized biome definition (palette files)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BiomeDef {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub name: String,
    pub category: BiomeCategory,
    pub climate: ClimateVector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<BiomeColors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocean: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<Precipitation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<HeightProfile>,
    #[serde(default)]
    pub structure_tags: BTreeSet<String>,
}

fn default_namespace() -> String {
    "voxgen".to_string()
}

// Derived properties

pub fn is_cold(biome: &Biome) -> bool {
    biome.temperature() < 0.3
}

pub fn is_humid(biome: &Biome) -> bool {
    biome.humidity() > 0.6
}

pub fn is_dry(biome: &Biome) -> bool {
    biome.rainfall() < 0.25 && biome.humidity() < 0.4
}

pub fn is_mountainous(biome: &Biome) -> bool {
    biome.category() == BiomeCategory::Mountain || biome.elevation() > 0.82
}
