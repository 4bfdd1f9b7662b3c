//! Biome classification from multidimensional climate noise.
//!
//! Two resolvers share the [`BiomeResolver`] interface:
//! - [`MultiParameterBiomeResolver`]: category cascade + weighted nearest-neighbour pick
//! - [`RuleTableBiomeResolver`]: ordered rule table with bounded replacement chains

pub mod types;
pub mod palette;
pub mod resolver;
pub mod rule_table;
pub mod registry;

pub use types::{
    is_cold, is_dry, is_humid, is_mountainous, Biome, BiomeCategory, BiomeChanges, BiomeColors,
    BiomeDef, ClimateVector, HeightProfile, Precipitation,
};
pub use palette::{BiomePalette, Interval, IntervalPalette};
pub use resolver::{BiomeResolver, BiomeResolverConfig, ClimateSampler, MultiParameterBiomeResolver};
pub use rule_table::{BiomeRule, ElevationBand, ReplacementMap, RuleTableBiomeResolver};
pub use registry::{default_palette, palette_from_json, BiomeRegistry};
