//! Process-scoped generation context.
//!
//! A [`GenerationContext`] is built once from a [`GenerationConfig`] and
//! owns everything the generators look up while running:
//! 1. The biome registry and the resolver built over its palette
//! 2. The structure template library
//! 3. The weighted structure placer for the configured rules
//!
//! Call sites borrow the context instead of reaching for global registries.

pub mod config;

pub use config::{GenerationConfig, ResolverKind};

use rayon::prelude::*;

use crate::biome::{Biome, BiomeRegistry, BiomeResolver, MultiParameterBiomeResolver, RuleTableBiomeResolver};
use crate::city::{CityLayoutBuilder, HeightMap};
use crate::core::{Error, Result};
use crate::math::ChunkPos;
use crate::noise_field::{FractalNoise, NoiseSampler};
use crate::random::{RandomSource, hash_str};
use crate::structure::{StructureBox, TemplateLibrary, WeightedStructurePlacer, WorldAccessor};
use crate::tree::{TreeBuilder, TrunkArchetype};

/// Seed offset for the surface relief field
const RELIEF_SEED_OFFSET: u32 = 0x5EA1;
/// Relief varies faster than the climate fields
const RELIEF_FREQUENCY: f64 = 1.0 / 96.0;

/// Registries and resolvers shared by every generator in one world
pub struct GenerationContext {
    config: GenerationConfig,
    registry: BiomeRegistry,
    resolver: Box<dyn BiomeResolver>,
    relief: FractalNoise,
    templates: TemplateLibrary,
    placer: WeightedStructurePlacer,
}

impl GenerationContext {
    /// Build the context, loading the palette and templates named in `config`.
    pub fn new(config: GenerationConfig) -> Result<Self> {
        config.validate()?;

        let registry = match &config.palette_path {
            Some(path) => BiomeRegistry::load(path)?,
            None => BiomeRegistry::default(),
        };
        if registry.palette().is_empty() {
            return Err(Error::config("biome palette is empty"));
        }
        let missing = registry.missing_categories();
        if !missing.is_empty() {
            log::warn!("Biome palette has no entry for {} categories: {:?}", missing.len(), missing);
        }

        let palette = registry.palette().clone();
        let resolver: Box<dyn BiomeResolver> = match config.resolver {
            ResolverKind::MultiParameter => Box::new(MultiParameterBiomeResolver::new(&config.biome, palette)?),
            ResolverKind::RuleTable => Box::new(RuleTableBiomeResolver::new(&config.biome, palette)?),
        };

        let templates = match &config.templates_path {
            Some(path) => TemplateLibrary::load(path)?,
            None => TemplateLibrary::new(),
        };
        let placer = WeightedStructurePlacer::new(config.structures.clone())?;

        let noise = &config.biome.noise;
        let relief = FractalNoise::new(
            noise.with_seed_frequency(noise.seed.wrapping_add(RELIEF_SEED_OFFSET), RELIEF_FREQUENCY),
        );

        log::info!(
            "Generation context ready: seed {}, {:?} resolver, {} biomes, {} templates, {} structure rules",
            config.seed,
            config.resolver,
            registry.palette().len(),
            templates.len(),
            placer.rules().len()
        );

        Ok(Self { config, registry, resolver, relief, templates, placer })
    }

    /// Replace the template library, e.g. with one assembled in code
    pub fn with_templates(mut self, templates: TemplateLibrary) -> Self {
        self.templates = templates;
        self
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    pub fn registry(&self) -> &BiomeRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &dyn BiomeResolver {
        self.resolver.as_ref()
    }

    pub fn templates(&self) -> &TemplateLibrary {
        &self.templates
    }

    pub fn placer(&self) -> &WeightedStructurePlacer {
        &self.placer
    }

    /// Biome at a world position, keyed by the world seed
    pub fn resolve_biome(&self, x: i32, y: i32, z: i32) -> &Biome {
        self.resolver.resolve_biome(x, y, z, self.config.seed)
    }

    /// Surface height from the local biome's height profile
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        let biome = self.resolve_biome(x, 0, z);
        let relief = self.relief.sample(x as f64, z as f64);
        biome.height().sample(relief).round() as i32
    }

    /// Biomes for a `width` x `depth` grid sampled every `step` blocks.
    ///
    /// Rows (constant z) are resolved in parallel; the result is row-major.
    pub fn biome_grid(&self, min_x: i32, min_z: i32, width: usize, depth: usize, step: i32) -> Vec<Vec<&Biome>> {
        let step = step.max(1);
        (0..depth)
            .into_par_iter()
            .map(|row| {
                let z = min_z + row as i32 * step;
                (0..width)
                    .map(|col| self.resolve_biome(min_x + col as i32 * step, 0, z))
                    .collect()
            })
            .collect()
    }

    /// Surface height map of the square of side `2 * half + 1` around a centre
    pub fn height_map(&self, center_x: i32, center_z: i32, half: i32) -> HeightMap {
        let half = half.max(0);
        let rows: Vec<Vec<(i32, i32, i32)>> = (center_z - half..=center_z + half)
            .into_par_iter()
            .map(|z| {
                (center_x - half..=center_x + half)
                    .map(|x| (x, z, self.surface_height(x, z)))
                    .collect()
            })
            .collect();

        let mut map = HeightMap::new();
        for (x, z, y) in rows.into_iter().flatten() {
            map.insert(x, z, y);
        }
        map
    }

    /// Place the configured structures that start in `chunk`
    pub fn place_structures(&self, world: &mut dyn WorldAccessor, chunk: ChunkPos) -> Vec<StructureBox> {
        self.placer
            .place_chunk(self.resolver.as_ref(), &self.templates, world, chunk, self.config.seed)
    }

    /// City builder for the configured city, on a seed forked from the world seed
    pub fn city_builder(&self) -> Result<CityLayoutBuilder> {
        let seed = RandomSource::new(self.config.seed).fork(hash_str("city")).seed();
        CityLayoutBuilder::new(self.config.city.clone(), seed)
    }

    /// Tree builder for an archetype, honouring a configured branching override
    pub fn tree_builder(&self, archetype: TrunkArchetype) -> TreeBuilder {
        let builder = TreeBuilder::new(archetype);
        match &self.config.branching {
            Some(params) => builder.with_branching(params.clone()),
            None => builder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::BlockPos;
    use crate::structure::{InMemoryWorld, StructureRule, StructureTemplate};
    use crate::tree::BranchingParams;

    fn context() -> GenerationContext {
        GenerationContext::new(GenerationConfig::with_seed(42)).unwrap()
    }

    #[test]
    fn test_default_context_builds() {
        let ctx = context();
        assert_eq!(ctx.seed(), 42);
        assert!(!ctx.registry().palette().is_empty());
        assert!(ctx.templates().is_empty());
        assert!(ctx.placer().rules().is_empty());
    }

    #[test]
    fn test_both_resolver_kinds_build() {
        for kind in [ResolverKind::MultiParameter, ResolverKind::RuleTable] {
            let config = GenerationConfig { resolver: kind, ..GenerationConfig::with_seed(1) };
            let ctx = GenerationContext::new(config).unwrap();
            let biome = ctx.resolve_biome(100, 64, -200);
            assert!(ctx.registry().get(&biome.key()).is_some(), "{kind:?} returned unknown biome");
        }
    }

    #[test]
    fn test_missing_palette_file_is_io_error() {
        let config = GenerationConfig {
            palette_path: Some("/nonexistent/voxgen/palette.json".into()),
            ..Default::default()
        };
        assert!(matches!(GenerationContext::new(config), Err(Error::Io(_))));
    }

    #[test]
    fn test_empty_palette_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("palette.json");
        std::fs::write(&path, "[]").unwrap();
        let config = GenerationConfig { palette_path: Some(path), ..Default::default() };
        assert!(matches!(GenerationContext::new(config), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_biome_grid_matches_point_queries() {
        let ctx = context();
        let grid = ctx.biome_grid(-64, 32, 6, 4, 16);
        assert_eq!(grid.len(), 4);
        for (row, biomes) in grid.iter().enumerate() {
            assert_eq!(biomes.len(), 6);
            for (col, biome) in biomes.iter().enumerate() {
                let expected = ctx.resolve_biome(-64 + col as i32 * 16, 0, 32 + row as i32 * 16);
                assert_eq!(biome.key(), expected.key());
            }
        }
    }

    #[test]
    fn test_height_map_covers_square_in_row_order() {
        let ctx = context();
        let map = ctx.height_map(10, -5, 3);
        assert_eq!(map.len(), 49);
        let first = map.iter().next().unwrap();
        assert_eq!((first.0, first.1), (7, -8));
        assert_eq!(map.get(10, -5), Some(ctx.surface_height(10, -5)));
    }

    #[test]
    fn test_place_structures_uses_templates() {
        let config = GenerationConfig {
            structures: vec![StructureRule { spacing: 1, ..StructureRule::new("post") }],
            ..GenerationConfig::with_seed(9)
        };
        let mut templates = TemplateLibrary::new();
        templates.insert(StructureTemplate::filled("post", BlockPos::new(1, 2, 1), "log"));
        let ctx = GenerationContext::new(config).unwrap().with_templates(templates);

        let mut world = InMemoryWorld::new();
        let placed = ctx.place_structures(&mut world, ChunkPos::new(0, 0));
        assert_eq!(placed.len(), 1, "spacing 1 makes every chunk a candidate");
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn test_city_and_tree_builders() {
        let ctx = context();
        let city = ctx.city_builder().unwrap();
        assert_eq!(city.config(), &ctx.config().city);

        let mut config = GenerationConfig::with_seed(5);
        config.branching = Some(BranchingParams { segments: 3, ..Default::default() });
        let ctx = GenerationContext::new(config).unwrap();
        let tree = ctx.tree_builder(TrunkArchetype::Oak).grow(1, glam::DVec3::ZERO);
        assert!(tree.branches.iter().all(|b| b.points.len() <= 4));
    }
}
