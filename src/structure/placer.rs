//! Weighted, overlap-checked placement of structure templates per chunk

use std::cmp::Ordering;

use super::rule::StructureRule;
use super::template::StructureStore;
use super::world::WorldAccessor;
use crate::biome::BiomeResolver;
use crate::core::Result;
use crate::math::{BlockBox, BlockPos, CHUNK_SIZE, ChunkPos};
use crate::random::{RandomSource, hash_coords, hash_str};

/// A rule that passed the region, frequency and biome checks for one chunk
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedStructureCandidate {
    pub rule_index: usize,
    pub id: String,
    pub origin: BlockPos,
    pub priority: f64,
    pub weight: f64,
}

/// World-space box claimed by a placed structure
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructureBox {
    pub bounds: BlockBox,
    pub id: String,
}

pub struct WeightedStructurePlacer {
    rules: Vec<StructureRule>,
}

impl WeightedStructurePlacer {
    pub fn new(rules: Vec<StructureRule>) -> Result<Self> {
        for rule in &rules {
            rule.validate()?;
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[StructureRule] {
        &self.rules
    }

    /// The one chunk in `chunk`'s region where `rule` may start
    pub fn candidate_chunk(rule: &StructureRule, chunk: ChunkPos, seed: u64) -> ChunkPos {
        region_target(rule, chunk, seed).0
    }

    /// Candidates for `chunk`, highest priority first
    pub fn candidates(
        &self,
        resolver: &dyn BiomeResolver,
        store: &dyn StructureStore,
        world: &dyn WorldAccessor,
        chunk: ChunkPos,
        seed: u64,
    ) -> Vec<PlacedStructureCandidate> {
        let mut out = Vec::new();
        for (i, rule) in self.rules.iter().enumerate() {
            let (target, mut rng) = region_target(rule, chunk, seed);
            if target != chunk {
                continue;
            }
            if rng.next_f64() >= rule.frequency {
                continue;
            }
            if !store.contains(&rule.id) {
                log::warn!("Structure rule `{}` has no template, skipping", rule.id);
                continue;
            }

            let corner = chunk.origin(0);
            let x = corner.x + rng.range_i32(0, CHUNK_SIZE - 1);
            let z = corner.z + rng.range_i32(0, CHUNK_SIZE - 1);
            let y = world.highest_block_y_at(x, z).map_or(0, |h| h + 1);

            if !rule.tags.is_empty() {
                let biome = resolver.resolve_biome(x, y, z, seed);
                if !biome.has_any_tag(&rule.tags) {
                    continue;
                }
            }

            out.push(PlacedStructureCandidate {
                rule_index: i,
                id: rule.id.clone(),
                origin: BlockPos::new(x, y, z),
                priority: rule.weight * rng.next_f64(),
                weight: rule.weight,
            });
        }
        out.sort_by(|a, b| b.priority.partial_cmp(&a.priority).unwrap_or(Ordering::Equal));
        out
    }

    /// Place every non-overlapping candidate for `chunk`.
    ///
    /// Unloaded chunks are skipped without touching the world.
    pub fn place_chunk(
        &self,
        resolver: &dyn BiomeResolver,
        store: &dyn StructureStore,
        world: &mut dyn WorldAccessor,
        chunk: ChunkPos,
        seed: u64,
    ) -> Vec<StructureBox> {
        if !world.is_chunk_loaded(chunk) {
            log::debug!("Chunk {:?} not loaded, skipping structures", chunk);
            return Vec::new();
        }

        let candidates = self.candidates(resolver, store, &*world, chunk, seed);
        let mut placed: Vec<StructureBox> = Vec::new();
        let mut overlapping = 0usize;
        for candidate in candidates {
            let rule = &self.rules[candidate.rule_index];
            let Some(template) = store.get(&rule.id) else {
                continue;
            };
            let bounds = template.bounds(candidate.origin, rule.rotation, rule.mirror);
            if placed.iter().any(|b| b.bounds.intersects(&bounds)) {
                overlapping += 1;
                continue;
            }
            template.place(world, candidate.origin, rule.rotation, rule.mirror);
            placed.push(StructureBox { bounds, id: candidate.id });
        }

        if !placed.is_empty() || overlapping > 0 {
            log::debug!("Chunk {:?}: placed {} structures, {} rejected for overlap", chunk, placed.len(), overlapping);
        }
        placed
    }
}

/// Candidate chunk of the region containing `chunk`, and the region's stream
/// positioned just after choosing it
fn region_target(rule: &StructureRule, chunk: ChunkPos, seed: u64) -> (ChunkPos, RandomSource) {
    let spacing = rule.spacing.max(1);
    let (rx, rz) = (chunk.x.div_euclid(spacing), chunk.z.div_euclid(spacing));
    let mut rng = RandomSource::new(seed).fork(hash_str(&rule.id)).fork(hash_coords(rx, rz));
    let target = ChunkPos::new(rx * spacing + rng.range_i32(0, spacing - 1), rz * spacing + rng.range_i32(0, spacing - 1));
    (target, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{BiomeResolverConfig, MultiParameterBiomeResolver, default_palette};
    use crate::structure::template::{StructureTemplate, TemplateLibrary};
    use crate::structure::world::InMemoryWorld;

    fn resolver() -> MultiParameterBiomeResolver {
        match MultiParameterBiomeResolver::new(&BiomeResolverConfig::default(), default_palette()) {
            Ok(r) => r,
            Err(e) => panic!("default palette rejected: {e}"),
        }
    }

    fn library() -> TemplateLibrary {
        let mut library = TemplateLibrary::new();
        library.insert(StructureTemplate::filled("tower", BlockPos::new(3, 6, 3), "stone"));
        library.insert(StructureTemplate::filled("hut", BlockPos::new(4, 3, 4), "planks"));
        library
    }

    fn every_chunk(id: &str) -> StructureRule {
        StructureRule { spacing: 1, ..StructureRule::new(id) }
    }

    #[test]
    fn test_one_candidate_chunk_per_region() {
        let rule = StructureRule { spacing: 4, ..StructureRule::new("hut") };
        for rx in -2..2 {
            for rz in -2..2 {
                let first = ChunkPos::new(rx * 4, rz * 4);
                let target = WeightedStructurePlacer::candidate_chunk(&rule, first, 7);
                for dx in 0..4 {
                    for dz in 0..4 {
                        let chunk = ChunkPos::new(rx * 4 + dx, rz * 4 + dz);
                        assert_eq!(WeightedStructurePlacer::candidate_chunk(&rule, chunk, 7), target);
                    }
                }
                assert_eq!(target.x.div_euclid(4), rx);
                assert_eq!(target.z.div_euclid(4), rz);
            }
        }
    }

    #[test]
    fn test_placed_structures_do_not_overlap() {
        let placer = WeightedStructurePlacer::new(vec![every_chunk("tower"), every_chunk("hut"), every_chunk("tower")]).unwrap();
        let resolver = resolver();
        let library = library();
        for seed in 0..20 {
            let mut world = InMemoryWorld::new();
            let placed = placer.place_chunk(&resolver, &library, &mut world, ChunkPos::new(0, 0), seed);
            assert!(!placed.is_empty());
            for (i, a) in placed.iter().enumerate() {
                for b in &placed[i + 1..] {
                    assert!(!a.bounds.intersects(&b.bounds), "seed {seed}: {a:?} overlaps {b:?}");
                }
            }
        }
    }

    #[test]
    fn test_frequency_zero_never_places() {
        let rule = StructureRule { frequency: 0.0, ..every_chunk("hut") };
        let placer = WeightedStructurePlacer::new(vec![rule]).unwrap();
        let mut world = InMemoryWorld::new();
        for x in 0..8 {
            assert!(placer.place_chunk(&resolver(), &library(), &mut world, ChunkPos::new(x, 0), 1).is_empty());
        }
        assert!(world.is_empty());
    }

    #[test]
    fn test_unloaded_chunk_is_skipped() {
        let placer = WeightedStructurePlacer::new(vec![every_chunk("hut")]).unwrap();
        let mut world = InMemoryWorld::with_loaded_chunks([ChunkPos::new(1, 1)]);
        assert!(placer.place_chunk(&resolver(), &library(), &mut world, ChunkPos::new(0, 0), 3).is_empty());
        assert!(world.is_empty());
        assert_eq!(placer.place_chunk(&resolver(), &library(), &mut world, ChunkPos::new(1, 1), 3).len(), 1);
    }

    #[test]
    fn test_biome_tags_filter() {
        let rule = StructureRule { tags: ["no_such_tag".to_string()].into_iter().collect(), ..every_chunk("hut") };
        let placer = WeightedStructurePlacer::new(vec![rule]).unwrap();
        let mut world = InMemoryWorld::new();
        for x in 0..8 {
            assert!(placer.place_chunk(&resolver(), &library(), &mut world, ChunkPos::new(x, x), 5).is_empty());
        }
    }

    #[test]
    fn test_structures_sit_on_surface() {
        let placer = WeightedStructurePlacer::new(vec![every_chunk("hut")]).unwrap();
        let mut world = InMemoryWorld::new();
        world.fill_layer((0, 0), (15, 15), 62, "grass");
        let placed = placer.place_chunk(&resolver(), &library(), &mut world, ChunkPos::new(0, 0), 9);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].bounds.min.y, 63);
    }

    #[test]
    fn test_deterministic() {
        let placer = WeightedStructurePlacer::new(vec![every_chunk("tower"), every_chunk("hut")]).unwrap();
        let run = || {
            let mut world = InMemoryWorld::new();
            let placed = placer.place_chunk(&resolver(), &library(), &mut world, ChunkPos::new(2, -3), 77);
            (placed, world.len())
        };
        assert_eq!(run(), run());
    }
}
