use criterion::{criterion_group, criterion_main, Criterion, black_box};

use voxgen::city::{CityLayoutBuilder, CityConfig, HeightMap};
use voxgen::generation::{GenerationConfig, GenerationContext, ResolverKind};
use voxgen::math::{BlockPos, ChunkPos};
use voxgen::structure::{InMemoryWorld, StructureRule, StructureTemplate, TemplateLibrary};
use voxgen::tree::{TreeBuilder, TrunkArchetype};

use glam::DVec3;

fn bench_resolve_biome(c: &mut Criterion) {
    for kind in [ResolverKind::MultiParameter, ResolverKind::RuleTable] {
        let config = GenerationConfig { resolver: kind, ..GenerationConfig::with_seed(7) };
        let ctx = GenerationContext::new(config).unwrap();

        c.bench_function(&format!("resolve_biome_{:?}", kind), |b| {
            let mut i = 0i32;
            b.iter(|| {
                i = i.wrapping_add(37);
                black_box(ctx.resolve_biome(black_box(i), 64, black_box(-i * 3)));
            });
        });
    }
}

fn bench_biome_grid_64(c: &mut Criterion) {
    let ctx = GenerationContext::new(GenerationConfig::default()).unwrap();

    c.bench_function("biome_grid_64x64", |b| {
        b.iter(|| black_box(ctx.biome_grid(-256, -256, 64, 64, 8)));
    });
}

fn bench_grow_tree(c: &mut Criterion) {
    for archetype in TrunkArchetype::ALL {
        let builder = TreeBuilder::new(archetype);

        c.bench_function(&format!("grow_tree_{}", archetype.as_str()), |b| {
            let mut seed = 0u64;
            b.iter(|| {
                seed += 1;
                black_box(builder.grow(black_box(seed), DVec3::ZERO))
            });
        });
    }
}

fn bench_city_layout(c: &mut Criterion) {
    let builder = CityLayoutBuilder::new(CityConfig::default(), 11).unwrap();
    let height_map = HeightMap::flat(0, 0, 20, 64);

    c.bench_function("city_layout_radius_20", |b| {
        b.iter(|| black_box(builder.layout(black_box(&height_map), 0, 0)));
    });
}

fn bench_place_structures(c: &mut Criterion) {
    let config = GenerationConfig {
        structures: vec![
            StructureRule { spacing: 2, ..StructureRule::new("tower") },
            StructureRule { spacing: 1, frequency: 0.5, ..StructureRule::new("hut") },
        ],
        ..GenerationConfig::with_seed(3)
    };
    let mut templates = TemplateLibrary::new();
    templates.insert(StructureTemplate::filled("tower", BlockPos::new(3, 8, 3), "stone"));
    templates.insert(StructureTemplate::filled("hut", BlockPos::new(5, 4, 5), "planks"));
    let ctx = GenerationContext::new(config).unwrap().with_templates(templates);

    c.bench_function("place_structures_8x8_chunks", |b| {
        b.iter(|| {
            let mut world = InMemoryWorld::new();
            for cx in 0..8 {
                for cz in 0..8 {
                    black_box(ctx.place_structures(&mut world, ChunkPos::new(cx, cz)));
                }
            }
            black_box(world.len());
        });
    });
}

criterion_group!(
    benches,
    bench_resolve_biome,
    bench_biome_grid_64,
    bench_grow_tree,
    bench_city_layout,
    bench_place_structures,
);
criterion_main!(benches);
