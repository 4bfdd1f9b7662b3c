//! City construction: layout, template resolution, then placement

use std::collections::BTreeSet;

use super::config::CityConfig;
use super::height_map::HeightMap;
use super::layout::{BuildingPlacement, CityLayout, DecoratorPlacement, RoadLayoutEngine, RoadPlacement};
use crate::core::{Error, Result};
use crate::math::{BlockPos, Mirror};
use crate::random::RandomSource;
use crate::structure::{StructureStore, StructureTemplate, WorldAccessor};

/// Reported to the observer after each placement
#[derive(Clone, Copy, Debug)]
pub enum PlacementEvent<'a> {
    Road(&'a RoadPlacement),
    Building(&'a BuildingPlacement),
    Decorator(&'a DecoratorPlacement),
}

pub struct CityLayoutBuilder {
    engine: RoadLayoutEngine,
    seed: u64,
}

impl CityLayoutBuilder {
    pub fn new(config: CityConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self { engine: RoadLayoutEngine::new(config), seed })
    }

    pub fn config(&self) -> &CityConfig {
        self.engine.config()
    }

    /// Layout only, without touching any world
    pub fn layout(&self, height_map: &HeightMap, center_x: i32, center_z: i32) -> CityLayout {
        self.engine.generate_road_and_building_map(height_map, center_x, center_z, &RandomSource::new(self.seed))
    }

    /// Lay out the city and place it into `world`.
    ///
    /// Every template is resolved before the first block is written, so a
    /// missing road piece or building template fails without partial output.
    /// Missing decorator templates are skipped with a warning.
    pub fn build(
        &self,
        world: &mut dyn WorldAccessor,
        store: &dyn StructureStore,
        height_map: &HeightMap,
        center_x: i32,
        center_z: i32,
        mut observer: impl FnMut(PlacementEvent<'_>),
    ) -> Result<CityLayout> {
        let layout = self.layout(height_map, center_x, center_z);

        let road_pieces: Vec<&StructureTemplate> = layout
            .roads
            .iter()
            .map(|road| {
                let candidates = road.road_type.piece_candidates();
                store.first_of(&candidates).ok_or_else(|| Error::MissingPiece { role: candidates[0].clone() })
            })
            .collect::<Result<_>>()?;

        let building_templates: Vec<&StructureTemplate> = layout
            .buildings
            .iter()
            .map(|b| {
                store
                    .get(&b.id)
                    .ok_or_else(|| Error::config(format!("building template `{}` ({:?}) is missing", b.id, b.kind)))
            })
            .collect::<Result<_>>()?;

        let mut missing_decorators = BTreeSet::new();
        let decorator_templates: Vec<Option<&StructureTemplate>> = layout
            .decorators
            .iter()
            .map(|d| {
                let template = store.get(&d.id);
                if template.is_none() {
                    missing_decorators.insert(d.id.as_str());
                }
                template
            })
            .collect();
        for id in &missing_decorators {
            log::warn!("Decorator template `{}` is missing, skipping its placements", id);
        }

        let mut blocks = 0usize;
        for (road, piece) in layout.roads.iter().zip(&road_pieces) {
            blocks += piece.place(world, road.pos, road.rotation, Mirror::None);
            observer(PlacementEvent::Road(road));
        }
        for (building, template) in layout.buildings.iter().zip(&building_templates) {
            blocks += template.place(world, above(building.pos), building.rotation, Mirror::None);
            observer(PlacementEvent::Building(building));
        }
        for (decorator, template) in layout.decorators.iter().zip(&decorator_templates) {
            if let Some(template) = template {
                blocks += template.place(world, above(decorator.pos), decorator.rotation, Mirror::None);
                observer(PlacementEvent::Decorator(decorator));
            }
        }

        log::info!(
            "Built city at ({}, {}): {} roads, {} buildings, {} decorators, {} blocks written",
            center_x,
            center_z,
            layout.roads.len(),
            layout.buildings.len(),
            layout.decorators.len() - decorator_templates.iter().filter(|t| t.is_none()).count(),
            blocks
        );
        Ok(layout)
    }
}

/// Buildings and decorators stand on the surface block
fn above(pos: BlockPos) -> BlockPos {
    pos.offset(0, 1, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{InMemoryWorld, TemplateLibrary};

    fn library(with_hall: bool) -> TemplateLibrary {
        let mut library = TemplateLibrary::new();
        library.insert(StructureTemplate::filled("road/straight", BlockPos::new(1, 1, 1), "gravel"));
        library.insert(StructureTemplate::filled("road/cross", BlockPos::new(1, 1, 1), "cobblestone"));
        if with_hall {
            library.insert(StructureTemplate::filled("town_hall", BlockPos::new(5, 6, 5), "bricks"));
        }
        library.insert(StructureTemplate::filled("house", BlockPos::new(3, 4, 3), "planks"));
        library.insert(StructureTemplate::filled("well", BlockPos::new(2, 2, 2), "stone"));
        library.insert(StructureTemplate::filled("market", BlockPos::new(2, 2, 2), "wool"));
        library.insert(StructureTemplate::filled("lamp_post", BlockPos::new(1, 3, 1), "lantern"));
        library
    }

    fn small_city() -> (CityConfig, HeightMap) {
        let config = CityConfig { radius: 16, town_hall_spacing: 4, ..CityConfig::default() };
        (config, HeightMap::flat(0, 0, 16, 64))
    }

    #[test]
    fn test_build_places_everything_in_order() {
        let (config, map) = small_city();
        let builder = CityLayoutBuilder::new(config, 42).unwrap();
        let mut world = InMemoryWorld::new();
        let mut events = Vec::new();
        let layout = builder
            .build(&mut world, &library(true), &map, 0, 0, |e| {
                events.push(match e {
                    PlacementEvent::Road(_) => 'r',
                    PlacementEvent::Building(_) => 'b',
                    PlacementEvent::Decorator(_) => 'd',
                })
            })
            .unwrap();

        assert_eq!(events.iter().filter(|e| **e == 'r').count(), layout.roads.len());
        assert_eq!(events.iter().filter(|e| **e == 'b').count(), layout.buildings.len());
        // roads, then buildings, then decorators
        let mut sorted = events.clone();
        sorted.sort_by_key(|e| match e {
            'r' => 0,
            'b' => 1,
            _ => 2,
        });
        assert_eq!(events, sorted);

        // side benches and barrels have no template and were skipped
        let placed_decorators = events.iter().filter(|e| **e == 'd').count();
        let lamp_posts = layout.decorators.iter().filter(|d| d.id == "lamp_post").count();
        assert_eq!(placed_decorators, lamp_posts);

        assert_eq!(world.block_at(BlockPos::new(0, 65, 0)).as_deref(), Some("bricks"));
        let road = &layout.roads[0];
        assert!(world.block_at(road.pos).is_some());
    }

    #[test]
    fn test_missing_town_hall_fails_before_writing() {
        let (config, map) = small_city();
        let builder = CityLayoutBuilder::new(config, 42).unwrap();
        let mut world = InMemoryWorld::new();
        let result = builder.build(&mut world, &library(false), &map, 0, 0, |_| {});
        assert!(matches!(result, Err(Error::Configuration(_))));
        assert!(world.is_empty());
    }

    #[test]
    fn test_missing_road_pieces() {
        let (config, map) = small_city();
        let builder = CityLayoutBuilder::new(config, 1).unwrap();
        let mut world = InMemoryWorld::new();
        let result = builder.build(&mut world, &TemplateLibrary::new(), &map, 0, 0, |_| {});
        assert!(matches!(result, Err(Error::MissingPiece { .. })));
        assert!(world.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CityConfig { building_min_spacing: 9, building_max_spacing: 1, ..CityConfig::default() };
        assert!(CityLayoutBuilder::new(config, 0).is_err());
    }
}
