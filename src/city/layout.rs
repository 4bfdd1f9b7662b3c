//! Road topology, building and decorator placement for one city.
//!
//! [`RoadLayoutEngine::generate_road_and_building_map`] is a greedy single
//! pass over the height map in insertion order:
//!
//! 1. the town hall ring at `town_hall_spacing + 1` around the centre
//! 2. arrangement lanes, skipping the reserved plaza
//! 3. per-tile [`RoadType`] and rotation from 8-neighbour adjacency
//! 4. decorators along the roads
//! 5. the town hall and special buildings
//! 6. houses on the remaining cells that respect both paddings
//!
//! Nothing here fails: cells that do not fit simply stay empty.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::config::{CityConfig, DecoratorKind};
use super::height_map::HeightMap;
use super::road_type::{Direction, DirectionSet, RoadType, classify_road_type};
use crate::math::{BlockPos, Rotation};
use crate::random::RandomSource;

/// Furthest ring probed when turning a house toward a road
pub const MAX_ROAD_PROBE: i32 = 8;
pub const CROSS_DECORATOR_CHANCE: f64 = 0.3;
pub const RANDOM_DECORATOR_CHANCE: f64 = 0.05;
pub const SIDE_BENCH: &str = "side_bench";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadPlacement {
    pub pos: BlockPos,
    pub road_type: RoadType,
    pub rotation: Rotation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    TownHall,
    Special,
    House,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingPlacement {
    pub id: String,
    pub kind: BuildingKind,
    pub pos: BlockPos,
    pub rotation: Rotation,
    /// Late-bound attributes such as the chosen size
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl BuildingPlacement {
    fn new(id: &str, kind: BuildingKind, pos: BlockPos, rotation: Rotation) -> Self {
        Self { id: id.to_string(), kind, pos, rotation, metadata: BTreeMap::new() }
    }

    /// Size chosen for houses, if recorded
    pub fn size(&self) -> Option<i64> {
        self.metadata.get("size").and_then(|v| v.as_i64())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoratorPlacement {
    pub id: String,
    /// `None` for the generic side bench
    pub kind: Option<DecoratorKind>,
    pub pos: BlockPos,
    pub rotation: Rotation,
}

/// Output of one layout pass
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CityLayout {
    pub center_x: i32,
    pub center_z: i32,
    pub roads: Vec<RoadPlacement>,
    pub buildings: Vec<BuildingPlacement>,
    pub decorators: Vec<DecoratorPlacement>,
}

impl CityLayout {
    pub fn road_at(&self, x: i32, z: i32) -> Option<&RoadPlacement> {
        self.roads.iter().find(|r| r.pos.x == x && r.pos.z == z)
    }

    pub fn is_road(&self, x: i32, z: i32) -> bool {
        self.road_at(x, z).is_some()
    }

    pub fn building_at(&self, x: i32, z: i32) -> Option<&BuildingPlacement> {
        self.buildings.iter().find(|b| b.pos.x == x && b.pos.z == z)
    }

    /// Count of road tiles per type
    pub fn road_histogram(&self) -> BTreeMap<RoadType, usize> {
        let mut counts = BTreeMap::new();
        for road in &self.roads {
            *counts.entry(road.road_type).or_insert(0) += 1;
        }
        counts
    }
}

/// Road tiles in placement order with O(1) lookup
#[derive(Default)]
struct RoadSet {
    order: Vec<(i32, i32, i32)>,
    lookup: HashSet<(i32, i32)>,
}

impl RoadSet {
    fn insert(&mut self, x: i32, z: i32, y: i32) {
        if self.lookup.insert((x, z)) {
            self.order.push((x, z, y));
        }
    }

    fn contains(&self, x: i32, z: i32) -> bool {
        self.lookup.contains(&(x, z))
    }

    fn within(&self, x: i32, z: i32, distance: i32) -> bool {
        within(&self.lookup, x, z, distance)
    }

    fn classify(&self) -> Vec<RoadPlacement> {
        self.order
            .iter()
            .map(|&(x, z, y)| {
                let dirs = DirectionSet::around(x, z, |nx, nz| self.contains(nx, nz));
                let road_type = classify_road_type(dirs);
                RoadPlacement { pos: BlockPos::new(x, y, z), road_type, rotation: road_type.rotation() }
            })
            .collect()
    }
}

fn within(cells: &HashSet<(i32, i32)>, x: i32, z: i32, distance: i32) -> bool {
    (-distance..=distance).any(|dx| (-distance..=distance).any(|dz| cells.contains(&(x + dx, z + dz))))
}

pub struct RoadLayoutEngine {
    config: CityConfig,
}

impl RoadLayoutEngine {
    pub fn new(config: CityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CityConfig {
        &self.config
    }

    fn in_shape(&self, dx: i64, dz: i64) -> bool {
        self.config.shape.contains(dx, dz, self.config.radius)
    }

    fn in_shape_at(&self, x: i32, z: i32, center_x: i32, center_z: i32) -> bool {
        let (dx, dz) = offset_from(x, z, center_x, center_z);
        self.in_shape(dx, dz)
    }

    /// Lay out roads, buildings and decorators around `(center_x, center_z)`
    pub fn generate_road_and_building_map(
        &self,
        height_map: &HeightMap,
        center_x: i32,
        center_z: i32,
        rng: &RandomSource,
    ) -> CityLayout {
        let config = &self.config;
        let mut road_set = RoadSet::default();

        if let Some(ring) = config.ring_distance() {
            for (x, z, y) in height_map.iter() {
                let (dx, dz) = offset_from(x, z, center_x, center_z);
                if dx.abs().max(dz.abs()) == i64::from(ring) && self.in_shape(dx, dz) {
                    road_set.insert(x, z, y);
                }
            }
        }

        for (x, z, y) in height_map.iter() {
            let (dx, dz) = offset_from(x, z, center_x, center_z);
            if !self.in_shape(dx, dz) || config.is_plaza(dx, dz) {
                continue;
            }
            if config.arrangement.is_lane(dx, dz, config.road_thickness, config.block_length) {
                road_set.insert(x, z, y);
            }
        }

        let roads = road_set.classify();

        let decorators = self.place_decorators(height_map, &roads, &road_set, &mut rng.fork(1));

        let mut occupied: HashSet<(i32, i32)> = HashSet::new();
        let mut buildings = Vec::new();

        if let Some(town_hall) = &config.town_hall {
            match height_map.get(center_x, center_z) {
                Some(y) => {
                    let pos = BlockPos::new(center_x, y, center_z);
                    occupied.insert((center_x, center_z));
                    buildings.push(BuildingPlacement::new(town_hall, BuildingKind::TownHall, pos, Rotation::None));
                }
                None => log::warn!(
                    "City centre ({}, {}) has no height, skipping town hall '{}'",
                    center_x,
                    center_z,
                    town_hall
                ),
            }
        }

        self.place_special_buildings(height_map, center_x, center_z, &roads, &road_set, &mut occupied, &mut buildings);
        self.place_houses(height_map, center_x, center_z, &road_set, &mut occupied, &mut buildings, &mut rng.fork(2));

        log::info!(
            "City layout at ({}, {}): {} road tiles, {} buildings, {} decorators",
            center_x,
            center_z,
            roads.len(),
            buildings.len(),
            decorators.len()
        );

        CityLayout { center_x, center_z, roads, buildings, decorators }
    }

    fn place_decorators(
        &self,
        height_map: &HeightMap,
        roads: &[RoadPlacement],
        road_set: &RoadSet,
        rng: &mut RandomSource,
    ) -> Vec<DecoratorPlacement> {
        let mut out = Vec::new();
        for road in roads {
            for spec in &self.config.decorators {
                let pos = match spec.kind {
                    DecoratorKind::ByRoad => {
                        let (ox, oz) = match road.road_type {
                            RoadType::StraightNS => (1, 0),
                            RoadType::StraightEW => (0, 1),
                            _ => (0, 0),
                        };
                        if (ox, oz) == (0, 0) {
                            road.pos
                        } else {
                            // the roadside cell must be mapped and not itself a road
                            let (x, z) = (road.pos.x + ox, road.pos.z + oz);
                            match height_map.get(x, z) {
                                Some(y) if !road_set.contains(x, z) => BlockPos::new(x, y, z),
                                _ => continue,
                            }
                        }
                    }
                    DecoratorKind::Cross => {
                        if !road.road_type.is_cross() || !rng.chance(CROSS_DECORATOR_CHANCE) {
                            continue;
                        }
                        road.pos
                    }
                    DecoratorKind::Random => {
                        if !rng.chance(RANDOM_DECORATOR_CHANCE) {
                            continue;
                        }
                        road.pos
                    }
                };
                out.push(DecoratorPlacement { id: spec.id.clone(), kind: Some(spec.kind), pos, rotation: road.rotation });
            }
            if rng.chance(self.config.side_bench_chance) {
                out.push(DecoratorPlacement { id: SIDE_BENCH.to_string(), kind: None, pos: road.pos, rotation: road.rotation });
            }
        }
        out
    }

    #[allow(clippy::too_many_arguments)]
    fn place_special_buildings(
        &self,
        height_map: &HeightMap,
        center_x: i32,
        center_z: i32,
        roads: &[RoadPlacement],
        road_set: &RoadSet,
        occupied: &mut HashSet<(i32, i32)>,
        buildings: &mut Vec<BuildingPlacement>,
    ) {
        let mut used_dead_ends = HashSet::new();
        for id in &self.config.special_buildings {
            let beyond_dead_end = roads.iter().enumerate().find_map(|(i, road)| {
                if used_dead_ends.contains(&i) {
                    return None;
                }
                let toward = road.road_type.dead_end_direction()?;
                let (ox, oz) = toward.opposite().offset();
                let (x, z) = (road.pos.x + ox, road.pos.z + oz);
                let free = height_map.contains(x, z)
                    && !road_set.contains(x, z)
                    && !occupied.contains(&(x, z))
                    && self.in_shape_at(x, z, center_x, center_z);
                free.then(|| (i, x, z, toward.facing_rotation()))
            });

            let spot = match beyond_dead_end {
                Some((i, x, z, rotation)) => {
                    used_dead_ends.insert(i);
                    Some((x, z, rotation))
                }
                None => height_map
                    .iter()
                    .find(|&(x, z, _)| {
                        let (dx, dz) = offset_from(x, z, center_x, center_z);
                        self.in_shape(dx, dz)
                            && !self.config.is_plaza(dx, dz)
                            && !road_set.within(x, z, 1)
                            && !within(occupied, x, z, 1)
                    })
                    .map(|(x, z, _)| (x, z, Rotation::None)),
            };

            match spot {
                Some((x, z, rotation)) => {
                    let y = height_map.get(x, z).unwrap_or(0);
                    occupied.insert((x, z));
                    buildings.push(BuildingPlacement::new(id, BuildingKind::Special, BlockPos::new(x, y, z), rotation));
                }
                None => log::warn!("No free cell for special building '{}'", id),
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn place_houses(
        &self,
        height_map: &HeightMap,
        center_x: i32,
        center_z: i32,
        road_set: &RoadSet,
        occupied: &mut HashSet<(i32, i32)>,
        buildings: &mut Vec<BuildingPlacement>,
        rng: &mut RandomSource,
    ) {
        let config = &self.config;
        if config.houses.is_empty() {
            return;
        }
        for (x, z, y) in height_map.iter() {
            let (dx, dz) = offset_from(x, z, center_x, center_z);
            if !self.in_shape(dx, dz) || config.is_plaza(dx, dz) || road_set.contains(x, z) {
                continue;
            }
            if road_set.within(x, z, config.road_padding) || within(occupied, x, z, config.building_padding) {
                continue;
            }

            let size = rng.range_i32(config.building_min_spacing, config.building_max_spacing);
            let id = rng.pick_index(config.houses.len()).map_or("house", |i| config.houses[i].as_str());
            let rotation = nearest_road_direction(road_set, x, z).map_or(Rotation::None, Direction::facing_rotation);

            let mut placement = BuildingPlacement::new(id, BuildingKind::House, BlockPos::new(x, y, z), rotation);
            placement.metadata.insert("size".to_string(), serde_json::Value::from(size));
            occupied.insert((x, z));
            buildings.push(placement);
        }
    }
}

/// Offset of `(x, z)` from the centre, wide enough for any pair of `i32`s
fn offset_from(x: i32, z: i32, center_x: i32, center_z: i32) -> (i64, i64) {
    (i64::from(x) - i64::from(center_x), i64::from(z) - i64::from(center_z))
}

/// First direction with a road, probing rings outward in [`Direction::ALL`] order
fn nearest_road_direction(road_set: &RoadSet, x: i32, z: i32) -> Option<Direction> {
    (1..=MAX_ROAD_PROBE).find_map(|ring| {
        Direction::ALL.into_iter().find(|dir| {
            let (dx, dz) = dir.offset();
            road_set.contains(x + dx * ring, z + dz * ring)
        })
    })
}

/// Per-tile connectivity lookup used by callers that only have a layout
pub fn road_index(layout: &CityLayout) -> HashMap<(i32, i32), RoadType> {
    layout.roads.iter().map(|r| ((r.pos.x, r.pos.z), r.road_type)).collect()
}
