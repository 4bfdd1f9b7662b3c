//! Settlement layout: road topology, buildings and decorators.
//!
//! [`RoadLayoutEngine`] produces a [`CityLayout`] from a [`CityConfig`] and
//! a [`HeightMap`]; [`CityLayoutBuilder`] resolves the templates it needs
//! and writes the city into a world.

pub mod builder;
pub mod config;
pub mod height_map;
pub mod layout;
pub mod road_type;

pub use builder::{CityLayoutBuilder, PlacementEvent};
pub use config::{ArrangementType, CityConfig, CityShape, DecoratorKind, DecoratorSpec};
pub use height_map::HeightMap;
pub use layout::{
    BuildingKind, BuildingPlacement, CityLayout, DecoratorPlacement, RoadLayoutEngine, RoadPlacement, road_index,
};
pub use road_type::{Direction, DirectionSet, RoadType, classify_road_type};
