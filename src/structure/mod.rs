//! Placement of pre-authored structure templates into a block world

pub mod placer;
pub mod rule;
pub mod template;
pub mod world;

pub use placer::{PlacedStructureCandidate, StructureBox, WeightedStructurePlacer};
pub use rule::StructureRule;
pub use template::{StructureStore, StructureTemplate, TemplateBlock, TemplateLibrary};
pub use world::{AIR, InMemoryWorld, PlacedBlock, WorldAccessor};
