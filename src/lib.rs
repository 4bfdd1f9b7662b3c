//! Voxgen - procedural content for voxel worlds
//!
//! Biome resolution, tree and root geometry, city layouts and weighted
//! structure placement, all driven by forkable seeded random streams.

pub mod core;
pub mod math;
pub mod random;
pub mod noise_field;
pub mod biome;
pub mod tree;
pub mod city;
pub mod structure;
pub mod generation;
