//! Procedural tree geometry.
//!
//! A tree is grown in three steps: a [`TrunkGenerator`] lays down a trunk
//! centerline, attachment points are picked along its upper part, and the
//! [`BranchingEngine`] fills them with branches from a [`BranchGenerator`]
//! while trimming collisions. Everything is voxelized by sphere stamping.

pub mod branch;
pub mod builder;
pub mod curve;
pub mod engine;
pub mod ring;
pub mod spiral;
pub mod trunk;
pub mod voxelize;

pub use branch::{
    AroundTrunkBranch, BranchGenerator, BranchRequest, BranchStyle, CrookedBranch, DirectionalBranch, LCurveBranch,
    StraightBranch, WillowBranch,
};
pub use builder::{Tree, TreeBuilder};
pub use curve::{CurveSegment, Easing, PiecewiseCurve};
pub use engine::{AttachmentPoint, Branch, BranchingEngine, BranchingParams, OccupancyVolume, Sphere};
pub use ring::RingBranchRule;
pub use spiral::{
    MAX_ROOT_SEGMENTS, MAX_SPIRAL_EXTENT, MAX_SPIRAL_PATHS, SpiralTrunk, SpiralTrunkParams, generate_multi_root_spiral_trunk,
};
pub use trunk::{
    ConiferTrunk, MAX_TRUNK_HEIGHT, MangroveTrunk, OakTrunk, TrunkArchetype, TrunkGenerator, TrunkParams, WillowTrunk,
};
pub use voxelize::{stamp_path, stamp_sphere};
