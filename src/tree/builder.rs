//! Whole-tree assembly

use std::collections::BTreeSet;

use glam::DVec3;
use rayon::prelude::*;
use serde::Serialize;

use super::engine::{Branch, BranchingEngine, BranchingParams};
use super::trunk::{TrunkArchetype, TrunkGenerator};
use super::voxelize::stamp_path_into;
use crate::math::BlockPos;
use crate::random::RandomSource;

/// Share of a branch's radius left at its tip
const BRANCH_TIP_RADIUS: f64 = 0.5;

/// A grown tree: skeleton plus voxels
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tree {
    pub archetype: TrunkArchetype,
    pub seed: u64,
    pub origin: DVec3,
    pub trunk: Vec<DVec3>,
    pub branches: Vec<Branch>,
    pub voxels: BTreeSet<BlockPos>,
}

/// Grows trees of one archetype
pub struct TreeBuilder {
    archetype: TrunkArchetype,
    height: f64,
    trunk: Box<dyn TrunkGenerator>,
    engine: BranchingEngine,
}

impl TreeBuilder {
    pub fn new(archetype: TrunkArchetype) -> Self {
        Self {
            archetype,
            height: archetype.default_height(),
            trunk: archetype.generator(),
            engine: BranchingEngine::new(archetype.branching()),
        }
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    pub fn with_branching(mut self, params: BranchingParams) -> Self {
        self.engine = BranchingEngine::new(params);
        self
    }

    pub fn with_trunk(mut self, trunk: Box<dyn TrunkGenerator>) -> Self {
        self.trunk = trunk;
        self
    }

    pub fn archetype(&self) -> TrunkArchetype {
        self.archetype
    }

    /// Grow one tree at `origin`
    pub fn grow(&self, seed: u64, origin: DVec3) -> Tree {
        let root = RandomSource::new(seed);
        let trunk = self.trunk.generate_path(seed, origin, self.height, &mut root.fork(1));
        let attachments = self.trunk.attachment_points(&trunk, &mut root.fork(2));
        let branches = self.engine.generate_all(&mut root.fork(3), &attachments);

        let mut voxels = self.trunk.voxelize(&trunk);
        for branch in &branches {
            let r = branch.radius;
            stamp_path_into(&branch.points, |t| r * (1.0 - (1.0 - BRANCH_TIP_RADIUS) * t), &mut voxels);
        }

        log::debug!(
            "Grew {} tree at {:?}: {} attachments, {} branches, {} voxels",
            self.archetype.as_str(),
            origin,
            attachments.len(),
            branches.len(),
            voxels.len()
        );

        Tree { archetype: self.archetype, seed, origin, trunk, branches, voxels }
    }

    /// Grow one tree per origin in parallel, each on its own forked seed
    pub fn grow_forest(&self, seed: u64, origins: &[DVec3]) -> Vec<Tree> {
        let root = RandomSource::new(seed);
        let trees: Vec<Tree> = origins
            .par_iter()
            .enumerate()
            .map(|(i, origin)| self.grow(root.fork(i as u64).seed(), *origin))
            .collect();
        log::info!(
            "Grew {} {} trees ({} voxels total)",
            trees.len(),
            self.archetype.as_str(),
            trees.iter().map(|t| t.voxels.len()).sum::<usize>()
        );
        trees
    }
}
