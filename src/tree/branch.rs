//! Branch centerline generators.
//!
//! Every generator turns a [`BranchRequest`] into an ordered list of points
//! from the attachment point to the tip. Generators only differ in how they
//! shape the curve; the trait's provided methods compute the initial
//! heading, handle ring fan-out and guarantee that the first point is
//! exactly the attachment point.

use std::f64::consts::{FRAC_PI_2, TAU};

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::ring::{RingBranchRule, child_seed};
use crate::math::{VectorExt, orthonormal_basis, quadratic_bezier};
use crate::random::RandomSource;

/// Inputs shared by all branch generators
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BranchRequest {
    pub attach: DVec3,
    /// Direction of the parent at the attachment point
    pub tangent: DVec3,
    pub parent_radius: f64,
    pub length: f64,
    pub segments: usize,
    pub upward_bias: f64,
    pub forward_bias: f64,
}

impl BranchRequest {
    /// Segment count, never zero
    pub fn segment_count(&self) -> usize {
        self.segments.max(1)
    }

    /// Length of one segment
    pub fn step(&self) -> f64 {
        self.length.max(0.0) / self.segment_count() as f64
    }

    /// Starting direction for a branch leaving at `azimuth` around the tangent
    pub fn heading(&self, azimuth: f64) -> DVec3 {
        let axis = self.tangent.normalize_or(DVec3::Y);
        let (u, v) = orthonormal_basis(axis);
        let radial = u * azimuth.cos() + v * azimuth.sin();
        (radial + DVec3::Y * self.upward_bias + axis * self.forward_bias).normalize_or(radial)
    }
}

/// Strategy producing one branch centerline
pub trait BranchGenerator: Send + Sync {
    /// Shape the centerline for a branch leaving along `heading`.
    ///
    /// Implementations should start at `req.attach`; the provided methods
    /// patch the anchor in if they do not.
    fn shape(&self, rng: &mut RandomSource, req: &BranchRequest, heading: DVec3) -> Vec<DVec3>;

    /// Generate a branch at a random azimuth
    fn generate(&self, rng: &mut RandomSource, req: &BranchRequest) -> Vec<DVec3> {
        let azimuth = rng.range_f64(0.0, TAU);
        self.generate_toward(rng, req, azimuth)
    }

    /// Generate a branch leaving at `azimuth` radians around the tangent
    fn generate_toward(&self, rng: &mut RandomSource, req: &BranchRequest, azimuth: f64) -> Vec<DVec3> {
        let mut points = self.shape(rng, req, req.heading(azimuth));
        anchor(&mut points, req.attach);
        points
    }

    /// Fan out one branch per azimuth decided by `rule`.
    ///
    /// Each branch gets its own stream derived from a per-call base seed,
    /// its angle and its index, so branches stay reproducible regardless of
    /// how many values their siblings consume.
    fn generate_at(&self, rng: &mut RandomSource, req: &BranchRequest, rule: &RingBranchRule) -> Vec<(f64, Vec<DVec3>)> {
        let angles = rule.decide(rng);
        let base_seed = rng.next_u64();
        angles
            .into_iter()
            .enumerate()
            .map(|(i, angle)| {
                let mut child = RandomSource::new(child_seed(base_seed, angle, i));
                (angle, self.generate_toward(&mut child, req, angle))
            })
            .collect()
    }
}

fn anchor(points: &mut Vec<DVec3>, attach: DVec3) {
    match points.first_mut() {
        Some(first) if first.distance_squared(attach) < 1e-12 => *first = attach,
        _ => points.insert(0, attach),
    }
}

fn random_unit(rng: &mut RandomSource) -> DVec3 {
    DVec3::new(rng.range_f64(-1.0, 1.0), rng.range_f64(-1.0, 1.0), rng.range_f64(-1.0, 1.0)).normalize_or(DVec3::Y)
}

fn horizontal(dir: DVec3) -> DVec3 {
    DVec3::new(dir.x, 0.0, dir.z).normalize_or(dir.perpendicular())
}

/// Straight segment along the heading
#[derive(Clone, Copy, Debug, Default)]
pub struct StraightBranch;

impl BranchGenerator for StraightBranch {
    fn shape(&self, _rng: &mut RandomSource, req: &BranchRequest, heading: DVec3) -> Vec<DVec3> {
        let n = req.segment_count();
        let step = req.step();
        (0..=n).map(|i| req.attach + heading * step * i as f64).collect()
    }
}

/// Goes out sideways, then bends upward like an "L"
#[derive(Clone, Copy, Debug)]
pub struct LCurveBranch {
    /// Horizontal share of the length before the bend
    pub reach: f64,
    /// Vertical rise as a share of the length
    pub rise: f64,
}

impl Default for LCurveBranch {
    fn default() -> Self {
        Self { reach: 0.7, rise: 0.6 }
    }
}

impl BranchGenerator for LCurveBranch {
    fn shape(&self, _rng: &mut RandomSource, req: &BranchRequest, heading: DVec3) -> Vec<DVec3> {
        let n = req.segment_count();
        let flat = horizontal(heading);
        let corner = req.attach + flat * req.length * self.reach;
        let tip = corner + DVec3::Y * req.length * self.rise * (1.0 + req.upward_bias) + flat * req.length * 0.1;
        (0..=n)
            .map(|i| quadratic_bezier(req.attach, corner, tip, i as f64 / n as f64))
            .collect()
    }
}

/// Noise-perturbed polyline whose wobble decays toward the tip
#[derive(Clone, Copy, Debug)]
pub struct CrookedBranch {
    pub divergence: f64,
    pub decay: f64,
    pub upward_pull: f64,
}

impl Default for CrookedBranch {
    fn default() -> Self {
        Self { divergence: 0.45, decay: 0.85, upward_pull: 0.15 }
    }
}

impl BranchGenerator for CrookedBranch {
    fn shape(&self, rng: &mut RandomSource, req: &BranchRequest, heading: DVec3) -> Vec<DVec3> {
        let n = req.segment_count();
        let step = req.step();
        let mut points = Vec::with_capacity(n + 1);
        let mut pos = req.attach;
        let mut dir = heading;
        let mut divergence = self.divergence;
        points.push(pos);
        for _ in 0..n {
            let kick = random_unit(rng) * divergence;
            dir = (dir + kick + DVec3::Y * self.upward_pull * req.upward_bias).normalize_or(dir);
            pos += dir * step;
            points.push(pos);
            divergence *= self.decay;
        }
        points
    }
}

/// Rises briefly, then droops toward the ground
#[derive(Clone, Copy, Debug)]
pub struct WillowBranch {
    pub reach: f64,
    pub rise: f64,
    pub droop: f64,
    /// Largest random sideways sway in radians
    pub sway: f64,
}

impl Default for WillowBranch {
    fn default() -> Self {
        Self { reach: 0.55, rise: 0.25, droop: 0.9, sway: 0.25 }
    }
}

impl BranchGenerator for WillowBranch {
    fn shape(&self, rng: &mut RandomSource, req: &BranchRequest, heading: DVec3) -> Vec<DVec3> {
        let n = req.segment_count();
        let flat = horizontal(heading);
        let sway = rng.range_f64(-self.sway, self.sway);
        let rise = self.rise * (1.0 + req.upward_bias.max(0.0));
        (0..=n)
            .map(|i| {
                let t = i as f64 / n as f64;
                let out = flat.rotate_around(DVec3::Y, sway * t) * req.length * self.reach * t;
                let y = req.length * (rise * 4.0 * t * (1.0 - t) - self.droop * t * t * t);
                req.attach + out + DVec3::Y * y
            })
            .collect()
    }
}

/// Winds around the parent while moving outward
#[derive(Clone, Copy, Debug)]
pub struct AroundTrunkBranch {
    /// Total twist around the parent axis in radians
    pub twist: f64,
}

impl Default for AroundTrunkBranch {
    fn default() -> Self {
        Self { twist: FRAC_PI_2 }
    }
}

impl BranchGenerator for AroundTrunkBranch {
    fn shape(&self, rng: &mut RandomSource, req: &BranchRequest, heading: DVec3) -> Vec<DVec3> {
        let n = req.segment_count();
        let step = req.step();
        let axis = req.tangent.normalize_or(DVec3::Y);
        let twist = if rng.chance(0.5) { self.twist } else { -self.twist };
        let mut pos = req.attach;
        let mut points = Vec::with_capacity(n + 1);
        points.push(pos);
        for i in 1..=n {
            let t = i as f64 / n as f64;
            pos += heading.rotate_around(axis, twist * t) * step;
            points.push(pos);
        }
        points
    }
}

/// Bends from the heading toward a fixed world direction
#[derive(Clone, Copy, Debug)]
pub struct DirectionalBranch {
    pub direction: DVec3,
    /// How far along the blend toward `direction` the tip gets, in [0, 1]
    pub strength: f64,
    pub noise: f64,
}

impl Default for DirectionalBranch {
    fn default() -> Self {
        Self { direction: DVec3::Y, strength: 0.6, noise: 0.08 }
    }
}

impl BranchGenerator for DirectionalBranch {
    fn shape(&self, rng: &mut RandomSource, req: &BranchRequest, heading: DVec3) -> Vec<DVec3> {
        let n = req.segment_count();
        let step = req.step();
        let target = self.direction.normalize_or(heading);
        let mut pos = req.attach;
        let mut points = Vec::with_capacity(n + 1);
        points.push(pos);
        for i in 1..=n {
            let t = i as f64 / n as f64;
            let dir = heading.lerp(target, self.strength.clamp(0.0, 1.0) * t) + random_unit(rng) * self.noise;
            pos += dir.normalize_or(heading) * step;
            points.push(pos);
        }
        points
    }
}

/// Selects one of the built-in generators
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchStyle {
    Straight,
    LCurve,
    #[default]
    Crooked,
    Willow,
    AroundTrunk,
    Directional,
}

impl BranchStyle {
    pub const ALL: [BranchStyle; 6] = [
        BranchStyle::Straight,
        BranchStyle::LCurve,
        BranchStyle::Crooked,
        BranchStyle::Willow,
        BranchStyle::AroundTrunk,
        BranchStyle::Directional,
    ];

    /// Generator with default shaping parameters
    pub fn generator(self) -> Box<dyn BranchGenerator> {
        match self {
            BranchStyle::Straight => Box::new(StraightBranch),
            BranchStyle::LCurve => Box::new(LCurveBranch::default()),
            BranchStyle::Crooked => Box::new(CrookedBranch::default()),
            BranchStyle::Willow => Box::new(WillowBranch::default()),
            BranchStyle::AroundTrunk => Box::new(AroundTrunkBranch::default()),
            BranchStyle::Directional => Box::new(DirectionalBranch::default()),
        }
    }
}
