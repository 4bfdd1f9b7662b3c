//! Trunk archetypes: centerline paths, voxelization and attachment points

use std::collections::BTreeSet;
use std::f64::consts::TAU;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::branch::BranchStyle;
use super::engine::{AttachmentPoint, BranchingParams};
use super::ring::RingBranchRule;
use super::voxelize::{stamp_path, stamp_path_into};
use crate::math::{BlockPos, VectorExt, quadratic_bezier};
use crate::noise_field::{FractalNoise, NoiseParams, NoiseSampler};
use crate::random::RandomSource;

/// Tallest trunk a generator will grow; taller requests are clamped
pub const MAX_TRUNK_HEIGHT: f64 = 256.0;

/// Shape parameters shared by the trunk archetypes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrunkParams {
    pub base_radius: f64,
    pub top_radius: f64,
    /// Distance between centerline points
    pub step: f64,
    /// Lateral noise amplitude in blocks at the top
    pub wobble: f64,
    pub wobble_frequency: f64,
    /// Sideways displacement of the top as a share of height
    pub lean: f64,
    /// Relative height where branches begin
    pub branch_start: f64,
    /// Minimum arc length between attachment points
    pub attachment_spacing: f64,
    pub attachment_chance: f64,
}

impl Default for TrunkParams {
    fn default() -> Self {
        Self::oak()
    }
}

impl TrunkParams {
    pub fn oak() -> Self {
        Self {
            base_radius: 1.6,
            top_radius: 0.6,
            step: 1.0,
            wobble: 1.2,
            wobble_frequency: 0.12,
            lean: 0.05,
            branch_start: 0.4,
            attachment_spacing: 2.5,
            attachment_chance: 0.85,
        }
    }

    pub fn conifer() -> Self {
        Self {
            base_radius: 1.1,
            top_radius: 0.3,
            step: 1.0,
            wobble: 0.3,
            wobble_frequency: 0.08,
            lean: 0.0,
            branch_start: 0.2,
            attachment_spacing: 2.5,
            attachment_chance: 1.0,
        }
    }

    pub fn willow() -> Self {
        Self {
            base_radius: 1.4,
            top_radius: 0.7,
            step: 1.0,
            wobble: 0.8,
            wobble_frequency: 0.1,
            lean: 0.15,
            branch_start: 0.55,
            attachment_spacing: 2.5,
            attachment_chance: 0.9,
        }
    }

    pub fn mangrove() -> Self {
        Self {
            base_radius: 1.0,
            top_radius: 0.5,
            step: 1.0,
            wobble: 0.6,
            wobble_frequency: 0.15,
            lean: 0.05,
            branch_start: 0.5,
            attachment_spacing: 3.0,
            attachment_chance: 0.8,
        }
    }

    pub fn radius_at(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        self.base_radius + (self.top_radius - self.base_radius) * t
    }
}

/// Builds a trunk centerline and turns it into blocks
pub trait TrunkGenerator: Send + Sync {
    fn params(&self) -> &TrunkParams;

    /// Ordered centerline from `start` upward
    fn generate_path(&self, seed: u64, start: DVec3, height: f64, rng: &mut RandomSource) -> Vec<DVec3>;

    /// Trunk radius at normalized height `t`
    fn radius_at(&self, t: f64) -> f64 {
        self.params().radius_at(t)
    }

    /// Sphere-stamp the centerline
    fn voxelize(&self, path: &[DVec3]) -> BTreeSet<BlockPos> {
        stamp_path(path, |t| self.radius_at(t))
    }

    /// Attachment points along the upper part of the path
    fn attachment_points(&self, path: &[DVec3], rng: &mut RandomSource) -> Vec<AttachmentPoint> {
        attachments_along(path, self.params(), |t| self.radius_at(t), rng)
    }
}

/// Noise-wobbled, optionally leaning vertical path
fn wobbly_path(params: &TrunkParams, seed: u64, start: DVec3, height: f64, lean_dir: DVec3) -> Vec<DVec3> {
    let height = if height.is_nan() { 0.0 } else { height.clamp(0.0, MAX_TRUNK_HEIGHT) };
    let steps = (height / params.step.max(0.1)).ceil().max(1.0) as usize;
    let noise = NoiseParams { octaves: 2, frequency: params.wobble_frequency, ..NoiseParams::default() };
    let nx = FractalNoise::new(NoiseParams { seed: seed as u32, ..noise.clone() });
    let nz = FractalNoise::new(NoiseParams { seed: ((seed >> 32) as u32).wrapping_add(1), ..noise });

    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            let y = height * t;
            let wobble = DVec3::new(nx.sample(y, 17.3), 0.0, nz.sample(y, 17.3)) * params.wobble * t;
            let lean = lean_dir * params.lean * height * t * t;
            start + DVec3::Y * y + wobble + lean
        })
        .collect()
}

fn random_horizontal(rng: &mut RandomSource) -> DVec3 {
    let angle = rng.range_f64(0.0, TAU);
    DVec3::new(angle.cos(), 0.0, angle.sin())
}

fn cumulative_lengths(path: &[DVec3]) -> Vec<f64> {
    let mut acc = 0.0;
    let mut out = Vec::with_capacity(path.len());
    out.push(0.0);
    for w in path.windows(2) {
        acc += w[0].distance(w[1]);
        out.push(acc);
    }
    out
}

pub(crate) fn attachments_along(
    path: &[DVec3],
    params: &TrunkParams,
    radius_at: impl Fn(f64) -> f64,
    rng: &mut RandomSource,
) -> Vec<AttachmentPoint> {
    if path.len() < 2 {
        return Vec::new();
    }
    let lengths = cumulative_lengths(path);
    let total = lengths[lengths.len() - 1];
    if total <= 0.0 {
        return Vec::new();
    }

    let start = params.branch_start.clamp(0.0, 1.0);
    let spacing = params.attachment_spacing.max(params.step);
    let mut next = total * start;
    let mut out = Vec::new();
    for i in 1..path.len() {
        if lengths[i] < next {
            continue;
        }
        next = lengths[i] + spacing;
        if !rng.chance(params.attachment_chance) {
            continue;
        }
        let t = lengths[i] / total;
        let ahead = path[(i + 1).min(path.len() - 1)];
        let height_factor = if start >= 1.0 { 0.0 } else { ((t - start) / (1.0 - start)).clamp(0.0, 1.0) };
        out.push(AttachmentPoint {
            position: path[i],
            tangent: (ahead - path[i - 1]).normalize_or(DVec3::Y),
            parent_radius: radius_at(t),
            height_factor,
        });
    }
    out
}

/// Tall, nearly straight trunk with whorls from low down
#[derive(Clone, Debug, Default)]
pub struct ConiferTrunk {
    pub params: TrunkParams,
}

impl ConiferTrunk {
    pub fn new() -> Self {
        Self { params: TrunkParams::conifer() }
    }
}

impl TrunkGenerator for ConiferTrunk {
    fn params(&self) -> &TrunkParams {
        &self.params
    }

    fn generate_path(&self, seed: u64, start: DVec3, height: f64, _rng: &mut RandomSource) -> Vec<DVec3> {
        wobbly_path(&self.params, seed, start, height, DVec3::ZERO)
    }
}

/// Thick, crooked trunk
#[derive(Clone, Debug, Default)]
pub struct OakTrunk {
    pub params: TrunkParams,
}

impl OakTrunk {
    pub fn new() -> Self {
        Self { params: TrunkParams::oak() }
    }
}

impl TrunkGenerator for OakTrunk {
    fn params(&self) -> &TrunkParams {
        &self.params
    }

    fn generate_path(&self, seed: u64, start: DVec3, height: f64, rng: &mut RandomSource) -> Vec<DVec3> {
        let lean = random_horizontal(rng);
        wobbly_path(&self.params, seed, start, height, lean)
    }
}

/// Leaning trunk that carries drooping branches high up
#[derive(Clone, Debug, Default)]
pub struct WillowTrunk {
    pub params: TrunkParams,
}

impl WillowTrunk {
    pub fn new() -> Self {
        Self { params: TrunkParams::willow() }
    }
}

impl TrunkGenerator for WillowTrunk {
    fn params(&self) -> &TrunkParams {
        &self.params
    }

    fn generate_path(&self, seed: u64, start: DVec3, height: f64, rng: &mut RandomSource) -> Vec<DVec3> {
        let lean = random_horizontal(rng);
        wobbly_path(&self.params, seed, start, height, lean)
    }
}

/// Trunk raised on arched prop roots
#[derive(Clone, Debug)]
pub struct MangroveTrunk {
    pub params: TrunkParams,
    pub root_count: usize,
    /// Height of the trunk base above the ground
    pub root_height: f64,
    /// Horizontal reach of each root
    pub root_spread: f64,
    pub root_radius: f64,
}

impl Default for MangroveTrunk {
    fn default() -> Self {
        Self::new()
    }
}

impl MangroveTrunk {
    pub fn new() -> Self {
        Self { params: TrunkParams::mangrove(), root_count: 5, root_height: 4.0, root_spread: 4.5, root_radius: 0.5 }
    }

    /// Root curves from the trunk base to the ground
    pub fn roots(&self, base: DVec3) -> Vec<Vec<DVec3>> {
        let samples = 12;
        (0..self.root_count)
            .map(|i| {
                let angle = TAU * i as f64 / self.root_count.max(1) as f64 + 0.3;
                let radial = DVec3::new(angle.cos(), 0.0, angle.sin());
                let ground = base - DVec3::Y * self.root_height + radial * self.root_spread;
                let control = base + radial * self.root_spread * 0.8 + DVec3::Y * 0.5;
                (0..=samples)
                    .map(|k| quadratic_bezier(base, control, ground, k as f64 / samples as f64))
                    .collect()
            })
            .collect()
    }
}

impl TrunkGenerator for MangroveTrunk {
    fn params(&self) -> &TrunkParams {
        &self.params
    }

    fn generate_path(&self, seed: u64, start: DVec3, height: f64, _rng: &mut RandomSource) -> Vec<DVec3> {
        let raised = start + DVec3::Y * self.root_height;
        wobbly_path(&self.params, seed, raised, (height - self.root_height).max(1.0), DVec3::ZERO)
    }

    fn voxelize(&self, path: &[DVec3]) -> BTreeSet<BlockPos> {
        let mut out = stamp_path(path, |t| self.radius_at(t));
        if let Some(&base) = path.first() {
            for root in self.roots(base) {
                stamp_path_into(&root, |_| self.root_radius, &mut out);
            }
        }
        out
    }
}

/// Built-in tree archetypes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrunkArchetype {
    #[default]
    Oak,
    Conifer,
    Willow,
    Mangrove,
}

impl TrunkArchetype {
    pub const ALL: [TrunkArchetype; 4] =
        [TrunkArchetype::Oak, TrunkArchetype::Conifer, TrunkArchetype::Willow, TrunkArchetype::Mangrove];

    pub fn as_str(self) -> &'static str {
        match self {
            TrunkArchetype::Oak => "oak",
            TrunkArchetype::Conifer => "conifer",
            TrunkArchetype::Willow => "willow",
            TrunkArchetype::Mangrove => "mangrove",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str().eq_ignore_ascii_case(s))
    }

    pub fn generator(self) -> Box<dyn TrunkGenerator> {
        match self {
            TrunkArchetype::Oak => Box::new(OakTrunk::new()),
            TrunkArchetype::Conifer => Box::new(ConiferTrunk::new()),
            TrunkArchetype::Willow => Box::new(WillowTrunk::new()),
            TrunkArchetype::Mangrove => Box::new(MangroveTrunk::new()),
        }
    }

    pub fn default_height(self) -> f64 {
        match self {
            TrunkArchetype::Oak => 18.0,
            TrunkArchetype::Conifer => 28.0,
            TrunkArchetype::Willow => 16.0,
            TrunkArchetype::Mangrove => 16.0,
        }
    }

    /// Branching preset matching the archetype's silhouette
    pub fn branching(self) -> BranchingParams {
        let base = BranchingParams::default();
        match self {
            TrunkArchetype::Oak => BranchingParams { style: BranchStyle::Crooked, length: 9.0, ..base },
            TrunkArchetype::Conifer => BranchingParams {
                style: BranchStyle::Straight,
                length: 7.0,
                length_taper: 0.8,
                segments: 6,
                upward_bias: -0.1,
                ring: Some(RingBranchRule::new(4, 0.4)),
                ..base
            },
            TrunkArchetype::Willow => BranchingParams {
                style: BranchStyle::Willow,
                length: 10.0,
                length_taper: 0.3,
                segments: 10,
                ..base
            },
            TrunkArchetype::Mangrove => BranchingParams { style: BranchStyle::AroundTrunk, length: 7.0, ..base },
        }
    }
}
