//! Collision-aware branch placement.
//!
//! [`BranchingEngine::generate_all`] walks a list of attachment points,
//! generates branches for each and trims them against a growing
//! [`OccupancyVolume`]. Accepted branches are added to the volume so later
//! branches steer clear of them. Output is a pure function of the seed.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::branch::{BranchGenerator, BranchRequest, BranchStyle};
use super::ring::RingBranchRule;
use crate::core::Error;
use crate::random::RandomSource;

/// Shrink sphere radius at every attachment, as a share of the parent radius
pub const SHRINK_FACTOR: f64 = 0.35;
/// Smallest radius used when adding branch points to the occupancy volume
pub const MIN_OCCUPANCY_RADIUS: f64 = 0.10;
/// Constant forward bias along the parent tangent
pub const FORWARD_BIAS: f64 = 0.1;
/// Extra attempts for the single-angle path after a collision
pub const MAX_JITTER_RETRIES: usize = 3;
/// How strongly height reduces the upward bias
const HEIGHT_BIAS_FALLOFF: f64 = 0.6;

/// Where a branch may originate on its parent
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttachmentPoint {
    pub position: DVec3,
    pub tangent: DVec3,
    pub parent_radius: f64,
    /// Relative height on the parent in [0, 1]
    pub height_factor: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: DVec3,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// Spheres occupied so far, each tagged with the attachment that produced it
#[derive(Clone, Debug, Default)]
pub struct OccupancyVolume {
    spheres: Vec<(Sphere, usize)>,
}

impl OccupancyVolume {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sphere: Sphere, owner: usize) {
        self.spheres.push((sphere, owner));
    }

    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    pub fn spheres(&self) -> impl Iterator<Item = (&Sphere, usize)> {
        self.spheres.iter().map(|(s, owner)| (s, *owner))
    }

    /// Whether a point of radius `radius` fits without touching spheres of other owners
    pub fn is_free(&self, point: DVec3, radius: f64, margin: f64, owner: usize) -> bool {
        self.spheres.iter().all(|(sphere, o)| {
            *o == owner || point.distance(sphere.center) >= sphere.radius + radius + margin
        })
    }

    /// Index of the first colliding point, if any
    pub fn first_collision(&self, points: &[DVec3], radius: f64, margin: f64, owner: usize) -> Option<usize> {
        points.iter().position(|p| !self.is_free(*p, radius, margin, owner))
    }

    /// Prefix of `points` up to (excluding) the first collision
    pub fn trim(&self, points: &[DVec3], radius: f64, margin: f64, owner: usize) -> Vec<DVec3> {
        let end = self.first_collision(points, radius, margin, owner).unwrap_or(points.len());
        points[..end].to_vec()
    }
}

/// Tuning for [`BranchingEngine`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchingParams {
    pub style: BranchStyle,
    /// Length at height factor 0
    pub length: f64,
    /// Share of the length lost at height factor 1
    pub length_taper: f64,
    pub segments: usize,
    pub radius_ratio: f64,
    pub min_radius: f64,
    pub safety_margin: f64,
    pub upward_bias: f64,
    /// Largest azimuth change per retry, in radians
    pub retry_jitter: f64,
    /// Fan out several branches per attachment instead of one
    pub ring: Option<RingBranchRule>,
}

impl Default for BranchingParams {
    fn default() -> Self {
        Self {
            style: BranchStyle::Crooked,
            length: 8.0,
            length_taper: 0.5,
            segments: 8,
            radius_ratio: 0.5,
            min_radius: 0.3,
            safety_margin: 0.2,
            upward_bias: 0.4,
            retry_jitter: 0.6,
            ring: None,
        }
    }
}

impl BranchingParams {
    pub fn validate(&self) -> crate::core::Result<()> {
        if self.segments == 0 {
            return Err(Error::config("branching.segments must be at least 1"));
        }
        if self.length < 0.0 || self.min_radius < 0.0 || self.safety_margin < 0.0 || self.radius_ratio < 0.0 {
            return Err(Error::config("branching lengths, radii and margins must not be negative"));
        }
        if !(0.0..=1.0).contains(&self.length_taper) {
            return Err(Error::config("branching.length_taper must be in [0, 1]"));
        }
        Ok(())
    }

    /// Radius of branches grown from a parent of `parent_radius`
    pub fn branch_radius(&self, parent_radius: f64) -> f64 {
        (parent_radius * self.radius_ratio).max(self.min_radius)
    }
}

/// An accepted branch
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// Index of the attachment point it grew from
    pub attachment: usize,
    pub points: Vec<DVec3>,
    pub radius: f64,
}

/// Places branches on attachment points without self-intersection
pub struct BranchingEngine {
    generator: Box<dyn BranchGenerator>,
    params: BranchingParams,
}

impl BranchingEngine {
    pub fn new(params: BranchingParams) -> Self {
        Self { generator: params.style.generator(), params }
    }

    /// Engine with a custom generator; `params.style` is ignored
    pub fn with_generator(generator: Box<dyn BranchGenerator>, params: BranchingParams) -> Self {
        Self { generator, params }
    }

    pub fn params(&self) -> &BranchingParams {
        &self.params
    }

    fn request(&self, point: &AttachmentPoint) -> BranchRequest {
        let height = point.height_factor.clamp(0.0, 1.0);
        BranchRequest {
            attach: point.position,
            tangent: point.tangent,
            parent_radius: point.parent_radius,
            length: self.params.length * (1.0 - self.params.length_taper * height),
            segments: self.params.segments.max(1),
            upward_bias: self.params.upward_bias * (1.0 - HEIGHT_BIAS_FALLOFF * height),
            forward_bias: FORWARD_BIAS,
        }
    }

    /// Generate every branch for `attachments`
    pub fn generate_all(&self, rng: &mut RandomSource, attachments: &[AttachmentPoint]) -> Vec<Branch> {
        let mut occupancy = OccupancyVolume::new();
        for (i, point) in attachments.iter().enumerate() {
            occupancy.insert(Sphere::new(point.position, point.parent_radius * SHRINK_FACTOR), i);
        }

        let margin = self.params.safety_margin;
        let mut branches = Vec::new();
        let mut dropped = 0usize;

        for (i, point) in attachments.iter().enumerate() {
            let req = self.request(point);
            let radius = self.params.branch_radius(point.parent_radius);

            let accepted: Vec<Vec<DVec3>> = match &self.params.ring {
                Some(rule) => {
                    let fanned = self.generator.generate_at(rng, &req, rule);
                    let total = fanned.len();
                    let kept: Vec<_> = fanned
                        .into_iter()
                        .map(|(_, points)| occupancy.trim(&points, radius, margin, i))
                        .filter(|points| points.len() > 1)
                        .collect();
                    dropped += total - kept.len();
                    kept
                }
                None => match self.single(rng, &req, radius, &occupancy, i) {
                    Some(points) => vec![points],
                    None => {
                        dropped += 1;
                        Vec::new()
                    }
                },
            };

            for points in accepted {
                for p in &points {
                    occupancy.insert(Sphere::new(*p, radius.max(MIN_OCCUPANCY_RADIUS)), i);
                }
                branches.push(Branch { attachment: i, points, radius });
            }
        }

        log::debug!(
            "Branching: {} attachments, {} branches, {} dropped, {} occupied spheres",
            attachments.len(),
            branches.len(),
            dropped,
            occupancy.len()
        );
        branches
    }

    /// One branch at a random azimuth, retried with jitter on collision
    fn single(
        &self,
        rng: &mut RandomSource,
        req: &BranchRequest,
        radius: f64,
        occupancy: &OccupancyVolume,
        owner: usize,
    ) -> Option<Vec<DVec3>> {
        let jitter = self.params.retry_jitter.abs();
        let mut azimuth = rng.range_f64(0.0, std::f64::consts::TAU);
        let mut best: Option<Vec<DVec3>> = None;

        for attempt in 0..=MAX_JITTER_RETRIES {
            if attempt > 0 {
                azimuth += rng.range_f64(-jitter, jitter);
            }
            let points = self.generator.generate_toward(rng, req, azimuth);
            let trimmed = occupancy.trim(&points, radius, self.params.safety_margin, owner);
            let clean = trimmed.len() == points.len();
            if best.as_ref().is_none_or(|b| trimmed.len() > b.len()) {
                best = Some(trimmed);
            }
            if clean {
                break;
            }
        }

        best.filter(|points| points.len() > 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::branch::StraightBranch;

    fn trunk_attachments(count: usize) -> Vec<AttachmentPoint> {
        (0..count)
            .map(|i| {
                let t = i as f64 / count as f64;
                AttachmentPoint {
                    position: DVec3::new(0.0, 4.0 + 3.0 * i as f64, 0.0),
                    tangent: DVec3::Y,
                    parent_radius: 1.5 * (1.0 - 0.5 * t),
                    height_factor: t,
                }
            })
            .collect()
    }

    fn assert_collision_free(branches: &[Branch], margin: f64) {
        for (a, ba) in branches.iter().enumerate() {
            for bb in &branches[a + 1..] {
                if ba.attachment == bb.attachment {
                    continue;
                }
                for p in &ba.points {
                    for q in &bb.points {
                        let d = p.distance(*q);
                        let min = ba.radius + bb.radius + margin;
                        assert!(d >= min - 1e-9, "points {p:?} and {q:?} are {d} apart, need {min}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_trim_stops_at_first_collision() {
        let mut volume = OccupancyVolume::new();
        volume.insert(Sphere::new(DVec3::new(5.0, 0.0, 0.0), 1.0), 0);
        let points: Vec<_> = (0..10).map(|i| DVec3::new(i as f64, 0.0, 0.0)).collect();
        let trimmed = volume.trim(&points, 0.5, 0.1, 1);
        assert_eq!(trimmed.len(), 4);
        // own spheres never block
        assert_eq!(volume.trim(&points, 0.5, 0.1, 0).len(), 10);
    }

    #[test]
    fn test_generate_all_is_deterministic() {
        let engine = BranchingEngine::new(BranchingParams::default());
        let attachments = trunk_attachments(12);
        let a = engine.generate_all(&mut RandomSource::new(42), &attachments);
        let b = engine.generate_all(&mut RandomSource::new(42), &attachments);
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_branches_are_collision_free() {
        for style in BranchStyle::ALL {
            let params = BranchingParams { style, ..BranchingParams::default() };
            let engine = BranchingEngine::new(params.clone());
            for seed in 0..5 {
                let branches = engine.generate_all(&mut RandomSource::new(seed), &trunk_attachments(16));
                assert_collision_free(&branches, params.safety_margin);
            }
        }
    }

    #[test]
    fn test_ring_fan_out_is_collision_free() {
        let params = BranchingParams {
            style: BranchStyle::Straight,
            ring: Some(RingBranchRule::new(4, 0.3)),
            ..BranchingParams::default()
        };
        let engine = BranchingEngine::new(params.clone());
        let branches = engine.generate_all(&mut RandomSource::new(7), &trunk_attachments(8));
        assert!(branches.len() > 8, "ring should fan out, got {}", branches.len());
        assert_collision_free(&branches, params.safety_margin);
        for b in &branches {
            assert!(b.points.len() > 1);
        }
    }

    #[test]
    fn test_blocked_branch_is_dropped() {
        let engine = BranchingEngine::with_generator(Box::new(StraightBranch), BranchingParams::default());
        let point = AttachmentPoint { position: DVec3::ZERO, tangent: DVec3::Y, parent_radius: 1.0, height_factor: 0.0 };
        let req = engine.request(&point);

        let mut blocked = OccupancyVolume::new();
        blocked.insert(Sphere::new(DVec3::ZERO, 50.0), 99);
        assert!(engine.single(&mut RandomSource::new(1), &req, 0.5, &blocked, 0).is_none());

        let free = OccupancyVolume::new();
        let points = engine.single(&mut RandomSource::new(1), &req, 0.5, &free, 0);
        assert_eq!(points.map(|p| p.len()), Some(engine.params().segments + 1));
    }

    #[test]
    fn test_branch_radius_floor() {
        let params = BranchingParams { radius_ratio: 0.1, min_radius: 0.4, ..BranchingParams::default() };
        assert_eq!(params.branch_radius(1.0), 0.4);
        assert_eq!(params.branch_radius(10.0), 1.0);
    }

    #[test]
    fn test_validate() {
        assert!(BranchingParams::default().validate().is_ok());
        let bad = BranchingParams { segments: 0, ..BranchingParams::default() };
        assert!(bad.validate().is_err());
    }
}
