//! Multi-root spiral trunk.
//!
//! The structure is built in three passes: a tapering core path with
//! noise-driven lateral divergence, a helix of roots winding around a
//! Bezier curve that rises from below ground to the core's base, and a
//! second helix of strands winding the core itself. Root radius and pitch
//! follow randomized [`PiecewiseCurve`]s whose segment count is
//! `root_length / root_turns`.

use std::collections::BTreeSet;
use std::f64::consts::TAU;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::curve::{CurveSegment, Easing, PiecewiseCurve};
use super::voxelize::{stamp_path, stamp_path_into};
use crate::core::Error;
use crate::math::{BlockPos, VectorExt, cubic_bezier, cubic_bezier_tangent, orthonormal_basis};
use crate::noise_field::{FractalNoise, NoiseParams, NoiseSampler};
use crate::random::RandomSource;

/// Upper bound for `core_height` and `root_length`
pub const MAX_SPIRAL_EXTENT: f64 = 256.0;
/// Upper bound for `root_count` and `core_strands`
pub const MAX_SPIRAL_PATHS: usize = 32;
/// Upper bound for [`SpiralTrunkParams::root_segments`]
pub const MAX_ROOT_SEGMENTS: usize = 256;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiralTrunkParams {
    pub core_height: f64,
    pub core_base_radius: f64,
    pub core_top_radius: f64,
    /// Largest lateral drift of the core at its top
    pub core_divergence: f64,
    pub core_noise_frequency: f64,
    pub core_strands: usize,
    pub core_turns: f64,
    pub strand_thickness: f64,

    pub root_count: usize,
    /// Arc length of the root guide curve in blocks
    pub root_length: f64,
    pub root_turns: f64,
    /// How far below the origin the roots begin
    pub root_depth: f64,
    pub root_spread: f64,
    pub root_radius_min: f64,
    pub root_radius_max: f64,
    pub root_pitch_min: f64,
    pub root_pitch_max: f64,
    pub root_thickness: f64,
}

impl Default for SpiralTrunkParams {
    fn default() -> Self {
        Self {
            core_height: 24.0,
            core_base_radius: 2.5,
            core_top_radius: 0.8,
            core_divergence: 3.0,
            core_noise_frequency: 0.06,
            core_strands: 3,
            core_turns: 2.0,
            strand_thickness: 1.0,
            root_count: 4,
            root_length: 18.0,
            root_turns: 1.5,
            root_depth: 6.0,
            root_spread: 6.0,
            root_radius_min: 1.0,
            root_radius_max: 2.5,
            root_pitch_min: 0.6,
            root_pitch_max: 1.4,
            root_thickness: 1.2,
        }
    }
}

impl SpiralTrunkParams {
    pub fn validate(&self) -> crate::core::Result<()> {
        if self.root_turns.is_nan() || self.root_turns <= 0.0 {
            return Err(Error::config("spiral trunk root_turns must be positive"));
        }
        if self.root_radius_min > self.root_radius_max || self.root_pitch_min > self.root_pitch_max {
            return Err(Error::config("spiral trunk min bounds exceed max bounds"));
        }
        if [self.core_height, self.root_length].iter().any(|v| v.is_nan() || *v <= 0.0) {
            return Err(Error::config("spiral trunk heights and lengths must be positive"));
        }
        if self.core_height > MAX_SPIRAL_EXTENT || self.root_length > MAX_SPIRAL_EXTENT {
            return Err(Error::config(format!(
                "spiral trunk core_height and root_length must not exceed {}",
                MAX_SPIRAL_EXTENT
            )));
        }
        if self.root_count > MAX_SPIRAL_PATHS || self.core_strands > MAX_SPIRAL_PATHS {
            return Err(Error::config(format!(
                "spiral trunk root_count and core_strands must not exceed {}",
                MAX_SPIRAL_PATHS
            )));
        }
        if self.root_length / self.root_turns > MAX_ROOT_SEGMENTS as f64 {
            return Err(Error::config(format!(
                "spiral trunk root_length / root_turns must not exceed {}",
                MAX_ROOT_SEGMENTS
            )));
        }
        Ok(())
    }

    /// Number of piecewise segments along the roots
    pub fn root_segments(&self) -> usize {
        if self.root_turns <= 0.0 {
            return 1;
        }
        ((self.root_length / self.root_turns).round() as usize).clamp(1, MAX_ROOT_SEGMENTS)
    }

    fn core_height(&self) -> f64 {
        if self.core_height.is_nan() { 0.0 } else { self.core_height.clamp(0.0, MAX_SPIRAL_EXTENT) }
    }

    fn root_length(&self) -> f64 {
        if self.root_length.is_nan() { 0.0 } else { self.root_length.clamp(0.0, MAX_SPIRAL_EXTENT) }
    }

    pub fn core_radius_at(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        self.core_base_radius + (self.core_top_radius - self.core_base_radius) * t
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpiralTrunk {
    pub core: Vec<DVec3>,
    pub roots: Vec<Vec<DVec3>>,
    pub strands: Vec<Vec<DVec3>>,
    pub root_radius: PiecewiseCurve,
    pub root_pitch: PiecewiseCurve,
    pub voxels: BTreeSet<BlockPos>,
}

/// Flare near the base, then a steady taper
fn core_taper() -> PiecewiseCurve {
    PiecewiseCurve::new(vec![
        CurveSegment { start: 0.0, end: 0.3, from: 1.3, to: 1.0, easing: Easing::InvertedQuadratic },
        CurveSegment { start: 0.3, end: 1.0, from: 1.0, to: 0.6, easing: Easing::Linear },
    ])
}

fn core_path(seed: u64, origin: DVec3, params: &SpiralTrunkParams) -> Vec<DVec3> {
    let height = params.core_height();
    let steps = height.ceil().max(1.0) as usize;
    let noise = NoiseParams { octaves: 2, frequency: params.core_noise_frequency, ..NoiseParams::default() };
    let nx = FractalNoise::new(NoiseParams { seed: seed as u32, ..noise.clone() });
    let nz = FractalNoise::new(NoiseParams { seed: (seed as u32).wrapping_add(7919), ..noise });
    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            let y = height * t;
            let drift = DVec3::new(nx.sample(y, 3.7), 0.0, nz.sample(y, 3.7)) * params.core_divergence * t;
            origin + DVec3::Y * y + drift
        })
        .collect()
}

/// Build a multi-root spiral trunk rooted at `origin`
pub fn generate_multi_root_spiral_trunk(
    seed: u64,
    origin: DVec3,
    params: &SpiralTrunkParams,
    rng: &mut RandomSource,
) -> SpiralTrunk {
    let core = core_path(seed, origin, params);
    let base = core[0];

    let segments = params.root_segments();
    let start_radius = (params.root_radius_min + params.root_radius_max) * 0.5;
    let root_radius =
        PiecewiseCurve::random(rng, segments, start_radius, params.root_radius_min, params.root_radius_max);
    let root_pitch = PiecewiseCurve::random(rng, segments, 1.0, params.root_pitch_min, params.root_pitch_max);

    // Guide curve from below ground up to the core base
    let sway = rng.range_f64(0.0, TAU);
    let side = DVec3::new(sway.cos(), 0.0, sway.sin());
    let p0 = base - DVec3::Y * params.root_depth;
    let p1 = p0 + side * params.root_spread;
    let p2 = base - DVec3::Y * (params.root_depth * 0.3) - side * params.root_spread * 0.5;
    let p3 = base;

    let samples = ((params.root_length() * 2.0).ceil() as usize).max(8);
    let root_count = params.root_count.clamp(1, MAX_SPIRAL_PATHS);
    let mut roots: Vec<Vec<DVec3>> = vec![Vec::with_capacity(samples + 1); root_count];
    let mut theta = 0.0;
    for k in 0..=samples {
        let s = k as f64 / samples as f64;
        if k > 0 {
            theta += TAU * params.root_turns / samples as f64 * root_pitch.eval(s);
        }
        let center = cubic_bezier(p0, p1, p2, p3, s);
        let tangent = cubic_bezier_tangent(p0, p1, p2, p3, s).normalize_or(DVec3::Y);
        let (u, v) = orthonormal_basis(tangent);
        let r = root_radius.eval(s);
        for (j, root) in roots.iter_mut().enumerate() {
            let phase = theta + TAU * j as f64 / root_count as f64;
            root.push(center + (u * phase.cos() + v * phase.sin()) * r);
        }
    }

    let taper = core_taper();
    let strand_count = params.core_strands.clamp(1, MAX_SPIRAL_PATHS);
    let last = core.len() - 1;
    let strands: Vec<Vec<DVec3>> = (0..strand_count)
        .map(|j| {
            let phase = TAU * j as f64 / strand_count as f64;
            core.iter()
                .enumerate()
                .map(|(i, &p)| {
                    let t = if last == 0 { 0.0 } else { i as f64 / last as f64 };
                    let ahead = core[(i + 1).min(last)];
                    let behind = core[i.saturating_sub(1)];
                    let (u, v) = orthonormal_basis((ahead - behind).normalize_or(DVec3::Y));
                    let angle = phase + TAU * params.core_turns * t;
                    let r = params.core_radius_at(t) * taper.eval(t);
                    p + (u * angle.cos() + v * angle.sin()) * r
                })
                .collect()
        })
        .collect();

    let mut voxels = BTreeSet::new();
    for root in &roots {
        stamp_path_into(root, |_| params.root_thickness, &mut voxels);
    }
    let strand_voxels: BTreeSet<BlockPos> = strands
        .iter()
        .flat_map(|strand| stamp_path(strand, |_| params.strand_thickness))
        .collect();
    voxels.extend(strand_voxels);

    log::debug!(
        "Spiral trunk: {} roots x {} samples, {} strands, {} root segments, {} voxels",
        roots.len(),
        samples + 1,
        strands.len(),
        segments,
        voxels.len()
    );

    SpiralTrunk { core, roots, strands, root_radius, root_pitch, voxels }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_segments_scale_inversely_with_turns() {
        let mut params = SpiralTrunkParams { root_length: 18.0, root_turns: 1.5, ..Default::default() };
        assert_eq!(params.root_segments(), 12);
        params.root_turns = 3.0;
        assert_eq!(params.root_segments(), 6);
        params.root_turns = 100.0;
        assert_eq!(params.root_segments(), 1);
    }

    #[test]
    fn test_structure_shape() {
        let params = SpiralTrunkParams::default();
        let origin = DVec3::new(0.5, 64.0, 0.5);
        let trunk = generate_multi_root_spiral_trunk(5, origin, &params, &mut RandomSource::new(5));

        assert_eq!(trunk.core[0], origin);
        assert_eq!(trunk.roots.len(), params.root_count);
        assert_eq!(trunk.strands.len(), params.core_strands);
        assert_eq!(trunk.root_radius.segments().len(), params.root_segments());

        let lowest = trunk.voxels.iter().map(|p| p.y).min().unwrap_or(i32::MAX);
        let highest = trunk.voxels.iter().map(|p| p.y).max().unwrap_or(i32::MIN);
        assert!(lowest < 64, "roots should reach below ground, lowest {lowest}");
        assert!(highest >= 64 + params.core_height as i32 - 2, "core too short, highest {highest}");

        // roots end wound around the core base
        for root in &trunk.roots {
            let end = root[root.len() - 1];
            assert!(end.distance(origin) <= params.root_radius_max + 1e-9);
        }
    }

    #[test]
    fn test_deterministic() {
        let params = SpiralTrunkParams::default();
        let a = generate_multi_root_spiral_trunk(1, DVec3::ZERO, &params, &mut RandomSource::new(1));
        let b = generate_multi_root_spiral_trunk(1, DVec3::ZERO, &params, &mut RandomSource::new(1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_validate() {
        assert!(SpiralTrunkParams::default().validate().is_ok());
        let bad = SpiralTrunkParams { root_turns: 0.0, ..Default::default() };
        assert!(bad.validate().is_err());

        let tall = SpiralTrunkParams { core_height: 1e9, ..Default::default() };
        assert!(tall.validate().is_err());
        let long = SpiralTrunkParams { root_length: 1e9, ..Default::default() };
        assert!(long.validate().is_err());
        let nan = SpiralTrunkParams { root_length: f64::NAN, ..Default::default() };
        assert!(nan.validate().is_err());
        let crowded = SpiralTrunkParams { root_count: 10_000, ..Default::default() };
        assert!(crowded.validate().is_err());
        let tight = SpiralTrunkParams { root_turns: 1e-6, ..Default::default() };
        assert!(tight.validate().is_err());
        assert_eq!(tight.root_segments(), MAX_ROOT_SEGMENTS);

        let edge = SpiralTrunkParams { core_height: MAX_SPIRAL_EXTENT, ..Default::default() };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_unvalidated_extents_are_clamped() {
        let params = SpiralTrunkParams {
            core_height: 1e9,
            root_length: 1e9,
            root_count: 2,
            core_strands: 1,
            ..Default::default()
        };
        let trunk = generate_multi_root_spiral_trunk(3, DVec3::ZERO, &params, &mut RandomSource::new(3));
        assert_eq!(trunk.core.len(), MAX_SPIRAL_EXTENT as usize + 1);
        assert_eq!(trunk.roots[0].len(), (MAX_SPIRAL_EXTENT * 2.0) as usize + 1);
        let highest = trunk.core[trunk.core.len() - 1].y;
        assert!((highest - MAX_SPIRAL_EXTENT).abs() < 1e-9);
    }
}
