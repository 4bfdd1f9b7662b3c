//! Sphere stamping of centerlines into block sets

use std::collections::BTreeSet;

use glam::DVec3;

use crate::math::BlockPos;

/// Largest distance between consecutive stamps along a path
const STAMP_SPACING: f64 = 0.5;

/// Add every block whose centre lies within `radius` of `center`.
///
/// The block containing `center` is always included, so thin radii still
/// leave a continuous trail.
pub fn stamp_sphere(center: DVec3, radius: f64, out: &mut BTreeSet<BlockPos>) {
    out.insert(BlockPos::from_world(center));
    let r = radius.max(0.0);
    let min = BlockPos::from_world(center - DVec3::splat(r));
    let max = BlockPos::from_world(center + DVec3::splat(r));
    let r_sq = r * r;
    for x in min.x..=max.x {
        for y in min.y..=max.y {
            for z in min.z..=max.z {
                let p = BlockPos::new(x, y, z);
                if p.center().distance_squared(center) <= r_sq {
                    out.insert(p);
                }
            }
        }
    }
}

/// Stamp spheres along a polyline; `radius_at` receives normalized arc length
pub fn stamp_path(path: &[DVec3], radius_at: impl Fn(f64) -> f64) -> BTreeSet<BlockPos> {
    let mut out = BTreeSet::new();
    stamp_path_into(path, radius_at, &mut out);
    out
}

/// [`stamp_path`] into an existing set
pub fn stamp_path_into(path: &[DVec3], radius_at: impl Fn(f64) -> f64, out: &mut BTreeSet<BlockPos>) {
    let Some(&first) = path.first() else {
        return;
    };
    let total: f64 = path.windows(2).map(|w| w[0].distance(w[1])).sum();
    if total <= 0.0 {
        stamp_sphere(first, radius_at(0.0), out);
        return;
    }

    let mut travelled = 0.0;
    stamp_sphere(first, radius_at(0.0), out);
    for w in path.windows(2) {
        let (a, b) = (w[0], w[1]);
        let len = a.distance(b);
        let steps = (len / STAMP_SPACING).ceil().max(1.0) as usize;
        for s in 1..=steps {
            let f = s as f64 / steps as f64;
            let p = a.lerp(b, f);
            let t = ((travelled + len * f) / total).clamp(0.0, 1.0);
            stamp_sphere(p, radius_at(t), out);
        }
        travelled += len;
    }
}
