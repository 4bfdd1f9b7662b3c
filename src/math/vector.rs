//! Floating point vector helpers on top of `glam::DVec3`

use glam::{DQuat, DVec3};

use super::block_pos::{Mirror, Rotation};

/// Extra operations on [`DVec3`] used by the geometry generators
pub trait VectorExt {
    /// Rotate around an arbitrary axis by `angle` radians
    fn rotate_around(self, axis: DVec3, angle: f64) -> DVec3;
    /// Apply a 90° block rotation about the Y axis
    fn rotate_blocks(self, rotation: Rotation) -> DVec3;
    /// Mirror with the same convention as block positions
    fn mirror(self, mirror: Mirror) -> DVec3;
    /// Unit vector perpendicular to `self`
    fn perpendicular(self) -> DVec3;
    /// Normalize, or fall back to `fallback` for (near) zero vectors
    fn normalize_or(self, fallback: DVec3) -> DVec3;
}

impl VectorExt for DVec3 {
    fn rotate_around(self, axis: DVec3, angle: f64) -> DVec3 {
        let axis = axis.normalize_or(DVec3::Y);
        DQuat::from_axis_angle(axis, angle) * self
    }

    fn rotate_blocks(self, rotation: Rotation) -> DVec3 {
        match rotation {
            Rotation::None => self,
            Rotation::Clockwise90 => DVec3::new(-self.z, self.y, self.x),
            Rotation::Clockwise180 => DVec3::new(-self.x, self.y, -self.z),
            Rotation::CounterClockwise90 => DVec3::new(self.z, self.y, -self.x),
        }
    }

    fn mirror(self, mirror: Mirror) -> DVec3 {
        match mirror {
            Mirror::None => self,
            Mirror::LeftRight => DVec3::new(self.x, self.y, -self.z),
            Mirror::FrontBack => DVec3::new(-self.x, self.y, self.z),
        }
    }

    fn perpendicular(self) -> DVec3 {
        let dir = self.normalize_or(DVec3::Y);
        if dir.y.abs() < 0.9 {
            dir.cross(DVec3::Y).normalize()
        } else {
            dir.cross(DVec3::X).normalize()
        }
    }

    fn normalize_or(self, fallback: DVec3) -> DVec3 {
        let len_sq = self.length_squared();
        if len_sq < 1e-18 || !len_sq.is_finite() {
            fallback
        } else {
            self / len_sq.sqrt()
        }
    }
}

/// Orthonormal pair spanning the plane perpendicular to `axis`
pub fn orthonormal_basis(axis: DVec3) -> (DVec3, DVec3) {
    let w = axis.normalize_or(DVec3::Y);
    let u = w.perpendicular();
    let v = w.cross(u).normalize();
    (u, v)
}

/// Evaluate a quadratic Bezier curve at `t` in [0, 1]
pub fn quadratic_bezier(p0: DVec3, p1: DVec3, p2: DVec3, t: f64) -> DVec3 {
    let u = 1.0 - t;
    p0 * (u * u) + p1 * (2.0 * u * t) + p2 * (t * t)
}

/// Evaluate a cubic Bezier curve at `t` in [0, 1]
pub fn cubic_bezier(p0: DVec3, p1: DVec3, p2: DVec3, p3: DVec3, t: f64) -> DVec3 {
    let u = 1.0 - t;
    p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
}

/// Derivative of a cubic Bezier curve at `t`
pub fn cubic_bezier_tangent(p0: DVec3, p1: DVec3, p2: DVec3, p3: DVec3, t: f64) -> DVec3 {
    let u = 1.0 - t;
    (p1 - p0) * (3.0 * u * u) + (p2 - p1) * (6.0 * u * t) + (p3 - p2) * (3.0 * t * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_rotate_around_y() {
        let v = DVec3::X.rotate_around(DVec3::Y, std::f64::consts::FRAC_PI_2);
        assert!((v - DVec3::new(0.0, 0.0, -1.0)).length() < EPS, "got {v:?}");
    }

    #[test]
    fn test_perpendicular_is_orthogonal() {
        for dir in [DVec3::X, DVec3::Y, DVec3::new(0.3, -0.8, 0.1), DVec3::ZERO] {
            let p = dir.perpendicular();
            assert!((p.length() - 1.0).abs() < EPS);
            assert!(p.dot(dir.normalize_or(DVec3::Y)).abs() < EPS);
        }
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let (u, v) = orthonormal_basis(DVec3::new(0.2, 1.0, 0.4));
        assert!(u.dot(v).abs() < EPS);
        assert!((u.length() - 1.0).abs() < EPS);
        assert!((v.length() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_bezier_endpoints() {
        let (a, b, c, d) = (DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::ONE);
        assert_eq!(cubic_bezier(a, b, c, d, 0.0), a);
        assert_eq!(cubic_bezier(a, b, c, d, 1.0), d);
        assert_eq!(quadratic_bezier(a, b, c, 1.0), c);
    }

    #[test]
    fn test_block_rotation_matches_vector_rotation() {
        let v = DVec3::new(3.0, 1.0, -2.0);
        assert_eq!(v.rotate_blocks(Rotation::Clockwise90), DVec3::new(2.0, 1.0, 3.0));
        assert_eq!(v.mirror(Mirror::FrontBack), DVec3::new(-3.0, 1.0, -2.0));
    }
}
