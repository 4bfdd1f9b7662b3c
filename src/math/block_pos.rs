//! Integer lattice coordinates, chunk coordinates and 90° transforms

use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Chunk edge length in blocks, as a shift.
pub const CHUNK_SHIFT: i32 = 4;

/// Chunk edge length in blocks.
pub const CHUNK_SIZE: i32 = 1 << CHUNK_SHIFT;

/// Integer coordinate of a single block in the voxel grid
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };

    /// Create a new block position
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Block containing a floating point position
    pub fn from_world(pos: glam::DVec3) -> Self {
        Self {
            x: pos.x.floor() as i32,
            y: pos.y.floor() as i32,
            z: pos.z.floor() as i32,
        }
    }

    /// Centre of this block in world space
    pub fn center(&self) -> glam::DVec3 {
        glam::DVec3::new(self.x as f64 + 0.5, self.y as f64 + 0.5, self.z as f64 + 0.5)
    }

    /// Translate by the given deltas
    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Rotate around the Y axis through the origin
    pub fn rotate(&self, rotation: Rotation) -> Self {
        match rotation {
            Rotation::None => *self,
            Rotation::Clockwise90 => Self::new(-self.z, self.y, self.x),
            Rotation::Clockwise180 => Self::new(-self.x, self.y, -self.z),
            Rotation::CounterClockwise90 => Self::new(self.z, self.y, -self.x),
        }
    }

    /// Mirror across the given plane through the origin
    pub fn mirror(&self, mirror: Mirror) -> Self {
        match mirror {
            Mirror::None => *self,
            Mirror::LeftRight => Self::new(self.x, self.y, -self.z),
            Mirror::FrontBack => Self::new(-self.x, self.y, self.z),
        }
    }

    /// Chunk containing this block
    pub fn chunk(&self) -> ChunkPos {
        ChunkPos::new(self.x >> CHUNK_SHIFT, self.z >> CHUNK_SHIFT)
    }

    /// Chebyshev (chessboard) distance in the XZ plane
    pub fn horizontal_chebyshev(&self, other: &BlockPos) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

impl Add for BlockPos {
    type Output = BlockPos;

    fn add(self, rhs: BlockPos) -> BlockPos {
        BlockPos::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for BlockPos {
    type Output = BlockPos;

    fn sub(self, rhs: BlockPos) -> BlockPos {
        BlockPos::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for BlockPos {
    type Output = BlockPos;

    fn neg(self) -> BlockPos {
        BlockPos::new(-self.x, -self.y, -self.z)
    }
}

/// Column coordinate of a 16×16 chunk
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    /// Create a new chunk coordinate
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Minimum corner block of this chunk at the given height
    pub fn origin(&self, y: i32) -> BlockPos {
        BlockPos::new(self.x << CHUNK_SHIFT, y, self.z << CHUNK_SHIFT)
    }
}

/// Rotation about the Y axis in 90° steps
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    CounterClockwise90,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::None,
        Rotation::Clockwise90,
        Rotation::Clockwise180,
        Rotation::CounterClockwise90,
    ];

    /// Clockwise angle in degrees
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::CounterClockwise90 => 270,
        }
    }

    /// Nearest rotation for a clockwise angle in degrees (any multiple of 90 works)
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            d if d < 45 || d >= 315 => Rotation::None,
            d if d < 135 => Rotation::Clockwise90,
            d if d < 225 => Rotation::Clockwise180,
            _ => Rotation::CounterClockwise90,
        }
    }

    /// Compose two rotations
    pub fn then(self, other: Rotation) -> Rotation {
        Rotation::from_degrees(self.degrees() + other.degrees())
    }
}

/// Mirror plane for structure placement
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mirror {
    #[default]
    None,
    /// Flip along Z
    LeftRight,
    /// Flip along X
    FrontBack,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_full_turn() {
        let p = BlockPos::new(3, 7, -2);
        let mut q = p;
        for _ in 0..4 {
            q = q.rotate(Rotation::Clockwise90);
        }
        assert_eq!(p, q);
        assert_eq!(p.rotate(Rotation::Clockwise90), BlockPos::new(2, 7, 3));
        assert_eq!(
            p.rotate(Rotation::Clockwise90).rotate(Rotation::CounterClockwise90),
            p
        );
    }

    #[test]
    fn test_mirror_is_involution() {
        let p = BlockPos::new(5, 1, 9);
        assert_eq!(p.mirror(Mirror::LeftRight), BlockPos::new(5, 1, -9));
        assert_eq!(p.mirror(Mirror::FrontBack).mirror(Mirror::FrontBack), p);
    }

    #[test]
    fn test_chunk_of_negative_coordinates() {
        assert_eq!(BlockPos::new(-1, 0, 15).chunk(), ChunkPos::new(-1, 0));
        assert_eq!(BlockPos::new(16, 0, -17).chunk(), ChunkPos::new(1, -2));
        assert_eq!(ChunkPos::new(-1, 2).origin(64), BlockPos::new(-16, 64, 32));
    }

    #[test]
    fn test_rotation_degrees_round_trip() {
        for r in Rotation::ALL {
            assert_eq!(Rotation::from_degrees(r.degrees()), r);
        }
        assert_eq!(Rotation::Clockwise90.then(Rotation::Clockwise180), Rotation::CounterClockwise90);
        assert_eq!(Rotation::from_degrees(-90), Rotation::CounterClockwise90);
    }
}
