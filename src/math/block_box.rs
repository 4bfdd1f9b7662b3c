//! Integer axis-aligned bounding box

use super::block_pos::{BlockPos, Mirror, Rotation};

/// Inclusive block-space bounding box defined by min and max corners
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlockBox {
    pub min: BlockPos,
    pub max: BlockPos,
}

impl BlockBox {
    /// Create box from two arbitrary corners
    pub fn from_corners(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: BlockPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: BlockPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Box occupied by a structure of `size` placed at `origin` with a transform.
    ///
    /// The local corner `size - 1` is transformed the same way template
    /// blocks are, so the box matches what `place` writes.
    pub fn for_structure(origin: BlockPos, size: BlockPos, rotation: Rotation, mirror: Mirror) -> Self {
        let far = BlockPos::new(size.x - 1, size.y - 1, size.z - 1)
            .mirror(mirror)
            .rotate(rotation);
        Self::from_corners(origin, origin + far)
    }

    /// Number of blocks along each axis
    pub fn size(&self) -> BlockPos {
        BlockPos::new(
            self.max.x - self.min.x + 1,
            self.max.y - self.min.y + 1,
            self.max.z - self.min.z + 1,
        )
    }

    /// Check if block is inside the box
    pub fn contains(&self, p: BlockPos) -> bool {
        p.x >= self.min.x && p.x <= self.max.x &&
        p.y >= self.min.y && p.y <= self.max.y &&
        p.z >= self.min.z && p.z <= self.max.z
    }

    /// Check if two boxes share at least one block
    pub fn intersects(&self, other: &BlockBox) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Expand box to include block
    pub fn expand(&mut self, p: BlockPos) {
        *self = Self::from_corners(
            BlockPos::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            BlockPos::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_orders() {
        let b = BlockBox::from_corners(BlockPos::new(4, 0, -1), BlockPos::new(1, 2, 3));
        assert_eq!(b.min, BlockPos::new(1, 0, -1));
        assert_eq!(b.max, BlockPos::new(4, 2, 3));
        assert_eq!(b.size(), BlockPos::new(4, 3, 5));
    }

    #[test]
    fn test_intersects() {
        let a = BlockBox::from_corners(BlockPos::ZERO, BlockPos::new(3, 3, 3));
        let b = BlockBox::from_corners(BlockPos::new(3, 0, 3), BlockPos::new(5, 1, 5));
        let c = BlockBox::from_corners(BlockPos::new(4, 0, 0), BlockPos::new(6, 3, 3));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_structure_box_rotated() {
        let size = BlockPos::new(5, 2, 3);
        let b = BlockBox::for_structure(BlockPos::new(10, 0, 10), size, Rotation::Clockwise90, Mirror::None);
        // 5 along x becomes 5 along z; 3 along z becomes 3 along -x
        assert_eq!(b.size(), BlockPos::new(3, 2, 5));
        assert!(b.contains(BlockPos::new(10, 0, 10)));
        assert!(b.contains(BlockPos::new(8, 1, 14)));
    }

    #[test]
    fn test_expand() {
        let mut b = BlockBox::from_corners(BlockPos::ZERO, BlockPos::ZERO);
        b.expand(BlockPos::new(-2, 5, 1));
        assert!(b.contains(BlockPos::new(-1, 3, 0)));
    }
}
