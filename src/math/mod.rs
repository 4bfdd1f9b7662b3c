//! Mathematical utilities and data structures

pub mod block_pos;
pub mod block_box;
pub mod vector;

pub use block_pos::{BlockPos, ChunkPos, Mirror, Rotation, CHUNK_SIZE};
pub use block_box::BlockBox;
pub use vector::{VectorExt, cubic_bezier, cubic_bezier_tangent, orthonormal_basis, quadratic_bezier};
