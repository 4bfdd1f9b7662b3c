//! Core type aliases and re-exports

pub use glam::{DVec2, DVec3, DQuat};

/// Standard Result type for voxgen
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;
