//! Core data structures for isomesh
//!
//! This crate provides the fundamental types shared by the isomesh workspace:
//! the [`Vec3`] arithmetic primitive, the [`TriangleMesh`] output type, and
//! the common error type.

pub mod error;
pub mod mesh;
pub mod vec3;

pub use error::*;
pub use mesh::*;
pub use vec3::*;

/// Common result type for isomesh operations
pub type Result<T> = std::result::Result<T, Error>;

// Component-type aliases for the instantiations this workspace uses
pub type Vec3d = Vec3<f64>;
pub type Vec3f = Vec3<f32>;
pub type Vec3i = Vec3<i32>;
