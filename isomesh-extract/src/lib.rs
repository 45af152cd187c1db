//! # isomesh-extract
//!
//! Marching-cubes isosurface extraction from scalar fields sampled on
//! regular 3D grids.
//!
//! Build a [`ScalarGrid`] over a rectangular domain, fill it from a scalar
//! function, and hand it to [`MarchingCubes`] (or the [`marching_cubes`]
//! convenience function) to obtain a triangle mesh of the surface where the
//! field equals the isovalue.

pub mod fields;
pub mod grid;
pub mod normals;
pub mod polygonize;
pub mod tables;

// Re-export commonly used items
pub use grid::*;
pub use normals::*;
pub use polygonize::*;
