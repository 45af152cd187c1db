//! Regular 3D sample grid for scalar fields

use isomesh_core::{Error, Result, Vec3};
use ndarray::Array3;

/// One lattice vertex: its position, scalar field value and, once estimated,
/// its surface normal.
#[derive(Debug, Clone)]
pub struct GridVertex {
    pub position: Vec3<f64>,
    pub value: f64,
    pub normal: Option<Vec3<f64>>,
}

/// Scalar field sampled at the vertices of a regular 3D lattice.
///
/// Built from a rectangular domain and per-axis vertex counts; field values
/// are filled in afterwards from a scalar function or an external sample set.
/// Lookup by `(i, j, k)` is O(1); indices outside the lattice panic through
/// the underlying array's bounds checking.
#[derive(Debug, Clone)]
pub struct ScalarGrid {
    samples: Array3<GridVertex>,
    dimensions: [usize; 3],
    spacing: [f64; 3],
    origin: Vec3<f64>,
    has_normals: bool,
}

impl ScalarGrid {
    /// Create a grid spanning `min..max` with `dimensions` vertices per axis.
    ///
    /// Each axis needs at least 2 vertices (one cell); anything less is an
    /// [`Error::InvalidArgument`].
    pub fn new(min: Vec3<f64>, max: Vec3<f64>, dimensions: [usize; 3]) -> Result<Self> {
        if dimensions.iter().any(|&n| n < 2) {
            return Err(Error::InvalidArgument(format!(
                "grid needs at least 2 vertices per axis, got {dimensions:?}"
            )));
        }

        let spacing = [
            (max[0] - min[0]) / (dimensions[0] - 1) as f64,
            (max[1] - min[1]) / (dimensions[1] - 1) as f64,
            (max[2] - min[2]) / (dimensions[2] - 1) as f64,
        ];

        let samples = Array3::from_shape_fn(
            (dimensions[0], dimensions[1], dimensions[2]),
            |(i, j, k)| GridVertex {
                position: Vec3::new(
                    min[0] + i as f64 * spacing[0],
                    min[1] + j as f64 * spacing[1],
                    min[2] + k as f64 * spacing[2],
                ),
                value: 0.0,
                normal: None,
            },
        );

        Ok(Self {
            samples,
            dimensions,
            spacing,
            origin: min,
            has_normals: false,
        })
    }

    /// Vertex counts per axis.
    pub fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    /// Distance between adjacent vertices per axis.
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// Lower corner of the domain.
    pub fn origin(&self) -> Vec3<f64> {
        self.origin
    }

    /// Cell counts per axis (one less than the vertex counts).
    pub fn cell_counts(&self) -> [usize; 3] {
        [
            self.dimensions[0] - 1,
            self.dimensions[1] - 1,
            self.dimensions[2] - 1,
        ]
    }

    /// Sample at lattice coordinates `(i, j, k)`. Panics when out of range.
    pub fn vertex(&self, i: usize, j: usize, k: usize) -> &GridVertex {
        &self.samples[(i, j, k)]
    }

    /// Scalar value at lattice coordinates `(i, j, k)`. Panics when out of range.
    pub fn value(&self, i: usize, j: usize, k: usize) -> f64 {
        self.samples[(i, j, k)].value
    }

    /// Position of lattice vertex `(i, j, k)`. Panics when out of range.
    pub fn position(&self, i: usize, j: usize, k: usize) -> Vec3<f64> {
        self.samples[(i, j, k)].position
    }

    /// Whether per-vertex normals have been estimated.
    pub fn has_normals(&self) -> bool {
        self.has_normals
    }

    /// Evaluate `field` once at every vertex position and store the results.
    ///
    /// Invalidates previously estimated normals.
    pub fn fill_with<F>(&mut self, field: F)
    where
        F: Fn(&Vec3<f64>) -> f64,
    {
        for sample in self.samples.iter_mut() {
            sample.value = field(&sample.position);
            sample.normal = None;
        }
        self.has_normals = false;
    }

    /// Store externally computed field values, ordered with k fastest
    /// (raster order: i outer, j middle, k inner).
    pub fn set_values(&mut self, values: &[f64]) -> Result<()> {
        if values.len() != self.samples.len() {
            return Err(Error::InvalidArgument(format!(
                "expected {} field values, got {}",
                self.samples.len(),
                values.len()
            )));
        }

        for (sample, &value) in self.samples.iter_mut().zip(values) {
            sample.value = value;
            sample.normal = None;
        }
        self.has_normals = false;
        Ok(())
    }

    pub(crate) fn set_normal(&mut self, i: usize, j: usize, k: usize, normal: Vec3<f64>) {
        self.samples[(i, j, k)].normal = Some(normal);
    }

    pub(crate) fn mark_normals(&mut self) {
        self.has_normals = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_grid_positions_span_bounds() {
        let grid = ScalarGrid::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 2.0, 4.0),
            [5, 5, 5],
        )
        .unwrap();

        assert_eq!(grid.dimensions(), [5, 5, 5]);
        assert_eq!(grid.cell_counts(), [4, 4, 4]);
        assert_relative_eq!(grid.spacing()[0], 0.25);
        assert_relative_eq!(grid.spacing()[2], 1.0);

        assert_eq!(grid.position(0, 0, 0), Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(grid.position(4, 4, 4), Vec3::new(1.0, 2.0, 4.0));
        assert_eq!(grid.position(2, 1, 3), Vec3::new(0.5, 0.5, 3.0));
    }

    #[test]
    fn test_resolution_below_minimum_is_rejected() {
        let result = ScalarGrid::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            [1, 10, 10],
        );
        assert!(matches!(
            result,
            Err(isomesh_core::Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_fill_with_evaluates_field_at_positions() {
        let mut grid = ScalarGrid::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            [3, 3, 3],
        )
        .unwrap();

        grid.fill_with(|p| p[0] + 10.0 * p[1] + 100.0 * p[2]);

        assert_relative_eq!(grid.value(0, 0, 0), 0.0);
        assert_relative_eq!(grid.value(2, 0, 0), 1.0);
        assert_relative_eq!(grid.value(1, 2, 1), 0.5 + 20.0 + 50.0);
    }

    #[test]
    fn test_set_values_checks_length() {
        let mut grid = ScalarGrid::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            [2, 2, 2],
        )
        .unwrap();

        assert!(grid.set_values(&[0.0; 7]).is_err());
        assert!(grid.set_values(&[1.0; 8]).is_ok());
        assert_relative_eq!(grid.value(1, 1, 1), 1.0);
    }
}
