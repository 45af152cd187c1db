//! Per-vertex surface normal estimation via finite differences

use crate::grid::ScalarGrid;
use isomesh_core::Vec3;

/// Estimate a surface normal at every grid vertex from the scalar field.
///
/// The gradient is taken with central differences on interior vertices and
/// one-sided differences on the boundary, then negated and normalized.
/// Flat regions produce a zero gradient and keep it after the normalize
/// no-op. Must complete before polygonization for interpolated vertices to
/// carry normals.
pub fn estimate_normals(grid: &mut ScalarGrid) {
    let [nx, ny, nz] = grid.dimensions();
    let [hx, hy, hz] = grid.spacing();

    let mut normals = Vec::with_capacity(nx * ny * nz);
    for i in 0..nx {
        for j in 0..ny {
            for k in 0..nz {
                let gradient = Vec3::new(
                    derivative(|i| grid.value(i, j, k), i, nx, hx),
                    derivative(|j| grid.value(i, j, k), j, ny, hy),
                    derivative(|k| grid.value(i, j, k), k, nz, hz),
                );

                let mut normal = gradient * -1.0;
                normal.normalize();
                normals.push(normal);
            }
        }
    }

    let mut normals = normals.into_iter();
    for i in 0..nx {
        for j in 0..ny {
            for k in 0..nz {
                // The iterator yields exactly nx * ny * nz normals in the
                // same raster order.
                if let Some(normal) = normals.next() {
                    grid.set_normal(i, j, k, normal);
                }
            }
        }
    }
    grid.mark_normals();
}

/// Finite difference of a line of samples at `idx`, central on the interior
/// and one-sided at either end.
fn derivative(sample: impl Fn(usize) -> f64, idx: usize, count: usize, h: f64) -> f64 {
    if idx == 0 {
        (sample(1) - sample(0)) / h
    } else if idx == count - 1 {
        (sample(count - 1) - sample(count - 2)) / h
    } else {
        (sample(idx + 1) - sample(idx - 1)) / (2.0 * h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_field_gradient() {
        let mut grid = ScalarGrid::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            [4, 4, 4],
        )
        .unwrap();
        grid.fill_with(|p| 2.0 * p[0]);
        estimate_normals(&mut grid);

        assert!(grid.has_normals());
        // Gradient (2, 0, 0) everywhere, including boundaries; negated and
        // normalized to (-1, 0, 0).
        for (i, j, k) in [(0, 0, 0), (1, 2, 3), (3, 3, 3)] {
            let normal = grid.vertex(i, j, k).normal.unwrap();
            assert_eq!(normal, Vec3::new(-1.0, 0.0, 0.0));
        }
    }

    #[test]
    fn test_sphere_field_normals_are_radial() {
        let center = Vec3::new(0.5, 0.5, 0.5);
        let mut grid = ScalarGrid::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            [11, 11, 11],
        )
        .unwrap();
        grid.fill_with(fields::squared_distance(center));
        estimate_normals(&mut grid);

        // Interior vertex away from the center: the squared-distance field
        // has gradient 2(p - c), so the normal is the negated radial
        // direction.
        let vertex = grid.vertex(8, 5, 5);
        let normal = vertex.normal.unwrap();
        let mut radial = vertex.position - center;
        radial.normalize();

        assert_relative_eq!(normal.magnitude(), 1.0, epsilon = 1e-12);
        assert_eq!(normal, radial * -1.0);
    }

    #[test]
    fn test_flat_field_keeps_zero_normal() {
        let mut grid = ScalarGrid::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            [3, 3, 3],
        )
        .unwrap();
        grid.fill_with(|_| 7.0);
        estimate_normals(&mut grid);

        let normal = grid.vertex(1, 1, 1).normal.unwrap();
        assert_eq!(normal, Vec3::new(0.0, 0.0, 0.0));
    }
}
