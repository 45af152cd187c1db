//! Marching-cubes polygonization: cube classification, edge interpolation
//! and grid traversal

use crate::grid::{GridVertex, ScalarGrid};
use crate::normals::estimate_normals;
use crate::tables::{CORNER_OFFSETS, EDGE_ENDPOINTS, EDGE_TABLE, TRI_TABLE};
use isomesh_core::{Result, TriangleMesh, Vec3};
use rayon::prelude::*;

/// Scalar deltas below this make an edge flat; interpolation then places the
/// crossing at the midpoint instead of dividing by the delta.
pub const FLAT_EDGE_EPSILON: f64 = 1e-12;

/// Configuration for isosurface extraction
#[derive(Debug, Clone)]
pub struct PolygonizeConfig {
    /// Scalar value defining the surface
    pub iso_value: f64,
    /// Whether emitted vertices carry interpolated normals
    pub compute_normals: bool,
}

impl Default for PolygonizeConfig {
    fn default() -> Self {
        Self {
            iso_value: 0.0,
            compute_normals: true,
        }
    }
}

/// Surface crossing on one cube edge: the interpolated position and, when
/// the grid carries per-vertex normals, the interpolated normal.
#[derive(Debug, Clone)]
pub struct EdgePoint {
    pub position: Vec3<f64>,
    pub normal: Option<Vec3<f64>>,
}

/// Classify a cube by its 8 corner values: bit i is set when `values[i]`
/// lies below the isovalue (inside the surface).
///
/// Masks 0x00 and 0xFF mean the cube contributes no triangles.
pub fn corner_mask(values: &[f64; 8], iso_value: f64) -> u8 {
    let mut mask = 0u8;
    for (i, &value) in values.iter().enumerate() {
        if value < iso_value {
            mask |= 1 << i;
        }
    }
    mask
}

/// Interpolate the surface crossing along one cube edge.
///
/// `t = (iso − v0) / (v1 − v0)`; a flat edge the classifier nonetheless
/// flagged as crossing gets the defined `t = 0.5` tie-break rather than a
/// division error. Normals are linearly interpolated and re-normalized when
/// both endpoints carry one.
pub fn interpolate_edge(a: &GridVertex, b: &GridVertex, iso_value: f64) -> EdgePoint {
    let delta = b.value - a.value;
    let t = if delta.abs() < FLAT_EDGE_EPSILON {
        0.5
    } else {
        (iso_value - a.value) / delta
    };

    let position = a.position + (b.position - a.position) * t;
    let normal = match (a.normal, b.normal) {
        (Some(na), Some(nb)) => {
            let mut normal = na + (nb - na) * t;
            normal.normalize();
            Some(normal)
        }
        _ => None,
    };

    EdgePoint { position, normal }
}

/// Marching-cubes isosurface extractor
pub struct MarchingCubes {
    config: PolygonizeConfig,
}

impl MarchingCubes {
    /// Create an extractor with the given configuration
    pub fn new(config: PolygonizeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolygonizeConfig {
        &self.config
    }

    /// Extract the isosurface by serial traversal in raster order
    /// (k outer, j middle, i inner).
    ///
    /// A field that never crosses the isovalue yields an empty mesh, not an
    /// error. When normals are requested and the grid has none yet, they are
    /// estimated first.
    pub fn extract(&self, grid: &mut ScalarGrid) -> Result<TriangleMesh> {
        self.prepare(grid);

        let [cx, cy, cz] = grid.cell_counts();
        let mut mesh = TriangleMesh::new();
        let mut normals = self.config.compute_normals.then(Vec::new);

        for k in 0..cz {
            for j in 0..cy {
                for i in 0..cx {
                    self.polygonize_cell(grid, i, j, k, &mut mesh, &mut normals);
                }
            }
        }

        if let Some(normals) = normals {
            mesh.set_normals(normals);
        }
        Ok(mesh)
    }

    /// Extract the isosurface with the k slab range split across rayon
    /// workers, each filling an independent buffer; buffers are concatenated
    /// in slab order, so the result is identical to [`Self::extract`].
    pub fn extract_parallel(&self, grid: &mut ScalarGrid) -> Result<TriangleMesh> {
        self.prepare(grid);

        let [cx, cy, cz] = grid.cell_counts();
        let grid = &*grid; // read-only for the whole traversal

        let slabs: Vec<TriangleMesh> = (0..cz)
            .into_par_iter()
            .map(|k| {
                let mut slab = TriangleMesh::new();
                let mut normals = self.config.compute_normals.then(Vec::new);
                for j in 0..cy {
                    for i in 0..cx {
                        self.polygonize_cell(grid, i, j, k, &mut slab, &mut normals);
                    }
                }
                if let Some(normals) = normals {
                    slab.set_normals(normals);
                }
                slab
            })
            .collect();

        let mut mesh = TriangleMesh::new();
        for slab in slabs {
            mesh.append(slab);
        }
        Ok(mesh)
    }

    fn prepare(&self, grid: &mut ScalarGrid) {
        if self.config.compute_normals && !grid.has_normals() {
            estimate_normals(grid);
        }
    }

    /// Polygonize the cell with base vertex (i, j, k), appending triangles
    /// to `mesh` and, when requested, one normal per emitted vertex.
    fn polygonize_cell(
        &self,
        grid: &ScalarGrid,
        i: usize,
        j: usize,
        k: usize,
        mesh: &mut TriangleMesh,
        normals: &mut Option<Vec<Vec3<f64>>>,
    ) {
        let corners: [&GridVertex; 8] =
            CORNER_OFFSETS.map(|[di, dj, dk]| grid.vertex(i + di, j + dj, k + dk));
        let values: [f64; 8] = corners.map(|corner| corner.value);

        let mask = corner_mask(&values, self.config.iso_value);
        let crossed_edges = EDGE_TABLE[mask as usize];
        if crossed_edges == 0 {
            // Fully inside or fully outside, the common case.
            return;
        }

        let mut edge_points: [Option<EdgePoint>; 12] = Default::default();
        for (edge, endpoints) in EDGE_ENDPOINTS.iter().enumerate() {
            if crossed_edges & (1 << edge) != 0 {
                edge_points[edge] = Some(interpolate_edge(
                    corners[endpoints[0]],
                    corners[endpoints[1]],
                    self.config.iso_value,
                ));
            }
        }

        let entry = &TRI_TABLE[mask as usize];
        for triple in entry.chunks_exact(3).take_while(|triple| triple[0] != -1) {
            if let (Some(p0), Some(p1), Some(p2)) = (
                &edge_points[triple[0] as usize],
                &edge_points[triple[1] as usize],
                &edge_points[triple[2] as usize],
            ) {
                let base = mesh.vertex_count();
                for point in [p0, p1, p2] {
                    mesh.add_vertex(point.position);
                    if let Some(normals) = normals.as_mut() {
                        normals.push(point.normal.unwrap_or_default());
                    }
                }
                mesh.add_face([base, base + 1, base + 2]);
            }
        }
    }
}

/// Convenience entry point: extract the isosurface at `iso_value` with the
/// default configuration.
pub fn marching_cubes(grid: &mut ScalarGrid, iso_value: f64) -> Result<TriangleMesh> {
    let config = PolygonizeConfig {
        iso_value,
        ..Default::default()
    };
    MarchingCubes::new(config).extract(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;
    use approx::assert_relative_eq;

    fn unit_grid(dimensions: [usize; 3]) -> ScalarGrid {
        ScalarGrid::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            dimensions,
        )
        .unwrap()
    }

    #[test]
    fn test_corner_mask_conventions() {
        assert_eq!(corner_mask(&[1.0; 8], 0.5), 0x00);
        assert_eq!(corner_mask(&[0.0; 8], 0.5), 0xff);

        let mut values = [1.0; 8];
        values[0] = 0.0;
        assert_eq!(corner_mask(&values, 0.5), 0x01);
        values[6] = 0.0;
        assert_eq!(corner_mask(&values, 0.5), 0x41);

        // A corner exactly at the isovalue counts as outside.
        assert_eq!(corner_mask(&[0.5; 8], 0.5), 0x00);
    }

    #[test]
    fn test_trivial_masks_produce_no_triangles() {
        let mut grid = unit_grid([4, 4, 4]);
        grid.fill_with(|_| 10.0);
        let mesh = marching_cubes(&mut grid, 0.5).unwrap();
        assert_eq!(mesh.face_count(), 0);

        grid.fill_with(|_| -10.0);
        let mesh = marching_cubes(&mut grid, 0.5).unwrap();
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn test_interpolate_edge_midpoint() {
        let a = GridVertex {
            position: Vec3::new(0.0, 0.0, 0.0),
            value: 0.0,
            normal: None,
        };
        let b = GridVertex {
            position: Vec3::new(1.0, 0.0, 0.0),
            value: 1.0,
            normal: None,
        };

        let point = interpolate_edge(&a, &b, 0.5);
        assert_eq!(point.position, Vec3::new(0.5, 0.0, 0.0));
        assert!(point.normal.is_none());

        let point = interpolate_edge(&a, &b, 0.25);
        assert_eq!(point.position, Vec3::new(0.25, 0.0, 0.0));
    }

    #[test]
    fn test_interpolate_flat_edge_tie_break() {
        let a = GridVertex {
            position: Vec3::new(0.0, 0.0, 0.0),
            value: 3.0,
            normal: None,
        };
        let b = GridVertex {
            position: Vec3::new(2.0, 0.0, 0.0),
            value: 3.0,
            normal: None,
        };

        // Equal endpoint values: defined t = 0.5 fallback, not a division
        // error.
        let point = interpolate_edge(&a, &b, 3.0);
        assert_eq!(point.position, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_interpolated_normals_are_renormalized() {
        let a = GridVertex {
            position: Vec3::new(0.0, 0.0, 0.0),
            value: 0.0,
            normal: Some(Vec3::new(1.0, 0.0, 0.0)),
        };
        let b = GridVertex {
            position: Vec3::new(1.0, 0.0, 0.0),
            value: 1.0,
            normal: Some(Vec3::new(0.0, 1.0, 0.0)),
        };

        let point = interpolate_edge(&a, &b, 0.5);
        let normal = point.normal.unwrap();
        assert_relative_eq!(normal.magnitude(), 1.0, epsilon = 1e-12);
        assert_eq!(normal[0], normal[1]);
    }

    #[test]
    fn test_single_inside_corner_emits_one_triangle() {
        let mut grid = unit_grid([2, 2, 2]);
        // Only vertex (0, 0, 0) below the isovalue.
        grid.set_values(&[-1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0])
            .unwrap();

        let config = PolygonizeConfig {
            iso_value: 0.0,
            compute_normals: false,
        };
        let mesh = MarchingCubes::new(config).extract(&mut grid).unwrap();

        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
        assert!(mesh.normals.is_none());
        // All three crossings sit at the midpoints of the edges incident to
        // the inside corner.
        for vertex in &mesh.vertices {
            assert_relative_eq!((*vertex - Vec3::default()).magnitude(), 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_extract_requests_normals_when_missing() {
        let mut grid = unit_grid([6, 6, 6]);
        grid.fill_with(fields::sphere(Vec3::new(0.5, 0.5, 0.5), 0.3));
        assert!(!grid.has_normals());

        let mesh = MarchingCubes::new(PolygonizeConfig::default())
            .extract(&mut grid)
            .unwrap();

        assert!(grid.has_normals());
        let normals = mesh.normals.as_ref().unwrap();
        assert_eq!(normals.len(), mesh.vertex_count());
        for normal in normals {
            assert_relative_eq!(normal.magnitude(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_parallel_matches_serial() {
        let mut grid = unit_grid([12, 12, 12]);
        grid.fill_with(fields::sphere(Vec3::new(0.5, 0.5, 0.5), 0.35));

        let extractor = MarchingCubes::new(PolygonizeConfig::default());
        let serial = extractor.extract(&mut grid.clone()).unwrap();
        let parallel = extractor.extract_parallel(&mut grid).unwrap();

        assert_eq!(serial.vertex_count(), parallel.vertex_count());
        assert_eq!(serial.faces, parallel.faces);
        for (a, b) in serial.vertices.iter().zip(parallel.vertices.iter()) {
            assert_eq!(a, b);
        }
        let serial_normals = serial.normals.as_ref().unwrap();
        let parallel_normals = parallel.normals.as_ref().unwrap();
        for (a, b) in serial_normals.iter().zip(parallel_normals.iter()) {
            assert_eq!(a, b);
        }
    }
}
