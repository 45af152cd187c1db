//! End-to-end isosurface extraction tests
//!
//! These run the full pipeline (grid, field evaluation, normal estimation,
//! polygonization) on a sphere whose exact geometry is known.

use isomesh_core::Vec3;
use isomesh_extract::{fields, MarchingCubes, PolygonizeConfig, ScalarGrid};

const CENTER: [f64; 3] = [0.5, 0.5, 0.5];
const RADIUS: f64 = 0.3;

fn sphere_grid(resolution: usize) -> ScalarGrid {
    let mut grid = ScalarGrid::new(
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 1.0),
        [resolution; 3],
    )
    .unwrap();
    grid.fill_with(fields::squared_distance(Vec3::from(CENTER)));
    grid
}

/// Largest deviation of any mesh vertex from the sphere radius.
fn max_radial_error(vertices: &[Vec3<f64>]) -> f64 {
    let center = Vec3::from(CENTER);
    vertices
        .iter()
        .map(|v| ((*v - center).magnitude() - RADIUS).abs())
        .fold(0.0, f64::max)
}

#[test]
fn test_sphere_vertices_lie_on_sphere() {
    for resolution in [10, 20, 30, 40, 50] {
        let mut grid = sphere_grid(resolution);
        let mesh = MarchingCubes::new(PolygonizeConfig {
            iso_value: RADIUS * RADIUS,
            compute_normals: true,
        })
        .extract(&mut grid)
        .unwrap();

        assert!(mesh.face_count() > 0, "empty mesh at resolution {resolution}");
        assert_eq!(mesh.vertex_count(), 3 * mesh.face_count());

        // Linear interpolation of a quadratic field converges as h^2.
        let h = 1.0 / (resolution - 1) as f64;
        let error = max_radial_error(&mesh.vertices);
        assert!(
            error < 2.0 * h * h,
            "radial error {error} too large at resolution {resolution}"
        );
    }
}

#[test]
fn test_triangle_count_grows_smoothly_with_resolution() {
    let mut counts = Vec::new();
    for resolution in [10, 20, 30, 40, 50] {
        let mut grid = sphere_grid(resolution);
        let mesh = MarchingCubes::new(PolygonizeConfig {
            iso_value: RADIUS * RADIUS,
            compute_normals: false,
        })
        .extract(&mut grid)
        .unwrap();
        counts.push(mesh.face_count());
    }

    // Counts scale with surface area over cell size squared: strictly
    // increasing, with no sudden collapse or blow-up between steps.
    for pair in counts.windows(2) {
        assert!(pair[1] > pair[0], "counts not increasing: {counts:?}");
        let ratio = pair[1] as f64 / pair[0] as f64;
        assert!(ratio < 8.0, "count jump too large: {counts:?}");
    }
}

#[test]
fn test_sphere_normals_point_away_from_surface_interior() {
    let mut grid = sphere_grid(30);
    let mesh = MarchingCubes::new(PolygonizeConfig {
        iso_value: RADIUS * RADIUS,
        compute_normals: true,
    })
    .extract(&mut grid)
    .unwrap();

    let center = Vec3::from(CENTER);
    let normals = mesh.normals.as_ref().unwrap();
    assert_eq!(normals.len(), mesh.vertex_count());

    // The squared-distance field grows outward, so the negated gradient
    // points at the center: normals are anti-radial.
    for (vertex, normal) in mesh.vertices.iter().zip(normals.iter()) {
        let mut radial = *vertex - center;
        radial.normalize();
        let dot: f64 = (0..3).map(|c| radial[c] * normal[c]).sum();
        assert!(dot < -0.99, "normal not anti-radial: dot = {dot}");
    }
}

#[test]
fn test_parallel_extraction_is_deterministic() {
    let extractor = MarchingCubes::new(PolygonizeConfig {
        iso_value: RADIUS * RADIUS,
        compute_normals: true,
    });

    let serial = extractor.extract(&mut sphere_grid(25)).unwrap();
    let parallel = extractor.extract_parallel(&mut sphere_grid(25)).unwrap();

    assert_eq!(serial.faces, parallel.faces);
    assert_eq!(serial.vertices, parallel.vertices);
    assert_eq!(
        serial.normals.as_ref().unwrap(),
        parallel.normals.as_ref().unwrap()
    );
}

#[test]
fn test_isovalue_outside_field_range_yields_empty_mesh() {
    let mut grid = sphere_grid(10);
    let mesh = MarchingCubes::new(PolygonizeConfig {
        iso_value: 100.0,
        compute_normals: false,
    })
    .extract(&mut grid)
    .unwrap();

    assert!(mesh.is_empty());
    assert_eq!(mesh.face_count(), 0);
}
