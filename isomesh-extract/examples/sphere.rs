//! Polygonize a sphere and write it to an OBJ file.

use anyhow::Result;
use isomesh_core::Vec3;
use isomesh_extract::{estimate_normals, fields, MarchingCubes, PolygonizeConfig, ScalarGrid};

fn main() -> Result<()> {
    let mut grid = ScalarGrid::new(
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 1.0),
        [50, 50, 50],
    )?;
    grid.fill_with(fields::sphere(Vec3::new(0.5, 0.5, 0.5), 0.25));
    estimate_normals(&mut grid);

    let mesh = MarchingCubes::new(PolygonizeConfig::default()).extract(&mut grid)?;
    println!(
        "extracted {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.face_count()
    );

    isomesh_io::write_mesh(&mesh, "smooth-sphere.obj")?;
    println!("wrote smooth-sphere.obj");

    Ok(())
}
