//! Built-in scalar-field test objects

use isomesh_core::Vec3;

/// Squared distance from `center`.
///
/// Polygonized at isovalue `r * r` this yields a sphere of radius `r`.
pub fn squared_distance(center: Vec3<f64>) -> impl Fn(&Vec3<f64>) -> f64 {
    move |p| {
        let d = *p - center;
        d[0] * d[0] + d[1] * d[1] + d[2] * d[2]
    }
}

/// Implicit sphere: squared distance from `center` minus `radius` squared,
/// so the surface sits at isovalue 0.
pub fn sphere(center: Vec3<f64>, radius: f64) -> impl Fn(&Vec3<f64>) -> f64 {
    let squared = squared_distance(center);
    move |p| squared(p) - radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_squared_distance() {
        let field = squared_distance(Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(field(&Vec3::new(1.0, 0.0, 0.0)), 0.0);
        assert_relative_eq!(field(&Vec3::new(1.0, 3.0, 4.0)), 25.0);
    }

    #[test]
    fn test_sphere_sign_convention() {
        let field = sphere(Vec3::new(0.0, 0.0, 0.0), 1.0);
        assert!(field(&Vec3::new(0.0, 0.0, 0.0)) < 0.0);
        assert!(field(&Vec3::new(2.0, 0.0, 0.0)) > 0.0);
        assert_relative_eq!(field(&Vec3::new(1.0, 0.0, 0.0)), 0.0);
    }
}
