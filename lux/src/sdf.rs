use geo::{Vec2, Vec3};

/// Signed distance fields for the implicit-surface object, unit-sized in
/// their local frame: negative inside, positive outside, ~0 on the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Sdf {
    /// Unit sphere around the origin.
    Sphere,
    /// Torus with ring radius 1 around the z axis; `ring` is the tube radius
    /// relative to the ring radius.
    Torus { ring: f64 },
}

impl Sdf {
    pub fn dist(&self, p: Vec3) -> f64 {
        match self {
            Sdf::Sphere => p.norm() - 1.0,
            Sdf::Torus { ring } => {
                let q = Vec2::new((p.x * p.x + p.y * p.y).sqrt() - 1.0, p.z);
                q.norm() - ring
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_dist() {
        assert_eq!(Sdf::Sphere.dist(Vec3::new(2.0, 0.0, 0.0)), 1.0);
        assert_eq!(Sdf::Sphere.dist(Vec3::zero()), -1.0);
        assert!(Sdf::Sphere.dist(Vec3::new(0.0, 1.0, 0.0)).abs() < 1e-12);
    }

    #[test]
    fn test_torus_dist() {
        let t = Sdf::Torus { ring: 0.25 };

        // on the ring circle, deep inside the tube
        assert_eq!(t.dist(Vec3::new(1.0, 0.0, 0.0)), -0.25);
        // on the tube surface
        assert!(t.dist(Vec3::new(1.25, 0.0, 0.0)).abs() < 1e-12);
        assert!(t.dist(Vec3::new(1.0, 0.0, 0.25)).abs() < 1e-12);
        // at the hole center
        assert_eq!(t.dist(Vec3::zero()), 0.75);
    }
}
