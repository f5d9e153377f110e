use geo::ray::Ray;
use geo::{Mat3, Vec3};

/// A pinhole camera. The frame is derived from the view and top directions by
/// Gram-Schmidt: the view direction becomes the local y axis, the top
/// direction is straightened into the local z axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    rotation: Mat3,
    pub focal_length: f64,
}

impl Camera {
    pub fn new(position: Vec3, view_dir: Vec3, top_dir: Vec3, focal_length: f64) -> Self {
        let ry = view_dir.of_length(1.0);
        let rz = top_dir.orthonormal_to(ry);
        let rx = ry.cross(&rz);

        Camera {
            position,
            rotation: Mat3::new(rx, ry, rz).transposed(),
            focal_length,
        }
    }

    /// Ray through the image-plane point `(x, z)`, where coordinates are in
    /// units of half the image height and the plane sits `focal_length` away.
    pub fn cast(&self, x: f64, z: f64) -> Ray {
        let d = Vec3::new(x, self.focal_length, z).of_length(1.0);
        Ray::new(self.position, self.rotation.mul_vec(d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_aligned_camera() {
        let c = Camera::new(
            Vec3::zero(),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            1.0,
        );

        let center = c.cast(0.0, 0.0);
        assert!(center.dir.dist(&Vec3::new(0.0, 1.0, 0.0)) < 1e-9);

        let up = c.cast(0.0, 1.0);
        assert!(up.dir.dist(&Vec3::new(0.0, 1.0, 1.0).normalized()) < 1e-9);

        let right = c.cast(1.0, 0.0);
        assert!(right.dir.dist(&Vec3::new(1.0, 1.0, 0.0).normalized()) < 1e-9);
    }

    #[test]
    fn test_top_direction_is_straightened() {
        // a top direction not perpendicular to the view still yields an
        // orthonormal frame
        let c = Camera::new(
            Vec3::zero(),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.5, 1.0),
            1.0,
        );

        let center = c.cast(0.0, 0.0);
        assert!(center.dir.dist(&Vec3::new(0.0, 1.0, 0.0)) < 1e-9);

        let up = c.cast(0.0, 1.0).dir;
        assert!(up.dot(&Vec3::new(1.0, 0.0, 0.0)).abs() < 1e-9);
        assert!(up.z > 0.0);
    }

    #[test]
    fn test_rotated_camera() {
        // looking along +x with z still up
        let c = Camera::new(
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            1.0,
        );

        let center = c.cast(0.0, 0.0);
        assert!(center.dir.dist(&Vec3::new(1.0, 0.0, 0.0)) < 1e-9);
        assert_eq!(center.origin, Vec3::new(5.0, 0.0, 0.0));
    }
}
