use crate::ray::Ray;
use crate::{Vec3, EPS};

/// Intersect a ray with the infinite plane through `pos` with normal `nor`.
/// Parallel rays and hits behind the origin miss. The returned offset is
/// shortened by `EPS` to keep the hit point just off the surface.
pub fn ray_hit(pos: Vec3, nor: Vec3, ray: &Ray) -> Option<(f64, Vec3)> {
    let div = nor.dot(&ray.dir);
    if div == 0.0 {
        return None;
    }

    let offs = (pos - ray.origin).dot(&nor) / div;
    if offs > 0.0 {
        Some((offs - EPS, nor))
    } else {
        None
    }
}

/// Whether `observer` lies on the side of the plane its normal points to.
pub fn is_outside(pos: Vec3, nor: Vec3, observer: Vec3) -> bool {
    (observer - pos).dot(&nor) > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_hit() {
        let pos = Vec3::zero();
        let nor = Vec3::new(0.0, 0.0, 1.0);

        let (t, n) = ray_hit(
            pos,
            nor,
            &Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0)),
        )
        .unwrap();
        assert!((t - 5.0).abs() < 1e-5);
        assert_eq!(n, nor);

        // parallel ray
        assert_eq!(
            ray_hit(
                pos,
                nor,
                &Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(1.0, 0.0, 0.0)),
            ),
            None
        );

        // plane behind the ray
        assert_eq!(
            ray_hit(
                pos,
                nor,
                &Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0)),
            ),
            None
        );
    }

    #[test]
    fn test_is_outside() {
        let nor = Vec3::new(0.0, 0.0, 1.0);

        assert!(is_outside(Vec3::zero(), nor, Vec3::new(0.0, 0.0, 1.0)));
        assert!(!is_outside(Vec3::zero(), nor, Vec3::new(0.0, 0.0, -1.0)));
    }
}
