use crate::ray::{Ray, RayCone};
use crate::{Vec3, EPS};

/// Intersect a ray with the sphere `(center, radius)`. Returns the smallest
/// positive offset along the ray together with the outward unit normal at the
/// hit point, or `None` on a miss. The offset is shortened by `EPS` so that
/// continuation rays start just outside the surface; a ray starting exactly
/// on the surface and pointing away reports a miss, pointing inward it
/// reports the exit hit.
pub fn ray_hit(center: Vec3, radius: f64, ray: &Ray) -> Option<(f64, Vec3)> {
    let p = ray.origin - center;
    let s = p.dot(&ray.dir);
    let q = p.norm2() - radius * radius;

    let s2 = s * s;
    if s2 < q {
        return None;
    }

    let offs = if s < 0.0 && q > 0.0 {
        // entry hit is positive
        -s - (s2 - q).sqrt() - EPS
    } else if s < 0.0 || q < 0.0 {
        // exit hit is positive
        -s + (s2 - q).sqrt() - EPS
    } else {
        return None;
    };

    let nor = (ray.point_at(offs) - center).of_length(1.0);
    Some((offs, nor))
}

/// Whether `observer` lies strictly outside the sphere.
pub fn is_outside(center: Vec3, radius: f64, observer: Vec3) -> bool {
    (observer - center).norm2() > radius * radius
}

/// The cone rooted at `from` that contains the whole sphere. An observer
/// inside the sphere gets the degenerate full-sphere cone (`cos_rs = -1`).
pub fn fov_cone(center: Vec3, radius: f64, from: Vec3) -> RayCone {
    let diff = center - from;
    let diff_sqr = diff.norm2();
    let radius_sqr = radius * radius;

    let cos_rs = if diff_sqr > radius_sqr {
        (1.0 - radius_sqr / diff_sqr).sqrt()
    } else {
        -1.0
    };

    RayCone {
        ray: Ray::new(from, diff.of_length(1.0)),
        cos_rs,
    }
}

/// Conservative test whether any part of the sphere lies within `fov`.
pub fn is_in_fov(center: Vec3, radius: f64, fov: &RayCone) -> bool {
    let diff = center - fov.ray.origin;
    let diff_sqr = diff.norm2();
    let cos_ang0 = diff.of_length(1.0).dot(&fov.ray.dir);
    if cos_ang0 > fov.cos_rs {
        return true;
    }

    let radius_sqr = radius * radius;
    if diff_sqr <= radius_sqr {
        // cone apex inside the sphere
        return true;
    }

    let cos_ang1 = (1.0 - radius_sqr / diff_sqr).sqrt();
    cos_ang0.acos() - cos_ang1.acos() < fov.cos_rs.acos()
}

/// Whether the sphere intersects the half-sphere of radius `reach` rooted at
/// `ray.origin` and oriented along `ray.dir`.
pub fn intersects_half_sphere(center: Vec3, radius: f64, ray: &Ray, reach: f64) -> bool {
    let d = center - ray.origin;
    let d2 = d.norm2();
    if d2 > (radius + reach) * (radius + reach) {
        return false;
    }

    let dp = d.dot(&ray.dir);
    if dp > 0.0 {
        // the half-sphere is oriented towards the center
        return true;
    }

    let dn = (d - ray.dir * dp).of_length(reach);
    let r_sqr = radius * radius;
    (d - dn).norm2() < r_sqr || (d + dn).norm2() < r_sqr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_hit() {
        let c = Vec3::zero();

        let (t, n) = ray_hit(
            c,
            1.0,
            &Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::new(0.0, 0.0, 1.0)),
        )
        .unwrap();
        assert!((t - 1.0).abs() < 1e-5);
        assert!(n.dist(&Vec3::new(0.0, 0.0, -1.0)) < 1e-5);

        // ray pointing away
        assert_eq!(
            ray_hit(
                c,
                1.0,
                &Ray::new(Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 0.0, 1.0)),
            ),
            None
        );

        // from the inside the exit hit is returned with an outward normal
        let (t, n) = ray_hit(c, 1.0, &Ray::new(c, Vec3::new(1.0, 0.0, 0.0))).unwrap();
        assert!((t - 1.0).abs() < 1e-5);
        assert!(n.dist(&Vec3::new(1.0, 0.0, 0.0)) < 1e-5);
    }

    #[test]
    fn test_ray_hit_on_surface() {
        let c = Vec3::zero();
        let origin = Vec3::new(1.0, 0.0, 0.0);

        // starting on the surface pointing outward: miss
        assert_eq!(
            ray_hit(c, 1.0, &Ray::new(origin, Vec3::new(1.0, 0.0, 0.0))),
            None
        );

        // pointing inward: exit on the far side
        let (t, _) = ray_hit(c, 1.0, &Ray::new(origin, Vec3::new(-1.0, 0.0, 0.0))).unwrap();
        assert!((t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_hit_translation_invariance() {
        let v = Vec3::new(3.0, -7.0, 0.5);
        let ray = Ray::new(Vec3::new(0.2, 0.1, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let moved = Ray::new(ray.origin + v, ray.dir);

        let (t0, n0) = ray_hit(Vec3::zero(), 1.0, &ray).unwrap();
        let (t1, n1) = ray_hit(v, 1.0, &moved).unwrap();

        assert!((t0 - t1).abs() < 1e-9);
        assert!(n0.dist(&n1) < 1e-9);
        assert!(moved.point_at(t1).dist(&(ray.point_at(t0) + v)) < 1e-9);
    }

    #[test]
    fn test_fov_cone() {
        let cone = fov_cone(Vec3::new(0.0, 0.0, 4.0), 2.0, Vec3::zero());

        assert_eq!(cone.ray.dir, Vec3::new(0.0, 0.0, 1.0));
        assert!((cone.cos_rs - (0.75f64).sqrt()).abs() < 1e-9);

        // observer inside the sphere sees everything
        let inside = fov_cone(Vec3::zero(), 2.0, Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(inside.cos_rs, -1.0);
    }

    #[test]
    fn test_is_in_fov() {
        let fov = fov_cone(Vec3::new(0.0, 0.0, 4.0), 1.0, Vec3::zero());

        assert!(is_in_fov(Vec3::new(0.0, 0.0, 4.0), 0.5, &fov));
        // sphere touching the cone sideways
        assert!(is_in_fov(Vec3::new(1.2, 0.0, 4.0), 0.5, &fov));
        // sphere far off axis
        assert!(!is_in_fov(Vec3::new(8.0, 0.0, 4.0), 0.5, &fov));
        // apex inside the sphere
        assert!(is_in_fov(Vec3::new(0.1, 0.0, 0.0), 1.0, &fov));
    }

    #[test]
    fn test_intersects_half_sphere() {
        let ray = Ray::new(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0));

        assert!(intersects_half_sphere(Vec3::new(0.0, 0.0, 3.0), 1.0, &ray, 5.0));
        // behind the ray and far away
        assert!(!intersects_half_sphere(
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            &ray,
            2.0
        ));
        // completely out of reach
        assert!(!intersects_half_sphere(
            Vec3::new(0.0, 0.0, 9.0),
            1.0,
            &ray,
            2.0
        ));
    }
}
