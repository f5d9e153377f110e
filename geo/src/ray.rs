use crate::Vec3;

/// A `Ray` is a half-line starting at `origin` and going towards `dir`.
/// `dir` is kept normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    /// Create a new `Ray` with the given origin and direction.
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Ray { origin, dir }
    }

    /// Ray from `src` pointed at `dst`.
    pub fn between(src: Vec3, dst: Vec3) -> Self {
        Ray::new(src, (dst - src).of_length(1.0))
    }

    /// Get the point on a `Ray` at the given parameter `t`.
    pub fn point_at(&self, t: f64) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// An axial bundle of rays: every direction within `acos(cos_rs)` of the
/// principal ray belongs to the cone.
#[derive(Debug, Clone, PartialEq)]
pub struct RayCone {
    pub ray: Ray,
    pub cos_rs: f64,
}

impl RayCone {
    /// Areal coverage of the cone on the unit sphere, expressed as the height
    /// of the spherical cap it subtends (range 0..=2).
    pub fn cap_height(&self) -> f64 {
        1.0 - self.cos_rs
    }
}

#[cfg(test)]
mod tests {
    use super::{Ray, RayCone, Vec3};

    #[test]
    fn test_point_at() {
        let ray = Ray::new(Vec3::zero(), Vec3::new(0.0, 1.0, 0.0));

        assert_eq!(ray.point_at(0.0), ray.origin);
        assert_eq!(ray.point_at(1.0), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(ray.point_at(0.5), Vec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_between() {
        let ray = Ray::between(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 9.0));

        assert_eq!(ray.origin, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(ray.dir, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_cap_height() {
        let cone = RayCone {
            ray: Ray::new(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0)),
            cos_rs: 0.25,
        };

        assert_eq!(cone.cap_height(), 0.75);
    }
}
