use geo::ray::{Ray, RayCone};
use geo::{plane, Vec2, Vec3};

use crate::object::{Hit, Side};
use crate::properties::Properties;

/// An infinite plane through `props.pos`, perpendicular to the local z axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub props: Properties,
}

impl Plane {
    pub fn new(props: Properties) -> Self {
        Plane { props }
    }

    pub fn ray_hit(&self, ray: &Ray) -> Option<Hit> {
        plane::ray_hit(self.props.pos, self.props.axes.z, ray).map(|(t, normal)| Hit { t, normal })
    }

    pub fn side(&self, pos: Vec3) -> Side {
        Side::from_outside(plane::is_outside(self.props.pos, self.props.axes.z, pos))
    }

    /// The half-space cone covering the plane as seen from `pos`: a
    /// half-sphere towards the surface, or an empty cone from behind it.
    pub fn fov(&self, pos: Vec3) -> RayCone {
        let dir = -self.props.axes.z;
        let cos_rs = if (self.props.pos - pos).dot(&dir) > 0.0 {
            0.0
        } else {
            1.0
        };
        RayCone {
            ray: Ray::new(pos, dir),
            cos_rs,
        }
    }

    pub fn is_in_fov(&self, fov: &RayCone) -> bool {
        if self.ray_hit(&fov.ray).is_some() {
            return true;
        }
        let sin_a = self.props.axes.z.dot(&fov.ray.dir).min(1.0);
        let cos_a = (1.0 - sin_a * sin_a).sqrt();
        cos_a > fov.cos_rs
    }

    /// In-plane coordinates along the local x and y axes.
    pub fn projection(&self, pos: Vec3) -> Vec2 {
        let p = pos - self.props.pos;
        Vec2::new(p.dot(&self.props.axes.x), p.dot(&self.props.axes.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use geo::Mat3;

    #[test]
    fn test_ray_hit_and_side() {
        let plane = Plane::new(Properties::default());

        let hit = plane
            .ray_hit(&Ray::new(
                Vec3::new(0.0, 0.0, 3.0),
                Vec3::new(0.0, 0.0, -1.0),
            ))
            .unwrap();
        assert!((hit.t - 3.0).abs() < 1e-5);
        assert_eq!(hit.normal, Vec3::new(0.0, 0.0, 1.0));

        assert_eq!(plane.side(Vec3::new(0.0, 0.0, 1.0)), Side::Outside);
        assert_eq!(plane.side(Vec3::new(0.0, 0.0, -1.0)), Side::Inside);
    }

    #[test]
    fn test_fov() {
        let plane = Plane::new(Properties::default());

        // seen from above, the plane fills the lower half-sphere
        let fov = plane.fov(Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(fov.cos_rs, 0.0);
        assert_eq!(fov.ray.dir, Vec3::new(0.0, 0.0, -1.0));

        // from below it is invisible
        let fov = plane.fov(Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(fov.cos_rs, 1.0);
    }

    #[test]
    fn test_projection_follows_frame() {
        let mut props = Properties::default();
        props.rotate(&Mat3::rot_z(std::f64::consts::FRAC_PI_2));
        let plane = Plane::new(props);

        let p = plane.projection(Vec3::new(0.0, 1.0, 0.0));
        assert!((p.x - 1.0).abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);
    }
}
