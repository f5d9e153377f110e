use geo::ray::{Ray, RayCone};
use geo::{sphere, Vec2, Vec3};

use crate::object::{Hit, Side};
use crate::properties::Properties;

/// A sphere centered at `props.pos`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    pub props: Properties,
    pub radius: f64,
}

impl Sphere {
    pub fn new(props: Properties, radius: f64) -> Self {
        Sphere { props, radius }
    }

    pub fn ray_hit(&self, ray: &Ray) -> Option<Hit> {
        sphere::ray_hit(self.props.pos, self.radius, ray).map(|(t, normal)| Hit { t, normal })
    }

    pub fn side(&self, pos: Vec3) -> Side {
        Side::from_outside(sphere::is_outside(self.props.pos, self.radius, pos))
    }

    pub fn fov(&self, pos: Vec3) -> RayCone {
        sphere::fov_cone(self.props.pos, self.radius, pos)
    }

    pub fn is_in_fov(&self, fov: &RayCone) -> bool {
        sphere::is_in_fov(self.props.pos, self.radius, fov)
    }

    pub fn is_reachable(&self, ray: &Ray, length: f64) -> bool {
        sphere::intersects_half_sphere(self.props.pos, self.radius, ray, length)
    }

    /// Azimuth/elevation of `pos` in the local frame.
    pub fn projection(&self, pos: Vec3) -> Vec2 {
        let r = (pos - self.props.pos).of_length(1.0);
        let ax = &self.props.axes;
        let x = r.dot(&ax.x);
        let y = r.dot(&ax.z.cross(&ax.x));
        let z = r.dot(&ax.z).clamp(-1.0, 1.0);

        Vec2::new(x.atan2(y), z.asin())
    }

    pub fn scale(&mut self, fac: f64) {
        self.props.scale(fac);
        self.radius *= fac;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side() {
        let s = Sphere::new(Properties::default(), 1.0);

        assert_eq!(s.side(Vec3::new(2.0, 0.0, 0.0)), Side::Outside);
        assert_eq!(s.side(Vec3::zero()), Side::Inside);
    }

    #[test]
    fn test_projection_poles() {
        let s = Sphere::new(Properties::default(), 1.0);

        let north = s.projection(Vec3::new(0.0, 0.0, 1.0));
        assert!((north.y - std::f64::consts::FRAC_PI_2).abs() < 1e-9);

        let south = s.projection(Vec3::new(0.0, 0.0, -1.0));
        assert!((south.y + std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_scale() {
        let mut s = Sphere::new(
            Properties {
                pos: Vec3::new(1.0, 0.0, 0.0),
                ..Properties::default()
            },
            1.0,
        );

        s.scale(2.0);
        assert_eq!(s.radius, 2.0);
        assert_eq!(s.props.pos, Vec3::new(2.0, 0.0, 0.0));
    }
}
