use geo::ray::Ray;
use geo::{Vec3, EPS};

use crate::envelope::Envelope;
use crate::object::{Hit, Side};
use crate::properties::Properties;

/// A general quadric `a·x² + b·y² + c·z² + r = 0` in the local frame. Many
/// basic surfaces are special cases: ellipsoids, cylinders, cones and both
/// hyperboloid sheets come from sign choices on `c` and `r`.
#[derive(Debug, Clone, PartialEq)]
pub struct Squaroid {
    pub props: Properties,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub r: f64,
}

fn inv_sqr(r: f64) -> f64 {
    if r != 0.0 {
        1.0 / (r * r)
    } else {
        1.0
    }
}

impl Squaroid {
    pub fn new(props: Properties, a: f64, b: f64, c: f64, r: f64) -> Self {
        Squaroid { props, a, b, c, r }
    }

    pub fn ellipsoid(props: Properties, rx: f64, ry: f64, rz: f64) -> Self {
        let mut o = Squaroid::new(props, inv_sqr(rx), inv_sqr(ry), inv_sqr(rz), -1.0);
        let rmax = rx.max(ry).max(rz);
        o.props.envelope = Some(Envelope::new(o.props.pos, rmax + 2.0 * EPS));
        o
    }

    pub fn hyperboloid1(props: Properties, rx: f64, ry: f64, rz: f64) -> Self {
        Squaroid::new(props, inv_sqr(rx), inv_sqr(ry), -inv_sqr(rz), -1.0)
    }

    pub fn hyperboloid2(props: Properties, rx: f64, ry: f64, rz: f64) -> Self {
        Squaroid::new(props, inv_sqr(rx), inv_sqr(ry), -inv_sqr(rz), 1.0)
    }

    pub fn cone(props: Properties, rx: f64, ry: f64, rz: f64) -> Self {
        Squaroid::new(props, inv_sqr(rx), inv_sqr(ry), -inv_sqr(rz), 0.0)
    }

    pub fn cylinder(props: Properties, rx: f64, ry: f64) -> Self {
        Squaroid::new(props, inv_sqr(rx), inv_sqr(ry), 0.0, -1.0)
    }

    pub fn ray_hit(&self, ray: &Ray) -> Option<Hit> {
        let ax = &self.props.axes;
        let p = ax.mul_vec(ray.origin - self.props.pos);
        let d = ax.mul_vec(ray.dir);

        let f = self.a * d.x * d.x + self.b * d.y * d.y + self.c * d.z * d.z;
        let fs = self.a * d.x * p.x + self.b * d.y * p.y + self.c * d.z * p.z;
        let fq = self.a * p.x * p.x + self.b * p.y * p.y + self.c * p.z * p.z + self.r;

        let t = if f != 0.0 {
            let f_inv = 1.0 / f;
            let s = fs * f_inv;
            let q = fq * f_inv;
            let r = s * s - q;
            if r < 0.0 {
                // missing the surface
                return None;
            }
            let r = r.sqrt();
            let mut t = -s - r;
            if t < 0.0 {
                t = -s + r;
            }
            if t < 0.0 {
                return None;
            }
            t
        } else {
            // degenerate leading coefficient, the equation is linear
            if fs == 0.0 {
                return None;
            }
            let t = -fq / (2.0 * fs);
            if t < 0.0 {
                return None;
            }
            t
        };

        let hp = p + d * t;
        let n = Vec3::new(hp.x * self.a, hp.y * self.b, hp.z * self.c);
        let normal = ax.tmul_vec(n).of_length(1.0);

        Some(Hit {
            t: t - EPS,
            normal,
        })
    }

    pub fn side(&self, pos: Vec3) -> Side {
        let p = self.props.axes.mul_vec(pos - self.props.pos);
        let v = self.a * p.x * p.x + self.b * p.y * p.y + self.c * p.z * p.z + self.r;
        Side::from_outside(v > 0.0)
    }

    pub fn scale(&mut self, fac: f64) {
        self.props.scale(fac);
        self.r *= fac * fac;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_sphere() -> Squaroid {
        Squaroid::new(Properties::default(), 1.0, 1.0, 1.0, -1.0)
    }

    #[test]
    fn test_matches_analytic_sphere() {
        let q = unit_sphere();
        let ray = Ray::new(Vec3::new(0.0, -3.0, 0.0), Vec3::new(0.0, 1.0, 0.0));

        let hit = q.ray_hit(&ray).unwrap();
        let (t, n) = geo::sphere::ray_hit(Vec3::zero(), 1.0, &ray).unwrap();

        assert!((hit.t - t).abs() < 1e-9);
        assert!(hit.normal.dist(&n) < 1e-6);
    }

    #[test]
    fn test_side() {
        let q = unit_sphere();

        assert_eq!(q.side(Vec3::zero()), Side::Inside);
        assert_eq!(q.side(Vec3::new(0.0, 2.0, 0.0)), Side::Outside);
    }

    #[test]
    fn test_cylinder_is_open_along_z() {
        let cyl = Squaroid::cylinder(Properties::default(), 1.0, 1.0);

        assert_eq!(cyl.side(Vec3::new(0.0, 0.0, 100.0)), Side::Inside);
        assert_eq!(cyl.side(Vec3::new(2.0, 0.0, 100.0)), Side::Outside);

        // a ray along the axis never crosses the surface
        assert!(cyl
            .ray_hit(&Ray::new(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0)))
            .is_none());

        let hit = cyl
            .ray_hit(&Ray::new(
                Vec3::new(-5.0, 0.0, 3.0),
                Vec3::new(1.0, 0.0, 0.0),
            ))
            .unwrap();
        assert!((hit.t - 4.0).abs() < 1e-5);
        assert!(hit.normal.dist(&Vec3::new(-1.0, 0.0, 0.0)) < 1e-6);
    }

    #[test]
    fn test_ellipsoid_envelope() {
        let e = Squaroid::ellipsoid(Properties::default(), 1.0, 2.0, 3.0);

        let env = e.props.envelope.as_ref().unwrap();
        assert!((env.radius - 3.0).abs() < 1e-5);

        assert_eq!(e.side(Vec3::new(0.0, 0.0, 2.5)), Side::Inside);
        assert_eq!(e.side(Vec3::new(0.0, 0.0, 3.5)), Side::Outside);
        assert_eq!(e.side(Vec3::new(0.0, 2.5, 0.0)), Side::Outside);
    }

    #[test]
    fn test_scale_squares_r() {
        let mut q = unit_sphere();
        q.scale(2.0);

        // the surface now sits at radius 2
        assert_eq!(q.side(Vec3::new(1.5, 0.0, 0.0)), Side::Inside);
        assert_eq!(q.side(Vec3::new(2.5, 0.0, 0.0)), Side::Outside);
    }
}
