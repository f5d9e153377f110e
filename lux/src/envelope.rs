use geo::ray::{Ray, RayCone};
use geo::{sphere, Mat3, Vec3, MAG};

/// A bounding sphere used for quick ray and visibility rejection.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub pos: Vec3,
    pub radius: f64,
}

impl Envelope {
    pub fn new(pos: Vec3, radius: f64) -> Self {
        Envelope { pos, radius }
    }

    pub fn translate(&mut self, v: Vec3) {
        self.pos += v;
    }

    pub fn rotate(&mut self, mat: &Mat3) {
        self.pos = mat.mul_vec(self.pos);
    }

    pub fn scale(&mut self, fac: f64) {
        self.pos *= fac;
        self.radius *= fac;
    }

    pub fn ray_hits(&self, ray: &Ray) -> bool {
        sphere::ray_hit(self.pos, self.radius, ray).is_some()
    }

    pub fn ray_hit(&self, ray: &Ray) -> Option<f64> {
        sphere::ray_hit(self.pos, self.radius, ray).map(|(t, _)| t)
    }

    pub fn is_outside(&self, p: Vec3) -> bool {
        sphere::is_outside(self.pos, self.radius, p)
    }

    pub fn fov(&self, from: Vec3) -> RayCone {
        sphere::fov_cone(self.pos, self.radius, from)
    }

    pub fn is_in_fov(&self, fov: &RayCone) -> bool {
        sphere::is_in_fov(self.pos, self.radius, fov)
    }

    pub fn is_reachable(&self, ray: &Ray, length: f64) -> bool {
        sphere::intersects_half_sphere(self.pos, self.radius, ray, length)
    }

    /// Smallest sphere enclosing both envelopes. When one envelope already
    /// contains the other, the bigger one is returned unchanged.
    pub fn enclosing(a: &Envelope, b: &Envelope) -> Envelope {
        let diff = a.pos - b.pos;
        let d = diff.norm();

        let rmax = a.radius.max(b.radius);
        let rmin = a.radius.min(b.radius);

        if rmin + d <= rmax {
            if a.radius > b.radius {
                a.clone()
            } else {
                b.clone()
            }
        } else {
            let p1 = a.pos + diff.of_length(a.radius);
            let p2 = b.pos - diff.of_length(b.radius);
            Envelope {
                pos: (p1 + p2) * 0.5,
                radius: (a.radius + b.radius + d) * 0.5,
            }
        }
    }

    /// Envelope that excludes nothing, used as the fallback when estimation
    /// finds no surface at all.
    pub fn boundless(pos: Vec3) -> Envelope {
        Envelope { pos, radius: MAG }
    }
}
