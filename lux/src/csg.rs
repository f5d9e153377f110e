use geo::ray::Ray;
use geo::{Vec3, EPS};

use crate::object::{Hit, Object, Side};
use crate::properties::Properties;

/// A boolean pair composer. Whether it models an intersection or a union is
/// decided by the enclosing `Object` variant; the traversal below is shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub props: Properties,
    pub o1: Object,
    pub o2: Object,
}

/// Inversion of a solid: inside and outside swap, surface normals flip.
#[derive(Debug, Clone, PartialEq)]
pub struct Neg {
    pub props: Properties,
    pub o1: Object,
}

/// Component-wise scaling wrapper around a child object.
#[derive(Debug, Clone, PartialEq)]
pub struct Stretch {
    pub props: Properties,
    pub inv_scale: Vec3,
    pub o1: Object,
}

/// Boundary search for both pair composers. A boundary of one child counts
/// only where the other child reports `keep`; `keep = Inside` yields the
/// intersection, `keep = Outside` the union.
///
/// After the two initial probes the traversal advances past the far hit and
/// alternates the roles of the children. The alternation matters: a ray can
/// graze several boundaries of one child while still outside the other, and
/// each crossing changes which child constrains the result.
pub fn pair_ray_hit(o1: &Object, o2: &Object, r: &Ray, keep: Side) -> Option<Hit> {
    let h1 = o1.ray_hit(r);
    let h2 = o2.ray_hit(r);

    let a1 = h1.as_ref().map_or(f64::INFINITY, |h| h.t);
    let a2 = h2.as_ref().map_or(f64::INFINITY, |h| h.t);

    if a1 < a2 && o2.side(r.point_at(a1)) == keep {
        return h1;
    }

    let h2 = h2?;
    if o1.side(r.point_at(h2.t)) == keep {
        return Some(h2);
    }

    let mut offs = h2.t;
    let mut ray = Ray::new(r.point_at(offs), r.dir);
    let (mut near, mut far) = (o1, o2);

    loop {
        let h = near.ray_hit(&ray)?;
        if far.side(ray.point_at(h.t)) == keep {
            return Some(Hit {
                t: offs + h.t,
                normal: h.normal,
            });
        }
        offs += h.t + 2.0 * EPS;
        ray.origin = r.point_at(offs);
        std::mem::swap(&mut near, &mut far);
    }
}

impl Pair {
    /// Both children agree on `side`; ties go outside.
    pub fn side(&self, pos: Vec3, keep: Side) -> Side {
        if self.o1.side(pos) == keep && self.o2.side(pos) == keep {
            keep
        } else {
            keep.flip()
        }
    }
}

impl Neg {
    pub fn ray_hit(&self, r: &Ray) -> Option<Hit> {
        let h = self.o1.ray_hit(r)?;
        Some(Hit {
            t: h.t,
            normal: -h.normal,
        })
    }
}

impl Stretch {
    pub fn new(o1: Object, scale: Vec3) -> Self {
        let mut props = o1.properties().clone();
        props.pos = Vec3::zero();
        props.axes = geo::Mat3::identity();

        if let Some(env) = &mut props.envelope {
            env.pos = env.pos.mul_diag(scale);
            env.radius *= scale.x.max(scale.y).max(scale.z);
        }

        let inv = |s: f64| if s != 0.0 { 1.0 / s } else { 1.0 };
        Stretch {
            props,
            inv_scale: Vec3::new(inv(scale.x), inv(scale.y), inv(scale.z)),
            o1,
        }
    }

    pub fn ray_hit(&self, r: &Ray) -> Option<Hit> {
        let ax = &self.props.axes;
        let mut ray = Ray::new(
            ax.mul_vec(r.origin - self.props.pos).mul_diag(self.inv_scale),
            ax.mul_vec(r.dir).mul_diag(self.inv_scale),
        );

        // track the direction's length change to recover the world offset
        let d_length = ray.dir.norm();
        let d_factor = if d_length > 0.0 { 1.0 / d_length } else { 0.0 };
        ray.dir = ray.dir * d_factor;

        let h = self.o1.ray_hit(&ray)?;
        let n = h.normal.mul_diag(self.inv_scale);

        Some(Hit {
            t: h.t * d_factor,
            normal: ax.tmul_vec(n).of_length(1.0),
        })
    }

    pub fn side(&self, pos: Vec3) -> Side {
        let p = self
            .props
            .axes
            .mul_vec(pos - self.props.pos)
            .mul_diag(self.inv_scale);
        self.o1.side(p)
    }

    pub fn scale(&mut self, fac: f64) {
        self.props.scale(fac);
        let f = if fac != 0.0 { 1.0 / fac } else { 1.0 };
        self.inv_scale *= f;
    }
}
