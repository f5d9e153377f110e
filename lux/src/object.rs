use geo::ray::{Ray, RayCone};
use geo::{vec3, Mat3, Vec2, Vec3, EPS};

use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

use crate::color::Color;
use crate::csg::{self, Neg, Pair, Stretch};
use crate::distance::DistanceField;
use crate::envelope::Envelope;
use crate::plane::Plane;
use crate::properties::Properties;
use crate::sphere::Sphere;
use crate::squaroid::Squaroid;

/// Which side of a solid a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Outside,
    Inside,
}

impl Side {
    pub fn flip(self) -> Side {
        match self {
            Side::Outside => Side::Inside,
            Side::Inside => Side::Outside,
        }
    }

    pub fn from_outside(outside: bool) -> Side {
        if outside {
            Side::Outside
        } else {
            Side::Inside
        }
    }
}

/// A boundary crossing: the smallest positive ray offset and the outward unit
/// normal at the crossing point.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub t: f64,
    pub normal: Vec3,
}

/// Every renderable solid: analytic primitives and the boolean composers over
/// them. Composers own their children; the tree is strictly a tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Plane(Plane),
    Sphere(Sphere),
    Squaroid(Squaroid),
    Distance(DistanceField),
    PairInside(Box<Pair>),
    PairOutside(Box<Pair>),
    Neg(Box<Neg>),
    Stretch(Box<Stretch>),
}

impl Object {
    /// Intersection: inside where both children are inside. Properties are
    /// inherited from the first child.
    pub fn intersection(o1: Object, o2: Object) -> Object {
        let props = o1.properties().clone();
        Object::PairInside(Box::new(Pair { props, o1, o2 }))
    }

    /// Union: outside where both children are outside. The inherited envelope
    /// is dropped since the union outgrows it.
    pub fn union(o1: Object, o2: Object) -> Object {
        let mut props = o1.properties().clone();
        props.envelope = None;
        Object::PairOutside(Box::new(Pair { props, o1, o2 }))
    }

    pub fn negation(o1: Object) -> Object {
        let props = o1.properties().clone();
        Object::Neg(Box::new(Neg { props, o1 }))
    }

    pub fn stretch(o1: Object, scale: Vec3) -> Object {
        Object::Stretch(Box::new(Stretch::new(o1, scale)))
    }

    pub fn properties(&self) -> &Properties {
        match self {
            Object::Plane(o) => &o.props,
            Object::Sphere(o) => &o.props,
            Object::Squaroid(o) => &o.props,
            Object::Distance(o) => &o.props,
            Object::PairInside(o) | Object::PairOutside(o) => &o.props,
            Object::Neg(o) => &o.props,
            Object::Stretch(o) => &o.props,
        }
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        match self {
            Object::Plane(o) => &mut o.props,
            Object::Sphere(o) => &mut o.props,
            Object::Squaroid(o) => &mut o.props,
            Object::Distance(o) => &mut o.props,
            Object::PairInside(o) | Object::PairOutside(o) => &mut o.props,
            Object::Neg(o) => &mut o.props,
            Object::Stretch(o) => &mut o.props,
        }
    }

    /// Smallest positive boundary crossing along `ray`, or `None`. An
    /// envelope, when present, rejects rays that cannot hit at all.
    pub fn ray_hit(&self, ray: &Ray) -> Option<Hit> {
        if let Some(env) = &self.properties().envelope {
            if !env.ray_hits(ray) {
                return None;
            }
        }

        match self {
            Object::Plane(o) => o.ray_hit(ray),
            Object::Sphere(o) => o.ray_hit(ray),
            Object::Squaroid(o) => o.ray_hit(ray),
            Object::Distance(o) => o.ray_hit(ray),
            Object::PairInside(o) => csg::pair_ray_hit(&o.o1, &o.o2, ray, Side::Inside),
            Object::PairOutside(o) => csg::pair_ray_hit(&o.o1, &o.o2, ray, Side::Outside),
            Object::Neg(o) => o.ray_hit(ray),
            Object::Stretch(o) => o.ray_hit(ray),
        }
    }

    /// Which side of the solid `pos` is on. Points exactly on the boundary may
    /// report either side.
    pub fn side(&self, pos: Vec3) -> Side {
        // a negation's envelope bounds its surface, not its interior, so the
        // outside shortcut does not apply to it
        if let Object::Neg(o) = self {
            return o.o1.side(pos).flip();
        }

        if let Some(env) = &self.properties().envelope {
            if env.is_outside(pos) {
                return Side::Outside;
            }
        }

        match self {
            Object::Plane(o) => o.side(pos),
            Object::Sphere(o) => o.side(pos),
            Object::Squaroid(o) => o.side(pos),
            Object::Distance(o) => o.side(pos),
            Object::PairInside(o) => o.side(pos, Side::Inside),
            Object::PairOutside(o) => o.side(pos, Side::Outside),
            Object::Neg(_) => unreachable!(),
            Object::Stretch(o) => o.side(pos),
        }
    }

    /// A cone rooted at `pos` that contains the whole object. Only planes and
    /// spheres have closed forms; everything else answers through its
    /// envelope, or conservatively with a half-sphere towards its reference
    /// position.
    pub fn fov(&self, pos: Vec3) -> RayCone {
        match self {
            Object::Plane(o) => o.fov(pos),
            Object::Sphere(o) => o.fov(pos),
            _ => {
                if let Some(env) = &self.properties().envelope {
                    return env.fov(pos);
                }
                RayCone {
                    ray: Ray::between(pos, self.properties().pos),
                    cos_rs: 0.0,
                }
            }
        }
    }

    /// Conservative visibility test against a cone. The envelope is the
    /// primary filter; variants refine the answer where they can.
    pub fn is_in_fov(&self, fov: &RayCone) -> bool {
        if let Some(env) = &self.properties().envelope {
            if !env.is_in_fov(fov) {
                return false;
            }
        }

        match self {
            Object::Plane(o) => o.is_in_fov(fov),
            Object::Sphere(o) => o.is_in_fov(fov),
            Object::PairInside(o) | Object::PairOutside(o) => {
                o.o1.is_in_fov(fov) || o.o2.is_in_fov(fov)
            }
            Object::Neg(o) => o.o1.is_in_fov(fov),
            _ => true,
        }
    }

    /// Whether the object can block anything within `length` of the ray's
    /// origin along its forward half-sphere.
    pub fn is_reachable(&self, ray: &Ray, length: f64) -> bool {
        if let Some(env) = &self.properties().envelope {
            if !env.is_reachable(ray, length) {
                return false;
            }
        }

        match self {
            Object::Sphere(o) => o.is_reachable(ray, length),
            _ => true,
        }
    }

    /// 2D surface parameters at `pos`, used by procedural textures.
    pub fn projection(&self, pos: Vec3) -> Vec2 {
        match self {
            Object::Plane(o) => o.projection(pos),
            Object::Sphere(o) => o.projection(pos),
            _ => Vec2::zero(),
        }
    }

    /// Surface color at `pos`: the texture field if one is attached, the flat
    /// color otherwise.
    pub fn surface_color(&self, pos: Vec3) -> Color {
        let props = self.properties();
        match &props.texture {
            Some(t) => t.color_at(self, pos),
            None => props.color,
        }
    }

    /// The flat color of the object, ignoring any surface-parameter
    /// variation. Used for light emission.
    pub fn flat_color(&self) -> Color {
        let props = self.properties();
        props
            .texture
            .as_ref()
            .and_then(|t| t.plain_color())
            .unwrap_or(props.color)
    }

    pub fn translate(&mut self, v: Vec3) {
        self.properties_mut().translate(v);
        match self {
            Object::PairInside(o) | Object::PairOutside(o) => {
                o.o1.translate(v);
                o.o2.translate(v);
            }
            Object::Neg(o) => o.o1.translate(v),
            _ => {}
        }
    }

    pub fn rotate(&mut self, mat: &Mat3) {
        self.properties_mut().rotate(mat);
        match self {
            Object::PairInside(o) | Object::PairOutside(o) => {
                o.o1.rotate(mat);
                o.o2.rotate(mat);
            }
            Object::Neg(o) => o.o1.rotate(mat),
            _ => {}
        }
    }

    pub fn scale(&mut self, fac: f64) {
        match self {
            Object::Plane(o) => o.props.scale(fac),
            Object::Sphere(o) => o.scale(fac),
            Object::Squaroid(o) => o.scale(fac),
            Object::Distance(o) => o.scale(fac),
            Object::PairInside(o) | Object::PairOutside(o) => {
                o.props.scale(fac);
                o.o1.scale(fac);
                o.o2.scale(fac);
            }
            Object::Neg(o) => {
                o.props.scale(fac);
                o.o1.scale(fac);
            }
            Object::Stretch(o) => o.scale(fac),
        }
    }

    /// Offset at which a ray leaves the solid for good: every boundary is
    /// stepped over until no further crossing exists. `None` when the ray
    /// ends up outside without an exit-facing surface (it never was inside).
    pub fn ray_exit(&self, ray: &Ray) -> Option<(f64, Vec3)> {
        let first = self.ray_hit(ray)?;

        let mut a = first.t;
        let mut nor = first.normal;
        let mut sum = 0.0;
        let mut probe = ray.clone();

        loop {
            a += 2.0 * EPS;
            sum += a;
            probe.origin = probe.point_at(a);
            match self.ray_hit(&probe) {
                Some(h) => {
                    a = h.t;
                    nor = h.normal;
                }
                None => break,
            }
        }

        if nor.dot(&ray.dir) > 0.0 {
            Some((sum, nor))
        } else {
            None
        }
    }

    /// Estimate a bounding sphere by shooting `samples` random rays from the
    /// reference position and fitting a sphere around their exit points. The
    /// centre follows the running mean of the samples; a fixed seed makes the
    /// estimate reproducible.
    pub fn estimate_envelope(&self, samples: usize, seed: u64, radius_factor: f64) -> Envelope {
        let mut rng = XorShiftRng::seed_from_u64(seed);

        let mut exits: Vec<Vec3> = Vec::new();
        let mut sum = Vec3::zero();
        let mut ray = Ray::new(self.properties().pos, Vec3::zero());

        for _ in 0..samples {
            ray.dir = vec3::random_sphere_belt(&mut rng, 1.0);
            if let Some((a, _)) = self.ray_exit(&ray) {
                let pos = ray.point_at(a);
                exits.push(pos);
                sum += pos;
                ray.origin = sum * (1.0 / exits.len() as f64);

                // nudge the centre off any surface it may have landed on
                ray.origin.x += EPS * (rng.gen::<f64>() * 2.0 - 1.0);
                ray.origin.y += EPS * (rng.gen::<f64>() * 2.0 - 1.0);
                ray.origin.z += EPS * (rng.gen::<f64>() * 2.0 - 1.0);
            }
        }

        let mut env = Envelope::boundless(ray.origin);
        if !exits.is_empty() {
            let max_r2 = exits
                .iter()
                .map(|p| ray.origin.dist2(p))
                .fold(0.0, f64::max);
            env.radius = max_r2.sqrt() * radius_factor;
        }
        env
    }

    /// Attach an automatically estimated envelope.
    pub fn set_auto_envelope(&mut self) {
        let env = self.estimate_envelope(1000, 123, 1.1);
        self.properties_mut().envelope = Some(env);
    }
}
