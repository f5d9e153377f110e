use geo::ray::Ray;
use geo::{Vec3, EPS, MAG};

use crate::object::{Hit, Side};
use crate::properties::Properties;
use crate::sdf::Sdf;

/// An implicit surface resolved by sphere tracing a signed distance field.
/// The field is unit-sized in the local frame; `inv_scale` maps world
/// coordinates into it and `cycles` caps the tracing iterations.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceField {
    pub props: Properties,
    pub field: Sdf,
    pub inv_scale: f64,
    pub cycles: usize,
}

impl DistanceField {
    pub fn new(props: Properties, field: Sdf) -> Self {
        DistanceField {
            props,
            field,
            inv_scale: 1.0,
            cycles: 200,
        }
    }

    pub fn ray_hit(&self, r: &Ray) -> Option<Hit> {
        let mut ray = r.clone();

        // advance to the envelope first so tracing starts near the surface
        let mut offs0 = 0.0;
        if let Some(env) = &self.props.envelope {
            if env.is_outside(ray.origin) {
                offs0 = env.ray_hit(&ray)?;
                ray.origin = ray.point_at(offs0);
            }
        }

        let ax = &self.props.axes;
        let local = Ray::new(
            ax.mul_vec(ray.origin - self.props.pos) * self.inv_scale,
            ax.mul_vec(ray.dir),
        );

        let mut offs1 = 0.0;
        let mut dist = self.field.dist(local.origin);

        // step towards the surface from whichever side the ray starts on
        if dist > 0.0 {
            for _ in 0..self.cycles {
                offs1 += dist + EPS;
                dist = self.field.dist(local.point_at(offs1));
                if dist < 0.0 || dist > MAG {
                    break;
                }
            }
        } else {
            for _ in 0..self.cycles {
                offs1 -= dist - EPS;
                dist = self.field.dist(local.point_at(offs1));
                if dist > 0.0 || dist < -MAG {
                    break;
                }
            }
        }

        if dist.abs() > EPS {
            return None;
        }

        // normal from the gradient of the distance field
        let p = local.point_at(offs1);
        let d0 = self.field.dist(p);
        let grad = Vec3::new(
            (self.field.dist(Vec3::new(p.x + EPS, p.y, p.z)) - d0) / EPS,
            (self.field.dist(Vec3::new(p.x, p.y + EPS, p.z)) - d0) / EPS,
            (self.field.dist(Vec3::new(p.x, p.y, p.z + EPS)) - d0) / EPS,
        );
        let normal = ax.tmul_vec(grad).of_length(1.0);

        Some(Hit {
            t: offs0 + offs1 / self.inv_scale - EPS,
            normal,
        })
    }

    pub fn side(&self, pos: Vec3) -> Side {
        if let Some(env) = &self.props.envelope {
            if env.is_outside(pos) {
                return Side::Outside;
            }
        }
        let p = self.props.axes.mul_vec(pos - self.props.pos) * self.inv_scale;
        Side::from_outside(self.field.dist(p) > 0.0)
    }

    pub fn scale(&mut self, fac: f64) {
        self.props.scale(fac);
        self.inv_scale *= 1.0 / fac;
    }
}
