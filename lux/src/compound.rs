use geo::ray::{Ray, RayCone};
use geo::{Mat3, Vec3, EPS};

use crate::envelope::Envelope;
use crate::object::{Hit, Object};

/// An element of a compound: a single object or a nested group.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Object(Object),
    Group(Compound),
}

/// An ordered collection of objects with an optional shared envelope. Used
/// for the scene's light and matter lists; groups may nest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compound {
    pub envelope: Option<Envelope>,
    elements: Vec<Element>,
}

/// Which objects a ray transition at a compound boundary leaves and enters.
/// When two surfaces coincide within `EPS` both sides are populated.
#[derive(Debug, Clone, Copy)]
pub struct TransData<'a> {
    pub exit_nor: Vec3,
    pub exit_obj: Option<&'a Object>,
    pub enter_obj: Option<&'a Object>,
}

impl Default for TransData<'_> {
    fn default() -> Self {
        TransData {
            exit_nor: Vec3::zero(),
            exit_obj: None,
            enter_obj: None,
        }
    }
}

impl Compound {
    pub fn new() -> Self {
        Compound::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn push_object(&mut self, obj: Object) {
        self.elements.push(Element::Object(obj));
    }

    /// Add an element. Groups without an envelope are flattened into this
    /// compound; enveloped groups stay nested so their envelope keeps culling.
    pub fn push(&mut self, element: Element) {
        match element {
            Element::Object(obj) => self.elements.push(Element::Object(obj)),
            Element::Group(group) => {
                if group.envelope.is_some() {
                    self.elements.push(Element::Group(group));
                } else {
                    for el in group.elements {
                        self.push(el);
                    }
                }
            }
        }
    }

    /// All objects in the compound, groups flattened.
    pub fn flatten(&self) -> Vec<&Object> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into<'a>(&'a self, out: &mut Vec<&'a Object>) {
        for el in &self.elements {
            match el {
                Element::Object(o) => out.push(o),
                Element::Group(g) => g.collect_into(out),
            }
        }
    }

    /// Nearest boundary crossing over all elements.
    pub fn ray_hit(&self, ray: &Ray) -> Option<(Hit, &Object)> {
        if let Some(env) = &self.envelope {
            if !env.ray_hits(ray) {
                return None;
            }
        }

        let mut best: Option<(Hit, &Object)> = None;
        for el in &self.elements {
            let cand = match el {
                Element::Object(o) => o.ray_hit(ray).map(|h| (h, o)),
                Element::Group(g) => g.ray_hit(ray),
            };
            if let Some((h, o)) = cand {
                if best.as_ref().map_or(true, |(b, _)| h.t < b.t) {
                    best = Some((h, o));
                }
            }
        }
        best
    }

    /// Nearest crossing over the top-level elements selected by `indices`.
    /// Used with `in_fov_indices` as a shadow-test short-list.
    pub fn hit_indexed(&self, indices: &[usize], ray: &Ray) -> Option<(Hit, &Object)> {
        let mut best: Option<(Hit, &Object)> = None;
        for &i in indices {
            let cand = match &self.elements[i] {
                Element::Object(o) => o.ray_hit(ray).map(|h| (h, o)),
                Element::Group(g) => g.ray_hit(ray),
            };
            if let Some((h, o)) = cand {
                if best.as_ref().map_or(true, |(b, _)| h.t < b.t) {
                    best = Some((h, o));
                }
            }
        }
        best
    }

    /// Indices of the top-level elements that may lie within `fov`.
    pub fn in_fov_indices(&self, fov: &RayCone) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, el)| match el {
                Element::Object(o) => o.is_in_fov(fov),
                Element::Group(g) => g.envelope.as_ref().map_or(true, |e| e.is_in_fov(fov)),
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Nearest crossing together with the objects it leaves and enters, for
    /// refractive-index resolution. Surfaces within `EPS` of each other
    /// collapse to one transition touching both objects.
    pub fn trans_hit(&self, ray: &Ray) -> Option<(f64, TransData<'_>)> {
        if let Some(env) = &self.envelope {
            if !env.ray_hits(ray) {
                return None;
            }
        }

        let mut min_a = f64::INFINITY;
        let mut trans = TransData::default();

        for el in &self.elements {
            let cand = match el {
                Element::Object(o) => o.ray_hit(ray).map(|h| (h, o)),
                Element::Group(g) => g.ray_hit(ray),
            };
            let (h, obj) = match cand {
                Some(c) => c,
                None => continue,
            };

            if h.t < min_a - EPS {
                min_a = h.t;
                if h.normal.dot(&ray.dir) > 0.0 {
                    trans.exit_nor = h.normal;
                    trans.exit_obj = Some(obj);
                    trans.enter_obj = None;
                } else {
                    trans.exit_nor = -h.normal;
                    trans.exit_obj = None;
                    trans.enter_obj = Some(obj);
                }
            } else if (h.t - min_a).abs() < EPS {
                min_a = min_a.min(h.t);
                if h.normal.dot(&ray.dir) > 0.0 {
                    trans.exit_obj = Some(obj);
                } else {
                    trans.enter_obj = Some(obj);
                }
            }
        }

        if min_a.is_finite() {
            Some((min_a, trans))
        } else {
            None
        }
    }

    pub fn translate(&mut self, v: Vec3) {
        if let Some(env) = &mut self.envelope {
            env.translate(v);
        }
        for el in &mut self.elements {
            match el {
                Element::Object(o) => o.translate(v),
                Element::Group(g) => g.translate(v),
            }
        }
    }

    pub fn rotate(&mut self, mat: &Mat3) {
        if let Some(env) = &mut self.envelope {
            env.rotate(mat);
        }
        for el in &mut self.elements {
            match el {
                Element::Object(o) => o.rotate(mat),
                Element::Group(g) => g.rotate(mat),
            }
        }
    }

    pub fn scale(&mut self, fac: f64) {
        if let Some(env) = &mut self.envelope {
            env.scale(fac);
        }
        for el in &mut self.elements {
            match el {
                Element::Object(o) => o.scale(fac),
                Element::Group(g) => g.scale(fac),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::Properties;
    use crate::sphere::Sphere;

    fn sphere_at(pos: Vec3, radius: f64) -> Object {
        Object::Sphere(Sphere::new(
            Properties {
                pos,
                ..Properties::default()
            },
            radius,
        ))
    }

    fn two_spheres() -> Compound {
        let mut c = Compound::new();
        c.push_object(sphere_at(Vec3::new(0.0, 4.0, 0.0), 1.0));
        c.push_object(sphere_at(Vec3::new(0.0, 8.0, 0.0), 1.0));
        c
    }

    #[test]
    fn test_ray_hit_picks_nearest() {
        let c = two_spheres();
        let ray = Ray::new(Vec3::zero(), Vec3::new(0.0, 1.0, 0.0));

        let (hit, obj) = c.ray_hit(&ray).unwrap();
        assert!((hit.t - 3.0).abs() < 1e-4);
        assert_eq!(obj.properties().pos, Vec3::new(0.0, 4.0, 0.0));
    }

    #[test]
    fn test_envelope_culls_whole_compound() {
        let mut c = two_spheres();
        c.envelope = Some(Envelope::new(Vec3::new(0.0, 6.0, 0.0), 3.5));

        assert!(c
            .ray_hit(&Ray::new(Vec3::zero(), Vec3::new(0.0, 1.0, 0.0)))
            .is_some());
        assert!(c
            .ray_hit(&Ray::new(Vec3::zero(), Vec3::new(0.0, -1.0, 0.0)))
            .is_none());
    }

    #[test]
    fn test_push_flattens_unenveloped_groups() {
        let mut outer = Compound::new();
        outer.push(Element::Group(two_spheres()));
        assert_eq!(outer.len(), 2);

        let mut enveloped = two_spheres();
        enveloped.envelope = Some(Envelope::new(Vec3::new(0.0, 6.0, 0.0), 3.5));
        let mut outer = Compound::new();
        outer.push(Element::Group(enveloped));
        assert_eq!(outer.len(), 1);
        assert_eq!(outer.flatten().len(), 2);
    }

    #[test]
    fn test_in_fov_indices_short_lists() {
        let c = two_spheres();

        // a cone towards the first sphere sees it but not the second
        let fov = geo::sphere::fov_cone(Vec3::new(0.0, 4.0, 0.0), 1.0, Vec3::new(5.0, 4.0, 0.0));
        let idx = c.in_fov_indices(&fov);
        assert_eq!(idx, vec![0]);

        let ray = Ray::new(Vec3::new(5.0, 4.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        let (hit, _) = c.hit_indexed(&idx, &ray).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_trans_hit_enter_and_exit() {
        let mut c = Compound::new();
        c.push_object(sphere_at(Vec3::zero(), 1.0));

        // entering the sphere
        let ray = Ray::new(Vec3::new(0.0, -4.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let (t, trans) = c.trans_hit(&ray).unwrap();
        assert!((t - 3.0).abs() < 1e-4);
        assert!(trans.enter_obj.is_some());
        assert!(trans.exit_obj.is_none());
        // the exit normal points along the ray, into the entered medium
        assert!(trans.exit_nor.dot(&ray.dir) > 0.0);

        // leaving it from the inside
        let ray = Ray::new(Vec3::zero(), Vec3::new(0.0, 1.0, 0.0));
        let (t, trans) = c.trans_hit(&ray).unwrap();
        assert!((t - 1.0).abs() < 1e-4);
        assert!(trans.exit_obj.is_some());
        assert!(trans.enter_obj.is_none());
    }

    #[test]
    fn test_trans_hit_collapses_touching_surfaces() {
        let mut c = Compound::new();
        // two spheres sharing the boundary point (0, 1, 0)
        c.push_object(sphere_at(Vec3::zero(), 1.0));
        c.push_object(sphere_at(Vec3::new(0.0, 2.0, 0.0), 1.0));

        let ray = Ray::new(Vec3::zero(), Vec3::new(0.0, 1.0, 0.0));
        let (t, trans) = c.trans_hit(&ray).unwrap();

        assert!((t - 1.0).abs() < 1e-3);
        assert!(trans.exit_obj.is_some(), "leaves the first sphere");
        assert!(trans.enter_obj.is_some(), "enters the second sphere");
    }
}
