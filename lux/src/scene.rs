use geo::ray::Ray;
use geo::{fresnel, vec3, Mat3, Vec3, MAG};

use rand::SeedableRng;
use rand_xorshift::XorShiftRng;

use crate::camera::Camera;
use crate::color::{self, Color};
use crate::compound::Compound;
use crate::object::Object;

/// A unit of indirect energy deposited on a diffuse surface by photon
/// tracing.
#[derive(Debug, Clone, PartialEq)]
pub struct Photon {
    pub pos: Vec3,
    pub color: Color,
}

/// The root owner of everything renderable: camera parameters, render
/// settings, the light and matter compounds and the optional photon map.
/// Immutable while rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub threads: usize,
    pub image_width: usize,
    pub image_height: usize,
    pub gamma: f64,
    pub background_color: Color,

    pub camera_position: Vec3,
    pub camera_view_direction: Vec3,
    pub camera_top_direction: Vec3,
    pub camera_focal_length: f64,

    pub trace_depth: usize,

    pub direct_samples: usize,
    pub path_samples: usize,
    pub photon_samples: usize,
    pub photon_min_distance: f64,

    pub light: Compound,
    pub matter: Compound,

    pub photon_map: Vec<Photon>,
}

impl Default for Scene {
    fn default() -> Self {
        Scene {
            threads: 10,
            image_width: 800,
            image_height: 600,
            gamma: 1.0,
            background_color: color::black(),
            camera_position: Vec3::zero(),
            camera_view_direction: Vec3::new(0.0, 1.0, 0.0),
            camera_top_direction: Vec3::new(0.0, 0.0, 1.0),
            camera_focal_length: 1.0,
            trace_depth: 11,
            direct_samples: 100,
            path_samples: 0,
            photon_samples: 0,
            photon_min_distance: 0.05,
            light: Compound::new(),
            matter: Compound::new(),
            photon_map: Vec::new(),
        }
    }
}

/// A resolved scene intersection.
#[derive(Debug, Clone)]
pub struct SceneHit<'a> {
    pub t: f64,
    pub normal: Vec3,
    pub obj: &'a Object,
    pub is_light: bool,
}

/// Stable per-surface-point RNG seed. Sampling noise depends only on the hit
/// position, which keeps images reproducible regardless of scheduling.
fn surface_seed(p: Vec3) -> u64 {
    (p.x * 32944792.0 + p.y * 76403048.0 + p.z * 24349373.0) as i64 as u64
}

impl Scene {
    pub fn camera(&self) -> Camera {
        Camera::new(
            self.camera_position,
            self.camera_view_direction,
            self.camera_top_direction,
            self.camera_focal_length,
        )
    }

    /// Resolve a ray against light sources and matter, flagging which list
    /// the nearest hit belongs to.
    pub fn hit(&self, ray: &Ray) -> Option<SceneHit<'_>> {
        let mut best = None;

        if let Some((h, obj)) = self.light.ray_hit(ray) {
            best = Some(SceneHit {
                t: h.t,
                normal: h.normal,
                obj,
                is_light: true,
            });
        }

        if let Some((h, obj)) = self.matter.ray_hit(ray) {
            if best.as_ref().map_or(true, |b: &SceneHit| h.t < b.t) {
                best = Some(SceneHit {
                    t: h.t,
                    normal: h.normal,
                    obj,
                    is_light: false,
                });
            }
        }

        best
    }

    /// Outgoing radiance towards `-ray.dir` at the given hit.
    ///
    /// Emissive surfaces short-circuit with an inverse-square falloff from
    /// their reference position. Everything else accumulates a Fresnel
    /// reflection, an optional refracted transmission, an optional chromatic
    /// mirror term and the texture-modulated diffuse response fed by direct
    /// light plus either path tracing or the photon map. Numerical
    /// pathologies never fail; they produce black.
    pub fn lum(&self, lights: &[&Object], hit: &SceneHit, ray: &Ray, depth: usize) -> Color {
        let mut lum = color::black();
        if depth == 0 {
            return lum;
        }

        let pos = ray.point_at(hit.t);
        let prp = hit.obj.properties();

        if prp.radiance > 0.0 {
            let diff_sqr = pos.dist2(&prp.pos);
            let intensity = if diff_sqr > 0.0 {
                prp.radiance / diff_sqr
            } else {
                MAG
            };
            return hit.obj.surface_color(pos) * intensity;
        }

        // residual energy after each specular stage
        let mut residual = 1.0;

        if prp.refractive_index > 1.0 {
            let nor = hit.normal;
            let reflectance = prp.fresnel_reflectivity
                * fresnel::reflectance(ray.dir.dot(&nor).abs(), prp.refractive_index);

            let out = Ray::new(pos, ray.dir.reflect(nor));
            if let Some(next) = self.hit(&out) {
                lum += self.lum(lights, &next, &out, depth - 1) * reflectance;
            }
            residual = 1.0 - reflectance;

            if prp.transparency.norm2() > 0.0 && residual > 0.0 {
                if let Some((_, trans)) = self.matter.trans_hit(ray) {
                    let n_enter = trans
                        .enter_obj
                        .map_or(1.0, |o| o.properties().refractive_index);
                    let n_exit = trans
                        .exit_obj
                        .map_or(1.0, |o| o.properties().refractive_index);

                    let split = fresnel::split(ray.dir, trans.exit_nor, n_enter / n_exit);
                    if split.transmittance > 0.0 {
                        // start past the boundary so the continuation ray
                        // begins inside the entered medium
                        let out = Ray::new(ray.point_at(hit.t + 2.0 * geo::EPS), split.transmitted);
                        if let Some(next) = self.hit(&out) {
                            let through = self.lum(lights, &next, &out, depth - 1);
                            lum += through * prp.transparency * residual;
                        }
                    }
                }
            }
        }

        if prp.chromatic_reflectivity > 0.0 {
            let out = Ray::new(pos, ray.dir.reflect(hit.normal));
            if let Some(next) = self.hit(&out) {
                let mirrored = self.lum(lights, &next, &out, depth - 1);
                lum += mirrored * prp.color * (residual * prp.chromatic_reflectivity);
            }
            residual *= 1.0 - prp.chromatic_reflectivity;
        }

        if self.direct_samples > 0 {
            let surface = Ray::new(pos, hit.normal);
            let mut rng = XorShiftRng::seed_from_u64(surface_seed(pos));

            // peripheral (non-specular) light
            let mut per = color::black();

            for light_src in lights {
                let mut sum = color::black();

                let fov_to_src = light_src.fov(pos);
                let src_con = Mat3::frame_z(fov_to_src.ray.dir).transposed();
                let cap = fov_to_src.cap_height();
                let light_color = light_src.flat_color();
                let lprp = light_src.properties();

                let shadow_idx = self.matter.in_fov_indices(&fov_to_src);

                let mut out = surface.clone();
                for _ in 0..self.direct_samples {
                    out.dir = src_con.mul_vec(vec3::random_sphere_cap(&mut rng, cap));
                    let weight = out.dir.dot(&surface.dir);
                    if weight <= 0.0 {
                        continue;
                    }

                    let a = match light_src.ray_hit(&out) {
                        Some(h) => h.t,
                        None => continue,
                    };

                    let blocked = match self.matter.hit_indexed(&shadow_idx, &out) {
                        Some((h, _)) => h.t <= a,
                        None => false,
                    };
                    if blocked {
                        continue;
                    }

                    let hit_pos = out.point_at(a);
                    let diff_sqr = hit_pos.dist2(&lprp.pos);
                    let intensity = if diff_sqr > 0.0 {
                        lprp.radiance / diff_sqr
                    } else {
                        MAG
                    };
                    sum += light_color * (intensity * weight);
                }

                // the factor 2 compensates the cosine weighting across the
                // half-sphere; skipped samples stay in the divisor
                per += sum * (2.0 * cap / self.direct_samples as f64);
            }

            if self.path_samples > 0 && depth > 10 {
                let mut sum = color::black();
                let out_con = Mat3::frame_z(surface.dir).transposed();
                let mut out = surface.clone();
                for _ in 0..self.path_samples {
                    out.dir = out_con.mul_vec(vec3::random_sphere_cap(&mut rng, 1.0));
                    let weight = out.dir.dot(&surface.dir);
                    if weight <= 0.0 {
                        continue;
                    }
                    if let Some((h, obj)) = self.matter.ray_hit(&out) {
                        let next = SceneHit {
                            t: h.t,
                            normal: h.normal,
                            obj,
                            is_light: false,
                        };
                        sum += self.lum(lights, &next, &out, depth - 10) * weight;
                    }
                }
                per += sum * (2.0 / self.path_samples as f64);
            } else if !self.photon_map.is_empty() {
                let min_sqr = self.photon_min_distance * self.photon_min_distance;

                let mut sum = color::black();
                for ph in &self.photon_map {
                    let diff = pos - ph.pos;
                    let diff_sqr = diff.norm2();
                    if diff_sqr < min_sqr {
                        continue;
                    }

                    let out = Ray::new(ph.pos, diff.of_length(1.0));
                    let weight = -out.dir.dot(&surface.dir) / diff_sqr;
                    if weight <= 0.0 {
                        continue;
                    }

                    let visible = match self.matter.ray_hit(&out) {
                        None => true,
                        Some((_, obj)) => std::ptr::eq(obj, hit.obj),
                    };
                    if visible {
                        sum += ph.color * weight;
                    }
                }
                // divided by the emission count, not the map size
                per += sum * (1.0 / self.photon_samples as f64);
            }

            let texture = hit.obj.surface_color(pos) * (residual * prp.diffuse_reflectivity);
            lum += per * texture;
        }

        lum
    }

    /// Trace photons from every light into the matter compound. Rebuilds the
    /// map from scratch; a fixed emission seed keeps it deterministic.
    pub fn build_photon_map(&mut self) {
        self.photon_map.clear();
        if self.photon_samples == 0 {
            return;
        }

        let mut map = Vec::new();
        for light_src in self.light.flatten() {
            let color = light_src.flat_color() * light_src.properties().radiance;
            let mut rng = XorShiftRng::seed_from_u64(1234);
            let mut out = Ray::new(light_src.properties().pos, Vec3::zero());
            for _ in 0..self.photon_samples {
                out.dir = vec3::random_sphere_cap(&mut rng, 2.0);
                send_photon(&self.matter, &mut map, &out, color, self.trace_depth);
            }
        }

        log::info!("photon map holds {} photons", map.len());
        self.photon_map = map;
    }
}

/// Trace one photon: reflective surfaces split it by Fresnel and bounce the
/// reflected share; the transmitted share is deposited on textured surfaces.
fn send_photon(matter: &Compound, map: &mut Vec<Photon>, ray: &Ray, color: Color, depth: usize) {
    if depth == 0 {
        return;
    }

    let (hit, obj) = match matter.ray_hit(ray) {
        Some(x) => x,
        None => return,
    };
    let pos = ray.point_at(hit.t);
    let prp = obj.properties();

    let mut reflectance = 0.0;
    if prp.refractive_index > 1.0 {
        let nor = hit.normal;
        let out = Ray::new(pos, ray.dir.reflect(nor));
        reflectance = fresnel::reflectance(ray.dir.dot(&nor).abs(), prp.refractive_index);
        send_photon(matter, map, &out, color * reflectance, depth - 1);
    }

    let color = color * (1.0 - reflectance);
    if color.norm2() > 0.0 && prp.texture.is_some() {
        let color = color * obj.surface_color(pos);
        map.push(Photon { pos, color });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::Properties;
    use crate::sphere::Sphere;
    use crate::texture::Texture;

    fn sphere_obj(pos: Vec3, radius: f64, props: Properties) -> Object {
        Object::Sphere(Sphere::new(Properties { pos, ..props }, radius))
    }

    fn emissive_sphere(pos: Vec3, radius: f64, radiance: f64) -> Object {
        sphere_obj(
            pos,
            radius,
            Properties {
                radiance,
                color: Color::new(1.0, 1.0, 1.0),
                ..Properties::default()
            },
        )
    }

    #[test]
    fn test_hit_flags_lights() {
        let mut scene = Scene::default();
        scene
            .light
            .push_object(emissive_sphere(Vec3::new(0.0, 5.0, 0.0), 1.0, 10.0));
        scene.matter.push_object(sphere_obj(
            Vec3::new(0.0, 10.0, 0.0),
            1.0,
            Properties::default(),
        ));

        let hit = scene
            .hit(&Ray::new(Vec3::zero(), Vec3::new(0.0, 1.0, 0.0)))
            .unwrap();
        assert!(hit.is_light);
        assert!((hit.t - 4.0).abs() < 1e-4);

        // from behind the light, matter is nearer
        let hit = scene
            .hit(&Ray::new(
                Vec3::new(0.0, 12.0, 0.0),
                Vec3::new(0.0, -1.0, 0.0),
            ))
            .unwrap();
        assert!(!hit.is_light);
    }

    #[test]
    fn test_lum_emissive_shortcut() {
        let mut scene = Scene::default();
        scene
            .light
            .push_object(emissive_sphere(Vec3::zero(), 1.0, 10.0));

        let ray = Ray::new(Vec3::new(0.0, -5.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let hit = scene.hit(&ray).unwrap();
        let l = scene.lum(&[], &hit, &ray, scene.trace_depth);

        // hit point sits on the unit sphere, so intensity == radiance
        assert!((l.x - 10.0).abs() < 1e-3);
        assert_eq!(l.x, l.y);
    }

    #[test]
    fn test_lum_depth_zero_is_black() {
        let mut scene = Scene::default();
        scene
            .light
            .push_object(emissive_sphere(Vec3::zero(), 1.0, 10.0));

        let ray = Ray::new(Vec3::new(0.0, -5.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let hit = scene.hit(&ray).unwrap();
        assert_eq!(scene.lum(&[], &hit, &ray, 0), color::black());
    }

    #[test]
    fn test_lum_unlit_scene_is_black() {
        let mut scene = Scene::default();
        scene.matter.push_object(sphere_obj(
            Vec3::zero(),
            1.0,
            Properties {
                color: Color::new(1.0, 0.0, 0.0),
                ..Properties::default()
            },
        ));

        let ray = Ray::new(Vec3::new(0.0, -5.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let hit = scene.hit(&ray).unwrap();
        let l = scene.lum(&[], &hit, &ray, scene.trace_depth);

        assert_eq!(l, color::black());
    }

    #[test]
    fn test_direct_light_reaches_a_facing_surface() {
        let mut scene = Scene::default();
        scene.direct_samples = 64;

        let light = emissive_sphere(Vec3::new(0.0, 0.0, 5.0), 0.5, 20.0);
        scene.light.push_object(light);
        scene.matter.push_object(sphere_obj(
            Vec3::zero(),
            1.0,
            Properties {
                color: Color::new(1.0, 1.0, 1.0),
                ..Properties::default()
            },
        ));

        let lights = scene.light.flatten();

        // the top of the sphere faces the light
        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = scene.hit(&ray).unwrap();
        let lit = scene.lum(&lights, &hit, &ray, scene.trace_depth);
        assert!(lit.x > 0.0);

        // the bottom is in its own shadow
        let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, 1.0));
        let hit = scene.hit(&ray).unwrap();
        let dark = scene.lum(&lights, &hit, &ray, scene.trace_depth);
        assert_eq!(dark, color::black());

        assert!(lit.x > dark.x);
    }

    #[test]
    fn test_lum_is_deterministic() {
        let mut scene = Scene::default();
        scene.direct_samples = 32;
        scene
            .light
            .push_object(emissive_sphere(Vec3::new(0.0, 0.0, 5.0), 0.5, 20.0));
        scene
            .matter
            .push_object(sphere_obj(Vec3::zero(), 1.0, Properties::default()));

        let lights = scene.light.flatten();
        let ray = Ray::new(Vec3::new(0.1, 0.2, 3.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = scene.hit(&ray).unwrap();

        let a = scene.lum(&lights, &hit, &ray, scene.trace_depth);
        let b = scene.lum(&lights, &hit, &ray, scene.trace_depth);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fresnel_reflection_shortcut_weights() {
        // a reflective floor mirrors an emissive sphere above the camera ray
        let mut scene = Scene::default();
        scene.direct_samples = 0;

        scene
            .light
            .push_object(emissive_sphere(Vec3::new(0.0, 0.0, 4.0), 1.0, 10.0));

        let mut props = Properties::default();
        props.set_refractive_index(1.5);
        // plane at z = 0 facing +z
        scene
            .matter
            .push_object(Object::Plane(crate::plane::Plane::new(props)));

        // straight down onto the plane: the reflection runs back up into the
        // light, weighted by the normal-incidence reflectance of ~4%
        let ray = Ray::new(Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = scene.hit(&ray).unwrap();
        let l = scene.lum(&[], &hit, &ray, scene.trace_depth);

        // the reflected ray hits the light sphere's surface one radius away
        // from its center: intensity 10/1, weighted by ~4% reflectance
        let expected = 10.0 * fresnel::reflectance(1.0, 1.5);
        assert!((l.x - expected).abs() < 1e-3, "{} vs {expected}", l.x);
    }

    #[test]
    fn test_photon_map_build_and_gather() {
        let mut scene = Scene::default();
        scene.photon_samples = 200;

        scene
            .light
            .push_object(emissive_sphere(Vec3::new(0.0, 0.0, 5.0), 0.5, 10.0));

        // textured floor below the light collects photons
        let mut props = Properties::default();
        props.texture = Some(Texture::Plain {
            color: Color::new(0.5, 0.5, 0.5),
        });
        scene
            .matter
            .push_object(Object::Plane(crate::plane::Plane::new(props)));

        scene.build_photon_map();
        assert!(!scene.photon_map.is_empty());
        // roughly half of all emitted photons head downwards
        assert!(scene.photon_map.len() <= scene.photon_samples);

        let map_a = scene.photon_map.clone();
        scene.build_photon_map();
        assert_eq!(map_a, scene.photon_map);
    }

    #[test]
    fn test_photons_skip_untextured_matter() {
        let mut scene = Scene::default();
        scene.photon_samples = 100;

        scene
            .light
            .push_object(emissive_sphere(Vec3::new(0.0, 0.0, 5.0), 0.5, 10.0));
        scene
            .matter
            .push_object(Object::Plane(crate::plane::Plane::new(
                Properties::default(),
            )));

        scene.build_photon_map();
        assert!(scene.photon_map.is_empty());
    }

    #[test]
    fn test_photon_gather_weights_by_distance() {
        let mut scene = Scene::default();
        scene.direct_samples = 4;
        scene.photon_samples = 2;
        scene.photon_min_distance = 0.05;

        let mut props = Properties::default();
        props.texture = Some(Texture::Plain {
            color: Color::new(0.5, 0.5, 0.5),
        });
        scene
            .matter
            .push_object(Object::Plane(crate::plane::Plane::new(props)));

        // one photon a unit above the plane, straight over the hit point
        scene.photon_map = vec![Photon {
            pos: Vec3::new(0.0, 0.0, 1.0),
            color: Color::new(2.0, 2.0, 2.0),
        }];

        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = scene.hit(&ray).unwrap();
        let l = scene.lum(&[], &hit, &ray, scene.trace_depth);

        // weight 1/d² = 1, divided by the emission count 2, times the
        // texture color 0.5
        assert!((l.x - 0.5).abs() < 1e-3, "{}", l.x);

        // photons below the minimum distance are ignored
        scene.photon_map[0].pos = Vec3::new(0.0, 0.0, 0.01);
        let hit = scene.hit(&ray).unwrap();
        let l = scene.lum(&[], &hit, &ray, scene.trace_depth);
        assert_eq!(l, color::black());
    }

    #[test]
    fn test_path_tracing_adds_bounce_light() {
        let mut scene = Scene::default();
        scene.direct_samples = 16;
        scene.trace_depth = 11;

        scene
            .light
            .push_object(emissive_sphere(Vec3::new(0.0, 0.0, 6.0), 0.5, 30.0));

        // a floor and a big matte back wall that bounces light onto it
        scene
            .matter
            .push_object(Object::Plane(crate::plane::Plane::new(
                Properties::default(),
            )));
        scene.matter.push_object(sphere_obj(
            Vec3::new(0.0, 4.0, 2.0),
            2.0,
            Properties::default(),
        ));

        let lights = scene.light.flatten();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = scene.hit(&ray).unwrap();

        let direct_only = scene.lum(&lights, &hit, &ray, scene.trace_depth);

        scene.path_samples = 32;
        let hit = scene.hit(&ray).unwrap();
        let with_paths = scene.lum(&lights, &hit, &ray, scene.trace_depth);

        assert!(with_paths.x.is_finite());
        assert!(
            with_paths.x >= direct_only.x,
            "{} < {}",
            with_paths.x,
            direct_only.x
        );
    }

    #[test]
    fn test_glass_sphere_splits_energy() {
        // camera ray hits a glass sphere dead-on; a light sits behind it
        let mut scene = Scene::default();
        scene.direct_samples = 0;

        scene
            .light
            .push_object(emissive_sphere(Vec3::new(0.0, 10.0, 0.0), 1.0, 50.0));

        let mut props = Properties::default();
        assert!(props.set_material("transparent"));
        props.set_refractive_index(1.5);
        props.transparency = Color::new(1.0, 1.0, 1.0);
        scene.matter.push_object(sphere_obj(Vec3::zero(), 1.0, props));

        let ray = Ray::new(Vec3::new(0.0, -5.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let hit = scene.hit(&ray).unwrap();
        let l = scene.lum(&[], &hit, &ray, scene.trace_depth);

        // straight-through transmission crosses two boundaries, each passing
        // ~96%; the ray then lands on the light sphere one radius from its
        // center (intensity 50)
        let full = 50.0;
        assert!(l.x > full * 0.9, "transmitted light must come through: {}", l.x);
        assert!(l.x < full, "energy must be attenuated: {}", l.x);
    }
}
