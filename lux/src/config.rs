//! Declarative scene descriptions.
//!
//! A scene file is a JSON document mirroring the scene fields plus `light`
//! and `matter` object lists. Every entry names a shape, optional surface
//! fields (colors, material presets, textures, envelopes) and an ordered
//! list of affine transforms.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use geo::{Mat3, Vec3};

use crate::compound::{Compound, Element};
use crate::distance::DistanceField;
use crate::envelope::Envelope;
use crate::error::SceneError;
use crate::object::Object;
use crate::plane::Plane;
use crate::properties::Properties;
use crate::scene::Scene;
use crate::sdf::Sdf;
use crate::sphere::Sphere;
use crate::squaroid::Squaroid;
use crate::texture::Texture;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDesc {
    pub threads: Option<usize>,
    pub image_width: Option<usize>,
    pub image_height: Option<usize>,
    pub gamma: Option<f64>,
    pub background_color: Option<[f64; 3]>,

    pub camera_position: Option<[f64; 3]>,
    pub camera_view_direction: Option<[f64; 3]>,
    pub camera_top_direction: Option<[f64; 3]>,
    pub camera_focal_length: Option<f64>,

    pub trace_depth: Option<usize>,
    pub direct_samples: Option<usize>,
    pub path_samples: Option<usize>,
    pub photon_samples: Option<usize>,
    pub photon_min_distance: Option<f64>,

    #[serde(default)]
    pub light: Vec<ObjectDesc>,
    #[serde(default)]
    pub matter: Vec<ObjectDesc>,
}

#[derive(Debug, Deserialize)]
pub struct ObjectDesc {
    #[serde(flatten)]
    pub shape: ShapeDesc,

    pub color: Option<[f64; 3]>,
    pub radiance: Option<f64>,
    pub refractive_index: Option<f64>,
    pub material: Option<String>,
    pub transparency: Option<[f64; 3]>,
    pub fresnel_reflectivity: Option<f64>,
    pub chromatic_reflectivity: Option<f64>,
    pub diffuse_reflectivity: Option<f64>,
    pub sigma: Option<f64>,
    pub texture: Option<TextureDesc>,

    pub envelope: Option<EnvelopeDesc>,
    #[serde(default)]
    pub auto_envelope: bool,

    #[serde(default)]
    pub transforms: Vec<TransformDesc>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeDesc {
    Plane,
    Sphere {
        radius: f64,
    },
    Ellipsoid {
        rx: f64,
        ry: f64,
        rz: f64,
    },
    Cylinder {
        rx: f64,
        ry: f64,
    },
    Cone {
        rx: f64,
        ry: f64,
        rz: f64,
    },
    Hyperboloid1 {
        rx: f64,
        ry: f64,
        rz: f64,
    },
    Hyperboloid2 {
        rx: f64,
        ry: f64,
        rz: f64,
    },
    Squaroid {
        a: f64,
        b: f64,
        c: f64,
        r: f64,
    },
    Torus {
        radius1: f64,
        radius2: f64,
    },
    Sdf {
        field: SdfDesc,
        #[serde(default = "default_cycles")]
        cycles: usize,
        #[serde(default = "default_inv_scale")]
        inv_scale: f64,
    },
    Intersection {
        a: Box<ObjectDesc>,
        b: Box<ObjectDesc>,
    },
    Union {
        a: Box<ObjectDesc>,
        b: Box<ObjectDesc>,
    },
    Not {
        inner: Box<ObjectDesc>,
    },
    Stretch {
        inner: Box<ObjectDesc>,
        factors: [f64; 3],
    },
    Group {
        objects: Vec<ObjectDesc>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SdfDesc {
    Sphere,
    Torus { ring: f64 },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextureDesc {
    Plain {
        color: [f64; 3],
    },
    Checker {
        color1: [f64; 3],
        color2: [f64; 3],
        #[serde(default = "default_inv_scale")]
        scale: f64,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvelopeDesc {
    pub pos: [f64; 3],
    pub radius: f64,
}

/// One affine step; steps apply in the order they are listed. Rotation
/// angles are in degrees.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformDesc {
    Move([f64; 3]),
    RotateX(f64),
    RotateY(f64),
    RotateZ(f64),
    Scale(f64),
}

fn default_cycles() -> usize {
    200
}

fn default_inv_scale() -> f64 {
    1.0
}

fn vec3(v: [f64; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

/// Read and build a scene from a file.
pub fn load_scene(path: impl AsRef<Path>) -> Result<Scene, SceneError> {
    let text = fs::read_to_string(path)?;
    let desc: SceneDesc = serde_json::from_str(&text)?;
    build_scene(&desc)
}

pub fn build_scene(desc: &SceneDesc) -> Result<Scene, SceneError> {
    let mut scene = Scene::default();

    if let Some(v) = desc.threads {
        scene.threads = v;
    }
    if let Some(v) = desc.image_width {
        scene.image_width = v;
    }
    if let Some(v) = desc.image_height {
        scene.image_height = v;
    }
    if let Some(v) = desc.gamma {
        scene.gamma = v;
    }
    if let Some(v) = desc.background_color {
        scene.background_color = vec3(v);
    }
    if let Some(v) = desc.camera_position {
        scene.camera_position = vec3(v);
    }
    if let Some(v) = desc.camera_view_direction {
        scene.camera_view_direction = vec3(v);
    }
    if let Some(v) = desc.camera_top_direction {
        scene.camera_top_direction = vec3(v);
    }
    if let Some(v) = desc.camera_focal_length {
        scene.camera_focal_length = v;
    }
    if let Some(v) = desc.trace_depth {
        scene.trace_depth = v;
    }
    if let Some(v) = desc.direct_samples {
        scene.direct_samples = v;
    }
    if let Some(v) = desc.path_samples {
        scene.path_samples = v;
    }
    if let Some(v) = desc.photon_samples {
        scene.photon_samples = v;
    }
    if let Some(v) = desc.photon_min_distance {
        scene.photon_min_distance = v;
    }

    if scene.image_width == 0 || scene.image_height == 0 {
        return Err(SceneError::invalid("image dimensions must be positive"));
    }
    if scene.gamma <= 0.0 {
        return Err(SceneError::invalid("gamma must be positive"));
    }
    if scene.camera_focal_length <= 0.0 {
        return Err(SceneError::invalid("focal length must be positive"));
    }
    if scene.camera_view_direction.norm2() == 0.0 {
        return Err(SceneError::invalid("camera view direction must not be zero"));
    }
    if scene
        .camera_view_direction
        .cross(&scene.camera_top_direction)
        .norm2()
        == 0.0
    {
        return Err(SceneError::invalid(
            "camera top direction must not be parallel to the view direction",
        ));
    }

    for od in &desc.light {
        scene.light.push(build_element(od)?);
    }
    for od in &desc.matter {
        scene.matter.push(build_element(od)?);
    }

    for l in scene.light.flatten() {
        if l.properties().radiance <= 0.0 {
            return Err(SceneError::invalid(
                "light sources must have positive radiance",
            ));
        }
        if let Some(tx) = &l.properties().texture {
            if tx.plain_color().is_none() {
                return Err(SceneError::invalid(
                    "light sources only support plain color textures",
                ));
            }
        }
    }

    Ok(scene)
}

/// Build one light/matter entry: a plain object, or a nested group.
pub fn build_element(desc: &ObjectDesc) -> Result<Element, SceneError> {
    if let ShapeDesc::Group { objects } = &desc.shape {
        if desc.color.is_some()
            || desc.radiance.is_some()
            || desc.refractive_index.is_some()
            || desc.material.is_some()
            || desc.transparency.is_some()
            || desc.texture.is_some()
            || desc.auto_envelope
        {
            return Err(SceneError::invalid(
                "groups carry no surface fields; set them on the members",
            ));
        }

        let mut group = Compound::new();
        if let Some(env) = &desc.envelope {
            group.envelope = Some(build_envelope(env)?);
        }
        for od in objects {
            group.push(build_element(od)?);
        }

        for t in &desc.transforms {
            match t {
                TransformDesc::Move(v) => group.translate(vec3(*v)),
                TransformDesc::RotateX(a) => group.rotate(&Mat3::rot_x(a.to_radians())),
                TransformDesc::RotateY(a) => group.rotate(&Mat3::rot_y(a.to_radians())),
                TransformDesc::RotateZ(a) => group.rotate(&Mat3::rot_z(a.to_radians())),
                TransformDesc::Scale(f) => {
                    if *f == 0.0 {
                        return Err(SceneError::invalid("scale factor must not be zero"));
                    }
                    group.scale(*f);
                }
            }
        }

        return Ok(Element::Group(group));
    }

    Ok(Element::Object(build_object(desc)?))
}

/// Build a single object tree from its description.
pub fn build_object(desc: &ObjectDesc) -> Result<Object, SceneError> {
    let mut obj = build_shape(&desc.shape)?;
    apply_surface(&mut obj, desc)?;
    Ok(obj)
}

fn build_shape(shape: &ShapeDesc) -> Result<Object, SceneError> {
    let radii_positive = |radii: &[f64]| {
        if radii.iter().any(|r| *r <= 0.0) {
            Err(SceneError::invalid("radii must be positive"))
        } else {
            Ok(())
        }
    };

    let obj = match shape {
        ShapeDesc::Plane => Object::Plane(Plane::new(Properties::default())),
        ShapeDesc::Sphere { radius } => {
            radii_positive(&[*radius])?;
            Object::Sphere(Sphere::new(Properties::default(), *radius))
        }
        ShapeDesc::Ellipsoid { rx, ry, rz } => {
            radii_positive(&[*rx, *ry, *rz])?;
            Object::Squaroid(Squaroid::ellipsoid(Properties::default(), *rx, *ry, *rz))
        }
        ShapeDesc::Cylinder { rx, ry } => {
            radii_positive(&[*rx, *ry])?;
            Object::Squaroid(Squaroid::cylinder(Properties::default(), *rx, *ry))
        }
        ShapeDesc::Cone { rx, ry, rz } => {
            radii_positive(&[*rx, *ry, *rz])?;
            Object::Squaroid(Squaroid::cone(Properties::default(), *rx, *ry, *rz))
        }
        ShapeDesc::Hyperboloid1 { rx, ry, rz } => {
            radii_positive(&[*rx, *ry, *rz])?;
            Object::Squaroid(Squaroid::hyperboloid1(Properties::default(), *rx, *ry, *rz))
        }
        ShapeDesc::Hyperboloid2 { rx, ry, rz } => {
            radii_positive(&[*rx, *ry, *rz])?;
            Object::Squaroid(Squaroid::hyperboloid2(Properties::default(), *rx, *ry, *rz))
        }
        ShapeDesc::Squaroid { a, b, c, r } => {
            Object::Squaroid(Squaroid::new(Properties::default(), *a, *b, *c, *r))
        }
        ShapeDesc::Torus { radius1, radius2 } => {
            radii_positive(&[*radius1, *radius2])?;
            let mut obj = Object::Distance(DistanceField::new(
                Properties::default(),
                Sdf::Torus {
                    ring: radius2 / radius1,
                },
            ));
            obj.scale(*radius1);
            obj.properties_mut().envelope =
                Some(Envelope::new(Vec3::zero(), (radius1 + radius2) * 1.01));
            obj
        }
        ShapeDesc::Sdf {
            field,
            cycles,
            inv_scale,
        } => {
            let field = match field {
                SdfDesc::Sphere => Sdf::Sphere,
                SdfDesc::Torus { ring } => Sdf::Torus { ring: *ring },
            };
            let mut df = DistanceField::new(Properties::default(), field);
            df.cycles = *cycles;
            df.inv_scale = *inv_scale;
            Object::Distance(df)
        }
        ShapeDesc::Intersection { a, b } => {
            Object::intersection(build_csg_child(a)?, build_csg_child(b)?)
        }
        ShapeDesc::Union { a, b } => Object::union(build_csg_child(a)?, build_csg_child(b)?),
        ShapeDesc::Not { inner } => Object::negation(build_csg_child(inner)?),
        ShapeDesc::Stretch { inner, factors } => {
            Object::stretch(build_csg_child(inner)?, vec3(*factors))
        }
        ShapeDesc::Group { .. } => {
            return Err(SceneError::invalid(
                "a group cannot be composed; compose its members instead",
            ))
        }
    };

    Ok(obj)
}

fn build_csg_child(desc: &ObjectDesc) -> Result<Object, SceneError> {
    build_object(desc)
}

fn build_envelope(desc: &EnvelopeDesc) -> Result<Envelope, SceneError> {
    if desc.radius < 0.0 {
        return Err(SceneError::invalid("envelope radius must not be negative"));
    }
    Ok(Envelope::new(vec3(desc.pos), desc.radius))
}

fn unit_range(value: f64, what: &str) -> Result<f64, SceneError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SceneError::invalid(format!("{what} must be in [0, 1]")));
    }
    Ok(value)
}

fn apply_surface(obj: &mut Object, desc: &ObjectDesc) -> Result<(), SceneError> {
    if let Some(name) = &desc.material {
        if !obj.properties_mut().set_material(name) {
            return Err(SceneError::invalid(format!("unknown material {name:?}")));
        }
    }

    if let Some(c) = desc.color {
        obj.properties_mut().color = vec3(c);
    }
    if let Some(r) = desc.radiance {
        if r < 0.0 {
            return Err(SceneError::invalid("radiance must not be negative"));
        }
        obj.properties_mut().radiance = r;
    }
    if let Some(n) = desc.refractive_index {
        if n < 1.0 {
            return Err(SceneError::invalid("refractive index must be at least 1"));
        }
        obj.properties_mut().set_refractive_index(n);
    }
    if let Some(t) = desc.transparency {
        for ch in t {
            unit_range(ch, "transparency")?;
        }
        obj.properties_mut().transparency = vec3(t);
    }
    if let Some(v) = desc.fresnel_reflectivity {
        obj.properties_mut().fresnel_reflectivity = unit_range(v, "fresnel_reflectivity")?;
    }
    if let Some(v) = desc.chromatic_reflectivity {
        obj.properties_mut().chromatic_reflectivity = unit_range(v, "chromatic_reflectivity")?;
    }
    if let Some(v) = desc.diffuse_reflectivity {
        obj.properties_mut().diffuse_reflectivity = unit_range(v, "diffuse_reflectivity")?;
    }
    if let Some(v) = desc.sigma {
        if v < 0.0 {
            return Err(SceneError::invalid("sigma must not be negative"));
        }
        obj.properties_mut().sigma = v;
    }

    if let Some(tx) = &desc.texture {
        obj.properties_mut().texture = Some(match tx {
            TextureDesc::Plain { color } => Texture::Plain {
                color: vec3(*color),
            },
            TextureDesc::Checker {
                color1,
                color2,
                scale,
            } => Texture::Checker {
                color1: vec3(*color1),
                color2: vec3(*color2),
                scale: *scale,
            },
        });
    }

    for t in &desc.transforms {
        match t {
            TransformDesc::Move(v) => obj.translate(vec3(*v)),
            TransformDesc::RotateX(a) => obj.rotate(&Mat3::rot_x(a.to_radians())),
            TransformDesc::RotateY(a) => obj.rotate(&Mat3::rot_y(a.to_radians())),
            TransformDesc::RotateZ(a) => obj.rotate(&Mat3::rot_z(a.to_radians())),
            TransformDesc::Scale(f) => {
                if *f == 0.0 {
                    return Err(SceneError::invalid("scale factor must not be zero"));
                }
                obj.scale(*f);
            }
        }
    }

    // envelopes are given in final (post-transform) coordinates
    if let Some(env) = &desc.envelope {
        obj.properties_mut().envelope = Some(build_envelope(env)?);
    }
    if desc.auto_envelope {
        obj.set_auto_envelope();
    }

    Ok(())
}
