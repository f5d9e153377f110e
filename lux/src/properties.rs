use geo::{Mat3, Vec3};

use crate::color::Color;
use crate::envelope::Envelope;
use crate::texture::Texture;

/// Surface and material parameters shared by every geometric object.
///
/// The reflectivity weights are independent factors applied to successive
/// energy residuals: `fresnel_reflectivity` scales the Fresnel term,
/// `chromatic_reflectivity` takes its share of what remains, and
/// `diffuse_reflectivity` weighs the diffuse response of the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct Properties {
    /// Reference position of the object.
    pub pos: Vec3,
    /// Local orthonormal frame, stored as rows.
    pub axes: Mat3,
    pub color: Color,
    pub texture: Option<Texture>,

    /// Isotropic radiance; greater than 0 marks an active light source.
    pub radiance: f64,
    /// Refractive index, at least 1. Exactly 1 means no Fresnel response.
    pub refractive_index: f64,

    pub fresnel_reflectivity: f64,
    pub chromatic_reflectivity: f64,
    pub diffuse_reflectivity: f64,
    /// Roughness of the diffuse response (Oren-Nayar sigma).
    pub sigma: f64,

    /// Per-channel transmission factor of the material.
    pub transparency: Color,

    pub envelope: Option<Envelope>,
}

impl Default for Properties {
    fn default() -> Self {
        Properties {
            pos: Vec3::zero(),
            axes: Mat3::identity(),
            color: Color::new(0.7, 0.7, 0.7),
            texture: None,
            radiance: 0.0,
            refractive_index: 1.0,
            fresnel_reflectivity: 1.0,
            chromatic_reflectivity: 0.0,
            diffuse_reflectivity: 1.0,
            sigma: 0.0,
            transparency: Color::zero(),
            envelope: None,
        }
    }
}

impl Properties {
    pub fn translate(&mut self, v: Vec3) {
        self.pos += v;
        if let Some(env) = &mut self.envelope {
            env.translate(v);
        }
    }

    pub fn rotate(&mut self, mat: &Mat3) {
        self.axes = mat.mul_mat(&self.axes);
        self.pos = mat.mul_vec(self.pos);
        if let Some(env) = &mut self.envelope {
            env.rotate(mat);
        }
    }

    pub fn scale(&mut self, fac: f64) {
        self.pos *= fac;
        if let Some(env) = &mut self.envelope {
            env.scale(fac);
        }
    }

    /// Index 1.0 disables the Fresnel response entirely.
    pub fn set_refractive_index(&mut self, n: f64) {
        self.refractive_index = n;
        self.fresnel_reflectivity = if n == 1.0 { 0.0 } else { 1.0 };
    }

    /// Apply a named material preset. Returns `false` for unknown names.
    pub fn set_material(&mut self, name: &str) -> bool {
        match name {
            "transparent" => {
                self.refractive_index = 1.0;
                self.transparency = Color::new(1.0, 1.0, 1.0);
                self.fresnel_reflectivity = 1.0;
                self.chromatic_reflectivity = 0.0;
                self.diffuse_reflectivity = 0.0;
            }
            "glass" => {
                // fused silica; transparency varies strongly by glass type
                self.refractive_index = 1.46;
                self.transparency = Color::new(0.8, 0.9, 0.9);
                self.fresnel_reflectivity = 1.0;
                self.chromatic_reflectivity = 0.0;
                self.diffuse_reflectivity = 0.0;
            }
            "water" => {
                self.refractive_index = 1.32;
                self.transparency = Color::new(0.5, 0.9, 0.99);
                self.fresnel_reflectivity = 1.0;
                self.chromatic_reflectivity = 0.0;
                self.diffuse_reflectivity = 0.0;
            }
            "sapphire" => {
                self.refractive_index = 1.76;
                self.transparency = Color::new(0.7, 0.7, 0.7);
                self.fresnel_reflectivity = 1.0;
                self.chromatic_reflectivity = 0.0;
                self.diffuse_reflectivity = 0.0;
            }
            "diamond" => {
                self.refractive_index = 2.42;
                self.transparency = Color::new(0.8, 0.8, 0.8);
                self.fresnel_reflectivity = 1.0;
                self.chromatic_reflectivity = 0.0;
                self.diffuse_reflectivity = 0.0;
            }
            "diffuse" => {
                self.refractive_index = 1.0;
                self.transparency = Color::zero();
                self.fresnel_reflectivity = 0.0;
                self.chromatic_reflectivity = 0.0;
                self.diffuse_reflectivity = 1.0;
                self.sigma = 0.29;
            }
            "diffuse_polished" => {
                self.refractive_index = 1.5;
                self.transparency = Color::zero();
                self.fresnel_reflectivity = 1.0;
                self.chromatic_reflectivity = 0.0;
                self.diffuse_reflectivity = 1.0;
                self.sigma = 0.29;
            }
            "perfect_mirror" => {
                self.refractive_index = 1.0;
                self.transparency = Color::zero();
                self.color = Color::new(1.0, 1.0, 1.0);
                self.fresnel_reflectivity = 0.0;
                self.chromatic_reflectivity = 1.0;
                self.diffuse_reflectivity = 0.0;
            }
            "mirror" => {
                self.refractive_index = 1.0;
                self.transparency = Color::zero();
                self.color = Color::new(0.92, 0.94, 0.87);
                self.fresnel_reflectivity = 0.0;
                self.chromatic_reflectivity = 1.0;
                self.diffuse_reflectivity = 0.0;
            }
            "gold" => {
                self.refractive_index = 1.0;
                self.transparency = Color::zero();
                self.color = Color::new(0.83, 0.69, 0.22);
                self.fresnel_reflectivity = 0.0;
                self.chromatic_reflectivity = 1.0;
                self.diffuse_reflectivity = 0.0;
            }
            "silver" => {
                self.refractive_index = 1.0;
                self.transparency = Color::zero();
                self.color = Color::new(0.8, 0.8, 0.8);
                self.fresnel_reflectivity = 0.0;
                self.chromatic_reflectivity = 1.0;
                self.diffuse_reflectivity = 0.0;
            }
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = Properties::default();

        assert_eq!(p.refractive_index, 1.0);
        assert_eq!(p.diffuse_reflectivity, 1.0);
        assert_eq!(p.color, Color::new(0.7, 0.7, 0.7));
        assert_eq!(p.axes, Mat3::identity());
    }

    #[test]
    fn test_set_refractive_index() {
        let mut p = Properties::default();

        p.set_refractive_index(1.5);
        assert_eq!(p.fresnel_reflectivity, 1.0);

        p.set_refractive_index(1.0);
        assert_eq!(p.fresnel_reflectivity, 0.0);
    }

    #[test]
    fn test_material_presets() {
        let mut p = Properties::default();

        assert!(p.set_material("glass"));
        assert_eq!(p.refractive_index, 1.46);
        assert_eq!(p.diffuse_reflectivity, 0.0);

        assert!(p.set_material("gold"));
        assert_eq!(p.chromatic_reflectivity, 1.0);
        assert_eq!(p.color, Color::new(0.83, 0.69, 0.22));

        assert!(p.set_material("diffuse"));
        assert_eq!(p.sigma, 0.29);

        assert!(!p.set_material("plutonium"));
    }

    #[test]
    fn test_rotate_carries_frame_position_and_envelope() {
        let mut p = Properties {
            pos: Vec3::new(1.0, 0.0, 0.0),
            envelope: Some(Envelope::new(Vec3::new(1.0, 0.0, 0.0), 2.0)),
            ..Properties::default()
        };

        p.rotate(&Mat3::rot_z(std::f64::consts::FRAC_PI_2));

        assert!(p.pos.dist(&Vec3::new(0.0, 1.0, 0.0)) < 1e-9);
        let env = p.envelope.unwrap();
        assert!(env.pos.dist(&Vec3::new(0.0, 1.0, 0.0)) < 1e-9);
        assert!(p.axes.x.dist(&Vec3::new(0.0, 1.0, 0.0)) < 1e-9);
    }
}
