//! Energy partition at a refractive boundary, averaged over s- and
//! p-polarization.

use crate::Vec3;

/// Result of splitting a ray at a refractive boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Fresnel {
    pub reflectance: f64,
    pub transmittance: f64,
    pub reflected: Vec3,
    pub transmitted: Vec3,
}

/// Reflectance for a ray entering a medium of refractive index `n` under the
/// incident angle with cosine `cos_ai` (against the surface normal).
pub fn reflectance(cos_ai: f64, n: f64) -> f64 {
    let cos_ai = cos_ai.min(1.0);
    let sin_ai = (1.0 - cos_ai * cos_ai).sqrt();
    let sin_at = sin_ai / n;
    let cos_at = (1.0 - sin_at * sin_at).sqrt();

    let rs = ((cos_ai - n * cos_at) / (cos_ai + n * cos_at)).powi(2);
    let rp = ((cos_at - n * cos_ai) / (cos_at + n * cos_ai)).powi(2);

    (rs + rp) * 0.5
}

/// Split the incident direction `dir` at the surface with unit normal `nor`
/// into a reflected and a transmitted direction with their energy weights.
///
/// `trix` is the transition ratio of refractive indices along the ray,
/// `n_ahead / n_behind`; it is greater than 1 when entering a denser medium.
/// The orientation of `nor` does not matter. Under total internal reflection
/// the transmittance is 0 and the transmitted direction falls back to `dir`.
pub fn split(dir: Vec3, nor: Vec3, trix: f64) -> Fresnel {
    let c = dir.dot(&nor);
    let f = 1.0 / trix; // ratio of sines

    let cos_ai = c.abs().min(1.0);
    let sin_ai = (1.0 - cos_ai * cos_ai).sqrt();
    let sin_at = sin_ai * f;

    let mut reflectance = 1.0;
    let mut transmittance = 0.0;

    if sin_at < 1.0 {
        let cos_at = (1.0 - sin_at * sin_at).sqrt();
        let rs = ((f * cos_ai - cos_at) / (f * cos_ai + cos_at)).powi(2);
        let rp = ((f * cos_at - cos_ai) / (f * cos_at + cos_ai)).powi(2);
        reflectance = (rs + rp) * 0.5;
        transmittance = 1.0 - reflectance;
    }

    let reflected = dir.reflect(nor);

    let q = f * f * (1.0 - c * c);
    let transmitted = if q < 1.0 && transmittance > 0.0 {
        let b = -f * c + if c > 0.0 { (1.0 - q).sqrt() } else { -(1.0 - q).sqrt() };
        (dir * f + nor * b).of_length(1.0)
    } else {
        dir
    };

    Fresnel {
        reflectance,
        transmittance,
        reflected,
        transmitted,
    }
}
