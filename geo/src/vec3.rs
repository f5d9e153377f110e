use std::f64::consts::PI;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use rand::Rng;

/// A simple 3D vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Create a new `Vec3` with the given coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3 { x, y, z }
    }

    /// `Vec3` with everything set to 0.
    pub fn zero() -> Self {
        Vec3::new(0.0, 0.0, 0.0)
    }

    /// Calculate the distance between two `Vec3`.
    pub fn dist(&self, other: &Vec3) -> f64 {
        self.dist2(other).sqrt()
    }

    /// Calculate the squared distance between two `Vec3`.
    pub fn dist2(&self, other: &Vec3) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2)
    }

    /// Calculate the norm or length of this `Vec3`.
    pub fn norm(&self) -> f64 {
        self.norm2().sqrt()
    }

    /// Calculate the squared norm or length of this `Vec3`.
    pub fn norm2(&self) -> f64 {
        self.x.powi(2) + self.y.powi(2) + self.z.powi(2)
    }

    /// Normalize this `Vec3` so that its norm is 1.
    pub fn normalize(&mut self) {
        *self /= self.norm();
    }

    /// Return a new normalized copy of this `Vec3`.
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Return a copy scaled to length `|a|`. A negative `a` inverts the
    /// direction, the zero vector stays zero.
    pub fn of_length(self, a: f64) -> Self {
        let r2 = self.norm2();
        let f = if r2 > 0.0 { a / r2.sqrt() } else { 0.0 };
        self * f
    }

    /// Calculate the [dot product][0] between two `Vec3`.
    ///
    /// [0]: https://en.wikipedia.org/wiki/Dot_product
    pub fn dot(&self, v: &Vec3) -> f64 {
        self.x * v.x + self.y * v.y + self.z * v.z
    }

    /// Calculate the [cross product][0] between two `Vec3`.
    ///
    /// [0]: https://en.wikipedia.org/wiki/Cross_product
    pub fn cross(&self, v: &Vec3) -> Self {
        Vec3::new(
            self.y * v.z - self.z * v.y,
            self.z * v.x - self.x * v.z,
            self.x * v.y - self.y * v.x,
        )
    }

    /// Component-wise product, `self` scaled by the diagonal matrix `f`.
    pub fn mul_diag(self, f: Vec3) -> Self {
        Vec3::new(self.x * f.x, self.y * f.y, self.z * f.z)
    }

    /// Return `self` made orthonormal to `o` within the plane spanned by the
    /// two vectors.
    pub fn orthonormal_to(self, o: Vec3) -> Self {
        let on = o.of_length(1.0);
        (self - on * on.dot(&self)).of_length(1.0)
    }

    /// Canonical unit vector orthogonal to `self`.
    pub fn canonical_orthonormal(self) -> Self {
        let (xx, yy, zz) = (self.x * self.x, self.y * self.y, self.z * self.z);
        let v = Vec3::new(
            if xx <= yy && xx <= zz { 1.0 } else { 0.0 },
            if yy <= xx && yy <= zz { 1.0 } else { 0.0 },
            if zz <= xx && zz <= yy { 1.0 } else { 0.0 },
        );
        v.orthonormal_to(self)
    }

    /// Reflect `self` across the surface with unit normal `nor`. Both vectors
    /// must be normalized; the result is normalized.
    pub fn reflect(self, nor: Vec3) -> Self {
        (self - nor * (2.0 * self.dot(&nor))).of_length(1.0)
    }
}

/// Uniformly distributed direction on a spherical cap of height `h` oriented
/// towards +z (`h = 2` covers the whole sphere). Derived from Archimedes's
/// sphere-cylinder theorem.
pub fn random_sphere_cap(rng: &mut impl Rng, h: f64) -> Vec3 {
    let phi = 2.0 * PI * rng.gen::<f64>();
    let z = 1.0 - rng.gen::<f64>() * h;
    let scale = (1.0 - z * z).sqrt();
    Vec3::new(phi.sin() * scale, phi.cos() * scale, z)
}

/// Uniformly distributed direction on a symmetric belt of half-height `h`
/// around the unit sphere's equator (`h = 1` covers the whole sphere).
pub fn random_sphere_belt(rng: &mut impl Rng, h: f64) -> Vec3 {
    let phi = 2.0 * PI * rng.gen::<f64>();
    let z = (rng.gen::<f64>() * 2.0 - 1.0) * h;
    let scale = (1.0 - z * z).sqrt();
    Vec3::new(phi.sin() * scale, phi.cos() * scale, z)
}

macro_rules! impl_num_op {
    ($tr:ident, $fn:ident, $op:tt, $assign_tr:ident, $assign_fn:ident) => {
        impl $tr for Vec3 {
            type Output = Vec3;

            fn $fn(self, v: Vec3) -> Self::Output {
                Vec3::new(self.x $op v.x, self.y $op v.y, self.z $op v.z)
            }
        }

        impl $tr<f64> for Vec3 {
            type Output = Vec3;

            fn $fn(self, s: f64) -> Self::Output {
                Vec3::new(self.x $op s, self.y $op s, self.z $op s)
            }
        }

        impl $assign_tr for Vec3 {
            fn $assign_fn(&mut self, v: Vec3) {
                self.x.$assign_fn(v.x);
                self.y.$assign_fn(v.y);
                self.z.$assign_fn(v.z);
            }
        }

        impl $assign_tr<f64> for Vec3 {
            fn $assign_fn(&mut self, s: f64) {
                self.x.$assign_fn(s);
                self.y.$assign_fn(s);
                self.z.$assign_fn(s);
            }
        }
    };
}

impl_num_op!(Add, add, +, AddAssign, add_assign);
impl_num_op!(Sub, sub, -, SubAssign, sub_assign);
impl_num_op!(Mul, mul, *, MulAssign, mul_assign);
impl_num_op!(Div, div, /, DivAssign, div_assign);

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(mut self) -> Self::Output {
        self.x = -self.x;
        self.y = -self.y;
        self.z = -self.z;

        self
    }
}

impl Sum for Vec3 {
    fn sum<I: Iterator<Item = Vec3>>(iter: I) -> Self {
        iter.fold(Vec3::zero(), Add::add)
    }
}
