use crate::Vec3;

/// A 3×3 matrix stored as three row vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3 {
    pub x: Vec3,
    pub y: Vec3,
    pub z: Vec3,
}

impl Mat3 {
    pub fn new(x: Vec3, y: Vec3, z: Vec3) -> Self {
        Mat3 { x, y, z }
    }

    /// The identity matrix.
    pub fn identity() -> Self {
        Mat3::new(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        )
    }

    /// `self * v`.
    pub fn mul_vec(&self, v: Vec3) -> Vec3 {
        Vec3::new(self.x.dot(&v), self.y.dot(&v), self.z.dot(&v))
    }

    /// `transposed(self) * v`, without materializing the transpose.
    pub fn tmul_vec(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.x.x * v.x + self.y.x * v.y + self.z.x * v.z,
            self.x.y * v.x + self.y.y * v.y + self.z.y * v.z,
            self.x.z * v.x + self.y.z * v.y + self.z.z * v.z,
        )
    }

    /// Apply `self` to each row of `m`. Rotating a frame matrix rotates every
    /// axis it stores.
    pub fn mul_mat(&self, m: &Mat3) -> Mat3 {
        Mat3::new(self.mul_vec(m.x), self.mul_vec(m.y), self.mul_vec(m.z))
    }

    /// Rotation around the x axis by `a` radians.
    pub fn rot_x(a: f64) -> Self {
        let (sa, ca) = (a.sin(), a.cos());
        Mat3::new(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, ca, -sa),
            Vec3::new(0.0, sa, ca),
        )
    }

    /// Rotation around the y axis by `a` radians.
    pub fn rot_y(a: f64) -> Self {
        let (sa, ca) = (a.sin(), a.cos());
        Mat3::new(
            Vec3::new(ca, 0.0, sa),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(-sa, 0.0, ca),
        )
    }

    /// Rotation around the z axis by `a` radians.
    pub fn rot_z(a: f64) -> Self {
        let (sa, ca) = (a.sin(), a.cos());
        Mat3::new(
            Vec3::new(ca, -sa, 0.0),
            Vec3::new(sa, ca, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        )
    }

    pub fn transposed(&self) -> Self {
        Mat3::new(
            Vec3::new(self.x.x, self.y.x, self.z.x),
            Vec3::new(self.x.y, self.y.y, self.z.y),
            Vec3::new(self.x.z, self.y.z, self.z.z),
        )
    }

    /// Canonical orthonormal frame with the z row parallel to `v`.
    pub fn frame_z(v: Vec3) -> Self {
        let z = v.of_length(1.0);
        let x = v.canonical_orthonormal();
        let y = z.cross(&x);
        Mat3::new(x, y, z)
    }

    /// Canonical orthonormal frame with the y row parallel to `v`.
    pub fn frame_y(v: Vec3) -> Self {
        let y = v.of_length(1.0);
        let z = v.canonical_orthonormal();
        let x = y.cross(&z);
        Mat3::new(x, y, z)
    }
}
