pub mod fresnel;
pub mod mat3;
pub mod plane;
pub mod ray;
pub mod sphere;
pub mod vec2;
pub mod vec3;

pub use mat3::Mat3;
pub use ray::{Ray, RayCone};
pub use vec2::Vec2;
pub use vec3::Vec3;

/// Shell thickness simulated around every surface. Hit offsets are shortened
/// by this amount so that continuation rays start just off the boundary.
pub const EPS: f64 = 1e-6;

/// Numerical horizon: distances beyond this count as a miss.
pub const MAG: f64 = 1e30;
