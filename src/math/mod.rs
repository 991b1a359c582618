pub mod intersect_2d;
pub mod polygon_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Default threshold for treating two directions as parallel.
///
/// Two unit directions are parallel when `|a · b| >= 1 - ANGULAR_EPSILON`.
pub const ANGULAR_EPSILON: f64 = 1e-4;

/// The world up direction. Walls stand on planes of constant Z.
#[must_use]
pub fn up() -> Vector3 {
    Vector3::z()
}
