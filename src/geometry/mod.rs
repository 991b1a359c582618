pub mod plane;
pub mod wall_box;

pub use plane::Plane;
pub use wall_box::WallBox;
