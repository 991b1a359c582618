mod wall_intersect;
mod within_box_bounds;

pub use wall_intersect::{WallIntersect, WallIntersection};
pub use within_box_bounds::WithinBoxBounds;
