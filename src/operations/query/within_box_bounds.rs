use crate::error::Result;
use crate::math::{Point3, Vector3};
use crate::topology::{WallGraph, WallId};

const MARGIN_FACTOR: f64 = 1.1;

/// Approximate test of whether an object lies within one of a wall's
/// boxes.
///
/// For each box, the distances from `point` to the box's four left-side
/// corners are compared with the box's left diagonal inflated by the
/// object's larger horizontal half-extent times 1.1. The object is
/// judged inside when no corner distance exceeds that threshold for some
/// box. A `false` result is reliable; a `true` result means "likely
/// inside".
pub struct WithinBoxBounds {
    wall: WallId,
    point: Point3,
    extents: Vector3,
}

impl WithinBoxBounds {
    /// Creates a new `WithinBoxBounds` query.
    #[must_use]
    pub fn new(wall: WallId, point: Point3, extents: Vector3) -> Self {
        Self {
            wall,
            point,
            extents,
        }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall does not exist.
    pub fn execute(&self, graph: &WallGraph) -> Result<bool> {
        let wall = graph.wall(self.wall)?;
        let margin = self.extents.x.max(self.extents.y) * MARGIN_FACTOR;

        Ok(wall.box_chain.iter().any(|wall_box| {
            let threshold = wall_box.left_diagonal() + margin;
            wall_box
                .left_corners()
                .iter()
                .all(|corner| (corner - self.point).norm() <= threshold)
        }))
    }
}
