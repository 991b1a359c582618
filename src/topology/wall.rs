use crate::error::Result;
use crate::geometry::WallBox;
use crate::math::polygon_2d::{left_normal, segment_direction};
use crate::math::{Point3, Vector3};

use super::node::NodeId;
use super::room::RoomId;

slotmap::new_key_type! {
    /// Unique identifier for a wall in the graph.
    pub struct WallId;
}

/// A wall with traversal direction, as it appears along a face boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrientedWall {
    /// The wall identifier.
    pub wall: WallId,
    /// If `true`, the wall is traversed start → end.
    /// If `false`, it is traversed end → start.
    pub forward: bool,
}

impl OrientedWall {
    /// Creates a new oriented wall.
    #[must_use]
    pub fn new(wall: WallId, forward: bool) -> Self {
        Self { wall, forward }
    }

    /// The same wall traversed the other way.
    #[must_use]
    pub fn reversed(self) -> Self {
        Self {
            wall: self.wall,
            forward: !self.forward,
        }
    }
}

/// The face bounding one side of a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceClaim {
    /// An interior face materialized as a room.
    Room(RoomId),
    /// A non-interior face, including the unbounded outer face.
    Exterior,
}

/// Data associated with a wall.
///
/// A wall joins two nodes and carries its solid cross-section as a chain
/// of [`WallBox`]es ordered from start to end.
#[derive(Debug, Clone)]
pub struct WallData {
    /// Placement index, assigned when the wall is placed. `None` while the
    /// wall is still being drawn.
    pub id: Option<u32>,
    pub start_node: NodeId,
    pub end_node: NodeId,
    pub start_point: Point3,
    pub end_point: Point3,
    /// Full thickness; the box corners sit half of it either side of the
    /// centreline.
    pub thickness: f64,
    pub height: f64,
    pub box_chain: Vec<WallBox>,
    /// Face on the side the lateral axis points to.
    pub left_face: Option<FaceClaim>,
    /// Face on the opposite side.
    pub right_face: Option<FaceClaim>,
}

impl WallData {
    /// Creates an unplaced wall with an empty box chain.
    #[must_use]
    pub fn new(
        start_node: NodeId,
        end_node: NodeId,
        start_point: Point3,
        end_point: Point3,
        thickness: f64,
        height: f64,
    ) -> Self {
        Self {
            id: None,
            start_node,
            end_node,
            start_point,
            end_point,
            thickness,
            height,
            box_chain: Vec::new(),
            left_face: None,
            right_face: None,
        }
    }

    /// Returns `true` once the wall has been placed.
    #[must_use]
    pub fn is_placed(&self) -> bool {
        self.id.is_some()
    }

    /// Unit direction from start to end in the XY plane.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall has zero length.
    pub fn direction(&self) -> Result<Vector3> {
        segment_direction(&self.start_point, &self.end_point)
    }

    /// Unit lateral axis, `up × direction`.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall has zero length.
    pub fn lateral(&self) -> Result<Vector3> {
        Ok(left_normal(self.direction()?))
    }

    /// Length of the wall projected onto the XY plane.
    #[must_use]
    pub fn length_2d(&self) -> f64 {
        let d = self.end_point - self.start_point;
        d.x.hypot(d.y)
    }

    /// A single box spanning the whole wall at its full height.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall has zero length.
    pub fn full_box(&self) -> Result<WallBox> {
        let half = self.lateral()? * (0.5 * self.thickness);
        Ok(WallBox::spanning(
            &self.start_point,
            &self.end_point,
            &half,
            self.start_point.z + self.height,
            self.end_point.z + self.height,
        ))
    }

    /// Replaces the box chain with a single full-span box.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall has zero length.
    pub fn reset_box_chain(&mut self) -> Result<()> {
        self.box_chain = vec![self.full_box()?];
        Ok(())
    }

    /// Highest top-corner Z over the whole box chain.
    #[must_use]
    pub fn highest_z(&self) -> f64 {
        self.box_chain
            .iter()
            .map(WallBox::top_z)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Lowest bottom-corner Z over the whole box chain.
    #[must_use]
    pub fn lowest_z(&self) -> f64 {
        self.box_chain
            .iter()
            .map(WallBox::bottom_z)
            .fold(f64::INFINITY, f64::min)
    }

    /// Node the wall is entered from when traversed in the given direction.
    #[must_use]
    pub fn entry_node(&self, forward: bool) -> NodeId {
        if forward {
            self.start_node
        } else {
            self.end_node
        }
    }

    /// Node the wall is left by when traversed in the given direction.
    #[must_use]
    pub fn exit_node(&self, forward: bool) -> NodeId {
        self.entry_node(!forward)
    }

    /// The face claimed by a traversal in the given direction.
    #[must_use]
    pub fn face(&self, forward: bool) -> Option<FaceClaim> {
        if forward {
            self.right_face
        } else {
            self.left_face
        }
    }

    /// Records the face claimed by a traversal in the given direction.
    pub fn set_face(&mut self, forward: bool, claim: Option<FaceClaim>) {
        if forward {
            self.right_face = claim;
        } else {
            self.left_face = claim;
        }
    }
}
