use crate::math::Point3;

use super::wall::WallId;

slotmap::new_key_type! {
    /// Unique identifier for a wall node in the graph.
    pub struct NodeId;
}

/// A shared wall endpoint.
///
/// `incident` is the node's rotation system: the walls touching this node,
/// sorted by the polar angle of each wall's direction as seen from here.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// The 3D position of the node.
    pub position: Point3,
    /// Incident walls, sorted counter-clockwise by angle.
    pub incident: Vec<WallId>,
}

impl NodeData {
    /// Creates a node with no incident walls.
    #[must_use]
    pub fn new(position: Point3) -> Self {
        Self {
            position,
            incident: Vec::new(),
        }
    }

    /// Returns `true` if `wall` is in this node's incident list.
    #[must_use]
    pub fn is_connected_to(&self, wall: WallId) -> bool {
        self.incident.contains(&wall)
    }
}
