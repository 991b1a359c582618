use crate::error::Result;
use crate::math::{up, Point2};
use crate::topology::{RoomId, WallGraph};

use super::TriangleMesh;

/// Builds the floor mesh of a room from its stored triangulation.
pub struct RoomMesh {
    room: RoomId,
    texels_per_unit: f64,
}

impl RoomMesh {
    /// Creates a new `RoomMesh` operation.
    #[must_use]
    pub fn new(room: RoomId, texels_per_unit: f64) -> Self {
        Self {
            room,
            texels_per_unit,
        }
    }

    /// Executes the operation.
    ///
    /// Vertices are the room's boundary nodes in traversal order, so the
    /// stored triangle indices address them directly. Normals face up and
    /// UVs are planar XY scaled by the texel factor.
    ///
    /// # Errors
    ///
    /// Returns an error if the room or one of its nodes does not exist.
    pub fn execute(&self, graph: &WallGraph) -> Result<TriangleMesh> {
        let room = graph.room(self.room)?;
        let mut mesh = TriangleMesh::default();
        for &node in room.nodes() {
            let p = graph.node(node)?.position;
            mesh.vertices.push(p);
            mesh.normals.push(up());
            mesh.uvs
                .push(Point2::new(p.x * self.texels_per_unit, p.y * self.texels_per_unit));
        }
        mesh.indices.clone_from(&room.triangles);
        Ok(mesh)
    }
}
