mod ear_clip;
mod room_mesh;
mod wall_mesh;

pub use ear_clip::EarClip;
pub use room_mesh::RoomMesh;
pub use wall_mesh::{flatten_box_chain, BOX_TRIANGLES};

use crate::math::{Point2, Point3, Vector3};

/// A flattened triangle mesh, ready to hand to a renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals.
    pub normals: Vec<Vector3>,
    /// UV coordinates.
    pub uvs: Vec<Point2>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Returns `true` if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
