use crate::geometry::WallBox;
use crate::math::{Point2, Point3, Vector3};

use super::TriangleMesh;

/// Triangles of one box over its eight corners in [`WallBox::vertices`]
/// order: bottom cap, top cap, then the four side quads.
pub const BOX_TRIANGLES: [[u32; 3]; 12] = [
    [0, 2, 1],
    [0, 3, 2],
    [4, 5, 6],
    [4, 6, 7],
    [4, 0, 1],
    [4, 1, 5],
    [5, 1, 2],
    [5, 2, 6],
    [6, 2, 3],
    [6, 3, 7],
    [7, 3, 4],
    [4, 3, 0],
];

/// Flattens a box chain into a single mesh.
///
/// Every box contributes its eight corners and the [`BOX_TRIANGLES`]
/// template offset by eight per box. A vertex's normal is its offset from
/// `start` projected onto `lateral`; its UV is its horizontal distance
/// from `start` and its height, both scaled by `texels_per_unit`.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn flatten_box_chain(
    boxes: &[WallBox],
    start: &Point3,
    lateral: &Vector3,
    texels_per_unit: f64,
) -> TriangleMesh {
    let mut mesh = TriangleMesh::default();
    mesh.vertices.reserve(boxes.len() * 8);
    mesh.indices.reserve(boxes.len() * BOX_TRIANGLES.len());

    for (k, wall_box) in boxes.iter().enumerate() {
        let offset = (k * 8) as u32;
        mesh.vertices.extend(wall_box.vertices());
        mesh.indices
            .extend(BOX_TRIANGLES.iter().map(|t| t.map(|i| i + offset)));
    }

    for v in &mesh.vertices {
        let rel = v - start;
        mesh.normals.push(lateral * rel.dot(lateral));
        let along = rel.x.hypot(rel.y);
        mesh.uvs
            .push(Point2::new((texels_per_unit * along).abs(), (texels_per_unit * v.z).abs()));
    }

    mesh
}
