use std::collections::HashMap;

use tracing::{debug, error, warn};

use crate::error::{Result, TopologyError};
use crate::tessellation::EarClip;
use crate::topology::{FaceClaim, OrientedWall, RoomData, RoomId, WallGraph};

/// What a room recomputation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomUpdate {
    /// Rooms created for faces with no similar predecessor.
    pub created: Vec<RoomId>,
    /// Existing rooms rewritten in place to a similar face.
    pub updated: Vec<RoomId>,
    /// Existing rooms whose face was found again unchanged.
    pub unchanged: Vec<RoomId>,
    /// Rooms that no longer correspond to any face.
    pub removed: Vec<RoomId>,
    /// Number of non-interior faces, including the outer face.
    pub exterior_faces: usize,
}

/// Recomputes the rooms of a wall graph from scratch.
///
/// Every side of every placed wall is walked exactly once: at each node
/// the walk turns onto the next wall counter-clockwise in the rotation
/// system, and reverses along a wall whose far node has no other wall.
/// Faces winding clockwise (negative winding) are rooms. Existing rooms
/// are matched to the new faces so that room numbers stay stable.
///
/// All faces are traced before anything is written, so a failed pass
/// leaves the rooms and wall sides as they were.
pub struct UpdateRooms {
    keep_colinear: bool,
}

impl Default for UpdateRooms {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateRooms {
    /// Creates a new `UpdateRooms` operation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keep_colinear: true,
        }
    }

    /// Whether colinear vertices are kept when triangulating room floors.
    #[must_use]
    pub fn keep_colinear(mut self, keep: bool) -> Self {
        self.keep_colinear = keep;
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::Inconsistent` if the rotation system
    /// disagrees with the walls' nodes, if a wall side would belong to two
    /// faces, or if a face is not anchored at its lowest-numbered wall.
    pub fn execute(&self, graph: &mut WallGraph) -> Result<RoomUpdate> {
        debug!(walls = graph.placed_walls().len(), "searching rooms");

        let faces = match trace_faces(graph) {
            Ok(faces) => faces,
            Err(e) => {
                error!(error = %e, "room search aborted");
                return Err(e);
            }
        };

        let update = self.apply(graph, faces)?;
        debug!(
            created = update.created.len(),
            updated = update.updated.len(),
            unchanged = update.unchanged.len(),
            removed = update.removed.len(),
            exterior = update.exterior_faces,
            "room search finished"
        );
        Ok(update)
    }

    fn apply(&self, graph: &mut WallGraph, faces: Vec<RoomData>) -> Result<RoomUpdate> {
        let mut update = RoomUpdate::default();

        let mut dirty: Vec<(u32, RoomId)> = graph.rooms().map(|(id, room)| (room.id, id)).collect();
        dirty.sort_unstable();
        let mut dirty: Vec<RoomId> = dirty.into_iter().map(|(_, id)| id).collect();

        let placed = graph.placed_walls().to_vec();
        for &wall in &placed {
            let data = graph.wall_mut(wall)?;
            data.left_face = None;
            data.right_face = None;
        }

        for mut face in faces {
            let claim = if face.is_interior() {
                FaceClaim::Room(self.reconcile(graph, &mut face, &mut dirty, &mut update)?)
            } else {
                update.exterior_faces += 1;
                FaceClaim::Exterior
            };
            for &oriented in face.walls() {
                graph.wall_mut(oriented.wall)?.set_face(oriented.forward, Some(claim));
            }
        }

        for id in dirty {
            if let Some(room) = graph.remove_room(id) {
                debug!(room_id = room.id, "room removed");
                update.removed.push(id);
            }
        }
        Ok(update)
    }

    /// Finds or creates the room for an interior face and returns its ID.
    fn reconcile(
        &self,
        graph: &mut WallGraph,
        face: &mut RoomData,
        dirty: &mut Vec<RoomId>,
        update: &mut RoomUpdate,
    ) -> Result<RoomId> {
        let mut exact = None;
        let mut best: Option<(usize, usize)> = None;
        for (k, &id) in dirty.iter().enumerate() {
            let existing = graph.room(id)?;
            if existing.same_walls(face) {
                exact = Some(k);
                break;
            }
            let shared = existing.shared_walls(face);
            if shared > 0 && best.map_or(true, |(_, most)| shared > most) {
                best = Some((k, shared));
            }
        }

        if let Some(k) = exact {
            let id = dirty.remove(k);
            let room = graph.room_mut(id)?;
            let triangles = std::mem::take(&mut room.triangles);
            face.id = room.id;
            face.triangles = triangles;
            *room = face.clone();
            debug!(room_id = face.id, walls = %face, "room unchanged");
            update.unchanged.push(id);
            return Ok(id);
        }

        face.triangles = self.triangulate(graph, face)?;
        if let Some((k, _)) = best {
            let id = dirty.remove(k);
            let room = graph.room_mut(id)?;
            face.id = room.id;
            *room = face.clone();
            debug!(room_id = face.id, walls = %face, winding = face.winding(), "room updated");
            update.updated.push(id);
            Ok(id)
        } else {
            face.id = graph.allocate_room_number();
            let id = graph.add_room(face.clone());
            debug!(room_id = face.id, walls = %face, winding = face.winding(), "room created");
            update.created.push(id);
            Ok(id)
        }
    }

    /// Triangulates a face over its strict loop. The returned indices
    /// address the face's walls.
    fn triangulate(&self, graph: &WallGraph, face: &RoomData) -> Result<Vec<[u32; 3]>> {
        let mut points = Vec::with_capacity(face.loop_indices().len());
        for node in face.loop_nodes() {
            points.push(graph.node(node)?.position);
        }

        let triangles = match EarClip::new(&points)
            .keep_colinear(self.keep_colinear)
            .execute()
        {
            Ok(triangles) => triangles,
            Err(e) => {
                warn!(room = %face, error = %e, "room floor triangulation failed");
                return Ok(Vec::new());
            }
        };

        let map = |i: u32| {
            face.loop_indices()
                .get(i as usize)
                .and_then(|&w| u32::try_from(w).ok())
        };
        Ok(triangles
            .into_iter()
            .filter_map(|[a, b, c]| Some([map(a)?, map(b)?, map(c)?]))
            .collect())
    }
}

/// Traces every face of the graph without modifying it.
///
/// Walls are seeded in placement order, forward before backward, so each
/// face starts at its lowest-numbered wall.
fn trace_faces(graph: &WallGraph) -> Result<Vec<RoomData>> {
    let mut claims: HashMap<OrientedWall, usize> = HashMap::new();
    let mut faces = Vec::new();

    for &wall in graph.placed_walls() {
        for forward in [true, false] {
            let seed = OrientedWall::new(wall, forward);
            if claims.contains_key(&seed) {
                continue;
            }
            let face = trace_face(graph, seed, faces.len(), &mut claims)?;
            faces.push(face);
        }
    }

    if claims.len() != 2 * graph.placed_walls().len() {
        return Err(TopologyError::Inconsistent(format!(
            "{} wall sides claimed for {} walls",
            claims.len(),
            graph.placed_walls().len()
        ))
        .into());
    }
    Ok(faces)
}

fn trace_face(
    graph: &WallGraph,
    seed: OrientedWall,
    index: usize,
    claims: &mut HashMap<OrientedWall, usize>,
) -> Result<RoomData> {
    let mut face = RoomData::new(0);
    let mut current = seed;
    loop {
        if let Some(&other) = claims.get(&current) {
            return Err(TopologyError::Inconsistent(format!(
                "wall side claimed by faces {other} and {index}"
            ))
            .into());
        }
        face.push(graph, current)?;
        claims.insert(current, index);

        let next = next_wall(graph, current)?;
        if let Some(position) = face.position_of(next) {
            if position != 0 {
                return Err(TopologyError::Inconsistent(format!(
                    "face {index} re-entered at wall {position}"
                ))
                .into());
            }
            break;
        }
        current = next;
    }

    face.close(graph)?;
    if face.min_wall_index() != 0 {
        return Err(TopologyError::Inconsistent(format!(
            "face {index} is not anchored at its lowest-numbered wall"
        ))
        .into());
    }
    Ok(face)
}

/// The wall side a face walk continues on after leaving `current`.
fn next_wall(graph: &WallGraph, current: OrientedWall) -> Result<OrientedWall> {
    let node = graph.wall(current.wall)?.exit_node(current.forward);
    let Some(adjacent) = graph.find_adjacent_walls(node, current.wall)? else {
        if !graph.node(node)?.is_connected_to(current.wall) {
            return Err(TopologyError::Inconsistent(
                "wall is missing from its node's rotation system".into(),
            )
            .into());
        }
        return Ok(current.reversed());
    };

    let next = graph.wall(adjacent.right)?;
    let from_start = next.start_node == node;
    if from_start == (next.end_node == node) {
        return Err(TopologyError::Inconsistent(
            "adjacent wall must touch the node at exactly one end".into(),
        )
        .into());
    }
    Ok(OrientedWall::new(adjacent.right, from_start))
}
