pub mod node;
pub mod room;
pub mod wall;

pub use node::{NodeData, NodeId};
pub use room::{RoomData, RoomId};
pub use wall::{FaceClaim, OrientedWall, WallData, WallId};

use slotmap::SlotMap;
use tracing::debug;

use crate::error::{Result, TopologyError};
use crate::math::{Point3, Vector3};

/// The walls on either side of a wall within a node's rotation system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjacentWalls {
    /// Clockwise predecessor.
    pub left: WallId,
    /// Counter-clockwise successor.
    pub right: WallId,
}

/// A wall's neighbours around both of its endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallNeighbors {
    pub source_left: Option<WallId>,
    pub source_right: Option<WallId>,
    pub dest_left: Option<WallId>,
    pub dest_right: Option<WallId>,
}

/// Central arena that owns the nodes, walls and rooms of a floor plan.
///
/// Entities reference each other via typed IDs (generational indices), so
/// removing a wall or merging a node never leaves a dangling reference.
#[derive(Debug)]
pub struct WallGraph {
    nodes: SlotMap<NodeId, NodeData>,
    walls: SlotMap<WallId, WallData>,
    rooms: SlotMap<RoomId, RoomData>,
    placed: Vec<WallId>,
    node_epsilon: f64,
    next_room_id: u32,
}

impl Default for WallGraph {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl WallGraph {
    /// Creates an empty graph. Nodes closer than `node_epsilon` are the
    /// same node.
    #[must_use]
    pub fn new(node_epsilon: f64) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            walls: SlotMap::with_key(),
            rooms: SlotMap::with_key(),
            placed: Vec::new(),
            node_epsilon,
            next_room_id: 0,
        }
    }

    #[must_use]
    pub fn node_epsilon(&self) -> f64 {
        self.node_epsilon
    }

    // --- Node operations ---

    /// Inserts a node with no incident walls and returns its ID.
    pub fn add_node(&mut self, position: Point3) -> NodeId {
        self.nodes.insert(NodeData::new(position))
    }

    /// Returns a reference to the node data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn node(&self, id: NodeId) -> Result<&NodeData, TopologyError> {
        self.nodes
            .get(id)
            .ok_or(TopologyError::EntityNotFound("node"))
    }

    /// Returns a mutable reference to the node data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, TopologyError> {
        self.nodes
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("node"))
    }

    /// Removes a node, returning its data if it existed.
    pub fn remove_node(&mut self, id: NodeId) -> Option<NodeData> {
        self.nodes.remove(id)
    }

    /// Iterates over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeData)> {
        self.nodes.iter()
    }

    // --- Wall operations ---

    /// Inserts a wall and returns its ID.
    pub fn add_wall(&mut self, data: WallData) -> WallId {
        self.walls.insert(data)
    }

    /// Returns a reference to the wall data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn wall(&self, id: WallId) -> Result<&WallData, TopologyError> {
        self.walls
            .get(id)
            .ok_or(TopologyError::EntityNotFound("wall"))
    }

    /// Returns a mutable reference to the wall data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn wall_mut(&mut self, id: WallId) -> Result<&mut WallData, TopologyError> {
        self.walls
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("wall"))
    }

    /// Removes a wall and detaches it from its nodes. Nodes left without
    /// walls are removed too.
    pub fn remove_wall(&mut self, id: WallId) -> Option<WallData> {
        let data = self.walls.remove(id)?;
        for node_id in [data.start_node, data.end_node] {
            if let Some(node) = self.nodes.get_mut(node_id) {
                node.incident.retain(|&w| w != id);
                if node.incident.is_empty() {
                    self.nodes.remove(node_id);
                }
            }
        }
        self.placed.retain(|&w| w != id);
        Some(data)
    }

    /// Iterates over all walls, placed or not.
    pub fn walls(&self) -> impl Iterator<Item = (WallId, &WallData)> {
        self.walls.iter()
    }

    /// Placed walls in placement order.
    #[must_use]
    pub fn placed_walls(&self) -> &[WallId] {
        &self.placed
    }

    /// Marks a wall as placed and assigns it the next placement index.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall does not exist.
    pub fn mark_placed(&mut self, id: WallId) -> Result<u32> {
        let number = u32::try_from(self.placed.len())
            .map_err(|_| TopologyError::Inconsistent("too many walls".into()))?;
        let wall = self.wall_mut(id)?;
        if let Some(existing) = wall.id {
            return Ok(existing);
        }
        wall.id = Some(number);
        self.placed.push(id);
        Ok(number)
    }

    // --- Room operations ---

    /// Inserts a room and returns its ID.
    pub fn add_room(&mut self, data: RoomData) -> RoomId {
        self.rooms.insert(data)
    }

    /// Returns a reference to the room data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn room(&self, id: RoomId) -> Result<&RoomData, TopologyError> {
        self.rooms
            .get(id)
            .ok_or(TopologyError::EntityNotFound("room"))
    }

    /// Returns a mutable reference to the room data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn room_mut(&mut self, id: RoomId) -> Result<&mut RoomData, TopologyError> {
        self.rooms
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("room"))
    }

    /// Removes a room, returning its data if it existed.
    pub fn remove_room(&mut self, id: RoomId) -> Option<RoomData> {
        self.rooms.remove(id)
    }

    /// Iterates over all rooms.
    pub fn rooms(&self) -> impl Iterator<Item = (RoomId, &RoomData)> {
        self.rooms.iter()
    }

    /// Reserves the next room number.
    pub fn allocate_room_number(&mut self) -> u32 {
        let id = self.next_room_id;
        self.next_room_id += 1;
        id
    }

    // --- Rotation system ---

    /// Direction of `wall` as seen from `node`, in the XY plane.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::Inconsistent` if the wall touches the node at
    /// both ends or at neither, or an error if the wall has zero length.
    pub fn direction_from(&self, wall: WallId, node: NodeId) -> Result<Vector3> {
        let data = self.wall(wall)?;
        let from_start = data.start_node == node;
        let from_end = data.end_node == node;
        if from_start == from_end {
            return Err(TopologyError::Inconsistent(
                "wall must touch the node at exactly one end".into(),
            )
            .into());
        }
        let dir = data.direction()?;
        Ok(if from_start { dir } else { -dir })
    }

    /// Registers `wall` as incident to `node`.
    ///
    /// A wall already referencing the node is connected as is; otherwise
    /// whichever endpoint lies within `node_epsilon` of the node is
    /// re-parented onto it. With `auto_sort`, the rotation system is
    /// rebuilt immediately. Returns whether the wall is now connected.
    ///
    /// # Errors
    ///
    /// Returns an error if the node or wall does not exist, or if sorting
    /// fails.
    pub fn connect_wall(&mut self, node: NodeId, wall: WallId, auto_sort: bool) -> Result<bool> {
        let position = self.node(node)?.position;
        let eps = self.node_epsilon;
        let data = self.wall_mut(wall)?;
        let connected = if data.start_node == node || data.end_node == node {
            true
        } else if (data.start_point - position).norm() <= eps {
            data.start_node = node;
            true
        } else if (data.end_point - position).norm() <= eps {
            data.end_node = node;
            true
        } else {
            false
        };

        if connected {
            let node_data = self.node_mut(node)?;
            if !node_data.is_connected_to(wall) {
                node_data.incident.push(wall);
            }
            if auto_sort {
                self.sort_incident_walls(node)?;
            }
        }
        Ok(connected)
    }

    /// Sorts a node's incident walls by `atan2` of their direction as seen
    /// from the node. Ties keep their insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is missing or an incident wall does not
    /// touch it at exactly one end.
    pub fn sort_incident_walls(&mut self, node: NodeId) -> Result<()> {
        let incident = self.node(node)?.incident.clone();
        let mut keyed = Vec::with_capacity(incident.len());
        for wall in incident {
            let dir = self.direction_from(wall, node)?;
            keyed.push((dir.y.atan2(dir.x), wall));
        }
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        self.node_mut(node)?.incident = keyed.into_iter().map(|(_, w)| w).collect();
        Ok(())
    }

    /// Merges node `b` into node `a`.
    ///
    /// Every wall incident to `b` is re-parented onto `a`, `a`'s rotation
    /// system is rebuilt and `b` is discarded. Nothing happens (and
    /// `Ok(false)` is returned) if `b` no longer exists, is `a`, or lies
    /// farther than `node_epsilon` from `a`.
    ///
    /// # Errors
    ///
    /// Returns an error if `a` does not exist or sorting fails.
    pub fn merge_node(&mut self, a: NodeId, b: NodeId) -> Result<bool> {
        let target = self.node(a)?.position;
        let Some(source) = self.nodes.get(b) else {
            return Ok(false);
        };
        if a == b || (source.position - target).norm() > self.node_epsilon {
            return Ok(false);
        }

        let moved = source.incident.clone();
        for &wall in &moved {
            let data = self.wall_mut(wall)?;
            if data.start_node == b {
                data.start_node = a;
            }
            if data.end_node == b {
                data.end_node = a;
            }
        }
        let node = self.node_mut(a)?;
        for wall in moved {
            if !node.incident.contains(&wall) {
                node.incident.push(wall);
            }
        }
        self.nodes.remove(b);
        self.sort_incident_walls(a)?;
        debug!(?a, ?b, "merged nodes");
        Ok(true)
    }

    /// Returns the walls immediately clockwise (`left`) and
    /// counter-clockwise (`right`) of `wall` around `node`.
    ///
    /// `Ok(None)` if the wall is not incident to the node or is its only
    /// wall.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist.
    pub fn find_adjacent_walls(&self, node: NodeId, wall: WallId) -> Result<Option<AdjacentWalls>> {
        let sorted = &self.node(node)?.incident;
        let n = sorted.len();
        let Some(index) = sorted.iter().position(|&w| w == wall) else {
            return Ok(None);
        };
        if n < 2 {
            return Ok(None);
        }
        Ok(Some(AdjacentWalls {
            left: sorted[(index + n - 1) % n],
            right: sorted[(index + 1) % n],
        }))
    }

    /// Reports the neighbours of `wall` around its start and end nodes.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall or one of its nodes does not exist.
    pub fn wall_neighbors(&self, wall: WallId) -> Result<WallNeighbors> {
        let data = self.wall(wall)?;
        let mut neighbors = WallNeighbors::default();
        if let Some(adj) = self.find_adjacent_walls(data.start_node, wall)? {
            neighbors.source_left = Some(adj.left);
            neighbors.source_right = Some(adj.right);
        }
        if let Some(adj) = self.find_adjacent_walls(data.end_node, wall)? {
            neighbors.dest_right = Some(adj.left);
            neighbors.dest_left = Some(adj.right);
        }
        Ok(neighbors)
    }

    // --- Node lookup ---

    /// Returns the first node within `node_epsilon` of `point`, skipping
    /// the nodes in `ignore`.
    #[must_use]
    pub fn find_node_at(&self, point: &Point3, ignore: &[NodeId]) -> Option<NodeId> {
        self.nodes
            .iter()
            .filter(|(id, _)| !ignore.contains(id))
            .find(|(_, node)| (node.position - point).norm() <= self.node_epsilon)
            .map(|(id, _)| id)
    }

    /// Returns the node at `point`, creating one if none lies within
    /// `node_epsilon`.
    pub fn find_or_create_node_at(&mut self, point: &Point3) -> NodeId {
        match self.find_node_at(point, &[]) {
            Some(id) => id,
            None => self.add_node(*point),
        }
    }

    /// Merges both endpoint nodes of `wall` into any other node lying
    /// within `node_epsilon`, then rebuilds their rotation systems.
    /// Returns whether any merge happened.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall or its nodes do not exist.
    pub fn reset_wall_connectivity(&mut self, wall: WallId) -> Result<bool> {
        let mut changed = false;
        for at_start in [true, false] {
            let data = self.wall(wall)?;
            let (own, point) = if at_start {
                (data.start_node, data.start_point)
            } else {
                (data.end_node, data.end_point)
            };
            let other_end = if at_start { data.end_node } else { data.start_node };
            if let Some(existing) = self.find_node_at(&point, &[own, other_end]) {
                changed |= self.merge_node(existing, own)?;
            }
        }
        let data = self.wall(wall)?;
        let (start, end) = (data.start_node, data.end_node);
        self.sort_incident_walls(start)?;
        self.sort_incident_walls(end)?;
        Ok(changed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Adds a wall between two fresh nodes and connects both ends.
    fn add_connected_wall(graph: &mut WallGraph, a: Point3, b: Point3) -> WallId {
        let na = graph.add_node(a);
        let nb = graph.add_node(b);
        let wall = graph.add_wall(WallData::new(na, nb, a, b, 10.0, 240.0));
        graph.connect_wall(na, wall, true).unwrap();
        graph.connect_wall(nb, wall, true).unwrap();
        wall
    }

    fn pt(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    #[test]
    fn store_lookup_errors() {
        let mut graph = WallGraph::default();
        let n = graph.add_node(pt(0.0, 0.0));
        graph.remove_node(n);
        assert!(graph.node(n).is_err());
        assert!(graph.node_mut(n).is_err());
    }

    #[test]
    fn connect_reparents_nearby_endpoint() {
        let mut graph = WallGraph::new(0.1);
        let w = add_connected_wall(&mut graph, pt(0.0, 0.0), pt(10.0, 0.0));
        let hub = graph.add_node(pt(10.05, 0.0));
        assert!(graph.connect_wall(hub, w, true).unwrap());
        assert_eq!(graph.wall(w).unwrap().end_node, hub);

        let far = graph.add_node(pt(50.0, 50.0));
        assert!(!graph.connect_wall(far, w, true).unwrap());
        assert!(graph.node(far).unwrap().incident.is_empty());
    }

    #[test]
    fn connect_is_idempotent() {
        let mut graph = WallGraph::default();
        let w = add_connected_wall(&mut graph, pt(0.0, 0.0), pt(10.0, 0.0));
        let start = graph.wall(w).unwrap().start_node;
        graph.connect_wall(start, w, true).unwrap();
        assert_eq!(graph.node(start).unwrap().incident, vec![w]);
    }

    #[test]
    fn incident_walls_sorted_by_angle_from_node() {
        let mut graph = WallGraph::default();
        let east = add_connected_wall(&mut graph, pt(0.0, 0.0), pt(10.0, 0.0));
        // Ends at the hub, so seen from the hub it points north.
        let north = add_connected_wall(&mut graph, pt(0.0, 10.0), pt(0.0, 0.0));
        let west = add_connected_wall(&mut graph, pt(0.0, 0.0), pt(-10.0, 0.0));
        let south = add_connected_wall(&mut graph, pt(0.0, 0.0), pt(0.0, -10.0));

        let hub = graph.wall(east).unwrap().start_node;
        for w in [north, west, south] {
            let data = graph.wall(w).unwrap();
            let own = if data.start_point == pt(0.0, 0.0) {
                data.start_node
            } else {
                data.end_node
            };
            assert!(graph.merge_node(hub, own).unwrap());
        }

        // atan2 order: south (-pi/2), east (0), north (pi/2), west (pi).
        assert_eq!(graph.node(hub).unwrap().incident, vec![south, east, north, west]);

        let adj = graph.find_adjacent_walls(hub, east).unwrap().unwrap();
        assert_eq!(adj.left, south);
        assert_eq!(adj.right, north);
        let adj = graph.find_adjacent_walls(hub, west).unwrap().unwrap();
        assert_eq!(adj.right, south);
    }

    #[test]
    fn adjacent_walls_need_two_walls() {
        let mut graph = WallGraph::default();
        let w = add_connected_wall(&mut graph, pt(0.0, 0.0), pt(10.0, 0.0));
        let start = graph.wall(w).unwrap().start_node;
        assert!(graph.find_adjacent_walls(start, w).unwrap().is_none());
        assert_eq!(graph.wall_neighbors(w).unwrap(), WallNeighbors::default());
    }

    #[test]
    fn merge_is_idempotent() {
        let mut graph = WallGraph::new(0.1);
        let w1 = add_connected_wall(&mut graph, pt(0.0, 0.0), pt(10.0, 0.0));
        let w2 = add_connected_wall(&mut graph, pt(10.0, 0.0), pt(10.0, 10.0));
        let a = graph.wall(w1).unwrap().end_node;
        let b = graph.wall(w2).unwrap().start_node;

        assert!(graph.merge_node(a, b).unwrap());
        assert!(!graph.merge_node(a, b).unwrap());
        assert!(!graph.merge_node(a, a).unwrap());

        let incident = &graph.node(a).unwrap().incident;
        assert_eq!(incident.len(), 2);
        assert!(incident.contains(&w1) && incident.contains(&w2));
        assert_eq!(graph.wall(w2).unwrap().start_node, a);
        assert!(graph.node(b).is_err());
    }

    #[test]
    fn merge_refuses_distant_nodes() {
        let mut graph = WallGraph::new(0.1);
        let a = graph.add_node(pt(0.0, 0.0));
        let b = graph.add_node(pt(1.0, 0.0));
        assert!(!graph.merge_node(a, b).unwrap());
        assert!(graph.node(b).is_ok());
    }

    #[test]
    fn neighbors_around_corner() {
        let mut graph = WallGraph::default();
        let w1 = add_connected_wall(&mut graph, pt(0.0, 0.0), pt(10.0, 0.0));
        let w2 = add_connected_wall(&mut graph, pt(10.0, 0.0), pt(10.0, 10.0));
        assert!(graph.reset_wall_connectivity(w2).unwrap());
        let n = graph.wall_neighbors(w1).unwrap();
        assert_eq!(n.dest_left, Some(w2));
        assert_eq!(n.dest_right, Some(w2));
        assert_eq!(n.source_left, None);
    }

    #[test]
    fn find_or_create_reuses_nodes() {
        let mut graph = WallGraph::new(0.1);
        let a = graph.find_or_create_node_at(&pt(1.0, 1.0));
        let b = graph.find_or_create_node_at(&pt(1.05, 1.0));
        let c = graph.find_or_create_node_at(&pt(2.0, 1.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(graph.find_node_at(&pt(1.0, 1.0), &[a]), None);
    }

    #[test]
    fn removing_wall_drops_orphan_nodes() {
        let mut graph = WallGraph::default();
        let w = add_connected_wall(&mut graph, pt(0.0, 0.0), pt(10.0, 0.0));
        assert!(graph.remove_wall(w).is_some());
        assert_eq!(graph.nodes().count(), 0);
        assert!(graph.wall(w).is_err());
    }

    #[test]
    fn placement_numbers_are_sequential() {
        let mut graph = WallGraph::default();
        let w1 = add_connected_wall(&mut graph, pt(0.0, 0.0), pt(10.0, 0.0));
        let w2 = add_connected_wall(&mut graph, pt(0.0, 5.0), pt(10.0, 5.0));
        assert_eq!(graph.mark_placed(w1).unwrap(), 0);
        assert_eq!(graph.mark_placed(w2).unwrap(), 1);
        assert_eq!(graph.mark_placed(w1).unwrap(), 0);
        assert_eq!(graph.placed_walls(), &[w1, w2]);
    }
}
