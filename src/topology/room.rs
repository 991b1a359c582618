use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, TopologyError};
use crate::math::polygon_2d::turning_angle;
use crate::math::up;

use super::node::NodeId;
use super::wall::{OrientedWall, WallId};
use super::WallGraph;

slotmap::new_key_type! {
    /// Unique identifier for a room in the graph.
    pub struct RoomId;
}

/// A face of the wall graph, as a boundary walk.
///
/// Walls appear in traversal order. A wall bounding the face on both
/// sides (a dangling wall or a bridge) appears twice, once per direction.
#[derive(Debug, Clone, Default)]
pub struct RoomData {
    /// Room number, stable across recomputations that update the room.
    pub id: u32,
    walls: Vec<OrientedWall>,
    wall_numbers: Vec<u32>,
    nodes: Vec<NodeId>,
    forward_indices: HashMap<WallId, usize>,
    backward_indices: HashMap<WallId, usize>,
    winding: f64,
    closed: bool,
    min_wall_index: usize,
    loop_indices: Vec<usize>,
    /// Triangles over the strict loop, as indices into [`Self::walls`]
    /// (equivalently [`Self::nodes`]). Empty unless the room is interior
    /// and triangulated.
    pub triangles: Vec<[u32; 3]>,
}

impl RoomData {
    /// Creates an empty, open face with the given room number.
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// The ordered boundary walls.
    #[must_use]
    pub fn walls(&self) -> &[OrientedWall] {
        &self.walls
    }

    /// The node each boundary wall is entered from, parallel to [`Self::walls`].
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Signed turning angle accumulated over the strict loop, in radians.
    #[must_use]
    pub fn winding(&self) -> f64 {
        self.winding
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Index into [`Self::walls`] of the first wall with the smallest id.
    #[must_use]
    pub fn min_wall_index(&self) -> usize {
        self.min_wall_index
    }

    /// Indices into [`Self::walls`] of the walls bounding this face on one
    /// side only.
    #[must_use]
    pub fn loop_indices(&self) -> &[usize] {
        &self.loop_indices
    }

    /// Entry nodes of the strict loop walls, in order.
    #[must_use]
    pub fn loop_nodes(&self) -> Vec<NodeId> {
        self.loop_indices.iter().map(|&i| self.nodes[i]).collect()
    }

    /// A closed face with clockwise winding encloses a room.
    #[must_use]
    pub fn is_interior(&self) -> bool {
        self.closed && self.winding < 0.0
    }

    /// Position of `oriented` in this face, if present.
    #[must_use]
    pub fn position_of(&self, oriented: OrientedWall) -> Option<usize> {
        let map = if oriented.forward {
            &self.forward_indices
        } else {
            &self.backward_indices
        };
        map.get(&oriented.wall).copied()
    }

    /// Appends a wall to the open face.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::Inconsistent` if the face is already closed,
    /// if the wall is already present in that direction, or if it does not
    /// start where the previous wall ended.
    pub fn push(&mut self, graph: &WallGraph, oriented: OrientedWall) -> Result<()> {
        if self.closed {
            return Err(TopologyError::Inconsistent(format!(
                "room #{} is closed and cannot grow",
                self.id
            ))
            .into());
        }
        if self.position_of(oriented).is_some() {
            return Err(TopologyError::Inconsistent(format!(
                "room #{} already contains a wall in that direction",
                self.id
            ))
            .into());
        }

        let wall = graph.wall(oriented.wall)?;
        let entry = wall.entry_node(oriented.forward);
        if let Some(last) = self.walls.last() {
            if graph.wall(last.wall)?.exit_node(last.forward) != entry {
                return Err(TopologyError::Inconsistent(format!(
                    "room #{}: wall does not continue from the previous wall",
                    self.id
                ))
                .into());
            }
        }

        let index = self.walls.len();
        if oriented.forward {
            self.forward_indices.insert(oriented.wall, index);
        } else {
            self.backward_indices.insert(oriented.wall, index);
        }
        self.walls.push(oriented);
        self.wall_numbers.push(wall.id.unwrap_or(u32::MAX));
        self.nodes.push(entry);
        Ok(())
    }

    /// Closes the face: anchors it at its minimum-id wall, extracts the
    /// strict loop and accumulates its winding.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::Inconsistent` if the walls do not form a
    /// cycle, or an error if a wall is missing or degenerate.
    pub fn close(&mut self, graph: &WallGraph) -> Result<()> {
        let Some(first) = self.walls.first() else {
            return Err(TopologyError::Inconsistent(format!("room #{} is empty", self.id)).into());
        };
        if let Some(last) = self.walls.last() {
            let exit = graph.wall(last.wall)?.exit_node(last.forward);
            if exit != graph.wall(first.wall)?.entry_node(first.forward) {
                return Err(TopologyError::Inconsistent(format!(
                    "room #{} does not return to its first node",
                    self.id
                ))
                .into());
            }
        }

        self.min_wall_index = 0;
        for (i, &number) in self.wall_numbers.iter().enumerate() {
            if number < self.wall_numbers[self.min_wall_index] {
                self.min_wall_index = i;
            }
        }

        self.loop_indices = self
            .walls
            .iter()
            .enumerate()
            .filter(|(_, w)| {
                !(self.forward_indices.contains_key(&w.wall)
                    && self.backward_indices.contains_key(&w.wall))
            })
            .map(|(i, _)| i)
            .collect();

        let mut directions = Vec::with_capacity(self.loop_indices.len());
        for &i in &self.loop_indices {
            let oriented = self.walls[i];
            let dir = graph.wall(oriented.wall)?.direction()?;
            directions.push(if oriented.forward { dir } else { -dir });
        }
        let n = directions.len();
        self.winding = (0..n)
            .map(|k| turning_angle(&directions[(k + n - 1) % n], &directions[k], &up()))
            .sum();

        self.closed = true;
        Ok(())
    }

    /// Rotation-invariant equality: same walls in the same directions and
    /// order, compared from each face's minimum-id wall.
    #[must_use]
    pub fn same_walls(&self, other: &Self) -> bool {
        let n = self.walls.len();
        if n != other.walls.len() {
            return false;
        }
        (0..n).all(|k| {
            self.walls[(self.min_wall_index + k) % n]
                == other.walls[(other.min_wall_index + k) % n]
        })
    }

    /// Number of shared (wall, direction) entries, counted from both sides.
    #[must_use]
    pub fn shared_walls(&self, other: &Self) -> usize {
        let count = |a: &HashMap<WallId, usize>, b: &HashMap<WallId, usize>| {
            a.keys().filter(|k| b.contains_key(k)).count()
        };
        2 * count(&self.forward_indices, &other.forward_indices)
            + 2 * count(&self.backward_indices, &other.backward_indices)
    }
}

impl fmt::Display for RoomData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (w, number)) in self.walls.iter().zip(&self.wall_numbers).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}{number}", if w.forward { '+' } else { '-' })?;
        }
        Ok(())
    }
}
