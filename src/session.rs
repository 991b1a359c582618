use tracing::{info, warn};

use crate::config::EditorConfig;
use crate::error::{OperationError, Result};
use crate::math::{Point3, Vector3};
use crate::operations::cutting::{CutOpening, CutResult};
use crate::operations::query::{WallIntersect, WallIntersection, WithinBoxBounds};
use crate::operations::rooms::{RoomUpdate, UpdateRooms};
use crate::persist::{FloorPlanDocument, WallRecord};
use crate::tessellation::{flatten_box_chain, RoomMesh, TriangleMesh};
use crate::topology::{RoomData, RoomId, WallData, WallGraph, WallId};

/// Outcome of finishing the wall being drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// The wall was placed and the rooms recomputed.
    Placed(WallId),
    /// The wall crosses placed walls, listed by distance along it. The
    /// wall is still pending, with its previous end point.
    Intersects(Vec<WallIntersection>),
    /// The wall would be shorter than the node epsilon. The wall is still
    /// pending, with its previous end point.
    Degenerate,
}

/// A floor plan being edited.
///
/// Owns the wall graph and its rooms. At most one wall is pending (being
/// drawn) at a time; it has its own nodes and is invisible to room search
/// until it is finished.
#[derive(Debug)]
pub struct EditSession {
    graph: WallGraph,
    config: EditorConfig,
    pending: Option<WallId>,
}

impl Default for EditSession {
    fn default() -> Self {
        let config = EditorConfig::default();
        Self {
            graph: WallGraph::new(config.node_epsilon),
            config,
            pending: None,
        }
    }
}

impl EditSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty session with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_config(config: EditorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            graph: WallGraph::new(config.node_epsilon),
            config,
            pending: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn graph(&self) -> &WallGraph {
        &self.graph
    }

    #[must_use]
    pub fn pending_wall(&self) -> Option<WallId> {
        self.pending
    }

    pub fn rooms(&self) -> impl Iterator<Item = (RoomId, &RoomData)> {
        self.graph.rooms()
    }

    /// Starts drawing a zero-length wall at `origin`.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::PendingWallExists` if a wall is already
    /// being drawn.
    pub fn start_wall(&mut self, origin: Point3) -> Result<WallId> {
        if self.pending.is_some() {
            return Err(OperationError::PendingWallExists.into());
        }
        let start = self.graph.add_node(origin);
        let end = self.graph.add_node(origin);
        let wall = self.graph.add_wall(WallData::new(
            start,
            end,
            origin,
            origin,
            self.config.wall_thickness,
            self.config.wall_height,
        ));
        self.graph.connect_wall(start, wall, false)?;
        self.graph.connect_wall(end, wall, false)?;
        self.pending = Some(wall);
        Ok(wall)
    }

    /// Moves the end of the pending wall. The end stays at the start's
    /// height.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::NoPendingWall` if no wall is being drawn.
    pub fn update_pending_end(&mut self, point: Point3) -> Result<()> {
        let wall = self.pending.ok_or(OperationError::NoPendingWall)?;
        let data = self.graph.wall_mut(wall)?;
        let end = Point3::new(point.x, point.y, data.start_point.z);
        data.end_point = end;
        let node = data.end_node;
        self.graph.node_mut(node)?.position = end;
        Ok(())
    }

    /// Finishes the pending wall at `end`.
    ///
    /// A wall crossing any placed wall, or shorter than the node epsilon,
    /// is rejected and left pending. Otherwise its endpoints are merged
    /// into nearby nodes, it is placed and the rooms are recomputed.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::NoPendingWall` if no wall is being drawn.
    /// If room search fails the wall stays placed and the error is
    /// returned.
    pub fn finish_wall(&mut self, end: Point3) -> Result<Placement> {
        let wall = self.pending.ok_or(OperationError::NoPendingWall)?;
        let previous_end = self.graph.wall(wall)?.end_point;
        self.update_pending_end(end)?;

        if self.graph.wall(wall)?.length_2d() < self.config.node_epsilon {
            self.update_pending_end(previous_end)?;
            warn!(?end, "wall too short to place");
            return Ok(Placement::Degenerate);
        }

        let hits = self.intersecting_walls(wall)?;
        if !hits.is_empty() {
            for hit in &hits {
                warn!(
                    hit_wall = ?hit.hit_wall,
                    location = ?hit.location,
                    "wall placement rejected"
                );
            }
            self.update_pending_end(previous_end)?;
            return Ok(Placement::Intersects(hits));
        }

        self.pending = None;
        self.place(wall)?;
        self.update_rooms()?;
        Ok(Placement::Placed(wall))
    }

    /// Removes a wall that is still being drawn.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::PlacedWallRemoval` for a placed wall, or an
    /// error if the wall does not exist.
    pub fn remove_wall(&mut self, wall: WallId) -> Result<()> {
        if self.graph.wall(wall)?.is_placed() {
            return Err(OperationError::PlacedWallRemoval.into());
        }
        self.graph.remove_wall(wall);
        if self.pending == Some(wall) {
            self.pending = None;
        }
        Ok(())
    }

    /// Every placed wall crossed by `wall`, nearest to its start first.
    ///
    /// # Errors
    ///
    /// Returns an error if a wall does not exist.
    pub fn intersecting_walls(&self, wall: WallId) -> Result<Vec<WallIntersection>> {
        let mut hits = Vec::new();
        for &other in self.graph.placed_walls() {
            if other == wall {
                continue;
            }
            let hit = WallIntersect::new(wall, other)
                .epsilon(self.config.intersection_epsilon)
                .angular_epsilon(self.config.angular_epsilon)
                .execute(&self.graph)?;
            hits.extend(hit);
        }
        hits.sort_by(|a, b| a.dist_along_query_wall.total_cmp(&b.dist_along_query_wall));
        Ok(hits)
    }

    /// Recomputes the rooms from the placed walls.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall graph is inconsistent; the previous
    /// rooms are kept.
    pub fn update_rooms(&mut self) -> Result<RoomUpdate> {
        UpdateRooms::new()
            .keep_colinear(self.config.keep_colinear_vertices)
            .execute(&mut self.graph)
    }

    /// Cuts a window or door into a placed wall.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall does not exist or is not placed, or
    /// if the extents are not positive.
    pub fn cut_opening(
        &mut self,
        wall: WallId,
        center: Point3,
        half_extents: Vector3,
        is_door: bool,
    ) -> Result<CutResult> {
        CutOpening::new(wall, center, half_extents)
            .door(is_door)
            .texels_per_unit(self.config.texels_per_unit)
            .execute(&mut self.graph)
    }

    /// Computes what cutting an opening would produce, without changing
    /// the wall. `None` when no preview can be shown.
    #[must_use]
    pub fn preview_opening(
        &self,
        wall: WallId,
        center: Point3,
        half_extents: Vector3,
        is_door: bool,
    ) -> Option<CutResult> {
        let result = CutOpening::new(wall, center, half_extents)
            .door(is_door)
            .preview(true)
            .texels_per_unit(self.config.texels_per_unit)
            .plan(&self.graph);
        match result {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(?wall, error = %e, "opening preview failed");
                None
            }
        }
    }

    /// Approximate test of whether an object lies within a wall.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall does not exist.
    pub fn is_within_box_bounds(
        &self,
        wall: WallId,
        point: Point3,
        extents: Vector3,
    ) -> Result<bool> {
        WithinBoxBounds::new(wall, point, extents).execute(&self.graph)
    }

    /// The wall's current box chain as a mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall does not exist or has zero length.
    pub fn wall_mesh(&self, wall: WallId) -> Result<TriangleMesh> {
        let data = self.graph.wall(wall)?;
        Ok(flatten_box_chain(
            &data.box_chain,
            &data.start_point,
            &data.lateral()?,
            self.config.texels_per_unit,
        ))
    }

    /// The floor mesh of a room.
    ///
    /// # Errors
    ///
    /// Returns an error if the room does not exist.
    pub fn room_mesh(&self, room: RoomId) -> Result<TriangleMesh> {
        RoomMesh::new(room, self.config.texels_per_unit).execute(&self.graph)
    }

    /// The placed walls' endpoints in placement order.
    ///
    /// # Errors
    ///
    /// Returns an error if a placed wall is missing from the graph.
    pub fn export_document(&self) -> Result<FloorPlanDocument> {
        let mut walls = Vec::with_capacity(self.graph.placed_walls().len());
        for &wall in self.graph.placed_walls() {
            let data = self.graph.wall(wall)?;
            walls.push(WallRecord::new(&data.start_point, &data.end_point));
        }
        Ok(FloorPlanDocument { walls })
    }

    /// Recreates the document's walls in order, merging their endpoints
    /// as each is placed, then recomputes the rooms once.
    ///
    /// Walls are not checked for intersections.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::PendingWallExists` while a wall is being
    /// drawn, or `OperationError::InvalidInput` if a record is shorter than
    /// the node epsilon. Nothing is imported in either case.
    pub fn import_document(&mut self, document: &FloorPlanDocument) -> Result<Vec<WallId>> {
        if self.pending.is_some() {
            return Err(OperationError::PendingWallExists.into());
        }
        for (i, record) in document.walls.iter().enumerate() {
            let d = record.end_point() - record.start_point();
            if d.x.hypot(d.y) < self.config.node_epsilon {
                return Err(OperationError::InvalidInput(format!(
                    "wall record {i} is degenerate"
                ))
                .into());
            }
        }

        let mut imported = Vec::with_capacity(document.walls.len());
        for record in &document.walls {
            let wall = self.start_wall(record.start_point())?;
            self.update_pending_end(record.end_point())?;
            self.pending = None;
            self.place(wall)?;
            imported.push(wall);
        }
        let update = self.update_rooms()?;
        info!(
            walls = imported.len(),
            rooms = self.graph.rooms().count(),
            created = update.created.len(),
            "document imported"
        );
        Ok(imported)
    }

    fn place(&mut self, wall: WallId) -> Result<()> {
        self.graph.reset_wall_connectivity(wall)?;
        let number = self.graph.mark_placed(wall)?;
        self.graph.wall_mut(wall)?.reset_box_chain()?;
        info!(wall = number, "wall placed");
        Ok(())
    }
}
