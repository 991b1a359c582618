use tracing::{debug, warn};

use crate::error::{OperationError, Result};
use crate::geometry::{Plane, WallBox};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::tessellation::{flatten_box_chain, TriangleMesh};
use crate::topology::{WallData, WallGraph, WallId};

/// How a cut changed the box chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutOutcome {
    /// The box at `replaced_index` was replaced by `inserted` boxes.
    Cut { replaced_index: usize, inserted: usize },
    /// The opening does not fit; the chain is unchanged.
    DoesNotFit,
}

/// Result of cutting an opening into a wall.
#[derive(Debug, Clone, PartialEq)]
pub struct CutResult {
    pub outcome: CutOutcome,
    /// The box chain after the cut.
    pub boxes: Vec<WallBox>,
    /// The chain flattened for rendering.
    pub mesh: TriangleMesh,
}

/// Cuts a window or door opening into a wall's box chain.
///
/// The opening is an axis-aligned box in the wall's frame: `center` is
/// projected onto the wall's centre plane, `half_extents.x` runs along the
/// wall and `half_extents.z` up. The box containing the opening is split
/// into a start box, a lintel above the opening, a sill below it (not for
/// doors) and an end box.
pub struct CutOpening {
    wall: WallId,
    center: Point3,
    half_extents: Vector3,
    is_door: bool,
    preview: bool,
    texels_per_unit: f64,
}

impl CutOpening {
    /// Creates a new `CutOpening` operation for a window.
    #[must_use]
    pub fn new(wall: WallId, center: Point3, half_extents: Vector3) -> Self {
        Self {
            wall,
            center,
            half_extents,
            is_door: false,
            preview: false,
            texels_per_unit: 0.01,
        }
    }

    /// Cuts a door: no sill is left below the opening.
    #[must_use]
    pub fn door(mut self, is_door: bool) -> Self {
        self.is_door = is_door;
        self
    }

    /// Computes the cut without committing it to the wall.
    #[must_use]
    pub fn preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    #[must_use]
    pub fn texels_per_unit(mut self, texels_per_unit: f64) -> Self {
        self.texels_per_unit = texels_per_unit;
        self
    }

    /// Executes the operation, committing the new chain unless previewing.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall does not exist, is not placed, has
    /// zero length, or if the half-extents are not positive.
    pub fn execute(&self, graph: &mut WallGraph) -> Result<CutResult> {
        let result = self.plan(graph)?;
        if let CutOutcome::Cut {
            replaced_index,
            inserted,
        } = result.outcome
        {
            if !self.preview {
                graph.wall_mut(self.wall)?.box_chain.clone_from(&result.boxes);
                debug!(wall = ?self.wall, replaced_index, inserted, "opening cut");
            }
        }
        Ok(result)
    }

    /// Computes the cut without touching the graph.
    ///
    /// # Errors
    ///
    /// See [`Self::execute`].
    pub fn plan(&self, graph: &WallGraph) -> Result<CutResult> {
        let wall = graph.wall(self.wall)?;
        if !wall.is_placed() || wall.box_chain.is_empty() {
            return Err(OperationError::WallNotPlaced.into());
        }
        if !(self.half_extents.x > 0.0 && self.half_extents.z > 0.0) {
            return Err(OperationError::InvalidInput(format!(
                "opening half-extents must be positive, got {:?}",
                self.half_extents
            ))
            .into());
        }

        let frame = WallFrame::new(wall)?;
        let (outcome, boxes) = match self.split(wall, &frame)? {
            Some((replaced_index, pieces)) => {
                let inserted = pieces.len();
                let mut boxes = Vec::with_capacity(wall.box_chain.len() + inserted - 1);
                boxes.extend_from_slice(&wall.box_chain[..replaced_index]);
                boxes.extend(pieces);
                boxes.extend_from_slice(&wall.box_chain[replaced_index + 1..]);
                (
                    CutOutcome::Cut {
                        replaced_index,
                        inserted,
                    },
                    boxes,
                )
            }
            None => {
                warn!(wall = ?self.wall, center = ?self.center, "opening does not fit");
                (CutOutcome::DoesNotFit, wall.box_chain.clone())
            }
        };

        let mesh = flatten_box_chain(
            &boxes,
            &wall.start_point,
            &frame.lateral,
            self.texels_per_unit,
        );
        Ok(CutResult {
            outcome,
            boxes,
            mesh,
        })
    }

    /// Splits the box holding the opening. `None` if the opening leaves
    /// the wall, does not lie inside a single floor-standing box, or has
    /// no height left between the wall base and the box top.
    fn split(
        &self,
        wall: &WallData,
        frame: &WallFrame,
    ) -> Result<Option<(usize, Vec<WallBox>)>> {
        let centre_plane = Plane::from_normal(wall.start_point, frame.lateral)?;
        let center = centre_plane.project_point(&self.center);
        let mid = frame.offset_of(&center);
        let (ws, we) = (mid - self.half_extents.x, mid + self.half_extents.x);
        if ws < 0.0 || we > frame.length {
            return Ok(None);
        }

        let Some(index) = wall
            .box_chain
            .iter()
            .position(|b| b.end_offset(&wall.start_point, &frame.dir) > ws)
        else {
            return Ok(None);
        };
        let target = &wall.box_chain[index];
        let base = wall.lowest_z();
        let box_start = target.start_offset(&wall.start_point, &frame.dir);
        let box_end = target.end_offset(&wall.start_point, &frame.dir);
        if box_start > ws || box_end < we || target.bottom_z() > base {
            return Ok(None);
        }

        let highest = wall.highest_z();
        let start_top = target.top_left_start.z;
        let end_top = target.top_left_end.z;
        let bottom = center.z - self.half_extents.z;
        let opening_bottom = bottom.max(base);
        let opening_top = highest
            .min(bottom + 2.0 * self.half_extents.z)
            .min(start_top.min(end_top));
        if opening_top - opening_bottom <= TOLERANCE {
            return Ok(None);
        }
        let half = frame.lateral * (0.5 * wall.thickness);
        let at = |offset: f64, z: f64| frame.point_at(offset, z);

        let mut start = WallBox::spanning(
            &at(box_start, base),
            &at(ws, base),
            &half,
            start_top,
            start_top,
        );
        start.bottom_left_start = target.bottom_left_start;
        start.bottom_right_start = target.bottom_right_start;
        start.top_left_start = target.top_left_start;
        start.top_right_start = target.top_right_start;

        let mut end = WallBox::spanning(
            &at(we, base),
            &at(box_end, base),
            &half,
            highest,
            end_top,
        );
        end.bottom_left_end = target.bottom_left_end;
        end.bottom_right_end = target.bottom_right_end;
        end.top_left_end = target.top_left_end;
        end.top_right_end = target.top_right_end;

        // Openings reaching the box top or the base leave no lintel or sill.
        let mut pieces = vec![start];
        if start_top.max(end_top) - opening_top > TOLERANCE {
            pieces.push(WallBox::spanning(
                &at(ws, opening_top),
                &at(we, opening_top),
                &half,
                start_top,
                end_top,
            ));
        }
        if !self.is_door && opening_bottom - base > TOLERANCE {
            pieces.push(WallBox::spanning(
                &at(ws, base),
                &at(we, base),
                &half,
                opening_bottom,
                opening_bottom,
            ));
        }
        pieces.push(end);
        Ok(Some((index, pieces)))
    }
}

/// A wall's horizontal frame: unit direction, lateral axis and length.
struct WallFrame {
    origin: Point3,
    dir: Vector3,
    lateral: Vector3,
    length: f64,
}

impl WallFrame {
    fn new(wall: &WallData) -> Result<Self> {
        Ok(Self {
            origin: wall.start_point,
            dir: wall.direction()?,
            lateral: wall.lateral()?,
            length: wall.length_2d(),
        })
    }

    fn offset_of(&self, point: &Point3) -> f64 {
        (point - self.origin).dot(&self.dir)
    }

    fn point_at(&self, offset: f64, z: f64) -> Point3 {
        let p = self.origin + self.dir * offset;
        Point3::new(p.x, p.y, z)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const THICKNESS: f64 = 10.0;
    const HEIGHT: f64 = 240.0;

    fn placed_wall(graph: &mut WallGraph) -> WallId {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(400.0, 0.0, 0.0);
        let na = graph.add_node(a);
        let nb = graph.add_node(b);
        let wall = graph.add_wall(WallData::new(na, nb, a, b, THICKNESS, HEIGHT));
        graph.connect_wall(na, wall, true).unwrap();
        graph.connect_wall(nb, wall, true).unwrap();
        graph.mark_placed(wall).unwrap();
        graph.wall_mut(wall).unwrap().reset_box_chain().unwrap();
        wall
    }

    fn length(b: &WallBox) -> f64 {
        b.bottom_left_end.x - b.bottom_left_start.x
    }

    fn volume(b: &WallBox) -> f64 {
        length(b) * THICKNESS * (b.top_left_start.z - b.bottom_left_start.z)
    }

    #[test]
    fn window_splits_into_four_boxes() {
        let mut graph = WallGraph::default();
        let wall = placed_wall(&mut graph);
        let original = graph.wall(wall).unwrap().box_chain[0];

        // Off-centre laterally; projection snaps it onto the wall.
        let result = CutOpening::new(
            wall,
            Point3::new(200.0, 30.0, 120.0),
            Vector3::new(50.0, 5.0, 40.0),
        )
        .execute(&mut graph)
        .unwrap();
        assert_eq!(
            result.outcome,
            CutOutcome::Cut {
                replaced_index: 0,
                inserted: 4
            }
        );
        let [start, lintel, sill, end] = result.boxes[..] else {
            panic!("expected four boxes");
        };

        assert_eq!(start.bottom_left_start, original.bottom_left_start);
        assert_eq!(end.bottom_right_end, original.bottom_right_end);
        assert_relative_eq!(start.bottom_left_end.x, 150.0, epsilon = 1e-9);
        assert_relative_eq!(end.bottom_left_start.x, 250.0, epsilon = 1e-9);
        assert_eq!(start.bottom_left_end, sill.bottom_left_start);
        assert_eq!(sill.bottom_right_end, end.bottom_right_start);

        assert_relative_eq!(sill.top_left_start.z, 80.0, epsilon = 1e-9);
        assert_relative_eq!(lintel.bottom_left_start.z, 160.0, epsilon = 1e-9);
        assert_relative_eq!(lintel.top_left_end.z, HEIGHT, epsilon = 1e-9);
        assert_relative_eq!(lintel.bottom_left_start.y, 5.0, epsilon = 1e-9);
        assert_relative_eq!(lintel.bottom_right_start.y, -5.0, epsilon = 1e-9);

        let opening = 100.0 * THICKNESS * 80.0;
        let total: f64 = result.boxes.iter().map(volume).sum();
        assert_relative_eq!(total + opening, volume(&original), epsilon = 1e-6);

        assert_eq!(graph.wall(wall).unwrap().box_chain, result.boxes);
        assert_eq!(result.mesh.vertices.len(), 32);
        assert_eq!(result.mesh.indices.len(), 48);
    }

    #[test]
    fn door_has_no_sill() {
        let mut graph = WallGraph::default();
        let wall = placed_wall(&mut graph);
        let result = CutOpening::new(
            wall,
            Point3::new(100.0, 0.0, 100.0),
            Vector3::new(45.0, 5.0, 100.0),
        )
        .door(true)
        .execute(&mut graph)
        .unwrap();
        assert_eq!(
            result.outcome,
            CutOutcome::Cut {
                replaced_index: 0,
                inserted: 3
            }
        );
        let lintel = result.boxes[1];
        assert_relative_eq!(lintel.bottom_left_start.z, 200.0, epsilon = 1e-9);
        assert_relative_eq!(length(&lintel), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn second_opening_cuts_the_end_box() {
        let mut graph = WallGraph::default();
        let wall = placed_wall(&mut graph);
        CutOpening::new(
            wall,
            Point3::new(100.0, 0.0, 120.0),
            Vector3::new(30.0, 5.0, 40.0),
        )
        .execute(&mut graph)
        .unwrap();
        let result = CutOpening::new(
            wall,
            Point3::new(300.0, 0.0, 120.0),
            Vector3::new(30.0, 5.0, 40.0),
        )
        .execute(&mut graph)
        .unwrap();
        assert_eq!(
            result.outcome,
            CutOutcome::Cut {
                replaced_index: 3,
                inserted: 4
            }
        );
        assert_eq!(result.boxes.len(), 7);
    }

    #[test]
    fn opening_past_the_wall_does_not_fit() {
        let mut graph = WallGraph::default();
        let wall = placed_wall(&mut graph);
        let before = graph.wall(wall).unwrap().box_chain.clone();
        let result = CutOpening::new(
            wall,
            Point3::new(380.0, 0.0, 120.0),
            Vector3::new(50.0, 5.0, 40.0),
        )
        .execute(&mut graph)
        .unwrap();
        assert_eq!(result.outcome, CutOutcome::DoesNotFit);
        assert_eq!(result.boxes, before);
        assert_eq!(result.mesh.vertices.len(), 8);
        assert_eq!(graph.wall(wall).unwrap().box_chain, before);
    }

    #[test]
    fn overlapping_opening_does_not_fit() {
        let mut graph = WallGraph::default();
        let wall = placed_wall(&mut graph);
        CutOpening::new(
            wall,
            Point3::new(200.0, 0.0, 120.0),
            Vector3::new(50.0, 5.0, 40.0),
        )
        .execute(&mut graph)
        .unwrap();
        let result = CutOpening::new(
            wall,
            Point3::new(220.0, 0.0, 120.0),
            Vector3::new(50.0, 5.0, 40.0),
        )
        .execute(&mut graph)
        .unwrap();
        assert_eq!(result.outcome, CutOutcome::DoesNotFit);
    }

    #[test]
    fn opening_above_or_below_the_wall_does_not_fit() {
        let mut graph = WallGraph::default();
        let wall = placed_wall(&mut graph);
        let before = graph.wall(wall).unwrap().box_chain.clone();
        for z in [400.0, HEIGHT + 40.0, -100.0] {
            let result = CutOpening::new(
                wall,
                Point3::new(200.0, 0.0, z),
                Vector3::new(50.0, 5.0, 40.0),
            )
            .execute(&mut graph)
            .unwrap();
            assert_eq!(result.outcome, CutOutcome::DoesNotFit);
            assert_eq!(result.boxes, before);
        }
        assert_eq!(graph.wall(wall).unwrap().box_chain, before);
    }

    #[test]
    fn opening_through_the_top_leaves_no_lintel() {
        let mut graph = WallGraph::default();
        let wall = placed_wall(&mut graph);
        let original = graph.wall(wall).unwrap().box_chain[0];
        let result = CutOpening::new(
            wall,
            Point3::new(200.0, 0.0, 220.0),
            Vector3::new(50.0, 5.0, 40.0),
        )
        .execute(&mut graph)
        .unwrap();
        assert_eq!(
            result.outcome,
            CutOutcome::Cut {
                replaced_index: 0,
                inserted: 3
            }
        );
        let [_, sill, _] = result.boxes[..] else {
            panic!("expected three boxes");
        };
        assert_relative_eq!(sill.top_left_start.z, 180.0, epsilon = 1e-9);
        assert!(result.boxes.iter().all(|b| b.top_z() <= HEIGHT));

        let opening = 100.0 * THICKNESS * (HEIGHT - 180.0);
        let total: f64 = result.boxes.iter().map(volume).sum();
        assert_relative_eq!(total + opening, volume(&original), epsilon = 1e-6);
    }

    #[test]
    fn window_reaching_the_base_leaves_no_sill() {
        let mut graph = WallGraph::default();
        let wall = placed_wall(&mut graph);
        let original = graph.wall(wall).unwrap().box_chain[0];
        let result = CutOpening::new(
            wall,
            Point3::new(200.0, 0.0, 30.0),
            Vector3::new(50.0, 5.0, 40.0),
        )
        .execute(&mut graph)
        .unwrap();
        assert_eq!(
            result.outcome,
            CutOutcome::Cut {
                replaced_index: 0,
                inserted: 3
            }
        );
        let [_, lintel, _] = result.boxes[..] else {
            panic!("expected three boxes");
        };
        assert_relative_eq!(lintel.bottom_left_start.z, 70.0, epsilon = 1e-9);
        assert!(result.boxes.iter().all(|b| b.top_z() - b.bottom_z() > 1.0));
        assert_eq!(result.mesh.vertices.len(), 24);

        let opening = 100.0 * THICKNESS * 70.0;
        let total: f64 = result.boxes.iter().map(volume).sum();
        assert_relative_eq!(total + opening, volume(&original), epsilon = 1e-6);
    }

    #[test]
    fn preview_leaves_the_wall_untouched() {
        let mut graph = WallGraph::default();
        let wall = placed_wall(&mut graph);
        let before = graph.wall(wall).unwrap().box_chain.clone();
        let op = CutOpening::new(
            wall,
            Point3::new(200.0, 0.0, 120.0),
            Vector3::new(50.0, 5.0, 40.0),
        )
        .preview(true);
        let first = op.execute(&mut graph).unwrap();
        let second = op.execute(&mut graph).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.boxes.len(), 4);
        assert_eq!(graph.wall(wall).unwrap().box_chain, before);
    }

    #[test]
    fn unplaced_wall_and_bad_extents_are_errors() {
        let mut graph = WallGraph::default();
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(400.0, 0.0, 0.0);
        let na = graph.add_node(a);
        let nb = graph.add_node(b);
        let pending = graph.add_wall(WallData::new(na, nb, a, b, THICKNESS, HEIGHT));
        assert!(CutOpening::new(pending, a, Vector3::new(10.0, 5.0, 10.0))
            .execute(&mut graph)
            .is_err());

        let wall = placed_wall(&mut graph);
        assert!(CutOpening::new(wall, a, Vector3::new(0.0, 5.0, 10.0))
            .execute(&mut graph)
            .is_err());
    }
}
