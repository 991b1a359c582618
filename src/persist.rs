use serde::{Deserialize, Serialize};

use crate::math::Point3;

/// A placed wall as stored: just its two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallRecord {
    pub start: [f64; 3],
    pub end: [f64; 3],
}

impl WallRecord {
    #[must_use]
    pub fn new(start: &Point3, end: &Point3) -> Self {
        Self {
            start: [start.x, start.y, start.z],
            end: [end.x, end.y, end.z],
        }
    }

    #[must_use]
    pub fn start_point(&self) -> Point3 {
        Point3::from(self.start)
    }

    #[must_use]
    pub fn end_point(&self) -> Point3 {
        Point3::from(self.end)
    }
}

/// A saved floor plan: the placed walls in placement order.
///
/// Nodes, box chains and rooms are rebuilt from the walls on import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloorPlanDocument {
    pub walls: Vec<WallRecord>,
}
