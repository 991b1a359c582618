use crate::error::Result;
use crate::math::intersect_2d::segment_crossing_2d;
use crate::math::{Point3, ANGULAR_EPSILON};
use crate::topology::{WallGraph, WallId};

/// Result of crossing one wall with another in plan view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallIntersection {
    /// The wall that was hit.
    pub hit_wall: WallId,
    /// Crossing point; Z is the mean of both walls' heights there.
    pub location: Point3,
    /// Distance from the query wall's start to the crossing.
    pub dist_along_query_wall: f64,
    /// Distance from the hit wall's start to the crossing.
    pub dist_along_hit_wall: f64,
}

/// Finds where a query wall crosses another wall in the XY plane.
///
/// Parallel walls, zero-length walls and crossings within `epsilon` of
/// either wall's endpoints are not intersections.
pub struct WallIntersect {
    query: WallId,
    hit: WallId,
    epsilon: f64,
    angular_epsilon: f64,
}

impl WallIntersect {
    /// Creates a new `WallIntersect` query.
    #[must_use]
    pub fn new(query: WallId, hit: WallId) -> Self {
        Self {
            query,
            hit,
            epsilon: 0.01,
            angular_epsilon: ANGULAR_EPSILON,
        }
    }

    /// Sets the endpoint exclusion distance.
    #[must_use]
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the parallel-direction threshold.
    #[must_use]
    pub fn angular_epsilon(mut self, angular_epsilon: f64) -> Self {
        self.angular_epsilon = angular_epsilon;
        self
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if either wall does not exist.
    pub fn execute(&self, graph: &WallGraph) -> Result<Option<WallIntersection>> {
        let a = graph.wall(self.query)?;
        let b = graph.wall(self.hit)?;
        Ok(segment_crossing_2d(
            &a.start_point,
            &a.end_point,
            &b.start_point,
            &b.end_point,
            self.epsilon,
            self.angular_epsilon,
        )
        .map(|crossing| WallIntersection {
            hit_wall: self.hit,
            location: crossing.location,
            dist_along_query_wall: crossing.dist_along_first,
            dist_along_hit_wall: crossing.dist_along_second,
        }))
    }
}
