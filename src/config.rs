use serde::{Deserialize, Serialize};

use crate::error::{OperationError, Result};
use crate::math::ANGULAR_EPSILON;

/// Tunables of an editing session.
///
/// Missing fields take their default when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Two nodes closer than this are the same node.
    pub node_epsilon: f64,
    /// Crossings this close to a wall's endpoints do not count.
    pub intersection_epsilon: f64,
    /// Directions closer than this to parallel never cross.
    pub angular_epsilon: f64,
    /// Height of a freshly placed wall.
    pub wall_height: f64,
    /// Full thickness of a freshly placed wall.
    pub wall_thickness: f64,
    /// UV scale of wall and room meshes.
    pub texels_per_unit: f64,
    /// Keep colinear vertices when triangulating room floors.
    pub keep_colinear_vertices: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            node_epsilon: 0.1,
            intersection_epsilon: 0.01,
            angular_epsilon: ANGULAR_EPSILON,
            wall_height: 243.84,
            wall_thickness: 10.0,
            texels_per_unit: 0.01,
            keep_colinear_vertices: true,
        }
    }
}

impl EditorConfig {
    /// Checks that every length and scale is positive and finite.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("node_epsilon", self.node_epsilon),
            ("intersection_epsilon", self.intersection_epsilon),
            ("angular_epsilon", self.angular_epsilon),
            ("wall_height", self.wall_height),
            ("wall_thickness", self.wall_thickness),
            ("texels_per_unit", self.texels_per_unit),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(OperationError::InvalidInput(format!(
                    "{name} must be positive, got {value}"
                ))
                .into());
            }
        }
        Ok(())
    }
}
