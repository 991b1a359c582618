use thiserror::Error;

/// Top-level error type for the floor plan core.
#[derive(Debug, Error)]
pub enum FloorgraphError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to the wall graph and the faces discovered on it.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(&'static str),

    /// The graph violates an invariant the room search relies on.
    ///
    /// This is a logic error, not an input error: the graph is corrupted.
    #[error("inconsistent wall graph: {0}")]
    Inconsistent(String),
}

/// Errors related to editing operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("a wall is already being drawn")]
    PendingWallExists,

    #[error("no wall is being drawn")]
    NoPendingWall,

    #[error("placed walls cannot be removed")]
    PlacedWallRemoval,

    #[error("wall has not been placed")]
    WallNotPlaced,

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors related to tessellation.
#[derive(Debug, Error)]
pub enum TessellationError {
    /// Ear clipping found no ear: the polygon self-intersects or has
    /// inconsistent winding.
    #[error("no ear found with {remaining} vertices remaining")]
    NoEar { remaining: usize },
}

/// Convenience type alias for results using [`FloorgraphError`].
pub type Result<T, E = FloorgraphError> = std::result::Result<T, E>;
