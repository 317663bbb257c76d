use thiserror::Error;

/// Top-level error type for flatflow.
#[derive(Debug, Error)]
pub enum FlatflowError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),

    #[error(transparent)]
    Surgery(#[from] SurgeryError),
}

/// Errors related to exact planar geometry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("vectors are not colinear")]
    NotColinear,

    #[error("zero-length vector")]
    ZeroVector,

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("polygon is not strictly convex: {0}")]
    NotConvex(String),

    #[error("point lies outside the polygon")]
    PointOutsidePolygon,

    #[error("vector does not point into the polygon")]
    VectorPointsOutward,

    #[error("offset is outside the interval of edge {edge}")]
    OffsetOutOfRange { edge: usize },
}

/// Errors raised by surface lookups and gluings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("polygon not found: {0}")]
    PolygonNotFound(String),

    #[error("edge {edge} out of range for a polygon with {num_edges} edges")]
    EdgeOutOfRange { edge: usize, num_edges: usize },

    #[error("edge {edge} of polygon {label} is not glued")]
    EdgeNotGlued { label: String, edge: usize },

    #[error("invalid gluing: {0}")]
    InvalidGluing(String),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    #[error("surface has a gluing that is not a translation")]
    NotTranslationSurface,
}

/// Errors raised while building or extending trajectories.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrajectoryError {
    #[error("cannot continue through a singularity")]
    SingularEndpoint,

    #[error("segment is not an edge of its polygon")]
    NotAnEdge,

    #[error("start point cannot be represented as an interval exchange position")]
    UnrepresentableStart,

    #[error("segment {index} out of range for a trajectory of {length} segments")]
    SegmentOutOfRange { index: usize, length: usize },
}

/// Errors raised by polygon surgery.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurgeryError {
    #[error("vertices {v1} and {v2} do not span a diagonal")]
    InvalidDiagonal { v1: usize, v2: usize },
}

/// Convenience type alias for results using [`FlatflowError`].
pub type Result<T> = std::result::Result<T, FlatflowError>;
