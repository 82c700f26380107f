use thiserror::Error;

/// Errors raised by the pose search pipeline.
///
/// Everything that a caller can cause through its inputs is reported here.
/// Degenerate requests that have a sensible clamped answer (such as asking for
/// more top candidates than exist) are not errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("point cloud is empty")]
    EmptyCloud,
    #[error("point cloud has {positions} positions but {colors} colors")]
    ColorMismatch { positions: usize, colors: usize },
    #[error("no {0} candidates to evaluate")]
    EmptyCandidates(&'static str),
    #[error("axis {axis} of the point cloud has zero extent")]
    DegenerateAxis { axis: usize },
    #[error("octree needs {depth} levels in total, more than the limit of {limit}")]
    OctreeTooDeep { depth: u32, limit: u32 },
    #[error("{size} pixels cannot be split evenly into {splits} patches")]
    PatchGrid { size: usize, splits: usize },
    #[error("expected an image of {expected:?} (height, width), got {actual:?}")]
    ImageSize {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = core::result::Result<T, Error>;
