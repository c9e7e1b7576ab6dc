use thiserror::Error;

/// Errors raised while building or reshaping a structured grid.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("a grid needs at least one dimension")]
    NoDimensions,

    #[error("dimension {0} has no samples")]
    EmptyDimension(usize),

    #[error("dimension {0} has no coordinate above zero to derive a spacing from")]
    NoSpacing(usize),

    #[error("dimension {dim} contains a non-finite sample")]
    NonFinite { dim: usize },

    /// Data length does not match the number of grid nodes.
    #[error("expected {expected} values for the grid, got {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("operation supports 1-D and 2-D grids only, grid has {0} dimensions")]
    UnsupportedDimension(usize),

    #[error("dimension index {dim} out of range for a {n_dim}-D grid")]
    DimensionOutOfRange { dim: usize, n_dim: usize },

    #[error("node id {node} out of range for a grid of {size} nodes")]
    NodeOutOfRange { node: usize, size: usize },

    #[error("point {0:?} lies outside the grid")]
    OutOfBounds(Vec<f64>),

    #[error("{0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Errors raised while composing a figure from plot objects.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("The number of subplots ({subplots}) and the user defined subplot grid {rows}x{cols} are not matching")]
    GridMismatch {
        subplots: usize,
        rows: usize,
        cols: usize,
    },

    #[error("figure needs {0} subplots, at most {max} are supported", max = crate::plotlib::MAX_SUBPLOTS)]
    TooManySubplots(usize),

    #[error("sample {sample} out of range for data with {n_samples} samples")]
    SampleOutOfRange { sample: usize, n_samples: usize },

    #[error("{0} requires a 2-D grid")]
    NeedsPlanarGrid(&'static str),

    #[error("{format} export requires building with the `kaleido` feature")]
    StaticExportUnavailable { format: String },

    #[error(transparent)]
    Grid(#[from] GridError),
}
