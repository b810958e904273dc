use thiserror::Error;

pub type GridResult<T> = Result<T, GridError>;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Invalid grid extents: {what}")]
    InvalidExtents { what: &'static str },

    #[error("Cell index {index} out of bounds (num_cells={len})")]
    CellOob { index: usize, len: usize },

    #[error("Face index {index} out of bounds (num_faces={len})")]
    FaceOob { index: usize, len: usize },

    #[error("Vertex index {index} out of bounds (num_vertices={len})")]
    VertexOob { index: usize, len: usize },

    #[error("Face geometry invariant violated: {what} (face={face})")]
    FaceInvariant { what: &'static str, face: usize },
}
