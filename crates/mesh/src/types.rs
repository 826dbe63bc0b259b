//! Shared mesh error type.

/// Errors that can occur while fetching or validating mesh data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    #[error("Mesh not found: {0}")]
    NotFound(String),
    #[error("Invalid mesh topology: {0}")]
    InvalidTopology(String),
    #[error("Vertex index {index} out of range for mesh with {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("Invalid axis '{0}', expected x, y or z")]
    InvalidAxis(String),
    #[error("Invalid component mask: {0}")]
    InvalidMask(String),
}
