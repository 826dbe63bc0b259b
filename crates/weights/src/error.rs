//! Error type for weight operations.

use mesh_data::MeshError;

/// Errors that can occur while building or transforming weight maps
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightError {
    #[error("Weight count ({weights}) doesn't match vertex count ({vertices})")]
    LengthMismatch { weights: usize, vertices: usize },
    #[error("Invalid operation type: {0}. Must be one of: replace, add, subtract, multiply")]
    InvalidOperation(String),
    #[error("Invalid falloff type: {0}")]
    InvalidFalloff(String),
    #[error("Invalid direction: {0}")]
    InvalidDirection(String),
    #[error("Invalid range: min {min} must not exceed max {max}")]
    InvalidRange { min: f32, max: f32 },
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("Mesh {0} has no face data to derive normals from")]
    MissingNormals(String),
    #[error("Failed to parse weights: {0}")]
    Parse(String),
    #[error(transparent)]
    Mesh(#[from] MeshError),
}
