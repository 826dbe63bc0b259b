//! Per-vertex weight maps
//!
//! This crate edits scalar weight maps over meshes provided by `mesh-data`:
//! - [`weight_data`] - Validated weight arrays with chainable edits
//! - [`falloff`] - Named and custom falloff curves
//! - [`vectors`] - Direction presets and vector helpers
//! - [`interpolation`] - Topology-aware smoothing
//! - [`operations`] - Flood, mirror, radial and directional fields
//! - [`conversion`] - Host string forms and list helpers

pub mod conversion;
pub mod error;
pub mod falloff;
pub mod interpolation;
pub mod operations;
pub mod vectors;
pub mod weight_data;

pub use conversion::{
    SelectMode, blend_weight_lists, component_to_mesh_and_index, modify_weights, normalize_sum,
    normalize_weights, parse_weight_list, remap_weights, select_by_value,
};
pub use error::WeightError;
pub use falloff::{FalloffCurve, FalloffType, apply_falloff, generate_falloff_curve};
pub use interpolation::{InterpolationSettings, WeightInterpolator, interpolate_vertex_map};
pub use operations::{
    DirectionalOperation, DirectionalRecipe, FloodOperation, MirrorDirection, MirrorOperation,
    RadialMode, RadialOperation, RadialRecipe, flood_weights, mirror_weights,
    set_directional_weights, set_radial_weights,
};
pub use vectors::{Direction, DirectionSpec, DistanceMode, direction_vector};
pub use weight_data::{ClampRange, OperationType, WeightData, WeightDataFactory, WeightStats};
