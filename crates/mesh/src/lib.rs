//! Mesh data for weight editing
//!
//! This crate provides the host-independent half of the weight engine:
//! - [`topology::MeshTopology`] - Vertex positions, adjacency and faces
//! - [`source::MeshSource`] - Abstraction over the host scene
//! - [`cache::MeshDataCache`] - Bounded, topology-checked memoisation
//! - [`mesh_data`] - Per-mesh facade and factory
//! - [`mask`] - Component masks and selections
//! - [`symmetry`] - Mirror axis and vertex pairing
//! - [`primitives`] - Procedural test meshes

pub mod cache;
pub mod mask;
pub mod mesh_data;
pub mod primitives;
pub mod source;
pub mod spatial;
pub mod symmetry;
pub mod topology;
pub mod types;

pub use cache::{CacheStats, MeshDataCache};
pub use mask::{ComponentMask, ComponentSelection, MaskEntry, indices_to_range_str};
pub use mesh_data::{MeshData, MeshDataFactory};
pub use source::{InMemoryScene, MeshSource};
pub use spatial::Aabb;
pub use symmetry::{Axis, MirrorPairs, find_coincident_pairs, find_mirror_pairs};
pub use topology::MeshTopology;
pub use types::MeshError;
