//! Abstraction over the host scene that owns the meshes.

use std::cell::Cell;
use std::collections::HashMap;

use crate::topology::MeshTopology;
use crate::types::MeshError;

/// Read access to meshes living in a host application.
///
/// Queries are synchronous and may be expensive. Callers go through
/// [`crate::MeshDataCache`] to avoid refetching unchanged topology.
pub trait MeshSource {
    /// Current vertex count of `mesh`, used to detect topology changes.
    fn vertex_count(&self, mesh: &str) -> Result<usize, MeshError>;

    /// Pull positions and adjacency for `mesh`.
    fn fetch(&self, mesh: &str) -> Result<MeshTopology, MeshError>;

    /// Vertex indices of `mesh` currently selected in the host.
    fn selected_vertices(&self, _mesh: &str) -> Vec<u32> {
        Vec::new()
    }
}

/// Mesh source backed by a map of named topologies.
#[derive(Debug, Default)]
pub struct InMemoryScene {
    meshes: HashMap<String, MeshTopology>,
    selection: HashMap<String, Vec<u32>>,
    fetches: Cell<usize>,
}

impl InMemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a mesh. Replacing clears its selection.
    pub fn insert_mesh(&mut self, name: impl Into<String>, topology: MeshTopology) {
        let name = name.into();
        self.selection.remove(&name);
        self.meshes.insert(name, topology);
    }

    pub fn remove_mesh(&mut self, name: &str) -> Option<MeshTopology> {
        self.selection.remove(name);
        self.meshes.remove(name)
    }

    /// Replace the selection on `mesh`.
    pub fn select(&mut self, mesh: &str, vertices: impl IntoIterator<Item = u32>) {
        self.selection
            .insert(mesh.to_string(), vertices.into_iter().collect());
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Number of full topology fetches served so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

impl MeshSource for InMemoryScene {
    fn vertex_count(&self, mesh: &str) -> Result<usize, MeshError> {
        self.meshes
            .get(mesh)
            .map(MeshTopology::vertex_count)
            .ok_or_else(|| MeshError::NotFound(mesh.to_string()))
    }

    fn fetch(&self, mesh: &str) -> Result<MeshTopology, MeshError> {
        let topology = self
            .meshes
            .get(mesh)
            .cloned()
            .ok_or_else(|| MeshError::NotFound(mesh.to_string()))?;
        self.fetches.set(self.fetches.get() + 1);
        Ok(topology)
    }

    fn selected_vertices(&self, mesh: &str) -> Vec<u32> {
        self.selection.get(mesh).cloned().unwrap_or_default()
    }
}
