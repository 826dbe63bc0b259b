//! Per-mesh facade over cached topology, and the factory that hands it out.

use glam::Vec3;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use weightpaint_config::CacheConfig;

use crate::cache::{CacheStats, MeshDataCache};
use crate::source::MeshSource;
use crate::spatial::Aabb;
use crate::topology::MeshTopology;
use crate::types::MeshError;

/// Read-only view of one mesh's positions and adjacency.
///
/// Cloning is cheap: the topology is shared with the cache.
#[derive(Debug, Clone)]
pub struct MeshData {
    name: String,
    topology: Arc<MeshTopology>,
}

impl MeshData {
    pub fn new(name: impl Into<String>, topology: Arc<MeshTopology>) -> Self {
        Self {
            name: name.into(),
            topology,
        }
    }

    /// Wrap a standalone topology that is not tracked by any cache.
    pub fn from_topology(name: impl Into<String>, topology: MeshTopology) -> Self {
        Self::new(name, Arc::new(topology))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topology(&self) -> &MeshTopology {
        &self.topology
    }

    pub fn vertex_count(&self) -> usize {
        self.topology.vertex_count()
    }

    pub fn positions(&self) -> &[Vec3] {
        self.topology.positions()
    }

    pub fn neighbors(&self) -> &[Vec<u32>] {
        self.topology.neighbors()
    }

    pub fn vertex_position(&self, vertex: u32) -> Option<Vec3> {
        self.positions().get(vertex as usize).copied()
    }

    /// Neighbors of `vertex`, empty when out of range.
    pub fn vertex_neighbors(&self, vertex: u32) -> &[u32] {
        self.neighbors()
            .get(vertex as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Bounding box of all positions (zero box for an empty mesh).
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(self.positions())
    }

    /// Mean vertex position (origin for an empty mesh).
    pub fn center(&self) -> Vec3 {
        let positions = self.positions();
        if positions.is_empty() {
            return Vec3::ZERO;
        }
        positions.iter().copied().sum::<Vec3>() / positions.len() as f32
    }

    /// Area-weighted normals, `None` without face data.
    pub fn vertex_normals(&self) -> Option<Vec<Vec3>> {
        self.topology.vertex_normals()
    }

    pub fn vertex_normal(&self, vertex: u32) -> Option<Vec3> {
        if vertex as usize >= self.vertex_count() {
            return None;
        }
        self.vertex_normals()?.get(vertex as usize).copied()
    }

    pub fn border_vertices(&self) -> Vec<u32> {
        self.topology.border_vertices()
    }

    /// Index of the vertex nearest to `point`, `None` for an empty mesh.
    pub fn closest_vertex(&self, point: Vec3) -> Option<u32> {
        self.positions()
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.distance_squared(point)
                    .total_cmp(&b.distance_squared(point))
            })
            .map(|(i, _)| i as u32)
    }

    /// All vertices connected to `start` through edges, sorted.
    pub fn vertex_shell(&self, start: u32) -> Vec<u32> {
        if start as usize >= self.vertex_count() {
            return Vec::new();
        }

        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([start]);
        seen.insert(start);

        while let Some(current) = queue.pop_front() {
            for &n in self.vertex_neighbors(current) {
                if seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }

        seen.into_iter().collect()
    }
}

/// Hands out [`MeshData`] for named meshes from a host source.
///
/// Every lookup goes through the cache, so topology changes in the host
/// are picked up on the next `get`.
#[derive(Debug)]
pub struct MeshDataFactory<S: MeshSource> {
    source: S,
    cache: MeshDataCache,
}

impl<S: MeshSource> MeshDataFactory<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, CacheConfig::default())
    }

    pub fn with_config(source: S, config: CacheConfig) -> Self {
        Self {
            source,
            cache: MeshDataCache::new(config),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the host source. Cached entries stay valid until
    /// the next `get` detects a vertex count change or `refresh` is called.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn get(&mut self, mesh: &str) -> Result<MeshData, MeshError> {
        let topology = self.cache.get_mesh_data(&self.source, mesh)?;
        Ok(MeshData::new(mesh, topology))
    }

    /// Drop the cached entry for `mesh` and fetch it again.
    pub fn refresh(&mut self, mesh: &str) -> Result<MeshData, MeshError> {
        self.cache.invalidate(mesh);
        self.get(mesh)
    }

    /// Host selection on `mesh`
    pub fn selected_vertices(&self, mesh: &str) -> Vec<u32> {
        self.source.selected_vertices(mesh)
    }

    pub fn clear(&mut self) {
        self.cache.clear_cache();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;
    use crate::source::InMemoryScene;

    fn plane_data() -> MeshData {
        MeshData::from_topology("pPlane1", primitives::plane(2, 2, 2.0, 2.0))
    }

    #[test]
    fn test_queries() {
        let mesh = plane_data();
        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(mesh.vertex_position(8), Some(Vec3::new(1.0, 0.0, 1.0)));
        assert_eq!(mesh.vertex_position(9), None);
        assert_eq!(mesh.vertex_neighbors(4), &[1, 3, 5, 7]);
        assert!(mesh.vertex_neighbors(99).is_empty());
        assert!(mesh.center().length() < 1e-6);

        let bounds = mesh.bounding_box();
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_closest_vertex() {
        let mesh = plane_data();
        assert_eq!(mesh.closest_vertex(Vec3::new(0.9, 0.3, 1.2)), Some(8));
        assert_eq!(mesh.closest_vertex(Vec3::new(0.1, 0.0, -0.1)), Some(4));

        let empty = MeshData::from_topology("empty", primitives::line(0, 1.0));
        assert_eq!(empty.closest_vertex(Vec3::ZERO), None);
        assert_eq!(empty.center(), Vec3::ZERO);
    }

    #[test]
    fn test_vertex_normal() {
        let mesh = plane_data();
        let normal = mesh.vertex_normal(4).unwrap();
        assert!((normal - Vec3::Y).length() < 1e-5);
        assert_eq!(mesh.vertex_normal(42), None);

        let line = MeshData::from_topology("line", primitives::line(3, 1.0));
        assert_eq!(line.vertex_normal(0), None);
    }

    #[test]
    fn test_vertex_shell_separates_islands() {
        let positions = vec![Vec3::ZERO; 5];
        let topology = MeshTopology::from_adjacency(
            positions,
            vec![vec![1], vec![0, 2], vec![1], vec![4], vec![3]],
        )
        .unwrap();
        let mesh = MeshData::from_topology("islands", topology);

        assert_eq!(mesh.vertex_shell(2), vec![0, 1, 2]);
        assert_eq!(mesh.vertex_shell(4), vec![3, 4]);
        assert!(mesh.vertex_shell(5).is_empty());
    }

    #[test]
    fn test_factory_refresh() {
        let mut scene = InMemoryScene::new();
        scene.insert_mesh("m", primitives::line(3, 1.0));
        let mut factory = MeshDataFactory::new(scene);

        assert_eq!(factory.get("m").unwrap().vertex_count(), 3);
        assert_eq!(factory.get("m").unwrap().vertex_count(), 3);
        assert_eq!(factory.source().fetch_count(), 1);

        factory.refresh("m").unwrap();
        assert_eq!(factory.source().fetch_count(), 2);

        factory.source_mut().select("m", [1]);
        assert_eq!(factory.selected_vertices("m"), vec![1]);

        assert!(factory.get("missing").is_err());
        factory.clear();
        assert_eq!(factory.cache_stats().current_size, 0);
    }
}
