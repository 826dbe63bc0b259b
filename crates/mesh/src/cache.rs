//! Memoised mesh topology with LRU eviction and topology checks.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};
use weightpaint_config::CacheConfig;

use crate::source::MeshSource;
use crate::topology::MeshTopology;
use crate::types::MeshError;

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub current_size: usize,
    pub max_size: usize,
    /// Rough memory estimate in MB
    pub memory_estimate_mb: usize,
}

/// Per-mesh topology cache keyed by mesh name.
///
/// Entries are created on first query, evicted least-recently-used beyond
/// `max_entries`, refetched when the host reports a different vertex count,
/// and all dropped when the memory estimate crosses the threshold.
#[derive(Debug)]
pub struct MeshDataCache {
    config: CacheConfig,
    entries: HashMap<String, Arc<MeshTopology>>,
    /// Least recently used at the front
    order: VecDeque<String>,
    hits: u64,
    misses: u64,
}

impl Default for MeshDataCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl MeshDataCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Number of cached meshes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, mesh: &str) -> bool {
        self.entries.contains_key(mesh)
    }

    /// Whether the memory estimate exceeds the configured threshold.
    pub fn check_cache_memory(&self) -> bool {
        self.config.estimate_mb(self.entries.len()) > self.config.memory_threshold_mb
    }

    /// Get topology for `mesh`, fetching from `source` on a miss.
    pub fn get_mesh_data<S: MeshSource + ?Sized>(
        &mut self,
        source: &S,
        mesh: &str,
    ) -> Result<Arc<MeshTopology>, MeshError> {
        if self.check_cache_memory() {
            warn!(
                "Mesh cache estimate {}MB exceeds {}MB, clearing",
                self.config.estimate_mb(self.entries.len()),
                self.config.memory_threshold_mb
            );
            self.clear_cache();
        }

        let cached_count = self.entries.get(mesh).map(|t| t.vertex_count());
        if let Some(cached_count) = cached_count {
            match source.vertex_count(mesh) {
                Ok(count) if count == cached_count => {
                    self.hits += 1;
                    self.touch(mesh);
                    debug!("Mesh cache hit: {}", mesh);
                    if let Some(topology) = self.entries.get(mesh) {
                        return Ok(Arc::clone(topology));
                    }
                }
                Ok(count) => {
                    debug!(
                        "Topology of {} changed ({} -> {} vertices), refetching",
                        mesh, cached_count, count
                    );
                    self.invalidate(mesh);
                }
                Err(e) => {
                    self.invalidate(mesh);
                    return Err(e);
                }
            }
        }

        self.misses += 1;
        let topology = Arc::new(source.fetch(mesh)?);
        debug!(
            "Mesh cache miss: {} ({} vertices)",
            mesh,
            topology.vertex_count()
        );
        self.insert(mesh, Arc::clone(&topology));
        Ok(topology)
    }

    /// Drop the entry for `mesh`. Returns whether one existed.
    pub fn invalidate(&mut self, mesh: &str) -> bool {
        self.order.retain(|name| name != mesh);
        self.entries.remove(mesh).is_some()
    }

    /// Drop all entries and reset counters.
    pub fn clear_cache(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            current_size: self.entries.len(),
            max_size: self.config.max_entries,
            memory_estimate_mb: self.config.estimate_mb(self.entries.len()),
        }
    }

    fn insert(&mut self, mesh: &str, topology: Arc<MeshTopology>) {
        self.invalidate(mesh);
        while self.entries.len() >= self.config.max_entries.max(1) {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            debug!("Evicting least recently used mesh: {}", oldest);
            self.entries.remove(&oldest);
        }
        self.entries.insert(mesh.to_string(), topology);
        self.order.push_back(mesh.to_string());
    }

    fn touch(&mut self, mesh: &str) {
        if let Some(pos) = self.order.iter().position(|name| name == mesh) {
            if let Some(name) = self.order.remove(pos) {
                self.order.push_back(name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;
    use crate::source::InMemoryScene;

    fn scene_with(names: &[&str]) -> InMemoryScene {
        let mut scene = InMemoryScene::new();
        for name in names {
            scene.insert_mesh(*name, primitives::line(4, 1.0));
        }
        scene
    }

    #[test]
    fn test_hit_after_miss() {
        let scene = scene_with(&["a"]);
        let mut cache = MeshDataCache::default();

        let first = cache.get_mesh_data(&scene, "a").unwrap();
        let second = cache.get_mesh_data(&scene, "a").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(scene.fetch_count(), 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.current_size, 1);
        assert_eq!(stats.memory_estimate_mb, 5);
    }

    #[test]
    fn test_lru_eviction() {
        let scene = scene_with(&["a", "b", "c"]);
        let mut cache = MeshDataCache::new(CacheConfig::new(2, 1000));

        cache.get_mesh_data(&scene, "a").unwrap();
        cache.get_mesh_data(&scene, "b").unwrap();
        // Touch "a" so "b" becomes the eviction candidate
        cache.get_mesh_data(&scene, "a").unwrap();
        cache.get_mesh_data(&scene, "c").unwrap();

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_topology_change_refetches() {
        let mut scene = scene_with(&["a"]);
        let mut cache = MeshDataCache::default();

        assert_eq!(cache.get_mesh_data(&scene, "a").unwrap().vertex_count(), 4);
        scene.insert_mesh("a", primitives::line(6, 1.0));
        assert_eq!(cache.get_mesh_data(&scene, "a").unwrap().vertex_count(), 6);
        assert_eq!(scene.fetch_count(), 2);
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_deleted_mesh_evicted() {
        let mut scene = scene_with(&["a"]);
        let mut cache = MeshDataCache::default();
        cache.get_mesh_data(&scene, "a").unwrap();

        scene.remove_mesh("a");
        assert!(matches!(
            cache.get_mesh_data(&scene, "a"),
            Err(MeshError::NotFound(_))
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_memory_threshold_clears() {
        let scene = scene_with(&["a", "b", "c"]);
        // 5MB per entry, 10MB threshold: a third entry pushes past it
        let mut cache = MeshDataCache::new(CacheConfig::new(32, 10));

        cache.get_mesh_data(&scene, "a").unwrap();
        cache.get_mesh_data(&scene, "b").unwrap();
        cache.get_mesh_data(&scene, "c").unwrap();
        assert_eq!(cache.len(), 3);
        assert!(cache.check_cache_memory());

        // Next lookup flushes everything before serving
        cache.get_mesh_data(&scene, "a").unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn test_huge_memory_estimate_saturates() {
        let scene = scene_with(&["a", "b", "c"]);
        let mut cache = MeshDataCache::new(CacheConfig {
            estimated_mb_per_entry: usize::MAX,
            ..CacheConfig::new(32, usize::MAX)
        });

        cache.get_mesh_data(&scene, "a").unwrap();
        cache.get_mesh_data(&scene, "b").unwrap();
        cache.get_mesh_data(&scene, "c").unwrap();
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.stats().memory_estimate_mb, usize::MAX);
        assert!(!cache.check_cache_memory());
    }

    #[test]
    fn test_clear_cache_resets_stats() {
        let scene = scene_with(&["a"]);
        let mut cache = MeshDataCache::default();
        cache.get_mesh_data(&scene, "a").unwrap();
        cache.get_mesh_data(&scene, "a").unwrap();

        cache.clear_cache();
        assert_eq!(cache.stats(), CacheStats {
            max_size: 32,
            ..CacheStats::default()
        });
    }
}
