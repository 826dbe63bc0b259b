//! Pure-data mesh topology: positions, adjacency and optional polygon faces.

use glam::Vec3;
use std::collections::{BTreeSet, HashMap};

use crate::types::MeshError;

/// Vertex positions plus edge adjacency for one mesh.
///
/// Invariants:
/// - `neighbors.len() == positions.len()` (adjacency covers `[0, vertex_count)`)
/// - every neighbor index is in range and differs from its own vertex
/// - each neighbor list is sorted and free of duplicates
#[derive(Debug, Clone, PartialEq)]
pub struct MeshTopology {
    positions: Vec<Vec3>,
    neighbors: Vec<Vec<u32>>,
    /// Polygon faces as vertex loops. Empty when built from adjacency alone.
    faces: Vec<Vec<u32>>,
}

impl MeshTopology {
    /// Build topology from polygon faces.
    ///
    /// Adjacency is derived from the edges of every polygon.
    pub fn from_polygons(positions: Vec<Vec3>, faces: Vec<Vec<u32>>) -> Result<Self, MeshError> {
        let vertex_count = positions.len();
        let mut sets: Vec<BTreeSet<u32>> = vec![BTreeSet::new(); vertex_count];

        for (face_index, face) in faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(MeshError::InvalidTopology(format!(
                    "face {} has {} vertices, expected at least 3",
                    face_index,
                    face.len()
                )));
            }
            for &v in face {
                if v as usize >= vertex_count {
                    return Err(MeshError::IndexOutOfRange {
                        index: v,
                        vertex_count,
                    });
                }
            }
            for (a, b) in polygon_edges(face) {
                if a == b {
                    return Err(MeshError::InvalidTopology(format!(
                        "face {} repeats vertex {}",
                        face_index, a
                    )));
                }
                sets[a as usize].insert(b);
                sets[b as usize].insert(a);
            }
        }

        let neighbors = sets.into_iter().map(|s| s.into_iter().collect()).collect();

        Ok(Self {
            positions,
            neighbors,
            faces,
        })
    }

    /// Build topology from an explicit neighbor list.
    ///
    /// Neighbor lists are sorted and deduplicated. Self references and
    /// out-of-range indices are rejected.
    pub fn from_adjacency(
        positions: Vec<Vec3>,
        neighbors: Vec<Vec<u32>>,
    ) -> Result<Self, MeshError> {
        let vertex_count = positions.len();
        if neighbors.len() != vertex_count {
            return Err(MeshError::InvalidTopology(format!(
                "adjacency covers {} vertices but mesh has {}",
                neighbors.len(),
                vertex_count
            )));
        }

        let mut cleaned = Vec::with_capacity(vertex_count);
        for (vertex, list) in neighbors.into_iter().enumerate() {
            let mut list = list;
            for &n in &list {
                if n as usize >= vertex_count {
                    return Err(MeshError::IndexOutOfRange {
                        index: n,
                        vertex_count,
                    });
                }
                if n as usize == vertex {
                    return Err(MeshError::InvalidTopology(format!(
                        "vertex {} lists itself as a neighbor",
                        vertex
                    )));
                }
            }
            list.sort_unstable();
            list.dedup();
            cleaned.push(list);
        }

        Ok(Self {
            positions,
            neighbors: cleaned,
            faces: Vec::new(),
        })
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// All vertex positions
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Neighbor lists indexed by vertex
    pub fn neighbors(&self) -> &[Vec<u32>] {
        &self.neighbors
    }

    /// Polygon faces (empty if built from adjacency)
    pub fn faces(&self) -> &[Vec<u32>] {
        &self.faces
    }

    /// Whether face data is available
    pub fn has_faces(&self) -> bool {
        !self.faces.is_empty()
    }

    /// Vertices lying on an edge used by exactly one face.
    ///
    /// Returns an empty list when the topology has no faces.
    pub fn border_vertices(&self) -> Vec<u32> {
        let mut edge_use: HashMap<(u32, u32), u32> = HashMap::new();
        for face in &self.faces {
            for (a, b) in polygon_edges(face) {
                let key = if a < b { (a, b) } else { (b, a) };
                *edge_use.entry(key).or_insert(0) += 1;
            }
        }

        let mut border: BTreeSet<u32> = BTreeSet::new();
        for ((a, b), count) in edge_use {
            if count == 1 {
                border.insert(a);
                border.insert(b);
            }
        }
        border.into_iter().collect()
    }

    /// Area-weighted vertex normals.
    ///
    /// Returns `None` without face data. Vertices not touched by any face get
    /// a zero normal.
    pub fn vertex_normals(&self) -> Option<Vec<Vec3>> {
        if self.faces.is_empty() {
            return None;
        }

        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for face in &self.faces {
            // Newell's method: magnitude is twice the polygon area
            let mut face_normal = Vec3::ZERO;
            for (a, b) in polygon_edges(face) {
                let p = self.positions[a as usize];
                let q = self.positions[b as usize];
                face_normal.x += (p.y - q.y) * (p.z + q.z);
                face_normal.y += (p.z - q.z) * (p.x + q.x);
                face_normal.z += (p.x - q.x) * (p.y + q.y);
            }
            for &v in face {
                normals[v as usize] += face_normal;
            }
        }

        Some(normals.into_iter().map(|n| n.normalize_or_zero()).collect())
    }
}

/// Consecutive vertex pairs around a polygon, closing back to the start.
fn polygon_edges(face: &[u32]) -> impl Iterator<Item = (u32, u32)> + '_ {
    let n = face.len();
    (0..n).map(move |i| (face[i], face[(i + 1) % n]))
}
