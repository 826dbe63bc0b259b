//! Procedural meshes for tests and demos.

use glam::Vec3;

use crate::topology::MeshTopology;

/// Flat grid in the XZ plane, centered at the origin, facing +Y.
///
/// Vertex `(ix, iz)` has index `iz * (segments_x + 1) + ix`. The grid is
/// symmetric about X = 0 and Z = 0.
pub fn plane(segments_x: u32, segments_z: u32, width: f32, depth: f32) -> MeshTopology {
    let segments_x = segments_x.max(1);
    let segments_z = segments_z.max(1);
    let row = segments_x + 1;

    let mut positions = Vec::with_capacity(((segments_x + 1) * (segments_z + 1)) as usize);
    for iz in 0..=segments_z {
        for ix in 0..=segments_x {
            let x = -width * 0.5 + width * ix as f32 / segments_x as f32;
            let z = -depth * 0.5 + depth * iz as f32 / segments_z as f32;
            positions.push(Vec3::new(x, 0.0, z));
        }
    }

    let mut faces = Vec::with_capacity((segments_x * segments_z) as usize);
    for iz in 0..segments_z {
        for ix in 0..segments_x {
            let a = iz * row + ix;
            faces.push(vec![a, a + row, a + row + 1, a + 1]);
        }
    }

    // Indices are generated in range, so construction cannot fail
    match MeshTopology::from_polygons(positions, faces) {
        Ok(topology) => topology,
        Err(e) => unreachable!("plane primitive produced invalid topology: {e}"),
    }
}

/// Chain of `count` vertices along +X with no faces.
pub fn line(count: u32, spacing: f32) -> MeshTopology {
    let positions = (0..count)
        .map(|i| Vec3::new(i as f32 * spacing, 0.0, 0.0))
        .collect();
    let neighbors = (0..count)
        .map(|i| {
            let mut n = Vec::with_capacity(2);
            if i > 0 {
                n.push(i - 1);
            }
            if i + 1 < count {
                n.push(i + 1);
            }
            n
        })
        .collect();

    match MeshTopology::from_adjacency(positions, neighbors) {
        Ok(topology) => topology,
        Err(e) => unreachable!("line primitive produced invalid topology: {e}"),
    }
}

/// Chain of `count` vertices along +X centered on X = 0, with vertex order
/// shuffled so that mirror partners are not adjacent in index space.
pub fn symmetric_strip(count: u32, spacing: f32) -> MeshTopology {
    let half = (count as f32 - 1.0) * spacing * 0.5;
    // Even indices first, then odd ones: position order differs from index order
    let order: Vec<u32> = (0..count).step_by(2).chain((1..count).step_by(2)).collect();
    let mut index_of = vec![0u32; count as usize];
    for (index, &slot) in order.iter().enumerate() {
        index_of[slot as usize] = index as u32;
    }

    let mut positions = vec![Vec3::ZERO; count as usize];
    let mut neighbors = vec![Vec::new(); count as usize];
    for slot in 0..count {
        let index = index_of[slot as usize] as usize;
        positions[index] = Vec3::new(slot as f32 * spacing - half, 0.0, 0.0);
        if slot > 0 {
            neighbors[index].push(index_of[(slot - 1) as usize]);
        }
        if slot + 1 < count {
            neighbors[index].push(index_of[(slot + 1) as usize]);
        }
    }

    match MeshTopology::from_adjacency(positions, neighbors) {
        Ok(topology) => topology,
        Err(e) => unreachable!("strip primitive produced invalid topology: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_layout() {
        let mesh = plane(2, 2, 2.0, 2.0);
        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(mesh.faces().len(), 4);
        assert_eq!(mesh.positions()[0], Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(mesh.positions()[4], Vec3::ZERO);
        // Center vertex is interior with four edge neighbors
        assert_eq!(mesh.neighbors()[4], vec![1, 3, 5, 7]);
        assert_eq!(mesh.border_vertices(), vec![0, 1, 2, 3, 5, 6, 7, 8]);
    }

    #[test]
    fn test_line_chain() {
        let mesh = line(3, 0.5);
        assert_eq!(mesh.neighbors()[0], vec![1]);
        assert_eq!(mesh.neighbors()[1], vec![0, 2]);
        assert_eq!(mesh.positions()[2], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(line(0, 1.0).vertex_count(), 0);
    }

    #[test]
    fn test_symmetric_strip() {
        let mesh = symmetric_strip(5, 1.0);
        // Slots 0,2,4 land on indices 0,1,2; slots 1,3 on 3,4
        assert_eq!(mesh.positions()[0].x, -2.0);
        assert_eq!(mesh.positions()[1].x, 0.0);
        assert_eq!(mesh.positions()[2].x, 2.0);
        assert_eq!(mesh.positions()[3].x, -1.0);
        assert_eq!(mesh.positions()[4].x, 1.0);
        assert_eq!(mesh.neighbors()[1], vec![3, 4]);
    }
}
