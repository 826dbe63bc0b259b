//! Mirror axes and brute-force vertex pairing.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::MeshError;

/// Cartesian axis used for mirroring and axis-relative fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index (x = 0, y = 1, z = 2)
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Unit vector along the axis
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    /// The two remaining axes, in cyclic order
    pub fn others(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::Z, Axis::X),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }

    /// Component of `v` along this axis
    pub fn component(self, v: Vec3) -> f32 {
        v[self.index()]
    }
}

impl FromStr for Axis {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            other => Err(MeshError::InvalidAxis(other.to_string())),
        }
    }
}

/// Partner lookup produced by [`find_mirror_pairs`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MirrorPairs {
    partner: Vec<Option<u32>>,
}

impl MirrorPairs {
    /// Mirror partner of `vertex`. On-plane vertices are their own partner.
    pub fn partner(&self, vertex: u32) -> Option<u32> {
        self.partner.get(vertex as usize).copied().flatten()
    }

    /// Number of vertices with a partner (self-paired included)
    pub fn paired_count(&self) -> usize {
        self.partner.iter().filter(|p| p.is_some()).count()
    }

    /// Every `(vertex, partner)` entry, both orientations included.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.partner
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|j| (i as u32, j)))
    }
}

/// Pair vertices mirrored across the plane through the origin normal to `axis`.
///
/// Two vertices pair when their `axis` components cancel within `tolerance`
/// and the other two components match within `tolerance`. The first match
/// wins and each vertex pairs at most once. Unpaired vertices lying on the
/// plane pair with themselves. O(n²).
pub fn find_mirror_pairs(positions: &[Vec3], axis: Axis, tolerance: f32) -> MirrorPairs {
    let n = positions.len();
    let mut partner: Vec<Option<u32>> = vec![None; n];
    let (a1, a2) = axis.others();

    for i in 0..n {
        if partner[i].is_some() {
            continue;
        }
        let p = positions[i];
        let mut found = false;

        for j in (i + 1)..n {
            if partner[j].is_some() {
                continue;
            }
            let q = positions[j];
            if (axis.component(p) + axis.component(q)).abs() < tolerance
                && (a1.component(p) - a1.component(q)).abs() < tolerance
                && (a2.component(p) - a2.component(q)).abs() < tolerance
            {
                partner[i] = Some(j as u32);
                partner[j] = Some(i as u32);
                found = true;
                break;
            }
        }

        if !found && axis.component(p).abs() < tolerance {
            partner[i] = Some(i as u32);
        }
    }

    MirrorPairs { partner }
}

/// Pair vertices whose positions coincide within `tolerance` (seam welding).
///
/// Returns `(a, b)` with `a < b`. Each vertex appears in at most one pair.
pub fn find_coincident_pairs(positions: &[Vec3], tolerance: f32) -> Vec<(u32, u32)> {
    let n = positions.len();
    let mut used = vec![false; n];
    let mut pairs = Vec::new();

    for i in 0..n {
        if used[i] {
            continue;
        }
        for j in (i + 1)..n {
            if used[j] {
                continue;
            }
            if positions[i].distance(positions[j]) <= tolerance {
                used[i] = true;
                used[j] = true;
                pairs.push((i as u32, j as u32));
                break;
            }
        }
    }

    pairs
}
