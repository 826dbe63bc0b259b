//! Component masks: index sets that restrict where an operation applies.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

use crate::types::MeshError;

/// One mask entry: a single vertex or a half-open range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaskEntry {
    Index(u32),
    Range { start: u32, end: u32 },
}

impl MaskEntry {
    fn validate(&self, vertex_count: usize) -> Result<(), MeshError> {
        match *self {
            MaskEntry::Index(index) => {
                if index as usize >= vertex_count {
                    return Err(MeshError::IndexOutOfRange {
                        index,
                        vertex_count,
                    });
                }
            }
            MaskEntry::Range { start, end } => {
                if start >= end {
                    return Err(MeshError::InvalidMask(format!(
                        "range start {} must be less than end {}",
                        start, end
                    )));
                }
                if end as usize > vertex_count {
                    return Err(MeshError::InvalidMask(format!(
                        "range end {} exceeds vertex count {}",
                        end, vertex_count
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A set of vertex indices expressed as single indices and ranges.
///
/// Masks are validated against the vertex count at use time, not at
/// construction, since the same mask may be reused across meshes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentMask {
    entries: Vec<MaskEntry>,
}

impl ComponentMask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<MaskEntry>) -> Self {
        Self { entries }
    }

    pub fn from_indices(indices: impl IntoIterator<Item = u32>) -> Self {
        Self {
            entries: indices.into_iter().map(MaskEntry::Index).collect(),
        }
    }

    pub fn push_index(&mut self, index: u32) -> &mut Self {
        self.entries.push(MaskEntry::Index(index));
        self
    }

    /// Add the half-open range `[start, end)`.
    pub fn push_range(&mut self, start: u32, end: u32) -> &mut Self {
        self.entries.push(MaskEntry::Range { start, end });
        self
    }

    pub fn entries(&self) -> &[MaskEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check every entry against `vertex_count`.
    pub fn validate(&self, vertex_count: usize) -> Result<(), MeshError> {
        self.entries
            .iter()
            .try_for_each(|entry| entry.validate(vertex_count))
    }

    /// Per-vertex membership flags.
    pub fn to_flags(&self, vertex_count: usize) -> Result<Vec<bool>, MeshError> {
        self.validate(vertex_count)?;
        let mut flags = vec![false; vertex_count];
        for entry in &self.entries {
            match *entry {
                MaskEntry::Index(index) => flags[index as usize] = true,
                MaskEntry::Range { start, end } => {
                    flags[start as usize..end as usize].fill(true);
                }
            }
        }
        Ok(flags)
    }

    /// Sorted, deduplicated vertex indices covered by the mask.
    pub fn indices(&self, vertex_count: usize) -> Result<Vec<u32>, MeshError> {
        let flags = self.to_flags(vertex_count)?;
        Ok(flags
            .iter()
            .enumerate()
            .filter_map(|(i, &set)| set.then_some(i as u32))
            .collect())
    }

    /// Parse host range notation such as `"0:5,9"`.
    ///
    /// Ranges in text are inclusive (`0:5` covers 0 through 5).
    pub fn parse(text: &str) -> Result<Self, MeshError> {
        let mut mask = Self::new();
        for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once(':') {
                Some((start, end)) => {
                    let start = parse_index(start)?;
                    let end = parse_index(end)?;
                    if start > end {
                        return Err(MeshError::InvalidMask(format!(
                            "range {}:{} is reversed",
                            start, end
                        )));
                    }
                    let end = end.checked_add(1).ok_or_else(|| {
                        MeshError::InvalidMask(format!("range end {} is too large", end))
                    })?;
                    mask.push_range(start, end);
                }
                None => {
                    mask.push_index(parse_index(part)?);
                }
            }
        }
        Ok(mask)
    }
}

impl FromStr for ComponentMask {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_index(text: &str) -> Result<u32, MeshError> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| MeshError::InvalidMask(format!("'{}' is not a vertex index", text.trim())))
}

/// Format indices in host range notation (`"0:5,9"`), inclusive ranges.
pub fn indices_to_range_str(indices: &[u32]) -> String {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut parts = Vec::new();
    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else {
        return String::new();
    };

    let (mut start, mut prev) = (first, first);
    for index in iter {
        if index != prev + 1 {
            parts.push(format_run(start, prev));
            start = index;
        }
        prev = index;
    }
    parts.push(format_run(start, prev));
    parts.join(",")
}

fn format_run(start: u32, end: u32) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{}:{}", start, end)
    }
}

/// Which vertices an operation should touch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentSelection {
    /// Every vertex
    #[default]
    All,
    /// The host's current selection on the mesh
    Selected,
    /// An explicit mask
    Mask(ComponentMask),
}

impl ComponentSelection {
    /// Resolve to per-vertex flags, or `None` meaning every vertex.
    ///
    /// `Selected` with an empty host selection resolves to every vertex.
    pub fn to_flags(
        &self,
        host_selection: &[u32],
        vertex_count: usize,
    ) -> Result<Option<Vec<bool>>, MeshError> {
        match self {
            ComponentSelection::All => Ok(None),
            ComponentSelection::Selected => {
                if host_selection.is_empty() {
                    info!("No components selected, using all {} vertices", vertex_count);
                    return Ok(None);
                }
                ComponentMask::from_indices(host_selection.iter().copied())
                    .to_flags(vertex_count)
                    .map(Some)
            }
            ComponentSelection::Mask(mask) => mask.to_flags(vertex_count).map(Some),
        }
    }
}
