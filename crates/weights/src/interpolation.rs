//! Topology-aware smoothing of weight maps.
//!
//! Each pass blends a vertex toward the average of its neighbors:
//! `w ← w·(1-f) + avg·f`. Vertices without neighbors keep their value.

use glam::Vec3;
use mesh_data::{MeshData, MeshDataFactory, MeshSource};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use weightpaint_config::{DEFAULT_SMOOTH_FACTOR, DEFAULT_SMOOTH_ITERATIONS, PaintConfig};

use crate::error::WeightError;
use crate::falloff::FalloffType;

/// Offset keeping inverse-distance weights finite for coincident vertices
const DISTANCE_EPSILON: f32 = 1e-6;

/// Settings for [`WeightInterpolator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationSettings {
    /// Number of smoothing passes
    pub smooth_iterations: u32,
    /// Blend toward the neighbor average per pass (0.0 = none)
    pub smooth_factor: f32,
    /// Remap the result back to the input's min/max
    pub maintain_bounds: bool,
    /// Curve applied after smoothing
    pub falloff: FalloffType,
    /// Keep vertices on open edges fixed. Topology built without faces
    /// has no open edges, so nothing is held.
    pub preserve_borders: bool,
    /// Weight neighbors by inverse distance instead of a plain mean
    pub use_weighted_average: bool,
}

impl Default for InterpolationSettings {
    fn default() -> Self {
        Self {
            smooth_iterations: DEFAULT_SMOOTH_ITERATIONS,
            smooth_factor: DEFAULT_SMOOTH_FACTOR,
            maintain_bounds: true,
            falloff: FalloffType::Linear,
            preserve_borders: false,
            use_weighted_average: false,
        }
    }
}

impl InterpolationSettings {
    pub fn new(smooth_iterations: u32, smooth_factor: f32) -> Self {
        Self {
            smooth_iterations,
            smooth_factor,
            ..Default::default()
        }
    }

    /// Defaults with the pass count and factor from `config`.
    pub fn from_config(config: &PaintConfig) -> Self {
        Self::new(config.smooth_iterations, config.smooth_factor)
    }
}

/// One smoothing pass over `weights`.
///
/// `fixed` marks vertices that keep their value. With `positions`, the
/// neighbor average is weighted by `1 / (distance + ε)`.
pub(crate) fn smooth_pass(
    weights: &[f32],
    neighbors: &[Vec<u32>],
    factor: f32,
    fixed: Option<&[bool]>,
    positions: Option<&[Vec3]>,
) -> Vec<f32> {
    weights
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            let adjacent = &neighbors[i];
            if adjacent.is_empty() || fixed.is_some_and(|f| f[i]) {
                return w;
            }

            let average = match positions {
                Some(positions) => {
                    let origin = positions[i];
                    let mut total = 0.0;
                    let mut weighted = 0.0;
                    for &n in adjacent {
                        let inv = 1.0 / (positions[n as usize].distance(origin) + DISTANCE_EPSILON);
                        total += inv;
                        weighted += weights[n as usize] * inv;
                    }
                    weighted / total
                }
                None => {
                    let sum: f32 = adjacent.iter().map(|&n| weights[n as usize]).sum();
                    sum / adjacent.len() as f32
                }
            };

            w * (1.0 - factor) + average * factor
        })
        .collect()
}

fn min_max(values: &[f32]) -> (f32, f32) {
    values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Linearly remap `weights` so their range matches `(min, max)`.
///
/// A constant target or a constant input collapses to `min`.
fn remap_to_bounds(weights: &mut [f32], (min, max): (f32, f32)) {
    if min == max {
        weights.fill(min);
        return;
    }
    let (current_min, current_max) = min_max(weights);
    if current_min == current_max {
        weights.fill(min);
        return;
    }
    let scale = (max - min) / (current_max - current_min);
    for w in weights.iter_mut() {
        *w = min + (*w - current_min) * scale;
    }
}

/// Smooths weight maps over one mesh's adjacency.
#[derive(Debug, Clone)]
pub struct WeightInterpolator {
    mesh: MeshData,
    settings: InterpolationSettings,
}

impl WeightInterpolator {
    pub fn new(mesh: MeshData, settings: InterpolationSettings) -> Self {
        Self { mesh, settings }
    }

    pub fn settings(&self) -> &InterpolationSettings {
        &self.settings
    }

    pub fn interpolate(&self, weights: &[f32]) -> Result<Vec<f32>, WeightError> {
        if weights.is_empty() {
            return Ok(Vec::new());
        }
        let vertex_count = self.mesh.vertex_count();
        if weights.len() != vertex_count {
            return Err(WeightError::LengthMismatch {
                weights: weights.len(),
                vertices: vertex_count,
            });
        }

        let settings = &self.settings;
        let bounds = settings.maintain_bounds.then(|| min_max(weights));

        if settings.preserve_borders && !self.mesh.topology().has_faces() {
            warn!(
                "{} has no faces, so no border vertices are preserved",
                self.mesh.name()
            );
        }
        let fixed = settings.preserve_borders.then(|| {
            let mut flags = vec![false; vertex_count];
            for v in self.mesh.border_vertices() {
                flags[v as usize] = true;
            }
            flags
        });
        let positions = settings
            .use_weighted_average
            .then(|| self.mesh.positions());

        let mut current = weights.to_vec();
        for _ in 0..settings.smooth_iterations {
            current = smooth_pass(
                &current,
                self.mesh.neighbors(),
                settings.smooth_factor,
                fixed.as_deref(),
                positions,
            );
        }

        if !settings.falloff.is_linear() {
            current = settings.falloff.apply(&current);
        }

        if let Some(bounds) = bounds {
            remap_to_bounds(&mut current, bounds);
        }

        debug!(
            "Interpolated {} weights on {} ({} passes, factor {})",
            current.len(),
            self.mesh.name(),
            settings.smooth_iterations,
            settings.smooth_factor
        );
        Ok(current)
    }
}

/// Smooth `weights` on `mesh`, logging and returning `None` on failure.
///
/// `settings` overrides `smooth_iterations` and `smooth_factor` when given.
pub fn interpolate_vertex_map<S: MeshSource>(
    factory: &mut MeshDataFactory<S>,
    mesh: &str,
    weights: &[f32],
    smooth_iterations: u32,
    smooth_factor: f32,
    settings: Option<InterpolationSettings>,
) -> Option<Vec<f32>> {
    let settings =
        settings.unwrap_or_else(|| InterpolationSettings::new(smooth_iterations, smooth_factor));

    let result = factory
        .get(mesh)
        .map_err(WeightError::from)
        .and_then(|data| WeightInterpolator::new(data, settings).interpolate(weights));

    match result {
        Ok(weights) => Some(weights),
        Err(e) => {
            error!("Failed to interpolate vertex map on {}: {}", mesh, e);
            None
        }
    }
}
