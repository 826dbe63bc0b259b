//! Distance- and angle-based fields around a center point.

use glam::Vec3;
use mesh_data::{Axis, ComponentSelection, MeshData, MeshDataFactory, MeshSource};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Target, run_logged};
use crate::error::WeightError;
use crate::falloff::FalloffType;

/// How distance from the center is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RadialMode {
    /// Straight-line distance from the center
    #[default]
    Radial,
    /// Azimuth angle around `axis`, mapped through `angle_range`
    Spherical,
    /// Distance from the line through the center along `axis`
    Cylindrical,
}

/// Parameters for a radial field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialRecipe {
    pub mode: RadialMode,
    /// Defaults to the mesh center
    pub center: Option<Vec3>,
    /// Defaults to the largest measured distance
    pub radius: Option<f32>,
    pub falloff: FalloffType,
    pub invert: bool,
    /// Measure radial distance in bounding-box normalized space
    pub use_volume: bool,
    /// Reference axis for spherical and cylindrical modes
    pub axis: Axis,
    /// Degrees mapped to 0 and 1 in spherical mode
    pub angle_range: (f32, f32),
}

impl Default for RadialRecipe {
    fn default() -> Self {
        Self {
            mode: RadialMode::Radial,
            center: None,
            radius: None,
            falloff: FalloffType::Linear,
            invert: false,
            use_volume: false,
            axis: Axis::Y,
            angle_range: (0.0, 360.0),
        }
    }
}

impl RadialRecipe {
    pub fn radial(radius: Option<f32>, falloff: FalloffType) -> Self {
        Self {
            radius,
            falloff,
            ..Default::default()
        }
    }

    pub fn cylindrical(axis: Axis, radius: Option<f32>, falloff: FalloffType) -> Self {
        Self {
            mode: RadialMode::Cylindrical,
            axis,
            radius,
            falloff,
            ..Default::default()
        }
    }

    pub fn spherical(axis: Axis, angle_range: (f32, f32), falloff: FalloffType) -> Self {
        Self {
            mode: RadialMode::Spherical,
            axis,
            angle_range,
            falloff,
            ..Default::default()
        }
    }

    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = Some(center);
        self
    }

    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }
}

/// `1 - d/r` inside the radius, 0 outside.
///
/// With a zero radius, vertices exactly at the center get full weight.
fn distance_to_weight(distances: &[f32], radius: f32) -> Vec<f32> {
    distances
        .iter()
        .map(|&d| {
            if d > radius {
                0.0
            } else if radius > 0.0 {
                1.0 - d / radius
            } else {
                1.0
            }
        })
        .collect()
}

/// Generates weights from distance or angle around a center.
#[derive(Debug, Clone)]
pub struct RadialOperation {
    target: Target,
}

impl RadialOperation {
    pub fn new(mesh: MeshData) -> Self {
        Self {
            target: Target::new(mesh),
        }
    }

    /// Host selection used by [`ComponentSelection::Selected`]
    pub fn with_host_selection(mut self, selection: Vec<u32>) -> Self {
        self.target.host_selection = selection;
        self
    }

    /// The field described by `recipe`, one weight per vertex.
    pub fn field(&self, recipe: &RadialRecipe) -> Result<Vec<f32>, WeightError> {
        if let Some(radius) = recipe.radius {
            if !(radius > 0.0) {
                return Err(WeightError::InvalidParameter {
                    name: "radius",
                    reason: format!("{} is not positive", radius),
                });
            }
        }

        let mesh = &self.target.mesh;
        let center = recipe.center.unwrap_or_else(|| mesh.center());

        let mapped = match recipe.mode {
            RadialMode::Radial => {
                let distances = if recipe.use_volume {
                    self.volume_distances(center)
                } else {
                    mesh.positions().iter().map(|p| p.distance(center)).collect()
                };
                self.fit_radius(&distances, recipe.radius)
            }
            RadialMode::Cylindrical => {
                let (a, b) = recipe.axis.others();
                let distances: Vec<f32> = mesh
                    .positions()
                    .iter()
                    .map(|&p| {
                        let r = p - center;
                        a.component(r).hypot(b.component(r))
                    })
                    .collect();
                self.fit_radius(&distances, recipe.radius)
            }
            RadialMode::Spherical => self.angles(center, recipe.axis, recipe.angle_range)?,
        };

        let mut weights = recipe.falloff.apply(&mapped);
        if recipe.invert {
            for w in weights.iter_mut() {
                *w = 1.0 - *w;
            }
        }

        debug!(
            "Generated {:?} field on {} ({} vertices)",
            recipe.mode,
            mesh.name(),
            weights.len()
        );
        Ok(weights)
    }

    /// Replace weights with the field where `selection` applies.
    pub fn apply(
        &self,
        weights: &[f32],
        recipe: &RadialRecipe,
        selection: &ComponentSelection,
    ) -> Result<Vec<f32>, WeightError> {
        self.target.check_length(weights)?;
        let field = self.field(recipe)?;
        self.target.replace_selected(weights, field, selection)
    }

    fn fit_radius(&self, distances: &[f32], radius: Option<f32>) -> Vec<f32> {
        let radius = radius.unwrap_or_else(|| distances.iter().copied().fold(0.0, f32::max));
        distance_to_weight(distances, radius)
    }

    fn volume_distances(&self, center: Vec3) -> Vec<f32> {
        let bounds = self.target.mesh.bounding_box();
        let center = bounds.normalize_point(center);
        self.target
            .mesh
            .positions()
            .iter()
            .map(|&p| bounds.normalize_point(p).distance(center))
            .collect()
    }

    fn angles(
        &self,
        center: Vec3,
        axis: Axis,
        (min_deg, max_deg): (f32, f32),
    ) -> Result<Vec<f32>, WeightError> {
        if min_deg == max_deg {
            return Err(WeightError::InvalidRange {
                min: min_deg,
                max: max_deg,
            });
        }
        let (min, max) = (min_deg.to_radians(), max_deg.to_radians());
        Ok(self
            .target
            .mesh
            .positions()
            .iter()
            .map(|&p| {
                let r = p - center;
                let angle = match axis {
                    Axis::X => r.y.atan2(r.z),
                    Axis::Y => r.x.atan2(r.z),
                    Axis::Z => r.x.atan2(r.y),
                };
                ((angle - min) / (max - min)).clamp(0.0, 1.0)
            })
            .collect())
    }
}

/// Apply a radial field on `mesh` through `factory`, logging and returning
/// `None` on failure.
pub fn set_radial_weights<S: MeshSource>(
    factory: &mut MeshDataFactory<S>,
    mesh: &str,
    weights: &[f32],
    recipe: &RadialRecipe,
    selection: &ComponentSelection,
) -> Option<Vec<f32>> {
    run_logged(factory, mesh, "Radial", |target| {
        RadialOperation { target }.apply(weights, recipe, selection)
    })
}
