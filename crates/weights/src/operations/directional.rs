//! Gradient fields along a direction or from vertex normals.

use glam::Vec3;
use mesh_data::{ComponentSelection, MeshData, MeshDataFactory, MeshSource};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Target, run_logged};
use crate::error::WeightError;
use crate::falloff::FalloffType;
use crate::vectors::{
    Direction, DirectionSpec, DistanceMode, direction_vector, distance_along_vector,
};

/// Parameters for a directional field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DirectionalRecipe {
    /// Position along a direction from `origin`
    Vector {
        direction: DirectionSpec,
        /// Distances mapped to 0 and 1. Defaults to the measured min/max.
        #[serde(default)]
        remap_range: Option<(f32, f32)>,
        #[serde(default)]
        falloff: FalloffType,
        /// Defaults to the mesh center
        #[serde(default)]
        origin: Option<Vec3>,
        #[serde(default)]
        mode: DistanceMode,
    },
    /// Position along the segment direction from `start` toward `end`
    BetweenPoints {
        start: Vec3,
        end: Vec3,
        #[serde(default)]
        falloff: FalloffType,
    },
    /// How much each vertex normal points up (+Y)
    Normal {
        #[serde(default)]
        falloff: FalloffType,
        #[serde(default)]
        invert: bool,
    },
}

impl DirectionalRecipe {
    /// Gradient along `direction` over the full extent of the mesh.
    pub fn vector(direction: impl Into<DirectionSpec>, falloff: FalloffType) -> Self {
        DirectionalRecipe::Vector {
            direction: direction.into(),
            remap_range: None,
            falloff,
            origin: None,
            mode: DistanceMode::Projection,
        }
    }
}

/// Generates gradients from vertex positions or normals.
#[derive(Debug, Clone)]
pub struct DirectionalOperation {
    target: Target,
}

impl DirectionalOperation {
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

    /// Distance of each vertex along `direction`, remapped to `[0, 1]`.
    ///
    /// Radial directions measure plain distance from `origin`, with
    /// `radial_in` reversed. A degenerate remap range yields all zeros.
    pub fn by_vector(
        &self,
        direction: &DirectionSpec,
        remap_range: Option<(f32, f32)>,
        falloff: FalloffType,
        origin: Option<Vec3>,
        mode: DistanceMode,
    ) -> Result<Vec<f32>, WeightError> {
        let mesh = &self.target.mesh;
        let origin = origin.unwrap_or_else(|| mesh.center());

        let (vector, mode, reverse) = match direction_vector(direction) {
            Some(v) => (v, mode, false),
            None => (
                Vec3::ZERO,
                DistanceMode::Distance,
                *direction == DirectionSpec::Named(Direction::RadialIn),
            ),
        };

        let distances: Vec<f32> = mesh
            .positions()
            .iter()
            .map(|&p| distance_along_vector(p, vector, origin, mode))
            .collect();

        let (min, max) = remap_range.unwrap_or_else(|| {
            distances
                .iter()
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &d| {
                    (lo.min(d), hi.max(d))
                })
        });
        if distances.is_empty() || min == max {
            debug!("Degenerate remap range on {}, returning zeros", mesh.name());
            return Ok(vec![0.0; distances.len()]);
        }

        let remapped: Vec<f32> = distances
            .iter()
            .map(|&d| {
                let t = ((d - min) / (max - min)).clamp(0.0, 1.0);
                if reverse { 1.0 - t } else { t }
            })
            .collect();
        Ok(falloff.apply(&remapped))
    }

    /// Gradient from `start` (0) toward `end` (1) over the mesh extent.
    pub fn between_points(
        &self,
        start: Vec3,
        end: Vec3,
        falloff: FalloffType,
    ) -> Result<Vec<f32>, WeightError> {
        let vector = end - start;
        if vector.length_squared() == 0.0 {
            return Err(WeightError::InvalidParameter {
                name: "end",
                reason: "start and end points coincide".to_string(),
            });
        }
        self.by_vector(
            &DirectionSpec::Custom(vector),
            None,
            falloff,
            Some(start),
            DistanceMode::Projection,
        )
    }

    /// `(n.y + 1) / 2` per vertex normal: 1 facing up, 0 facing down.
    pub fn by_normal(&self, falloff: FalloffType, invert: bool) -> Result<Vec<f32>, WeightError> {
        let mesh = &self.target.mesh;
        let normals = mesh
            .vertex_normals()
            .ok_or_else(|| WeightError::MissingNormals(mesh.name().to_string()))?;

        let facing: Vec<f32> = normals.iter().map(|n| (n.y + 1.0) * 0.5).collect();
        let mut weights = falloff.apply(&facing);
        if invert {
            for w in weights.iter_mut() {
                *w = 1.0 - *w;
            }
        }
        Ok(weights)
    }

    /// The field described by `recipe`, one weight per vertex.
    pub fn field(&self, recipe: &DirectionalRecipe) -> Result<Vec<f32>, WeightError> {
        match *recipe {
            DirectionalRecipe::Vector {
                ref direction,
                remap_range,
                falloff,
                origin,
                mode,
            } => self.by_vector(direction, remap_range, falloff, origin, mode),
            DirectionalRecipe::BetweenPoints { start, end, falloff } => {
                self.between_points(start, end, falloff)
            }
            DirectionalRecipe::Normal { falloff, invert } => self.by_normal(falloff, invert),
        }
    }

    /// Replace weights with the field where `selection` applies.
    pub fn apply(
        &self,
        weights: &[f32],
        recipe: &DirectionalRecipe,
        selection: &ComponentSelection,
    ) -> Result<Vec<f32>, WeightError> {
        self.target.check_length(weights)?;
        let field = self.field(recipe)?;
        self.target.replace_selected(weights, field, selection)
    }
}

/// Apply a directional field on `mesh` through `factory`, logging and
/// returning `None` on failure.
pub fn set_directional_weights<S: MeshSource>(
    factory: &mut MeshDataFactory<S>,
    mesh: &str,
    weights: &[f32],
    recipe: &DirectionalRecipe,
    selection: &ComponentSelection,
) -> Option<Vec<f32>> {
    run_logged(factory, mesh, "Directional", |target| {
        DirectionalOperation { target }.apply(weights, recipe, selection)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_data::{InMemoryScene, primitives};

    fn line() -> DirectionalOperation {
        // x = 0, 1, 2, 3, 4
        DirectionalOperation::new(MeshData::from_topology("line", primitives::line(5, 1.0)))
    }

    fn assert_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-5, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_by_vector_full_extent() {
        let op = line();
        let field = op
            .field(&DirectionalRecipe::vector(Direction::X, FalloffType::Linear))
            .unwrap();
        assert_close(&field, &[0.0, 0.25, 0.5, 0.75, 1.0]);

        let reversed = op
            .field(&DirectionalRecipe::vector(Direction::NegX, FalloffType::Linear))
            .unwrap();
        assert_close(&reversed, &[1.0, 0.75, 0.5, 0.25, 0.0]);
    }

    #[test]
    fn test_by_vector_remap_range_clamps() {
        let field = line()
            .by_vector(
                &Direction::X.into(),
                Some((0.0, 1.0)),
                FalloffType::Linear,
                Some(Vec3::new(1.0, 0.0, 0.0)),
                DistanceMode::Projection,
            )
            .unwrap();
        assert_close(&field, &[0.0, 0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_degenerate_range_is_zero() {
        // Every vertex projects to the same distance along Y
        let field = line()
            .field(&DirectionalRecipe::vector(Direction::Y, FalloffType::gaussian()))
            .unwrap();
        assert_eq!(field, vec![0.0; 5]);
    }

    #[test]
    fn test_radial_directions() {
        let op = line();
        let origin = Some(Vec3::ZERO);
        let out = op
            .by_vector(
                &Direction::RadialOut.into(),
                None,
                FalloffType::Linear,
                origin,
                DistanceMode::Projection,
            )
            .unwrap();
        assert_close(&out, &[0.0, 0.25, 0.5, 0.75, 1.0]);

        let inward = op
            .by_vector(
                &Direction::RadialIn.into(),
                None,
                FalloffType::Linear,
                origin,
                DistanceMode::Projection,
            )
            .unwrap();
        assert_close(&inward, &[1.0, 0.75, 0.5, 0.25, 0.0]);
    }

    #[test]
    fn test_between_points() {
        let op = line();
        let field = op
            .between_points(Vec3::new(4.0, 0.0, 0.0), Vec3::ZERO, FalloffType::Linear)
            .unwrap();
        assert_close(&field, &[1.0, 0.75, 0.5, 0.25, 0.0]);
        assert!(op.between_points(Vec3::ONE, Vec3::ONE, FalloffType::Linear).is_err());
    }

    #[test]
    fn test_by_normal() {
        let plane = DirectionalOperation::new(MeshData::from_topology(
            "plane",
            primitives::plane(1, 1, 1.0, 1.0),
        ));
        assert_close(&plane.by_normal(FalloffType::Linear, false).unwrap(), &[1.0; 4]);
        assert_close(&plane.by_normal(FalloffType::Linear, true).unwrap(), &[0.0; 4]);

        assert!(matches!(
            line().by_normal(FalloffType::Linear, false),
            Err(WeightError::MissingNormals(_))
        ));
    }

    #[test]
    fn test_set_directional_weights_selection() {
        let mut scene = InMemoryScene::new();
        scene.insert_mesh("line", primitives::line(5, 1.0));
        scene.select("line", [0, 4]);
        let mut factory = MeshDataFactory::new(scene);

        let recipe = DirectionalRecipe::vector(Direction::X, FalloffType::Linear);
        let selected = ComponentSelection::Selected;
        let out =
            set_directional_weights(&mut factory, "line", &[0.5; 5], &recipe, &selected).unwrap();
        assert_close(&out, &[0.0, 0.5, 0.5, 0.5, 1.0]);

        let normal = DirectionalRecipe::Normal {
            falloff: FalloffType::Linear,
            invert: false,
        };
        let all = ComponentSelection::All;
        assert!(set_directional_weights(&mut factory, "line", &[0.5; 5], &normal, &all).is_none());
    }

    #[test]
    fn test_recipe_serde() {
        let recipe: DirectionalRecipe =
            serde_json::from_str(r#"{"kind": "vector", "direction": "-z"}"#).unwrap();
        assert_eq!(recipe, DirectionalRecipe::vector(Direction::NegZ, FalloffType::Linear));

        let recipe: DirectionalRecipe = serde_json::from_str(
            r#"{
                "kind": "between_points",
                "start": [0, 0, 0],
                "end": [1, 0, 0],
                "falloff": {"type": "smooth"}
            }"#,
        )
        .unwrap();
        assert!(matches!(
            recipe,
            DirectionalRecipe::BetweenPoints {
                falloff: FalloffType::Smooth,
                ..
            }
        ));
    }
}
