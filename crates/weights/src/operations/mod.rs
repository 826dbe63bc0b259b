//! Declarative weight operations over one mesh.
//!
//! Each operation is built from a [`MeshData`] plus the host's current
//! selection on that mesh. Methods take the current weights and return a new
//! array of the same length. Generated fields only replace weights where the
//! [`ComponentSelection`] applies.
//!
//! The free functions (`flood_weights`, `mirror_weights`, ...) resolve the
//! mesh through a [`MeshDataFactory`] and log failures instead of returning
//! them.

pub mod directional;
pub mod flood;
pub mod mirror;
pub mod radial;

pub use directional::{DirectionalOperation, DirectionalRecipe, set_directional_weights};
pub use flood::{FloodOperation, flood_weights};
pub use mirror::{MirrorDirection, MirrorOperation, mirror_weights};
pub use radial::{RadialMode, RadialOperation, RadialRecipe, set_radial_weights};

use mesh_data::{ComponentSelection, MeshData, MeshDataFactory, MeshSource};
use tracing::error;

use crate::error::WeightError;

/// Mesh and host selection an operation runs against.
#[derive(Debug, Clone)]
pub(crate) struct Target {
    pub mesh: MeshData,
    pub host_selection: Vec<u32>,
}

impl Target {
    pub fn new(mesh: MeshData) -> Self {
        Self {
            mesh,
            host_selection: Vec::new(),
        }
    }

    pub fn check_length(&self, weights: &[f32]) -> Result<(), WeightError> {
        let vertices = self.mesh.vertex_count();
        if weights.len() != vertices {
            return Err(WeightError::LengthMismatch {
                weights: weights.len(),
                vertices,
            });
        }
        Ok(())
    }

    /// Per-vertex flags for `selection`, `None` meaning every vertex.
    pub fn resolve(
        &self,
        selection: &ComponentSelection,
    ) -> Result<Option<Vec<bool>>, WeightError> {
        Ok(selection.to_flags(&self.host_selection, self.mesh.vertex_count())?)
    }

    /// Replace `weights` with `field` where `selection` applies.
    pub fn replace_selected(
        &self,
        weights: &[f32],
        field: Vec<f32>,
        selection: &ComponentSelection,
    ) -> Result<Vec<f32>, WeightError> {
        self.check_length(weights)?;
        let Some(flags) = self.resolve(selection)? else {
            return Ok(field);
        };
        Ok(weights
            .iter()
            .zip(field)
            .zip(flags)
            .map(|((&old, new), selected)| if selected { new } else { old })
            .collect())
    }
}

/// Resolve `mesh` through `factory` and run `op`, logging any failure.
pub(crate) fn run_logged<S, T>(
    factory: &mut MeshDataFactory<S>,
    mesh: &str,
    label: &str,
    op: impl FnOnce(Target) -> Result<T, WeightError>,
) -> Option<T>
where
    S: MeshSource,
{
    let result = factory.get(mesh).map_err(WeightError::from).and_then(|data| {
        let target = Target {
            host_selection: factory.selected_vertices(mesh),
            mesh: data,
        };
        op(target)
    });

    match result {
        Ok(value) => Some(value),
        Err(e) => {
            error!("{} operation failed on {}: {}", label, mesh, e);
            None
        }
    }
}
