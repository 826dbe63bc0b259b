//! Filling a value into selected weights.

use mesh_data::{ComponentSelection, MeshData, MeshDataFactory, MeshSource};
use tracing::debug;

use super::{Target, run_logged};
use crate::error::WeightError;
use crate::weight_data::{ClampRange, OperationType, apply_operation};

/// Fills a value into the weights of selected vertices.
#[derive(Debug, Clone)]
pub struct FloodOperation {
    target: Target,
}

impl FloodOperation {
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

    /// Apply `operation` with `value` where `selection` applies, then clamp
    /// the whole array.
    pub fn flood(
        &self,
        weights: &[f32],
        value: f32,
        operation: OperationType,
        selection: &ComponentSelection,
        clamp: ClampRange,
    ) -> Result<Vec<f32>, WeightError> {
        self.target.check_length(weights)?;
        clamp.validate()?;
        let flags = self.target.resolve(selection)?;
        Ok(self.apply(weights, value, operation, flags.as_deref(), clamp))
    }

    pub fn flood_all(
        &self,
        weights: &[f32],
        value: f32,
        operation: OperationType,
        clamp: ClampRange,
    ) -> Result<Vec<f32>, WeightError> {
        self.flood(weights, value, operation, &ComponentSelection::All, clamp)
    }

    /// Flood the host selection, or everything when nothing is selected.
    pub fn flood_selected(
        &self,
        weights: &[f32],
        value: f32,
        operation: OperationType,
        clamp: ClampRange,
    ) -> Result<Vec<f32>, WeightError> {
        self.flood(weights, value, operation, &ComponentSelection::Selected, clamp)
    }

    /// Flood vertices whose current weight lies in `[min_weight, max_weight]`.
    pub fn flood_in_range(
        &self,
        weights: &[f32],
        value: f32,
        min_weight: f32,
        max_weight: f32,
        operation: OperationType,
        clamp: ClampRange,
    ) -> Result<Vec<f32>, WeightError> {
        self.target.check_length(weights)?;
        clamp.validate()?;
        if min_weight > max_weight {
            return Err(WeightError::InvalidRange {
                min: min_weight,
                max: max_weight,
            });
        }
        let flags: Vec<bool> = weights
            .iter()
            .map(|w| (min_weight..=max_weight).contains(w))
            .collect();
        Ok(self.apply(weights, value, operation, Some(&flags), clamp))
    }

    fn apply(
        &self,
        weights: &[f32],
        value: f32,
        operation: OperationType,
        flags: Option<&[bool]>,
        clamp: ClampRange,
    ) -> Vec<f32> {
        let mut out = weights.to_vec();
        apply_operation(&mut out, value, operation, flags);
        clamp.apply(&mut out);

        let affected = flags.map_or(out.len(), |f| f.iter().filter(|&&s| s).count());
        debug!(
            "Flooded {:?} {} on {} of {} vertices of {}",
            operation,
            value,
            affected,
            out.len(),
            self.target.mesh.name()
        );
        out
    }
}

/// Flood `mesh` through `factory`, logging and returning `None` on failure.
pub fn flood_weights<S: MeshSource>(
    factory: &mut MeshDataFactory<S>,
    mesh: &str,
    weights: &[f32],
    value: f32,
    operation: OperationType,
    selection: &ComponentSelection,
    clamp: ClampRange,
) -> Option<Vec<f32>> {
    run_logged(factory, mesh, "Flood", |target| {
        FloodOperation { target }.flood(weights, value, operation, selection, clamp)
    })
}
