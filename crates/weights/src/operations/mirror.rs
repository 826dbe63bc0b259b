//! Copying weights across an axis-aligned symmetry plane.

use glam::Vec3;
use mesh_data::{
    Axis, ComponentSelection, MeshData, MeshDataFactory, MeshSource, MirrorPairs,
    find_mirror_pairs,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, warn};
use weightpaint_config::{DEFAULT_MIRROR_TOLERANCE, PaintConfig};

use super::{Target, run_logged};
use crate::error::WeightError;

/// Side of the mirror plane whose weights are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorDirection {
    /// Copy from `axis > 0` to `axis < 0`
    #[default]
    Positive,
    /// Copy from `axis < 0` to `axis > 0`
    Negative,
}

impl MirrorDirection {
    fn is_source(self, coordinate: f32) -> bool {
        match self {
            MirrorDirection::Positive => coordinate > 0.0,
            MirrorDirection::Negative => coordinate < 0.0,
        }
    }
}

impl FromStr for MirrorDirection {
    type Err = WeightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" | "+" => Ok(MirrorDirection::Positive),
            "negative" | "-" => Ok(MirrorDirection::Negative),
            other => Err(WeightError::InvalidDirection(other.to_string())),
        }
    }
}

/// Reject tolerances that could never pair a vertex.
pub(crate) fn check_tolerance(tolerance: f32) -> Result<(), WeightError> {
    if !(tolerance > 0.0) {
        return Err(WeightError::InvalidParameter {
            name: "tolerance",
            reason: format!("{} is not positive", tolerance),
        });
    }
    Ok(())
}

/// Copy each source-side weight to its partner.
///
/// Reads from `weights` and writes into a copy, so the result does not
/// depend on pair order. `sources` limits which vertices may be copied from.
pub(crate) fn copy_across(
    weights: &[f32],
    positions: &[Vec3],
    pairs: &MirrorPairs,
    axis: Axis,
    direction: MirrorDirection,
    sources: Option<&[bool]>,
) -> Vec<f32> {
    let mut out = weights.to_vec();
    for (i, j) in pairs.iter() {
        if i == j {
            continue;
        }
        let (i, j) = (i as usize, j as usize);
        if direction.is_source(axis.component(positions[i])) && sources.is_none_or(|s| s[i]) {
            out[j] = weights[i];
        }
    }
    out
}

/// Makes weight maps symmetric across an axis-aligned plane through the
/// origin.
#[derive(Debug, Clone)]
pub struct MirrorOperation {
    target: Target,
    /// Pairing tolerance used by [`MirrorOperation::mirror`]
    tolerance: f32,
}

impl MirrorOperation {
    pub fn new(mesh: MeshData) -> Self {
        Self {
            target: Target::new(mesh),
            tolerance: DEFAULT_MIRROR_TOLERANCE,
        }
    }

    /// Take the default pairing tolerance from `config`.
    pub fn with_config(mut self, config: &PaintConfig) -> Self {
        self.tolerance = config.mirror_tolerance;
        self
    }

    /// Host selection used by [`ComponentSelection::Selected`]
    pub fn with_host_selection(mut self, selection: Vec<u32>) -> Self {
        self.target.host_selection = selection;
        self
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    fn pairs(&self, axis: Axis, tolerance: f32) -> Result<MirrorPairs, WeightError> {
        check_tolerance(tolerance)?;
        let pairs = find_mirror_pairs(self.target.mesh.positions(), axis, tolerance);
        debug!(
            "Found {} mirror-paired vertices of {} on {} across {:?}",
            pairs.paired_count(),
            self.target.mesh.vertex_count(),
            self.target.mesh.name(),
            axis
        );
        Ok(pairs)
    }

    /// [`MirrorOperation::mirror_weights`] with the configured tolerance.
    pub fn mirror(
        &self,
        weights: &[f32],
        axis: Axis,
        direction: MirrorDirection,
    ) -> Result<Vec<f32>, WeightError> {
        self.mirror_weights(weights, axis, self.tolerance, direction)
    }

    /// Copy weights from the `direction` side onto their partners.
    pub fn mirror_weights(
        &self,
        weights: &[f32],
        axis: Axis,
        tolerance: f32,
        direction: MirrorDirection,
    ) -> Result<Vec<f32>, WeightError> {
        self.target.check_length(weights)?;
        let pairs = self.pairs(axis, tolerance)?;
        Ok(copy_across(
            weights,
            self.target.mesh.positions(),
            &pairs,
            axis,
            direction,
            None,
        ))
    }

    /// Copy weights only from selected vertices on the positive side.
    ///
    /// An empty host selection leaves the weights unchanged.
    pub fn mirror_selected(
        &self,
        weights: &[f32],
        selection: &ComponentSelection,
        axis: Axis,
        tolerance: f32,
    ) -> Result<Vec<f32>, WeightError> {
        self.target.check_length(weights)?;
        if *selection == ComponentSelection::Selected && self.target.host_selection.is_empty() {
            warn!(
                "No components selected on {}, nothing to mirror",
                self.target.mesh.name()
            );
            return Ok(weights.to_vec());
        }
        let flags = self.target.resolve(selection)?;
        let pairs = self.pairs(axis, tolerance)?;
        Ok(copy_across(
            weights,
            self.target.mesh.positions(),
            &pairs,
            axis,
            MirrorDirection::Positive,
            flags.as_deref(),
        ))
    }
}

/// Mirror `mesh` through `factory`, logging and returning `None` on failure.
pub fn mirror_weights<S: MeshSource>(
    factory: &mut MeshDataFactory<S>,
    mesh: &str,
    weights: &[f32],
    axis: Axis,
    tolerance: f32,
    direction: MirrorDirection,
) -> Option<Vec<f32>> {
    run_logged(factory, mesh, "Mirror", |target| {
        MirrorOperation {
            target,
            tolerance,
        }
        .mirror_weights(weights, axis, tolerance, direction)
    })
}
