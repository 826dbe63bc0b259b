//! Validated per-vertex weight arrays with chainable edits.

use mesh_data::{Axis, ComponentMask, MeshData, find_mirror_pairs};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

use crate::error::WeightError;
use crate::interpolation::smooth_pass;
use crate::operations::mirror::{MirrorDirection, check_tolerance, copy_across};

/// Arithmetic applied by [`WeightData::modify`] and the flood operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    #[default]
    Replace,
    Add,
    Subtract,
    Multiply,
}

impl OperationType {
    pub fn apply(self, current: f32, value: f32) -> f32 {
        match self {
            OperationType::Replace => value,
            OperationType::Add => current + value,
            OperationType::Subtract => current - value,
            OperationType::Multiply => current * value,
        }
    }
}

impl FromStr for OperationType {
    type Err = WeightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(OperationType::Replace),
            "add" => Ok(OperationType::Add),
            "subtract" => Ok(OperationType::Subtract),
            "multiply" => Ok(OperationType::Multiply),
            other => Err(WeightError::InvalidOperation(other.to_string())),
        }
    }
}

/// Optional lower and upper bounds applied to a whole weight array.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClampRange {
    pub min: Option<f32>,
    pub max: Option<f32>,
}

impl ClampRange {
    pub fn new(min: Option<f32>, max: Option<f32>) -> Self {
        Self { min, max }
    }

    /// Clamp to `[0, 1]`
    pub fn unit() -> Self {
        Self::new(Some(0.0), Some(1.0))
    }

    pub fn validate(&self) -> Result<(), WeightError> {
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(WeightError::InvalidRange { min, max });
            }
        }
        Ok(())
    }

    pub fn apply(&self, weights: &mut [f32]) {
        for w in weights.iter_mut() {
            if let Some(min) = self.min {
                *w = w.max(min);
            }
            if let Some(max) = self.max {
                *w = w.min(max);
            }
        }
    }
}

/// Apply `operation` with `value` to every weight whose flag is set, or to
/// all weights when `flags` is `None`.
pub(crate) fn apply_operation(
    weights: &mut [f32],
    value: f32,
    operation: OperationType,
    flags: Option<&[bool]>,
) {
    for (i, w) in weights.iter_mut().enumerate() {
        if flags.is_none_or(|f| f[i]) {
            *w = operation.apply(*w, value);
        }
    }
}

/// Summary statistics of a weight array.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WeightStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    /// Population standard deviation
    pub std: f32,
    pub non_zero: usize,
}

impl WeightStats {
    /// Statistics of `weights`. All zero for an empty slice.
    pub fn from_weights(weights: &[f32]) -> Self {
        if weights.is_empty() {
            return Self::default();
        }
        let n = weights.len() as f32;
        let (min, max) = weights
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &w| {
                (lo.min(w), hi.max(w))
            });
        let mean = weights.iter().sum::<f32>() / n;
        let variance = weights.iter().map(|w| (w - mean).powi(2)).sum::<f32>() / n;

        Self {
            min,
            max,
            mean,
            std: variance.sqrt(),
            non_zero: weights.iter().filter(|&&w| w != 0.0).count(),
        }
    }
}

/// A weight per vertex of one mesh.
///
/// Invariant: `weights.len() == mesh.vertex_count()`. Every edit preserves
/// the length.
#[derive(Debug, Clone)]
pub struct WeightData {
    mesh: MeshData,
    weights: Vec<f32>,
}

impl WeightData {
    pub fn new(weights: Vec<f32>, mesh: MeshData) -> Result<Self, WeightError> {
        if weights.len() != mesh.vertex_count() {
            return Err(WeightError::LengthMismatch {
                weights: weights.len(),
                vertices: mesh.vertex_count(),
            });
        }
        Ok(Self { mesh, weights })
    }

    /// Every vertex set to `value`
    pub fn filled(mesh: MeshData, value: f32) -> Self {
        let weights = vec![value; mesh.vertex_count()];
        Self { mesh, weights }
    }

    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    pub fn mesh_name(&self) -> &str {
        self.mesh.name()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.weights
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.weights
    }

    /// Raw native-endian bytes for upload to the host attribute.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.weights)
    }

    /// Apply `operation` with `value` where `mask` applies (everywhere when
    /// `None`), then clamp the whole array.
    pub fn modify(
        &mut self,
        value: f32,
        operation: OperationType,
        mask: Option<&ComponentMask>,
        clamp_min: Option<f32>,
        clamp_max: Option<f32>,
    ) -> Result<&mut Self, WeightError> {
        let clamp = ClampRange::new(clamp_min, clamp_max);
        clamp.validate()?;

        let flags = match mask {
            Some(mask) if !mask.is_empty() => Some(mask.to_flags(self.len())?),
            _ => None,
        };
        apply_operation(&mut self.weights, value, operation, flags.as_deref());
        clamp.apply(&mut self.weights);
        Ok(self)
    }

    /// Copy weights from the positive side of `axis` onto their mirror
    /// partners. Applying it twice gives the same result as once.
    pub fn mirror(&mut self, axis: Axis, tolerance: f32) -> Result<&mut Self, WeightError> {
        check_tolerance(tolerance)?;
        let pairs = find_mirror_pairs(self.mesh.positions(), axis, tolerance);
        debug!(
            "Mirroring {} across {:?}: {} paired vertices",
            self.mesh.name(),
            axis,
            pairs.paired_count()
        );
        self.weights = copy_across(
            &self.weights,
            self.mesh.positions(),
            &pairs,
            axis,
            MirrorDirection::Positive,
            None,
        );
        Ok(self)
    }

    /// Linearly map the current range onto `[min, max]`.
    ///
    /// A constant array becomes all `min`.
    pub fn normalize(&mut self, min: f32, max: f32) -> &mut Self {
        let stats = WeightStats::from_weights(&self.weights);
        if stats.min == stats.max {
            self.weights.fill(min);
            return self;
        }
        let scale = (max - min) / (stats.max - stats.min);
        for w in self.weights.iter_mut() {
            *w = if *w == stats.max {
                max
            } else {
                min + (*w - stats.min) * scale
            };
        }
        self
    }

    pub fn invert(&mut self) -> &mut Self {
        for w in self.weights.iter_mut() {
            *w = 1.0 - *w;
        }
        self
    }

    /// Blend each weight toward its neighbor average, `iterations` times.
    pub fn smooth(&mut self, iterations: u32, factor: f32) -> &mut Self {
        if factor == 0.0 {
            return self;
        }
        for _ in 0..iterations {
            self.weights = smooth_pass(&self.weights, self.mesh.neighbors(), factor, None, None);
        }
        self
    }

    pub fn stats(&self) -> WeightStats {
        WeightStats::from_weights(&self.weights)
    }

    /// Weights at `indices`, skipping out-of-range entries.
    pub fn selected_weights(&self, indices: &[u32]) -> Vec<f32> {
        indices
            .iter()
            .filter_map(|&i| self.weights.get(i as usize).copied())
            .collect()
    }
}

/// Keeps the most recent [`WeightData`] per mesh name.
#[derive(Debug, Default)]
pub struct WeightDataFactory {
    instances: HashMap<String, WeightData>,
}

impl WeightDataFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `weights` against `mesh` and store them, replacing any
    /// previous entry for the same mesh.
    pub fn create(
        &mut self,
        weights: Vec<f32>,
        mesh: MeshData,
    ) -> Result<&mut WeightData, WeightError> {
        let data = WeightData::new(weights, mesh)?;
        let name = data.mesh_name().to_string();
        Ok(self.instances.entry(name).insert_entry(data).into_mut())
    }

    pub fn get(&self, mesh: &str) -> Option<&WeightData> {
        self.instances.get(mesh)
    }

    pub fn get_mut(&mut self, mesh: &str) -> Option<&mut WeightData> {
        self.instances.get_mut(mesh)
    }

    pub fn remove(&mut self, mesh: &str) -> Option<WeightData> {
        self.instances.remove(mesh)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_data::primitives;

    fn strip() -> MeshData {
        // x = -2, 0, 2, -1, 1
        MeshData::from_topology("strip", primitives::symmetric_strip(5, 1.0))
    }

    fn line(count: u32) -> MeshData {
        MeshData::from_topology("line", primitives::line(count, 1.0))
    }

    #[test]
    fn test_length_mismatch() {
        let err = WeightData::new(vec![0.0; 4], strip()).unwrap_err();
        assert_eq!(err, WeightError::LengthMismatch { weights: 4, vertices: 5 });
    }

    #[test]
    fn test_modify_with_mask_and_clamp() {
        let mut data = WeightData::new(vec![0.5; 5], strip()).unwrap();
        let mut mask = ComponentMask::new();
        mask.push_range(0, 2).push_index(4);

        data.modify(0.7, OperationType::Add, Some(&mask), None, Some(1.0))
            .unwrap();
        assert_eq!(data.as_slice(), &[1.0, 1.0, 0.5, 0.5, 1.0]);

        data.modify(0.6, OperationType::Subtract, None, Some(0.0), None)
            .unwrap();
        assert!((data.as_slice()[2]).abs() < 1e-6);
        assert!((data.as_slice()[0] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_modify_rejects_bad_input() {
        let mut data = WeightData::new(vec![0.5; 5], strip()).unwrap();
        assert!(matches!(
            data.modify(1.0, OperationType::Replace, None, Some(1.0), Some(0.0)),
            Err(WeightError::InvalidRange { .. })
        ));

        let mask = ComponentMask::from_indices([9]);
        assert!(matches!(
            data.modify(1.0, OperationType::Replace, Some(&mask), None, None),
            Err(WeightError::Mesh(_))
        ));
        // Failed edits leave weights untouched
        assert_eq!(data.as_slice(), &[0.5; 5]);
    }

    #[test]
    fn test_operation_parse() {
        assert_eq!("Multiply".parse::<OperationType>().unwrap(), OperationType::Multiply);
        assert!(matches!(
            "divide".parse::<OperationType>(),
            Err(WeightError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_mirror_positive_side_and_idempotent() {
        let mesh = strip();
        // x = -2, 0, 2, -1, 1
        let mut data = WeightData::new(vec![0.1, 0.5, 0.9, 0.2, 0.7], mesh).unwrap();
        data.mirror(Axis::X, 0.001).unwrap();
        assert_eq!(data.as_slice(), &[0.9, 0.5, 0.9, 0.7, 0.7]);

        let once = data.as_slice().to_vec();
        data.mirror(Axis::X, 0.001).unwrap();
        assert_eq!(data.as_slice(), once.as_slice());
    }

    #[test]
    fn test_mirror_rejects_non_positive_tolerance() {
        let mut data = WeightData::new(vec![0.1, 0.5, 0.9, 0.2, 0.7], strip()).unwrap();
        for tolerance in [0.0, -1.0, f32::NAN] {
            assert!(matches!(
                data.mirror(Axis::X, tolerance),
                Err(WeightError::InvalidParameter { name: "tolerance", .. })
            ));
        }
        assert_eq!(data.as_slice(), &[0.1, 0.5, 0.9, 0.2, 0.7]);
    }

    #[test]
    fn test_normalize_exact() {
        let mut data = WeightData::new(vec![0.2, 0.4, 0.3, 0.8, 0.5], strip()).unwrap();
        data.normalize(0.0, 1.0);
        let stats = data.stats();
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 1.0);
        assert!((data.as_slice()[1] - 1.0 / 3.0).abs() < 1e-5);

        let mut constant = WeightData::filled(strip(), 0.3);
        constant.normalize(0.25, 1.0);
        assert_eq!(constant.as_slice(), &[0.25; 5]);
    }

    #[test]
    fn test_invert_and_chain() {
        let mut data = WeightData::new(vec![0.0, 0.25, 1.0], line(3)).unwrap();
        data.invert().smooth(1, 0.0);
        assert_eq!(data.as_slice(), &[1.0, 0.75, 0.0]);
    }

    #[test]
    fn test_smooth() {
        let mut data = WeightData::new(vec![0.0, 1.0, 0.0], line(3)).unwrap();
        data.smooth(1, 0.5);
        assert_eq!(data.len(), 3);
        assert!((data.as_slice()[1] - 0.5).abs() < 1e-6);
        assert!((data.as_slice()[0] - 0.5).abs() < 1e-6);

        let mut still = WeightData::new(vec![0.3, 0.9, 0.1], line(3)).unwrap();
        still.smooth(10, 0.0);
        assert_eq!(still.as_slice(), &[0.3, 0.9, 0.1]);
    }

    #[test]
    fn test_stats() {
        let data = WeightData::new(vec![0.0, 1.0, 0.0, 1.0], line(4)).unwrap();
        let stats = data.stats();
        assert_eq!(stats.non_zero, 2);
        assert!((stats.mean - 0.5).abs() < 1e-6);
        assert!((stats.std - 0.5).abs() < 1e-6);
        assert_eq!(WeightStats::from_weights(&[]), WeightStats::default());
    }

    #[test]
    fn test_selected_weights_and_bytes() {
        let data = WeightData::new(vec![0.1, 0.2, 0.3], line(3)).unwrap();
        assert_eq!(data.selected_weights(&[2, 0, 7]), vec![0.3, 0.1]);
        assert_eq!(data.as_bytes().len(), 12);
        assert_eq!(&data.as_bytes()[0..4], &0.1f32.to_ne_bytes());
    }

    #[test]
    fn test_factory() {
        let mut factory = WeightDataFactory::new();
        factory
            .create(vec![0.0; 3], line(3))
            .unwrap()
            .modify(0.5, OperationType::Replace, None, None, None)
            .unwrap();
        assert_eq!(factory.get("line").unwrap().as_slice(), &[0.5; 3]);
        assert!(factory.create(vec![0.0; 2], line(3)).is_err());
        // Failed create keeps the previous entry
        assert_eq!(factory.len(), 1);

        factory.get_mut("line").unwrap().invert();
        assert_eq!(factory.remove("line").unwrap().as_slice(), &[0.5; 3]);
        assert!(factory.is_empty());
    }
}
