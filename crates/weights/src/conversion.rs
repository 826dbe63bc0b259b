//! Helpers for weight lists exchanged with the host as plain values.

use mesh_data::ComponentMask;
use serde::{Deserialize, Serialize};

use crate::error::WeightError;
use crate::weight_data::{ClampRange, OperationType, apply_operation};

/// Parse the host's space-separated float form, e.g. `"0.1 0.2 1"`.
pub fn parse_weight_list(text: &str) -> Result<Vec<f32>, WeightError> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<f32>()
                .map_err(|_| WeightError::Parse(format!("'{}' is not a number", token)))
        })
        .collect()
}

/// Split a vertex component name such as `pSphere1.vtx[12]` into mesh
/// name and index.
pub fn component_to_mesh_and_index(component: &str) -> Option<(&str, u32)> {
    let (mesh, rest) = component.split_once(".vtx[")?;
    let index = rest.strip_suffix(']')?.parse().ok()?;
    Some((mesh, index))
}

/// Linearly map `weights` onto `[min, max]`. A constant list becomes all `min`.
pub fn normalize_weights(weights: &[f32], min: f32, max: f32) -> Vec<f32> {
    let Some((lo, hi)) = bounds(weights) else {
        return Vec::new();
    };
    if lo == hi {
        return vec![min; weights.len()];
    }
    weights
        .iter()
        .map(|&w| min + (w - lo) * (max - min) / (hi - lo))
        .collect()
}

/// Scale `weights` so they sum to 1. An all-zero sum yields zeros.
pub fn normalize_sum(weights: &[f32]) -> Vec<f32> {
    let total: f32 = weights.iter().sum();
    if total == 0.0 {
        return vec![0.0; weights.len()];
    }
    weights.iter().map(|w| w / total).collect()
}

/// Remap values from `[old_min, old_max]` to `[new_min, new_max]`.
///
/// Both ranges must be strictly increasing. With `clamp`, results are
/// limited to the new range. With a mask, only masked entries change.
pub fn remap_weights(
    weights: &[f32],
    (old_min, old_max): (f32, f32),
    (new_min, new_max): (f32, f32),
    mask: Option<&ComponentMask>,
    clamp: bool,
) -> Result<Vec<f32>, WeightError> {
    if old_min >= old_max {
        return Err(WeightError::InvalidRange {
            min: old_min,
            max: old_max,
        });
    }
    if new_min >= new_max {
        return Err(WeightError::InvalidRange {
            min: new_min,
            max: new_max,
        });
    }

    let flags = match mask {
        Some(mask) if !mask.is_empty() => Some(mask.to_flags(weights.len())?),
        _ => None,
    };

    let scale = (new_max - new_min) / (old_max - old_min);
    Ok(weights
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            if flags.as_ref().is_some_and(|f| !f[i]) {
                return w;
            }
            let remapped = (w - old_min) * scale + new_min;
            if clamp {
                remapped.clamp(new_min, new_max)
            } else {
                remapped
            }
        })
        .collect())
}

/// `a·(1-t) + b·t` per entry. Both lists must have the same length.
pub fn blend_weight_lists(a: &[f32], b: &[f32], t: f32) -> Result<Vec<f32>, WeightError> {
    if a.len() != b.len() {
        return Err(WeightError::InvalidParameter {
            name: "weights_b",
            reason: format!("length {} does not match {}", b.len(), a.len()),
        });
    }
    Ok(a.iter()
        .zip(b)
        .map(|(&a, &b)| a * (1.0 - t) + b * t)
        .collect())
}

/// List form of [`crate::WeightData::modify`] that needs no mesh.
pub fn modify_weights(
    weights: &[f32],
    value: f32,
    operation: OperationType,
    mask: Option<&ComponentMask>,
    clamp: ClampRange,
) -> Result<Vec<f32>, WeightError> {
    clamp.validate()?;
    let flags = match mask {
        Some(mask) if !mask.is_empty() => Some(mask.to_flags(weights.len())?),
        _ => None,
    };

    let mut out = weights.to_vec();
    apply_operation(&mut out, value, operation, flags.as_deref());
    clamp.apply(&mut out);
    Ok(out)
}

/// How [`select_by_value`] picks vertices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectMode {
    /// Inclusive value range
    Range { min: f32, max: f32 },
    /// Exact value
    Value(f32),
}

/// Indices of the vertices whose weight matches `mode`.
pub fn select_by_value(weights: &[f32], mode: SelectMode) -> Vec<u32> {
    weights
        .iter()
        .enumerate()
        .filter(|&(_, &w)| match mode {
            SelectMode::Range { min, max } => (min..=max).contains(&w),
            SelectMode::Value(v) => w == v,
        })
        .map(|(i, _)| i as u32)
        .collect()
}

fn bounds(weights: &[f32]) -> Option<(f32, f32)> {
    let first = *weights.first()?;
    Some(
        weights
            .iter()
            .fold((first, first), |(lo, hi), &w| (lo.min(w), hi.max(w))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weight_list() {
        assert_eq!(parse_weight_list("0.1  0.5\n1").unwrap(), vec![0.1, 0.5, 1.0]);
        assert!(parse_weight_list("").unwrap().is_empty());
        assert!(matches!(parse_weight_list("0.1 abc"), Err(WeightError::Parse(_))));
    }

    #[test]
    fn test_component_to_mesh_and_index() {
        assert_eq!(component_to_mesh_and_index("pSphere1.vtx[12]"), Some(("pSphere1", 12)));
        assert_eq!(
            component_to_mesh_and_index("|grp|body.vtx[0]"),
            Some(("|grp|body", 0))
        );
        assert_eq!(component_to_mesh_and_index("pSphere1.e[3]"), None);
        assert_eq!(component_to_mesh_and_index("pSphere1.vtx[a]"), None);
    }

    #[test]
    fn test_normalize_helpers() {
        assert_eq!(normalize_weights(&[2.0, 4.0, 3.0], 0.0, 1.0), vec![0.0, 1.0, 0.5]);
        assert_eq!(normalize_weights(&[0.3, 0.3], 0.1, 1.0), vec![0.1, 0.1]);
        assert!(normalize_weights(&[], 0.0, 1.0).is_empty());

        assert_eq!(normalize_sum(&[1.0, 3.0]), vec![0.25, 0.75]);
        assert_eq!(normalize_sum(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_remap_weights() {
        let out =
            remap_weights(&[0.0, 5.0, 10.0, 20.0], (0.0, 10.0), (0.0, 1.0), None, true).unwrap();
        assert_eq!(out, vec![0.0, 0.5, 1.0, 1.0]);

        let unclamped =
            remap_weights(&[20.0], (0.0, 10.0), (0.0, 1.0), None, false).unwrap();
        assert!((unclamped[0] - 2.0).abs() < 1e-6);

        let mask = ComponentMask::from_indices([1]);
        let masked =
            remap_weights(&[10.0, 10.0], (0.0, 10.0), (0.0, 2.0), Some(&mask), true).unwrap();
        assert_eq!(masked, vec![10.0, 2.0]);

        assert!(remap_weights(&[1.0], (1.0, 1.0), (0.0, 1.0), None, true).is_err());
        assert!(remap_weights(&[1.0], (0.0, 1.0), (1.0, 0.0), None, true).is_err());
    }

    #[test]
    fn test_blend_weight_lists() {
        assert_eq!(blend_weight_lists(&[0.0, 1.0], &[1.0, 1.0], 0.25).unwrap(), vec![0.25, 1.0]);
        assert!(blend_weight_lists(&[0.0], &[1.0, 1.0], 0.5).is_err());
    }

    #[test]
    fn test_modify_weights() {
        let mut mask = ComponentMask::new();
        mask.push_range(0, 2);
        let out = modify_weights(
            &[0.5, 0.5, 0.5],
            2.0,
            OperationType::Multiply,
            Some(&mask),
            ClampRange::new(None, Some(0.8)),
        )
        .unwrap();
        assert_eq!(out, vec![0.8, 0.8, 0.5]);

        let reversed = ClampRange::new(Some(1.0), Some(0.0));
        assert!(modify_weights(&[0.5], 1.0, OperationType::Add, None, reversed).is_err());
    }

    #[test]
    fn test_select_by_value() {
        let weights = [0.0, 0.5, 1.0, 0.5, 0.75];
        assert_eq!(select_by_value(&weights, SelectMode::Value(0.5)), vec![1, 3]);
        assert_eq!(
            select_by_value(&weights, SelectMode::Range { min: 0.5, max: 0.75 }),
            vec![1, 3, 4]
        );
        assert!(select_by_value(&weights, SelectMode::Range { min: 2.0, max: 3.0 }).is_empty());
    }
}
