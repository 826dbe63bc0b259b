//! Shared configuration for weightpaint
//!
//! This crate provides the single source of truth for cache sizing, mirror
//! tolerance, smoothing defaults and falloff parameters shared by the mesh
//! and weight crates.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default number of meshes kept in the mesh data cache
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 32;

/// Default memory threshold (MB) before the mesh cache is flushed
pub const DEFAULT_CACHE_THRESHOLD_MB: usize = 50;

/// Rough per-mesh memory estimate (MB) used for the threshold check
pub const DEFAULT_ESTIMATED_MB_PER_ENTRY: usize = 5;

/// Default position tolerance when pairing mirrored vertices
pub const DEFAULT_MIRROR_TOLERANCE: f32 = 0.001;

/// Default number of smoothing passes
pub const DEFAULT_SMOOTH_ITERATIONS: u32 = 1;

/// Default blend toward the neighbor average per smoothing pass
pub const DEFAULT_SMOOTH_FACTOR: f32 = 0.5;

/// Default sigma of the gaussian falloff
pub const DEFAULT_GAUSSIAN_SIGMA: f32 = 0.4;

/// Default power of the exponential falloff
pub const DEFAULT_EXPONENTIAL_POWER: f32 = 2.0;

/// Environment variable overriding [`CacheConfig::max_entries`]
pub const ENV_CACHE_MAX_ENTRIES: &str = "WEIGHTPAINT_CACHE_MAX_ENTRIES";

/// Environment variable overriding [`CacheConfig::memory_threshold_mb`]
pub const ENV_CACHE_THRESHOLD_MB: &str = "WEIGHTPAINT_CACHE_THRESHOLD_MB";

/// Environment variable overriding [`PaintConfig::mirror_tolerance`]
pub const ENV_MIRROR_TOLERANCE: &str = "WEIGHTPAINT_MIRROR_TOLERANCE";

/// Errors raised while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Sizing for the mesh data cache
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of meshes held before LRU eviction
    pub max_entries: usize,
    /// Estimated memory (MB) above which the whole cache is cleared
    pub memory_threshold_mb: usize,
    /// Per-entry memory estimate (MB)
    pub estimated_mb_per_entry: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            memory_threshold_mb: DEFAULT_CACHE_THRESHOLD_MB,
            estimated_mb_per_entry: DEFAULT_ESTIMATED_MB_PER_ENTRY,
        }
    }
}

impl CacheConfig {
    /// Create a cache config with the given capacity and threshold
    pub fn new(max_entries: usize, memory_threshold_mb: usize) -> Self {
        Self {
            max_entries,
            memory_threshold_mb,
            estimated_mb_per_entry: DEFAULT_ESTIMATED_MB_PER_ENTRY,
        }
    }

    /// Estimated memory use for `entries` cached meshes, saturating at
    /// `usize::MAX`
    pub fn estimate_mb(&self, entries: usize) -> usize {
        entries.saturating_mul(self.estimated_mb_per_entry)
    }
}

/// Engine-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintConfig {
    pub cache: CacheConfig,
    /// Position tolerance for mirror pairing
    pub mirror_tolerance: f32,
    /// Smoothing passes used when none are given
    pub smooth_iterations: u32,
    /// Smoothing blend factor used when none is given
    pub smooth_factor: f32,
    pub gaussian_sigma: f32,
    pub exponential_power: f32,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            mirror_tolerance: DEFAULT_MIRROR_TOLERANCE,
            smooth_iterations: DEFAULT_SMOOTH_ITERATIONS,
            smooth_factor: DEFAULT_SMOOTH_FACTOR,
            gaussian_sigma: DEFAULT_GAUSSIAN_SIGMA,
            exponential_power: DEFAULT_EXPONENTIAL_POWER,
        }
    }
}

impl PaintConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `WEIGHTPAINT_*` environment variables
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values returned from `lookup`.
    ///
    /// Unparseable or out-of-range values are ignored with a warning.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_CACHE_MAX_ENTRIES) {
            match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.cache.max_entries = n,
                _ => warn!(
                    "Ignoring {}={:?}: expected a positive integer",
                    ENV_CACHE_MAX_ENTRIES, value
                ),
            }
        }

        if let Some(value) = lookup(ENV_CACHE_THRESHOLD_MB) {
            match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.cache.memory_threshold_mb = n,
                _ => warn!(
                    "Ignoring {}={:?}: expected a positive integer",
                    ENV_CACHE_THRESHOLD_MB, value
                ),
            }
        }

        if let Some(value) = lookup(ENV_MIRROR_TOLERANCE) {
            match value.trim().parse::<f32>() {
                Ok(t) if t > 0.0 && t.is_finite() => config.mirror_tolerance = t,
                _ => warn!(
                    "Ignoring {}={:?}: expected a positive number",
                    ENV_MIRROR_TOLERANCE, value
                ),
            }
        }

        config
    }

    /// Check that all values are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.max_entries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.max_entries",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.cache.memory_threshold_mb == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.memory_threshold_mb",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.mirror_tolerance > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "mirror_tolerance",
                reason: format!("{} is not positive", self.mirror_tolerance),
            });
        }
        if !(0.0..=1.0).contains(&self.smooth_factor) {
            return Err(ConfigError::InvalidValue {
                field: "smooth_factor",
                reason: format!("{} is outside [0, 1]", self.smooth_factor),
            });
        }
        if !(self.gaussian_sigma > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "gaussian_sigma",
                reason: format!("{} is not positive", self.gaussian_sigma),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = PaintConfig::default();
        assert_eq!(config.cache.max_entries, DEFAULT_CACHE_MAX_ENTRIES);
        assert_eq!(config.cache.memory_threshold_mb, DEFAULT_CACHE_THRESHOLD_MB);
        assert_eq!(config.mirror_tolerance, DEFAULT_MIRROR_TOLERANCE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_estimate_mb() {
        let cache = CacheConfig::default();
        assert_eq!(cache.estimate_mb(0), 0);
        assert_eq!(cache.estimate_mb(4), 20);

        let huge = CacheConfig {
            estimated_mb_per_entry: usize::MAX,
            ..CacheConfig::new(8, usize::MAX)
        };
        assert_eq!(huge.estimate_mb(3), usize::MAX);
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            PaintConfig::from_json(r#"{"cache": {"max_entries": 4}, "smooth_factor": 0.25}"#)
                .unwrap();
        assert_eq!(config.cache.max_entries, 4);
        assert_eq!(config.cache.memory_threshold_mb, DEFAULT_CACHE_THRESHOLD_MB);
        assert!((config.smooth_factor - 0.25).abs() < 0.001);
        assert_eq!(config.smooth_iterations, DEFAULT_SMOOTH_ITERATIONS);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(matches!(
            PaintConfig::from_json(r#"{"smooth_factor": 1.5}"#),
            Err(ConfigError::InvalidValue { field: "smooth_factor", .. })
        ));
        assert!(matches!(
            PaintConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_from_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_CACHE_MAX_ENTRIES, "8"),
            (ENV_CACHE_THRESHOLD_MB, "abc"),
            (ENV_MIRROR_TOLERANCE, "0.01"),
        ]
        .into_iter()
        .collect();

        let config = PaintConfig::from_env_with(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.cache.max_entries, 8);
        // Bad value falls back to the default
        assert_eq!(config.cache.memory_threshold_mb, DEFAULT_CACHE_THRESHOLD_MB);
        assert!((config.mirror_tolerance - 0.01).abs() < 1e-6);
    }
}
