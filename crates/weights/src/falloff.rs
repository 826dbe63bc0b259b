//! Falloff curves for shaping weight distributions.
//!
//! Curves map a normalized input (0.0 = no influence, 1.0 = full influence)
//! to an output in the same range. Named curves clamp their output to [0, 1].

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;
use weightpaint_config::{DEFAULT_EXPONENTIAL_POWER, DEFAULT_GAUSSIAN_SIGMA, PaintConfig};

use crate::error::WeightError;

/// Raw, unclamped curve functions.
pub mod function {
    use std::f32::consts::PI;

    pub fn linear(x: f32) -> f32 {
        x
    }

    /// Ease-in: x²
    pub fn quadratic(x: f32) -> f32 {
        x * x
    }

    /// Hermite smoothstep: 3x² - 2x³
    pub fn smooth(x: f32) -> f32 {
        x * x * (3.0 - 2.0 * x)
    }

    /// Smootherstep: 6x⁵ - 15x⁴ + 10x³
    pub fn smooth2(x: f32) -> f32 {
        x * x * x * (x * (6.0 * x - 15.0) + 10.0)
    }

    /// Bell centred on 1.0
    pub fn gaussian(x: f32, sigma: f32) -> f32 {
        (-(x - 1.0).powi(2) / (2.0 * sigma * sigma)).exp()
    }

    /// Half cosine from 0 to 1
    pub fn sine(x: f32) -> f32 {
        0.5 * (1.0 + (PI * (1.0 - x)).cos())
    }

    pub fn exponential(x: f32, power: f32) -> f32 {
        1.0 - (-power * x).exp()
    }
}

fn default_sigma() -> f32 {
    DEFAULT_GAUSSIAN_SIGMA
}

fn default_power() -> f32 {
    DEFAULT_EXPONENTIAL_POWER
}

/// Named falloff curve.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FalloffType {
    #[default]
    Linear,
    Quadratic,
    /// Smoothstep
    Smooth,
    /// Smootherstep
    Smooth2,
    Gaussian {
        #[serde(default = "default_sigma")]
        sigma: f32,
    },
    Sine,
    Exponential {
        #[serde(default = "default_power")]
        power: f32,
    },
}

impl FalloffType {
    /// Gaussian with the default sigma
    pub fn gaussian() -> Self {
        FalloffType::Gaussian {
            sigma: DEFAULT_GAUSSIAN_SIGMA,
        }
    }

    /// Exponential with the default power
    pub fn exponential() -> Self {
        FalloffType::Exponential {
            power: DEFAULT_EXPONENTIAL_POWER,
        }
    }

    /// Parse a curve name, taking gaussian sigma and exponential power
    /// from `config`.
    pub fn from_name_with(name: &str, config: &PaintConfig) -> Result<Self, WeightError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(FalloffType::Linear),
            "quadratic" => Ok(FalloffType::Quadratic),
            "smooth" | "smoothstep" => Ok(FalloffType::Smooth),
            "smooth2" | "smootherstep" => Ok(FalloffType::Smooth2),
            "gaussian" => Ok(FalloffType::Gaussian {
                sigma: config.gaussian_sigma,
            }),
            "sine" => Ok(FalloffType::Sine),
            "exponential" => Ok(FalloffType::Exponential {
                power: config.exponential_power,
            }),
            other => Err(WeightError::InvalidFalloff(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FalloffType::Linear => "linear",
            FalloffType::Quadratic => "quadratic",
            FalloffType::Smooth => "smooth",
            FalloffType::Smooth2 => "smooth2",
            FalloffType::Gaussian { .. } => "gaussian",
            FalloffType::Sine => "sine",
            FalloffType::Exponential { .. } => "exponential",
        }
    }

    pub fn is_linear(&self) -> bool {
        matches!(self, FalloffType::Linear)
    }

    /// Unclamped curve value at `x`.
    pub fn raw(&self, x: f32) -> f32 {
        match *self {
            FalloffType::Linear => function::linear(x),
            FalloffType::Quadratic => function::quadratic(x),
            FalloffType::Smooth => function::smooth(x),
            FalloffType::Smooth2 => function::smooth2(x),
            FalloffType::Gaussian { sigma } => function::gaussian(x, sigma),
            FalloffType::Sine => function::sine(x),
            FalloffType::Exponential { power } => function::exponential(x, power),
        }
    }

    /// Curve value at `x`, clamped to [0, 1].
    pub fn evaluate(&self, x: f32) -> f32 {
        self.raw(x).clamp(0.0, 1.0)
    }

    pub fn apply(&self, weights: &[f32]) -> Vec<f32> {
        weights.iter().map(|&w| self.evaluate(w)).collect()
    }
}

impl FromStr for FalloffType {
    type Err = WeightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name_with(s, &PaintConfig::default())
    }
}

/// Apply the falloff named `falloff` to every weight.
///
/// Unknown names fall back to identity with a warning.
pub fn apply_falloff(weights: &[f32], falloff: &str) -> Vec<f32> {
    match falloff.parse::<FalloffType>() {
        Ok(curve) => curve.apply(weights),
        Err(_) => {
            warn!("Unknown falloff type: {}, using linear", falloff);
            weights.to_vec()
        }
    }
}

/// A falloff that is either named, user-drawn, or a mix of two others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FalloffCurve {
    Preset(FalloffType),
    /// Piecewise-linear through `(x, y)` points sorted by x
    ControlPoints(Vec<(f32, f32)>),
    Blend {
        a: Box<FalloffCurve>,
        b: Box<FalloffCurve>,
        factor: f32,
    },
}

impl Default for FalloffCurve {
    fn default() -> Self {
        FalloffCurve::Preset(FalloffType::Linear)
    }
}

impl From<FalloffType> for FalloffCurve {
    fn from(value: FalloffType) -> Self {
        FalloffCurve::Preset(value)
    }
}

impl FalloffCurve {
    /// Curve through the given control points. Points are sorted by x.
    pub fn from_control_points(mut points: Vec<(f32, f32)>) -> Result<Self, WeightError> {
        if points.is_empty() {
            return Err(WeightError::InvalidParameter {
                name: "control_points",
                reason: "at least one point is required".to_string(),
            });
        }
        if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(WeightError::InvalidParameter {
                name: "control_points",
                reason: "points must be finite".to_string(),
            });
        }
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(FalloffCurve::ControlPoints(points))
    }

    /// Mix of `self` and `other`: `self·(1-factor) + other·factor`.
    pub fn blend(self, other: FalloffCurve, factor: f32) -> FalloffCurve {
        FalloffCurve::Blend {
            a: Box::new(self),
            b: Box::new(other),
            factor,
        }
    }

    /// Curve value at `x`, clamped to [0, 1].
    pub fn evaluate(&self, x: f32) -> f32 {
        let value = match self {
            FalloffCurve::Preset(curve) => curve.raw(x),
            FalloffCurve::ControlPoints(points) => interpolate_points(points, x),
            FalloffCurve::Blend { a, b, factor } => {
                a.evaluate(x) * (1.0 - factor) + b.evaluate(x) * factor
            }
        };
        value.clamp(0.0, 1.0)
    }

    pub fn evaluate_all(&self, values: &[f32]) -> Vec<f32> {
        values.iter().map(|&x| self.evaluate(x)).collect()
    }

    /// Sample the curve at `resolution` evenly spaced points over [0, 1].
    pub fn generate_curve(&self, resolution: usize) -> Vec<f32> {
        linspace(resolution)
            .into_iter()
            .map(|x| self.evaluate(x))
            .collect()
    }
}

fn interpolate_points(points: &[(f32, f32)], x: f32) -> f32 {
    let (Some(&(first_x, first_y)), Some(&(last_x, last_y))) = (points.first(), points.last())
    else {
        return x;
    };
    if x <= first_x {
        return first_y;
    }
    if x >= last_x {
        return last_y;
    }
    for pair in points.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if x > x0 && x <= x1 {
            let t = (x - x0) / (x1 - x0);
            return y0 + t * (y1 - y0);
        }
    }
    last_y
}

/// `count` evenly spaced values from 0 to 1 inclusive.
fn linspace(count: usize) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        n => (0..n).map(|i| i as f32 / (n - 1) as f32).collect(),
    }
}

/// Ramp of `length` samples from 0 to 1, optionally remapped to
/// `remap_range`, then shaped by `falloff`.
pub fn generate_falloff_curve(
    length: usize,
    falloff: FalloffType,
    remap_range: Option<(f32, f32)>,
) -> Vec<f32> {
    linspace(length)
        .into_iter()
        .map(|v| match remap_range {
            Some((min, max)) => v * (max - min) + min,
            None => v,
        })
        .map(|v| falloff.evaluate(v))
        .collect()
}
