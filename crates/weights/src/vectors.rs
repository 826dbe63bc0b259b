//! Direction presets and small vector helpers for spatial weight fields.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::WeightError;

/// Named direction for directional fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "x")]
    X,
    #[serde(rename = "-x")]
    NegX,
    #[serde(rename = "y")]
    Y,
    #[serde(rename = "-y")]
    NegY,
    #[serde(rename = "z")]
    Z,
    #[serde(rename = "-z")]
    NegZ,
    #[serde(rename = "xy")]
    XY,
    #[serde(rename = "-xy")]
    NegXY,
    #[serde(rename = "xz")]
    XZ,
    #[serde(rename = "-xz")]
    NegXZ,
    #[serde(rename = "yz")]
    YZ,
    #[serde(rename = "-yz")]
    NegYZ,
    /// Away from the origin point
    #[serde(rename = "radial_out")]
    RadialOut,
    /// Toward the origin point
    #[serde(rename = "radial_in")]
    RadialIn,
}

impl Direction {
    pub const ALL: [Direction; 14] = [
        Direction::X,
        Direction::NegX,
        Direction::Y,
        Direction::NegY,
        Direction::Z,
        Direction::NegZ,
        Direction::XY,
        Direction::NegXY,
        Direction::XZ,
        Direction::NegXZ,
        Direction::YZ,
        Direction::NegYZ,
        Direction::RadialOut,
        Direction::RadialIn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Direction::X => "x",
            Direction::NegX => "-x",
            Direction::Y => "y",
            Direction::NegY => "-y",
            Direction::Z => "z",
            Direction::NegZ => "-z",
            Direction::XY => "xy",
            Direction::NegXY => "-xy",
            Direction::XZ => "xz",
            Direction::NegXZ => "-xz",
            Direction::YZ => "yz",
            Direction::NegYZ => "-yz",
            Direction::RadialOut => "radial_out",
            Direction::RadialIn => "radial_in",
        }
    }

    pub fn is_radial(self) -> bool {
        matches!(self, Direction::RadialOut | Direction::RadialIn)
    }

    /// Unit vector for this direction. Radial directions have none.
    pub fn vector(self) -> Option<Vec3> {
        let v = match self {
            Direction::X => Vec3::X,
            Direction::NegX => Vec3::NEG_X,
            Direction::Y => Vec3::Y,
            Direction::NegY => Vec3::NEG_Y,
            Direction::Z => Vec3::Z,
            Direction::NegZ => Vec3::NEG_Z,
            Direction::XY => Vec3::new(1.0, 1.0, 0.0).normalize(),
            Direction::NegXY => Vec3::new(-1.0, -1.0, 0.0).normalize(),
            Direction::XZ => Vec3::new(1.0, 0.0, 1.0).normalize(),
            Direction::NegXZ => Vec3::new(-1.0, 0.0, -1.0).normalize(),
            Direction::YZ => Vec3::new(0.0, 1.0, 1.0).normalize(),
            Direction::NegYZ => Vec3::new(0.0, -1.0, -1.0).normalize(),
            Direction::RadialOut | Direction::RadialIn => return None,
        };
        Some(v)
    }
}

impl FromStr for Direction {
    type Err = WeightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Direction::X),
            "-x" => Ok(Direction::NegX),
            "y" => Ok(Direction::Y),
            "-y" => Ok(Direction::NegY),
            "z" => Ok(Direction::Z),
            "-z" => Ok(Direction::NegZ),
            "xy" | "yx" => Ok(Direction::XY),
            "-xy" | "-yx" => Ok(Direction::NegXY),
            "xz" | "zx" => Ok(Direction::XZ),
            "-xz" | "-zx" => Ok(Direction::NegXZ),
            "yz" | "zy" => Ok(Direction::YZ),
            "-yz" | "-zy" => Ok(Direction::NegYZ),
            "radial_out" => Ok(Direction::RadialOut),
            "radial_in" => Ok(Direction::RadialIn),
            other => Err(WeightError::InvalidDirection(other.to_string())),
        }
    }
}

/// A named direction or an arbitrary vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DirectionSpec {
    Named(Direction),
    Custom(Vec3),
}

impl From<Direction> for DirectionSpec {
    fn from(value: Direction) -> Self {
        DirectionSpec::Named(value)
    }
}

impl From<Vec3> for DirectionSpec {
    fn from(value: Vec3) -> Self {
        DirectionSpec::Custom(value)
    }
}

/// Normalized direction vector.
///
/// Custom vectors are normalized, a zero vector stays zero. Radial
/// directions return `None`.
pub fn direction_vector(direction: &DirectionSpec) -> Option<Vec3> {
    match direction {
        DirectionSpec::Named(named) => named.vector(),
        DirectionSpec::Custom(v) => Some(v.normalize_or_zero()),
    }
}

/// How [`distance_along_vector`] measures a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMode {
    /// Signed distance along the vector
    #[default]
    Projection,
    /// Euclidean distance from the origin, ignoring the vector
    Distance,
}

pub fn dot(a: Vec3, b: Vec3) -> f32 {
    a.dot(b)
}

pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    a.cross(b)
}

/// Angle between two vectors in radians. Zero vectors give π/2.
pub fn angle_between(a: Vec3, b: Vec3) -> f32 {
    let d = a.normalize_or_zero().dot(b.normalize_or_zero());
    d.clamp(-1.0, 1.0).acos()
}

/// Projection of `v` onto `onto`, zero when `onto` is zero.
pub fn project_vector(v: Vec3, onto: Vec3) -> Vec3 {
    let len_sq = onto.length_squared();
    if len_sq == 0.0 {
        return Vec3::ZERO;
    }
    onto * (v.dot(onto) / len_sq)
}

pub fn distance_along_vector(point: Vec3, vector: Vec3, origin: Vec3, mode: DistanceMode) -> f32 {
    let to_point = point - origin;
    match mode {
        DistanceMode::Projection => to_point.dot(vector.normalize_or_zero()),
        DistanceMode::Distance => to_point.length(),
    }
}

/// Unit vector perpendicular to `v`, built by crossing with the axis of
/// its smallest component.
pub fn perpendicular(v: Vec3) -> Vec3 {
    let abs = v.abs();
    let unit = if abs.x <= abs.y && abs.x <= abs.z {
        Vec3::X
    } else if abs.y <= abs.z {
        Vec3::Y
    } else {
        Vec3::Z
    };
    v.cross(unit).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_direction_parse_and_vectors() {
        assert_eq!("-ZX".parse::<Direction>().unwrap(), Direction::NegXZ);
        assert_eq!("yx".parse::<Direction>().unwrap(), Direction::XY);
        assert!("up".parse::<Direction>().is_err());

        for direction in Direction::ALL {
            assert_eq!(direction.name().parse::<Direction>().unwrap(), direction);
            match direction.vector() {
                Some(v) => assert!((v.length() - 1.0).abs() < 1e-5),
                None => assert!(direction.is_radial()),
            }
        }

        let xy = Direction::XY.vector().unwrap();
        assert!((xy.x - xy.y).abs() < 1e-6 && xy.z == 0.0);
    }

    #[test]
    fn test_direction_vector_custom() {
        let v = direction_vector(&Vec3::new(0.0, 3.0, 4.0).into()).unwrap();
        assert!((v - Vec3::new(0.0, 0.6, 0.8)).length() < 1e-6);
        assert_eq!(direction_vector(&Vec3::ZERO.into()), Some(Vec3::ZERO));
        assert_eq!(direction_vector(&Direction::RadialIn.into()), None);
    }

    #[test]
    fn test_angles_and_projection() {
        assert!((angle_between(Vec3::X, Vec3::Y) - FRAC_PI_2).abs() < 1e-5);
        assert!((angle_between(Vec3::X, Vec3::NEG_X) - PI).abs() < 1e-5);
        assert!(angle_between(Vec3::X, Vec3::X * 5.0).abs() < 1e-3);

        let p = project_vector(Vec3::new(2.0, 3.0, 0.0), Vec3::X * 4.0);
        assert!((p - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);
        assert_eq!(project_vector(Vec3::ONE, Vec3::ZERO), Vec3::ZERO);
        assert_eq!(cross(Vec3::X, Vec3::Y), Vec3::Z);
        assert_eq!(dot(Vec3::X, Vec3::Y), 0.0);
    }

    #[test]
    fn test_distance_along_vector() {
        let point = Vec3::new(3.0, 4.0, 0.0);
        let proj =
            distance_along_vector(point, Vec3::X * 10.0, Vec3::ZERO, DistanceMode::Projection);
        assert!((proj - 3.0).abs() < 1e-6);
        let back = distance_along_vector(point, Vec3::NEG_X, Vec3::ZERO, DistanceMode::Projection);
        assert!((back + 3.0).abs() < 1e-6);
        let dist = distance_along_vector(point, Vec3::X, Vec3::ZERO, DistanceMode::Distance);
        assert!((dist - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_perpendicular() {
        for v in [Vec3::X, Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, -5.0, 0.1)] {
            let p = perpendicular(v);
            assert!(p.dot(v).abs() < 1e-5);
            assert!((p.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_direction_spec_serde() {
        let named: DirectionSpec = serde_json::from_str(r#""-y""#).unwrap();
        assert_eq!(named, DirectionSpec::Named(Direction::NegY));
        let custom: DirectionSpec = serde_json::from_str("[0.0, 1.0, 0.0]").unwrap();
        assert_eq!(custom, DirectionSpec::Custom(Vec3::Y));
    }
}
