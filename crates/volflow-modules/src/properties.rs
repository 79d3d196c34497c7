//! Text encoding of processor properties

use glam::{IVec3, Vec3};
use std::str::FromStr;
use volflow_network::NetworkError;

pub(crate) fn invalid_value(property: &str, value: &str) -> NetworkError {
    NetworkError::InvalidPropertyValue {
        property: property.to_string(),
        value: value.to_string(),
    }
}

/// Parse a single value, mapping failures to an invalid-value error.
pub(crate) fn parse_value<T: FromStr>(property: &str, value: &str) -> Result<T, NetworkError> {
    value.trim().parse().map_err(|_| invalid_value(property, value))
}

fn parse_triple<T: FromStr + Copy>(value: &str) -> Option<[T; 3]> {
    let parts: Vec<T> = value
        .split_whitespace()
        .map(|p| p.parse().ok())
        .collect::<Option<_>>()?;
    <[T; 3]>::try_from(parts).ok()
}

/// "x y z" -> IVec3
pub(crate) fn parse_ivec3(value: &str) -> Option<IVec3> {
    parse_triple(value).map(IVec3::from_array)
}

/// "x y z" -> Vec3
pub(crate) fn parse_vec3(value: &str) -> Option<Vec3> {
    parse_triple(value).map(Vec3::from_array)
}

pub(crate) fn format_ivec3(v: IVec3) -> String {
    format!("{} {} {}", v.x, v.y, v.z)
}

pub(crate) fn format_vec3(v: Vec3) -> String {
    format!("{} {} {}", v.x, v.y, v.z)
}
