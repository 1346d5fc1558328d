//! GeoJSON converter implementation for decoded geometries.
//!
//! This module provides a concrete implementation of the `Converter` trait
//! that outputs RFC 7946 GeoJSON geometry objects as `serde_json::Value`.

use serde_json::{json, Value};

use crate::converter::{CodecConfig, Converter};
use crate::error::{EwkbError, EwkbResult};
use crate::types::*;

/// Converter that produces GeoJSON geometry objects.
///
/// Positions carry X and Y, plus Z when `include_z` is set and the coordinate
/// has one. M values are never emitted. Coordinates pass through unchanged:
/// no rounding, deduplication or ring reordering.
///
/// # Example
///
/// ```ignore
/// use ewkb_geojson::{Converter, Coord, GeoJsonEncoder, Geometry};
///
/// let encoder = GeoJsonEncoder::new();
/// let value = encoder.convert(&Geometry::Point(Coord::xy(1.0, 2.0)))?;
/// assert_eq!(value.to_string(), r#"{"coordinates":[1.0,2.0],"type":"Point"}"#);
/// ```
pub struct GeoJsonEncoder {
    /// Configuration options.
    config: CodecConfig,
}

impl GeoJsonEncoder {
    /// Creates a new encoder with default configuration.
    pub fn new() -> Self {
        Self {
            config: CodecConfig::default(),
        }
    }

    /// Creates a new encoder with the given configuration.
    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    fn position(&self, coord: &Coord) -> EwkbResult<Value> {
        let mut position = vec![number(coord.x)?, number(coord.y)?];
        if self.config.include_z {
            if let Some(z) = coord.z {
                position.push(number(z)?);
            }
        }
        Ok(Value::Array(position))
    }

    fn positions(&self, coords: &[Coord]) -> EwkbResult<Value> {
        coords
            .iter()
            .map(|coord| self.position(coord))
            .collect::<EwkbResult<Vec<_>>>()
            .map(Value::Array)
    }

    fn rings(&self, rings: &[Ring]) -> EwkbResult<Value> {
        rings
            .iter()
            .map(|ring| self.positions(ring))
            .collect::<EwkbResult<Vec<_>>>()
            .map(Value::Array)
    }

    fn point_coordinates(&self, coord: &Coord) -> EwkbResult<Value> {
        if coord.is_empty_point() {
            return Ok(json!([]));
        }
        self.position(coord)
    }

    /// Empty members have no GeoJSON position, so they are left out.
    fn multi_point(&self, points: &[Coord]) -> EwkbResult<Value> {
        points
            .iter()
            .filter(|point| !point.is_empty_point())
            .map(|point| self.position(point))
            .collect::<EwkbResult<Vec<_>>>()
            .map(Value::Array)
    }

    fn lines(&self, lines: &[LineString]) -> EwkbResult<Value> {
        lines
            .iter()
            .map(|line| self.positions(line))
            .collect::<EwkbResult<Vec<_>>>()
            .map(Value::Array)
    }

    fn polygons(&self, polygons: &[Polygon]) -> EwkbResult<Value> {
        polygons
            .iter()
            .map(|polygon| self.rings(polygon))
            .collect::<EwkbResult<Vec<_>>>()
            .map(Value::Array)
    }
}

impl Default for GeoJsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for GeoJsonEncoder {
    type Output = Value;

    fn convert(&self, geometry: &Geometry) -> EwkbResult<Self::Output> {
        let kind = geometry.geometry_type().name();
        let coordinates = match geometry {
            Geometry::Point(coord) => self.point_coordinates(coord)?,
            Geometry::LineString(coords) => self.positions(coords)?,
            Geometry::Polygon(rings) => self.rings(rings)?,
            Geometry::MultiPoint(points) => self.multi_point(points)?,
            Geometry::MultiLineString(lines) => self.lines(lines)?,
            Geometry::MultiPolygon(polygons) => self.polygons(polygons)?,
            Geometry::GeometryCollection(members) => {
                let geometries = members
                    .iter()
                    .map(|member| self.convert(member))
                    .collect::<EwkbResult<Vec<_>>>()?;
                return Ok(json!({ "type": kind, "geometries": geometries }));
            }
        };
        Ok(json!({ "type": kind, "coordinates": coordinates }))
    }
}

/// Wraps an `f64` as a JSON number. JSON has no NaN or infinity.
///
/// Decoded geometries never fail here since the decoder rejects non-finite
/// values with their byte offset. Hand-built trees carry no offsets, so 0 is
/// reported.
fn number(value: f64) -> EwkbResult<Value> {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| {
            EwkbError::malformed(0, format!("coordinate {} is not representable in JSON", value))
        })
}
