//! Abstract converter trait for decoded geometries.
//!
//! This module defines the `Converter` trait that allows a decoded `Geometry`
//! to be projected into an output format, plus the configuration shared by
//! the decoder, the encoders and the facade.

use crate::error::EwkbResult;
use crate::types::Geometry;

/// Default cap on Multi*/GeometryCollection nesting.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Hard ceiling on `max_depth`; larger requests are clamped to it.
pub const MAX_DEPTH_LIMIT: usize = 256;

/// A trait for converting decoded geometries to other formats.
///
/// # Type Parameter
///
/// * `Output` - The type of the conversion output (e.g. `serde_json::Value`
///   for GeoJSON).
///
/// # Example
///
/// ```ignore
/// use ewkb_geojson::{Converter, EwkbResult, Geometry};
///
/// struct KindName;
///
/// impl Converter for KindName {
///     type Output = &'static str;
///
///     fn convert(&self, geometry: &Geometry) -> EwkbResult<Self::Output> {
///         Ok(geometry.geometry_type().name())
///     }
/// }
/// ```
pub trait Converter {
    /// The output type of the conversion.
    type Output;

    /// Converts the given geometry to the output format.
    fn convert(&self, geometry: &Geometry) -> EwkbResult<Self::Output>;
}

/// Configuration options for the codec.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Whether to emit Z as a third position component when present.
    pub include_z: bool,

    /// Maximum nesting depth of collection geometries. The decoder clamps
    /// it to `MAX_DEPTH_LIMIT`.
    pub max_depth: usize,

    /// Whether to pretty-print serialized output.
    pub pretty_print: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            include_z: false,
            max_depth: DEFAULT_MAX_DEPTH,
            pretty_print: false,
        }
    }
}

impl CodecConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether Z values are kept in the output.
    pub fn with_include_z(mut self, include: bool) -> Self {
        self.include_z = include;
        self
    }

    /// Sets the maximum collection nesting depth, clamped to
    /// `MAX_DEPTH_LIMIT`.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.min(MAX_DEPTH_LIMIT);
        self
    }

    /// Sets whether to pretty-print serialized output.
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }
}
