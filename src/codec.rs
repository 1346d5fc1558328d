//! Hex EWKB to GeoJSON conversion facade.
//!
//! Runs the full pipeline (hex text, bytes, geometry tree, GeoJSON) for one
//! record. The pipeline is pure: no logging, no shared state, and identical
//! input always yields identical output or an identical error.

use serde_json::Value;

use crate::converter::{CodecConfig, Converter};
use crate::decoder::EwkbDecoder;
use crate::error::{ConversionError, EwkbResult};
use crate::geojson::GeoJsonEncoder;
use crate::hex_decoder::decode_hex;
use crate::reader::WkbReader;
use crate::types::Geometry;

/// Converts hex EWKB records into GeoJSON geometry objects.
///
/// # Example
///
/// ```ignore
/// use ewkb_geojson::EwkbCodec;
///
/// let codec = EwkbCodec::new();
/// let value = codec.convert(Some("0101000000000000000000F03F0000000000000040"))?;
/// assert_eq!(value.unwrap()["type"], "Point");
/// assert_eq!(codec.convert(Some(""))?, None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EwkbCodec {
    /// Configuration options.
    config: CodecConfig,
}

impl EwkbCodec {
    /// Creates a new codec with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new codec with the given configuration.
    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decodes hex EWKB into a geometry tree along with its outermost SRID.
    pub fn decode_with_srid(&self, hex: &str) -> EwkbResult<(Geometry, Option<u32>)> {
        let bytes = decode_hex(hex)?;
        let mut reader = WkbReader::new(&bytes);
        EwkbDecoder::new(&mut reader)
            .with_max_depth(self.config.max_depth)
            .decode_with_srid()
    }

    /// Decodes hex EWKB into a geometry tree.
    pub fn decode(&self, hex: &str) -> EwkbResult<Geometry> {
        self.decode_with_srid(hex).map(|(geometry, _)| geometry)
    }

    /// Converts one record.
    ///
    /// An absent or empty `hex` means the record has no geometry and yields
    /// `Ok(None)`.
    pub fn convert(&self, hex: Option<&str>) -> Result<Option<Value>, ConversionError> {
        let hex = match hex {
            Some(hex) if !hex.is_empty() => hex,
            _ => return Ok(None),
        };

        let geometry = self.decode(hex)?;
        let value = GeoJsonEncoder::with_config(self.config.clone()).convert(&geometry)?;
        Ok(Some(value))
    }

    /// Converts one record and serializes it, honouring `pretty_print`.
    ///
    /// A record without geometry serializes as `null`.
    pub fn convert_to_string(&self, hex: Option<&str>) -> Result<String, ConversionError> {
        let value = self.convert(hex)?.unwrap_or(Value::Null);
        Ok(to_json_string(&value, self.config.pretty_print))
    }
}

/// Serializes a value, compact or pretty.
pub(crate) fn to_json_string(value: &Value, pretty: bool) -> String {
    if pretty {
        // Serializing a `Value` into a string cannot fail
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    } else {
        value.to_string()
    }
}

/// Converts one record with the default configuration.
pub fn convert(hex: Option<&str>) -> Result<Option<Value>, ConversionError> {
    EwkbCodec::new().convert(hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    const POINT_HEX: &str = "0101000000000000000000F03F0000000000000040";

    #[test]
    fn test_convert_point() {
        let value = convert(Some(POINT_HEX)).unwrap();
        assert_eq!(
            value,
            Some(json!({"type": "Point", "coordinates": [1.0, 2.0]}))
        );
    }

    #[test]
    fn test_lowercase_hex() {
        let value = convert(Some(&POINT_HEX.to_lowercase())).unwrap();
        assert_eq!(value.unwrap()["coordinates"], json!([1.0, 2.0]));
    }

    #[test]
    fn test_absent_and_empty() {
        assert_eq!(convert(None).unwrap(), None);
        assert_eq!(convert(Some("")).unwrap(), None);
    }

    #[test]
    fn test_error_is_wrapped() {
        let err = convert(Some("01010000")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TruncatedInput);
        assert_eq!(err.offset, 1);
        assert_eq!(err.cause.kind(), ErrorKind::TruncatedInput);
    }

    #[test]
    fn test_convert_to_string() {
        let codec = EwkbCodec::new();
        assert_eq!(
            codec.convert_to_string(Some(POINT_HEX)).unwrap(),
            r#"{"coordinates":[1.0,2.0],"type":"Point"}"#
        );
        assert_eq!(codec.convert_to_string(None).unwrap(), "null");
    }

    #[test]
    fn test_decode_with_srid() {
        let codec = EwkbCodec::new();
        let (_, srid) = codec
            .decode_with_srid("0101000020E6100000000000000000F03F0000000000000040")
            .unwrap();
        assert_eq!(srid, Some(4326));
    }
}
