//! # ewkb-geojson - PostGIS EWKB to GeoJSON converter
//!
//! A library for decoding hex-encoded Extended Well-Known Binary (EWKB)
//! geometries, as exported by PostGIS, into GeoJSON geometry objects.
//!
//! All seven OGC geometry kinds are supported, with the PostGIS Z, M and SRID
//! flags. Byte-level parsing is done here; no geometry library is involved.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ewkb_geojson::{CodecConfig, EwkbCodec};
//!
//! let codec = EwkbCodec::with_config(CodecConfig::new().with_include_z(true));
//! let geometry = codec.convert(Some("0101000000000000000000F03F0000000000000040"))?;
//! ```

pub mod batch;
pub mod codec;
pub mod converter;
pub mod decoder;
pub mod error;
pub mod geojson;
pub mod hex_decoder;
pub mod reader;
pub mod types;
pub mod writer;

// Re-export main types for convenient access
pub use batch::{convert_batch, BatchReport};
pub use codec::{convert, EwkbCodec};
pub use converter::{CodecConfig, Converter};
pub use decoder::EwkbDecoder;
pub use error::{ConversionError, ErrorKind, EwkbError, EwkbResult};
pub use geojson::GeoJsonEncoder;
pub use hex_decoder::decode_hex;
pub use reader::WkbReader;
pub use types::*;
pub use writer::{to_ewkb, to_hex_ewkb, EwkbWriter};
