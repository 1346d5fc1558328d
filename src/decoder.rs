//! EWKB decoder implementation.
//!
//! This module walks the EWKB grammar recursively, turning the bytes read
//! from a `WkbReader` into an owned `Geometry` tree.

use crate::converter::{DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT};
use crate::error::{EwkbError, EwkbResult};
use crate::reader::WkbReader;
use crate::types::*;

/// Smallest possible encoding of a nested geometry: byte order, type word and
/// an element count of zero.
const MIN_GEOMETRY_SIZE: usize = 1 + 4 + 4;

/// Size of a ring's point count.
const MIN_RING_SIZE: usize = 4;

/// Decoder for EWKB binary data.
///
/// The decoder reads from a `WkbReader` and produces a `Geometry`. Every node,
/// including each element of a multi geometry or collection, is preceded by
/// its own byte order marker and type word.
pub struct EwkbDecoder<'r, 'a> {
    /// The reader to consume.
    reader: &'r mut WkbReader<'a>,
    /// Maximum collection nesting depth.
    max_depth: usize,
}

impl<'r, 'a> EwkbDecoder<'r, 'a> {
    pub fn new(reader: &'r mut WkbReader<'a>) -> Self {
        Self {
            reader,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the maximum nesting depth for collection geometries, clamped to
    /// `MAX_DEPTH_LIMIT`.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.min(MAX_DEPTH_LIMIT);
        self
    }

    /// Decodes one geometry, discarding its SRID.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The buffer ends before an expected field
    /// - A base type code is outside 1..=7
    /// - A declared count cannot fit in the remaining bytes
    /// - A multi geometry holds an element of the wrong kind
    /// - Nesting exceeds the maximum depth
    /// - Bytes remain after the geometry
    pub fn decode(self) -> EwkbResult<Geometry> {
        self.decode_with_srid().map(|(geometry, _)| geometry)
    }

    /// Decodes one geometry and returns it with the SRID of its outermost
    /// header, if one was embedded.
    pub fn decode_with_srid(mut self) -> EwkbResult<(Geometry, Option<u32>)> {
        let (header, geometry) = self.decode_node(0)?;

        if self.reader.has_remaining() {
            return Err(EwkbError::malformed(
                self.reader.position(),
                format!("{} trailing bytes after geometry", self.reader.remaining()),
            ));
        }

        Ok((geometry, header.srid))
    }

    fn decode_node(&mut self, depth: usize) -> EwkbResult<(GeometryHeader, Geometry)> {
        let header = self.read_header()?;
        let geometry = self.decode_body(&header, depth)?;
        Ok((header, geometry))
    }

    /// Reads the byte order marker, type word and optional SRID.
    fn read_header(&mut self) -> EwkbResult<GeometryHeader> {
        let byte_order = ByteOrder::from(self.reader.read_u8()?);

        let type_offset = self.reader.position();
        let type_code = self.reader.read_u32(byte_order)?;
        let geometry_type = GeometryType::from_code(type_code & 0xFF).ok_or(
            EwkbError::UnsupportedGeometryType {
                offset: type_offset,
                type_code,
            },
        )?;

        // The SRID is consumed even when unused to keep the cursor aligned
        let srid = if type_code & EWKB_SRID_FLAG != 0 {
            Some(self.reader.read_u32(byte_order)?)
        } else {
            None
        };

        Ok(GeometryHeader {
            byte_order,
            geometry_type,
            has_z: type_code & EWKB_Z_FLAG != 0,
            has_m: type_code & EWKB_M_FLAG != 0,
            srid,
        })
    }

    fn decode_body(&mut self, header: &GeometryHeader, depth: usize) -> EwkbResult<Geometry> {
        match header.geometry_type {
            GeometryType::Point => Ok(Geometry::Point(self.read_coord(header, true)?)),
            GeometryType::LineString => Ok(Geometry::LineString(self.read_coords(header)?)),
            GeometryType::Polygon => Ok(Geometry::Polygon(self.read_rings(header)?)),
            GeometryType::MultiPoint => {
                let points = self.read_members(header, depth, |geometry| match geometry {
                    Geometry::Point(coord) => Ok(coord),
                    other => Err(other),
                })?;
                Ok(Geometry::MultiPoint(points))
            }
            GeometryType::MultiLineString => {
                let lines = self.read_members(header, depth, |geometry| match geometry {
                    Geometry::LineString(coords) => Ok(coords),
                    other => Err(other),
                })?;
                Ok(Geometry::MultiLineString(lines))
            }
            GeometryType::MultiPolygon => {
                let polygons = self.read_members(header, depth, |geometry| match geometry {
                    Geometry::Polygon(rings) => Ok(rings),
                    other => Err(other),
                })?;
                Ok(Geometry::MultiPolygon(polygons))
            }
            GeometryType::GeometryCollection => {
                let geometries = self.read_members(header, depth, Ok)?;
                Ok(Geometry::GeometryCollection(geometries))
            }
        }
    }

    /// Reads an element count and rejects it if its elements cannot fit in
    /// the remaining buffer.
    ///
    /// A shortfall of less than one element is let through so the clipped
    /// last element surfaces as `Truncated` from the reader.
    fn read_count(&mut self, order: ByteOrder, min_element_size: usize) -> EwkbResult<usize> {
        let offset = self.reader.position();
        let count = self.reader.read_u32(order)? as usize;
        let remaining = self.reader.remaining();

        if count > remaining / min_element_size + 1 {
            return Err(EwkbError::malformed(
                offset,
                format!(
                    "count {} needs at least {} bytes per element but only {} bytes remain",
                    count, min_element_size, remaining
                ),
            ));
        }
        Ok(count)
    }

    /// Preallocation for `count` elements, bounded by what the buffer holds.
    fn capacity(&self, count: usize, min_element_size: usize) -> usize {
        count.min(self.reader.remaining() / min_element_size)
    }

    /// Reads one coordinate. Every component must be finite, except that a
    /// point may use the NaN X/Y encoding of an empty point.
    fn read_coord(&mut self, header: &GeometryHeader, allow_empty: bool) -> EwkbResult<Coord> {
        let start = self.reader.position();
        let order = header.byte_order;
        let x = self.reader.read_f64(order)?;
        let y = self.reader.read_f64(order)?;
        let z = if header.has_z {
            Some(self.reader.read_f64(order)?)
        } else {
            None
        };
        let m = if header.has_m {
            Some(self.reader.read_f64(order)?)
        } else {
            None
        };
        let coord = Coord { x, y, z, m };

        if allow_empty && coord.is_empty_point() {
            return Ok(coord);
        }
        // Components sit back to back in X, Y, Z, M order
        let components = [Some(x), Some(y), z, m];
        for (index, value) in components.iter().flatten().enumerate() {
            if !value.is_finite() {
                return Err(EwkbError::malformed(
                    start + index * 8,
                    format!("coordinate value {} is not finite", value),
                ));
            }
        }
        Ok(coord)
    }

    fn read_coords(&mut self, header: &GeometryHeader) -> EwkbResult<Vec<Coord>> {
        let coord_size = header.dimensions() * 8;
        let count = self.read_count(header.byte_order, coord_size)?;
        let mut coords = Vec::with_capacity(self.capacity(count, coord_size));
        for _ in 0..count {
            coords.push(self.read_coord(header, false)?);
        }
        Ok(coords)
    }

    fn read_rings(&mut self, header: &GeometryHeader) -> EwkbResult<Polygon> {
        let count = self.read_count(header.byte_order, MIN_RING_SIZE)?;
        let mut rings = Vec::with_capacity(self.capacity(count, MIN_RING_SIZE));
        for _ in 0..count {
            rings.push(self.read_coords(header)?);
        }
        Ok(rings)
    }

    /// Reads the elements of a multi geometry or collection. Each element has
    /// a full header of its own; `accept` returns the element back as `Err`
    /// when its kind is not allowed here.
    fn read_members<T>(
        &mut self,
        header: &GeometryHeader,
        depth: usize,
        accept: impl Fn(Geometry) -> Result<T, Geometry>,
    ) -> EwkbResult<Vec<T>> {
        let offset = self.reader.position();
        let count = self.read_count(header.byte_order, MIN_GEOMETRY_SIZE)?;
        if count > 0 && depth >= self.max_depth {
            return Err(EwkbError::malformed(
                offset,
                format!("nesting exceeds maximum depth of {}", self.max_depth),
            ));
        }

        let mut members = Vec::with_capacity(self.capacity(count, MIN_GEOMETRY_SIZE));
        for _ in 0..count {
            let offset = self.reader.position();
            let (_, geometry) = self.decode_node(depth + 1)?;
            let member = accept(geometry).map_err(|other| {
                EwkbError::malformed(
                    offset,
                    format!(
                        "{} cannot contain a {}",
                        header.geometry_type.name(),
                        other.geometry_type().name()
                    ),
                )
            })?;
            members.push(member);
        }
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn le_header(type_code: u32) -> Vec<u8> {
        let mut buf = vec![0x01];
        buf.extend_from_slice(&type_code.to_le_bytes());
        buf
    }

    fn le_point(x: f64, y: f64) -> Vec<u8> {
        let mut buf = le_header(1);
        buf.extend_from_slice(&x.to_le_bytes());
        buf.extend_from_slice(&y.to_le_bytes());
        buf
    }

    fn decode(data: &[u8]) -> EwkbResult<Geometry> {
        let mut reader = WkbReader::new(data);
        EwkbDecoder::new(&mut reader).decode()
    }

    #[test]
    fn test_decode_little_endian_point() {
        let geometry = decode(&le_point(1.0, 2.0)).unwrap();
        assert_eq!(geometry, Geometry::Point(Coord::xy(1.0, 2.0)));
    }

    #[test]
    fn test_decode_big_endian_point() {
        let mut data = vec![0x00, 0x00, 0x00, 0x00, 0x01];
        data.extend_from_slice(&3.5f64.to_be_bytes());
        data.extend_from_slice(&(-4.0f64).to_be_bytes());

        let geometry = decode(&data).unwrap();
        assert_eq!(geometry, Geometry::Point(Coord::xy(3.5, -4.0)));
    }

    #[test]
    fn test_decode_point_zm() {
        let mut data = le_header(0xC000_0001);
        for v in [1.0f64, 2.0, 3.0, 4.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }

        let geometry = decode(&data).unwrap();
        assert_eq!(geometry, Geometry::Point(Coord::xyzm(1.0, 2.0, 3.0, 4.0)));
    }

    #[test]
    fn test_decode_point_m_only() {
        let mut data = le_header(0x4000_0001);
        for v in [1.0f64, 2.0, 9.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }

        let geometry = decode(&data).unwrap();
        assert_eq!(geometry, Geometry::Point(Coord::xym(1.0, 2.0, 9.0)));
    }

    #[test]
    fn test_srid_is_skipped_and_reported() {
        let mut data = le_header(0x2000_0001);
        data.extend_from_slice(&4326u32.to_le_bytes());
        data.extend_from_slice(&1.0f64.to_le_bytes());
        data.extend_from_slice(&2.0f64.to_le_bytes());

        let mut reader = WkbReader::new(&data);
        let (geometry, srid) = EwkbDecoder::new(&mut reader).decode_with_srid().unwrap();
        assert_eq!(geometry, Geometry::Point(Coord::xy(1.0, 2.0)));
        assert_eq!(srid, Some(4326));
    }

    #[test]
    fn test_unsupported_type() {
        let mut data = le_header(0x2000_0008);
        data.extend_from_slice(&4326u32.to_le_bytes());

        let err = decode(&data).unwrap_err();
        assert_eq!(
            err,
            EwkbError::UnsupportedGeometryType {
                offset: 1,
                type_code: 0x2000_0008,
            }
        );
    }

    #[test]
    fn test_empty_linestring_and_polygon() {
        let mut line = le_header(2);
        line.extend_from_slice(&0u32.to_le_bytes());
        assert_eq!(decode(&line).unwrap(), Geometry::LineString(vec![]));

        let mut polygon = le_header(3);
        polygon.extend_from_slice(&0u32.to_le_bytes());
        assert_eq!(decode(&polygon).unwrap(), Geometry::Polygon(vec![]));
    }

    #[test]
    fn test_implausible_count_is_malformed() {
        let mut data = le_header(2);
        data.extend_from_slice(&u32::MAX.to_le_bytes());
        data.extend_from_slice(&[0; 16]);

        let err = decode(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedGeometry);
        assert_eq!(err.offset(), 5);
    }

    #[test]
    fn test_clipped_last_coordinate_is_truncation() {
        let mut data = le_header(2);
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&[0; 31]);

        let err = decode(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
        assert_eq!(err.offset(), 25);
    }

    #[test]
    fn test_multipoint_members_have_own_byte_order() {
        let mut data = le_header(4);
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&le_point(1.0, 2.0));
        // Second member is big-endian
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x01]);
        data.extend_from_slice(&3.0f64.to_be_bytes());
        data.extend_from_slice(&4.0f64.to_be_bytes());

        let geometry = decode(&data).unwrap();
        assert_eq!(
            geometry,
            Geometry::MultiPoint(vec![Coord::xy(1.0, 2.0), Coord::xy(3.0, 4.0)])
        );
    }

    #[test]
    fn test_multipoint_rejects_other_kinds() {
        let mut data = le_header(4);
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&le_header(2));
        data.extend_from_slice(&0u32.to_le_bytes());

        let err = decode(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedGeometry);
        assert_eq!(err.offset(), 9);
    }

    #[test]
    fn test_depth_cap() {
        // Three nested collections around an empty one
        let mut data = Vec::new();
        for _ in 0..3 {
            data.extend_from_slice(&le_header(7));
            data.extend_from_slice(&1u32.to_le_bytes());
        }
        data.extend_from_slice(&le_header(7));
        data.extend_from_slice(&0u32.to_le_bytes());

        let mut reader = WkbReader::new(&data);
        assert!(EwkbDecoder::new(&mut reader).with_max_depth(3).decode().is_ok());

        let mut reader = WkbReader::new(&data);
        let err = EwkbDecoder::new(&mut reader)
            .with_max_depth(2)
            .decode()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedGeometry);
        // Reported at the member count of the collection at depth 2
        assert_eq!(err.offset(), 23);
    }

    #[test]
    fn test_empty_collections_at_depth_limit() {
        let mut data = le_header(7);
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&le_header(7));
        data.extend_from_slice(&0u32.to_le_bytes());

        let mut reader = WkbReader::new(&data);
        let geometry = EwkbDecoder::new(&mut reader).with_max_depth(1).decode().unwrap();
        assert_eq!(
            geometry,
            Geometry::GeometryCollection(vec![Geometry::GeometryCollection(vec![])])
        );

        let mut empty = le_header(4);
        empty.extend_from_slice(&0u32.to_le_bytes());
        let mut reader = WkbReader::new(&empty);
        let geometry = EwkbDecoder::new(&mut reader).with_max_depth(0).decode().unwrap();
        assert_eq!(geometry, Geometry::MultiPoint(vec![]));
    }

    #[test]
    fn test_depth_limit_cannot_be_raised() {
        let levels = MAX_DEPTH_LIMIT + 1;
        let mut data = Vec::new();
        for _ in 0..levels {
            data.extend_from_slice(&le_header(7));
            data.extend_from_slice(&1u32.to_le_bytes());
        }
        data.extend_from_slice(&le_header(7));
        data.extend_from_slice(&0u32.to_le_bytes());

        let mut reader = WkbReader::new(&data);
        let err = EwkbDecoder::new(&mut reader)
            .with_max_depth(usize::MAX)
            .decode()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedGeometry);
        assert_eq!(err.offset(), MAX_DEPTH_LIMIT * 9 + 5);
    }

    #[test]
    fn test_non_finite_value_offset() {
        let mut data = le_header(2);
        data.extend_from_slice(&2u32.to_le_bytes());
        for v in [1.0f64, 2.0, f64::INFINITY, 0.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }

        let err = decode(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedGeometry);
        assert_eq!(err.offset(), 25);
    }

    #[test]
    fn test_non_finite_m_offset() {
        let mut data = le_header(0xC000_0001);
        for v in [1.0f64, 2.0, 3.0, f64::NAN] {
            data.extend_from_slice(&v.to_le_bytes());
        }

        let err = decode(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedGeometry);
        assert_eq!(err.offset(), 29);
    }

    #[test]
    fn test_empty_point_only_allowed_for_points() {
        let point = le_point(f64::NAN, f64::NAN);
        assert!(matches!(decode(&point), Ok(Geometry::Point(c)) if c.is_empty_point()));

        let mut multi = le_header(4);
        multi.extend_from_slice(&1u32.to_le_bytes());
        multi.extend_from_slice(&point);
        assert!(decode(&multi).is_ok());

        let mut line = le_header(2);
        line.extend_from_slice(&1u32.to_le_bytes());
        line.extend_from_slice(&f64::NAN.to_le_bytes());
        line.extend_from_slice(&f64::NAN.to_le_bytes());
        let err = decode(&line).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedGeometry);
        assert_eq!(err.offset(), 9);

        // Only one NaN is not an empty point
        let err = decode(&le_point(1.0, f64::NAN)).unwrap_err();
        assert_eq!(err.offset(), 13);
    }

    #[test]
    fn test_trailing_bytes() {
        let mut data = le_point(1.0, 2.0);
        data.push(0x00);

        let err = decode(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedGeometry);
        assert_eq!(err.offset(), 21);
    }

    #[test]
    fn test_truncated_point() {
        let data = le_point(1.0, 2.0);

        let err = decode(&data[..20]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
        assert_eq!(err.offset(), 13);
    }
}
