//! EWKB writer.
//!
//! Serializes a `Geometry` back into EWKB, writing a full header for every
//! node. Z and M flags are derived per node from the coordinates it holds; a
//! coordinate missing a flagged component is written with 0.0 in its place.

use byteorder::{BigEndian, ByteOrder as Endian, LittleEndian};

use crate::error::{EwkbError, EwkbResult};
use crate::types::*;

/// Writer producing EWKB bytes in a fixed byte order.
pub struct EwkbWriter {
    /// Output buffer.
    buf: Vec<u8>,
    /// Byte order used for every node.
    order: ByteOrder,
}

impl EwkbWriter {
    /// Creates a new writer using the given byte order.
    pub fn new(order: ByteOrder) -> Self {
        Self {
            buf: Vec::new(),
            order,
        }
    }

    /// Writes `geometry` with an optional SRID on its outermost header and
    /// returns the encoded bytes.
    ///
    /// # Errors
    ///
    /// Returns `MalformedGeometry` if an element count does not fit the
    /// 32-bit count field. The offset is that of the count in the output.
    pub fn write(mut self, geometry: &Geometry, srid: Option<u32>) -> EwkbResult<Vec<u8>> {
        self.write_geometry(geometry, srid)?;
        Ok(self.buf)
    }

    fn put_u32(&mut self, value: u32) {
        let mut bytes = [0u8; 4];
        match self.order {
            ByteOrder::BigEndian => BigEndian::write_u32(&mut bytes, value),
            ByteOrder::LittleEndian => LittleEndian::write_u32(&mut bytes, value),
        }
        self.buf.extend_from_slice(&bytes);
    }

    fn put_f64(&mut self, value: f64) {
        let mut bytes = [0u8; 8];
        match self.order {
            ByteOrder::BigEndian => BigEndian::write_f64(&mut bytes, value),
            ByteOrder::LittleEndian => LittleEndian::write_f64(&mut bytes, value),
        }
        self.buf.extend_from_slice(&bytes);
    }

    fn put_count(&mut self, count: usize) -> EwkbResult<()> {
        let count = u32::try_from(count).map_err(|_| {
            EwkbError::malformed(
                self.buf.len(),
                format!("count {} does not fit in 32 bits", count),
            )
        })?;
        self.put_u32(count);
        Ok(())
    }

    fn write_header(&mut self, header: &GeometryHeader) {
        self.buf.push(u8::from(header.byte_order));
        self.put_u32(header.type_code());
        if let Some(srid) = header.srid {
            self.put_u32(srid);
        }
    }

    fn node_header(&self, geometry_type: GeometryType, dims: (bool, bool)) -> GeometryHeader {
        GeometryHeader {
            byte_order: self.order,
            geometry_type,
            has_z: dims.0,
            has_m: dims.1,
            srid: None,
        }
    }

    fn write_geometry(&mut self, geometry: &Geometry, srid: Option<u32>) -> EwkbResult<()> {
        let header = GeometryHeader {
            srid,
            ..self.node_header(geometry.geometry_type(), node_dimensions(geometry))
        };
        self.write_header(&header);

        match geometry {
            Geometry::Point(coord) => self.write_coord(coord, &header),
            Geometry::LineString(coords) => self.write_coords(coords, &header)?,
            Geometry::Polygon(rings) => self.write_rings(rings, &header)?,
            Geometry::MultiPoint(points) => {
                self.put_count(points.len())?;
                for point in points {
                    let member = self.node_header(GeometryType::Point, coord_dimensions([point]));
                    self.write_header(&member);
                    self.write_coord(point, &member);
                }
            }
            Geometry::MultiLineString(lines) => {
                self.put_count(lines.len())?;
                for line in lines {
                    let member = self.node_header(GeometryType::LineString, coord_dimensions(line));
                    self.write_header(&member);
                    self.write_coords(line, &member)?;
                }
            }
            Geometry::MultiPolygon(polygons) => {
                self.put_count(polygons.len())?;
                for polygon in polygons {
                    let dims = coord_dimensions(polygon.iter().flatten());
                    let member = self.node_header(GeometryType::Polygon, dims);
                    self.write_header(&member);
                    self.write_rings(polygon, &member)?;
                }
            }
            Geometry::GeometryCollection(members) => {
                self.put_count(members.len())?;
                for member in members {
                    self.write_geometry(member, None)?;
                }
            }
        }
        Ok(())
    }

    fn write_coord(&mut self, coord: &Coord, header: &GeometryHeader) {
        self.put_f64(coord.x);
        self.put_f64(coord.y);
        if header.has_z {
            self.put_f64(coord.z.unwrap_or(0.0));
        }
        if header.has_m {
            self.put_f64(coord.m.unwrap_or(0.0));
        }
    }

    fn write_coords(&mut self, coords: &[Coord], header: &GeometryHeader) -> EwkbResult<()> {
        self.put_count(coords.len())?;
        for coord in coords {
            self.write_coord(coord, header);
        }
        Ok(())
    }

    fn write_rings(&mut self, rings: &[Ring], header: &GeometryHeader) -> EwkbResult<()> {
        self.put_count(rings.len())?;
        for ring in rings {
            self.write_coords(ring, header)?;
        }
        Ok(())
    }
}

fn coord_dimensions<'a>(coords: impl IntoIterator<Item = &'a Coord>) -> (bool, bool) {
    coords.into_iter().fold((false, false), |(z, m), c| {
        (z || c.z.is_some(), m || c.m.is_some())
    })
}

/// Whether any coordinate held by this node has Z or M.
///
/// Collections report 2D; their members carry their own headers.
fn node_dimensions(geometry: &Geometry) -> (bool, bool) {
    match geometry {
        Geometry::Point(coord) => coord_dimensions([coord]),
        Geometry::LineString(coords) => coord_dimensions(coords),
        Geometry::Polygon(rings) => coord_dimensions(rings.iter().flatten()),
        Geometry::MultiPoint(points) => coord_dimensions(points),
        Geometry::MultiLineString(lines) => coord_dimensions(lines.iter().flatten()),
        Geometry::MultiPolygon(polygons) => {
            coord_dimensions(polygons.iter().flatten().flatten())
        }
        Geometry::GeometryCollection(_) => (false, false),
    }
}

/// Encodes `geometry` as EWKB bytes.
pub fn to_ewkb(
    geometry: &Geometry,
    order: ByteOrder,
    srid: Option<u32>,
) -> EwkbResult<Vec<u8>> {
    EwkbWriter::new(order).write(geometry, srid)
}

/// Encodes `geometry` as upper-case hex EWKB, the form PostGIS exports.
pub fn to_hex_ewkb(
    geometry: &Geometry,
    order: ByteOrder,
    srid: Option<u32>,
) -> EwkbResult<String> {
    to_ewkb(geometry, order, srid).map(::hex::encode_upper)
}
