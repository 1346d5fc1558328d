//! Geometry data types.
//!
//! This module defines the in-memory representation of a decoded EWKB
//! geometry tree, along with the header fields that precede every node.

/// Flag bit signalling Z coordinates (PostGIS EWKB extension).
pub const EWKB_Z_FLAG: u32 = 0x8000_0000;
/// Flag bit signalling M coordinates (PostGIS EWKB extension).
pub const EWKB_M_FLAG: u32 = 0x4000_0000;
/// Flag bit signalling an embedded SRID (PostGIS EWKB extension).
pub const EWKB_SRID_FLAG: u32 = 0x2000_0000;

/// Byte order of a geometry node, read from the one-byte marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    BigEndian,
    LittleEndian,
}

impl From<u8> for ByteOrder {
    fn from(marker: u8) -> Self {
        if marker == 0 {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        }
    }
}

impl From<ByteOrder> for u8 {
    fn from(order: ByteOrder) -> Self {
        match order {
            ByteOrder::BigEndian => 0,
            ByteOrder::LittleEndian => 1,
        }
    }
}

/// The seven OGC base geometry types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryType {
    /// Maps an OGC base type code (the low byte of the type word).
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(GeometryType::Point),
            2 => Some(GeometryType::LineString),
            3 => Some(GeometryType::Polygon),
            4 => Some(GeometryType::MultiPoint),
            5 => Some(GeometryType::MultiLineString),
            6 => Some(GeometryType::MultiPolygon),
            7 => Some(GeometryType::GeometryCollection),
            _ => None,
        }
    }

    /// The OGC base type code.
    pub fn code(self) -> u32 {
        match self {
            GeometryType::Point => 1,
            GeometryType::LineString => 2,
            GeometryType::Polygon => 3,
            GeometryType::MultiPoint => 4,
            GeometryType::MultiLineString => 5,
            GeometryType::MultiPolygon => 6,
            GeometryType::GeometryCollection => 7,
        }
    }

    /// The GeoJSON `type` member for this kind.
    pub fn name(self) -> &'static str {
        match self {
            GeometryType::Point => "Point",
            GeometryType::LineString => "LineString",
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::MultiPolygon => "MultiPolygon",
            GeometryType::GeometryCollection => "GeometryCollection",
        }
    }
}

/// The decoded header of one geometry node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryHeader {
    /// Byte order of this node's body.
    pub byte_order: ByteOrder,
    /// Base geometry kind.
    pub geometry_type: GeometryType,
    /// Whether coordinates carry a Z component.
    pub has_z: bool,
    /// Whether coordinates carry an M component.
    pub has_m: bool,
    /// The embedded SRID, if the flag was set.
    pub srid: Option<u32>,
}

impl GeometryHeader {
    /// Number of `f64` values per coordinate (2 to 4).
    pub fn dimensions(&self) -> usize {
        2 + usize::from(self.has_z) + usize::from(self.has_m)
    }

    /// Builds the raw 32-bit type word, flags included.
    pub fn type_code(&self) -> u32 {
        let mut code = self.geometry_type.code();
        if self.has_z {
            code |= EWKB_Z_FLAG;
        }
        if self.has_m {
            code |= EWKB_M_FLAG;
        }
        if self.srid.is_some() {
            code |= EWKB_SRID_FLAG;
        }
        code
    }
}

/// A single position with optional Z and M components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
    pub m: Option<f64>,
}

impl Coord {
    /// Creates a 2D coordinate.
    pub const fn xy(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            m: None,
        }
    }

    /// Creates a 3D coordinate.
    pub const fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            m: None,
        }
    }

    /// Creates a measured 2D coordinate.
    pub const fn xym(x: f64, y: f64, m: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            m: Some(m),
        }
    }

    /// Creates a coordinate with all four components.
    pub const fn xyzm(x: f64, y: f64, z: f64, m: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            m: Some(m),
        }
    }

    /// Returns true for the PostGIS empty point encoding (NaN X and Y).
    pub fn is_empty_point(&self) -> bool {
        self.x.is_nan() && self.y.is_nan()
    }
}

/// An ordered coordinate sequence bounding a polygon's exterior or a hole.
///
/// Closure is not validated.
pub type Ring = Vec<Coord>;

/// An ordered sequence of coordinates.
pub type LineString = Vec<Coord>;

/// Rings of a polygon; ring 0 is the exterior, the rest are holes.
pub type Polygon = Vec<Ring>;

/// A decoded geometry tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coord),
    LineString(LineString),
    Polygon(Polygon),
    MultiPoint(Vec<Coord>),
    MultiLineString(Vec<LineString>),
    MultiPolygon(Vec<Polygon>),
    GeometryCollection(Vec<Geometry>),
}

impl Geometry {
    /// The base kind of this geometry.
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point(_) => GeometryType::Point,
            Geometry::LineString(_) => GeometryType::LineString,
            Geometry::Polygon(_) => GeometryType::Polygon,
            Geometry::MultiPoint(_) => GeometryType::MultiPoint,
            Geometry::MultiLineString(_) => GeometryType::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryType::MultiPolygon,
            Geometry::GeometryCollection(_) => GeometryType::GeometryCollection,
        }
    }
}
