use crate::coord::Coord;
use crate::envelope::Envelope;
use crate::geometry_type::{Dimension, GeometryType};
use crate::registry::GeometryFactoryRegistry;
use crate::result::{Error, Result};
use crate::types::*;
use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Cursor, Read, Write};

/// How deeply collections may nest before a blob is rejected
pub const MAX_NESTING_DEPTH: usize = 64;

// order byte + type code
const PREFIX_LEN: usize = 5;

/// The byte order marker that opens every WKB geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WkbByteOrder {
    BigEndian,
    #[default]
    LittleEndian,
}

impl WkbByteOrder {
    pub fn code(&self) -> u8 {
        match self {
            WkbByteOrder::BigEndian => 0,
            WkbByteOrder::LittleEndian => 1,
        }
    }

    pub fn from_code(b: u8) -> Result<Self> {
        match b {
            0 => Ok(WkbByteOrder::BigEndian),
            1 => Ok(WkbByteOrder::LittleEndian),
            _ => Err(Error::FormatError(format!("invalid byte order marker {b}"))),
        }
    }
}

/// Ties a byteorder type to the marker byte it is announced with
pub trait WkbOrder: ByteOrder {
    const ORDER: WkbByteOrder;
}

impl WkbOrder for BigEndian {
    const ORDER: WkbByteOrder = WkbByteOrder::BigEndian;
}

impl WkbOrder for LittleEndian {
    const ORDER: WkbByteOrder = WkbByteOrder::LittleEndian;
}

/// Write the order marker and type code that open a WKB geometry
pub fn write_prefix<W: Write + ?Sized>(w: &mut W, order: WkbByteOrder, type_code: u32) -> Result<()> {
    w.write_u8(order.code())?;
    match order {
        WkbByteOrder::BigEndian => w.write_u32::<BigEndian>(type_code)?,
        WkbByteOrder::LittleEndian => w.write_u32::<LittleEndian>(type_code)?,
    }
    Ok(())
}

/// A cursor over WKB bytes that knows where to find factories for nested geometries
///
/// Factories registered with a [GeometryFactoryRegistry] receive this reader
/// positioned at the order marker of the geometry they are asked to decode.
pub struct WkbReader<'a> {
    cursor: Cursor<&'a [u8]>,
    registry: &'a GeometryFactoryRegistry,
    depth: usize,
}

impl<'a> WkbReader<'a> {
    pub fn new(buf: &'a [u8], registry: &'a GeometryFactoryRegistry) -> Self {
        WkbReader {
            cursor: Cursor::new(buf),
            registry,
            depth: 0,
        }
    }

    pub fn registry(&self) -> &'a GeometryFactoryRegistry {
        self.registry
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn set_position(&mut self, pos: u64) {
        self.cursor.set_position(pos)
    }

    pub fn remaining(&self) -> usize {
        let len = self.cursor.get_ref().len();
        len.saturating_sub(self.cursor.position() as usize)
    }

    /// Caps a preallocation so a bogus count can't reserve more than the buffer holds
    pub fn bounded_capacity(&self, count: u32, min_element_size: usize) -> usize {
        (count as usize).min(self.remaining() / min_element_size.max(1))
    }

    pub fn read_u32_ordered(&mut self, order: WkbByteOrder) -> Result<u32> {
        Ok(match order {
            WkbByteOrder::BigEndian => self.cursor.read_u32::<BigEndian>()?,
            WkbByteOrder::LittleEndian => self.cursor.read_u32::<LittleEndian>()?,
        })
    }

    pub fn read_f64_ordered(&mut self, order: WkbByteOrder) -> Result<f64> {
        Ok(match order {
            WkbByteOrder::BigEndian => self.cursor.read_f64::<BigEndian>()?,
            WkbByteOrder::LittleEndian => self.cursor.read_f64::<LittleEndian>()?,
        })
    }

    /// Consume the order marker and type code
    pub fn read_prefix(&mut self) -> Result<(WkbByteOrder, u32)> {
        let order = WkbByteOrder::from_code(self.cursor.read_u8()?)?;
        let type_code = self.read_u32_ordered(order)?;
        Ok((order, type_code))
    }

    /// Read the order marker and type code, then rewind to where we started
    pub fn peek_prefix(&mut self) -> Result<(WkbByteOrder, u32)> {
        let mark = self.cursor.position();
        let prefix = self.read_prefix();
        self.cursor.set_position(mark);
        prefix
    }

    /// Decode the next geometry by handing the reader to the factory registered for its type code
    pub fn read_geometry(&mut self) -> Result<GPKGGeometry> {
        let (_, type_code) = self.peek_prefix()?;
        let registry = self.registry;
        let factory = registry
            .factory(type_code)
            .ok_or(Error::UnsupportedGeometryType(type_code))?;
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(Error::FormatError(format!(
                "geometry nesting deeper than {MAX_NESTING_DEPTH}"
            )));
        }
        log::trace!(
            "decoding type {} at offset {}",
            type_code,
            self.cursor.position()
        );
        self.depth += 1;
        let geometry = factory(self);
        self.depth -= 1;
        geometry
    }
}

impl Read for WkbReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

/// Decode a bare WKB geometry (no GeoPackage header)
pub fn read_wkb(buf: &[u8], registry: &GeometryFactoryRegistry) -> Result<GPKGGeometry> {
    WkbReader::new(buf, registry).read_geometry()
}

/// The codec every standard geometry shape implements
///
/// `write_as_bytes`/`read_from_bytes` handle the payload after the order
/// marker and type code, `write_as_wkb`/`read_from_wkb` the whole thing.
pub trait FullWKB: Sized {
    const GEOMETRY_TYPE: GeometryType;
    const DIMENSION: Dimension;

    fn wkb_type_code() -> u32 {
        Self::DIMENSION.type_code(Self::GEOMETRY_TYPE)
    }

    fn is_empty(&self) -> bool;

    fn create_envelope(&self) -> Envelope;

    fn write_as_bytes<T: WkbOrder, W: Write>(&self, w: &mut W) -> Result<()>;

    fn read_from_bytes<T: WkbOrder>(r: &mut WkbReader<'_>) -> Result<Self>;

    fn write_as_wkb<W: Write>(&self, w: &mut W, order: WkbByteOrder) -> Result<()> {
        write_prefix(w, order, Self::wkb_type_code())?;
        match order {
            WkbByteOrder::BigEndian => self.write_as_bytes::<BigEndian, W>(w),
            WkbByteOrder::LittleEndian => self.write_as_bytes::<LittleEndian, W>(w),
        }
    }

    fn read_from_wkb(r: &mut WkbReader<'_>) -> Result<Self> {
        let (order, type_code) = r.read_prefix()?;
        if type_code != Self::wkb_type_code() {
            return Err(Error::UnsupportedGeometryType(type_code));
        }
        match order {
            WkbByteOrder::BigEndian => Self::read_from_bytes::<BigEndian>(r),
            WkbByteOrder::LittleEndian => Self::read_from_bytes::<LittleEndian>(r),
        }
    }
}

fn write_count<T: WkbOrder, W: Write>(w: &mut W, len: usize) -> Result<()> {
    w.write_u32::<T>(u32::try_from(len)?)?;
    Ok(())
}

fn write_coords<C: Coord, T: WkbOrder, W: Write>(coords: &[C], w: &mut W) -> Result<()> {
    write_count::<T, W>(w, coords.len())?;
    for c in coords {
        c.write_as_bytes::<T, W>(w)?;
    }
    Ok(())
}

fn read_coords<C: Coord, T: WkbOrder>(r: &mut WkbReader<'_>) -> Result<Vec<C>> {
    let num_points = r.read_u32::<T>()?;
    let mut coords = Vec::with_capacity(r.bounded_capacity(num_points, C::DIMENSION.size() * 8));
    for _ in 0..num_points {
        coords.push(C::read_from_bytes::<T, _>(r)?);
    }
    Ok(coords)
}

fn coords_envelope<C: Coord>(coords: &[C]) -> Envelope {
    let mut envelope = Envelope::empty(C::DIMENSION);
    for c in coords {
        c.expand_envelope(&mut envelope);
    }
    envelope
}

fn combined_envelope<'g, G: FullWKB + 'g>(
    dimension: Dimension,
    members: impl IntoIterator<Item = &'g G>,
) -> Envelope {
    members
        .into_iter()
        .fold(Envelope::empty(dimension), |acc, g| acc.combine(&g.create_envelope()))
}

impl<C: Coord> FullWKB for Point<C> {
    const GEOMETRY_TYPE: GeometryType = GeometryType::Point;
    const DIMENSION: Dimension = C::DIMENSION;

    fn is_empty(&self) -> bool {
        self.coord().is_empty()
    }

    fn create_envelope(&self) -> Envelope {
        coords_envelope(std::slice::from_ref(self.coord()))
    }

    fn write_as_bytes<T: WkbOrder, W: Write>(&self, w: &mut W) -> Result<()> {
        self.coord().write_as_bytes::<T, W>(w)
    }

    fn read_from_bytes<T: WkbOrder>(r: &mut WkbReader<'_>) -> Result<Self> {
        Ok(Point::new(C::read_from_bytes::<T, _>(r)?))
    }
}

impl<C: Coord> FullWKB for LineString<C> {
    const GEOMETRY_TYPE: GeometryType = GeometryType::LineString;
    const DIMENSION: Dimension = C::DIMENSION;

    fn is_empty(&self) -> bool {
        self.coords().is_empty()
    }

    fn create_envelope(&self) -> Envelope {
        coords_envelope(self.coords())
    }

    fn write_as_bytes<T: WkbOrder, W: Write>(&self, w: &mut W) -> Result<()> {
        write_coords::<C, T, W>(self.coords(), w)
    }

    fn read_from_bytes<T: WkbOrder>(r: &mut WkbReader<'_>) -> Result<Self> {
        LineString::try_new(read_coords::<C, T>(r)?)
    }
}

impl<C: Coord> FullWKB for Polygon<C> {
    const GEOMETRY_TYPE: GeometryType = GeometryType::Polygon;
    const DIMENSION: Dimension = C::DIMENSION;

    fn is_empty(&self) -> bool {
        self.rings().iter().all(|ring| ring.is_empty())
    }

    fn create_envelope(&self) -> Envelope {
        combined_envelope(C::DIMENSION, self.rings())
    }

    fn write_as_bytes<T: WkbOrder, W: Write>(&self, w: &mut W) -> Result<()> {
        write_count::<T, W>(w, self.rings().len())?;
        for ring in self.rings() {
            ring.write_as_bytes::<T, W>(w)?;
        }
        Ok(())
    }

    fn read_from_bytes<T: WkbOrder>(r: &mut WkbReader<'_>) -> Result<Self> {
        let num_rings = r.read_u32::<T>()?;
        let mut rings = Vec::with_capacity(r.bounded_capacity(num_rings, 4));
        for _ in 0..num_rings {
            rings.push(LineString::<C>::read_from_bytes::<T>(r)?);
        }
        Ok(Polygon::from_rings(rings))
    }
}

/// A shape that can appear inside one of the multi types
///
/// Members are decoded through the registry in whatever dimensionality they
/// declare, then reshaped to the parent's.
trait Member: Sized {
    fn from_geometry<D: Coord>(geometry: Geometry<D>) -> Result<Self>;
}

impl<C: Coord> Member for Point<C> {
    fn from_geometry<D: Coord>(geometry: Geometry<D>) -> Result<Self> {
        match geometry {
            Geometry::Point(p) => Ok(p.into_dimension()),
            other => Err(Error::UnsupportedGeometryType(other.type_code())),
        }
    }
}

impl<C: Coord> Member for LineString<C> {
    fn from_geometry<D: Coord>(geometry: Geometry<D>) -> Result<Self> {
        match geometry {
            Geometry::LineString(ls) => ls.into_dimension(),
            other => Err(Error::UnsupportedGeometryType(other.type_code())),
        }
    }
}

impl<C: Coord> Member for Polygon<C> {
    fn from_geometry<D: Coord>(geometry: Geometry<D>) -> Result<Self> {
        match geometry {
            Geometry::Polygon(p) => p.into_dimension(),
            other => Err(Error::UnsupportedGeometryType(other.type_code())),
        }
    }
}

fn read_member<M: Member>(r: &mut WkbReader<'_>) -> Result<M> {
    match r.read_geometry()? {
        GPKGGeometry::XY(g) => M::from_geometry(g),
        GPKGGeometry::XYZ(g) => M::from_geometry(g),
        GPKGGeometry::XYM(g) => M::from_geometry(g),
        GPKGGeometry::XYZM(g) => M::from_geometry(g),
        other => Err(Error::UnsupportedGeometryType(other.type_code())),
    }
}

// the multi types hold complete WKB members, each with its own order marker
macro_rules! multi_wkb {
    ($t:ident, $member:ident, $geometry_type:expr, $members:ident) => {
        impl<C: Coord> FullWKB for $t<C> {
            const GEOMETRY_TYPE: GeometryType = $geometry_type;
            const DIMENSION: Dimension = C::DIMENSION;

            fn is_empty(&self) -> bool {
                self.$members().iter().all(|member| member.is_empty())
            }

            fn create_envelope(&self) -> Envelope {
                combined_envelope(C::DIMENSION, self.$members())
            }

            fn write_as_bytes<T: WkbOrder, W: Write>(&self, w: &mut W) -> Result<()> {
                write_count::<T, W>(w, self.$members().len())?;
                for member in self.$members() {
                    member.write_as_wkb(w, T::ORDER)?;
                }
                Ok(())
            }

            fn read_from_bytes<T: WkbOrder>(r: &mut WkbReader<'_>) -> Result<Self> {
                let count = r.read_u32::<T>()?;
                let mut members = Vec::with_capacity(r.bounded_capacity(count, PREFIX_LEN));
                for _ in 0..count {
                    members.push(read_member::<$member<C>>(r)?);
                }
                Ok($t::new(members))
            }
        }
    };
}

multi_wkb!(MultiPoint, Point, GeometryType::MultiPoint, points);
multi_wkb!(
    MultiLineString,
    LineString,
    GeometryType::MultiLineString,
    line_strings
);
multi_wkb!(MultiPolygon, Polygon, GeometryType::MultiPolygon, polygons);

impl<C: Coord> FullWKB for GeometryCollection<C> {
    const GEOMETRY_TYPE: GeometryType = GeometryType::GeometryCollection;
    const DIMENSION: Dimension = C::DIMENSION;

    fn is_empty(&self) -> bool {
        self.geometries().iter().all(GPKGGeometry::is_empty)
    }

    fn create_envelope(&self) -> Envelope {
        self.geometries()
            .iter()
            .fold(Envelope::empty(C::DIMENSION), |acc, g| {
                acc.combine(&g.create_envelope())
            })
            .to_dimension(C::DIMENSION)
    }

    fn write_as_bytes<T: WkbOrder, W: Write>(&self, w: &mut W) -> Result<()> {
        write_count::<T, W>(w, self.geometries().len())?;
        for geom in self.geometries() {
            geom.write_wkb(w, T::ORDER)?;
        }
        Ok(())
    }

    // members may be any registered type in any byte order
    fn read_from_bytes<T: WkbOrder>(r: &mut WkbReader<'_>) -> Result<Self> {
        let num_geoms = r.read_u32::<T>()?;
        let mut geoms = Vec::with_capacity(r.bounded_capacity(num_geoms, PREFIX_LEN));
        for _ in 0..num_geoms {
            geoms.push(r.read_geometry()?);
        }
        Ok(GeometryCollection::new(geoms))
    }
}
