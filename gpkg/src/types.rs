use std::fmt::Debug;
use std::io::Write;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::coord::{Coord, Coordinate, CoordinateM, CoordinateZ, CoordinateZM};
use crate::envelope::Envelope;
use crate::geometry_type::{Dimension, GeometryType};
use crate::gpkg_wkb::{FullWKB, WkbByteOrder};
use crate::result::{Error, Result};

/// A single position, empty when every ordinate is NaN
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<C: Coord>(C);

impl<C: Coord> Point<C> {
    pub fn new(coord: C) -> Self {
        Point(coord)
    }

    /// `POINT EMPTY`
    pub fn empty() -> Self {
        Point(C::empty())
    }

    pub fn coord(&self) -> &C {
        &self.0
    }

    /// The same position in another dimensionality, missing ordinates become NaN
    pub fn into_dimension<D: Coord>(self) -> Point<D> {
        Point(D::reshape(self.0))
    }
}

impl<C: Coord> From<C> for Point<C> {
    fn from(coord: C) -> Self {
        Point(coord)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineString<C: Coord>(Vec<C>);

impl<C: Coord> LineString<C> {
    /// Fails when any coordinate is empty, a line can't pass through nowhere
    pub fn try_new(coords: Vec<C>) -> Result<Self> {
        if let Some(i) = coords.iter().position(|c| c.is_empty()) {
            return Err(Error::ValidationError(format!(
                "LineString coordinate {i} is empty"
            )));
        }
        Ok(LineString(coords))
    }

    pub fn empty() -> Self {
        LineString(Vec::new())
    }

    pub fn coords(&self) -> &[C] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Fails when dropping an axis leaves a coordinate empty
    pub fn into_dimension<D: Coord>(self) -> Result<LineString<D>> {
        LineString::try_new(self.0.into_iter().map(D::reshape).collect())
    }
}

/// A polygon as a list of rings, the first being the exterior
///
/// Ring orientation and closure are not checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon<C: Coord> {
    rings: Vec<LineString<C>>,
}

impl<C: Coord> Polygon<C> {
    pub fn new(exterior: LineString<C>, interiors: Vec<LineString<C>>) -> Self {
        let mut rings = Vec::with_capacity(interiors.len() + 1);
        rings.push(exterior);
        rings.extend(interiors);
        Polygon { rings }
    }

    pub fn from_rings(rings: Vec<LineString<C>>) -> Self {
        Polygon { rings }
    }

    pub fn empty() -> Self {
        Polygon { rings: Vec::new() }
    }

    pub fn exterior(&self) -> Option<&LineString<C>> {
        self.rings.first()
    }

    pub fn interiors(&self) -> &[LineString<C>] {
        self.rings.get(1..).unwrap_or(&[])
    }

    pub fn rings(&self) -> &[LineString<C>] {
        &self.rings
    }

    pub fn into_dimension<D: Coord>(self) -> Result<Polygon<D>> {
        let rings = self
            .rings
            .into_iter()
            .map(|ring| ring.into_dimension())
            .collect::<Result<_>>()?;
        Ok(Polygon { rings })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiPoint<C: Coord>(Vec<Point<C>>);

impl<C: Coord> MultiPoint<C> {
    pub fn new(points: Vec<Point<C>>) -> Self {
        MultiPoint(points)
    }

    pub fn points(&self) -> &[Point<C>] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiLineString<C: Coord>(Vec<LineString<C>>);

impl<C: Coord> MultiLineString<C> {
    pub fn new(line_strings: Vec<LineString<C>>) -> Self {
        MultiLineString(line_strings)
    }

    pub fn line_strings(&self) -> &[LineString<C>] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiPolygon<C: Coord>(Vec<Polygon<C>>);

impl<C: Coord> MultiPolygon<C> {
    pub fn new(polygons: Vec<Polygon<C>>) -> Self {
        MultiPolygon(polygons)
    }

    pub fn polygons(&self) -> &[Polygon<C>] {
        &self.0
    }
}

/// An ordered collection of arbitrary geometries
///
/// `C` is the declared dimensionality and decides the type code. Members are
/// not required to share it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryCollection<C: Coord> {
    geometries: Vec<GPKGGeometry>,
    dimension: PhantomData<C>,
}

impl<C: Coord> GeometryCollection<C> {
    pub fn new(geometries: Vec<GPKGGeometry>) -> Self {
        GeometryCollection {
            geometries,
            dimension: PhantomData,
        }
    }

    pub fn geometries(&self) -> &[GPKGGeometry] {
        &self.geometries
    }
}

/// Any of the seven standard shapes in one dimensionality
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry<C: Coord> {
    Point(Point<C>),
    LineString(LineString<C>),
    Polygon(Polygon<C>),
    MultiPoint(MultiPoint<C>),
    MultiLineString(MultiLineString<C>),
    MultiPolygon(MultiPolygon<C>),
    GeometryCollection(GeometryCollection<C>),
}

// forwards a FullWKB method to whichever shape the enum holds
macro_rules! each_shape {
    ($self:expr, $g:ident => $body:expr) => {
        match $self {
            Geometry::Point($g) => $body,
            Geometry::LineString($g) => $body,
            Geometry::Polygon($g) => $body,
            Geometry::MultiPoint($g) => $body,
            Geometry::MultiLineString($g) => $body,
            Geometry::MultiPolygon($g) => $body,
            Geometry::GeometryCollection($g) => $body,
        }
    };
}

impl<C: Coord> Geometry<C> {
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

    pub fn type_code(&self) -> u32 {
        C::DIMENSION.type_code(self.geometry_type())
    }

    pub fn is_empty(&self) -> bool {
        each_shape!(self, g => g.is_empty())
    }

    pub fn create_envelope(&self) -> Envelope {
        each_shape!(self, g => g.create_envelope())
    }

    pub fn write_wkb<W: Write>(&self, w: &mut W, order: WkbByteOrder) -> Result<()> {
        each_shape!(self, g => g.write_as_wkb(w, order))
    }
}

macro_rules! into_geometry {
    ($($shape:ident),+) => {
        $(
            impl<C: Coord> From<$shape<C>> for Geometry<C> {
                fn from(value: $shape<C>) -> Self {
                    Geometry::$shape(value)
                }
            }

            impl<C: Coord> From<$shape<C>> for GPKGGeometry {
                fn from(value: $shape<C>) -> Self {
                    C::into_any(Geometry::$shape(value))
                }
            }
        )+
    };
}

into_geometry!(
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection
);

/// A geometry type outside the standard set, produced by a registered factory
///
/// Implementors write the complete WKB themselves, including the byte order
/// marker and their type code, so that any reader with a matching factory
/// can decode it.
pub trait ExtensionGeometry: Debug + Send + Sync {
    fn type_code(&self) -> u32;

    fn geometry_type_name(&self) -> &str;

    fn dimension(&self) -> Dimension;

    fn is_empty(&self) -> bool;

    fn create_envelope(&self) -> Envelope;

    fn write_wkb(&self, w: &mut dyn Write, order: WkbByteOrder) -> Result<()>;
}

/// A geometry of any shape and dimensionality
///
/// This is what the factory registry produces and what the blob encoder
/// consumes.
#[derive(Debug, Clone)]
pub enum GPKGGeometry {
    XY(Geometry<Coordinate>),
    XYZ(Geometry<CoordinateZ>),
    XYM(Geometry<CoordinateM>),
    XYZM(Geometry<CoordinateZM>),
    Extension(Arc<dyn ExtensionGeometry>),
}

macro_rules! each_dimension {
    ($self:expr, $g:ident => $body:expr, $ext:ident => $ext_body:expr) => {
        match $self {
            GPKGGeometry::XY($g) => $body,
            GPKGGeometry::XYZ($g) => $body,
            GPKGGeometry::XYM($g) => $body,
            GPKGGeometry::XYZM($g) => $body,
            GPKGGeometry::Extension($ext) => $ext_body,
        }
    };
}

impl GPKGGeometry {
    pub fn extension(geometry: impl ExtensionGeometry + 'static) -> Self {
        GPKGGeometry::Extension(Arc::new(geometry))
    }

    pub fn type_code(&self) -> u32 {
        each_dimension!(self, g => g.type_code(), e => e.type_code())
    }

    /// The shape name, e.g. `POINT` for a point of any dimensionality
    pub fn geometry_type_name(&self) -> &str {
        each_dimension!(self, g => g.geometry_type().name(), e => e.geometry_type_name())
    }

    /// `None` for extension geometries
    pub fn geometry_type(&self) -> Option<GeometryType> {
        each_dimension!(self, g => Some(g.geometry_type()), _e => None)
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            GPKGGeometry::XY(_) => Dimension::XY,
            GPKGGeometry::XYZ(_) => Dimension::XYZ,
            GPKGGeometry::XYM(_) => Dimension::XYM,
            GPKGGeometry::XYZM(_) => Dimension::XYZM,
            GPKGGeometry::Extension(e) => e.dimension(),
        }
    }

    pub fn has_z(&self) -> bool {
        self.dimension().has_z()
    }

    pub fn has_m(&self) -> bool {
        self.dimension().has_m()
    }

    pub fn is_extension(&self) -> bool {
        matches!(self, GPKGGeometry::Extension(_))
    }

    pub fn is_empty(&self) -> bool {
        each_dimension!(self, g => g.is_empty(), e => e.is_empty())
    }

    /// The tightest envelope over every coordinate, in this geometry's dimensionality
    pub fn create_envelope(&self) -> Envelope {
        each_dimension!(self, g => g.create_envelope(), e => e.create_envelope())
    }

    /// Write the WKB for this geometry, every nested member using `order`
    pub fn write_wkb<W: Write>(&self, w: &mut W, order: WkbByteOrder) -> Result<()> {
        each_dimension!(self, g => g.write_wkb(w, order), e => e.write_wkb(w, order))
    }

    pub fn to_wkb(&self, order: WkbByteOrder) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_wkb(&mut buf, order)?;
        Ok(buf)
    }

    /// The typed geometry when this one has dimensionality `C`
    pub fn as_typed<C: Coord>(&self) -> Option<&Geometry<C>> {
        C::from_any(self)
    }
}

impl PartialEq for GPKGGeometry {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (GPKGGeometry::XY(a), GPKGGeometry::XY(b)) => a == b,
            (GPKGGeometry::XYZ(a), GPKGGeometry::XYZ(b)) => a == b,
            (GPKGGeometry::XYM(a), GPKGGeometry::XYM(b)) => a == b,
            (GPKGGeometry::XYZM(a), GPKGGeometry::XYZM(b)) => a == b,
            // extensions are opaque, compare what they would put on the wire
            (GPKGGeometry::Extension(a), GPKGGeometry::Extension(b)) => {
                a.type_code() == b.type_code()
                    && matches!(
                        (self.to_wkb(WkbByteOrder::LittleEndian), other.to_wkb(WkbByteOrder::LittleEndian)),
                        (Ok(x), Ok(y)) if x == y
                    )
            }
            _ => false,
        }
    }
}

impl<C: Coord> From<Geometry<C>> for GPKGGeometry {
    fn from(value: Geometry<C>) -> Self {
        C::into_any(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::ContentsIndicator;

    fn line(coords: &[(f64, f64)]) -> LineString<Coordinate> {
        LineString::try_new(coords.iter().map(|&c| c.into()).collect()).unwrap()
    }

    #[test]
    fn empty_point_is_empty() {
        let geom: GPKGGeometry = Point::<CoordinateZM>::empty().into();
        assert!(geom.is_empty());
        assert!(geom.has_z());
        assert!(geom.has_m());
        assert_eq!(
            geom.create_envelope().contents_indicator(),
            ContentsIndicator::NoEnvelope
        );
        let other: GPKGGeometry = Point::<CoordinateZM>::empty().into();
        assert_eq!(geom, other);
    }

    #[test]
    fn linestring_rejects_empty_coordinate() {
        let err = LineString::try_new(vec![Coordinate::new(1.0, 2.0), Coordinate::empty()]);
        assert!(matches!(err, Err(Error::ValidationError(_))));
    }

    #[test]
    fn type_codes_and_names() {
        let g: GPKGGeometry = Point::new(CoordinateZ::new(1.0, 2.0, 3.0)).into();
        assert_eq!(g.type_code(), 1001);
        assert_eq!(g.geometry_type_name(), "POINT");
        let g: GPKGGeometry = Point::new(CoordinateM::new(1.0, 2.0, 3.0)).into();
        assert_eq!(g.type_code(), 2001);
        let g: GPKGGeometry = Point::new(CoordinateZM::new(1.0, 2.0, 3.0, 4.0)).into();
        assert_eq!(g.type_code(), 3001);
        let g: GPKGGeometry = GeometryCollection::<CoordinateM>::new(vec![]).into();
        assert_eq!(g.type_code(), 2007);
        assert_eq!(g.geometry_type(), Some(GeometryType::GeometryCollection));
    }

    #[test]
    fn polygon_rings() {
        let exterior = line(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 0.0)]);
        let hole = line(&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 1.0)]);
        let poly = Polygon::new(exterior.clone(), vec![hole.clone()]);
        assert_eq!(poly.exterior(), Some(&exterior));
        assert_eq!(poly.interiors(), &[hole]);
        assert!(Polygon::<Coordinate>::empty().interiors().is_empty());
    }

    #[test]
    fn collection_envelope_covers_members() {
        let gc = GeometryCollection::<Coordinate>::new(vec![
            Point::new(Coordinate::new(-1.0, 5.0)).into(),
            line(&[(0.0, 0.0), (3.0, 2.0)]).into(),
        ]);
        assert_eq!(gc.create_envelope().to_array(), vec![-1.0, 3.0, 0.0, 5.0]);
    }

    #[test]
    fn collection_envelope_uses_declared_dimension() {
        let gc = GeometryCollection::<Coordinate>::new(vec![Point::new(CoordinateZ::new(
            1.0, 2.0, 3.0,
        ))
        .into()]);
        let env = gc.create_envelope();
        assert_eq!(env.dimension(), Dimension::XY);
        assert_eq!(env.to_array(), vec![1.0, 1.0, 2.0, 2.0]);
    }

    #[test]
    fn typed_access() {
        let g: GPKGGeometry = Point::new(Coordinate::new(1.0, 2.0)).into();
        assert!(g.as_typed::<Coordinate>().is_some());
        assert!(g.as_typed::<CoordinateZ>().is_none());
    }
}
