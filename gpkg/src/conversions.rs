//! Conversions between the XY geometries and [geo_types].
//!
//! geo-types has no Z or M, so only [GPKGGeometry::XY] converts back; anything
//! else is a [Error::ValidationError]. Lines, rectangles and triangles become
//! the LineString or Polygon they describe.
use crate::coord::Coordinate;
use crate::result::{Error, Result};
use crate::types::*;

impl From<geo_types::Coord<f64>> for Coordinate {
    fn from(c: geo_types::Coord<f64>) -> Self {
        Coordinate::new(c.x, c.y)
    }
}

impl From<Coordinate> for geo_types::Coord<f64> {
    fn from(c: Coordinate) -> Self {
        geo_types::Coord { x: c.x, y: c.y }
    }
}

impl From<geo_types::Point<f64>> for Point<Coordinate> {
    fn from(p: geo_types::Point<f64>) -> Self {
        Point::new(p.0.into())
    }
}

impl TryFrom<geo_types::LineString<f64>> for LineString<Coordinate> {
    type Error = Error;

    fn try_from(ls: geo_types::LineString<f64>) -> Result<Self> {
        LineString::try_new(ls.0.into_iter().map(Coordinate::from).collect())
    }
}

impl TryFrom<geo_types::Polygon<f64>> for Polygon<Coordinate> {
    type Error = Error;

    fn try_from(p: geo_types::Polygon<f64>) -> Result<Self> {
        let (exterior, interiors) = p.into_inner();
        if exterior.0.is_empty() && interiors.is_empty() {
            return Ok(Polygon::empty());
        }
        let interiors = interiors
            .into_iter()
            .map(LineString::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Polygon::new(exterior.try_into()?, interiors))
    }
}

impl From<geo_types::MultiPoint<f64>> for MultiPoint<Coordinate> {
    fn from(mp: geo_types::MultiPoint<f64>) -> Self {
        MultiPoint::new(mp.0.into_iter().map(Point::from).collect())
    }
}

impl TryFrom<geo_types::MultiLineString<f64>> for MultiLineString<Coordinate> {
    type Error = Error;

    fn try_from(mls: geo_types::MultiLineString<f64>) -> Result<Self> {
        Ok(MultiLineString::new(
            mls.0
                .into_iter()
                .map(LineString::try_from)
                .collect::<Result<_>>()?,
        ))
    }
}

impl TryFrom<geo_types::MultiPolygon<f64>> for MultiPolygon<Coordinate> {
    type Error = Error;

    fn try_from(mp: geo_types::MultiPolygon<f64>) -> Result<Self> {
        Ok(MultiPolygon::new(
            mp.0.into_iter()
                .map(Polygon::try_from)
                .collect::<Result<_>>()?,
        ))
    }
}

impl TryFrom<geo_types::GeometryCollection<f64>> for GeometryCollection<Coordinate> {
    type Error = Error;

    fn try_from(gc: geo_types::GeometryCollection<f64>) -> Result<Self> {
        Ok(GeometryCollection::new(
            gc.0.into_iter()
                .map(GPKGGeometry::try_from)
                .collect::<Result<_>>()?,
        ))
    }
}

impl TryFrom<geo_types::Geometry<f64>> for GPKGGeometry {
    type Error = Error;

    fn try_from(g: geo_types::Geometry<f64>) -> Result<Self> {
        Ok(match g {
            geo_types::Geometry::Point(p) => Point::from(p).into(),
            geo_types::Geometry::Line(l) => {
                LineString::<Coordinate>::try_new(vec![l.start.into(), l.end.into()])?.into()
            }
            geo_types::Geometry::LineString(ls) => LineString::try_from(ls)?.into(),
            geo_types::Geometry::Polygon(p) => Polygon::try_from(p)?.into(),
            geo_types::Geometry::MultiPoint(mp) => MultiPoint::from(mp).into(),
            geo_types::Geometry::MultiLineString(mls) => MultiLineString::try_from(mls)?.into(),
            geo_types::Geometry::MultiPolygon(mp) => MultiPolygon::try_from(mp)?.into(),
            geo_types::Geometry::GeometryCollection(gc) => {
                GeometryCollection::try_from(gc)?.into()
            }
            geo_types::Geometry::Rect(r) => Polygon::try_from(r.to_polygon())?.into(),
            geo_types::Geometry::Triangle(t) => Polygon::try_from(t.to_polygon())?.into(),
        })
    }
}

fn to_geo_line_string(ls: &LineString<Coordinate>) -> geo_types::LineString<f64> {
    geo_types::LineString::new(ls.coords().iter().map(|&c| c.into()).collect())
}

fn to_geo_polygon(p: &Polygon<Coordinate>) -> geo_types::Polygon<f64> {
    let exterior = p
        .exterior()
        .map(to_geo_line_string)
        .unwrap_or_else(|| geo_types::LineString::new(vec![]));
    let interiors = p.interiors().iter().map(to_geo_line_string).collect();
    geo_types::Polygon::new(exterior, interiors)
}

impl From<&Point<Coordinate>> for geo_types::Point<f64> {
    fn from(p: &Point<Coordinate>) -> Self {
        geo_types::Point((*p.coord()).into())
    }
}

impl From<&LineString<Coordinate>> for geo_types::LineString<f64> {
    fn from(ls: &LineString<Coordinate>) -> Self {
        to_geo_line_string(ls)
    }
}

impl From<&Polygon<Coordinate>> for geo_types::Polygon<f64> {
    fn from(p: &Polygon<Coordinate>) -> Self {
        to_geo_polygon(p)
    }
}

impl TryFrom<&Geometry<Coordinate>> for geo_types::Geometry<f64> {
    type Error = Error;

    fn try_from(g: &Geometry<Coordinate>) -> Result<Self> {
        Ok(match g {
            Geometry::Point(p) => geo_types::Geometry::Point(p.into()),
            Geometry::LineString(ls) => geo_types::Geometry::LineString(ls.into()),
            Geometry::Polygon(p) => geo_types::Geometry::Polygon(p.into()),
            Geometry::MultiPoint(mp) => geo_types::Geometry::MultiPoint(geo_types::MultiPoint(
                mp.points().iter().map(geo_types::Point::from).collect(),
            )),
            Geometry::MultiLineString(mls) => {
                geo_types::Geometry::MultiLineString(geo_types::MultiLineString(
                    mls.line_strings().iter().map(to_geo_line_string).collect(),
                ))
            }
            Geometry::MultiPolygon(mp) => geo_types::Geometry::MultiPolygon(
                geo_types::MultiPolygon(mp.polygons().iter().map(to_geo_polygon).collect()),
            ),
            Geometry::GeometryCollection(gc) => {
                geo_types::Geometry::GeometryCollection(geo_types::GeometryCollection(
                    gc.geometries()
                        .iter()
                        .map(geo_types::Geometry::try_from)
                        .collect::<Result<_>>()?,
                ))
            }
        })
    }
}

impl TryFrom<&GPKGGeometry> for geo_types::Geometry<f64> {
    type Error = Error;

    fn try_from(g: &GPKGGeometry) -> Result<Self> {
        match g {
            GPKGGeometry::XY(g) => g.try_into(),
            other => Err(Error::ValidationError(format!(
                "{} {:?} has no geo-types equivalent",
                other.geometry_type_name(),
                other.dimension()
            ))),
        }
    }
}

impl TryFrom<GPKGGeometry> for geo_types::Geometry<f64> {
    type Error = Error;

    fn try_from(g: GPKGGeometry) -> Result<Self> {
        geo_types::Geometry::try_from(&g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::{decode, encode};
    use crate::coord::CoordinateZ;
    use geo_types::{coord, line_string, point, polygon};

    #[test]
    fn point_both_ways() {
        let p = point! { x: -105.0, y: 40.0 };
        let g: GPKGGeometry = geo_types::Geometry::Point(p).try_into().unwrap();
        assert_eq!(g, GPKGGeometry::from(Point::new(Coordinate::new(-105.0, 40.0))));
        let back: geo_types::Geometry<f64> = g.try_into().unwrap();
        assert_eq!(back, geo_types::Geometry::Point(p));
    }

    #[test]
    fn polygon_through_a_blob() {
        let poly = polygon![
            exterior: [
                (x: 0.0, y: 0.0),
                (x: 10.0, y: 0.0),
                (x: 10.0, y: 10.0),
                (x: 0.0, y: 0.0),
            ],
            interiors: [
                [
                    (x: 1.0, y: 1.0),
                    (x: 2.0, y: 1.0),
                    (x: 2.0, y: 2.0),
                    (x: 1.0, y: 1.0),
                ],
            ],
        ];
        let g = GPKGGeometry::try_from(geo_types::Geometry::Polygon(poly.clone())).unwrap();
        let bytes = encode(&g, 4326).unwrap();
        let blob = decode(&bytes).unwrap();
        assert_eq!(blob.envelope().to_array(), vec![0.0, 10.0, 0.0, 10.0]);
        let back = geo_types::Geometry::try_from(&blob.geometry).unwrap();
        assert_eq!(back, geo_types::Geometry::Polygon(poly));
    }

    #[test]
    fn collection_and_line() {
        let ls = line_string![(x: 1.0, y: 2.0), (x: 3.0, y: 4.0)];
        let gc = geo_types::GeometryCollection(vec![
            geo_types::Geometry::Line(geo_types::Line::new(
                coord! { x: 1.0, y: 2.0 },
                coord! { x: 3.0, y: 4.0 },
            )),
            geo_types::Geometry::MultiPoint(geo_types::MultiPoint(vec![
                point! { x: 5.0, y: 6.0 },
            ])),
        ]);
        let g = GPKGGeometry::try_from(geo_types::Geometry::GeometryCollection(gc)).unwrap();
        assert_eq!(g.type_code(), 7);

        let back = geo_types::Geometry::try_from(g).unwrap();
        let expected = geo_types::GeometryCollection(vec![
            geo_types::Geometry::LineString(ls),
            geo_types::Geometry::MultiPoint(geo_types::MultiPoint(vec![
                point! { x: 5.0, y: 6.0 },
            ])),
        ]);
        assert_eq!(back, geo_types::Geometry::GeometryCollection(expected));
    }

    #[test]
    fn rect_becomes_polygon() {
        let rect = geo_types::Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 2.0, y: 1.0 });
        let g = GPKGGeometry::try_from(geo_types::Geometry::Rect(rect)).unwrap();
        assert_eq!(g.type_code(), 3);
        assert_eq!(g.create_envelope().to_array(), vec![0.0, 2.0, 0.0, 1.0]);
    }

    #[test]
    fn nan_inside_line_string() {
        let ls = line_string![(x: 1.0, y: 2.0), (x: f64::NAN, y: f64::NAN)];
        assert!(matches!(
            LineString::<Coordinate>::try_from(ls),
            Err(Error::ValidationError(_))
        ));
    }

    #[test]
    fn z_has_no_equivalent() {
        let g: GPKGGeometry = Point::new(CoordinateZ::new(1.0, 2.0, 3.0)).into();
        assert!(matches!(
            geo_types::Geometry::try_from(&g),
            Err(Error::ValidationError(_))
        ));
    }
}
