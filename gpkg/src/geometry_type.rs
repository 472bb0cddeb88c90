//! Geometry type codes and the dimensionality offsets applied to them.
//!
//! A WKB type code is `dimension base + geometry type code`, so a Point is
//! `1`, a Point Z is `1001`, a Point M is `2001` and a Point ZM is `3001`.
use std::fmt;
use std::str::FromStr;

use crate::result::{Error, Result};

/// The shape of a geometry, without regard to which axes it carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryType {
    /// The abstract base type, never instantiated
    Geometry,
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryType {
    /// Every type, in code order
    pub const ALL: [GeometryType; 8] = [
        GeometryType::Geometry,
        GeometryType::Point,
        GeometryType::LineString,
        GeometryType::Polygon,
        GeometryType::MultiPoint,
        GeometryType::MultiLineString,
        GeometryType::MultiPolygon,
        GeometryType::GeometryCollection,
    ];

    pub fn code(&self) -> u8 {
        match self {
            GeometryType::Geometry => 0,
            GeometryType::Point => 1,
            GeometryType::LineString => 2,
            GeometryType::Polygon => 3,
            GeometryType::MultiPoint => 4,
            GeometryType::MultiLineString => 5,
            GeometryType::MultiPolygon => 6,
            GeometryType::GeometryCollection => 7,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GeometryType::Geometry => "GEOMETRY",
            GeometryType::Point => "POINT",
            GeometryType::LineString => "LINESTRING",
            GeometryType::Polygon => "POLYGON",
            GeometryType::MultiPoint => "MULTIPOINT",
            GeometryType::MultiLineString => "MULTILINESTRING",
            GeometryType::MultiPolygon => "MULTIPOLYGON",
            GeometryType::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }

    /// Reverse lookup of [GeometryType::code]
    pub fn from_code(code: u8) -> Result<Self> {
        GeometryType::ALL
            .iter()
            .find(|t| t.code() == code)
            .copied()
            .ok_or(Error::UnsupportedGeometryType(code as u32))
    }

    /// The abstract base type cannot be constructed or decoded
    pub fn is_abstract(&self) -> bool {
        matches!(self, GeometryType::Geometry)
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GeometryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.to_ascii_uppercase();
        GeometryType::ALL
            .iter()
            .find(|t| t.name() == upper)
            .copied()
            .ok_or_else(|| Error::ValidationError(format!("unknown geometry type name '{s}'")))
    }
}

/// Which coordinate axes a geometry carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    XY,
    XYZ,
    XYM,
    XYZM,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::XY,
        Dimension::XYZ,
        Dimension::XYM,
        Dimension::XYZM,
    ];

    /// The offset added to a [GeometryType] code
    pub fn base(&self) -> u32 {
        match self {
            Dimension::XY => 0,
            Dimension::XYZ => 1000,
            Dimension::XYM => 2000,
            Dimension::XYZM => 3000,
        }
    }

    pub fn has_z(&self) -> bool {
        matches!(self, Dimension::XYZ | Dimension::XYZM)
    }

    pub fn has_m(&self) -> bool {
        matches!(self, Dimension::XYM | Dimension::XYZM)
    }

    /// Number of doubles in one coordinate tuple
    pub fn size(&self) -> usize {
        2 + self.has_z() as usize + self.has_m() as usize
    }

    pub fn from_flags(has_z: bool, has_m: bool) -> Self {
        match (has_z, has_m) {
            (false, false) => Dimension::XY,
            (true, false) => Dimension::XYZ,
            (false, true) => Dimension::XYM,
            (true, true) => Dimension::XYZM,
        }
    }

    /// The dimension encoded in the thousands of a WKB type code
    pub fn from_type_code(code: u32) -> Result<Self> {
        match code / 1000 {
            0 => Ok(Dimension::XY),
            1 => Ok(Dimension::XYZ),
            2 => Ok(Dimension::XYM),
            3 => Ok(Dimension::XYZM),
            _ => Err(Error::UnsupportedGeometryType(code)),
        }
    }

    /// The smallest dimension carrying every axis of both
    pub fn union(self, other: Dimension) -> Dimension {
        Dimension::from_flags(
            self.has_z() || other.has_z(),
            self.has_m() || other.has_m(),
        )
    }

    /// Full WKB type code of `geometry_type` in this dimension
    pub fn type_code(&self, geometry_type: GeometryType) -> u32 {
        self.base() + geometry_type.code() as u32
    }
}

/// Split a WKB type code into its shape and dimension
pub fn split_type_code(code: u32) -> Result<(GeometryType, Dimension)> {
    let dimension = Dimension::from_type_code(code)?;
    let remainder = code - dimension.base();
    let geometry_type = u8::try_from(remainder)
        .map_err(|_| Error::UnsupportedGeometryType(code))
        .and_then(GeometryType::from_code)
        .map_err(|_| Error::UnsupportedGeometryType(code))?;
    Ok((geometry_type, dimension))
}

/// Human readable name of a type code, e.g. `POINT Z` for `1001`
pub fn type_code_name(code: u32) -> Result<String> {
    let (geometry_type, dimension) = split_type_code(code)?;
    let suffix = match dimension {
        Dimension::XY => "",
        Dimension::XYZ => " Z",
        Dimension::XYM => " M",
        Dimension::XYZM => " ZM",
    };
    Ok(format!("{}{}", geometry_type.name(), suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for t in GeometryType::ALL {
            assert_eq!(GeometryType::from_code(t.code()).unwrap(), t);
            assert_eq!(t.name().parse::<GeometryType>().unwrap(), t);
        }
        assert!(matches!(
            GeometryType::from_code(8),
            Err(Error::UnsupportedGeometryType(8))
        ));
        assert_eq!(
            "multiPolygon".parse::<GeometryType>().unwrap(),
            GeometryType::MultiPolygon
        );
        assert!("circle".parse::<GeometryType>().is_err());
    }

    #[test]
    fn dimensionality_arithmetic() {
        assert_eq!(Dimension::XY.type_code(GeometryType::Point), 1);
        assert_eq!(Dimension::XYZ.type_code(GeometryType::Point), 1001);
        assert_eq!(Dimension::XYM.type_code(GeometryType::Point), 2001);
        assert_eq!(Dimension::XYZM.type_code(GeometryType::Point), 3001);
        assert_eq!(
            Dimension::XYZM.type_code(GeometryType::GeometryCollection),
            3007
        );
    }

    #[test]
    fn split() {
        assert_eq!(
            split_type_code(2003).unwrap(),
            (GeometryType::Polygon, Dimension::XYM)
        );
        assert_eq!(
            split_type_code(0).unwrap(),
            (GeometryType::Geometry, Dimension::XY)
        );
        assert!(split_type_code(1008).is_err());
        assert!(split_type_code(4001).is_err());
        assert_eq!(type_code_name(1002).unwrap(), "LINESTRING Z");
        assert_eq!(type_code_name(3004).unwrap(), "MULTIPOINT ZM");
    }

    #[test]
    fn dimension_union() {
        assert_eq!(Dimension::XYZ.union(Dimension::XYM), Dimension::XYZM);
        assert_eq!(Dimension::XY.union(Dimension::XY), Dimension::XY);
        assert_eq!(Dimension::XYM.size(), 3);
        assert_eq!(Dimension::XYZM.size(), 4);
    }
}
