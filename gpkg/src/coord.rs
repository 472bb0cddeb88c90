//! Immutable coordinate tuples, one type per dimensionality.
//!
//! A coordinate with every ordinate set to NaN is the empty coordinate, which
//! is how WKB spells an empty point.
use std::fmt::Debug;
use std::io::{Read, Write};

use byteorder::{ByteOrder, ReadBytesExt, WriteBytesExt};

use crate::envelope::Envelope;
use crate::geometry_type::Dimension;
use crate::result::Result;
use crate::types::{GPKGGeometry, Geometry};

/// Behaviour shared by the four coordinate tuples
///
/// Geometries are generic over this trait, so a `LineString<CoordinateZ>` is
/// a LineString Z and encodes with type code 1002.
pub trait Coord: Copy + Debug + PartialEq + Send + Sync + 'static {
    const DIMENSION: Dimension;

    fn x(&self) -> f64;
    fn y(&self) -> f64;
    fn z(&self) -> Option<f64>;
    fn m(&self) -> Option<f64>;

    /// The coordinate with every ordinate NaN
    fn empty() -> Self;

    fn is_empty(&self) -> bool;

    fn read_from_bytes<T: ByteOrder, R: Read + ?Sized>(r: &mut R) -> Result<Self>;

    fn write_as_bytes<T: ByteOrder, W: Write + ?Sized>(&self, w: &mut W) -> Result<()>;

    /// Build from all four ordinates, keeping only the axes this type has
    ///
    /// An axis this type has but the caller lacks becomes NaN.
    fn from_ordinates(x: f64, y: f64, z: Option<f64>, m: Option<f64>) -> Self;

    /// The same position in this dimensionality
    fn reshape<D: Coord>(other: D) -> Self {
        Self::from_ordinates(other.x(), other.y(), other.z(), other.m())
    }

    fn expand_envelope(&self, envelope: &mut Envelope) {
        envelope.expand_to_include(self.x(), self.y(), self.z(), self.m());
    }

    /// Lift a typed geometry into the dimension erased [GPKGGeometry]
    fn into_any(geometry: Geometry<Self>) -> GPKGGeometry;

    /// The typed geometry inside `geometry` when it has this dimensionality
    fn from_any(geometry: &GPKGGeometry) -> Option<&Geometry<Self>>;
}

// bitwise so that NaN ordinates of empty coordinates compare equal
fn same_ordinate(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
}

macro_rules! optional_axis {
    ($self:ident, none) => {
        None
    };
    ($self:ident, $field:ident) => {
        Some($self.$field)
    };
}

macro_rules! ordinate {
    (x, $x:ident, $y:ident, $z:ident, $m:ident) => {
        $x
    };
    (y, $x:ident, $y:ident, $z:ident, $m:ident) => {
        $y
    };
    (z, $x:ident, $y:ident, $z:ident, $m:ident) => {
        $z.unwrap_or(f64::NAN)
    };
    (m, $x:ident, $y:ident, $z:ident, $m:ident) => {
        $m.unwrap_or(f64::NAN)
    };
}

macro_rules! coordinate {
    ($(#[$doc:meta])* $name:ident => $variant:ident, [$($field:ident),+], z: $z:ident, m: $m:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name {
            $(pub $field: f64,)+
        }

        impl $name {
            pub fn new($($field: f64),+) -> Self {
                Self { $($field),+ }
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                true $(&& same_ordinate(self.$field, other.$field))+
            }
        }

        impl Coord for $name {
            const DIMENSION: Dimension = Dimension::$variant;

            fn x(&self) -> f64 {
                self.x
            }

            fn y(&self) -> f64 {
                self.y
            }

            fn z(&self) -> Option<f64> {
                optional_axis!(self, $z)
            }

            fn m(&self) -> Option<f64> {
                optional_axis!(self, $m)
            }

            fn empty() -> Self {
                Self { $($field: f64::NAN),+ }
            }

            fn is_empty(&self) -> bool {
                true $(&& self.$field.is_nan())+
            }

            #[allow(unused_variables)]
            fn from_ordinates(x: f64, y: f64, z: Option<f64>, m: Option<f64>) -> Self {
                Self { $($field: ordinate!($field, x, y, z, m)),+ }
            }

            fn read_from_bytes<T: ByteOrder, R: Read + ?Sized>(r: &mut R) -> Result<Self> {
                $(let $field = r.read_f64::<T>()?;)+
                Ok(Self { $($field),+ })
            }

            fn write_as_bytes<T: ByteOrder, W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
                $(w.write_f64::<T>(self.$field)?;)+
                Ok(())
            }

            fn into_any(geometry: Geometry<Self>) -> GPKGGeometry {
                GPKGGeometry::$variant(geometry)
            }

            fn from_any(geometry: &GPKGGeometry) -> Option<&Geometry<Self>> {
                match geometry {
                    GPKGGeometry::$variant(g) => Some(g),
                    _ => None,
                }
            }
        }
    };
}

coordinate!(
    /// An x, y position
    Coordinate => XY, [x, y], z: none, m: none
);
coordinate!(
    /// An x, y position with elevation
    CoordinateZ => XYZ, [x, y, z], z: z, m: none
);
coordinate!(
    /// An x, y position with a measure
    CoordinateM => XYM, [x, y, m], z: none, m: m
);
coordinate!(
    /// An x, y position with elevation and a measure
    CoordinateZM => XYZM, [x, y, z, m], z: z, m: m
);

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Coordinate { x, y }
    }
}

impl From<(f64, f64, f64)> for CoordinateZ {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        CoordinateZ { x, y, z }
    }
}

impl From<(f64, f64, f64)> for CoordinateM {
    fn from((x, y, m): (f64, f64, f64)) -> Self {
        CoordinateM { x, y, m }
    }
}

impl From<(f64, f64, f64, f64)> for CoordinateZM {
    fn from((x, y, z, m): (f64, f64, f64, f64)) -> Self {
        CoordinateZM { x, y, z, m }
    }
}
