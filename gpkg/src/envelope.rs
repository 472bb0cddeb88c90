//! Axis aligned bounding boxes in the four GeoPackage flavors.
//!
//! Emptiness is carried by the bounds themselves: an envelope is empty when
//! every bound is NaN. Unions use a NaN aware min/max so that an empty
//! envelope combined with a populated one yields the populated bounds.
use crate::geometry_type::Dimension;
use crate::result::{Error, Result};

/// Describes which axes the envelope in a geometry header carries
///
/// <https://www.geopackage.org/spec130/#flags_layout>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentsIndicator {
    NoEnvelope,
    XY,
    XYZ,
    XYM,
    XYZM,
}

impl ContentsIndicator {
    /// The 3 bit code stored in the header flags
    pub fn code(&self) -> u8 {
        match self {
            ContentsIndicator::NoEnvelope => 0,
            ContentsIndicator::XY => 1,
            ContentsIndicator::XYZ => 2,
            ContentsIndicator::XYM => 3,
            ContentsIndicator::XYZM => 4,
        }
    }

    /// Codes 5 through 7 are reserved and rejected
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(ContentsIndicator::NoEnvelope),
            1 => Ok(ContentsIndicator::XY),
            2 => Ok(ContentsIndicator::XYZ),
            3 => Ok(ContentsIndicator::XYM),
            4 => Ok(ContentsIndicator::XYZM),
            _ => Err(Error::FormatError(format!(
                "invalid envelope contents indicator {code}"
            ))),
        }
    }

    pub fn for_dimension(dimension: Dimension) -> Self {
        match dimension {
            Dimension::XY => ContentsIndicator::XY,
            Dimension::XYZ => ContentsIndicator::XYZ,
            Dimension::XYM => ContentsIndicator::XYM,
            Dimension::XYZM => ContentsIndicator::XYZM,
        }
    }

    pub fn dimension(&self) -> Option<Dimension> {
        match self {
            ContentsIndicator::NoEnvelope => None,
            ContentsIndicator::XY => Some(Dimension::XY),
            ContentsIndicator::XYZ => Some(Dimension::XYZ),
            ContentsIndicator::XYM => Some(Dimension::XYM),
            ContentsIndicator::XYZM => Some(Dimension::XYZM),
        }
    }

    /// Number of doubles the envelope occupies in the header
    pub fn value_count(&self) -> usize {
        self.dimension().map(|d| d.size() * 2).unwrap_or(0)
    }

    /// Number of bytes the envelope occupies in the header
    pub fn byte_len(&self) -> usize {
        self.value_count() * 8
    }
}

// if exactly one side is NaN the other wins, both NaN stays NaN
fn nan_min(a: f64, b: f64) -> f64 {
    match (a.is_nan(), b.is_nan()) {
        (true, _) => b,
        (_, true) => a,
        _ => a.min(b),
    }
}

fn nan_max(a: f64, b: f64) -> f64 {
    match (a.is_nan(), b.is_nan()) {
        (true, _) => b,
        (_, true) => a,
        _ => a.max(b),
    }
}

fn same_bound(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

// generates one envelope flavor, the variant name is shared by Dimension and Envelope
// and the axis pairs are listed in header order
macro_rules! envelope_flavor {
    ($(#[$doc:meta])* $name:ident => $variant:ident, [$(($min:ident, $max:ident)),+]) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name {
            $(
                pub $min: f64,
                pub $max: f64,
            )+
        }

        impl $name {
            pub const DIMENSION: Dimension = Dimension::$variant;

            /// An envelope with every bound set to NaN
            pub fn empty() -> Self {
                Self {
                    $(
                        $min: f64::NAN,
                        $max: f64::NAN,
                    )+
                }
            }

            /// Build from bounds in header order, `min_x, max_x, min_y, max_y, ...`
            pub fn from_array(values: &[f64]) -> Result<Self> {
                let expected = Self::DIMENSION.size() * 2;
                if values.len() != expected {
                    return Err(Error::FormatError(format!(
                        "expected {expected} envelope values, found {}",
                        values.len()
                    )));
                }
                let mut iter = values.iter().copied();
                Ok(Self {
                    $(
                        $min: iter.next().unwrap_or(f64::NAN),
                        $max: iter.next().unwrap_or(f64::NAN),
                    )+
                })
            }

            /// Bounds in header order, or nothing at all when empty
            pub fn to_array(&self) -> Vec<f64> {
                if self.is_empty() {
                    return Vec::new();
                }
                self.bounds()
            }

            /// Every bound in header order, NaN included
            pub fn bounds(&self) -> Vec<f64> {
                vec![$(self.$min, self.$max),+]
            }

            pub fn is_empty(&self) -> bool {
                true $(&& self.$min.is_nan() && self.$max.is_nan())+
            }

            pub fn contents_indicator(&self) -> ContentsIndicator {
                if self.is_empty() {
                    ContentsIndicator::NoEnvelope
                } else {
                    ContentsIndicator::$variant
                }
            }

            /// Per axis union of two envelopes
            pub fn combine(&self, other: &Self) -> Self {
                Self {
                    $(
                        $min: nan_min(self.$min, other.$min),
                        $max: nan_max(self.$max, other.$max),
                    )+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::empty()
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                true $(&& same_bound(self.$min, other.$min) && same_bound(self.$max, other.$max))+
            }
        }

        impl From<$name> for Envelope {
            fn from(value: $name) -> Self {
                Envelope::$variant(value)
            }
        }
    };
}

envelope_flavor!(
    /// Bounds over x and y
    EnvelopeXY => XY, [(min_x, max_x), (min_y, max_y)]
);
envelope_flavor!(
    /// Bounds over x, y and z
    EnvelopeXYZ => XYZ, [(min_x, max_x), (min_y, max_y), (min_z, max_z)]
);
envelope_flavor!(
    /// Bounds over x, y and m
    EnvelopeXYM => XYM, [(min_x, max_x), (min_y, max_y), (min_m, max_m)]
);
envelope_flavor!(
    /// Bounds over x, y, z and m
    EnvelopeXYZM => XYZM, [(min_x, max_x), (min_y, max_y), (min_z, max_z), (min_m, max_m)]
);

// (min, max) for x, y, z, m with NaN standing in for an absent axis
type Axes = [(f64, f64); 4];

const NAN_AXIS: (f64, f64) = (f64::NAN, f64::NAN);

/// Any of the four envelope flavors
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Envelope {
    XY(EnvelopeXY),
    XYZ(EnvelopeXYZ),
    XYM(EnvelopeXYM),
    XYZM(EnvelopeXYZM),
}

impl Envelope {
    pub fn empty(dimension: Dimension) -> Self {
        match dimension {
            Dimension::XY => Envelope::XY(EnvelopeXY::empty()),
            Dimension::XYZ => Envelope::XYZ(EnvelopeXYZ::empty()),
            Dimension::XYM => Envelope::XYM(EnvelopeXYM::empty()),
            Dimension::XYZM => Envelope::XYZM(EnvelopeXYZM::empty()),
        }
    }

    pub fn from_array(dimension: Dimension, values: &[f64]) -> Result<Self> {
        Ok(match dimension {
            Dimension::XY => EnvelopeXY::from_array(values)?.into(),
            Dimension::XYZ => EnvelopeXYZ::from_array(values)?.into(),
            Dimension::XYM => EnvelopeXYM::from_array(values)?.into(),
            Dimension::XYZM => EnvelopeXYZM::from_array(values)?.into(),
        })
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            Envelope::XY(_) => Dimension::XY,
            Envelope::XYZ(_) => Dimension::XYZ,
            Envelope::XYM(_) => Dimension::XYM,
            Envelope::XYZM(_) => Dimension::XYZM,
        }
    }

    pub fn to_array(&self) -> Vec<f64> {
        match self {
            Envelope::XY(e) => e.to_array(),
            Envelope::XYZ(e) => e.to_array(),
            Envelope::XYM(e) => e.to_array(),
            Envelope::XYZM(e) => e.to_array(),
        }
    }

    pub fn bounds(&self) -> Vec<f64> {
        match self {
            Envelope::XY(e) => e.bounds(),
            Envelope::XYZ(e) => e.bounds(),
            Envelope::XYM(e) => e.bounds(),
            Envelope::XYZM(e) => e.bounds(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Envelope::XY(e) => e.is_empty(),
            Envelope::XYZ(e) => e.is_empty(),
            Envelope::XYM(e) => e.is_empty(),
            Envelope::XYZM(e) => e.is_empty(),
        }
    }

    pub fn contents_indicator(&self) -> ContentsIndicator {
        match self {
            Envelope::XY(e) => e.contents_indicator(),
            Envelope::XYZ(e) => e.contents_indicator(),
            Envelope::XYM(e) => e.contents_indicator(),
            Envelope::XYZM(e) => e.contents_indicator(),
        }
    }

    fn axes(&self) -> Axes {
        match *self {
            Envelope::XY(e) => [(e.min_x, e.max_x), (e.min_y, e.max_y), NAN_AXIS, NAN_AXIS],
            Envelope::XYZ(e) => [
                (e.min_x, e.max_x),
                (e.min_y, e.max_y),
                (e.min_z, e.max_z),
                NAN_AXIS,
            ],
            Envelope::XYM(e) => [
                (e.min_x, e.max_x),
                (e.min_y, e.max_y),
                NAN_AXIS,
                (e.min_m, e.max_m),
            ],
            Envelope::XYZM(e) => [
                (e.min_x, e.max_x),
                (e.min_y, e.max_y),
                (e.min_z, e.max_z),
                (e.min_m, e.max_m),
            ],
        }
    }

    fn from_axes(dimension: Dimension, axes: Axes) -> Self {
        let [x, y, z, m] = axes;
        match dimension {
            Dimension::XY => Envelope::XY(EnvelopeXY {
                min_x: x.0,
                max_x: x.1,
                min_y: y.0,
                max_y: y.1,
            }),
            Dimension::XYZ => Envelope::XYZ(EnvelopeXYZ {
                min_x: x.0,
                max_x: x.1,
                min_y: y.0,
                max_y: y.1,
                min_z: z.0,
                max_z: z.1,
            }),
            Dimension::XYM => Envelope::XYM(EnvelopeXYM {
                min_x: x.0,
                max_x: x.1,
                min_y: y.0,
                max_y: y.1,
                min_m: m.0,
                max_m: m.1,
            }),
            Dimension::XYZM => Envelope::XYZM(EnvelopeXYZM {
                min_x: x.0,
                max_x: x.1,
                min_y: y.0,
                max_y: y.1,
                min_z: z.0,
                max_z: z.1,
                min_m: m.0,
                max_m: m.1,
            }),
        }
    }

    /// Per axis union. Mixing flavors yields the flavor carrying every axis of both.
    pub fn combine(&self, other: &Envelope) -> Envelope {
        let dimension = self.dimension().union(other.dimension());
        let (a, b) = (self.axes(), other.axes());
        let mut axes = [NAN_AXIS; 4];
        for i in 0..4 {
            axes[i] = (nan_min(a[i].0, b[i].0), nan_max(a[i].1, b[i].1));
        }
        Envelope::from_axes(dimension, axes)
    }

    /// Reshape to `dimension`, dropping axes it lacks and leaving new ones NaN
    pub fn to_dimension(&self, dimension: Dimension) -> Envelope {
        let mut axes = self.axes();
        if !dimension.has_z() {
            axes[2] = NAN_AXIS;
        }
        if !dimension.has_m() {
            axes[3] = NAN_AXIS;
        }
        Envelope::from_axes(dimension, axes)
    }

    /// Grow to cover a single position; NaN ordinates leave their axis untouched
    pub fn expand_to_include(&mut self, x: f64, y: f64, z: Option<f64>, m: Option<f64>) {
        let point = [
            (x, x),
            (y, y),
            z.map(|z| (z, z)).unwrap_or(NAN_AXIS),
            m.map(|m| (m, m)).unwrap_or(NAN_AXIS),
        ];
        let dimension = self.dimension();
        *self = self.combine(&Envelope::from_axes(dimension, point));
    }

    pub fn min_x(&self) -> f64 {
        self.axes()[0].0
    }

    pub fn max_x(&self) -> f64 {
        self.axes()[0].1
    }

    pub fn min_y(&self) -> f64 {
        self.axes()[1].0
    }

    pub fn max_y(&self) -> f64 {
        self.axes()[1].1
    }

    /// `None` when this flavor has no z axis
    pub fn z_range(&self) -> Option<(f64, f64)> {
        self.dimension().has_z().then(|| self.axes()[2])
    }

    /// `None` when this flavor has no m axis
    pub fn m_range(&self) -> Option<(f64, f64)> {
        self.dimension().has_m().then(|| self.axes()[3])
    }
}
