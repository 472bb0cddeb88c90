//! Encoding and decoding of GeoPackage geometry blobs.
//!
//! A geometry column in a GeoPackage stores a small binary header (magic,
//! flags, SRS id and an optional envelope) followed by the geometry as
//! Well-Known Binary. This crate reads and writes that format for the seven
//! standard geometry types in all four dimensionalities (XY, XYZ, XYM and
//! XYZM), and lets callers register decoders for extension types.
//!
//! ```
//! use gpkg_geom::prelude::*;
//!
//! let registry = GeometryFactoryRegistry::with_config(&RegistryConfig::all_dimensions());
//! let line: GPKGGeometry = LineString::try_new(vec![
//!     CoordinateZ::new(40.0, -105.0, 5280.0),
//!     CoordinateZ::new(41.0, -106.0, 5280.0),
//! ])
//! .unwrap()
//! .into();
//!
//! let bytes = encode(&line, 4326).unwrap();
//! let blob = decode_with(&registry, &bytes).unwrap();
//! assert_eq!(blob.geometry, line);
//! assert_eq!(blob.envelope().z_range(), Some((5280.0, 5280.0)));
//! ```
pub mod blob;
pub mod conversions;
pub mod coord;
pub mod envelope;
pub mod geometry_type;
pub mod gpkg_wkb;
pub mod header;
pub mod registry;
pub mod result;
mod sql;
pub mod types;

pub use crate::result::{Error, Result};

/// The types most callers need
pub mod prelude {
    pub use crate::blob::{
        decode, decode_with, encode, encode_with, EnvelopePolicy, GeometryBlob, WriterOptions,
    };
    pub use crate::coord::{Coord, Coordinate, CoordinateM, CoordinateZ, CoordinateZM};
    pub use crate::envelope::{ContentsIndicator, Envelope};
    pub use crate::geometry_type::{Dimension, GeometryType};
    pub use crate::gpkg_wkb::{FullWKB, WkbByteOrder, WkbReader};
    pub use crate::registry::{default_registry, GeometryFactoryRegistry, RegistryConfig};
    pub use crate::result::{Error, Result};
    pub use crate::types::*;
}
