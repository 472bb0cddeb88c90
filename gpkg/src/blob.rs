//! Whole geometry blobs: header followed by WKB.
//!
//! ```
//! use gpkg_geom::blob::{decode, encode};
//! use gpkg_geom::coord::Coordinate;
//! use gpkg_geom::types::{GPKGGeometry, Point};
//!
//! let point: GPKGGeometry = Point::new(Coordinate::new(-105.0, 40.0)).into();
//! let bytes = encode(&point, 4326).unwrap();
//! let blob = decode(&bytes).unwrap();
//! assert_eq!(blob.srs_id(), 4326);
//! assert_eq!(blob.geometry, point);
//! ```
use std::io::Write;

use crate::envelope::Envelope;
use crate::gpkg_wkb::WkbByteOrder;
use crate::header::GeometryHeader;
use crate::registry::{default_registry, GeometryFactoryRegistry};
use crate::result::Result;
use crate::types::GPKGGeometry;

/// Whether the writer stores an envelope in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopePolicy {
    /// The exact envelope of the geometry, in its own dimensionality
    #[default]
    Exact,
    /// Never write one
    Omit,
}

/// Choices the encoder makes on the caller's behalf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriterOptions {
    /// Used for the header and every nested geometry
    pub byte_order: WkbByteOrder,
    pub envelope: EnvelopePolicy,
}

impl WriterOptions {
    pub fn with_byte_order(mut self, byte_order: WkbByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn with_envelope(mut self, envelope: EnvelopePolicy) -> Self {
        self.envelope = envelope;
        self
    }

    fn header_for(&self, geometry: &GPKGGeometry, srs_id: i32) -> GeometryHeader {
        let envelope = match self.envelope {
            EnvelopePolicy::Exact => geometry.create_envelope(),
            EnvelopePolicy::Omit => Envelope::empty(geometry.dimension()),
        };
        GeometryHeader::new(
            srs_id,
            self.byte_order,
            envelope,
            geometry.is_empty(),
            geometry.is_extension(),
        )
    }
}

/// A decoded geometry blob, or one ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryBlob {
    pub header: GeometryHeader,
    pub geometry: GPKGGeometry,
}

impl GeometryBlob {
    pub fn new(geometry: GPKGGeometry, srs_id: i32) -> Self {
        Self::with_options(geometry, srs_id, &WriterOptions::default())
    }

    pub fn with_options(geometry: GPKGGeometry, srs_id: i32, options: &WriterOptions) -> Self {
        GeometryBlob {
            header: options.header_for(&geometry, srs_id),
            geometry,
        }
    }

    pub fn srs_id(&self) -> i32 {
        self.header.srs_id
    }

    pub fn envelope(&self) -> &Envelope {
        &self.header.envelope
    }

    pub fn into_geometry(self) -> GPKGGeometry {
        self.geometry
    }

    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        self.header.write(w)?;
        self.geometry.write_wkb(w, self.header.byte_order())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.header.len());
        self.write(&mut buf)?;
        Ok(buf)
    }

    /// Decode with the [default_registry]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode_with(default_registry(), bytes)
    }
}

/// Encode `geometry` with [WriterOptions::default]
pub fn encode(geometry: &GPKGGeometry, srs_id: i32) -> Result<Vec<u8>> {
    encode_with(geometry, srs_id, &WriterOptions::default())
}

pub fn encode_with(geometry: &GPKGGeometry, srs_id: i32, options: &WriterOptions) -> Result<Vec<u8>> {
    let header = options.header_for(geometry, srs_id);
    let mut buf = Vec::with_capacity(header.len());
    header.write(&mut buf)?;
    geometry.write_wkb(&mut buf, options.byte_order)?;
    Ok(buf)
}

/// Decode with the [default_registry], which only knows the XY types
pub fn decode(bytes: &[u8]) -> Result<GeometryBlob> {
    decode_with(default_registry(), bytes)
}

/// Decode a blob, dispatching the WKB through `registry`
///
/// When the header carries no envelope the blob reports an empty one in the
/// geometry's dimensionality. Bytes after the geometry are ignored.
pub fn decode_with(registry: &GeometryFactoryRegistry, bytes: &[u8]) -> Result<GeometryBlob> {
    read_blob(registry, bytes).map_err(|e| {
        log::debug!("rejected geometry blob of {} bytes: {}", bytes.len(), e);
        e
    })
}

fn read_blob(registry: &GeometryFactoryRegistry, bytes: &[u8]) -> Result<GeometryBlob> {
    let mut header = GeometryHeader::read(bytes)?;
    let geometry = registry.decode(&bytes[header.len()..])?;
    if header.envelope.is_empty() && header.envelope.dimension() != geometry.dimension() {
        header.envelope = Envelope::empty(geometry.dimension());
    }
    Ok(GeometryBlob { header, geometry })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{Coord, Coordinate, CoordinateM, CoordinateZ, CoordinateZM};
    use crate::envelope::ContentsIndicator;
    use crate::geometry_type::Dimension;
    use crate::registry::RegistryConfig;
    use crate::result::Error;
    use crate::types::*;
    use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

    fn line<C: Coord>(make: &impl Fn(f64) -> C, start: f64, n: usize) -> LineString<C> {
        LineString::try_new((0..n).map(|i| make(start + i as f64)).collect()).unwrap()
    }

    fn ring<C: Coord>(make: &impl Fn(f64) -> C, start: f64) -> LineString<C> {
        let mut coords: Vec<C> = (0..3).map(|i| make(start + i as f64)).collect();
        coords.push(coords[0]);
        LineString::try_new(coords).unwrap()
    }

    // one empty and one populated instance of every shape
    fn samples<C: Coord>(make: impl Fn(f64) -> C) -> Vec<GPKGGeometry> {
        let polygon = Polygon::new(ring(&make, 0.0), vec![ring(&make, 0.25)]);
        vec![
            Point::new(make(1.5)).into(),
            Point::<C>::empty().into(),
            line(&make, 0.0, 4).into(),
            LineString::<C>::empty().into(),
            polygon.clone().into(),
            Polygon::<C>::empty().into(),
            MultiPoint::new(vec![Point::new(make(1.0)), Point::new(make(-2.0))]).into(),
            MultiPoint::<C>::new(vec![]).into(),
            MultiLineString::new(vec![line(&make, 3.0, 2), line(&make, -8.0, 3)]).into(),
            MultiLineString::<C>::new(vec![]).into(),
            MultiPolygon::new(vec![polygon.clone(), Polygon::new(ring(&make, 10.0), vec![])]).into(),
            MultiPolygon::<C>::new(vec![]).into(),
            GeometryCollection::<C>::new(vec![
                Point::new(make(7.0)).into(),
                polygon.into(),
                GeometryCollection::<C>::new(vec![line(&make, 20.0, 2).into()]).into(),
            ])
            .into(),
            GeometryCollection::<C>::new(vec![]).into(),
        ]
    }

    fn all_samples() -> Vec<GPKGGeometry> {
        let mut all = samples(|v| Coordinate::new(v, v * 2.0));
        all.extend(samples(|v| CoordinateZ::new(v, -v, v + 100.0)));
        all.extend(samples(|v| CoordinateM::new(v, v / 2.0, v * 10.0)));
        all.extend(samples(|v| CoordinateZM::new(v, v, -v, v + 0.5)));
        all
    }

    #[test]
    fn round_trip_every_type_and_dimension() {
        let registry = GeometryFactoryRegistry::with_config(&RegistryConfig::all_dimensions());
        let samples = all_samples();
        assert_eq!(samples.len(), 56);

        for order in [WkbByteOrder::LittleEndian, WkbByteOrder::BigEndian] {
            let options = WriterOptions::default().with_byte_order(order);
            for geometry in &samples {
                let bytes = encode_with(geometry, 4326, &options).unwrap();
                let blob = decode_with(&registry, &bytes).unwrap();
                assert_eq!(&blob.geometry, geometry);
                assert_eq!(blob.srs_id(), 4326);
                assert_eq!(blob.header.byte_order(), order);
                assert_eq!(blob.header.flags.empty_geom, geometry.is_empty());
                assert_eq!(*blob.envelope(), geometry.create_envelope());
                assert_eq!(blob.envelope().dimension(), geometry.dimension());
                assert_eq!(blob.to_bytes().unwrap(), bytes);
            }
        }
    }

    #[test]
    fn empty_geometries_have_no_envelope() {
        for geometry in all_samples().iter().filter(|g| g.is_empty()) {
            let blob = GeometryBlob::new(geometry.clone(), 0);
            assert_eq!(blob.header.flags.envelope, ContentsIndicator::NoEnvelope);
            assert!(blob.header.flags.empty_geom);
            assert_eq!(blob.header.len(), 8);
        }
    }

    #[test]
    fn literal_point_layout() {
        let point: GPKGGeometry = Point::new(Coordinate::new(1.0, 2.0)).into();
        let options = WriterOptions::default().with_envelope(EnvelopePolicy::Omit);
        let bytes = encode_with(&point, 4326, &options).unwrap();

        let mut expected = vec![0x47, 0x50, 0x00, 0b0000_0001];
        expected.write_i32::<LittleEndian>(4326).unwrap();
        expected.push(1);
        expected.write_u32::<LittleEndian>(1).unwrap();
        expected.write_f64::<LittleEndian>(1.0).unwrap();
        expected.write_f64::<LittleEndian>(2.0).unwrap();
        assert_eq!(bytes.len(), 29);
        assert_eq!(bytes, expected);

        let blob = decode(&bytes).unwrap();
        assert_eq!(blob.geometry.type_code(), 1);
        assert!(blob.envelope().is_empty());
    }

    #[test]
    fn exact_envelope_in_header() {
        let point: GPKGGeometry = Point::new(Coordinate::new(1.0, 2.0)).into();
        let bytes = encode(&point, 4326).unwrap();
        assert_eq!(bytes.len(), 8 + 32 + 21);
        assert_eq!(bytes[3], 0b0000_0011);
        assert_eq!(decode(&bytes).unwrap().envelope().to_array(), vec![1.0, 1.0, 2.0, 2.0]);
    }

    #[test]
    fn dimensional_type_codes() {
        let registry = GeometryFactoryRegistry::with_config(&RegistryConfig::all_dimensions());
        let points: [(GPKGGeometry, u32); 3] = [
            (Point::new(CoordinateZ::new(1.0, 2.0, 3.0)).into(), 1001),
            (Point::new(CoordinateM::new(1.0, 2.0, 3.0)).into(), 2001),
            (Point::new(CoordinateZM::new(1.0, 2.0, 3.0, 4.0)).into(), 3001),
        ];
        let options = WriterOptions::default().with_envelope(EnvelopePolicy::Omit);
        for (point, code) in points {
            let bytes = encode_with(&point, 0, &options).unwrap();
            let mut type_code = [0u8; 4];
            type_code.copy_from_slice(&bytes[9..13]);
            assert_eq!(u32::from_le_bytes(type_code), code);
            assert_eq!(decode_with(&registry, &bytes).unwrap().geometry, point);
        }
    }

    #[test]
    fn default_registry_rejects_z() {
        let point: GPKGGeometry = Point::new(CoordinateZ::new(1.0, 2.0, 3.0)).into();
        let bytes = encode(&point, 4326).unwrap();
        assert!(matches!(
            decode(&bytes),
            Err(Error::UnsupportedGeometryType(1001))
        ));
    }

    #[test]
    fn heterogeneous_collection() {
        let mut bytes = vec![0x47, 0x50, 0x00, 0b0000_0001];
        bytes.write_i32::<LittleEndian>(4326).unwrap();
        // collection header in little endian
        bytes.push(1);
        bytes.write_u32::<LittleEndian>(7).unwrap();
        bytes.write_u32::<LittleEndian>(2).unwrap();
        // big endian point
        bytes.push(0);
        bytes.write_u32::<BigEndian>(1).unwrap();
        bytes.write_f64::<BigEndian>(1.0).unwrap();
        bytes.write_f64::<BigEndian>(2.0).unwrap();
        // little endian linestring
        bytes.push(1);
        bytes.write_u32::<LittleEndian>(2).unwrap();
        bytes.write_u32::<LittleEndian>(2).unwrap();
        for v in [3.0, 4.0, 5.0, 6.0] {
            bytes.write_f64::<LittleEndian>(v).unwrap();
        }

        let expected: GPKGGeometry = GeometryCollection::<Coordinate>::new(vec![
            Point::new(Coordinate::new(1.0, 2.0)).into(),
            LineString::try_new(vec![Coordinate::new(3.0, 4.0), Coordinate::new(5.0, 6.0)])
                .unwrap()
                .into(),
        ])
        .into();

        let blob = decode(&bytes).unwrap();
        assert_eq!(blob.geometry, expected);
        assert_eq!(blob.envelope(), &Envelope::empty(Dimension::XY));

        let reencoded = encode(&blob.geometry, 4326).unwrap();
        assert_eq!(decode(&reencoded).unwrap().geometry, expected);
    }

    #[test]
    fn truncation_is_a_format_error() {
        let line: GPKGGeometry =
            LineString::try_new(vec![Coordinate::new(1.0, 2.0), Coordinate::new(3.0, 4.0)])
                .unwrap()
                .into();
        let bytes = encode(&line, 4326).unwrap();
        for cut in 1..bytes.len() {
            assert!(matches!(
                decode(&bytes[..cut]),
                Err(Error::FormatError(_))
            ));
        }
    }

    #[test]
    fn trailing_bytes_ignored() {
        let point: GPKGGeometry = Point::new(Coordinate::new(1.0, 2.0)).into();
        let mut bytes = encode(&point, 4326).unwrap();
        bytes.extend_from_slice(&[0xde, 0xad]);
        assert_eq!(decode(&bytes).unwrap().geometry, point);
    }

    #[test]
    fn empty_point_sets_flag() {
        let empty: GPKGGeometry = Point::<Coordinate>::empty().into();
        let bytes = encode(&empty, 4326).unwrap();
        assert_eq!(bytes[3], 0b0001_0001);
        let blob = decode(&bytes).unwrap();
        assert!(blob.geometry.is_empty());
        assert!(blob.header.flags.empty_geom);
    }

    #[test]
    fn nan_envelope_survives_rewrite() {
        // empty point stored with an XY envelope of NaN bounds
        let mut bytes = vec![0x47, 0x50, 0x00, 0b0001_0011];
        bytes.write_i32::<LittleEndian>(4326).unwrap();
        for _ in 0..4 {
            bytes.write_f64::<LittleEndian>(f64::NAN).unwrap();
        }
        bytes.push(1);
        bytes.write_u32::<LittleEndian>(1).unwrap();
        bytes.write_f64::<LittleEndian>(f64::NAN).unwrap();
        bytes.write_f64::<LittleEndian>(f64::NAN).unwrap();
        assert_eq!(bytes.len(), 61);

        let blob = decode(&bytes).unwrap();
        assert_eq!(blob.header.flags.envelope, ContentsIndicator::XY);
        assert!(blob.envelope().is_empty());

        let rewritten = blob.to_bytes().unwrap();
        assert_eq!(rewritten, bytes);
        let again = decode(&rewritten).unwrap();
        assert!(again.geometry.is_empty());
        assert_eq!(again.header, blob.header);
    }

    #[test]
    fn empty_members_make_an_empty_blob() {
        let geometries: [GPKGGeometry; 2] = [
            Polygon::from_rings(vec![LineString::<Coordinate>::empty()]).into(),
            MultiPoint::new(vec![Point::<CoordinateZ>::empty()]).into(),
        ];
        let registry = GeometryFactoryRegistry::with_config(&RegistryConfig::all_dimensions());
        for geometry in geometries {
            let bytes = encode(&geometry, 4326).unwrap();
            let blob = decode_with(&registry, &bytes).unwrap();
            assert!(blob.header.flags.empty_geom);
            assert_eq!(blob.header.flags.envelope, ContentsIndicator::NoEnvelope);
            assert_eq!(blob.geometry, geometry);
        }
    }
}
