//! The GeoPackage binary header that precedes the WKB of every stored geometry.
//!
//! <https://www.geopackage.org/spec130/#gpb_spec>
use std::io::Write;

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};

use crate::envelope::{ContentsIndicator, Envelope};
use crate::geometry_type::Dimension;
use crate::gpkg_wkb::WkbByteOrder;
use crate::result::{Error, Result};

/// `GP` in ASCII
pub const MAGIC: [u8; 2] = [0x47, 0x50];

/// Version 0 means GeoPackage version 1
pub const VERSION: u8 = 0;

/// Magic, version, flags and SRS id; the envelope follows
pub const FIXED_LEN: usize = 8;

/// The flags byte of the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GPKGGeomFlags {
    pub extended: bool,
    pub empty_geom: bool,
    pub little_endian: bool,
    pub envelope: ContentsIndicator,
}

impl GPKGGeomFlags {
    // https://www.geopackage.org/spec130/#flags_layout
    pub fn from_byte(b: u8) -> Result<Self> {
        let extended = ((b >> 5) & 1) > 0;
        let empty_geom = ((b >> 4) & 1) > 0;
        let little_endian = (b & 1) > 0;
        let envelope = ContentsIndicator::from_code((b >> 1) & 0b111)?;
        Ok(GPKGGeomFlags {
            extended,
            empty_geom,
            little_endian,
            envelope,
        })
    }

    pub fn to_byte(&self) -> u8 {
        let mut flags = 0u8;
        flags |= (self.extended as u8) << 5;
        flags |= (self.empty_geom as u8) << 4;
        flags |= self.envelope.code() << 1;
        flags |= self.little_endian as u8;

        flags
    }

    pub fn byte_order(&self) -> WkbByteOrder {
        if self.little_endian {
            WkbByteOrder::LittleEndian
        } else {
            WkbByteOrder::BigEndian
        }
    }
}

/// Everything in a geometry blob ahead of the WKB
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryHeader {
    pub version: u8,
    pub flags: GPKGGeomFlags,
    pub srs_id: i32,
    /// Empty when the flags say no envelope is present
    pub envelope: Envelope,
}

impl GeometryHeader {
    /// A version 0 header; the contents indicator follows from `envelope`
    pub fn new(
        srs_id: i32,
        byte_order: WkbByteOrder,
        envelope: Envelope,
        empty_geom: bool,
        extended: bool,
    ) -> Self {
        GeometryHeader {
            version: VERSION,
            flags: GPKGGeomFlags {
                extended,
                empty_geom,
                little_endian: byte_order == WkbByteOrder::LittleEndian,
                envelope: envelope.contents_indicator(),
            },
            srs_id,
            envelope,
        }
    }

    pub fn byte_order(&self) -> WkbByteOrder {
        self.flags.byte_order()
    }

    /// Header length in bytes, which is also where the WKB starts
    pub fn len(&self) -> usize {
        FIXED_LEN + self.flags.envelope.byte_len()
    }

    pub fn read(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FIXED_LEN {
            return Err(Error::FormatError(format!(
                "geometry header needs {FIXED_LEN} bytes, found {}",
                bytes.len()
            )));
        }
        if bytes[0..2] != MAGIC {
            return Err(Error::FormatError(format!(
                "bad magic {:#04x} {:#04x}",
                bytes[0], bytes[1]
            )));
        }
        let version = bytes[2];
        if version != VERSION {
            return Err(Error::FormatError(format!(
                "unsupported geometry blob version {version}"
            )));
        }
        let flags = GPKGGeomFlags::from_byte(bytes[3])?;
        let envelope_len = flags.envelope.byte_len();
        if bytes.len() < FIXED_LEN + envelope_len {
            return Err(Error::FormatError(format!(
                "envelope needs {envelope_len} bytes, found {}",
                bytes.len() - FIXED_LEN
            )));
        }

        let envelope_bytes = &bytes[FIXED_LEN..FIXED_LEN + envelope_len];
        let (srs_id, values) = if flags.little_endian {
            read_fields::<LittleEndian>(&bytes[4..8], envelope_bytes)
        } else {
            read_fields::<BigEndian>(&bytes[4..8], envelope_bytes)
        };
        let envelope = match flags.envelope.dimension() {
            Some(dimension) => Envelope::from_array(dimension, &values)?,
            None => Envelope::empty(Dimension::XY),
        };

        Ok(GeometryHeader {
            version,
            flags,
            srs_id,
            envelope,
        })
    }

    pub fn write<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        w.write_all(&MAGIC)?;
        w.write_u8(self.version)?;
        w.write_u8(self.flags.to_byte())?;
        match self.byte_order() {
            WkbByteOrder::BigEndian => write_fields::<BigEndian, W>(w, self),
            WkbByteOrder::LittleEndian => write_fields::<LittleEndian, W>(w, self),
        }
    }
}

fn read_fields<T: ByteOrder>(srs: &[u8], envelope: &[u8]) -> (i32, Vec<f64>) {
    let values = envelope.chunks_exact(8).map(T::read_f64).collect();
    (T::read_i32(srs), values)
}

fn write_fields<T: ByteOrder, W: Write + ?Sized>(w: &mut W, header: &GeometryHeader) -> Result<()> {
    w.write_i32::<T>(header.srs_id)?;
    // the flags decide how many bounds follow, even when they are all NaN
    if let Some(dimension) = header.flags.envelope.dimension() {
        for value in header.envelope.to_dimension(dimension).bounds() {
            w.write_f64::<T>(value)?;
        }
    }
    Ok(())
}
