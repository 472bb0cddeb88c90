//! The table from WKB type code to decode function.
//!
//! A registry is filled while it is exclusively owned and only read after
//! that: build one, [register](GeometryFactoryRegistry::register) any
//! extension types, then share it by reference or behind an `Arc`. The
//! process wide [default_registry] is built once on first use and never
//! changes.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;

use crate::coord::{Coord, Coordinate, CoordinateM, CoordinateZ, CoordinateZM};
use crate::geometry_type::Dimension;
use crate::gpkg_wkb::{FullWKB, WkbReader};
use crate::result::{Error, Result};
use crate::types::*;

/// Decodes one geometry; the reader is positioned at its byte order marker
pub type GeometryFactory =
    Arc<dyn Fn(&mut WkbReader<'_>) -> Result<GPKGGeometry> + Send + Sync>;

/// Which dimensionalities get the standard factories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub dimensions: Vec<Dimension>,
}

impl Default for RegistryConfig {
    /// Only the XY types
    fn default() -> Self {
        RegistryConfig {
            dimensions: vec![Dimension::XY],
        }
    }
}

impl RegistryConfig {
    pub fn all_dimensions() -> Self {
        RegistryConfig {
            dimensions: Dimension::ALL.to_vec(),
        }
    }
}

pub struct GeometryFactoryRegistry {
    factories: HashMap<u32, GeometryFactory>,
}

lazy_static! {
    static ref DEFAULT_REGISTRY: GeometryFactoryRegistry = GeometryFactoryRegistry::new();
}

/// The shared registry used by [crate::blob::decode]
pub fn default_registry() -> &'static GeometryFactoryRegistry {
    &DEFAULT_REGISTRY
}

fn read_typed<C, G>(r: &mut WkbReader<'_>) -> Result<GPKGGeometry>
where
    C: Coord,
    G: FullWKB + Into<Geometry<C>>,
{
    Ok(C::into_any(G::read_from_wkb(r)?.into()))
}

fn read_abstract(r: &mut WkbReader<'_>) -> Result<GPKGGeometry> {
    let (_, type_code) = r.read_prefix()?;
    Err(Error::FormatError(format!(
        "cannot instantiate abstract Geometry (type {type_code})"
    )))
}

impl GeometryFactoryRegistry {
    /// A registry seeded per [RegistryConfig::default]
    pub fn new() -> Self {
        Self::with_config(&RegistryConfig::default())
    }

    pub fn with_config(config: &RegistryConfig) -> Self {
        let mut registry = GeometryFactoryRegistry {
            factories: HashMap::new(),
        };
        for dimension in Dimension::ALL {
            registry
                .factories
                .insert(dimension.base(), Arc::new(read_abstract));
        }
        for dimension in &config.dimensions {
            match dimension {
                Dimension::XY => registry.seed::<Coordinate>(),
                Dimension::XYZ => registry.seed::<CoordinateZ>(),
                Dimension::XYM => registry.seed::<CoordinateM>(),
                Dimension::XYZM => registry.seed::<CoordinateZM>(),
            }
        }
        log::debug!(
            "seeded geometry registry for {:?} with {} factories",
            config.dimensions,
            registry.factories.len()
        );
        registry
    }

    fn seed<C: Coord>(&mut self) {
        let seeds: [(u32, GeometryFactory); 7] = [
            (
                Point::<C>::wkb_type_code(),
                Arc::new(read_typed::<C, Point<C>>),
            ),
            (
                LineString::<C>::wkb_type_code(),
                Arc::new(read_typed::<C, LineString<C>>),
            ),
            (
                Polygon::<C>::wkb_type_code(),
                Arc::new(read_typed::<C, Polygon<C>>),
            ),
            (
                MultiPoint::<C>::wkb_type_code(),
                Arc::new(read_typed::<C, MultiPoint<C>>),
            ),
            (
                MultiLineString::<C>::wkb_type_code(),
                Arc::new(read_typed::<C, MultiLineString<C>>),
            ),
            (
                MultiPolygon::<C>::wkb_type_code(),
                Arc::new(read_typed::<C, MultiPolygon<C>>),
            ),
            (
                GeometryCollection::<C>::wkb_type_code(),
                Arc::new(read_typed::<C, GeometryCollection<C>>),
            ),
        ];
        self.factories.extend(seeds);
    }

    /// Add a factory for a type code nothing else claims
    ///
    /// Codes that don't fit in a `u32` and codes already present are rejected.
    /// The factory must consume the order marker and type code itself.
    pub fn register<F>(&mut self, type_code: impl TryInto<u32>, factory: F) -> Result<()>
    where
        F: Fn(&mut WkbReader<'_>) -> Result<GPKGGeometry> + Send + Sync + 'static,
    {
        let type_code: u32 = type_code.try_into().map_err(|_| {
            Error::RegistrationError("type code must fit in an unsigned 32 bit integer".to_string())
        })?;
        if self.factories.contains_key(&type_code) {
            return Err(Error::RegistrationError(format!(
                "type code {type_code} is already registered"
            )));
        }
        log::debug!("registering geometry factory for type {type_code}");
        self.factories.insert(type_code, Arc::new(factory));
        Ok(())
    }

    pub fn factory(&self, type_code: u32) -> Option<&GeometryFactory> {
        self.factories.get(&type_code)
    }

    pub fn contains(&self, type_code: u32) -> bool {
        self.factories.contains_key(&type_code)
    }

    /// Every registered code, ascending
    pub fn type_codes(&self) -> Vec<u32> {
        let mut codes: Vec<u32> = self.factories.keys().copied().collect();
        codes.sort_unstable();
        codes
    }

    /// Decode a bare WKB geometry
    pub fn decode(&self, wkb: &[u8]) -> Result<GPKGGeometry> {
        WkbReader::new(wkb, self).read_geometry()
    }
}

impl Default for GeometryFactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GeometryFactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeometryFactoryRegistry")
            .field("type_codes", &self.type_codes())
            .finish()
    }
}
