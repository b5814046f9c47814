use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use proj4rs::proj::Proj;

use crate::errors::{ResampleError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Definition {
    Epsg(u16),
    Proj4(String),
}

/// An immutable, cheaply clonable coordinate reference system.
///
/// Clones share the parsed projection; use [`SpatialRef::isolated`] to obtain
/// a private copy.
#[derive(Clone)]
pub struct SpatialRef {
    definition: Definition,
    proj: Arc<Proj>,
}

impl SpatialRef {
    /// Creates a spatial reference from a PROJ.4 style definition, e.g.
    /// `+proj=longlat +datum=WGS84 +no_defs`.
    pub fn from_proj4(proj4_string: &str) -> Result<SpatialRef> {
        let proj = Proj::from_proj_string(proj4_string).map_err(|e| {
            ResampleError::ProjectionUnavailable(format!(
                "invalid projection definition '{proj4_string}': {e:?}"
            ))
        })?;
        Ok(SpatialRef {
            definition: Definition::Proj4(normalize(proj4_string)),
            proj: Arc::new(proj),
        })
    }

    /// Creates a spatial reference from an EPSG code known to the bundled
    /// definition database.
    pub fn from_epsg(epsg_code: u16) -> Result<SpatialRef> {
        let proj = Proj::from_epsg_code(epsg_code).map_err(|e| {
            ResampleError::ProjectionUnavailable(format!("EPSG:{epsg_code}: {e:?}"))
        })?;
        Ok(SpatialRef {
            definition: Definition::Epsg(epsg_code),
            proj: Arc::new(proj),
        })
    }

    /// Accepts either `EPSG:<code>` or a PROJ.4 definition.
    pub fn from_definition(definition: &str) -> Result<SpatialRef> {
        let trimmed = definition.trim();
        match trimmed
            .get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("epsg:"))
        {
            Some(_) => {
                let code = trimmed[5..].trim().parse::<u16>().map_err(|_| {
                    ResampleError::ProjectionUnavailable(format!(
                        "invalid EPSG code in '{definition}'"
                    ))
                })?;
                Self::from_epsg(code)
            }
            None => Self::from_proj4(trimmed),
        }
    }

    /// Returns `true` for longitude/latitude systems, whose coordinates are
    /// exchanged with the projection engine in radians.
    pub fn is_geographic(&self) -> bool {
        self.proj.is_latlong()
    }

    /// Returns `true` if converting between `self` and `other` is not a no-op.
    pub fn differs(&self, other: &SpatialRef) -> bool {
        self.definition != other.definition
    }

    /// Short human readable name, `EPSG:<code>` or the PROJ.4 string.
    pub fn authority(&self) -> String {
        match &self.definition {
            Definition::Epsg(code) => format!("EPSG:{code}"),
            Definition::Proj4(s) => s.clone(),
        }
    }

    /// Parses the definition again, returning a reference that shares nothing
    /// with `self`.
    pub fn isolated(&self) -> Result<SpatialRef> {
        match &self.definition {
            Definition::Epsg(code) => Self::from_epsg(*code),
            Definition::Proj4(s) => Self::from_proj4(s),
        }
    }

    pub(crate) fn proj(&self) -> &Proj {
        &self.proj
    }
}

impl Debug for SpatialRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialRef")
            .field("definition", &self.authority())
            .finish()
    }
}

/// Collapse whitespace so equivalent definitions compare equal.
fn normalize(proj4_string: &str) -> String {
    proj4_string.split_whitespace().collect::<Vec<_>>().join(" ")
}
