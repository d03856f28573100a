//! Prepared solids: bounds plus the kind-specific state built at prep.

use faceted_kernel_geom::{Aabb3, BotMode, BotOrientation, FaceModes, SolidType};
use faceted_kernel_math::{Point3, Tolerance};

use crate::error::{Result, RtError};
use crate::facet::FacetList;

/// Flat bounding-box axes are widened by this much on each side.
pub const FLAT_BOUNDS_PAD: f64 = 1.0e-6;

/// Extent of a prepared solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Axis-aligned box.
    pub aabb: Aabb3,
    /// Box center.
    pub center: Point3,
    /// Largest half-extent along any axis.
    pub aradius: f64,
    /// Radius of the sphere through the box corners.
    pub bradius: f64,
}

impl Bounds {
    /// Derive bounds from a box, padding flat axes so rays can still
    /// enter it.
    pub fn from_aabb(mut aabb: Aabb3) -> Self {
        aabb.pad_flat_axes(FLAT_BOUNDS_PAD, FLAT_BOUNDS_PAD);
        let half = aabb.half_extents();
        Self {
            aabb,
            center: aabb.center(),
            aradius: half.x.max(half.y).max(half.z),
            bradius: half.norm(),
        }
    }
}

/// Prepared ARS state.
#[derive(Debug, Clone, PartialEq)]
pub struct ArsSpecific {
    /// Ruled-surface facets.
    pub facets: FacetList,
    /// Hit cap per ray.
    pub max_hits: usize,
}

/// Prepared PG state.
#[derive(Debug, Clone, PartialEq)]
pub struct PgSpecific {
    /// Fan-triangulated face facets.
    pub facets: FacetList,
    /// Hit cap per ray.
    pub max_hits: usize,
}

/// Prepared BOT state.
#[derive(Debug, Clone, PartialEq)]
pub struct BotSpecific {
    /// One facet per usable face; `surf` is the face index.
    pub facets: FacetList,
    /// Interpretation mode.
    pub mode: BotMode,
    /// Face winding.
    pub orientation: BotOrientation,
    /// Error-handling mode, carried through.
    pub error_mode: u8,
    /// Per-face plate thickness, indexed by face.
    pub thickness: Vec<f64>,
    /// Per-face plate placement, indexed by face.
    pub face_mode: FaceModes,
    /// Tolerances captured at prep.
    pub tol: Tolerance,
    /// Hit cap per ray.
    pub max_hits: usize,
}

/// Kind-specific prepared state.
#[derive(Debug, Clone, PartialEq)]
pub enum Specific {
    /// ARS.
    Ars(ArsSpecific),
    /// PG.
    Pg(PgSpecific),
    /// BOT.
    Bot(BotSpecific),
}

/// A prepared solid. Read-only once prep returns, so it can be shot from
/// many threads at once.
#[derive(Debug, Clone, PartialEq)]
pub struct SolidTab {
    /// Primitive name, used in diagnostics.
    pub name: String,
    /// Solid kind.
    pub solid_type: SolidType,
    /// Extent.
    pub bounds: Bounds,
    /// Kind-specific state.
    pub specific: Specific,
}

impl SolidTab {
    /// The facets of whichever kind this is.
    pub fn facets(&self) -> &FacetList {
        match &self.specific {
            Specific::Ars(s) => &s.facets,
            Specific::Pg(s) => &s.facets,
            Specific::Bot(s) => &s.facets,
        }
    }

    pub(crate) fn as_ars(&self) -> Result<&ArsSpecific> {
        match &self.specific {
            Specific::Ars(s) => Ok(s),
            _ => Err(self.wrong_variant(SolidType::Ars)),
        }
    }

    pub(crate) fn as_pg(&self) -> Result<&PgSpecific> {
        match &self.specific {
            Specific::Pg(s) => Ok(s),
            _ => Err(self.wrong_variant(SolidType::Poly)),
        }
    }

    pub(crate) fn as_bot(&self) -> Result<&BotSpecific> {
        match &self.specific {
            Specific::Bot(s) => Ok(s),
            _ => Err(self.wrong_variant(SolidType::Bot)),
        }
    }

    fn wrong_variant(&self, expected: SolidType) -> RtError {
        RtError::WrongVariant {
            name: self.name.clone(),
            expected: expected.label(),
        }
    }
}
