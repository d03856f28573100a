#![warn(missing_docs)]

//! In-memory models of the faceted primitives.
//!
//! Each primitive comes in two forms: a decoded database record (raw codes,
//! signed indices, offsets) and an internal form in model space that the
//! tracer preps from. This crate converts between them and answers the
//! questions that need no ray: extent, volume, wireframe, tessellation.

pub mod ars;
pub mod bbox;
pub mod bot;
pub mod error;
pub mod mesh;
pub mod pg;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use ars::{ArsInternal, ArsRecord};
pub use bbox::Aabb3;
pub use bot::{BotInternal, BotMode, BotOrientation, BotRecord, FaceModes};
pub use error::{GeomError, Result};
pub use mesh::{TriangleMesh, VlistCmd};
pub use pg::{PgFace, PgFaceRecord, PgInternal, PgRecord, PgTriangle};

/// Every solid kind the tracer knows, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum SolidType {
    Null,
    Tor,
    Tgc,
    Ell,
    Arb8,
    Ars,
    Half,
    Rec,
    Poly,
    Bspline,
    Sph,
    Nmg,
    Ebm,
    Vol,
    Arbn,
    Pipe,
    Particle,
    Rpc,
    Rhc,
    Epa,
    Ehy,
    Eto,
    Grip,
    Joint,
    Hf,
    Dsp,
    Sketch,
    Extrude,
    Submodel,
    Cline,
    Bot,
}

impl SolidType {
    /// All kinds, in table order.
    pub const ALL: [SolidType; 31] = [
        SolidType::Null,
        SolidType::Tor,
        SolidType::Tgc,
        SolidType::Ell,
        SolidType::Arb8,
        SolidType::Ars,
        SolidType::Half,
        SolidType::Rec,
        SolidType::Poly,
        SolidType::Bspline,
        SolidType::Sph,
        SolidType::Nmg,
        SolidType::Ebm,
        SolidType::Vol,
        SolidType::Arbn,
        SolidType::Pipe,
        SolidType::Particle,
        SolidType::Rpc,
        SolidType::Rhc,
        SolidType::Epa,
        SolidType::Ehy,
        SolidType::Eto,
        SolidType::Grip,
        SolidType::Joint,
        SolidType::Hf,
        SolidType::Dsp,
        SolidType::Sketch,
        SolidType::Extrude,
        SolidType::Submodel,
        SolidType::Cline,
        SolidType::Bot,
    ];

    /// Position of this kind in [`SolidType::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Identifier-style name, e.g. `ID_BOT`.
    pub fn name(self) -> &'static str {
        match self {
            SolidType::Null => "ID_NULL",
            SolidType::Tor => "ID_TOR",
            SolidType::Tgc => "ID_TGC",
            SolidType::Ell => "ID_ELL",
            SolidType::Arb8 => "ID_ARB8",
            SolidType::Ars => "ID_ARS",
            SolidType::Half => "ID_HALF",
            SolidType::Rec => "ID_REC",
            SolidType::Poly => "ID_POLY",
            SolidType::Bspline => "ID_BSPLINE",
            SolidType::Sph => "ID_SPH",
            SolidType::Nmg => "ID_NMG",
            SolidType::Ebm => "ID_EBM",
            SolidType::Vol => "ID_VOL",
            SolidType::Arbn => "ID_ARBN",
            SolidType::Pipe => "ID_PIPE",
            SolidType::Particle => "ID_PARTICLE",
            SolidType::Rpc => "ID_RPC",
            SolidType::Rhc => "ID_RHC",
            SolidType::Epa => "ID_EPA",
            SolidType::Ehy => "ID_EHY",
            SolidType::Eto => "ID_ETO",
            SolidType::Grip => "ID_GRIP",
            SolidType::Joint => "ID_JOINT",
            SolidType::Hf => "ID_HF",
            SolidType::Dsp => "ID_DSP",
            SolidType::Sketch => "ID_SKETCH",
            SolidType::Extrude => "ID_EXTRUDE",
            SolidType::Submodel => "ID_SUBMODEL",
            SolidType::Cline => "ID_CLINE",
            SolidType::Bot => "ID_BOT",
        }
    }

    /// Short symbolic label used for lookup, e.g. `bot`.
    pub fn label(self) -> &'static str {
        match self {
            SolidType::Null => "NULL",
            SolidType::Tor => "tor",
            SolidType::Tgc => "tgc",
            SolidType::Ell => "ell",
            SolidType::Arb8 => "arb8",
            SolidType::Ars => "ars",
            SolidType::Half => "half",
            SolidType::Rec => "rec",
            SolidType::Poly => "pg",
            SolidType::Bspline => "spline",
            SolidType::Sph => "sph",
            SolidType::Nmg => "nmg",
            SolidType::Ebm => "ebm",
            SolidType::Vol => "vol",
            SolidType::Arbn => "arbn",
            SolidType::Pipe => "pipe",
            SolidType::Particle => "part",
            SolidType::Rpc => "rpc",
            SolidType::Rhc => "rhc",
            SolidType::Epa => "epa",
            SolidType::Ehy => "ehy",
            SolidType::Eto => "eto",
            SolidType::Grip => "grip",
            SolidType::Joint => "joint",
            SolidType::Hf => "hf",
            SolidType::Dsp => "dsp",
            SolidType::Sketch => "sketch",
            SolidType::Extrude => "extrude",
            SolidType::Submodel => "submodel",
            SolidType::Cline => "cline",
            SolidType::Bot => "bot",
        }
    }
}

impl fmt::Display for SolidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Internal form of any faceted primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Internal {
    /// Arbitrary regular solid.
    Ars(ArsInternal),
    /// Polygonal solid.
    Pg(PgInternal),
    /// Bag of triangles.
    Bot(BotInternal),
}

impl Internal {
    /// The solid kind this form describes.
    pub fn solid_type(&self) -> SolidType {
        match self {
            Internal::Ars(_) => SolidType::Ars,
            Internal::Pg(_) => SolidType::Poly,
            Internal::Bot(_) => SolidType::Bot,
        }
    }
}

/// Decoded database record of any faceted primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExternalRecord {
    /// Arbitrary regular solid.
    Ars(ArsRecord),
    /// Polygonal solid.
    Pg(PgRecord),
    /// Bag of triangles.
    Bot(BotRecord),
}

impl ExternalRecord {
    /// The solid kind this record describes.
    pub fn solid_type(&self) -> SolidType {
        match self {
            ExternalRecord::Ars(_) => SolidType::Ars,
            ExternalRecord::Pg(_) => SolidType::Poly,
            ExternalRecord::Bot(_) => SolidType::Bot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_index() {
        for (i, t) in SolidType::ALL.iter().enumerate() {
            assert_eq!(t.index(), i);
        }
        assert_eq!(SolidType::Bot.index(), 30);
    }

    #[test]
    fn test_names_and_labels() {
        assert_eq!(SolidType::Poly.name(), "ID_POLY");
        assert_eq!(SolidType::Poly.label(), "pg");
        assert_eq!(SolidType::Bot.to_string(), "bot");
    }

    #[test]
    fn test_internal_kind() {
        let pg = Internal::Pg(PgInternal::default());
        assert_eq!(pg.solid_type(), SolidType::Poly);
    }
}
