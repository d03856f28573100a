//! The dispatch table binding every solid kind to its operations.
//!
//! The generic tracer never matches on a solid's kind: it looks up the
//! kind's [`FuncTab`] entry and calls through the [`Primitive`] trait.
//! Operations a kind does not implement fall back to the trait's default
//! bodies, which report [`RtError::Unsupported`].

use faceted_kernel_geom::{Aabb3, ExternalRecord, Internal, SolidType, TriangleMesh, VlistCmd};
use faceted_kernel_math::{Tolerance, Transform};
use rayon::prelude::*;

use crate::config::RtConfig;
use crate::diag::diagnostics;
use crate::error::{Result, RtError};
use crate::hit::{Classification, Curvature, Hit, HitNormal, Segment, UvCoord};
use crate::primitives::{ArsOps, BotOps, PgOps};
use crate::ray::Ray;
use crate::soltab::SolidTab;

/// Labels are compared on at most this many leading bytes.
pub const LABEL_LEN: usize = 8;

/// Operations of one solid kind.
pub trait Primitive: Send + Sync {
    /// The kind these operations belong to.
    fn solid_type(&self) -> SolidType;

    /// Error for an operation this kind lacks.
    fn unsupported(&self, op: &'static str) -> RtError {
        RtError::Unsupported {
            label: self.solid_type().label(),
            op,
        }
    }

    /// Build the ray-intersectable form of `ip`.
    fn prep(&self, _name: &str, _ip: &Internal, _cfg: &RtConfig) -> Result<SolidTab> {
        Err(self.unsupported("prep"))
    }

    /// Intersect one ray, returning segments in ascending order.
    fn shot(&self, _st: &SolidTab, _ray: &Ray) -> Result<Vec<Segment>> {
        Err(self.unsupported("shot"))
    }

    /// Intersect a bundle of rays in parallel.
    fn vshot(&self, st: &SolidTab, rays: &[Ray]) -> Result<Vec<Vec<Segment>>> {
        rays.par_iter().map(|ray| self.shot(st, ray)).collect()
    }

    /// Surface normal at a hit.
    fn norm(&self, _st: &SolidTab, _hit: &Hit, _ray: &Ray) -> Result<HitNormal> {
        Err(self.unsupported("norm"))
    }

    /// Principal curvature at a hit.
    fn curve(&self, _st: &SolidTab, _hit: &Hit, _normal: &HitNormal) -> Result<Curvature> {
        Err(self.unsupported("curve"))
    }

    /// Surface parameters at a hit.
    fn uv(&self, _st: &SolidTab, _hit: &Hit, _ray: &Ray) -> Result<UvCoord> {
        Err(self.unsupported("uv"))
    }

    /// Classify the solid against a box.
    fn class(&self, _st: &SolidTab, _bbox: &Aabb3, _tol: &Tolerance) -> Result<Classification> {
        Err(self.unsupported("class"))
    }

    /// Release a prepared solid.
    fn free(&self, _st: SolidTab) -> Result<()> {
        Err(self.unsupported("free"))
    }

    /// Wireframe of the internal form.
    fn plot(&self, _ip: &Internal, _tol: &Tolerance) -> Result<Vec<VlistCmd>> {
        Err(self.unsupported("plot"))
    }

    /// Triangle mesh of the internal form.
    fn tessellate(&self, _ip: &Internal, _tol: &Tolerance) -> Result<TriangleMesh> {
        Err(self.unsupported("tessellate"))
    }

    /// Decode a database record under a placement.
    fn import(&self, _rec: &ExternalRecord, _mat: &Transform) -> Result<Internal> {
        Err(self.unsupported("import"))
    }

    /// Encode the internal form as a database record.
    fn export(&self, _ip: &Internal, _local2mm: f64) -> Result<ExternalRecord> {
        Err(self.unsupported("export"))
    }

    /// Human-readable description.
    fn describe(&self, _ip: &Internal, _verbose: bool, _mm2local: f64) -> Result<String> {
        Err(self.unsupported("describe"))
    }

    /// Apply a placement to the internal form.
    fn xform(&self, _ip: &Internal, _mat: &Transform) -> Result<Internal> {
        Err(self.unsupported("xform"))
    }

    /// Bounding box of the internal form.
    fn bbox(&self, _ip: &Internal) -> Result<Aabb3> {
        Err(self.unsupported("bbox"))
    }

    /// Material volume of the internal form.
    fn volume(&self, _ip: &Internal) -> Result<f64> {
        Err(self.unsupported("volume"))
    }
}

/// A kind with no operations in this kernel.
#[derive(Debug)]
pub struct NullOps(pub SolidType);

impl Primitive for NullOps {
    fn solid_type(&self) -> SolidType {
        self.0
    }
}

/// One dispatch-table entry.
pub struct FuncTab {
    /// Kind of this entry.
    pub solid_type: SolidType,
    /// Its operations.
    pub ops: &'static dyn Primitive,
}

impl FuncTab {
    /// Identifier-style name, e.g. `ID_BOT`.
    pub fn name(&self) -> &'static str {
        self.solid_type.name()
    }

    /// Short label, e.g. `bot`.
    pub fn label(&self) -> &'static str {
        self.solid_type.label()
    }
}

macro_rules! null_entry {
    ($t:ident) => {
        FuncTab {
            solid_type: SolidType::$t,
            ops: &NullOps(SolidType::$t),
        }
    };
}

static FUNCTAB: [FuncTab; 31] = [
    null_entry!(Null),
    null_entry!(Tor),
    null_entry!(Tgc),
    null_entry!(Ell),
    null_entry!(Arb8),
    FuncTab {
        solid_type: SolidType::Ars,
        ops: &ArsOps,
    },
    null_entry!(Half),
    null_entry!(Rec),
    FuncTab {
        solid_type: SolidType::Poly,
        ops: &PgOps,
    },
    null_entry!(Bspline),
    null_entry!(Sph),
    null_entry!(Nmg),
    null_entry!(Ebm),
    null_entry!(Vol),
    null_entry!(Arbn),
    null_entry!(Pipe),
    null_entry!(Particle),
    null_entry!(Rpc),
    null_entry!(Rhc),
    null_entry!(Epa),
    null_entry!(Ehy),
    null_entry!(Eto),
    null_entry!(Grip),
    null_entry!(Joint),
    null_entry!(Hf),
    null_entry!(Dsp),
    null_entry!(Sketch),
    null_entry!(Extrude),
    null_entry!(Submodel),
    null_entry!(Cline),
    FuncTab {
        solid_type: SolidType::Bot,
        ops: &BotOps,
    },
];

/// The whole table, in kind order.
pub fn functab_entries() -> &'static [FuncTab] {
    &FUNCTAB
}

/// Entry for a solid kind.
pub fn functab(solid_type: SolidType) -> &'static FuncTab {
    &FUNCTAB[solid_type.index()]
}

/// Entry whose label matches `label` on the first [`LABEL_LEN`] bytes.
pub fn functab_by_label(label: &str) -> Option<&'static FuncTab> {
    let key = label_prefix(label);
    FUNCTAB.iter().find(|ft| label_prefix(ft.label()) == key)
}

fn label_prefix(label: &str) -> &[u8] {
    let bytes = label.as_bytes();
    &bytes[..bytes.len().min(LABEL_LEN)]
}

/// Prep `ip` through the table, installing the config's log limit.
pub fn prep(name: &str, ip: &Internal, cfg: &RtConfig) -> Result<SolidTab> {
    diagnostics().set_log_limit(cfg.log_limit);
    functab(ip.solid_type()).ops.prep(name, ip, cfg)
}

/// Shoot one ray at a prepared solid through the table.
pub fn shot(st: &SolidTab, ray: &Ray) -> Result<Vec<Segment>> {
    functab(st.solid_type).ops.shot(st, ray)
}

/// Shoot a bundle of rays at a prepared solid through the table.
pub fn vshot(st: &SolidTab, rays: &[Ray]) -> Result<Vec<Vec<Segment>>> {
    functab(st.solid_type).ops.vshot(st, rays)
}

/// Normal at a hit through the table.
pub fn norm(st: &SolidTab, hit: &Hit, ray: &Ray) -> Result<HitNormal> {
    functab(st.solid_type).ops.norm(st, hit, ray)
}

/// Release a prepared solid through the table.
pub fn free(st: SolidTab) -> Result<()> {
    functab(st.solid_type).ops.free(st)
}
