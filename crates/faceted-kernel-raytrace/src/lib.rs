#![warn(missing_docs)]

//! Ray intersection for faceted primitives.
//!
//! This crate implements the prep/shot/norm contract for the three faceted
//! solid kinds (ARS, PG and BOT) and the dispatch table that binds every
//! solid kind to its operations.
//!
//! # Architecture
//!
//! - [`FacetList`] - triangles prepared for intersection, built once at prep
//! - [`intersect`] - the shared ray/triangle test and hit collection
//! - [`SolidTab`] - a prepared solid: bounds plus kind-specific state
//! - [`Primitive`] / [`functab`] - the dispatch table
//! - [`diag`] - rate-limited anomaly counters
//!
//! # Example
//!
//! ```ignore
//! use faceted_kernel_raytrace::{prep, shot, Ray, RtConfig};
//!
//! let st = prep("cube", &internal, &RtConfig::default())?;
//! let ray = Ray::new(Point3::new(0.5, 0.5, -10.0), Vec3::z());
//! for seg in shot(&st, &ray)? {
//!     println!("{} .. {}", seg.entry.dist, seg.exit.dist);
//! }
//! ```

mod config;
pub mod diag;
mod error;
mod facet;
pub mod functab;
mod hit;
pub mod intersect;
mod primitives;
mod ray;
mod soltab;

pub use config::{HitLimits, RtConfig};
pub use diag::{diagnostics, reset_diagnostics, Anomaly, Diagnostics};
pub use error::{Result, RtError};
pub use facet::{Facet, FacetId, FacetInput, FacetList, FacetNormal};
pub use functab::{
    free, functab, functab_by_label, functab_entries, norm, prep, shot, vshot, FuncTab, NullOps,
    Primitive,
};
pub use hit::{Classification, Curvature, Hit, HitNormal, HitSide, RawHit, Segment, UvCoord};
pub use primitives::{ArsOps, BotOps, PgOps};
pub use ray::Ray;
pub use soltab::{ArsSpecific, BotSpecific, Bounds, PgSpecific, SolidTab, Specific};
