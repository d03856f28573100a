//! Per-kind implementations of the [`Primitive`](crate::Primitive) trait
//! and the pieces they share.

mod ars;
mod bot;
mod pg;

pub use ars::ArsOps;
pub use bot::BotOps;
pub use pg::PgOps;

use faceted_kernel_geom::{Aabb3, ExternalRecord, Internal, SolidType};
use faceted_kernel_math::{vec_ortho, Tolerance};
use tracing::warn;

use crate::diag::{note, Anomaly};
use crate::error::{Result, RtError};
use crate::facet::{Facet, FacetList};
use crate::hit::{Classification, Curvature, Hit, HitNormal, RawHit, UvCoord};
use crate::ray::Ray;
use crate::soltab::SolidTab;

/// Classify raw hits by each facet's outward normal.
fn classify(facets: &FacetList, ray: &Ray, raw: &[RawHit]) -> Vec<Hit> {
    raw.iter()
        .filter_map(|r| {
            let f = facets.get(r.facet)?;
            Some(Hit::from_cos(r, f.normal.dot(ray.direction.as_ref())))
        })
        .collect()
}

/// True when the ray's line misses the solid's bounds entirely.
fn misses_bounds(st: &SolidTab, ray: &Ray) -> bool {
    ray.intersect_aabb(&st.bounds.aabb).is_none()
}

fn facet_of<'a>(st: &'a SolidTab, hit: &Hit) -> Result<&'a Facet> {
    st.facets().get(hit.facet).ok_or_else(|| RtError::NoSuchFacet {
        name: st.name.clone(),
        facet: hit.facet.0,
    })
}

/// The facet's own outward normal (blended when it has vertex normals).
fn outward_normal(st: &SolidTab, hit: &Hit, ray: &Ray) -> Result<HitNormal> {
    let f = facet_of(st, hit)?;
    Ok(HitNormal {
        point: hit.point(ray),
        normal: f.normal_at(hit.u, hit.v),
    })
}

/// Facets are flat: zero curvature, any tangent direction.
fn flat_curvature(normal: &HitNormal) -> Curvature {
    Curvature {
        pdir: vec_ortho(&normal.normal),
        c1: 0.0,
        c2: 0.0,
    }
}

/// Edge-local parameters of a hit: the hit point projected on the
/// facet's two edges from `A`, each scaled by that edge's squared length.
fn facet_uv(st: &SolidTab, hit: &Hit, ray: &Ray) -> Result<UvCoord> {
    let f = facet_of(st, hit)?;
    let rel = hit.point(ray) - f.a;
    let ba_sq = f.ba.norm_squared();
    let mut u = rel.dot(&f.ba) / ba_sq;
    let mut v = rel.dot(&f.ca) / f.ca.norm_squared();
    if u < 0.0 || v < 0.0 {
        if note(Anomaly::NegativeUv) {
            warn!(solid = %st.name, u, v, "negative surface parameter, probable bad topology");
        }
        u = u.abs();
        v = v.abs();
    }
    let d = ray.radius_at(hit.dist) / ba_sq.sqrt();
    Ok(UvCoord { u, v, du: d, dv: d })
}

/// Bounding-box classification against a query box.
fn bbox_class(st: &SolidTab, bbox: &Aabb3, tol: &Tolerance) -> Classification {
    let mut own = st.bounds.aabb;
    own.expand(tol.dist);
    if own.overlaps(bbox) {
        Classification::Overlapping
    } else {
        Classification::Outside
    }
}

fn wrong_internal(ip: &Internal, expected: SolidType) -> RtError {
    RtError::WrongVariant {
        name: ip.solid_type().label().to_string(),
        expected: expected.label(),
    }
}

fn wrong_record(rec: &ExternalRecord, expected: SolidType) -> RtError {
    RtError::WrongVariant {
        name: rec.solid_type().label().to_string(),
        expected: expected.label(),
    }
}
