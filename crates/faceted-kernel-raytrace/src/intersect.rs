//! The ray/triangle test shared by every faceted primitive, plus hit
//! collection and the plain even-pairing policy.

use std::cmp::Ordering;

use faceted_kernel_math::SQRT_SMALL_FASTF;
use tracing::warn;

use crate::diag::{note, Anomaly};
use crate::facet::{Facet, FacetId, FacetList};
use crate::hit::{Hit, RawHit, Segment};
use crate::ray::Ray;

/// Intersect `ray` with one facet.
///
/// Returns `None` when the ray runs parallel to the facet's plane or
/// crosses the plane outside the triangle. Hits on an edge count.
pub fn intersect_facet(ray: &Ray, facet: &Facet, id: FacetId) -> Option<RawHit> {
    let dir = ray.direction.as_ref();
    let dn = facet.wn.dot(dir);
    let abs_dn = dn.abs();
    if abs_dn < SQRT_SMALL_FASTF {
        return None;
    }

    let wxb = facet.a - ray.origin;
    let xp = wxb.cross(dir);

    let mut alpha = facet.ca.dot(&xp);
    if dn < 0.0 {
        alpha = -alpha;
    }
    if alpha < 0.0 || alpha > abs_dn {
        return None;
    }

    let mut beta = facet.ba.dot(&xp);
    if dn > 0.0 {
        beta = -beta;
    }
    if beta < 0.0 || beta > abs_dn {
        return None;
    }
    if alpha + beta > abs_dn {
        return None;
    }

    Some(RawHit {
        dist: wxb.dot(&facet.wn) / dn,
        facet: id,
        dn,
        surf: facet.surf,
        u: alpha / abs_dn,
        v: beta / abs_dn,
    })
}

/// Test every facet, keep at most `cap` hits, and sort them by distance.
pub fn collect_hits(name: &str, ray: &Ray, facets: &FacetList, cap: usize) -> Vec<RawHit> {
    let mut hits: Vec<RawHit> = facets
        .iter()
        .filter_map(|(id, f)| intersect_facet(ray, f, id))
        .collect();
    if hits.len() > cap {
        if note(Anomaly::HitCapExceeded) {
            warn!(
                solid = %name,
                found = hits.len(),
                cap,
                "too many hits, extra hits ignored"
            );
        }
        hits.truncate(cap);
    }
    sort_hits(&mut hits);
    hits
}

/// Sort ascending by distance. NaN distances compare equal.
pub fn sort_hits(hits: &mut [RawHit]) {
    hits.sort_by(|a, b| a.dist.partial_cmp(&b.dist).unwrap_or(Ordering::Equal));
}

/// Pair sorted hits consecutively. An odd count means the ray saw a
/// broken surface: it is logged and the ray misses this solid.
pub fn pair_even(name: &str, ray: &Ray, hits: &[Hit]) -> Vec<Segment> {
    if hits.len() % 2 != 0 {
        if note(Anomaly::OddHits) {
            warn!(
                solid = %name,
                nhits = hits.len(),
                origin = ?ray.origin,
                direction = ?ray.direction,
                "odd number of hits, ray ignored"
            );
        }
        return Vec::new();
    }
    hits.chunks_exact(2)
        .map(|pair| Segment::new(pair[0], pair[1]))
        .collect()
}
