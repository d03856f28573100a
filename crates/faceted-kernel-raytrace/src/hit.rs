//! Hits, segments, and the per-hit attributes handed to the CSG evaluator.

use faceted_kernel_math::{Point3, Vec3};

use crate::facet::FacetId;
use crate::ray::Ray;

/// A ray/facet intersection exactly as the geometric test found it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawHit {
    /// Signed distance along the ray.
    pub dist: f64,
    /// Facet that was hit.
    pub facet: FacetId,
    /// Ray direction dotted with the facet's non-unit normal.
    pub dn: f64,
    /// Surface number carried by the facet.
    pub surf: Option<usize>,
    /// Barycentric weight of the facet's second vertex.
    pub u: f64,
    /// Barycentric weight of the facet's third vertex.
    pub v: f64,
}

/// Which end of a segment a hit is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitSide {
    /// The ray enters the solid here.
    Entry,
    /// The ray leaves the solid here.
    Exit,
}

impl HitSide {
    /// The other side.
    pub fn flip(self) -> Self {
        match self {
            HitSide::Entry => HitSide::Exit,
            HitSide::Exit => HitSide::Entry,
        }
    }
}

/// A classified hit, as stored in a [`Segment`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Signed distance along the ray.
    pub dist: f64,
    /// Facet that was hit.
    pub facet: FacetId,
    /// Surface number carried by the facet.
    pub surf: Option<usize>,
    /// Ray direction dotted with the facet's non-unit normal.
    pub dn: f64,
    /// Ray direction dotted with the facet's unit outward normal.
    pub cos: f64,
    /// Barycentric weight of the facet's second vertex.
    pub u: f64,
    /// Barycentric weight of the facet's third vertex.
    pub v: f64,
    /// Entry or exit.
    pub side: HitSide,
    /// True for hits synthesized to repair an odd hit list.
    pub fictitious: bool,
}

impl Hit {
    /// Classify a raw hit given the facet's outward cosine.
    pub fn new(raw: &RawHit, cos: f64, side: HitSide) -> Self {
        Self {
            dist: raw.dist,
            facet: raw.facet,
            surf: raw.surf,
            dn: raw.dn,
            cos,
            u: raw.u,
            v: raw.v,
            side,
            fictitious: false,
        }
    }

    /// Classify by the outward normal: entering iff it faces the ray.
    pub fn from_cos(raw: &RawHit, cos: f64) -> Self {
        let side = if cos < 0.0 { HitSide::Entry } else { HitSide::Exit };
        Self::new(raw, cos, side)
    }

    /// A synthesized copy of this hit with the given side.
    pub fn fictitious_as(&self, side: HitSide) -> Self {
        Self {
            side,
            fictitious: true,
            ..*self
        }
    }

    /// This hit moved to distance `dist`.
    pub fn at_dist(&self, dist: f64) -> Self {
        Self { dist, ..*self }
    }

    /// Point of the hit along `ray`.
    pub fn point(&self, ray: &Ray) -> Point3 {
        ray.at(self.dist)
    }
}

/// An interval of the ray inside a solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Where the ray enters.
    pub entry: Hit,
    /// Where the ray leaves.
    pub exit: Hit,
}

impl Segment {
    /// Pair two hits, tagging their sides by position.
    pub fn new(entry: Hit, exit: Hit) -> Self {
        Self {
            entry: Hit {
                side: HitSide::Entry,
                ..entry
            },
            exit: Hit {
                side: HitSide::Exit,
                ..exit
            },
        }
    }

    /// A zero-length segment at `hit`.
    pub fn point(hit: Hit) -> Self {
        Self::new(hit, hit)
    }

    /// Length along the ray.
    pub fn len(&self) -> f64 {
        self.exit.dist - self.entry.dist
    }
}

/// Surface normal at a hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitNormal {
    /// Hit point.
    pub point: Point3,
    /// Unit normal.
    pub normal: Vec3,
}

/// Principal curvature at a hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Curvature {
    /// Unit direction of the first principal curvature.
    pub pdir: Vec3,
    /// Curvature along `pdir`.
    pub c1: f64,
    /// Curvature across `pdir`.
    pub c2: f64,
}

/// Surface parameters at a hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvCoord {
    /// First parameter.
    pub u: f64,
    /// Second parameter.
    pub v: f64,
    /// Parameter extent of the beam footprint along `u`.
    pub du: f64,
    /// Parameter extent of the beam footprint along `v`.
    pub dv: f64,
}

/// Where a solid lies relative to a query box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The solid's bounds miss the box.
    Outside,
    /// The solid's bounds touch the box.
    Overlapping,
}
