//! PG operations.

use faceted_kernel_geom::{
    Aabb3, ExternalRecord, Internal, PgInternal, SolidType, TriangleMesh, VlistCmd,
};
use faceted_kernel_math::{Tolerance, Transform, DEGENERATE_EDGE};
use tracing::debug;

use super::{
    bbox_class, classify, facet_uv, flat_curvature, misses_bounds, outward_normal,
    wrong_internal, wrong_record,
};
use crate::config::RtConfig;
use crate::error::{Result, RtError};
use crate::facet::{FacetInput, FacetList, FacetNormal};
use crate::functab::Primitive;
use crate::hit::{Classification, Curvature, Hit, HitNormal, Segment, UvCoord};
use crate::intersect::{collect_hits, pair_even};
use crate::ray::Ray;
use crate::soltab::{Bounds, PgSpecific, SolidTab, Specific};

/// Operations of the polygonal solid.
#[derive(Debug)]
pub struct PgOps;

fn expect_pg(ip: &Internal) -> Result<&PgInternal> {
    match ip {
        Internal::Pg(p) => Ok(p),
        _ => Err(wrong_internal(ip, SolidType::Poly)),
    }
}

/// The internal form, checked so the geometry walks can index freely.
fn valid_pg(ip: &Internal) -> Result<&PgInternal> {
    let v = expect_pg(ip)?;
    v.validate()?;
    Ok(v)
}

impl Primitive for PgOps {
    fn solid_type(&self) -> SolidType {
        SolidType::Poly
    }

    /// Fan-triangulate every face; each triangle takes the face's normal.
    fn prep(&self, name: &str, ip: &Internal, cfg: &RtConfig) -> Result<SolidTab> {
        let pg = valid_pg(ip)?;

        let mut facets = FacetList::new();
        for tri in pg.fan_triangles() {
            let vertex_normals = tri.vertex_normals.map(|ns| {
                ns.map(|n| {
                    let len = n.norm();
                    if len > f64::EPSILON {
                        n / len
                    } else {
                        n
                    }
                })
            });
            facets.add(
                name,
                FacetInput::new(tri.pts)
                    .normal(FacetNormal::Supplied(tri.normal))
                    .vertex_normals(vertex_normals),
                DEGENERATE_EDGE,
            );
        }
        if facets.is_empty() {
            return Err(RtError::NoFaces { name: name.into() });
        }
        debug!(solid = %name, nfacets = facets.len(), "poly prepped");

        Ok(SolidTab {
            name: name.into(),
            solid_type: SolidType::Poly,
            bounds: Bounds::from_aabb(pg.bbox()),
            specific: Specific::Pg(PgSpecific {
                facets,
                max_hits: cfg.hits.pg,
            }),
        })
    }

    fn shot(&self, st: &SolidTab, ray: &Ray) -> Result<Vec<Segment>> {
        let s = st.as_pg()?;
        if misses_bounds(st, ray) {
            return Ok(Vec::new());
        }
        let raw = collect_hits(&st.name, ray, &s.facets, s.max_hits);
        let hits = classify(&s.facets, ray, &raw);
        Ok(pair_even(&st.name, ray, &hits))
    }

    /// The face normal, or the blend of the corner normals when the face
    /// carries them.
    fn norm(&self, st: &SolidTab, hit: &Hit, ray: &Ray) -> Result<HitNormal> {
        st.as_pg()?;
        outward_normal(st, hit, ray)
    }

    fn curve(&self, st: &SolidTab, _hit: &Hit, normal: &HitNormal) -> Result<Curvature> {
        st.as_pg()?;
        Ok(flat_curvature(normal))
    }

    fn uv(&self, st: &SolidTab, hit: &Hit, ray: &Ray) -> Result<UvCoord> {
        st.as_pg()?;
        facet_uv(st, hit, ray)
    }

    fn class(&self, st: &SolidTab, bbox: &Aabb3, tol: &Tolerance) -> Result<Classification> {
        st.as_pg()?;
        Ok(bbox_class(st, bbox, tol))
    }

    fn free(&self, st: SolidTab) -> Result<()> {
        let s = st.as_pg()?;
        debug!(solid = %st.name, nfacets = s.facets.len(), "poly freed");
        Ok(())
    }

    fn plot(&self, ip: &Internal, _tol: &Tolerance) -> Result<Vec<VlistCmd>> {
        Ok(valid_pg(ip)?.plot())
    }

    fn tessellate(&self, ip: &Internal, tol: &Tolerance) -> Result<TriangleMesh> {
        Ok(valid_pg(ip)?.tessellate(tol))
    }

    fn import(&self, rec: &ExternalRecord, mat: &Transform) -> Result<Internal> {
        match rec {
            ExternalRecord::Pg(r) => Ok(Internal::Pg(PgInternal::import(r, mat)?)),
            _ => Err(wrong_record(rec, SolidType::Poly)),
        }
    }

    fn export(&self, ip: &Internal, local2mm: f64) -> Result<ExternalRecord> {
        Ok(ExternalRecord::Pg(expect_pg(ip)?.export(local2mm)?))
    }

    fn describe(&self, ip: &Internal, verbose: bool, mm2local: f64) -> Result<String> {
        Ok(valid_pg(ip)?.describe(verbose, mm2local))
    }

    fn xform(&self, ip: &Internal, mat: &Transform) -> Result<Internal> {
        Ok(Internal::Pg(valid_pg(ip)?.transform(mat)))
    }

    fn bbox(&self, ip: &Internal) -> Result<Aabb3> {
        Ok(valid_pg(ip)?.bbox())
    }

    fn volume(&self, ip: &Internal) -> Result<f64> {
        Ok(valid_pg(ip)?.volume())
    }
}
