//! ARS operations.

use faceted_kernel_geom::{
    Aabb3, ArsInternal, ExternalRecord, Internal, SolidType, TriangleMesh, VlistCmd,
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
use crate::soltab::{ArsSpecific, Bounds, SolidTab, Specific};

/// Operations of the arbitrary regular solid.
#[derive(Debug)]
pub struct ArsOps;

fn expect_ars(ip: &Internal) -> Result<&ArsInternal> {
    match ip {
        Internal::Ars(a) => Ok(a),
        _ => Err(wrong_internal(ip, SolidType::Ars)),
    }
}

/// The internal form, checked so the geometry walks can index freely.
fn valid_ars(ip: &Internal) -> Result<&ArsInternal> {
    let v = expect_ars(ip)?;
    v.validate()?;
    Ok(v)
}

impl Primitive for ArsOps {
    fn solid_type(&self) -> SolidType {
        SolidType::Ars
    }

    /// Rule two facets across each quad between adjacent curves. The quad
    /// triangles' `wn` points into the solid, so the outward normal is its
    /// reverse.
    fn prep(&self, name: &str, ip: &Internal, cfg: &RtConfig) -> Result<SolidTab> {
        let ars = valid_ars(ip)?;

        let mut facets = FacetList::new();
        for tri in ars.quad_triangles() {
            facets.add(
                name,
                FacetInput::new(tri).normal(FacetNormal::Reversed),
                DEGENERATE_EDGE,
            );
        }
        if facets.is_empty() {
            return Err(RtError::NoFaces { name: name.into() });
        }
        debug!(solid = %name, nfacets = facets.len(), "ars prepped");

        Ok(SolidTab {
            name: name.into(),
            solid_type: SolidType::Ars,
            bounds: Bounds::from_aabb(ars.bbox()),
            specific: Specific::Ars(ArsSpecific {
                facets,
                max_hits: cfg.hits.ars,
            }),
        })
    }

    fn shot(&self, st: &SolidTab, ray: &Ray) -> Result<Vec<Segment>> {
        let s = st.as_ars()?;
        if misses_bounds(st, ray) {
            return Ok(Vec::new());
        }
        let raw = collect_hits(&st.name, ray, &s.facets, s.max_hits);
        let hits = classify(&s.facets, ray, &raw);
        Ok(pair_even(&st.name, ray, &hits))
    }

    fn norm(&self, st: &SolidTab, hit: &Hit, ray: &Ray) -> Result<HitNormal> {
        st.as_ars()?;
        outward_normal(st, hit, ray)
    }

    fn curve(&self, st: &SolidTab, _hit: &Hit, normal: &HitNormal) -> Result<Curvature> {
        st.as_ars()?;
        Ok(flat_curvature(normal))
    }

    fn uv(&self, st: &SolidTab, hit: &Hit, ray: &Ray) -> Result<UvCoord> {
        st.as_ars()?;
        facet_uv(st, hit, ray)
    }

    fn class(&self, st: &SolidTab, bbox: &Aabb3, tol: &Tolerance) -> Result<Classification> {
        st.as_ars()?;
        Ok(bbox_class(st, bbox, tol))
    }

    fn free(&self, st: SolidTab) -> Result<()> {
        let s = st.as_ars()?;
        debug!(solid = %st.name, nfacets = s.facets.len(), "ars freed");
        Ok(())
    }

    fn plot(&self, ip: &Internal, _tol: &Tolerance) -> Result<Vec<VlistCmd>> {
        Ok(valid_ars(ip)?.plot())
    }

    fn tessellate(&self, ip: &Internal, tol: &Tolerance) -> Result<TriangleMesh> {
        Ok(valid_ars(ip)?.tessellate(tol))
    }

    fn import(&self, rec: &ExternalRecord, mat: &Transform) -> Result<Internal> {
        match rec {
            ExternalRecord::Ars(r) => Ok(Internal::Ars(ArsInternal::import(r, mat)?)),
            _ => Err(wrong_record(rec, SolidType::Ars)),
        }
    }

    fn export(&self, ip: &Internal, local2mm: f64) -> Result<ExternalRecord> {
        Ok(ExternalRecord::Ars(expect_ars(ip)?.export(local2mm)?))
    }

    fn describe(&self, ip: &Internal, verbose: bool, mm2local: f64) -> Result<String> {
        Ok(valid_ars(ip)?.describe(verbose, mm2local))
    }

    fn xform(&self, ip: &Internal, mat: &Transform) -> Result<Internal> {
        Ok(Internal::Ars(valid_ars(ip)?.transform(mat)))
    }

    fn bbox(&self, ip: &Internal) -> Result<Aabb3> {
        Ok(valid_ars(ip)?.bbox())
    }

    fn volume(&self, ip: &Internal) -> Result<f64> {
        Ok(valid_ars(ip)?.volume())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::HitSide;
    use faceted_kernel_geom::{ArsRecord, GeomError};
    use faceted_kernel_math::{Point3, Vec3};

    /// 2x2x1 square prism closed by apex curves.
    fn prism() -> Internal {
        let sq = |z: f64| {
            vec![
                [1.0, -1.0, z],
                [1.0, 1.0, z],
                [-1.0, 1.0, z],
                [-1.0, -1.0, z],
            ]
        };
        let rec = ArsRecord {
            curves: vec![
                vec![[0.0, 0.0, 0.0]; 4],
                sq(0.0),
                sq(1.0),
                vec![[0.0, 0.0, 1.0]; 4],
            ],
        };
        ArsOps
            .import(&ExternalRecord::Ars(rec), &Transform::identity())
            .unwrap()
    }

    fn prepped() -> SolidTab {
        ArsOps.prep("prism", &prism(), &RtConfig::default()).unwrap()
    }

    #[test]
    fn test_prep_skips_apex_slivers() {
        let st = prepped();
        assert_eq!(st.facets().len(), 16);
        assert_eq!(st.bounds.aabb.max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_outward_normals() {
        let st = prepped();
        let center = Point3::new(0.0, 0.0, 0.5);
        for (_, f) in st.facets().iter() {
            assert!(f.normal.dot(&(f.a - center)) > 0.0);
            assert!(f.wn.dot(&f.normal) < 0.0);
        }
    }

    #[test]
    fn test_shot_through_caps() {
        let st = prepped();
        let ray = Ray::new(Point3::new(0.3, 0.1, -10.0), Vec3::z());
        let segs = ArsOps.shot(&st, &ray).unwrap();
        assert_eq!(segs.len(), 1);
        assert!((segs[0].entry.dist - 10.0).abs() < 1e-9);
        assert!((segs[0].exit.dist - 11.0).abs() < 1e-9);
        assert_eq!(segs[0].entry.side, HitSide::Entry);

        let n_in = ArsOps.norm(&st, &segs[0].entry, &ray).unwrap();
        assert!((n_in.normal - Vec3::new(0.0, 0.0, -1.0)).norm() < 1e-12);
        assert!((n_in.point - Point3::new(0.3, 0.1, 0.0)).norm() < 1e-9);
        let n_out = ArsOps.norm(&st, &segs[0].exit, &ray).unwrap();
        assert!((n_out.normal - Vec3::z()).norm() < 1e-12);
    }

    #[test]
    fn test_shot_through_sides() {
        let st = prepped();
        let ray = Ray::new(Point3::new(-5.0, 0.3, 0.4), Vec3::x());
        let segs = ArsOps.shot(&st, &ray).unwrap();
        assert_eq!(segs.len(), 1);
        assert!((segs[0].entry.dist - 4.0).abs() < 1e-9);
        assert!((segs[0].exit.dist - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_miss_outside_bounds() {
        let st = prepped();
        let ray = Ray::new(Point3::new(5.0, 5.0, -10.0), Vec3::z());
        assert!(ArsOps.shot(&st, &ray).unwrap().is_empty());
    }

    #[test]
    fn test_uv_and_curvature() {
        let st = prepped();
        let ray = Ray::new(Point3::new(0.3, 0.1, -10.0), Vec3::z()).with_beam(0.5, 0.0);
        let segs = ArsOps.shot(&st, &ray).unwrap();
        let uv = ArsOps.uv(&st, &segs[0].entry, &ray).unwrap();
        assert!((uv.u - 0.55).abs() < 1e-9);
        assert!((uv.v - 0.9).abs() < 1e-9);
        assert!((uv.du - 0.25).abs() < 1e-12);

        let n = ArsOps.norm(&st, &segs[0].entry, &ray).unwrap();
        let c = ArsOps.curve(&st, &segs[0].entry, &n).unwrap();
        assert_eq!(c.c1, 0.0);
        assert_eq!(c.c2, 0.0);
        assert!(c.pdir.dot(&n.normal).abs() < 1e-12);
    }

    #[test]
    fn test_class() {
        let st = prepped();
        let tol = Tolerance::DEFAULT;
        let near = Aabb3::new(Point3::new(0.5, 0.5, 0.5), Point3::new(3.0, 3.0, 3.0));
        let far = Aabb3::new(Point3::new(5.0, 5.0, 5.0), Point3::new(6.0, 6.0, 6.0));
        assert_eq!(ArsOps.class(&st, &near, &tol).unwrap(), Classification::Overlapping);
        assert_eq!(ArsOps.class(&st, &far, &tol).unwrap(), Classification::Outside);
    }

    #[test]
    fn test_internal_operations() {
        let ip = prism();
        assert!((ArsOps.volume(&ip).unwrap() - 4.0).abs() < 1e-12);
        let moved = ArsOps.xform(&ip, &Transform::translation(0.0, 0.0, 2.0)).unwrap();
        assert!((ArsOps.bbox(&moved).unwrap().min.z - 2.0).abs() < 1e-12);
        assert!(ArsOps.describe(&ip, false, 1.0).unwrap().contains("4 curves"));
        assert!(matches!(ArsOps.export(&ip, 1.0).unwrap(), ExternalRecord::Ars(_)));
        assert_eq!(
            ArsOps.tessellate(&ip, &Tolerance::DEFAULT).unwrap().num_triangles(),
            16
        );
        assert!(!ArsOps.plot(&ip, &Tolerance::DEFAULT).unwrap().is_empty());
    }

    #[test]
    fn test_prep_rejects_flat_ars() {
        let rec = ArsRecord {
            curves: vec![vec![[0.0, 0.0, 0.0]; 3], vec![[0.0, 0.0, 0.0]; 3]],
        };
        let ip = ArsOps
            .import(&ExternalRecord::Ars(rec), &Transform::identity())
            .unwrap();
        assert!(matches!(
            ArsOps.prep("flat", &ip, &RtConfig::default()),
            Err(RtError::NoFaces { .. })
        ));
    }

    #[test]
    fn test_free() {
        assert!(ArsOps.free(prepped()).is_ok());
    }

    #[test]
    fn test_geometry_ops_reject_ragged_curves() {
        let mut ip = prism();
        if let Internal::Ars(ars) = &mut ip {
            ars.curves[2].pop();
        }
        let tol = Tolerance::DEFAULT;
        let ragged = |r: Result<()>| {
            matches!(
                r,
                Err(RtError::Geom(GeomError::CurveLength { curve: 2, .. }))
            )
        };
        assert!(ragged(ArsOps.bbox(&ip).map(drop)));
        assert!(ragged(ArsOps.volume(&ip).map(drop)));
        assert!(ragged(ArsOps.plot(&ip, &tol).map(drop)));
        assert!(ragged(ArsOps.tessellate(&ip, &tol).map(drop)));
        assert!(ragged(ArsOps.describe(&ip, false, 1.0).map(drop)));
        assert!(ragged(ArsOps.xform(&ip, &Transform::identity()).map(drop)));
    }
}
