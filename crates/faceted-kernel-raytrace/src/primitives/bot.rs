//! BOT operations, including the mode-dependent segment assembly.

use faceted_kernel_geom::{
    Aabb3, BotInternal, BotMode, BotOrientation, ExternalRecord, FaceModes, Internal, SolidType,
    TriangleMesh, VlistCmd,
};
use faceted_kernel_math::{Tolerance, Transform};
use tracing::{debug, warn};

use super::{bbox_class, classify, facet_of, flat_curvature, misses_bounds, wrong_internal, wrong_record};
use crate::config::RtConfig;
use crate::diag::{note, Anomaly};
use crate::error::{Result, RtError};
use crate::facet::{FacetInput, FacetList, FacetNormal};
use crate::functab::Primitive;
use crate::hit::{Classification, Curvature, Hit, HitNormal, HitSide, Segment, UvCoord};
use crate::intersect::collect_hits;
use crate::ray::Ray;
use crate::soltab::{BotSpecific, Bounds, SolidTab, Specific};

/// Operations of the bag of triangles.
#[derive(Debug)]
pub struct BotOps;

fn expect_bot(ip: &Internal) -> Result<&BotInternal> {
    match ip {
        Internal::Bot(b) => Ok(b),
        _ => Err(wrong_internal(ip, SolidType::Bot)),
    }
}

/// The internal form, checked so the geometry walks can index freely.
fn valid_bot(ip: &Internal) -> Result<&BotInternal> {
    let v = expect_bot(ip)?;
    v.validate()?;
    Ok(v)
}

impl Primitive for BotOps {
    fn solid_type(&self) -> SolidType {
        SolidType::Bot
    }

    fn prep(&self, name: &str, ip: &Internal, cfg: &RtConfig) -> Result<SolidTab> {
        let bot = valid_bot(ip)?;

        let rule = if bot.orientation == BotOrientation::Cw {
            FacetNormal::Reversed
        } else {
            FacetNormal::Forward
        };
        let mut facets = FacetList::new();
        for i in 0..bot.faces.len() {
            facets.add(
                name,
                FacetInput::new(bot.face_points(i)).normal(rule).surf(i),
                cfg.tol.dist,
            );
        }
        if facets.is_empty() {
            return Err(RtError::NoFaces { name: name.into() });
        }
        debug!(
            solid = %name,
            nfacets = facets.len(),
            mode = %bot.mode,
            orientation = %bot.orientation,
            "bot prepped"
        );

        let num_faces = bot.faces.len();
        Ok(SolidTab {
            name: name.into(),
            solid_type: SolidType::Bot,
            bounds: Bounds::from_aabb(bot.bbox()),
            specific: Specific::Bot(BotSpecific {
                facets,
                mode: bot.mode,
                orientation: bot.orientation,
                error_mode: bot.error_mode,
                thickness: bot.thickness.clone().unwrap_or_default(),
                face_mode: bot
                    .face_mode
                    .clone()
                    .unwrap_or_else(|| FaceModes::centered(num_faces)),
                tol: cfg.tol,
                max_hits: cfg.hits.bot,
            }),
        })
    }

    fn shot(&self, st: &SolidTab, ray: &Ray) -> Result<Vec<Segment>> {
        let s = st.as_bot()?;
        if misses_bounds(st, ray) {
            return Ok(Vec::new());
        }
        let raw = collect_hits(&st.name, ray, &s.facets, s.max_hits);
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        let hits = classify(&s.facets, ray, &raw);

        Ok(match (s.mode, s.orientation) {
            (BotMode::Surface, _) => hits.into_iter().map(Segment::point).collect(),
            (BotMode::Plate | BotMode::PlateNoCos, _) => plate_segments(s, &hits),
            (BotMode::Solid, BotOrientation::Unoriented) => {
                unoriented_segments(&st.name, s.tol.dist, hits)
            }
            (BotMode::Solid, _) => oriented_segments(&st.name, s.tol.dist, hits),
        })
    }

    /// Oriented solids report the stored outward normal. Everything else
    /// has no reliable inside, so the normal is turned to oppose the ray
    /// at entry and follow it at exit.
    fn norm(&self, st: &SolidTab, hit: &Hit, ray: &Ray) -> Result<HitNormal> {
        let s = st.as_bot()?;
        let n = facet_of(st, hit)?.normal;
        let oriented = s.mode == BotMode::Solid && s.orientation != BotOrientation::Unoriented;
        let normal = if oriented {
            n
        } else {
            match hit.side {
                HitSide::Entry if hit.cos > 0.0 => -n,
                HitSide::Exit if hit.cos < 0.0 => -n,
                _ => n,
            }
        };
        Ok(HitNormal {
            point: hit.point(ray),
            normal,
        })
    }

    fn curve(&self, st: &SolidTab, _hit: &Hit, normal: &HitNormal) -> Result<Curvature> {
        st.as_bot()?;
        Ok(flat_curvature(normal))
    }

    fn uv(&self, st: &SolidTab, _hit: &Hit, _ray: &Ray) -> Result<UvCoord> {
        st.as_bot()?;
        Ok(UvCoord {
            u: 0.0,
            v: 0.0,
            du: 0.0,
            dv: 0.0,
        })
    }

    fn class(&self, st: &SolidTab, bbox: &Aabb3, tol: &Tolerance) -> Result<Classification> {
        st.as_bot()?;
        Ok(bbox_class(st, bbox, tol))
    }

    fn free(&self, st: SolidTab) -> Result<()> {
        let s = st.as_bot()?;
        debug!(solid = %st.name, nfacets = s.facets.len(), "bot freed");
        Ok(())
    }

    fn plot(&self, ip: &Internal, _tol: &Tolerance) -> Result<Vec<VlistCmd>> {
        Ok(valid_bot(ip)?.plot())
    }

    fn tessellate(&self, ip: &Internal, tol: &Tolerance) -> Result<TriangleMesh> {
        Ok(valid_bot(ip)?.tessellate(tol))
    }

    fn import(&self, rec: &ExternalRecord, mat: &Transform) -> Result<Internal> {
        match rec {
            ExternalRecord::Bot(r) => Ok(Internal::Bot(BotInternal::import(r, mat)?)),
            _ => Err(wrong_record(rec, SolidType::Bot)),
        }
    }

    fn export(&self, ip: &Internal, local2mm: f64) -> Result<ExternalRecord> {
        Ok(ExternalRecord::Bot(expect_bot(ip)?.export(local2mm)?))
    }

    fn describe(&self, ip: &Internal, verbose: bool, mm2local: f64) -> Result<String> {
        Ok(valid_bot(ip)?.describe(verbose, mm2local))
    }

    fn xform(&self, ip: &Internal, mat: &Transform) -> Result<Internal> {
        Ok(Internal::Bot(valid_bot(ip)?.transform(mat)))
    }

    fn bbox(&self, ip: &Internal) -> Result<Aabb3> {
        Ok(valid_bot(ip)?.bbox())
    }

    fn volume(&self, ip: &Internal) -> Result<f64> {
        Ok(valid_bot(ip)?.volume())
    }
}

/// One segment per hit: the face's thickness along the line of sight,
/// appended beyond the hit or centered on it.
fn plate_segments(s: &BotSpecific, hits: &[Hit]) -> Vec<Segment> {
    hits.iter()
        .map(|hit| {
            let face = hit.surf.unwrap_or(0);
            let t = s.thickness.get(face).copied().unwrap_or(0.0);
            let los = match s.mode {
                BotMode::PlateNoCos => t,
                _ => t / hit.cos.abs().max(s.tol.perp),
            };
            let start = if s.face_mode.is_appended(face) {
                hit.dist
            } else {
                hit.dist - los * 0.5
            };
            Segment::new(hit.at_dist(start), hit.at_dist(start + los))
        })
        .collect()
}

/// Pair hits without regard to facing.
///
/// A lone raw hit is a grazing touch and becomes a zero-length segment.
/// Otherwise hits closer than `tol` collapse to the later one; one hit
/// left after that is a miss, and an odd trailing hit is dropped.
fn unoriented_segments(name: &str, tol: f64, mut hits: Vec<Hit>) -> Vec<Segment> {
    if hits.len() == 1 {
        return vec![Segment::point(hits[0])];
    }

    let mut i = 0;
    while i + 1 < hits.len() {
        if (hits[i + 1].dist - hits[i].dist).abs() < tol {
            hits.remove(i);
        } else {
            i += 1;
        }
    }

    if hits.len() == 1 {
        return Vec::new();
    }
    if hits.len() % 2 != 0 {
        if note(Anomaly::DroppedHit) {
            warn!(
                solid = %name,
                nhits = hits.len(),
                dist = hits[hits.len() - 1].dist,
                "odd number of hits, last hit dropped"
            );
        }
        hits.pop();
    }
    pair(&hits)
}

/// Pair hits of an oriented solid, repairing the entry/exit sequence.
///
/// 1. Hits closer than `tol` with the same facing collapse to the later
///    one, so a ray through a shared edge counts once.
/// 2. A single remaining hit is a miss.
/// 3. An odd count with more than two hits is scanned from a notional
///    exit: two exits in a row get an entry copied from the second exit
///    inserted before it, and two entries in a row get an exit copied
///    from the first entry inserted after it.
/// 4. Still odd: the last hit is duplicated with its side flipped.
fn oriented_segments(name: &str, tol: f64, mut hits: Vec<Hit>) -> Vec<Segment> {
    let mut i = 0;
    while i + 1 < hits.len() {
        if hits[i].side == hits[i + 1].side && (hits[i + 1].dist - hits[i].dist).abs() < tol {
            hits.remove(i);
        } else {
            i += 1;
        }
    }

    if hits.len() == 1 {
        return Vec::new();
    }

    if hits.len() % 2 != 0 {
        if note(Anomaly::OddHits) {
            let dists: Vec<f64> = hits.iter().map(|h| h.dist).collect();
            warn!(solid = %name, nhits = hits.len(), ?dists, "odd number of hits, repairing");
        }

        if hits.len() > 2 {
            let mut prev_exit = true;
            let mut i = 0;
            while i < hits.len() {
                let entering = hits[i].side == HitSide::Entry;
                if !entering && prev_exit {
                    let fake = hits[i].fictitious_as(HitSide::Entry);
                    hits.insert(i, fake);
                    log_fictitious(name, &fake);
                    prev_exit = false;
                } else if entering && !prev_exit {
                    let fake = hits[i - 1].fictitious_as(HitSide::Exit);
                    hits.insert(i, fake);
                    log_fictitious(name, &fake);
                    prev_exit = true;
                } else {
                    prev_exit = !entering;
                }
                i += 1;
            }
        }

        if hits.len() % 2 != 0 {
            let last = hits[hits.len() - 1];
            let fake = last.fictitious_as(last.side.flip());
            log_fictitious(name, &fake);
            hits.push(fake);
        }
    }

    pair(&hits)
}

fn log_fictitious(name: &str, hit: &Hit) {
    if note(Anomaly::FictitiousHit) {
        warn!(solid = %name, dist = hit.dist, side = ?hit.side, "inserted fictitious hit");
    }
}

fn pair(hits: &[Hit]) -> Vec<Segment> {
    hits.chunks_exact(2)
        .map(|p| Segment::new(p[0], p[1]))
        .collect()
}
