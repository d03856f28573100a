//! Arbitrary regular solid (ARS): a surface ruled between stacked closed
//! polylines ("curves") of equal point count.

use faceted_kernel_math::{Point3, Tolerance, Transform, Vec3};
use serde::{Deserialize, Serialize};

use crate::bbox::Aabb3;
use crate::error::{GeomError, Result};
use crate::mesh::{plot_polygon, signed_volume6, triangle_is_degenerate, TriangleMesh, VlistCmd};

/// An ARS as decoded from the database.
///
/// `curves[0][0]` is an absolute position; every other value is an offset
/// from it. The closing point of each curve is implied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArsRecord {
    /// Curve points, one inner vector per curve.
    pub curves: Vec<Vec<[f64; 3]>>,
}

/// An ARS in model space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArsInternal {
    /// Absolute curve points. Each curve carries its first point again at
    /// the end, so it has `pts_per_curve() + 1` entries.
    pub curves: Vec<Vec<Point3>>,
}

impl ArsInternal {
    /// Decode a record, placing it with `mat`.
    ///
    /// The first point is transformed as a point; the rest are rotated as
    /// offsets and added to it.
    pub fn import(rec: &ArsRecord, mat: &Transform) -> Result<Self> {
        if rec.curves.len() < 2 {
            return Err(GeomError::TooFewCurves(rec.curves.len()));
        }
        let pts = rec.curves[0].len();
        if pts == 0 {
            return Err(GeomError::CurveLength {
                curve: 0,
                found: 0,
                expected: 1,
            });
        }

        let base = mat.apply_point(&Point3::from(rec.curves[0][0]));
        let mut curves = Vec::with_capacity(rec.curves.len());
        for (i, raw) in rec.curves.iter().enumerate() {
            if raw.len() != pts {
                return Err(GeomError::CurveLength {
                    curve: i,
                    found: raw.len(),
                    expected: pts,
                });
            }
            let mut curve: Vec<Point3> = raw
                .iter()
                .enumerate()
                .map(|(j, v)| {
                    if i == 0 && j == 0 {
                        base
                    } else {
                        base + mat.apply_vec(&Vec3::from(*v))
                    }
                })
                .collect();
            curve.push(curve[0]);
            curves.push(curve);
        }

        Ok(Self { curves })
    }

    /// Encode back to record form, scaling by `local2mm`.
    pub fn export(&self, local2mm: f64) -> Result<ArsRecord> {
        self.validate()?;
        let base = self.curves[0][0];
        let pts = self.pts_per_curve();
        let curves = self
            .curves
            .iter()
            .enumerate()
            .map(|(i, curve)| {
                curve[..pts]
                    .iter()
                    .enumerate()
                    .map(|(j, p)| {
                        let v = if i == 0 && j == 0 {
                            p.coords * local2mm
                        } else {
                            (p - base) * local2mm
                        };
                        [v.x, v.y, v.z]
                    })
                    .collect()
            })
            .collect();
        Ok(ArsRecord { curves })
    }

    /// Check the curve layout an in-memory ARS must have before prep.
    pub fn validate(&self) -> Result<()> {
        if self.curves.len() < 2 {
            return Err(GeomError::TooFewCurves(self.curves.len()));
        }
        let expected = self.curves[0].len();
        if expected < 2 {
            return Err(GeomError::CurveLength {
                curve: 0,
                found: expected,
                expected: 2,
            });
        }
        for (i, c) in self.curves.iter().enumerate() {
            if c.len() != expected {
                return Err(GeomError::CurveLength {
                    curve: i,
                    found: c.len(),
                    expected,
                });
            }
        }
        Ok(())
    }

    /// Number of distinct points on each curve.
    pub fn pts_per_curve(&self) -> usize {
        self.curves.first().map_or(0, |c| c.len().saturating_sub(1))
    }

    /// The two triangles of every quad between adjacent curves, in prep
    /// order. Their `(b - a) x (c - a)` normals point into the solid.
    /// Degenerate triangles (at curve apexes) are included.
    pub fn quad_triangles(&self) -> Vec<[Point3; 3]> {
        let pts = self.pts_per_curve();
        let mut out = Vec::with_capacity(self.curves.len().saturating_sub(1) * pts * 2);
        for pair in self.curves.windows(2) {
            let (lo, hi) = (&pair[0], &pair[1]);
            for j in 0..pts {
                out.push([lo[j], hi[j], lo[j + 1]]);
                out.push([hi[j], hi[j + 1], lo[j + 1]]);
            }
        }
        out
    }

    /// Apply a placement to every point.
    pub fn transform(&self, mat: &Transform) -> Self {
        Self {
            curves: self
                .curves
                .iter()
                .map(|c| c.iter().map(|p| mat.apply_point(p)).collect())
                .collect(),
        }
    }

    /// Bounding box of every curve point.
    pub fn bbox(&self) -> Aabb3 {
        Aabb3::from_points(self.curves.iter().flatten())
    }

    /// Enclosed volume, assuming the curves close off the solid.
    pub fn volume(&self) -> f64 {
        let sum: f64 = self
            .quad_triangles()
            .iter()
            .map(|[a, b, c]| signed_volume6(a, b, c))
            .sum();
        (sum / 6.0).abs()
    }

    /// Wireframe: every curve, then the rulings joining point `j` of each
    /// curve to point `j` of the next.
    pub fn plot(&self) -> Vec<VlistCmd> {
        let pts = self.pts_per_curve();
        let mut vlist = Vec::new();
        for curve in &self.curves {
            plot_polygon(&mut vlist, &curve[..pts]);
        }
        for j in 0..pts {
            for (i, curve) in self.curves.iter().enumerate() {
                vlist.push(if i == 0 {
                    VlistCmd::Move(curve[j])
                } else {
                    VlistCmd::Draw(curve[j])
                });
            }
        }
        vlist
    }

    /// Triangulate with outward (counter-clockwise) winding, dropping
    /// degenerate quads halves.
    pub fn tessellate(&self, tol: &Tolerance) -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        for [a, b, c] in self.quad_triangles() {
            if !triangle_is_degenerate(&a, &b, &c, tol.dist) {
                mesh.push_triangle(&a, &c, &b);
            }
        }
        mesh
    }

    /// Human-readable summary, lengths scaled by `mm2local`.
    pub fn describe(&self, verbose: bool, mm2local: f64) -> String {
        let mut s = String::from("arbitrary rectangular solid (ARS)\n");
        s.push_str(&format!(
            "\t{} curves, {} points per curve\n",
            self.curves.len(), self.pts_per_curve()
        ));
        if verbose {
            let pts = self.pts_per_curve();
            for (i, curve) in self.curves.iter().enumerate() {
                s.push_str(&format!("\tcurve {}:\n", i));
                for p in &curve[..pts] {
                    let p = p.coords * mm2local;
                    s.push_str(&format!("\t\t({} {} {})\n", p.x, p.y, p.z));
                }
            }
        }
        s
    }
}
