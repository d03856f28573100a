//! Polygonal solid (PG): a list of small planar faces, each with three to
//! five vertices and an optional normal per vertex.

use faceted_kernel_math::{Point3, Tolerance, Transform, Vec3};
use serde::{Deserialize, Serialize};

use crate::bbox::Aabb3;
use crate::error::{GeomError, Result};
use crate::mesh::{plot_polygon, signed_volume6, triangle_is_degenerate, TriangleMesh, VlistCmd};

/// Identifier byte of a PG header record.
pub const ID_P_HEAD: u8 = b'P';

/// Identifier byte of a PG face record.
pub const ID_P_DATA: u8 = b'Q';

/// Fewest vertices a face may have.
pub const MIN_FACE_VERTS: usize = 3;

/// Most vertices a face may have.
pub const MAX_FACE_VERTS: usize = 5;

/// A decoded PG header plus its face records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PgRecord {
    /// Header identifier, [`ID_P_HEAD`] when well formed.
    pub id: u8,
    /// Face records in database order.
    pub faces: Vec<PgFaceRecord>,
}

/// One decoded PG face record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PgFaceRecord {
    /// Record identifier, [`ID_P_DATA`] when well formed.
    pub id: u8,
    /// Face vertices.
    pub verts: Vec<[f64; 3]>,
    /// Face normal as stored; may be zero.
    pub normal: [f64; 3],
    /// Per-vertex normals, either empty or one per vertex.
    pub vertex_normals: Vec<[f64; 3]>,
}

/// One face of a PG in model space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PgFace {
    /// Face vertices, counter-clockwise seen from outside.
    pub verts: Vec<Point3>,
    /// Outward face normal; zero when the record carried none.
    pub normal: Vec3,
    /// Per-vertex normals, either empty or one per vertex.
    pub vertex_normals: Vec<Vec3>,
}

/// One fan triangle of a PG face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PgTriangle {
    /// Triangle corners.
    pub pts: [Point3; 3],
    /// The owning face's normal.
    pub normal: Vec3,
    /// Corner normals, when the face carries per-vertex normals.
    pub vertex_normals: Option<[Vec3; 3]>,
}

/// A PG in model space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PgInternal {
    /// Faces in database order.
    pub faces: Vec<PgFace>,
}

impl PgInternal {
    /// Decode a record, placing it with `mat`.
    pub fn import(rec: &PgRecord, mat: &Transform) -> Result<Self> {
        if rec.id != ID_P_HEAD {
            return Err(GeomError::BadRecordId {
                kind: "poly",
                found: rec.id,
                expected: ID_P_HEAD,
            });
        }
        let faces = rec
            .faces
            .iter()
            .enumerate()
            .map(|(i, f)| {
                if f.id != ID_P_DATA {
                    return Err(GeomError::BadRecordId {
                        kind: "poly",
                        found: f.id,
                        expected: ID_P_DATA,
                    });
                }
                let face = PgFace {
                    verts: f
                        .verts
                        .iter()
                        .map(|v| mat.apply_point(&Point3::from(*v)))
                        .collect(),
                    normal: mat.apply_normal(&Vec3::from(f.normal)),
                    vertex_normals: f
                        .vertex_normals
                        .iter()
                        .map(|n| mat.apply_normal(&Vec3::from(*n)))
                        .collect(),
                };
                check_face(i, &face)?;
                Ok(face)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { faces })
    }

    /// Encode back to record form, scaling positions by `local2mm`.
    pub fn export(&self, local2mm: f64) -> Result<PgRecord> {
        self.validate()?;
        let arr = |v: &Vec3| [v.x, v.y, v.z];
        Ok(PgRecord {
            id: ID_P_HEAD,
            faces: self
                .faces
                .iter()
                .map(|f| PgFaceRecord {
                    id: ID_P_DATA,
                    verts: f.verts.iter().map(|p| arr(&(p.coords * local2mm))).collect(),
                    normal: arr(&f.normal),
                    vertex_normals: f.vertex_normals.iter().map(arr).collect(),
                })
                .collect(),
        })
    }

    /// Check every face's vertex and normal counts.
    pub fn validate(&self) -> Result<()> {
        self.faces
            .iter()
            .enumerate()
            .try_for_each(|(i, f)| check_face(i, f))
    }

    /// Fan-triangulate every face as `(v0, v[i-1], v[i])`.
    pub fn fan_triangles(&self) -> Vec<PgTriangle> {
        let mut out = Vec::new();
        for face in &self.faces {
            for i in 2..face.verts.len() {
                let vertex_normals = if face.vertex_normals.len() == face.verts.len() {
                    Some([
                        face.vertex_normals[0],
                        face.vertex_normals[i - 1],
                        face.vertex_normals[i],
                    ])
                } else {
                    None
                };
                out.push(PgTriangle {
                    pts: [face.verts[0], face.verts[i - 1], face.verts[i]],
                    normal: face.normal,
                    vertex_normals,
                });
            }
        }
        out
    }

    /// Apply a placement; normals go through the inverse transpose.
    pub fn transform(&self, mat: &Transform) -> Self {
        Self {
            faces: self
                .faces
                .iter()
                .map(|f| PgFace {
                    verts: f.verts.iter().map(|p| mat.apply_point(p)).collect(),
                    normal: mat.apply_normal(&f.normal),
                    vertex_normals: f.vertex_normals.iter().map(|n| mat.apply_normal(n)).collect(),
                })
                .collect(),
        }
    }

    /// Bounding box of every face vertex.
    pub fn bbox(&self) -> Aabb3 {
        Aabb3::from_points(self.faces.iter().flat_map(|f| f.verts.iter()))
    }

    /// Enclosed volume, assuming the faces close off the solid.
    pub fn volume(&self) -> f64 {
        let sum: f64 = self
            .fan_triangles()
            .iter()
            .map(|t| signed_volume6(&t.pts[0], &t.pts[1], &t.pts[2]))
            .sum();
        (sum / 6.0).abs()
    }

    /// Wireframe: one closed outline per face.
    pub fn plot(&self) -> Vec<VlistCmd> {
        let mut vlist = Vec::new();
        for face in &self.faces {
            plot_polygon(&mut vlist, &face.verts);
        }
        vlist
    }

    /// Triangulate, dropping degenerate fan triangles.
    pub fn tessellate(&self, tol: &Tolerance) -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        for t in self.fan_triangles() {
            let [a, b, c] = t.pts;
            if !triangle_is_degenerate(&a, &b, &c, tol.dist) {
                mesh.push_triangle(&a, &b, &c);
            }
        }
        mesh
    }

    /// Human-readable summary, lengths scaled by `mm2local`.
    pub fn describe(&self, verbose: bool, mm2local: f64) -> String {
        let mut s = String::from("polygonal solid with fixed-size faces (POLY)\n");
        s.push_str(&format!("\t{} faces\n", self.faces.len()));
        if verbose {
            for (i, face) in self.faces.iter().enumerate() {
                s.push_str(&format!("\tface {} ({} vertices):\n", i, face.verts.len()));
                for p in &face.verts {
                    let p = p.coords * mm2local;
                    s.push_str(&format!("\t\t({} {} {})\n", p.x, p.y, p.z));
                }
                let n = face.normal;
                s.push_str(&format!("\t\tnormal ({} {} {})\n", n.x, n.y, n.z));
            }
        }
        s
    }
}

fn check_face(i: usize, face: &PgFace) -> Result<()> {
    let n = face.verts.len();
    if !(MIN_FACE_VERTS..=MAX_FACE_VERTS).contains(&n) {
        return Err(GeomError::VertexCount { face: i, count: n });
    }
    if !face.vertex_normals.is_empty() && face.vertex_normals.len() != n {
        return Err(GeomError::NormalCount {
            face: i,
            normals: face.vertex_normals.len(),
            vertices: n,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(verts: [[f64; 3]; 4], normal: [f64; 3]) -> PgFaceRecord {
        PgFaceRecord {
            id: ID_P_DATA,
            verts: verts.to_vec(),
            normal,
            vertex_normals: Vec::new(),
        }
    }

    /// Unit cube with outward quads.
    fn cube_record() -> PgRecord {
        let v = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ];
        let q = |a: usize, b: usize, c: usize, d: usize, n: [f64; 3]| quad([v[a], v[b], v[c], v[d]], n);
        PgRecord {
            id: ID_P_HEAD,
            faces: vec![
                q(0, 3, 2, 1, [0.0, 0.0, -1.0]),
                q(4, 5, 6, 7, [0.0, 0.0, 1.0]),
                q(0, 1, 5, 4, [0.0, -1.0, 0.0]),
                q(2, 3, 7, 6, [0.0, 1.0, 0.0]),
                q(0, 4, 7, 3, [-1.0, 0.0, 0.0]),
                q(1, 2, 6, 5, [1.0, 0.0, 0.0]),
            ],
        }
    }

    #[test]
    fn test_import_cube() {
        let pg = PgInternal::import(&cube_record(), &Transform::identity()).unwrap();
        assert_eq!(pg.faces.len(), 6);
        assert_eq!(pg.fan_triangles().len(), 12);
        assert!((pg.volume() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_import_rejects_bad_header() {
        let mut rec = cube_record();
        rec.id = b'X';
        assert_eq!(
            PgInternal::import(&rec, &Transform::identity()),
            Err(GeomError::BadRecordId {
                kind: "poly",
                found: b'X',
                expected: ID_P_HEAD
            })
        );
    }

    #[test]
    fn test_import_rejects_bad_face_id() {
        let mut rec = cube_record();
        rec.faces[3].id = ID_P_HEAD;
        assert!(matches!(
            PgInternal::import(&rec, &Transform::identity()),
            Err(GeomError::BadRecordId { found: ID_P_HEAD, .. })
        ));
    }

    #[test]
    fn test_import_rejects_vertex_counts() {
        let mut rec = cube_record();
        rec.faces[1].verts.truncate(2);
        assert_eq!(
            PgInternal::import(&rec, &Transform::identity()),
            Err(GeomError::VertexCount { face: 1, count: 2 })
        );

        let mut rec = cube_record();
        rec.faces[0].verts.extend([[0.5, 0.5, 0.0]; 2]);
        assert_eq!(
            PgInternal::import(&rec, &Transform::identity()),
            Err(GeomError::VertexCount { face: 0, count: 6 })
        );
    }

    #[test]
    fn test_import_rejects_mismatched_normals() {
        let mut rec = cube_record();
        rec.faces[2].vertex_normals = vec![[0.0, -1.0, 0.0]; 3];
        assert!(matches!(
            PgInternal::import(&rec, &Transform::identity()),
            Err(GeomError::NormalCount { face: 2, normals: 3, vertices: 4 })
        ));
    }

    #[test]
    fn test_fan_shares_first_vertex() {
        let pg = PgInternal::import(&cube_record(), &Transform::identity()).unwrap();
        let tris = pg.fan_triangles();
        assert_eq!(tris[0].pts[0], tris[1].pts[0]);
        assert_eq!(tris[0].pts[2], tris[1].pts[1]);
        for t in &tris {
            let wn = (t.pts[1] - t.pts[0]).cross(&(t.pts[2] - t.pts[0]));
            assert!(wn.dot(&t.normal) > 0.0);
        }
    }

    #[test]
    fn test_transform_moves_points_keeps_normals() {
        let pg = PgInternal::import(&cube_record(), &Transform::identity()).unwrap();
        let moved = pg.transform(&Transform::translation(0.0, 0.0, 5.0));
        assert_eq!(moved.faces[0].verts[0], Point3::new(0.0, 0.0, 5.0));
        assert!((moved.faces[0].normal - Vec3::new(0.0, 0.0, -1.0)).norm() < 1e-12);
        assert_eq!(moved.bbox().min.z, 5.0);
    }

    #[test]
    fn test_export_scales_points() {
        let pg = PgInternal::import(&cube_record(), &Transform::identity()).unwrap();
        let rec = pg.export(2.0).unwrap();
        assert_eq!(rec.id, ID_P_HEAD);
        assert_eq!(rec.faces[1].verts[2], [2.0, 2.0, 2.0]);
        assert_eq!(rec.faces[1].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_plot_tessellate_describe() {
        let pg = PgInternal::import(&cube_record(), &Transform::identity()).unwrap();
        assert_eq!(pg.plot().len(), 6 * 5);
        assert_eq!(pg.tessellate(&Tolerance::DEFAULT).num_triangles(), 12);
        assert!(pg.describe(false, 1.0).contains("6 faces"));
    }
}
