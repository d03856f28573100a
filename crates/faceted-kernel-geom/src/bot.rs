//! Bag of triangles (BOT): an indexed triangle mesh read as a closed solid,
//! a thick plate, or a bare surface.

use std::collections::HashMap;
use std::fmt;

use faceted_kernel_math::{Point3, Tolerance, Transform};
use serde::{Deserialize, Serialize};

use crate::bbox::Aabb3;
use crate::error::{GeomError, Result};
use crate::mesh::{
    plot_polygon, signed_volume6, triangle_area, triangle_is_degenerate, TriangleMesh, VlistCmd,
};

/// How the triangles of a BOT are interpreted by the tracer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BotMode {
    /// Every hit is a zero-thickness segment.
    Surface,
    /// The triangles bound a closed volume.
    Solid,
    /// Each triangle is a plate whose thickness grows with obliquity.
    Plate,
    /// Each triangle is a plate of fixed line-of-sight thickness.
    PlateNoCos,
}

impl BotMode {
    /// Database code of this mode.
    pub fn code(self) -> u8 {
        match self {
            BotMode::Surface => 1,
            BotMode::Solid => 2,
            BotMode::Plate => 3,
            BotMode::PlateNoCos => 4,
        }
    }

    /// True for the two plate modes.
    pub fn is_plate(self) -> bool {
        matches!(self, BotMode::Plate | BotMode::PlateNoCos)
    }
}

impl TryFrom<u8> for BotMode {
    type Error = GeomError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            1 => Ok(BotMode::Surface),
            2 => Ok(BotMode::Solid),
            3 => Ok(BotMode::Plate),
            4 => Ok(BotMode::PlateNoCos),
            _ => Err(GeomError::UnknownCode { field: "mode", code }),
        }
    }
}

impl fmt::Display for BotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BotMode::Surface => "surface",
            BotMode::Solid => "solid",
            BotMode::Plate => "plate",
            BotMode::PlateNoCos => "plate (no obliquity)",
        })
    }
}

/// Vertex winding of a BOT's faces, seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BotOrientation {
    /// No consistent winding.
    Unoriented,
    /// Counter-clockwise.
    Ccw,
    /// Clockwise.
    Cw,
}

impl BotOrientation {
    /// Database code of this orientation.
    pub fn code(self) -> u8 {
        match self {
            BotOrientation::Unoriented => 1,
            BotOrientation::Ccw => 2,
            BotOrientation::Cw => 3,
        }
    }
}

impl TryFrom<u8> for BotOrientation {
    type Error = GeomError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            1 => Ok(BotOrientation::Unoriented),
            2 => Ok(BotOrientation::Ccw),
            3 => Ok(BotOrientation::Cw),
            _ => Err(GeomError::UnknownCode {
                field: "orientation",
                code,
            }),
        }
    }
}

impl fmt::Display for BotOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BotOrientation::Unoriented => "unoriented",
            BotOrientation::Ccw => "counter-clockwise",
            BotOrientation::Cw => "clockwise",
        })
    }
}

/// Per-face plate placement: `true` appends the plate beyond the hit
/// point, `false` centers it on the hit point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceModes(pub Vec<bool>);

impl FaceModes {
    /// All faces centered.
    pub fn centered(num_faces: usize) -> Self {
        Self(vec![false; num_faces])
    }

    /// True when face `i` is appended. Faces past the end are centered.
    pub fn is_appended(&self, i: usize) -> bool {
        self.0.get(i).copied().unwrap_or(false)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A BOT as decoded from the database: raw codes and signed indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotRecord {
    /// [`BotMode`] code.
    pub mode: u8,
    /// [`BotOrientation`] code.
    pub orientation: u8,
    /// Error-handling mode, carried through untouched.
    pub error_mode: u8,
    /// Vertex positions.
    pub vertices: Vec<[f64; 3]>,
    /// Vertex index triples.
    pub faces: Vec<[i64; 3]>,
    /// Per-face plate thickness; empty outside the plate modes.
    pub thickness: Vec<f64>,
    /// Per-face appended flag; empty means every face is centered.
    pub face_mode: Vec<bool>,
}

/// A BOT in model space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotInternal {
    /// Interpretation mode.
    pub mode: BotMode,
    /// Face winding.
    pub orientation: BotOrientation,
    /// Error-handling mode, carried through untouched.
    pub error_mode: u8,
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex index triples.
    pub faces: Vec<[usize; 3]>,
    /// Per-face plate thickness, present for the plate modes.
    pub thickness: Option<Vec<f64>>,
    /// Per-face plate placement; `None` means every face is centered.
    pub face_mode: Option<FaceModes>,
}

impl BotInternal {
    /// Decode a record, placing its vertices with `mat`.
    pub fn import(rec: &BotRecord, mat: &Transform) -> Result<Self> {
        let num_vertices = rec.vertices.len();
        let faces = rec
            .faces
            .iter()
            .enumerate()
            .map(|(face, tri)| {
                let mut out = [0usize; 3];
                for (slot, &index) in out.iter_mut().zip(tri) {
                    *slot = usize::try_from(index)
                        .ok()
                        .filter(|&i| i < num_vertices)
                        .ok_or(GeomError::FaceIndex {
                            face,
                            index,
                            num_vertices,
                        })?;
                }
                Ok(out)
            })
            .collect::<Result<Vec<_>>>()?;

        let bot = Self {
            mode: BotMode::try_from(rec.mode)?,
            orientation: BotOrientation::try_from(rec.orientation)?,
            error_mode: rec.error_mode,
            vertices: rec
                .vertices
                .iter()
                .map(|v| mat.apply_point(&Point3::from(*v)))
                .collect(),
            faces,
            thickness: (!rec.thickness.is_empty()).then(|| rec.thickness.clone()),
            face_mode: (!rec.face_mode.is_empty()).then(|| FaceModes(rec.face_mode.clone())),
        };
        bot.validate()?;
        Ok(bot)
    }

    /// Encode back to record form, scaling lengths by `local2mm`.
    pub fn export(&self, local2mm: f64) -> Result<BotRecord> {
        self.validate()?;
        Ok(BotRecord {
            mode: self.mode.code(),
            orientation: self.orientation.code(),
            error_mode: self.error_mode,
            vertices: self
                .vertices
                .iter()
                .map(|p| {
                    let v = p.coords * local2mm;
                    [v.x, v.y, v.z]
                })
                .collect(),
            faces: self
                .faces
                .iter()
                .map(|f| [f[0] as i64, f[1] as i64, f[2] as i64])
                .collect(),
            thickness: self
                .thickness
                .as_ref()
                .map(|t| t.iter().map(|x| x * local2mm).collect())
                .unwrap_or_default(),
            face_mode: self
                .face_mode
                .as_ref()
                .map(|m| m.0.clone())
                .unwrap_or_default(),
        })
    }

    /// Check indices and per-face array lengths.
    pub fn validate(&self) -> Result<()> {
        let num_vertices = self.vertices.len();
        for (face, tri) in self.faces.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i >= num_vertices) {
                return Err(GeomError::FaceIndex {
                    face,
                    index: index as i64,
                    num_vertices,
                });
            }
        }
        let num_faces = self.faces.len();
        match &self.thickness {
            None if self.mode.is_plate() => return Err(GeomError::MissingThickness),
            Some(t) if t.len() != num_faces => {
                return Err(GeomError::PerFaceLength {
                    field: "thickness",
                    found: t.len(),
                    num_faces,
                })
            }
            _ => {}
        }
        if let Some(m) = &self.face_mode {
            if m.len() != num_faces {
                return Err(GeomError::PerFaceLength {
                    field: "face_mode",
                    found: m.len(),
                    num_faces,
                });
            }
        }
        Ok(())
    }

    /// Corners of face `i` in stored order.
    pub fn face_points(&self, i: usize) -> [Point3; 3] {
        let [a, b, c] = self.faces[i];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    /// Plate thickness of face `i`, zero outside the plate modes.
    pub fn face_thickness(&self, i: usize) -> f64 {
        self.thickness
            .as_ref()
            .and_then(|t| t.get(i).copied())
            .unwrap_or(0.0)
    }

    /// True when face `i`'s plate is appended beyond the hit point.
    pub fn face_appended(&self, i: usize) -> bool {
        self.face_mode.as_ref().is_some_and(|m| m.is_appended(i))
    }

    /// Apply a placement to every vertex.
    pub fn transform(&self, mat: &Transform) -> Self {
        Self {
            vertices: self.vertices.iter().map(|p| mat.apply_point(p)).collect(),
            ..self.clone()
        }
    }

    /// Extent of the referenced vertices. Plate faces grow the box along
    /// their normal by the full thickness when appended and by 0.51 of it
    /// when centered.
    pub fn bbox(&self) -> Aabb3 {
        let mut aabb = Aabb3::empty();
        for i in 0..self.faces.len() {
            let pts = self.face_points(i);
            for p in &pts {
                aabb.include_point(p);
            }
            if !self.mode.is_plate() {
                continue;
            }
            let wn = (pts[1] - pts[0]).cross(&(pts[2] - pts[0]));
            let len = wn.norm();
            if len < f64::EPSILON {
                continue;
            }
            let t = self.face_thickness(i);
            let grow = if self.face_appended(i) { t } else { 0.51 * t };
            let off = wn * (grow / len);
            for p in &pts {
                aabb.include_point(&(p + off));
                aabb.include_point(&(p - off));
            }
        }
        aabb
    }

    /// Material volume: enclosed volume for solids, area times thickness
    /// for plates, zero for surfaces.
    pub fn volume(&self) -> f64 {
        match self.mode {
            BotMode::Surface => 0.0,
            BotMode::Solid => {
                let sum: f64 = (0..self.faces.len())
                    .map(|i| {
                        let [a, b, c] = self.face_points(i);
                        signed_volume6(&a, &b, &c)
                    })
                    .sum();
                (sum / 6.0).abs()
            }
            BotMode::Plate | BotMode::PlateNoCos => (0..self.faces.len())
                .map(|i| {
                    let [a, b, c] = self.face_points(i);
                    triangle_area(&a, &b, &c) * self.face_thickness(i)
                })
                .sum(),
        }
    }

    /// Wireframe: one closed outline per face.
    pub fn plot(&self) -> Vec<VlistCmd> {
        let mut vlist = Vec::new();
        for i in 0..self.faces.len() {
            plot_polygon(&mut vlist, &self.face_points(i));
        }
        vlist
    }

    /// Triangulate with counter-clockwise winding, dropping degenerate
    /// faces.
    pub fn tessellate(&self, tol: &Tolerance) -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        for i in 0..self.faces.len() {
            let [a, b, c] = self.face_points(i);
            if triangle_is_degenerate(&a, &b, &c, tol.dist) {
                continue;
            }
            if self.orientation == BotOrientation::Cw {
                mesh.push_triangle(&a, &c, &b);
            } else {
                mesh.push_triangle(&a, &b, &c);
            }
        }
        mesh
    }

    /// Human-readable summary, lengths scaled by `mm2local`.
    pub fn describe(&self, verbose: bool, mm2local: f64) -> String {
        let mut s = String::from("bag of triangles (BOT)\n");
        s.push_str(&format!(
            "\t{} vertices, {} faces ({}, {})\n",
            self.vertices.len(), self.faces.len(), self.mode, self.orientation
        ));
        if verbose {
            for i in 0..self.faces.len() {
                let [a, b, c] = self.face_points(i).map(|p| p.coords * mm2local);
                s.push_str(&format!(
                    "\tface {}: ({} {} {}), ({} {} {}), ({} {} {})",
                    i, a.x, a.y, a.z, b.x, b.y, b.z, c.x, c.y, c.z
                ));
                if self.mode.is_plate() {
                    let mode = if self.face_appended(i) {
                        "appended"
                    } else {
                        "centered"
                    };
                    s.push_str(&format!(
                        " thickness {} {}",
                        self.face_thickness(i) * mm2local, mode
                    ));
                }
                s.push('\n');
            }
        }
        s
    }

    /// Merge vertices with bit-identical coordinates, keeping the first of
    /// each group. Returns the number of vertices removed.
    pub fn vertex_fuse(&mut self) -> usize {
        let mut seen: HashMap<[u64; 3], usize> = HashMap::new();
        let mut remap = Vec::with_capacity(self.vertices.len());
        let mut kept = Vec::with_capacity(self.vertices.len());
        for p in &self.vertices {
            let key = [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()];
            let index = *seen.entry(key).or_insert_with(|| {
                kept.push(*p);
                kept.len() - 1
            });
            remap.push(index);
        }
        let removed = self.vertices.len() - kept.len();
        if removed > 0 {
            for f in &mut self.faces {
                for i in f.iter_mut() {
                    *i = remap[*i];
                }
            }
            self.vertices = kept;
        }
        removed
    }

    /// Drop faces that repeat an earlier face's vertex set. For oriented
    /// BOTs the winding must also match, and for plates the thickness and
    /// placement too. Returns the number of faces removed.
    pub fn face_fuse(&mut self) -> usize {
        let mut keep = vec![true; self.faces.len()];
        for i in 0..self.faces.len() {
            if !keep[i] {
                continue;
            }
            for j in i + 1..self.faces.len() {
                if keep[j] && self.same_face(i, j) {
                    keep[j] = false;
                }
            }
        }
        let removed = keep.iter().filter(|k| !**k).count();
        if removed > 0 {
            retain_flagged(&mut self.faces, &keep);
            if let Some(t) = &mut self.thickness {
                retain_flagged(t, &keep);
            }
            if let Some(m) = &mut self.face_mode {
                retain_flagged(&mut m.0, &keep);
            }
        }
        removed
    }

    fn same_face(&self, i: usize, j: usize) -> bool {
        let (a, b) = (self.faces[i], self.faces[j]);
        let mut sa = a;
        let mut sb = b;
        sa.sort_unstable();
        sb.sort_unstable();
        if sa != sb {
            return false;
        }
        if self.orientation != BotOrientation::Unoriented && !same_orientation(&a, &b) {
            return false;
        }
        if self.mode.is_plate() {
            let dt = self.face_thickness(i) - self.face_thickness(j);
            if dt != 0.0 || self.face_appended(i) != self.face_appended(j) {
                return false;
            }
        }
        true
    }

    /// Remove vertices no face references and renumber the faces. Returns
    /// the number of vertices removed.
    pub fn condense(&mut self) -> Result<usize> {
        self.validate()?;
        let mut used = vec![false; self.vertices.len()];
        for f in &self.faces {
            for &i in f {
                used[i] = true;
            }
        }
        let mut remap = vec![0usize; self.vertices.len()];
        let mut kept = Vec::with_capacity(self.vertices.len());
        for (i, p) in self.vertices.iter().enumerate() {
            if used[i] {
                remap[i] = kept.len();
                kept.push(*p);
            }
        }
        let removed = self.vertices.len() - kept.len();
        for f in &mut self.faces {
            for i in f.iter_mut() {
                *i = remap[*i];
            }
        }
        self.vertices = kept;
        Ok(removed)
    }
}

fn retain_flagged<T>(v: &mut Vec<T>, keep: &[bool]) {
    let mut flags = keep.iter();
    v.retain(|_| flags.next().copied().unwrap_or(true));
}

/// True when `b` is a cyclic rotation of `a`.
fn same_orientation(a: &[usize; 3], b: &[usize; 3]) -> bool {
    (0..3).any(|r| a[0] == b[r] && a[1] == b[(r + 1) % 3] && a[2] == b[(r + 2) % 3])
}
