//! Output forms for visualization and export collaborators: triangle meshes
//! and wireframe vector lists, plus the small triangle helpers shared by the
//! primitives.

use faceted_kernel_math::Point3;

/// Output triangle mesh for rendering and export.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Flat array of vertex positions: `[x0, y0, z0, x1, y1, z1, ...]` (f32).
    pub vertices: Vec<f32>,
    /// Flat array of triangle indices: `[i0, i1, i2, ...]` (u32).
    pub indices: Vec<u32>,
    /// Flat array of vertex normals: `[nx0, ny0, nz0, ...]` (f32). Same length as vertices.
    pub normals: Vec<f32>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Append one flat-shaded triangle wound `a, b, c`.
    pub fn push_triangle(&mut self, a: &Point3, b: &Point3, c: &Point3) {
        let n = (b - a).cross(&(c - a));
        let n = if n.norm() > 0.0 { n.normalize() } else { n };
        let base = self.num_vertices() as u32;
        for p in [a, b, c] {
            self.vertices
                .extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
            self.normals
                .extend_from_slice(&[n.x as f32, n.y as f32, n.z as f32]);
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
}

/// One pen command of a wireframe plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VlistCmd {
    /// Lift the pen and move to a point.
    Move(Point3),
    /// Draw a line from the current position to a point.
    Draw(Point3),
}

/// Append a closed outline through `points` to `vlist`.
pub fn plot_polygon<'a>(vlist: &mut Vec<VlistCmd>, points: impl IntoIterator<Item = &'a Point3>) {
    let mut first = None;
    for p in points {
        match first {
            None => {
                vlist.push(VlistCmd::Move(*p));
                first = Some(*p);
            }
            Some(_) => vlist.push(VlistCmd::Draw(*p)),
        }
    }
    if let Some(p) = first {
        vlist.push(VlistCmd::Draw(p));
    }
}

/// True when `a, b, c` do not span a usable triangle: any edge or the
/// cross product of the two edges from `a` is shorter than `tol`.
pub fn triangle_is_degenerate(a: &Point3, b: &Point3, c: &Point3, tol: f64) -> bool {
    let ba = b - a;
    let ca = c - a;
    ba.norm() < tol || ca.norm() < tol || (b - c).norm() < tol || ba.cross(&ca).norm() < tol
}

/// Six times the signed volume of the tetrahedron `(origin, a, b, c)`.
///
/// Summed over a closed, consistently wound mesh this gives six times the
/// enclosed volume, positive when the winding is counter-clockwise seen
/// from outside.
pub fn signed_volume6(a: &Point3, b: &Point3, c: &Point3) -> f64 {
    a.coords.dot(&b.coords.cross(&c.coords))
}

/// Area of triangle `a, b, c`.
pub fn triangle_area(a: &Point3, b: &Point3, c: &Point3) -> f64 {
    0.5 * (b - a).cross(&(c - a)).norm()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_triangle() {
        let mut mesh = TriangleMesh::new();
        mesh.push_triangle(
            &Point3::origin(),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        );
        assert_eq!(mesh.num_triangles(), 1);
        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(&mesh.normals[0..3], &[0.0, 0.0, 1.0]);
        assert_eq!(&mesh.vertices[3..6], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_plot_polygon_closes_loop() {
        let pts = [
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mut vlist = Vec::new();
        plot_polygon(&mut vlist, &pts);
        assert_eq!(vlist.len(), 4);
        assert_eq!(vlist[0], VlistCmd::Move(pts[0]));
        assert_eq!(vlist[3], VlistCmd::Draw(pts[0]));
    }

    #[test]
    fn test_collinear_is_degenerate() {
        let a = Point3::origin();
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(2.0, 0.0, 0.0);
        assert!(triangle_is_degenerate(&a, &b, &c, 1e-5));
        assert!(!triangle_is_degenerate(&a, &b, &Point3::new(0.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn test_signed_volume_of_unit_tetra() {
        let v = signed_volume6(
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
            &Point3::new(0.0, 0.0, 1.0),
        );
        assert!((v - 1.0).abs() < 1e-12);
    }
}
