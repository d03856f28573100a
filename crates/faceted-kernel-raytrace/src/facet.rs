//! Triangle facets and the facet builder shared by every faceted primitive.

use faceted_kernel_math::{Point3, Vec3};
use tracing::debug;

use crate::diag::{note, Anomaly};

/// Index of a facet within its primitive's [`FacetList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FacetId(pub usize);

/// A triangle prepared for ray intersection.
#[derive(Debug, Clone, PartialEq)]
pub struct Facet {
    /// First vertex.
    pub a: Point3,
    /// `B - A`.
    pub ba: Vec3,
    /// `C - A`.
    pub ca: Vec3,
    /// `BA x CA`, not normalized. The intersection test relies on this
    /// exact vector whatever the facet's orientation.
    pub wn: Vec3,
    /// Unit outward normal.
    pub normal: Vec3,
    /// Surface number (the BOT face index).
    pub surf: Option<usize>,
    /// Unit normals at `A`, `B`, `C` for smooth shading.
    pub vertex_normals: Option<[Vec3; 3]>,
}

impl Facet {
    /// Second vertex.
    pub fn b(&self) -> Point3 {
        self.a + self.ba
    }

    /// Third vertex.
    pub fn c(&self) -> Point3 {
        self.a + self.ca
    }

    /// The three corners.
    pub fn points(&self) -> [Point3; 3] {
        [self.a, self.b(), self.c()]
    }

    /// Normal at barycentric weights `(u, v)` of `B` and `C`. Blends the
    /// vertex normals when present.
    pub fn normal_at(&self, u: f64, v: f64) -> Vec3 {
        match &self.vertex_normals {
            Some([na, nb, nc]) => {
                let n = na * (1.0 - u - v) + nb * u + nc * v;
                let len = n.norm();
                if len > f64::EPSILON {
                    n / len
                } else {
                    self.normal
                }
            }
            None => self.normal,
        }
    }
}

/// How the builder derives a facet's outward normal from `wn`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FacetNormal {
    /// `unit(wn)`.
    Forward,
    /// `-unit(wn)`.
    Reversed,
    /// An externally computed normal, used when it is not degenerate;
    /// otherwise `unit(wn)`.
    Supplied(Vec3),
}

/// Everything the builder needs to make one facet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacetInput {
    /// Corners `A, B, C`.
    pub pts: [Point3; 3],
    /// Normal rule.
    pub normal: FacetNormal,
    /// Surface number.
    pub surf: Option<usize>,
    /// Corner normals.
    pub vertex_normals: Option<[Vec3; 3]>,
}

impl FacetInput {
    /// Corners with the forward normal rule and no extras.
    pub fn new(pts: [Point3; 3]) -> Self {
        Self {
            pts,
            normal: FacetNormal::Forward,
            surf: None,
            vertex_normals: None,
        }
    }

    /// Set the normal rule.
    pub fn normal(mut self, normal: FacetNormal) -> Self {
        self.normal = normal;
        self
    }

    /// Set the surface number.
    pub fn surf(mut self, surf: usize) -> Self {
        self.surf = Some(surf);
        self
    }

    /// Set corner normals.
    pub fn vertex_normals(mut self, normals: Option<[Vec3; 3]>) -> Self {
        self.vertex_normals = normals;
        self
    }
}

/// The facets owned by one prepared primitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetList {
    facets: Vec<Facet>,
}

impl FacetList {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append one facet.
    ///
    /// Returns 3 when the facet was added and 0 when it was rejected as
    /// degenerate: an edge, or the cross product of the edges from `A`,
    /// shorter than `tol`.
    pub fn add(&mut self, name: &str, input: FacetInput, tol: f64) -> usize {
        let [a, b, c] = input.pts;
        let ba = b - a;
        let ca = c - a;
        let wn = ba.cross(&ca);

        let too_short = |v: Vec3| v.norm() < tol;
        if too_short(ba) || too_short(ca) || too_short(b - c) || too_short(wn) {
            note(Anomaly::DegenerateFacet);
            debug!(solid = %name, ?a, ?b, ?c, "degenerate facet skipped");
            return 0;
        }

        let unit = wn / wn.norm();
        let normal = match input.normal {
            FacetNormal::Forward => unit,
            FacetNormal::Reversed => -unit,
            FacetNormal::Supplied(n) => {
                let len = n.norm();
                if len < tol {
                    unit
                } else {
                    n / len
                }
            }
        };

        self.facets.push(Facet {
            a,
            ba,
            ca,
            wn,
            normal,
            surf: input.surf,
            vertex_normals: input.vertex_normals,
        });
        3
    }

    /// Number of facets.
    pub fn len(&self) -> usize {
        self.facets.len()
    }

    /// True when no facet was accepted.
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Facet by id.
    pub fn get(&self, id: FacetId) -> Option<&Facet> {
        self.facets.get(id.0)
    }

    /// Walk every facet with its id, independent of ray shooting.
    pub fn iter(&self) -> impl Iterator<Item = (FacetId, &Facet)> {
        self.facets.iter().enumerate().map(|(i, f)| (FacetId(i), f))
    }
}
