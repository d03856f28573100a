#![warn(missing_docs)]

//! Math types for the faceted primitive kernel.
//!
//! Thin wrappers around nalgebra providing the handful of types every
//! faceted primitive needs: points, vectors, directions, the 4x4 placement
//! matrix a primitive is loaded under, and the global tolerance set the
//! tracer hands to every prep call.

use nalgebra::{Matrix4, Unit, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// Dot products whose magnitude falls below this are treated as zero when
/// deciding whether a ray runs parallel to a facet.
pub const SQRT_SMALL_FASTF: f64 = 1.0e-39;

/// Edge and cross-product magnitudes below this make a facet degenerate for
/// the primitives that do not take a caller-supplied tolerance (ARS, PG).
pub const DEGENERATE_EDGE: f64 = 0.00001;

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform an offset vector (rotation/scale only, no translation).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// Transform a normal vector (uses inverse transpose of upper-left 3x3).
    pub fn apply_normal(&self, n: &Vec3) -> Vec3 {
        let m3 = self.matrix.fixed_view::<3, 3>(0, 0);
        if let Some(inv) = m3.try_inverse() {
            inv.transpose() * n
        } else {
            // Singular placement: leave the normal alone
            *n
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// The global tolerance set shared by every primitive of one tracer instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tolerance {
    /// Minimum distance between distinct points, in mm.
    pub dist: f64,
    /// Minimum dot product magnitude for two directions to be treated as
    /// non-perpendicular.
    pub perp: f64,
}

impl Tolerance {
    /// The tracer's historical defaults (0.005 mm, 1e-6).
    pub const DEFAULT: Self = Self {
        dist: 0.005,
        perp: 1e-6,
    };
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// An arbitrary unit vector perpendicular to `v`.
///
/// The component of smallest magnitude is zeroed and the other two are
/// swapped with a sign change, which is stable for any non-zero input.
/// A zero input yields the X axis.
pub fn vec_ortho(v: &Vec3) -> Vec3 {
    let (ax, ay, az) = (v.x.abs(), v.y.abs(), v.z.abs());
    let out = if ax <= ay && ax <= az {
        Vec3::new(0.0, -v.z, v.y)
    } else if ay <= az {
        Vec3::new(-v.z, 0.0, v.x)
    } else {
        Vec3::new(-v.y, v.x, 0.0)
    };
    let len = out.norm();
    if len < f64::EPSILON {
        Vec3::x()
    } else {
        out / len
    }
}
