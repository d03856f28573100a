//! Error types for decoding and validating primitive descriptions.

use thiserror::Error;

/// Errors raised while importing or validating a primitive's parameters.
///
/// Every variant is a hard failure: the primitive cannot be prepped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeomError {
    /// A record carried an unexpected identifier byte.
    #[error("{kind}: bad record id {found:#04x}, expected {expected:#04x}")]
    BadRecordId {
        /// Primitive kind label.
        kind: &'static str,
        /// Identifier that was found.
        found: u8,
        /// Identifier that was expected.
        expected: u8,
    },

    /// A polygon face has a vertex count outside the supported range.
    #[error("poly face {face}: {count} vertices, must be 3 through 5")]
    VertexCount {
        /// Face index.
        face: usize,
        /// Number of vertices found.
        count: usize,
    },

    /// A polygon face has per-vertex normals that do not match its vertices.
    #[error("poly face {face}: {normals} vertex normals for {vertices} vertices")]
    NormalCount {
        /// Face index.
        face: usize,
        /// Number of normals supplied.
        normals: usize,
        /// Number of vertices in the face.
        vertices: usize,
    },

    /// An ARS has fewer curves than needed to rule a surface.
    #[error("ars: {0} curves, need at least 2")]
    TooFewCurves(usize),

    /// An ARS curve does not have the advertised number of points.
    #[error("ars curve {curve}: {found} points, expected {expected}")]
    CurveLength {
        /// Curve index.
        curve: usize,
        /// Number of points found.
        found: usize,
        /// Number of points expected.
        expected: usize,
    },

    /// A BOT face references a vertex that does not exist.
    #[error("bot face {face}: vertex index {index} out of range (0..{num_vertices})")]
    FaceIndex {
        /// Face index.
        face: usize,
        /// Offending vertex index.
        index: i64,
        /// Number of vertices in the BOT.
        num_vertices: usize,
    },

    /// A numeric enum code is not one the kernel understands.
    #[error("bot: unknown {field} code {code}")]
    UnknownCode {
        /// Name of the field.
        field: &'static str,
        /// The code that was read.
        code: u8,
    },

    /// A per-face array does not have one entry per face.
    #[error("bot: {field} has {found} entries for {num_faces} faces")]
    PerFaceLength {
        /// Name of the per-face array.
        field: &'static str,
        /// Entries found.
        found: usize,
        /// Number of faces.
        num_faces: usize,
    },

    /// A plate-mode BOT was given without a thickness array.
    #[error("bot: plate mode requires a thickness for every face")]
    MissingThickness,
}

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, GeomError>;
