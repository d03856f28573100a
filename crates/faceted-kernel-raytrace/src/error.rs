//! Error types for prepping and shooting faceted primitives.

use faceted_kernel_geom::GeomError;
use thiserror::Error;

/// Errors surfaced to the scene loader.
///
/// Shot-time anomalies never appear here; they are recovered locally and
/// logged.
#[derive(Error, Debug)]
pub enum RtError {
    /// The primitive's parameters were malformed.
    #[error(transparent)]
    Geom(#[from] GeomError),

    /// Every facet was rejected as degenerate.
    #[error("{name}: no usable faces")]
    NoFaces {
        /// Primitive name.
        name: String,
    },

    /// A hit refers to a facet the solid does not have.
    #[error("{name}: no facet {facet}")]
    NoSuchFacet {
        /// Primitive name.
        name: String,
        /// Offending facet index.
        facet: usize,
    },

    /// The operation has no implementation for this solid kind.
    #[error("{label}: {op} is not supported")]
    Unsupported {
        /// Label of the solid kind.
        label: &'static str,
        /// Operation name.
        op: &'static str,
    },

    /// A prepared solid or internal form was handed to the wrong kind's
    /// operations.
    #[error("{name}: not a {expected}")]
    WrongVariant {
        /// Primitive name.
        name: String,
        /// Label of the kind the operation expected.
        expected: &'static str,
    },

    /// The runtime configuration could not be parsed.
    #[error("config: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for raytrace operations.
pub type Result<T> = std::result::Result<T, RtError>;
