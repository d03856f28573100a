//! Runtime configuration for prepping faceted primitives.

use faceted_kernel_math::Tolerance;
use serde::{Deserialize, Serialize};

use crate::diag::DEFAULT_LOG_LIMIT;
use crate::error::Result;

/// Most hits kept per ray, per primitive kind. Extra hits are dropped with
/// a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HitLimits {
    /// ARS cap.
    pub ars: usize,
    /// PG cap.
    pub pg: usize,
    /// BOT cap.
    pub bot: usize,
}

impl Default for HitLimits {
    fn default() -> Self {
        Self {
            ars: 12,
            pg: 32,
            bot: 128,
        }
    }
}

/// Settings consumed at prep time.
///
/// ```toml
/// log_limit = 6
///
/// [tol]
/// dist = 0.005
/// perp = 1e-6
///
/// [hits]
/// bot = 256
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RtConfig {
    /// Geometric tolerances.
    pub tol: Tolerance,
    /// Per-kind hit caps.
    pub hits: HitLimits,
    /// Occurrences of each anomaly kind that get logged.
    pub log_limit: usize,
}

impl Default for RtConfig {
    fn default() -> Self {
        Self {
            tol: Tolerance::DEFAULT,
            hits: HitLimits::default(),
            log_limit: DEFAULT_LOG_LIMIT,
        }
    }
}

impl RtConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RtError;

    #[test]
    fn test_empty_is_default() {
        assert_eq!(RtConfig::from_toml_str("").unwrap(), RtConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let cfg = RtConfig::from_toml_str(
            r#"
            log_limit = 2

            [tol]
            dist = 0.01

            [hits]
            bot = 256
            "#,
        )
        .unwrap();
        assert_eq!(cfg.log_limit, 2);
        assert!((cfg.tol.dist - 0.01).abs() < 1e-15);
        assert!((cfg.tol.perp - 1e-6).abs() < 1e-15);
        assert_eq!(cfg.hits.bot, 256);
        assert_eq!(cfg.hits.ars, 12);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = RtConfig::from_toml_str("[hits]\nnmg = 4\n").unwrap_err();
        assert!(matches!(err, RtError::Config(_)));
    }
}
