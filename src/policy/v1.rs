//! VersionPolicy v1: completion-ratio thresholds and base version.
//!
//! ## Float Normalization for Deterministic Hashing
//!
//! Thresholds are quantized to integers before hashing so that the
//! `params_hash` recorded in batch reports does not depend on float
//! formatting. The quantization factor is 1e6.

use serde::{Deserialize, Serialize};
use crate::canonical::canonical_hash_hex;
use crate::types::{VersionLabel, VersionTier};
use crate::DEFAULT_POLICY_VERSION;

/// Quantization factor for float normalization.
const FLOAT_QUANTIZATION_FACTOR: f64 = 1_000_000.0;

/// Default base version for generated packages.
pub const DEFAULT_BASE_VERSION: &str = "0.1.0";

/// Default inclusive lower bound of the release tier.
pub const DEFAULT_RELEASE_THRESHOLD: f64 = 0.8;

/// Default inclusive lower bound of the alpha tier.
pub const DEFAULT_ALPHA_THRESHOLD: f64 = 0.5;

/// Error type for invalid policy parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    /// Base version is not a valid semantic version.
    #[error("Invalid base version {version:?}: {reason}")]
    InvalidBaseVersion {
        /// The rejected version string.
        version: String,
        /// Parser message.
        reason: String,
    },
    /// Base version carries a pre-release or build suffix, which would
    /// collide with the tier suffix.
    #[error("Base version {0:?} must be a plain MAJOR.MINOR.PATCH version")]
    QualifiedBaseVersion(String),
    /// Thresholds are not `0 <= alpha <= release <= 1`.
    #[error("Invalid thresholds: alpha={alpha}, release={release}")]
    InvalidThresholds {
        /// Alpha lower bound.
        alpha: f64,
        /// Release lower bound.
        release: f64,
    },
}

/// Quantize a float to an i64 for deterministic hashing.
fn quantize_float(value: f64) -> i64 {
    (value * FLOAT_QUANTIZATION_FACTOR).round() as i64
}

/// Quantized policy parameters for deterministic hashing.
#[derive(Debug, Clone, Serialize)]
struct QuantizedPolicyParams {
    version: String,
    base_version: String,
    release_threshold: i64,
    alpha_threshold: i64,
}

/// Version policy version 1.
///
/// ## Parameters
///
/// - `base_version`: version string every label starts with
/// - `release_threshold`: ratio at or above which a package is `release`
/// - `alpha_threshold`: ratio at or above which a package is `alpha`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionPolicyV1 {
    /// Policy version identifier.
    pub version: String,
    /// Base version shared by all tiers.
    pub base_version: String,
    /// Inclusive lower bound of the release tier.
    pub release_threshold: f64,
    /// Inclusive lower bound of the alpha tier.
    pub alpha_threshold: f64,
}

impl VersionPolicyV1 {
    /// Create a validated policy.
    pub fn new(
        base_version: impl Into<String>,
        release_threshold: f64,
        alpha_threshold: f64,
    ) -> Result<Self, PolicyError> {
        let policy = Self {
            version: DEFAULT_POLICY_VERSION.to_string(),
            base_version: base_version.into(),
            release_threshold,
            alpha_threshold,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Check the base version and threshold ordering.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let base = semver::Version::parse(&self.base_version).map_err(|e| {
            PolicyError::InvalidBaseVersion {
                version: self.base_version.clone(),
                reason: e.to_string(),
            }
        })?;
        if !base.pre.is_empty() || !base.build.is_empty() {
            return Err(PolicyError::QualifiedBaseVersion(self.base_version.clone()));
        }

        let (alpha, release) = (self.alpha_threshold, self.release_threshold);
        let ordered = alpha.is_finite()
            && release.is_finite()
            && (0.0..=1.0).contains(&alpha)
            && (0.0..=1.0).contains(&release)
            && alpha <= release;
        if !ordered {
            return Err(PolicyError::InvalidThresholds { alpha, release });
        }
        Ok(())
    }

    /// Get the policy ID.
    pub fn policy_id(&self) -> &str {
        &self.version
    }

    /// Classify a completion ratio into a tier.
    ///
    /// Lower bounds are inclusive: a ratio exactly on a threshold takes
    /// the higher tier.
    pub fn classify(&self, ratio: f64) -> VersionTier {
        if ratio >= self.release_threshold {
            VersionTier::Release
        } else if ratio >= self.alpha_threshold {
            VersionTier::Alpha
        } else {
            VersionTier::Dev
        }
    }

    /// Render the label for a tier.
    pub fn label(&self, tier: VersionTier) -> VersionLabel {
        VersionLabel::new(self.base_version.clone(), tier)
    }

    /// Compute a hash of the policy parameters.
    ///
    /// Uses quantized thresholds so the hash is independent of float
    /// formatting.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(&self.to_quantized())
    }

    fn to_quantized(&self) -> QuantizedPolicyParams {
        QuantizedPolicyParams {
            version: self.version.clone(),
            base_version: self.base_version.clone(),
            release_threshold: quantize_float(self.release_threshold),
            alpha_threshold: quantize_float(self.alpha_threshold),
        }
    }
}

impl Default for VersionPolicyV1 {
    fn default() -> Self {
        Self {
            version: DEFAULT_POLICY_VERSION.to_string(),
            base_version: DEFAULT_BASE_VERSION.to_string(),
            release_threshold: DEFAULT_RELEASE_THRESHOLD,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_tiers() {
        let policy = VersionPolicyV1::default();
        assert_eq!(policy.classify(1.0), VersionTier::Release);
        assert_eq!(policy.classify(0.79), VersionTier::Alpha);
        assert_eq!(policy.classify(0.49), VersionTier::Dev);
        assert_eq!(policy.classify(0.0), VersionTier::Dev);
    }

    #[test]
    fn test_classify_ties_take_higher_tier() {
        let policy = VersionPolicyV1::default();
        assert_eq!(policy.classify(0.8), VersionTier::Release);
        assert_eq!(policy.classify(4.0 / 5.0), VersionTier::Release);
        assert_eq!(policy.classify(0.5), VersionTier::Alpha);
        assert_eq!(policy.classify(1.0 / 2.0), VersionTier::Alpha);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        assert!(VersionPolicyV1::new("0.1.0", 0.4, 0.6).is_err());
        assert!(VersionPolicyV1::new("0.1.0", 1.5, 0.5).is_err());
        assert!(VersionPolicyV1::new("0.1.0", f64::NAN, 0.5).is_err());
        assert!(VersionPolicyV1::new("0.1.0", 0.5, 0.5).is_ok());
    }

    #[test]
    fn test_invalid_base_version_rejected() {
        let err = VersionPolicyV1::new("one", 0.8, 0.5).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidBaseVersion { .. }));
    }

    #[test]
    fn test_qualified_base_version_rejected() {
        for base in ["1.0.0-rc.1", "0.1.0+build", "0.1.0-alpha"] {
            assert_eq!(
                VersionPolicyV1::new(base, 0.8, 0.5).unwrap_err(),
                PolicyError::QualifiedBaseVersion(base.to_string())
            );
        }
    }

    #[test]
    fn test_every_label_keeps_its_tier_under_semver() {
        let policy = VersionPolicyV1::new("2.3.4", 0.8, 0.5).unwrap();
        for tier in [VersionTier::Dev, VersionTier::Alpha, VersionTier::Release] {
            let label = policy.label(tier);
            let parsed = semver::Version::parse(&label.to_string()).unwrap();
            assert_eq!(parsed.pre.as_str(), tier.suffix().unwrap_or(""));
            assert!(parsed.build.is_empty());

            let back: VersionLabel = label.to_string().parse().unwrap();
            assert_eq!(back, label);
        }
    }

    #[test]
    fn test_policy_params_hash_determinism() {
        let policy1 = VersionPolicyV1::default();
        let policy2 = VersionPolicyV1::default();

        assert_eq!(policy1.params_hash(), policy2.params_hash());
    }

    #[test]
    fn test_policy_params_hash_changes() {
        let policy1 = VersionPolicyV1::default();
        let mut policy2 = VersionPolicyV1::default();
        policy2.release_threshold = 0.9;

        assert_ne!(policy1.params_hash(), policy2.params_hash());
    }
}
