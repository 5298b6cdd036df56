//! Version tiers and labels.
//!
//! A label is the base version plus a tier suffix:
//!
//! ```text
//! release → 0.1.0
//! alpha   → 0.1.0-alpha
//! dev     → 0.1.0-dev
//! ```
//!
//! Labels are recomputed on every pass. Nothing here is persisted.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Coarse confidence tier derived from a completion ratio.
///
/// Ordered from lowest to highest confidence: `Dev < Alpha < Release`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionTier {
    /// Less than half of the package is complete.
    Dev,
    /// Usable but incomplete.
    Alpha,
    /// Ready to release.
    Release,
}

impl VersionTier {
    /// Pre-release suffix for this tier, if any.
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            Self::Dev => Some("dev"),
            Self::Alpha => Some("alpha"),
            Self::Release => None,
        }
    }
}

impl fmt::Display for VersionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dev => write!(f, "dev"),
            Self::Alpha => write!(f, "alpha"),
            Self::Release => write!(f, "release"),
        }
    }
}

/// A rendered version label such as `0.1.0-alpha`.
///
/// Serializes as its string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionLabel {
    base: String,
    tier: VersionTier,
}

impl VersionLabel {
    /// Create a label from a base version and a tier.
    pub fn new(base: impl Into<String>, tier: VersionTier) -> Self {
        Self {
            base: base.into(),
            tier,
        }
    }

    /// The base version without suffix.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The tier this label was derived from.
    pub fn tier(&self) -> VersionTier {
        self.tier
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tier.suffix() {
            Some(suffix) => write!(f, "{}-{}", self.base, suffix),
            None => f.write_str(&self.base),
        }
    }
}

/// Error parsing a version label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version label: {0:?}")]
pub struct ParseLabelError(pub String);

impl FromStr for VersionLabel {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, tier) = match s.rsplit_once('-') {
            Some((base, "alpha")) => (base, VersionTier::Alpha),
            Some((base, "dev")) => (base, VersionTier::Dev),
            Some(_) => return Err(ParseLabelError(s.to_string())),
            None => (s, VersionTier::Release),
        };
        if base.is_empty() {
            return Err(ParseLabelError(s.to_string()));
        }
        Ok(Self::new(base, tier))
    }
}

impl Serialize for VersionLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(VersionTier::Dev < VersionTier::Alpha);
        assert!(VersionTier::Alpha < VersionTier::Release);
    }

    #[test]
    fn test_label_display() {
        assert_eq!(VersionLabel::new("0.1.0", VersionTier::Release).to_string(), "0.1.0");
        assert_eq!(VersionLabel::new("0.1.0", VersionTier::Alpha).to_string(), "0.1.0-alpha");
        assert_eq!(VersionLabel::new("0.1.0", VersionTier::Dev).to_string(), "0.1.0-dev");
    }

    #[test]
    fn test_label_parse() {
        let label: VersionLabel = "0.2.0-alpha".parse().unwrap();
        assert_eq!(label.base(), "0.2.0");
        assert_eq!(label.tier(), VersionTier::Alpha);

        assert!("0.1.0-beta".parse::<VersionLabel>().is_err());
        assert!("-dev".parse::<VersionLabel>().is_err());
    }

    #[test]
    fn test_label_serializes_as_string() {
        let label = VersionLabel::new("0.1.0", VersionTier::Dev);
        let json = serde_json::to_string(&label).unwrap();
        assert_eq!(json, "\"0.1.0-dev\"");

        let back: VersionLabel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, label);
    }
}
