//! Package identifiers and resolved dependency records.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::version::VersionLabel;

/// Unique identifier for a deployable package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(String);

impl PackageId {
    /// Create a new PackageId.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the package name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name is usable as a Cargo package and directory name:
    /// ASCII letters, digits, `-` and `_`, starting with a letter or `_`.
    pub fn is_cargo_name(&self) -> bool {
        is_cargo_name(&self.0)
    }
}

/// Check a raw package name. See [`PackageId::is_cargo_name`].
pub fn is_cargo_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PackageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PackageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A dependency edge between packages, with the dependency's current label.
///
/// Derived on every resolution pass; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDependency {
    /// Package that needs the dependency.
    pub dependent: PackageId,
    /// Package being depended on.
    pub dependency: PackageId,
    /// Version label computed for `dependency` in this pass.
    pub version: VersionLabel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cargo_names() {
        for name in ["core", "kit-graph", "storage_lsm", "_private", "p0"] {
            assert!(PackageId::new(name).is_cargo_name(), "{} should be accepted", name);
        }
        for name in ["", "../escaped", "a/b", "a\\b", "..", "-lead", "9lives", "dot.ted", "sp ace"] {
            assert!(!PackageId::new(name).is_cargo_name(), "{:?} should be rejected", name);
        }
    }
}
