//! Kernel configuration.
//!
//! Loaded from TOML; every field has a default, so an empty file is a
//! valid configuration.
//!
//! ```toml
//! [partition]
//! fallback = "core"
//! strict = false
//!
//! [policy]
//! base_version = "0.1.0"
//! release_threshold = 0.8
//! alpha_threshold = 0.5
//!
//! [manifest]
//! edition = "2021"
//! license = "Apache-2.0"
//! wasm_packages = ["core"]
//!
//! [manifest.dependencies]
//! serde = { version = "1.0", features = ["derive"] }
//! ```
//!
//! Environment overrides, applied after the file:
//! - `MANIFEST_KERNEL_FALLBACK`: fallback package name
//! - `MANIFEST_KERNEL_BASE_VERSION`: base version for labels

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::partition::DEFAULT_FALLBACK_PACKAGE;
use crate::policy::v1::{DEFAULT_ALPHA_THRESHOLD, DEFAULT_RELEASE_THRESHOLD};
use crate::policy::{PolicyError, VersionPolicyV1, DEFAULT_BASE_VERSION};
use crate::types::{is_cargo_name, PackageId};

/// Environment variable overriding the fallback package.
pub const ENV_FALLBACK: &str = "MANIFEST_KERNEL_FALLBACK";

/// Environment variable overriding the base version.
pub const ENV_BASE_VERSION: &str = "MANIFEST_KERNEL_BASE_VERSION";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Fallback package name is not a valid Cargo package name.
    #[error("invalid fallback package name: {0:?}")]
    InvalidFallback(String),

    /// Version policy parameters are invalid.
    #[error("invalid version policy: {0}")]
    Policy(#[from] PolicyError),
}

/// Dependency specification in a rendered manifest.
///
/// Either a bare version string or a detailed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    /// Simple version string: `"1.0"`.
    Simple(String),

    /// Detailed dependency specification.
    Detailed(DetailedDependency),
}

impl DependencySpec {
    /// A path dependency pinned to a version label.
    pub fn path(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self::Detailed(DetailedDependency {
            version: Some(version.into()),
            path: Some(path.into()),
            ..DetailedDependency::default()
        })
    }

    /// Returns the version requirement string if specified.
    pub fn version(&self) -> Option<&str> {
        match self {
            Self::Simple(v) => Some(v),
            Self::Detailed(d) => d.version.as_deref(),
        }
    }

    /// Returns true if this is a path dependency.
    pub fn is_path(&self) -> bool {
        matches!(self, Self::Detailed(d) if d.path.is_some())
    }
}

/// Detailed dependency table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailedDependency {
    /// Version requirement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Local path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Enabled features.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,

    /// Whether the dependency is optional.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

/// Partition settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartitionConfig {
    /// Package owning components no package claims.
    pub fallback: String,
    /// Disable the fallback: unassigned components become errors.
    pub strict: bool,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            fallback: DEFAULT_FALLBACK_PACKAGE.to_string(),
            strict: false,
        }
    }
}

/// Version policy settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Base version shared by all tiers.
    pub base_version: String,
    /// Inclusive lower bound of the release tier.
    pub release_threshold: f64,
    /// Inclusive lower bound of the alpha tier.
    pub alpha_threshold: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            base_version: DEFAULT_BASE_VERSION.to_string(),
            release_threshold: DEFAULT_RELEASE_THRESHOLD,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
        }
    }
}

/// Manifest rendering settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestSettings {
    /// Rust edition written into every package.
    pub edition: String,
    /// SPDX license identifier.
    pub license: Option<String>,
    /// Repository URL.
    pub repository: Option<String>,
    /// Prefix of generated descriptions (`"<prefix> <Title> Components"`).
    pub description_prefix: Option<String>,
    /// Directory holding package directories, relative to the workspace root.
    pub packages_dir: String,
    /// Dependencies shared by every package.
    pub dependencies: BTreeMap<String, DependencySpec>,
    /// Dev-dependencies shared by every package.
    pub dev_dependencies: BTreeMap<String, DependencySpec>,
    /// Packages that get `std`/`wasm` features.
    pub wasm_packages: Vec<String>,
    /// wasm32 target dependencies for wasm-enabled packages.
    pub wasm_dependencies: BTreeMap<String, DependencySpec>,
}

fn optional_dep(version: &str) -> DependencySpec {
    DependencySpec::Detailed(DetailedDependency {
        version: Some(version.to_string()),
        optional: true,
        ..DetailedDependency::default()
    })
}

impl Default for ManifestSettings {
    fn default() -> Self {
        let mut dependencies = BTreeMap::new();
        dependencies.insert(
            "serde".to_string(),
            DependencySpec::Detailed(DetailedDependency {
                version: Some("1.0".to_string()),
                features: vec!["derive".to_string()],
                ..DetailedDependency::default()
            }),
        );
        dependencies.insert("serde_json".to_string(), DependencySpec::Simple("1.0".to_string()));
        dependencies.insert("thiserror".to_string(), DependencySpec::Simple("2.0".to_string()));
        dependencies.insert("anyhow".to_string(), DependencySpec::Simple("1.0".to_string()));

        let mut dev_dependencies = BTreeMap::new();
        dev_dependencies.insert(
            "tokio".to_string(),
            DependencySpec::Detailed(DetailedDependency {
                version: Some("1.0".to_string()),
                features: vec!["full".to_string()],
                ..DetailedDependency::default()
            }),
        );

        let mut wasm_dependencies = BTreeMap::new();
        wasm_dependencies.insert("wasm-bindgen".to_string(), optional_dep("0.2"));
        wasm_dependencies.insert("web-sys".to_string(), optional_dep("0.3"));
        wasm_dependencies.insert("js-sys".to_string(), optional_dep("0.3"));

        Self {
            edition: "2021".to_string(),
            license: Some("Apache-2.0".to_string()),
            repository: None,
            description_prefix: None,
            packages_dir: "crates".to_string(),
            dependencies,
            dev_dependencies,
            wasm_packages: Vec::new(),
            wasm_dependencies,
        }
    }
}

/// Top-level kernel configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KernelConfig {
    /// Partition settings.
    pub partition: PartitionConfig,
    /// Version policy settings.
    pub policy: PolicyConfig,
    /// Manifest rendering settings.
    pub manifest: ManifestSettings,
}

impl KernelConfig {
    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(fallback) = lookup(ENV_FALLBACK) {
            self.partition.fallback = fallback;
        }
        if let Some(base_version) = lookup(ENV_BASE_VERSION) {
            self.policy.base_version = base_version;
        }
        self.validate()
    }

    /// Check the fallback name and the policy parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_cargo_name(&self.partition.fallback) {
            return Err(ConfigError::InvalidFallback(self.partition.fallback.clone()));
        }
        self.version_policy().map(|_| ())
    }

    /// Build the validated version policy.
    pub fn version_policy(&self) -> Result<VersionPolicyV1, ConfigError> {
        Ok(VersionPolicyV1::new(
            self.policy.base_version.clone(),
            self.policy.release_threshold,
            self.policy.alpha_threshold,
        )?)
    }

    /// The fallback package, or `None` in strict mode.
    pub fn fallback_package(&self) -> Option<PackageId> {
        if self.partition.strict {
            None
        } else {
            Some(PackageId::new(self.partition.fallback.clone()))
        }
    }
}
