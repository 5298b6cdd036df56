//! Rendering manifest records to Cargo-style TOML and JSON.
//!
//! Everything renders into memory first. [`ArtifactSet::write_to`] is the
//! only function touching the file system, and callers invoke it after the
//! whole pass has rendered.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::batch::BatchReport;
use crate::canonical::content_digest;
use crate::config::{DependencySpec, ManifestSettings};
use super::{PackageManifest, WorkspaceManifest};

/// Target cfg used for wasm-only dependencies.
pub const WASM_TARGET_CFG: &str = "cfg(target_arch = \"wasm32\")";

/// Errors that can occur while rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// TOML serialization failed.
    #[error("failed to render TOML: {0}")]
    Toml(#[from] toml::ser::Error),

    /// JSON serialization failed.
    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A rendered file: relative path, contents and SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// Path relative to the output root, `/`-separated.
    pub path: String,
    /// File contents.
    #[serde(skip)]
    pub contents: String,
    /// Hex SHA-256 of `contents`.
    pub digest: String,
}

impl Artifact {
    /// Create an artifact and compute its digest.
    pub fn new(path: impl Into<String>, contents: String) -> Self {
        let digest = content_digest(contents.as_bytes());
        Self {
            path: path.into(),
            contents,
            digest,
        }
    }
}

/// All files produced by one pass, in render order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactSet {
    /// Rendered files.
    pub artifacts: Vec<Artifact>,
    /// Files this pass did not produce that an earlier pass may have left
    /// behind (the package files of failed packages).
    pub stale: Vec<String>,
}

impl ArtifactSet {
    /// Find an artifact by relative path.
    pub fn get(&self, path: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.path == path)
    }

    /// Path → digest index, ordered by path.
    pub fn digests(&self) -> BTreeMap<&str, &str> {
        self.artifacts
            .iter()
            .map(|a| (a.path.as_str(), a.digest.as_str()))
            .collect()
    }

    /// Number of artifacts.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Check if nothing was rendered.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Write every artifact below `root`, creating directories as needed,
    /// and remove stale files left there by an earlier pass.
    ///
    /// Fails with `InvalidInput` before touching the file system if any
    /// path is absolute or steps outside `root`.
    pub fn write_to(&self, root: &Path) -> std::io::Result<()> {
        let paths = self
            .artifacts
            .iter()
            .map(|a| a.path.as_str())
            .chain(self.stale.iter().map(String::as_str));
        for path in paths {
            if !is_contained(path) {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("artifact path escapes the output root: {}", path),
                ));
            }
        }

        for artifact in &self.artifacts {
            let path = root.join(&artifact.path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &artifact.contents)?;
        }

        for stale in &self.stale {
            match std::fs::remove_file(root.join(stale)) {
                Ok(()) => tracing::info!(path = %stale, "removed stale artifact"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// Relative path made only of plain segments.
fn is_contained(path: &str) -> bool {
    let path = Path::new(path);
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, std::path::Component::Normal(_)))
}

#[derive(Serialize)]
struct CargoPackage {
    name: String,
    version: String,
    edition: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repository: Option<String>,
}

#[derive(Serialize)]
struct TargetDependencies {
    dependencies: BTreeMap<String, DependencySpec>,
}

#[derive(Serialize)]
struct CargoPackageFile {
    package: CargoPackage,
    dependencies: BTreeMap<String, DependencySpec>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    features: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    target: BTreeMap<String, TargetDependencies>,
    #[serde(rename = "dev-dependencies", skip_serializing_if = "BTreeMap::is_empty")]
    dev_dependencies: BTreeMap<String, DependencySpec>,
}

#[derive(Serialize)]
struct CargoWorkspacePackage {
    version: String,
    edition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repository: Option<String>,
}

#[derive(Serialize)]
struct CargoWorkspace {
    members: Vec<String>,
    resolver: String,
    package: CargoWorkspacePackage,
    dependencies: BTreeMap<String, DependencySpec>,
}

#[derive(Serialize)]
struct CargoWorkspaceFile {
    workspace: CargoWorkspace,
}

/// Title-case a package name's descriptive segment.
///
/// Uses the part after the first `-` when present, so `kit-graph` and
/// `graph` both title as `Graph`.
pub fn package_title(name: &str) -> String {
    let segment = name.split_once('-').map_or(name, |(_, rest)| rest);
    let mut title = String::with_capacity(segment.len());
    let mut at_word_start = true;
    for ch in segment.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                title.extend(ch.to_uppercase());
            } else {
                title.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            title.push(ch);
            at_word_start = true;
        }
    }
    title
}

/// Renders manifest records according to [`ManifestSettings`].
#[derive(Debug, Clone)]
pub struct ManifestRenderer {
    settings: ManifestSettings,
    base_version: String,
}

impl ManifestRenderer {
    /// Create a renderer. `base_version` becomes the workspace version.
    pub fn new(settings: ManifestSettings, base_version: impl Into<String>) -> Self {
        Self {
            settings,
            base_version: base_version.into(),
        }
    }

    fn description(&self, name: &str) -> String {
        match &self.settings.description_prefix {
            Some(prefix) => format!("{} {} Components", prefix, package_title(name)),
            None => format!("{} Components", package_title(name)),
        }
    }

    /// Relative directory of a package below the output root.
    pub fn package_dir(&self, name: &str) -> String {
        format!("{}/{}", self.settings.packages_dir, name)
    }

    /// Render a package's `Cargo.toml`.
    ///
    /// Shared dependencies come first; an internal dependency whose name
    /// collides with a shared one replaces it.
    pub fn render_package_toml(&self, manifest: &PackageManifest) -> Result<String, RenderError> {
        let name = manifest.package.as_str();

        let mut dependencies = self.settings.dependencies.clone();
        for dep in &manifest.dependencies {
            let spec = DependencySpec::path(format!("../{}", dep.package), dep.version.to_string());
            if dependencies.insert(dep.package.to_string(), spec).is_some() {
                tracing::warn!(
                    package = %manifest.package,
                    dependency = %dep.package,
                    "internal dependency shadows a shared dependency"
                );
            }
        }

        let wasm_enabled = self.settings.wasm_packages.iter().any(|p| p == name);
        let mut features = BTreeMap::new();
        let mut target = BTreeMap::new();
        if wasm_enabled {
            features.insert("default".to_string(), vec!["std".to_string()]);
            features.insert("std".to_string(), Vec::new());
            features.insert(
                "wasm".to_string(),
                self.settings.wasm_dependencies.keys().cloned().collect(),
            );
            if !self.settings.wasm_dependencies.is_empty() {
                target.insert(
                    WASM_TARGET_CFG.to_string(),
                    TargetDependencies {
                        dependencies: self.settings.wasm_dependencies.clone(),
                    },
                );
            }
        }

        let file = CargoPackageFile {
            package: CargoPackage {
                name: name.to_string(),
                version: manifest.version.to_string(),
                edition: self.settings.edition.clone(),
                description: self.description(name),
                license: self.settings.license.clone(),
                repository: self.settings.repository.clone(),
            },
            dependencies,
            features,
            target,
            dev_dependencies: self.settings.dev_dependencies.clone(),
        };

        Ok(toml::to_string(&file)?)
    }

    /// Render the workspace `Cargo.toml`.
    pub fn render_workspace_toml(&self, workspace: &WorkspaceManifest) -> Result<String, RenderError> {
        let file = CargoWorkspaceFile {
            workspace: CargoWorkspace {
                members: workspace
                    .members
                    .iter()
                    .map(|m| self.package_dir(m.as_str()))
                    .collect(),
                resolver: "2".to_string(),
                package: CargoWorkspacePackage {
                    version: self.base_version.clone(),
                    edition: self.settings.edition.clone(),
                    license: self.settings.license.clone(),
                    repository: self.settings.repository.clone(),
                },
                dependencies: self.settings.dependencies.clone(),
            },
        };

        Ok(toml::to_string(&file)?)
    }

    /// Render any record as pretty JSON with a trailing newline.
    pub fn render_json<T: Serialize>(&self, value: &T) -> Result<String, RenderError> {
        let mut json = serde_json::to_string_pretty(value)?;
        json.push('\n');
        Ok(json)
    }

    /// Render every artifact of a batch report.
    ///
    /// Failed packages get no package files but stay in the workspace
    /// member list; the report itself records why they failed. Their
    /// package file paths are listed as stale so a rerun into the same
    /// directory does not keep an older manifest.
    pub fn render_report(&self, report: &BatchReport) -> Result<ArtifactSet, RenderError> {
        let mut artifacts = vec![
            Artifact::new("Cargo.toml", self.render_workspace_toml(&report.workspace)?),
            Artifact::new("workspace.json", self.render_json(&report.workspace)?),
        ];

        for manifest in &report.manifests {
            let dir = self.package_dir(manifest.package.as_str());
            artifacts.push(Artifact::new(
                format!("{}/Cargo.toml", dir),
                self.render_package_toml(manifest)?,
            ));
            artifacts.push(Artifact::new(
                format!("{}/manifest.json", dir),
                self.render_json(manifest)?,
            ));
        }

        artifacts.push(Artifact::new("batch_report.json", self.render_json(report)?));

        let stale = report
            .failures
            .iter()
            .flat_map(|failure| {
                let dir = self.package_dir(failure.package.as_str());
                [format!("{}/Cargo.toml", dir), format!("{}/manifest.json", dir)]
            })
            .collect();

        Ok(ArtifactSet { artifacts, stale })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::DependencyEntry;
    use crate::types::{PackageId, VersionLabel, VersionTier};

    fn sample_manifest() -> PackageManifest {
        PackageManifest {
            package: PackageId::new("graph"),
            version: VersionLabel::new("0.1.0", VersionTier::Alpha),
            dependencies: vec![DependencyEntry {
                package: PackageId::new("core"),
                version: VersionLabel::new("0.1.0", VersionTier::Release),
            }],
        }
    }

    #[test]
    fn test_package_title() {
        assert_eq!(package_title("graph"), "Graph");
        assert_eq!(package_title("kit-storage"), "Storage");
        assert_eq!(package_title("kit-deploy-cli"), "Deploy-Cli");
        assert_eq!(package_title("http_server"), "Http_Server");
    }

    #[test]
    fn test_render_package_toml() {
        let renderer = ManifestRenderer::new(ManifestSettings::default(), "0.1.0");
        let text = renderer.render_package_toml(&sample_manifest()).unwrap();

        let value: toml::Value = toml::from_str(&text).unwrap();
        assert_eq!(value["package"]["name"].as_str(), Some("graph"));
        assert_eq!(value["package"]["version"].as_str(), Some("0.1.0-alpha"));
        assert_eq!(value["package"]["description"].as_str(), Some("Graph Components"));
        assert_eq!(value["dependencies"]["core"]["path"].as_str(), Some("../core"));
        assert_eq!(value["dependencies"]["core"]["version"].as_str(), Some("0.1.0"));
        assert_eq!(value["dependencies"]["serde_json"].as_str(), Some("1.0"));
        assert!(value.get("features").is_none());
        assert!(value["dev-dependencies"].get("tokio").is_some());
    }

    #[test]
    fn test_render_wasm_package() {
        let mut settings = ManifestSettings::default();
        settings.wasm_packages = vec!["graph".to_string()];
        settings.description_prefix = Some("Kit".to_string());
        let renderer = ManifestRenderer::new(settings, "0.1.0");

        let text = renderer.render_package_toml(&sample_manifest()).unwrap();
        let value: toml::Value = toml::from_str(&text).unwrap();

        assert_eq!(value["package"]["description"].as_str(), Some("Kit Graph Components"));
        let wasm = value["features"]["wasm"].as_array().unwrap();
        assert_eq!(wasm.len(), 3);
        let target_deps = &value["target"][WASM_TARGET_CFG]["dependencies"];
        assert_eq!(target_deps["wasm-bindgen"]["optional"].as_bool(), Some(true));
    }

    #[test]
    fn test_render_workspace_toml() {
        let renderer = ManifestRenderer::new(ManifestSettings::default(), "0.3.0");
        let workspace = WorkspaceManifest {
            members: vec![PackageId::new("core"), PackageId::new("graph")],
        };

        let text = renderer.render_workspace_toml(&workspace).unwrap();
        let value: toml::Value = toml::from_str(&text).unwrap();
        let members: Vec<_> = value["workspace"]["members"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|m| m.as_str())
            .collect();

        assert_eq!(members, vec!["crates/core", "crates/graph"]);
        assert_eq!(value["workspace"]["package"]["version"].as_str(), Some("0.3.0"));
    }

    #[test]
    fn test_rendering_is_byte_stable() {
        let renderer = ManifestRenderer::new(ManifestSettings::default(), "0.1.0");
        let a = renderer.render_package_toml(&sample_manifest()).unwrap();
        let b = renderer.render_package_toml(&sample_manifest()).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            Artifact::new("x", a).digest,
            Artifact::new("x", b).digest
        );
    }

    #[test]
    fn test_write_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let set = ArtifactSet {
            artifacts: vec![
                Artifact::new("Cargo.toml", "[workspace]\n".to_string()),
                Artifact::new("crates/core/Cargo.toml", "[package]\n".to_string()),
            ],
            stale: Vec::new(),
        };

        set.write_to(dir.path()).unwrap();

        let written = std::fs::read_to_string(dir.path().join("crates/core/Cargo.toml")).unwrap();
        assert_eq!(written, "[package]\n");
        assert_eq!(set.digests().len(), 2);
        assert!(set.get("Cargo.toml").is_some());
    }

    #[test]
    fn test_write_refuses_paths_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        for bad in ["crates/../../escaped/Cargo.toml", "/tmp/abs.toml", ""] {
            let set = ArtifactSet {
                artifacts: vec![
                    Artifact::new("Cargo.toml", "[workspace]\n".to_string()),
                    Artifact::new(bad, "[package]\n".to_string()),
                ],
                stale: Vec::new(),
            };
            let err = set.write_to(&out).unwrap_err();
            assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        }

        // Nothing written, not even the valid file
        assert!(!out.exists());
        assert!(!dir.path().join("escaped").exists());
    }

    #[test]
    fn test_write_removes_stale_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("crates/app")).unwrap();
        std::fs::write(dir.path().join("crates/app/Cargo.toml"), "old").unwrap();

        let set = ArtifactSet {
            artifacts: vec![Artifact::new("Cargo.toml", "[workspace]\n".to_string())],
            stale: vec![
                "crates/app/Cargo.toml".to_string(),
                "crates/app/manifest.json".to_string(),
            ],
        };
        set.write_to(dir.path()).unwrap();

        assert!(!dir.path().join("crates/app/Cargo.toml").exists());
        assert!(dir.path().join("Cargo.toml").exists());
    }
}
