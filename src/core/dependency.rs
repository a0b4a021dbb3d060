//! Dependency specifications and resolved dependencies.
//!
//! A recipe declares *contributions*: which external packages the build
//! needs, under which option triggers. The host package manager supplies
//! installed locations through the catalog; the resolver joins the two
//! into `ResolvedDependency` records.

use std::path::PathBuf;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::rules::When;

/// When a dependency is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// Needed only while building (cmake, bison, flex).
    Build,
    /// Needed at build time and at runtime (gdal, proj, qt).
    Runtime,
    /// Nice to have: skipped without error when absent from the catalog.
    Optional,
}

impl Default for DependencyKind {
    fn default() -> Self {
        DependencyKind::Runtime
    }
}

/// A dependency contribution declared by a recipe.
///
/// The `name` field is filled in from the `[dependencies.NAME]` table key
/// when the recipe is loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencySpec {
    /// Dependency name, unique within a recipe.
    #[serde(skip)]
    pub name: String,

    /// Build-time, runtime, or optional.
    #[serde(default)]
    pub kind: DependencyKind,

    /// Logical capability this dependency provides. Two required
    /// dependencies sharing a capability is a conflict (e.g. two
    /// database-client variants linked at once).
    #[serde(default)]
    pub capability: Option<String>,

    /// Other dependencies this one pulls in when required.
    #[serde(default)]
    pub requires: Vec<String>,

    /// Option trigger; absent means always required.
    #[serde(default)]
    pub when: Option<When>,
}

impl DependencySpec {
    /// Create an unconditional runtime dependency.
    pub fn runtime(name: impl Into<String>) -> Self {
        DependencySpec {
            name: name.into(),
            kind: DependencyKind::Runtime,
            capability: None,
            requires: Vec::new(),
            when: None,
        }
    }

    /// Create an unconditional build-time dependency.
    pub fn build(name: impl Into<String>) -> Self {
        DependencySpec {
            kind: DependencyKind::Build,
            ..DependencySpec::runtime(name)
        }
    }

    /// Create an optional dependency.
    pub fn optional(name: impl Into<String>) -> Self {
        DependencySpec {
            kind: DependencyKind::Optional,
            ..DependencySpec::runtime(name)
        }
    }

    /// Set the option trigger.
    pub fn when(mut self, when: When) -> Self {
        self.when = Some(when);
        self
    }

    /// Set the provided capability.
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capability = Some(capability.into());
        self
    }

    /// Add dependency-level requirements.
    pub fn with_requires(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.requires.extend(names.into_iter().map(|n| n.into()));
        self
    }

    /// Whether a missing catalog record is tolerated for this dependency.
    pub fn is_optional(&self) -> bool {
        self.kind == DependencyKind::Optional
    }
}

/// Installed locations of one dependency, as recorded in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallPaths {
    /// Installation prefix.
    pub prefix: PathBuf,

    /// Header directory; defaults to `<prefix>/include`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<PathBuf>,

    /// Library directory; defaults to `<prefix>/lib`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lib: Option<PathBuf>,

    /// Executable directory; defaults to `<prefix>/bin`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<PathBuf>,

    /// Shared-data directory; defaults to `<prefix>/share`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share: Option<PathBuf>,
}

impl InstallPaths {
    /// Paths rooted at a prefix, with conventional subdirectories.
    pub fn for_prefix(prefix: impl Into<PathBuf>) -> Self {
        InstallPaths {
            prefix: prefix.into(),
            include: None,
            lib: None,
            bin: None,
            share: None,
        }
    }

    pub fn include_dir(&self) -> PathBuf {
        self.include
            .clone()
            .unwrap_or_else(|| self.prefix.join("include"))
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.lib.clone().unwrap_or_else(|| self.prefix.join("lib"))
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.bin.clone().unwrap_or_else(|| self.prefix.join("bin"))
    }

    pub fn share_dir(&self) -> PathBuf {
        self.share
            .clone()
            .unwrap_or_else(|| self.prefix.join("share"))
    }
}

/// A dependency joined with its installed location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedDependency {
    /// Dependency name.
    pub name: String,

    /// Build-time, runtime, or optional.
    pub kind: DependencyKind,

    /// Capability, carried through for conflict reporting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability: Option<String>,

    /// Installed locations from the catalog.
    pub paths: InstallPaths,

    /// Installed version, when the catalog records one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,

    /// What pulled this dependency in: `recipe` for unconditional
    /// entries, `option:NAME` for triggered ones, `dep:NAME` for
    /// transitive requirements.
    pub required_by: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_install_paths_defaults() {
        let paths = InstallPaths::for_prefix("/opt/pg");
        assert_eq!(paths.include_dir(), Path::new("/opt/pg/include"));
        assert_eq!(paths.lib_dir(), Path::new("/opt/pg/lib"));
        assert_eq!(paths.bin_dir(), Path::new("/opt/pg/bin"));
        assert_eq!(paths.share_dir(), Path::new("/opt/pg/share"));
    }

    #[test]
    fn test_install_paths_overrides() {
        let paths = InstallPaths {
            prefix: PathBuf::from("/opt/qwt"),
            lib: Some(PathBuf::from("/opt/qwt/qwt.framework")),
            ..Default::default()
        };
        assert_eq!(paths.lib_dir(), Path::new("/opt/qwt/qwt.framework"));
        assert_eq!(paths.bin_dir(), Path::new("/opt/qwt/bin"));
    }

    #[test]
    fn test_dependency_spec_builder() {
        let dep = DependencySpec::runtime("postgres")
            .with_capability("database-client")
            .with_requires(["openssl"])
            .when(When::option("postgres"));

        assert_eq!(dep.kind, DependencyKind::Runtime);
        assert_eq!(dep.capability.as_deref(), Some("database-client"));
        assert_eq!(dep.requires, vec!["openssl"]);
        assert!(dep.when.is_some());
        assert!(!dep.is_optional());
    }

    #[test]
    fn test_dependency_spec_toml() {
        let spec: DependencySpec = toml::from_str(
            r#"
kind = "build"
requires = ["pkg-config"]
when = "api-docs"
"#,
        )
        .unwrap();
        assert_eq!(spec.kind, DependencyKind::Build);
        assert_eq!(spec.requires, vec!["pkg-config"]);
        assert_eq!(spec.when, Some(When::option("api-docs")));
    }
}
