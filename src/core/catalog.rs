//! Dependency catalog and the resolved dependency set.
//!
//! The catalog is supplied by the host package manager: a mapping from
//! dependency name to where the package is installed. Lookup must be a
//! fast in-memory query; any I/O to produce the catalog happens up front,
//! before the resolver runs.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::dependency::{InstallPaths, ResolvedDependency};

/// One installed-package record in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Installed locations.
    #[serde(flatten)]
    pub paths: InstallPaths,

    /// Installed version, if the host package manager tracks one.
    #[serde(default)]
    pub version: Option<Version>,
}

/// Mapping of dependency name to installed location, supplied by the
/// host package manager.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl DependencyCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        DependencyCatalog::default()
    }

    /// Load a catalog from a TOML file.
    ///
    /// ```toml
    /// [postgres]
    /// prefix = "/opt/pg"
    /// bin = "/opt/pg/bin"
    /// version = "11.2.0"
    /// ```
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog: {}", path.display()))?;
        let catalog: DependencyCatalog = toml::from_str(&text)
            .with_context(|| format!("failed to parse catalog: {}", path.display()))?;
        Ok(catalog)
    }

    /// Insert an entry (test fixtures and host integrations).
    pub fn insert(&mut self, name: impl Into<String>, entry: CatalogEntry) {
        self.entries.insert(name.into(), entry);
    }

    /// Insert a bare prefix entry.
    pub fn insert_prefix(&mut self, name: impl Into<String>, prefix: impl Into<std::path::PathBuf>) {
        self.insert(
            name,
            CatalogEntry {
                paths: InstallPaths::for_prefix(prefix),
                version: None,
            },
        );
    }

    /// Look up an installed package.
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    /// Names of all installed packages, in name order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// Number of catalog entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The set of dependencies required by one resolved selection, joined
/// with their installed locations.
///
/// Iteration order is dependency name order, which keeps everything
/// derived from the set (flag templates, env lists, fingerprints)
/// deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedDependencySet {
    deps: BTreeMap<String, ResolvedDependency>,
}

impl ResolvedDependencySet {
    pub(crate) fn new(deps: BTreeMap<String, ResolvedDependency>) -> Self {
        ResolvedDependencySet { deps }
    }

    /// Look up a resolved dependency by name.
    pub fn get(&self, name: &str) -> Option<&ResolvedDependency> {
        self.deps.get(name)
    }

    /// Get the install paths for a dependency.
    pub fn paths(&self, name: &str) -> Option<&InstallPaths> {
        self.deps.get(name).map(|d| &d.paths)
    }

    /// Check whether a dependency was resolved.
    pub fn contains(&self, name: &str) -> bool {
        self.deps.contains_key(name)
    }

    /// Iterate in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedDependency> {
        self.deps.values()
    }

    /// Number of resolved dependencies.
    pub fn len(&self) -> usize {
        self.deps.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }
}
