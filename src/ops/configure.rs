//! The configure operation: one resolved, fully planned build.
//!
//! Runs the whole pipeline for a recipe: option resolution, dependency
//! resolution, then the independent planning stages (flag assembly and
//! patch planning run in parallel), and finally fingerprints the result.

use std::collections::BTreeMap;
use std::path::Path;

use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::catalog::{DependencyCatalog, ResolvedDependencySet};
use crate::core::option::OptionValue;
use crate::core::platform::Platform;
use crate::core::recipe::Recipe;
use crate::core::selection::SelectionSet;
use crate::planner::{
    assemble_flags, compose_environment, plan_patches, PatchOperation, PlanError, TemplateContext,
};
use crate::resolver::{resolve_dependencies, OptionRegistry, ResolveError};
use crate::util::diagnostic::Diagnostic;
use crate::util::hash::Fingerprint;

/// Error from the configure pipeline.
#[derive(Debug, Error)]
pub enum ConfigureError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

impl ConfigureError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ConfigureError::Resolve(err) => err.to_diagnostic(),
            ConfigureError::Plan(err) => err.to_diagnostic(),
        }
    }
}

/// Inputs to one configure run.
pub struct ConfigureOptions<'a> {
    pub recipe: &'a Recipe,
    pub catalog: &'a DependencyCatalog,
    pub overrides: &'a BTreeMap<String, OptionValue>,
    pub install_root: &'a Path,
    pub platform: Platform,
}

/// The complete output of a configure run: everything the external
/// build driver needs, serialized deterministically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Package name from the recipe.
    pub package: String,

    /// Package version from the recipe.
    pub version: Version,

    /// Platform the plan targets.
    pub platform: Platform,

    /// Install root the flags and env reference.
    pub install_root: String,

    /// Resolved option values, every declared option present.
    pub selection: SelectionSet,

    /// Resolved dependencies joined with install locations.
    pub dependencies: ResolvedDependencySet,

    /// Assembled build flags, in emission order.
    pub flags: Vec<String>,

    /// Ordered patch plan.
    pub patches: Vec<PatchOperation>,

    /// Launcher environment block, in variable name order.
    pub environment: BTreeMap<String, String>,

    /// SHA-256 over every field above. Two runs with the same inputs
    /// produce the same fingerprint.
    pub fingerprint: String,
}

/// Run the full configure pipeline.
pub fn configure(opts: &ConfigureOptions<'_>) -> Result<BuildConfig, ConfigureError> {
    let registry = OptionRegistry::from_recipe(opts.recipe)?;
    let selection = registry.resolve(opts.overrides)?;
    debug!(options = selection.len(), "selection resolved");

    let dependencies = resolve_dependencies(opts.recipe, &selection, opts.catalog)?;
    debug!(dependencies = dependencies.len(), "dependency set resolved");

    let ctx = TemplateContext::new(&dependencies, opts.install_root, &opts.platform);

    // Flag assembly and patch planning read disjoint rule tables.
    let (flags, patches) = rayon::join(
        || assemble_flags(opts.recipe, &selection, &ctx),
        || plan_patches(opts.recipe, &selection),
    );
    let flags = flags?;
    let patches = patches?;
    let environment = compose_environment(opts.recipe, &selection, &ctx)?;

    let fingerprint = fingerprint(
        opts.recipe,
        &opts.platform,
        opts.install_root,
        &selection,
        &dependencies,
        &flags,
        &patches,
        &environment,
    );
    info!(
        package = %opts.recipe.meta.name,
        flags = flags.len(),
        patches = patches.len(),
        %fingerprint,
        "configure complete"
    );

    Ok(BuildConfig {
        package: opts.recipe.meta.name.clone(),
        version: opts.recipe.meta.version.clone(),
        platform: opts.platform.clone(),
        install_root: opts.install_root.display().to_string(),
        selection,
        dependencies,
        flags,
        patches,
        environment,
        fingerprint,
    })
}

#[allow(clippy::too_many_arguments)]
fn fingerprint(
    recipe: &Recipe,
    platform: &Platform,
    install_root: &Path,
    selection: &SelectionSet,
    dependencies: &ResolvedDependencySet,
    flags: &[String],
    patches: &[PatchOperation],
    environment: &BTreeMap<String, String>,
) -> String {
    let mut fp = Fingerprint::new();
    fp.update_str(&recipe.meta.name)
        .update_str(&recipe.meta.version.to_string())
        .update_str(&platform.os)
        .update_str(&platform.arch)
        .update_str(&install_root.display().to_string());

    for (name, value) in selection.iter() {
        fp.update_str(name).update_str(&value.to_string());
    }
    for dep in dependencies.iter() {
        fp.update_str(&dep.name)
            .update_str(&dep.paths.prefix.display().to_string())
            .update_opt(dep.version.as_ref().map(|v| v.to_string()).as_deref());
    }
    fp.update_strs(flags.iter().map(|f| f.as_str()));
    for patch in patches {
        fp.update_str(&patch.source)
            .update_str(&patch.target)
            .update_str(&patch.order.to_string());
    }
    for (name, value) in environment {
        fp.update_str(name).update_str(value);
    }
    fp.finish_short()
}
