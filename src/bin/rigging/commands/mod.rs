//! Command implementations

pub mod completions;
pub mod configure;
pub mod env;
pub mod flags;
pub mod options;
pub mod patches;
pub mod resolve;

use std::collections::BTreeMap;

use anyhow::Result;

use crate::cli::PlanArgs;
use rigging::core::catalog::DependencyCatalog;
use rigging::core::option::OptionValue;
use rigging::core::platform::Platform;
use rigging::core::recipe::Recipe;
use rigging::ops::{self, BuildConfig, ConfigureOptions};
use rigging::resolver::OptionRegistry;
use rigging::util::diagnostic::{self, Diagnostic, RecipeNotFoundError};

/// Everything a planning command needs, loaded and parsed.
pub(crate) struct PlanInputs {
    pub recipe: Recipe,
    pub catalog: DependencyCatalog,
    pub overrides: BTreeMap<String, OptionValue>,
    pub platform: Platform,
}

/// Emit a domain diagnostic and exit with failure.
pub(crate) fn fail(diag: Diagnostic, color: bool) -> ! {
    diagnostic::emit(&diag, color);
    std::process::exit(1);
}

/// Load the recipe and catalog and parse `--with` overrides.
pub(crate) fn prepare(args: &PlanArgs, color: bool) -> Result<PlanInputs> {
    if !args.recipe.exists() {
        return Err(RecipeNotFoundError {
            path: args.recipe.display().to_string(),
        }
        .into());
    }
    let recipe = Recipe::load(&args.recipe)?;
    let catalog = match &args.catalog {
        Some(path) => DependencyCatalog::load(path)?,
        None => DependencyCatalog::new(),
    };

    let registry = match OptionRegistry::from_recipe(&recipe) {
        Ok(registry) => registry,
        Err(e) => fail(e.to_diagnostic(), color),
    };

    let mut overrides = BTreeMap::new();
    for raw in &args.with {
        let (name, value) = match raw.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (raw.as_str(), None),
        };
        match registry.parse_override(name, value) {
            Ok(value) => {
                overrides.insert(name.to_string(), value);
            }
            Err(e) => fail(e.to_diagnostic(), color),
        }
    }

    let platform = match &args.os {
        Some(os) => Platform::for_os(os),
        None => Platform::host(),
    };

    Ok(PlanInputs {
        recipe,
        catalog,
        overrides,
        platform,
    })
}

/// Run the full configure pipeline for a planning command.
pub(crate) fn run_configure(args: &PlanArgs, color: bool) -> Result<BuildConfig> {
    let inputs = prepare(args, color)?;
    let opts = ConfigureOptions {
        recipe: &inputs.recipe,
        catalog: &inputs.catalog,
        overrides: &inputs.overrides,
        install_root: &args.install_root,
        platform: inputs.platform,
    };
    match ops::configure(&opts) {
        Ok(config) => Ok(config),
        Err(e) => fail(e.to_diagnostic(), color),
    }
}
