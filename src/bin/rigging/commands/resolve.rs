//! `rigging resolve` command

use anyhow::Result;

use crate::cli::ResolveArgs;
use crate::commands::{fail, prepare};
use rigging::resolver::{resolve_dependencies, OptionRegistry};
use rigging::util::diagnostic::{self, Diagnostic};

pub fn execute(args: ResolveArgs, color: bool) -> Result<()> {
    let inputs = prepare(&args.plan, color)?;

    let registry = match OptionRegistry::from_recipe(&inputs.recipe) {
        Ok(registry) => registry,
        Err(e) => fail(e.to_diagnostic(), color),
    };
    let selection = match registry.resolve(&inputs.overrides) {
        Ok(selection) => selection,
        Err(e) => fail(e.to_diagnostic(), color),
    };
    let deps = match resolve_dependencies(&inputs.recipe, &selection, &inputs.catalog) {
        Ok(deps) => deps,
        Err(e) => fail(e.to_diagnostic(), color),
    };

    // Optional contributions the resolver silently skipped are worth a
    // heads-up when resolving interactively.
    for dep in inputs.recipe.dependencies() {
        let wanted = dep.when.as_ref().is_none_or(|w| w.matches(&selection));
        if wanted && dep.is_optional() && !deps.contains(&dep.name) {
            diagnostic::emit(
                &Diagnostic::warning(format!(
                    "optional dependency `{}` is not installed; continuing without it",
                    dep.name
                )),
                color,
            );
        }
    }

    println!("# Selection:");
    for (name, value) in selection.iter() {
        println!("  {} = {}", name, value);
    }

    println!("\n# Dependencies:");
    for dep in deps.iter() {
        let version = dep
            .version
            .as_ref()
            .map(|v| format!(" {}", v))
            .unwrap_or_default();
        println!(
            "  {}{} ({})    # from: {}",
            dep.name,
            version,
            dep.paths.prefix.display(),
            dep.required_by.join(", ")
        );
    }
    if deps.is_empty() {
        println!("  (none)");
    }

    Ok(())
}
