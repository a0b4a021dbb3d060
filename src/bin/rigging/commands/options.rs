//! `rigging options` command

use anyhow::Result;

use crate::cli::OptionsArgs;
use rigging::core::option::OptionKind;
use rigging::core::recipe::Recipe;

pub fn execute(args: OptionsArgs) -> Result<()> {
    let recipe = Recipe::load(&args.recipe)?;

    println!("Options for `{}` {}:", recipe.meta.name, recipe.meta.version);

    for opt in recipe.options() {
        let kind = match opt.kind {
            OptionKind::Bool => "bool".to_string(),
            OptionKind::Enum => format!("enum [{}]", opt.values.join(", ")),
        };
        println!("  {:<20} {}", opt.name, kind);

        println!("    default: {}", opt.effective_default());
        if let Some(description) = &opt.description {
            println!("    {}", description);
        }
        if !opt.requires.is_empty() {
            println!("    requires: {}", opt.requires.join(", "));
        }
        if !opt.conflicts.is_empty() {
            println!("    conflicts: {}", opt.conflicts.join(", "));
        }
    }

    if recipe.options().count() == 0 {
        println!("  (none)");
    }

    Ok(())
}
