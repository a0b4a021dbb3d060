//! `rigging patches` command

use anyhow::Result;

use crate::cli::PatchesArgs;
use crate::commands::run_configure;
use rigging::core::rules::PatchAction;

pub fn execute(args: PatchesArgs, color: bool) -> Result<()> {
    let config = run_configure(&args.plan, color)?;

    for patch in &config.patches {
        let action = match patch.action {
            PatchAction::Add => "add",
            PatchAction::Edit => "edit",
        };
        println!(
            "{:>5}  {:<4}  {} -> {}",
            patch.order, action, patch.source, patch.target
        );
    }
    if config.patches.is_empty() {
        println!("# no patches for this selection");
    }

    Ok(())
}
