//! `rigging flags` command

use anyhow::Result;

use crate::cli::FlagsArgs;
use crate::commands::run_configure;

pub fn execute(args: FlagsArgs, color: bool) -> Result<()> {
    let config = run_configure(&args.plan, color)?;

    for flag in &config.flags {
        println!("{}", flag);
    }

    Ok(())
}
