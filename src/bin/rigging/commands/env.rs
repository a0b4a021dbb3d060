//! `rigging env` command

use anyhow::Result;

use crate::cli::EnvArgs;
use crate::commands::run_configure;

pub fn execute(args: EnvArgs, color: bool) -> Result<()> {
    let config = run_configure(&args.plan, color)?;

    for (name, value) in &config.environment {
        if args.export {
            println!("export {}=\"{}\"", name, value);
        } else {
            println!("{}={}", name, value);
        }
    }

    Ok(())
}
