//! `rigging configure` command

use anyhow::{Context, Result};

use crate::cli::ConfigureArgs;
use crate::commands::run_configure;

pub fn execute(args: ConfigureArgs, color: bool) -> Result<()> {
    let config = run_configure(&args.plan, color)?;

    let json = serde_json::to_string_pretty(&config)
        .context("failed to serialize build configuration")?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("wrote {} ({})", path.display(), config.fingerprint);
        }
        None => println!("{}", json),
    }

    Ok(())
}
