//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Rigging - a declarative build-configuration resolver for packaged software
#[derive(Parser)]
#[command(name = "rigging")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the options a recipe declares
    Options(OptionsArgs),

    /// Resolve option overrides into a full selection
    Resolve(ResolveArgs),

    /// Show the assembled build flags
    Flags(FlagsArgs),

    /// Show the ordered patch plan
    Patches(PatchesArgs),

    /// Show the launcher environment block
    Env(EnvArgs),

    /// Run the full pipeline and emit the build configuration as JSON
    Configure(ConfigureArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments shared by every planning command.
#[derive(Args)]
pub struct PlanArgs {
    /// Path to the recipe file
    #[arg(long, default_value = "Rigging.toml")]
    pub recipe: PathBuf,

    /// Path to the install catalog (TOML); omitted means empty
    #[arg(long, env = "RIGGING_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Option override, `name` or `name=value` (repeatable)
    #[arg(long = "with", value_name = "OPTION[=VALUE]")]
    pub with: Vec<String>,

    /// Install root that `${install_root}` expands to
    #[arg(long, default_value = "/usr/local")]
    pub install_root: PathBuf,

    /// Target OS: linux, macos, windows (defaults to the host)
    #[arg(long)]
    pub os: Option<String>,
}

#[derive(Args)]
pub struct OptionsArgs {
    /// Path to the recipe file
    #[arg(long, default_value = "Rigging.toml")]
    pub recipe: PathBuf,
}

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub plan: PlanArgs,
}

#[derive(Args)]
pub struct FlagsArgs {
    #[command(flatten)]
    pub plan: PlanArgs,
}

#[derive(Args)]
pub struct PatchesArgs {
    #[command(flatten)]
    pub plan: PlanArgs,
}

#[derive(Args)]
pub struct EnvArgs {
    #[command(flatten)]
    pub plan: PlanArgs,

    /// Print as shell `export` statements
    #[arg(long)]
    pub export: bool,
}

#[derive(Args)]
pub struct ConfigureArgs {
    #[command(flatten)]
    pub plan: PlanArgs,

    /// Write the configuration to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
