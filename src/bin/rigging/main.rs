//! Rigging CLI - declarative build-configuration resolver

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("rigging=debug")
    } else {
        EnvFilter::new("rigging=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let color = !cli.no_color;

    // Execute command
    match cli.command {
        Commands::Options(args) => commands::options::execute(args),
        Commands::Resolve(args) => commands::resolve::execute(args, color),
        Commands::Flags(args) => commands::flags::execute(args, color),
        Commands::Patches(args) => commands::patches::execute(args, color),
        Commands::Env(args) => commands::env::execute(args, color),
        Commands::Configure(args) => commands::configure::execute(args, color),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
