//! Aster CLI — the command-line interface for the Aster asset pipeline.
//!
//! Provides `aster init` for project scaffolding, `aster build` for building
//! script, stylesheet and template bundles, and `aster clean` for removing
//! the persisted module cache.

#![warn(missing_docs)]

mod build;
mod clean;
mod init;
mod logging;
mod pipeline;

use std::process;

use clap::{Parser, Subcommand};

/// Aster — bundles scripts, stylesheets and templates with a persistent cache.
#[derive(Parser, Debug)]
#[command(name = "aster", version, about = "Aster asset pipeline")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `aster.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new Aster project.
    Init {
        /// Project name (creates a subdirectory). If omitted, initializes in
        /// the current directory.
        name: Option<String>,
    },
    /// Build every bundle declared in `aster.toml`.
    Build(BuildArgs),
    /// Remove the persisted module cache.
    Clean,
}

/// Arguments for the `aster build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Ignore and do not write the module cache.
    #[arg(long)]
    pub no_cache: bool,

    /// Output directory (overrides `build.output` from `aster.toml`).
    #[arg(short, long)]
    pub out: Option<String>,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    logging::init(&global);

    let result = match cli.command {
        Command::Init { name } => init::run(name, &global),
        Command::Build(ref args) => build::run(args, &global),
        Command::Clean => clean::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
