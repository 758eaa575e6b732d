//! Clap argument types for the hook entry points.
//!
//! Uses clap derive macros for ergonomic argument definitions. The host
//! build system calls `pre-build` once before compiling sources and
//! `post-build` with its resolved target list once the binary exists.

use clap::Parser;
use std::path::PathBuf;

use otasign::constants;

/// OTA firmware signing hooks for build pipelines.
#[derive(Parser, Debug)]
#[command(name = constants::APP_NAME, version = constants::VERSION)]
pub struct Cli {
    /// Suppress all non-essential output.
    #[arg(long, short = 'q', global = true, default_value_t = false)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Regenerate the public-key header before sources are compiled.
    PreBuild(HookArgs),

    /// Sign the firmware binary the build produced.
    PostBuild(PostBuildArgs),

    /// Inspect the effective configuration.
    Config {
        /// Project directory containing .otasign.toml (default: current directory).
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Print version and build information.
    Version,
}

/// Arguments shared by both hook entry points.
#[derive(Parser, Debug)]
pub struct HookArgs {
    /// Project directory containing .otasign.toml (default: current directory).
    #[arg(long, default_value = ".")]
    pub project_dir: PathBuf,

    /// Print the assembled invocation without executing it.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

/// Arguments for the `post-build` subcommand.
#[derive(Parser, Debug)]
pub struct PostBuildArgs {
    #[command(flatten)]
    pub hook: HookArgs,

    /// Build target paths as resolved by the host build system.
    /// The first target is the binary to sign.
    #[arg(required = true)]
    pub targets: Vec<PathBuf>,
}

/// Config inspection subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective merged configuration.
    Show {
        /// Emit JSON instead of TOML.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the project config file path.
    Path {
        /// Print the global config file path instead.
        #[arg(long, default_value_t = false)]
        global: bool,
    },
}
