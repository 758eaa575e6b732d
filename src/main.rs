//! otasign — OTA firmware signing build hooks.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages; a failed hook
//! exits non-zero so the host build aborts.

mod cli;

use std::path::Path;
use std::process;

use anyhow::{bail, Context, Result};
use clap::Parser;

use otasign::config::Config;
use otasign::constants;
use otasign::env::Env;
use otasign::hooks::{self, HookOptions};

use cli::{Cli, Command, ConfigAction, HookArgs, PostBuildArgs};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let quiet = cli.quiet;

    match cli.command {
        Command::PreBuild(args) => run_pre_build(args, quiet).await,
        Command::PostBuild(args) => run_post_build(args, quiet).await,
        Command::Config {
            project_dir,
            action,
        } => run_config(&project_dir, action),
        Command::Version => run_version(),
    }
}

/// Canonicalize the project directory and load the layered configuration.
fn load_config(project_dir: &Path) -> Result<Config> {
    let dir = std::fs::canonicalize(project_dir)
        .with_context(|| format!("--project-dir not found: {}", project_dir.display()))?;
    Config::load(Some(&dir), &Env::real()).context("failed to load configuration")
}

/// Run the pre-build hook: regenerate the public-key header.
async fn run_pre_build(args: HookArgs, quiet: bool) -> Result<()> {
    let config = load_config(&args.project_dir)?;
    let opts = HookOptions {
        dry_run: args.dry_run,
        quiet,
    };
    hooks::pre_build(&config, &opts)
        .await
        .context("pre-build hook failed")?;
    Ok(())
}

/// Run the post-build hook: sign the produced firmware binary.
async fn run_post_build(args: PostBuildArgs, quiet: bool) -> Result<()> {
    let config = load_config(&args.hook.project_dir)?;
    let opts = HookOptions {
        dry_run: args.hook.dry_run,
        quiet,
    };
    hooks::post_build(&config, &args.targets, &opts)
        .await
        .context("post-build hook failed")?;
    Ok(())
}

/// Inspect the effective configuration.
fn run_config(project_dir: &Path, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show { json } => {
            let config = load_config(project_dir)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
        ConfigAction::Path { global } => {
            if global {
                match Config::global_config_path() {
                    Some(p) => println!("{}", p.display()),
                    None => bail!("global config directory could not be determined"),
                }
            } else {
                println!(
                    "{}",
                    project_dir.join(constants::CONFIG_FILENAME).display()
                );
            }
        }
    }
    Ok(())
}

/// Print detailed version and build information.
fn run_version() -> Result<()> {
    use colored::Colorize;

    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    println!("{}  {}", "target:".dimmed(), constants::TARGET);
    Ok(())
}
