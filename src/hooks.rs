//! The two build lifecycle operations.
//!
//! `pre_build` runs before the firmware sources are compiled and rewrites
//! the public-key header. `post_build` runs after the build system has
//! produced the firmware binary and writes the detached signed artifact
//! next to it. Both run the external signing tool exactly once and verify
//! that the file it promised to write actually exists; any violation is a
//! hard error so the host build aborts instead of shipping an unsigned or
//! stale binary.

use std::io::Write;
use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::config::Config;
use crate::signer::invocation::{self, Invocation};
use crate::signer::{runner, SignerError};

/// Options shared by both hook entry points.
#[derive(Debug, Clone, Copy, Default)]
pub struct HookOptions {
    /// Print the assembled invocation without executing it.
    pub dry_run: bool,
    /// Suppress all status output.
    pub quiet: bool,
}

/// Pre-build hook: regenerate the public-key header.
///
/// Returns the header path on success.
pub async fn pre_build(config: &Config, opts: &HookOptions) -> Result<PathBuf, SignerError> {
    let public_key = config
        .keys
        .public
        .as_deref()
        .ok_or(SignerError::KeyNotConfigured("public", "PUBLIC"))?;
    let header_out = config.header.out.clone();

    let inv = invocation::header_mode(
        &config.tool.interpreter,
        &config.tool.script,
        public_key,
        &header_out,
    );

    if opts.dry_run {
        println!("{}", inv.render());
        return Ok(header_out);
    }

    status(opts, &format!("Generating {}", header_out.display()));
    echo_invocation(opts, &inv);

    let stdout = runner::run(&inv).await?;
    forward_tool_output(opts, &stdout);

    if !header_out.exists() {
        return Err(SignerError::MissingOutput(header_out));
    }

    done(opts, &format!("public-key header written to {}", header_out.display()));
    Ok(header_out)
}

/// Post-build hook: sign the produced firmware binary.
///
/// The host build system passes its resolved target list; the first entry
/// is the artifact to sign. Returns the signed output path on success.
pub async fn post_build(
    config: &Config,
    targets: &[PathBuf],
    opts: &HookOptions,
) -> Result<PathBuf, SignerError> {
    let target = targets.first().ok_or(SignerError::NoTargets)?;
    let private_key = config
        .keys
        .private
        .as_deref()
        .ok_or(SignerError::KeyNotConfigured("private", "PRIVATE"))?;

    let output = invocation::signed_output_path(target, &config.sign.suffix);

    let inv = invocation::sign_mode(
        &config.tool.interpreter,
        &config.tool.script,
        private_key,
        target,
        &output,
    );

    if opts.dry_run {
        println!("{}", inv.render());
        return Ok(output);
    }

    if config.sign.clean_stale {
        remove_stale(&output, opts).await?;
    }

    status(opts, &format!("Signing {}", target.display()));
    echo_invocation(opts, &inv);

    let stdout = runner::run(&inv).await?;
    forward_tool_output(opts, &stdout);

    if !output.exists() {
        return Err(SignerError::MissingOutput(output));
    }

    done(opts, &format!("signed artifact written to {}", output.display()));
    Ok(output)
}

/// Remove a previous signed artifact so a tool failure can't leave a stale
/// one in place that passes the existence check.
async fn remove_stale(output: &Path, opts: &HookOptions) -> Result<(), SignerError> {
    match tokio::fs::remove_file(output).await {
        Ok(()) => {
            status(opts, &format!("Removed stale {}", output.display()));
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SignerError::CleanStale {
            path: output.to_path_buf(),
            source: e,
        }),
    }
}

fn status(opts: &HookOptions, message: &str) {
    if !opts.quiet {
        eprintln!("  {message}");
    }
}

fn echo_invocation(opts: &HookOptions, inv: &Invocation) {
    if !opts.quiet {
        eprintln!("  {} {}", "$".dimmed(), inv.render().dimmed());
    }
}

fn done(opts: &HookOptions, message: &str) {
    if !opts.quiet {
        eprintln!("  {} {message}", "✔".green().bold());
    }
}

/// Relay whatever the tool printed into the build log.
fn forward_tool_output(opts: &HookOptions, stdout: &str) {
    if opts.quiet || stdout.trim().is_empty() {
        return;
    }
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    for line in stdout.lines() {
        let _ = writeln!(handle, "  {}", line.dimmed());
    }
    let _ = handle.flush();
}
