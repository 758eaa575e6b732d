//! Signing tool interface: invocation assembly and child-process execution.
//!
//! The external signing tool is opaque to us. We only build argument
//! vectors, run the tool, and check that it behaved.

pub mod invocation;
pub mod runner;

use std::path::PathBuf;
use thiserror::Error;

/// Errors from invoking the signing tool.
#[derive(Error, Debug)]
pub enum SignerError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        source: std::io::Error,
    },

    #[error("signing tool failed ({status}): {stderr}")]
    ToolFailed { status: String, stderr: String },

    #[error("signing tool exited successfully but did not produce {0}")]
    MissingOutput(PathBuf),

    #[error("failed to remove stale signed artifact {path}: {source}")]
    CleanStale {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no {0} key configured (set keys.{0} in .otasign.toml or the OTASIGN_{1}_KEY environment variable)")]
    KeyNotConfigured(&'static str, &'static str),

    #[error("post-build hook received no build targets")]
    NoTargets,
}
