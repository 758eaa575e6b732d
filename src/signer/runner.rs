//! Child-process execution for signing tool invocations.
//!
//! Shells out via `tokio::process::Command` with an explicit argument
//! vector. Blocking from the caller's perspective: one invocation, run to
//! completion, no timeout and no retries. If the tool hangs, the hook
//! hangs, which is the contract the host build system expects.

use tokio::process::Command;

use super::invocation::Invocation;
use super::SignerError;

/// Run an invocation to completion and return its captured stdout.
///
/// A launch failure (missing interpreter, missing tool) and a non-zero
/// exit are both hard errors; stderr is captured into the error so the
/// build log shows what the tool complained about.
pub async fn run(invocation: &Invocation) -> Result<String, SignerError> {
    let output = Command::new(&invocation.program)
        .args(&invocation.args)
        .output()
        .await
        .map_err(|e| SignerError::Launch {
            program: invocation.program.to_string_lossy().into_owned(),
            source: e,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(SignerError::ToolFailed {
            status: output.status.to_string(),
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
