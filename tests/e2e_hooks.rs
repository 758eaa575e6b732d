//! End-to-end tests for the pre-build and post-build hooks.
//!
//! Each test points the config at a small shell script standing in for the
//! external signing tool, then drives the hooks through the public library
//! API and inspects the filesystem afterwards.

use std::path::{Path, PathBuf};

use otasign::config::Config;
use otasign::hooks::{self, HookOptions};
use otasign::signer::SignerError;

const QUIET: HookOptions = HookOptions {
    dry_run: false,
    quiet: true,
};

const DRY: HookOptions = HookOptions {
    dry_run: true,
    quiet: true,
};

/// Write a fake signing tool into `dir` and return its path.
///
/// The preamble records every received argument into `args.txt` next to
/// the script, then `body` runs with the full argument list.
fn write_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    let script = format!(
        "printf '%s\\n' \"$@\" > \"$(dirname \"$0\")/args.txt\"\n{body}\n"
    );
    std::fs::write(&path, script).unwrap();
    path
}

/// A tool that faithfully writes its `--out` argument.
fn write_signing_tool(dir: &Path) -> PathBuf {
    write_tool(
        dir,
        "signing.sh",
        r#"
out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "--out" ]; then out="$arg"; fi
  prev="$arg"
done
echo "signed by fake tool" > "$out"
"#,
    )
}

fn recorded_args(dir: &Path) -> Vec<String> {
    let content = std::fs::read_to_string(dir.join("args.txt")).unwrap();
    content.lines().map(str::to_string).collect()
}

fn test_config(dir: &Path, tool: &Path) -> Config {
    let mut config = Config::default();
    config.tool.interpreter = "sh".to_string();
    config.tool.script = tool.to_path_buf();
    config.keys.public = Some(dir.join("public.key"));
    config.keys.private = Some(dir.join("private.key"));
    config.header.out = dir.join("OTAPublicKey.h");
    config
}

// ---------------------------------------------------------------------------
// pre-build
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pre_build_writes_header() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_signing_tool(dir.path());
    let config = test_config(dir.path(), &tool);

    let header = hooks::pre_build(&config, &QUIET).await.unwrap();

    assert_eq!(header, dir.path().join("OTAPublicKey.h"));
    assert!(header.exists(), "header file should have been written");
    assert_eq!(
        recorded_args(dir.path()),
        vec![
            "--mode".to_string(),
            "header".to_string(),
            "--publickey".to_string(),
            dir.path().join("public.key").display().to_string(),
            "--out".to_string(),
            header.display().to_string(),
        ]
    );
}

#[tokio::test]
async fn pre_build_fails_without_public_key() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_signing_tool(dir.path());
    let mut config = test_config(dir.path(), &tool);
    config.keys.public = None;

    let err = hooks::pre_build(&config, &QUIET).await.unwrap_err();
    assert!(matches!(err, SignerError::KeyNotConfigured("public", _)));
    assert!(err.to_string().contains("keys.public"), "got: {err}");
}

#[tokio::test]
async fn pre_build_fails_on_tool_error() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_tool(dir.path(), "broken.sh", "echo 'cannot read key' >&2\nexit 2");
    let config = test_config(dir.path(), &tool);

    let err = hooks::pre_build(&config, &QUIET).await.unwrap_err();
    match err {
        SignerError::ToolFailed { status, stderr } => {
            assert!(status.contains('2'), "got status: {status}");
            assert!(stderr.contains("cannot read key"), "got stderr: {stderr}");
        }
        other => panic!("expected ToolFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn pre_build_fails_when_header_not_produced() {
    let dir = tempfile::tempdir().unwrap();
    // Exits cleanly without writing anything.
    let tool = write_tool(dir.path(), "noop.sh", "exit 0");
    let config = test_config(dir.path(), &tool);

    let err = hooks::pre_build(&config, &QUIET).await.unwrap_err();
    match err {
        SignerError::MissingOutput(path) => {
            assert_eq!(path, dir.path().join("OTAPublicKey.h"));
        }
        other => panic!("expected MissingOutput, got: {other:?}"),
    }
}

#[tokio::test]
async fn pre_build_dry_run_executes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_signing_tool(dir.path());
    let config = test_config(dir.path(), &tool);

    let header = hooks::pre_build(&config, &DRY).await.unwrap();

    assert_eq!(header, dir.path().join("OTAPublicKey.h"));
    assert!(!header.exists(), "dry run must not invoke the tool");
    assert!(!dir.path().join("args.txt").exists());
}

// ---------------------------------------------------------------------------
// post-build
// ---------------------------------------------------------------------------

#[tokio::test]
async fn post_build_signs_first_target() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_signing_tool(dir.path());
    let config = test_config(dir.path(), &tool);

    let binary = dir.path().join("firmware.bin");
    std::fs::write(&binary, b"\x00firmware image").unwrap();
    let other = dir.path().join("firmware.elf");

    let output = hooks::post_build(&config, &[binary.clone(), other], &QUIET)
        .await
        .unwrap();

    assert_eq!(output, dir.path().join("firmware.bin.signed"));
    assert!(output.exists(), "signed artifact should have been written");
    // The original binary is left untouched.
    assert_eq!(std::fs::read(&binary).unwrap(), b"\x00firmware image");
    assert_eq!(
        recorded_args(dir.path()),
        vec![
            "--mode".to_string(),
            "sign".to_string(),
            "--privatekey".to_string(),
            dir.path().join("private.key").display().to_string(),
            "--bin".to_string(),
            binary.display().to_string(),
            "--out".to_string(),
            output.display().to_string(),
        ]
    );
}

#[tokio::test]
async fn post_build_with_no_targets_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_signing_tool(dir.path());
    let config = test_config(dir.path(), &tool);

    let err = hooks::post_build(&config, &[], &QUIET).await.unwrap_err();
    assert!(matches!(err, SignerError::NoTargets));
}

#[tokio::test]
async fn post_build_fails_without_private_key() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_signing_tool(dir.path());
    let mut config = test_config(dir.path(), &tool);
    config.keys.private = None;

    let err = hooks::post_build(&config, &[dir.path().join("fw.bin")], &QUIET)
        .await
        .unwrap_err();
    assert!(matches!(err, SignerError::KeyNotConfigured("private", _)));
    assert!(err.to_string().contains("keys.private"), "got: {err}");
}

#[tokio::test]
async fn post_build_reruns_target_the_same_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_signing_tool(dir.path());
    let config = test_config(dir.path(), &tool);

    let binary = dir.path().join("firmware.bin");
    std::fs::write(&binary, b"image").unwrap();

    let first = hooks::post_build(&config, &[binary.clone()], &QUIET)
        .await
        .unwrap();
    let second = hooks::post_build(&config, &[binary], &QUIET).await.unwrap();

    assert_eq!(first, second, "re-signing must overwrite the same path");
    assert!(second.exists());
}

#[tokio::test]
async fn post_build_custom_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_signing_tool(dir.path());
    let mut config = test_config(dir.path(), &tool);
    config.sign.suffix = ".sig".to_string();

    let binary = dir.path().join("firmware.bin");
    std::fs::write(&binary, b"image").unwrap();

    let output = hooks::post_build(&config, &[binary], &QUIET).await.unwrap();
    assert_eq!(output, dir.path().join("firmware.bin.sig"));
    assert!(output.exists());
}

#[tokio::test]
async fn post_build_dry_run_derives_path_without_side_effects() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_signing_tool(dir.path());
    let config = test_config(dir.path(), &tool);

    let output = hooks::post_build(
        &config,
        &[PathBuf::from("build/firmware.bin")],
        &DRY,
    )
    .await
    .unwrap();

    assert_eq!(output, PathBuf::from("build/firmware.bin.signed"));
    assert!(!dir.path().join("args.txt").exists());
}

// ---------------------------------------------------------------------------
// stale artifact handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn clean_stale_removes_previous_artifact_before_signing() {
    let dir = tempfile::tempdir().unwrap();
    // Tool that writes nothing: if the stale artifact survives, the
    // existence check would wrongly pass.
    let tool = write_tool(dir.path(), "noop.sh", "exit 0");
    let mut config = test_config(dir.path(), &tool);
    config.sign.clean_stale = true;

    let binary = dir.path().join("firmware.bin");
    std::fs::write(&binary, b"image").unwrap();
    let stale = dir.path().join("firmware.bin.signed");
    std::fs::write(&stale, b"old signature").unwrap();

    let err = hooks::post_build(&config, &[binary], &QUIET).await.unwrap_err();

    assert!(matches!(err, SignerError::MissingOutput(_)), "got: {err:?}");
    assert!(!stale.exists(), "stale artifact should have been removed");
}

#[tokio::test]
async fn stale_artifact_satisfies_check_when_cleanup_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_tool(dir.path(), "noop.sh", "exit 0");
    let config = test_config(dir.path(), &tool);

    let binary = dir.path().join("firmware.bin");
    std::fs::write(&binary, b"image").unwrap();
    let stale = dir.path().join("firmware.bin.signed");
    std::fs::write(&stale, b"old signature").unwrap();

    // With clean_stale off a leftover artifact passes the existence check.
    let output = hooks::post_build(&config, &[binary], &QUIET).await.unwrap();
    assert_eq!(output, stale);
}

#[tokio::test]
async fn clean_stale_with_no_previous_artifact_is_fine() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_signing_tool(dir.path());
    let mut config = test_config(dir.path(), &tool);
    config.sign.clean_stale = true;

    let binary = dir.path().join("firmware.bin");
    std::fs::write(&binary, b"image").unwrap();

    let output = hooks::post_build(&config, &[binary], &QUIET).await.unwrap();
    assert!(output.exists());
}

// ---------------------------------------------------------------------------
// config-driven end to end
// ---------------------------------------------------------------------------

#[tokio::test]
async fn hooks_run_from_project_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_signing_tool(dir.path());

    std::fs::write(
        dir.path().join(".otasign.toml"),
        format!(
            r#"
[tool]
interpreter = "sh"
script = "{tool}"

[keys]
public = "keys/public.key"
private = "keys/private.key"

[header]
out = "generated/OTAPublicKey.h"
"#,
            tool = tool.display()
        ),
    )
    .unwrap();
    std::fs::create_dir(dir.path().join("generated")).unwrap();

    let env = otasign::env::Env::real();
    let config = Config::load(Some(dir.path()), &env).unwrap();

    // Relative config paths are anchored to the project directory.
    assert_eq!(
        config.header.out,
        dir.path().join("generated/OTAPublicKey.h")
    );
    assert_eq!(
        config.keys.public,
        Some(dir.path().join("keys/public.key"))
    );

    let header = hooks::pre_build(&config, &QUIET).await.unwrap();
    assert!(header.exists());
}
