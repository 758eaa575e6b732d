//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! and built-in defaults so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "otasign";

/// Local config filename (e.g. `.otasign.toml` in the project root).
pub const CONFIG_FILENAME: &str = ".otasign.toml";

/// Directory name under `~/.config/` for the global config.
pub const CONFIG_DIR: &str = "otasign";

/// Crate version from Cargo.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compilation target triple (exported by `build.rs`).
pub const TARGET: &str = env!("TARGET");


// ── Built-in defaults ───────────────────────────────────────────────

/// Interpreter used to run the signing tool.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Signing tool shipped with the ESP8266 Arduino framework.
pub const DEFAULT_SIGNING_SCRIPT: &str =
    "~/.platformio/packages/framework-arduinoespressif8266/tools/signing.py";

/// Header file the firmware sources include for the embedded public key.
pub const DEFAULT_HEADER_OUT: &str = "src/OTAPublicKey.h";

/// Suffix appended to the binary path for the signed artifact.
pub const DEFAULT_SIGNED_SUFFIX: &str = ".signed";


// ── Environment variable names ──────────────────────────────────────

pub const ENV_INTERPRETER: &str = "OTASIGN_INTERPRETER";
pub const ENV_SCRIPT: &str = "OTASIGN_SCRIPT";
pub const ENV_PUBLIC_KEY: &str = "OTASIGN_PUBLIC_KEY";
pub const ENV_PRIVATE_KEY: &str = "OTASIGN_PRIVATE_KEY";
pub const ENV_HEADER_OUT: &str = "OTASIGN_HEADER_OUT";
pub const ENV_SIGNED_SUFFIX: &str = "OTASIGN_SIGNED_SUFFIX";
pub const ENV_CLEAN_STALE: &str = "OTASIGN_CLEAN_STALE";
