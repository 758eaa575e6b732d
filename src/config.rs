//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. Environment variables (`OTASIGN_*`)
//! 2. `.otasign.toml` in the project directory
//! 3. `~/.config/otasign/config.toml` (global defaults)
//! 4. Built-in defaults
//!
//! The original hook script hardcoded every path; keeping them in an
//! explicit structure lets the build system point different projects at
//! different keys and lets tests run against fixture tools.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants;
use crate::env::Env;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tool: ToolConfig,
    pub keys: KeysConfig,
    pub header: HeaderConfig,
    pub sign: SignConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool: ToolConfig::default(),
            keys: KeysConfig::default(),
            header: HeaderConfig::default(),
            sign: SignConfig::default(),
        }
    }
}

/// External signing tool location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Interpreter the signing tool runs under.
    pub interpreter: String,
    /// Path to the signing tool itself.
    pub script: PathBuf,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            interpreter: constants::DEFAULT_INTERPRETER.to_string(),
            script: PathBuf::from(constants::DEFAULT_SIGNING_SCRIPT),
        }
    }
}

/// Key material locations. Contents are never read by otasign.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeysConfig {
    /// Public key embedded into the firmware header at pre-build.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<PathBuf>,
    /// Private key used to sign the binary at post-build.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<PathBuf>,
}

/// Pre-build header generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// Where the signing tool writes the public-key header.
    pub out: PathBuf,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            out: PathBuf::from(constants::DEFAULT_HEADER_OUT),
        }
    }
}

/// Post-build signing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignConfig {
    /// Suffix appended to the binary path for the signed artifact.
    pub suffix: String,
    /// Remove an existing signed artifact before re-signing.
    pub clean_stale: bool,
}

impl Default for SignConfig {
    fn default() -> Self {
        Self {
            suffix: constants::DEFAULT_SIGNED_SUFFIX.to_string(),
            clean_stale: false,
        }
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads the global config, then the project-local config, then applies
    /// environment variable overrides, and finally expands `~/` prefixes in
    /// all path fields (there is no shell in the invocation path to do it).
    pub fn load(project_dir: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 3: global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        // Layer 2: project-local config
        if let Some(dir) = project_dir {
            let local_path = dir.join(constants::CONFIG_FILENAME);
            if local_path.exists() {
                let local = Self::load_file(&local_path)?;
                config.merge(local);
            }
        }

        // Layer 1: environment variables
        config.apply_env_vars(env);

        config.expand_paths();
        if let Some(dir) = project_dir {
            config.anchor_paths(dir);
        }
        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join("config.toml"))
    }

    /// Merge another config into this one (other takes precedence for non-default values).
    fn merge(&mut self, other: Config) {
        let default_tool = ToolConfig::default();
        if other.tool.interpreter != default_tool.interpreter {
            self.tool.interpreter = other.tool.interpreter;
        }
        if other.tool.script != default_tool.script {
            self.tool.script = other.tool.script;
        }

        if other.keys.public.is_some() {
            self.keys.public = other.keys.public;
        }
        if other.keys.private.is_some() {
            self.keys.private = other.keys.private;
        }

        if other.header.out != HeaderConfig::default().out {
            self.header.out = other.header.out;
        }

        let default_sign = SignConfig::default();
        if other.sign.suffix != default_sign.suffix {
            self.sign.suffix = other.sign.suffix;
        }
        if other.sign.clean_stale {
            self.sign.clean_stale = true;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Ok(val) = env.var(constants::ENV_INTERPRETER) {
            self.tool.interpreter = val;
        }
        if let Ok(val) = env.var(constants::ENV_SCRIPT) {
            self.tool.script = PathBuf::from(val);
        }
        if let Ok(val) = env.var(constants::ENV_PUBLIC_KEY) {
            self.keys.public = Some(PathBuf::from(val));
        }
        if let Ok(val) = env.var(constants::ENV_PRIVATE_KEY) {
            self.keys.private = Some(PathBuf::from(val));
        }
        if let Ok(val) = env.var(constants::ENV_HEADER_OUT) {
            self.header.out = PathBuf::from(val);
        }
        if let Ok(val) = env.var(constants::ENV_SIGNED_SUFFIX) {
            self.sign.suffix = val;
        }
        if let Ok(val) = env.var(constants::ENV_CLEAN_STALE) {
            match val.to_lowercase().as_str() {
                "false" | "0" | "no" | "off" => self.sign.clean_stale = false,
                "true" | "1" | "yes" | "on" => self.sign.clean_stale = true,
                _ => eprintln!(
                    "Warning: ignoring invalid {} value: {val}",
                    constants::ENV_CLEAN_STALE
                ),
            }
        }
    }

    /// Expand `~/` prefixes in every configured path.
    fn expand_paths(&mut self) {
        self.tool.script = expand_tilde(&self.tool.script);
        self.keys.public = self.keys.public.as_deref().map(expand_tilde);
        self.keys.private = self.keys.private.as_deref().map(expand_tilde);
        self.header.out = expand_tilde(&self.header.out);
    }

    /// Anchor relative paths to the project directory so hook behavior does
    /// not depend on the build system's working directory.
    fn anchor_paths(&mut self, dir: &Path) {
        self.tool.script = anchor(&self.tool.script, dir);
        self.keys.public = self.keys.public.as_deref().map(|p| anchor(p, dir));
        self.keys.private = self.keys.private.as_deref().map(|p| anchor(p, dir));
        self.header.out = anchor(&self.header.out, dir);
    }
}

fn anchor(path: &Path, dir: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        dir.join(path)
    }
}

/// Replace a leading `~` component with the user's home directory.
///
/// `~user` forms are left untouched. Paths are returned unchanged when no
/// home directory can be determined.
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}
