//! `dimcheck.toml` settings
//!
//! Every field has a default, so an empty or missing file is valid.

use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for when no explicit path is given
pub const CONFIG_FILE: &str = "dimcheck.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub check: CheckConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    /// Treat warnings as errors
    pub deny_warnings: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Print the type of every declaration after checking
    pub show_types: bool,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text)
            .into_diagnostic()
            .wrap_err("invalid configuration")
    }

    /// Load an explicit config file; it must exist
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| miette::miette!("Failed to read config file {}: {}", path.display(), e))?;
        Self::from_toml_str(&text).wrap_err_with(|| format!("in {}", path.display()))
    }

    /// Find `dimcheck.toml` next to `input`, then in the working directory.
    /// Falls back to defaults when neither exists.
    pub fn discover(input: &Path) -> Result<Self> {
        match Self::locate(input) {
            Some(path) => {
                tracing::debug!("using config {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    fn locate(input: &Path) -> Option<PathBuf> {
        let beside_input = input.parent().map(|dir| dir.join(CONFIG_FILE));
        let cwd = PathBuf::from(CONFIG_FILE);
        beside_input.into_iter().chain([cwd]).find(|p| p.is_file())
    }
}
