//! Share configuration
//!
//! Configuration loaded from `.gh-diff-share.toml`. Every field has a
//! default, so an absent or partial file is fine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration loaded from `.gh-diff-share.toml`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ShareConfig {
    /// Layout used when a request names none ("side-by-side" or "line-by-line")
    #[serde(default = "default_layout")]
    pub default_layout: String,

    /// Security level used when a request names none ("low", "medium", "high")
    #[serde(default = "default_security_level")]
    pub default_security_level: String,

    /// Prefix put in front of a gist raw URL to get a rendered page
    #[serde(default = "default_preview_base_url")]
    pub preview_base_url: String,

    /// Overrides the environment-derived local output directory
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Put shared pages behind an access-code form
    #[serde(default)]
    pub access_gate: bool,

    /// Delete locally written files after this many minutes
    #[serde(default)]
    pub local_cleanup_minutes: Option<u32>,
}

fn default_layout() -> String {
    "side-by-side".to_string()
}

fn default_security_level() -> String {
    "medium".to_string()
}

fn default_preview_base_url() -> String {
    "https://htmlpreview.github.io/?".to_string()
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            default_layout: default_layout(),
            default_security_level: default_security_level(),
            preview_base_url: default_preview_base_url(),
            output_dir: None,
            access_gate: false,
            local_cleanup_minutes: None,
        }
    }
}

impl ShareConfig {
    /// Load config from CWD first, then home directory, or use defaults
    pub fn load() -> Self {
        if let Some(content) = crate::load_config_file() {
            match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded share config from file");
                    return config;
                }
                Err(e) => {
                    log::warn!("Failed to parse config file: {}", e);
                }
            }
        }

        log::debug!("Using default share config");
        Self::default()
    }

    /// Load config from an explicit path; a missing or malformed file is an error
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}
