//! Configuration and environment for gh-diff-share
//!
//! This crate provides:
//! - Configuration file loading (TOML)
//! - Share configuration (ShareConfig)
//! - Runtime environment read once at startup (RuntimeEnvironment)
//! - Output and cache directory paths

pub mod app_config;
pub mod config_file;
pub mod environment;
pub mod paths;

pub use app_config::ShareConfig;
pub use config_file::{find_config_file, load_config_file};
pub use environment::{load_dotenv, DeploymentContext, OutputMode, RuntimeEnvironment};
pub use paths::{cache_dir, OutputLocation, HOSTED_OUTPUT_DIR};
