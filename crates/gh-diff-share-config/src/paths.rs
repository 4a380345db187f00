//! Cache and output directory paths
//!
//! Uses XDG directories via `dirs` crate.
//!
//! Platform-specific cache locations:
//! - Linux: `~/.cache/gh-diff-share/`
//! - macOS: `~/Library/Caches/gh-diff-share/`
//! - Windows: `%LOCALAPPDATA%\gh-diff-share\`

use crate::environment::DeploymentContext;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "gh-diff-share";

/// Output directory used by hosted deployments
pub const HOSTED_OUTPUT_DIR: &str = "/tmp/gh-diff-share/output";

/// Get the application cache directory
/// Returns ~/.cache/gh-diff-share/ on Linux, ~/Library/Caches/gh-diff-share/ on macOS
pub fn cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Could not determine cache directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Where local artifacts are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLocation {
    /// Fixed directory, the deployment's working directory is not writable
    Hosted,
    /// `output/` below the given working directory
    Local { cwd: PathBuf },
    /// Directory named in the config file
    Configured(PathBuf),
}

impl OutputLocation {
    /// Pick the location for a deployment; a configured directory wins
    pub fn resolve(
        deployment: DeploymentContext,
        cwd: &Path,
        configured: Option<&Path>,
    ) -> Self {
        match (configured, deployment) {
            (Some(dir), _) => OutputLocation::Configured(dir.to_path_buf()),
            (None, DeploymentContext::Hosted) => OutputLocation::Hosted,
            (None, DeploymentContext::Local) => OutputLocation::Local {
                cwd: cwd.to_path_buf(),
            },
        }
    }

    pub fn dir(&self) -> PathBuf {
        match self {
            OutputLocation::Hosted => PathBuf::from(HOSTED_OUTPUT_DIR),
            OutputLocation::Local { cwd } => cwd.join("output"),
            OutputLocation::Configured(dir) => dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cache_dir_exists() {
        let dir = cache_dir().unwrap();
        assert!(dir.exists());
        assert!(dir.ends_with(APP_NAME));
    }

    #[test]
    fn test_resolve_local() {
        let loc = OutputLocation::resolve(DeploymentContext::Local, Path::new("/work"), None);
        assert_eq!(loc.dir(), PathBuf::from("/work/output"));
    }

    #[test]
    fn test_resolve_hosted_ignores_cwd() {
        let loc = OutputLocation::resolve(DeploymentContext::Hosted, Path::new("/app"), None);
        assert_eq!(loc, OutputLocation::Hosted);
        assert_eq!(loc.dir(), PathBuf::from(HOSTED_OUTPUT_DIR));
    }

    #[test]
    fn test_configured_dir_wins() {
        let loc = OutputLocation::resolve(
            DeploymentContext::Hosted,
            Path::new("/app"),
            Some(Path::new("/data/out")),
        );
        assert_eq!(loc.dir(), PathBuf::from("/data/out"));
    }
}
