//! Process environment, read once at startup.
//!
//! Everything the delivery pipeline needs from the environment is captured
//! in [`RuntimeEnvironment`] so later stages never consult `std::env`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variables whose presence marks a hosted deployment.
const HOSTED_MARKERS: [&str; 4] = ["SMITHERY", "VERCEL", "CF_PAGES", "RENDER"];

/// Where the process runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeploymentContext {
    /// On the user's machine, with a browsable filesystem and a desktop.
    #[default]
    Local,
    /// In a remote container; local paths mean nothing to the user.
    Hosted,
}

impl DeploymentContext {
    pub fn is_hosted(&self) -> bool {
        matches!(self, DeploymentContext::Hosted)
    }

    /// Decide from an explicit flag, falling back to platform markers and
    /// the `/app` working-directory convention of container images.
    fn detect(lookup: &dyn Fn(&str) -> Option<String>, cwd: &Path) -> Self {
        if let Some(flag) = lookup("GH_DIFF_SHARE_HOSTED") {
            if let Some(hosted) = parse_bool(&flag) {
                return if hosted {
                    DeploymentContext::Hosted
                } else {
                    DeploymentContext::Local
                };
            }
            log::warn!("Ignoring GH_DIFF_SHARE_HOSTED={:?}", flag);
        }

        if HOSTED_MARKERS.iter().any(|name| lookup(name).is_some()) || cwd.starts_with("/app") {
            DeploymentContext::Hosted
        } else {
            DeploymentContext::Local
        }
    }
}

/// Default artifact of the output-file tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    #[default]
    Html,
    Image,
    Both,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(OutputMode::Html),
            "image" => Ok(OutputMode::Image),
            "both" => Ok(OutputMode::Both),
            other => Err(format!(
                "unknown output type '{}', expected 'html', 'image' or 'both'",
                other
            )),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputMode::Html => "html",
            OutputMode::Image => "image",
            OutputMode::Both => "both",
        })
    }
}

/// Snapshot of the process environment.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RuntimeEnvironment {
    /// `GITHUB_TOKEN`, else `GH_TOKEN`
    pub github_token: Option<String>,
    /// `DEFAULT_AUTO_OPEN`
    pub default_auto_open: bool,
    /// `DEFAULT_OUTPUT_MODE`
    pub default_output_mode: OutputMode,
    pub deployment: DeploymentContext,
    /// `GH_DIFF_SHARE_CHROMIUM`
    pub chromium_binary: Option<PathBuf>,
    pub cwd: PathBuf,
}

impl fmt::Debug for RuntimeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeEnvironment")
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .field("default_auto_open", &self.default_auto_open)
            .field("default_output_mode", &self.default_output_mode)
            .field("deployment", &self.deployment)
            .field("chromium_binary", &self.chromium_binary)
            .field("cwd", &self.cwd)
            .finish()
    }
}

impl RuntimeEnvironment {
    /// Read the real process environment.
    pub fn from_env() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_lookup(|name| std::env::var(name).ok(), cwd)
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>, cwd: PathBuf) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let github_token = non_empty("GITHUB_TOKEN").or_else(|| non_empty("GH_TOKEN"));

        let default_auto_open = non_empty("DEFAULT_AUTO_OPEN")
            .and_then(|v| parse_bool(&v))
            .unwrap_or(false);

        let default_output_mode = match non_empty("DEFAULT_OUTPUT_MODE") {
            Some(v) => v.trim().parse().unwrap_or_else(|e| {
                log::warn!("{}; using html", e);
                OutputMode::Html
            }),
            None => OutputMode::Html,
        };

        let deployment = DeploymentContext::detect(&non_empty, &cwd);

        let env = Self {
            github_token,
            default_auto_open,
            default_output_mode,
            deployment,
            chromium_binary: non_empty("GH_DIFF_SHARE_CHROMIUM").map(PathBuf::from),
            cwd,
        };
        log::debug!("Runtime environment: {:?}", env);
        env
    }

    pub fn has_credential(&self) -> bool {
        self.github_token.is_some()
    }
}

/// Load variables from a `.env` file in the working directory, if any.
///
/// Variables already set in the process win.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => log::info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => log::debug!("No .env file found"),
        Err(e) => log::warn!("Failed to load .env file: {}", e),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)], cwd: &str) -> RuntimeEnvironment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RuntimeEnvironment::from_lookup(|name| map.get(name).cloned(), PathBuf::from(cwd))
    }

    #[test]
    fn test_defaults() {
        let e = env(&[], "/home/dev/project");
        assert_eq!(e.github_token, None);
        assert!(!e.default_auto_open);
        assert_eq!(e.default_output_mode, OutputMode::Html);
        assert_eq!(e.deployment, DeploymentContext::Local);
        assert!(!e.has_credential());
    }

    #[test]
    fn test_token_precedence() {
        let e = env(&[("GITHUB_TOKEN", "a"), ("GH_TOKEN", "b")], "/");
        assert_eq!(e.github_token.as_deref(), Some("a"));

        let e = env(&[("GITHUB_TOKEN", " "), ("GH_TOKEN", "b")], "/");
        assert_eq!(e.github_token.as_deref(), Some("b"));
    }

    #[test]
    fn test_hosted_detection() {
        assert!(env(&[("VERCEL", "1")], "/srv").deployment.is_hosted());
        assert!(env(&[], "/app/server").deployment.is_hosted());
        assert!(!env(&[], "/application").deployment.is_hosted());
    }

    #[test]
    fn test_explicit_hosted_flag_wins() {
        let e = env(&[("GH_DIFF_SHARE_HOSTED", "false"), ("SMITHERY", "1")], "/app");
        assert_eq!(e.deployment, DeploymentContext::Local);

        let e = env(&[("GH_DIFF_SHARE_HOSTED", "true")], "/home");
        assert_eq!(e.deployment, DeploymentContext::Hosted);
    }

    #[test]
    fn test_output_mode_and_auto_open() {
        let e = env(
            &[("DEFAULT_OUTPUT_MODE", "image"), ("DEFAULT_AUTO_OPEN", "true")],
            "/",
        );
        assert_eq!(e.default_output_mode, OutputMode::Image);
        assert!(e.default_auto_open);

        let e = env(&[("DEFAULT_OUTPUT_MODE", "gif")], "/");
        assert_eq!(e.default_output_mode, OutputMode::Html);
    }

    #[test]
    fn test_output_mode_round_trip_names() {
        assert_eq!("both".parse::<OutputMode>(), Ok(OutputMode::Both));
        assert_eq!(OutputMode::Image.to_string(), "image");
        assert!("png".parse::<OutputMode>().is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let e = env(&[("GITHUB_TOKEN", "ghp_secret")], "/");
        assert!(!format!("{:?}", e).contains("ghp_secret"));
    }
}
