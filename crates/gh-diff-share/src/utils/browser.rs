//! Browser utilities
//!
//! Opening files and URLs with the platform's default application.

use crate::error::OpenError;
use async_trait::async_trait;
use tokio::process::Command;

/// Opens a path or URL for the user.
#[async_trait]
pub trait Opener: Send + Sync {
    async fn open(&self, target: &str) -> Result<(), OpenError>;
}

/// Opens targets with the system default application
///
/// Uses platform-specific commands:
/// - macOS: `open`, falling back to Finder via `osascript`
/// - Linux: `xdg-open`, falling back to `gio open`
/// - Windows: `cmd /C start`, falling back to `explorer`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl SystemOpener {
    fn primary(target: &str) -> Command {
        #[cfg(target_os = "macos")]
        let command = {
            let mut c = Command::new("open");
            c.arg(target);
            c
        };

        #[cfg(target_os = "windows")]
        let command = {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", "", target]);
            c
        };

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        let command = {
            let mut c = Command::new("xdg-open");
            c.arg(target);
            c
        };

        command
    }

    fn fallback(target: &str) -> Command {
        #[cfg(target_os = "macos")]
        let command = {
            let mut c = Command::new("osascript");
            c.arg("-e").arg(format!(
                "tell application \"Finder\" to open POSIX file \"{}\"",
                target.replace('"', "\\\"")
            ));
            c
        };

        #[cfg(target_os = "windows")]
        let command = {
            let mut c = Command::new("explorer");
            c.arg(target);
            c
        };

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        let command = {
            let mut c = Command::new("gio");
            c.args(["open", target]);
            c
        };

        command
    }
}

#[async_trait]
impl Opener for SystemOpener {
    async fn open(&self, target: &str) -> Result<(), OpenError> {
        match run(Self::primary(target)).await {
            Ok(()) => Ok(()),
            Err(e) => {
                log::warn!("Failed to open {}: {}, trying fallback", target, e);
                run(Self::fallback(target)).await
            }
        }
    }
}

async fn run(mut command: Command) -> Result<(), OpenError> {
    let name = format!("{:?}", command.as_std().get_program());

    let status = command
        .status()
        .await
        .map_err(|source| OpenError::Spawn {
            command: name.clone(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(OpenError::Status {
            command: name,
            status,
        })
    }
}
