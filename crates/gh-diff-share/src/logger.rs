//! File-based logging using simplelog
//!
//! stdout carries the tool response, so logs go to a file:
//! - Debug builds: current working directory
//! - Release builds: cache directory (~/.cache/gh-diff-share/ on Linux)

use anyhow::{Context, Result};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

/// Get the log file path based on build type
fn log_file_path() -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let filename = format!("gh-diff-share-{}.log", timestamp);

    if cfg!(debug_assertions) {
        PathBuf::from(filename)
    } else {
        gh_diff_share_config::cache_dir()
            .map(|dir| dir.join(&filename))
            .unwrap_or_else(|_| PathBuf::from(filename))
    }
}

/// Level from a `RUST_LOG` value; unknown values mean info.
fn parse_level(value: Option<&str>) -> LevelFilter {
    match value {
        Some(value) => value.trim().parse().unwrap_or(LevelFilter::Info),
        None => LevelFilter::Debug,
    }
}

/// Initialize file-based logging
///
/// Returns the path of the log file.
pub fn init() -> Result<PathBuf> {
    let log_file = log_file_path();
    let level = parse_level(std::env::var("RUST_LOG").ok().as_deref());

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_time_offset_to_local()
        .unwrap_or_else(|c| c) // Fallback if local time offset fails
        .build();

    let file = File::create(&log_file)
        .with_context(|| format!("Failed to create log file {}", log_file.display()))?;

    WriteLogger::init(level, config, file).context("Failed to initialize logger")?;

    Ok(log_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(None), LevelFilter::Debug);
        assert_eq!(parse_level(Some("WARN")), LevelFilter::Warn);
        assert_eq!(parse_level(Some("trace")), LevelFilter::Trace);
        assert_eq!(parse_level(Some("verbose")), LevelFilter::Info);
    }

    #[test]
    fn test_parse_level_uses_log_names() {
        assert_eq!(parse_level(Some("Off")), LevelFilter::Off);
        assert_eq!(parse_level(Some(" error\n")), LevelFilter::Error);
        assert_eq!(parse_level(Some("")), LevelFilter::Info);
        assert_eq!(parse_level(Some("gh_diff_share=debug")), LevelFilter::Info);
    }
}
