use std::{
    env,
    path::{Path, PathBuf},
};

const CONFIG_FILE: &str = ".gh-diff-share.toml";

/// Locate the config file, CWD first, then home directory
///
/// Searches for `.gh-diff-share.toml` in:
/// 1. Current working directory
/// 2. Home directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = Path::new(CONFIG_FILE);
    if local.is_file() {
        return Some(local.to_path_buf());
    }

    get_home_config_path().filter(|p| p.is_file())
}

/// Load config file content from CWD first, then home directory
///
/// Returns the file content if found, None otherwise.
pub fn load_config_file() -> Option<String> {
    let path = find_config_file()?;
    match std::fs::read_to_string(&path) {
        Ok(content) => {
            log::debug!("Loaded config from {}", path.display());
            Some(content)
        }
        Err(e) => {
            log::warn!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}

fn get_home_config_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_FILE))
}
