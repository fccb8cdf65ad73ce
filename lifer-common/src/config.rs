//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "LIFER_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "lifer.db";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = load_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    get_default_root_folder()
}

/// Ensure the root folder exists, creating it if missing, and return the
/// database path inside it.
pub fn prepare_root_folder(root_folder: &std::path::Path) -> Result<PathBuf> {
    std::fs::create_dir_all(root_folder)?;
    Ok(root_folder.join(DATABASE_FILE))
}

/// Get default configuration file path for the platform
fn load_config_file() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("lifer").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/lifer/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// Get OS-dependent default root folder path
fn get_default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("lifer"))
        .unwrap_or_else(|| PathBuf::from("./lifer_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_arg_takes_priority() {
        let resolved = resolve_root_folder(Some("/tmp/lifer-test"));
        assert_eq!(resolved, PathBuf::from("/tmp/lifer-test"));
    }

    #[test]
    fn default_is_nonempty() {
        let folder = get_default_root_folder();
        assert!(!folder.as_os_str().is_empty());
    }

    #[test]
    fn prepare_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("root");
        let db_path = prepare_root_folder(&root).unwrap();
        assert!(root.exists());
        assert!(db_path.ends_with(DATABASE_FILE));
    }
}
