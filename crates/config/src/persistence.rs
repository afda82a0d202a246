//! Configuration file reading and writing.
//!
//! Files are read as JSON5, which also accepts plain JSON, and written as
//! pretty-printed JSON. The search order is:
//!
//! 1. Local: `./repotrail.json5`, then `./repotrail.json`
//! 2. User: `~/.config/repotrail/config.json5`, then `config.json`

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

const LOCAL_FILE_NAMES: &[&str] = &["repotrail.json5", "repotrail.json"];

const USER_CONFIG_DIR: &str = "repotrail";

const USER_FILE_NAMES: &[&str] = &["config.json5", "config.json"];

/// Lists the config file candidates in search order.
///
/// `local_dir` is the directory searched for `repotrail.json5` and
/// `repotrail.json`; `config_dir` is the platform config directory, if any.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use repotrail_config::persistence::candidate_paths;
///
/// let paths = candidate_paths(Path::new("."), Some(Path::new("/home/me/.config")));
/// assert_eq!(paths[0], PathBuf::from("./repotrail.json5"));
/// assert_eq!(paths[3], PathBuf::from("/home/me/.config/repotrail/config.json"));
/// ```
#[must_use]
pub fn candidate_paths(local_dir: &Path, config_dir: Option<&Path>) -> Vec<PathBuf> {
    let local = LOCAL_FILE_NAMES.iter().map(|name| local_dir.join(name));
    let user = config_dir.into_iter().flat_map(|dir| {
        USER_FILE_NAMES
            .iter()
            .map(move |name| dir.join(USER_CONFIG_DIR).join(name))
    });
    local.chain(user).collect()
}

/// Finds the first existing configuration file, if any.
#[must_use]
pub fn find_config_file() -> Option<PathBuf> {
    let config_dir = dirs::config_dir();
    candidate_paths(Path::new("."), config_dir.as_deref())
        .into_iter()
        .find(|path| path.exists())
}

/// Reads and parses a configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_config_file<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json5::from_str(&content)?)
}

/// Writes a configuration file, creating missing parent directories.
///
/// serde_json5 cannot serialize, so the output is plain JSON.
///
/// # Errors
///
/// Returns an error if serialization or any filesystem operation fails.
pub fn write_config_file<T: serde::Serialize>(path: impl AsRef<Path>, config: &T) -> Result<()> {
    let path = path.as_ref();
    let write_error = |source| ConfigError::WriteFile {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(write_error)
}
