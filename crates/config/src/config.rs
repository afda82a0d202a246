//! Core configuration struct and loading logic.
//!
//! This module provides the main [`Config`] struct which aggregates all
//! report options for repotrail, and the environment overrides layered on
//! top of the config file.

use repotrail_protocol::{ContributionType, SortField, VisibilityFilter};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::persistence::{find_config_file, read_config_file, write_config_file};

/// Environment variable holding the GitHub token.
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
/// Environment variable overriding [`Config::visibility`].
pub const ENV_VISIBILITY: &str = "VISIBILITY";
/// Environment variable overriding [`Config::sort_by`].
pub const ENV_SORT_BY: &str = "SORT_BY";
/// Environment variable overriding [`Config::better_readability`].
pub const ENV_BETTER_READABILITY: &str = "BETTER_READABILITY";
/// Environment variable overriding [`Config::has_access_only`].
pub const ENV_HAS_ACCESS_ONLY: &str = "HAS_ACCESS_ONLY";
/// Environment variable overriding [`Config::contribution_types`].
pub const ENV_CONTRIBUTION_TYPES: &str = "CONTRIBUTION_TYPES";

/// The main configuration struct for repotrail.
///
/// # Examples
///
/// ```
/// use repotrail_config::Config;
/// use repotrail_protocol::{SortField, VisibilityFilter};
///
/// let config = Config::default();
/// assert_eq!(config.visibility, VisibilityFilter::Both);
/// assert_eq!(config.sort_by, SortField::OwnerLogin);
/// assert!(config.better_readability);
/// assert!(config.contribution_types.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub token.
    ///
    /// If not set, the token is taken from the `gh` CLI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,

    /// Which repositories to report.
    pub visibility: VisibilityFilter,

    /// Field the report is sorted and grouped by.
    pub sort_by: SortField,

    /// Whether to separate groups more loosely.
    pub better_readability: bool,

    /// Only report repositories listed by `/user/repos`.
    pub has_access_only: bool,

    /// Contribution types to keep. Empty keeps everything.
    pub contribution_types: Vec<ContributionType>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            visibility: VisibilityFilter::default(),
            sort_by: SortField::default(),
            better_readability: true,
            has_access_only: false,
            contribution_types: Vec::new(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from the default file locations.
    ///
    /// Searches for configuration files in the following order:
    ///
    /// 1. Local: `./repotrail.json5` or `./repotrail.json`
    /// 2. User: `~/.config/repotrail/config.json5` or `~/.config/repotrail/config.json`
    ///
    /// If no configuration file is found, returns a default configuration.
    /// Environment variables are not applied; see [`Config::apply_env`].
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is found but cannot be
    /// read or parsed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use repotrail_config::Config;
    ///
    /// # async fn example() -> repotrail_config::Result<()> {
    /// let mut config = Config::load().await?;
    /// config.apply_env(|key| std::env::var(key).ok())?;
    /// println!("Sorting by {:?}", config.sort_by);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let config: Config = read_config_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        write_config_file(path, self)
    }

    /// Overrides settings from environment variables.
    ///
    /// `lookup` maps a variable name to its value; pass
    /// `|key| std::env::var(key).ok()` for the process environment. Unset
    /// variables leave the setting untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a value that does not parse.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    ///
    /// use repotrail_config::Config;
    /// use repotrail_protocol::{ContributionType, SortField};
    ///
    /// let env = HashMap::from([
    ///     ("SORT_BY", "Visibility"),
    ///     ("CONTRIBUTION_TYPES", "commit, pr"),
    ///     ("BETTER_READABILITY", "false"),
    /// ]);
    ///
    /// let mut config = Config::default();
    /// config.apply_env(|key| env.get(key).map(|v| v.to_string())).unwrap();
    /// assert_eq!(config.sort_by, SortField::Visibility);
    /// assert_eq!(
    ///     config.contribution_types,
    ///     [ContributionType::Commit, ContributionType::PullRequest]
    /// );
    /// assert!(!config.better_readability);
    /// ```
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(token) = lookup(ENV_GITHUB_TOKEN).filter(|t| !t.trim().is_empty()) {
            self.github_token = Some(token);
        }
        if let Some(value) = lookup(ENV_VISIBILITY) {
            self.visibility = value
                .parse::<VisibilityFilter>()
                .map_err(|_| invalid(ENV_VISIBILITY, value))?;
        }
        if let Some(value) = lookup(ENV_SORT_BY) {
            self.sort_by = value
                .parse::<SortField>()
                .map_err(|_| invalid(ENV_SORT_BY, value))?;
        }
        if let Some(value) = lookup(ENV_BETTER_READABILITY) {
            self.better_readability = parse_bool(ENV_BETTER_READABILITY, &value)?;
        }
        if let Some(value) = lookup(ENV_HAS_ACCESS_ONLY) {
            self.has_access_only = parse_bool(ENV_HAS_ACCESS_ONLY, &value)?;
        }
        if let Some(value) = lookup(ENV_CONTRIBUTION_TYPES) {
            self.contribution_types = parse_contribution_types(&value)?;
        }
        self.validate()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a blank token.
    pub fn validate(&self) -> Result<()> {
        match &self.github_token {
            Some(token) if token.trim().is_empty() => Err(invalid(ENV_GITHUB_TOKEN, token.clone())),
            _ => Ok(()),
        }
    }
}

fn invalid(key: &'static str, value: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.into(),
    }
}

/// Parses a boolean setting.
///
/// Accepts `true`/`false`, `yes`/`no` and `1`/`0`, case-insensitively.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for anything else.
pub fn parse_bool(key: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

/// Parses a comma-separated list of contribution types.
///
/// `all` (or an empty list) yields an empty selection, which keeps every
/// type.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] naming the first unknown type.
///
/// # Examples
///
/// ```
/// use repotrail_config::config::parse_contribution_types;
/// use repotrail_protocol::ContributionType;
///
/// assert!(parse_contribution_types("all").unwrap().is_empty());
/// assert_eq!(
///     parse_contribution_types("review,access").unwrap(),
///     [ContributionType::Review, ContributionType::DirectAccess]
/// );
/// assert!(parse_contribution_types("commit,stars").is_err());
/// ```
pub fn parse_contribution_types(value: &str) -> Result<Vec<ContributionType>> {
    if value.trim().eq_ignore_ascii_case("all") {
        return Ok(Vec::new());
    }

    let mut types = Vec::new();
    for code in value.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let contribution: ContributionType = code
            .parse()
            .map_err(|_| invalid(ENV_CONTRIBUTION_TYPES, code))?;
        if !types.contains(&contribution) {
            types.push(contribution);
        }
    }
    Ok(types)
}
