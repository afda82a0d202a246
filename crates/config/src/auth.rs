//! GitHub token resolution.
//!
//! The token comes from the first source that has one:
//!
//! 1. `github_token` from the config file or `GITHUB_TOKEN`
//! 2. `gh auth token` (GitHub CLI)
//!
//! Discovery cannot run unauthenticated, so finding none is an error.

use crate::error::{ConfigError, Result};

/// Resolves the GitHub token.
///
/// # Errors
///
/// Returns [`ConfigError::MissingToken`] if no source has a token, or the
/// error from `gh` if the CLI is installed but fails unexpectedly.
///
/// # Examples
///
/// ```no_run
/// use repotrail_config::{Config, auth::resolve_token};
///
/// # async fn example() -> repotrail_config::Result<()> {
/// let config = Config::load().await?;
/// let token = resolve_token(config.github_token.as_deref()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn resolve_token(configured: Option<&str>) -> Result<String> {
    if let Some(token) = configured.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }

    get_gh_token().await?.ok_or(ConfigError::MissingToken)
}

/// Gets a GitHub token from the `gh` CLI.
///
/// # Returns
///
/// - `Ok(Some(token))` if `gh auth token` prints a token
/// - `Ok(None)` if `gh` is not installed or not logged in
/// - `Err(...)` if the command exists but fails otherwise
///
/// # Errors
///
/// Returns an error if:
/// - The `gh` command exists but cannot be executed
///   ([`ConfigError::GhAuthFailed`])
/// - `gh auth token` exits unsuccessfully for a reason other than being
///   logged out ([`ConfigError::GhAuthError`])
pub async fn get_gh_token() -> Result<Option<String>> {
    use tokio::process::Command;

    let output = match Command::new("gh").args(["auth", "token"]).output().await {
        Ok(output) => output,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::GhAuthFailed(e)),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if is_logged_out(&stderr) {
            return Ok(None);
        }
        return Err(ConfigError::GhAuthError {
            code: output.status.code(),
            stderr,
        });
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(Some(token).filter(|t| !t.is_empty()))
}

fn is_logged_out(stderr: &str) -> bool {
    stderr.contains("not logged in") || stderr.contains("no oauth token")
}
