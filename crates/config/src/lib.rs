//! Configuration management for repotrail.
//!
//! This crate loads report options from files and the environment, and
//! resolves the GitHub token.
//!
//! # Overview
//!
//! - [`config`]: the [`Config`] struct, its defaults, and environment overrides
//! - [`auth`]: GitHub token resolution
//! - [`persistence`]: config file reading and writing
//! - [`error`]: error types for configuration operations
//!
//! # Configuration Sources (Priority)
//!
//! From highest to lowest:
//!
//! 1. Command-line flags (applied by the binary)
//! 2. Environment variables (`GITHUB_TOKEN`, `VISIBILITY`, `SORT_BY`,
//!    `BETTER_READABILITY`, `HAS_ACCESS_ONLY`, `CONTRIBUTION_TYPES`)
//! 3. Local config (`./repotrail.json5` or `./repotrail.json`)
//! 4. User config (`~/.config/repotrail/config.json5` or `config.json`)
//! 5. Built-in defaults
//!
//! # File Format
//!
//! ```json5
//! {
//!   visibility: "both",          // public | private | both
//!   sort_by: "owner_login",      // identity | visibility | owner_login | is_fork | original_owner
//!   better_readability: true,
//!   has_access_only: false,
//!   contribution_types: ["commit", "pr"], // empty keeps every type
//! }
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use repotrail_config::{Config, auth::resolve_token};
//!
//! # async fn example() -> repotrail_config::Result<()> {
//! let mut config = Config::load().await?;
//! config.apply_env(|key| std::env::var(key).ok())?;
//! let token = resolve_token(config.github_token.as_deref()).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod persistence;

pub use config::Config;
pub use error::{ConfigError, Result};
