//! repotrail - lists every GitHub repository you can reach or have
//! contributed to.
//!
//! This is the main binary: it loads configuration, runs discovery and
//! prints the grouped report.

mod image;
mod render;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use repotrail_config::Config;
use repotrail_config::auth::resolve_token;
use repotrail_config::config::parse_contribution_types;
use repotrail_github::{Discovery, DiscoveryOptions, GitHubClient, QueryExecutor};
use repotrail_protocol::{SortField, VisibilityFilter, group_records};
use secrecy::SecretString;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::image::{DEFAULT_IMAGE_PATH, render_image};
use crate::render::{OutputFormat, render_json, render_table};

#[derive(Debug, Parser)]
#[command(name = "repotrail")]
#[command(version)]
#[command(about = "List the GitHub repositories you can access or have contributed to")]
#[command(after_long_help = r#"EXAMPLES
    Private repositories, grouped by owner:
        $ repotrail --visibility private

    Forks you reviewed or opened pull requests on:
        $ repotrail --sort-by is_fork --contribution-types review,pr

    Also save the table as repos_table.png:
        $ repotrail --image

    Settings can also come from repotrail.json5, the environment or a .env
    file (GITHUB_TOKEN, VISIBILITY, SORT_BY, BETTER_READABILITY,
    HAS_ACCESS_ONLY, CONTRIBUTION_TYPES)."#)]
struct Cli {
    /// Which repositories to list: public, private or both
    #[arg(long)]
    visibility: Option<VisibilityFilter>,

    /// Column to sort and group by: name, visibility, owner, is_fork or original_owner
    #[arg(long)]
    sort_by: Option<SortField>,

    /// Separate groups of coarse columns with two blank rows
    #[arg(long, value_name = "BOOL")]
    better_readability: Option<bool>,

    /// Only list repositories you own, collaborate on or reach through an organization
    #[arg(long)]
    has_access_only: bool,

    /// Comma-separated contribution types to keep (commit, pr, issue, repo, review, access) or "all"
    #[arg(long, value_name = "LIST")]
    contribution_types: Option<String>,

    /// Read configuration from this file instead of the default locations
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Also draw the table to a PNG file (default: repos_table.png)
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = DEFAULT_IMAGE_PATH)]
    image: Option<PathBuf>,
}

impl Cli {
    /// Overrides `config` with the flags that were given.
    fn apply(&self, config: &mut Config) -> anyhow::Result<()> {
        if let Some(visibility) = self.visibility {
            config.visibility = visibility;
        }
        if let Some(sort_by) = self.sort_by {
            config.sort_by = sort_by;
        }
        if let Some(better_readability) = self.better_readability {
            config.better_readability = better_readability;
        }
        if self.has_access_only {
            config.has_access_only = true;
        }
        if let Some(list) = &self.contribution_types {
            config.contribution_types = parse_contribution_types(list)?;
        }
        Ok(())
    }

    async fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => Config::load().await?,
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        self.apply(&mut config)?;
        Ok(config)
    }
}

fn init_tracing() {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("repotrail=info,repotrail_github=info"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = cli.load_config().await?;
    info!(
        visibility = ?config.visibility,
        sort_by = ?config.sort_by,
        better_readability = config.better_readability,
        has_access_only = config.has_access_only,
        contribution_types = ?config.contribution_types,
        "starting discovery"
    );

    let token = resolve_token(config.github_token.as_deref()).await?;
    let client = GitHubClient::new(SecretString::from(token)).await?;
    let options = DiscoveryOptions {
        visibility: config.visibility,
        has_access_only: config.has_access_only,
    };

    let mut records = Discovery::new(QueryExecutor::new(client), options)
        .run()
        .await
        .context("repository discovery failed")?;
    records.retain_contributions(&config.contribution_types);

    let rows = group_records(records, config.sort_by, config.better_readability);
    match cli.format {
        OutputFormat::Table => println!("{}", render_table(&rows)),
        OutputFormat::Json => println!("{}", render_json(&rows)?),
    }
    if let Some(path) = &cli.image {
        render_image(&rows, path)?;
        info!(path = %path.display(), "saved table image");
    }
    Ok(())
}
