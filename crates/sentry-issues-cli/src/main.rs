//! mcp-sentry - MCP server and command-line client for Sentry issues.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sentry_issues_api::SentryClient;
use sentry_issues_core::types::DEFAULT_PRIORITY;
use sentry_issues_core::{Config, IssueSearch, IssueTracker, Settings};
use sentry_issues_mcp::McpServer;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mcp-sentry")]
#[command(author, version, about = "MCP server for Sentry issues", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server on stdio (default)
    Serve,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// List projects of the organization
    Projects,

    /// Search issues of a project
    Issues(IssuesArgs),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print the config file path
    Path,

    /// Get a config value (e.g. sentry.base_url)
    Get { key: String },

    /// Set a config value (e.g. sentry.base_url https://sentry.example.com)
    Set { key: String, value: String },
}

#[derive(clap::Args)]
struct IssuesArgs {
    /// Project id or slug
    project: String,

    /// Free-text search word
    #[arg(long)]
    search: Option<String>,

    /// Only issues seen by this user id
    #[arg(long)]
    user_id: Option<String>,

    /// Only issues seen on this URL
    #[arg(long)]
    url: Option<String>,

    /// Search resolved instead of unresolved issues
    #[arg(long)]
    resolved: bool,

    /// Comma-separated priorities
    #[arg(long, default_value = DEFAULT_PRIORITY)]
    priority: String,

    /// Pagination cursor from a previous page
    #[arg(long)]
    cursor: Option<String>,
}

impl From<IssuesArgs> for IssueSearch {
    fn from(args: IssuesArgs) -> Self {
        IssueSearch {
            project: args.project,
            search_word: args.search,
            user_id: args.user_id,
            url: args.url,
            resolved: args.resolved,
            cursor: args.cursor,
            priority: args.priority,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // stdout belongs to the MCP stream, logs go to stderr
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let client = connect()?;
            tracing::info!(
                organization = %client.organization(),
                "Sentry MCP server ready"
            );
            McpServer::new(Arc::new(client))
                .run()
                .await
                .context("MCP server failed")?;
        }
        Commands::Config { command } => run_config(command)?,
        Commands::Projects => {
            let projects = connect()?.list_projects().await?;
            println!("{}", serde_json::to_string_pretty(&projects)?);
        }
        Commands::Issues(args) => {
            let search = IssueSearch::from(args);
            let issues = connect()?.find_project_issues(&search).await?;
            for issue in issues {
                println!("{}", serde_json::to_string_pretty(&issue)?);
            }
        }
    }

    Ok(())
}

/// Build a client from the environment and the config file.
fn connect() -> anyhow::Result<SentryClient> {
    let config = Config::load()?;
    let settings = Settings::from_env(&config)?;
    tracing::debug!(?settings, "Resolved settings");
    Ok(SentryClient::new(&settings)?)
}

fn run_config(command: ConfigCommands) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Show => {
            let config = Config::load()?;
            println!("Config file: {}", Config::config_path()?.display());
            println!(
                "sentry.base_url = {}",
                config.get("sentry.base_url")?.as_deref().unwrap_or("(not set)")
            );
        }
        ConfigCommands::Path => {
            println!("{}", Config::config_path()?.display());
        }
        ConfigCommands::Get { key } => {
            let config = Config::load()?;
            match config.get(&key)? {
                Some(value) => println!("{}", value),
                None => println!("(not set)"),
            }
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }
    }

    Ok(())
}
