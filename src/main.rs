use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use repoicon::config::{CliOverrides, Config};

mod cmd;

#[derive(Parser)]
#[command(name = "repoicon")]
#[command(version, about = "Generate an icon for a GitHub repository")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Backend base URL (overrides API_URL, API_HOST, BACKEND_PORT and USE_HTTPS)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Milliseconds between status checks
    #[arg(long, global = true)]
    pub interval_ms: Option<u64>,

    /// Path to a repoicon.toml file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a repository URL and wait for its icon
    Generate {
        /// GitHub repository URL, e.g. https://github.com/facebook/react
        url: String,

        /// Open the image in the browser when it is ready
        #[arg(long)]
        open: bool,

        /// Print the generated image prompt
        #[arg(long)]
        show_prompt: bool,

        /// Print the final result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check the status of an existing task
    Status {
        task_id: String,

        /// Keep polling until the task completes
        #[arg(short, long)]
        watch: bool,

        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look up repository metadata on GitHub
    Repo {
        url: String,

        #[arg(long)]
        json: bool,
    },
    /// View or initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the resolved configuration
    Show,
    /// Write a default repoicon.toml to the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_directive = if verbose { "repoicon=debug" } else { "repoicon=warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Config {
        command: Some(ConfigCommands::Init { force }),
    } = &cli.command
    {
        cmd::cmd_config_init(*force)?;
        return Ok(ExitCode::SUCCESS);
    }

    let overrides = CliOverrides {
        api_url: cli.api_url.clone(),
        interval_ms: cli.interval_ms,
    };
    let config =
        Config::load(&overrides, cli.config.as_deref()).context("Failed to load configuration")?;
    tracing::debug!(backend = %config.backend_url, "configuration loaded");

    let code = match &cli.command {
        Commands::Generate {
            url,
            open,
            show_prompt,
            json,
        } => cmd::cmd_generate(&config, url, *open, *show_prompt, *json).await?,
        Commands::Status {
            task_id,
            watch,
            json,
        } => cmd::cmd_status(&config, task_id, *watch, *json).await?,
        Commands::Repo { url, json } => {
            cmd::cmd_repo(&config, url, *json).await?;
            ExitCode::SUCCESS
        }
        Commands::Config { .. } => {
            cmd::cmd_config_show(&config)?;
            ExitCode::SUCCESS
        }
    };

    Ok(code)
}
