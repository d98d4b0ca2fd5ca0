//! Configuration view and scaffolding commands: `repoicon config`.

use anyhow::{Context, Result};

use repoicon::config::{Config, FileConfig};

pub fn cmd_config_show(config: &Config) -> Result<()> {
    println!();
    println!("RepoIcon Configuration");
    println!("======================");
    println!();

    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none, using defaults)"),
    }
    println!();

    println!(
        "  backend_url   = \"{}\"  ({})",
        config.backend_url, config.backend_url_source
    );
    println!(
        "  interval_ms   = {}  ({})",
        config.poll_interval.as_millis(),
        config.poll_interval_source
    );
    println!("  timeout_secs  = {}", config.request_timeout.as_secs());
    println!("  github_api    = \"{}\"", config.github_api_base);
    println!();

    Ok(())
}

pub fn cmd_config_init(force: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let path = FileConfig::write_template(&cwd, force)?;
    println!("Created {}", path.display());
    Ok(())
}
