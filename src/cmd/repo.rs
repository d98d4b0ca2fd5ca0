//! Repository metadata lookup: `repoicon repo`.

use anyhow::{Context, Result};

use repoicon::config::Config;
use repoicon::github::GitHubClient;
use repoicon::ui::view::format_repo_card;

pub async fn cmd_repo(config: &Config, url: &str, json: bool) -> Result<()> {
    let client = GitHubClient::from_config(config).context("Failed to build HTTP client")?;
    let info = client.lookup_url(url).await?;

    if json {
        let out = serde_json::to_string_pretty(&info).context("Failed to serialize repository")?;
        println!("{}", out);
    } else {
        println!("{}", format_repo_card(&info));
    }
    Ok(())
}
