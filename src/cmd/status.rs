//! Check an existing task: `repoicon status`.

use anyhow::{Context, Result};
use std::process::ExitCode;
use std::sync::Arc;

use repoicon::api::{ApiClient, IconBackend};
use repoicon::config::Config;
use repoicon::models::{TaskOutcome, TaskStatusResponse};
use repoicon::poller::StatusPoller;
use repoicon::ui::view::{format_outcome, format_pending};

pub async fn cmd_status(config: &Config, task_id: &str, watch: bool, json: bool) -> Result<ExitCode> {
    let task_id = task_id.trim();
    if task_id.is_empty() {
        anyhow::bail!("Task id must not be empty");
    }
    let client = Arc::new(ApiClient::from_config(config).context("Failed to build HTTP client")?);

    let mut status = client
        .check_image_status(task_id)
        .await
        .map_err(|e| anyhow::anyhow!(e.display_message()))?;
    let mut attempts = 1;

    if watch && !status.completed {
        if !json {
            println!("{}", format_pending(Some(&status), attempts));
        }
        let mut handle = StatusPoller::spawn(client, task_id, config.poll_interval)?;
        loop {
            tokio::select! {
                update = handle.next() => match update {
                    Some(update) => {
                        attempts = handle.attempts() + 1;
                        let done = update.completed;
                        status = update;
                        if done {
                            break;
                        }
                        if !json {
                            println!("{}", format_pending(Some(&status), attempts));
                        }
                    }
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    handle.cancel();
                    break;
                }
            }
        }
    }

    report(&status, attempts, json)?;
    Ok(match status.outcome() {
        TaskOutcome::Failed { .. } => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

fn report(status: &TaskStatusResponse, attempts: u32, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(status).context("Failed to serialize status")?;
        println!("{}", out);
        return Ok(());
    }
    match status.outcome() {
        TaskOutcome::Pending => println!("{}", format_pending(Some(status), attempts)),
        outcome => println!("{}", format_outcome(&outcome)),
    }
    Ok(())
}
