//! `repoicon generate`: submit a repository and wait for its icon.

use anyhow::{Context, Result};
use std::process::ExitCode;
use std::sync::Arc;

use repoicon::api::ApiClient;
use repoicon::config::Config;
use repoicon::models::TaskOutcome;
use repoicon::session::IconSession;
use repoicon::ui::GenerationView;

/// Exit code used when interrupted with Ctrl-C.
const EXIT_INTERRUPTED: u8 = 130;

pub async fn cmd_generate(
    config: &Config,
    url: &str,
    open: bool,
    show_prompt: bool,
    json: bool,
) -> Result<ExitCode> {
    let backend = Arc::new(ApiClient::from_config(config).context("Failed to build HTTP client")?);
    let mut session = IconSession::new(backend, config.poll_interval);
    let view = GenerationView::new(show_prompt, json);

    view.submitting(url);
    let submitted = tokio::select! {
        result = session.submit(url) => result.cloned(),
        _ = tokio::signal::ctrl_c() => {
            view.abandon("Cancelled before the task was created.");
            return Ok(ExitCode::from(EXIT_INTERRUPTED));
        }
    };

    let generation = match submitted {
        Ok(generation) => generation,
        Err(e) => {
            let message = session
                .error()
                .map(str::to_string)
                .unwrap_or_else(|| e.to_string());
            if json {
                print_json(&session)?;
            } else {
                view.submission_failed(&message);
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    if !json {
        view.submitted(&generation);
    }

    loop {
        tokio::select! {
            update = session.next_update() => match update {
                Some(status) => {
                    view.status(&status, session.poll_attempts());
                    if status.completed {
                        break;
                    }
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                session.cancel();
                view.abandon(&format!(
                    "Stopped polling. Check later with: repoicon status {}",
                    generation.task_id
                ));
                return Ok(ExitCode::from(EXIT_INTERRUPTED));
            }
        }
    }

    let outcome = session.outcome().unwrap_or(TaskOutcome::Pending);
    if let Some(elapsed) = session.elapsed() {
        tracing::debug!(
            elapsed_ms = elapsed.num_milliseconds(),
            attempts = session.poll_attempts(),
            "generation finished"
        );
    }
    if json {
        print_json(&session)?;
    } else {
        view.finish(&outcome);
    }

    match outcome {
        TaskOutcome::Image { url } => {
            if open && let Err(e) = open::that(&url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
            Ok(ExitCode::SUCCESS)
        }
        _ => Ok(ExitCode::FAILURE),
    }
}

fn print_json(session: &IconSession) -> Result<()> {
    let json = serde_json::to_string_pretty(&session.snapshot())
        .context("Failed to serialize session")?;
    println!("{}", json);
    Ok(())
}
